//! Stock-lot ledger for the pharmacy.
//!
//! Every purchase line creates one lot (`drug_stocks` row) and raises the
//! owning drug's aggregate `total_stock`; every paid sale consumes lots
//! oldest-receipt-first and lowers the aggregate by the sold quantity.
//! Two invariants hold after each operation:
//!
//! - per lot: `total_stock == active_stock + sold_stock`
//! - per drug: `drugs.total_stock == sum(active_stock)` over its lots
//!
//! Both operations must run on a caller-owned transaction so the lot
//! updates and the aggregate update commit or roll back as one unit.
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, Postgres, Transaction};

use crate::error::AppError;
use crate::helpers;

#[derive(Debug, Clone, FromRow)]
pub struct StockLot {
    pub id: i64,
    pub batch_number: Option<String>,
    pub total_stock: i32,
    pub sold_stock: i32,
    pub active_stock: i32,
    pub expired: NaiveDate,
    pub drug_id: i64,
    pub purchase_shopping_cart_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// One step of a depletion: take `taken` units out of lot `lot_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LotDepletion {
    pub lot_id: i64,
    pub taken: i32,
}

/// Walks `lots` in the order given (callers pass them oldest first) and
/// greedily takes from each until `quantity` is covered or the lots run
/// out. Never takes more than a lot holds; a short plan is the caller's
/// signal that active stock did not cover the request.
pub fn plan_depletion(lots: &[StockLot], quantity: i32) -> Vec<LotDepletion> {
    let mut remaining = quantity;
    let mut plan = Vec::new();

    for lot in lots {
        if remaining == 0 {
            break;
        }
        let take = lot.active_stock.min(remaining);
        if take <= 0 {
            continue;
        }
        plan.push(LotDepletion { lot_id: lot.id, taken: take });
        remaining -= take;
    }

    plan
}

/// Creates one lot for a purchase line and raises the drug aggregate.
/// Lots are never merged: identical consecutive receipts yield two rows.
/// The batch number embeds the receipt date and the lot id, so it is
/// assigned right after the insert returns the id.
pub async fn receive_lot(
    tx: &mut Transaction<'_, Postgres>,
    drug_id: i64,
    quantity: i32,
    expired: NaiveDate,
    purchase_shopping_cart_id: i64,
) -> Result<StockLot, AppError> {
    let mut lot = sqlx::query_as::<_, StockLot>(
        r#"INSERT INTO drug_stocks
            (total_stock, sold_stock, active_stock, expired, drug_id, purchase_shopping_cart_id)
        VALUES ($1, 0, $1, $2, $3, $4)
        RETURNING id, batch_number, total_stock, sold_stock, active_stock, expired,
                  drug_id, purchase_shopping_cart_id, created_at"#,
    )
    .bind(quantity)
    .bind(expired)
    .bind(drug_id)
    .bind(purchase_shopping_cart_id)
    .fetch_one(&mut **tx)
    .await?;

    let batch_number = helpers::batch_number(lot.created_at.date_naive(), lot.id);
    sqlx::query("UPDATE drug_stocks SET batch_number = $1 WHERE id = $2")
        .bind(&batch_number)
        .bind(lot.id)
        .execute(&mut **tx)
        .await?;
    lot.batch_number = Some(batch_number);

    let updated = sqlx::query(
        "UPDATE drugs SET total_stock = total_stock + $1, updated_at = now() WHERE id = $2",
    )
    .bind(quantity)
    .bind(drug_id)
    .execute(&mut **tx)
    .await?;
    if updated.rows_affected() == 0 {
        return Err(AppError::not_found("Drug not found"));
    }

    Ok(lot)
}

/// Depletes `quantity` units of a drug, oldest lot first (FIFO by receipt
/// time, deliberately not by expiry), and lowers the drug aggregate by the
/// same amount. The caller gates `quantity <= drugs.total_stock` before
/// invoking this and reports insufficient stock to the user; if the lots
/// nevertheless cannot cover the request, the aggregate and the lot sum
/// have diverged, and the call fails so the transaction rolls back instead
/// of under-depleting silently.
pub async fn reduce_stock_on_selling(
    tx: &mut Transaction<'_, Postgres>,
    drug_id: i64,
    quantity: i32,
) -> Result<Vec<LotDepletion>, AppError> {
    let lots = sqlx::query_as::<_, StockLot>(
        r#"SELECT id, batch_number, total_stock, sold_stock, active_stock, expired,
                  drug_id, purchase_shopping_cart_id, created_at
        FROM drug_stocks
        WHERE drug_id = $1 AND active_stock > 0
        ORDER BY created_at ASC, id ASC
        FOR UPDATE"#,
    )
    .bind(drug_id)
    .fetch_all(&mut **tx)
    .await?;

    let plan = plan_depletion(&lots, quantity);
    let covered: i32 = plan.iter().map(|d| d.taken).sum();
    if covered < quantity {
        return Err(AppError::internal(format!(
            "Stock ledger drift for drug {drug_id}: requested {quantity}, lots hold {covered}"
        )));
    }

    for step in &plan {
        sqlx::query(
            r#"UPDATE drug_stocks
            SET active_stock = active_stock - $1,
                sold_stock = sold_stock + $1,
                updated_at = now()
            WHERE id = $2"#,
        )
        .bind(step.taken)
        .bind(step.lot_id)
        .execute(&mut **tx)
        .await?;
    }

    sqlx::query("UPDATE drugs SET total_stock = total_stock - $1, updated_at = now() WHERE id = $2")
        .bind(quantity)
        .bind(drug_id)
        .execute(&mut **tx)
        .await?;

    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    // In-memory mirror of the persistent ledger: `receive` and `deplete`
    // apply the same mutations the SQL above performs, so the planning
    // logic and both invariants can be checked without a database.
    struct Ledger {
        lots: Vec<StockLot>,
        total_stock: i32,
        next_id: i64,
    }

    impl Ledger {
        fn new() -> Self {
            Self { lots: Vec::new(), total_stock: 0, next_id: 1 }
        }

        fn receive(&mut self, quantity: i32, expired: NaiveDate) -> i64 {
            let id = self.next_id;
            self.next_id += 1;
            let created_at = DateTime::from_timestamp(1_000 * id, 0).unwrap();
            self.lots.push(StockLot {
                id,
                batch_number: Some(helpers::batch_number(created_at.date_naive(), id)),
                total_stock: quantity,
                sold_stock: 0,
                active_stock: quantity,
                expired,
                drug_id: 1,
                purchase_shopping_cart_id: Some(id),
                created_at,
            });
            self.total_stock += quantity;
            id
        }

        fn deplete(&mut self, quantity: i32) -> Result<Vec<LotDepletion>, String> {
            let mut available: Vec<&StockLot> =
                self.lots.iter().filter(|l| l.active_stock > 0).collect();
            available.sort_by_key(|l| (l.created_at, l.id));
            let ordered: Vec<StockLot> = available.into_iter().cloned().collect();

            let plan = plan_depletion(&ordered, quantity);
            let covered: i32 = plan.iter().map(|d| d.taken).sum();
            if covered < quantity {
                return Err(format!("drift: requested {quantity}, lots hold {covered}"));
            }

            for step in &plan {
                let lot = self.lots.iter_mut().find(|l| l.id == step.lot_id).unwrap();
                lot.active_stock -= step.taken;
                lot.sold_stock += step.taken;
            }
            self.total_stock -= quantity;
            Ok(plan)
        }

        fn lot(&self, id: i64) -> &StockLot {
            self.lots.iter().find(|l| l.id == id).unwrap()
        }

        fn assert_invariants(&self) {
            for lot in &self.lots {
                assert_eq!(lot.total_stock, lot.active_stock + lot.sold_stock, "lot {}", lot.id);
                assert!(lot.active_stock >= 0, "lot {}", lot.id);
            }
            let active_sum: i32 = self.lots.iter().map(|l| l.active_stock).sum();
            assert_eq!(self.total_stock, active_sum);
        }
    }

    fn expiry() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 12, 31).unwrap()
    }

    #[test]
    fn fifo_consumes_oldest_lot_before_touching_newer() {
        let mut ledger = Ledger::new();
        let first = ledger.receive(5, expiry());
        let second = ledger.receive(10, expiry());

        let plan = ledger.deplete(8).unwrap();

        assert_eq!(
            plan,
            vec![
                LotDepletion { lot_id: first, taken: 5 },
                LotDepletion { lot_id: second, taken: 3 },
            ]
        );
        assert_eq!(ledger.lot(first).active_stock, 0);
        assert_eq!(ledger.lot(first).sold_stock, 5);
        assert_eq!(ledger.lot(second).active_stock, 7);
        ledger.assert_invariants();
    }

    #[test]
    fn exact_consumption_empties_the_lot() {
        let mut ledger = Ledger::new();
        let id = ledger.receive(5, expiry());

        ledger.deplete(5).unwrap();

        assert_eq!(ledger.lot(id).active_stock, 0);
        assert_eq!(ledger.lot(id).sold_stock, 5);
        assert_eq!(ledger.total_stock, 0);
        ledger.assert_invariants();
    }

    #[test]
    fn plan_stops_at_exhaustion_without_going_negative() {
        let mut ledger = Ledger::new();
        ledger.receive(5, expiry());
        ledger.receive(10, expiry());
        let ordered = ledger.lots.clone();

        let plan = plan_depletion(&ordered, 20);

        let covered: i32 = plan.iter().map(|d| d.taken).sum();
        assert_eq!(covered, 15);
        assert!(plan.iter().all(|d| d.taken > 0));
    }

    #[test]
    fn depleting_past_available_stock_is_rejected_and_mutates_nothing() {
        let mut ledger = Ledger::new();
        ledger.receive(5, expiry());
        ledger.receive(10, expiry());

        let err = ledger.deplete(20).unwrap_err();

        assert!(err.contains("drift"));
        assert_eq!(ledger.total_stock, 15);
        assert!(ledger.lots.iter().all(|l| l.sold_stock == 0));
        ledger.assert_invariants();
    }

    #[test]
    fn identical_receipts_create_independent_lots() {
        let mut ledger = Ledger::new();
        let a = ledger.receive(10, expiry());
        let b = ledger.receive(10, expiry());

        assert_ne!(a, b);
        assert_eq!(ledger.lots.len(), 2);
        assert_eq!(ledger.total_stock, 20);
        ledger.assert_invariants();
    }

    #[test]
    fn skips_exhausted_lots_and_continues_fifo() {
        let mut ledger = Ledger::new();
        let first = ledger.receive(4, expiry());
        let second = ledger.receive(6, expiry());
        let third = ledger.receive(8, expiry());

        ledger.deplete(4).unwrap();
        let plan = ledger.deplete(7).unwrap();

        assert_eq!(
            plan,
            vec![
                LotDepletion { lot_id: second, taken: 6 },
                LotDepletion { lot_id: third, taken: 1 },
            ]
        );
        assert_eq!(ledger.lot(first).active_stock, 0);
        ledger.assert_invariants();
    }

    #[test]
    fn receive_then_deplete_scenario_keeps_aggregate_in_step() {
        let mut ledger = Ledger::new();
        assert_eq!(ledger.total_stock, 0);

        let first = ledger.receive(10, NaiveDate::from_ymd_opt(2025, 12, 31).unwrap());
        assert_eq!(ledger.total_stock, 10);

        let second = ledger.receive(5, NaiveDate::from_ymd_opt(2026, 1, 15).unwrap());
        assert_eq!(ledger.total_stock, 15);
        assert_eq!(ledger.lots.len(), 2);

        ledger.deplete(12).unwrap();

        assert_eq!(ledger.lot(first).active_stock, 0);
        assert_eq!(ledger.lot(first).sold_stock, 10);
        assert_eq!(ledger.lot(second).active_stock, 3);
        assert_eq!(ledger.lot(second).sold_stock, 2);
        assert_eq!(ledger.total_stock, 3);
        ledger.assert_invariants();
    }

    #[test]
    fn equal_timestamps_break_ties_by_lot_id() {
        let ts = DateTime::from_timestamp(5_000, 0).unwrap();
        let lot = |id: i64| StockLot {
            id,
            batch_number: None,
            total_stock: 10,
            sold_stock: 0,
            active_stock: 10,
            expired: expiry(),
            drug_id: 1,
            purchase_shopping_cart_id: None,
            created_at: ts,
        };
        // Same ordering the SQL applies: created_at ASC, id ASC.
        let mut lots = vec![lot(9), lot(3)];
        lots.sort_by_key(|l| (l.created_at, l.id));

        let plan = plan_depletion(&lots, 12);

        assert_eq!(
            plan,
            vec![
                LotDepletion { lot_id: 3, taken: 10 },
                LotDepletion { lot_id: 9, taken: 2 },
            ]
        );
    }
}
