// src/helpers.rs
//
// Business-number generation and pagination helpers shared across handlers.
// All sequence-based numbers embed the row id zero-padded, so they are only
// assigned after the insert returned the id.
use chrono::NaiveDate;
use rand::Rng;

pub fn id_number(id: i64, width: usize) -> String {
    format!("{id:0width$}")
}

/// Patient record number, e.g. `RM000042`.
pub fn record_number(patient_id: i64) -> String {
    format!("RM{}", id_number(patient_id, 6))
}

/// Queue registration number, e.g. `REG/20260131/4821`. The suffix is
/// random, not sequential, so queue positions cannot be guessed from it.
pub fn registration_number(date: NaiveDate) -> String {
    let suffix: u16 = rand::rng().random_range(0..10_000);
    format!("REG/{}/{:04}", date.format("%Y%m%d"), suffix)
}

/// Purchase and selling invoice number, e.g. `INV/20260131/0007`.
pub fn invoice_number(date: NaiveDate, transaction_id: i64) -> String {
    format!("INV/{}/{}", date.format("%Y%m%d"), id_number(transaction_id, 4))
}

/// Stock lot batch number, e.g. `BN202601310007`.
pub fn batch_number(date: NaiveDate, lot_id: i64) -> String {
    format!("BN{}{}", date.format("%Y%m%d"), id_number(lot_id, 4))
}

pub fn drug_number(drug_id: i64) -> String {
    format!("OBT{}", id_number(drug_id, 4))
}

pub fn category_number(category_id: i64) -> String {
    format!("KTO{}", id_number(category_id, 4))
}

/// Row offset for page-based listings (1-indexed pages).
pub fn skip_data(page: i64, per_page: i64) -> i64 {
    (page.max(1) - 1) * per_page
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn id_number_pads_and_overflows() {
        assert_eq!(id_number(7, 4), "0007");
        assert_eq!(id_number(123456, 4), "123456");
    }

    #[test]
    fn record_number_is_six_wide() {
        assert_eq!(record_number(42), "RM000042");
    }

    #[test]
    fn invoice_and_batch_numbers_embed_date_and_id() {
        let d = date(2026, 1, 31);
        assert_eq!(invoice_number(d, 7), "INV/20260131/0007");
        assert_eq!(batch_number(d, 7), "BN202601310007");
    }

    #[test]
    fn registration_number_shape() {
        let n = registration_number(date(2026, 1, 31));
        assert!(n.starts_with("REG/20260131/"));
        let suffix = n.rsplit('/').next().unwrap();
        assert_eq!(suffix.len(), 4);
        assert!(suffix.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn skip_data_offsets() {
        assert_eq!(skip_data(1, 10), 0);
        assert_eq!(skip_data(3, 10), 20);
        assert_eq!(skip_data(0, 10), 0);
    }
}
