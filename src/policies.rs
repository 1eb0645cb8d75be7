// src/policies.rs
//
// Role gates, one module per resource. Handlers call these before touching
// data; row-scoped rules additionally take the row's clinic id so a user can
// never reach across tenants.
use crate::middleware::auth::AuthContext;

pub mod role {
    pub const ADMIN: i16 = 1;
    pub const ADMINISTRATOR: i16 = 2;
    pub const DOCTOR: i16 = 3;
    pub const DOCTOR_ASSISTANT: i16 = 4;
    pub const NURSE: i16 = 5;
}

pub mod clinic {
    use super::*;

    pub fn handle(auth: &AuthContext) -> bool {
        auth.role_id == role::ADMIN
    }
}

pub mod user {
    use super::*;

    pub fn view(auth: &AuthContext) -> bool {
        auth.role_id == role::ADMIN
    }

    pub fn view_detail(auth: &AuthContext, employee_clinic_id: i64) -> bool {
        view(auth) && auth.clinic_id == employee_clinic_id
    }

    pub fn handle_administrator(auth: &AuthContext, employee_clinic_id: i64, employee_role_id: i16) -> bool {
        view_detail(auth, employee_clinic_id) && employee_role_id == role::ADMINISTRATOR
    }
}

pub mod patient {
    use super::*;

    pub fn handle(auth: &AuthContext) -> bool {
        auth.role_id == role::ADMINISTRATOR
    }

    pub fn add_queue(auth: &AuthContext, patient_clinic_id: i64) -> bool {
        handle(auth) && auth.clinic_id == patient_clinic_id
    }

    pub fn view(auth: &AuthContext) -> bool {
        handle(auth) || auth.role_id == role::ADMIN
    }
}

pub mod queue {
    use super::*;

    pub fn view_doctor_assistant(auth: &AuthContext) -> bool {
        auth.role_id == role::DOCTOR_ASSISTANT
    }

    pub fn view_doctor(auth: &AuthContext) -> bool {
        auth.role_id == role::DOCTOR
    }

    pub fn view_doctor_queue_detail(auth: &AuthContext, queue_clinic_id: i64) -> bool {
        view_doctor(auth) && auth.clinic_id == queue_clinic_id
    }

    pub fn call(auth: &AuthContext, queue_clinic_id: i64) -> bool {
        view_doctor_assistant(auth) && auth.clinic_id == queue_clinic_id
    }

    pub fn cancel(auth: &AuthContext, queue_clinic_id: i64) -> bool {
        (auth.role_id == role::ADMINISTRATOR || auth.role_id == role::DOCTOR_ASSISTANT)
            && auth.clinic_id == queue_clinic_id
    }
}

pub mod doctor {
    use super::*;

    pub fn admin(auth: &AuthContext) -> bool {
        auth.role_id == role::ADMIN
    }

    pub fn view(auth: &AuthContext) -> bool {
        admin(auth) || auth.role_id == role::ADMINISTRATOR
    }

    pub fn handle(auth: &AuthContext, doctor_clinic_id: i64, doctor_role_id: i16) -> bool {
        admin(auth) && auth.clinic_id == doctor_clinic_id && doctor_role_id == role::DOCTOR
    }

    pub fn assessment(auth: &AuthContext, queue_clinic_id: i64, queue_status: &str) -> bool {
        auth.role_id == role::DOCTOR
            && auth.clinic_id == queue_clinic_id
            && queue_status == "consulting"
    }
}

pub mod doctor_assistant {
    use super::*;

    pub fn admin(auth: &AuthContext) -> bool {
        auth.role_id == role::ADMIN
    }

    pub fn view(auth: &AuthContext) -> bool {
        admin(auth) || auth.role_id == role::ADMINISTRATOR
    }

    pub fn handle(auth: &AuthContext, assistant_clinic_id: i64, assistant_role_id: i16) -> bool {
        admin(auth)
            && auth.clinic_id == assistant_clinic_id
            && assistant_role_id == role::DOCTOR_ASSISTANT
    }
}

pub mod employee {
    use super::*;

    pub fn admin(auth: &AuthContext) -> bool {
        auth.role_id == role::ADMIN
    }

    pub fn view(auth: &AuthContext) -> bool {
        admin(auth) || auth.role_id == role::ADMINISTRATOR
    }
}

pub mod drug {
    use super::*;

    pub fn view(auth: &AuthContext) -> bool {
        auth.role_id == role::ADMIN
            || auth.role_id == role::ADMINISTRATOR
            || auth.role_id == role::DOCTOR
    }

    pub fn update(auth: &AuthContext, drug_clinic_id: i64) -> bool {
        view(auth) && auth.clinic_id == drug_clinic_id
    }
}

pub mod drug_category {
    use super::*;

    pub fn view_and_add(auth: &AuthContext) -> bool {
        auth.role_id == role::ADMIN || auth.role_id == role::ADMINISTRATOR
    }

    pub fn update(auth: &AuthContext, category_clinic_id: i64) -> bool {
        view_and_add(auth) && auth.clinic_id == category_clinic_id
    }
}

pub mod drug_factory {
    use super::*;

    pub fn view_all_and_add(auth: &AuthContext) -> bool {
        auth.role_id == role::ADMIN || auth.role_id == role::ADMINISTRATOR
    }
}

pub mod action {
    use super::*;

    pub fn create(auth: &AuthContext) -> bool {
        auth.role_id == role::ADMIN
    }

    pub fn view(auth: &AuthContext) -> bool {
        create(auth) || auth.role_id == role::ADMINISTRATOR || auth.role_id == role::DOCTOR
    }

    pub fn handle(auth: &AuthContext, action_clinic_id: i64) -> bool {
        create(auth) && auth.clinic_id == action_clinic_id
    }
}

pub mod transaction {
    use super::*;

    pub fn view(auth: &AuthContext) -> bool {
        auth.role_id == role::ADMIN || auth.role_id == role::ADMINISTRATOR
    }

    pub fn view_detail_purchase(auth: &AuthContext, transaction_clinic_id: i64) -> bool {
        view(auth) && auth.clinic_id == transaction_clinic_id
    }

    pub fn view_selling(auth: &AuthContext, transaction_clinic_id: i64) -> bool {
        (view(auth) || auth.role_id == role::NURSE) && auth.clinic_id == transaction_clinic_id
    }

    // Cart edits and payment settle only while the transaction is unpaid.
    pub fn handle_cart(auth: &AuthContext, transaction_clinic_id: i64, paid: bool) -> bool {
        auth.role_id == role::NURSE && !paid && auth.clinic_id == transaction_clinic_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(role_id: i16, clinic_id: i64) -> AuthContext {
        AuthContext {
            user_id: 1,
            role_id,
            clinic_id,
            full_name: "Test User".to_string(),
        }
    }

    #[test]
    fn drug_view_matrix() {
        assert!(drug::view(&ctx(role::ADMIN, 1)));
        assert!(drug::view(&ctx(role::ADMINISTRATOR, 1)));
        assert!(drug::view(&ctx(role::DOCTOR, 1)));
        assert!(!drug::view(&ctx(role::DOCTOR_ASSISTANT, 1)));
        assert!(!drug::view(&ctx(role::NURSE, 1)));
    }

    #[test]
    fn drug_update_is_clinic_scoped() {
        assert!(drug::update(&ctx(role::ADMIN, 1), 1));
        assert!(!drug::update(&ctx(role::ADMIN, 1), 2));
    }

    #[test]
    fn assessment_requires_consulting_doctor_in_clinic() {
        assert!(doctor::assessment(&ctx(role::DOCTOR, 1), 1, "consulting"));
        assert!(!doctor::assessment(&ctx(role::DOCTOR, 1), 1, "consult-wait"));
        assert!(!doctor::assessment(&ctx(role::DOCTOR, 1), 2, "consulting"));
        assert!(!doctor::assessment(&ctx(role::NURSE, 1), 1, "consulting"));
    }

    #[test]
    fn cart_handling_only_for_nurse_on_unpaid() {
        assert!(transaction::handle_cart(&ctx(role::NURSE, 1), 1, false));
        assert!(!transaction::handle_cart(&ctx(role::NURSE, 1), 1, true));
        assert!(!transaction::handle_cart(&ctx(role::NURSE, 1), 2, false));
        assert!(!transaction::handle_cart(&ctx(role::ADMIN, 1), 1, false));
    }

    #[test]
    fn administrator_management_needs_admin_same_clinic() {
        assert!(user::handle_administrator(&ctx(role::ADMIN, 1), 1, role::ADMINISTRATOR));
        assert!(!user::handle_administrator(&ctx(role::ADMIN, 1), 2, role::ADMINISTRATOR));
        assert!(!user::handle_administrator(&ctx(role::ADMIN, 1), 1, role::DOCTOR));
        assert!(!user::handle_administrator(&ctx(role::ADMINISTRATOR, 1), 1, role::ADMINISTRATOR));
    }
}
