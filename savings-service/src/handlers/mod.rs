pub mod health;
pub mod savings;

pub use health::{health_check, metrics_endpoint, not_found, readiness_check};
pub use savings::{
    create_saving, delete_saving, list_savings, list_savings_by_category, list_savings_by_date,
    update_saving,
};
