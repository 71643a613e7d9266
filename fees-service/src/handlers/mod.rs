pub mod health;
pub mod metrics;
pub mod payments;
pub mod reports;
pub mod status;

pub use health::health_check;
pub use metrics::metrics_handler;
pub use payments::{list_payments, record_payment};
pub use reports::get_report;
pub use status::get_fee_status;
