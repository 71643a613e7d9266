pub mod metrics;
pub mod staff;

pub use metrics::track_metrics;
pub use staff::{StaffContext, StaffRole};
