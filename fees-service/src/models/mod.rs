pub mod concession;
pub mod obligation;
pub mod payment;
pub mod report;
pub mod school;
pub mod structure;

pub use concession::FeeConcession;
pub use obligation::{
    compute_obligation, FeeStatus, FeeStatusSummary, Obligation, StructureFeeStatus,
};
pub use payment::{
    payment_totals, receipt_period, FeePayment, ListPaymentsFilter, PaymentMode, PaymentRecord,
    PaymentStatus, RecordPayment,
};
pub use report::{
    ClassBreakdown, CollectionSummary, Defaulter, FeeTypeBreakdown, ModeBreakdown,
    MonthlyBucket, MonthlyCollection, ReportFilter,
};
pub use school::{AcademicYear, SchoolClass, Student, StudentSummary};
pub use structure::{BillingFrequency, FeeStructure, FeeType};
