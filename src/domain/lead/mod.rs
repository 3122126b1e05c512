//! Leads, packages and payment state.

mod aggregate;
mod package;
mod payment;

pub use aggregate::{Lead, PackageChange};
pub use package::{format_eur, Package, DEPOSIT_CENTS};
pub use payment::{
    PaymentBreakdown, PaymentState, PaymentStatus, PaymentType, Receipt, RecordedPayment,
};
