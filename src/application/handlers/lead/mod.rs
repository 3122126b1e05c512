//! Lead handlers.
//!
//! ## Commands
//! - Customer package selection
//!
//! ## Queries
//! - Resolve the lead a customer session acts on
//! - Customer dashboard overview
//! - Admin lead lookup

mod get_dashboard;
mod get_lead;
mod lead_view;
mod resolve_lead;
mod select_package;

pub use get_dashboard::{DashboardView, GetDashboardHandler};
pub use get_lead::GetLeadHandler;
pub use lead_view::{LeadView, ReceiptView};
pub use resolve_lead::{ResolveLeadHandler, ResolveLeadQuery};
pub use select_package::{SelectPackageCommand, SelectPackageError, SelectPackageHandler};
