//! Invoicing domain module.
//!
//! Invoices, line items, the status label, totals arithmetic, numbering,
//! list filters and the analytics roll-ups. Pure domain logic (no IO, no
//! HTTP, no storage).

pub mod analytics;
pub mod dates;
pub mod filter;
pub mod invoice;
pub mod item;
pub mod number;
pub mod status;
pub mod totals;
pub mod update;

pub use analytics::{AnalyticsReport, DashboardSummary, TimeRange};
pub use filter::InvoiceFilter;
pub use invoice::{Invoice, InvoiceDetails, InvoiceDraft, InvoiceFields};
pub use item::{InvoiceItem, LineItemDraft};
pub use number::generate_invoice_number;
pub use status::InvoiceStatus;
pub use totals::InvoiceTotals;
pub use update::InvoiceUpdate;
