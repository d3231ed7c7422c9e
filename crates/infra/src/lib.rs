//! Infrastructure layer: persistence for accounts, parties and invoices.
//!
//! Every store operation is scoped by the acting user's id. A record owned by
//! someone else is indistinguishable from one that does not exist.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;

#[cfg(test)]
mod conformance;

pub use error::{StoreError, StoreResult};
pub use memory::InMemoryStore;
pub use postgres::PgStore;
pub use store::{AccountStore, ClientStore, CompanyStore, InvoiceStore, Store};
