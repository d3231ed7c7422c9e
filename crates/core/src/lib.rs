//! `invoify-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! identifiers, the domain error model, record ownership and field validation.

pub mod error;
pub mod id;
pub mod owned;
pub mod validate;

pub use error::{DomainError, DomainResult};
pub use id::{ClientId, CompanyId, InvoiceId, InvoiceItemId, UserId};
pub use owned::Owned;
