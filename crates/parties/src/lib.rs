//! Parties: the people and businesses that appear on an invoice.
//!
//! - [`Client`]: the billed counterparty.
//! - [`Company`]: the user's own business profile, used as invoice sender.
//!
//! Pure domain logic (no IO, no HTTP, no storage).

pub mod address;
pub mod client;
pub mod company;
pub mod details;

pub use address::PostalAddress;
pub use client::{Client, ClientDraft, ClientFields};
pub use company::{Company, CompanyDraft, CompanyFields};
pub use details::{PartyDetails, PartyDraft};
