//! Printable invoice documents.
//!
//! [`layout`] is a small page model (text, filled boxes, rules) in
//! millimetres measured from the top-left corner. [`invoice_pdf`] lays an
//! invoice out onto it and [`render`] turns the result into PDF bytes.

pub mod invoice_pdf;
pub mod layout;
pub mod render;

pub use invoice_pdf::{InvoiceLayout, pdf_filename};
pub use layout::{Align, Color, Document, DrawOp, Font, Page, PageSize};
pub use render::{RenderError, render_pdf};

use invoify_invoicing::InvoiceDetails;

/// Lay out and render an invoice in one step.
pub fn invoice_pdf(details: &InvoiceDetails) -> Result<Vec<u8>, RenderError> {
    render_pdf(&InvoiceLayout::build(details))
}
