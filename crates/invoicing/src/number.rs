use chrono::{DateTime, Datelike, Utc};
use rand::Rng;

/// Suggest an invoice number of the form `INV-YYYYMM-NNN`.
///
/// The suffix is random, so two suggestions in the same month may collide;
/// numbers are not enforced unique.
pub fn generate_invoice_number<R: Rng + ?Sized>(now: DateTime<Utc>, rng: &mut R) -> String {
    let suffix: u32 = rng.random_range(0..1000);
    format!("INV-{:04}{:02}-{:03}", now.year(), now.month(), suffix)
}
