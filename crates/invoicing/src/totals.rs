//! Invoice totals arithmetic.
//!
//! `subtotal = Σ quantity × unit_price`
//! `tax      = subtotal × tax_rate / 100`
//! `total    = max(0, subtotal + tax − discount)`
//!
//! Negative inputs are clamped to zero and money is kept at two decimal places.
//! Accepted magnitudes and scales match the invoice columns in `schema.sql`,
//! so every store keeps exactly what validation accepted.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use invoify_core::{DomainError, DomainResult};

use crate::item::InvoiceItem;

const MONEY_DP: u32 = 2;

/// Decimal places allowed on quantities, unit prices and tax rates.
pub const MAX_INPUT_SCALE: u32 = 4;
/// Money (`NUMERIC(16, 2)`) stays below 10^14.
pub const MONEY_DIGITS: u32 = 14;
/// Quantities and unit prices (`NUMERIC(16, 4)`) stay below 10^12.
pub const QUANTITY_DIGITS: u32 = 12;
/// Tax rates (`NUMERIC(9, 4)`) stay below 10^5.
pub const RATE_DIGITS: u32 = 5;

/// True when `value` has fewer than `digits` integer digits.
pub fn within_digits(value: Decimal, digits: u32) -> bool {
    value.abs() < Decimal::from(10i64.pow(digits))
}

/// True when `value` needs no more than [`MAX_INPUT_SCALE`] decimal places.
pub fn within_input_scale(value: Decimal) -> bool {
    value.normalize().scale() <= MAX_INPUT_SCALE
}

fn bounded_money(value: Decimal) -> DomainResult<Decimal> {
    if within_digits(value, MONEY_DIGITS) {
        Ok(value)
    } else {
        Err(out_of_range())
    }
}

pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_DP, RoundingStrategy::MidpointAwayFromZero)
}

pub fn clamp_non_negative(value: Decimal) -> Decimal {
    value.max(Decimal::ZERO)
}

fn out_of_range() -> DomainError {
    DomainError::validation("invoice amounts are out of range")
}

/// Amount of a single line (`quantity × unit_price`, clamped and rounded).
pub fn line_amount(quantity: Decimal, unit_price: Decimal) -> DomainResult<Decimal> {
    clamp_non_negative(quantity)
        .checked_mul(clamp_non_negative(unit_price))
        .map(round_money)
        .ok_or_else(out_of_range)
        .and_then(bounded_money)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceTotals {
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
}

impl InvoiceTotals {
    /// Compute totals for a set of items.
    ///
    /// Uses the stored `amount` of each item; build items with
    /// [`InvoiceItem::new`] so amounts are consistent.
    pub fn compute(items: &[InvoiceItem], tax_rate: Decimal, discount: Decimal) -> DomainResult<Self> {
        let subtotal = items
            .iter()
            .try_fold(Decimal::ZERO, |acc, item| acc.checked_add(item.amount))
            .ok_or_else(out_of_range)
            .and_then(bounded_money)?;

        let tax_amount = subtotal
            .checked_mul(clamp_non_negative(tax_rate))
            .and_then(|v| v.checked_div(Decimal::ONE_HUNDRED))
            .map(round_money)
            .ok_or_else(out_of_range)
            .and_then(bounded_money)?;

        let discount = bounded_money(round_money(clamp_non_negative(discount)))?;

        let total = subtotal
            .checked_add(tax_amount)
            .and_then(|v| v.checked_sub(discount))
            .map(clamp_non_negative)
            .ok_or_else(out_of_range)
            .and_then(bounded_money)?;

        Ok(Self {
            subtotal,
            tax_amount,
            discount,
            total,
        })
    }
}
