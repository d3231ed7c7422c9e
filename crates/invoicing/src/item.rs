use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use invoify_core::{DomainError, DomainResult, InvoiceItemId};

use crate::totals::{QUANTITY_DIGITS, line_amount, within_digits, within_input_scale};

/// A single billed line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceItem {
    pub id: InvoiceItemId,
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    /// `quantity × unit_price`, rounded to cents.
    pub amount: Decimal,
}

impl InvoiceItem {
    pub fn new(description: impl Into<String>, quantity: Decimal, unit_price: Decimal) -> DomainResult<Self> {
        Ok(Self {
            id: InvoiceItemId::new(),
            description: description.into(),
            quantity,
            unit_price,
            amount: line_amount(quantity, unit_price)?,
        })
    }
}

/// Raw line item as submitted; any client-computed `amount` is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemDraft {
    pub description: Option<String>,
    pub quantity: Option<Decimal>,
    pub unit_price: Option<Decimal>,
}

impl LineItemDraft {
    /// `position` is 1-based and only used in error messages.
    pub fn validate(self, position: usize) -> DomainResult<InvoiceItem> {
        let description = self
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty())
            .ok_or_else(|| DomainError::validation(format!("item {position}: description is required")))?;

        let quantity = self.quantity.unwrap_or(Decimal::ONE);
        if quantity <= Decimal::ZERO {
            return Err(DomainError::validation(format!(
                "item {position}: quantity must be positive"
            )));
        }

        let unit_price = self.unit_price.unwrap_or(Decimal::ZERO);
        if unit_price < Decimal::ZERO {
            return Err(DomainError::validation(format!(
                "item {position}: unit price must not be negative"
            )));
        }

        for (label, value) in [("quantity", quantity), ("unit price", unit_price)] {
            if !within_input_scale(value) {
                return Err(DomainError::validation(format!(
                    "item {position}: {label} allows at most 4 decimal places"
                )));
            }
            if !within_digits(value, QUANTITY_DIGITS) {
                return Err(DomainError::validation(format!("item {position}: {label} is too large")));
            }
        }

        InvoiceItem::new(description, quantity, unit_price)
    }
}
