use chrono::{DateTime, Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use invoify_core::validate::normalize_optional;
use invoify_core::{ClientId, CompanyId, DomainError, DomainResult, InvoiceId, Owned, UserId};
use invoify_parties::{Client, Company};

use crate::dates::deserialize_optional_date;
use crate::item::{InvoiceItem, LineItemDraft};
use crate::status::InvoiceStatus;
use crate::totals::{InvoiceTotals, RATE_DIGITS, clamp_non_negative, within_digits, within_input_scale};

/// Days between issue and due date when no due date is given.
pub const DEFAULT_PAYMENT_DAYS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: InvoiceId,
    #[serde(rename = "userId")]
    pub owner_id: UserId,
    pub invoice_number: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: InvoiceStatus,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub client_id: ClientId,
    pub sender_id: CompanyId,
    pub items: Vec<InvoiceItem>,
    pub tax_rate: Decimal,
    #[serde(flatten)]
    pub totals: InvoiceTotals,
    pub notes: Option<String>,
    pub payment_terms: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated invoice fields, shared by create and full update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceFields {
    pub invoice_number: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: InvoiceStatus,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub client_id: ClientId,
    pub sender_id: CompanyId,
    pub items: Vec<InvoiceItem>,
    pub tax_rate: Decimal,
    pub totals: InvoiceTotals,
    pub notes: Option<String>,
    pub payment_terms: Option<String>,
}

/// Raw invoice form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDraft {
    pub invoice_number: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<InvoiceStatus>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub issue_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub due_date: Option<NaiveDate>,
    pub client_id: Option<String>,
    pub sender_id: Option<String>,
    pub items: Option<Vec<LineItemDraft>>,
    pub tax_rate: Option<Decimal>,
    pub discount: Option<Decimal>,
    pub notes: Option<String>,
    pub payment_terms: Option<String>,
}

impl InvoiceDraft {
    /// Validate the form. `today` fills in a missing issue date.
    pub fn validate(self, today: NaiveDate) -> DomainResult<InvoiceFields> {
        let invoice_number = normalize_optional(self.invoice_number);
        let client_id = normalize_optional(self.client_id);
        let sender_id = normalize_optional(self.sender_id);
        let items = self.items.filter(|items| !items.is_empty());

        let (Some(invoice_number), Some(client_id), Some(sender_id), Some(items)) =
            (invoice_number, client_id, sender_id, items)
        else {
            return Err(DomainError::validation(
                "Invoice number, client, and items are required",
            ));
        };

        let client_id: ClientId = client_id.parse()?;
        let sender_id: CompanyId = sender_id.parse()?;

        let items = items
            .into_iter()
            .enumerate()
            .map(|(idx, item)| item.validate(idx + 1))
            .collect::<DomainResult<Vec<_>>>()?;

        let issue_date = self.issue_date.unwrap_or(today);
        let due_date = match self.due_date {
            Some(due_date) => due_date,
            None => issue_date
                .checked_add_days(Days::new(DEFAULT_PAYMENT_DAYS))
                .ok_or_else(|| DomainError::validation("issue date is out of range"))?,
        };
        if due_date < issue_date {
            return Err(DomainError::validation("due date must not be before the issue date"));
        }

        let tax_rate = clamp_non_negative(self.tax_rate.unwrap_or(Decimal::ZERO));
        if !within_input_scale(tax_rate) || !within_digits(tax_rate, RATE_DIGITS) {
            return Err(DomainError::validation(
                "tax rate must be below 100000 with at most 4 decimal places",
            ));
        }
        let totals = InvoiceTotals::compute(&items, tax_rate, self.discount.unwrap_or(Decimal::ZERO))?;

        Ok(InvoiceFields {
            invoice_number,
            title: normalize_optional(self.title),
            description: normalize_optional(self.description),
            status: self.status.unwrap_or_default(),
            issue_date,
            due_date,
            client_id,
            sender_id,
            items,
            tax_rate,
            totals,
            notes: normalize_optional(self.notes),
            payment_terms: normalize_optional(self.payment_terms),
        })
    }
}

impl Invoice {
    pub fn create(owner_id: UserId, fields: InvoiceFields, now: DateTime<Utc>) -> Self {
        Self {
            id: InvoiceId::new(),
            owner_id,
            invoice_number: fields.invoice_number,
            title: fields.title,
            description: fields.description,
            status: fields.status,
            issue_date: fields.issue_date,
            due_date: fields.due_date,
            client_id: fields.client_id,
            sender_id: fields.sender_id,
            items: fields.items,
            tax_rate: fields.tax_rate,
            totals: fields.totals,
            notes: fields.notes,
            payment_terms: fields.payment_terms,
            created_at: now,
            updated_at: now,
        }
    }

    /// Full replacement, items included.
    pub fn apply(&mut self, fields: InvoiceFields, now: DateTime<Utc>) {
        let id = self.id;
        let owner_id = self.owner_id;
        let created_at = self.created_at;
        *self = Self::create(owner_id, fields, now);
        self.id = id;
        self.created_at = created_at;
    }

    pub fn set_status(&mut self, status: InvoiceStatus, now: DateTime<Utc>) {
        self.status = status;
        self.updated_at = now;
    }
}

impl Owned for Invoice {
    fn owner_id(&self) -> UserId {
        self.owner_id
    }
}

/// An invoice joined with its client and sender company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvoiceDetails {
    #[serde(flatten)]
    pub invoice: Invoice,
    pub client: Client,
    pub sender: Company,
}
