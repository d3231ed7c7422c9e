//! Request/response shapes that only exist at the HTTP edge.
//!
//! Domain records (`Client`, `Company`, `InvoiceDetails`, reports) serialize
//! themselves; this module covers query strings and auth payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use invoify_auth::UserAccount;
use invoify_core::{ClientId, DomainResult, UserId};
use invoify_invoicing::{InvoiceFilter, InvoiceStatus};

#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub id: UserId,
    pub name: Option<String>,
    pub email: String,
}

impl From<&UserAccount> for AccountResponse {
    fn from(account: &UserAccount) -> Self {
        Self {
            id: account.id,
            name: account.name.clone(),
            email: account.email.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: AccountResponse,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WhoAmIResponse {
    pub user_id: UserId,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

impl MessageResponse {
    pub fn new(message: &'static str) -> Self {
        Self { message }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NextNumberResponse {
    pub invoice_number: String,
}

/// `GET /api/invoices?status=&clientId=&search=`; blank parameters are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceListQuery {
    pub status: Option<String>,
    pub client_id: Option<String>,
    pub search: Option<String>,
}

impl InvoiceListQuery {
    pub fn into_filter(self) -> DomainResult<InvoiceFilter> {
        let present = |v: Option<String>| v.filter(|s| !s.trim().is_empty());

        let status = present(self.status).map(|s| s.parse::<InvoiceStatus>()).transpose()?;
        let client_id = present(self.client_id).map(|s| s.parse::<ClientId>()).transpose()?;

        Ok(InvoiceFilter {
            status,
            client_id,
            search: present(self.search),
            issued_from: None,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsQuery {
    pub time_range: Option<String>,
}
