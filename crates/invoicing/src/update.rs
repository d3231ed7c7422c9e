use serde_json::Value;

use invoify_core::{DomainError, DomainResult};

use crate::invoice::InvoiceDraft;
use crate::status::InvoiceStatus;

/// The two shapes a PUT body can take.
#[derive(Debug, Clone)]
pub enum InvoiceUpdate {
    /// `{"status": "PAID"}` and nothing else.
    StatusOnly(InvoiceStatus),
    /// Every field re-submitted; items are replaced wholesale.
    Full(InvoiceDraft),
}

impl InvoiceUpdate {
    pub fn from_json(body: Value) -> DomainResult<Self> {
        let Value::Object(map) = &body else {
            return Err(DomainError::validation("request body must be a JSON object"));
        };

        if map.len() == 1 {
            if let Some(status) = map.get("status").and_then(Value::as_str).filter(|s| !s.trim().is_empty()) {
                return Ok(Self::StatusOnly(status.parse()?));
            }
        }

        serde_json::from_value(body)
            .map(Self::Full)
            .map_err(|err| DomainError::validation(format!("invalid invoice body: {err}")))
    }
}
