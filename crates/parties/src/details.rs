//! Identity and contact fields shared by clients and companies.

use serde::{Deserialize, Serialize};

use invoify_core::validate::{is_plausible_email, normalize_optional};
use invoify_core::{DomainError, DomainResult};

use crate::address::PostalAddress;

/// Validated identity/contact block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartyDetails {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    #[serde(flatten)]
    pub address: PostalAddress,
    pub tax_id: Option<String>,
}

/// Raw identity/contact block as submitted by a form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartyDraft {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(flatten)]
    pub address: PostalAddress,
    pub tax_id: Option<String>,
}

impl PartyDraft {
    pub fn validate(self) -> DomainResult<PartyDetails> {
        let (Some(name), Some(email)) = (normalize_optional(self.name), normalize_optional(self.email)) else {
            return Err(DomainError::validation("Name and email are required"));
        };
        if !is_plausible_email(&email) {
            return Err(DomainError::validation("email is not a valid address"));
        }

        Ok(PartyDetails {
            name,
            email,
            phone: normalize_optional(self.phone),
            address: self.address.normalized(),
            tax_id: normalize_optional(self.tax_id),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_and_email_are_required() {
        let draft = PartyDraft {
            name: Some("Acme".into()),
            email: Some("   ".into()),
            ..Default::default()
        };
        assert_eq!(
            draft.validate(),
            Err(DomainError::validation("Name and email are required"))
        );
    }

    #[test]
    fn deserializes_flat_camel_case_form() {
        let draft: PartyDraft = serde_json::from_value(serde_json::json!({
            "name": "Acme",
            "email": "billing@acme.io",
            "zipCode": "10001",
            "taxId": " DE123 ",
        }))
        .unwrap();
        let details = draft.validate().unwrap();
        assert_eq!(details.address.zip_code.as_deref(), Some("10001"));
        assert_eq!(details.tax_id.as_deref(), Some("DE123"));
    }
}
