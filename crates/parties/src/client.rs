use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use invoify_core::validate::normalize_optional;
use invoify_core::{ClientId, DomainResult, Owned, UserId};

use crate::details::{PartyDetails, PartyDraft};

/// A billing counterparty owned by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: ClientId,
    #[serde(rename = "userId")]
    pub owner_id: UserId,
    #[serde(flatten)]
    pub details: PartyDetails,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated client fields (create and full update share the same shape).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientFields {
    pub details: PartyDetails,
    pub notes: Option<String>,
}

/// Raw client form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientDraft {
    #[serde(flatten)]
    pub details: PartyDraft,
    pub notes: Option<String>,
}

impl ClientDraft {
    pub fn validate(self) -> DomainResult<ClientFields> {
        Ok(ClientFields {
            details: self.details.validate()?,
            notes: normalize_optional(self.notes),
        })
    }
}

impl Client {
    pub fn create(owner_id: UserId, fields: ClientFields, now: DateTime<Utc>) -> Self {
        Self {
            id: ClientId::new(),
            owner_id,
            details: fields.details,
            notes: fields.notes,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace every editable field (PUT semantics).
    pub fn apply(&mut self, fields: ClientFields, now: DateTime<Utc>) {
        self.details = fields.details;
        self.notes = fields.notes;
        self.updated_at = now;
    }

    pub fn name(&self) -> &str {
        &self.details.name
    }

    pub fn email(&self) -> &str {
        &self.details.email
    }
}

impl Owned for Client {
    fn owner_id(&self) -> UserId {
        self.owner_id
    }
}
