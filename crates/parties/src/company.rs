use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use invoify_core::validate::normalize_optional;
use invoify_core::{CompanyId, DomainResult, Owned, UserId};

use crate::details::{PartyDetails, PartyDraft};

/// The user's own business profile, printed as the invoice sender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: CompanyId,
    #[serde(rename = "userId")]
    pub owner_id: UserId,
    #[serde(flatten)]
    pub details: PartyDetails,
    pub website: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyFields {
    pub details: PartyDetails,
    pub website: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyDraft {
    #[serde(flatten)]
    pub details: PartyDraft,
    pub website: Option<String>,
}

impl CompanyDraft {
    pub fn validate(self) -> DomainResult<CompanyFields> {
        Ok(CompanyFields {
            details: self.details.validate()?,
            website: normalize_optional(self.website),
        })
    }
}

impl Company {
    pub fn create(owner_id: UserId, fields: CompanyFields, now: DateTime<Utc>) -> Self {
        Self {
            id: CompanyId::new(),
            owner_id,
            details: fields.details,
            website: fields.website,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, fields: CompanyFields, now: DateTime<Utc>) {
        self.details = fields.details;
        self.website = fields.website;
        self.updated_at = now;
    }

    pub fn name(&self) -> &str {
        &self.details.name
    }

    pub fn email(&self) -> &str {
        &self.details.email
    }
}

impl Owned for Company {
    fn owner_id(&self) -> UserId {
        self.owner_id
    }
}
