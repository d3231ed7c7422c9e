//! User accounts: registration input, sign-in input and the stored account.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use invoify_core::validate::{normalize_optional, require_email};
use invoify_core::{DomainError, DomainResult, UserId};

/// Minimum accepted password length (characters).
pub const MIN_PASSWORD_LEN: usize = 6;

/// A registered user as persisted by the account store.
#[derive(Clone, PartialEq, Eq)]
pub struct UserAccount {
    pub id: UserId,
    pub name: Option<String>,
    /// Always lower-case; unique across accounts.
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl UserAccount {
    pub fn register(account: NewAccount, password_hash: String, now: DateTime<Utc>) -> Self {
        Self {
            id: UserId::new(),
            name: account.name,
            email: account.email,
            password_hash,
            created_at: now,
        }
    }
}

impl core::fmt::Debug for UserAccount {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("UserAccount")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Raw sign-up request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignUp {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Validated sign-up data; the password is still plain text here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub name: Option<String>,
    pub email: String,
    pub password: String,
}

impl SignUp {
    pub fn validate(self) -> DomainResult<NewAccount> {
        let email = require_email(self.email.as_deref())?.to_lowercase();
        let password = self.password.unwrap_or_default();
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(DomainError::validation(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        Ok(NewAccount {
            name: normalize_optional(self.name),
            email,
            password,
        })
    }
}

/// Raw sign-in request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignIn {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl SignIn {
    /// Returns the lookup key (lower-cased e-mail) and the supplied password.
    pub fn credentials(&self) -> DomainResult<(String, &str)> {
        let email = self
            .email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .ok_or_else(|| DomainError::validation("Email and password are required"))?;
        let password = self
            .password
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| DomainError::validation("Email and password are required"))?;
        Ok((email.to_lowercase(), password))
    }
}
