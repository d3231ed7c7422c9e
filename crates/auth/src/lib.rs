//! `invoify-auth`: accounts, password hashing and session tokens.
//!
//! Nothing here knows about HTTP or storage: the API layer
//! extracts tokens from requests, the infra layer persists accounts.

pub mod account;
pub mod claims;
pub mod password;
pub mod tokens;

pub use account::{NewAccount, SignIn, SignUp, UserAccount};
pub use claims::{SessionClaims, TokenValidationError, validate_claims};
pub use password::{DEFAULT_COST, PasswordError, hash_password, verify_password};
pub use tokens::{Hs256SessionTokens, IssuedToken, SessionTokens, TokenError};
