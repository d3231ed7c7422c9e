//! Ownership: every business record belongs to exactly one user.

use crate::id::UserId;

/// A record scoped to the user that created it.
///
/// Stores filter every query by owner; the in-memory store uses this trait
/// to do the same.
pub trait Owned {
    fn owner_id(&self) -> UserId;

    fn is_owned_by(&self, user_id: UserId) -> bool {
        self.owner_id() == user_id
    }
}
