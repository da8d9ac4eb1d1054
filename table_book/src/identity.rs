//! Request-scoped caller identity.
//!
//! The engine never reaches into ambient state to decide who is calling.
//! Whatever issued the credential (the identity provider is external to this
//! crate) is condensed into a [`Caller`] that travels into every staff-gated
//! operation as an explicit argument.

use serde::{Deserialize, Serialize};

/// User ID type
pub type UserId = i64;

/// Identity of the party invoking an engine operation.
///
/// Built by the server edge from a verified credential, or
/// [`Caller::anonymous`] for the public booking path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Caller {
    pub user_id: Option<UserId>,
    pub username: Option<String>,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub is_active: bool,
}

impl Caller {
    /// An unauthenticated caller (walk-in customer booking flow).
    pub fn anonymous() -> Self {
        Self {
            user_id: None,
            username: None,
            is_staff: false,
            is_superuser: false,
            is_active: false,
        }
    }

    /// A staff caller, as reported by the identity provider.
    pub fn staff(user_id: UserId, username: impl Into<String>, is_superuser: bool) -> Self {
        Self {
            user_id: Some(user_id),
            username: Some(username.into()),
            is_staff: true,
            is_superuser,
            is_active: true,
        }
    }

    /// Whether this caller may perform staff-only mutations.
    ///
    /// Superusers qualify even without the staff flag; deactivated accounts
    /// never qualify.
    pub fn can_manage(&self) -> bool {
        self.is_active && (self.is_staff || self.is_superuser)
    }

    /// Whether the caller presented any credential at all.
    pub fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_cannot_manage() {
        let caller = Caller::anonymous();
        assert!(!caller.is_authenticated());
        assert!(!caller.can_manage());
    }

    #[test]
    fn staff_can_manage() {
        let caller = Caller::staff(1, "host", false);
        assert!(caller.is_authenticated());
        assert!(caller.can_manage());
    }

    #[test]
    fn superuser_without_staff_flag_can_manage() {
        let caller = Caller {
            user_id: Some(2),
            username: Some("owner".to_string()),
            is_staff: false,
            is_superuser: true,
            is_active: true,
        };
        assert!(caller.can_manage());
    }

    #[test]
    fn deactivated_staff_cannot_manage() {
        let caller = Caller {
            user_id: Some(3),
            username: Some("former".to_string()),
            is_staff: true,
            is_superuser: true,
            is_active: false,
        };
        assert!(!caller.can_manage());
    }
}
