//! Chapter roles and the pure checks used to gate mutations.

/// Membership role inside a chapter. Owners are also admins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Owner,
    Admin,
    Member,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "OWNER",
            Self::Admin => "ADMIN",
            Self::Member => "MEMBER",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a free-form role string to a [`Role`].
///
/// Case-insensitive and whitespace tolerant. `organizer` and `moderator`
/// are accepted as admin aliases, `rider` as member.
pub fn normalize_role(raw: &str) -> Option<Role> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "owner" => Some(Role::Owner),
        "admin" | "organizer" | "moderator" => Some(Role::Admin),
        "member" | "rider" => Some(Role::Member),
        _ => None,
    }
}

pub fn is_owner(role: Option<Role>) -> bool {
    matches!(role, Some(Role::Owner))
}

pub fn is_admin(role: Option<Role>) -> bool {
    matches!(role, Some(Role::Owner | Role::Admin))
}

/// Whether `actor` may put someone into (or take someone out of) `target`.
pub fn can_assign(actor: Option<Role>, target: Role) -> bool {
    match target {
        Role::Owner => is_owner(actor),
        Role::Admin | Role::Member => is_admin(actor),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_accepts_case_and_aliases() {
        assert_eq!(normalize_role("OWNER"), Some(Role::Owner));
        assert_eq!(normalize_role(" admin "), Some(Role::Admin));
        assert_eq!(normalize_role("Organizer"), Some(Role::Admin));
        assert_eq!(normalize_role("moderator"), Some(Role::Admin));
        assert_eq!(normalize_role("member"), Some(Role::Member));
        assert_eq!(normalize_role("rider"), Some(Role::Member));
        assert_eq!(normalize_role("superuser"), None);
        assert_eq!(normalize_role(""), None);
    }

    #[test]
    fn owner_implies_admin() {
        assert!(is_admin(Some(Role::Owner)));
        assert!(is_admin(Some(Role::Admin)));
        assert!(!is_admin(Some(Role::Member)));
        assert!(!is_admin(None));
        assert!(is_owner(Some(Role::Owner)));
        assert!(!is_owner(Some(Role::Admin)));
    }

    #[test]
    fn only_owners_grant_ownership() {
        assert!(can_assign(Some(Role::Owner), Role::Owner));
        assert!(!can_assign(Some(Role::Admin), Role::Owner));
        assert!(can_assign(Some(Role::Admin), Role::Admin));
        assert!(can_assign(Some(Role::Admin), Role::Member));
        assert!(!can_assign(Some(Role::Member), Role::Member));
        assert!(!can_assign(None, Role::Member));
    }

    #[test]
    fn role_round_trips_through_storage_string() {
        for role in [Role::Owner, Role::Admin, Role::Member] {
            assert_eq!(normalize_role(role.as_str()), Some(role));
        }
    }
}
