//! Membership role scale and comparison helpers.
//!
//! Roles are small integers where a LOWER value carries MORE authority
//! (owner 0, officer 10, member 20). The numeric gaps are intentional so a
//! deployment can seed intermediate tiers without code changes. Every other
//! module compares roles through [`authority`] / [`is_at_least`] — nothing
//! else in the workspace may compare role values directly.

/// A membership role on the ordered authority scale.
pub type Role = i16;

/// Full control of the club, including deletion and ownership transfer.
pub const ROLE_OWNER: Role = 0;

/// May edit the club profile and manage the roster.
pub const ROLE_OFFICER: Role = 10;

/// Ordinary member; may only edit their own membership visibility.
pub const ROLE_MEMBER: Role = 20;

/// All roles assignable through the API.
pub const VALID_ROLES: &[Role] = &[ROLE_OWNER, ROLE_OFFICER, ROLE_MEMBER];

/// The authority ordinal of a role. Lower means more privileged.
///
/// Currently the identity function; exists so call sites express intent and
/// the scale representation can change in one place.
pub fn authority(role: Role) -> i16 {
    role
}

/// Returns `true` if `role` carries at least the authority of `threshold`.
pub fn is_at_least(role: Role, threshold: Role) -> bool {
    authority(role) <= authority(threshold)
}

/// Validate that a role value is one of the assignable tiers.
pub fn validate_role(value: Role) -> Result<(), String> {
    if VALID_ROLES.contains(&value) {
        Ok(())
    } else {
        Err(format!(
            "Invalid role {value}. Must be one of: {}",
            VALID_ROLES
                .iter()
                .map(|r| r.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_outranks_officer_outranks_member() {
        assert!(authority(ROLE_OWNER) < authority(ROLE_OFFICER));
        assert!(authority(ROLE_OFFICER) < authority(ROLE_MEMBER));
    }

    #[test]
    fn test_is_at_least_includes_equal() {
        assert!(is_at_least(ROLE_OFFICER, ROLE_OFFICER));
        assert!(is_at_least(ROLE_OWNER, ROLE_OFFICER));
        assert!(!is_at_least(ROLE_MEMBER, ROLE_OFFICER));
    }

    #[test]
    fn test_owner_is_at_least_everything() {
        for role in VALID_ROLES {
            assert!(is_at_least(ROLE_OWNER, *role));
        }
    }

    #[test]
    fn test_valid_roles_accepted() {
        assert!(validate_role(ROLE_OWNER).is_ok());
        assert!(validate_role(ROLE_OFFICER).is_ok());
        assert!(validate_role(ROLE_MEMBER).is_ok());
    }

    #[test]
    fn test_unknown_role_rejected() {
        let result = validate_role(5);
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Invalid role"));
    }

    #[test]
    fn test_negative_role_rejected() {
        assert!(validate_role(-1).is_err());
    }
}
