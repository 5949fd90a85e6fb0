//! Membership mutation guards.
//!
//! Validates roster changes against the role hierarchy and the standing
//! club invariants before anything is persisted:
//!
//! - a club must always retain at least one owner-tier membership;
//! - nobody may assign a role more privileged than their own;
//! - ordinary members may only touch the visibility of their own entry.
//!
//! The guards are pure: the caller supplies the acting user, the target
//! membership, and the club's current owner count (read under the same
//! transaction that will apply the change).

use crate::error::CoreError;
use crate::roles::{self, Role, ROLE_OFFICER, ROLE_OWNER};
use crate::types::{Actor, DbId};

/// Fields an ordinary member may change on their own membership.
pub const MEMBER_SELF_FIELDS: &[&str] = &["active", "public"];

/// A membership row as seen by the guards: who it belongs to and the role
/// it currently holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetMembership {
    pub person_id: DbId,
    pub role: Role,
}

/// Validate a role change on an existing membership.
///
/// Returns the sanitized role value to persist. `owner_count` is the number
/// of owner-tier memberships the club currently has, including the target.
pub fn validate_role_change(
    actor: &Actor,
    target: &TargetMembership,
    requested_role: Role,
    owner_count: i64,
) -> Result<Role, CoreError> {
    roles::validate_role(requested_role).map_err(CoreError::Validation)?;

    if !actor.is_elevated {
        let actor_role = actor.role.ok_or_else(|| {
            CoreError::Forbidden("You must be a member of this club to modify roles".into())
        })?;

        // Cannot hand out more authority than you hold.
        if !roles::is_at_least(actor_role, requested_role) {
            return Err(CoreError::Forbidden(
                "You cannot promote someone above your own level".into(),
            ));
        }

        // Editing someone else requires officer standing and at least the
        // target's current authority.
        if target.person_id != actor.user_id {
            if !roles::is_at_least(actor_role, ROLE_OFFICER) {
                return Err(CoreError::Forbidden(
                    "Only officers may change other members' roles".into(),
                ));
            }
            if !roles::is_at_least(actor_role, target.role) {
                return Err(CoreError::Forbidden(
                    "You cannot modify a member with more authority than you".into(),
                ));
            }
        }
    }

    // Never let the last owner-tier membership slip below owner tier.
    if roles::is_at_least(target.role, ROLE_OWNER)
        && !roles::is_at_least(requested_role, ROLE_OWNER)
        && owner_count <= 1
    {
        return Err(CoreError::Conflict(
            "You cannot demote yourself if you are the only owner".into(),
        ));
    }

    Ok(requested_role)
}

/// Validate removal of a membership.
///
/// Self-removal is open to any member except a sole owner; removing someone
/// else requires officer standing and at least the target's authority.
pub fn validate_removal(
    actor: &Actor,
    target: &TargetMembership,
    owner_count: i64,
) -> Result<(), CoreError> {
    if roles::is_at_least(target.role, ROLE_OWNER) && owner_count <= 1 {
        return Err(CoreError::Conflict(
            "You cannot leave a club as its only owner; transfer ownership first".into(),
        ));
    }

    if actor.is_elevated || target.person_id == actor.user_id {
        return Ok(());
    }

    let actor_role = actor.role.ok_or_else(|| {
        CoreError::Forbidden("You must be a member of this club to remove members".into())
    })?;
    if !roles::is_at_least(actor_role, ROLE_OFFICER) {
        return Err(CoreError::Forbidden(
            "Only officers may remove other members".into(),
        ));
    }
    if !roles::is_at_least(actor_role, target.role) {
        return Err(CoreError::Forbidden(
            "You cannot remove a member with more authority than you".into(),
        ));
    }

    Ok(())
}

/// Validate which membership fields the actor may touch.
///
/// Officers, owners, and elevated users may change anything the role-change
/// guard allows. Ordinary members are limited to [`MEMBER_SELF_FIELDS`] on
/// their own membership.
pub fn validate_field_scope(
    actor: &Actor,
    target_person: DbId,
    changed_fields: &[&str],
) -> Result<(), CoreError> {
    if actor.is_elevated {
        return Ok(());
    }
    if let Some(role) = actor.role {
        if roles::is_at_least(role, ROLE_OFFICER) {
            return Ok(());
        }
    }

    if target_person != actor.user_id {
        return Err(CoreError::Forbidden(
            "Ordinary members may only edit their own membership".into(),
        ));
    }

    for field in changed_fields {
        if !MEMBER_SELF_FIELDS.contains(field) {
            return Err(CoreError::Forbidden(format!(
                "Ordinary members are not allowed to change \"{field}\""
            )));
        }
    }

    Ok(())
}
