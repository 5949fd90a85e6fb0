//! Club approval state machine.
//!
//! A club is always in one of three approval states — approved, rejected,
//! or pending (`approved` is a tri-state `Option<bool>`) — qualified by the
//! orthogonal `ghost` flag: a ghosted club was approved at some point, has
//! since been edited, and is awaiting re-review while the public continues
//! to see its last approved snapshot.
//!
//! [`plan_transition`] computes the next approval state for a save. It is
//! pure: the storage layer computes the field diff against the row it has
//! locked, calls in here, then applies the result and appends the snapshot
//! in the same transaction.

use crate::error::CoreError;
use crate::types::{Actor, DbId, Timestamp};

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// An explicit field diff for a club save.
///
/// Computed once at the storage boundary by comparing the incoming request
/// with the stored row. `Some` means the field is present in the edit and
/// differs from the stored value; fields that are themselves nullable use a
/// nested `Option` so "set to null" is representable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClubChanges {
    pub name: Option<String>,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    pub email: Option<String>,
    pub email_public: Option<bool>,
    pub image_url: Option<Option<String>>,
    pub website: Option<Option<String>>,
    pub facebook: Option<Option<String>>,
    pub twitter: Option<Option<String>>,
    pub instagram: Option<Option<String>>,
    pub linkedin: Option<Option<String>>,
    pub github: Option<Option<String>>,
    pub youtube: Option<Option<String>>,
    pub how_to_get_involved: Option<String>,
    pub active: Option<bool>,
    pub approved: Option<Option<bool>>,
    pub approved_comment: Option<String>,
}

impl ClubChanges {
    /// Returns `true` if the diff touches any field whose change requires
    /// the club to go back through review.
    ///
    /// The sensitive set is name, image, and description — the fields shown
    /// most prominently to students browsing the directory.
    pub fn touches_sensitive(&self) -> bool {
        self.name.is_some() || self.image_url.is_some() || self.description.is_some()
    }

    /// Returns `true` if the diff contains no fields at all.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// The stored approval-relevant state of a club, read under the save
/// transaction's row lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApprovalState {
    pub approved: Option<bool>,
    pub approved_by: Option<DbId>,
    pub approved_on: Option<Timestamp>,
    pub ghost: bool,
    pub active: bool,
}

// ---------------------------------------------------------------------------
// Output type
// ---------------------------------------------------------------------------

/// The approval fields to persist for a save, plus the flags the
/// notification policy consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub approved: Option<bool>,
    pub approved_by: Option<DbId>,
    pub approved_on: Option<Timestamp>,
    pub ghost: bool,
    pub active: bool,
    pub needs_reapproval: bool,
    pub approval_email_required: bool,
    pub confirmation_email_required: bool,
}

impl Transition {
    /// The audit summary recorded on the snapshot row for this save.
    pub fn change_reason(&self, is_creation: bool) -> &'static str {
        if is_creation {
            "create"
        } else if self.approval_email_required {
            if self.approved == Some(true) {
                "approve"
            } else {
                "reject"
            }
        } else if self.needs_reapproval {
            "edit (reapproval required)"
        } else {
            "edit"
        }
    }
}

// ---------------------------------------------------------------------------
// Transition algorithm
// ---------------------------------------------------------------------------

/// Compute the next approval state for a club save.
///
/// `prior` is `None` for creation. `has_approved_snapshot` reports whether
/// any historical snapshot of this club is tagged approved; it decides
/// whether an edit ghosts the club or merely leaves it pending.
///
/// Errors:
/// - `Forbidden` if a non-elevated actor renders an approval decision;
/// - `InvalidTransition` if a decision is rendered on a club being created.
pub fn plan_transition(
    prior: Option<&ApprovalState>,
    changes: &ClubChanges,
    actor: &Actor,
    has_approved_snapshot: bool,
    now: Timestamp,
) -> Result<Transition, CoreError> {
    let Some(prior) = prior else {
        // Creation: always pending, never ghosted, regardless of creator.
        if changes.approved.is_some() {
            return Err(CoreError::InvalidTransition(
                "cannot render an approval decision on a club being created".into(),
            ));
        }
        let active = changes.active.unwrap_or(false);
        return Ok(Transition {
            approved: None,
            approved_by: None,
            approved_on: None,
            ghost: false,
            active,
            needs_reapproval: false,
            approval_email_required: false,
            confirmation_email_required: active,
        });
    };

    let mut approved = prior.approved;
    let mut approved_by = prior.approved_by;
    let mut approved_on = prior.approved_on;
    let mut ghost = prior.ghost;
    let active = changes.active.unwrap_or(prior.active);

    let mut approval_email_required = false;

    // A sensitive edit by anyone without approval authority sends the club
    // back through review.
    let needs_reapproval = changes.touches_sensitive() && !actor.is_elevated;

    if needs_reapproval {
        approved = None;
        approved_by = None;
        approved_on = None;
        ghost = has_approved_snapshot;
    }

    match changes.approved {
        // Explicit revocation: clear the approver fields. Idempotent, and
        // independent of the reapproval reset above.
        Some(None) => {
            approved = None;
            approved_by = None;
            approved_on = None;
        }
        // A decision was rendered.
        Some(Some(decision)) => {
            if !actor.is_elevated {
                return Err(CoreError::Forbidden(
                    "You do not have permission to approve or reject clubs".into(),
                ));
            }
            if prior.approved.is_none() {
                // Pending -> decided: stamp who and when, exactly once.
                approved = Some(decision);
                approved_by = Some(actor.user_id);
                approved_on = Some(now);
                approval_email_required = true;
                if decision {
                    ghost = false;
                }
            } else {
                // Already decided: record the new value without re-stamping.
                approved = Some(decision);
            }
        }
        None => {}
    }

    Ok(Transition {
        approved,
        approved_by,
        approved_on,
        ghost,
        active,
        needs_reapproval,
        approval_email_required,
        confirmation_email_required: !prior.active && active,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACTOR_ID: DbId = 11;
    const APPROVER_ID: DbId = 99;

    fn officer() -> Actor {
        Actor::member(ACTOR_ID, crate::roles::ROLE_OFFICER)
    }

    fn approver() -> Actor {
        Actor::outsider(APPROVER_ID, true)
    }

    fn now() -> Timestamp {
        chrono::DateTime::parse_from_rfc3339("2026-03-01T12:00:00Z")
            .unwrap()
            .with_timezone(&chrono::Utc)
    }

    fn approved_state() -> ApprovalState {
        ApprovalState {
            approved: Some(true),
            approved_by: Some(APPROVER_ID),
            approved_on: Some(now()),
            ghost: false,
            active: true,
        }
    }

    fn pending_state() -> ApprovalState {
        ApprovalState {
            approved: None,
            approved_by: None,
            approved_on: None,
            ghost: false,
            active: false,
        }
    }

    fn name_edit() -> ClubChanges {
        ClubChanges {
            name: Some("Chess Society".to_string()),
            ..Default::default()
        }
    }

    // -----------------------------------------------------------------------
    // Creation
    // -----------------------------------------------------------------------

    #[test]
    fn test_creation_is_always_pending() {
        let t = plan_transition(None, &ClubChanges::default(), &officer(), false, now()).unwrap();
        assert_eq!(t.approved, None);
        assert_eq!(t.approved_by, None);
        assert!(!t.ghost);
        assert!(!t.needs_reapproval);
    }

    #[test]
    fn test_creation_by_elevated_actor_is_still_pending() {
        let t = plan_transition(None, &ClubChanges::default(), &approver(), false, now()).unwrap();
        assert_eq!(t.approved, None);
    }

    #[test]
    fn test_creation_with_decision_is_invalid() {
        let changes = ClubChanges {
            approved: Some(Some(true)),
            ..Default::default()
        };
        let result = plan_transition(None, &changes, &approver(), false, now());
        assert!(matches!(result, Err(CoreError::InvalidTransition(_))));
    }

    #[test]
    fn test_creation_active_fires_confirmation() {
        let changes = ClubChanges {
            active: Some(true),
            ..Default::default()
        };
        let t = plan_transition(None, &changes, &officer(), false, now()).unwrap();
        assert!(t.confirmation_email_required);
    }

    // -----------------------------------------------------------------------
    // Re-approval triggering
    // -----------------------------------------------------------------------

    #[test]
    fn test_sensitive_edit_resets_approval_and_ghosts() {
        let prior = approved_state();
        let t = plan_transition(Some(&prior), &name_edit(), &officer(), true, now()).unwrap();
        assert_eq!(t.approved, None);
        assert_eq!(t.approved_by, None);
        assert_eq!(t.approved_on, None);
        assert!(t.ghost);
        assert!(t.needs_reapproval);
        assert!(!t.approval_email_required);
        assert!(!t.confirmation_email_required);
    }

    #[test]
    fn test_description_edit_triggers_reapproval() {
        let changes = ClubChanges {
            description: Some("We play chess.".to_string()),
            ..Default::default()
        };
        let prior = approved_state();
        let t = plan_transition(Some(&prior), &changes, &officer(), true, now()).unwrap();
        assert_eq!(t.approved, None);
        assert!(t.ghost);
    }

    #[test]
    fn test_no_ghost_without_approved_history() {
        let prior = ApprovalState {
            approved: Some(false),
            ..pending_state()
        };
        let t = plan_transition(Some(&prior), &name_edit(), &officer(), false, now()).unwrap();
        assert_eq!(t.approved, None);
        assert!(!t.ghost);
        assert!(t.needs_reapproval);
    }

    #[test]
    fn test_elevated_edit_skips_reapproval() {
        let prior = approved_state();
        let t = plan_transition(Some(&prior), &name_edit(), &approver(), true, now()).unwrap();
        assert_eq!(t.approved, Some(true));
        assert_eq!(t.approved_by, Some(APPROVER_ID));
        assert!(!t.ghost);
        assert!(!t.needs_reapproval);
    }

    #[test]
    fn test_non_sensitive_edit_keeps_approval() {
        let changes = ClubChanges {
            active: Some(false),
            ..Default::default()
        };
        let prior = approved_state();
        let t = plan_transition(Some(&prior), &changes, &officer(), true, now()).unwrap();
        assert_eq!(t.approved, Some(true));
        assert!(!t.ghost);
        assert!(!t.needs_reapproval);
    }

    // -----------------------------------------------------------------------
    // Explicit revocation
    // -----------------------------------------------------------------------

    #[test]
    fn test_explicit_revocation_clears_approver_fields() {
        let changes = ClubChanges {
            approved: Some(None),
            ..Default::default()
        };
        let prior = approved_state();
        let t = plan_transition(Some(&prior), &changes, &approver(), true, now()).unwrap();
        assert_eq!(t.approved, None);
        assert_eq!(t.approved_by, None);
        assert_eq!(t.approved_on, None);
        assert!(!t.approval_email_required);
    }

    // -----------------------------------------------------------------------
    // Decisions
    // -----------------------------------------------------------------------

    #[test]
    fn test_approval_stamps_actor_and_time() {
        let changes = ClubChanges {
            approved: Some(Some(true)),
            ..Default::default()
        };
        let prior = ApprovalState {
            ghost: true,
            ..pending_state()
        };
        let t = plan_transition(Some(&prior), &changes, &approver(), true, now()).unwrap();
        assert_eq!(t.approved, Some(true));
        assert_eq!(t.approved_by, Some(APPROVER_ID));
        assert_eq!(t.approved_on, Some(now()));
        assert!(!t.ghost);
        assert!(t.approval_email_required);
    }

    #[test]
    fn test_rejection_stamps_but_keeps_ghost() {
        let changes = ClubChanges {
            approved: Some(Some(false)),
            ..Default::default()
        };
        let prior = ApprovalState {
            ghost: true,
            ..pending_state()
        };
        let t = plan_transition(Some(&prior), &changes, &approver(), true, now()).unwrap();
        assert_eq!(t.approved, Some(false));
        assert_eq!(t.approved_by, Some(APPROVER_ID));
        assert!(t.ghost);
        assert!(t.approval_email_required);
    }

    #[test]
    fn test_decision_by_non_elevated_actor_is_forbidden() {
        let changes = ClubChanges {
            approved: Some(Some(true)),
            ..Default::default()
        };
        let prior = pending_state();
        let result = plan_transition(Some(&prior), &changes, &officer(), false, now());
        assert!(matches!(result, Err(CoreError::Forbidden(_))));
    }

    #[test]
    fn test_reapproving_approved_club_does_not_restamp() {
        let earlier = chrono::DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&chrono::Utc);
        let prior = ApprovalState {
            approved: Some(true),
            approved_by: Some(7),
            approved_on: Some(earlier),
            ghost: false,
            active: true,
        };
        let changes = ClubChanges {
            approved: Some(Some(true)),
            ..Default::default()
        };
        let t = plan_transition(Some(&prior), &changes, &approver(), true, now()).unwrap();
        assert_eq!(t.approved, Some(true));
        assert_eq!(t.approved_by, Some(7));
        assert_eq!(t.approved_on, Some(earlier));
        assert!(!t.approval_email_required);
    }

    // -----------------------------------------------------------------------
    // Confirmation email
    // -----------------------------------------------------------------------

    #[test]
    fn test_activation_fires_confirmation() {
        let changes = ClubChanges {
            active: Some(true),
            ..Default::default()
        };
        let prior = pending_state();
        let t = plan_transition(Some(&prior), &changes, &officer(), false, now()).unwrap();
        assert!(t.confirmation_email_required);
        assert_eq!(t.approved, None);
    }

    #[test]
    fn test_already_active_club_does_not_refire_confirmation() {
        let changes = ClubChanges {
            active: Some(true),
            ..Default::default()
        };
        let prior = approved_state();
        let t = plan_transition(Some(&prior), &changes, &officer(), true, now()).unwrap();
        assert!(!t.confirmation_email_required);
    }

    // -----------------------------------------------------------------------
    // End-to-end workflow scenarios
    // -----------------------------------------------------------------------

    #[test]
    fn test_owner_name_edit_on_approved_club() {
        // Approved, non-ghosted club; non-elevated owner renames it.
        let prior = approved_state();
        let actor = Actor::member(ACTOR_ID, crate::roles::ROLE_OWNER);
        let t = plan_transition(Some(&prior), &name_edit(), &actor, true, now()).unwrap();
        assert_eq!(t.approved, None);
        assert_eq!(t.approved_by, None);
        assert_eq!(t.approved_on, None);
        assert!(t.ghost);
        assert!(t.needs_reapproval);
        assert!(!t.confirmation_email_required);
        assert_eq!(t.change_reason(false), "edit (reapproval required)");
    }

    #[test]
    fn test_approval_with_simultaneous_activation() {
        // Pending, inactive club approved and activated in one save.
        let changes = ClubChanges {
            approved: Some(Some(true)),
            active: Some(true),
            ..Default::default()
        };
        let prior = pending_state();
        let t = plan_transition(Some(&prior), &changes, &approver(), false, now()).unwrap();
        assert_eq!(t.approved, Some(true));
        assert_eq!(t.approved_by, Some(APPROVER_ID));
        assert_eq!(t.approved_on, Some(now()));
        assert!(!t.ghost);
        assert!(t.approval_email_required);
        assert!(t.confirmation_email_required);
        assert_eq!(t.change_reason(false), "approve");
    }

    #[test]
    fn test_change_reason_strings() {
        let t = plan_transition(None, &ClubChanges::default(), &officer(), false, now()).unwrap();
        assert_eq!(t.change_reason(true), "create");

        let prior = approved_state();
        let t = plan_transition(
            Some(&prior),
            &ClubChanges {
                active: Some(false),
                ..Default::default()
            },
            &officer(),
            true,
            now(),
        )
        .unwrap();
        assert_eq!(t.change_reason(false), "edit");

        let t = plan_transition(
            Some(&pending_state()),
            &ClubChanges {
                approved: Some(Some(false)),
                ..Default::default()
            },
            &approver(),
            false,
            now(),
        )
        .unwrap();
        assert_eq!(t.change_reason(false), "reject");
    }
}
