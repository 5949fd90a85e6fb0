//! Historical-snapshot fallback for unapproved clubs.
//!
//! A ghosted club (previously approved, edited, awaiting re-review) keeps
//! its public face: viewers without standing see the last approved snapshot
//! instead of the live row. The typed [`ClubView`] variant makes the two
//! cases impossible to confuse — a historical view carries the snapshot
//! type, not the mutable club row.

use crate::types::Viewer;

/// What a read request resolves to: the live club row, or an immutable
/// historical snapshot standing in for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClubView<C, S> {
    Live(C),
    Historical(S),
}

impl<C, S> ClubView<C, S> {
    /// Returns `true` if this view is a historical stand-in.
    pub fn is_historical(&self) -> bool {
        matches!(self, Self::Historical(_))
    }
}

/// Decide whether a viewer should be served a snapshot instead of the live
/// club.
///
/// Only ghosted, not-currently-approved clubs fall back, and only for
/// viewers who are neither elevated nor active members of the club.
pub fn needs_snapshot_fallback(ghost: bool, approved: Option<bool>, viewer: &Viewer) -> bool {
    if !ghost || approved == Some(true) {
        return false;
    }
    !(viewer.is_elevated || viewer.is_active_member)
}

/// Resolve a club read for a viewer.
///
/// `latest_approved` is the most recent snapshot tagged approved, fetched
/// by the storage layer only when the fallback decision requires it. A
/// ghosted club with no approved history has nothing to fall back to and is
/// served live.
pub fn resolve_for_viewer<C, S>(
    ghost: bool,
    approved: Option<bool>,
    viewer: &Viewer,
    club: C,
    latest_approved: Option<S>,
) -> ClubView<C, S> {
    if needs_snapshot_fallback(ghost, approved, viewer) {
        if let Some(snapshot) = latest_approved {
            return ClubView::Historical(snapshot);
        }
    }
    ClubView::Live(club)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PUBLIC: Viewer = Viewer {
        is_elevated: false,
        is_active_member: false,
    };
    const MEMBER: Viewer = Viewer {
        is_elevated: false,
        is_active_member: true,
    };
    const ELEVATED: Viewer = Viewer {
        is_elevated: true,
        is_active_member: false,
    };

    #[test]
    fn test_non_ghosted_club_never_falls_back() {
        assert!(!needs_snapshot_fallback(false, None, &PUBLIC));
        assert!(!needs_snapshot_fallback(false, Some(false), &PUBLIC));
    }

    #[test]
    fn test_approved_club_never_falls_back() {
        assert!(!needs_snapshot_fallback(true, Some(true), &PUBLIC));
    }

    #[test]
    fn test_ghosted_pending_club_falls_back_for_public() {
        assert!(needs_snapshot_fallback(true, None, &PUBLIC));
        assert!(needs_snapshot_fallback(true, Some(false), &PUBLIC));
    }

    #[test]
    fn test_members_and_elevated_always_see_live() {
        assert!(!needs_snapshot_fallback(true, None, &MEMBER));
        assert!(!needs_snapshot_fallback(true, None, &ELEVATED));
    }

    #[test]
    fn test_resolve_returns_snapshot_for_public() {
        let view = resolve_for_viewer(true, None, &PUBLIC, "live", Some("snapshot"));
        assert_eq!(view, ClubView::Historical("snapshot"));
        assert!(view.is_historical());
    }

    #[test]
    fn test_resolve_returns_live_without_history() {
        let view: ClubView<&str, &str> = resolve_for_viewer(true, None, &PUBLIC, "live", None);
        assert_eq!(view, ClubView::Live("live"));
        assert!(!view.is_historical());
    }

    #[test]
    fn test_resolve_returns_live_for_member_even_with_history() {
        let view = resolve_for_viewer(true, None, &MEMBER, "live", Some("snapshot"));
        assert_eq!(view, ClubView::Live("live"));
    }
}
