//! Notification policy for club saves.
//!
//! Maps the outcome of an approval transition to the notifications that
//! should be dispatched after commit. Pure decision only — delivery lives
//! in the events crate and failures there never unwind a committed save.

use crate::approval::Transition;

/// Notifications a club save can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClubNotification {
    /// The club was activated and is queued for review.
    Confirmation,
    /// An approver accepted the club.
    ApprovalGranted,
    /// An approver rejected the club.
    ApprovalRejected,
}

impl ClubNotification {
    /// The mail template rendered for this notification.
    pub fn template(&self) -> &'static str {
        match self {
            Self::Confirmation => "club_confirmation",
            Self::ApprovalGranted => "club_approved",
            Self::ApprovalRejected => "club_rejected",
        }
    }

    /// The event type published on the bus for this notification.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Confirmation => "club.submitted",
            Self::ApprovalGranted => "club.approved",
            Self::ApprovalRejected => "club.rejected",
        }
    }
}

/// Decide which notifications a completed transition requires.
///
/// A decision email (granted or rejected, mutually exclusive) and the
/// activation confirmation are independent: a save that approves a club and
/// flips it active fires both.
pub fn notifications_for(transition: &Transition) -> Vec<ClubNotification> {
    let mut out = Vec::new();
    if transition.confirmation_email_required {
        out.push(ClubNotification::Confirmation);
    }
    if transition.approval_email_required {
        if transition.approved == Some(true) {
            out.push(ClubNotification::ApprovalGranted);
        } else {
            out.push(ClubNotification::ApprovalRejected);
        }
    }
    out
}
