//! Club profile model and the storage-boundary diff.
//!
//! The update DTO distinguishes "field absent" from "field set to null"
//! with a nested `Option`, and [`UpdateClub::diff_against`] turns a patch
//! into the explicit [`ClubChanges`] set the approval state machine
//! consumes. The diff is computed here, once, against the locked row —
//! never re-derived downstream.

use clubdeck_core::approval::{ApprovalState, ClubChanges};
use clubdeck_core::types::{DbId, Timestamp};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;

/// A row from the `clubs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Club {
    pub id: DbId,
    pub code: String,
    pub name: String,
    pub subtitle: String,
    pub description: String,
    pub email: String,
    pub email_public: bool,
    pub image_url: Option<String>,
    pub website: Option<String>,
    pub facebook: Option<String>,
    pub twitter: Option<String>,
    pub instagram: Option<String>,
    pub linkedin: Option<String>,
    pub github: Option<String>,
    pub youtube: Option<String>,
    pub how_to_get_involved: String,
    pub active: bool,
    pub approved: Option<bool>,
    pub approved_by: Option<DbId>,
    pub approved_on: Option<Timestamp>,
    pub approved_comment: String,
    pub ghost: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Club {
    /// The stored approval-relevant state, as the state machine expects it.
    pub fn approval_state(&self) -> ApprovalState {
        ApprovalState {
            approved: self.approved,
            approved_by: self.approved_by,
            approved_on: self.approved_on,
            ghost: self.ghost,
            active: self.active,
        }
    }
}

/// DTO for creating a new club.
///
/// `code` is optional; when absent it is derived from the name.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateClub {
    pub name: String,
    pub code: Option<String>,
    #[serde(default)]
    pub subtitle: Option<String>,
    pub description: String,
    pub email: String,
    #[serde(default)]
    pub email_public: Option<bool>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub facebook: Option<String>,
    #[serde(default)]
    pub twitter: Option<String>,
    #[serde(default)]
    pub instagram: Option<String>,
    #[serde(default)]
    pub linkedin: Option<String>,
    #[serde(default)]
    pub github: Option<String>,
    #[serde(default)]
    pub youtube: Option<String>,
    #[serde(default)]
    pub how_to_get_involved: Option<String>,
    #[serde(default)]
    pub active: Option<bool>,
}

/// DTO for patching a club.
///
/// Plain `Option` fields are "absent or value". Nullable columns use a
/// nested `Option` so an explicit JSON `null` (clear the field) survives
/// deserialization; `double_option` wraps any present value, including
/// null, in the outer `Some`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateClub {
    pub name: Option<String>,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    pub email: Option<String>,
    pub email_public: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    pub image_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub website: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub facebook: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub twitter: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub instagram: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub linkedin: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub github: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub youtube: Option<Option<String>>,
    pub how_to_get_involved: Option<String>,
    pub active: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    pub approved: Option<Option<bool>>,
    pub approved_comment: Option<String>,
}

fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

impl UpdateClub {
    /// Compute the explicit field diff of this patch against a stored row.
    ///
    /// Fields equal to the stored value are dropped, so downstream logic
    /// (re-approval triggering, idempotent approval) only ever sees real
    /// changes. `code` is identity and is never diffed.
    pub fn diff_against(&self, club: &Club) -> ClubChanges {
        fn changed<T: Clone + PartialEq>(patch: &Option<T>, stored: &T) -> Option<T> {
            match patch {
                Some(value) if value != stored => Some(value.clone()),
                _ => None,
            }
        }

        ClubChanges {
            name: changed(&self.name, &club.name),
            subtitle: changed(&self.subtitle, &club.subtitle),
            description: changed(&self.description, &club.description),
            email: changed(&self.email, &club.email),
            email_public: changed(&self.email_public, &club.email_public),
            image_url: changed(&self.image_url, &club.image_url),
            website: changed(&self.website, &club.website),
            facebook: changed(&self.facebook, &club.facebook),
            twitter: changed(&self.twitter, &club.twitter),
            instagram: changed(&self.instagram, &club.instagram),
            linkedin: changed(&self.linkedin, &club.linkedin),
            github: changed(&self.github, &club.github),
            youtube: changed(&self.youtube, &club.youtube),
            how_to_get_involved: changed(&self.how_to_get_involved, &club.how_to_get_involved),
            active: changed(&self.active, &club.active),
            approved: changed(&self.approved, &club.approved),
            approved_comment: changed(&self.approved_comment, &club.approved_comment),
        }
    }
}

/// List-page projection of a club.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ClubSummary {
    pub code: String,
    pub name: String,
    pub subtitle: String,
    pub image_url: Option<String>,
    pub active: bool,
    pub approved: Option<bool>,
    pub membership_count: i64,
}
