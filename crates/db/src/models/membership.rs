//! Membership (roster entry) model.

use clubdeck_core::roles::Role;
use clubdeck_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `memberships` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Membership {
    pub id: DbId,
    pub person_id: DbId,
    pub club_id: DbId,
    pub title: String,
    pub role: Role,
    pub active: bool,
    pub public: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A roster entry joined with the member's identity, for listing.
///
/// `full_name` and `email` are the raw values; the api layer anonymizes
/// them when `public` is false and the viewer has no standing.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RosterEntry {
    pub person_id: DbId,
    pub full_name: String,
    pub email: String,
    pub title: String,
    pub role: Role,
    pub active: bool,
    pub public: bool,
}

/// DTO for adding a member to a club.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateMembership {
    pub person_id: DbId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
}

/// DTO for patching a membership.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateMembership {
    pub title: Option<String>,
    pub role: Option<Role>,
    pub active: Option<bool>,
    pub public: Option<bool>,
}

impl UpdateMembership {
    /// Names of the fields present in this patch, for the field-scope guard.
    pub fn changed_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.title.is_some() {
            fields.push("title");
        }
        if self.role.is_some() {
            fields.push("role");
        }
        if self.active.is_some() {
            fields.push("active");
        }
        if self.public.is_some() {
            fields.push("public");
        }
        fields
    }
}
