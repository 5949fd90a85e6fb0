//! Club audit snapshot model.
//!
//! Snapshots are immutable point-in-time copies of a club, appended on
//! every save and tagged with the approval state the save produced. The
//! most recent snapshot with `approved = TRUE` is what the public sees
//! while the club is ghosted.

use clubdeck_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `club_snapshots` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ClubSnapshot {
    pub id: DbId,
    pub club_id: DbId,
    pub name: String,
    pub subtitle: String,
    pub description: String,
    pub email: String,
    pub image_url: Option<String>,
    pub active: bool,
    pub approved: Option<bool>,
    pub approved_on: Option<Timestamp>,
    pub edit_summary: String,
    pub created_at: Timestamp,
}
