//! Repository for the `club_snapshots` table.
//!
//! Snapshots are append-only: created in the same transaction as the club
//! save they record, never updated or deleted here.

use clubdeck_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::club::Club;
use crate::models::snapshot::ClubSnapshot;

/// Column list for club_snapshots queries.
const COLUMNS: &str = "id, club_id, name, subtitle, description, email, image_url, \
    active, approved, approved_on, edit_summary, created_at";

/// Provides append and lookup operations for club audit snapshots.
pub struct SnapshotRepo;

impl SnapshotRepo {
    /// Append a snapshot of the club as it stands after a save.
    ///
    /// Takes a transaction connection: the append must commit or roll back
    /// together with the club save it records.
    pub async fn append(
        conn: &mut PgConnection,
        club: &Club,
        edit_summary: &str,
    ) -> Result<ClubSnapshot, sqlx::Error> {
        let query = format!(
            "INSERT INTO club_snapshots
                (club_id, name, subtitle, description, email, image_url, active,
                 approved, approved_on, edit_summary)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ClubSnapshot>(&query)
            .bind(club.id)
            .bind(&club.name)
            .bind(&club.subtitle)
            .bind(&club.description)
            .bind(&club.email)
            .bind(&club.image_url)
            .bind(club.active)
            .bind(club.approved)
            .bind(club.approved_on)
            .bind(edit_summary)
            .fetch_one(&mut *conn)
            .await
    }

    /// Whether any snapshot of this club is tagged approved. Read inside
    /// the save transaction to decide ghosting.
    pub async fn has_approved(conn: &mut PgConnection, club_id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM club_snapshots WHERE club_id = $1 AND approved = true)",
        )
        .bind(club_id)
        .fetch_one(&mut *conn)
        .await
    }

    /// The most recent approved snapshot of a club, if any — what the
    /// public sees while the club is ghosted.
    pub async fn latest_approved(
        pool: &PgPool,
        club_id: DbId,
    ) -> Result<Option<ClubSnapshot>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM club_snapshots
             WHERE club_id = $1 AND approved = true
             ORDER BY created_at DESC, id DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, ClubSnapshot>(&query)
            .bind(club_id)
            .fetch_optional(pool)
            .await
    }

    /// List all snapshots for a club, newest first.
    pub async fn list_for_club(
        pool: &PgPool,
        club_id: DbId,
    ) -> Result<Vec<ClubSnapshot>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM club_snapshots
             WHERE club_id = $1
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, ClubSnapshot>(&query)
            .bind(club_id)
            .fetch_all(pool)
            .await
    }
}
