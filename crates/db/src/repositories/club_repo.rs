//! Repository for the `clubs` table.
//!
//! Club mutations are guarded saves: the row is locked `FOR UPDATE`, the
//! field diff and approval transition are computed against the locked
//! state, and the update plus its audit snapshot commit atomically. Two
//! concurrent edits to the same club serialize on the row lock, so the
//! re-approval comparison and the owner-count reads never see a torn
//! state.

use clubdeck_core::approval::{plan_transition, Transition};
use clubdeck_core::error::CoreError;
use clubdeck_core::roles::{self, Role, ROLE_OFFICER, ROLE_OWNER};
use clubdeck_core::types::{Actor, DbId, Timestamp};
use sqlx::{PgConnection, PgPool};

use crate::models::club::{Club, ClubSummary, CreateClub, UpdateClub};
use crate::repositories::snapshot_repo::SnapshotRepo;
use crate::SaveError;

/// Column list for clubs queries.
const COLUMNS: &str = "id, code, name, subtitle, description, email, email_public, \
    image_url, website, facebook, twitter, instagram, linkedin, github, youtube, \
    how_to_get_involved, active, approved, approved_by, approved_on, approved_comment, \
    ghost, created_at, updated_at";

/// Provides guarded save and lookup operations for clubs.
pub struct ClubRepo;

impl ClubRepo {
    /// Find a club by its code.
    pub async fn find_by_code(pool: &PgPool, code: &str) -> Result<Option<Club>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM clubs WHERE code = $1");
        sqlx::query_as::<_, Club>(&query)
            .bind(code)
            .fetch_optional(pool)
            .await
    }

    /// List clubs visible in the public directory: active, and either
    /// currently approved or ghosted (the ghost's public face is its last
    /// approved snapshot).
    pub async fn list_visible(pool: &PgPool) -> Result<Vec<ClubSummary>, sqlx::Error> {
        sqlx::query_as::<_, ClubSummary>(
            "SELECT c.code, c.name, c.subtitle, c.image_url, c.active, c.approved,
                    COUNT(m.id) AS membership_count
             FROM clubs c
             LEFT JOIN memberships m ON m.club_id = c.id AND m.active = true
             WHERE c.active = true AND (c.approved = true OR c.ghost = true)
             GROUP BY c.id
             ORDER BY c.name ASC",
        )
        .fetch_all(pool)
        .await
    }

    /// List every club, for elevated viewers working the review queue.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<ClubSummary>, sqlx::Error> {
        sqlx::query_as::<_, ClubSummary>(
            "SELECT c.code, c.name, c.subtitle, c.image_url, c.active, c.approved,
                    COUNT(m.id) AS membership_count
             FROM clubs c
             LEFT JOIN memberships m ON m.club_id = c.id AND m.active = true
             GROUP BY c.id
             ORDER BY c.name ASC",
        )
        .fetch_all(pool)
        .await
    }

    /// List active clubs awaiting a decision, oldest submission first —
    /// the review queue.
    pub async fn list_pending(pool: &PgPool) -> Result<Vec<ClubSummary>, sqlx::Error> {
        sqlx::query_as::<_, ClubSummary>(
            "SELECT c.code, c.name, c.subtitle, c.image_url, c.active, c.approved,
                    COUNT(m.id) AS membership_count
             FROM clubs c
             LEFT JOIN memberships m ON m.club_id = c.id AND m.active = true
             WHERE c.active = true AND c.approved IS NULL
             GROUP BY c.id
             ORDER BY c.updated_at ASC",
        )
        .fetch_all(pool)
        .await
    }

    /// Create a club.
    ///
    /// Runs as one transaction: the club row (always pending), the
    /// creator's owner membership, and the first audit snapshot commit
    /// together or not at all.
    pub async fn create(
        pool: &PgPool,
        input: &CreateClub,
        code: &str,
        creator_id: DbId,
    ) -> Result<Club, SaveError> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO clubs
                (code, name, subtitle, description, email, email_public, image_url,
                 website, facebook, twitter, instagram, linkedin, github, youtube,
                 how_to_get_involved, active)
             VALUES ($1, $2, COALESCE($3, ''), $4, $5, COALESCE($6, true), $7,
                     $8, $9, $10, $11, $12, $13, $14, COALESCE($15, ''), COALESCE($16, false))
             RETURNING {COLUMNS}"
        );
        let club = sqlx::query_as::<_, Club>(&query)
            .bind(code)
            .bind(&input.name)
            .bind(&input.subtitle)
            .bind(&input.description)
            .bind(&input.email)
            .bind(input.email_public)
            .bind(&input.image_url)
            .bind(&input.website)
            .bind(&input.facebook)
            .bind(&input.twitter)
            .bind(&input.instagram)
            .bind(&input.linkedin)
            .bind(&input.github)
            .bind(&input.youtube)
            .bind(&input.how_to_get_involved)
            .bind(input.active)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO memberships (person_id, club_id, title, role)
             VALUES ($1, $2, 'Founder', $3)",
        )
        .bind(creator_id)
        .bind(club.id)
        .bind(ROLE_OWNER)
        .execute(&mut *tx)
        .await?;

        SnapshotRepo::append(&mut tx, &club, "create").await?;

        tx.commit().await?;
        Ok(club)
    }

    /// Apply a patch to a club under its approval state machine.
    ///
    /// Locks the club row, resolves the actor's membership role from the
    /// current roster, computes the field diff, runs the transition, then
    /// persists the result and its snapshot atomically. Returns the saved
    /// club together with the transition so the caller can dispatch
    /// notifications after commit.
    pub async fn save_with_snapshot(
        pool: &PgPool,
        code: &str,
        patch: &UpdateClub,
        user_id: DbId,
        is_elevated: bool,
        now: Timestamp,
    ) -> Result<(Club, Transition), SaveError> {
        let mut tx = pool.begin().await?;

        let club = Self::find_for_update(&mut tx, code)
            .await?
            .ok_or_else(|| CoreError::NotFound {
                entity: "Club",
                key: code.to_string(),
            })?;

        let role = Self::membership_role(&mut tx, club.id, user_id).await?;
        let actor = Actor {
            user_id,
            is_elevated,
            role,
        };

        // Officers and above edit the club; elevated users always may.
        if !actor.is_elevated {
            let authorized = actor
                .role
                .is_some_and(|r| roles::is_at_least(r, ROLE_OFFICER));
            if !authorized {
                return Err(CoreError::Forbidden(
                    "You must be an officer of this club to edit it".into(),
                )
                .into());
            }
        }

        let changes = patch.diff_against(&club);
        let has_approved_snapshot = SnapshotRepo::has_approved(&mut tx, club.id).await?;
        let transition = plan_transition(
            Some(&club.approval_state()),
            &changes,
            &actor,
            has_approved_snapshot,
            now,
        )?;

        let saved = Self::apply(&mut tx, &club, patch, &transition).await?;
        SnapshotRepo::append(&mut tx, &saved, transition.change_reason(false)).await?;

        tx.commit().await?;

        tracing::info!(
            club = %saved.code,
            user_id = user_id,
            needs_reapproval = transition.needs_reapproval,
            approved = ?saved.approved,
            ghost = saved.ghost,
            "Club saved"
        );

        Ok((saved, transition))
    }

    /// Lock and fetch a club row by code.
    async fn find_for_update(
        conn: &mut PgConnection,
        code: &str,
    ) -> Result<Option<Club>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM clubs WHERE code = $1 FOR UPDATE");
        sqlx::query_as::<_, Club>(&query)
            .bind(code)
            .fetch_optional(&mut *conn)
            .await
    }

    /// The caller's active membership role in the club, read under the
    /// same transaction so authority is never stale.
    async fn membership_role(
        conn: &mut PgConnection,
        club_id: DbId,
        user_id: DbId,
    ) -> Result<Option<Role>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT role FROM memberships
             WHERE club_id = $1 AND person_id = $2 AND active = true",
        )
        .bind(club_id)
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await
    }

    /// Write the patched content fields and the transition's approval
    /// fields. New values are computed in Rust against the locked row, so
    /// the statement is static and "set to NULL" patches are expressible.
    async fn apply(
        conn: &mut PgConnection,
        club: &Club,
        patch: &UpdateClub,
        transition: &Transition,
    ) -> Result<Club, sqlx::Error> {
        fn pick<T: Clone>(patch: &Option<T>, stored: &T) -> T {
            patch.as_ref().cloned().unwrap_or_else(|| stored.clone())
        }

        let query = format!(
            "UPDATE clubs SET
                name = $2, subtitle = $3, description = $4, email = $5,
                email_public = $6, image_url = $7, website = $8, facebook = $9,
                twitter = $10, instagram = $11, linkedin = $12, github = $13,
                youtube = $14, how_to_get_involved = $15, active = $16,
                approved = $17, approved_by = $18, approved_on = $19,
                approved_comment = $20, ghost = $21, updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Club>(&query)
            .bind(club.id)
            .bind(pick(&patch.name, &club.name))
            .bind(pick(&patch.subtitle, &club.subtitle))
            .bind(pick(&patch.description, &club.description))
            .bind(pick(&patch.email, &club.email))
            .bind(pick(&patch.email_public, &club.email_public))
            .bind(pick(&patch.image_url, &club.image_url))
            .bind(pick(&patch.website, &club.website))
            .bind(pick(&patch.facebook, &club.facebook))
            .bind(pick(&patch.twitter, &club.twitter))
            .bind(pick(&patch.instagram, &club.instagram))
            .bind(pick(&patch.linkedin, &club.linkedin))
            .bind(pick(&patch.github, &club.github))
            .bind(pick(&patch.youtube, &club.youtube))
            .bind(pick(&patch.how_to_get_involved, &club.how_to_get_involved))
            .bind(transition.active)
            .bind(transition.approved)
            .bind(transition.approved_by)
            .bind(transition.approved_on)
            .bind(pick(&patch.approved_comment, &club.approved_comment))
            .bind(transition.ghost)
            .fetch_one(&mut *conn)
            .await
    }
}
