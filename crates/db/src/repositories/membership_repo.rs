//! Repository for the `memberships` table.
//!
//! Roster mutations run under the membership guards with the parent club
//! row locked, so the owner count the guards read cannot race a concurrent
//! edit (the last-owner invariant holds even under simultaneous
//! departures).

use clubdeck_core::error::CoreError;
use clubdeck_core::membership::{
    validate_field_scope, validate_removal, validate_role_change, TargetMembership,
};
use clubdeck_core::roles::{Role, ROLE_MEMBER, ROLE_OWNER};
use clubdeck_core::types::{Actor, DbId};
use sqlx::{PgConnection, PgPool};

use crate::models::membership::{CreateMembership, Membership, RosterEntry, UpdateMembership};
use crate::SaveError;

/// Column list for memberships queries.
const COLUMNS: &str = "id, person_id, club_id, title, role, active, public, \
    created_at, updated_at";

/// Provides guarded roster operations.
pub struct MembershipRepo;

impl MembershipRepo {
    /// Find a member's entry in a club.
    pub async fn find(
        pool: &PgPool,
        club_id: DbId,
        person_id: DbId,
    ) -> Result<Option<Membership>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM memberships WHERE club_id = $1 AND person_id = $2"
        );
        sqlx::query_as::<_, Membership>(&query)
            .bind(club_id)
            .bind(person_id)
            .fetch_optional(pool)
            .await
    }

    /// Whether a user is an active member of a club (the snapshot
    /// resolver's viewer check).
    pub async fn is_active_member(
        pool: &PgPool,
        club_id: DbId,
        person_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM memberships
             WHERE club_id = $1 AND person_id = $2 AND active = true)",
        )
        .bind(club_id)
        .bind(person_id)
        .fetch_one(pool)
        .await
    }

    /// The club roster joined with member identities, most senior first.
    pub async fn roster(pool: &PgPool, club_id: DbId) -> Result<Vec<RosterEntry>, sqlx::Error> {
        sqlx::query_as::<_, RosterEntry>(
            "SELECT m.person_id, u.full_name, u.email, m.title, m.role, m.active, m.public
             FROM memberships m
             JOIN users u ON u.id = m.person_id
             WHERE m.club_id = $1
             ORDER BY m.role ASC, u.full_name ASC",
        )
        .bind(club_id)
        .fetch_all(pool)
        .await
    }

    /// Email addresses of the club's active officers and owners — the
    /// recipients of workflow notifications.
    pub async fn officer_emails(pool: &PgPool, club_id: DbId) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT u.email FROM memberships m
             JOIN users u ON u.id = m.person_id
             WHERE m.club_id = $1 AND m.role <= $2 AND m.active = true AND u.is_active = true
             ORDER BY u.email ASC",
        )
        .bind(club_id)
        .bind(clubdeck_core::roles::ROLE_OFFICER)
        .fetch_all(pool)
        .await
    }

    /// Number of active owner-tier memberships in a club. Callers that
    /// feed this into a guard must hold the club row lock.
    pub async fn count_owners(conn: &mut PgConnection, club_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM memberships
             WHERE club_id = $1 AND role <= $2 AND active = true",
        )
        .bind(club_id)
        .bind(ROLE_OWNER)
        .fetch_one(&mut *conn)
        .await
    }

    /// Add a member to a club.
    ///
    /// The requested role passes through the role-change guard, so a caller
    /// cannot seat someone above their own authority.
    pub async fn add_member(
        pool: &PgPool,
        club_id: DbId,
        input: &CreateMembership,
        user_id: DbId,
        is_elevated: bool,
    ) -> Result<Membership, SaveError> {
        let mut tx = pool.begin().await?;

        Self::lock_club(&mut tx, club_id).await?;
        let actor = Self::actor(&mut tx, club_id, user_id, is_elevated).await?;

        let requested = input.role.unwrap_or(ROLE_MEMBER);
        let owner_count = Self::count_owners(&mut tx, club_id).await?;
        // A new entry is its own target: the guard's sole-owner clause is
        // vacuous here, the authority clauses are not.
        let target = TargetMembership {
            person_id: input.person_id,
            role: requested,
        };
        let role = validate_role_change(&actor, &target, requested, owner_count)?;

        let query = format!(
            "INSERT INTO memberships (person_id, club_id, title, role)
             VALUES ($1, $2, COALESCE($3, 'Member'), $4)
             RETURNING {COLUMNS}"
        );
        let membership = sqlx::query_as::<_, Membership>(&query)
            .bind(input.person_id)
            .bind(club_id)
            .bind(&input.title)
            .bind(role)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            club_id = club_id,
            person_id = input.person_id,
            role = role,
            "Member added"
        );

        Ok(membership)
    }

    /// Patch a membership under the field-scope and role-change guards.
    pub async fn update(
        pool: &PgPool,
        club_id: DbId,
        person_id: DbId,
        patch: &UpdateMembership,
        user_id: DbId,
        is_elevated: bool,
    ) -> Result<Membership, SaveError> {
        let mut tx = pool.begin().await?;

        Self::lock_club(&mut tx, club_id).await?;
        let actor = Self::actor(&mut tx, club_id, user_id, is_elevated).await?;

        let target = Self::find_in_tx(&mut tx, club_id, person_id)
            .await?
            .ok_or_else(|| CoreError::NotFound {
                entity: "Membership",
                key: person_id.to_string(),
            })?;

        validate_field_scope(&actor, person_id, &patch.changed_fields())?;

        let role = match patch.role {
            Some(requested) => {
                let owner_count = Self::count_owners(&mut tx, club_id).await?;
                let target_ref = TargetMembership {
                    person_id: target.person_id,
                    role: target.role,
                };
                validate_role_change(&actor, &target_ref, requested, owner_count)?
            }
            None => target.role,
        };

        let query = format!(
            "UPDATE memberships SET
                title = COALESCE($3, title),
                role = $4,
                active = COALESCE($5, active),
                public = COALESCE($6, public),
                updated_at = NOW()
             WHERE club_id = $1 AND person_id = $2
             RETURNING {COLUMNS}"
        );
        let membership = sqlx::query_as::<_, Membership>(&query)
            .bind(club_id)
            .bind(person_id)
            .bind(&patch.title)
            .bind(role)
            .bind(patch.active)
            .bind(patch.public)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(membership)
    }

    /// Remove a membership under the removal guard.
    pub async fn remove(
        pool: &PgPool,
        club_id: DbId,
        person_id: DbId,
        user_id: DbId,
        is_elevated: bool,
    ) -> Result<(), SaveError> {
        let mut tx = pool.begin().await?;

        Self::lock_club(&mut tx, club_id).await?;
        let actor = Self::actor(&mut tx, club_id, user_id, is_elevated).await?;

        let target = Self::find_in_tx(&mut tx, club_id, person_id)
            .await?
            .ok_or_else(|| CoreError::NotFound {
                entity: "Membership",
                key: person_id.to_string(),
            })?;

        let owner_count = Self::count_owners(&mut tx, club_id).await?;
        let target_ref = TargetMembership {
            person_id: target.person_id,
            role: target.role,
        };
        validate_removal(&actor, &target_ref, owner_count)?;

        sqlx::query("DELETE FROM memberships WHERE club_id = $1 AND person_id = $2")
            .bind(club_id)
            .bind(person_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(club_id = club_id, person_id = person_id, "Member removed");

        Ok(())
    }

    /// Lock the parent club row. All roster mutations serialize on this.
    async fn lock_club(conn: &mut PgConnection, club_id: DbId) -> Result<(), SaveError> {
        let found: Option<DbId> = sqlx::query_scalar("SELECT id FROM clubs WHERE id = $1 FOR UPDATE")
            .bind(club_id)
            .fetch_optional(&mut *conn)
            .await?;
        match found {
            Some(_) => Ok(()),
            None => Err(CoreError::NotFound {
                entity: "Club",
                key: club_id.to_string(),
            }
            .into()),
        }
    }

    /// Resolve the acting user against the current roster, inside the
    /// transaction.
    async fn actor(
        conn: &mut PgConnection,
        club_id: DbId,
        user_id: DbId,
        is_elevated: bool,
    ) -> Result<Actor, sqlx::Error> {
        let role: Option<Role> = sqlx::query_scalar(
            "SELECT role FROM memberships
             WHERE club_id = $1 AND person_id = $2 AND active = true",
        )
        .bind(club_id)
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await?;
        Ok(Actor {
            user_id,
            is_elevated,
            role,
        })
    }

    async fn find_in_tx(
        conn: &mut PgConnection,
        club_id: DbId,
        person_id: DbId,
    ) -> Result<Option<Membership>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM memberships
             WHERE club_id = $1 AND person_id = $2 FOR UPDATE"
        );
        sqlx::query_as::<_, Membership>(&query)
            .bind(club_id)
            .bind(person_id)
            .fetch_optional(&mut *conn)
            .await
    }
}
