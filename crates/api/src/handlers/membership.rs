//! Handlers for club rosters.
//!
//! The guards (role hierarchy, last-owner protection, member field scope)
//! run inside the storage layer's transaction; these handlers resolve the
//! club, shape the responses, and keep membership privacy: entries marked
//! non-public are anonymized for viewers without standing.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use clubdeck_core::error::CoreError;
use clubdeck_core::roles::Role;
use clubdeck_core::types::DbId;
use clubdeck_db::models::club::Club;
use clubdeck_db::models::membership::{CreateMembership, RosterEntry, UpdateMembership};
use clubdeck_db::repositories::{ClubRepo, MembershipRepo};
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::auth::{AuthUser, MaybeAuthUser};
use crate::response::DataResponse;
use crate::state::AppState;

/// A roster entry as shown to a viewer. Non-public entries viewed without
/// standing carry no identity.
#[derive(Debug, Serialize)]
pub struct RosterMember {
    pub person_id: Option<DbId>,
    pub name: String,
    pub email: Option<String>,
    pub title: String,
    pub role: Role,
    pub active: bool,
    pub public: bool,
}

impl RosterMember {
    fn for_viewer(entry: &RosterEntry, privileged: bool) -> Self {
        if entry.public || privileged {
            Self {
                person_id: Some(entry.person_id),
                name: entry.full_name.clone(),
                email: privileged.then(|| entry.email.clone()),
                title: entry.title.clone(),
                role: entry.role,
                active: entry.active,
                public: entry.public,
            }
        } else {
            Self {
                person_id: None,
                name: "Anonymous".to_string(),
                email: None,
                title: entry.title.clone(),
                role: entry.role,
                active: entry.active,
                public: entry.public,
            }
        }
    }
}

async fn find_club(state: &AppState, code: &str) -> AppResult<Club> {
    ClubRepo::find_by_code(&state.pool, code)
        .await?
        .ok_or_else(|| {
            CoreError::NotFound {
                entity: "Club",
                key: code.to_string(),
            }
            .into()
        })
}

/// GET /api/v1/clubs/{code}/members
///
/// The club roster. Members and elevated viewers see identities and
/// emails; everyone else sees public entries only by name.
pub async fn list_members(
    MaybeAuthUser(auth): MaybeAuthUser,
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> AppResult<impl IntoResponse> {
    let club = find_club(&state, &code).await?;

    let privileged = match auth {
        Some(user) => {
            user.is_elevated
                || MembershipRepo::is_active_member(&state.pool, club.id, user.user_id).await?
        }
        None => false,
    };

    let roster = MembershipRepo::roster(&state.pool, club.id).await?;
    let members: Vec<RosterMember> = roster
        .iter()
        .map(|entry| RosterMember::for_viewer(entry, privileged))
        .collect();

    Ok(Json(DataResponse { data: members }))
}

/// POST /api/v1/clubs/{code}/members
///
/// Add a member. Officer standing (or elevation) required; the requested
/// role cannot exceed the caller's own.
pub async fn add_member(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(input): Json<CreateMembership>,
) -> AppResult<impl IntoResponse> {
    let club = find_club(&state, &code).await?;

    let membership = MembershipRepo::add_member(
        &state.pool,
        club.id,
        &input,
        auth.user_id,
        auth.is_elevated,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: membership })))
}

/// PATCH /api/v1/clubs/{code}/members/{person_id}
///
/// Update a membership. Role changes run the full hierarchy and last-owner
/// guards; ordinary members may only toggle their own visibility flags.
pub async fn update_member(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((code, person_id)): Path<(String, DbId)>,
    Json(patch): Json<UpdateMembership>,
) -> AppResult<impl IntoResponse> {
    let club = find_club(&state, &code).await?;

    let membership = MembershipRepo::update(
        &state.pool,
        club.id,
        person_id,
        &patch,
        auth.user_id,
        auth.is_elevated,
    )
    .await?;

    Ok(Json(DataResponse { data: membership }))
}

/// DELETE /api/v1/clubs/{code}/members/{person_id}
///
/// Remove a membership. A sole owner can neither leave nor be removed.
pub async fn remove_member(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((code, person_id)): Path<(String, DbId)>,
) -> AppResult<impl IntoResponse> {
    let club = find_club(&state, &code).await?;

    MembershipRepo::remove(&state.pool, club.id, person_id, auth.user_id, auth.is_elevated)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
