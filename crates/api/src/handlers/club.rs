//! Handlers for the club approval workflow.
//!
//! Reads resolve through the snapshot fallback: a ghosted club is shown to
//! the public as its last approved snapshot, while members and elevated
//! viewers see the live row. Writes go through the guarded save in the
//! storage layer; the resulting transition decides which notification
//! events are published after the transaction commits.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;

use clubdeck_core::error::CoreError;
use clubdeck_core::notify::notifications_for;
use clubdeck_core::snapshot::{resolve_for_viewer, ClubView};
use clubdeck_core::types::{Timestamp, Viewer};
use clubdeck_core::validation;
use clubdeck_db::models::club::{Club, CreateClub, UpdateClub};
use clubdeck_db::models::snapshot::ClubSnapshot;
use clubdeck_db::repositories::{ClubRepo, MembershipRepo, SnapshotRepo, UserRepo};
use clubdeck_events::PlatformEvent;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::{AuthUser, MaybeAuthUser, RequireElevated};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Response shape
// ---------------------------------------------------------------------------

/// Full club representation returned by the detail endpoint.
///
/// Built from the live row or, for ghosted clubs viewed without standing,
/// from the last approved snapshot (`is_historical = true`; fields the
/// snapshot does not carry are omitted).
#[derive(Debug, Serialize)]
pub struct ClubDetail {
    pub code: String,
    pub name: String,
    pub subtitle: String,
    pub description: String,
    pub email: Option<String>,
    pub image_url: Option<String>,
    pub website: Option<String>,
    pub facebook: Option<String>,
    pub twitter: Option<String>,
    pub instagram: Option<String>,
    pub linkedin: Option<String>,
    pub github: Option<String>,
    pub youtube: Option<String>,
    pub how_to_get_involved: Option<String>,
    pub active: bool,
    pub approved: Option<bool>,
    pub approved_on: Option<Timestamp>,
    pub approved_comment: Option<String>,
    /// Approver's name; only present for elevated viewers.
    pub approved_by_name: Option<String>,
    pub is_ghost: bool,
    pub is_historical: bool,
}

impl ClubDetail {
    fn from_live(club: &Club, viewer: &Viewer) -> Self {
        let privileged = viewer.is_elevated || viewer.is_active_member;
        Self {
            code: club.code.clone(),
            name: club.name.clone(),
            subtitle: club.subtitle.clone(),
            description: club.description.clone(),
            email: (club.email_public || privileged).then(|| club.email.clone()),
            image_url: club.image_url.clone(),
            website: club.website.clone(),
            facebook: club.facebook.clone(),
            twitter: club.twitter.clone(),
            instagram: club.instagram.clone(),
            linkedin: club.linkedin.clone(),
            github: club.github.clone(),
            youtube: club.youtube.clone(),
            how_to_get_involved: Some(club.how_to_get_involved.clone()),
            active: club.active,
            approved: club.approved,
            approved_on: club.approved_on,
            approved_comment: viewer
                .is_elevated
                .then(|| club.approved_comment.clone()),
            approved_by_name: None,
            is_ghost: club.ghost,
            is_historical: false,
        }
    }

    fn from_snapshot(code: &str, snapshot: &ClubSnapshot) -> Self {
        Self {
            code: code.to_string(),
            name: snapshot.name.clone(),
            subtitle: snapshot.subtitle.clone(),
            description: snapshot.description.clone(),
            email: Some(snapshot.email.clone()),
            image_url: snapshot.image_url.clone(),
            website: None,
            facebook: None,
            twitter: None,
            instagram: None,
            linkedin: None,
            github: None,
            youtube: None,
            how_to_get_involved: None,
            active: snapshot.active,
            approved: snapshot.approved,
            approved_on: snapshot.approved_on,
            approved_comment: None,
            approved_by_name: None,
            is_ghost: true,
            is_historical: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

fn bad(msg: String) -> AppError {
    AppError::Core(CoreError::Validation(msg))
}

/// Clean up a creation request in place.
fn normalize_create(input: &mut CreateClub) -> AppResult<()> {
    input.name = input.name.trim().to_string();
    if input.name.is_empty() {
        return Err(bad("You must enter a name for your club".into()));
    }
    input.description = validation::validate_description(&input.description).map_err(bad)?;
    input.email = validation::validate_contact_email(&input.email).map_err(bad)?;
    if let Some(website) = &input.website {
        input.website = Some(validation::normalize_website(website).map_err(bad)?);
    }
    normalize_socials(
        [
            (&mut input.facebook, validation::social::facebook as fn(&str) -> String),
            (&mut input.twitter, validation::social::twitter),
            (&mut input.instagram, validation::social::instagram),
            (&mut input.linkedin, validation::social::linkedin),
            (&mut input.github, validation::social::github),
            (&mut input.youtube, validation::social::youtube),
        ]
        .into_iter(),
    );
    Ok(())
}

fn normalize_socials<'a>(
    fields: impl Iterator<Item = (&'a mut Option<String>, fn(&str) -> String)>,
) {
    for (field, normalize) in fields {
        if let Some(value) = field.as_deref() {
            *field = Some(normalize(value));
        }
    }
}

/// Clean up a patch in place.
fn normalize_update(patch: &mut UpdateClub) -> AppResult<()> {
    if let Some(name) = &patch.name {
        let trimmed = name.trim().to_string();
        if trimmed.is_empty() {
            return Err(bad("You must enter a name for your club".into()));
        }
        patch.name = Some(trimmed);
    }
    if let Some(description) = &patch.description {
        patch.description = Some(validation::validate_description(description).map_err(bad)?);
    }
    if let Some(email) = &patch.email {
        patch.email = Some(validation::validate_contact_email(email).map_err(bad)?);
    }
    if let Some(Some(website)) = &patch.website {
        patch.website = Some(Some(validation::normalize_website(website).map_err(bad)?));
    }

    fn social_patch(field: &mut Option<Option<String>>, normalize: fn(&str) -> String) {
        if let Some(Some(value)) = field.as_ref() {
            *field = Some(Some(normalize(value)));
        }
    }
    social_patch(&mut patch.facebook, validation::social::facebook);
    social_patch(&mut patch.twitter, validation::social::twitter);
    social_patch(&mut patch.instagram, validation::social::instagram);
    social_patch(&mut patch.linkedin, validation::social::linkedin);
    social_patch(&mut patch.github, validation::social::github);
    social_patch(&mut patch.youtube, validation::social::youtube);

    Ok(())
}

// ---------------------------------------------------------------------------
// Event publication
// ---------------------------------------------------------------------------

/// Publish the notification events a committed transition requires.
///
/// Runs strictly after commit; the bus and the mail delivery behind it can
/// fail without affecting the saved state.
fn publish_transition_events(
    state: &AppState,
    club: &Club,
    transition: &clubdeck_core::approval::Transition,
    actor_user_id: clubdeck_core::types::DbId,
    had_approved_history: bool,
) {
    for notification in notifications_for(transition) {
        let event = PlatformEvent::new(notification.event_type())
            .with_club(club.code.clone(), club.id)
            .with_actor(actor_user_id)
            .with_payload(serde_json::json!({
                "template": notification.template(),
                "club_name": club.name,
                "comment": club.approved_comment,
                "previous_state": if had_approved_history { "approved" } else { "pending" },
            }));
        state.event_bus.publish(event);
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/clubs
///
/// Create a club. The creator becomes its owner; the club always starts
/// pending review, regardless of who creates it.
pub async fn create_club(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(mut input): Json<CreateClub>,
) -> AppResult<impl IntoResponse> {
    normalize_create(&mut input)?;

    let code = match &input.code {
        Some(code) => validation::slugify(code),
        None => validation::slugify(&input.name),
    };
    if code.is_empty() {
        return Err(bad("The club name must contain at least one letter or digit".into()));
    }

    // The creation transition: always pending; flags the confirmation email
    // when the club starts out active.
    let changes = clubdeck_core::approval::ClubChanges {
        active: input.active,
        ..Default::default()
    };
    let actor = clubdeck_core::types::Actor::outsider(auth.user_id, auth.is_elevated);
    let transition =
        clubdeck_core::approval::plan_transition(None, &changes, &actor, false, Utc::now())?;

    let club = ClubRepo::create(&state.pool, &input, &code, auth.user_id).await?;

    tracing::info!(club = %club.code, user_id = auth.user_id, "Club created");

    publish_transition_events(&state, &club, &transition, auth.user_id, false);

    let viewer = Viewer {
        is_elevated: auth.is_elevated,
        is_active_member: true,
    };
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: ClubDetail::from_live(&club, &viewer),
        }),
    ))
}

/// GET /api/v1/clubs
///
/// The public directory. Elevated viewers see every club, including
/// pending and rejected ones.
pub async fn list_clubs(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let clubs = if viewer.is_some_and(|u| u.is_elevated) {
        ClubRepo::list_all(&state.pool).await?
    } else {
        ClubRepo::list_visible(&state.pool).await?
    };
    Ok(Json(DataResponse { data: clubs }))
}

/// GET /api/v1/clubs/{code}
///
/// Club detail, resolved through the snapshot fallback for ghosted clubs.
pub async fn get_club(
    MaybeAuthUser(auth): MaybeAuthUser,
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> AppResult<impl IntoResponse> {
    let club = ClubRepo::find_by_code(&state.pool, &code)
        .await?
        .ok_or_else(|| CoreError::NotFound {
            entity: "Club",
            key: code.clone(),
        })?;

    let viewer = match auth {
        Some(user) => Viewer {
            is_elevated: user.is_elevated,
            is_active_member: MembershipRepo::is_active_member(&state.pool, club.id, user.user_id)
                .await?,
        },
        None => Viewer::default(),
    };

    // Fetch the fallback snapshot only when the decision needs it.
    let latest_approved =
        if clubdeck_core::snapshot::needs_snapshot_fallback(club.ghost, club.approved, &viewer) {
            SnapshotRepo::latest_approved(&state.pool, club.id).await?
        } else {
            None
        };

    let mut detail = match resolve_for_viewer(club.ghost, club.approved, &viewer, &club, latest_approved)
    {
        ClubView::Live(club) => ClubDetail::from_live(club, &viewer),
        ClubView::Historical(snapshot) => ClubDetail::from_snapshot(&code, &snapshot),
    };

    // Approver identity is staff-only metadata.
    if viewer.is_elevated {
        detail.approved_by_name = match club.approved_by {
            Some(id) => Some(
                UserRepo::find_by_id(&state.pool, id)
                    .await?
                    .map(|u| u.full_name)
                    .unwrap_or_else(|| "Unknown".to_string()),
            ),
            None => None,
        };
    }

    Ok(Json(DataResponse { data: detail }))
}

/// PATCH /api/v1/clubs/{code}
///
/// Edit a club. Officers and owners may edit; sensitive edits send the
/// club back through review. Elevated callers may also render approval
/// decisions by patching `approved`.
pub async fn update_club(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(mut patch): Json<UpdateClub>,
) -> AppResult<impl IntoResponse> {
    normalize_update(&mut patch)?;

    // Approval history is read ahead of the save for email wording only;
    // the transition re-reads it under the row lock.
    let prior = ClubRepo::find_by_code(&state.pool, &code)
        .await?
        .ok_or_else(|| CoreError::NotFound {
            entity: "Club",
            key: code.clone(),
        })?;
    let had_approved_history = SnapshotRepo::latest_approved(&state.pool, prior.id)
        .await?
        .is_some();

    let (club, transition) = ClubRepo::save_with_snapshot(
        &state.pool,
        &code,
        &patch,
        auth.user_id,
        auth.is_elevated,
        Utc::now(),
    )
    .await?;

    publish_transition_events(&state, &club, &transition, auth.user_id, had_approved_history);

    let viewer = Viewer {
        is_elevated: auth.is_elevated,
        is_active_member: true,
    };
    Ok(Json(DataResponse {
        data: ClubDetail::from_live(&club, &viewer),
    }))
}

/// GET /api/v1/review-queue
///
/// Clubs awaiting an approval decision, oldest submission first.
pub async fn review_queue(
    RequireElevated(_user): RequireElevated,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let clubs = ClubRepo::list_pending(&state.pool).await?;
    Ok(Json(DataResponse { data: clubs }))
}

/// GET /api/v1/clubs/{code}/history
///
/// The full audit trail of a club, newest snapshot first. Staff only.
pub async fn club_history(
    RequireElevated(_user): RequireElevated,
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> AppResult<impl IntoResponse> {
    let club = ClubRepo::find_by_code(&state.pool, &code)
        .await?
        .ok_or_else(|| CoreError::NotFound {
            entity: "Club",
            key: code.clone(),
        })?;
    let snapshots = SnapshotRepo::list_for_club(&state.pool, club.id).await?;
    Ok(Json(DataResponse { data: snapshots }))
}
