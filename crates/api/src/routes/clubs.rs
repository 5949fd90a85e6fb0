//! Route definitions for clubs and their rosters.

use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::{club, membership};
use crate::state::AppState;

/// Club routes, nested under `/clubs`.
///
/// ```text
/// GET    /                                 list_clubs
/// POST   /                                 create_club
/// GET    /{code}                           get_club
/// PATCH  /{code}                           update_club
/// GET    /{code}/history                   club_history
/// GET    /{code}/members                   list_members
/// POST   /{code}/members                   add_member
/// PATCH  /{code}/members/{person_id}       update_member
/// DELETE /{code}/members/{person_id}       remove_member
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(club::list_clubs).post(club::create_club))
        .route("/{code}", get(club::get_club).patch(club::update_club))
        .route("/{code}/history", get(club::club_history))
        .route(
            "/{code}/members",
            get(membership::list_members).post(membership::add_member),
        )
        .route(
            "/{code}/members/{person_id}",
            patch(membership::update_member).delete(membership::remove_member),
        )
}

/// Top-level review queue route.
///
/// ```text
/// GET    /review-queue                     review_queue
/// ```
pub fn review_router() -> Router<AppState> {
    Router::new().route("/review-queue", get(club::review_queue))
}
