pub mod clubs;
pub mod health;

use axum::routing::post;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                              login (public)
///
/// /clubs                                   list (public), create (auth)
/// /clubs/{code}                            detail (public), patch (auth)
/// /clubs/{code}/history                    audit trail (elevated)
/// /clubs/{code}/members                    roster (public), add (auth)
/// /clubs/{code}/members/{person_id}        patch, remove (auth)
///
/// /review-queue                            pending clubs (elevated)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(handlers::auth::login))
        .nest("/clubs", clubs::router())
        .merge(clubs::review_router())
}
