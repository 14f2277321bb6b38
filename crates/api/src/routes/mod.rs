pub mod auth;
pub mod books;
pub mod health;
pub mod library;
pub mod requests;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                   register (public)
/// /auth/login                      login (public)
/// /auth/refresh                    refresh (public)
/// /auth/logout                     logout (requires auth)
/// /auth/me                         identity echo (requires auth)
///
/// /books                           list + search (auth), create (admin)
/// /books/{id}                      get (auth)
///
/// /requests                        submit receipt (auth)
/// /requests/mine                   own submissions (auth)
/// /requests/pending                admin work queue (admin)
/// /requests/history                resolved requests (admin)
/// /requests/{id}/match             manual match (admin, PUT)
/// /requests/{id}/approve           approve (admin, POST)
/// /requests/{id}/reject            reject (admin, POST)
///
/// /library                         own library entries (auth)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/books", books::router())
        .nest("/requests", requests::router())
        .nest("/library", library::router())
}
