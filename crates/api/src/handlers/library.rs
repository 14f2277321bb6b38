//! Handler for the personal library projection.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use repliq_db::repositories::LibraryEntryRepo;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/library
///
/// The requesting user's library entries, most recently granted first.
/// Entries are snapshots written at approval time; this is a plain read.
pub async fn list_my_library(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let entries = LibraryEntryRepo::list_for_user(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse { data: entries }))
}
