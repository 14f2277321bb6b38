//! Handlers for the `/books` resource (catalog).
//!
//! The catalog is readable by any authenticated user (clients browse it,
//! admins use it as the manual-match picker); only administrators create
//! entries.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use repliq_core::error::CoreError;
use repliq_core::types::DbId;
use repliq_db::models::book::CreateBook;
use repliq_db::repositories::BookRepo;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for the catalog listing.
#[derive(Debug, Deserialize)]
pub struct ListBooksQuery {
    /// Case-insensitive substring matched against title or author.
    pub search: Option<String>,
}

/// GET /api/v1/books?search=
///
/// List the catalog, optionally filtered.
pub async fn list_books(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ListBooksQuery>,
) -> AppResult<impl IntoResponse> {
    let books = match query.search.as_deref().map(str::trim) {
        Some(term) if !term.is_empty() => BookRepo::search(&state.pool, term).await?,
        _ => BookRepo::list(&state.pool).await?,
    };
    Ok(Json(DataResponse { data: books }))
}

/// GET /api/v1/books/{id}
pub async fn get_book(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let book = BookRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Book", id }))?;
    Ok(Json(DataResponse { data: book }))
}

/// POST /api/v1/books
///
/// Add a catalog entry. Admin only.
pub async fn create_book(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateBook>,
) -> AppResult<impl IntoResponse> {
    if input.title.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Title must not be empty".into(),
        )));
    }
    if input.author.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Author must not be empty".into(),
        )));
    }

    let book = BookRepo::create(&state.pool, &input).await?;

    tracing::info!(
        admin = %admin.email,
        book_id = book.id,
        title = %book.title,
        "Book added to catalog"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: book })))
}
