//! Handlers for the `/requests` resource: receipt submission, the admin
//! work queues, manual matching, and the approve/reject transitions.
//!
//! Approval is the one multi-record write in the system. The status update
//! and the library grant run in a single transaction, with the status
//! update guarded on `status = 'pending'` so racing administrators cannot
//! double-resolve a request or double-grant a book.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use repliq_core::error::CoreError;
use repliq_core::receipt::detect_title;
use repliq_core::status::RequestStatus;
use repliq_core::types::DbId;
use repliq_db::models::library_entry::CreateLibraryEntry;
use repliq_db::models::request::{CreateRequest, MatchedBook};
use repliq_db::repositories::{BookRepo, LibraryEntryRepo, RequestRepo};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /requests`.
#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    /// The photographed receipt, base64-encoded.
    pub receipt_image_base64: String,
}

/// Request body for `PUT /requests/{id}/match`.
#[derive(Debug, Deserialize)]
pub struct MatchRequest {
    pub book_id: DbId,
}

// ---------------------------------------------------------------------------
// Submission
// ---------------------------------------------------------------------------

/// POST /api/v1/requests
///
/// Submit a receipt. The image goes to the OCR service, the title
/// heuristic runs over the extracted text, and a pending request is
/// created. OCR failure aborts the submission -- no request is persisted.
/// A receipt with no detectable title is still accepted; it simply needs
/// manual matching.
pub async fn submit_request(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<SubmitRequest>,
) -> AppResult<impl IntoResponse> {
    if input.receipt_image_base64.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "A receipt image is required".into(),
        )));
    }

    let extracted_text = state
        .ocr
        .extract_text(&input.receipt_image_base64, &state.config.ocr.language)
        .await?;

    let detected_title = detect_title(&extracted_text);

    let request = RequestRepo::create(
        &state.pool,
        &CreateRequest {
            user_id: auth.user_id,
            user_email: auth.email.clone(),
            receipt_image_base64: input.receipt_image_base64,
            extracted_text,
            detected_title,
        },
    )
    .await?;

    tracing::info!(
        user_id = auth.user_id,
        request_id = request.id,
        detected_title = ?request.detected_title,
        "Receipt request submitted"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: request })))
}

// ---------------------------------------------------------------------------
// Projections
// ---------------------------------------------------------------------------

/// GET /api/v1/requests/mine
///
/// The requesting user's own submissions, newest first.
pub async fn list_my_requests(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let requests = RequestRepo::list_for_user(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse { data: requests }))
}

/// GET /api/v1/requests/pending
///
/// The admin work queue: all pending requests, newest first.
pub async fn list_pending_requests(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let requests = RequestRepo::list_pending(&state.pool).await?;
    Ok(Json(DataResponse { data: requests }))
}

/// GET /api/v1/requests/history
///
/// All resolved requests, newest first.
pub async fn list_request_history(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let requests = RequestRepo::list_history(&state.pool).await?;
    Ok(Json(DataResponse { data: requests }))
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

/// PUT /api/v1/requests/{id}/match
///
/// Manually associate a catalog entry with a pending request, replacing
/// any prior (automatic or manual) match.
pub async fn match_request(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<MatchRequest>,
) -> AppResult<impl IntoResponse> {
    let request = RequestRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Request",
            id,
        }))?;

    if request.status().is_some_and(|s| s.is_terminal()) {
        return Err(AppError::Core(CoreError::Conflict(
            "Request is already resolved".into(),
        )));
    }

    let book = BookRepo::find_by_id(&state.pool, input.book_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Book",
            id: input.book_id,
        }))?;

    let matched = MatchedBook {
        book_id: book.id,
        title: book.title.clone(),
        author: book.author.clone(),
        year: book.publication_year,
    };

    let updated = RequestRepo::set_matched_book(&state.pool, id, &matched)
        .await?
        .ok_or_else(|| {
            // Resolved between the read above and the guarded update.
            AppError::Core(CoreError::Conflict("Request is already resolved".into()))
        })?;

    tracing::info!(
        admin = %admin.email,
        request_id = id,
        book_id = book.id,
        "Request matched manually"
    );

    Ok(Json(DataResponse { data: updated }))
}

// ---------------------------------------------------------------------------
// Lifecycle transitions
// ---------------------------------------------------------------------------

/// POST /api/v1/requests/{id}/approve
///
/// Approve a pending request. Requires a matched book. Grants the
/// submitter a library entry snapshotting the matched book, and stamps the
/// request resolved -- both in one transaction.
pub async fn approve_request(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let request = RequestRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Request",
            id,
        }))?;

    if request.status().is_some_and(|s| s.is_terminal()) {
        return Err(AppError::Core(CoreError::Conflict(
            "Request is already resolved".into(),
        )));
    }

    let Some(matched_book_id) = request.matched_book_id else {
        return Err(AppError::Core(CoreError::Precondition(
            "Cannot approve a request without a matched book".into(),
        )));
    };

    let mut tx = state.pool.begin().await?;

    let updated = RequestRepo::resolve(&mut *tx, id, RequestStatus::Approved, &admin.email)
        .await?
        .ok_or_else(|| {
            // Another administrator resolved it first; the transaction
            // rolls back on drop.
            AppError::Core(CoreError::Conflict("Request is already resolved".into()))
        })?;

    // Re-fetch the book inside the transaction: the request's match copy
    // only carries title/author/year, the grant snapshots the full record.
    let book = BookRepo::find_by_id(&mut *tx, matched_book_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Book",
            id: matched_book_id,
        }))?;

    let entry = LibraryEntryRepo::create(
        &mut *tx,
        &CreateLibraryEntry {
            user_id: updated.user_id,
            book_id: book.id,
            title: book.title,
            author: book.author,
            publication_year: book.publication_year,
            summary: book.summary,
            ebook_url: book.ebook_url,
            cover_image_url: book.cover_image_url,
            request_id: updated.id,
        },
    )
    .await?;

    tx.commit().await?;

    tracing::info!(
        admin = %admin.email,
        request_id = id,
        user_id = updated.user_id,
        library_entry_id = entry.id,
        "Request approved, library entry granted"
    );

    Ok(Json(DataResponse { data: updated }))
}

/// POST /api/v1/requests/{id}/reject
///
/// Reject a pending request. No precondition beyond being pending, and no
/// library effect.
pub async fn reject_request(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let request = RequestRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Request",
            id,
        }))?;

    if request.status().is_some_and(|s| s.is_terminal()) {
        return Err(AppError::Core(CoreError::Conflict(
            "Request is already resolved".into(),
        )));
    }

    let updated = RequestRepo::resolve(&state.pool, id, RequestStatus::Rejected, &admin.email)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict("Request is already resolved".into()))
        })?;

    tracing::info!(
        admin = %admin.email,
        request_id = id,
        "Request rejected"
    );

    Ok(Json(DataResponse { data: updated }))
}
