//! Receipt request model and DTOs.

use repliq_core::status::RequestStatus;
use repliq_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `requests` table.
///
/// The `matched_book_*` columns are a denormalized copy of the catalog
/// entry chosen for this request, written together and read together; they
/// are a snapshot, not a live reference. `updated_at` and
/// `resolving_admin_email` are set exactly once, on the
/// pending -> approved/rejected transition.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Request {
    pub id: DbId,
    pub user_id: DbId,
    pub user_email: String,
    /// The submitted receipt photo, embedded inline.
    pub receipt_image_base64: String,
    /// Raw OCR output the title heuristic ran over.
    pub extracted_text: String,
    /// Heuristic result; NULL means "needs manual matching".
    pub detected_title: Option<String>,
    pub status: String,
    pub matched_book_id: Option<DbId>,
    pub matched_book_title: Option<String>,
    pub matched_book_author: Option<String>,
    pub matched_book_year: Option<i32>,
    pub resolving_admin_email: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Option<Timestamp>,
}

impl Request {
    /// Typed view of the stored status.
    pub fn status(&self) -> Option<RequestStatus> {
        RequestStatus::parse(&self.status)
    }

    /// Whether a matched-book copy has been written.
    pub fn has_matched_book(&self) -> bool {
        self.matched_book_id.is_some()
    }
}

/// DTO for inserting a freshly submitted request.
#[derive(Debug, Clone)]
pub struct CreateRequest {
    pub user_id: DbId,
    pub user_email: String,
    pub receipt_image_base64: String,
    pub extracted_text: String,
    pub detected_title: Option<String>,
}

/// The denormalized catalog snapshot written onto a request when it is
/// matched, automatically or by an administrator.
#[derive(Debug, Clone, Deserialize)]
pub struct MatchedBook {
    pub book_id: DbId,
    pub title: String,
    pub author: String,
    pub year: i32,
}
