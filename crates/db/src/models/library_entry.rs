//! Personal library entry model and DTOs.

use repliq_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `library_entries` table.
///
/// A full snapshot of the matched book at approval time, plus provenance.
/// Never mutated after creation.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LibraryEntry {
    pub id: DbId,
    pub user_id: DbId,
    pub book_id: DbId,
    pub title: String,
    pub author: String,
    pub publication_year: i32,
    pub summary: Option<String>,
    pub ebook_url: Option<String>,
    pub cover_image_url: String,
    /// The request whose approval granted this entry.
    pub request_id: DbId,
    pub added_at: Timestamp,
}

/// DTO for inserting a library entry during request approval.
#[derive(Debug, Clone)]
pub struct CreateLibraryEntry {
    pub user_id: DbId,
    pub book_id: DbId,
    pub title: String,
    pub author: String,
    pub publication_year: i32,
    pub summary: Option<String>,
    pub ebook_url: Option<String>,
    pub cover_image_url: String,
    pub request_id: DbId,
}
