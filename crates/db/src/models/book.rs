//! Catalog entry (book) model and DTOs.

use repliq_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Cover shown when an administrator adds a book without one.
pub const PLACEHOLDER_COVER_URL: &str = "https://via.placeholder.com/200x300?text=Livre";

/// A row from the `books` table.
///
/// Library entries snapshot these fields at approval time; editing a book
/// afterwards never changes an already-granted copy.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Book {
    pub id: DbId,
    pub title: String,
    pub author: String,
    pub publication_year: i32,
    pub summary: Option<String>,
    /// Absent means the ebook is not yet available for download.
    pub ebook_url: Option<String>,
    pub cover_image_url: String,
    pub created_at: Timestamp,
}

/// DTO for creating a new catalog entry.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBook {
    pub title: String,
    pub author: String,
    pub publication_year: i32,
    pub summary: Option<String>,
    pub ebook_url: Option<String>,
    /// Defaults to [`PLACEHOLDER_COVER_URL`] when absent.
    pub cover_image_url: Option<String>,
}
