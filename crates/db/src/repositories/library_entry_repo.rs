//! Repository for the `library_entries` table.

use repliq_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::library_entry::{CreateLibraryEntry, LibraryEntry};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, book_id, title, author, publication_year, summary, \
                        ebook_url, cover_image_url, request_id, added_at";

/// Provides operations for personal library entries.
///
/// Entries are only ever created inside the approval transaction and never
/// updated, so there is no update method here.
pub struct LibraryEntryRepo;

impl LibraryEntryRepo {
    /// Insert a library entry snapshotting an approved book.
    ///
    /// Accepts any executor so approval can run it in the same transaction
    /// as the request's status update.
    pub async fn create(
        executor: impl PgExecutor<'_>,
        input: &CreateLibraryEntry,
    ) -> Result<LibraryEntry, sqlx::Error> {
        let query = format!(
            "INSERT INTO library_entries
                (user_id, book_id, title, author, publication_year, summary,
                 ebook_url, cover_image_url, request_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, LibraryEntry>(&query)
            .bind(input.user_id)
            .bind(input.book_id)
            .bind(&input.title)
            .bind(&input.author)
            .bind(input.publication_year)
            .bind(&input.summary)
            .bind(&input.ebook_url)
            .bind(&input.cover_image_url)
            .bind(input.request_id)
            .fetch_one(executor)
            .await
    }

    /// List one user's library, most recently granted first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<LibraryEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM library_entries
             WHERE user_id = $1
             ORDER BY added_at DESC"
        );
        sqlx::query_as::<_, LibraryEntry>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// List entries granted by a specific request. Used to assert the
    /// exactly-one-grant property.
    pub async fn list_for_request(
        pool: &PgPool,
        request_id: DbId,
    ) -> Result<Vec<LibraryEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM library_entries
             WHERE request_id = $1
             ORDER BY added_at DESC"
        );
        sqlx::query_as::<_, LibraryEntry>(&query)
            .bind(request_id)
            .fetch_all(pool)
            .await
    }
}
