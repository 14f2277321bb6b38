//! Repository for the `books` table.

use repliq_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::book::{Book, CreateBook, PLACEHOLDER_COVER_URL};
use crate::repositories::escape_like;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, author, publication_year, summary, ebook_url, \
                        cover_image_url, created_at";

/// Provides CRUD operations for catalog entries.
pub struct BookRepo;

impl BookRepo {
    /// Insert a new book, returning the created row.
    ///
    /// A missing cover image falls back to the placeholder URI.
    pub async fn create(pool: &PgPool, input: &CreateBook) -> Result<Book, sqlx::Error> {
        let cover = input
            .cover_image_url
            .as_deref()
            .unwrap_or(PLACEHOLDER_COVER_URL);
        let query = format!(
            "INSERT INTO books (title, author, publication_year, summary, ebook_url, cover_image_url)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Book>(&query)
            .bind(&input.title)
            .bind(&input.author)
            .bind(input.publication_year)
            .bind(&input.summary)
            .bind(&input.ebook_url)
            .bind(cover)
            .fetch_one(pool)
            .await
    }

    /// Find a book by internal ID.
    ///
    /// Accepts any executor so the approval transaction can re-fetch the
    /// matched book with read-your-writes consistency.
    pub async fn find_by_id(
        executor: impl PgExecutor<'_>,
        id: DbId,
    ) -> Result<Option<Book>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM books WHERE id = $1");
        sqlx::query_as::<_, Book>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// List the whole catalog, ordered by title ascending.
    pub async fn list(pool: &PgPool) -> Result<Vec<Book>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM books ORDER BY title ASC");
        sqlx::query_as::<_, Book>(&query).fetch_all(pool).await
    }

    /// Case-insensitive substring search on title or author, ordered by
    /// title ascending. Used by the catalog listing and the admin's manual
    /// match picker.
    pub async fn search(pool: &PgPool, term: &str) -> Result<Vec<Book>, sqlx::Error> {
        let pattern = format!("%{}%", escape_like(term));
        let query = format!(
            "SELECT {COLUMNS} FROM books
             WHERE title ILIKE $1 ESCAPE '\\' OR author ILIKE $1 ESCAPE '\\'
             ORDER BY title ASC"
        );
        sqlx::query_as::<_, Book>(&query)
            .bind(&pattern)
            .fetch_all(pool)
            .await
    }

    /// Find the first book whose upper-cased title starts with the
    /// upper-cased detected title, ordered by title ascending.
    ///
    /// This is the automatic-match lookup: a case-normalized "starts with"
    /// over the catalog, no ranking beyond title order.
    pub async fn find_first_title_prefix(
        pool: &PgPool,
        detected_title: &str,
    ) -> Result<Option<Book>, sqlx::Error> {
        let pattern = format!("{}%", escape_like(&detected_title.to_uppercase()));
        let query = format!(
            "SELECT {COLUMNS} FROM books
             WHERE upper(title) LIKE $1 ESCAPE '\\'
             ORDER BY title ASC
             LIMIT 1"
        );
        sqlx::query_as::<_, Book>(&query)
            .bind(&pattern)
            .fetch_optional(pool)
            .await
    }
}
