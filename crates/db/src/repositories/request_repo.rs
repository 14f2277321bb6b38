//! Repository for the `requests` table.
//!
//! Status transitions go through [`RequestRepo::resolve`], a conditional
//! update guarded on `status = 'pending'`. Under concurrent administrators
//! at most one transition wins; the loser sees zero rows updated.

use repliq_core::status::RequestStatus;
use repliq_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::request::{CreateRequest, MatchedBook, Request};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, user_email, receipt_image_base64, extracted_text, \
                        detected_title, status, matched_book_id, matched_book_title, \
                        matched_book_author, matched_book_year, resolving_admin_email, \
                        created_at, updated_at";

/// Provides CRUD operations and lifecycle transitions for requests.
pub struct RequestRepo;

impl RequestRepo {
    /// Insert a freshly submitted request (status `pending`), returning the
    /// created row.
    pub async fn create(pool: &PgPool, input: &CreateRequest) -> Result<Request, sqlx::Error> {
        let query = format!(
            "INSERT INTO requests
                (user_id, user_email, receipt_image_base64, extracted_text, detected_title)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Request>(&query)
            .bind(input.user_id)
            .bind(&input.user_email)
            .bind(&input.receipt_image_base64)
            .bind(&input.extracted_text)
            .bind(&input.detected_title)
            .fetch_one(pool)
            .await
    }

    /// Find a request by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Request>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM requests WHERE id = $1");
        sqlx::query_as::<_, Request>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All pending requests, newest first. The administrator's work queue.
    pub async fn list_pending(pool: &PgPool) -> Result<Vec<Request>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM requests
             WHERE status = 'pending'
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Request>(&query).fetch_all(pool).await
    }

    /// All resolved requests, newest first.
    pub async fn list_history(pool: &PgPool) -> Result<Vec<Request>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM requests
             WHERE status <> 'pending'
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Request>(&query).fetch_all(pool).await
    }

    /// All requests submitted by one user, newest first.
    pub async fn list_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<Request>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM requests
             WHERE user_id = $1
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Request>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Pending requests with a detected title but no match copy yet --
    /// the work list for the automatic matching sweep.
    pub async fn list_awaiting_match(pool: &PgPool) -> Result<Vec<Request>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM requests
             WHERE status = 'pending'
               AND detected_title IS NOT NULL
               AND detected_title <> ''
               AND matched_book_id IS NULL
             ORDER BY created_at ASC"
        );
        sqlx::query_as::<_, Request>(&query).fetch_all(pool).await
    }

    /// Write the match copy from the automatic sweep.
    ///
    /// Guarded on the request still being pending AND still unmatched, so
    /// re-running the sweep is a no-op and a concurrent manual match is
    /// never clobbered by the heuristic. Returns `true` if the copy was
    /// written.
    pub async fn fill_matched_book(
        pool: &PgPool,
        id: DbId,
        matched: &MatchedBook,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE requests SET
                matched_book_id = $2,
                matched_book_title = $3,
                matched_book_author = $4,
                matched_book_year = $5
             WHERE id = $1
               AND status = 'pending'
               AND matched_book_id IS NULL",
        )
        .bind(id)
        .bind(matched.book_id)
        .bind(&matched.title)
        .bind(&matched.author)
        .bind(matched.year)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Overwrite the match copy from an explicit admin selection.
    ///
    /// Replaces any prior match (manual action supersedes the heuristic)
    /// but never touches a resolved request. Returns `None` if the request
    /// does not exist or is no longer pending.
    pub async fn set_matched_book(
        pool: &PgPool,
        id: DbId,
        matched: &MatchedBook,
    ) -> Result<Option<Request>, sqlx::Error> {
        let query = format!(
            "UPDATE requests SET
                matched_book_id = $2,
                matched_book_title = $3,
                matched_book_author = $4,
                matched_book_year = $5
             WHERE id = $1 AND status = 'pending'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Request>(&query)
            .bind(id)
            .bind(matched.book_id)
            .bind(&matched.title)
            .bind(&matched.author)
            .bind(matched.year)
            .fetch_optional(pool)
            .await
    }

    /// Transition a pending request to a terminal status, stamping
    /// `updated_at` and the acting administrator's email.
    ///
    /// Returns `None` when the request was not pending (another
    /// administrator already resolved it, or it never existed) -- the
    /// compare-and-swap that makes transitions exactly-once. Accepts any
    /// executor so approval can run it inside a transaction.
    pub async fn resolve(
        executor: impl PgExecutor<'_>,
        id: DbId,
        status: RequestStatus,
        admin_email: &str,
    ) -> Result<Option<Request>, sqlx::Error> {
        let query = format!(
            "UPDATE requests SET
                status = $2,
                updated_at = NOW(),
                resolving_admin_email = $3
             WHERE id = $1 AND status = 'pending'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Request>(&query)
            .bind(id)
            .bind(status.as_str())
            .bind(admin_email)
            .fetch_optional(executor)
            .await
    }
}
