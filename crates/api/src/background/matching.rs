//! Automatic book matching sweep.
//!
//! Periodically scans pending requests that have a detected title but no
//! match copy yet and tries a case-normalized prefix lookup against the
//! catalog. The fill is guarded in SQL (still pending, still unmatched),
//! so the sweep is idempotent and can never clobber a manual match made
//! while it runs.

use std::time::Duration;

use repliq_db::models::request::MatchedBook;
use repliq_db::repositories::{BookRepo, RequestRepo};
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

/// How often the sweep runs.
const SWEEP_INTERVAL: Duration = Duration::from_secs(30);

/// Run the matching sweep loop until `cancel` is triggered.
///
/// A failed pass is logged and retried on the next tick; the sweep itself
/// never aborts.
pub async fn run(pool: PgPool, cancel: CancellationToken) {
    tracing::info!(
        interval_secs = SWEEP_INTERVAL.as_secs(),
        "Book matching sweep started"
    );

    let mut interval = tokio::time::interval(SWEEP_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Book matching sweep stopping");
                break;
            }
            _ = interval.tick() => {
                match run_matching_pass(&pool).await {
                    Ok(matched) => {
                        if matched > 0 {
                            tracing::info!(matched, "Matching sweep: requests matched");
                        } else {
                            tracing::debug!("Matching sweep: nothing to match");
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Matching sweep failed");
                    }
                }
            }
        }
    }
}

/// One pass over all titled-but-unmatched pending requests.
///
/// Returns the number of requests that received a match copy. Safe to call
/// concurrently with itself or with manual matching.
pub async fn run_matching_pass(pool: &PgPool) -> Result<u64, sqlx::Error> {
    let awaiting = RequestRepo::list_awaiting_match(pool).await?;

    let mut matched_count = 0;
    for request in awaiting {
        // The work list predicate guarantees a non-empty detected title.
        let Some(detected_title) = request.detected_title.as_deref() else {
            continue;
        };

        let Some(book) = BookRepo::find_first_title_prefix(pool, detected_title).await? else {
            continue;
        };

        let matched = MatchedBook {
            book_id: book.id,
            title: book.title,
            author: book.author,
            year: book.publication_year,
        };

        if RequestRepo::fill_matched_book(pool, request.id, &matched).await? {
            tracing::debug!(
                request_id = request.id,
                book_id = matched.book_id,
                detected_title,
                "Automatic match written"
            );
            matched_count += 1;
        }
    }

    Ok(matched_count)
}
