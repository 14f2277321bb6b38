//! Route definitions for the catalog.
//!
//! ```text
//! GET    /            list_books (optional ?search=)
//! POST   /            create_book (admin)
//! GET    /{id}        get_book
//! ```

use axum::routing::get;
use axum::Router;

use crate::handlers::books;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(books::list_books).post(books::create_book))
        .route("/{id}", get(books::get_book))
}
