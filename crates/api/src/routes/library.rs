//! Route definition for the personal library.
//!
//! ```text
//! GET    /            list_my_library
//! ```

use axum::routing::get;
use axum::Router;

use crate::handlers::library;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(library::list_my_library))
}
