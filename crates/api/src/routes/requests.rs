//! Route definitions for receipt requests.
//!
//! ```text
//! POST   /                 submit_request
//! GET    /mine             list_my_requests
//! GET    /pending          list_pending_requests (admin)
//! GET    /history          list_request_history (admin)
//! PUT    /{id}/match       match_request (admin)
//! POST   /{id}/approve     approve_request (admin)
//! POST   /{id}/reject      reject_request (admin)
//! ```

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::requests;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(requests::submit_request))
        .route("/mine", get(requests::list_my_requests))
        .route("/pending", get(requests::list_pending_requests))
        .route("/history", get(requests::list_request_history))
        .route("/{id}/match", put(requests::match_request))
        .route("/{id}/approve", post(requests::approve_request))
        .route("/{id}/reject", post(requests::reject_request))
}
