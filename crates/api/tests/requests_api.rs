//! HTTP-level integration tests for the request lifecycle: submission,
//! automatic and manual matching, approval, rejection, and the library
//! grant.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use common::{
    body_json, get_auth, post_auth, post_json_auth, put_json_auth, seed_admin, seed_user,
    token_for, StubOcrClient,
};
use repliq_api::background::matching::run_matching_pass;
use repliq_core::roles::Role;
use repliq_core::types::DbId;
use repliq_db::models::book::CreateBook;
use repliq_db::models::request::CreateRequest;
use repliq_db::repositories::{BookRepo, LibraryEntryRepo, RequestRepo};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn seed_book(pool: &PgPool, title: &str, author: &str, ebook_url: &str) -> DbId {
    let book = BookRepo::create(
        pool,
        &CreateBook {
            title: title.to_string(),
            author: author.to_string(),
            publication_year: 1949,
            summary: Some("Un classique.".to_string()),
            ebook_url: Some(ebook_url.to_string()),
            cover_image_url: None,
        },
    )
    .await
    .expect("book creation should succeed");
    book.id
}

/// Insert a pending request directly, bypassing OCR, with a given detected
/// title. Mirrors what a submission would have produced.
async fn seed_request(pool: &PgPool, user_id: DbId, detected_title: Option<&str>) -> DbId {
    let request = RequestRepo::create(
        pool,
        &CreateRequest {
            user_id,
            user_email: "reader@test.com".to_string(),
            receipt_image_base64: "aGVsbG8=".to_string(),
            extracted_text: "RECU 12,50".to_string(),
            detected_title: detected_title.map(str::to_string),
        },
    )
    .await
    .expect("request creation should succeed");
    request.id
}

/// Submit a receipt through the API and return the created request JSON.
async fn submit_receipt(app: axum::Router, token: &str) -> serde_json::Value {
    let body = serde_json::json!({ "receipt_image_base64": "aGVsbG8=" });
    let response = post_json_auth(app, "/api/v1/requests", body, token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

// ---------------------------------------------------------------------------
// Submission
// ---------------------------------------------------------------------------

/// Submitting a receipt creates a pending request carrying the OCR text
/// and the detected title.
#[sqlx::test(migrations = "../../db/migrations")]
async fn submit_creates_pending_request_with_title(pool: PgPool) {
    let user_id = seed_user(&pool, "reader@test.com").await;
    let token = token_for(user_id, "reader@test.com", Role::Client);
    let app = common::build_test_app(pool);

    let json = submit_receipt(app, &token).await;
    assert_eq!(json["data"]["status"], "pending");
    assert_eq!(json["data"]["detected_title"], "LE PETIT PRINCE");
    assert_eq!(json["data"]["user_email"], "reader@test.com");
    assert!(json["data"]["matched_book_id"].is_null());
    assert!(json["data"]["updated_at"].is_null());
}

/// `WIDGET 12,50` is detected as WIDGET; a TOTAL line never is.
#[sqlx::test(migrations = "../../db/migrations")]
async fn submit_detects_widget_never_total(pool: PgPool) {
    let user_id = seed_user(&pool, "reader@test.com").await;
    let token = token_for(user_id, "reader@test.com", Role::Client);
    let app = common::build_test_app_with_ocr(
        pool,
        Arc::new(StubOcrClient::with_text("TOTAL 45,00\nWIDGET 12,50")),
    );

    let json = submit_receipt(app, &token).await;
    assert_eq!(json["data"]["detected_title"], "WIDGET");
}

/// A receipt with no plausible title is accepted with a null title.
#[sqlx::test(migrations = "../../db/migrations")]
async fn submit_without_detectable_title_is_accepted(pool: PgPool) {
    let user_id = seed_user(&pool, "reader@test.com").await;
    let token = token_for(user_id, "reader@test.com", Role::Client);
    let app = common::build_test_app_with_ocr(
        pool,
        Arc::new(StubOcrClient::with_text("TOTAL 45,00\nTVA 7,50")),
    );

    let json = submit_receipt(app, &token).await;
    assert_eq!(json["data"]["status"], "pending");
    assert!(json["data"]["detected_title"].is_null());
}

/// An empty image is rejected before any external call.
#[sqlx::test(migrations = "../../db/migrations")]
async fn submit_empty_image_is_rejected(pool: PgPool) {
    let user_id = seed_user(&pool, "reader@test.com").await;
    let token = token_for(user_id, "reader@test.com", Role::Client);
    let app = common::build_test_app(pool.clone());

    let body = serde_json::json!({ "receipt_image_base64": "   " });
    let response = post_json_auth(app, "/api/v1/requests", body, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let requests = RequestRepo::list_for_user(&pool, user_id)
        .await
        .expect("query should succeed");
    assert!(requests.is_empty(), "no request may be persisted");
}

/// OCR failure aborts the submission without persisting a request.
#[sqlx::test(migrations = "../../db/migrations")]
async fn ocr_failure_creates_no_request(pool: PgPool) {
    let user_id = seed_user(&pool, "reader@test.com").await;
    let token = token_for(user_id, "reader@test.com", Role::Client);
    let app = common::build_test_app_with_ocr(pool.clone(), Arc::new(StubOcrClient::failing()));

    let body = serde_json::json!({ "receipt_image_base64": "aGVsbG8=" });
    let response = post_json_auth(app, "/api/v1/requests", body, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json = body_json(response).await;
    assert_eq!(json["code"], "OCR_FAILED");

    let requests = RequestRepo::list_for_user(&pool, user_id)
        .await
        .expect("query should succeed");
    assert!(requests.is_empty(), "OCR failure must not create a request");
}

// ---------------------------------------------------------------------------
// Projections
// ---------------------------------------------------------------------------

/// Pending and history views are admin-only and split by status.
#[sqlx::test(migrations = "../../db/migrations")]
async fn pending_and_history_views_split_by_status(pool: PgPool) {
    let user_id = seed_user(&pool, "reader@test.com").await;
    let admin_id = seed_admin(&pool, "admin@test.com").await;
    let user_token = token_for(user_id, "reader@test.com", Role::Client);
    let admin_token = token_for(admin_id, "admin@test.com", Role::Admin);

    let pending_id = seed_request(&pool, user_id, None).await;
    let rejected_id = seed_request(&pool, user_id, None).await;
    let app = common::build_test_app(pool);

    let response = post_auth(
        app.clone(),
        &format!("/api/v1/requests/{rejected_id}/reject"),
        &admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get_auth(app.clone(), "/api/v1/requests/pending", &admin_token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let ids: Vec<i64> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![pending_id]);

    let response = get_auth(app.clone(), "/api/v1/requests/history", &admin_token).await;
    let json = body_json(response).await;
    let ids: Vec<i64> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![rejected_id]);

    // Clients cannot read the admin queues.
    let response = get_auth(app.clone(), "/api/v1/requests/pending", &user_token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let response = get_auth(app, "/api/v1/requests/history", &user_token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

/// Users see their own submissions, newest first, and only their own.
#[sqlx::test(migrations = "../../db/migrations")]
async fn my_requests_are_scoped_to_the_submitter(pool: PgPool) {
    let alice_id = seed_user(&pool, "alice@test.com").await;
    let bob_id = seed_user(&pool, "bob@test.com").await;
    let alice_token = token_for(alice_id, "alice@test.com", Role::Client);

    let first = seed_request(&pool, alice_id, None).await;
    let second = seed_request(&pool, alice_id, None).await;
    seed_request(&pool, bob_id, None).await;
    let app = common::build_test_app(pool);

    let response = get_auth(app, "/api/v1/requests/mine", &alice_token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let ids: Vec<i64> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![second, first], "newest first, own requests only");
}

// ---------------------------------------------------------------------------
// Manual matching
// ---------------------------------------------------------------------------

/// The admin can attach and replace a match on a pending request.
#[sqlx::test(migrations = "../../db/migrations")]
async fn manual_match_sets_and_replaces_copy(pool: PgPool) {
    let user_id = seed_user(&pool, "reader@test.com").await;
    let admin_id = seed_admin(&pool, "admin@test.com").await;
    let admin_token = token_for(admin_id, "admin@test.com", Role::Admin);

    let first_book = seed_book(&pool, "1984", "George Orwell", "https://example.com/1984.pdf").await;
    let second_book = seed_book(
        &pool,
        "Animal Farm",
        "George Orwell",
        "https://example.com/animal-farm.pdf",
    )
    .await;
    let request_id = seed_request(&pool, user_id, None).await;
    let app = common::build_test_app(pool);

    let response = put_json_auth(
        app.clone(),
        &format!("/api/v1/requests/{request_id}/match"),
        serde_json::json!({ "book_id": first_book }),
        &admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["matched_book_id"].as_i64().unwrap(), first_book);
    assert_eq!(json["data"]["matched_book_title"], "1984");

    // Explicit admin choice replaces the earlier match.
    let response = put_json_auth(
        app,
        &format!("/api/v1/requests/{request_id}/match"),
        serde_json::json!({ "book_id": second_book }),
        &admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["matched_book_title"], "Animal Farm");
}

/// Matching a resolved request or an unknown book fails.
#[sqlx::test(migrations = "../../db/migrations")]
async fn manual_match_guards(pool: PgPool) {
    let user_id = seed_user(&pool, "reader@test.com").await;
    let admin_id = seed_admin(&pool, "admin@test.com").await;
    let admin_token = token_for(admin_id, "admin@test.com", Role::Admin);

    let book_id = seed_book(&pool, "1984", "George Orwell", "https://example.com/1984.pdf").await;
    let request_id = seed_request(&pool, user_id, None).await;
    let app = common::build_test_app(pool);

    // Unknown book.
    let response = put_json_auth(
        app.clone(),
        &format!("/api/v1/requests/{request_id}/match"),
        serde_json::json!({ "book_id": 9999 }),
        &admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Resolved request.
    let response = post_auth(
        app.clone(),
        &format!("/api/v1/requests/{request_id}/reject"),
        &admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = put_json_auth(
        app,
        &format!("/api/v1/requests/{request_id}/match"),
        serde_json::json!({ "book_id": book_id }),
        &admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

// ---------------------------------------------------------------------------
// Approve / reject
// ---------------------------------------------------------------------------

/// Approving without a matched book fails with a precondition error and
/// creates no library entry.
#[sqlx::test(migrations = "../../db/migrations")]
async fn approve_without_match_fails(pool: PgPool) {
    let user_id = seed_user(&pool, "reader@test.com").await;
    let admin_id = seed_admin(&pool, "admin@test.com").await;
    let admin_token = token_for(admin_id, "admin@test.com", Role::Admin);

    let request_id = seed_request(&pool, user_id, None).await;
    let app = common::build_test_app(pool.clone());

    let response = post_auth(
        app,
        &format!("/api/v1/requests/{request_id}/approve"),
        &admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert_eq!(json["code"], "PRECONDITION_FAILED");

    let entries = LibraryEntryRepo::list_for_request(&pool, request_id)
        .await
        .expect("query should succeed");
    assert!(entries.is_empty(), "failed approval must not grant a book");
}

/// Approving a matched request grants exactly one library entry and
/// transitions exactly once.
#[sqlx::test(migrations = "../../db/migrations")]
async fn approve_grants_library_entry_exactly_once(pool: PgPool) {
    let user_id = seed_user(&pool, "reader@test.com").await;
    let admin_id = seed_admin(&pool, "admin@test.com").await;
    let user_token = token_for(user_id, "reader@test.com", Role::Client);
    let admin_token = token_for(admin_id, "admin@test.com", Role::Admin);

    let book_id = seed_book(&pool, "1984", "George Orwell", "https://example.com/1984.pdf").await;
    let request_id = seed_request(&pool, user_id, Some("1984")).await;
    let app = common::build_test_app(pool.clone());

    let response = put_json_auth(
        app.clone(),
        &format!("/api/v1/requests/{request_id}/match"),
        serde_json::json!({ "book_id": book_id }),
        &admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = post_auth(
        app.clone(),
        &format!("/api/v1/requests/{request_id}/approve"),
        &admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "approved");
    assert_eq!(json["data"]["resolving_admin_email"], "admin@test.com");
    assert!(json["data"]["updated_at"].is_string());

    // The submitter's library received the full book snapshot.
    let response = get_auth(app.clone(), "/api/v1/library", &user_token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let entries = json["data"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["title"], "1984");
    assert_eq!(entries[0]["author"], "George Orwell");
    assert_eq!(entries[0]["ebook_url"], "https://example.com/1984.pdf");
    assert_eq!(entries[0]["request_id"].as_i64().unwrap(), request_id);

    // A second approval attempt loses.
    let response = post_auth(
        app,
        &format!("/api/v1/requests/{request_id}/approve"),
        &admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let entries = LibraryEntryRepo::list_for_request(&pool, request_id)
        .await
        .expect("query should succeed");
    assert_eq!(entries.len(), 1, "exactly one grant per approved request");
}

/// Rejection resolves the request and never touches the library.
#[sqlx::test(migrations = "../../db/migrations")]
async fn reject_never_creates_library_entry(pool: PgPool) {
    let user_id = seed_user(&pool, "reader@test.com").await;
    let admin_id = seed_admin(&pool, "admin@test.com").await;
    let admin_token = token_for(admin_id, "admin@test.com", Role::Admin);

    let book_id = seed_book(&pool, "1984", "George Orwell", "https://example.com/1984.pdf").await;
    let request_id = seed_request(&pool, user_id, None).await;
    let app = common::build_test_app(pool.clone());

    // Even a matched request grants nothing on rejection.
    let response = put_json_auth(
        app.clone(),
        &format!("/api/v1/requests/{request_id}/match"),
        serde_json::json!({ "book_id": book_id }),
        &admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = post_auth(
        app.clone(),
        &format!("/api/v1/requests/{request_id}/reject"),
        &admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "rejected");

    let entries = LibraryEntryRepo::list_for_user(&pool, user_id)
        .await
        .expect("query should succeed");
    assert!(entries.is_empty());

    // The transition happened; a second resolution attempt fails.
    let response = post_auth(
        app,
        &format!("/api/v1/requests/{request_id}/approve"),
        &admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

/// Clients cannot invoke lifecycle transitions.
#[sqlx::test(migrations = "../../db/migrations")]
async fn client_cannot_resolve_requests(pool: PgPool) {
    let user_id = seed_user(&pool, "reader@test.com").await;
    let user_token = token_for(user_id, "reader@test.com", Role::Client);

    let request_id = seed_request(&pool, user_id, None).await;
    let app = common::build_test_app(pool);

    for action in ["approve", "reject"] {
        let response = post_auth(
            app.clone(),
            &format!("/api/v1/requests/{request_id}/{action}"),
            &user_token,
        )
        .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}

// ---------------------------------------------------------------------------
// Automatic matching
// ---------------------------------------------------------------------------

/// The sweep fills the match copy for titled pending requests and is
/// idempotent; the full 1984 scenario ends with the grant in the library.
#[sqlx::test(migrations = "../../db/migrations")]
async fn automatic_match_then_approval_grants_book(pool: PgPool) {
    let user_id = seed_user(&pool, "reader@test.com").await;
    let admin_id = seed_admin(&pool, "admin@test.com").await;
    let user_token = token_for(user_id, "reader@test.com", Role::Client);
    let admin_token = token_for(admin_id, "admin@test.com", Role::Admin);

    let book_id = seed_book(&pool, "1984", "George Orwell", "https://example.com/1984.pdf").await;
    let request_id = seed_request(&pool, user_id, Some("1984")).await;

    let matched = run_matching_pass(&pool).await.expect("pass should succeed");
    assert_eq!(matched, 1);

    let request = RequestRepo::find_by_id(&pool, request_id)
        .await
        .expect("lookup should succeed")
        .expect("request must exist");
    assert_eq!(request.matched_book_id, Some(book_id));
    assert_eq!(request.matched_book_title.as_deref(), Some("1984"));
    assert_eq!(request.matched_book_author.as_deref(), Some("George Orwell"));

    // Idempotent: a second pass changes nothing.
    let matched = run_matching_pass(&pool).await.expect("pass should succeed");
    assert_eq!(matched, 0);
    let again = RequestRepo::find_by_id(&pool, request_id)
        .await
        .expect("lookup should succeed")
        .expect("request must exist");
    assert_eq!(again.matched_book_id, request.matched_book_id);

    // Approval completes the scenario.
    let app = common::build_test_app(pool);
    let response = post_auth(
        app.clone(),
        &format!("/api/v1/requests/{request_id}/approve"),
        &admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get_auth(app, "/api/v1/library", &user_token).await;
    let json = body_json(response).await;
    let entries = json["data"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["title"], "1984");
    assert_eq!(entries[0]["author"], "George Orwell");
    assert_eq!(entries[0]["ebook_url"], "https://example.com/1984.pdf");
}

/// The sweep matches on a case-normalized title prefix.
#[sqlx::test(migrations = "../../db/migrations")]
async fn automatic_match_uses_title_prefix(pool: PgPool) {
    let user_id = seed_user(&pool, "reader@test.com").await;

    seed_book(
        &pool,
        "Le Petit Prince",
        "Antoine de Saint-Exupéry",
        "https://example.com/petit-prince.pdf",
    )
    .await;
    let hit = seed_request(&pool, user_id, Some("LE PETIT")).await;
    let miss = seed_request(&pool, user_id, Some("MOBY DICK")).await;

    let matched = run_matching_pass(&pool).await.expect("pass should succeed");
    assert_eq!(matched, 1);

    let hit_row = RequestRepo::find_by_id(&pool, hit)
        .await
        .expect("lookup should succeed")
        .expect("request must exist");
    assert_eq!(
        hit_row.matched_book_title.as_deref(),
        Some("Le Petit Prince")
    );

    let miss_row = RequestRepo::find_by_id(&pool, miss)
        .await
        .expect("lookup should succeed")
        .expect("request must exist");
    assert!(miss_row.matched_book_id.is_none());
}

/// The library projection is scoped to its owner.
#[sqlx::test(migrations = "../../db/migrations")]
async fn library_is_scoped_to_owner(pool: PgPool) {
    let alice_id = seed_user(&pool, "alice@test.com").await;
    let bob_id = seed_user(&pool, "bob@test.com").await;
    let admin_id = seed_admin(&pool, "admin@test.com").await;
    let bob_token = token_for(bob_id, "bob@test.com", Role::Client);
    let admin_token = token_for(admin_id, "admin@test.com", Role::Admin);

    let book_id = seed_book(&pool, "1984", "George Orwell", "https://example.com/1984.pdf").await;
    let request_id = seed_request(&pool, alice_id, Some("1984")).await;
    let app = common::build_test_app(pool);

    let response = put_json_auth(
        app.clone(),
        &format!("/api/v1/requests/{request_id}/match"),
        serde_json::json!({ "book_id": book_id }),
        &admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = post_auth(
        app.clone(),
        &format!("/api/v1/requests/{request_id}/approve"),
        &admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Alice's grant is invisible to Bob.
    let response = get_auth(app, "/api/v1/library", &bob_token).await;
    let json = body_json(response).await;
    assert!(json["data"].as_array().unwrap().is_empty());
}
