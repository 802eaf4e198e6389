//! HTTP-level integration tests for the record listing, filters, and CRUD.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, delete_auth, get_auth, post_json_auth, put_json_auth, seed_user_with_token,
};
use sqlx::PgPool;
use suivi_core::types::DbId;
use suivi_db::models::record::{ChangeRecord, CreateRecord};
use suivi_db::repositories::RecordRepo;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Insert a record directly in the database.
async fn seed_record(
    pool: &PgPool,
    creator_id: DbId,
    reference: &str,
    product_line: &str,
    model: &str,
    title: &str,
) -> ChangeRecord {
    let input = CreateRecord {
        reference: reference.to_string(),
        product_line: product_line.to_string(),
        model: model.to_string(),
        title: title.to_string(),
        description: None,
        affected_serials: None,
        supplier: None,
        subassembly: None,
        component: None,
        validated_on: None,
        in_production_since: None,
        sheet_part_name: None,
        external_code: None,
    };
    RecordRepo::create(pool, creator_id, &input)
        .await
        .expect("record creation should succeed")
}

fn minimal_record_body(reference: &str) -> serde_json::Value {
    serde_json::json!({
        "reference": reference,
        "product_line": "X-Series",
        "model": "X100",
        "title": "Replace worn connector",
    })
}

// ---------------------------------------------------------------------------
// Listing, filters, pagination
// ---------------------------------------------------------------------------

/// The listing requires authentication.
#[sqlx::test(migrations = "../db/migrations")]
async fn list_requires_auth(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = common::get(app, "/api/v1/records").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// A reader can list records and receives the pagination envelope.
#[sqlx::test(migrations = "../db/migrations")]
async fn list_returns_pagination_envelope(pool: PgPool) {
    let (editor, _) = seed_user_with_token(&pool, "editor1", "editor").await;
    let (_, reader_token) = seed_user_with_token(&pool, "reader1", "reader").await;
    seed_record(&pool, editor.id, "FS-001", "X-Series", "X100", "First").await;
    seed_record(&pool, editor.id, "FS-002", "X-Series", "X200", "Second").await;

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/records", &reader_token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);
    assert_eq!(json["pagination"]["page"], 1);
    assert_eq!(json["pagination"]["limit"], 20);
    assert_eq!(json["pagination"]["total"], 2);
    assert_eq!(json["pagination"]["total_pages"], 1);

    // Every list item embeds the creator summary and an attachments array.
    let first = &json["data"][0];
    assert_eq!(first["creator"]["id"], editor.id);
    assert!(first["attachments"].is_array());
}

/// The listing is ordered most-recently-updated first.
#[sqlx::test(migrations = "../db/migrations")]
async fn list_orders_by_updated_at_desc(pool: PgPool) {
    let (editor, token) = seed_user_with_token(&pool, "editor2", "editor").await;
    seed_record(&pool, editor.id, "FS-OLD", "X-Series", "X100", "Old").await;
    let recent = seed_record(&pool, editor.id, "FS-NEW", "X-Series", "X100", "New").await;

    // Touch the older record so it jumps to the front.
    let older = RecordRepo::find_by_reference(&pool, "FS-OLD")
        .await
        .expect("lookup should succeed")
        .expect("record should exist");
    sqlx::query("UPDATE records SET updated_at = NOW() + INTERVAL '1 hour' WHERE id = $1")
        .bind(older.id)
        .execute(&pool)
        .await
        .expect("touch should succeed");

    let app = common::build_test_app(pool);
    let json = body_json(get_auth(app, "/api/v1/records", &token).await).await;

    assert_eq!(json["data"][0]["reference"], "FS-OLD");
    assert_eq!(json["data"][1]["id"], recent.id);
}

/// Pages are disjoint and the total covers the whole result set.
#[sqlx::test(migrations = "../db/migrations")]
async fn pagination_pages_are_disjoint(pool: PgPool) {
    let (editor, token) = seed_user_with_token(&pool, "editor3", "editor").await;
    for i in 0..5 {
        seed_record(&pool, editor.id, &format!("FS-{i:03}"), "X", "X1", "T").await;
    }

    let app = common::build_test_app(pool.clone());
    let page1 = body_json(get_auth(app, "/api/v1/records?page=1&limit=2", &token).await).await;
    let app = common::build_test_app(pool);
    let page2 = body_json(get_auth(app, "/api/v1/records?page=2&limit=2", &token).await).await;

    assert_eq!(page1["pagination"]["total"], 5);
    assert_eq!(page1["pagination"]["total_pages"], 3);
    assert_eq!(page1["data"].as_array().unwrap().len(), 2);
    assert_eq!(page2["data"].as_array().unwrap().len(), 2);

    let ids = |page: &serde_json::Value| -> Vec<i64> {
        page["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["id"].as_i64().unwrap())
            .collect()
    };
    for id in ids(&page1) {
        assert!(!ids(&page2).contains(&id), "pages must not overlap");
    }
}

/// Exact-match filters combine with AND; search matches substrings
/// case-insensitively.
#[sqlx::test(migrations = "../db/migrations")]
async fn filters_and_search(pool: PgPool) {
    let (editor, token) = seed_user_with_token(&pool, "editor4", "editor").await;
    seed_record(&pool, editor.id, "FS-A", "Alpha", "A1", "Connector swap").await;
    seed_record(&pool, editor.id, "FS-B", "Alpha", "A2", "Firmware update").await;
    seed_record(&pool, editor.id, "FS-C", "Beta", "B1", "Connector swap").await;

    let app = common::build_test_app(pool.clone());
    let json = body_json(
        get_auth(app, "/api/v1/records?product_line=Alpha&model=A1", &token).await,
    )
    .await;
    assert_eq!(json["pagination"]["total"], 1);
    assert_eq!(json["data"][0]["reference"], "FS-A");

    let app = common::build_test_app(pool);
    let json = body_json(get_auth(app, "/api/v1/records?search=CONNECTOR", &token).await).await;
    assert_eq!(json["pagination"]["total"], 2);
}

/// /records/filters returns the distinct dropdown values.
#[sqlx::test(migrations = "../db/migrations")]
async fn filter_values_are_distinct(pool: PgPool) {
    let (editor, token) = seed_user_with_token(&pool, "editor5", "editor").await;
    seed_record(&pool, editor.id, "FS-1", "Alpha", "A1", "T").await;
    seed_record(&pool, editor.id, "FS-2", "Alpha", "A2", "T").await;
    seed_record(&pool, editor.id, "FS-3", "Beta", "A1", "T").await;

    let app = common::build_test_app(pool);
    let json = body_json(get_auth(app, "/api/v1/records/filters", &token).await).await;

    assert_eq!(json["product_lines"], serde_json::json!(["Alpha", "Beta"]));
    assert_eq!(json["models"], serde_json::json!(["A1", "A2"]));
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

/// An editor can create a record; the creator is taken from the token.
#[sqlx::test(migrations = "../db/migrations")]
async fn create_record_as_editor(pool: PgPool) {
    let (editor, token) = seed_user_with_token(&pool, "editor6", "editor").await;
    let app = common::build_test_app(pool);

    let response =
        post_json_auth(app, "/api/v1/records", &token, minimal_record_body("FS-100")).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["reference"], "FS-100");
    assert_eq!(json["creator_id"], editor.id);
}

/// A reader cannot create records.
#[sqlx::test(migrations = "../db/migrations")]
async fn create_record_as_reader_is_forbidden(pool: PgPool) {
    let (_, token) = seed_user_with_token(&pool, "reader2", "reader").await;
    let app = common::build_test_app(pool);

    let response =
        post_json_auth(app, "/api/v1/records", &token, minimal_record_body("FS-101")).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

/// A duplicate reference is rejected with 400.
#[sqlx::test(migrations = "../db/migrations")]
async fn duplicate_reference_is_rejected(pool: PgPool) {
    let (editor, token) = seed_user_with_token(&pool, "editor7", "editor").await;
    seed_record(&pool, editor.id, "FS-DUP", "X", "X1", "T").await;

    let app = common::build_test_app(pool);
    let response =
        post_json_auth(app, "/api/v1/records", &token, minimal_record_body("FS-DUP")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["code"], "DUPLICATE_KEY");
}

/// Missing required fields are rejected with 400.
#[sqlx::test(migrations = "../db/migrations")]
async fn blank_required_field_is_rejected(pool: PgPool) {
    let (_, token) = seed_user_with_token(&pool, "editor8", "editor").await;
    let app = common::build_test_app(pool);

    let mut body = minimal_record_body("FS-102");
    body["title"] = serde_json::json!("   ");
    let response = post_json_auth(app, "/api/v1/records", &token, body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// The detail view embeds creator, attachments, and purchases.
#[sqlx::test(migrations = "../db/migrations")]
async fn get_record_detail(pool: PgPool) {
    let (editor, token) = seed_user_with_token(&pool, "editor9", "editor").await;
    let record = seed_record(&pool, editor.id, "FS-DET", "X", "X1", "Detail").await;

    let app = common::build_test_app(pool);
    let response = get_auth(app, &format!("/api/v1/records/{}", record.id), &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["reference"], "FS-DET");
    assert_eq!(json["creator"]["id"], editor.id);
    assert!(json["attachments"].as_array().unwrap().is_empty());
    assert!(json["purchases"].as_array().unwrap().is_empty());
}

/// Fetching a nonexistent record returns 404.
#[sqlx::test(migrations = "../db/migrations")]
async fn get_nonexistent_record_returns_404(pool: PgPool) {
    let (_, token) = seed_user_with_token(&pool, "reader3", "reader").await;
    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/records/999999", &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

/// Partial update: omitted fields keep their value, explicit null clears.
#[sqlx::test(migrations = "../db/migrations")]
async fn update_is_partial(pool: PgPool) {
    let (editor, token) = seed_user_with_token(&pool, "editor10", "editor").await;
    let record = seed_record(&pool, editor.id, "FS-UPD", "X", "X1", "Before").await;
    sqlx::query("UPDATE records SET description = 'original' WHERE id = $1")
        .bind(record.id)
        .execute(&pool)
        .await
        .expect("seed description");

    // Omitting description keeps it.
    let app = common::build_test_app(pool.clone());
    let response = put_json_auth(
        app,
        &format!("/api/v1/records/{}", record.id),
        &token,
        serde_json::json!({ "title": "After" }),
    )
    .await;
    let json = common::expect_json(response, StatusCode::OK).await;
    assert_eq!(json["title"], "After");
    assert_eq!(json["description"], "original");
    assert_eq!(json["reference"], "FS-UPD");

    // Explicit null clears it.
    let app = common::build_test_app(pool);
    let response = put_json_auth(
        app,
        &format!("/api/v1/records/{}", record.id),
        &token,
        serde_json::json!({ "description": null }),
    )
    .await;
    let json = common::expect_json(response, StatusCode::OK).await;
    assert!(json["description"].is_null());
}

/// Changing the reference to one already taken is rejected with 400.
#[sqlx::test(migrations = "../db/migrations")]
async fn update_to_duplicate_reference_is_rejected(pool: PgPool) {
    let (editor, token) = seed_user_with_token(&pool, "editor11", "editor").await;
    seed_record(&pool, editor.id, "FS-TAKEN", "X", "X1", "T").await;
    let record = seed_record(&pool, editor.id, "FS-FREE", "X", "X1", "T").await;

    let app = common::build_test_app(pool);
    let response = put_json_auth(
        app,
        &format!("/api/v1/records/{}", record.id),
        &token,
        serde_json::json!({ "reference": "FS-TAKEN" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// Required fields can be omitted on update but never blanked.
#[sqlx::test(migrations = "../db/migrations")]
async fn update_cannot_blank_required_fields(pool: PgPool) {
    let (editor, token) = seed_user_with_token(&pool, "editor16", "editor").await;
    let record = seed_record(&pool, editor.id, "FS-BLANK", "X", "X1", "Keep me").await;

    for field in ["reference", "product_line", "model", "title"] {
        let app = common::build_test_app(pool.clone());
        let response = put_json_auth(
            app,
            &format!("/api/v1/records/{}", record.id),
            &token,
            serde_json::json!({ field: "   " }),
        )
        .await;
        assert_eq!(
            response.status(),
            StatusCode::BAD_REQUEST,
            "blank {field} must be rejected"
        );
    }

    let unchanged = RecordRepo::find_by_id(&pool, record.id)
        .await
        .expect("lookup should succeed")
        .expect("record should still exist");
    assert_eq!(unchanged.title, "Keep me");
}

/// Deleting a record cascades to its purchase entries.
#[sqlx::test(migrations = "../db/migrations")]
async fn delete_record_cascades(pool: PgPool) {
    let (editor, token) = seed_user_with_token(&pool, "editor12", "editor").await;
    let record = seed_record(&pool, editor.id, "FS-DEL", "X", "X1", "T").await;

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        &format!("/api/v1/records/{}/purchases", record.id),
        &token,
        serde_json::json!({ "designation": "Temp part" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let app = common::build_test_app(pool.clone());
    let response = delete_auth(app, &format!("/api/v1/records/{}", record.id), &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM purchases WHERE record_id = $1")
        .bind(record.id)
        .fetch_one(&pool)
        .await
        .expect("count should succeed");
    assert_eq!(remaining, 0);
}

/// Deleting a nonexistent record returns 404.
#[sqlx::test(migrations = "../db/migrations")]
async fn delete_nonexistent_record_returns_404(pool: PgPool) {
    let (_, token) = seed_user_with_token(&pool, "editor13", "editor").await;
    let app = common::build_test_app(pool);
    let response = delete_auth(app, "/api/v1/records/999999", &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Purchases
// ---------------------------------------------------------------------------

/// A purchase under the wrong record path is a 404 even though it exists.
#[sqlx::test(migrations = "../db/migrations")]
async fn purchase_is_scoped_to_its_record(pool: PgPool) {
    let (editor, token) = seed_user_with_token(&pool, "editor14", "editor").await;
    let record_a = seed_record(&pool, editor.id, "FS-PA", "X", "X1", "A").await;
    let record_b = seed_record(&pool, editor.id, "FS-PB", "X", "X1", "B").await;

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        &format!("/api/v1/records/{}/purchases", record_a.id),
        &token,
        serde_json::json!({ "designation": "Bracket" }),
    )
    .await;
    let json = common::expect_json(response, StatusCode::CREATED).await;
    let purchase_id = json["id"].as_i64().unwrap();
    assert_eq!(json["status"], "in_progress");

    let app = common::build_test_app(pool);
    let response = delete_auth(
        app,
        &format!("/api/v1/records/{}/purchases/{purchase_id}", record_b.id),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

/// Negative quantities and unknown statuses are rejected.
#[sqlx::test(migrations = "../db/migrations")]
async fn purchase_validation(pool: PgPool) {
    let (editor, token) = seed_user_with_token(&pool, "editor15", "editor").await;
    let record = seed_record(&pool, editor.id, "FS-PV", "X", "X1", "T").await;

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        &format!("/api/v1/records/{}/purchases", record.id),
        &token,
        serde_json::json!({ "designation": "Bad", "quantity": -1 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let app = common::build_test_app(pool);
    let response = post_json_auth(
        app,
        &format!("/api/v1/records/{}/purchases", record.id),
        &token,
        serde_json::json!({ "designation": "Bad", "status": "on_hold" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
