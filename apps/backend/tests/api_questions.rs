//! Question supply API tests.

mod common;

use axum::http::StatusCode;
use axum_test::TestServer;

use common::fixtures;
use common::TestContext;
use quiz_core::{Category, Level};

#[tokio::test]
async fn authoring_is_gated_on_admin_before_anything_else() {
    let ctx = TestContext::new_offline();
    let server = TestServer::new(ctx.router()).unwrap();
    let token = ctx.create_session(fixtures::user_record("u1", false)).await;

    let response = server
        .post("/api/admin/questions")
        .add_header(
            axum::http::header::AUTHORIZATION,
            TestContext::auth_header_value(&token),
        )
        .json(&serde_json::json!({ "category": "fracciones", "level": "facil", "count": 10 }))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn authoring_without_a_generator_is_an_upstream_error() {
    let ctx = TestContext::new_offline();
    let server = TestServer::new(ctx.router()).unwrap();
    let token = ctx.create_session(fixtures::user_record("admin", true)).await;

    let response = server
        .post("/api/admin/questions")
        .add_header(
            axum::http::header::AUTHORIZATION,
            TestContext::auth_header_value(&token),
        )
        .json(&serde_json::json!({ "category": "fracciones", "level": "facil", "count": 10 }))
        .await;
    response.assert_status(StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn unknown_level_or_category_is_a_bad_request() {
    let ctx = TestContext::new_offline();
    let server = TestServer::new(ctx.router()).unwrap();
    let token = ctx.create_session(fixtures::user_record("u1", false)).await;

    let response = server
        .get("/api/questions/next?level=imposible&category=fracciones")
        .add_header(
            axum::http::header::AUTHORIZATION,
            TestContext::auth_header_value(&token),
        )
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = server
        .get("/api/questions/next?level=facil&category=geometria")
        .add_header(
            axum::http::header::AUTHORIZATION,
            TestContext::auth_header_value(&token),
        )
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn empty_categories_parameter_is_a_bad_request() {
    let ctx = TestContext::new_offline();
    let server = TestServer::new(ctx.router()).unwrap();
    let token = ctx.create_session(fixtures::user_record("u1", false)).await;

    let response = server
        .get("/api/questions/batch?level=facil&categories=")
        .add_header(
            axum::http::header::AUTHORIZATION,
            TestContext::auth_header_value(&token),
        )
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn cached_question_is_served_and_consumed_at_most_once() {
    let ctx = TestContext::new_offline();
    let server = TestServer::new(ctx.router()).unwrap();

    let mut record = fixtures::user_record("u1", false);
    record.question_pool = vec![fixtures::cached(fixtures::multiple_question(
        1,
        Level::Facil,
        Category::Fracciones,
    ))];
    let token = ctx.create_session(record).await;

    let response = server
        .get("/api/questions/next?level=facil&category=fracciones")
        .add_header(
            axum::http::header::AUTHORIZATION,
            TestContext::auth_header_value(&token),
        )
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["source"], "cache");
    assert_eq!(body["question"]["question"], "pregunta 1");

    // The cache entry is gone now.
    let remaining = ctx
        .state
        .sessions
        .get(&token)
        .await
        .unwrap()
        .question_pool
        .len();
    assert_eq!(remaining, 0);
}

#[tokio::test]
async fn cache_only_serves_the_matching_level_and_category() {
    let ctx = TestContext::new_offline();
    let server = TestServer::new(ctx.router()).unwrap();

    let mut record = fixtures::user_record("u1", false);
    record.question_pool = vec![fixtures::cached(fixtures::multiple_question(
        1,
        Level::Dificil,
        Category::Algebra,
    ))];
    let token = ctx.create_session(record).await;

    // Wrong level/category: falls through to the (unreachable) store.
    let response = server
        .get("/api/questions/next?level=facil&category=fracciones")
        .add_header(
            axum::http::header::AUTHORIZATION,
            TestContext::auth_header_value(&token),
        )
        .await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);

    // The cached entry was not consumed.
    let remaining = ctx
        .state
        .sessions
        .get(&token)
        .await
        .unwrap()
        .question_pool
        .len();
    assert_eq!(remaining, 1);
}

/// Serving from an empty pool reports "nothing available", not an error.
#[tokio::test]
#[ignore = "requires firebase"]
async fn empty_pool_is_a_normal_outcome() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let token = ctx.create_session(fixtures::user_record("u1", false)).await;

    // A non-admin cannot trigger generation, so a level/category nobody
    // seeded comes back empty.
    let response = server
        .get("/api/questions/next?level=dificil&category=igualdades")
        .add_header(
            axum::http::header::AUTHORIZATION,
            TestContext::auth_header_value(&token),
        )
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert!(body["question"].is_null());
}

/// A stored pool serves balanced batches.
#[tokio::test]
#[ignore = "requires firebase"]
async fn batch_draws_from_the_stored_pool() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let token = ctx.create_session(fixtures::user_record("u1", false)).await;

    let response = server
        .get("/api/questions/batch?level=facil&count=6&categories=fracciones,algebra")
        .add_header(
            axum::http::header::AUTHORIZATION,
            TestContext::auth_header_value(&token),
        )
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert!(body["questions"].as_array().unwrap().len() <= 6);
}
