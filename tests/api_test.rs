use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use commission_ledger::auth::{StaticTokenValidator, TokenValidator};
use commission_ledger::commission::CommissionConfig;
use commission_ledger::handlers;
use commission_ledger::state::AppState;
use serde_json::{json, Value};
use tempfile::TempDir;

const TOKEN: &str = "secret-token";

async fn test_app_state() -> (AppState, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("ledger.db");
    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());
    let auth: Arc<dyn TokenValidator> =
        Arc::new(StaticTokenValidator::new(vec![TOKEN.to_string()]));
    let state = AppState::new(&db_url, CommissionConfig::default(), auth)
        .await
        .unwrap();
    (state, temp_dir)
}

macro_rules! init_app {
    ($state:expr) => {
        test::init_service(
            App::new().app_data(web::Data::new($state)).service(
                web::scope("/api/v1")
                    .service(handlers::index)
                    .service(handlers::process_transaction)
                    .service(handlers::get_transactions)
                    .service(handlers::get_transaction)
                    .service(handlers::get_commission_summary),
            ),
        )
        .await
    };
}

fn post_transaction(body: Value) -> actix_web::test::TestRequest {
    test::TestRequest::post()
        .uri("/api/v1/transactions")
        .insert_header(("Authorization", format!("Bearer {}", TOKEN)))
        .set_json(body)
}

fn get(uri: &str) -> actix_web::test::TestRequest {
    test::TestRequest::get()
        .uri(uri)
        .insert_header(("Authorization", format!("Bearer {}", TOKEN)))
}

#[actix_web::test]
async fn processing_a_valid_transaction_returns_201() {
    let (state, _temp) = test_app_state().await;
    let app = init_app!(state);

    let req = post_transaction(json!({
        "sellerId": "seller-1",
        "amount": "100.00",
        "currency": "USD",
    }))
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["sellerId"], "seller-1");
    assert_eq!(body["amount"], "100.00");
    assert_eq!(body["currency"], "USD");
    assert_eq!(body["status"], "completed");
    assert!(body["id"].is_string());
}

#[actix_web::test]
async fn created_transactions_can_be_fetched_by_id() {
    let (state, _temp) = test_app_state().await;
    let app = init_app!(state);

    let req = post_transaction(json!({
        "sellerId": "seller-1",
        "amount": "42.50",
        "currency": "EUR",
    }))
    .to_request();
    let created: Value = test::read_body_json(test::call_service(&app, req).await).await;
    let id = created["id"].as_str().unwrap().to_string();

    let req = get(&format!("/api/v1/transactions/{}", id)).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["id"], id.as_str());
    assert_eq!(body["amount"], "42.50");
}

#[actix_web::test]
async fn invalid_bodies_return_422_with_field_errors() {
    let (state, _temp) = test_app_state().await;
    let app = init_app!(state);

    let req = post_transaction(json!({
        "sellerId": "",
        "amount": "-5.00",
        "currency": "JPY",
    }))
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = test::read_body_json(resp).await;
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"sellerId"));
    assert!(fields.contains(&"amount"));
    assert!(fields.contains(&"currency"));
}

#[actix_web::test]
async fn numeric_amounts_are_accepted() {
    let (state, _temp) = test_app_state().await;
    let app = init_app!(state);

    let req = post_transaction(json!({
        "sellerId": "seller-1",
        "amount": 100.5,
        "currency": "USD",
    }))
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["amount"], "100.50");
}

#[actix_web::test]
async fn unknown_and_malformed_ids_return_404() {
    let (state, _temp) = test_app_state().await;
    let app = init_app!(state);

    let req = get("/api/v1/transactions/7b6cf1f5-85b8-4d5e-8cbe-18d3f06cde1b").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = get("/api/v1/transactions/not-a-uuid").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn commission_summary_aggregates_over_the_wire() {
    let (state, _temp) = test_app_state().await;
    let app = init_app!(state);

    for _ in 0..2 {
        let req = post_transaction(json!({
            "sellerId": "seller-1",
            "amount": "100.00",
            "currency": "USD",
        }))
        .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let req = get("/api/v1/sellers/seller-1/commission-summary").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["sellerId"], "seller-1");
    assert_eq!(body["totalCommission"], "10.00");
    assert_eq!(body["transactionCount"], 2);
}

#[actix_web::test]
async fn summary_for_an_unknown_seller_is_zero_not_an_error() {
    let (state, _temp) = test_app_state().await;
    let app = init_app!(state);

    let req = get("/api/v1/sellers/nobody/commission-summary").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["totalCommission"], "0.00");
    assert_eq!(body["transactionCount"], 0);
}

#[actix_web::test]
async fn listing_validates_the_status_filter() {
    let (state, _temp) = test_app_state().await;
    let app = init_app!(state);

    let req = get("/api/v1/transactions?status=completed").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = get("/api/v1/transactions?status=success").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn requests_without_a_valid_bearer_token_get_401() {
    let (state, _temp) = test_app_state().await;
    let app = init_app!(state);

    let req = test::TestRequest::get()
        .uri("/api/v1/transactions")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri("/api/v1/transactions")
        .insert_header(("Authorization", "Bearer wrong-token"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/api/v1/transactions")
        .insert_header(("Authorization", format!("Token {}", TOKEN)))
        .set_json(json!({"sellerId": "s", "amount": "1.00", "currency": "USD"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
