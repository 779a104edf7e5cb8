//! # Maguva Back-Office API
//!
//! HTTP/JSON server for the back-office front-end.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Back-Office API Routes                          │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐│
//! │  │  Catalog       │  │  Inventory     │  │  Sales                     ││
//! │  │                │  │                │  │                            ││
//! │  │ • /vendors/…   │  │ • /inventory…  │  │ • /transactions/create     ││
//! │  │ • /products…   │  │ • /stock-…     │  │ • /transactions/list       ││
//! │  └────────────────┘  └────────────────┘  └────────────────────────────┘│
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐│
//! │  │  Tailoring     │  │  Analytics     │  │  Accounts                  ││
//! │  │                │  │                │  │                            ││
//! │  │ • /tailor/…    │  │ • /dashboard/… │  │ • /login                   ││
//! │  │                │  │ • /manguva/…   │  │ • /auth/verify             ││
//! │  └────────────────┘  └────────────────┘  └────────────────────────────┘│
//! │                                                                         │
//! │  Layers: TraceLayer (request spans) → CorsLayer → handlers             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables:
//! - `HTTP_HOST` / `HTTP_PORT` - bind address (default: 0.0.0.0:8000)
//! - `DATABASE_PATH` - SQLite file (default: ./maguva.db)
//! - `DB_MAX_CONNECTIONS` - pool size (default: 5)
//! - `JWT_SECRET` - Secret for JWT signing
//! - `JWT_ACCESS_LIFETIME_SECS` - Access token lifetime (default: 86400)
//! - `REPORT_UTC_OFFSET_MINUTES` - shop calendar offset (default: 330)
//! - `CORS_ALLOW_ANY` - permissive CORS (default: true)

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod state;

use axum::routing::{delete, get, patch, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{
    auth as auth_handlers, dashboard, health, inventory, orders, products, report, tailor, vendors,
};

// Re-exports
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use state::{AppState, SharedState};

/// Builds the application router with all routes and layers.
pub fn build_router(state: SharedState) -> Router {
    let cors = if state.config.cors_allow_any {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
    };

    Router::new()
        // Accounts
        .route("/login", post(auth_handlers::login))
        .route("/auth/verify", get(auth_handlers::verify))
        .route("/health", get(health::health))
        // Vendors
        .route("/vendors/", get(vendors::list))
        .route("/vendors/add", post(vendors::create))
        .route(
            "/vendors/{id}/",
            get(vendors::get).put(vendors::update).patch(vendors::update),
        )
        .route("/vendors/{id}/analytics/", get(vendors::analytics))
        // Products
        .route("/products", get(products::list))
        .route("/products/add", post(products::create))
        .route("/products/add/features", get(products::features))
        .route("/products/{id}", delete(products::delete))
        .route(
            "/products/{id}/",
            put(products::update).patch(products::update),
        )
        .route(
            "/products/edit/{id}",
            put(products::update).patch(products::update),
        )
        // Inventory
        .route("/products/add/inventory", post(inventory::receive))
        .route("/products/{id}/inventory", get(inventory::product_inventory))
        .route("/products/delete/{id}/inventory", delete(inventory::delete_unit))
        .route("/inventory", get(inventory::grouped))
        .route("/inventory/products", get(inventory::product_select))
        .route("/inventory/search/", get(inventory::search))
        .route("/stock-batches/", get(inventory::batches))
        // Sales
        .route("/transactions/create", post(orders::create))
        .route("/transactions/list", get(orders::list))
        // Analytics
        .route("/dashboard/analytics/", get(dashboard::analytics))
        .route("/manguva/report/", get(report::daily))
        // Tailoring
        .route("/tailor/orders/", get(tailor::list))
        .route("/tailor/orders/add/", post(tailor::create))
        .route(
            "/tailor/orders/{id}/update/",
            put(tailor::update).patch(tailor::update),
        )
        .route("/tailor/orders/{id}/payment/", patch(tailor::record_payment))
        .route("/tailor/orders/{id}/delete", delete(tailor::delete))
        .route("/tailor/orders/items/{id}/delete/", delete(tailor::delete_item))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use http_body_util::BodyExt;
    use maguva_db::repository::user::NewUserFlags;
    use maguva_db::{Database, DbConfig};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    const PASSWORD: &str = "correct-horse";

    async fn test_app() -> (Router, SharedState) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let state = AppState::new(db, ApiConfig::for_tests());
        (build_router(state.clone()), state)
    }

    async fn add_user(state: &SharedState, email: &str, staff: bool) {
        state
            .db
            .users()
            .create(
                email,
                "Test User",
                PASSWORD,
                NewUserFlags {
                    is_staff: staff,
                    is_superuser: staff,
                },
            )
            .await
            .unwrap();
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn login(app: &Router, email: &str) -> String {
        let (status, body) = send(
            app,
            Method::POST,
            "/login",
            None,
            Some(json!({ "email": email, "password": PASSWORD })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        body["access"].as_str().unwrap().to_string()
    }

    async fn admin_token(app: &Router, state: &SharedState) -> String {
        add_user(state, "admin@maguva.in", true).await;
        login(app, "admin@maguva.in").await
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _) = test_app().await;
        let (status, body) = send(&app, Method::GET, "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["database"], true);
        assert!(body["migrations"]["total"].as_u64().unwrap() >= 1);
        assert_eq!(body["migrations"]["applied"], body["migrations"]["total"]);
    }

    #[tokio::test]
    async fn test_login_and_verify() {
        let (app, state) = test_app().await;
        add_user(&state, "owner@maguva.in", true).await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/login",
            None,
            Some(json!({ "email": "owner@maguva.in", "password": "wrong-password" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid credentials");

        let token = login(&app, "owner@maguva.in").await;
        let (status, body) = send(&app, Method::GET, "/auth/verify", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["email"], "owner@maguva.in");
        assert_eq!(body["user"]["role"], "admin");
    }

    #[tokio::test]
    async fn test_missing_token_and_insufficient_role() {
        let (app, state) = test_app().await;

        let (status, body) = send(&app, Method::GET, "/vendors/", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body["error"].is_string());

        let (status, _) = send(&app, Method::GET, "/vendors/", Some("not-a-jwt"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        add_user(&state, "clerk@maguva.in", false).await;
        let token = login(&app, "clerk@maguva.in").await;

        let (status, _) = send(&app, Method::GET, "/vendors/", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(
            &app,
            Method::POST,
            "/vendors/add",
            Some(&token),
            Some(json!({ "vendor_name": "Anand Silks" })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_receive_and_sell_flow() {
        let (app, state) = test_app().await;
        let token = admin_token(&app, &state).await;

        let (status, vendor) = send(
            &app,
            Method::POST,
            "/vendors/add",
            Some(&token),
            Some(json!({
                "vendor_name": "Anand Silks",
                "contact_person_name": "Anand R",
                "phone": "9876543210",
                "email": "anand@example.com",
                "street": "Main Bazaar",
                "city": "Kanchipuram",
                "state": "Tamil Nadu",
                "zip_code": "631501",
                "country": "India"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, product) = send(
            &app,
            Method::POST,
            "/products/add",
            Some(&token),
            Some(json!({
                "vendor_id": vendor["id"],
                "product_type": "Kurti",
                "fabric_type": "Cotton",
                "color_code": "#FF5733",
                "base_price": 600,
                "markup_type": "fixed",
                "markup_price": "200.00"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(product["mrp"], 800.0);
        assert_eq!(product["discount_percentage"], 0.0);
        let product_id = product["id"].as_str().unwrap().to_string();

        let (status, receipt) = send(
            &app,
            Method::POST,
            "/products/add/inventory",
            Some(&token),
            Some(json!([{ "product": product_id, "size": "M", "quantity": 5 }])),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(receipt["batch_number"], 1);
        assert_eq!(receipt["total_quantity"], 5);
        let units = receipt["items"].as_array().unwrap().clone();
        assert_eq!(units.len(), 5);

        let line = |unit: &Value| {
            json!({
                "inventoryId": unit["id"],
                "productId": product_id,
                "price": 1000,
                "discount": 10
            })
        };
        let (status, sale) = send(
            &app,
            Method::POST,
            "/transactions/create",
            Some(&token),
            Some(json!({
                "customer": { "name": "Lakshmi", "mobile": "9876543210" },
                "payment": { "method": "upi", "amount": 0 },
                "items": [line(&units[0]), line(&units[1])]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(sale["order_data"]["subtotal"], 2000.0);
        assert_eq!(sale["order_data"]["discount_total"], 200.0);
        assert_eq!(sale["order_data"]["gst_amount"], 324.0);
        assert_eq!(sale["order_data"]["total_amount"], 2124.0);
        assert_eq!(sale["order_data"]["items"][0]["price"], 1000.0);
        assert_eq!(sale["order_data"]["items"][0]["discount_percentage"], 10.0);
        assert_eq!(sale["order_data"]["created_by_email"], "admin@maguva.in");

        // The same unit cannot be sold twice
        let (status, body) = send(
            &app,
            Method::POST,
            "/transactions/create",
            Some(&token),
            Some(json!({ "items": [line(&units[0])] })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].is_string());

        let (_, products) = send(&app, Method::GET, "/products", Some(&token), None).await;
        assert_eq!(products[0]["stock_count"], 3);

        let (_, batches) = send(
            &app,
            Method::GET,
            &format!("/stock-batches/?product={}", product_id),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(batches[0]["sold_qty"], 2);

        let (status, orders) =
            send(&app, Method::GET, "/transactions/list", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(orders.as_array().unwrap().len(), 1);

        let (status, report) =
            send(&app, Method::GET, "/manguva/report/", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(report["kpis"]["bills"], 1);
        assert_eq!(report["kpis"]["net_revenue"], 2124.0);

        let (status, _) = send(
            &app,
            Method::DELETE,
            &format!("/products/delete/{}/inventory", units[2]["id"].as_str().unwrap()),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, products) = send(&app, Method::GET, "/products", Some(&token), None).await;
        assert_eq!(products[0]["stock_count"], 2);
    }

    #[tokio::test]
    async fn test_tailor_payment_flow() {
        let (app, state) = test_app().await;
        let token = admin_token(&app, &state).await;

        let (status, order) = send(
            &app,
            Method::POST,
            "/tailor/orders/add/",
            Some(&token),
            Some(json!({
                "customer_name": "Priya",
                "customer_mobile": "09876543210",
                "product_name": "Blouse stitching",
                "delivery_date": "2026-11-01",
                "total_amount": 1500,
                "advance_paid": "500",
                "item_details": [{ "item_name": "Blouse" }]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(order["customer_mobile"], "9876543210");
        assert_eq!(order["total_amount"], 1500.0);
        assert_eq!(order["balance_amount"], 1000.0);
        assert_eq!(order["status"], "ordered");
        let id = order["id"].as_str().unwrap().to_string();
        let payment_uri = format!("/tailor/orders/{}/payment/", id);

        let (status, body) = send(
            &app,
            Method::PATCH,
            &payment_uri,
            Some(&token),
            Some(json!({ "amount": 400 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Remaining balance must be paid in full (₹1000.00)");

        let (status, paid) = send(
            &app,
            Method::PATCH,
            &payment_uri,
            Some(&token),
            Some(json!({ "amount": "1000" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(paid["status"], "delivered");
        assert_eq!(paid["balance_amount"], 0.0);
        assert_eq!(paid["advance_paid"], 1500.0);

        let (status, _) = send(
            &app,
            Method::DELETE,
            &format!("/tailor/orders/{}/delete", id),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_bad_input_is_400() {
        let (app, state) = test_app().await;
        let token = admin_token(&app, &state).await;

        let (status, body) = send(
            &app,
            Method::GET,
            "/manguva/report/?date=15-01-2024",
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());

        let (status, report) = send(
            &app,
            Method::GET,
            "/manguva/report/?date=2024-01-15",
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(report["kpis"]["bills"], 0);

        let (status, _) = send(
            &app,
            Method::GET,
            "/dashboard/analytics/?days=0",
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        // Amounts past the column width never reach the pricing arithmetic
        let unit = "550e8400-e29b-41d4-a716-446655440000";
        for price in [json!(1e17), json!(9_223_372_036_854_775_807_i64), json!("12.345")] {
            let (status, body) = send(
                &app,
                Method::POST,
                "/transactions/create",
                Some(&token),
                Some(json!({
                    "items": [{ "inventoryId": unit, "productId": unit, "price": price, "quantity": 3 }]
                })),
            )
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert!(body["error"].is_string());
        }

        let (status, _) = send(
            &app,
            Method::PATCH,
            &format!("/tailor/orders/{}/payment/", unit),
            Some(&token),
            Some(json!({ "amount": 9_223_372_036_854_775_807_i64 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(
            &app,
            Method::POST,
            "/products/add/inventory",
            Some(&token),
            Some(json!({ "not": "a list" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());

        let (status, _) = send(
            &app,
            Method::GET,
            "/inventory/search/",
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
