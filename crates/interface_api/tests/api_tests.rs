//! HTTP API tests over the in-memory store

use std::str::FromStr;

use axum::http::StatusCode;
use axum_test::TestServer;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};

use interface_api::{config::ApiConfig, create_router};
use test_utils::memory_engine;

fn server() -> TestServer {
    TestServer::new(create_router(memory_engine(), ApiConfig::default())).unwrap()
}

fn decimal(value: &Value) -> Decimal {
    match value {
        Value::String(s) => Decimal::from_str(s).unwrap(),
        Value::Number(n) => Decimal::from_str(&n.to_string()).unwrap(),
        other => panic!("not a decimal: {other}"),
    }
}

async fn seed_dc001(server: &TestServer) {
    server
        .post("/api/v1/challans")
        .json(&json!({
            "dc_number": "DC001",
            "items": [
                { "item": "A", "dozens": 5 },
                { "item": "B", "dozens": 7 }
            ]
        }))
        .await
        .assert_status(StatusCode::CREATED);
}

async fn deliver(
    server: &TestServer,
    item: &str,
    date: &str,
    boxes: &str,
) -> axum_test::TestResponse {
    server
        .post("/api/v1/challans/DC001/deliveries")
        .json(&json!({ "item": item, "date": date, "boxes": boxes }))
        .await
}

fn invoice_body(number: &str, from: &str, to: &str) -> Value {
    json!({ "invoice_number": number, "from_date": from, "to_date": to })
}

// ============================================================================
// Health and catalog
// ============================================================================

mod health_tests {
    use super::*;

    #[tokio::test]
    async fn test_health_and_readiness() {
        let server = server();

        server.get("/health").await.assert_status_ok();

        let ready: Value = server.get("/health/ready").await.json();
        assert_eq!(ready["status"], "ready");
    }

    #[tokio::test]
    async fn test_catalog_lists_items_in_order() {
        let body: Value = server().get("/api/v1/catalog").await.json();

        let names: Vec<&str> = body["items"]
            .as_array()
            .unwrap()
            .iter()
            .map(|item| item["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert_eq!(body["currency"], "INR");
    }
}

// ============================================================================
// Challans
// ============================================================================

mod challan_tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_fetch_challan() {
        let server = server();
        seed_dc001(&server).await;

        let body: Value = server.get("/api/v1/challans/DC001").await.json();
        assert_eq!(body["rows"][0]["item"], "A");
        assert_eq!(decimal(&body["rows"][0]["boxes"]), dec!(10));
        assert_eq!(decimal(&body["rows"][1]["boxes"]), dec!(8.40));
        assert_eq!(decimal(&body["planned_boxes"]), dec!(18.40));

        let list: Value = server.get("/api/v1/challans").await.json();
        assert_eq!(list.as_array().unwrap().len(), 1);
        assert_eq!(list[0]["item_count"], 2);
    }

    #[tokio::test]
    async fn test_duplicate_challan_conflicts() {
        let server = server();
        seed_dc001(&server).await;

        let response = server
            .post("/api/v1/challans")
            .json(&json!({ "dc_number": "DC001", "items": [{ "item": "A", "dozens": 1 }] }))
            .await;

        response.assert_status(StatusCode::CONFLICT);
        let body: Value = response.json();
        assert_eq!(body["error"], "conflict");
    }

    #[tokio::test]
    async fn test_invalid_challans_rejected() {
        let server = server();

        server
            .post("/api/v1/challans")
            .json(&json!({ "dc_number": "DC002", "items": [] }))
            .await
            .assert_status(StatusCode::UNPROCESSABLE_ENTITY);

        server
            .post("/api/v1/challans")
            .json(&json!({ "dc_number": "DC002", "items": [{ "item": "Z", "dozens": 1 }] }))
            .await
            .assert_status(StatusCode::UNPROCESSABLE_ENTITY);

        server
            .get("/api/v1/challans/DC002")
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn test_replan_and_delete_row() {
        let server = server();
        seed_dc001(&server).await;

        let row: Value = server
            .put("/api/v1/challans/DC001/items/A")
            .json(&json!({ "dozens": 6 }))
            .await
            .json();
        assert_eq!(decimal(&row["boxes"]), dec!(12));

        server
            .delete("/api/v1/challans/DC001/items/A")
            .await
            .assert_status(StatusCode::NO_CONTENT);
        server
            .delete("/api/v1/challans/DC001/items/A")
            .await
            .assert_status_not_found();

        server
            .delete("/api/v1/challans/DC001")
            .await
            .assert_status(StatusCode::NO_CONTENT);
        server
            .get("/api/v1/challans/DC001")
            .await
            .assert_status_not_found();
    }
}

// ============================================================================
// Deliveries
// ============================================================================

mod delivery_tests {
    use super::*;

    #[tokio::test]
    async fn test_over_delivery_rejected() {
        let server = server();
        seed_dc001(&server).await;

        deliver(&server, "A", "2024-01-05", "4")
            .await
            .assert_status(StatusCode::CREATED);

        let rejected = deliver(&server, "A", "2024-01-06", "7").await;
        rejected.assert_status(StatusCode::CONFLICT);
        let body: Value = rejected.json();
        assert!(body["message"].as_str().unwrap().contains("Over-delivery"));

        deliver(&server, "A", "2024-01-06", "6")
            .await
            .assert_status(StatusCode::CREATED);

        let status: Value = server.get("/api/v1/challans/DC001/status").await.json();
        assert_eq!(decimal(&status["items"][0]["delivered"]), dec!(10));

        let pending: Value = server.get("/api/v1/pending").await.json();
        let pending = pending.as_array().unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0]["item"], "B");
    }

    #[tokio::test]
    async fn test_largest_decimal_is_an_over_delivery() {
        let server = server();
        seed_dc001(&server).await;
        deliver(&server, "A", "2024-01-05", "4")
            .await
            .assert_status(StatusCode::CREATED);

        let max = Decimal::MAX.to_string();
        let rejected = deliver(&server, "A", "2024-01-06", &max).await;
        rejected.assert_status(StatusCode::CONFLICT);
        let body: Value = rejected.json();
        assert_eq!(body["error"], "conflict");

        let status: Value = server.get("/api/v1/challans/DC001/status").await.json();
        assert_eq!(decimal(&status["items"][0]["delivered"]), dec!(4));
    }

    #[tokio::test]
    async fn test_delivery_for_unplanned_item_rejected() {
        let server = server();
        seed_dc001(&server).await;

        deliver(&server, "C", "2024-01-05", "1")
            .await
            .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        deliver(&server, "A", "2024-01-05", "-1")
            .await
            .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_correct_and_delete_delivery() {
        let server = server();
        seed_dc001(&server).await;

        let created: Value = deliver(&server, "A", "2024-01-05", "4").await.json();
        let id = created["id"].as_str().unwrap().to_string();

        let updated: Value = server
            .put(&format!("/api/v1/deliveries/{id}"))
            .json(&json!({ "boxes": "9.5", "date": "2024-01-07" }))
            .await
            .json();
        assert_eq!(decimal(&updated["boxes"]), dec!(9.5));
        assert_eq!(updated["date"], "2024-01-07");

        server
            .put(&format!("/api/v1/deliveries/{id}"))
            .json(&json!({ "boxes": "10.5" }))
            .await
            .assert_status(StatusCode::CONFLICT);

        server
            .delete(&format!("/api/v1/deliveries/{id}"))
            .await
            .assert_status(StatusCode::NO_CONTENT);
        server
            .get(&format!("/api/v1/deliveries/{id}"))
            .await
            .assert_status_not_found();

        server
            .get("/api/v1/deliveries/not-an-id")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}

// ============================================================================
// Invoices
// ============================================================================

mod invoice_tests {
    use super::*;

    #[tokio::test]
    async fn test_invoice_statement_prices_deliveries() {
        let server = server();
        seed_dc001(&server).await;
        deliver(&server, "A", "2024-01-05", "10")
            .await
            .assert_status(StatusCode::CREATED);
        deliver(&server, "B", "2024-01-10", "6")
            .await
            .assert_status(StatusCode::CREATED);
        deliver(&server, "B", "2024-02-01", "1")
            .await
            .assert_status(StatusCode::CREATED);

        server
            .post("/api/v1/invoices")
            .json(&invoice_body("INV-001", "2024-01-01", "2024-01-31"))
            .await
            .assert_status(StatusCode::CREATED);

        let statement: Value = server.get("/api/v1/invoices/INV-001").await.json();
        let lines = statement["lines"].as_array().unwrap();
        assert_eq!(lines.len(), 2);
        // A: 10 boxes x 6 / 12 = 5 dozen at 100
        assert_eq!(decimal(&lines[0]["dozens"]), dec!(5));
        assert_eq!(decimal(&lines[0]["amount"]["amount"]), dec!(500));
        // B: 6 boxes x 10 / 12 = 5 dozen at 50
        assert_eq!(decimal(&lines[1]["amount"]["amount"]), dec!(250));
        assert_eq!(decimal(&statement["total"]["amount"]), dec!(750));
    }

    #[tokio::test]
    async fn test_invoice_errors() {
        let server = server();
        let body = invoice_body("INV-001", "2024-01-01", "2024-01-31");

        server
            .post("/api/v1/invoices")
            .json(&body)
            .await
            .assert_status(StatusCode::CREATED);
        server
            .post("/api/v1/invoices")
            .json(&body)
            .await
            .assert_status(StatusCode::CONFLICT);

        server
            .post("/api/v1/invoices")
            .json(&invoice_body("INV-002", "2024-02-01", "2024-01-01"))
            .await
            .assert_status(StatusCode::UNPROCESSABLE_ENTITY);

        server
            .get("/api/v1/invoices/INV-404")
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn test_statistics_for_range() {
        let server = server();
        seed_dc001(&server).await;
        deliver(&server, "A", "2024-01-05", "10")
            .await
            .assert_status(StatusCode::CREATED);
        deliver(&server, "B", "2024-01-10", "6")
            .await
            .assert_status(StatusCode::CREATED);

        let stats: Value = server
            .get("/api/v1/statistics")
            .add_query_param("from", "2024-01-01")
            .add_query_param("to", "2024-01-31")
            .await
            .json();

        assert_eq!(decimal(&stats["total_dozens"]), dec!(10));
        assert_eq!(decimal(&stats["total_amount"]["amount"]), dec!(750));
        assert_eq!(stats["challans_delivered"], 1);
        assert_eq!(stats["challans_pending"], 1);
    }
}
