mod common;

use axum::http::Method;
use chrono::{Duration, Utc};

use common::{response_json, TestApp};

async fn seed_trail(app: &TestApp) -> (String, String) {
    let acme = app.seed_supplier("Acme").await;
    let globex = app.seed_supplier("Globex").await;
    let widget = app.seed_item(&acme, "Widget", 10, "2").await;
    let gear = app.seed_item(&globex, "Gear", 4, "8").await;
    let widget_id = widget["id"].as_str().unwrap().to_string();
    let gear_id = gear["id"].as_str().unwrap().to_string();

    for (id, delta, reason) in [
        (&widget_id, -2, "SOLD"),
        (&widget_id, 5, "MANUAL_UPDATE"),
        (&gear_id, -1, "SOLD"),
    ] {
        let response = app
            .as_user(
                Method::PATCH,
                &format!("/api/inventory/{id}/quantity?delta={delta}&reason={reason}"),
                None,
            )
            .await;
        assert_eq!(response.status(), 200);
    }
    (acme, widget_id)
}

#[tokio::test]
async fn history_lists_by_item_and_reason() {
    let app = TestApp::new().await;
    let (_, widget_id) = seed_trail(&app).await;

    let response = app.as_user(Method::GET, "/api/stock-history", None).await;
    assert_eq!(response.status(), 200);
    assert_eq!(response_json(response).await.as_array().unwrap().len(), 5);

    let response = app
        .as_user(
            Method::GET,
            &format!("/api/stock-history/item/{widget_id}"),
            None,
        )
        .await;
    let trail = response_json(response).await;
    let reasons: Vec<&str> = trail
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["reason"].as_str().unwrap())
        .collect();
    assert_eq!(reasons, vec!["MANUAL_UPDATE", "SOLD", "INITIAL_STOCK"]);

    let response = app
        .as_user(Method::GET, "/api/stock-history/reason/sold", None)
        .await;
    assert_eq!(response.status(), 200);
    let sold = response_json(response).await;
    assert_eq!(sold.as_array().unwrap().len(), 2);
    assert!(sold.as_array().unwrap().iter().all(|e| e["change"].as_i64().unwrap() < 0));
}

#[tokio::test]
async fn unknown_reason_is_a_bad_request() {
    let app = TestApp::new().await;

    let response = app
        .as_user(Method::GET, "/api/stock-history/reason/BORROWED", None)
        .await;
    assert_eq!(response.status(), 400);
    assert_eq!(
        response_json(response).await["message"],
        "Unsupported change reason: BORROWED"
    );
}

#[tokio::test]
async fn search_filters_and_pages() {
    let app = TestApp::new().await;
    let (acme, _) = seed_trail(&app).await;

    let response = app
        .as_user(Method::GET, "/api/stock-history/search?itemName=widg&size=2", None)
        .await;
    assert_eq!(response.status(), 200);
    let page = response_json(response).await;
    assert_eq!(page["pagination"]["total"], 3);
    assert_eq!(page["pagination"]["size"], 2);
    assert_eq!(page["data"].as_array().unwrap().len(), 2);

    let response = app
        .as_user(
            Method::GET,
            &format!("/api/stock-history/search?supplierId={acme}&page=1&size=2"),
            None,
        )
        .await;
    let page = response_json(response).await;
    assert_eq!(page["pagination"]["page"], 1);
    let data = page["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["reason"], "INITIAL_STOCK");

    let tomorrow = (Utc::now() + Duration::days(1)).format("%Y-%m-%d");
    let response = app
        .as_user(
            Method::GET,
            &format!("/api/stock-history/search?startDate={tomorrow}"),
            None,
        )
        .await;
    let page = response_json(response).await;
    assert_eq!(page["pagination"]["total"], 0);
}

#[tokio::test]
async fn search_rejects_inverted_or_malformed_dates() {
    let app = TestApp::new().await;

    let response = app
        .as_user(
            Method::GET,
            "/api/stock-history/search?startDate=2024-05-02&endDate=2024-05-01",
            None,
        )
        .await;
    assert_eq!(response.status(), 400);

    let response = app
        .as_user(Method::GET, "/api/stock-history/search?startDate=someday", None)
        .await;
    assert_eq!(response.status(), 400);
    assert_eq!(response_json(response).await["error"], "bad_request");
}
