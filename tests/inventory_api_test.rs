mod common;

use axum::http::{header, Method};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use std::str::FromStr;

use common::{response_json, TestApp, ADMIN_EMAIL};

fn decimal(value: &Value) -> Decimal {
    match value {
        Value::String(s) => Decimal::from_str(s).expect("decimal string"),
        Value::Number(n) => Decimal::from_str(&n.to_string()).expect("decimal number"),
        other => panic!("not a decimal: {other}"),
    }
}

async fn history_for(app: &TestApp, item_id: &str) -> Vec<Value> {
    let response = app
        .as_admin(
            Method::GET,
            &format!("/api/stock-history/item/{item_id}"),
            None,
        )
        .await;
    assert_eq!(response.status(), 200);
    response_json(response)
        .await
        .as_array()
        .cloned()
        .expect("history array")
}

#[tokio::test]
async fn inventory_item_lifecycle() {
    let app = TestApp::new().await;
    let supplier_id = app.seed_supplier("Acme").await;

    let response = app
        .as_admin(
            Method::POST,
            "/api/inventory",
            Some(json!({
                "name": "Widget",
                "quantity": 10,
                "price": "2.50",
                "supplierId": supplier_id,
            })),
        )
        .await;
    assert_eq!(response.status(), 201);
    let location = response
        .headers()
        .get(header::LOCATION)
        .expect("location header")
        .to_str()
        .unwrap()
        .to_string();
    let item = response_json(response).await;
    let id = item["id"].as_str().unwrap().to_string();
    assert_eq!(location, format!("/api/inventory/{id}"));
    assert_eq!(item["quantity"], 10);
    assert_eq!(item["minimumQuantity"], 10);
    assert_eq!(item["createdBy"], ADMIN_EMAIL);
    assert_eq!(decimal(&item["price"]), dec!(2.5));

    let history = history_for(&app, &id).await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["reason"], "INITIAL_STOCK");
    assert_eq!(history[0]["change"], 10);

    // Fetch and count
    let response = app.as_user(Method::GET, &location, None).await;
    assert_eq!(response.status(), 200);
    assert_eq!(response_json(response).await["name"], "Widget");
    let response = app.as_user(Method::GET, "/api/inventory/count", None).await;
    assert_eq!(response_json(response).await, json!(1));

    // Sell three
    let response = app
        .as_user(
            Method::PATCH,
            &format!("/api/inventory/{id}/quantity?delta=-3&reason=SOLD"),
            None,
        )
        .await;
    assert_eq!(response.status(), 200);
    assert_eq!(response_json(response).await["quantity"], 7);

    // Reprice
    let response = app
        .as_user(
            Method::PATCH,
            &format!("/api/inventory/{id}/price?price=3.25"),
            None,
        )
        .await;
    assert_eq!(response.status(), 200);
    assert_eq!(decimal(&response_json(response).await["price"]), dec!(3.25));

    let history = history_for(&app, &id).await;
    assert_eq!(history.len(), 3);
    assert_eq!(history[0]["reason"], "PRICE_CHANGE");
    assert_eq!(history[0]["change"], 0);
    assert_eq!(history[1]["reason"], "SOLD");
    assert_eq!(history[1]["change"], -3);
    assert_eq!(history[1]["createdBy"], common::USER_EMAIL);

    // Scrap the rest
    let response = app
        .as_admin(
            Method::DELETE,
            &format!("/api/inventory/{id}?reason=SCRAPPED"),
            None,
        )
        .await;
    assert_eq!(response.status(), 204);

    let response = app.as_admin(Method::GET, &location, None).await;
    assert_eq!(response.status(), 404);
    assert_eq!(response_json(response).await["message"], "Item not found");

    let history = history_for(&app, &id).await;
    assert_eq!(history.len(), 4);
    assert_eq!(history[0]["reason"], "SCRAPPED");
    assert_eq!(history[0]["change"], -7);
    assert_eq!(decimal(&history[0]["priceAtChange"]), dec!(3.25));
}

#[tokio::test]
async fn adjustment_below_zero_is_rejected_without_side_effects() {
    let app = TestApp::new().await;
    let supplier_id = app.seed_supplier("Acme").await;
    let item = app.seed_item(&supplier_id, "Bolt", 4, "0.25").await;
    let id = item["id"].as_str().unwrap();

    let response = app
        .as_user(
            Method::PATCH,
            &format!("/api/inventory/{id}/quantity?delta=-5&reason=SOLD"),
            None,
        )
        .await;
    assert_eq!(response.status(), 400);
    let body = response_json(response).await;
    assert_eq!(body["error"], "bad_request");
    assert_eq!(
        body["message"],
        "Insufficient stock: quantity cannot go negative"
    );

    let response = app
        .as_user(Method::GET, &format!("/api/inventory/{id}"), None)
        .await;
    assert_eq!(response_json(response).await["quantity"], 4);
    assert_eq!(history_for(&app, id).await.len(), 1);
}

#[tokio::test]
async fn adjustment_rejects_zero_delta_unknown_reason_and_missing_item() {
    let app = TestApp::new().await;
    let supplier_id = app.seed_supplier("Acme").await;
    let item = app.seed_item(&supplier_id, "Nut", 4, "0.5").await;
    let id = item["id"].as_str().unwrap();

    let response = app
        .as_user(
            Method::PATCH,
            &format!("/api/inventory/{id}/quantity?delta=0"),
            None,
        )
        .await;
    assert_eq!(response.status(), 400);
    assert_eq!(
        response_json(response).await["message"],
        "Change amount must be non-zero"
    );

    let response = app
        .as_user(
            Method::PATCH,
            &format!("/api/inventory/{id}/quantity?delta=2&reason=BORROWED"),
            None,
        )
        .await;
    assert_eq!(response.status(), 400);

    let response = app
        .as_user(
            Method::PATCH,
            "/api/inventory/missing/quantity?delta=2",
            None,
        )
        .await;
    assert_eq!(response.status(), 404);

    let response = app
        .as_user(
            Method::PATCH,
            &format!("/api/inventory/{id}/quantity?delta=abc"),
            None,
        )
        .await;
    assert_eq!(response.status(), 400);
    assert_eq!(response_json(response).await["error"], "bad_request");
}

#[tokio::test]
async fn create_validates_supplier_and_unique_name() {
    let app = TestApp::new().await;
    let supplier_id = app.seed_supplier("Acme").await;
    app.seed_item(&supplier_id, "Widget", 1, "1").await;

    let response = app
        .as_admin(
            Method::POST,
            "/api/inventory",
            Some(json!({ "name": "Gadget", "quantity": 1, "price": "1", "supplierId": "nope" })),
        )
        .await;
    assert_eq!(response.status(), 400);
    assert_eq!(
        response_json(response).await["message"],
        "Supplier does not exist"
    );

    let response = app
        .as_admin(
            Method::POST,
            "/api/inventory",
            Some(json!({ "name": "WIDGET", "quantity": 1, "price": "1", "supplierId": supplier_id })),
        )
        .await;
    assert_eq!(response.status(), 409);
    assert_eq!(
        response_json(response).await["message"],
        "An inventory item with this name already exists"
    );

    let response = app
        .as_admin(
            Method::POST,
            "/api/inventory",
            Some(json!({ "name": "Free", "quantity": 1, "price": "0", "supplierId": supplier_id })),
        )
        .await;
    assert_eq!(response.status(), 400);
    assert_eq!(
        response_json(response).await["message"],
        "Price must be positive"
    );
}

#[tokio::test]
async fn item_created_empty_has_no_history() {
    let app = TestApp::new().await;
    let supplier_id = app.seed_supplier("Acme").await;
    let item = app.seed_item(&supplier_id, "Placeholder", 0, "4").await;
    assert!(history_for(&app, item["id"].as_str().unwrap()).await.is_empty());
}

#[tokio::test]
async fn update_records_manual_change_or_price_change() {
    let app = TestApp::new().await;
    let supplier_id = app.seed_supplier("Acme").await;
    let item = app.seed_item(&supplier_id, "Widget", 10, "2").await;
    let id = item["id"].as_str().unwrap().to_string();
    let uri = format!("/api/inventory/{id}");

    let response = app
        .as_admin(
            Method::PUT,
            &uri,
            Some(json!({ "id": id, "name": "Widget", "quantity": 12, "price": "2", "supplierId": supplier_id })),
        )
        .await;
    assert_eq!(response.status(), 200);
    let updated = response_json(response).await;
    assert_eq!(updated["quantity"], 12);
    assert_eq!(updated["createdBy"], ADMIN_EMAIL);

    let response = app
        .as_admin(
            Method::PUT,
            &uri,
            Some(json!({ "id": id, "name": "Widget", "quantity": 12, "price": "2.5", "supplierId": supplier_id })),
        )
        .await;
    assert_eq!(response.status(), 200);

    let history = history_for(&app, &id).await;
    assert_eq!(history.len(), 3);
    assert_eq!(history[0]["reason"], "PRICE_CHANGE");
    assert_eq!(history[1]["reason"], "MANUAL_UPDATE");
    assert_eq!(history[1]["change"], 2);

    let response = app
        .as_admin(
            Method::PUT,
            &uri,
            Some(json!({ "id": "other", "name": "Widget", "quantity": 1, "price": "2", "supplierId": supplier_id })),
        )
        .await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn delete_requires_a_deletion_reason() {
    let app = TestApp::new().await;
    let supplier_id = app.seed_supplier("Acme").await;
    let item = app.seed_item(&supplier_id, "Widget", 3, "2").await;
    let id = item["id"].as_str().unwrap();

    let response = app
        .as_admin(Method::DELETE, &format!("/api/inventory/{id}?reason=SOLD"), None)
        .await;
    assert_eq!(response.status(), 400);
    assert_eq!(
        response_json(response).await["message"],
        "Invalid reason for deletion"
    );

    let response = app
        .as_admin(Method::DELETE, "/api/inventory/missing?reason=LOST", None)
        .await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn search_and_low_stock() {
    let app = TestApp::new().await;
    let acme = app.seed_supplier("Acme").await;
    let globex = app.seed_supplier("Globex").await;
    app.seed_item(&acme, "Blue Widget", 2, "3").await;
    app.seed_item(&acme, "Red Widget", 20, "1").await;
    app.seed_item(&globex, "Widget Pro", 1, "9").await;

    let response = app
        .as_user(Method::GET, "/api/inventory/search?name=WIDGET&page=0&size=2", None)
        .await;
    assert_eq!(response.status(), 200);
    let page = response_json(response).await;
    assert_eq!(page["pagination"]["total"], 3);
    assert_eq!(page["pagination"]["totalPages"], 2);
    let names: Vec<&str> = page["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["name"].as_str().unwrap())
        .collect();
    // cheapest first
    assert_eq!(names, vec!["Red Widget", "Blue Widget"]);

    let response = app
        .as_user(Method::GET, "/api/inventory/low-stock", None)
        .await;
    let low = response_json(response).await;
    let low = low.as_array().unwrap();
    assert_eq!(low.len(), 2);
    assert_eq!(low[0]["name"], "Widget Pro");
    assert!(low.iter().all(|i| i["lowStock"] == true));

    let response = app
        .as_user(
            Method::GET,
            &format!("/api/inventory/low-stock?supplierId={acme}"),
            None,
        )
        .await;
    let low = response_json(response).await;
    assert_eq!(low.as_array().unwrap().len(), 1);
    assert_eq!(low[0]["name"], "Blue Widget");
}

#[tokio::test]
async fn adjustment_past_the_quantity_ceiling_is_rejected() {
    let app = TestApp::new().await;
    let supplier_id = app.seed_supplier("Acme").await;
    let item = app.seed_item(&supplier_id, "Grain", i32::MAX, "1").await;
    let id = item["id"].as_str().unwrap();

    let response = app
        .as_admin(
            Method::PATCH,
            &format!("/api/inventory/{id}/quantity?delta=1&reason=MANUAL_UPDATE"),
            None,
        )
        .await;
    assert_eq!(response.status(), 400);
    assert_eq!(response_json(response).await["message"], "Quantity out of range");

    let response = app
        .as_user(Method::GET, &format!("/api/inventory/{id}"), None)
        .await;
    assert_eq!(response_json(response).await["quantity"], i64::from(i32::MAX));
    assert_eq!(history_for(&app, id).await.len(), 1);

    // Selling down from the ceiling still works
    let response = app
        .as_user(
            Method::PATCH,
            &format!("/api/inventory/{id}/quantity?delta=-1&reason=SOLD"),
            None,
        )
        .await;
    assert_eq!(response.status(), 200);
    assert_eq!(response_json(response).await["quantity"], i64::from(i32::MAX) - 1);
}

#[tokio::test]
async fn price_change_must_be_positive() {
    let app = TestApp::new().await;
    let supplier_id = app.seed_supplier("Acme").await;
    let item = app.seed_item(&supplier_id, "Gear", 3, "4.50").await;
    let id = item["id"].as_str().unwrap();

    for price in ["-1", "0"] {
        let response = app
            .as_user(
                Method::PATCH,
                &format!("/api/inventory/{id}/price?price={price}"),
                None,
            )
            .await;
        assert_eq!(response.status(), 400, "price {price}");
        let body = response_json(response).await;
        assert_eq!(body["error"], "bad_request");
        assert_eq!(body["message"], "Price must be positive");
    }

    let response = app
        .as_user(Method::GET, &format!("/api/inventory/{id}"), None)
        .await;
    assert_eq!(decimal(&response_json(response).await["price"]), dec!(4.50));
    assert_eq!(history_for(&app, id).await.len(), 1);
}

#[tokio::test]
async fn search_treats_wildcards_literally() {
    let app = TestApp::new().await;
    let supplier_id = app.seed_supplier("Acme").await;
    app.seed_item(&supplier_id, "50% Off Bin", 1, "1").await;
    app.seed_item(&supplier_id, "500 Bolts", 1, "1").await;
    app.seed_item(&supplier_id, "Hex_Nut", 1, "1").await;
    app.seed_item(&supplier_id, "Hex Nut", 1, "1").await;

    for (term, expected) in [("50%25", "50% Off Bin"), ("hex_", "Hex_Nut")] {
        let response = app
            .as_user(Method::GET, &format!("/api/inventory/search?name={term}"), None)
            .await;
        assert_eq!(response.status(), 200);
        let page = response_json(response).await;
        assert_eq!(page["pagination"]["total"], 1, "term {term}");
        assert_eq!(page["data"][0]["name"], expected);
    }
}
