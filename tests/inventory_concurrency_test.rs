use std::sync::Arc;

use futures::future::join_all;
use rust_decimal_macros::dec;
use tempfile::TempDir;

use inventory_api::{
    auth::Actor,
    db::{self, DbConfig},
    dto::{inventory::InventoryItemRequest, supplier::SupplierRequest},
    entities::{Role, StockChangeReason},
    errors::ServiceError,
    services::{InventoryService, StockHistoryService, SupplierService},
};

/// A file-backed database so that several pooled connections see the same rows.
async fn file_backed_services() -> (TempDir, InventoryService, SupplierService, StockHistoryService) {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("inventory.db");
    let pool = db::establish_connection_with_config(&DbConfig {
        url: format!("sqlite://{}?mode=rwc", path.display()),
        max_connections: 4,
        ..Default::default()
    })
    .await
    .expect("connect");
    db::run_migrations(&pool).await.expect("migrations");

    let pool = Arc::new(pool);
    (
        dir,
        InventoryService::new(pool.clone()),
        SupplierService::new(pool.clone()),
        StockHistoryService::new(pool),
    )
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_sales_never_oversell() {
    let (_dir, inventory, suppliers, history) = file_backed_services().await;
    let admin = Actor::new("admin@example.com", Role::Admin);
    let clerk = Actor::new("clerk@example.com", Role::User);

    let supplier = suppliers
        .create(
            &admin,
            SupplierRequest {
                name: "Acme".into(),
                ..Default::default()
            },
        )
        .await
        .expect("supplier");
    let item = inventory
        .create(
            &admin,
            InventoryItemRequest {
                name: "Widget".into(),
                quantity: 10,
                price: Some(dec!(2.50)),
                supplier_id: Some(supplier.id.clone()),
                ..Default::default()
            },
        )
        .await
        .expect("item");

    let attempts = (0..20).map(|_| {
        let inventory = inventory.clone();
        let clerk = clerk.clone();
        let id = item.id.clone();
        tokio::spawn(async move { inventory.adjust_quantity(&clerk, &id, -1, "SOLD").await })
    });
    let results: Vec<_> = join_all(attempts)
        .await
        .into_iter()
        .map(|joined| joined.expect("task panicked"))
        .collect();

    let sold = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(sold, 10);
    for rejected in results.iter().filter_map(|r| r.as_ref().err()) {
        assert!(
            matches!(rejected, ServiceError::InvalidArgument(msg) if msg.starts_with("Insufficient stock")),
            "unexpected failure: {rejected:?}"
        );
    }

    assert_eq!(inventory.get(&item.id).await.expect("item").quantity, 0);

    let trail = history.by_item(&item.id).await.expect("history");
    assert_eq!(trail.len(), 11);
    assert_eq!(
        trail
            .iter()
            .filter(|e| e.reason == StockChangeReason::Sold)
            .count(),
        10
    );
    assert_eq!(trail.iter().map(|e| e.change).sum::<i32>(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_additions_all_land() {
    let (_dir, inventory, suppliers, history) = file_backed_services().await;
    let admin = Actor::new("admin@example.com", Role::Admin);

    let supplier = suppliers
        .create(
            &admin,
            SupplierRequest {
                name: "Acme".into(),
                ..Default::default()
            },
        )
        .await
        .expect("supplier");
    let item = inventory
        .create(
            &admin,
            InventoryItemRequest {
                name: "Bolt".into(),
                quantity: 0,
                price: Some(dec!(0.10)),
                supplier_id: Some(supplier.id),
                ..Default::default()
            },
        )
        .await
        .expect("item");

    let attempts = (1..=8).map(|n| {
        let inventory = inventory.clone();
        let admin = admin.clone();
        let id = item.id.clone();
        tokio::spawn(async move { inventory.adjust_quantity(&admin, &id, n, "MANUAL_UPDATE").await })
    });
    for joined in join_all(attempts).await {
        joined.expect("task panicked").expect("addition");
    }

    assert_eq!(inventory.get(&item.id).await.expect("item").quantity, 36);
    assert_eq!(history.by_item(&item.id).await.expect("history").len(), 8);
}
