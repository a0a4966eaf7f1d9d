use chrono::Utc;
use metrics::counter;
use rust_decimal::Decimal;
use sea_orm::{ConnectionTrait, DatabaseConnection, IntoActiveModel, Set};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::Actor,
    db::DatabaseAccess,
    dto::{
        inventory::{InventoryItemRequest, InventoryItemResponse},
        stock_history::NewStockHistory,
        PaginatedResponse,
    },
    entities::{inventory_item, StockChangeReason},
    errors::ServiceError,
    repositories::{InventoryItemRepository, PageRequest, SupplierRepository},
    services::stock_history::StockHistoryService,
    validation::{
        inventory_item::{validate_base, validate_inventory_item_not_exists, validate_price},
        is_blank, InventoryItemSecurityValidator, StockHistoryValidator,
    },
};

const DEFAULT_MINIMUM_QUANTITY: i32 = 10;
const SYSTEM_USER: &str = "system";

/// Item lifecycle. Every mutation and its audit row commit or roll back together.
#[derive(Clone)]
pub struct InventoryService {
    db: Arc<DatabaseConnection>,
    access: DatabaseAccess,
}

impl InventoryService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            access: DatabaseAccess::new(db.clone()),
            db,
        }
    }

    #[instrument(skip(self))]
    pub async fn list_all(&self) -> Result<Vec<InventoryItemResponse>, ServiceError> {
        let items = InventoryItemRepository::find_all(self.db.as_ref()).await?;
        Ok(items.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<InventoryItemResponse, ServiceError> {
        InventoryItemRepository::find_by_id(self.db.as_ref(), id)
            .await?
            .map(Into::into)
            .ok_or_else(item_not_found)
    }

    #[instrument(skip(self))]
    pub async fn count(&self) -> Result<u64, ServiceError> {
        Ok(InventoryItemRepository::count(self.db.as_ref()).await?)
    }

    #[instrument(skip(self))]
    pub async fn search(
        &self,
        name: &str,
        page: PageRequest,
    ) -> Result<PaginatedResponse<InventoryItemResponse>, ServiceError> {
        let (items, total) =
            InventoryItemRepository::search_by_name(self.db.as_ref(), name, page.page, page.size)
                .await?;
        Ok(PaginatedResponse::new(
            items.into_iter().map(Into::into).collect(),
            page.page,
            page.size,
            total,
        ))
    }

    #[instrument(skip(self))]
    pub async fn low_stock(
        &self,
        supplier_id: Option<&str>,
    ) -> Result<Vec<InventoryItemResponse>, ServiceError> {
        let supplier_id = supplier_id.map(str::trim).filter(|s| !s.is_empty());
        let items =
            InventoryItemRepository::find_below_minimum_stock(self.db.as_ref(), supplier_id)
                .await?;
        Ok(items.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self, request), fields(actor = %actor.username))]
    pub async fn create(
        &self,
        actor: &Actor,
        mut request: InventoryItemRequest,
    ) -> Result<InventoryItemResponse, ServiceError> {
        if is_blank(request.created_by.as_deref()) {
            request.created_by = Some(username_or_system(actor));
        }

        let created = self
            .access
            .transaction(move |txn| {
                Box::pin(async move {
                    validate_base(&request)?;
                    validate_inventory_item_not_exists(txn, &request.name, None).await?;
                    let supplier_id = request
                        .supplier_id
                        .as_deref()
                        .map(str::trim)
                        .unwrap_or_default()
                        .to_string();
                    ensure_supplier_exists(txn, &supplier_id).await?;

                    let price = request.price.unwrap_or_default();
                    let created_by = request.created_by.clone().unwrap_or_default();
                    let id = request
                        .id
                        .as_deref()
                        .map(str::trim)
                        .filter(|id| !id.is_empty())
                        .map(str::to_string)
                        .unwrap_or_else(|| Uuid::new_v4().to_string());

                    let item = inventory_item::ActiveModel {
                        id: Set(id),
                        name: Set(request.name.trim().to_string()),
                        quantity: Set(request.quantity),
                        price: Set(price),
                        supplier_id: Set(supplier_id.clone()),
                        minimum_quantity: Set(effective_minimum(request.minimum_quantity)),
                        created_by: Set(created_by.clone()),
                        created_at: Set(Utc::now()),
                    };
                    let saved = InventoryItemRepository::insert(txn, item).await?;

                    if saved.quantity > 0 {
                        StockHistoryService::record(
                            txn,
                            NewStockHistory {
                                item_id: saved.id.clone(),
                                supplier_id: Some(supplier_id),
                                change: saved.quantity,
                                reason: StockChangeReason::InitialStock,
                                price_at_change: Some(price),
                                created_by,
                            },
                        )
                        .await?;
                    }
                    Ok::<_, ServiceError>(saved)
                })
            })
            .await?;

        counter!("inventory.items.created", 1);
        info!(item_id = %created.id, name = %created.name, "inventory item created");
        Ok(created.into())
    }

    #[instrument(skip(self, request), fields(actor = %actor.username))]
    pub async fn update(
        &self,
        actor: &Actor,
        id: &str,
        mut request: InventoryItemRequest,
    ) -> Result<InventoryItemResponse, ServiceError> {
        if is_blank(request.created_by.as_deref()) {
            request.created_by = Some(username_or_system(actor));
        }
        let actor = actor.clone();
        let id = id.to_string();

        let updated = self
            .access
            .transaction(move |txn| {
                Box::pin(async move {
                    // Existence, then permission, then content.
                    let existing = InventoryItemRepository::find_by_id(txn, &id)
                        .await?
                        .ok_or_else(item_not_found)?;
                    InventoryItemSecurityValidator::validate_update_permissions(
                        Some(&actor),
                        &existing,
                        &request,
                    )?;

                    validate_base(&request)?;
                    let supplier_id = request
                        .supplier_id
                        .as_deref()
                        .map(str::trim)
                        .unwrap_or_default()
                        .to_string();
                    ensure_supplier_exists(txn, &supplier_id).await?;

                    let new_name = request.name.trim().to_string();
                    if !existing.name.eq_ignore_ascii_case(&new_name) {
                        validate_inventory_item_not_exists(txn, &new_name, Some(&id)).await?;
                    }

                    let old_quantity = existing.quantity;
                    let old_price = existing.price;
                    let new_price = request.price.unwrap_or(old_price);
                    let minimum = request
                        .minimum_quantity
                        .map(|m| effective_minimum(Some(m)))
                        .unwrap_or(existing.minimum_quantity);

                    let mut item = existing.into_active_model();
                    item.name = Set(new_name);
                    item.quantity = Set(request.quantity);
                    item.price = Set(new_price);
                    item.supplier_id = Set(supplier_id.clone());
                    item.minimum_quantity = Set(minimum);
                    let saved = InventoryItemRepository::update(txn, item).await?;

                    let audit = if saved.quantity != old_quantity {
                        Some((StockChangeReason::ManualUpdate, saved.quantity - old_quantity))
                    } else if saved.price != old_price {
                        Some((StockChangeReason::PriceChange, 0))
                    } else {
                        None
                    };
                    if let Some((reason, change)) = audit {
                        StockHistoryService::record(
                            txn,
                            NewStockHistory {
                                item_id: saved.id.clone(),
                                supplier_id: Some(supplier_id),
                                change,
                                reason,
                                price_at_change: Some(new_price),
                                created_by: username_or_system(&actor),
                            },
                        )
                        .await?;
                    }
                    Ok::<_, ServiceError>(saved)
                })
            })
            .await?;

        info!(item_id = %updated.id, "inventory item updated");
        Ok(updated.into())
    }

    /// Applies a signed quantity change guarded against going below zero.
    #[instrument(skip(self), fields(actor = %actor.username))]
    pub async fn adjust_quantity(
        &self,
        actor: &Actor,
        id: &str,
        delta: i32,
        reason: &str,
    ) -> Result<InventoryItemResponse, ServiceError> {
        let reason = StockChangeReason::parse(reason)?;
        if delta == 0 {
            return Err(ServiceError::InvalidArgument(
                "Change amount must be non-zero".to_string(),
            ));
        }
        let created_by = username_or_system(actor);
        let id = id.to_string();

        let adjusted = self
            .access
            .transaction(move |txn| {
                Box::pin(async move {
                    let mut entry = NewStockHistory {
                        item_id: id.clone(),
                        supplier_id: None,
                        change: delta,
                        reason,
                        price_at_change: None,
                        created_by,
                    };
                    StockHistoryValidator::validate(&entry)?;

                    let affected = InventoryItemRepository::apply_quantity_delta(txn, &id, delta).await?;
                    if affected == 0 {
                        return Err(
                            match InventoryItemRepository::find_by_id(txn, &id).await? {
                                None => item_not_found(),
                                Some(_) if delta > 0 => ServiceError::InvalidArgument(
                                    "Quantity out of range".to_string(),
                                ),
                                Some(_) => ServiceError::InvalidArgument(
                                    "Insufficient stock: quantity cannot go negative".to_string(),
                                ),
                            },
                        );
                    }

                    let item = InventoryItemRepository::find_by_id(txn, &id)
                        .await?
                        .ok_or_else(item_not_found)?;
                    entry.supplier_id = Some(item.supplier_id.clone());
                    entry.price_at_change = Some(item.price);
                    StockHistoryService::record(txn, entry).await?;
                    Ok::<_, ServiceError>(item)
                })
            })
            .await
            .map_err(|e| {
                if matches!(e, ServiceError::InvalidArgument(_)) {
                    warn!(delta, "quantity adjustment rejected: {}", e);
                }
                e
            })?;

        counter!("inventory.stock.adjustments", 1);
        info!(item_id = %adjusted.id, delta, quantity = adjusted.quantity, "quantity adjusted");
        Ok(adjusted.into())
    }

    #[instrument(skip(self), fields(actor = %actor.username))]
    pub async fn update_price(
        &self,
        actor: &Actor,
        id: &str,
        price: Decimal,
    ) -> Result<InventoryItemResponse, ServiceError> {
        validate_price(price)?;
        let created_by = username_or_system(actor);
        let id = id.to_string();

        let repriced = self
            .access
            .transaction(move |txn| {
                Box::pin(async move {
                    if InventoryItemRepository::update_price(txn, &id, price).await? == 0 {
                        return Err(item_not_found());
                    }
                    let item = InventoryItemRepository::find_by_id(txn, &id)
                        .await?
                        .ok_or_else(item_not_found)?;
                    StockHistoryService::record(
                        txn,
                        NewStockHistory {
                            item_id: item.id.clone(),
                            supplier_id: Some(item.supplier_id.clone()),
                            change: 0,
                            reason: StockChangeReason::PriceChange,
                            price_at_change: Some(price),
                            created_by,
                        },
                    )
                    .await?;
                    Ok::<_, ServiceError>(item)
                })
            })
            .await?;

        info!(item_id = %repriced.id, price = %repriced.price, "price changed");
        Ok(repriced.into())
    }

    /// Removes an item. Remaining stock is written off in a final audit row first.
    #[instrument(skip(self), fields(actor = %actor.username))]
    pub async fn delete(&self, actor: &Actor, id: &str, reason: &str) -> Result<(), ServiceError> {
        actor.require_admin()?;
        let reason = StockChangeReason::parse(reason)?;
        if !reason.is_deletion_reason() {
            return Err(ServiceError::InvalidRequest(
                "Invalid reason for deletion".to_string(),
            ));
        }
        let created_by = username_or_system(actor);
        let item_id = id.to_string();

        self.access
            .transaction(move |txn| {
                Box::pin(async move {
                    let item = InventoryItemRepository::find_by_id(txn, &item_id)
                        .await?
                        .ok_or_else(item_not_found)?;

                    if item.quantity > 0 {
                        StockHistoryService::record(
                            txn,
                            NewStockHistory {
                                item_id: item.id.clone(),
                                supplier_id: Some(item.supplier_id.clone()),
                                change: -item.quantity,
                                reason,
                                price_at_change: Some(item.price),
                                created_by,
                            },
                        )
                        .await?;
                    }
                    InventoryItemRepository::delete_by_id(txn, &item.id).await?;
                    Ok::<_, ServiceError>(())
                })
            })
            .await?;

        counter!("inventory.items.deleted", 1);
        info!(item_id = %id, %reason, "inventory item deleted");
        Ok(())
    }
}

async fn ensure_supplier_exists<C: ConnectionTrait>(
    db: &C,
    supplier_id: &str,
) -> Result<(), ServiceError> {
    if !SupplierRepository::exists_by_id(db, supplier_id).await? {
        return Err(ServiceError::InvalidArgument(
            "Supplier does not exist".to_string(),
        ));
    }
    Ok(())
}

fn effective_minimum(requested: Option<i32>) -> i32 {
    requested
        .filter(|m| *m > 0)
        .unwrap_or(DEFAULT_MINIMUM_QUANTITY)
}

fn username_or_system(actor: &Actor) -> String {
    let name = actor.username.trim();
    if name.is_empty() {
        SYSTEM_USER.to_string()
    } else {
        name.to_string()
    }
}

fn item_not_found() -> ServiceError {
    ServiceError::NotFound("Item not found".to_string())
}
