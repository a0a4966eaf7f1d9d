use rust_decimal::Decimal;
use sea_orm::{
    sea_query::{Expr, Func},
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder,
};

use super::contains_pattern;
use crate::entities::{
    inventory_item::{ActiveModel, Column, Entity as InventoryItem, Model},
    supplier,
};

/// Queries over `inventory_item`. Every method takes the connection so the same call works on
/// the pool and inside a transaction.
pub struct InventoryItemRepository;

impl InventoryItemRepository {
    pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: &str) -> Result<Option<Model>, DbErr> {
        InventoryItem::find_by_id(id.to_owned()).one(db).await
    }

    pub async fn find_all<C: ConnectionTrait>(db: &C) -> Result<Vec<Model>, DbErr> {
        InventoryItem::find()
            .order_by_asc(Column::Name)
            .all(db)
            .await
    }

    pub async fn exists_by_name_ignore_case<C: ConnectionTrait>(
        db: &C,
        name: &str,
        exclude_id: Option<&str>,
    ) -> Result<bool, DbErr> {
        let mut query = InventoryItem::find()
            .filter(Expr::expr(Func::lower(Expr::col(Column::Name))).eq(name.to_lowercase()));
        if let Some(id) = exclude_id {
            query = query.filter(Column::Id.ne(id));
        }
        Ok(query.count(db).await? > 0)
    }

    /// Case-insensitive substring search, cheapest first. `page` is zero-based.
    pub async fn search_by_name<C: ConnectionTrait>(
        db: &C,
        name: &str,
        page: u64,
        size: u64,
    ) -> Result<(Vec<Model>, u64), DbErr> {
        let paginator = InventoryItem::find()
            .filter(Expr::expr(Func::lower(Expr::col(Column::Name))).like(contains_pattern(name)))
            .order_by_asc(Column::Price)
            .order_by_asc(Column::Name)
            .paginate(db, size);

        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page).await?;
        Ok((items, total))
    }

    pub async fn count<C: ConnectionTrait>(db: &C) -> Result<u64, DbErr> {
        InventoryItem::find().count(db).await
    }

    /// Items whose quantity is under their reorder threshold, lowest stock first
    pub async fn find_below_minimum_stock<C: ConnectionTrait>(
        db: &C,
        supplier_id: Option<&str>,
    ) -> Result<Vec<Model>, DbErr> {
        let mut query = InventoryItem::find()
            .filter(Expr::col(Column::Quantity).lt(Expr::col(Column::MinimumQuantity)));
        if let Some(supplier_id) = supplier_id {
            query = query.filter(Column::SupplierId.eq(supplier_id));
        }
        query
            .order_by_asc(Column::Quantity)
            .order_by_asc(Column::Name)
            .all(db)
            .await
    }

    pub async fn count_below_minimum_stock<C: ConnectionTrait>(db: &C) -> Result<u64, DbErr> {
        InventoryItem::find()
            .filter(Expr::col(Column::Quantity).lt(Expr::col(Column::MinimumQuantity)))
            .count(db)
            .await
    }

    /// True when the supplier has at least one item stocked above `threshold`
    pub async fn exists_active_stock_for_supplier<C: ConnectionTrait>(
        db: &C,
        supplier_id: &str,
        threshold: i32,
    ) -> Result<bool, DbErr> {
        let count = InventoryItem::find()
            .filter(Column::SupplierId.eq(supplier_id))
            .filter(Column::Quantity.gt(threshold))
            .count(db)
            .await?;
        Ok(count > 0)
    }

    /// Applies `delta` in a single conditional UPDATE. Returns 0 when the item is missing or the
    /// result would fall outside `0..=i32::MAX`.
    pub async fn apply_quantity_delta<C: ConnectionTrait>(
        db: &C,
        id: &str,
        delta: i32,
    ) -> Result<u64, DbErr> {
        // Bounds are compared against the stored column so the arithmetic never leaves i32.
        let in_range = if delta < 0 {
            Column::Quantity.gte(-i64::from(delta))
        } else {
            Column::Quantity.lte(i32::MAX - delta)
        };
        let result = InventoryItem::update_many()
            .col_expr(Column::Quantity, Expr::col(Column::Quantity).add(delta))
            .filter(Column::Id.eq(id))
            .filter(in_range)
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }

    pub async fn update_price<C: ConnectionTrait>(
        db: &C,
        id: &str,
        price: Decimal,
    ) -> Result<u64, DbErr> {
        let result = InventoryItem::update_many()
            .col_expr(Column::Price, Expr::value(price))
            .filter(Column::Id.eq(id))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }

    pub async fn insert<C: ConnectionTrait>(db: &C, item: ActiveModel) -> Result<Model, DbErr> {
        item.insert(db).await
    }

    pub async fn update<C: ConnectionTrait>(db: &C, item: ActiveModel) -> Result<Model, DbErr> {
        item.update(db).await
    }

    pub async fn delete_by_id<C: ConnectionTrait>(db: &C, id: &str) -> Result<u64, DbErr> {
        let result = InventoryItem::delete_by_id(id.to_owned()).exec(db).await?;
        Ok(result.rows_affected)
    }

    /// Every item paired with its supplier
    pub async fn find_all_with_supplier<C: ConnectionTrait>(
        db: &C,
    ) -> Result<Vec<(Model, Option<supplier::Model>)>, DbErr> {
        InventoryItem::find()
            .find_also_related(supplier::Entity)
            .all(db)
            .await
    }
}
