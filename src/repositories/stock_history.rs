use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::{Expr, Func},
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, JoinType, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select,
};

use super::contains_pattern;
use crate::{
    dto::stock_history::StockHistoryFilter,
    entities::{
        inventory_item,
        stock_history::{ActiveModel, Column, Entity as StockHistory, Model, Relation},
        StockChangeReason,
    },
};

/// Read and append access to the audit trail. Rows are never updated or deleted.
pub struct StockHistoryRepository;

impl StockHistoryRepository {
    pub async fn insert<C: ConnectionTrait>(db: &C, entry: ActiveModel) -> Result<Model, DbErr> {
        entry.insert(db).await
    }

    pub async fn find_all<C: ConnectionTrait>(db: &C) -> Result<Vec<Model>, DbErr> {
        newest_first(StockHistory::find()).all(db).await
    }

    pub async fn find_by_item<C: ConnectionTrait>(
        db: &C,
        item_id: &str,
    ) -> Result<Vec<Model>, DbErr> {
        newest_first(StockHistory::find().filter(Column::ItemId.eq(item_id)))
            .all(db)
            .await
    }

    pub async fn find_by_reason<C: ConnectionTrait>(
        db: &C,
        reason: StockChangeReason,
    ) -> Result<Vec<Model>, DbErr> {
        newest_first(StockHistory::find().filter(Column::Reason.eq(reason)))
            .all(db)
            .await
    }

    /// Filtered, paginated search. The item join is LEFT so rows for deleted items still match
    /// when no name filter is given. `page` is zero-based.
    pub async fn search<C: ConnectionTrait>(
        db: &C,
        filter: &StockHistoryFilter,
        page: u64,
        size: u64,
    ) -> Result<(Vec<Model>, u64), DbErr> {
        let mut query = StockHistory::find();

        if let Some(start) = filter.start {
            query = query.filter(Column::CreatedAt.gte(start));
        }
        if let Some(end) = filter.end {
            query = query.filter(Column::CreatedAt.lte(end));
        }
        if let Some(supplier_id) = filter.supplier_id.as_deref() {
            query = query.filter(Column::SupplierId.eq(supplier_id));
        }
        if let Some(item_name) = filter.item_name.as_deref() {
            query = query
                .join(JoinType::LeftJoin, Relation::InventoryItem.def())
                .filter(
                    Expr::expr(Func::lower(Expr::col((
                        inventory_item::Entity,
                        inventory_item::Column::Name,
                    ))))
                    .like(contains_pattern(item_name)),
                );
        }

        let paginator = newest_first(query).paginate(db, size);
        let total = paginator.num_items().await?;
        let rows = paginator.fetch_page(page).await?;
        Ok((rows, total))
    }

    /// Priced events for one item inside `[start, end]`, oldest first
    pub async fn find_price_points<C: ConnectionTrait>(
        db: &C,
        item_id: &str,
        supplier_id: Option<&str>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<(DateTime<Utc>, Decimal)>, DbErr> {
        let mut query = StockHistory::find()
            .filter(Column::ItemId.eq(item_id))
            .filter(Column::PriceAtChange.is_not_null())
            .filter(Column::CreatedAt.between(start, end));
        if let Some(supplier_id) = supplier_id {
            query = query.filter(Column::SupplierId.eq(supplier_id));
        }

        let rows = query
            .order_by_asc(Column::CreatedAt)
            .order_by_asc(Column::Id)
            .all(db)
            .await?;
        Ok(rows
            .into_iter()
            .filter_map(|row| row.price_at_change.map(|price| (row.created_at, price)))
            .collect())
    }

    /// Events inside `[start, end]`, oldest first, optionally for one supplier
    pub async fn find_in_window<C: ConnectionTrait>(
        db: &C,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        supplier_id: Option<&str>,
    ) -> Result<Vec<Model>, DbErr> {
        let mut query = StockHistory::find().filter(Column::CreatedAt.between(start, end));
        if let Some(supplier_id) = supplier_id {
            query = query.filter(Column::SupplierId.eq(supplier_id));
        }
        query
            .order_by_asc(Column::CreatedAt)
            .order_by_asc(Column::Id)
            .all(db)
            .await
    }

    /// Every event up to `end`, oldest first
    pub async fn find_until<C: ConnectionTrait>(
        db: &C,
        end: DateTime<Utc>,
        supplier_id: Option<&str>,
    ) -> Result<Vec<Model>, DbErr> {
        let mut query = StockHistory::find().filter(Column::CreatedAt.lte(end));
        if let Some(supplier_id) = supplier_id {
            query = query.filter(Column::SupplierId.eq(supplier_id));
        }
        query
            .order_by_asc(Column::CreatedAt)
            .order_by_asc(Column::Id)
            .all(db)
            .await
    }

    /// Events joined to their (still existing) item, newest first
    pub async fn find_with_items<C: ConnectionTrait>(
        db: &C,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        item_supplier_id: Option<&str>,
    ) -> Result<Vec<(Model, inventory_item::Model)>, DbErr> {
        let mut query = StockHistory::find().find_also_related(inventory_item::Entity);
        if let Some(start) = start {
            query = query.filter(Column::CreatedAt.gte(start));
        }
        if let Some(end) = end {
            query = query.filter(Column::CreatedAt.lte(end));
        }
        if let Some(supplier_id) = item_supplier_id {
            query = query.filter(inventory_item::Column::SupplierId.eq(supplier_id));
        }

        let rows = query
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .all(db)
            .await?;
        Ok(rows
            .into_iter()
            .filter_map(|(entry, item)| item.map(|item| (entry, item)))
            .collect())
    }
}

fn newest_first(query: Select<StockHistory>) -> Select<StockHistory> {
    query
        .order_by_desc(Column::CreatedAt)
        .order_by_desc(Column::Id)
}
