use sea_orm::{
    sea_query::{Expr, Func},
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder,
};

use super::contains_pattern;
use crate::entities::supplier::{ActiveModel, Column, Entity as Supplier, Model};

pub struct SupplierRepository;

impl SupplierRepository {
    pub async fn find_all<C: ConnectionTrait>(db: &C) -> Result<Vec<Model>, DbErr> {
        Supplier::find().order_by_asc(Column::Name).all(db).await
    }

    pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: &str) -> Result<Option<Model>, DbErr> {
        Supplier::find_by_id(id.to_owned()).one(db).await
    }

    pub async fn exists_by_id<C: ConnectionTrait>(db: &C, id: &str) -> Result<bool, DbErr> {
        let count = Supplier::find()
            .filter(Column::Id.eq(id))
            .count(db)
            .await?;
        Ok(count > 0)
    }

    pub async fn find_by_name_containing<C: ConnectionTrait>(
        db: &C,
        name: &str,
    ) -> Result<Vec<Model>, DbErr> {
        Supplier::find()
            .filter(Expr::expr(Func::lower(Expr::col(Column::Name))).like(contains_pattern(name)))
            .order_by_asc(Column::Name)
            .all(db)
            .await
    }

    pub async fn exists_by_name_ignore_case<C: ConnectionTrait>(
        db: &C,
        name: &str,
        exclude_id: Option<&str>,
    ) -> Result<bool, DbErr> {
        let mut query = Supplier::find()
            .filter(Expr::expr(Func::lower(Expr::col(Column::Name))).eq(name.to_lowercase()));
        if let Some(id) = exclude_id {
            query = query.filter(Column::Id.ne(id));
        }
        Ok(query.count(db).await? > 0)
    }

    pub async fn insert<C: ConnectionTrait>(db: &C, supplier: ActiveModel) -> Result<Model, DbErr> {
        supplier.insert(db).await
    }

    pub async fn update<C: ConnectionTrait>(db: &C, supplier: ActiveModel) -> Result<Model, DbErr> {
        supplier.update(db).await
    }

    pub async fn delete_by_id<C: ConnectionTrait>(db: &C, id: &str) -> Result<u64, DbErr> {
        let result = Supplier::delete_by_id(id.to_owned()).exec(db).await?;
        Ok(result.rows_affected)
    }
}
