use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, IntoActiveModel,
    QueryFilter, Set,
};

use crate::entities::app_user::{ActiveModel, Column, Entity as AppUser, Model, Role};

pub struct AppUserRepository;

impl AppUserRepository {
    pub async fn find_by_email<C: ConnectionTrait>(
        db: &C,
        email: &str,
    ) -> Result<Option<Model>, DbErr> {
        AppUser::find()
            .filter(Column::Email.eq(email))
            .one(db)
            .await
    }

    pub async fn insert<C: ConnectionTrait>(db: &C, user: ActiveModel) -> Result<Model, DbErr> {
        user.insert(db).await
    }

    pub async fn update_role<C: ConnectionTrait>(
        db: &C,
        user: Model,
        role: Role,
    ) -> Result<Model, DbErr> {
        let mut active = user.into_active_model();
        active.role = Set(role);
        active.update(db).await
    }
}
