use chrono::Utc;
use sea_orm::{DatabaseConnection, IntoActiveModel, Set};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::Actor,
    db::DatabaseAccess,
    dto::supplier::{SupplierRequest, SupplierResponse},
    entities::supplier,
    errors::ServiceError,
    repositories::SupplierRepository,
    services::stock_history::non_blank,
    validation::SupplierValidator,
};

/// Supplier master data. Writes are ADMIN-only at the router.
#[derive(Clone)]
pub struct SupplierService {
    db: Arc<DatabaseConnection>,
    access: DatabaseAccess,
}

impl SupplierService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            access: DatabaseAccess::new(db.clone()),
            db,
        }
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<SupplierResponse>, ServiceError> {
        let suppliers = SupplierRepository::find_all(self.db.as_ref()).await?;
        Ok(suppliers.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<SupplierResponse, ServiceError> {
        SupplierRepository::find_by_id(self.db.as_ref(), id)
            .await?
            .map(Into::into)
            .ok_or_else(|| supplier_not_found(id))
    }

    #[instrument(skip(self))]
    pub async fn search(&self, name: &str) -> Result<Vec<SupplierResponse>, ServiceError> {
        let suppliers = SupplierRepository::find_by_name_containing(self.db.as_ref(), name).await?;
        Ok(suppliers.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self, request), fields(actor = %actor.username))]
    pub async fn create(
        &self,
        actor: &Actor,
        request: SupplierRequest,
    ) -> Result<SupplierResponse, ServiceError> {
        SupplierValidator::validate_base(&request)?;
        let created_by = non_blank(request.created_by.clone())
            .or_else(|| non_blank(Some(actor.username.clone())))
            .unwrap_or_else(|| "system".to_string());

        let created = self
            .access
            .transaction(move |txn| {
                Box::pin(async move {
                    SupplierValidator::assert_unique_name(txn, &request.name, None).await?;
                    let model = supplier::ActiveModel {
                        id: Set(Uuid::new_v4().to_string()),
                        name: Set(request.name.trim().to_string()),
                        contact_name: Set(non_blank(request.contact_name)),
                        phone: Set(non_blank(request.phone)),
                        email: Set(non_blank(request.email)),
                        created_by: Set(created_by),
                        created_at: Set(Utc::now()),
                    };
                    Ok::<_, ServiceError>(SupplierRepository::insert(txn, model).await?)
                })
            })
            .await?;

        info!(supplier_id = %created.id, name = %created.name, "supplier created");
        Ok(created.into())
    }

    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        id: &str,
        request: SupplierRequest,
    ) -> Result<SupplierResponse, ServiceError> {
        SupplierValidator::validate_base(&request)?;
        let id = id.to_string();

        let updated = self
            .access
            .transaction(move |txn| {
                Box::pin(async move {
                    let existing = SupplierRepository::find_by_id(txn, &id)
                        .await?
                        .ok_or_else(|| supplier_not_found(&id))?;
                    SupplierValidator::assert_unique_name(txn, &request.name, Some(&id)).await?;

                    let mut model = existing.into_active_model();
                    model.name = Set(request.name.trim().to_string());
                    model.contact_name = Set(non_blank(request.contact_name));
                    model.phone = Set(non_blank(request.phone));
                    model.email = Set(non_blank(request.email));
                    Ok::<_, ServiceError>(SupplierRepository::update(txn, model).await?)
                })
            })
            .await?;

        info!(supplier_id = %updated.id, "supplier updated");
        Ok(updated.into())
    }

    /// Fails with 409 while any item of this supplier still holds stock; the foreign key
    /// catches items at zero quantity.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        let id = id.to_string();
        self.access
            .transaction(move |txn| {
                Box::pin(async move {
                    SupplierValidator::validate_deletable(txn, &id).await?;
                    if SupplierRepository::delete_by_id(txn, &id).await? == 0 {
                        return Err(supplier_not_found(&id));
                    }
                    info!(supplier_id = %id, "supplier deleted");
                    Ok::<_, ServiceError>(())
                })
            })
            .await
    }
}

fn supplier_not_found(id: &str) -> ServiceError {
    ServiceError::NotFound(format!("Supplier not found: {}", id))
}
