use sea_orm::ConnectionTrait;

use crate::{
    dto::supplier::SupplierRequest,
    errors::ServiceError,
    repositories::{inventory_item::InventoryItemRepository, supplier::SupplierRepository},
};

pub struct SupplierValidator;

impl SupplierValidator {
    pub fn validate_base(dto: &SupplierRequest) -> Result<(), ServiceError> {
        if dto.name.trim().is_empty() {
            return Err(ServiceError::InvalidRequest(
                "Supplier name must not be blank".to_string(),
            ));
        }
        Ok(())
    }

    /// Case-insensitive uniqueness; `exclude_id` lets a supplier keep its own name on update.
    pub async fn assert_unique_name<C: ConnectionTrait>(
        db: &C,
        name: &str,
        exclude_id: Option<&str>,
    ) -> Result<(), ServiceError> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(());
        }
        if SupplierRepository::exists_by_name_ignore_case(db, name, exclude_id).await? {
            return Err(ServiceError::DuplicateResource(
                "Supplier already exists".to_string(),
            ));
        }
        Ok(())
    }

    /// A supplier with any stocked item cannot be removed.
    pub async fn validate_deletable<C: ConnectionTrait>(
        db: &C,
        supplier_id: &str,
    ) -> Result<(), ServiceError> {
        if supplier_id.trim().is_empty() {
            return Err(ServiceError::InvalidRequest(
                "Supplier id must be provided for deletion".to_string(),
            ));
        }
        if InventoryItemRepository::exists_active_stock_for_supplier(db, supplier_id, 0).await? {
            return Err(ServiceError::IllegalState(
                "Cannot delete supplier with linked items".to_string(),
            ));
        }
        Ok(())
    }
}
