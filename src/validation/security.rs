use crate::{
    auth::Actor, dto::inventory::InventoryItemRequest, entities::inventory_item,
    errors::ServiceError,
};

pub struct InventoryItemSecurityValidator;

impl InventoryItemSecurityValidator {
    /// USER may only touch quantity and price; ADMIN may change anything.
    pub fn validate_update_permissions(
        actor: Option<&Actor>,
        existing: &inventory_item::Model,
        incoming: &InventoryItemRequest,
    ) -> Result<(), ServiceError> {
        let actor =
            actor.ok_or_else(|| ServiceError::Unauthorized("Unauthorized access".to_string()))?;
        if actor.is_admin() {
            return Ok(());
        }

        // Compared the way the update stores them, so padding alone is not a rename.
        let name_changed = existing.name != incoming.name.trim();
        let supplier_changed =
            incoming.supplier_id.as_deref().map(str::trim) != Some(existing.supplier_id.as_str());
        if name_changed || supplier_changed {
            return Err(ServiceError::Forbidden(
                "Users are only allowed to change quantity or price.".to_string(),
            ));
        }
        Ok(())
    }
}
