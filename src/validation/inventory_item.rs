use rust_decimal::Decimal;
use sea_orm::ConnectionTrait;

use super::is_blank;
use crate::{
    dto::inventory::InventoryItemRequest, errors::ServiceError,
    repositories::inventory_item::InventoryItemRepository,
};

/// Field rules shared by create and update. Fails on the first broken rule.
pub fn validate_base(item: &InventoryItemRequest) -> Result<(), ServiceError> {
    if item.name.trim().is_empty() {
        return Err(invalid("Product name cannot be null or empty"));
    }
    if item.quantity < 0 {
        return Err(invalid("Quantity cannot be negative"));
    }
    if !item.price.is_some_and(|p| p > Decimal::ZERO) {
        return Err(invalid("Price must be positive"));
    }
    if is_blank(item.supplier_id.as_deref()) {
        return Err(invalid("Supplier ID must be provided"));
    }
    if is_blank(item.created_by.as_deref()) {
        return Err(invalid("CreatedBy must be provided"));
    }
    Ok(())
}

/// Rejects a name already held by another item, ignoring case.
pub async fn validate_inventory_item_not_exists<C: ConnectionTrait>(
    db: &C,
    name: &str,
    exclude_id: Option<&str>,
) -> Result<(), ServiceError> {
    if InventoryItemRepository::exists_by_name_ignore_case(db, name.trim(), exclude_id).await? {
        return Err(ServiceError::DuplicateResource(
            "An inventory item with this name already exists".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_price(price: Decimal) -> Result<(), ServiceError> {
    if price <= Decimal::ZERO {
        return Err(invalid("Price must be positive"));
    }
    Ok(())
}

fn invalid(message: &str) -> ServiceError {
    ServiceError::InvalidArgument(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use proptest::prelude::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn valid() -> InventoryItemRequest {
        InventoryItemRequest {
            id: None,
            name: "Widget".into(),
            quantity: 5,
            price: Some(dec!(9.99)),
            supplier_id: Some("s-1".into()),
            minimum_quantity: None,
            created_by: Some("alice".into()),
        }
    }

    #[test]
    fn accepts_well_formed_item() {
        assert!(validate_base(&valid()).is_ok());
    }

    #[rstest]
    #[case::blank_name(InventoryItemRequest { name: "  ".into(), ..valid() }, "Product name cannot be null or empty")]
    #[case::negative_quantity(InventoryItemRequest { quantity: -1, ..valid() }, "Quantity cannot be negative")]
    #[case::missing_price(InventoryItemRequest { price: None, ..valid() }, "Price must be positive")]
    #[case::zero_price(InventoryItemRequest { price: Some(Decimal::ZERO), ..valid() }, "Price must be positive")]
    #[case::missing_supplier(InventoryItemRequest { supplier_id: Some("".into()), ..valid() }, "Supplier ID must be provided")]
    #[case::missing_creator(InventoryItemRequest { created_by: None, ..valid() }, "CreatedBy must be provided")]
    fn reports_first_broken_rule(#[case] item: InventoryItemRequest, #[case] expected: &str) {
        assert_matches!(
            validate_base(&item),
            Err(ServiceError::InvalidArgument(msg)) if msg == expected
        );
    }

    #[test]
    fn rules_are_checked_in_order() {
        let item = InventoryItemRequest {
            name: String::new(),
            quantity: -3,
            price: None,
            ..valid()
        };
        assert_matches!(
            validate_base(&item),
            Err(ServiceError::InvalidArgument(msg)) if msg.starts_with("Product name")
        );
    }

    proptest! {
        #[test]
        fn negative_quantity_is_always_rejected(q in i32::MIN..0) {
            let item = InventoryItemRequest { quantity: q, ..valid() };
            prop_assert!(validate_base(&item).is_err());
        }

        #[test]
        fn any_positive_price_passes(cents in 1i64..10_000_000) {
            let item = InventoryItemRequest { price: Some(Decimal::new(cents, 2)), ..valid() };
            prop_assert!(validate_base(&item).is_ok());
            prop_assert!(validate_price(Decimal::new(cents, 2)).is_ok());
            prop_assert!(validate_price(Decimal::new(-cents, 2)).is_err());
        }
    }
}
