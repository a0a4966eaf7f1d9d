use rust_decimal::Decimal;

use crate::{
    dto::stock_history::NewStockHistory, entities::StockChangeReason, errors::ServiceError,
};

pub struct StockHistoryValidator;

impl StockHistoryValidator {
    pub fn validate(dto: &NewStockHistory) -> Result<(), ServiceError> {
        if dto.item_id.trim().is_empty() {
            return Err(invalid("Item ID cannot be null or empty"));
        }
        let price_change = dto.reason == StockChangeReason::PriceChange;
        if dto.change == 0 && !price_change {
            return Err(invalid("Change amount must be non-zero"));
        }
        if dto.created_by.trim().is_empty() {
            return Err(invalid("CreatedBy is required"));
        }
        if price_change && dto.price_at_change.is_some_and(|p| p < Decimal::ZERO) {
            return Err(invalid("Price at change must be non-negative"));
        }
        Ok(())
    }
}

fn invalid(message: &str) -> ServiceError {
    ServiceError::InvalidArgument(message.to_string())
}
