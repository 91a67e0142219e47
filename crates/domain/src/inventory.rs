//! Inventory read models and stock update payloads.

use chrono::{DateTime, Utc};
use common::MenuId;
use serde::{Deserialize, Serialize};

use crate::validation::{ValidationReport, validate_adjustment, validate_inventory_update};

/// Unit label used for inventory records created with a new menu.
pub const DEFAULT_UNIT: &str = "ea";

/// Current stock of one menu, joined with its name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryLevel {
    pub menu_id: MenuId,
    pub menu_name: String,
    pub current_stock: i32,
    pub unit: String,
    pub updated_at: DateTime<Utc>,
}

/// Stock of one menu right after a ledger mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockLevel {
    pub menu_id: MenuId,
    pub current_stock: i32,
    pub updated_at: DateTime<Utc>,
}

/// Body of a direct stock update (`PUT /admin/inventory/{menuId}`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockUpdatePayload {
    pub current_stock: Option<i64>,
}

impl StockUpdatePayload {
    /// Validates the payload and returns the new absolute stock.
    pub fn into_stock(self) -> Result<i32, ValidationReport> {
        validate_inventory_update(&self).into_result()?;
        self.current_stock
            .and_then(|stock| i32::try_from(stock).ok())
            .ok_or_else(|| ValidationReport::single("current stock is required"))
    }
}

/// Body of a relative stock adjustment (increase or decrease).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockAdjustPayload {
    pub amount: Option<i64>,
}

impl StockAdjustPayload {
    /// The requested amount; an absent amount means one unit.
    pub fn amount_or_default(&self) -> i64 {
        self.amount.unwrap_or(1)
    }

    /// Validates the payload and returns the amount to move.
    pub fn into_amount(self) -> Result<i32, ValidationReport> {
        validate_adjustment(&self).into_result()?;
        i32::try_from(self.amount_or_default())
            .map_err(|_| ValidationReport::single("amount is too large"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjust_payload_defaults_to_one_unit() {
        let payload: StockAdjustPayload = serde_json::from_str("{}").unwrap();
        assert_eq!(payload.into_amount().unwrap(), 1);
    }

    #[test]
    fn adjust_payload_rejects_non_positive() {
        let payload = StockAdjustPayload { amount: Some(0) };
        assert!(payload.into_amount().is_err());
    }

    #[test]
    fn update_payload_yields_stock() {
        let payload: StockUpdatePayload = serde_json::from_str(r#"{"currentStock": 12}"#).unwrap();
        assert_eq!(payload.into_stock().unwrap(), 12);

        let missing: StockUpdatePayload = serde_json::from_str("{}").unwrap();
        assert!(missing.into_stock().is_err());
    }
}
