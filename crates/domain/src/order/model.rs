//! Order read models returned to clients.

use chrono::{DateTime, Utc};
use common::{MenuId, Money, OptionId, OrderId, OrderItemId};
use serde::{Deserialize, Serialize};

use super::{OrderNumber, OrderStatus};

/// An order with its items and their selected options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub order_number: OrderNumber,
    pub total_amount: Money,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub items: Vec<OrderItem>,
}

/// A line item as it was ordered; names and prices are copies taken at order
/// time and do not follow later menu edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: OrderItemId,
    pub menu_id: MenuId,
    pub menu_name: String,
    pub base_price: Money,
    pub quantity: i32,
    pub total_price: Money,
    pub selected_options: Vec<SelectedOption>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedOption {
    pub option_id: OptionId,
    pub option_name: String,
    pub additional_price: Money,
}

/// Result of a status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChange {
    pub id: OrderId,
    pub status: OrderStatus,
    pub updated_at: DateTime<Utc>,
}

/// Order counts shown on the admin dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStats {
    pub total_orders: i64,
    pub received_orders: i64,
    pub preparing_orders: i64,
    pub completed_orders: i64,
}
