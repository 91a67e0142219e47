//! Flat rows returned by the store; nested read models are assembled from
//! these by the service layer.

use chrono::{DateTime, Utc};
use common::{MenuId, Money, OptionId, OrderId, OrderItemId};
use domain::{OrderNumber, OrderStatus};

/// A `menus` row, without its options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuRow {
    pub id: MenuId,
    pub name: String,
    pub price: Money,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An `orders` row, without its items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRow {
    pub id: OrderId,
    pub order_number: OrderNumber,
    pub total_amount: Money,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An `order_items` row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItemRow {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub menu_id: MenuId,
    pub menu_name: String,
    pub base_price: Money,
    pub quantity: i32,
    pub total_price: Money,
}

/// An `order_item_options` row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItemOptionRow {
    pub order_item_id: OrderItemId,
    pub option_id: OptionId,
    pub option_name: String,
    pub additional_price: Money,
}
