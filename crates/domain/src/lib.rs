//! Domain layer for the coffee order service.
//!
//! This crate holds the rules that do not depend on storage:
//! - Order status state machine and inventory-debit trigger
//! - Payload validation for menus, orders and stock updates
//! - Per-day order number generation
//! - Stock sufficiency planning for ordered quantities
//! - Read-model types returned to clients

pub mod inventory;
pub mod menu;
pub mod order;
pub mod validation;

pub use inventory::{InventoryLevel, StockAdjustPayload, StockLevel, StockUpdatePayload};
pub use menu::{
    Menu, MenuChanges, MenuOption, MenuOptionPayload, MenuPayload, MenuUpdatePayload, NewMenu,
    NewMenuOption, normalize_image_url,
};
pub use order::{
    NewOrder, NewOrderItem, NewOrderItemOption, Order, OrderError, OrderItem, OrderItemPayload,
    OrderNumber, OrderPayload, OrderStats, OrderStatus, SelectedOption, SelectedOptionPayload,
    StatusChange, StatusPayload, StockRequirement, StockShortfall,
};
pub use validation::ValidationReport;
