//! Services for the coffee order service.
//!
//! Each service call runs in one store transaction. The order lifecycle
//! couples the status machine to inventory: moving an order from received to
//! preparing debits the stock of every menu on it, all or nothing.

pub mod dashboard;
pub mod error;
pub mod inventory;
pub mod menus;
pub mod orders;
pub mod read_model;

pub use dashboard::DashboardService;
pub use error::{Result, ServiceError};
pub use inventory::{InventoryLedger, InventoryService};
pub use menus::MenuService;
pub use orders::OrderService;
