//! Orders: status machine, numbering, stock checks, payloads and read models.

mod model;
mod number;
mod payload;
mod state;
pub mod stock;

pub use model::{Order, OrderItem, OrderStats, SelectedOption, StatusChange};
pub use number::OrderNumber;
pub use payload::{
    NewOrder, NewOrderItem, NewOrderItemOption, OrderItemPayload, OrderPayload,
    SelectedOptionPayload, StatusPayload,
};
pub use state::OrderStatus;
pub use stock::{StockRequirement, StockShortfall};

use thiserror::Error;

/// Errors raised by order rules.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The requested status cannot follow the current one.
    #[error("cannot change order status from '{from}' to '{to}'")]
    InvalidStatusTransition { from: OrderStatus, to: OrderStatus },

    /// The status value is not one of the known statuses.
    #[error("unknown order status '{0}'")]
    UnknownStatus(String),
}
