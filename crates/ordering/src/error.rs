//! Service error types.

use domain::{OrderError, OrderStatus, StockShortfall, ValidationReport};
use store::StoreError;
use thiserror::Error;

/// Errors that can occur in service operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request payload failed validation.
    #[error("{}", .0.join(", "))]
    Validation(Vec<String>),

    /// The requested entity does not exist.
    #[error("{0}")]
    NotFound(String),

    /// One or more menus lack the stock an order needs.
    #[error("insufficient stock: {}", describe_shortfalls(.0))]
    InsufficientStock(Vec<StockShortfall>),

    /// The requested status cannot follow the current one.
    #[error("cannot change order status from '{from}' to '{to}'")]
    InvalidStatusTransition { from: OrderStatus, to: OrderStatus },

    /// The order has no items to prepare.
    #[error("order has no items")]
    EmptyOrder,

    /// Another menu already uses the name.
    #[error("a menu with this name already exists")]
    DuplicateMenu,

    /// The menu appears on existing orders.
    #[error("menu is referenced by existing orders and cannot be deleted")]
    MenuInUse,

    /// Storage error.
    #[error(transparent)]
    Store(#[from] StoreError),
}

fn describe_shortfalls(shortfalls: &[StockShortfall]) -> String {
    shortfalls
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<ValidationReport> for ServiceError {
    fn from(report: ValidationReport) -> Self {
        ServiceError::Validation(report.into_errors())
    }
}

impl From<OrderError> for ServiceError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::InvalidStatusTransition { from, to } => {
                ServiceError::InvalidStatusTransition { from, to }
            }
            OrderError::UnknownStatus(_) => {
                ServiceError::Validation(vec!["invalid order status".to_string()])
            }
        }
    }
}

/// Convenience type alias for service results.
pub type Result<T> = std::result::Result<T, ServiceError>;
