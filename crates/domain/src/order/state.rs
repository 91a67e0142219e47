//! Order status state machine.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::OrderError;

/// The status of an order in its lifecycle.
///
/// Status transitions:
/// ```text
/// Received ──► Preparing ──► Completed
///     │            │             │
///     └────────────┴─────────────┴──► Cancelled
/// ```
///
/// Inventory is debited exactly once, on `Received -> Preparing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Order has been placed; nothing has been taken from stock yet.
    #[default]
    Received,

    /// Order is being made; stock has been debited.
    Preparing,

    /// Order was handed over. It can still be voided (refund).
    Completed,

    /// Order was cancelled (terminal state).
    Cancelled,
}

impl OrderStatus {
    /// All statuses, in lifecycle order.
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Received,
        OrderStatus::Preparing,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    /// Returns true if the order may move from `self` to `next`.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;

        match (*self, next) {
            (Received, Preparing) => true,
            (Preparing, Completed) => true,
            (Received | Preparing | Completed, Cancelled) => true,
            (Received, Received | Completed) => false,
            (Preparing, Received | Preparing) => false,
            (Completed, Received | Preparing | Completed) => false,
            (Cancelled, _) => false,
        }
    }

    /// Validates the move from `self` to `next`, returning the new status.
    pub fn transition_to(&self, next: OrderStatus) -> Result<OrderStatus, OrderError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(OrderError::InvalidStatusTransition {
                from: *self,
                to: next,
            })
        }
    }

    /// Returns true if this transition takes the ordered quantities out of stock.
    pub fn debits_inventory(from: OrderStatus, to: OrderStatus) -> bool {
        matches!((from, to), (OrderStatus::Received, OrderStatus::Preparing))
    }

    /// Returns true if this is a terminal status (no further transitions possible).
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Cancelled)
    }

    /// Returns the status name as stored and sent over the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Received => "received",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "received" => Ok(OrderStatus::Received),
            "preparing" => Ok(OrderStatus::Preparing),
            "completed" => Ok(OrderStatus::Completed),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(OrderError::UnknownStatus(other.to_string())),
        }
    }
}
