//! Shared types used across the coffee order service crates.

mod money;
mod types;

pub use money::Money;
pub use types::{MenuId, OptionId, OrderId, OrderItemId};
