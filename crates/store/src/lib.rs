//! Transactional storage for the coffee order service.
//!
//! Every read and write goes through a [`StoreTx`] obtained from
//! [`Store::begin`]. Dropping a transaction without calling
//! [`StoreTx::commit`] rolls back everything done on it.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod query;
pub mod records;
pub mod store;

pub use error::{Result, StoreError, constraints};
pub use memory::InMemoryStore;
pub use postgres::{PostgresStore, PostgresTx};
pub use query::OrderQuery;
pub use records::{MenuRow, OrderItemOptionRow, OrderItemRow, OrderRow};
pub use store::{Store, StoreTx};
