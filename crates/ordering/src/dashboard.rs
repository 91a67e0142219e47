use domain::OrderStats;
use store::{Store, StoreTx};

use crate::Result;

/// Order counts for the admin dashboard.
#[derive(Clone)]
pub struct DashboardService<S: Store> {
    store: S,
}

impl<S: Store> DashboardService<S> {
    /// Creates a new dashboard service.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Counts all orders and those received, preparing and completed.
    #[tracing::instrument(skip(self))]
    pub async fn stats(&self) -> Result<OrderStats> {
        let mut tx = self.store.begin().await?;
        Ok(tx.order_stats().await?)
    }
}
