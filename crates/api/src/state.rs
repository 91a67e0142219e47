//! Shared application state.

use ordering::{DashboardService, InventoryService, MenuService, OrderService};
use store::Store;

/// Services shared by every handler.
pub struct AppState<S: Store> {
    pub orders: OrderService<S>,
    pub menus: MenuService<S>,
    pub inventory: InventoryService<S>,
    pub dashboard: DashboardService<S>,
}

impl<S: Store + Clone> AppState<S> {
    /// Builds every service on top of one store.
    pub fn new(store: S) -> Self {
        Self {
            orders: OrderService::new(store.clone()),
            menus: MenuService::new(store.clone()),
            inventory: InventoryService::new(store.clone()),
            dashboard: DashboardService::new(store),
        }
    }
}
