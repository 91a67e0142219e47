use async_trait::async_trait;
use chrono::NaiveDate;
use common::{MenuId, Money, OrderId, OrderItemId};
use domain::{
    InventoryLevel, MenuChanges, MenuOption, NewMenu, NewMenuOption, NewOrderItem,
    NewOrderItemOption, OrderNumber, OrderStats, OrderStatus, StatusChange, StockLevel,
};

use crate::{MenuRow, OrderItemOptionRow, OrderItemRow, OrderQuery, OrderRow, Result};

/// Source of transactions over the shop's tables.
#[async_trait]
pub trait Store: Send + Sync {
    /// The transaction type handed out by this store.
    type Tx: StoreTx;

    /// Opens a new transaction.
    async fn begin(&self) -> Result<Self::Tx>;
}

/// A unit of work over the shop's tables.
///
/// Every write is visible to later reads on the same transaction and to no
/// one else until [`commit`](StoreTx::commit). Dropping the transaction
/// discards all of its writes.
#[async_trait]
pub trait StoreTx: Send {
    // Menus

    /// Lists menus, newest first.
    async fn list_menus(&mut self) -> Result<Vec<MenuRow>>;

    /// Fetches a single menu.
    async fn find_menu(&mut self, id: MenuId) -> Result<Option<MenuRow>>;

    /// Fetches the options of the given menus, ordered by id.
    async fn menu_options(&mut self, menu_ids: &[MenuId]) -> Result<Vec<MenuOption>>;

    /// Inserts a menu row; its options are inserted separately.
    async fn insert_menu(&mut self, menu: &NewMenu) -> Result<MenuRow>;

    /// Inserts an option for a menu.
    async fn insert_menu_option(
        &mut self,
        menu_id: MenuId,
        option: &NewMenuOption,
    ) -> Result<MenuOption>;

    /// Applies the given changes; returns `None` if the menu does not exist.
    async fn update_menu(&mut self, id: MenuId, changes: &MenuChanges) -> Result<Option<MenuRow>>;

    /// Counts the order lines that reference a menu.
    async fn count_order_items_for_menu(&mut self, id: MenuId) -> Result<i64>;

    /// Deletes a menu together with its options and inventory record.
    async fn delete_menu(&mut self, id: MenuId) -> Result<bool>;

    // Inventory

    /// Creates the stock record of a menu with zero stock.
    async fn insert_inventory(&mut self, menu_id: MenuId, unit: &str) -> Result<()>;

    /// Lists every stock record joined with its menu name, ordered by name.
    async fn list_inventory(&mut self) -> Result<Vec<InventoryLevel>>;

    /// Reads a stock record without locking it.
    async fn stock_level(&mut self, menu_id: MenuId) -> Result<Option<StockLevel>>;

    /// Reads a stock record and locks it until the transaction ends.
    async fn lock_stock_level(&mut self, menu_id: MenuId) -> Result<Option<StockLevel>>;

    /// Adds `amount` to the stock; `None` if no record exists.
    async fn increase_stock(&mut self, menu_id: MenuId, amount: i32) -> Result<Option<StockLevel>>;

    /// Subtracts `amount` if at least that much is on hand.
    ///
    /// Returns `None` when there is no record or the stock is insufficient,
    /// leaving the record untouched.
    async fn decrease_stock(&mut self, menu_id: MenuId, amount: i32) -> Result<Option<StockLevel>>;

    /// Overwrites the stock; `None` if no record exists.
    async fn set_stock(&mut self, menu_id: MenuId, stock: i32) -> Result<Option<StockLevel>>;

    // Orders

    /// Serializes order numbering for one day until the transaction ends.
    async fn lock_order_day(&mut self, date: NaiveDate) -> Result<()>;

    /// Counts orders whose number matches a SQL `LIKE` pattern.
    async fn count_orders_matching(&mut self, pattern: &str) -> Result<i64>;

    /// Inserts an order header.
    async fn insert_order(
        &mut self,
        number: &OrderNumber,
        total_amount: Money,
        status: OrderStatus,
    ) -> Result<OrderRow>;

    /// Inserts a line item of an order.
    async fn insert_order_item(
        &mut self,
        order_id: OrderId,
        item: &NewOrderItem,
    ) -> Result<OrderItemRow>;

    /// Inserts an option chosen for a line item.
    async fn insert_order_item_option(
        &mut self,
        order_item_id: OrderItemId,
        option: &NewOrderItemOption,
    ) -> Result<OrderItemOptionRow>;

    /// Fetches an order header.
    async fn find_order(&mut self, id: OrderId) -> Result<Option<OrderRow>>;

    /// Reads an order's status and locks the order until the transaction ends.
    async fn lock_order_status(&mut self, id: OrderId) -> Result<Option<OrderStatus>>;

    /// Lists order headers matching the query, newest first.
    async fn list_orders(&mut self, query: &OrderQuery) -> Result<Vec<OrderRow>>;

    /// Fetches the line items of the given orders, ordered by id.
    async fn order_items(&mut self, order_ids: &[OrderId]) -> Result<Vec<OrderItemRow>>;

    /// Fetches the options of the given line items, ordered by id.
    async fn order_item_options(
        &mut self,
        item_ids: &[OrderItemId],
    ) -> Result<Vec<OrderItemOptionRow>>;

    /// Sets an order's status; `None` if the order does not exist.
    async fn update_order_status(
        &mut self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Option<StatusChange>>;

    /// Counts orders in total and per active status.
    async fn order_stats(&mut self) -> Result<OrderStats>;

    /// Makes every write of this transaction durable.
    async fn commit(self) -> Result<()>;
}
