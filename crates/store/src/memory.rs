use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use common::{MenuId, Money, OptionId, OrderId, OrderItemId};
use domain::{
    InventoryLevel, MenuChanges, MenuOption, NewMenu, NewMenuOption, NewOrderItem,
    NewOrderItemOption, OrderNumber, OrderStats, OrderStatus, StatusChange, StockLevel,
};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::{
    MenuRow, OrderItemOptionRow, OrderItemRow, OrderQuery, OrderRow, Result, StoreError,
    constraints,
    store::{Store, StoreTx},
};

#[derive(Debug, Clone)]
struct StockRecord {
    current_stock: i32,
    unit: String,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
struct Sequences {
    menu: i64,
    option: i64,
    order: i64,
    order_item: i64,
    order_item_option: i64,
}

fn next(seq: &mut i64) -> i64 {
    *seq += 1;
    *seq
}

#[derive(Debug, Clone, Default)]
struct Tables {
    menus: BTreeMap<i64, MenuRow>,
    menu_options: BTreeMap<i64, MenuOption>,
    inventory: BTreeMap<i64, StockRecord>,
    orders: BTreeMap<i64, OrderRow>,
    order_items: BTreeMap<i64, OrderItemRow>,
    order_item_options: BTreeMap<i64, OrderItemOptionRow>,
    seq: Sequences,
}

impl Tables {
    fn stock(&self, menu_id: MenuId) -> Option<StockLevel> {
        self.inventory.get(&menu_id.as_i64()).map(|r| StockLevel {
            menu_id,
            current_stock: r.current_stock,
            updated_at: r.updated_at,
        })
    }

    fn update_stock(
        &mut self,
        menu_id: MenuId,
        apply: impl FnOnce(i32) -> Result<Option<i32>>,
    ) -> Result<Option<StockLevel>> {
        let Some(record) = self.inventory.get_mut(&menu_id.as_i64()) else {
            return Ok(None);
        };
        let Some(updated) = apply(record.current_stock)? else {
            return Ok(None);
        };
        if updated < 0 {
            return Err(StoreError::CheckViolation {
                constraint: constraints::STOCK_NON_NEGATIVE.to_string(),
            });
        }
        record.current_stock = updated;
        record.updated_at = Utc::now();
        Ok(self.stock(menu_id))
    }
}

fn out_of_range() -> StoreError {
    StoreError::InvalidData("integer out of range".to_string())
}

/// In-memory store implementation for testing and local runs.
///
/// Mirrors the PostgreSQL schema's constraints. A transaction holds the only
/// lock on the tables until it ends, so transactions never interleave.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
    fail_on_order_item_insert: Arc<AtomicBool>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent order line insert fail with a database error.
    pub fn set_fail_on_order_item_insert(&self, fail: bool) {
        self.fail_on_order_item_insert.store(fail, Ordering::SeqCst);
    }

    /// Returns the number of stored orders.
    pub async fn order_count(&self) -> usize {
        self.tables.lock().await.orders.len()
    }

    /// Returns the number of stored order lines.
    pub async fn order_item_count(&self) -> usize {
        self.tables.lock().await.order_items.len()
    }

    /// Returns the committed stock of a menu.
    pub async fn stock_of(&self, menu_id: MenuId) -> Option<i32> {
        self.tables
            .lock()
            .await
            .inventory
            .get(&menu_id.as_i64())
            .map(|r| r.current_stock)
    }

    /// Clears all tables.
    pub async fn clear(&self) {
        *self.tables.lock().await = Tables::default();
    }
}

#[async_trait]
impl Store for InMemoryStore {
    type Tx = InMemoryTx;

    async fn begin(&self) -> Result<InMemoryTx> {
        let guard = Arc::clone(&self.tables).lock_owned().await;
        let staged = guard.clone();
        Ok(InMemoryTx {
            guard,
            staged,
            fail_on_order_item_insert: Arc::clone(&self.fail_on_order_item_insert),
        })
    }
}

/// A transaction over [`InMemoryStore`].
///
/// Writes go to a private copy of the tables that replaces the shared one on
/// commit.
pub struct InMemoryTx {
    guard: OwnedMutexGuard<Tables>,
    staged: Tables,
    fail_on_order_item_insert: Arc<AtomicBool>,
}

#[async_trait]
impl StoreTx for InMemoryTx {
    async fn list_menus(&mut self) -> Result<Vec<MenuRow>> {
        let mut menus: Vec<MenuRow> = self.staged.menus.values().cloned().collect();
        menus.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(menus)
    }

    async fn find_menu(&mut self, id: MenuId) -> Result<Option<MenuRow>> {
        Ok(self.staged.menus.get(&id.as_i64()).cloned())
    }

    async fn menu_options(&mut self, menu_ids: &[MenuId]) -> Result<Vec<MenuOption>> {
        Ok(self
            .staged
            .menu_options
            .values()
            .filter(|o| menu_ids.contains(&o.menu_id))
            .cloned()
            .collect())
    }

    async fn insert_menu(&mut self, menu: &NewMenu) -> Result<MenuRow> {
        if self.staged.menus.values().any(|m| m.name == menu.name) {
            return Err(StoreError::UniqueViolation {
                constraint: constraints::MENU_NAME_UNIQUE.to_string(),
            });
        }

        let now = Utc::now();
        let row = MenuRow {
            id: MenuId::new(next(&mut self.staged.seq.menu)),
            name: menu.name.clone(),
            price: menu.price,
            description: menu.description.clone(),
            image_url: menu.image_url.clone(),
            created_at: now,
            updated_at: now,
        };
        self.staged.menus.insert(row.id.as_i64(), row.clone());
        Ok(row)
    }

    async fn insert_menu_option(
        &mut self,
        menu_id: MenuId,
        option: &NewMenuOption,
    ) -> Result<MenuOption> {
        if !self.staged.menus.contains_key(&menu_id.as_i64()) {
            return Err(StoreError::ForeignKeyViolation {
                constraint: "menu_options_menu_id_fkey".to_string(),
            });
        }

        let row = MenuOption {
            id: OptionId::new(next(&mut self.staged.seq.option)),
            menu_id,
            name: option.name.clone(),
            additional_price: option.additional_price,
        };
        self.staged.menu_options.insert(row.id.as_i64(), row.clone());
        Ok(row)
    }

    async fn update_menu(&mut self, id: MenuId, changes: &MenuChanges) -> Result<Option<MenuRow>> {
        if let Some(ref name) = changes.name
            && self
                .staged
                .menus
                .values()
                .any(|m| m.id != id && &m.name == name)
        {
            return Err(StoreError::UniqueViolation {
                constraint: constraints::MENU_NAME_UNIQUE.to_string(),
            });
        }

        let Some(menu) = self.staged.menus.get_mut(&id.as_i64()) else {
            return Ok(None);
        };
        if let Some(ref name) = changes.name {
            menu.name = name.clone();
        }
        if let Some(price) = changes.price {
            menu.price = price;
        }
        if let Some(ref description) = changes.description {
            menu.description = description.clone();
        }
        if let Some(ref image_url) = changes.image_url {
            menu.image_url = image_url.clone();
        }
        menu.updated_at = Utc::now();
        Ok(Some(menu.clone()))
    }

    async fn count_order_items_for_menu(&mut self, id: MenuId) -> Result<i64> {
        let count = self
            .staged
            .order_items
            .values()
            .filter(|i| i.menu_id == id)
            .count();
        Ok(count as i64)
    }

    async fn delete_menu(&mut self, id: MenuId) -> Result<bool> {
        if !self.staged.menus.contains_key(&id.as_i64()) {
            return Ok(false);
        }
        if self.staged.order_items.values().any(|i| i.menu_id == id) {
            return Err(StoreError::ForeignKeyViolation {
                constraint: constraints::ORDER_ITEM_MENU_FK.to_string(),
            });
        }

        self.staged.menus.remove(&id.as_i64());
        self.staged.menu_options.retain(|_, o| o.menu_id != id);
        self.staged.inventory.remove(&id.as_i64());
        Ok(true)
    }

    async fn insert_inventory(&mut self, menu_id: MenuId, unit: &str) -> Result<()> {
        if !self.staged.menus.contains_key(&menu_id.as_i64()) {
            return Err(StoreError::ForeignKeyViolation {
                constraint: "inventory_menu_id_fkey".to_string(),
            });
        }
        if self.staged.inventory.contains_key(&menu_id.as_i64()) {
            return Err(StoreError::UniqueViolation {
                constraint: "inventory_pkey".to_string(),
            });
        }

        self.staged.inventory.insert(
            menu_id.as_i64(),
            StockRecord {
                current_stock: 0,
                unit: unit.to_string(),
                updated_at: Utc::now(),
            },
        );
        Ok(())
    }

    async fn list_inventory(&mut self) -> Result<Vec<InventoryLevel>> {
        let mut levels: Vec<InventoryLevel> = self
            .staged
            .inventory
            .iter()
            .filter_map(|(menu_id, record)| {
                self.staged.menus.get(menu_id).map(|menu| InventoryLevel {
                    menu_id: menu.id,
                    menu_name: menu.name.clone(),
                    current_stock: record.current_stock,
                    unit: record.unit.clone(),
                    updated_at: record.updated_at,
                })
            })
            .collect();
        levels.sort_by(|a, b| a.menu_name.cmp(&b.menu_name));
        Ok(levels)
    }

    async fn stock_level(&mut self, menu_id: MenuId) -> Result<Option<StockLevel>> {
        Ok(self.staged.stock(menu_id))
    }

    async fn lock_stock_level(&mut self, menu_id: MenuId) -> Result<Option<StockLevel>> {
        Ok(self.staged.stock(menu_id))
    }

    async fn increase_stock(&mut self, menu_id: MenuId, amount: i32) -> Result<Option<StockLevel>> {
        self.staged.update_stock(menu_id, |current| {
            current.checked_add(amount).map(Some).ok_or_else(out_of_range)
        })
    }

    async fn decrease_stock(&mut self, menu_id: MenuId, amount: i32) -> Result<Option<StockLevel>> {
        self.staged.update_stock(menu_id, |current| {
            if current < amount {
                return Ok(None);
            }
            current.checked_sub(amount).map(Some).ok_or_else(out_of_range)
        })
    }

    async fn set_stock(&mut self, menu_id: MenuId, stock: i32) -> Result<Option<StockLevel>> {
        self.staged.update_stock(menu_id, |_| Ok(Some(stock)))
    }

    async fn lock_order_day(&mut self, _date: NaiveDate) -> Result<()> {
        Ok(())
    }

    async fn count_orders_matching(&mut self, pattern: &str) -> Result<i64> {
        let count = self
            .staged
            .orders
            .values()
            .filter(|o| match pattern.strip_suffix('%') {
                Some(prefix) => o.order_number.as_str().starts_with(prefix),
                None => o.order_number.as_str() == pattern,
            })
            .count();
        Ok(count as i64)
    }

    async fn insert_order(
        &mut self,
        number: &OrderNumber,
        total_amount: Money,
        status: OrderStatus,
    ) -> Result<OrderRow> {
        if self
            .staged
            .orders
            .values()
            .any(|o| o.order_number == *number)
        {
            return Err(StoreError::UniqueViolation {
                constraint: constraints::ORDER_NUMBER_UNIQUE.to_string(),
            });
        }

        let now = Utc::now();
        let row = OrderRow {
            id: OrderId::new(next(&mut self.staged.seq.order)),
            order_number: number.clone(),
            total_amount,
            status,
            created_at: now,
            updated_at: now,
        };
        self.staged.orders.insert(row.id.as_i64(), row.clone());
        Ok(row)
    }

    async fn insert_order_item(
        &mut self,
        order_id: OrderId,
        item: &NewOrderItem,
    ) -> Result<OrderItemRow> {
        if self.fail_on_order_item_insert.load(Ordering::SeqCst) {
            return Err(StoreError::Database(sqlx::Error::Protocol(
                "order item insert failed".to_string(),
            )));
        }
        if !self.staged.orders.contains_key(&order_id.as_i64()) {
            return Err(StoreError::ForeignKeyViolation {
                constraint: "order_items_order_id_fkey".to_string(),
            });
        }
        if !self.staged.menus.contains_key(&item.menu_id.as_i64()) {
            return Err(StoreError::ForeignKeyViolation {
                constraint: constraints::ORDER_ITEM_MENU_FK.to_string(),
            });
        }
        if item.quantity < 1 {
            return Err(StoreError::CheckViolation {
                constraint: "order_items_quantity_check".to_string(),
            });
        }

        let row = OrderItemRow {
            id: OrderItemId::new(next(&mut self.staged.seq.order_item)),
            order_id,
            menu_id: item.menu_id,
            menu_name: item.menu_name.clone(),
            base_price: item.base_price,
            quantity: item.quantity,
            total_price: item.total_price,
        };
        self.staged.order_items.insert(row.id.as_i64(), row.clone());
        Ok(row)
    }

    async fn insert_order_item_option(
        &mut self,
        order_item_id: OrderItemId,
        option: &NewOrderItemOption,
    ) -> Result<OrderItemOptionRow> {
        if !self
            .staged
            .order_items
            .contains_key(&order_item_id.as_i64())
        {
            return Err(StoreError::ForeignKeyViolation {
                constraint: "order_item_options_order_item_id_fkey".to_string(),
            });
        }

        let row = OrderItemOptionRow {
            order_item_id,
            option_id: option.option_id,
            option_name: option.option_name.clone(),
            additional_price: option.additional_price,
        };
        let id = next(&mut self.staged.seq.order_item_option);
        self.staged.order_item_options.insert(id, row.clone());
        Ok(row)
    }

    async fn find_order(&mut self, id: OrderId) -> Result<Option<OrderRow>> {
        Ok(self.staged.orders.get(&id.as_i64()).cloned())
    }

    async fn lock_order_status(&mut self, id: OrderId) -> Result<Option<OrderStatus>> {
        Ok(self.staged.orders.get(&id.as_i64()).map(|o| o.status))
    }

    async fn list_orders(&mut self, query: &OrderQuery) -> Result<Vec<OrderRow>> {
        let mut orders: Vec<OrderRow> = self
            .staged
            .orders
            .values()
            .filter(|o| query.matches(o.status, o.created_at))
            .cloned()
            .collect();
        orders.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(orders)
    }

    async fn order_items(&mut self, order_ids: &[OrderId]) -> Result<Vec<OrderItemRow>> {
        Ok(self
            .staged
            .order_items
            .values()
            .filter(|i| order_ids.contains(&i.order_id))
            .cloned()
            .collect())
    }

    async fn order_item_options(
        &mut self,
        item_ids: &[OrderItemId],
    ) -> Result<Vec<OrderItemOptionRow>> {
        Ok(self
            .staged
            .order_item_options
            .values()
            .filter(|o| item_ids.contains(&o.order_item_id))
            .cloned()
            .collect())
    }

    async fn update_order_status(
        &mut self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Option<StatusChange>> {
        let Some(order) = self.staged.orders.get_mut(&id.as_i64()) else {
            return Ok(None);
        };
        order.status = status;
        order.updated_at = Utc::now();
        Ok(Some(StatusChange {
            id,
            status,
            updated_at: order.updated_at,
        }))
    }

    async fn order_stats(&mut self) -> Result<OrderStats> {
        let count = |status: OrderStatus| {
            self.staged
                .orders
                .values()
                .filter(|o| o.status == status)
                .count() as i64
        };
        Ok(OrderStats {
            total_orders: self.staged.orders.len() as i64,
            received_orders: count(OrderStatus::Received),
            preparing_orders: count(OrderStatus::Preparing),
            completed_orders: count(OrderStatus::Completed),
        })
    }

    async fn commit(self) -> Result<()> {
        let InMemoryTx {
            mut guard, staged, ..
        } = self;
        *guard = staged;
        Ok(())
    }
}
