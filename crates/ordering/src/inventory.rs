//! Stock bookkeeping.

use common::MenuId;
use domain::order::stock;
use domain::{InventoryLevel, StockLevel, StockRequirement, StockShortfall};
use store::{Store, StoreTx};

use crate::{Result, ServiceError};

fn no_record(menu_id: MenuId) -> ServiceError {
    ServiceError::NotFound(format!("inventory record for menu {menu_id} not found"))
}

/// Stock operations over a caller-owned transaction.
///
/// Nothing is committed here; the caller decides when the unit of work ends.
pub struct InventoryLedger<'a, T: StoreTx> {
    tx: &'a mut T,
}

impl<'a, T: StoreTx> InventoryLedger<'a, T> {
    /// Creates a ledger that works on the given transaction.
    pub fn new(tx: &'a mut T) -> Self {
        Self { tx }
    }

    /// Lists stock for every menu, ordered by menu name.
    pub async fn get_all(&mut self) -> Result<Vec<InventoryLevel>> {
        Ok(self.tx.list_inventory().await?)
    }

    /// Adds stock to a menu.
    pub async fn increase(&mut self, menu_id: MenuId, amount: i32) -> Result<StockLevel> {
        self.tx
            .increase_stock(menu_id, amount)
            .await?
            .ok_or_else(|| no_record(menu_id))
    }

    /// Removes stock from a menu, refusing to go below zero.
    pub async fn decrease(&mut self, menu_id: MenuId, amount: i32) -> Result<StockLevel> {
        let level = self
            .tx
            .lock_stock_level(menu_id)
            .await?
            .ok_or_else(|| no_record(menu_id))?;

        if level.current_stock < amount {
            let menu_name = self
                .tx
                .find_menu(menu_id)
                .await?
                .map(|m| m.name)
                .unwrap_or_default();
            return Err(ServiceError::InsufficientStock(vec![StockShortfall {
                menu_id,
                menu_name,
                current_stock: Some(level.current_stock),
                needed: amount,
            }]));
        }

        self.tx
            .decrease_stock(menu_id, amount)
            .await?
            .ok_or_else(|| no_record(menu_id))
    }

    /// Overwrites the stock of a menu.
    pub async fn set_absolute(&mut self, menu_id: MenuId, value: i32) -> Result<StockLevel> {
        self.tx
            .set_stock(menu_id, value)
            .await?
            .ok_or_else(|| no_record(menu_id))
    }

    /// Checks, without locking or reserving, that every menu exists and has
    /// enough stock.
    ///
    /// A missing menu or stock record is `NotFound`; otherwise every short
    /// menu is reported together.
    pub async fn check_available(&mut self, requirements: &[StockRequirement]) -> Result<()> {
        let mut levels = Vec::with_capacity(requirements.len());
        for req in requirements {
            if self.tx.find_menu(req.menu_id).await?.is_none() {
                return Err(ServiceError::NotFound(format!(
                    "menu {} not found",
                    req.menu_id
                )));
            }
            let level = self
                .tx
                .stock_level(req.menu_id)
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!(
                        "inventory record for {} not found",
                        req.menu_name
                    ))
                })?;
            levels.push((req.menu_id, level.current_stock));
        }

        let shortfalls = stock::find_shortfalls(requirements, |id| lookup(&levels, id));
        if shortfalls.is_empty() {
            Ok(())
        } else {
            Err(shortfall_error(shortfalls))
        }
    }

    /// Debits every requirement, or nothing.
    ///
    /// Stock rows are locked until the transaction ends. If any menu lacks a
    /// record or enough stock, no row is changed and every short menu is
    /// reported.
    pub async fn debit(&mut self, requirements: &[StockRequirement]) -> Result<()> {
        // Lock in menu id order so concurrent debits cannot deadlock.
        let mut lock_order: Vec<MenuId> = requirements.iter().map(|r| r.menu_id).collect();
        lock_order.sort();

        let mut levels = Vec::with_capacity(lock_order.len());
        for menu_id in lock_order {
            if let Some(level) = self.tx.lock_stock_level(menu_id).await? {
                levels.push((menu_id, level.current_stock));
            }
        }

        let shortfalls = stock::find_shortfalls(requirements, |id| lookup(&levels, id));
        if !shortfalls.is_empty() {
            return Err(shortfall_error(shortfalls));
        }

        let mut units: u64 = 0;
        for req in requirements {
            if self.tx.decrease_stock(req.menu_id, req.quantity).await?.is_none() {
                return Err(shortfall_error(vec![StockShortfall {
                    menu_id: req.menu_id,
                    menu_name: req.menu_name.clone(),
                    current_stock: lookup(&levels, req.menu_id),
                    needed: req.quantity,
                }]));
            }
            units += u64::try_from(req.quantity).unwrap_or_default();
        }

        metrics::counter!("inventory_debited_units_total").increment(units);
        Ok(())
    }
}

fn lookup(levels: &[(MenuId, i32)], menu_id: MenuId) -> Option<i32> {
    levels
        .iter()
        .find(|(id, _)| *id == menu_id)
        .map(|(_, stock)| *stock)
}

fn shortfall_error(shortfalls: Vec<StockShortfall>) -> ServiceError {
    metrics::counter!("stock_shortfalls_total").increment(shortfalls.len() as u64);
    for shortfall in &shortfalls {
        tracing::warn!(
            menu_id = %shortfall.menu_id,
            menu_name = %shortfall.menu_name,
            current_stock = ?shortfall.current_stock,
            needed = shortfall.needed,
            "insufficient stock"
        );
    }
    ServiceError::InsufficientStock(shortfalls)
}

/// Admin-facing stock management; each call is its own transaction.
#[derive(Clone)]
pub struct InventoryService<S: Store> {
    store: S,
}

impl<S: Store> InventoryService<S> {
    /// Creates a new inventory service.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Lists stock for every menu, ordered by menu name.
    #[tracing::instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<InventoryLevel>> {
        let mut tx = self.store.begin().await?;
        InventoryLedger::new(&mut tx).get_all().await
    }

    /// Adds stock to a menu.
    #[tracing::instrument(skip(self))]
    pub async fn increase(&self, menu_id: MenuId, amount: i32) -> Result<StockLevel> {
        let mut tx = self.store.begin().await?;
        let level = InventoryLedger::new(&mut tx).increase(menu_id, amount).await?;
        tx.commit().await?;
        tracing::info!(current_stock = level.current_stock, "stock increased");
        Ok(level)
    }

    /// Removes stock from a menu.
    #[tracing::instrument(skip(self))]
    pub async fn decrease(&self, menu_id: MenuId, amount: i32) -> Result<StockLevel> {
        let mut tx = self.store.begin().await?;
        let level = InventoryLedger::new(&mut tx).decrease(menu_id, amount).await?;
        tx.commit().await?;
        tracing::info!(current_stock = level.current_stock, "stock decreased");
        Ok(level)
    }

    /// Overwrites the stock of a menu.
    #[tracing::instrument(skip(self))]
    pub async fn set(&self, menu_id: MenuId, value: i32) -> Result<StockLevel> {
        let mut tx = self.store.begin().await?;
        let level = InventoryLedger::new(&mut tx)
            .set_absolute(menu_id, value)
            .await?;
        tx.commit().await?;
        tracing::info!(current_stock = level.current_stock, "stock set");
        Ok(level)
    }
}
