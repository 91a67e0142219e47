//! Menu management.

use common::MenuId;
use domain::inventory::DEFAULT_UNIT;
use domain::{Menu, MenuChanges, MenuPayload, MenuUpdatePayload, NewMenu};
use store::{Store, StoreError, StoreTx, constraints};

use crate::{Result, ServiceError, read_model};

fn menu_not_found(id: MenuId) -> ServiceError {
    ServiceError::NotFound(format!("menu {id} not found"))
}

fn duplicate_name(err: StoreError) -> ServiceError {
    if err.violates(constraints::MENU_NAME_UNIQUE) {
        ServiceError::DuplicateMenu
    } else {
        err.into()
    }
}

/// Creates, edits and removes menus.
#[derive(Clone)]
pub struct MenuService<S: Store> {
    store: S,
}

impl<S: Store> MenuService<S> {
    /// Creates a new menu service.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Lists menus with their options, newest first.
    #[tracing::instrument(skip(self))]
    pub async fn list_menus(&self) -> Result<Vec<Menu>> {
        let mut tx = self.store.begin().await?;
        let rows = tx.list_menus().await?;
        read_model::menus(&mut tx, rows).await
    }

    /// Fetches a menu with its options.
    #[tracing::instrument(skip(self))]
    pub async fn get_menu(&self, id: MenuId) -> Result<Menu> {
        let mut tx = self.store.begin().await?;
        let row = tx.find_menu(id).await?.ok_or_else(|| menu_not_found(id))?;
        let options = tx.menu_options(&[id]).await?;
        Ok(read_model::menu(row, options))
    }

    /// Creates a menu, its options and an empty stock record.
    #[tracing::instrument(skip(self, payload))]
    pub async fn create_menu(&self, payload: MenuPayload) -> Result<Menu> {
        let menu = NewMenu::try_from(payload)?;

        let mut tx = self.store.begin().await?;
        let row = tx.insert_menu(&menu).await.map_err(duplicate_name)?;

        let mut options = Vec::with_capacity(menu.options.len());
        for option in &menu.options {
            options.push(tx.insert_menu_option(row.id, option).await?);
        }
        tx.insert_inventory(row.id, DEFAULT_UNIT).await?;
        tx.commit().await?;

        tracing::info!(menu_id = %row.id, name = %row.name, "menu created");
        Ok(read_model::menu(row, options))
    }

    /// Applies a partial update to a menu.
    #[tracing::instrument(skip(self, payload))]
    pub async fn update_menu(&self, id: MenuId, payload: MenuUpdatePayload) -> Result<Menu> {
        let changes = MenuChanges::try_from(payload)?;

        let mut tx = self.store.begin().await?;
        let row = tx
            .update_menu(id, &changes)
            .await
            .map_err(duplicate_name)?
            .ok_or_else(|| menu_not_found(id))?;
        let options = tx.menu_options(&[id]).await?;
        tx.commit().await?;

        tracing::info!(menu_id = %id, "menu updated");
        Ok(read_model::menu(row, options))
    }

    /// Deletes a menu that no order refers to, with its options and stock.
    #[tracing::instrument(skip(self))]
    pub async fn delete_menu(&self, id: MenuId) -> Result<()> {
        let mut tx = self.store.begin().await?;
        if tx.find_menu(id).await?.is_none() {
            return Err(menu_not_found(id));
        }
        if tx.count_order_items_for_menu(id).await? > 0 {
            return Err(ServiceError::MenuInUse);
        }

        let deleted = tx.delete_menu(id).await.map_err(|err| {
            if err.violates(constraints::ORDER_ITEM_MENU_FK) {
                ServiceError::MenuInUse
            } else {
                err.into()
            }
        })?;
        if !deleted {
            return Err(menu_not_found(id));
        }
        tx.commit().await?;

        tracing::info!(menu_id = %id, "menu deleted");
        Ok(())
    }
}
