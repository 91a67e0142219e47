use async_trait::async_trait;
use chrono::NaiveDate;
use common::{MenuId, Money, OptionId, OrderId, OrderItemId};
use domain::{
    InventoryLevel, MenuChanges, MenuOption, NewMenu, NewMenuOption, NewOrderItem,
    NewOrderItemOption, OrderNumber, OrderStats, OrderStatus, StatusChange, StockLevel,
};
use sqlx::{PgPool, Postgres, Row, Transaction, postgres::PgRow};

use crate::{
    MenuRow, OrderItemOptionRow, OrderItemRow, OrderQuery, OrderRow, Result, StoreError,
    store::{Store, StoreTx},
};

const MENU_COLUMNS: &str = "id, name, price, description, image_url, created_at, updated_at";
const ORDER_COLUMNS: &str = "id, order_number, total_amount, status, created_at, updated_at";
const ORDER_ITEM_COLUMNS: &str =
    "id, order_id, menu_id, menu_name, base_price, quantity, item_total_price";

/// PostgreSQL-backed store.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new PostgreSQL store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        tracing::info!("Database migrations applied");
        Ok(())
    }
}

#[async_trait]
impl Store for PostgresStore {
    type Tx = PostgresTx;

    async fn begin(&self) -> Result<PostgresTx> {
        let tx = self.pool.begin().await?;
        Ok(PostgresTx { tx })
    }
}

/// A PostgreSQL transaction; rolled back on drop unless committed.
pub struct PostgresTx {
    tx: Transaction<'static, Postgres>,
}

fn ids<T>(values: &[T], to_i64: impl Fn(&T) -> i64) -> Vec<i64> {
    values.iter().map(to_i64).collect()
}

fn row_to_menu(row: PgRow) -> Result<MenuRow> {
    Ok(MenuRow {
        id: MenuId::new(row.try_get("id")?),
        name: row.try_get("name")?,
        price: Money::new(row.try_get("price")?),
        description: row.try_get("description")?,
        image_url: row.try_get("image_url")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn row_to_menu_option(row: PgRow) -> Result<MenuOption> {
    Ok(MenuOption {
        id: OptionId::new(row.try_get("id")?),
        menu_id: MenuId::new(row.try_get("menu_id")?),
        name: row.try_get("name")?,
        additional_price: Money::new(row.try_get("additional_price")?),
    })
}

fn row_to_status(row: &PgRow) -> Result<OrderStatus> {
    let raw: String = row.try_get("status")?;
    raw.parse()
        .map_err(|e: domain::OrderError| StoreError::InvalidData(e.to_string()))
}

fn row_to_order(row: PgRow) -> Result<OrderRow> {
    Ok(OrderRow {
        id: OrderId::new(row.try_get("id")?),
        order_number: OrderNumber::from_stored(row.try_get::<String, _>("order_number")?),
        total_amount: Money::new(row.try_get("total_amount")?),
        status: row_to_status(&row)?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn row_to_order_item(row: PgRow) -> Result<OrderItemRow> {
    Ok(OrderItemRow {
        id: OrderItemId::new(row.try_get("id")?),
        order_id: OrderId::new(row.try_get("order_id")?),
        menu_id: MenuId::new(row.try_get("menu_id")?),
        menu_name: row.try_get("menu_name")?,
        base_price: Money::new(row.try_get("base_price")?),
        quantity: row.try_get("quantity")?,
        total_price: Money::new(row.try_get("item_total_price")?),
    })
}

fn row_to_order_item_option(row: PgRow) -> Result<OrderItemOptionRow> {
    Ok(OrderItemOptionRow {
        order_item_id: OrderItemId::new(row.try_get("order_item_id")?),
        option_id: OptionId::new(row.try_get("option_id")?),
        option_name: row.try_get("option_name")?,
        additional_price: Money::new(row.try_get("additional_price")?),
    })
}

fn row_to_stock(row: PgRow) -> Result<StockLevel> {
    Ok(StockLevel {
        menu_id: MenuId::new(row.try_get("menu_id")?),
        current_stock: row.try_get("current_stock")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl StoreTx for PostgresTx {
    async fn list_menus(&mut self) -> Result<Vec<MenuRow>> {
        let rows = sqlx::query(&format!(
            "SELECT {MENU_COLUMNS} FROM menus ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&mut *self.tx)
        .await?;

        rows.into_iter().map(row_to_menu).collect()
    }

    async fn find_menu(&mut self, id: MenuId) -> Result<Option<MenuRow>> {
        let row = sqlx::query(&format!("SELECT {MENU_COLUMNS} FROM menus WHERE id = $1"))
            .bind(id.as_i64())
            .fetch_optional(&mut *self.tx)
            .await?;

        row.map(row_to_menu).transpose()
    }

    async fn menu_options(&mut self, menu_ids: &[MenuId]) -> Result<Vec<MenuOption>> {
        if menu_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query(
            r#"
            SELECT id, menu_id, name, additional_price
            FROM menu_options
            WHERE menu_id = ANY($1)
            ORDER BY id
            "#,
        )
        .bind(ids(menu_ids, MenuId::as_i64))
        .fetch_all(&mut *self.tx)
        .await?;

        rows.into_iter().map(row_to_menu_option).collect()
    }

    async fn insert_menu(&mut self, menu: &NewMenu) -> Result<MenuRow> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO menus (name, price, description, image_url)
            VALUES ($1, $2, $3, $4)
            RETURNING {MENU_COLUMNS}
            "#
        ))
        .bind(&menu.name)
        .bind(menu.price.amount())
        .bind(&menu.description)
        .bind(&menu.image_url)
        .fetch_one(&mut *self.tx)
        .await?;

        row_to_menu(row)
    }

    async fn insert_menu_option(
        &mut self,
        menu_id: MenuId,
        option: &NewMenuOption,
    ) -> Result<MenuOption> {
        let row = sqlx::query(
            r#"
            INSERT INTO menu_options (menu_id, name, additional_price)
            VALUES ($1, $2, $3)
            RETURNING id, menu_id, name, additional_price
            "#,
        )
        .bind(menu_id.as_i64())
        .bind(&option.name)
        .bind(option.additional_price.amount())
        .fetch_one(&mut *self.tx)
        .await?;

        row_to_menu_option(row)
    }

    async fn update_menu(&mut self, id: MenuId, changes: &MenuChanges) -> Result<Option<MenuRow>> {
        let mut sql = String::from("UPDATE menus SET updated_at = CURRENT_TIMESTAMP");
        let mut param_count = 0;

        if changes.name.is_some() {
            param_count += 1;
            sql.push_str(&format!(", name = ${param_count}"));
        }
        if changes.price.is_some() {
            param_count += 1;
            sql.push_str(&format!(", price = ${param_count}"));
        }
        if changes.description.is_some() {
            param_count += 1;
            sql.push_str(&format!(", description = ${param_count}"));
        }
        if changes.image_url.is_some() {
            param_count += 1;
            sql.push_str(&format!(", image_url = ${param_count}"));
        }
        param_count += 1;
        sql.push_str(&format!(" WHERE id = ${param_count} RETURNING {MENU_COLUMNS}"));

        let mut query = sqlx::query(&sql);
        if let Some(ref name) = changes.name {
            query = query.bind(name);
        }
        if let Some(price) = changes.price {
            query = query.bind(price.amount());
        }
        if let Some(ref description) = changes.description {
            query = query.bind(description);
        }
        if let Some(ref image_url) = changes.image_url {
            query = query.bind(image_url);
        }
        query = query.bind(id.as_i64());

        let row = query.fetch_optional(&mut *self.tx).await?;
        row.map(row_to_menu).transpose()
    }

    async fn count_order_items_for_menu(&mut self, id: MenuId) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM order_items WHERE menu_id = $1")
            .bind(id.as_i64())
            .fetch_one(&mut *self.tx)
            .await?;
        Ok(count)
    }

    async fn delete_menu(&mut self, id: MenuId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM menus WHERE id = $1")
            .bind(id.as_i64())
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_inventory(&mut self, menu_id: MenuId, unit: &str) -> Result<()> {
        sqlx::query("INSERT INTO inventory (menu_id, current_stock, unit) VALUES ($1, 0, $2)")
            .bind(menu_id.as_i64())
            .bind(unit)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn list_inventory(&mut self) -> Result<Vec<InventoryLevel>> {
        let rows = sqlx::query(
            r#"
            SELECT i.menu_id, m.name AS menu_name, i.current_stock, i.unit, i.updated_at
            FROM inventory i
            JOIN menus m ON m.id = i.menu_id
            ORDER BY m.name
            "#,
        )
        .fetch_all(&mut *self.tx)
        .await?;

        rows.into_iter()
            .map(|row| -> Result<InventoryLevel> {
                Ok(InventoryLevel {
                    menu_id: MenuId::new(row.try_get("menu_id")?),
                    menu_name: row.try_get("menu_name")?,
                    current_stock: row.try_get("current_stock")?,
                    unit: row.try_get("unit")?,
                    updated_at: row.try_get("updated_at")?,
                })
            })
            .collect()
    }

    async fn stock_level(&mut self, menu_id: MenuId) -> Result<Option<StockLevel>> {
        let row = sqlx::query(
            "SELECT menu_id, current_stock, updated_at FROM inventory WHERE menu_id = $1",
        )
        .bind(menu_id.as_i64())
        .fetch_optional(&mut *self.tx)
        .await?;

        row.map(row_to_stock).transpose()
    }

    async fn lock_stock_level(&mut self, menu_id: MenuId) -> Result<Option<StockLevel>> {
        let row = sqlx::query(
            "SELECT menu_id, current_stock, updated_at FROM inventory \
             WHERE menu_id = $1 FOR UPDATE",
        )
        .bind(menu_id.as_i64())
        .fetch_optional(&mut *self.tx)
        .await?;

        row.map(row_to_stock).transpose()
    }

    async fn increase_stock(&mut self, menu_id: MenuId, amount: i32) -> Result<Option<StockLevel>> {
        let row = sqlx::query(
            r#"
            UPDATE inventory
            SET current_stock = current_stock + $1, updated_at = CURRENT_TIMESTAMP
            WHERE menu_id = $2
            RETURNING menu_id, current_stock, updated_at
            "#,
        )
        .bind(amount)
        .bind(menu_id.as_i64())
        .fetch_optional(&mut *self.tx)
        .await?;

        row.map(row_to_stock).transpose()
    }

    async fn decrease_stock(&mut self, menu_id: MenuId, amount: i32) -> Result<Option<StockLevel>> {
        let row = sqlx::query(
            r#"
            UPDATE inventory
            SET current_stock = current_stock - $1, updated_at = CURRENT_TIMESTAMP
            WHERE menu_id = $2 AND current_stock >= $1
            RETURNING menu_id, current_stock, updated_at
            "#,
        )
        .bind(amount)
        .bind(menu_id.as_i64())
        .fetch_optional(&mut *self.tx)
        .await?;

        row.map(row_to_stock).transpose()
    }

    async fn set_stock(&mut self, menu_id: MenuId, stock: i32) -> Result<Option<StockLevel>> {
        let row = sqlx::query(
            r#"
            UPDATE inventory
            SET current_stock = $1, updated_at = CURRENT_TIMESTAMP
            WHERE menu_id = $2
            RETURNING menu_id, current_stock, updated_at
            "#,
        )
        .bind(stock)
        .bind(menu_id.as_i64())
        .fetch_optional(&mut *self.tx)
        .await?;

        row.map(row_to_stock).transpose()
    }

    async fn lock_order_day(&mut self, date: NaiveDate) -> Result<()> {
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(format!("orders:{}", date.format("%Y%m%d")))
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn count_orders_matching(&mut self, pattern: &str) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE order_number LIKE $1")
                .bind(pattern)
                .fetch_one(&mut *self.tx)
                .await?;
        Ok(count)
    }

    async fn insert_order(
        &mut self,
        number: &OrderNumber,
        total_amount: Money,
        status: OrderStatus,
    ) -> Result<OrderRow> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO orders (order_number, total_amount, status)
            VALUES ($1, $2, $3)
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(number.as_str())
        .bind(total_amount.amount())
        .bind(status.as_str())
        .fetch_one(&mut *self.tx)
        .await?;

        row_to_order(row)
    }

    async fn insert_order_item(
        &mut self,
        order_id: OrderId,
        item: &NewOrderItem,
    ) -> Result<OrderItemRow> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO order_items
                (order_id, menu_id, menu_name, base_price, quantity, item_total_price)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {ORDER_ITEM_COLUMNS}
            "#
        ))
        .bind(order_id.as_i64())
        .bind(item.menu_id.as_i64())
        .bind(&item.menu_name)
        .bind(item.base_price.amount())
        .bind(item.quantity)
        .bind(item.total_price.amount())
        .fetch_one(&mut *self.tx)
        .await?;

        row_to_order_item(row)
    }

    async fn insert_order_item_option(
        &mut self,
        order_item_id: OrderItemId,
        option: &NewOrderItemOption,
    ) -> Result<OrderItemOptionRow> {
        let row = sqlx::query(
            r#"
            INSERT INTO order_item_options
                (order_item_id, option_id, option_name, additional_price)
            VALUES ($1, $2, $3, $4)
            RETURNING order_item_id, option_id, option_name, additional_price
            "#,
        )
        .bind(order_item_id.as_i64())
        .bind(option.option_id.as_i64())
        .bind(&option.option_name)
        .bind(option.additional_price.amount())
        .fetch_one(&mut *self.tx)
        .await?;

        row_to_order_item_option(row)
    }

    async fn find_order(&mut self, id: OrderId) -> Result<Option<OrderRow>> {
        let row = sqlx::query(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
            .bind(id.as_i64())
            .fetch_optional(&mut *self.tx)
            .await?;

        row.map(row_to_order).transpose()
    }

    async fn lock_order_status(&mut self, id: OrderId) -> Result<Option<OrderStatus>> {
        let row = sqlx::query("SELECT status FROM orders WHERE id = $1 FOR UPDATE")
            .bind(id.as_i64())
            .fetch_optional(&mut *self.tx)
            .await?;

        row.as_ref().map(row_to_status).transpose()
    }

    async fn list_orders(&mut self, query: &OrderQuery) -> Result<Vec<OrderRow>> {
        let mut sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE 1=1");
        let mut param_count = 0;

        if query.status.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND status = ${param_count}"));
        }
        if query.created_from.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND created_at >= ${param_count}"));
        }
        if query.created_to.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND created_at <= ${param_count}"));
        }
        sql.push_str(" ORDER BY created_at DESC, id DESC");

        let mut q = sqlx::query(&sql);
        if let Some(status) = query.status {
            q = q.bind(status.as_str());
        }
        if let Some(from) = query.created_from {
            q = q.bind(from);
        }
        if let Some(to) = query.created_to {
            q = q.bind(to);
        }

        let rows = q.fetch_all(&mut *self.tx).await?;
        rows.into_iter().map(row_to_order).collect()
    }

    async fn order_items(&mut self, order_ids: &[OrderId]) -> Result<Vec<OrderItemRow>> {
        if order_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query(&format!(
            "SELECT {ORDER_ITEM_COLUMNS} FROM order_items WHERE order_id = ANY($1) ORDER BY id"
        ))
        .bind(ids(order_ids, OrderId::as_i64))
        .fetch_all(&mut *self.tx)
        .await?;

        rows.into_iter().map(row_to_order_item).collect()
    }

    async fn order_item_options(
        &mut self,
        item_ids: &[OrderItemId],
    ) -> Result<Vec<OrderItemOptionRow>> {
        if item_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query(
            r#"
            SELECT order_item_id, option_id, option_name, additional_price
            FROM order_item_options
            WHERE order_item_id = ANY($1)
            ORDER BY id
            "#,
        )
        .bind(ids(item_ids, OrderItemId::as_i64))
        .fetch_all(&mut *self.tx)
        .await?;

        rows.into_iter().map(row_to_order_item_option).collect()
    }

    async fn update_order_status(
        &mut self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Option<StatusChange>> {
        let row = sqlx::query(
            r#"
            UPDATE orders
            SET status = $1, updated_at = CURRENT_TIMESTAMP
            WHERE id = $2
            RETURNING id, status, updated_at
            "#,
        )
        .bind(status.as_str())
        .bind(id.as_i64())
        .fetch_optional(&mut *self.tx)
        .await?;

        row.map(|row| -> Result<StatusChange> {
            Ok(StatusChange {
                id: OrderId::new(row.try_get("id")?),
                status: row_to_status(&row)?,
                updated_at: row.try_get("updated_at")?,
            })
        })
        .transpose()
    }

    async fn order_stats(&mut self) -> Result<OrderStats> {
        let row = sqlx::query(
            r#"
            SELECT
                COUNT(*) AS total_orders,
                COUNT(*) FILTER (WHERE status = 'received') AS received_orders,
                COUNT(*) FILTER (WHERE status = 'preparing') AS preparing_orders,
                COUNT(*) FILTER (WHERE status = 'completed') AS completed_orders
            FROM orders
            "#,
        )
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(OrderStats {
            total_orders: row.try_get("total_orders")?,
            received_orders: row.try_get("received_orders")?,
            preparing_orders: row.try_get("preparing_orders")?,
            completed_orders: row.try_get("completed_orders")?,
        })
    }

    async fn commit(self) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }
}
