//! Order lifecycle: creation, status changes and reads.

use chrono::{Local, NaiveDate};
use common::OrderId;
use domain::{
    NewOrder, Order, OrderItem, OrderNumber, OrderPayload, OrderStatus, SelectedOption,
    StatusChange,
};
use store::{OrderQuery, Store, StoreTx};

use crate::inventory::InventoryLedger;
use crate::{Result, ServiceError, read_model};

fn order_not_found(id: OrderId) -> ServiceError {
    ServiceError::NotFound(format!("order {id} not found"))
}

/// Creates orders and moves them through their statuses.
///
/// Stock is checked twice: advisorily when an order is created, and
/// authoritatively when it moves to preparing, which is the only moment stock
/// leaves the shelf.
#[derive(Clone)]
pub struct OrderService<S: Store> {
    store: S,
}

impl<S: Store> OrderService<S> {
    /// Creates a new order service.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Creates an order numbered for today's local date.
    pub async fn create_order(&self, payload: OrderPayload) -> Result<Order> {
        self.create_order_on(payload, Local::now().date_naive())
            .await
    }

    /// Creates an order numbered for the given date.
    ///
    /// The order starts as received; nothing is reserved or debited.
    #[tracing::instrument(skip(self, payload))]
    pub async fn create_order_on(&self, payload: OrderPayload, date: NaiveDate) -> Result<Order> {
        let started = std::time::Instant::now();
        let order = NewOrder::try_from(payload)?;
        let requirements = order.stock_requirements();

        let mut tx = self.store.begin().await?;
        InventoryLedger::new(&mut tx)
            .check_available(&requirements)
            .await?;

        tx.lock_order_day(date).await?;
        let existing = tx
            .count_orders_matching(&OrderNumber::day_pattern(date))
            .await?;
        let number = OrderNumber::generate(date, existing);

        let row = tx
            .insert_order(&number, order.total_amount, OrderStatus::Received)
            .await?;

        let mut items = Vec::with_capacity(order.items.len());
        for item in &order.items {
            let item_row = tx.insert_order_item(row.id, item).await?;
            let mut selected_options = Vec::with_capacity(item.options.len());
            for option in &item.options {
                let option_row = tx.insert_order_item_option(item_row.id, option).await?;
                selected_options.push(SelectedOption {
                    option_id: option_row.option_id,
                    option_name: option_row.option_name,
                    additional_price: option_row.additional_price,
                });
            }
            items.push(OrderItem {
                id: item_row.id,
                menu_id: item_row.menu_id,
                menu_name: item_row.menu_name,
                base_price: item_row.base_price,
                quantity: item_row.quantity,
                total_price: item_row.total_price,
                selected_options,
            });
        }

        tx.commit().await?;

        metrics::counter!("orders_created_total").increment(1);
        metrics::histogram!("order_create_duration_seconds")
            .record(started.elapsed().as_secs_f64());
        tracing::info!(
            order_id = %row.id,
            order_number = %row.order_number,
            total_amount = %row.total_amount,
            items = items.len(),
            "order created"
        );

        Ok(Order {
            id: row.id,
            order_number: row.order_number,
            total_amount: row.total_amount,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
            items,
        })
    }

    /// Moves an order to the requested status.
    ///
    /// Moving from received to preparing debits the stock of every menu on
    /// the order in the same transaction as the status change; if any menu is
    /// short, neither happens.
    #[tracing::instrument(skip(self))]
    pub async fn change_status(&self, id: OrderId, requested: OrderStatus) -> Result<StatusChange> {
        let mut tx = self.store.begin().await?;

        let current = tx
            .lock_order_status(id)
            .await?
            .ok_or_else(|| order_not_found(id))?;
        let next = current.transition_to(requested)?;

        if OrderStatus::debits_inventory(current, next) {
            let items = tx.order_items(&[id]).await?;
            if items.is_empty() {
                return Err(ServiceError::EmptyOrder);
            }

            let requirements = domain::order::stock::requirements(
                items
                    .iter()
                    .map(|i| (i.menu_id, i.menu_name.as_str(), i.quantity)),
            );
            InventoryLedger::new(&mut tx).debit(&requirements).await?;
        }

        let change = tx
            .update_order_status(id, next)
            .await?
            .ok_or_else(|| order_not_found(id))?;
        tx.commit().await?;

        metrics::counter!(
            "order_status_transitions_total",
            "from" => current.as_str(),
            "to" => next.as_str()
        )
        .increment(1);
        tracing::info!(order_id = %id, from = %current, to = %next, "order status changed");

        Ok(change)
    }

    /// Fetches an order with its items.
    #[tracing::instrument(skip(self))]
    pub async fn get_order(&self, id: OrderId) -> Result<Order> {
        let mut tx = self.store.begin().await?;
        let row = tx.find_order(id).await?.ok_or_else(|| order_not_found(id))?;

        read_model::orders(&mut tx, vec![row])
            .await?
            .pop()
            .ok_or_else(|| order_not_found(id))
    }

    /// Lists orders matching the query, newest first.
    #[tracing::instrument(skip(self))]
    pub async fn list_orders(&self, query: OrderQuery) -> Result<Vec<Order>> {
        let mut tx = self.store.begin().await?;
        let rows = tx.list_orders(&query).await?;
        read_model::orders(&mut tx, rows).await
    }
}
