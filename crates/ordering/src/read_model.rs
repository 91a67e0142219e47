//! Assembly of nested read models from flat store rows.
//!
//! Children are loaded one level at a time for the whole batch of parents,
//! so listing N orders costs three queries regardless of N.

use std::collections::HashMap;

use common::{MenuId, OrderId, OrderItemId};
use domain::{Menu, MenuOption, Order, OrderItem, SelectedOption};
use store::{MenuRow, OrderItemOptionRow, OrderItemRow, OrderRow, StoreTx};

use crate::Result;

/// Attaches options to menu rows, keeping the row order.
pub async fn menus<T: StoreTx>(tx: &mut T, rows: Vec<MenuRow>) -> Result<Vec<Menu>> {
    let ids: Vec<MenuId> = rows.iter().map(|m| m.id).collect();
    let mut options = group_by(tx.menu_options(&ids).await?, |o| o.menu_id);

    Ok(rows
        .into_iter()
        .map(|row| {
            let options = options.remove(&row.id).unwrap_or_default();
            menu(row, options)
        })
        .collect())
}

/// Builds a menu from its row and options.
pub fn menu(row: MenuRow, options: Vec<MenuOption>) -> Menu {
    Menu {
        id: row.id,
        name: row.name,
        price: row.price,
        description: row.description,
        image_url: row.image_url,
        options,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

/// Attaches items and their selected options to order rows, keeping the row
/// order.
pub async fn orders<T: StoreTx>(tx: &mut T, rows: Vec<OrderRow>) -> Result<Vec<Order>> {
    let order_ids: Vec<OrderId> = rows.iter().map(|o| o.id).collect();
    let item_rows = tx.order_items(&order_ids).await?;

    let item_ids: Vec<OrderItemId> = item_rows.iter().map(|i| i.id).collect();
    let option_rows = tx.order_item_options(&item_ids).await?;

    Ok(assemble_orders(rows, item_rows, option_rows))
}

/// Joins already-loaded rows into nested orders.
pub fn assemble_orders(
    rows: Vec<OrderRow>,
    item_rows: Vec<OrderItemRow>,
    option_rows: Vec<OrderItemOptionRow>,
) -> Vec<Order> {
    let mut options = group_by(option_rows, |o| o.order_item_id);
    let items = item_rows.into_iter().map(|item| {
        let selected = options.remove(&item.id).unwrap_or_default();
        (item.order_id, order_item(item, selected))
    });

    let mut items_by_order: HashMap<OrderId, Vec<OrderItem>> = HashMap::new();
    for (order_id, item) in items {
        items_by_order.entry(order_id).or_default().push(item);
    }

    rows.into_iter()
        .map(|row| Order {
            items: items_by_order.remove(&row.id).unwrap_or_default(),
            id: row.id,
            order_number: row.order_number,
            total_amount: row.total_amount,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
        .collect()
}

fn order_item(row: OrderItemRow, options: Vec<OrderItemOptionRow>) -> OrderItem {
    OrderItem {
        id: row.id,
        menu_id: row.menu_id,
        menu_name: row.menu_name,
        base_price: row.base_price,
        quantity: row.quantity,
        total_price: row.total_price,
        selected_options: options
            .into_iter()
            .map(|o| SelectedOption {
                option_id: o.option_id,
                option_name: o.option_name,
                additional_price: o.additional_price,
            })
            .collect(),
    }
}

fn group_by<K, V>(values: Vec<V>, key: impl Fn(&V) -> K) -> HashMap<K, Vec<V>>
where
    K: std::hash::Hash + Eq,
{
    let mut groups: HashMap<K, Vec<V>> = HashMap::new();
    for value in values {
        groups.entry(key(&value)).or_default().push(value);
    }
    groups
}
