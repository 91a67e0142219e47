//! Order request payloads and their validated forms.

use common::{MenuId, Money, OptionId};
use serde::{Deserialize, Serialize};

use crate::validation::{ValidationReport, validate_order, validate_order_total};

use super::{OrderStatus, StockRequirement, stock};

/// Body of `POST /orders`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPayload {
    pub items: Option<Vec<OrderItemPayload>>,
    pub total_amount: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemPayload {
    pub menu_id: Option<i64>,
    pub menu_name: Option<String>,
    pub base_price: Option<i64>,
    pub quantity: Option<i64>,
    pub total_price: Option<i64>,
    pub selected_options: Option<Vec<SelectedOptionPayload>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedOptionPayload {
    pub option_id: Option<i64>,
    pub option_name: Option<String>,
    pub additional_price: Option<i64>,
}

/// Body of `PATCH /admin/orders/{id}/status`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusPayload {
    pub status: Option<String>,
}

impl StatusPayload {
    /// Parses the requested status.
    pub fn into_status(self) -> Result<OrderStatus, ValidationReport> {
        self.status
            .as_deref()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| ValidationReport::single("invalid order status"))
    }
}

/// A validated order, with menu names and prices snapshotted from the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub items: Vec<NewOrderItem>,
    pub total_amount: Money,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderItem {
    pub menu_id: MenuId,
    pub menu_name: String,
    pub base_price: Money,
    pub quantity: i32,
    pub total_price: Money,
    pub options: Vec<NewOrderItemOption>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderItemOption {
    pub option_id: OptionId,
    pub option_name: String,
    pub additional_price: Money,
}

impl NewOrder {
    /// Sum of the item totals, or `None` if it does not fit in [`Money`].
    pub fn items_total(&self) -> Option<Money> {
        self.items
            .iter()
            .try_fold(Money::zero(), |acc, item| acc.checked_add(item.total_price))
    }

    /// Quantity needed per menu to fulfil this order.
    pub fn stock_requirements(&self) -> Vec<StockRequirement> {
        stock::requirements(
            self.items
                .iter()
                .map(|item| (item.menu_id, item.menu_name.as_str(), item.quantity)),
        )
    }
}

impl TryFrom<OrderPayload> for NewOrder {
    type Error = ValidationReport;

    fn try_from(payload: OrderPayload) -> Result<Self, Self::Error> {
        validate_order(&payload).into_result()?;

        let mut items = Vec::new();
        for item in payload.items.unwrap_or_default() {
            // Options without an id or a name are not recorded.
            let options = item
                .selected_options
                .unwrap_or_default()
                .into_iter()
                .filter_map(|opt| {
                    Some(NewOrderItemOption {
                        option_id: OptionId::new(opt.option_id?),
                        option_name: opt.option_name?,
                        additional_price: Money::new(opt.additional_price.unwrap_or(0)),
                    })
                })
                .collect();

            let quantity = item
                .quantity
                .and_then(|q| i32::try_from(q).ok())
                .ok_or_else(|| ValidationReport::single("item quantity is invalid"))?;

            items.push(NewOrderItem {
                menu_id: MenuId::new(item.menu_id.unwrap_or_default()),
                menu_name: item.menu_name.unwrap_or_default(),
                base_price: Money::new(item.base_price.unwrap_or_default()),
                quantity,
                total_price: Money::new(item.total_price.unwrap_or_default()),
                options,
            });
        }

        let order = NewOrder {
            items,
            total_amount: Money::new(payload.total_amount.unwrap_or_default()),
        };

        let items_total = order
            .items_total()
            .ok_or_else(|| ValidationReport::single("total amount is too large"))?;
        validate_order_total(items_total, order.total_amount).into_result()?;

        Ok(order)
    }
}
