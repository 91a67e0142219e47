//! Stock sufficiency checks for ordered quantities.

use common::MenuId;
use serde::{Deserialize, Serialize};

/// Total quantity of one menu required by an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockRequirement {
    pub menu_id: MenuId,
    pub menu_name: String,
    pub quantity: i32,
}

/// A menu whose stock cannot cover what an order needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockShortfall {
    pub menu_id: MenuId,
    pub menu_name: String,
    /// `None` when the menu has no inventory record at all.
    pub current_stock: Option<i32>,
    pub needed: i32,
}

impl std::fmt::Display for StockShortfall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.current_stock {
            Some(stock) => write!(
                f,
                "{} (stock: {stock}, needed: {})",
                self.menu_name, self.needed
            ),
            None => write!(f, "{} (no stock record)", self.menu_name),
        }
    }
}

/// Folds order lines into one requirement per menu.
///
/// Lines for the same menu (e.g. the same drink with different options) are
/// summed so the check sees the full quantity leaving stock. Requirements keep
/// the order in which each menu first appears.
pub fn requirements<'a, I>(lines: I) -> Vec<StockRequirement>
where
    I: IntoIterator<Item = (MenuId, &'a str, i32)>,
{
    let mut out: Vec<StockRequirement> = Vec::new();
    for (menu_id, menu_name, quantity) in lines {
        match out.iter_mut().find(|r| r.menu_id == menu_id) {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(quantity),
            None => out.push(StockRequirement {
                menu_id,
                menu_name: menu_name.to_string(),
                quantity,
            }),
        }
    }
    out
}

/// Returns every requirement that `stock_of` cannot satisfy.
///
/// `stock_of` yields the current stock for a menu, or `None` if the menu has
/// no inventory record. An empty result means every requirement is covered.
pub fn find_shortfalls<F>(
    requirements: &[StockRequirement],
    mut stock_of: F,
) -> Vec<StockShortfall>
where
    F: FnMut(MenuId) -> Option<i32>,
{
    requirements
        .iter()
        .filter_map(|req| {
            let current = stock_of(req.menu_id);
            match current {
                Some(stock) if stock >= req.quantity => None,
                _ => Some(StockShortfall {
                    menu_id: req.menu_id,
                    menu_name: req.menu_name.clone(),
                    current_stock: current,
                    needed: req.quantity,
                }),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    const LATTE: MenuId = MenuId::new(1);
    const MOCHA: MenuId = MenuId::new(2);
    const TEA: MenuId = MenuId::new(3);

    #[test]
    fn requirements_sum_repeated_menus() {
        let reqs = requirements([(LATTE, "Latte", 2), (MOCHA, "Mocha", 1), (LATTE, "Latte", 3)]);

        assert_eq!(reqs.len(), 2);
        assert_eq!(reqs[0].menu_id, LATTE);
        assert_eq!(reqs[0].quantity, 5);
        assert_eq!(reqs[1].menu_id, MOCHA);
        assert_eq!(reqs[1].quantity, 1);
    }

    #[test]
    fn no_shortfall_when_stock_covers_everything() {
        let reqs = requirements([(LATTE, "Latte", 3), (MOCHA, "Mocha", 1)]);
        let stock = HashMap::from([(LATTE, 3), (MOCHA, 10)]);

        assert!(
            find_shortfalls(&reqs, |id| stock.get(&id).copied()).is_empty()
        );
    }

    #[test]
    fn every_short_menu_is_reported() {
        let reqs = requirements([(LATTE, "Latte", 3), (MOCHA, "Mocha", 1), (TEA, "Tea", 4)]);
        let stock = HashMap::from([(LATTE, 2), (TEA, 4)]);

        let shortfalls = find_shortfalls(&reqs, |id| stock.get(&id).copied());

        assert_eq!(shortfalls.len(), 2);
        assert_eq!(shortfalls[0].menu_id, LATTE);
        assert_eq!(shortfalls[0].current_stock, Some(2));
        assert_eq!(shortfalls[0].needed, 3);
        assert_eq!(shortfalls[1].menu_id, MOCHA);
        assert_eq!(shortfalls[1].current_stock, None);
    }

    #[test]
    fn summed_quantity_is_what_gets_checked() {
        let reqs = requirements([(LATTE, "Latte", 3), (LATTE, "Latte", 3)]);
        let shortfalls = find_shortfalls(&reqs, |_| Some(5));

        assert_eq!(shortfalls.len(), 1);
        assert_eq!(shortfalls[0].needed, 6);
    }

    #[test]
    fn shortfall_display() {
        let short = StockShortfall {
            menu_id: LATTE,
            menu_name: "Latte".to_string(),
            current_stock: Some(2),
            needed: 3,
        };
        assert_eq!(short.to_string(), "Latte (stock: 2, needed: 3)");

        let missing = StockShortfall {
            current_stock: None,
            ..short
        };
        assert_eq!(missing.to_string(), "Latte (no stock record)");
    }
}
