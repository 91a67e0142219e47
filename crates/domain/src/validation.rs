//! Shape and range checks for incoming payloads.
//!
//! Validators never touch storage and never fail early: every problem found in
//! a payload is collected into one [`ValidationReport`].

use common::Money;

use crate::inventory::{StockAdjustPayload, StockUpdatePayload};
use crate::menu::{MenuOptionPayload, MenuPayload, MenuUpdatePayload};
use crate::order::OrderPayload;

/// Longest accepted menu name, in characters.
pub const MENU_NAME_MAX_CHARS: usize = 100;

/// Longest accepted menu description, in characters.
pub const DESCRIPTION_MAX_CHARS: usize = 500;

/// Allowed gap between an order's total and the sum of its item totals.
pub const TOTAL_TOLERANCE: u64 = 1;

/// Outcome of validating a payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    errors: Vec<String>,
}

impl ValidationReport {
    /// Creates an empty (valid) report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a report holding a single error.
    pub fn single(message: impl Into<String>) -> Self {
        Self {
            errors: vec![message.into()],
        }
    }

    /// Records a problem.
    pub fn push(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    /// Returns true if no problems were recorded.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the recorded problems in the order they were found.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Consumes the report, returning the recorded problems.
    pub fn into_errors(self) -> Vec<String> {
        self.errors
    }

    /// Converts the report into a `Result`, failing if any problem was recorded.
    pub fn into_result(self) -> Result<(), ValidationReport> {
        if self.is_valid() { Ok(()) } else { Err(self) }
    }
}

impl std::fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.errors.join(", "))
    }
}

impl std::error::Error for ValidationReport {}

fn is_blank(value: Option<&String>) -> bool {
    value.is_none_or(|s| s.trim().is_empty())
}

fn check_menu_name(name: &str, report: &mut ValidationReport) {
    if name.trim().is_empty() {
        report.push("menu name is required");
    } else if name.chars().count() > MENU_NAME_MAX_CHARS {
        report.push(format!(
            "menu name must be at most {MENU_NAME_MAX_CHARS} characters"
        ));
    }
}

fn check_price(price: i64, report: &mut ValidationReport) {
    if price < 0 {
        report.push("price must be a number greater than or equal to 0");
    }
}

fn check_description(description: Option<&String>, report: &mut ValidationReport) {
    if let Some(description) = description
        && description.chars().count() > DESCRIPTION_MAX_CHARS
    {
        report.push(format!(
            "description must be at most {DESCRIPTION_MAX_CHARS} characters"
        ));
    }
}

fn check_menu_options(options: &[MenuOptionPayload], report: &mut ValidationReport) {
    for (index, option) in options.iter().enumerate() {
        let n = index + 1;
        if option.name.as_deref().is_none_or(str::is_empty) {
            report.push(format!("option {n} name is required"));
        }
        match option.additional_price {
            None => report.push(format!("option {n} additional price is required")),
            Some(price) if price < 0 => report.push(format!(
                "option {n} additional price must be a number greater than or equal to 0"
            )),
            Some(_) => {}
        }
    }
}

/// Validates a menu creation payload.
pub fn validate_menu(payload: &MenuPayload) -> ValidationReport {
    let mut report = ValidationReport::new();

    match payload.name.as_deref() {
        Some(name) => check_menu_name(name, &mut report),
        None => report.push("menu name is required"),
    }

    match payload.price {
        Some(price) => check_price(price, &mut report),
        None => report.push("price is required"),
    }

    check_description(payload.description.as_ref(), &mut report);

    if let Some(options) = &payload.options {
        check_menu_options(options, &mut report);
    }

    report
}

/// Validates a partial menu update: at least one field, each obeying the
/// creation rules.
pub fn validate_menu_update(payload: &MenuUpdatePayload) -> ValidationReport {
    let mut report = ValidationReport::new();

    if payload.is_empty() {
        report.push("no fields to update");
        return report;
    }

    if let Some(name) = payload.name.as_deref() {
        check_menu_name(name, &mut report);
    }
    if let Some(price) = payload.price {
        check_price(price, &mut report);
    }
    if let Some(Some(description)) = &payload.description {
        check_description(Some(description), &mut report);
    }

    report
}

/// Validates the shape of an order payload.
///
/// The total-amount tolerance is checked separately by
/// [`validate_order_total`] once the item totals are known to be well formed.
pub fn validate_order(payload: &OrderPayload) -> ValidationReport {
    let mut report = ValidationReport::new();

    match payload.items.as_deref() {
        None | Some([]) => report.push("order must contain at least one item"),
        Some(items) => {
            for (index, item) in items.iter().enumerate() {
                let n = index + 1;

                if item.menu_id.is_none_or(|id| id <= 0) {
                    report.push(format!("item {n} menu id is required"));
                }
                if is_blank(item.menu_name.as_ref()) {
                    report.push(format!("item {n} menu name is required"));
                }
                if item.base_price.is_none_or(|p| p < 0) {
                    report.push(format!(
                        "item {n} base price must be a number greater than or equal to 0"
                    ));
                }
                match item.quantity {
                    Some(q) if q >= 1 && q <= i64::from(i32::MAX) => {}
                    Some(q) if q >= 1 => report.push(format!("item {n} quantity is too large")),
                    _ => report.push(format!(
                        "item {n} quantity must be a number greater than or equal to 1"
                    )),
                }
                if item.total_price.is_none_or(|p| p < 0) {
                    report.push(format!(
                        "item {n} total price must be a number greater than or equal to 0"
                    ));
                }
            }
        }
    }

    match payload.total_amount {
        None => report.push("total amount is required"),
        Some(total) if total < 0 => {
            report.push("total amount must be a number greater than or equal to 0")
        }
        Some(_) => {}
    }

    report
}

/// Checks that the declared total matches the item totals within
/// [`TOTAL_TOLERANCE`].
pub fn validate_order_total(items_total: Money, total_amount: Money) -> ValidationReport {
    let mut report = ValidationReport::new();
    if items_total.abs_diff(total_amount) > TOTAL_TOLERANCE {
        report.push("total amount does not match the sum of item totals");
    }
    report
}

/// Validates a direct stock update.
pub fn validate_inventory_update(payload: &StockUpdatePayload) -> ValidationReport {
    let mut report = ValidationReport::new();
    match payload.current_stock {
        None => report.push("current stock is required"),
        Some(stock) if stock < 0 => {
            report.push("current stock must be a number greater than or equal to 0")
        }
        Some(stock) if stock > i64::from(i32::MAX) => report.push("current stock is too large"),
        Some(_) => {}
    }
    report
}

/// Validates a relative stock adjustment. A missing amount means 1.
pub fn validate_adjustment(payload: &StockAdjustPayload) -> ValidationReport {
    let mut report = ValidationReport::new();
    let amount = payload.amount_or_default();
    if amount <= 0 {
        report.push("amount must be a number greater than 0");
    } else if amount > i64::from(i32::MAX) {
        report.push("amount is too large");
    }
    report
}
