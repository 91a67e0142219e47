//! Human-readable order numbers.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

const PREFIX: &str = "ORD";

/// A per-day sequential order code, e.g. `ORD-20250101-007`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderNumber(String);

impl OrderNumber {
    /// Builds the next order number for `date` given how many orders already
    /// carry that day's prefix.
    ///
    /// The sequence is padded to three digits but not capped, so the
    /// thousandth order of a day renders as `1000`.
    pub fn generate(date: NaiveDate, existing_today: i64) -> Self {
        let sequence = existing_today.max(0) + 1;
        Self(format!("{}{sequence:03}", Self::day_prefix(date)))
    }

    /// The `ORD-YYYYMMDD-` prefix shared by every order of `date`.
    pub fn day_prefix(date: NaiveDate) -> String {
        format!("{PREFIX}-{}-", date.format("%Y%m%d"))
    }

    /// SQL `LIKE` pattern matching every order number of `date`.
    pub fn day_pattern(date: NaiveDate) -> String {
        format!("{}%", Self::day_prefix(date))
    }

    /// Wraps an order number read back from storage.
    pub fn from_stored(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the order number as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for OrderNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 9).unwrap()
    }

    #[test]
    fn first_order_of_the_day() {
        assert_eq!(OrderNumber::generate(day(), 0).as_str(), "ORD-20250309-001");
    }

    #[test]
    fn sequence_follows_existing_count() {
        assert_eq!(
            OrderNumber::generate(day(), 41).as_str(),
            "ORD-20250309-042"
        );
        assert_eq!(
            OrderNumber::generate(day(), 998).as_str(),
            "ORD-20250309-999"
        );
    }

    #[test]
    fn sequence_is_not_capped_at_three_digits() {
        assert_eq!(
            OrderNumber::generate(day(), 999).as_str(),
            "ORD-20250309-1000"
        );
    }

    #[test]
    fn pattern_matches_prefix() {
        assert_eq!(OrderNumber::day_pattern(day()), "ORD-20250309-%");
        assert!(
            OrderNumber::generate(day(), 5)
                .as_str()
                .starts_with(&OrderNumber::day_prefix(day()))
        );
    }
}
