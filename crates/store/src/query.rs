use chrono::{DateTime, Utc};
use domain::OrderStatus;

/// Filter for listing orders.
///
/// All criteria are optional; an empty query lists every order. Results are
/// always newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderQuery {
    /// Filter by status.
    pub status: Option<OrderStatus>,

    /// Orders created at or after this instant.
    pub created_from: Option<DateTime<Utc>>,

    /// Orders created at or before this instant.
    pub created_to: Option<DateTime<Utc>>,
}

impl OrderQuery {
    /// Creates a new empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Filters by status.
    pub fn status(mut self, status: OrderStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Filters by creation time (inclusive lower bound).
    pub fn created_from(mut self, from: DateTime<Utc>) -> Self {
        self.created_from = Some(from);
        self
    }

    /// Filters by creation time (inclusive upper bound).
    pub fn created_to(mut self, to: DateTime<Utc>) -> Self {
        self.created_to = Some(to);
        self
    }

    /// Returns true if an order with the given status and creation time
    /// matches this query.
    pub fn matches(&self, status: OrderStatus, created_at: DateTime<Utc>) -> bool {
        if let Some(wanted) = self.status
            && wanted != status
        {
            return false;
        }
        if let Some(from) = self.created_from
            && created_at < from
        {
            return false;
        }
        if let Some(to) = self.created_to
            && created_at > to
        {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    #[test]
    fn empty_query_matches_everything() {
        let q = OrderQuery::new();
        assert!(q.matches(OrderStatus::Cancelled, Utc::now()));
    }

    #[test]
    fn criteria_are_combined() {
        let noon = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
        let q = OrderQuery::new()
            .status(OrderStatus::Received)
            .created_from(noon - Duration::hours(1))
            .created_to(noon + Duration::hours(1));

        assert!(q.matches(OrderStatus::Received, noon));
        assert!(!q.matches(OrderStatus::Preparing, noon));
        assert!(!q.matches(OrderStatus::Received, noon + Duration::hours(2)));
        assert!(!q.matches(OrderStatus::Received, noon - Duration::hours(2)));
    }

    #[test]
    fn bounds_are_inclusive() {
        let t = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let q = OrderQuery::new().created_from(t).created_to(t);
        assert!(q.matches(OrderStatus::Received, t));
    }
}
