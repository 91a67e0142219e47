use serde::{Deserialize, Serialize};

/// Declares a database-assigned identifier newtype.
///
/// Rows are keyed by `BIGSERIAL` columns, so every identifier wraps an `i64`
/// and serializes as a bare number.
macro_rules! row_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Creates an identifier from a raw database value.
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// Returns the raw database value.
            pub const fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

row_id!(
    /// Identifier of a menu entry.
    MenuId
);
row_id!(
    /// Identifier of a menu option (e.g. "extra shot").
    OptionId
);
row_id!(
    /// Identifier of an order.
    OrderId
);
row_id!(
    /// Identifier of a line item within an order.
    OrderItemId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_preserve_raw_value() {
        let id = MenuId::new(42);
        assert_eq!(id.as_i64(), 42);
        assert_eq!(i64::from(id), 42);
        assert_eq!(MenuId::from(42), id);
    }

    #[test]
    fn ids_serialize_as_plain_numbers() {
        let json = serde_json::to_string(&OrderId::new(7)).unwrap();
        assert_eq!(json, "7");
        let id: OrderId = serde_json::from_str("7").unwrap();
        assert_eq!(id, OrderId::new(7));
    }

    #[test]
    fn ids_display_raw_value() {
        assert_eq!(OrderItemId::new(3).to_string(), "3");
        assert_eq!(OptionId::new(11).to_string(), "11");
    }
}
