use thiserror::Error;

/// Names of the schema constraints the service reacts to.
pub mod constraints {
    /// Uniqueness of `menus.name`.
    pub const MENU_NAME_UNIQUE: &str = "menus_name_key";
    /// `order_items.menu_id -> menus.id`, which blocks deleting ordered menus.
    pub const ORDER_ITEM_MENU_FK: &str = "order_items_menu_id_fkey";
    /// `inventory.current_stock >= 0`.
    pub const STOCK_NON_NEGATIVE: &str = "inventory_current_stock_check";
    /// Uniqueness of `orders.order_number`.
    pub const ORDER_NUMBER_UNIQUE: &str = "orders_order_number_key";
}

/// Errors that can occur when interacting with the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("Unique constraint violated: {constraint}")]
    UniqueViolation { constraint: String },

    /// A foreign key constraint rejected the write.
    #[error("Foreign key constraint violated: {constraint}")]
    ForeignKeyViolation { constraint: String },

    /// A check constraint rejected the write.
    #[error("Check constraint violated: {constraint}")]
    CheckViolation { constraint: String },

    /// The database could not be reached.
    #[error("Database unavailable: {0}")]
    Unavailable(String),

    /// A stored value could not be mapped back into a domain type.
    #[error("Invalid stored data: {0}")]
    InvalidData(String),

    /// Any other database error.
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl StoreError {
    /// Returns true if this is a violation of the named constraint.
    pub fn violates(&self, name: &str) -> bool {
        match self {
            StoreError::UniqueViolation { constraint }
            | StoreError::ForeignKeyViolation { constraint }
            | StoreError::CheckViolation { constraint } => constraint == name,
            _ => false,
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        use sqlx::error::ErrorKind;

        match err {
            sqlx::Error::Database(ref db_err) => {
                let constraint = db_err.constraint().unwrap_or_default().to_string();
                match db_err.kind() {
                    ErrorKind::UniqueViolation => StoreError::UniqueViolation { constraint },
                    ErrorKind::ForeignKeyViolation => {
                        StoreError::ForeignKeyViolation { constraint }
                    }
                    ErrorKind::CheckViolation => StoreError::CheckViolation { constraint },
                    _ => StoreError::Database(err),
                }
            }
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => StoreError::Unavailable(err.to_string()),
            other => StoreError::Database(other),
        }
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
