use crate::model::OrderStatus;

/// Every failure of the backing store. Callers treat all variants the same way;
/// the variant only carries the reason for logs and the status line.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("order status {0} not found")]
    NotFound(i64),
    #[error("invalid order status: {0}")]
    Invalid(String),
}

/// Data access for order statuses. Indices are absolute positions in the
/// store's stable ordering.
pub trait OrderStatusFacade {
    fn count(&self) -> Result<usize, PersistenceError>;

    /// Rows in `[start, end)`.
    fn fetch_range(&self, start: usize, end: usize) -> Result<Vec<OrderStatus>, PersistenceError>;

    fn fetch_one(&self, index: usize) -> Result<Option<OrderStatus>, PersistenceError> {
        Ok(self.fetch_range(index, index + 1)?.into_iter().next())
    }

    /// Stores a new row and returns it with the assigned id.
    fn create(&mut self, item: &OrderStatus) -> Result<OrderStatus, PersistenceError>;

    fn update(&mut self, item: &OrderStatus) -> Result<(), PersistenceError>;

    fn delete(&mut self, item: &OrderStatus) -> Result<(), PersistenceError>;
}
