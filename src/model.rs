/// A row of the `order_status` table.
///
/// `id` stays `None` until the row has been stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderStatus {
    pub id: Option<i64>,
    pub status: String,
    pub description: String,
}

impl OrderStatus {
    pub fn new(status: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: None,
            status: status.into(),
            description: description.into(),
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }
}
