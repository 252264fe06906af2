pub mod config;
pub mod controller;
pub mod db;
pub mod facade;
pub mod logging;
pub mod model;
pub mod pagination;

pub use controller::{ControllerError, OrderStatusController, View};
pub use db::SqliteFacade;
pub use facade::{OrderStatusFacade, PersistenceError};
pub use model::OrderStatus;
pub use pagination::{PageWindow, PaginationError, SelectionTracker};
