/// Domain Layer - Kitchen Queue
///
/// Pure business logic: order classification and the tiered queue. No I/O,
/// no async, no framework types.
///
/// ## Modules
/// - `order`: `Tier`, `Order` and `NewOrderRequest`
/// - `queue`: `KitchenQueue`, the ordered sequence of orders
/// - `error`: `QueueError`

pub mod error;
pub mod order;
pub mod queue;

pub use error::QueueError;
pub use order::{NewOrderRequest, Order, Tier};
pub use queue::KitchenQueue;
