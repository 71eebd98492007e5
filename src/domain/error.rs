use thiserror::Error;

/// Failures reported by the kitchen queue. A failed operation never mutates
/// the queue.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    /// Nothing to complete or cancel.
    #[error("no orders in queue")]
    EmptyQueue,

    /// The queue was searched and the id is not present.
    #[error("order {0} not found")]
    NotFound(i64),
}
