/// Application Layer - Dispatcher and Services
///
/// Turns protocol commands into queue operations. Depends on the domain
/// layer, knows nothing about sockets or HTTP.
///
/// ## Modules
/// - `dispatcher`: executes commands on a queue and renders responses
/// - `service`: single-writer task wrapping a dispatcher for network front ends

pub mod dispatcher;
pub mod service;

// Re-export key types
pub use dispatcher::{CommandError, Dispatcher, Outcome};
pub use service::{QueueHandle, QueueService, ServiceError};
