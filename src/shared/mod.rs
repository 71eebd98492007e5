/// Shared utilities and types used across all layers
///
/// This module contains:
/// - Protocol definitions (command grammar, JSON order view)
/// - Metrics

pub mod metrics;
pub mod protocol;

// Re-export commonly used types
pub use protocol::{parse_line, Command, CommandKind, OrderRecord, ProtocolError};
