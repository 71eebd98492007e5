/// Infrastructure Layer - Front Ends
///
/// I/O adapters that feed the queue service:
///
/// ## Modules
/// - `network`: TCP line server (`LinesCodec` framing)
/// - `stdio`: line protocol over stdin/stdout
/// - `http_server`: axum HTTP API, metrics and health

pub mod http_server;
pub mod network;
pub mod stdio;

pub use http_server::HttpServer;
pub use network::run_server;
pub use stdio::run_session;
