/// Main entry point for the kitchen queue
///
/// This serves as a thin wrapper that delegates to the interfaces layer.
/// The actual application logic is implemented in `interfaces::cli`.

use kitchen_queue::interfaces::cli;

#[tokio::main]
async fn main() {
    if let Err(e) = cli::run().await {
        eprintln!("kitchen-queue: {}", e);
        std::process::exit(1);
    }
}
