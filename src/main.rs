//! echo-httpd: A minimal HTTP/1.1 server
//!
//! Handles one request per connection, one connection at a time:
//! - `GET /` replies with a canned 200 status line
//! - `GET /echo/<arg>` echoes `<arg>` back as `text/plain`
//! - other routes and methods get 404, 405, 400 or 500
//!
//! Features:
//! - Bounded request-line parsing with configurable limits
//! - Graceful shutdown on SIGINT/SIGTERM
//! - Configuration via CLI arguments or TOML file

mod config;
mod protocols;
mod server;
mod shutdown;

use config::Config;
use protocols::http::ResponseTable;
use server::Server;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::load()?;

    // Initialize logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    info!(
        listen = %config.listen,
        backlog = config.backlog,
        read_size = config.read_size,
        max_line_length = config.limits.max_line_length,
        max_echo_length = config.limits.max_echo_length,
        "Starting echo-httpd server"
    );

    let responses = ResponseTable::canned()?;
    info!(entries = responses.len(), "Response table initialized");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(serve(config, responses))
}

async fn serve(config: Config, responses: ResponseTable) -> Result<(), Box<dyn std::error::Error>> {
    let server = Server::new(config, responses);
    let listener = server.bind()?;

    let (trigger, stop) = shutdown::channel();
    shutdown::spawn_signal_bridge(trigger);
    info!("Press Ctrl+C to stop the server");

    server.run(listener, stop).await?;
    server.shutdown();
    Ok(())
}
