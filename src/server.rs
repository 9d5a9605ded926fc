//! TCP server for the HTTP protocol.
//!
//! Connections are handled strictly one at a time: accept, read once,
//! respond, close, then accept the next one. Shutdown is observed both
//! while waiting for a connection and while serving one.

use crate::config::Config;
use crate::protocols::http::{handle_connection, ResponseTable};
use crate::shutdown::Shutdown;
use std::io;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

/// Server instance
pub struct Server {
    config: Config,
    responses: ResponseTable,
}

impl Server {
    /// Create a new server instance
    pub fn new(config: Config, responses: ResponseTable) -> Self {
        Server { config, responses }
    }

    /// Bind the listening socket.
    pub fn bind(&self) -> io::Result<TcpListener> {
        let listener = create_listener(self.config.listen, self.config.backlog)?;
        TcpListener::from_std(listener)
    }

    /// Accept and serve connections until `shutdown` fires.
    pub async fn run(&self, listener: TcpListener, mut shutdown: Shutdown) -> io::Result<()> {
        info!(address = %listener.local_addr()?, "Server listening");

        while !shutdown.is_shutdown() {
            let accepted = tokio::select! {
                biased;
                _ = shutdown.recv() => break,
                accepted = listener.accept() => accepted,
            };

            match accepted {
                Ok((stream, peer)) => {
                    info!(peer = %peer, "Client connected");
                    let served = tokio::select! {
                        biased;
                        _ = shutdown.recv() => {
                            info!(peer = %peer, "Shutdown requested, dropping open connection");
                            break;
                        }
                        served = handle_connection(
                            stream,
                            peer,
                            &self.responses,
                            &self.config.limits,
                            self.config.read_size,
                        ) => served,
                    };
                    if let Err(e) = served {
                        error!(peer = %peer, error = %e, "Connection error");
                    }
                    info!(peer = %peer, "Client disconnected");
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {
                    debug!("Accept interrupted, checking shutdown flag");
                }
                Err(e) => {
                    error!(error = %e, "Failed to accept connection");
                }
            }
        }

        info!("Server is shutting down, exiting accept loop");
        Ok(())
    }

    /// Tear down the server, releasing the response table.
    pub fn shutdown(mut self) {
        self.responses.clear();
        info!("Server shut down successfully");
    }
}

/// Create a non-blocking std listener with `SO_REUSEADDR` and the given backlog.
fn create_listener(addr: SocketAddr, backlog: i32) -> io::Result<std::net::TcpListener> {
    let socket = socket2::Socket::new(
        match addr {
            SocketAddr::V4(_) => socket2::Domain::IPV4,
            SocketAddr::V6(_) => socket2::Domain::IPV6,
        },
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    socket.set_nonblocking(true)?;
    socket.bind(&addr.into())?;
    socket.listen(backlog)?;

    Ok(socket.into())
}
