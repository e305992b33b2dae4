//! Server execution logic.

use std::{future::Future, io, sync::Arc, time::Duration};

use hiroba_shared::time::Clock;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::domain::ClientRegistry;

use super::{session::run_session, signal::shutdown_signal};

/// Pause before accepting again after a listener fault such as running out of file descriptors
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_secs(1);

/// Errors that prevent the server from starting
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listening socket could not be bound
    #[error("Failed to bind to {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    /// Any other I/O fault of the listening socket
    #[error("Listener error: {0}")]
    Io(#[from] io::Error),
}

/// TCP chat server
///
/// # Example
///
/// ```ignore
/// let registry = Arc::new(InMemoryClientRegistry::new());
/// let server = Server::new(registry, Arc::new(SystemClock));
/// server.run("127.0.0.1".to_string(), 12345).await?;
/// ```
pub struct Server {
    /// Registry shared by every session
    registry: Arc<dyn ClientRegistry>,
    /// Clock used to stamp join times
    clock: Arc<dyn Clock>,
}

impl Server {
    /// Create a new Server instance
    pub fn new(registry: Arc<dyn ClientRegistry>, clock: Arc<dyn Clock>) -> Self {
        Self { registry, clock }
    }

    /// Bind to `host:port` and serve until Ctrl+C or SIGTERM.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Bind`] if the address cannot be bound.
    pub async fn run(self, host: String, port: u16) -> Result<(), ServerError> {
        let bind_addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&bind_addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: bind_addr.clone(),
                source,
            })?;

        tracing::info!("Press Ctrl+C to shutdown gracefully");
        self.serve(listener, shutdown_signal()).await?;
        tracing::info!("Server shutdown complete");

        Ok(())
    }

    /// Run the accept loop on `listener` until `shutdown` resolves.
    ///
    /// Each accepted connection gets its own task; no session error ever
    /// reaches this loop. Sessions still running at shutdown are left to the runtime.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()>,
    {
        tracing::info!(
            "Server started on {}. Waiting for connections...",
            listener.local_addr()?
        );
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                accepted = listener.accept() => {
                    let (stream, peer) = match accepted {
                        Ok(accepted) => accepted,
                        Err(e) if is_connection_error(&e) => {
                            tracing::debug!("Connection dropped before accept: {}", e);
                            continue;
                        }
                        Err(e) => {
                            tracing::warn!(
                                "Failed to accept connection: {}. Retrying in {:?}",
                                e,
                                ACCEPT_ERROR_BACKOFF
                            );
                            tokio::select! {
                                _ = &mut shutdown => break,
                                _ = tokio::time::sleep(ACCEPT_ERROR_BACKOFF) => {}
                            }
                            continue;
                        }
                    };
                    tracing::debug!("Accepted connection from {}", peer);

                    let registry = self.registry.clone();
                    let clock = self.clock.clone();
                    tokio::spawn(async move {
                        let (reader, writer) = stream.into_split();
                        // Outcome is logged inside the session
                        let _ = run_session(reader, writer, peer, registry, clock).await;
                    });
                }
            }
        }

        Ok(())
    }
}

/// Errors that concern only the connection being accepted, not the listener
fn is_connection_error(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::ConnectionReset
    )
}
