//! Client execution logic.

use tokio::net::TcpStream;

use super::{
    error::ClientError,
    session::{SessionEnd, run_client_session},
};

/// Open the TCP connection to the chat server.
///
/// There is no retry: a refused or failed connect is returned to the caller.
pub async fn connect(host: &str, port: u16) -> Result<TcpStream, ClientError> {
    TcpStream::connect((host, port))
        .await
        .map_err(ClientError::connect)
}

/// Connect to `host:port` and run one chat session.
pub async fn run_client(host: &str, port: u16) -> Result<SessionEnd, ClientError> {
    tracing::info!("Connecting to {}:{}", host, port);
    let stream = connect(host, port).await?;
    if let Ok(addr) = stream.peer_addr() {
        tracing::debug!("Connected to {}", addr);
    }

    run_client_session(stream).await
}
