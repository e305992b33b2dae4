//! Error types for the chat client.

use std::io;

use thiserror::Error;

/// Client-specific errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// Nothing is listening at the server address
    #[error("Failed to connect to the server. Please make sure the server is running.")]
    ConnectionRefused,

    /// Any other connect failure
    #[error("Error connecting to the server: {0}")]
    Connect(io::Error),

    /// The server reset the connection
    #[error("Connection with the server was reset.")]
    ConnectionReset,

    /// Read fault other than a reset
    #[error("Error receiving message: {0}")]
    Receive(io::Error),

    /// Write fault
    #[error("Error sending message: {0}")]
    Send(io::Error),
}

impl ClientError {
    pub(crate) fn connect(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::ConnectionRefused => ClientError::ConnectionRefused,
            _ => ClientError::Connect(err),
        }
    }

    pub(crate) fn receive(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::ConnectionReset | io::ErrorKind::ConnectionAborted => {
                ClientError::ConnectionReset
            }
            _ => ClientError::Receive(err),
        }
    }

    pub(crate) fn send(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe => ClientError::ConnectionReset,
            _ => ClientError::Send(err),
        }
    }
}
