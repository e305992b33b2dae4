//! Domain layer error definitions.

use std::io;

use thiserror::Error;

use super::ClientName;

/// Protocol-level faults, recovered inline by replying to the sender.
///
/// The `Display` output of each variant is exactly the text sent back to the client.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// `@` sentinel present but no `:` separating recipient and body
    #[error("Error: Invalid message format for direct message.")]
    InvalidDirectMessage,

    /// No registered client carries the requested name
    #[error("Error: User {0} not found.")]
    UserNotFound(ClientName),
}

/// Connection-level faults that terminate a single session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The peer reset or aborted the connection
    #[error("connection reset by peer")]
    ConnectionReset,

    /// Any other I/O fault while reading or writing
    #[error("I/O error: {0}")]
    Io(io::Error),

    /// The outbound writer stopped before the receive loop ended
    #[error("outbound writer closed")]
    WriterClosed,
}

impl From<io::Error> for SessionError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe => SessionError::ConnectionReset,
            _ => SessionError::Io(err),
        }
    }
}
