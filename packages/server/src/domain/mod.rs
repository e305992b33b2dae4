//! Domain layer for the chat server.
//!
//! This module contains the wire grammar, reply texts and the registry
//! interface. It is independent of sockets and of the concrete registry.

pub mod error;
pub mod message;
pub mod registry;
pub mod value_object;

pub use error::{ProtocolError, SessionError};
pub use message::{InboundMessage, NAME_PROMPT, format_echo, format_relay};
pub use registry::{
    ClientRegistry, OUTBOX_CAPACITY, Outbox, RegisteredClient, Registration, outbox_channel,
};
pub use value_object::{ClientName, ConnectionId};

#[cfg(test)]
pub use registry::MockClientRegistry;
