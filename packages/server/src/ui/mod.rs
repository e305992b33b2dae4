//! TCP chat server implementation.

mod server;
pub mod session;
mod signal;

pub use server::{Server, ServerError};
pub use session::run_session;
