//! Hiroba terminal chat client.
//!
//! Reads lines from the terminal and writes them to the server; prints every
//! line the server sends.

pub mod error;
pub mod runner;
pub mod session;
mod ui;

pub use error::ClientError;
pub use runner::{connect, run_client};
pub use session::{SessionEnd, chat, run_client_session};
