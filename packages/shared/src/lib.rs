//! Utilities shared by the Hiroba chat server and client.

pub mod frame;
pub mod logger;
pub mod time;
