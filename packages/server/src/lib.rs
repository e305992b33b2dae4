//! Hiroba chat server library.
//!
//! A line-based TCP chat server: every connected client picks a display name,
//! then either broadcasts to everyone else or sends `@name:body` direct messages.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
