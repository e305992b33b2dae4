//! Infrastructure layer: concrete implementations of domain interfaces.

pub mod registry;

pub use registry::InMemoryClientRegistry;
