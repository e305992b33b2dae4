//! Client registry implementations
//!
//! - `inmemory`: HashMap behind a single mutex, lost on process restart

pub mod inmemory;

pub use inmemory::InMemoryClientRegistry;
