//! grove core — group models, error types, and the backend traits that
//! decouple group lifecycle logic from the directory service, the OS
//! group database, and lifecycle subscribers.

pub mod allocation;
pub mod error;
pub mod events;
pub mod models;
pub mod repository;

pub use error::{GroveError, GroveResult};
