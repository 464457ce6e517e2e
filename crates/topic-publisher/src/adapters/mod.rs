//! # Adapters Layer (Hexagonal Architecture)
//!
//! Implementations of the outbound ports that ship with the crate.

mod clock;
mod in_memory;
mod json;

pub use clock::ManualTimeSource;
pub use in_memory::{InMemoryConnector, InMemoryNamespace, InMemoryTopic, InMemoryTopicManager};
pub use json::JsonEncoder;
