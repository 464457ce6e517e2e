//! # Topic Bus Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── fixtures.rs      # Shared payload types
//!     ├── scenarios.rs     # Build + publish end to end
//!     ├── provisioning.rs  # Topic creation across publishers
//!     ├── concurrency.rs   # Shared publishers, deadlines, cancellation
//!     ├── custom_ports.rs  # Out-of-crate port implementations
//!     └── telemetry.rs     # Logging alongside publishing
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p bus-tests
//! cargo test -p bus-tests integration::concurrency::
//!
//! # Benchmarks
//! cargo bench -p bus-tests
//! ```

#![allow(dead_code)]
