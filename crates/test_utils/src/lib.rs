//! Test Utilities Crate
//!
//! Provides shared test infrastructure for the driving school test suite.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built test data for common entities
//! - `builders`: Builder patterns for test data construction
//! - `memory`: In-memory implementations of the domain ports

pub mod fixtures;
pub mod builders;
pub mod memory;

pub use fixtures::*;
pub use builders::*;
pub use memory::*;
