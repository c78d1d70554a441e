//! Convenience re-exports for common usage.
//!
//! ```ignore
//! use fixture_set::prelude::*;
//! ```

pub use std::sync::Arc;

// Error types
pub use crate::error::{FixtureError, FixtureResult};

// Lifecycle
pub use crate::config::FixtureConfig;
pub use crate::suite::{FixtureSelection, FixtureSuite, SuiteState};

// Access
pub use crate::context::{FetchMode, Fetched, FixtureAccessor, FixtureContext, SetAccessor};

// Fixtures
pub use crate::fixtures::{Fixture, FixtureLoader, FixtureSet, accessor_name, identify};

// Backends
pub use crate::backend::{Document, DocumentBackend, InMemoryBackend};

#[cfg(feature = "mongodb")]
pub use crate::backend::mongodb::MongoBackend;

pub use crate::fixture_accessors;
