//! Declarative test fixtures for document databases.
//!
//! This crate loads named records from fixture files into a document store
//! and hands them to tests:
//!
//! - **Fixture files**: YAML or JSON mappings of label to attributes
//! - **Suites**: declare which sets a group of tests uses, then call
//!   `setup` / `teardown` around each test
//! - **Accessors**: read fixtures by set and label, cached per test
//!
//! # Features
//!
//! - `yaml` - YAML fixture files (enabled by default)
//! - `mongodb` - MongoDB backend
//! - `full` - All features enabled
//!
//! # Quick Start
//!
//! Create a fixture file (`tests/fixtures/users.yml`):
//!
//! ```yaml
//! alice:
//!   name: Alice
//!   email: $LABEL@example.com
//! bob:
//!   name: Bob
//! ```
//!
//! Load it and read records:
//!
//! ```ignore
//! use fixture_set::prelude::*;
//!
//! let backend = Arc::new(InMemoryBackend::new());
//! let mut suite = FixtureSuite::new("tests/fixtures");
//! suite.fixtures(FixtureSelection::sets(["users"]))?;
//!
//! let mut ctx = suite.setup(backend).await?;
//! let alice = ctx.accessor("users").one("alice").await?;
//! assert_eq!(alice["email"], "alice@example.com");
//! suite.teardown(ctx);
//! ```
//!
//! # Architecture
//!
//! - [`FixtureSuite`](suite::FixtureSuite) - declarations and the setup/teardown lifecycle
//! - [`FixtureContext`](context::FixtureContext) - per-test loaded sets and instance cache
//! - [`FixtureAccessor`](context::FixtureAccessor) - `get(set, names, mode)`
//! - [`fixture_accessors!`] - one named method per set
//! - [`FixtureLoader`](fixtures::FixtureLoader) - writes sets to the database
//! - [`DocumentBackend`](backend::DocumentBackend) - the database interface

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

#[macro_use]
mod macros;

pub mod backend;
pub mod config;
pub mod context;
pub mod error;
pub mod fixtures;
pub mod prelude;
pub mod suite;

// Re-export commonly used types at crate root
pub use backend::{Document, DocumentBackend, InMemoryBackend};
pub use config::FixtureConfig;
pub use context::{FetchMode, Fetched, FixtureAccessor, FixtureContext};
pub use error::{FixtureError, FixtureResult};
pub use fixtures::{Fixture, FixtureSet, accessor_name};
pub use suite::{FixtureSelection, FixtureSuite};
