//! Fixture files, sets and creation.
//!
//! - [`FixtureParser`] reads YAML/JSON fixture files into [`FixtureFile`]s
//! - [`FixtureSet`] turns a file into documents with deterministic ids
//! - [`FixtureLoader`] writes sets into a [`DocumentBackend`](crate::backend::DocumentBackend)

pub mod format;
pub mod loader;
pub mod parser;
pub mod set;

pub use format::{FixtureEntry, FixtureFile, FixtureFormat};
pub use loader::{FixtureLoader, discover_set_names, resolve_fixture_file};
pub use parser::FixtureParser;
pub use set::{BuildOptions, Fixture, FixtureSet, accessor_name, default_collection, identify};
