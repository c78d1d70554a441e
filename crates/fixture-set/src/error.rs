//! Error types for fixture loading and lookup.
//!
//! This module defines the error types used throughout the fixture-set crate.

use thiserror::Error;

/// Errors that can occur while loading or accessing fixtures.
#[derive(Debug, Error)]
pub enum FixtureError {
	/// A fixture name was requested that the loaded set does not contain.
	#[error("No fixture named '{name}' found for fixture set '{set}'")]
	FixtureNotFound {
		/// Fixture set that was searched.
		set: String,
		/// Requested fixture name.
		name: String,
	},

	/// An accessor name does not correspond to any declared fixture set.
	#[error("No fixture set is declared for accessor '{0}'")]
	UnknownAccessor(String),

	/// The fixture is declared but its document is no longer in the database.
	#[error("Fixture '{name}' of set '{set}' is missing from collection '{collection}'")]
	RecordMissing {
		/// Fixture set of the record.
		set: String,
		/// Fixture name of the record.
		name: String,
		/// Collection that was queried.
		collection: String,
	},

	/// Fixture file not found.
	#[error("Fixture file not found: {0}")]
	FileNotFound(String),

	/// Unsupported file extension.
	#[error("Unsupported file extension: {0}")]
	UnsupportedExtension(String),

	/// Fixture file content has an invalid shape.
	#[error("Invalid fixture in {source_name}: {message}")]
	InvalidFixture {
		/// File or set the fixture came from.
		source_name: String,
		/// What was wrong with it.
		message: String,
	},

	/// Error parsing fixture data.
	#[error("Parse error: {0}")]
	ParseError(String),

	/// Document database operation failed.
	#[error("Backend error: {0}")]
	BackendError(String),

	/// Configuration could not be read or is invalid.
	#[error("Configuration error: {0}")]
	ConfigError(String),

	/// I/O operation failed.
	#[error("IO error: {0}")]
	IoError(#[from] std::io::Error),

	/// JSON serialization/deserialization error.
	#[error("JSON error: {0}")]
	JsonError(#[from] serde_json::Error),

	/// YAML deserialization error (when yaml feature is enabled).
	#[cfg(feature = "yaml")]
	#[error("YAML error: {0}")]
	YamlError(#[from] serde_yaml::Error),

	/// TOML configuration error.
	#[error("TOML error: {0}")]
	TomlError(#[from] toml::de::Error),
}

impl FixtureError {
	/// Builds a [`FixtureError::FixtureNotFound`] for `name` in `set`.
	pub fn not_found(set: impl Into<String>, name: impl Into<String>) -> Self {
		Self::FixtureNotFound {
			set: set.into(),
			name: name.into(),
		}
	}

	/// Returns true if this is a fixture lookup failure.
	pub fn is_not_found(&self) -> bool {
		matches!(self, Self::FixtureNotFound { .. })
	}
}

/// Result type alias for fixture operations.
pub type FixtureResult<T> = Result<T, FixtureError>;
