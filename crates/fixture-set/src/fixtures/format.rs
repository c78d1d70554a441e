//! Fixture file formats.
//!
//! A fixture file maps fixture labels to attribute mappings:
//!
//! ```yaml
//! DEFAULTS: &defaults
//!   active: true
//!
//! alice:
//!   <<: *defaults
//!   name: Alice
//!   email: $LABEL@example.com
//! ```

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::backend::Document;

/// Top-level key that holds shared attributes rather than a fixture.
pub const DEFAULTS_KEY: &str = "DEFAULTS";

/// Placeholder replaced with the fixture label in string attributes.
pub const LABEL_PLACEHOLDER: &str = "$LABEL";

/// Supported fixture file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum FixtureFormat {
	/// YAML format (default, requires the `yaml` feature).
	#[default]
	Yaml,

	/// JSON format.
	Json,
}

impl FixtureFormat {
	/// Extensions probed when resolving a set name to a file, in order.
	pub const EXTENSIONS: [&'static str; 3] = ["yml", "yaml", "json"];

	/// Determines the fixture format from a file extension.
	///
	/// # Example
	///
	/// ```
	/// # use fixture_set::fixtures::FixtureFormat;
	/// assert_eq!(FixtureFormat::from_extension("yml"), Some(FixtureFormat::Yaml));
	/// assert_eq!(FixtureFormat::from_extension("JSON"), Some(FixtureFormat::Json));
	/// assert_eq!(FixtureFormat::from_extension("csv"), None);
	/// ```
	pub fn from_extension(ext: &str) -> Option<Self> {
		match ext.to_lowercase().as_str() {
			"yml" | "yaml" => Some(Self::Yaml),
			"json" => Some(Self::Json),
			_ => None,
		}
	}

	/// Determines the fixture format from a file path.
	pub fn from_path(path: &Path) -> Option<Self> {
		path.extension()
			.and_then(|ext| ext.to_str())
			.and_then(Self::from_extension)
	}

	/// Returns the default file extension for this format.
	pub fn extension(&self) -> &'static str {
		match self {
			Self::Yaml => "yml",
			Self::Json => "json",
		}
	}
}

impl std::fmt::Display for FixtureFormat {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Yaml => write!(f, "YAML"),
			Self::Json => write!(f, "JSON"),
		}
	}
}

/// Candidate files for a set name under `root`, in probing order.
pub fn candidate_paths(root: &Path, set_name: &str) -> Vec<PathBuf> {
	FixtureFormat::EXTENSIONS
		.iter()
		.map(|ext| root.join(format!("{}.{}", set_name, ext)))
		.collect()
}

/// One labelled entry of a fixture file.
#[derive(Debug, Clone, PartialEq)]
pub struct FixtureEntry {
	/// Fixture label (the top-level key).
	pub label: String,

	/// Attributes as written in the file.
	pub attributes: Document,
}

/// Parsed content of one fixture file.
#[derive(Debug, Clone)]
pub struct FixtureFile {
	/// Labelled entries, `DEFAULTS` excluded.
	pub entries: Vec<FixtureEntry>,

	/// Format the file was parsed from.
	pub format: FixtureFormat,

	/// Optional source file path.
	pub source: Option<String>,
}

impl FixtureFile {
	/// Creates fixture file content from entries.
	pub fn from_entries(entries: Vec<FixtureEntry>, format: FixtureFormat) -> Self {
		Self {
			entries,
			format,
			source: None,
		}
	}

	/// Sets the source file path.
	pub fn with_source(mut self, source: impl Into<String>) -> Self {
		self.source = Some(source.into());
		self
	}

	/// Returns the number of entries.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Returns true if the file declares no fixtures.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Returns the labels in file order.
	pub fn labels(&self) -> Vec<&str> {
		self.entries.iter().map(|e| e.label.as_str()).collect()
	}
}

/// Replaces `$LABEL` in every string inside `value`.
pub fn interpolate_label(value: &mut Value, label: &str) {
	match value {
		Value::String(s) if s.contains(LABEL_PLACEHOLDER) => {
			*s = s.replace(LABEL_PLACEHOLDER, label);
		}
		Value::Array(items) => items
			.iter_mut()
			.for_each(|item| interpolate_label(item, label)),
		Value::Object(map) => map
			.values_mut()
			.for_each(|item| interpolate_label(item, label)),
		_ => {}
	}
}
