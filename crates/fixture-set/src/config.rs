//! Fixture configuration.
//!
//! Settings are read from a TOML document and may be overridden from the
//! environment:
//!
//! ```toml
//! fixture_path = "tests/fixtures"
//! load_fixtures_once = true
//! timestamps = false
//!
//! [collections]
//! "admins/users" = "staff"
//! ```
//!
//! | Variable            | Field                |
//! |---------------------|----------------------|
//! | `FIXTURE_PATH`      | `fixture_path`       |
//! | `FIXTURE_LOAD_ONCE` | `load_fixtures_once` |

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{FixtureError, FixtureResult};

/// Environment variable overriding [`FixtureConfig::fixture_path`].
pub const ENV_FIXTURE_PATH: &str = "FIXTURE_PATH";

/// Environment variable overriding [`FixtureConfig::load_fixtures_once`].
pub const ENV_LOAD_ONCE: &str = "FIXTURE_LOAD_ONCE";

/// Configuration for a [`FixtureSuite`](crate::suite::FixtureSuite).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixtureConfig {
	/// Directory that holds the fixture files.
	pub fixture_path: PathBuf,

	/// Reuse loaded fixtures across tests instead of reloading per test.
	pub load_fixtures_once: bool,

	/// Fill `created_at` / `updated_at` on fixtures that omit them.
	pub timestamps: bool,

	/// Fixture set name to collection overrides.
	pub collections: HashMap<String, String>,
}

impl Default for FixtureConfig {
	fn default() -> Self {
		Self {
			fixture_path: PathBuf::from("tests/fixtures"),
			load_fixtures_once: false,
			timestamps: false,
			collections: HashMap::new(),
		}
	}
}

impl FixtureConfig {
	/// Creates a configuration rooted at `fixture_path`.
	pub fn new(fixture_path: impl Into<PathBuf>) -> Self {
		Self {
			fixture_path: fixture_path.into(),
			..Self::default()
		}
	}

	/// Sets the load-once flag.
	pub fn with_load_once(mut self, load_once: bool) -> Self {
		self.load_fixtures_once = load_once;
		self
	}

	/// Sets the timestamps flag.
	pub fn with_timestamps(mut self, timestamps: bool) -> Self {
		self.timestamps = timestamps;
		self
	}

	/// Maps a fixture set to a collection other than its default.
	pub fn with_collection(mut self, set: impl Into<String>, collection: impl Into<String>) -> Self {
		self.collections.insert(set.into(), collection.into());
		self
	}

	/// Parses a configuration from TOML text.
	pub fn from_toml_str(content: &str) -> FixtureResult<Self> {
		Ok(toml::from_str(content)?)
	}

	/// Reads a TOML configuration file and applies environment overrides.
	pub fn from_file(path: &Path) -> FixtureResult<Self> {
		let content = std::fs::read_to_string(path).map_err(|e| {
			if e.kind() == std::io::ErrorKind::NotFound {
				FixtureError::FileNotFound(path.display().to_string())
			} else {
				FixtureError::IoError(e)
			}
		})?;
		let mut config = Self::from_toml_str(&content)?;
		config.apply_env_overrides()?;
		Ok(config)
	}

	/// Builds the default configuration with environment overrides applied.
	pub fn from_env() -> FixtureResult<Self> {
		let mut config = Self::default();
		config.apply_env_overrides()?;
		Ok(config)
	}

	/// Applies `FIXTURE_PATH` and `FIXTURE_LOAD_ONCE` from the process environment.
	pub fn apply_env_overrides(&mut self) -> FixtureResult<()> {
		self.apply_overrides(|key| std::env::var(key).ok())
	}

	/// Applies overrides from an arbitrary variable lookup.
	pub fn apply_overrides<F>(&mut self, lookup: F) -> FixtureResult<()>
	where
		F: Fn(&str) -> Option<String>,
	{
		if let Some(path) = lookup(ENV_FIXTURE_PATH).filter(|p| !p.is_empty()) {
			self.fixture_path = PathBuf::from(path);
		}

		if let Some(raw) = lookup(ENV_LOAD_ONCE) {
			self.load_fixtures_once = parse_bool(&raw).ok_or_else(|| {
				FixtureError::ConfigError(format!(
					"{} must be a boolean, got '{}'",
					ENV_LOAD_ONCE, raw
				))
			})?;
		}

		Ok(())
	}
}

fn parse_bool(raw: &str) -> Option<bool> {
	match raw.trim().to_ascii_lowercase().as_str() {
		"1" | "true" | "yes" | "on" => Some(true),
		"0" | "false" | "no" | "off" => Some(false),
		_ => None,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use std::io::Write;
	use tempfile::NamedTempFile;

	#[rstest]
	fn test_default_config() {
		let config = FixtureConfig::default();
		assert_eq!(config.fixture_path, PathBuf::from("tests/fixtures"));
		assert!(!config.load_fixtures_once);
		assert!(!config.timestamps);
		assert!(config.collections.is_empty());
	}

	#[rstest]
	fn test_from_toml_str() {
		let config = FixtureConfig::from_toml_str(
			r#"
fixture_path = "spec/fixtures"
load_fixtures_once = true

[collections]
"admins/users" = "staff"
"#,
		)
		.unwrap();

		assert_eq!(config.fixture_path, PathBuf::from("spec/fixtures"));
		assert!(config.load_fixtures_once);
		assert!(!config.timestamps);
		assert_eq!(config.collections["admins/users"], "staff");
	}

	#[rstest]
	fn test_from_toml_str_invalid() {
		let result = FixtureConfig::from_toml_str("load_fixtures_once = \"maybe\"");
		assert!(matches!(result, Err(FixtureError::TomlError(_))));
	}

	#[rstest]
	fn test_from_file() {
		let mut file = NamedTempFile::with_suffix(".toml").unwrap();
		writeln!(file, "timestamps = true").unwrap();

		let config = FixtureConfig::from_file(file.path()).unwrap();
		assert!(config.timestamps);
	}

	#[rstest]
	fn test_from_file_not_found() {
		let result = FixtureConfig::from_file(Path::new("/nonexistent/fixtures.toml"));
		assert!(matches!(result, Err(FixtureError::FileNotFound(_))));
	}

	#[rstest]
	#[case("true", true)]
	#[case("1", true)]
	#[case("Yes", true)]
	#[case("off", false)]
	#[case("0", false)]
	fn test_load_once_override(#[case] raw: &str, #[case] expected: bool) {
		let mut config = FixtureConfig::default().with_load_once(!expected);
		config
			.apply_overrides(|key| (key == ENV_LOAD_ONCE).then(|| raw.to_string()))
			.unwrap();
		assert_eq!(config.load_fixtures_once, expected);
	}

	#[rstest]
	fn test_path_override() {
		let mut config = FixtureConfig::new("a");
		config
			.apply_overrides(|key| (key == ENV_FIXTURE_PATH).then(|| "b".to_string()))
			.unwrap();
		assert_eq!(config.fixture_path, PathBuf::from("b"));
	}

	#[rstest]
	fn test_invalid_load_once_override() {
		let mut config = FixtureConfig::default();
		let result = config.apply_overrides(|key| (key == ENV_LOAD_ONCE).then(|| "sure".to_string()));
		assert!(matches!(result, Err(FixtureError::ConfigError(_))));
	}

	#[rstest]
	fn test_builder() {
		let config = FixtureConfig::new("fx")
			.with_load_once(true)
			.with_timestamps(true)
			.with_collection("users", "people");
		assert!(config.load_fixtures_once);
		assert!(config.timestamps);
		assert_eq!(config.collections["users"], "people");
	}
}
