//! Test data locator.
//!
//! Resolves paths inside the `tests/fixtures/data` directory regardless of
//! the working directory the tests run from.

use std::path::{Path, PathBuf};

/// Locator for fixture data files.
pub struct TestDataLoader {
	base_path: PathBuf,
}

impl TestDataLoader {
	/// Create a locator for the crate's fixture data directory.
	pub fn new() -> Self {
		Self {
			base_path: Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/data"),
		}
	}

	/// Create a locator with a custom base path.
	pub fn with_base<P: AsRef<Path>>(base_path: P) -> Self {
		Self {
			base_path: base_path.as_ref().to_path_buf(),
		}
	}

	/// Fixture directory to hand to a suite.
	pub fn fixture_path(&self) -> &Path {
		&self.base_path
	}

	/// Get the full path to a test data file.
	pub fn path(&self, name: &str) -> PathBuf {
		self.base_path.join(name)
	}

	/// Check if a test data file exists.
	pub fn exists(&self, name: &str) -> bool {
		self.path(name).exists()
	}
}

impl Default for TestDataLoader {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[rstest::rstest]
	fn test_data_directory_exists() {
		let loader = TestDataLoader::new();
		assert!(loader.fixture_path().is_dir());
		assert!(loader.exists("users.yml"));
	}

	#[rstest::rstest]
	fn test_with_base() {
		let loader = TestDataLoader::with_base("/custom/path");
		assert_eq!(loader.path("a.yml"), PathBuf::from("/custom/path/a.yml"));
	}

	#[rstest::rstest]
	fn test_default() {
		let loader = TestDataLoader::default();
		assert!(loader.fixture_path().ends_with("tests/fixtures/data"));
	}
}
