//! Fixture creation and the creation cache.
//!
//! [`FixtureLoader::create_fixtures`] writes fixture sets into the database.
//! Sets already written since the last [`FixtureLoader::reset_cache`] are
//! returned from the cache without touching the database again.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::format::{FixtureFormat, candidate_paths};
use super::parser::FixtureParser;
use super::set::{BuildOptions, FixtureSet, default_collection};
use crate::backend::{Document, DocumentBackend};
use crate::error::{FixtureError, FixtureResult};

/// Lists every fixture set under `root`.
///
/// Walks the directory recursively and names each file with a recognized
/// extension by its relative path without extension, using `/` separators.
/// A missing directory yields no sets.
pub fn discover_set_names(root: &Path) -> FixtureResult<Vec<String>> {
	if !root.is_dir() {
		tracing::warn!(path = %root.display(), "Fixture directory does not exist");
		return Ok(Vec::new());
	}

	let mut names = Vec::new();
	for entry in walkdir::WalkDir::new(root).follow_links(true) {
		let entry = match entry {
			Ok(entry) => entry,
			Err(e) => {
				tracing::warn!(error = %e, "Skipping fixture entry");
				continue;
			}
		};

		let path = entry.path();
		if !entry.file_type().is_file() || FixtureFormat::from_path(path).is_none() {
			continue;
		}

		let Ok(relative) = path.strip_prefix(root) else {
			continue;
		};

		let components: Vec<String> = relative
			.with_extension("")
			.components()
			.map(|c| c.as_os_str().to_string_lossy().into_owned())
			.collect();
		names.push(components.join("/"));
	}

	names.sort();
	names.dedup();
	Ok(names)
}

/// Resolves a set name to the first existing fixture file.
pub fn resolve_fixture_file(root: &Path, set_name: &str) -> FixtureResult<PathBuf> {
	candidate_paths(root, set_name)
		.into_iter()
		.find(|p| p.is_file())
		.ok_or_else(|| FixtureError::FileNotFound(root.join(set_name).display().to_string()))
}

/// Creates fixture sets in the database and remembers which ones exist.
#[derive(Debug, Default)]
pub struct FixtureLoader {
	parser: FixtureParser,
	options: BuildOptions,
	cache: HashMap<String, Arc<FixtureSet>>,
	created: usize,
}

impl FixtureLoader {
	/// Creates a loader with an empty cache.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a loader with build options.
	pub fn with_options(options: BuildOptions) -> Self {
		Self {
			options,
			..Self::default()
		}
	}

	/// Forgets every created set so the next call writes them again.
	pub fn reset_cache(&mut self) {
		if !self.cache.is_empty() {
			tracing::debug!(sets = self.cache.len(), "Resetting fixture cache");
		}
		self.cache.clear();
	}

	/// Returns true if `set_name` was created since the last reset.
	pub fn is_cached(&self, set_name: &str) -> bool {
		self.cache.contains_key(set_name)
	}

	/// Names of the sets created since the last reset, sorted.
	pub fn cached_names(&self) -> Vec<&str> {
		let mut names: Vec<&str> = self.cache.keys().map(String::as_str).collect();
		names.sort_unstable();
		names
	}

	/// Total number of sets written to the database by this loader.
	pub fn created_count(&self) -> usize {
		self.created
	}

	/// Reads, purges and inserts the named sets.
	///
	/// Sets are returned in the order requested. For the sets not yet cached,
	/// every target collection is emptied once before any documents are
	/// inserted, so two sets sharing a collection both survive.
	///
	/// # Arguments
	///
	/// * `backend` - Database to write into
	/// * `root` - Fixture directory
	/// * `set_names` - Sets to create
	/// * `collections` - Set name to collection overrides
	pub async fn create_fixtures(
		&mut self,
		backend: &dyn DocumentBackend,
		root: &Path,
		set_names: &[String],
		collections: &HashMap<String, String>,
	) -> FixtureResult<Vec<Arc<FixtureSet>>> {
		let mut pending: Vec<FixtureSet> = Vec::new();
		for name in set_names {
			if self.cache.contains_key(name) || pending.iter().any(|s| s.name() == name) {
				continue;
			}

			let path = resolve_fixture_file(root, name)?;
			let file = self.parser.parse_file(&path)?;
			let collection = collections
				.get(name)
				.cloned()
				.unwrap_or_else(|| default_collection(name));
			pending.push(FixtureSet::build(name.clone(), collection, file, self.options));
		}

		let mut purged = HashSet::new();
		for set in &pending {
			if purged.insert(set.collection().to_string()) {
				let deleted = backend.delete_many(set.collection(), Document::new()).await?;
				tracing::debug!(collection = set.collection(), deleted, "Purged collection");
			}
		}

		for set in pending {
			let documents = set.documents();
			if !documents.is_empty() {
				backend.insert_many(set.collection(), documents).await?;
			}
			tracing::info!(
				set = set.name(),
				collection = set.collection(),
				fixtures = set.len(),
				"Created fixture set"
			);
			self.created += 1;
			self.cache.insert(set.name().to_string(), Arc::new(set));
		}

		set_names
			.iter()
			.map(|name| {
				self.cache.get(name).cloned().ok_or_else(|| {
					FixtureError::FileNotFound(root.join(name).display().to_string())
				})
			})
			.collect()
	}
}
