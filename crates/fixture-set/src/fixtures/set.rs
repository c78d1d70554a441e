//! Fixture sets and their records.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde_json::Value;
use sha2::{Digest, Sha256};

use super::format::{FixtureFile, interpolate_label};
use crate::backend::{Document, DocumentBackend, ID_FIELD, id_filter, id_to_string};
use crate::error::{FixtureError, FixtureResult};

/// Returns the accessor name for a set: slashes become underscores.
///
/// ```
/// # use fixture_set::fixtures::accessor_name;
/// assert_eq!(accessor_name("admins/users"), "admins_users");
/// assert_eq!(accessor_name("users"), "users");
/// ```
pub fn accessor_name(set_name: &str) -> String {
	set_name.replace('/', "_")
}

/// Returns the collection a set loads into when no override exists.
pub fn default_collection(set_name: &str) -> String {
	accessor_name(set_name)
}

/// Deterministic document id for a fixture label.
///
/// The id is 24 hex characters, the width of a MongoDB ObjectId.
///
/// ```
/// # use fixture_set::fixtures::identify;
/// assert_eq!(identify("alice"), identify("alice"));
/// assert_ne!(identify("alice"), identify("bob"));
/// assert_eq!(identify("alice").len(), 24);
/// ```
pub fn identify(label: &str) -> String {
	let digest = Sha256::digest(label.as_bytes());
	digest[..12].iter().map(|b| format!("{:02x}", b)).collect()
}

/// Options applied when building documents from fixture entries.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildOptions {
	/// Fill `created_at` / `updated_at` when absent.
	pub timestamps: bool,
}

/// One named record of a fixture set.
#[derive(Debug, Clone, PartialEq)]
pub struct Fixture {
	set_name: String,
	label: String,
	collection: String,
	id: String,
	document: Document,
}

impl Fixture {
	/// Fixture label.
	pub fn label(&self) -> &str {
		&self.label
	}

	/// Name of the set this fixture belongs to.
	pub fn set_name(&self) -> &str {
		&self.set_name
	}

	/// Collection the fixture was inserted into.
	pub fn collection(&self) -> &str {
		&self.collection
	}

	/// Document id.
	pub fn id(&self) -> &str {
		&self.id
	}

	/// Document as inserted.
	pub fn document(&self) -> &Document {
		&self.document
	}

	/// Fetches the current record from the database.
	///
	/// # Errors
	///
	/// Returns [`FixtureError::RecordMissing`] if the document no longer exists.
	pub async fn find(&self, backend: &dyn DocumentBackend) -> FixtureResult<Document> {
		let filter = match self.document.get(ID_FIELD) {
			Some(id) => {
				let mut filter = Document::new();
				filter.insert(ID_FIELD.to_string(), id.clone());
				filter
			}
			None => id_filter(&self.id),
		};

		backend
			.find_one(&self.collection, filter)
			.await?
			.ok_or_else(|| FixtureError::RecordMissing {
				set: self.set_name.clone(),
				name: self.label.clone(),
				collection: self.collection.clone(),
			})
	}
}

/// A named collection of fixtures read from one file.
#[derive(Debug, Clone, PartialEq)]
pub struct FixtureSet {
	name: String,
	collection: String,
	path: Option<PathBuf>,
	fixtures: BTreeMap<String, Fixture>,
}

impl FixtureSet {
	/// Builds a set from parsed file content.
	///
	/// Each entry gets `$LABEL` interpolated, an `_id` from [`identify`]
	/// unless one is given, and timestamps when enabled.
	pub fn build(
		name: impl Into<String>,
		collection: impl Into<String>,
		file: FixtureFile,
		options: BuildOptions,
	) -> Self {
		let name = name.into();
		let collection = collection.into();
		let path = file.source.as_ref().map(PathBuf::from);
		let now = options
			.timestamps
			.then(|| Value::String(chrono::Utc::now().to_rfc3339()));

		let fixtures = file
			.entries
			.into_iter()
			.map(|entry| {
				let mut document = entry.attributes;
				document
					.values_mut()
					.for_each(|value| interpolate_label(value, &entry.label));

				let id = match document.get(ID_FIELD) {
					Some(id) => id_to_string(id),
					None => {
						let id = identify(&entry.label);
						document.insert(ID_FIELD.to_string(), Value::String(id.clone()));
						id
					}
				};

				if let Some(now) = &now {
					for field in ["created_at", "updated_at"] {
						document
							.entry(field.to_string())
							.or_insert_with(|| now.clone());
					}
				}

				let fixture = Fixture {
					set_name: name.clone(),
					label: entry.label.clone(),
					collection: collection.clone(),
					id,
					document,
				};
				(entry.label, fixture)
			})
			.collect();

		Self {
			name,
			collection,
			path,
			fixtures,
		}
	}

	/// Set name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Accessor name of the set.
	pub fn accessor_name(&self) -> String {
		accessor_name(&self.name)
	}

	/// Collection the set loads into.
	pub fn collection(&self) -> &str {
		&self.collection
	}

	/// File the set was read from, if any.
	pub fn path(&self) -> Option<&PathBuf> {
		self.path.as_ref()
	}

	/// Looks up a fixture by label.
	pub fn get(&self, label: &str) -> Option<&Fixture> {
		self.fixtures.get(label)
	}

	/// Returns true if the set contains `label`.
	pub fn contains(&self, label: &str) -> bool {
		self.fixtures.contains_key(label)
	}

	/// Labels in sorted order.
	pub fn labels(&self) -> impl Iterator<Item = &str> {
		self.fixtures.keys().map(String::as_str)
	}

	/// Returns an iterator over the fixtures.
	pub fn iter(&self) -> impl Iterator<Item = &Fixture> {
		self.fixtures.values()
	}

	/// Returns the number of fixtures.
	pub fn len(&self) -> usize {
		self.fixtures.len()
	}

	/// Returns true if the set has no fixtures.
	pub fn is_empty(&self) -> bool {
		self.fixtures.is_empty()
	}

	/// Documents to insert, one per fixture.
	pub fn documents(&self) -> Vec<Document> {
		self.fixtures.values().map(|f| f.document.clone()).collect()
	}
}
