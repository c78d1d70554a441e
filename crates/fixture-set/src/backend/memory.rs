//! In-memory document backend.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;

use super::{Document, DocumentBackend, ID_FIELD, id_to_string};
use crate::error::{FixtureError, FixtureResult};

/// Process-local document store.
///
/// Collections are created on first insert. Counts every `find_one` call so
/// tests can tell a cache hit from a database round trip.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
	collections: RwLock<HashMap<String, Vec<Document>>>,
	find_count: AtomicUsize,
	next_id: AtomicU64,
}

impl InMemoryBackend {
	/// Creates an empty backend.
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of `find_one` calls served so far.
	pub fn find_count(&self) -> usize {
		self.find_count.load(Ordering::SeqCst)
	}

	/// Number of documents in a collection.
	pub fn count(&self, collection: &str) -> usize {
		self.collections
			.read()
			.get(collection)
			.map(Vec::len)
			.unwrap_or(0)
	}

	/// Names of all non-empty collections, sorted.
	pub fn collection_names(&self) -> Vec<String> {
		let mut names: Vec<String> = self
			.collections
			.read()
			.iter()
			.filter(|(_, docs)| !docs.is_empty())
			.map(|(name, _)| name.clone())
			.collect();
		names.sort();
		names
	}

	/// Removes every collection.
	pub fn clear(&self) {
		self.collections.write().clear();
	}
}

fn matches(document: &Document, filter: &Document) -> bool {
	filter
		.iter()
		.all(|(key, expected)| document.get(key) == Some(expected))
}

#[async_trait]
impl DocumentBackend for InMemoryBackend {
	async fn find_one(&self, collection: &str, filter: Document) -> FixtureResult<Option<Document>> {
		self.find_count.fetch_add(1, Ordering::SeqCst);
		Ok(self
			.collections
			.read()
			.get(collection)
			.and_then(|docs| docs.iter().find(|doc| matches(doc, &filter)))
			.cloned())
	}

	async fn insert_many(
		&self,
		collection: &str,
		documents: Vec<Document>,
	) -> FixtureResult<Vec<String>> {
		let mut collections = self.collections.write();
		let stored = collections.entry(collection.to_string()).or_default();

		let mut ids = Vec::with_capacity(documents.len());
		for mut document in documents {
			let id = match document.get(ID_FIELD) {
				Some(id) => id.clone(),
				None => {
					let generated = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
					let id = Value::String(format!("{:024x}", generated));
					document.insert(ID_FIELD.to_string(), id.clone());
					id
				}
			};

			if stored.iter().any(|doc| doc.get(ID_FIELD) == Some(&id)) {
				return Err(FixtureError::BackendError(format!(
					"duplicate key {} in collection '{}'",
					id, collection
				)));
			}

			ids.push(id_to_string(&id));
			stored.push(document);
		}

		Ok(ids)
	}

	async fn delete_many(&self, collection: &str, filter: Document) -> FixtureResult<u64> {
		let mut collections = self.collections.write();
		let Some(stored) = collections.get_mut(collection) else {
			return Ok(0);
		};

		let before = stored.len();
		stored.retain(|doc| !matches(doc, &filter));
		Ok((before - stored.len()) as u64)
	}

	async fn update_one(
		&self,
		collection: &str,
		filter: Document,
		fields: Document,
	) -> FixtureResult<u64> {
		let mut collections = self.collections.write();
		let target = collections
			.get_mut(collection)
			.and_then(|docs| docs.iter_mut().find(|doc| matches(doc, &filter)));

		match target {
			Some(document) => {
				document.extend(fields);
				Ok(1)
			}
			None => Ok(0),
		}
	}
}
