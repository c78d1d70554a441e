//! Document database backends.
//!
//! Fixtures are written to and read from a store implementing
//! [`DocumentBackend`]. Two implementations ship with the crate:
//! - [`InMemoryBackend`]: process-local collections, used by tests
//! - `MongoBackend`: MongoDB through the official driver (feature `mongodb`)

mod memory;

#[cfg(feature = "mongodb")]
pub mod mongodb;

pub use memory::InMemoryBackend;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::FixtureResult;

/// A document as stored in a collection.
pub type Document = Map<String, Value>;

/// Primary key field of every document.
pub const ID_FIELD: &str = "_id";

/// Trait for document-oriented databases that fixtures are loaded into.
///
/// Filters are documents whose fields must all be equal in a matching
/// document; an empty filter matches everything.
#[async_trait]
pub trait DocumentBackend: Send + Sync {
	/// Finds a single document matching the filter.
	async fn find_one(&self, collection: &str, filter: Document) -> FixtureResult<Option<Document>>;

	/// Inserts documents into the collection, returning their ids in order.
	async fn insert_many(&self, collection: &str, documents: Vec<Document>)
	-> FixtureResult<Vec<String>>;

	/// Deletes every document matching the filter, returning the count.
	async fn delete_many(&self, collection: &str, filter: Document) -> FixtureResult<u64>;

	/// Sets `fields` on the first document matching the filter.
	///
	/// Returns the number of documents matched (0 or 1).
	async fn update_one(
		&self,
		collection: &str,
		filter: Document,
		fields: Document,
	) -> FixtureResult<u64>;
}

/// Builds an `{"_id": id}` filter.
pub fn id_filter(id: &str) -> Document {
	let mut filter = Document::new();
	filter.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
	filter
}

/// Renders a document id as a string.
pub(crate) fn id_to_string(id: &Value) -> String {
	match id {
		Value::String(s) => s.clone(),
		other => other.to_string(),
	}
}
