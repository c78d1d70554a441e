//! MongoDB backend.
//!
//! ```rust,no_run
//! use fixture_set::backend::mongodb::MongoBackend;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = MongoBackend::connect("mongodb://localhost:27017", "app_test").await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use bson::{Bson, doc};
use mongodb::{Client, Database};
use serde_json::Value;

use super::{Document, DocumentBackend};
use crate::error::{FixtureError, FixtureResult};

/// Document backend over a MongoDB database.
#[derive(Clone)]
pub struct MongoBackend {
	client: Arc<Client>,
	database_name: String,
}

impl MongoBackend {
	/// Connects using a connection string and selects `database`.
	pub async fn connect(url: &str, database: impl Into<String>) -> FixtureResult<Self> {
		let client = Client::with_uri_str(url)
			.await
			.map_err(|e| FixtureError::BackendError(e.to_string()))?;

		Ok(Self::from_client(client, database))
	}

	/// Wraps an existing client.
	pub fn from_client(client: Client, database: impl Into<String>) -> Self {
		Self {
			client: Arc::new(client),
			database_name: database.into(),
		}
	}

	/// Name of the selected database.
	pub fn database_name(&self) -> &str {
		&self.database_name
	}

	fn database(&self) -> Database {
		self.client.database(&self.database_name)
	}
}

fn to_bson(document: &Document) -> FixtureResult<bson::Document> {
	bson::to_document(document).map_err(|e| FixtureError::BackendError(e.to_string()))
}

fn from_bson(document: bson::Document) -> FixtureResult<Document> {
	match Bson::Document(document).into_relaxed_extjson() {
		Value::Object(map) => Ok(map),
		other => Err(FixtureError::BackendError(format!(
			"expected a document, got {}",
			other
		))),
	}
}

fn bson_id_to_string(id: Bson) -> String {
	match id {
		Bson::ObjectId(oid) => oid.to_hex(),
		Bson::String(s) => s,
		other => other.to_string(),
	}
}

#[async_trait]
impl DocumentBackend for MongoBackend {
	async fn find_one(&self, collection: &str, filter: Document) -> FixtureResult<Option<Document>> {
		let coll = self.database().collection::<bson::Document>(collection);

		let found = coll
			.find_one(to_bson(&filter)?)
			.await
			.map_err(|e| FixtureError::BackendError(e.to_string()))?;

		found.map(from_bson).transpose()
	}

	async fn insert_many(
		&self,
		collection: &str,
		documents: Vec<Document>,
	) -> FixtureResult<Vec<String>> {
		if documents.is_empty() {
			return Ok(Vec::new());
		}

		let coll = self.database().collection::<bson::Document>(collection);
		let documents = documents
			.iter()
			.map(to_bson)
			.collect::<FixtureResult<Vec<_>>>()?;

		let result = coll
			.insert_many(documents)
			.await
			.map_err(|e| FixtureError::BackendError(e.to_string()))?;

		let mut ids: Vec<(usize, Bson)> = result.inserted_ids.into_iter().collect();
		ids.sort_by_key(|(index, _)| *index);
		Ok(ids
			.into_iter()
			.map(|(_, id)| bson_id_to_string(id))
			.collect())
	}

	async fn delete_many(&self, collection: &str, filter: Document) -> FixtureResult<u64> {
		let coll = self.database().collection::<bson::Document>(collection);

		let result = coll
			.delete_many(to_bson(&filter)?)
			.await
			.map_err(|e| FixtureError::BackendError(e.to_string()))?;

		Ok(result.deleted_count)
	}

	async fn update_one(
		&self,
		collection: &str,
		filter: Document,
		fields: Document,
	) -> FixtureResult<u64> {
		let coll = self.database().collection::<bson::Document>(collection);

		let result = coll
			.update_one(to_bson(&filter)?, doc! { "$set": to_bson(&fields)? })
			.await
			.map_err(|e| FixtureError::BackendError(e.to_string()))?;

		Ok(result.matched_count)
	}
}
