//! Per-test fixture access.
//!
//! A [`FixtureContext`] is returned by
//! [`FixtureSuite::setup`](crate::suite::FixtureSuite::setup). It holds the
//! loaded fixture sets and an instance cache: the first request for a fixture
//! reads it from the database, later requests return the same `Arc` until a
//! reload is asked for.
//!
//! ```rust,ignore
//! let mut ctx = suite.setup(backend).await?;
//!
//! let alice = ctx.accessor("users").one("alice").await?;
//! let pair = ctx.get("users", &["alice", "bob"], FetchMode::Cached).await?;
//! let fresh = ctx.accessor("users").reload("alice").await?;
//!
//! suite.teardown(ctx);
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::backend::{Document, DocumentBackend};
use crate::error::{FixtureError, FixtureResult};
use crate::fixtures::{FixtureSet, accessor_name};

/// Loaded fixture sets keyed by set name.
pub type LoadedFixtures = HashMap<String, Arc<FixtureSet>>;

/// Whether a request may be served from the instance cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchMode {
	/// Use the cached instance when there is one.
	#[default]
	Cached,

	/// Drop the cached instance and read from the database.
	Reload,
}

/// Result of a fixture request.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched {
	/// Exactly one name was requested.
	One(Arc<Document>),

	/// Zero or several names were requested, in request order.
	Many(Vec<Arc<Document>>),
}

impl Fetched {
	/// Returns the record of a single-name request.
	pub fn one(self) -> Option<Arc<Document>> {
		match self {
			Self::One(document) => Some(document),
			Self::Many(_) => None,
		}
	}

	/// Returns every record, in request order.
	pub fn into_vec(self) -> Vec<Arc<Document>> {
		match self {
			Self::One(document) => vec![document],
			Self::Many(documents) => documents,
		}
	}

	/// Number of records.
	pub fn len(&self) -> usize {
		match self {
			Self::One(_) => 1,
			Self::Many(documents) => documents.len(),
		}
	}

	/// Returns true if no records were requested.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

/// Retrieval of fixture records by set and fixture name.
#[async_trait]
pub trait FixtureAccessor: Send {
	/// Returns the records named `names` from `set`.
	///
	/// A single name yields [`Fetched::One`], anything else [`Fetched::Many`].
	///
	/// # Errors
	///
	/// Returns [`FixtureError::FixtureNotFound`] for a name the loaded set
	/// does not contain.
	async fn get(&mut self, set: &str, names: &[&str], mode: FetchMode) -> FixtureResult<Fetched>;

	/// Maps an accessor name (`admins_users`) to its set (`admins/users`).
	fn resolve_accessor(&self, accessor: &str) -> Option<String>;

	/// Like [`get`](Self::get), addressing the set by its accessor name.
	async fn get_by_accessor(
		&mut self,
		accessor: &str,
		names: &[&str],
		mode: FetchMode,
	) -> FixtureResult<Fetched> {
		let set = self
			.resolve_accessor(accessor)
			.ok_or_else(|| FixtureError::UnknownAccessor(accessor.to_string()))?;
		self.get(&set, names, mode).await
	}
}

/// Fixture state of one test.
pub struct FixtureContext {
	backend: Arc<dyn DocumentBackend>,
	loaded: LoadedFixtures,
	accessors: HashMap<String, String>,
	instances: HashMap<String, HashMap<String, Arc<Document>>>,
}

impl std::fmt::Debug for FixtureContext {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("FixtureContext")
			.field("loaded", &self.loaded.keys().collect::<Vec<_>>())
			.field("accessors", &self.accessors)
			.field("cached_instances", &self.cached_instance_count())
			.finish()
	}
}

impl FixtureContext {
	/// Creates a context over already-loaded sets.
	///
	/// `declared` are the set names that get accessors; every loaded set gets
	/// one as well.
	pub fn new(
		backend: Arc<dyn DocumentBackend>,
		loaded: LoadedFixtures,
		declared: &[String],
	) -> Self {
		let mut context = Self {
			backend,
			loaded: LoadedFixtures::new(),
			accessors: HashMap::new(),
			instances: HashMap::new(),
		};
		context.declare(declared);
		context.merge(loaded);
		context
	}

	/// Creates a context with nothing loaded.
	pub fn empty(backend: Arc<dyn DocumentBackend>) -> Self {
		Self::new(backend, LoadedFixtures::new(), &[])
	}

	/// Registers accessors for `set_names`.
	pub(crate) fn declare(&mut self, set_names: &[String]) {
		for name in set_names {
			self.accessors.insert(accessor_name(name), name.clone());
		}
	}

	/// Adds sets to the loaded map, replacing sets of the same name.
	///
	/// Cached instances are dropped only for sets that were actually
	/// replaced by a different set.
	pub(crate) fn merge(&mut self, sets: LoadedFixtures) {
		for (name, set) in sets {
			self.accessors.insert(accessor_name(&name), name.clone());
			let replaced = self
				.loaded
				.get(&name)
				.is_some_and(|existing| !Arc::ptr_eq(existing, &set));
			if replaced {
				self.instances.remove(&name);
			}
			self.loaded.insert(name, set);
		}
	}

	/// The database fixtures are read from.
	pub fn backend(&self) -> &Arc<dyn DocumentBackend> {
		&self.backend
	}

	/// Loaded sets keyed by name.
	pub fn loaded_fixtures(&self) -> &LoadedFixtures {
		&self.loaded
	}

	/// Looks up a loaded set.
	pub fn fixture_set(&self, name: &str) -> Option<&Arc<FixtureSet>> {
		self.loaded.get(name)
	}

	/// Names of the loaded sets, sorted.
	pub fn set_names(&self) -> Vec<&str> {
		let mut names: Vec<&str> = self.loaded.keys().map(String::as_str).collect();
		names.sort_unstable();
		names
	}

	/// Accessor names with an associated set, sorted.
	pub fn accessor_names(&self) -> Vec<&str> {
		let mut names: Vec<&str> = self.accessors.keys().map(String::as_str).collect();
		names.sort_unstable();
		names
	}

	/// Returns true if no sets are loaded.
	pub fn is_empty(&self) -> bool {
		self.loaded.is_empty()
	}

	/// Number of materialized records held in the instance cache.
	pub fn cached_instance_count(&self) -> usize {
		self.instances.values().map(HashMap::len).sum()
	}

	/// Returns a handle bound to one set.
	pub fn accessor(&mut self, set: impl Into<String>) -> SetAccessor<'_> {
		SetAccessor {
			context: self,
			set: set.into(),
		}
	}

	async fn instance(
		&mut self,
		set: &str,
		name: &str,
		mode: FetchMode,
	) -> FixtureResult<Arc<Document>> {
		if mode == FetchMode::Reload {
			if let Some(cache) = self.instances.get_mut(set) {
				cache.remove(name);
			}
		}

		let fixture = self
			.loaded
			.get(set)
			.and_then(|fixtures| fixtures.get(name))
			.ok_or_else(|| FixtureError::not_found(set, name))?;

		if let Some(cached) = self.instances.get(set).and_then(|cache| cache.get(name)) {
			tracing::debug!(set, fixture = name, "Fixture served from cache");
			return Ok(Arc::clone(cached));
		}

		tracing::debug!(
			set,
			fixture = name,
			collection = fixture.collection(),
			"Fetching fixture"
		);
		let document = Arc::new(fixture.find(self.backend.as_ref()).await?);

		self.instances
			.entry(set.to_string())
			.or_default()
			.insert(name.to_string(), Arc::clone(&document));
		Ok(document)
	}
}

#[async_trait]
impl FixtureAccessor for FixtureContext {
	async fn get(&mut self, set: &str, names: &[&str], mode: FetchMode) -> FixtureResult<Fetched> {
		let mut documents = Vec::with_capacity(names.len());
		for name in names {
			documents.push(self.instance(set, name, mode).await?);
		}

		if names.len() == 1 {
			if let Some(document) = documents.pop() {
				return Ok(Fetched::One(document));
			}
		}
		Ok(Fetched::Many(documents))
	}

	fn resolve_accessor(&self, accessor: &str) -> Option<String> {
		self.accessors.get(accessor).cloned()
	}
}

/// Handle for reading fixtures of one set.
pub struct SetAccessor<'a> {
	context: &'a mut FixtureContext,
	set: String,
}

impl SetAccessor<'_> {
	/// Set this handle reads from.
	pub fn set_name(&self) -> &str {
		&self.set
	}

	/// Same as [`FixtureAccessor::get`] on the bound set.
	pub async fn get(&mut self, names: &[&str], mode: FetchMode) -> FixtureResult<Fetched> {
		self.context.get(&self.set, names, mode).await
	}

	/// Returns one cached (or freshly fetched) record.
	pub async fn one(&mut self, name: &str) -> FixtureResult<Arc<Document>> {
		self.context.instance(&self.set, name, FetchMode::Cached).await
	}

	/// Returns several records in request order.
	pub async fn many(&mut self, names: &[&str]) -> FixtureResult<Vec<Arc<Document>>> {
		let mut documents = Vec::with_capacity(names.len());
		for name in names {
			documents.push(self.context.instance(&self.set, name, FetchMode::Cached).await?);
		}
		Ok(documents)
	}

	/// Re-reads one record from the database and caches the result.
	pub async fn reload(&mut self, name: &str) -> FixtureResult<Arc<Document>> {
		self.context.instance(&self.set, name, FetchMode::Reload).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::backend::{InMemoryBackend, id_filter};
	use crate::fixtures::{BuildOptions, FixtureEntry, FixtureFile, FixtureFormat};
	use rstest::rstest;
	use serde_json::{Value, json};

	fn set(name: &str, entries: Value) -> FixtureSet {
		let Value::Object(entries) = entries else {
			panic!("expected object");
		};
		let entries = entries
			.into_iter()
			.map(|(label, attributes)| FixtureEntry {
				label,
				attributes: match attributes {
					Value::Object(map) => map,
					_ => Document::new(),
				},
			})
			.collect();
		FixtureSet::build(
			name,
			accessor_name(name),
			FixtureFile::from_entries(entries, FixtureFormat::Json),
			BuildOptions::default(),
		)
	}

	async fn context() -> (Arc<InMemoryBackend>, FixtureContext) {
		let backend = Arc::new(InMemoryBackend::new());
		let users = set(
			"users",
			json!({"alice": {"name": "Alice"}, "bob": {"name": "Bob"}}),
		);
		let admins = set("admins/users", json!({"root": {"name": "Root"}}));
		backend
			.insert_many(users.collection(), users.documents())
			.await
			.unwrap();
		backend
			.insert_many(admins.collection(), admins.documents())
			.await
			.unwrap();

		let loaded = LoadedFixtures::from([
			("users".to_string(), Arc::new(users)),
			("admins/users".to_string(), Arc::new(admins)),
		]);
		let ctx = FixtureContext::new(backend.clone(), loaded, &[]);
		(backend, ctx)
	}

	#[rstest]
	#[tokio::test]
	async fn test_get_single_returns_one() {
		let (_, mut ctx) = context().await;
		let fetched = ctx.get("users", &["alice"], FetchMode::Cached).await.unwrap();
		let alice = fetched.one().unwrap();
		assert_eq!(alice["name"], json!("Alice"));
	}

	#[rstest]
	#[tokio::test]
	async fn test_get_many_preserves_order() {
		let (_, mut ctx) = context().await;
		let fetched = ctx
			.get("users", &["bob", "alice"], FetchMode::Cached)
			.await
			.unwrap();
		assert!(matches!(fetched, Fetched::Many(_)));

		let names: Vec<Value> = fetched.into_vec().iter().map(|d| d["name"].clone()).collect();
		assert_eq!(names, vec![json!("Bob"), json!("Alice")]);
	}

	#[rstest]
	#[tokio::test]
	async fn test_get_no_names() {
		let (backend, mut ctx) = context().await;
		let fetched = ctx.get("users", &[], FetchMode::Cached).await.unwrap();
		assert_eq!(fetched, Fetched::Many(Vec::new()));
		assert!(fetched.is_empty());
		assert_eq!(backend.find_count(), 0);
	}

	#[rstest]
	#[tokio::test]
	async fn test_get_unknown_fixture() {
		let (_, mut ctx) = context().await;
		let err = ctx
			.get("users", &["alice", "mallory"], FetchMode::Cached)
			.await
			.unwrap_err();
		assert_eq!(
			err.to_string(),
			"No fixture named 'mallory' found for fixture set 'users'"
		);
	}

	#[rstest]
	#[tokio::test]
	async fn test_get_unknown_set() {
		let (_, mut ctx) = context().await;
		let result = ctx.get("comments", &["first"], FetchMode::Cached).await;
		assert!(matches!(
			result,
			Err(FixtureError::FixtureNotFound { ref set, .. }) if set == "comments"
		));
	}

	#[rstest]
	#[tokio::test]
	async fn test_cached_instance_is_identical() {
		let (backend, mut ctx) = context().await;
		let first = ctx.accessor("users").one("alice").await.unwrap();
		let second = ctx.accessor("users").one("alice").await.unwrap();

		assert!(Arc::ptr_eq(&first, &second));
		assert_eq!(backend.find_count(), 1);
		assert_eq!(ctx.cached_instance_count(), 1);
	}

	#[rstest]
	#[tokio::test]
	async fn test_reload_fetches_again() {
		let (backend, mut ctx) = context().await;
		let alice = ctx.accessor("users").one("alice").await.unwrap();
		let id = ctx.fixture_set("users").unwrap().get("alice").unwrap().id().to_string();

		let Value::Object(update) = json!({"name": "Alicia"}) else {
			unreachable!()
		};
		backend
			.update_one("users", id_filter(&id), update)
			.await
			.unwrap();

		let cached = ctx.accessor("users").one("alice").await.unwrap();
		assert_eq!(cached["name"], json!("Alice"));

		let reloaded = ctx
			.get("users", &["alice"], FetchMode::Reload)
			.await
			.unwrap()
			.one()
			.unwrap();
		assert_eq!(reloaded["name"], json!("Alicia"));
		assert!(!Arc::ptr_eq(&alice, &reloaded));
		assert_eq!(backend.find_count(), 2);

		let after = ctx.accessor("users").one("alice").await.unwrap();
		assert!(Arc::ptr_eq(&after, &reloaded));
	}

	#[rstest]
	#[tokio::test]
	async fn test_get_by_accessor() {
		let (_, mut ctx) = context().await;
		assert_eq!(ctx.resolve_accessor("admins_users").as_deref(), Some("admins/users"));

		let root = ctx
			.get_by_accessor("admins_users", &["root"], FetchMode::Cached)
			.await
			.unwrap()
			.one()
			.unwrap();
		assert_eq!(root["name"], json!("Root"));

		let result = ctx
			.get_by_accessor("nobody", &["root"], FetchMode::Cached)
			.await;
		assert!(matches!(result, Err(FixtureError::UnknownAccessor(_))));
	}

	#[rstest]
	#[tokio::test]
	async fn test_record_missing_from_database() {
		let (backend, mut ctx) = context().await;
		backend.clear();

		let result = ctx.accessor("users").one("bob").await;
		assert!(matches!(result, Err(FixtureError::RecordMissing { .. })));
		assert_eq!(ctx.cached_instance_count(), 0);
	}

	#[rstest]
	#[tokio::test]
	async fn test_set_accessor_many() {
		let (_, mut ctx) = context().await;
		let mut users = ctx.accessor("users");
		assert_eq!(users.set_name(), "users");

		let both = users.many(&["alice", "bob"]).await.unwrap();
		assert_eq!(both.len(), 2);
		let again = users.get(&["bob"], FetchMode::Cached).await.unwrap().one().unwrap();
		assert!(Arc::ptr_eq(&both[1], &again));
	}

	#[rstest]
	fn test_empty_context() {
		let ctx = FixtureContext::empty(Arc::new(InMemoryBackend::new()));
		assert!(ctx.is_empty());
		assert!(ctx.accessor_names().is_empty());
	}

	#[rstest]
	#[tokio::test]
	async fn test_merge_replaces_set_and_drops_instances() {
		let (_, mut ctx) = context().await;
		ctx.accessor("users").one("alice").await.unwrap();
		assert_eq!(ctx.cached_instance_count(), 1);

		let replacement = set("users", json!({"carol": {"name": "Carol"}}));
		ctx.merge(LoadedFixtures::from([("users".to_string(), Arc::new(replacement))]));

		assert_eq!(ctx.cached_instance_count(), 0);
		assert!(ctx.fixture_set("users").unwrap().contains("carol"));
		assert_eq!(ctx.accessor_names(), vec!["admins_users", "users"]);
	}

	#[rstest]
	#[tokio::test]
	async fn test_merge_same_set_keeps_instances() {
		let (_, mut ctx) = context().await;
		let alice = ctx.accessor("users").one("alice").await.unwrap();

		let same = Arc::clone(ctx.fixture_set("users").unwrap());
		ctx.merge(LoadedFixtures::from([("users".to_string(), same)]));

		assert_eq!(ctx.cached_instance_count(), 1);
		let again = ctx.accessor("users").one("alice").await.unwrap();
		assert!(Arc::ptr_eq(&alice, &again));
	}
}
