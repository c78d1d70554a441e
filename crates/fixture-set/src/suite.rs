//! Fixture lifecycle for a group of tests.
//!
//! A [`FixtureSuite`] holds what a test group declares (fixture path, set
//! names, collection overrides, load-once) and the fixtures it loaded. The
//! harness calls [`setup`](FixtureSuite::setup) before each test and
//! [`teardown`](FixtureSuite::teardown) after it:
//!
//! ```rust,ignore
//! let mut suite = FixtureSuite::new("tests/fixtures");
//! suite.fixtures(FixtureSelection::sets(["users", "admins/users"]))?;
//!
//! let mut ctx = suite.setup(backend.clone()).await?;
//! let alice = ctx.accessor("users").one("alice").await?;
//! suite.teardown(ctx);
//! ```
//!
//! Lifecycle: `Uninitialized -> Loaded -> (Reused)* -> Cleared -> ...`

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::backend::DocumentBackend;
use crate::config::FixtureConfig;
use crate::context::{FixtureContext, LoadedFixtures};
use crate::error::FixtureResult;
use crate::fixtures::{BuildOptions, FixtureLoader, discover_set_names};

/// Which fixture sets a suite declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixtureSelection {
	/// Every fixture file under the fixture path.
	All,

	/// No fixtures; setup loads nothing.
	None,

	/// The named sets.
	Sets(Vec<String>),
}

impl FixtureSelection {
	/// Builds a [`FixtureSelection::Sets`] from names.
	pub fn sets<I, S>(names: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self::Sets(names.into_iter().map(Into::into).collect())
	}
}

impl From<&[&str]> for FixtureSelection {
	fn from(names: &[&str]) -> Self {
		Self::sets(names.iter().copied())
	}
}

impl From<Vec<String>> for FixtureSelection {
	fn from(names: Vec<String>) -> Self {
		Self::Sets(names)
	}
}

/// Where a suite is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SuiteState {
	/// Nothing loaded yet.
	#[default]
	Uninitialized,

	/// Fixtures were loaded by the latest setup.
	Loaded,

	/// The latest setup reused previously loaded fixtures.
	Reused,

	/// Teardown ran after the latest setup.
	Cleared,
}

/// Declared fixtures and cached state for a group of tests.
#[derive(Debug)]
pub struct FixtureSuite {
	fixture_path: PathBuf,
	set_names: Vec<String>,
	collections: HashMap<String, String>,
	load_fixtures_once: bool,
	no_fixtures: bool,
	cached_fixtures: Option<LoadedFixtures>,
	loader: FixtureLoader,
	state: SuiteState,
	load_count: usize,
}

impl FixtureSuite {
	/// Creates a suite reading fixtures from `fixture_path`.
	pub fn new(fixture_path: impl Into<PathBuf>) -> Self {
		Self::from_config(FixtureConfig::new(fixture_path))
	}

	/// Creates a suite from configuration.
	pub fn from_config(config: FixtureConfig) -> Self {
		Self {
			fixture_path: config.fixture_path,
			set_names: Vec::new(),
			collections: config.collections,
			load_fixtures_once: config.load_fixtures_once,
			no_fixtures: false,
			cached_fixtures: None,
			loader: FixtureLoader::with_options(BuildOptions {
				timestamps: config.timestamps,
			}),
			state: SuiteState::Uninitialized,
			load_count: 0,
		}
	}

	/// Declares fixture sets.
	///
	/// Names are merged into the declared list, keeping first-seen order.
	/// [`FixtureSelection::All`] declares every file under the fixture path;
	/// [`FixtureSelection::None`] turns loading off.
	pub fn fixtures(&mut self, selection: impl Into<FixtureSelection>) -> FixtureResult<&mut Self> {
		let names = match selection.into() {
			FixtureSelection::All => discover_set_names(&self.fixture_path)?,
			FixtureSelection::None => {
				self.no_fixtures = true;
				Vec::new()
			}
			FixtureSelection::Sets(names) => names,
		};

		for name in names {
			if !self.set_names.contains(&name) {
				self.set_names.push(name);
			}
		}
		Ok(self)
	}

	/// Loads `set` into `collection` instead of its default collection.
	pub fn set_fixture_collection(
		&mut self,
		set: impl Into<String>,
		collection: impl Into<String>,
	) -> &mut Self {
		self.collections.insert(set.into(), collection.into());
		self
	}

	/// Merges several set to collection overrides.
	pub fn set_fixture_collections<I, K, V>(&mut self, overrides: I) -> &mut Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		for (set, collection) in overrides {
			self.set_fixture_collection(set, collection);
		}
		self
	}

	/// Sets whether loaded fixtures are reused across tests.
	pub fn load_fixtures_once(&mut self, load_once: bool) -> &mut Self {
		self.load_fixtures_once = load_once;
		self
	}

	/// Fixture directory.
	pub fn fixture_path(&self) -> &Path {
		&self.fixture_path
	}

	/// Declared set names in declaration order.
	pub fn fixture_set_names(&self) -> &[String] {
		&self.set_names
	}

	/// Returns true if [`FixtureSelection::None`] was declared.
	pub fn no_fixtures(&self) -> bool {
		self.no_fixtures
	}

	/// Returns true if load-once mode is on.
	pub fn is_load_once(&self) -> bool {
		self.load_fixtures_once
	}

	/// Fixtures kept from the last load, if any.
	pub fn cached_fixtures(&self) -> Option<&LoadedFixtures> {
		self.cached_fixtures.as_ref()
	}

	/// Current lifecycle state.
	pub fn state(&self) -> SuiteState {
		self.state
	}

	/// Number of full fixture loads performed by setup.
	pub fn load_count(&self) -> usize {
		self.load_count
	}

	/// The loader that writes sets into the database.
	pub fn loader(&self) -> &FixtureLoader {
		&self.loader
	}

	/// Prepares fixtures for one test.
	///
	/// With no fixtures declared via [`FixtureSelection::None`], returns an
	/// empty context. In load-once mode a previous load is reused. Otherwise
	/// the loader cache is reset and every declared set (or every file, when
	/// nothing is declared) is created.
	pub async fn setup(&mut self, backend: Arc<dyn DocumentBackend>) -> FixtureResult<FixtureContext> {
		if self.no_fixtures {
			tracing::debug!("Fixture loading disabled for this suite");
			return Ok(FixtureContext::empty(backend));
		}

		if self.load_fixtures_once {
			if let Some(cached) = &self.cached_fixtures {
				tracing::debug!(sets = cached.len(), "Reusing loaded fixtures");
				self.state = SuiteState::Reused;
				return Ok(FixtureContext::new(backend, cached.clone(), &self.set_names));
			}
		}

		self.loader.reset_cache();
		let loaded = self.load_fixtures(backend.as_ref()).await?;
		tracing::info!(
			path = %self.fixture_path.display(),
			sets = loaded.len(),
			"Loaded fixtures"
		);

		self.cached_fixtures = Some(loaded.clone());
		self.state = SuiteState::Loaded;
		self.load_count += 1;
		Ok(FixtureContext::new(backend, loaded, &self.set_names))
	}

	/// Finishes a test: resets the loader cache and drops the context.
	///
	/// Fixtures kept for load-once mode survive.
	pub fn teardown(&mut self, context: FixtureContext) {
		tracing::debug!(
			instances = context.cached_instance_count(),
			"Tearing down fixtures"
		);
		drop(context);
		self.loader.reset_cache();
		self.state = SuiteState::Cleared;
	}

	/// Loads additional sets into a running test.
	///
	/// Only `set_names` are created (sets still in the loader cache are not
	/// written again); they are merged into `context` and into the suite's
	/// cached fixtures. The declared set list is left unchanged.
	pub async fn hotload<I, S>(
		&mut self,
		context: &mut FixtureContext,
		set_names: I,
	) -> FixtureResult<()>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let set_names: Vec<String> = set_names.into_iter().map(Into::into).collect();
		let backend = Arc::clone(context.backend());
		let sets = self
			.loader
			.create_fixtures(
				backend.as_ref(),
				&self.fixture_path,
				&set_names,
				&self.collections,
			)
			.await?;

		tracing::info!(sets = ?set_names, "Hotloaded fixtures");
		context.declare(&set_names);
		context.merge(
			sets.into_iter()
				.map(|set| (set.name().to_string(), set))
				.collect(),
		);
		self.cached_fixtures = Some(context.loaded_fixtures().clone());
		Ok(())
	}

	async fn load_fixtures(&mut self, backend: &dyn DocumentBackend) -> FixtureResult<LoadedFixtures> {
		if self.set_names.is_empty() {
			self.fixtures(FixtureSelection::All)?;
		}

		let sets = self
			.loader
			.create_fixtures(backend, &self.fixture_path, &self.set_names, &self.collections)
			.await?;

		Ok(sets
			.into_iter()
			.map(|set| (set.name().to_string(), set))
			.collect())
	}
}
