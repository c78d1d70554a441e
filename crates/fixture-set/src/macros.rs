//! Named fixture accessors.

/// Generates a trait with one accessor method per fixture set.
///
/// Each method takes the fixture names and a [`FetchMode`](crate::context::FetchMode)
/// and forwards to [`FixtureAccessor::get`](crate::context::FixtureAccessor::get).
/// The trait is implemented for every `FixtureAccessor`. By convention the
/// method is named after the set's accessor name (`admins/users` becomes
/// `admins_users`).
///
/// # Example
///
/// ```rust,ignore
/// fixture_set::fixture_accessors! {
///     pub trait BlogFixtures {
///         users => "users",
///         admins_users => "admins/users",
///     }
/// }
///
/// let alice = ctx.users(&["alice"], FetchMode::Cached).await?.one();
/// let admins = ctx.admins_users(&["root", "ops"], FetchMode::Reload).await?;
/// ```
#[macro_export]
macro_rules! fixture_accessors {
	(
		$(#[$meta:meta])*
		$vis:vis trait $trait_name:ident {
			$( $accessor:ident => $set:literal ),* $(,)?
		}
	) => {
		$(#[$meta])*
		#[allow(async_fn_in_trait)]
		$vis trait $trait_name: $crate::context::FixtureAccessor {
			$(
				#[doc = concat!("Fixtures of the `", $set, "` set.")]
				async fn $accessor(
					&mut self,
					names: &[&str],
					mode: $crate::context::FetchMode,
				) -> $crate::error::FixtureResult<$crate::context::Fetched> {
					$crate::context::FixtureAccessor::get(self, $set, names, mode).await
				}
			)*
		}

		impl<T: $crate::context::FixtureAccessor> $trait_name for T {}
	};
}
