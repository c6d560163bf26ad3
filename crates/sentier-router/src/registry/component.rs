//! Route components and activation guards.

use futures::FutureExt;
use futures::future::BoxFuture;
use sentier_routes::RouterState;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Outcome of a guard: an immediate answer or one still being computed.
pub enum GuardResult {
	/// The guard answered synchronously.
	Ready(bool),
	/// The guard answers when the future resolves.
	Pending(BoxFuture<'static, bool>),
}

impl GuardResult {
	/// Wraps a future as a pending guard result.
	pub fn pending<F>(future: F) -> Self
	where
		F: Future<Output = bool> + Send + 'static,
	{
		Self::Pending(future.boxed())
	}

	/// Wraps a fallible future; an error counts as a refusal.
	pub fn from_result<F, E>(future: F) -> Self
	where
		F: Future<Output = Result<bool, E>> + Send + 'static,
		E: Send + 'static,
	{
		Self::Pending(future.map(|result| result.unwrap_or(false)).boxed())
	}
}

impl From<bool> for GuardResult {
	fn from(allowed: bool) -> Self {
		Self::Ready(allowed)
	}
}

impl fmt::Debug for GuardResult {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Ready(allowed) => f.debug_tuple("Ready").field(allowed).finish(),
			Self::Pending(_) => f.write_str("Pending(..)"),
		}
	}
}

/// Guard function signature: `(to, from) -> GuardResult`.
pub type GuardFn = Arc<dyn Fn(&RouterState, Option<&RouterState>) -> GuardResult + Send + Sync>;

/// Capabilities a route exposes to the transition engine.
///
/// Both guards default to permitting the transition.
pub trait RouteComponent: Send + Sync {
	/// Whether the route may be entered.
	fn can_activate(&self, to: &RouterState, from: Option<&RouterState>) -> GuardResult {
		let _ = (to, from);
		GuardResult::Ready(true)
	}

	/// Whether the route may be left.
	fn can_deactivate(&self, to: &RouterState, from: Option<&RouterState>) -> GuardResult {
		let _ = (to, from);
		GuardResult::Ready(true)
	}
}

/// A [`RouteComponent`] assembled from closures.
///
/// ```
/// use sentier_router::{Component, GuardResult};
///
/// let component = Component::new()
///     .with_can_deactivate(|_, _| GuardResult::pending(async { false }));
/// ```
#[derive(Clone, Default)]
pub struct Component {
	can_activate: Option<GuardFn>,
	can_deactivate: Option<GuardFn>,
}

impl Component {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_can_activate<F>(mut self, guard: F) -> Self
	where
		F: Fn(&RouterState, Option<&RouterState>) -> GuardResult + Send + Sync + 'static,
	{
		self.can_activate = Some(Arc::new(guard));
		self
	}

	pub fn with_can_deactivate<F>(mut self, guard: F) -> Self
	where
		F: Fn(&RouterState, Option<&RouterState>) -> GuardResult + Send + Sync + 'static,
	{
		self.can_deactivate = Some(Arc::new(guard));
		self
	}
}

impl RouteComponent for Component {
	fn can_activate(&self, to: &RouterState, from: Option<&RouterState>) -> GuardResult {
		match &self.can_activate {
			Some(guard) => guard(to, from),
			None => GuardResult::Ready(true),
		}
	}

	fn can_deactivate(&self, to: &RouterState, from: Option<&RouterState>) -> GuardResult {
		match &self.can_deactivate {
			Some(guard) => guard(to, from),
			None => GuardResult::Ready(true),
		}
	}
}

impl fmt::Debug for Component {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Component")
			.field("can_activate", &self.can_activate.is_some())
			.field("can_deactivate", &self.can_deactivate.is_some())
			.finish()
	}
}
