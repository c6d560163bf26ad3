//! Router facade.

use crate::error::{RouterError, TransitionError};
use crate::history::{HistoryAdapter, MemoryHistory, PushOptions};
use crate::options::{RouterOption, RouterOptions};
use crate::registry::{
	GuardResult, LifecycleEvent, ListenerId, Registry, RouteComponent, TransitionMiddleware,
};
use crate::transition::token::{InFlight, TransitionToken};
use crate::transition::{CancelHandle, HistoryMode, NavigationOptions, Transition, pipeline};
use futures::FutureExt;
use parking_lot::RwLock;
use sentier_routes::{MatchOptions, Params, RouteTree, RouterState};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, warn};

/// Shared router state.
pub(crate) struct RouterInner {
	pub(crate) tree: Arc<RouteTree>,
	pub(crate) options: RwLock<RouterOptions>,
	pub(crate) state: RwLock<Option<RouterState>>,
	pub(crate) started: AtomicBool,
	pub(crate) registry: Registry,
	pub(crate) in_flight: InFlight,
	pub(crate) history: Arc<dyn HistoryAdapter>,
}

/// A client-side router.
///
/// Cloning is cheap and every clone drives the same router. Each router
/// owns its own state and registries.
///
/// # Example
///
/// ```
/// use sentier_router::{NavigationOptions, Router};
/// use sentier_routes::{Route, RouteTree, params};
///
/// # futures::executor::block_on(async {
/// let tree = RouteTree::builder()
///     .route(Route::new("home", "/home"))
///     .route(Route::new("users", "/users").child(Route::new("view", "/view/{id}")))
///     .build()
///     .unwrap();
/// let router = Router::new(tree);
///
/// router.start().unwrap().await.unwrap();
/// let state = router
///     .navigate("users.view", params! { "id" => 1 }, NavigationOptions::default())
///     .unwrap()
///     .await
///     .unwrap();
///
/// assert_eq!(state.path, "/users/view/1");
/// assert!(router.is_active("users", &params! {}, false));
/// # });
/// ```
#[derive(Clone)]
pub struct Router {
	inner: Arc<RouterInner>,
}

impl Router {
	/// Creates a router over `tree` backed by an in-memory history at `/`.
	pub fn new(tree: RouteTree) -> Self {
		Self::with_history(tree, Arc::new(MemoryHistory::default()))
	}

	/// Creates a router over `tree` using `history` as the platform adapter.
	pub fn with_history(tree: RouteTree, history: Arc<dyn HistoryAdapter>) -> Self {
		let tree = Arc::new(tree);
		Self {
			inner: Arc::new(RouterInner {
				registry: Registry::new(Arc::clone(&tree)),
				tree,
				options: RwLock::new(RouterOptions::default()),
				state: RwLock::new(None),
				started: AtomicBool::new(false),
				in_flight: InFlight::default(),
				history,
			}),
		}
	}

	/// Replaces the options.
	pub fn with_options(self, options: RouterOptions) -> Self {
		*self.inner.options.write() = options;
		self
	}

	pub fn tree(&self) -> &RouteTree {
		&self.inner.tree
	}

	pub fn registry(&self) -> &Registry {
		&self.inner.registry
	}

	pub fn history(&self) -> Arc<dyn HistoryAdapter> {
		Arc::clone(&self.inner.history)
	}

	/// Returns the current state.
	pub fn state(&self) -> Option<RouterState> {
		self.inner.state.read().clone()
	}

	pub fn is_started(&self) -> bool {
		self.inner.started.load(Ordering::SeqCst)
	}

	pub fn options(&self) -> RouterOptions {
		self.inner.options.read().clone()
	}

	pub fn set_option(&self, option: RouterOption) {
		debug!(?option, "Router option changed");
		self.inner.options.write().apply(option);
	}

	/// Builds the path of a route.
	pub fn build_path(&self, name: &str, params: &Params) -> Result<String, RouterError> {
		Ok(self.inner.tree.build_path(name, params)?)
	}

	/// Matches a path using the router's trailing slash option.
	pub fn match_path(&self, path: &str) -> Option<RouterState> {
		let strict_trailing_slash = self.inner.options.read().strict_trailing_slash;
		self.inner.tree.match_path_with(path, MatchOptions {
			strict_trailing_slash,
		})
	}

	fn default_state(&self) -> Result<Option<RouterState>, RouterError> {
		let options = self.options();
		let Some(name) = options.default_route else {
			return Ok(None);
		};
		if !self.inner.tree.contains(&name) {
			return Err(RouterError::DefaultRouteNotFound(name));
		}
		let path = self.inner.tree.build_path(&name, &options.default_params)?;
		Ok(Some(RouterState::new(name, options.default_params, path)))
	}

	/// Starts the router from the adapter's current path.
	///
	/// The matched route is entered, replacing the current history entry. If
	/// nothing matches, or entering the match fails, the default route is
	/// used instead. Without a default route an unmatched path resolves to
	/// `Ok(None)` and a failed match resolves to its error.
	///
	/// # Errors
	///
	/// Returns [`RouterError::DefaultRouteNotFound`] when the configured
	/// default route is not in the tree. A router that is already started
	/// returns a transition resolving to [`TransitionError::AlreadyStarted`]
	/// without looking at the options.
	pub fn start(&self) -> Result<Transition<Option<RouterState>>, RouterError> {
		if self.inner.started.swap(true, Ordering::SeqCst) {
			debug!("Router already started");
			return Ok(Transition::ready(Err(TransitionError::AlreadyStarted)));
		}

		let default = match self.default_state() {
			Ok(default) => default,
			Err(error) => {
				self.inner.started.store(false, Ordering::SeqCst);
				return Err(error);
			}
		};

		let path = self.inner.history.current_path();
		let matched = self.match_path(&path);
		debug!(
			%path,
			matched = matched.as_ref().map(|s| s.name.as_str()),
			"Router starting"
		);

		let token = self.inner.in_flight.begin();
		let handle = CancelHandle::new(&token);
		let inner = Arc::clone(&self.inner);
		let future = async move {
			let result = start_from(&inner, &token, matched, default).await;
			inner.in_flight.finish(&token);
			result
		};
		Ok(Transition::new(handle, future.boxed()))
	}

	/// Starts the router in `state` without running guards or listeners.
	pub fn start_with_state(&self, state: RouterState) -> Transition<Option<RouterState>> {
		if self.inner.started.swap(true, Ordering::SeqCst) {
			debug!("Router already started");
			return Transition::ready(Err(TransitionError::AlreadyStarted));
		}

		*self.inner.state.write() = Some(state.clone());
		self.inner
			.history
			.push_path(&state.path, PushOptions { replace: true });
		debug!(route = %state.name, "Router started with explicit state");
		Transition::ready(Ok(Some(state)))
	}

	/// Stops the router and cancels the in-flight transition.
	///
	/// Stopping a stopped router does nothing.
	pub fn stop(&self) {
		if self.inner.started.swap(false, Ordering::SeqCst) {
			self.inner.in_flight.cancel_current();
			debug!("Router stopped");
		}
	}

	/// Navigates to the route `name`.
	///
	/// # Errors
	///
	/// Returns an error when `name` is unknown or a path parameter is
	/// missing. A stopped router returns a transition that resolves to
	/// [`TransitionError::NotStarted`].
	///
	/// Navigating to the current state without `reload` resolves at once and
	/// leaves the in-flight transition running.
	pub fn navigate(
		&self,
		name: &str,
		params: Params,
		options: NavigationOptions,
	) -> Result<Transition, RouterError> {
		let path = self.inner.tree.build_path(name, &params)?;

		if !self.is_started() {
			debug!(route = name, "Navigation ignored, router is not started");
			return Ok(Transition::ready(Err(TransitionError::NotStarted)));
		}

		let to = RouterState::new(name, params, path);
		if !options.reload
			&& let Some(current) = self.state()
			&& current.equivalent(&to)
		{
			debug!(route = name, "Already in the target state, transition skipped");
			return Ok(Transition::ready(Ok(current)));
		}

		let mode = if options.replace {
			HistoryMode::Replace
		} else {
			HistoryMode::Push
		};
		Ok(self.transition(to, options, mode))
	}

	fn transition(
		&self,
		to: RouterState,
		options: NavigationOptions,
		mode: HistoryMode,
	) -> Transition {
		let token = self.inner.in_flight.begin();
		let handle = CancelHandle::new(&token);
		let inner = Arc::clone(&self.inner);
		let future = async move {
			let result = pipeline::run(&inner, &token, to, options, mode).await;
			inner.in_flight.finish(&token);
			result
		};
		Transition::new(handle, future.boxed())
	}

	/// Answers a back/forward navigation made outside the router.
	///
	/// `state` is the state stored with the history entry, if any; otherwise
	/// the adapter's current path is matched. Returns `None` when the event
	/// is discarded: the router is stopped, the target equals the current
	/// state, or nothing matches and there is no default route.
	///
	/// If the transition fails for any reason other than cancellation, the
	/// previous path is pushed back onto the adapter.
	pub fn handle_pop_state(&self, state: Option<RouterState>) -> Option<Transition> {
		if !self.is_started() {
			return None;
		}

		let target = state.or_else(|| self.match_path(&self.inner.history.current_path()));
		let Some(target) = target else {
			return match self.default_state() {
				Ok(Some(default)) => Some(self.transition(
					default,
					NavigationOptions {
						reload: true,
						replace: true,
					},
					HistoryMode::Replace,
				)),
				Ok(None) => None,
				Err(error) => {
					warn!(%error, "Cannot fall back to the default route");
					None
				}
			};
		};

		let from = self.state();
		if from.as_ref().is_some_and(|current| current.equivalent(&target)) {
			debug!(route = %target.name, "Pop state discarded, already there");
			return None;
		}

		let token = self.inner.in_flight.begin();
		let handle = CancelHandle::new(&token);
		let inner = Arc::clone(&self.inner);
		let future = async move {
			let result = pipeline::run(
				&inner,
				&token,
				target,
				NavigationOptions::default(),
				HistoryMode::Keep,
			)
			.await;
			inner.in_flight.finish(&token);
			if let Err(error) = &result
				&& *error != TransitionError::Cancelled
				&& let Some(from) = &from
			{
				debug!(path = %from.path, "Restoring previous path");
				inner
					.history
					.push_path(&from.path, PushOptions { replace: false });
			}
			result
		};
		Some(Transition::new(handle, future.boxed()))
	}

	/// Returns true when the route `name` with `params` is active.
	///
	/// With `strict`, or when `name` is the current route, the current state
	/// must have exactly that name and params. Otherwise the current route
	/// must be a descendant of `name` and `params` a subset of its params.
	pub fn is_active(&self, name: &str, params: &Params, strict: bool) -> bool {
		let Some(state) = self.state() else {
			return false;
		};
		if strict || state.name == name {
			state.name == name && state.params == *params
		} else {
			state.is_descendant_of(name) && params.is_subset_of(&state.params)
		}
	}

	// Registry

	/// Registers the component for route `name`.
	pub fn register_component<C>(&self, name: &str, component: C)
	where
		C: RouteComponent + 'static,
	{
		self.inner
			.registry
			.register_component(name, Arc::new(component));
	}

	pub fn deregister_component(&self, name: &str) {
		self.inner.registry.deregister_component(name);
	}

	/// Attaches an activation guard to route `name` without a component.
	pub fn can_activate<F>(&self, name: &str, guard: F)
	where
		F: Fn(&RouterState, Option<&RouterState>) -> GuardResult + Send + Sync + 'static,
	{
		self.inner
			.registry
			.set_activation_guard(name, Arc::new(guard));
	}

	/// Adds a listener fired after every committed transition.
	pub fn add_listener<F>(&self, listener: F) -> ListenerId
	where
		F: Fn(&RouterState, Option<&RouterState>) + Send + Sync + 'static,
	{
		self.inner.registry.add_listener(Arc::new(listener))
	}

	pub fn remove_listener(&self, id: ListenerId) {
		self.inner.registry.remove_listener(id);
	}

	/// Adds a listener on node `name`, fired when the node is entered or
	/// left or is the deepest node kept by a transition.
	pub fn add_node_listener<F>(&self, name: &str, listener: F) -> ListenerId
	where
		F: Fn(&RouterState, Option<&RouterState>) -> bool + Send + Sync + 'static,
	{
		self.inner
			.registry
			.add_node_listener(name, Arc::new(listener))
	}

	pub fn remove_node_listener(&self, name: &str, id: ListenerId) {
		self.inner.registry.remove_node_listener(name, id);
	}

	/// Adds a listener fired when route `name` or a descendant is entered
	/// or left.
	pub fn add_route_listener<F>(&self, name: &str, listener: F) -> ListenerId
	where
		F: Fn(&RouterState, Option<&RouterState>) + Send + Sync + 'static,
	{
		self.inner
			.registry
			.add_route_listener(name, Arc::new(listener))
	}

	pub fn remove_route_listener(&self, name: &str, id: ListenerId) {
		self.inner.registry.remove_route_listener(name, id);
	}

	pub fn on_transition_start<F>(&self, callback: F) -> ListenerId
	where
		F: Fn(&RouterState, Option<&RouterState>) + Send + Sync + 'static,
	{
		self.inner.registry.on_transition_start(Arc::new(callback))
	}

	pub fn off_transition_start(&self, id: ListenerId) {
		self.inner.registry.off_transition_start(id);
	}

	/// Adds a transition middleware.
	pub fn on_transition<M>(&self, middleware: M) -> ListenerId
	where
		M: TransitionMiddleware + 'static,
	{
		self.inner.registry.add_middleware(Arc::new(middleware))
	}

	pub fn off_transition(&self, id: ListenerId) {
		self.inner.registry.remove_middleware(id);
	}

	pub fn on_transition_error<F>(&self, callback: F) -> ListenerId
	where
		F: Fn(&RouterState, Option<&RouterState>, &TransitionError) + Send + Sync + 'static,
	{
		self.inner.registry.on_transition_error(Arc::new(callback))
	}

	pub fn off_transition_error(&self, id: ListenerId) {
		self.inner.registry.off_transition_error(id);
	}

	pub fn on_transition_cancel<F>(&self, callback: F) -> ListenerId
	where
		F: Fn(&RouterState, Option<&RouterState>) + Send + Sync + 'static,
	{
		self.inner.registry.on_transition_cancel(Arc::new(callback))
	}

	pub fn off_transition_cancel(&self, id: ListenerId) {
		self.inner.registry.off_transition_cancel(id);
	}

	pub fn callback_count(&self, event: LifecycleEvent) -> usize {
		self.inner.registry.callback_count(event)
	}

	pub fn middleware_count(&self) -> usize {
		self.inner.registry.middleware_count()
	}

	pub fn component_count(&self) -> usize {
		self.inner.registry.component_count()
	}
}

impl fmt::Debug for Router {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Router")
			.field("started", &self.is_started())
			.field("state", &self.state())
			.field("options", &self.options())
			.finish_non_exhaustive()
	}
}

/// Start sequence: matched route, then the default route.
async fn start_from(
	inner: &RouterInner,
	token: &Arc<TransitionToken>,
	matched: Option<RouterState>,
	default: Option<RouterState>,
) -> Result<Option<RouterState>, TransitionError> {
	let options = NavigationOptions::replace();

	let Some(matched) = matched else {
		return match default {
			Some(default) => pipeline::run(inner, token, default, options, HistoryMode::Replace)
				.await
				.map(Some),
			None => Ok(None),
		};
	};

	match pipeline::run(inner, token, matched, options, HistoryMode::Replace).await {
		Ok(state) => Ok(Some(state)),
		Err(TransitionError::Cancelled) => Err(TransitionError::Cancelled),
		Err(error) => match default {
			Some(default) => {
				debug!(route = %default.name, %error, "Falling back to the default route");
				pipeline::run(inner, token, default, options, HistoryMode::Replace)
					.await
					.map(Some)
			}
			None => Err(error),
		},
	}
}
