//! Guard and listener registry.
//!
//! One registry belongs to one router. It owns the per-route components and
//! activation guards consulted by the transition engine, plus every listener
//! and lifecycle callback notified when a transition ends. Route names are
//! resolved to [`NodeId`]s once, at registration.

pub mod component;
pub mod listeners;
pub mod middleware;

pub use component::{Component, GuardFn, GuardResult, RouteComponent};
pub use listeners::{
	ErrorCallback, LifecycleEvent, Listener, ListenerId, NodeListener, TransitionCallback,
};
pub use middleware::{FnMiddleware, TransitionMiddleware, middleware_fn};

use crate::error::TransitionError;
use listeners::{CallbackList, NodeCallbacks};
use parking_lot::RwLock;
use sentier_routes::{NodeId, RouteTree, RouterState};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Registry of guards, listeners and middleware for one router.
pub struct Registry {
	tree: Arc<RouteTree>,
	next_id: AtomicU64,
	components: RwLock<HashMap<NodeId, Arc<dyn RouteComponent>>>,
	activation_guards: RwLock<HashMap<NodeId, GuardFn>>,
	listeners: CallbackList<dyn Fn(&RouterState, Option<&RouterState>) + Send + Sync>,
	node_listeners: NodeCallbacks<dyn Fn(&RouterState, Option<&RouterState>) -> bool + Send + Sync>,
	route_listeners: NodeCallbacks<dyn Fn(&RouterState, Option<&RouterState>) + Send + Sync>,
	start_callbacks: CallbackList<dyn Fn(&RouterState, Option<&RouterState>) + Send + Sync>,
	cancel_callbacks: CallbackList<dyn Fn(&RouterState, Option<&RouterState>) + Send + Sync>,
	error_callbacks:
		CallbackList<dyn Fn(&RouterState, Option<&RouterState>, &TransitionError) + Send + Sync>,
	middleware: CallbackList<dyn TransitionMiddleware>,
}

impl Registry {
	/// Creates an empty registry for `tree`.
	pub fn new(tree: Arc<RouteTree>) -> Self {
		Self {
			tree,
			next_id: AtomicU64::new(1),
			components: RwLock::new(HashMap::new()),
			activation_guards: RwLock::new(HashMap::new()),
			listeners: CallbackList::new(),
			node_listeners: NodeCallbacks::new(),
			route_listeners: NodeCallbacks::new(),
			start_callbacks: CallbackList::new(),
			cancel_callbacks: CallbackList::new(),
			error_callbacks: CallbackList::new(),
			middleware: CallbackList::new(),
		}
	}

	fn next_id(&self) -> ListenerId {
		ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed))
	}

	// Components and guards

	/// Registers `component` for the route `name`.
	///
	/// A second registration for the same route replaces the first and logs
	/// a warning. An unknown route name logs a warning and stores nothing.
	pub fn register_component(&self, name: &str, component: Arc<dyn RouteComponent>) {
		let Some(node) = self.tree.lookup(name) else {
			tracing::warn!(route = name, "Component registered for unknown route, ignoring");
			return;
		};
		let previous = self.components.write().insert(node, component);
		if previous.is_some() {
			tracing::warn!(
				route = name,
				"A component is already registered for this route, replacing it"
			);
		}
	}

	/// Removes the component for `name`. Unknown or unregistered names are a no-op.
	pub fn deregister_component(&self, name: &str) {
		if let Some(node) = self.tree.lookup(name) {
			self.components.write().remove(&node);
		}
	}

	pub fn component_count(&self) -> usize {
		self.components.read().len()
	}

	pub(crate) fn component(&self, node: NodeId) -> Option<Arc<dyn RouteComponent>> {
		self.components.read().get(&node).cloned()
	}

	/// Attaches a standalone activation guard to the route `name`.
	pub fn set_activation_guard(&self, name: &str, guard: GuardFn) {
		let Some(node) = self.tree.lookup(name) else {
			tracing::warn!(route = name, "Activation guard registered for unknown route, ignoring");
			return;
		};
		self.activation_guards.write().insert(node, guard);
	}

	pub(crate) fn activation_guard(&self, node: NodeId) -> Option<GuardFn> {
		self.activation_guards.read().get(&node).cloned()
	}

	// Listeners

	pub fn add_listener(&self, listener: Listener) -> ListenerId {
		let id = self.next_id();
		self.listeners.push(id, listener);
		id
	}

	pub fn remove_listener(&self, id: ListenerId) {
		self.listeners.remove(id);
	}

	pub fn listener_count(&self) -> usize {
		self.listeners.len()
	}

	/// Adds a listener for the node `name` (the root is `""`).
	///
	/// An unknown name logs a warning; the returned id is valid but the
	/// listener never fires.
	pub fn add_node_listener(&self, name: &str, listener: NodeListener) -> ListenerId {
		let id = self.next_id();
		match self.tree.lookup(name) {
			Some(node) => self.node_listeners.push(node, id, listener),
			None => tracing::warn!(
				route = name,
				"Node listener added for unknown route, it will never fire"
			),
		}
		id
	}

	pub fn remove_node_listener(&self, name: &str, id: ListenerId) {
		if let Some(node) = self.tree.lookup(name) {
			self.node_listeners.remove(node, id);
		}
	}

	/// Adds a listener fired when `name` or one of its descendants is
	/// entered or left.
	pub fn add_route_listener(&self, name: &str, listener: Listener) -> ListenerId {
		let id = self.next_id();
		match self.tree.lookup(name) {
			Some(node) => self.route_listeners.push(node, id, listener),
			None => tracing::warn!(
				route = name,
				"Route listener added for unknown route, it will never fire"
			),
		}
		id
	}

	pub fn remove_route_listener(&self, name: &str, id: ListenerId) {
		if let Some(node) = self.tree.lookup(name) {
			self.route_listeners.remove(node, id);
		}
	}

	/// Number of node listeners on `name`.
	pub fn node_listener_count(&self, name: &str) -> usize {
		self.tree
			.lookup(name)
			.map_or(0, |node| self.node_listeners.len(node))
	}

	/// Number of route listeners on `name`.
	pub fn route_listener_count(&self, name: &str) -> usize {
		self.tree
			.lookup(name)
			.map_or(0, |node| self.route_listeners.len(node))
	}

	// Lifecycle callbacks

	pub fn on_transition_start(&self, callback: TransitionCallback) -> ListenerId {
		let id = self.next_id();
		self.start_callbacks.push(id, callback);
		id
	}

	pub fn off_transition_start(&self, id: ListenerId) {
		self.start_callbacks.remove(id);
	}

	pub fn on_transition_cancel(&self, callback: TransitionCallback) -> ListenerId {
		let id = self.next_id();
		self.cancel_callbacks.push(id, callback);
		id
	}

	pub fn off_transition_cancel(&self, id: ListenerId) {
		self.cancel_callbacks.remove(id);
	}

	pub fn on_transition_error(&self, callback: ErrorCallback) -> ListenerId {
		let id = self.next_id();
		self.error_callbacks.push(id, callback);
		id
	}

	pub fn off_transition_error(&self, id: ListenerId) {
		self.error_callbacks.remove(id);
	}

	/// Number of callbacks registered for `event`.
	pub fn callback_count(&self, event: LifecycleEvent) -> usize {
		match event {
			LifecycleEvent::Start => self.start_callbacks.len(),
			LifecycleEvent::Error => self.error_callbacks.len(),
			LifecycleEvent::Cancel => self.cancel_callbacks.len(),
		}
	}

	// Middleware

	pub fn add_middleware(&self, middleware: Arc<dyn TransitionMiddleware>) -> ListenerId {
		let id = self.next_id();
		self.middleware.push(id, middleware);
		id
	}

	pub fn remove_middleware(&self, id: ListenerId) {
		self.middleware.remove(id);
	}

	pub fn middleware_count(&self) -> usize {
		self.middleware.len()
	}

	pub(crate) fn middleware(&self) -> Vec<Arc<dyn TransitionMiddleware>> {
		self.middleware.snapshot()
	}

	// Dispatch

	pub(crate) fn emit_start(&self, to: &RouterState, from: Option<&RouterState>) {
		for callback in self.start_callbacks.snapshot() {
			callback(to, from);
		}
	}

	pub(crate) fn emit_cancel(&self, to: &RouterState, from: Option<&RouterState>) {
		for callback in self.cancel_callbacks.snapshot() {
			callback(to, from);
		}
	}

	pub(crate) fn emit_error(
		&self,
		to: &RouterState,
		from: Option<&RouterState>,
		error: &TransitionError,
	) {
		for callback in self.error_callbacks.snapshot() {
			callback(to, from, error);
		}
	}

	pub(crate) fn emit_listeners(&self, to: &RouterState, from: Option<&RouterState>) {
		for listener in self.listeners.snapshot() {
			listener(to, from);
		}
	}

	/// Fires the node listeners of `node`.
	pub(crate) fn emit_node(&self, node: NodeId, to: &RouterState, from: Option<&RouterState>) {
		for listener in self.node_listeners.snapshot(node) {
			let changed = listener(to, from);
			tracing::debug!(
				node = self.tree.node(node).full_name(),
				changed,
				"Node listener notified"
			);
		}
	}

	/// Fires the route listeners whose route contains one of `changed`.
	pub(crate) fn emit_routes(
		&self,
		changed: &[NodeId],
		to: &RouterState,
		from: Option<&RouterState>,
	) {
		for route in self.route_listeners.nodes() {
			let affected = changed
				.iter()
				.any(|&node| self.tree.is_ancestor_or_self(route, node));
			if !affected {
				continue;
			}
			for listener in self.route_listeners.snapshot(route) {
				listener(to, from);
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::{fixture, rstest};
	use sentier_routes::{Params, Route};
	use std::sync::atomic::AtomicUsize;

	#[fixture]
	fn registry() -> Registry {
		let tree = RouteTree::builder()
			.route(
				Route::new("users", "/users")
					.child(Route::new("view", "/view/{id}"))
					.child(Route::new("list", "/list")),
			)
			.route(Route::new("home", "/home"))
			.build()
			.unwrap();
		Registry::new(Arc::new(tree))
	}

	#[rstest]
	fn test_component_registration(registry: Registry) {
		// Act
		registry.register_component("users.list", Arc::new(Component::new()));
		registry.register_component("users.list", Arc::new(Component::new()));
		registry.register_component("unknown", Arc::new(Component::new()));

		// Assert
		assert_eq!(registry.component_count(), 1);

		registry.deregister_component("users.list");
		registry.deregister_component("users.list");
		registry.deregister_component("unknown");
		assert_eq!(registry.component_count(), 0);
	}

	#[rstest]
	fn test_lifecycle_counts(registry: Registry) {
		let start = registry.on_transition_start(Arc::new(|_, _| {}));
		let error = registry.on_transition_error(Arc::new(|_, _, _| {}));
		let cancel = registry.on_transition_cancel(Arc::new(|_, _| {}));
		assert_eq!(registry.callback_count(LifecycleEvent::Start), 1);
		assert_eq!(registry.callback_count(LifecycleEvent::Error), 1);
		assert_eq!(registry.callback_count(LifecycleEvent::Cancel), 1);

		registry.off_transition_start(start);
		registry.off_transition_error(error);
		registry.off_transition_cancel(cancel);
		registry.off_transition_cancel(cancel);

		assert_eq!(registry.callback_count(LifecycleEvent::Start), 0);
		assert_eq!(registry.callback_count(LifecycleEvent::Error), 0);
		assert_eq!(registry.callback_count(LifecycleEvent::Cancel), 0);
	}

	#[rstest]
	fn test_unknown_node_listener_is_inert(registry: Registry) {
		let id = registry.add_node_listener("nowhere", Arc::new(|_, _| true));

		registry.remove_node_listener("nowhere", id);

		assert_eq!(registry.node_listener_count("nowhere"), 0);
	}

	#[rstest]
	fn test_route_listener_dispatch(registry: Registry) {
		// Arrange
		let calls = Arc::new(AtomicUsize::new(0));
		let counter = Arc::clone(&calls);
		registry.add_route_listener(
			"users",
			Arc::new(move |_, _| {
				counter.fetch_add(1, Ordering::SeqCst);
			}),
		);
		let tree = Arc::clone(&registry.tree);
		let to = RouterState::new("home", Params::new(), "/home");

		// Act
		registry.emit_routes(&[tree.lookup("home").unwrap()], &to, None);
		registry.emit_routes(&[tree.lookup("users.list").unwrap()], &to, None);

		// Assert
		assert_eq!(calls.load(Ordering::SeqCst), 1);
	}

	#[rstest]
	fn test_ids_are_unique(registry: Registry) {
		let a = registry.add_listener(Arc::new(|_, _| {}));
		let b = registry.add_listener(Arc::new(|_, _| {}));

		assert_ne!(a, b);
		registry.remove_listener(a);
		assert_eq!(registry.listener_count(), 1);
	}
}
