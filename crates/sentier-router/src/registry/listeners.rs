//! Listener storage.
//!
//! Callbacks are stored as `Arc`s next to the [`ListenerId`] handed out at
//! registration. Dispatch always works on a snapshot so that no lock is held
//! while user code runs.

use crate::error::TransitionError;
use parking_lot::RwLock;
use sentier_routes::{NodeId, RouterState};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Handle returned by every registration, used to remove the callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub(crate) u64);

impl fmt::Display for ListenerId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "listener#{}", self.0)
	}
}

/// Global or route listener: `(new_state, old_state)`.
pub type Listener = Arc<dyn Fn(&RouterState, Option<&RouterState>) + Send + Sync>;

/// Node listener: `(new_state, old_state) -> subtree_changed`.
pub type NodeListener = Arc<dyn Fn(&RouterState, Option<&RouterState>) -> bool + Send + Sync>;

/// Start or cancel callback: `(to_state, from_state)`.
pub type TransitionCallback = Arc<dyn Fn(&RouterState, Option<&RouterState>) + Send + Sync>;

/// Error callback: `(to_state, from_state, error)`.
pub type ErrorCallback =
	Arc<dyn Fn(&RouterState, Option<&RouterState>, &TransitionError) + Send + Sync>;

/// Lifecycle events with their own callback list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
	/// A transition passed the equality check and is about to run guards.
	Start,
	/// A transition was refused or failed.
	Error,
	/// A transition was superseded or cancelled.
	Cancel,
}

impl LifecycleEvent {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Start => "$start",
			Self::Error => "$error",
			Self::Cancel => "$cancel",
		}
	}
}

/// Ordered callbacks.
pub(crate) struct CallbackList<T: ?Sized> {
	entries: RwLock<Vec<(ListenerId, Arc<T>)>>,
}

impl<T: ?Sized> CallbackList<T> {
	pub(crate) fn new() -> Self {
		Self {
			entries: RwLock::new(Vec::new()),
		}
	}

	pub(crate) fn push(&self, id: ListenerId, callback: Arc<T>) {
		self.entries.write().push((id, callback));
	}

	/// Removes the callback registered under `id`; absent ids are ignored.
	pub(crate) fn remove(&self, id: ListenerId) -> bool {
		let mut entries = self.entries.write();
		let before = entries.len();
		entries.retain(|(entry_id, _)| *entry_id != id);
		entries.len() != before
	}

	pub(crate) fn snapshot(&self) -> Vec<Arc<T>> {
		self.entries
			.read()
			.iter()
			.map(|(_, callback)| Arc::clone(callback))
			.collect()
	}

	pub(crate) fn len(&self) -> usize {
		self.entries.read().len()
	}
}

/// Ordered callbacks keyed by route node.
pub(crate) struct NodeCallbacks<T: ?Sized> {
	entries: RwLock<HashMap<NodeId, Vec<(ListenerId, Arc<T>)>>>,
}

impl<T: ?Sized> NodeCallbacks<T> {
	pub(crate) fn new() -> Self {
		Self {
			entries: RwLock::new(HashMap::new()),
		}
	}

	pub(crate) fn push(&self, node: NodeId, id: ListenerId, callback: Arc<T>) {
		self.entries
			.write()
			.entry(node)
			.or_default()
			.push((id, callback));
	}

	pub(crate) fn remove(&self, node: NodeId, id: ListenerId) -> bool {
		let mut entries = self.entries.write();
		let Some(list) = entries.get_mut(&node) else {
			return false;
		};
		let before = list.len();
		list.retain(|(entry_id, _)| *entry_id != id);
		let removed = list.len() != before;
		if list.is_empty() {
			entries.remove(&node);
		}
		removed
	}

	pub(crate) fn snapshot(&self, node: NodeId) -> Vec<Arc<T>> {
		self.entries
			.read()
			.get(&node)
			.map(|list| list.iter().map(|(_, cb)| Arc::clone(cb)).collect())
			.unwrap_or_default()
	}

	/// Nodes with at least one callback.
	pub(crate) fn nodes(&self) -> Vec<NodeId> {
		let mut nodes: Vec<NodeId> = self.entries.read().keys().copied().collect();
		nodes.sort();
		nodes
	}

	pub(crate) fn len(&self, node: NodeId) -> usize {
		self.entries.read().get(&node).map_or(0, Vec::len)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	type Cb = dyn Fn() -> u32 + Send + Sync;

	#[rstest]
	fn test_callback_list_removal_is_idempotent() {
		// Arrange
		let list: CallbackList<Cb> = CallbackList::new();
		list.push(ListenerId(1), Arc::new(|| 1));
		list.push(ListenerId(2), Arc::new(|| 2));

		// Act
		let first = list.remove(ListenerId(1));
		let second = list.remove(ListenerId(1));
		let unknown = list.remove(ListenerId(99));

		// Assert
		assert!(first);
		assert!(!second);
		assert!(!unknown);
		assert_eq!(list.len(), 1);
		assert_eq!(list.snapshot().iter().map(|cb| cb()).collect::<Vec<_>>(), vec![2]);
	}

	#[rstest]
	fn test_node_callbacks() {
		let callbacks: NodeCallbacks<Cb> = NodeCallbacks::new();
		let a = NodeId::ROOT;

		callbacks.push(a, ListenerId(1), Arc::new(|| 1));
		callbacks.push(a, ListenerId(2), Arc::new(|| 2));
		assert_eq!(callbacks.len(a), 2);
		assert_eq!(callbacks.nodes(), vec![a]);

		callbacks.remove(a, ListenerId(1));
		callbacks.remove(a, ListenerId(2));
		assert_eq!(callbacks.len(a), 0);
		assert!(callbacks.nodes().is_empty());
		assert!(callbacks.snapshot(a).is_empty());
	}

	#[rstest]
	fn test_lifecycle_event_keys() {
		assert_eq!(LifecycleEvent::Start.as_str(), "$start");
		assert_eq!(LifecycleEvent::Error.as_str(), "$error");
		assert_eq!(LifecycleEvent::Cancel.as_str(), "$cancel");
	}
}
