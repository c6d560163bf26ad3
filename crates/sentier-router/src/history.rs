//! History adapter contract.
//!
//! The router never touches the address bar itself. A host supplies a
//! [`HistoryAdapter`] that reports the current path and records new entries;
//! back/forward events are fed back through
//! [`Router::handle_pop_state`](crate::Router::handle_pop_state).

use parking_lot::Mutex;

/// Options for [`HistoryAdapter::push_path`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PushOptions {
	/// Replace the current entry instead of adding one.
	pub replace: bool,
}

/// Platform history used by a router.
pub trait HistoryAdapter: Send + Sync {
	/// Returns the current path, including any query string.
	fn current_path(&self) -> String;

	/// Records `path` as the current location.
	fn push_path(&self, path: &str, options: PushOptions);
}

#[derive(Debug)]
struct Entries {
	paths: Vec<String>,
	index: usize,
}

/// In-memory history stack.
///
/// Behaves like a browser session history: pushing drops any forward
/// entries, replacing overwrites the current one.
#[derive(Debug)]
pub struct MemoryHistory {
	inner: Mutex<Entries>,
}

impl MemoryHistory {
	/// Creates a history whose only entry is `initial_path`.
	pub fn new(initial_path: impl Into<String>) -> Self {
		Self {
			inner: Mutex::new(Entries {
				paths: vec![initial_path.into()],
				index: 0,
			}),
		}
	}

	/// Moves one entry back and returns the new current path.
	pub fn back(&self) -> Option<String> {
		let mut inner = self.inner.lock();
		if inner.index == 0 {
			return None;
		}
		inner.index -= 1;
		Some(inner.paths[inner.index].clone())
	}

	/// Moves one entry forward and returns the new current path.
	pub fn forward(&self) -> Option<String> {
		let mut inner = self.inner.lock();
		if inner.index + 1 >= inner.paths.len() {
			return None;
		}
		inner.index += 1;
		Some(inner.paths[inner.index].clone())
	}

	/// Overwrites the current entry, as if the user edited the address bar.
	pub fn set_path(&self, path: impl Into<String>) {
		let mut inner = self.inner.lock();
		let index = inner.index;
		inner.paths[index] = path.into();
	}

	/// Number of entries in the stack.
	pub fn len(&self) -> usize {
		self.inner.lock().paths.len()
	}

	pub fn is_empty(&self) -> bool {
		self.inner.lock().paths.is_empty()
	}

	/// Returns a copy of every entry, oldest first.
	pub fn entries(&self) -> Vec<String> {
		self.inner.lock().paths.clone()
	}
}

impl Default for MemoryHistory {
	fn default() -> Self {
		Self::new("/")
	}
}

impl HistoryAdapter for MemoryHistory {
	fn current_path(&self) -> String {
		let inner = self.inner.lock();
		inner.paths[inner.index].clone()
	}

	fn push_path(&self, path: &str, options: PushOptions) {
		let mut inner = self.inner.lock();
		if options.replace {
			let index = inner.index;
			inner.paths[index] = path.to_string();
		} else {
			let next = inner.index + 1;
			inner.paths.truncate(next);
			inner.paths.push(path.to_string());
			inner.index = next;
		}
	}
}
