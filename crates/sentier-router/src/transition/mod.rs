//! Transition engine.
//!
//! A navigation produces a [`Transition`]: a future that runs the pipeline
//! (deactivation guards, activation guards, middleware, commit) and resolves
//! with the new state or a [`TransitionError`]. At most one transition is in
//! flight per router; starting another cancels it.
//!
//! Like any future, a transition does nothing until it is polled.

pub mod path;
pub(crate) mod pipeline;
pub(crate) mod token;

pub use path::TransitionPath;
pub use token::CancelHandle;

use crate::error::TransitionError;
use futures::FutureExt;
use futures::future::BoxFuture;
use sentier_routes::RouterState;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Options for a single navigation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavigationOptions {
	/// Run the full pipeline even when the target equals the current state.
	pub reload: bool,
	/// Replace the current history entry instead of pushing one.
	pub replace: bool,
}

impl NavigationOptions {
	pub fn reload() -> Self {
		Self {
			reload: true,
			replace: false,
		}
	}

	pub fn replace() -> Self {
		Self {
			reload: false,
			replace: true,
		}
	}
}

/// A running transition.
///
/// Resolves with `Ok(state)` once committed. Use
/// [`cancel_handle`](Self::cancel_handle) to cancel it from elsewhere.
#[must_use = "transitions do nothing unless polled"]
pub struct Transition<T = RouterState> {
	handle: CancelHandle,
	future: BoxFuture<'static, Result<T, TransitionError>>,
}

impl<T> Transition<T> {
	pub(crate) fn new(
		handle: CancelHandle,
		future: BoxFuture<'static, Result<T, TransitionError>>,
	) -> Self {
		Self { handle, future }
	}

	/// A transition that is already settled.
	pub(crate) fn ready(result: Result<T, TransitionError>) -> Self
	where
		T: Send + 'static,
	{
		Self {
			handle: CancelHandle::default(),
			future: futures::future::ready(result).boxed(),
		}
	}

	/// Returns a handle that cancels this transition.
	pub fn cancel_handle(&self) -> CancelHandle {
		self.handle.clone()
	}

	/// Cancels this transition.
	pub fn cancel(&self) {
		self.handle.cancel();
	}
}

impl<T> Future for Transition<T> {
	type Output = Result<T, TransitionError>;

	fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
		self.future.as_mut().poll(cx)
	}
}

impl<T> fmt::Debug for Transition<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Transition")
			.field("handle", &self.handle)
			.finish_non_exhaustive()
	}
}

/// What a committed transition does to the history adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HistoryMode {
	Push,
	Replace,
	/// The adapter already shows the target (back/forward navigation).
	Keep,
}
