//! Cancellation tokens for in-flight transitions.

use futures::task::AtomicWaker;
use parking_lot::Mutex;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::task::{Context, Poll};

/// Cancellation flag shared by one transition attempt.
#[derive(Debug)]
pub(crate) struct TransitionToken {
	id: u64,
	cancelled: AtomicBool,
	waker: AtomicWaker,
}

impl TransitionToken {
	fn new(id: u64) -> Self {
		Self {
			id,
			cancelled: AtomicBool::new(false),
			waker: AtomicWaker::new(),
		}
	}

	pub(crate) fn id(&self) -> u64 {
		self.id
	}

	pub(crate) fn cancel(&self) {
		self.cancelled.store(true, Ordering::SeqCst);
		self.waker.wake();
	}

	pub(crate) fn is_cancelled(&self) -> bool {
		self.cancelled.load(Ordering::SeqCst)
	}

	/// Resolves once the token is cancelled.
	pub(crate) fn cancelled(&self) -> Cancelled<'_> {
		Cancelled { token: self }
	}
}

/// Future returned by [`TransitionToken::cancelled`].
pub(crate) struct Cancelled<'a> {
	token: &'a TransitionToken,
}

impl Future for Cancelled<'_> {
	type Output = ();

	fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
		if self.token.is_cancelled() {
			return Poll::Ready(());
		}
		self.token.waker.register(cx.waker());
		// Re-check after registering so a concurrent cancel is not lost.
		if self.token.is_cancelled() {
			Poll::Ready(())
		} else {
			Poll::Pending
		}
	}
}

/// Handle for cancelling one transition from outside.
///
/// Holding a handle does not keep the transition alive. Cancelling a
/// transition that already finished does nothing.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
	token: Weak<TransitionToken>,
}

impl CancelHandle {
	pub(crate) fn new(token: &Arc<TransitionToken>) -> Self {
		Self {
			token: Arc::downgrade(token),
		}
	}

	/// Cancels the transition if it is still running.
	pub fn cancel(&self) {
		if let Some(token) = self.token.upgrade() {
			tracing::debug!(transition = token.id(), "Transition cancelled by handle");
			token.cancel();
		}
	}

	/// Returns true when the transition was cancelled and is still alive.
	pub fn is_cancelled(&self) -> bool {
		self.token
			.upgrade()
			.is_some_and(|token| token.is_cancelled())
	}
}

/// Slot holding the single in-flight transition of a router.
#[derive(Debug, Default)]
pub(crate) struct InFlight {
	current: Mutex<Option<Arc<TransitionToken>>>,
	next_id: AtomicU64,
}

impl InFlight {
	/// Starts a new attempt, cancelling the one in flight.
	pub(crate) fn begin(&self) -> Arc<TransitionToken> {
		let token = Arc::new(TransitionToken::new(
			self.next_id.fetch_add(1, Ordering::Relaxed) + 1,
		));
		let previous = self.current.lock().replace(Arc::clone(&token));
		if let Some(previous) = previous {
			tracing::debug!(
				superseded = previous.id(),
				transition = token.id(),
				"Superseding in-flight transition"
			);
			previous.cancel();
		}
		token
	}

	/// Clears the slot if it still holds `token`.
	pub(crate) fn finish(&self, token: &Arc<TransitionToken>) {
		let mut current = self.current.lock();
		if current
			.as_ref()
			.is_some_and(|held| Arc::ptr_eq(held, token))
		{
			*current = None;
		}
	}

	/// Cancels the in-flight transition, if any.
	pub(crate) fn cancel_current(&self) {
		let current = self.current.lock().take();
		if let Some(token) = current {
			token.cancel();
		}
	}

	/// Runs `commit` only while `token` is the live attempt.
	///
	/// The slot stays locked until `commit` returns, so no other attempt can
	/// begin between the liveness check and the commit. Returns `None` when
	/// `token` was superseded or cancelled.
	pub(crate) fn commit_with<R>(
		&self,
		token: &Arc<TransitionToken>,
		commit: impl FnOnce() -> R,
	) -> Option<R> {
		let current = self.current.lock();
		let live = current
			.as_ref()
			.is_some_and(|held| Arc::ptr_eq(held, token))
			&& !token.is_cancelled();
		if !live {
			return None;
		}
		Some(commit())
	}

	#[cfg(test)]
	pub(crate) fn is_busy(&self) -> bool {
		self.current.lock().is_some()
	}
}
