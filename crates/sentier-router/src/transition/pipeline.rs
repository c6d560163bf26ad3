//! The transition pipeline.

use super::path::TransitionPath;
use super::token::TransitionToken;
use super::{HistoryMode, NavigationOptions};
use crate::error::TransitionError;
use crate::history::PushOptions;
use crate::registry::GuardResult;
use crate::router::RouterInner;
use futures::future::{self, Either};
use sentier_routes::RouterState;
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

/// Runs one transition attempt to `to`.
///
/// The current state is read when the pipeline starts running. No lock is
/// held across an await point or while guards, middleware or listeners run.
/// The state swap and the history write happen under the in-flight slot
/// lock, so a superseded attempt can never commit.
pub(crate) async fn run(
	inner: &RouterInner,
	token: &Arc<TransitionToken>,
	to: RouterState,
	options: NavigationOptions,
	mode: HistoryMode,
) -> Result<RouterState, TransitionError> {
	let from = inner.state.read().clone();

	if token.is_cancelled() {
		return Err(fail(inner, &to, from.as_ref(), TransitionError::Cancelled));
	}

	if !options.reload
		&& let Some(current) = &from
		&& current.equivalent(&to)
	{
		debug!(route = %to.name, "Target equals current state, nothing to do");
		return Ok(current.clone());
	}

	debug!(
		transition = token.id(),
		route = %to.name,
		from = from.as_ref().map(|s| s.name.as_str()),
		"Transition started"
	);
	inner.registry.emit_start(&to, from.as_ref());

	let path = TransitionPath::compute(&inner.tree, from.as_ref(), &to, options.reload);

	if let Err(error) = check(inner, token, &path, &to, from.as_ref()).await {
		return Err(fail(inner, &to, from.as_ref(), error));
	}

	let committed = inner.in_flight.commit_with(token, || {
		*inner.state.write() = Some(to.clone());
		write_history(inner, &to, mode);
	});
	if committed.is_none() {
		return Err(fail(inner, &to, from.as_ref(), TransitionError::Cancelled));
	}

	notify(inner, &path, &to, from.as_ref());
	debug!(transition = token.id(), route = %to.name, "Transition committed");
	Ok(to)
}

/// Guards and middleware. Returns the first failure.
async fn check(
	inner: &RouterInner,
	token: &TransitionToken,
	path: &TransitionPath,
	to: &RouterState,
	from: Option<&RouterState>,
) -> Result<(), TransitionError> {
	for &node in &path.to_deactivate {
		checkpoint(token)?;
		let Some(component) = inner.registry.component(node) else {
			continue;
		};
		if !settle(component.can_deactivate(to, from), token).await? {
			let segment = inner.tree.node(node).full_name().to_string();
			debug!(route = %segment, "Deactivation refused");
			return Err(TransitionError::CannotDeactivate { segment });
		}
	}

	for &node in &path.to_activate {
		checkpoint(token)?;
		let mut allowed = match inner.registry.component(node) {
			Some(component) => settle(component.can_activate(to, from), token).await?,
			None => true,
		};
		if allowed && let Some(guard) = inner.registry.activation_guard(node) {
			allowed = settle(guard(to, from), token).await?;
		}
		if !allowed {
			let segment = inner.tree.node(node).full_name().to_string();
			debug!(route = %segment, "Activation refused");
			return Err(TransitionError::CannotActivate { segment });
		}
	}

	for middleware in inner.registry.middleware() {
		checkpoint(token)?;
		race(middleware.handle(from, to), token).await??;
	}

	checkpoint(token)
}

fn checkpoint(token: &TransitionToken) -> Result<(), TransitionError> {
	if token.is_cancelled() {
		Err(TransitionError::Cancelled)
	} else {
		Ok(())
	}
}

/// Waits for a guard answer unless the transition is cancelled first.
///
/// A pending guard that loses the race is dropped.
async fn settle(result: GuardResult, token: &TransitionToken) -> Result<bool, TransitionError> {
	match result {
		GuardResult::Ready(allowed) => Ok(allowed),
		GuardResult::Pending(pending) => race(pending, token).await,
	}
}

async fn race<F>(work: F, token: &TransitionToken) -> Result<F::Output, TransitionError>
where
	F: Future + Unpin,
{
	match future::select(work, token.cancelled()).await {
		Either::Left((output, _)) => Ok(output),
		Either::Right(((), _)) => Err(TransitionError::Cancelled),
	}
}

/// Reports a failed attempt to the matching callbacks.
fn fail(
	inner: &RouterInner,
	to: &RouterState,
	from: Option<&RouterState>,
	error: TransitionError,
) -> TransitionError {
	match &error {
		TransitionError::Cancelled => {
			debug!(route = %to.name, "Transition cancelled");
			inner.registry.emit_cancel(to, from);
		}
		_ => {
			debug!(route = %to.name, code = %error.code(), "Transition failed");
			inner.registry.emit_error(to, from, &error);
		}
	}
	error
}

fn write_history(inner: &RouterInner, to: &RouterState, mode: HistoryMode) {
	match mode {
		HistoryMode::Push => inner
			.history
			.push_path(&to.path, PushOptions { replace: false }),
		HistoryMode::Replace => inner
			.history
			.push_path(&to.path, PushOptions { replace: true }),
		HistoryMode::Keep => {}
	}
}

/// Listener dispatch for a committed transition. Runs outside every lock so
/// listeners may navigate again.
fn notify(
	inner: &RouterInner,
	path: &TransitionPath,
	to: &RouterState,
	from: Option<&RouterState>,
) {
	inner.registry.emit_listeners(to, from);

	let changed = path.changed();
	let mut notified = Vec::with_capacity(changed.len() + 1);
	for node in std::iter::once(path.intersection).chain(changed.iter().copied()) {
		if !notified.contains(&node) {
			notified.push(node);
			inner.registry.emit_node(node, to, from);
		}
	}

	inner.registry.emit_routes(&changed, to, from);
}
