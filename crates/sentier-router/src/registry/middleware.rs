//! Transition middleware

use crate::error::MiddlewareError;
use sentier_routes::RouterState;
use std::future::Future;

/// Transition-scoped hook run after every guard has passed.
///
/// Returning an error aborts the transition with `TRANSITION_ERR`.
#[async_trait::async_trait]
pub trait TransitionMiddleware: Send + Sync {
	/// Called with the current state (if any) and the target state.
	async fn handle(
		&self,
		from: Option<&RouterState>,
		to: &RouterState,
	) -> Result<(), MiddlewareError>;
}

/// Middleware built from a closure returning a future.
///
/// The returned future must own what it needs from the states.
pub struct FnMiddleware<F>(F);

/// Wraps a closure as a [`TransitionMiddleware`].
///
/// ```
/// use sentier_router::{MiddlewareError, middleware_fn};
///
/// let middleware = middleware_fn(|_, to| {
///     let allowed = to.name != "admin";
///     async move {
///         if allowed { Ok(()) } else { Err(MiddlewareError::new("admin is closed")) }
///     }
/// });
/// ```
pub fn middleware_fn<F, Fut>(f: F) -> FnMiddleware<F>
where
	F: Fn(Option<&RouterState>, &RouterState) -> Fut + Send + Sync,
	Fut: Future<Output = Result<(), MiddlewareError>> + Send + 'static,
{
	FnMiddleware(f)
}

#[async_trait::async_trait]
impl<F, Fut> TransitionMiddleware for FnMiddleware<F>
where
	F: Fn(Option<&RouterState>, &RouterState) -> Fut + Send + Sync,
	Fut: Future<Output = Result<(), MiddlewareError>> + Send + 'static,
{
	async fn handle(
		&self,
		from: Option<&RouterState>,
		to: &RouterState,
	) -> Result<(), MiddlewareError> {
		(self.0)(from, to).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use sentier_routes::Params;

	struct DenyAll;

	#[async_trait::async_trait]
	impl TransitionMiddleware for DenyAll {
		async fn handle(
			&self,
			_from: Option<&RouterState>,
			to: &RouterState,
		) -> Result<(), MiddlewareError> {
			Err(MiddlewareError::new(format!("denied {}", to.name)))
		}
	}

	#[rstest]
	#[tokio::test]
	async fn test_struct_middleware() {
		let to = RouterState::new("users", Params::new(), "/users");

		let result = DenyAll.handle(None, &to).await;

		assert_eq!(result, Err(MiddlewareError::new("denied users")));
	}

	#[rstest]
	#[tokio::test]
	async fn test_closure_middleware() {
		let middleware = middleware_fn(|from, _| {
			let first = from.is_none();
			async move { if first { Ok(()) } else { Err(MiddlewareError::new("not first")) } }
		});
		let users = RouterState::new("users", Params::new(), "/users");

		assert!(middleware.handle(None, &users).await.is_ok());
		assert!(middleware.handle(Some(&users), &users).await.is_err());
	}
}
