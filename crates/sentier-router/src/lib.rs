//! # Sentier Router
//!
//! Guarded, cancellable transitions over a [`sentier_routes::RouteTree`].
//!
//! A [`Router`] holds the current [`RouterState`], a [`Registry`] of route
//! components, listeners and middleware, and a [`HistoryAdapter`] standing
//! in for the platform address bar. Navigating returns a [`Transition`]
//! future that runs:
//!
//! 1. deactivation guards for the nodes being left, deepest first;
//! 2. activation guards for the nodes being entered;
//! 3. middleware, in registration order;
//! 4. commit: state swap, history update, then listeners.
//!
//! Starting a new transition cancels the one in flight. The engine only
//! depends on `futures`, so it runs on any executor.
//!
//! ## Example
//!
//! ```
//! use sentier_router::{Component, GuardResult, NavigationOptions, Router, TransitionError};
//! use sentier_routes::{Route, RouteTree, params};
//!
//! # futures::executor::block_on(async {
//! let tree = RouteTree::builder()
//!     .route(Route::new("home", "/home"))
//!     .route(Route::new("admin", "/admin"))
//!     .build()
//!     .unwrap();
//! let router = Router::new(tree);
//! router.register_component(
//!     "admin",
//!     Component::new().with_can_activate(|_, _| GuardResult::Ready(false)),
//! );
//! router.start().unwrap().await.unwrap();
//!
//! let result = router
//!     .navigate("admin", params! {}, NavigationOptions::default())
//!     .unwrap()
//!     .await;
//!
//! assert_eq!(
//!     result,
//!     Err(TransitionError::CannotActivate { segment: "admin".to_string() })
//! );
//! # });
//! ```

pub mod error;
pub mod history;
pub mod options;
pub mod registry;
pub mod router;
pub mod transition;

pub use error::{ErrorCode, MiddlewareError, RouterError, TransitionError};
pub use history::{HistoryAdapter, MemoryHistory, PushOptions};
pub use options::{RouterOption, RouterOptions};
pub use registry::{
	Component, GuardResult, LifecycleEvent, ListenerId, Registry, RouteComponent,
	TransitionMiddleware, middleware_fn,
};
pub use router::Router;
pub use sentier_routes::{Params, RouterState};
pub use transition::{CancelHandle, NavigationOptions, Transition, TransitionPath};
