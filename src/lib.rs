//! # Sentier
//!
//! A hierarchical, name-based client-side router.
//!
//! Sentier resolves URLs to named route states, runs guarded and
//! cancellable transitions between states, and notifies listeners once a
//! transition commits. It is split into two crates re-exported here:
//!
//! - [`routes`] (`sentier-routes`): the route tree, path building and matching
//! - [`router`] (`sentier-router`): the transition engine, registries and the
//!   [`Router`] facade
//!
//! ## Quick Start
//!
//! ```
//! use sentier::prelude::*;
//!
//! let tree = RouteTree::builder()
//!     .route(Route::new("home", "/home"))
//!     .route(
//!         Route::new("users", "/users")
//!             .child(Route::new("view", "/view/{id}"))
//!             .child(Route::new("list", "/list")),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let router = Router::new(tree)
//!     .with_options(RouterOptions::new().with_default_route("home", params! {}));
//!
//! router.add_listener(|to, from| {
//!     println!("{} -> {}", from.map(|s| s.name.as_str()).unwrap_or("-"), to.name);
//! });
//!
//! assert_eq!(
//!     router.build_path("users.view", &params! { "id" => 1 }).unwrap(),
//!     "/users/view/1"
//! );
//! ```
//!
//! ## Transitions
//!
//! [`Router::navigate`] returns a [`Transition`], a future resolving to the
//! new [`RouterState`] or a [`TransitionError`]. Guards are registered per
//! route through [`RouteComponent`] implementations (or the closure based
//! [`Component`]), middleware through [`TransitionMiddleware`].
//!
//! ## Logging
//!
//! Diagnostics go through `tracing`. Registry misuse (a duplicate component,
//! a listener on an unknown route) is reported at `warn` level; transition
//! progress at `debug` level. Install any subscriber to see them.

pub use sentier_router as router;
pub use sentier_routes as routes;

pub use sentier_router::{
	CancelHandle, Component, ErrorCode, GuardResult, HistoryAdapter, LifecycleEvent, ListenerId,
	MemoryHistory, MiddlewareError, NavigationOptions, PushOptions, RouteComponent, Router,
	RouterError, RouterOption, RouterOptions, Transition, TransitionError, TransitionMiddleware,
	middleware_fn,
};
pub use sentier_routes::{
	MatchOptions, NodeId, ParamValue, Params, Route, RouteTree, RouteTreeError, RouterState,
	params,
};

/// Re-exports of the commonly used types.
pub mod prelude {
	pub use crate::{
		CancelHandle,
		Component,
		ErrorCode,
		GuardResult,
		HistoryAdapter,
		LifecycleEvent,
		MemoryHistory,
		MiddlewareError,
		NavigationOptions,
		ParamValue,
		Params,
		Route,
		RouteComponent,
		RouteTree,
		Router,
		RouterError,
		RouterOption,
		RouterOptions,
		RouterState,
		TransitionError,
		TransitionMiddleware,
		middleware_fn,
		params,
	};
}
