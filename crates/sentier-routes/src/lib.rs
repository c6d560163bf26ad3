//! # Sentier Routes
//!
//! The named route tree behind the Sentier router.
//!
//! Routes form a hierarchy addressed by dotted names (`users.view`). Each
//! node contributes a path segment pattern relative to its parent, so the
//! full path of `users.view` is the concatenation of the `users` and `view`
//! patterns. The tree answers two questions:
//!
//! - [`RouteTree::build_path`]: which URL does a name plus params produce?
//! - [`RouteTree::match_path`]: which name and params does a URL resolve to?
//!
//! ## Example
//!
//! ```
//! use sentier_routes::{Route, RouteTree, params};
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
//! let path = tree.build_path("users.view", &params! { "id" => 1 }).unwrap();
//! assert_eq!(path, "/users/view/1");
//!
//! let state = tree.match_path("/users/view/1").unwrap();
//! assert_eq!(state.name, "users.view");
//! assert_eq!(state.params, params! { "id" => "1" });
//! ```

pub mod error;
pub mod params;
pub mod pattern;
pub mod state;
pub mod tree;

pub use error::RouteTreeError;
pub use params::{ParamValue, Params};
pub use pattern::SegmentPattern;
pub use state::RouterState;
pub use tree::{MatchOptions, NodeId, Route, RouteNode, RouteTree, RouteTreeBuilder};
