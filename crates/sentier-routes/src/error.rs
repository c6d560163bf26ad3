//! Error types for the route tree.

/// Error type for building a route tree and resolving names against it.
///
/// All of these are configuration errors: they are reported synchronously
/// and indicate that the caller used a name or pattern the tree does not
/// know about.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteTreeError {
	/// No node is registered under the given dotted name.
	#[error("Route not found: {0}")]
	RouteNotFound(String),

	/// A parameter required by the route's pattern was not supplied.
	#[error("Missing parameter '{param}' for route '{route}'")]
	MissingParameter {
		/// Full dotted route name.
		route: String,
		/// Name of the missing parameter.
		param: String,
	},

	/// Two nodes resolve to the same full dotted name.
	#[error("Duplicate route name: {0}")]
	DuplicateRoute(String),

	/// A route was declared without a name.
	#[error("Route with path '{0}' has no name")]
	MissingName(String),

	/// A route name segment contains a reserved character.
	#[error("Invalid route name '{0}': name segments must not contain '.'")]
	InvalidName(String),

	/// A dotted route was added before its parent.
	#[error("Parent route '{parent}' not found for '{name}'")]
	ParentNotFound {
		/// Full dotted name of the route being added.
		name: String,
		/// Full dotted name of the missing parent.
		parent: String,
	},

	/// A path pattern could not be compiled.
	#[error("Invalid pattern '{pattern}': {reason}")]
	InvalidPattern {
		/// The offending pattern.
		pattern: String,
		/// Why it was rejected.
		reason: String,
	},
}
