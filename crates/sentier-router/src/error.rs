//! Error types for the router.
//!
//! Two families exist. [`RouterError`] covers configuration mistakes and is
//! returned synchronously from the call that made them. [`TransitionError`]
//! is how a transition fails at runtime: it is resolved by the transition
//! future and handed to the error or cancel callbacks.

use sentier_routes::RouteTreeError;
use std::fmt;

/// Stable symbolic error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
	RouterNotStarted,
	RouterAlreadyStarted,
	RouteNotFound,
	CannotActivate,
	CannotDeactivate,
	TransitionCancelled,
	TransitionErr,
}

impl ErrorCode {
	/// Returns the code as an upper snake case symbol.
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::RouterNotStarted => "ROUTER_NOT_STARTED",
			Self::RouterAlreadyStarted => "ROUTER_ALREADY_STARTED",
			Self::RouteNotFound => "ROUTE_NOT_FOUND",
			Self::CannotActivate => "CANNOT_ACTIVATE",
			Self::CannotDeactivate => "CANNOT_DEACTIVATE",
			Self::TransitionCancelled => "TRANSITION_CANCELLED",
			Self::TransitionErr => "TRANSITION_ERR",
		}
	}
}

impl fmt::Display for ErrorCode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Error reported by a transition middleware.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct MiddlewareError(pub String);

impl MiddlewareError {
	pub fn new(message: impl Into<String>) -> Self {
		Self(message.into())
	}
}

impl From<&str> for MiddlewareError {
	fn from(message: &str) -> Self {
		Self(message.to_string())
	}
}

impl From<String> for MiddlewareError {
	fn from(message: String) -> Self {
		Self(message)
	}
}

/// Runtime failure of a transition.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
	/// The router was stopped (or never started).
	#[error("Router is not started")]
	NotStarted,

	/// `start` was called on a running router.
	#[error("Router is already started")]
	AlreadyStarted,

	/// An activation guard refused the route `segment`.
	#[error("Cannot activate route '{segment}'")]
	CannotActivate {
		/// Full dotted name of the refusing node.
		segment: String,
	},

	/// A deactivation guard refused to leave the route `segment`.
	#[error("Cannot deactivate route '{segment}'")]
	CannotDeactivate {
		/// Full dotted name of the refusing node.
		segment: String,
	},

	/// The transition was superseded or explicitly cancelled.
	#[error("Transition cancelled")]
	Cancelled,

	/// A middleware aborted the transition.
	#[error("Transition error: {0}")]
	Middleware(#[from] MiddlewareError),
}

impl TransitionError {
	/// Returns the stable code for this error.
	pub fn code(&self) -> ErrorCode {
		match self {
			Self::NotStarted => ErrorCode::RouterNotStarted,
			Self::AlreadyStarted => ErrorCode::RouterAlreadyStarted,
			Self::CannotActivate { .. } => ErrorCode::CannotActivate,
			Self::CannotDeactivate { .. } => ErrorCode::CannotDeactivate,
			Self::Cancelled => ErrorCode::TransitionCancelled,
			Self::Middleware(_) => ErrorCode::TransitionErr,
		}
	}

	/// Returns true for guard refusals.
	pub fn is_refusal(&self) -> bool {
		matches!(
			self,
			Self::CannotActivate { .. } | Self::CannotDeactivate { .. }
		)
	}
}

/// Configuration error returned synchronously by router calls.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouterError {
	/// A route name or parameter set did not resolve against the tree.
	#[error(transparent)]
	Tree(#[from] RouteTreeError),

	/// The configured default route does not exist in the tree.
	#[error("Default route '{0}' not found")]
	DefaultRouteNotFound(String),

	/// Options could not be loaded.
	#[error("Invalid router options: {0}")]
	InvalidOptions(String),
}

impl RouterError {
	/// Returns the stable code, if this error has one.
	pub fn code(&self) -> Option<ErrorCode> {
		match self {
			Self::Tree(RouteTreeError::RouteNotFound(_)) | Self::DefaultRouteNotFound(_) => {
				Some(ErrorCode::RouteNotFound)
			}
			_ => None,
		}
	}
}
