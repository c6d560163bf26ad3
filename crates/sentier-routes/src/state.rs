//! Router state value type.

use crate::params::Params;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where the router is: a route name, its parameters and the canonical path.
///
/// A state is an immutable value. Every transition produces a new one.
/// The derived `PartialEq` compares all three fields; use
/// [`RouterState::equivalent`] for the name-and-params comparison used by
/// transitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterState {
	/// Full dotted route name.
	pub name: String,
	/// Route parameters.
	pub params: Params,
	/// Path the state was built from or matched against.
	pub path: String,
}

impl RouterState {
	/// Creates a new state.
	pub fn new(name: impl Into<String>, params: Params, path: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			params,
			path: path.into(),
		}
	}

	/// Returns true when both states name the same route with equal params.
	///
	/// The path is not compared.
	pub fn equivalent(&self, other: &RouterState) -> bool {
		self.name == other.name && self.params == other.params
	}

	/// Returns true when `self` is a strict descendant of the route `name`.
	pub fn is_descendant_of(&self, name: &str) -> bool {
		if name.is_empty() {
			return !self.name.is_empty();
		}
		self.name
			.strip_prefix(name)
			.is_some_and(|rest| rest.starts_with('.'))
	}
}

impl fmt::Display for RouterState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} ({})", self.name, self.path)
	}
}
