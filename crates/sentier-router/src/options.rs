//! Router configuration.

use crate::error::RouterError;
use sentier_routes::Params;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Router configuration.
///
/// Options can be built in code, loaded from TOML, or changed at runtime
/// with [`Router::set_option`](crate::Router::set_option).
///
/// ```
/// use sentier_router::RouterOptions;
///
/// let options = RouterOptions::from_toml_str(r#"
/// default_route = "home"
/// strict_trailing_slash = true
///
/// [default_params]
/// tab = "info"
/// "#).unwrap();
///
/// assert_eq!(options.default_route.as_deref(), Some("home"));
/// assert!(options.strict_trailing_slash);
/// ```
#[non_exhaustive]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterOptions {
	/// Route used when the current path matches nothing or is refused.
	pub default_route: Option<String>,
	/// Params used with `default_route`.
	pub default_params: Params,
	/// When false, a single trailing `/` is ignored while matching.
	pub strict_trailing_slash: bool,
}

impl RouterOptions {
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the default route and its params.
	pub fn with_default_route(mut self, name: impl Into<String>, params: Params) -> Self {
		self.default_route = Some(name.into());
		self.default_params = params;
		self
	}

	pub fn with_strict_trailing_slash(mut self, strict: bool) -> Self {
		self.strict_trailing_slash = strict;
		self
	}

	/// Parses options from a TOML document.
	pub fn from_toml_str(contents: &str) -> Result<Self, RouterError> {
		toml::from_str(contents)
			.map_err(|e| RouterError::InvalidOptions(format!("TOML parse error: {}", e)))
	}

	/// Loads options from a TOML file.
	pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, RouterError> {
		let path = path.into();
		let contents = std::fs::read_to_string(&path).map_err(|e| {
			RouterError::InvalidOptions(format!("Failed to read {}: {}", path.display(), e))
		})?;
		Self::from_toml_str(&contents)
	}

	/// Applies a single option change.
	pub fn apply(&mut self, option: RouterOption) {
		match option {
			RouterOption::DefaultRoute(name) => self.default_route = name,
			RouterOption::DefaultParams(params) => self.default_params = params,
			RouterOption::StrictTrailingSlash(strict) => self.strict_trailing_slash = strict,
		}
	}
}

/// A single option change for [`RouterOptions::apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouterOption {
	/// Sets or clears the default route.
	DefaultRoute(Option<String>),
	DefaultParams(Params),
	StrictTrailingSlash(bool),
}
