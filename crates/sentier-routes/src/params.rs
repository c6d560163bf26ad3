//! Route parameters.
//!
//! Parameters arrive either from application code (`navigate("users.view",
//! params! { "id" => 1 })`) or from a matched URL, where every value is text.
//! [`ParamValue`] therefore compares by its rendered form so that the integer
//! `1` and the string `"1"` are the same parameter value.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

/// A single parameter value: a string or an integer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
	/// Integer value.
	Int(i64),
	/// Text value.
	Str(String),
}

impl ParamValue {
	/// Returns the value as it appears in a URL.
	pub fn as_text(&self) -> Cow<'_, str> {
		match self {
			Self::Int(n) => Cow::Owned(n.to_string()),
			Self::Str(s) => Cow::Borrowed(s.as_str()),
		}
	}
}

impl PartialEq for ParamValue {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Self::Int(a), Self::Int(b)) => a == b,
			(Self::Str(a), Self::Str(b)) => a == b,
			_ => self.as_text() == other.as_text(),
		}
	}
}

impl Eq for ParamValue {}

impl fmt::Display for ParamValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Int(n) => write!(f, "{}", n),
			Self::Str(s) => write!(f, "{}", s),
		}
	}
}

impl From<&str> for ParamValue {
	fn from(value: &str) -> Self {
		Self::Str(value.to_string())
	}
}

impl From<String> for ParamValue {
	fn from(value: String) -> Self {
		Self::Str(value)
	}
}

impl From<i64> for ParamValue {
	fn from(value: i64) -> Self {
		Self::Int(value)
	}
}

impl From<i32> for ParamValue {
	fn from(value: i32) -> Self {
		Self::Int(i64::from(value))
	}
}

impl From<u32> for ParamValue {
	fn from(value: u32) -> Self {
		Self::Int(i64::from(value))
	}
}

/// Ordered mapping of parameter names to values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params(BTreeMap<String, ParamValue>);

impl Params {
	/// Creates an empty parameter set.
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds a parameter and returns `self` for chaining.
	pub fn with(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
		self.insert(name, value);
		self
	}

	/// Inserts a parameter, returning the previous value.
	pub fn insert(
		&mut self,
		name: impl Into<String>,
		value: impl Into<ParamValue>,
	) -> Option<ParamValue> {
		self.0.insert(name.into(), value.into())
	}

	/// Returns the value for `name`.
	pub fn get(&self, name: &str) -> Option<&ParamValue> {
		self.0.get(name)
	}

	/// Returns the URL text for `name`.
	pub fn text(&self, name: &str) -> Option<Cow<'_, str>> {
		self.0.get(name).map(ParamValue::as_text)
	}

	pub fn contains(&self, name: &str) -> bool {
		self.0.contains_key(name)
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
		self.0.iter().map(|(k, v)| (k.as_str(), v))
	}

	/// Returns true when every parameter in `self` is present in `other`
	/// with an equal value.
	pub fn is_subset_of(&self, other: &Params) -> bool {
		self.0
			.iter()
			.all(|(name, value)| other.get(name) == Some(value))
	}

	/// Returns the parameters restricted to `names`.
	pub fn select<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> Params {
		names
			.into_iter()
			.filter_map(|name| self.0.get(name).map(|v| (name.to_string(), v.clone())))
			.collect()
	}
}

impl FromIterator<(String, ParamValue)> for Params {
	fn from_iter<I: IntoIterator<Item = (String, ParamValue)>>(iter: I) -> Self {
		Self(iter.into_iter().collect())
	}
}

impl<'a> IntoIterator for &'a Params {
	type Item = (&'a String, &'a ParamValue);
	type IntoIter = std::collections::btree_map::Iter<'a, String, ParamValue>;

	fn into_iter(self) -> Self::IntoIter {
		self.0.iter()
	}
}

/// Builds a [`Params`] value.
///
/// ```
/// use sentier_routes::{Params, params};
///
/// let p = params! { "id" => 1, "tab" => "info" };
/// assert_eq!(p.text("id").as_deref(), Some("1"));
/// assert_eq!(params! {}, Params::new());
/// ```
#[macro_export]
macro_rules! params {
	() => { $crate::Params::new() };
	($($name:expr => $value:expr),+ $(,)?) => {{
		let mut params = $crate::Params::new();
		$( params.insert($name, $value); )+
		params
	}};
}
