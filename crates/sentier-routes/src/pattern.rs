//! Segment pattern matching for route nodes.
//!
//! Every node of the route tree owns one [`SegmentPattern`]: the part of the
//! URL it contributes relative to its parent. Patterns use the same
//! brace syntax as the rest of the workspace:
//!
//! - `/users` - literal text, matched exactly
//! - `/view/{id}` - named parameter, captures one path component
//! - `/view/{id:\d+}` - named parameter with a regex constraint
//! - `/files/{path:*}` - splat, captures the remainder of the path
//! - `/search?q&page` - declared query parameters
//!
//! Patterns are matched as *prefixes*: a node consumes its own part of the
//! path and hands the remainder to its children.

use crate::error::RouteTreeError;
use crate::params::Params;
use std::borrow::Cow;

/// Maximum allowed length for a pattern string in bytes.
const MAX_PATTERN_LENGTH: usize = 1024;

/// Maximum allowed number of path segments in a pattern.
const MAX_PATH_SEGMENTS: usize = 32;

/// Maximum allowed size for a compiled pattern regex (in bytes).
const MAX_REGEX_SIZE: usize = 1 << 20; // 1 MiB

/// One piece of a compiled pattern, kept for path building.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
	Literal(String),
	Param(String),
	Splat(String),
}

/// A compiled node pattern.
#[derive(Debug, Clone)]
pub struct SegmentPattern {
	/// The original pattern string.
	pattern: String,
	/// Compiled prefix regex for the path part.
	regex: regex::Regex,
	/// Path tokens in order.
	tokens: Vec<Token>,
	/// Path parameter names in order.
	param_names: Vec<String>,
	/// Declared query parameter names in order.
	query_names: Vec<String>,
}

impl SegmentPattern {
	/// Compiles a pattern string.
	///
	/// # Errors
	///
	/// Returns [`RouteTreeError::InvalidPattern`] if:
	/// - the pattern exceeds the maximum length (1024 bytes)
	/// - the pattern has too many path segments (>32)
	/// - a parameter is unterminated, unnamed, or declared twice
	/// - a constraint is not a valid regex
	pub fn new(pattern: &str) -> Result<Self, RouteTreeError> {
		let invalid = |reason: String| RouteTreeError::InvalidPattern {
			pattern: pattern.to_string(),
			reason,
		};

		if pattern.len() > MAX_PATTERN_LENGTH {
			return Err(invalid(format!(
				"pattern length {} exceeds maximum allowed length of {} bytes",
				pattern.len(),
				MAX_PATTERN_LENGTH
			)));
		}

		let (path_part, query_part) = match pattern.split_once('?') {
			Some((path, query)) => (path, Some(query)),
			None => (pattern, None),
		};

		let segment_count = path_part.split('/').count();
		if segment_count > MAX_PATH_SEGMENTS {
			return Err(invalid(format!(
				"pattern has {} path segments, exceeding maximum of {}",
				segment_count, MAX_PATH_SEGMENTS
			)));
		}

		let (regex_str, tokens) = Self::compile_path(path_part).map_err(invalid)?;

		let regex = regex::RegexBuilder::new(&regex_str)
			.size_limit(MAX_REGEX_SIZE)
			.build()
			.map_err(|e| invalid(format!("failed to compile pattern regex: {}", e)))?;

		let param_names: Vec<String> = tokens
			.iter()
			.filter_map(|t| match t {
				Token::Param(name) | Token::Splat(name) => Some(name.clone()),
				Token::Literal(_) => None,
			})
			.collect();

		let mut query_names = Vec::new();
		for name in query_part.into_iter().flat_map(|q| q.split('&')) {
			if name.is_empty() {
				continue;
			}
			if !is_identifier(name) {
				return Err(invalid(format!("invalid query parameter name '{}'", name)));
			}
			if param_names.iter().any(|p| p == name) || query_names.iter().any(|q| q == name) {
				return Err(invalid(format!("parameter '{}' declared twice", name)));
			}
			query_names.push(name.to_string());
		}

		Ok(Self {
			pattern: pattern.to_string(),
			regex,
			tokens,
			param_names,
			query_names,
		})
	}

	/// Compiles the path part into a prefix regex and a token list.
	fn compile_path(path: &str) -> Result<(String, Vec<Token>), String> {
		let mut regex_str = String::from("^");
		let mut tokens = Vec::new();
		let mut literal = String::new();
		let mut seen: Vec<String> = Vec::new();
		let mut chars = path.chars();

		while let Some(c) = chars.next() {
			match c {
				'{' => {
					if !literal.is_empty() {
						regex_str.push_str(&regex::escape(&literal));
						tokens.push(Token::Literal(std::mem::take(&mut literal)));
					}

					// Constraints may contain braces of their own (`\d{2}`).
					let mut body = String::new();
					let mut depth = 0usize;
					let mut closed = false;
					for next in chars.by_ref() {
						match next {
							'{' => {
								depth += 1;
								body.push(next);
							}
							'}' if depth == 0 => {
								closed = true;
								break;
							}
							'}' => {
								depth -= 1;
								body.push(next);
							}
							_ => body.push(next),
						}
					}
					if !closed {
						return Err("unterminated parameter".to_string());
					}

					let (name, constraint) = match body.split_once(':') {
						Some((name, constraint)) => (name, Some(constraint)),
						None => (body.as_str(), None),
					};
					if !is_identifier(name) {
						return Err(format!("invalid parameter name '{}'", name));
					}
					if seen.iter().any(|s| s == name) {
						return Err(format!("parameter '{}' declared twice", name));
					}
					seen.push(name.to_string());

					match constraint {
						Some("*") => {
							regex_str.push_str(&format!("(?P<{}>.*)", name));
							tokens.push(Token::Splat(name.to_string()));
						}
						Some(constraint) if !constraint.is_empty() => {
							regex_str.push_str(&format!("(?P<{}>{})", name, constraint));
							tokens.push(Token::Param(name.to_string()));
						}
						_ => {
							regex_str.push_str(&format!("(?P<{}>[^/]+)", name));
							tokens.push(Token::Param(name.to_string()));
						}
					}
				}
				'}' => return Err("unmatched '}'".to_string()),
				_ => literal.push(c),
			}
		}

		if !literal.is_empty() {
			regex_str.push_str(&regex::escape(&literal));
			tokens.push(Token::Literal(literal));
		}

		Ok((regex_str, tokens))
	}

	/// Returns the original pattern string.
	pub fn pattern(&self) -> &str {
		&self.pattern
	}

	/// Returns the path parameter names.
	pub fn param_names(&self) -> &[String] {
		&self.param_names
	}

	/// Returns the declared query parameter names.
	pub fn query_names(&self) -> &[String] {
		&self.query_names
	}

	/// Returns whether the path part has no parameters.
	pub fn is_exact(&self) -> bool {
		self.param_names.is_empty()
	}

	/// Attempts to match the start of `path` (query string already removed).
	///
	/// Returns the number of bytes consumed and the decoded path parameters.
	/// A match must end on a segment boundary: `/users` matches `/users` and
	/// `/users/list` but not `/users2`.
	pub fn match_prefix(&self, path: &str) -> Option<(usize, Vec<(String, String)>)> {
		let caps = self.regex.captures(path)?;
		let end = caps.get(0)?.end();

		let consumed = &path[..end];
		let rest = &path[end..];
		if !(rest.is_empty() || rest.starts_with('/') || consumed.ends_with('/')) {
			return None;
		}

		let params = self
			.param_names
			.iter()
			.filter_map(|name| {
				caps.name(name)
					.map(|m| (name.clone(), decode(m.as_str()).into_owned()))
			})
			.collect();

		Some((end, params))
	}

	/// Builds this node's path part from `params`.
	///
	/// Returns the name of the first missing parameter on failure. An empty
	/// value counts as missing for a named segment, since the built path
	/// could never match again. A splat may be empty.
	pub fn build(&self, params: &Params) -> Result<String, String> {
		let mut result = String::new();

		for token in &self.tokens {
			match token {
				Token::Literal(text) => result.push_str(text),
				Token::Param(name) => {
					let value = params
						.text(name)
						.filter(|value| !value.is_empty())
						.ok_or_else(|| name.clone())?;
					result.push_str(&urlencoding::encode(&value));
				}
				Token::Splat(name) => {
					let value = params.text(name).ok_or_else(|| name.clone())?;
					let encoded: Vec<_> = value.split('/').map(urlencoding::encode).collect();
					result.push_str(&encoded.join("/"));
				}
			}
		}

		Ok(result)
	}
}

impl PartialEq for SegmentPattern {
	fn eq(&self, other: &Self) -> bool {
		self.pattern == other.pattern
	}
}

impl Eq for SegmentPattern {}

impl std::fmt::Display for SegmentPattern {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.pattern)
	}
}

fn is_identifier(name: &str) -> bool {
	let mut chars = name.chars();
	matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
		&& chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn decode(raw: &str) -> Cow<'_, str> {
	urlencoding::decode(raw).unwrap_or(Cow::Borrowed(raw))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::params;
	use rstest::rstest;

	#[rstest]
	fn test_exact_pattern() {
		let pattern = SegmentPattern::new("/users").unwrap();

		assert!(pattern.is_exact());
		assert_eq!(pattern.match_prefix("/users"), Some((6, vec![])));
		assert_eq!(pattern.match_prefix("/users/list"), Some((6, vec![])));
		assert_eq!(pattern.match_prefix("/users2"), None);
		assert_eq!(pattern.match_prefix("/orders"), None);
	}

	#[rstest]
	fn test_single_param() {
		let pattern = SegmentPattern::new("/view/{id}").unwrap();

		let (consumed, params) = pattern.match_prefix("/view/42/edit").unwrap();

		assert!(!pattern.is_exact());
		assert_eq!(consumed, 8);
		assert_eq!(params, vec![("id".to_string(), "42".to_string())]);
	}

	#[rstest]
	fn test_constrained_param() {
		let pattern = SegmentPattern::new(r"/{section:section\d+}").unwrap();

		assert!(pattern.match_prefix("/section1").is_some());
		assert!(pattern.match_prefix("/about").is_none());
		// The constraint must end on a segment boundary
		assert!(pattern.match_prefix("/section1x").is_none());
	}

	#[rstest]
	fn test_constraint_with_braces() {
		let pattern = SegmentPattern::new(r"/year/{year:\d{4}}").unwrap();

		assert!(pattern.match_prefix("/year/2024").is_some());
		assert!(pattern.match_prefix("/year/24").is_none());
	}

	#[rstest]
	fn test_splat_param() {
		let pattern = SegmentPattern::new("/files/{path:*}").unwrap();

		let (consumed, params) = pattern.match_prefix("/files/css/main.css").unwrap();

		assert_eq!(consumed, "/files/css/main.css".len());
		assert_eq!(
			params,
			vec![("path".to_string(), "css/main.css".to_string())]
		);
	}

	#[rstest]
	fn test_query_names() {
		let pattern = SegmentPattern::new("/query?param2&param3").unwrap();

		assert_eq!(pattern.query_names(), &["param2", "param3"]);
		assert!(pattern.param_names().is_empty());
		assert!(pattern.match_prefix("/query").is_some());
	}

	#[rstest]
	fn test_decodes_captured_values() {
		let pattern = SegmentPattern::new("/tags/{tag}").unwrap();

		let (_, params) = pattern.match_prefix("/tags/a%20b").unwrap();

		assert_eq!(params[0].1, "a b");
	}

	#[rstest]
	fn test_build_encodes_values() {
		let pattern = SegmentPattern::new("/tags/{tag}").unwrap();

		let path = pattern.build(&params! { "tag" => "a b" }).unwrap();

		assert_eq!(path, "/tags/a%20b");
	}

	#[rstest]
	fn test_build_splat_keeps_separators() {
		let pattern = SegmentPattern::new("/files/{path:*}").unwrap();

		let path = pattern.build(&params! { "path" => "css/main.css" }).unwrap();

		assert_eq!(path, "/files/css/main.css");
	}

	#[rstest]
	fn test_build_missing_param() {
		let pattern = SegmentPattern::new("/view/{id}").unwrap();

		assert_eq!(pattern.build(&Params::new()), Err("id".to_string()));
	}

	#[rstest]
	fn test_build_empty_param_is_missing() {
		let pattern = SegmentPattern::new("/view/{id}").unwrap();

		assert_eq!(pattern.build(&params! { "id" => "" }), Err("id".to_string()));
	}

	#[rstest]
	#[case("/view/{id")]
	#[case("/view/id}")]
	#[case("/view/{}")]
	#[case("/view/{1id}")]
	#[case("/a/{id}/b/{id}")]
	#[case("/search?q&q")]
	#[case("/view/{id:[}")]
	fn test_invalid_patterns(#[case] pattern: &str) {
		let result = SegmentPattern::new(pattern);

		assert!(matches!(
			result,
			Err(RouteTreeError::InvalidPattern { .. })
		));
	}

	#[rstest]
	fn test_pattern_rejects_excessive_length() {
		// Arrange: a pattern exceeding 1024 bytes
		let long_pattern = "/".to_string() + &"a".repeat(1025);

		// Act
		let result = SegmentPattern::new(&long_pattern);

		// Assert
		let err = result.unwrap_err();
		assert!(err.to_string().contains("exceeds maximum allowed length"));
	}

	#[rstest]
	fn test_pattern_rejects_excessive_segments() {
		// Arrange: a pattern with more than 32 segments
		let segments: Vec<&str> = (0..35).map(|_| "seg").collect();
		let pattern = format!("/{}", segments.join("/"));

		// Act
		let result = SegmentPattern::new(&pattern);

		// Assert
		assert!(result.unwrap_err().to_string().contains("exceeding maximum"));
	}

	#[rstest]
	fn test_pattern_display_and_equality() {
		let p1 = SegmentPattern::new("/view/{id}").unwrap();
		let p2 = SegmentPattern::new("/view/{id}").unwrap();
		let p3 = SegmentPattern::new("/view/{user_id}").unwrap();

		assert_eq!(format!("{}", p1), "/view/{id}");
		assert_eq!(p1, p2);
		assert_ne!(p1, p3);
	}
}
