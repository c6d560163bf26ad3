//! The named route tree.
//!
//! A tree is declared once, compiled by [`RouteTreeBuilder::build`], and
//! never mutated afterwards. Nodes live in an arena and are addressed by
//! [`NodeId`]; full dotted names are resolved to ids once so that callers
//! (listener registries, the transition engine) can key their own tables by
//! id instead of re-parsing names.

use crate::error::RouteTreeError;
use crate::params::{ParamValue, Params};
use crate::pattern::SegmentPattern;
use crate::state::RouterState;
use std::collections::HashMap;

/// Identifier of a node inside one [`RouteTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
	/// The root node of every tree.
	pub const ROOT: NodeId = NodeId(0);

	/// Returns the arena index.
	pub fn index(self) -> usize {
		self.0
	}
}

/// Declarative route definition used to build a tree.
///
/// # Example
///
/// ```
/// use sentier_routes::{Route, RouteTree};
///
/// let tree = RouteTree::builder()
///     .route(Route::new("home", "/home"))
///     .route(
///         Route::new("users", "/users")
///             .child(Route::new("list", "/list"))
///             .child(Route::new("view", "/view/{id}")),
///     )
///     .build()
///     .unwrap();
///
/// assert_eq!(tree.len(), 4);
/// ```
#[derive(Debug, Clone)]
pub struct Route {
	name: String,
	path: String,
	children: Vec<Route>,
}

impl Route {
	/// Creates a route with a single name segment and a path pattern.
	pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			path: path.into(),
			children: Vec::new(),
		}
	}

	/// Appends a child route. Children are matched in insertion order.
	pub fn child(mut self, route: Route) -> Self {
		self.children.push(route);
		self
	}

	/// Appends several child routes.
	pub fn children(mut self, routes: impl IntoIterator<Item = Route>) -> Self {
		self.children.extend(routes);
		self
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn path(&self) -> &str {
		&self.path
	}
}

enum Entry {
	Nested(Route),
	Dotted { full_name: String, path: String },
}

/// Builder collecting route definitions in declaration order.
#[derive(Default)]
pub struct RouteTreeBuilder {
	entries: Vec<Entry>,
}

impl RouteTreeBuilder {
	/// Adds a top-level route (with its nested children).
	pub fn route(mut self, route: Route) -> Self {
		self.entries.push(Entry::Nested(route));
		self
	}

	/// Adds a route by its full dotted name, e.g. `("users.view", "/view/{id}")`.
	///
	/// The parent must already be declared.
	pub fn add(mut self, full_name: impl Into<String>, path: impl Into<String>) -> Self {
		self.entries.push(Entry::Dotted {
			full_name: full_name.into(),
			path: path.into(),
		});
		self
	}

	/// Compiles every pattern and validates names.
	///
	/// # Errors
	///
	/// Returns an error for an empty or dotted name segment, a duplicate full
	/// name, a dotted route whose parent is unknown, or an invalid pattern.
	pub fn build(self) -> Result<RouteTree, RouteTreeError> {
		let mut tree = RouteTree::empty();

		for entry in self.entries {
			match entry {
				Entry::Nested(route) => tree.insert_nested(NodeId::ROOT, route)?,
				Entry::Dotted { full_name, path } => {
					let (parent, segment) = match full_name.rsplit_once('.') {
						Some((parent, segment)) => (parent, segment),
						None => ("", full_name.as_str()),
					};
					let parent_id =
						tree.lookup(parent)
							.ok_or_else(|| RouteTreeError::ParentNotFound {
								name: full_name.clone(),
								parent: parent.to_string(),
							})?;
					tree.insert(parent_id, segment, &path)?;
				}
			}
		}

		Ok(tree)
	}
}

/// A compiled node of the route tree.
#[derive(Debug, Clone)]
pub struct RouteNode {
	name: String,
	full_name: String,
	pattern: Option<SegmentPattern>,
	parent: Option<NodeId>,
	children: Vec<NodeId>,
}

impl RouteNode {
	/// Returns the node's own name segment (empty for the root).
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Returns the full dotted name (empty for the root).
	pub fn full_name(&self) -> &str {
		&self.full_name
	}

	/// Returns the compiled pattern; the root has none.
	pub fn pattern(&self) -> Option<&SegmentPattern> {
		self.pattern.as_ref()
	}

	pub fn parent(&self) -> Option<NodeId> {
		self.parent
	}

	/// Child ids in matching priority order.
	pub fn children(&self) -> &[NodeId] {
		&self.children
	}

	/// Names of every parameter this node declares (path and query).
	pub fn own_param_names(&self) -> impl Iterator<Item = &str> {
		self.pattern.iter().flat_map(|p| {
			p.param_names()
				.iter()
				.chain(p.query_names())
				.map(String::as_str)
		})
	}
}

/// Options that change how a path is matched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchOptions {
	/// When false, one trailing `/` on the path is ignored.
	pub strict_trailing_slash: bool,
}

/// Immutable hierarchy of named routes.
#[derive(Debug, Clone)]
pub struct RouteTree {
	nodes: Vec<RouteNode>,
	by_name: HashMap<String, NodeId>,
}

impl RouteTree {
	/// Starts a new tree declaration.
	pub fn builder() -> RouteTreeBuilder {
		RouteTreeBuilder::default()
	}

	fn empty() -> Self {
		let root = RouteNode {
			name: String::new(),
			full_name: String::new(),
			pattern: None,
			parent: None,
			children: Vec::new(),
		};
		let mut by_name = HashMap::new();
		by_name.insert(String::new(), NodeId::ROOT);
		Self {
			nodes: vec![root],
			by_name,
		}
	}

	fn insert_nested(&mut self, parent: NodeId, route: Route) -> Result<(), RouteTreeError> {
		let id = self.insert(parent, &route.name, &route.path)?;
		for child in route.children {
			self.insert_nested(id, child)?;
		}
		Ok(())
	}

	fn insert(&mut self, parent: NodeId, name: &str, path: &str) -> Result<NodeId, RouteTreeError> {
		if name.is_empty() {
			return Err(RouteTreeError::MissingName(path.to_string()));
		}
		if name.contains('.') {
			return Err(RouteTreeError::InvalidName(name.to_string()));
		}

		let parent_name = &self.nodes[parent.0].full_name;
		let full_name = if parent_name.is_empty() {
			name.to_string()
		} else {
			format!("{}.{}", parent_name, name)
		};
		if self.by_name.contains_key(&full_name) {
			return Err(RouteTreeError::DuplicateRoute(full_name));
		}

		let pattern = SegmentPattern::new(path)?;
		let id = NodeId(self.nodes.len());
		self.nodes.push(RouteNode {
			name: name.to_string(),
			full_name: full_name.clone(),
			pattern: Some(pattern),
			parent: Some(parent),
			children: Vec::new(),
		});
		self.nodes[parent.0].children.push(id);
		self.by_name.insert(full_name, id);
		Ok(id)
	}

	/// Number of nodes, root included.
	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	/// Returns true when only the root exists.
	pub fn is_empty(&self) -> bool {
		self.nodes.len() == 1
	}

	/// Resolves a full dotted name; `""` is the root.
	pub fn lookup(&self, name: &str) -> Option<NodeId> {
		self.by_name.get(name).copied()
	}

	pub fn contains(&self, name: &str) -> bool {
		self.by_name.contains_key(name)
	}

	/// Returns the node for `id`.
	///
	/// # Panics
	///
	/// Panics if `id` was produced by another tree and is out of range.
	pub fn node(&self, id: NodeId) -> &RouteNode {
		&self.nodes[id.0]
	}

	/// Returns the ids from the first top-level node down to `id`.
	///
	/// The root is not included, so the chain of the root is empty.
	pub fn chain(&self, id: NodeId) -> Vec<NodeId> {
		let mut chain = Vec::new();
		let mut current = Some(id);
		while let Some(node_id) = current {
			if node_id == NodeId::ROOT {
				break;
			}
			chain.push(node_id);
			current = self.nodes[node_id.0].parent;
		}
		chain.reverse();
		chain
	}

	/// Returns true when `ancestor` is `id` or one of its ancestors.
	pub fn is_ancestor_or_self(&self, ancestor: NodeId, id: NodeId) -> bool {
		let mut current = Some(id);
		while let Some(node_id) = current {
			if node_id == ancestor {
				return true;
			}
			current = self.nodes[node_id.0].parent;
		}
		false
	}

	/// Returns the params of `params` that node `id` declares itself.
	pub fn node_params(&self, id: NodeId, params: &Params) -> Params {
		params.select(self.nodes[id.0].own_param_names())
	}

	/// Builds the path for a route.
	///
	/// # Errors
	///
	/// Returns [`RouteTreeError::RouteNotFound`] for an unknown name and
	/// [`RouteTreeError::MissingParameter`] when a path parameter is absent.
	pub fn build_path(&self, name: &str, params: &Params) -> Result<String, RouteTreeError> {
		let id = self
			.lookup(name)
			.ok_or_else(|| RouteTreeError::RouteNotFound(name.to_string()))?;

		let mut path = String::new();
		let mut query: Vec<(&str, String)> = Vec::new();

		for node_id in self.chain(id) {
			let Some(pattern) = self.nodes[node_id.0].pattern.as_ref() else {
				continue;
			};
			let part = pattern
				.build(params)
				.map_err(|param| RouteTreeError::MissingParameter {
					route: name.to_string(),
					param,
				})?;
			path.push_str(&part);
			for q in pattern.query_names() {
				if let Some(value) = params.text(q) {
					query.push((q.as_str(), value.into_owned()));
				}
			}
		}

		if !query.is_empty() {
			let encoded = serde_urlencoded::to_string(&query).unwrap_or_default();
			path.push('?');
			path.push_str(&encoded);
		}

		Ok(path)
	}

	/// Matches a path with strict trailing slash handling.
	pub fn match_path(&self, path: &str) -> Option<RouterState> {
		self.match_path_with(path, MatchOptions {
			strict_trailing_slash: true,
		})
	}

	/// Matches a path against the tree.
	///
	/// Children are tried in insertion order at every level and the first
	/// full match wins. When a child matches a prefix but none of its
	/// descendants can complete the match, the next sibling is tried.
	/// The returned state carries `path` unchanged.
	pub fn match_path_with(&self, path: &str, options: MatchOptions) -> Option<RouterState> {
		let (path_part, query_part) = match path.split_once('?') {
			Some((p, q)) => (p, Some(q)),
			None => (path, None),
		};

		let mut captured = Vec::new();
		let id = self.match_children(NodeId::ROOT, path_part, &mut captured, options)?;

		let mut params: Params = captured
			.into_iter()
			.map(|(k, v)| (k, ParamValue::Str(v)))
			.collect();

		if let Some(query) = query_part {
			let pairs: Vec<(String, String)> =
				serde_urlencoded::from_str(query).unwrap_or_default();
			for node_id in self.chain(id) {
				let Some(pattern) = self.nodes[node_id.0].pattern.as_ref() else {
					continue;
				};
				for name in pattern.query_names() {
					if let Some((_, value)) = pairs.iter().find(|(k, _)| k == name) {
						params.insert(name.clone(), value.clone());
					}
				}
			}
		}

		Some(RouterState::new(
			self.nodes[id.0].full_name.clone(),
			params,
			path,
		))
	}

	fn match_children(
		&self,
		parent: NodeId,
		rest: &str,
		captured: &mut Vec<(String, String)>,
		options: MatchOptions,
	) -> Option<NodeId> {
		for &child in &self.nodes[parent.0].children {
			let Some(pattern) = self.nodes[child.0].pattern.as_ref() else {
				continue;
			};
			let Some((consumed, params)) = pattern.match_prefix(rest) else {
				continue;
			};

			let mark = captured.len();
			captured.extend(params);
			let remaining = &rest[consumed..];

			if remaining.is_empty() || (!options.strict_trailing_slash && remaining == "/") {
				return Some(child);
			}
			if let Some(found) = self.match_children(child, remaining, captured, options) {
				return Some(found);
			}
			captured.truncate(mark);
		}
		None
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::params;
	use rstest::{fixture, rstest};

	#[fixture]
	fn tree() -> RouteTree {
		RouteTree::builder()
			.route(Route::new("home", "/home"))
			.route(
				Route::new("users", "/users")
					.child(Route::new("view", "/view/{id}"))
					.child(Route::new("list", "/list")),
			)
			.route(Route::new("admin", "/admin"))
			.build()
			.unwrap()
	}

	#[rstest]
	fn test_lookup_and_chain(tree: RouteTree) {
		let view = tree.lookup("users.view").unwrap();
		let users = tree.lookup("users").unwrap();

		assert_eq!(tree.lookup(""), Some(NodeId::ROOT));
		assert_eq!(tree.chain(view), vec![users, view]);
		assert!(tree.chain(NodeId::ROOT).is_empty());
		assert!(tree.is_ancestor_or_self(users, view));
		assert!(!tree.is_ancestor_or_self(view, users));
		assert_eq!(tree.node(view).full_name(), "users.view");
		assert_eq!(tree.node(view).name(), "view");
	}

	#[rstest]
	fn test_node_params(tree: RouteTree) {
		let view = tree.lookup("users.view").unwrap();
		let users = tree.lookup("users").unwrap();
		let params = params! { "id" => 1 };

		assert_eq!(tree.node_params(view, &params), params);
		assert!(tree.node_params(users, &params).is_empty());
	}

	#[rstest]
	fn test_dotted_definitions() {
		let tree = RouteTree::builder()
			.add("users", "/users")
			.add("users.view", "/view/{id}")
			.build()
			.unwrap();

		assert!(tree.contains("users.view"));
	}

	#[rstest]
	fn test_dotted_definition_requires_parent() {
		let result = RouteTree::builder().add("users.view", "/view/{id}").build();

		assert!(matches!(
			result,
			Err(RouteTreeError::ParentNotFound { .. })
		));
	}

	#[rstest]
	#[case(Route::new("", "/x"), RouteTreeError::MissingName("/x".to_string()))]
	#[case(Route::new("a.b", "/x"), RouteTreeError::InvalidName("a.b".to_string()))]
	fn test_invalid_names(#[case] route: Route, #[case] expected: RouteTreeError) {
		let result = RouteTree::builder().route(route).build();

		assert_eq!(result.unwrap_err(), expected);
	}

	#[rstest]
	fn test_duplicate_full_name() {
		let result = RouteTree::builder()
			.route(Route::new("users", "/users"))
			.route(Route::new("users", "/people"))
			.build();

		assert_eq!(
			result.unwrap_err(),
			RouteTreeError::DuplicateRoute("users".to_string())
		);
	}

	#[rstest]
	fn test_trailing_slash_option(tree: RouteTree) {
		let lenient = MatchOptions {
			strict_trailing_slash: false,
		};

		assert!(tree.match_path("/users/list/").is_none());
		let state = tree.match_path_with("/users/list/", lenient).unwrap();
		assert_eq!(state.name, "users.list");
		assert_eq!(state.path, "/users/list/");
	}
}
