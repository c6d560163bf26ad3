//! Which nodes a transition leaves and enters.

use sentier_routes::{NodeId, RouteTree, RouterState};

/// Nodes affected by moving from one state to another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionPath {
	/// Deepest node active in both states with unchanged own params.
	pub intersection: NodeId,
	/// Nodes left, deepest first.
	pub to_deactivate: Vec<NodeId>,
	/// Nodes entered, shallowest first.
	pub to_activate: Vec<NodeId>,
}

impl TransitionPath {
	/// Computes the path between `from` and `to`.
	///
	/// With `reload` no node is shared: every node of `from` is left and
	/// every node of `to` is entered again. A state whose name is not in the
	/// tree contributes no nodes.
	pub fn compute(
		tree: &RouteTree,
		from: Option<&RouterState>,
		to: &RouterState,
		reload: bool,
	) -> Self {
		let chain_of = |state: Option<&RouterState>| {
			state
				.and_then(|s| tree.lookup(&s.name))
				.map(|id| tree.chain(id))
				.unwrap_or_default()
		};
		let from_chain = chain_of(from);
		let to_chain = chain_of(Some(to));

		let mut shared = 0;
		if let (false, Some(from)) = (reload, from) {
			while shared < from_chain.len().min(to_chain.len()) {
				let node = from_chain[shared];
				if node != to_chain[shared]
					|| tree.node_params(node, &from.params) != tree.node_params(node, &to.params)
				{
					break;
				}
				shared += 1;
			}
		}

		let intersection = if shared == 0 {
			NodeId::ROOT
		} else {
			from_chain[shared - 1]
		};

		Self {
			intersection,
			to_deactivate: from_chain[shared..].iter().rev().copied().collect(),
			to_activate: to_chain[shared..].to_vec(),
		}
	}

	/// Every node entered or left.
	pub fn changed(&self) -> Vec<NodeId> {
		self.to_deactivate
			.iter()
			.chain(&self.to_activate)
			.copied()
			.collect()
	}
}
