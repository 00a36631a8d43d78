use rustc_hash::FxHashMap as HashMap;

use crate::marker::{MarkerKind, MarkerValue};
use crate::tree::{Node, NodeId};
use crate::unit::Unit;

/// Node-level change between two versions of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum NodeChange {
	Added(NodeId),
	Removed(NodeId),
	/// Kind, label, text, attributes or child order changed.
	Modified(NodeId),
}

impl NodeChange {
	pub fn node(self) -> NodeId {
		match self {
			Self::Added(id) | Self::Removed(id) | Self::Modified(id) => id,
		}
	}
}

/// Structural difference between two versions of one unit.
///
/// Empty iff the two versions are equal, so it doubles as the "no change"
/// test and as the audit detail for a change record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitDiff {
	pub nodes: Vec<NodeChange>,
	pub markers_added: Vec<(MarkerKind, NodeId, MarkerValue)>,
	pub markers_removed: Vec<(MarkerKind, NodeId, MarkerValue)>,
	pub path_changed: bool,
}

impl UnitDiff {
	pub fn between(before: &Unit, after: &Unit) -> Self {
		let mut diff = UnitDiff {
			path_changed: before.path() != after.path(),
			..UnitDiff::default()
		};

		if !before.tree().ptr_eq(after.tree()) {
			let old: HashMap<NodeId, &Node> = before.tree().iter().map(|n| (n.id(), n)).collect();
			let new: HashMap<NodeId, &Node> = after.tree().iter().map(|n| (n.id(), n)).collect();

			for (id, node) in &old {
				match new.get(id) {
					None => diff.nodes.push(NodeChange::Removed(*id)),
					Some(next) => {
						if !node.same_content(next) || !node.child_ids().eq(next.child_ids()) {
							diff.nodes.push(NodeChange::Modified(*id));
						}
					}
				}
			}
			for id in new.keys() {
				if !old.contains_key(id) {
					diff.nodes.push(NodeChange::Added(*id));
				}
			}
			diff.nodes.sort_by_key(|c| (c.node(), *c));
		}

		for (kind, node, value) in before.marker_set().iter() {
			if after.marker_set().get(node, kind) != Some(value) {
				diff.markers_removed.push((kind.clone(), node, value.clone()));
			}
		}
		for (kind, node, value) in after.marker_set().iter() {
			if before.marker_set().get(node, kind) != Some(value) {
				diff.markers_added.push((kind.clone(), node, value.clone()));
			}
		}

		diff
	}

	pub fn is_empty(&self) -> bool {
		!self.path_changed
			&& self.nodes.is_empty()
			&& self.markers_added.is_empty()
			&& self.markers_removed.is_empty()
	}
}
