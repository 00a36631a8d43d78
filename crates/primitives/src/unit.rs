use crate::diff::UnitDiff;
use crate::marker::{MarkerKind, MarkerSet, MarkerValue};
use crate::path::UnitPath;
use crate::tree::{NodeId, Tree};


/// Immutable snapshot of one parsed artifact.
///
/// A unit is identified by its path and carries a tree plus the markers
/// attached to its nodes. Every transformation returns a new value; two units
/// are equal iff path, tree and markers are equal, which is what the
/// scheduler's convergence test relies on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit {
	path: UnitPath,
	tree: Tree,
	markers: MarkerSet,
}

impl Unit {
	pub fn new(path: UnitPath, tree: Tree) -> Self {
		Self {
			path,
			tree,
			markers: MarkerSet::new(),
		}
	}

	pub fn path(&self) -> &UnitPath {
		&self.path
	}

	pub fn tree(&self) -> &Tree {
		&self.tree
	}

	pub fn marker_set(&self) -> &MarkerSet {
		&self.markers
	}

	/// Root node kind, used by rules to recognize the unit's format.
	pub fn root_kind(&self) -> &str {
		self.tree.root().kind()
	}

	/// Replaces the tree, dropping markers whose node no longer exists.
	///
	/// Markers only carry over when `tree` was edited from this unit's tree;
	/// a freshly built tree reuses ids for unrelated nodes, so it starts
	/// without markers.
	pub fn with_tree(&self, tree: Tree) -> Unit {
		let mut markers = self.markers.clone();
		if tree.same_lineage(&self.tree) {
			markers.retain_positions(|id| tree.contains(id));
		} else {
			markers = MarkerSet::new();
		}
		Unit {
			path: self.path.clone(),
			tree,
			markers,
		}
	}

	/// Attaches a marker at a node; unknown positions leave the unit unchanged.
	pub fn with_marker(&self, node: NodeId, kind: MarkerKind, value: MarkerValue) -> Unit {
		if !self.tree.contains(node) {
			return self.clone();
		}
		let mut next = self.clone();
		next.markers.insert(node, kind, value);
		next
	}

	pub fn without_marker(&self, node: NodeId, kind: &MarkerKind) -> Unit {
		let mut next = self.clone();
		next.markers.remove(node, kind);
		next
	}

	/// Flags a node as needing manual attention on behalf of `namespace`.
	pub fn flag_for_review(&self, node: NodeId, namespace: &str, reason: &str) -> Unit {
		self.with_marker(node, MarkerKind::manual_review(namespace), MarkerValue::note(reason))
	}

	pub fn marker(&self, node: NodeId, kind: &MarkerKind) -> Option<&MarkerValue> {
		self.markers.get(node, kind)
	}

	pub fn has_marker(&self, node: NodeId, kind: &MarkerKind) -> bool {
		self.marker(node, kind).is_some()
	}

	/// Markers of one kind in position order.
	pub fn markers(&self, kind: &MarkerKind) -> impl Iterator<Item = (NodeId, &MarkerValue)> {
		self.markers.of_kind(kind)
	}

	/// Every manual-review marker regardless of owning rule.
	pub fn review_markers(&self) -> impl Iterator<Item = (&MarkerKind, NodeId, &MarkerValue)> {
		self.markers.iter().filter(|(kind, _, _)| kind.is_manual_review())
	}

	/// Structural diff from `self` to `after`.
	pub fn diff(&self, after: &Unit) -> UnitDiff {
		UnitDiff::between(self, after)
	}
}
