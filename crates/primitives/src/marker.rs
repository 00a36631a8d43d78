use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap as HashMap;

use crate::tree::NodeId;

#[cfg(test)]
mod tests;

/// Marker name used by every rule for "needs manual review" flags.
pub const MANUAL_REVIEW: &str = "manual-review";

/// Typed, rule-namespaced marker identity.
///
/// The namespace is the owning rule's id; the name distinguishes several
/// marker kinds owned by one rule.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerKind {
	namespace: Arc<str>,
	name: Arc<str>,
}

impl MarkerKind {
	pub fn new(namespace: &str, name: &str) -> Self {
		Self {
			namespace: Arc::from(namespace),
			name: Arc::from(name),
		}
	}

	/// The "needs manual review" kind for a rule namespace.
	pub fn manual_review(namespace: &str) -> Self {
		Self::new(namespace, MANUAL_REVIEW)
	}

	pub fn namespace(&self) -> &str {
		&self.namespace
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn is_manual_review(&self) -> bool {
		&*self.name == MANUAL_REVIEW
	}
}

impl fmt::Debug for MarkerKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}/{}", self.namespace, self.name)
	}
}

impl fmt::Display for MarkerKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}/{}", self.namespace, self.name)
	}
}

/// Value carried by a marker.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MarkerValue {
	/// Presence-only flag.
	Flag,
	/// Free-form note, e.g. the reason a position needs review.
	Note(Box<str>),
}

impl MarkerValue {
	pub fn note(text: impl Into<Box<str>>) -> Self {
		Self::Note(text.into())
	}

	pub fn as_note(&self) -> Option<&str> {
		match self {
			Self::Flag => None,
			Self::Note(text) => Some(text),
		}
	}
}

/// Markers attached to the nodes of one unit, indexed by kind.
///
/// Lookups by kind hash the kind; positions within a kind are ordered by
/// node id so iteration is deterministic. Empty per-kind maps are never kept,
/// which keeps structural equality exact.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkerSet {
	by_kind: HashMap<MarkerKind, BTreeMap<NodeId, MarkerValue>>,
}

impl MarkerSet {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn is_empty(&self) -> bool {
		self.by_kind.is_empty()
	}

	/// Total number of attached markers.
	pub fn len(&self) -> usize {
		self.by_kind.values().map(BTreeMap::len).sum()
	}

	pub fn insert(&mut self, node: NodeId, kind: MarkerKind, value: MarkerValue) {
		self.by_kind.entry(kind).or_default().insert(node, value);
	}

	pub fn remove(&mut self, node: NodeId, kind: &MarkerKind) -> Option<MarkerValue> {
		let positions = self.by_kind.get_mut(kind)?;
		let removed = positions.remove(&node);
		if positions.is_empty() {
			self.by_kind.remove(kind);
		}
		removed
	}

	pub fn get(&self, node: NodeId, kind: &MarkerKind) -> Option<&MarkerValue> {
		self.by_kind.get(kind)?.get(&node)
	}

	/// Markers of one kind, ordered by position.
	pub fn of_kind(&self, kind: &MarkerKind) -> impl Iterator<Item = (NodeId, &MarkerValue)> {
		self.by_kind
			.get(kind)
			.into_iter()
			.flat_map(|positions| positions.iter().map(|(id, v)| (*id, v)))
	}

	/// Every marker, ordered by kind then position.
	pub fn iter(&self) -> impl Iterator<Item = (&MarkerKind, NodeId, &MarkerValue)> {
		let mut kinds: Vec<_> = self.by_kind.iter().collect();
		kinds.sort_by(|a, b| a.0.cmp(b.0));
		kinds
			.into_iter()
			.flat_map(|(kind, positions)| positions.iter().map(move |(id, v)| (kind, *id, v)))
	}

	/// Drops markers whose position no longer satisfies `keep`.
	pub fn retain_positions(&mut self, mut keep: impl FnMut(NodeId) -> bool) {
		self.by_kind.retain(|_, positions| {
			positions.retain(|id, _| keep(*id));
			!positions.is_empty()
		});
	}
}
