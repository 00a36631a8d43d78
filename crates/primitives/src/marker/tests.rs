use proptest::prelude::*;

use super::*;
use crate::kinds;
use crate::tree::{NodeSpec, Tree};

fn node_ids(count: usize) -> Vec<NodeId> {
	let tree = Tree::build(NodeSpec::new(kinds::SOURCE).children((0..count).map(|_| NodeSpec::new(kinds::LINE))));
	tree.iter().map(|n| n.id()).collect()
}

#[test]
fn test_remove_prunes_empty_kinds() {
	let ids = node_ids(1);
	let kind = MarkerKind::new("r", "m");
	let mut set = MarkerSet::new();
	set.insert(ids[0], kind.clone(), MarkerValue::Flag);
	assert_eq!(set.len(), 1);
	assert_eq!(set.remove(ids[0], &kind), Some(MarkerValue::Flag));
	assert!(set.is_empty());
	assert_eq!(set, MarkerSet::new());
}

#[test]
fn test_manual_review_kind() {
	let kind = MarkerKind::manual_review("flag-todo");
	assert!(kind.is_manual_review());
	assert_eq!(kind.to_string(), "flag-todo/manual-review");
	assert!(!MarkerKind::new("flag-todo", "seen").is_manual_review());
}

proptest! {
	#[test]
	fn prop_insertion_order_does_not_affect_equality(
		picks in prop::collection::vec((0usize..6, 0usize..3), 0..24),
		seed in any::<u64>(),
	) {
		let ids = node_ids(6);
		let kinds = [MarkerKind::new("a", "x"), MarkerKind::new("b", "x"), MarkerKind::manual_review("a")];

		let mut forward = MarkerSet::new();
		for (node, kind) in &picks {
			forward.insert(ids[*node], kinds[*kind].clone(), MarkerValue::Flag);
		}

		let mut shuffled = picks.clone();
		let len = shuffled.len().max(1);
		shuffled.rotate_left((seed as usize) % len);
		shuffled.reverse();
		let mut backward = MarkerSet::new();
		for (node, kind) in &shuffled {
			backward.insert(ids[*node], kinds[*kind].clone(), MarkerValue::Flag);
		}

		prop_assert_eq!(&forward, &backward);
		let ordered: Vec<_> = forward.iter().map(|(k, n, _)| (k.clone(), n)).collect();
		let mut sorted = ordered.clone();
		sorted.sort();
		prop_assert_eq!(ordered, sorted);
	}
}
