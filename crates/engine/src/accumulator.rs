//! Per-rule, per-scope scan aggregates.
//!
//! Scanning folds observations into an [`Accumulator`] keyed by
//! `(rule, scope)`. Workers scan disjoint units into private stores which are
//! then [`absorbed`](AccumulatorStore::absorb) into one; this is only sound
//! because [`Accumulator::merge`] is associative and commutative.

use std::any::Any;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use recast_primitives::ScopeId;

use crate::rule::RuleId;


/// Rule-defined aggregate with an initial value and a merge contract.
///
/// `Default` is the initial value. `merge` must be associative and
/// commutative, so that any partition and order of scanned units yields the
/// same final value.
pub trait Accumulator: Default + Clone + PartialEq + fmt::Debug + Send + Sync + 'static {
	fn merge(&mut self, other: Self);

	/// Whether nothing has been observed; generation is skipped for initial values.
	fn is_initial(&self) -> bool {
		*self == Self::default()
	}
}

/// Type-erased accumulator as held by the store.
pub trait AccumulatorBox: Any + Send + Sync + fmt::Debug {
	fn merge_box(&mut self, other: Box<dyn AccumulatorBox>);
	fn clone_box(&self) -> Box<dyn AccumulatorBox>;
	fn is_initial(&self) -> bool;
	fn as_any(&self) -> &dyn Any;
	fn as_any_mut(&mut self) -> &mut dyn Any;
	fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<A: Accumulator> AccumulatorBox for A {
	fn merge_box(&mut self, other: Box<dyn AccumulatorBox>) {
		// Slots are owned by a single rule, so the types always agree.
		if let Ok(other) = other.into_any().downcast::<A>() {
			self.merge(*other);
		}
	}

	fn clone_box(&self) -> Box<dyn AccumulatorBox> {
		Box::new(self.clone())
	}

	fn is_initial(&self) -> bool {
		Accumulator::is_initial(self)
	}

	fn as_any(&self) -> &dyn Any {
		self
	}

	fn as_any_mut(&mut self) -> &mut dyn Any {
		self
	}

	fn into_any(self: Box<Self>) -> Box<dyn Any> {
		self
	}
}

impl Clone for Box<dyn AccumulatorBox> {
	fn clone(&self) -> Self {
		self.clone_box()
	}
}

type SlotKey = (RuleId, ScopeId);

/// Accumulators keyed by `(rule, scope)`.
///
/// Owned by the scheduler for one run and cleared at the start of every
/// cycle's scan, so values never outlive the units they were observed from.
#[derive(Debug, Clone, Default)]
pub struct AccumulatorStore {
	slots: BTreeMap<SlotKey, Box<dyn AccumulatorBox>>,
}

impl AccumulatorStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn is_empty(&self) -> bool {
		self.slots.is_empty()
	}

	pub fn len(&self) -> usize {
		self.slots.len()
	}

	pub fn clear(&mut self) {
		self.slots.clear();
	}

	/// Current value, or the initial value when nothing was folded.
	pub fn get<A: Accumulator>(&self, rule: &RuleId, scope: &ScopeId) -> Cow<'_, A> {
		self.slots
			.get(&(rule.clone(), scope.clone()))
			.and_then(|slot| slot.as_any().downcast_ref::<A>())
			.map_or_else(|| Cow::Owned(A::default()), Cow::Borrowed)
	}

	/// Merges `observation` into the slot.
	pub fn fold<A: Accumulator>(&mut self, rule: &RuleId, scope: &ScopeId, observation: A) {
		self.fold_box(rule, scope, Box::new(observation));
	}

	pub fn fold_box(&mut self, rule: &RuleId, scope: &ScopeId, observation: Box<dyn AccumulatorBox>) {
		match self.slots.get_mut(&(rule.clone(), scope.clone())) {
			Some(slot) => slot.merge_box(observation),
			None => {
				self.slots.insert((rule.clone(), scope.clone()), observation);
			}
		}
	}

	/// Mutable slot, created from `initial` on first use.
	pub fn slot_mut(
		&mut self,
		rule: &RuleId,
		scope: &ScopeId,
		initial: impl FnOnce() -> Box<dyn AccumulatorBox>,
	) -> &mut dyn AccumulatorBox {
		self.slots
			.entry((rule.clone(), scope.clone()))
			.or_insert_with(initial)
			.as_mut()
	}

	/// Merges every slot of `other` into this store.
	pub fn absorb(&mut self, other: AccumulatorStore) {
		for ((rule, scope), value) in other.slots {
			self.fold_box(&rule, &scope, value);
		}
	}

	/// Scopes with a non-initial value for `rule`, in scope order.
	pub fn scopes_for<'a>(&'a self, rule: &'a RuleId) -> impl Iterator<Item = (&'a ScopeId, &'a dyn AccumulatorBox)> {
		self.slots
			.iter()
			.filter(move |((owner, _), value)| owner == rule && !value.is_initial())
			.map(|((_, scope), value)| (scope, value.as_ref()))
	}
}
