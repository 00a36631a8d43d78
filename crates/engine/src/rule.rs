//! Rule capabilities.
//!
//! A [`Rule`] bundles up to two independently authored capabilities:
//!
//! - a [`Mutator`] rewrites one unit in isolation, guarded by its own markers;
//! - a [`Scanner`] folds observations into a per-scope [`Accumulator`] and later
//!   proposes artifacts from the final value.
//!
//! Rules hold no state across cycles; everything a scanner remembers lives in
//! the accumulator store owned by the scheduler.

use std::fmt;
use std::sync::Arc;

use recast_config::ConfigOptions;
use recast_primitives::{ScopeId, Unit};

use crate::accumulator::{Accumulator, AccumulatorBox};
use crate::artifact::Artifact;
use crate::error::RuleError;

/// Stable rule identity; also the namespace of the rule's markers.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleId(Arc<str>);

impl RuleId {
	pub fn new(id: &str) -> Self {
		Self(Arc::from(id))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Debug for RuleId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "RuleId({})", self.0)
	}
}

impl fmt::Display for RuleId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for RuleId {
	fn from(id: &str) -> Self {
		Self::new(id)
	}
}

/// Context handed to every rule invocation.
#[derive(Debug, Clone, Copy)]
pub struct RuleCx<'a> {
	pub rule: &'a RuleId,
	pub scope: &'a ScopeId,
	pub options: &'a ConfigOptions,
	/// 1-based index of the running cycle.
	pub cycle: usize,
}

impl RuleCx<'_> {
	/// The rule's marker namespace.
	pub fn namespace(&self) -> &str {
		self.rule.as_str()
	}
}

/// Pure rewrite of one unit.
///
/// Returns `Ok(None)` when nothing applies. Must be idempotent: a position
/// the rule already handled carries its marker and is skipped. Ambiguous
/// patterns are flagged for review, never guessed.
pub trait Mutator: Send + Sync + 'static {
	fn mutate(&self, unit: &Unit, cx: &RuleCx<'_>) -> Result<Option<Unit>, RuleError>;
}

impl<F> Mutator for F
where
	F: Fn(&Unit, &RuleCx<'_>) -> Result<Option<Unit>, RuleError> + Send + Sync + 'static,
{
	fn mutate(&self, unit: &Unit, cx: &RuleCx<'_>) -> Result<Option<Unit>, RuleError> {
		self(unit, cx)
	}
}

/// Scan/accumulate/generate capability.
pub trait Scanner: Send + Sync + 'static {
	type Acc: Accumulator;

	/// Folds what `unit` shows into `acc`; never changes the unit.
	fn scan(&self, unit: &Unit, cx: &RuleCx<'_>, acc: &mut Self::Acc);

	/// Proposes artifacts from the scope's final value for the cycle.
	///
	/// Only called with non-initial values, but must return nothing for an
	/// initial one anyway.
	fn generate(&self, _acc: &Self::Acc, _cx: &RuleCx<'_>) -> Vec<Artifact> {
		Vec::new()
	}
}

/// Object-safe view of a [`Scanner`] over erased accumulators.
pub(crate) trait ErasedScanner: Send + Sync {
	fn initial(&self) -> Box<dyn AccumulatorBox>;
	fn scan(&self, unit: &Unit, cx: &RuleCx<'_>, acc: &mut dyn AccumulatorBox);
	fn generate(&self, acc: &dyn AccumulatorBox, cx: &RuleCx<'_>) -> Vec<Artifact>;
}

struct ScannerAdapter<S>(S);

impl<S: Scanner> ErasedScanner for ScannerAdapter<S> {
	fn initial(&self) -> Box<dyn AccumulatorBox> {
		Box::new(S::Acc::default())
	}

	fn scan(&self, unit: &Unit, cx: &RuleCx<'_>, acc: &mut dyn AccumulatorBox) {
		if let Some(acc) = acc.as_any_mut().downcast_mut::<S::Acc>() {
			self.0.scan(unit, cx, acc);
		}
	}

	fn generate(&self, acc: &dyn AccumulatorBox, cx: &RuleCx<'_>) -> Vec<Artifact> {
		match acc.as_any().downcast_ref::<S::Acc>() {
			Some(acc) if !Accumulator::is_initial(acc) => self.0.generate(acc, cx),
			_ => Vec::new(),
		}
	}
}

/// A named set of capabilities.
pub struct Rule {
	id: RuleId,
	description: Box<str>,
	mutator: Option<Box<dyn Mutator>>,
	scanner: Option<Box<dyn ErasedScanner>>,
}

impl Rule {
	pub fn new(id: &str) -> Self {
		Self {
			id: RuleId::new(id),
			description: Box::from(""),
			mutator: None,
			scanner: None,
		}
	}

	pub fn describe(mut self, description: &str) -> Self {
		self.description = description.into();
		self
	}

	pub fn mutator(mut self, mutator: impl Mutator) -> Self {
		self.mutator = Some(Box::new(mutator));
		self
	}

	/// Closure form of [`Rule::mutator`].
	pub fn mutate_with<F>(self, mutate: F) -> Self
	where
		F: Fn(&Unit, &RuleCx<'_>) -> Result<Option<Unit>, RuleError> + Send + Sync + 'static,
	{
		self.mutator(mutate)
	}

	pub fn scanner(mut self, scanner: impl Scanner) -> Self {
		self.scanner = Some(Box::new(ScannerAdapter(scanner)));
		self
	}

	pub fn id(&self) -> &RuleId {
		&self.id
	}

	pub fn description(&self) -> &str {
		&self.description
	}

	pub fn can_mutate(&self) -> bool {
		self.mutator.is_some()
	}

	pub fn can_scan(&self) -> bool {
		self.scanner.is_some()
	}

	/// Applies the mutate capability alone; `Ok(None)` for rules without one.
	pub fn mutate(&self, unit: &Unit, cx: &RuleCx<'_>) -> Result<Option<Unit>, RuleError> {
		match &self.mutator {
			Some(mutator) => mutator.mutate(unit, cx),
			None => Ok(None),
		}
	}

	pub(crate) fn erased_scanner(&self) -> Option<&dyn ErasedScanner> {
		self.scanner.as_deref()
	}
}

impl fmt::Debug for Rule {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Rule")
			.field("id", &self.id)
			.field("mutate", &self.can_mutate())
			.field("scan", &self.can_scan())
			.finish()
	}
}
