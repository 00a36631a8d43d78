//! Error types for rules, merging and runs.

use recast_primitives::{PathError, TreeError, UnitPath};
use thiserror::Error;

use crate::rule::RuleId;

/// Failure inside one rule invocation.
///
/// Rule failures are local: the unit keeps its previous version and the
/// failure is reported as a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
	#[error("tree edit failed: {0}")]
	Tree(#[from] TreeError),
	#[error("invalid path: {0}")]
	Path(#[from] PathError),
	#[error("option {key}: {message}")]
	Option { key: String, message: String },
	/// A mutation tried to move its unit to another path.
	#[error("mutation moved {from} to {to}")]
	PathChanged { from: UnitPath, to: UnitPath },
}

/// Failure to reconcile a generated artifact with the forest.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MergeError {
	/// The existing unit is not a keyed entry document.
	#[error("{path}: cannot merge entries into a `{kind}` unit")]
	NotEntryDocument { path: UnitPath, kind: String },
	#[error("tree edit failed: {0}")]
	Tree(#[from] TreeError),
}

/// Rejected recipe composition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecipeError {
	#[error("rule `{0}` is registered twice")]
	DuplicateRule(RuleId),
}

/// Fatal run outcome.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunError {
	/// Units were still changing after the last permitted cycle.
	///
	/// Always a rule-design defect: two rules oscillating, or a rule that is
	/// not idempotent.
	#[error("no convergence after {limit} cycles; still changing: {}", display_paths(pending))]
	NonConvergence { limit: usize, pending: Vec<UnitPath> },
}

fn display_paths(paths: &[UnitPath]) -> String {
	paths.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}
