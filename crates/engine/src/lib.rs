//! Execution substrate for rule-based source transformation.
//!
//! A [`Recipe`] of [`Rule`]s runs over a [`Forest`](recast_primitives::Forest)
//! of parsed units in cycles. Every cycle scans the forest into per-scope
//! accumulators, applies direct mutations in rule order, and merges the
//! artifacts generated from the accumulators back into the forest. Cycles
//! repeat until one changes nothing, bounded by
//! [`EngineConfig::cycle_limit`](recast_config::EngineConfig::cycle_limit).

/// Per-rule, per-scope scan aggregates.
pub mod accumulator;
/// Generated artifact types.
pub mod artifact;
/// Non-fatal run diagnostics.
pub mod diagnostics;
mod engine;
pub mod error;
/// Append-only merging of generated entries.
pub mod merge;
/// Ordered rule composition.
pub mod recipe;
/// Rule capabilities and identity.
pub mod rule;
/// Fixed-point cycle driver.
pub mod scheduler;
/// Module scope resolution.
pub mod scope;

#[cfg(test)]
mod invariants;

pub use accumulator::{Accumulator, AccumulatorStore};
pub use artifact::{Artifact, GeneratedArtifact};
pub use diagnostics::{Diagnostic, DiagnosticKind, Severity};
pub use engine::Engine;
pub use error::{MergeError, RecipeError, RuleError, RunError};
pub use recipe::{Recipe, RecipeBuilder};
pub use rule::{Mutator, Rule, RuleCx, RuleId, Scanner};
pub use scheduler::{CycleReport, Phase, RunReport, Scheduler};
pub use scope::{ScopeResolver, resolve_scope};
