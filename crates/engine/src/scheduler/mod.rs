//! Fixed-point cycle driver.
//!
//! Each cycle scans the forest as it stood at the end of the previous cycle,
//! runs the mutators, then generates and merges artifacts. The cycle's
//! [`ChangeSet`] decides what happens next: empty means converged, anything
//! else means another cycle, up to the configured limit.

mod phases;
mod report;

use indexmap::IndexSet;
use recast_config::{ConfigSource, EngineConfig};
use recast_primitives::{ChangeSet, Forest, Unit};
use tracing::{debug, trace};

pub use report::{CycleReport, Phase, RunReport};

use crate::accumulator::AccumulatorStore;
use crate::diagnostics::Diagnostic;
use crate::error::RunError;
use crate::recipe::Recipe;


/// Drives one run of a recipe over a forest.
///
/// The accumulator store lives for exactly one [`Scheduler::run`] call.
pub struct Scheduler<'r> {
	recipe: &'r Recipe,
	config: &'r EngineConfig,
	source: &'r dyn ConfigSource,
}

impl<'r> Scheduler<'r> {
	pub fn new(recipe: &'r Recipe, config: &'r EngineConfig, source: &'r dyn ConfigSource) -> Self {
		Self { recipe, config, source }
	}

	/// Runs cycles until one changes nothing.
	///
	/// # Errors
	///
	/// [`RunError::NonConvergence`] when the last permitted cycle still
	/// changed units.
	pub fn run(&self, mut forest: Forest) -> Result<RunReport, RunError> {
		let limit = self.config.cycle_limit;
		let mut store = AccumulatorStore::new();
		let mut cycles: Vec<CycleReport> = Vec::new();
		let mut diagnostics: IndexSet<Diagnostic> = IndexSet::new();
		let mut state = Phase::Idle;

		for cycle in 1..=limit {
			let _cycle_span = tracing::debug_span!("engine.cycle", engine.cycle_idx = cycle).entered();
			let start = forest.clone();
			let units: Vec<&Unit> = start.iter().collect();
			let cx = phases::CycleContext::new(self.recipe, &start, self.config, self.source, cycle);
			let mut report = CycleReport::new(cycle);

			enter(&mut state, &mut report, Phase::Scanning);
			let scan = phases::phase_scan(&cx, &units, &mut store);
			report.scanned = scan.scanned;
			trace!(engine.cycle_idx = cycle, slots = scan.slots, "engine.scanned");

			enter(&mut state, &mut report, Phase::Mutating);
			let mutate = phases::phase_mutate(&cx, &units, &mut forest);
			report.mutated = mutate.mutated;
			diagnostics.extend(mutate.diagnostics);

			enter(&mut state, &mut report, Phase::Generating);
			let generate = phases::phase_generate(&cx, &store, &mut forest);
			report.generated = generate.generated;
			diagnostics.extend(generate.diagnostics);
			trace!(engine.cycle_idx = cycle, written = generate.written, "engine.generated");

			report.changes = ChangeSet::between(&start, &forest);
			debug!(
				engine.cycle_idx = cycle,
				scanned = report.scanned,
				mutated = report.mutated,
				generated = report.generated,
				changed = report.changes.len(),
				"engine.cycle_done"
			);

			if report.changes.is_empty() {
				enter(&mut state, &mut report, Phase::Converged);
				cycles.push(report);
				return Ok(RunReport {
					forest,
					cycles,
					diagnostics: diagnostics.into_iter().collect(),
				});
			}
			enter(&mut state, &mut report, Phase::NextCycle);
			cycles.push(report);
		}

		let pending = cycles
			.last()
			.map(|c| c.changes.paths().cloned().collect())
			.unwrap_or_default();
		debug!(limit, "engine.non_convergence");
		Err(RunError::NonConvergence { limit, pending })
	}
}

fn enter(state: &mut Phase, report: &mut CycleReport, next: Phase) {
	debug_assert!(
		state.successors().contains(&next),
		"illegal phase transition {state:?} -> {next:?}"
	);
	trace!(engine.phase = next.label(), from = state.label(), "engine.phase");
	*state = next;
	report.phases.push(next);
}
