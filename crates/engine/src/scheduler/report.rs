use recast_primitives::{ChangeSet, Forest, UnitPath};

use crate::diagnostics::{Diagnostic, DiagnosticKind};

/// Scheduler states, in cycle order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
	Idle,
	Scanning,
	Mutating,
	Generating,
	/// Terminal: the last cycle changed nothing.
	Converged,
	/// The cycle changed units; another one follows.
	NextCycle,
}

impl Phase {
	pub fn label(self) -> &'static str {
		match self {
			Self::Idle => "idle",
			Self::Scanning => "scanning",
			Self::Mutating => "mutating",
			Self::Generating => "generating",
			Self::Converged => "converged",
			Self::NextCycle => "next-cycle",
		}
	}

	/// States reachable from `self` in one step.
	pub fn successors(self) -> &'static [Phase] {
		match self {
			Self::Idle | Self::NextCycle => &[Self::Scanning],
			Self::Scanning => &[Self::Mutating],
			Self::Mutating => &[Self::Generating],
			Self::Generating => &[Self::Converged, Self::NextCycle],
			Self::Converged => &[],
		}
	}

	pub fn is_terminal(self) -> bool {
		self.successors().is_empty()
	}
}

/// Audit record of one cycle.
#[derive(Debug, Clone)]
pub struct CycleReport {
	/// 1-based cycle index.
	pub index: usize,
	pub phases: Vec<Phase>,
	/// Units visited by the scan phase.
	pub scanned: usize,
	/// Units rewritten by mutators.
	pub mutated: usize,
	/// Artifacts proposed by generators, before merging.
	pub generated: usize,
	/// Every unit that differs between the start and the end of the cycle.
	pub changes: ChangeSet,
}

impl CycleReport {
	pub(crate) fn new(index: usize) -> Self {
		Self {
			index,
			phases: Vec::new(),
			scanned: 0,
			mutated: 0,
			generated: 0,
			changes: ChangeSet::default(),
		}
	}

	pub fn converged(&self) -> bool {
		self.phases.last() == Some(&Phase::Converged)
	}
}

/// Outcome of a converged run.
#[derive(Debug, Clone)]
pub struct RunReport {
	/// Latest version of every unit.
	pub forest: Forest,
	/// One report per executed cycle; the last one is the empty, converged cycle.
	pub cycles: Vec<CycleReport>,
	/// Deduplicated, in first-occurrence order.
	pub diagnostics: Vec<Diagnostic>,
}

impl RunReport {
	pub fn cycle_count(&self) -> usize {
		self.cycles.len()
	}

	pub fn change_sets(&self) -> impl Iterator<Item = &ChangeSet> {
		self.cycles.iter().map(|c| &c.changes)
	}

	/// Paths changed by any cycle, in first-change order.
	pub fn changed_paths(&self) -> Vec<&UnitPath> {
		let mut seen = Vec::new();
		for path in self.change_sets().flat_map(ChangeSet::paths) {
			if !seen.contains(&path) {
				seen.push(path);
			}
		}
		seen
	}

	pub fn diagnostics_of(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
		self.diagnostics.iter().filter(move |d| d.kind == kind)
	}
}
