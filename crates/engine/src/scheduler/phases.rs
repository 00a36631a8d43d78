use std::sync::Arc;

use rayon::prelude::*;
use recast_config::{ConfigOptions, ConfigSource, EngineConfig};
use recast_primitives::{Forest, ScopeId, Unit};
use rustc_hash::FxHashMap as HashMap;
use tracing::trace;

use crate::accumulator::{AccumulatorBox, AccumulatorStore};
use crate::artifact::GeneratedArtifact;
use crate::diagnostics::Diagnostic;
use crate::merge;
use crate::recipe::Recipe;
use crate::rule::{ErasedScanner, Rule, RuleCx};
use crate::scope::ScopeResolver;

/// Per-scope options, loaded once per cycle.
pub(crate) struct ScopeConfigs<'s> {
	source: &'s dyn ConfigSource,
	loaded: HashMap<ScopeId, Arc<ConfigOptions>>,
}

impl<'s> ScopeConfigs<'s> {
	fn new(source: &'s dyn ConfigSource, scopes: impl IntoIterator<Item = ScopeId>) -> Self {
		let loaded = scopes
			.into_iter()
			.map(|scope| {
				let options = source.load(&scope);
				(scope, options)
			})
			.collect();
		Self { source, loaded }
	}

	pub(crate) fn get(&self, scope: &ScopeId) -> Arc<ConfigOptions> {
		match self.loaded.get(scope) {
			Some(options) => options.clone(),
			None => self.source.load(scope),
		}
	}
}

/// Everything one cycle's phases share; immutable once built.
pub(crate) struct CycleContext<'a> {
	pub(crate) recipe: &'a Recipe,
	pub(crate) resolver: ScopeResolver,
	pub(crate) configs: ScopeConfigs<'a>,
	pub(crate) cycle: usize,
	pub(crate) parallel: bool,
}

impl<'a> CycleContext<'a> {
	/// Resolves scopes against `snapshot` and preloads their options.
	pub(crate) fn new(
		recipe: &'a Recipe,
		snapshot: &Forest,
		config: &EngineConfig,
		source: &'a dyn ConfigSource,
		cycle: usize,
	) -> Self {
		let resolver = ScopeResolver::for_forest(snapshot, &config.module_markers);
		let configs = ScopeConfigs::new(source, resolver.scopes());
		Self {
			recipe,
			resolver,
			configs,
			cycle,
			parallel: config.is_parallel(),
		}
	}

	fn map_units<T, F>(&self, units: &[&Unit], f: F) -> Vec<T>
	where
		T: Send,
		F: Fn(&Unit) -> T + Sync + Send,
	{
		if self.parallel {
			units.par_iter().map(|unit| f(unit)).collect()
		} else {
			units.iter().map(|unit| f(unit)).collect()
		}
	}
}

/// Outcome for the scan phase.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ScanPhaseOutcome {
	pub(crate) scanned: usize,
	pub(crate) slots: usize,
}

/// Outcome for the mutate phase.
#[derive(Debug, Clone, Default)]
pub(crate) struct MutatePhaseOutcome {
	pub(crate) mutated: usize,
	pub(crate) diagnostics: Vec<Diagnostic>,
}

/// Outcome for the generate phase.
#[derive(Debug, Clone, Default)]
pub(crate) struct GeneratePhaseOutcome {
	pub(crate) generated: usize,
	pub(crate) written: usize,
	pub(crate) diagnostics: Vec<Diagnostic>,
}

/// Rebuilds `store` from the cycle's starting snapshot.
///
/// Units are scanned into worker-local stores that are then absorbed, so the
/// result does not depend on how units were partitioned.
pub(crate) fn phase_scan(cx: &CycleContext<'_>, units: &[&Unit], store: &mut AccumulatorStore) -> ScanPhaseOutcome {
	let scan_into = |mut local: AccumulatorStore, unit: &&Unit| {
		scan_unit(cx, unit, &mut local);
		local
	};
	let scanned = if cx.parallel {
		units
			.par_iter()
			.fold(AccumulatorStore::new, scan_into)
			.reduce(AccumulatorStore::new, |mut acc, part| {
				acc.absorb(part);
				acc
			})
	} else {
		units.iter().fold(AccumulatorStore::new(), scan_into)
	};

	store.clear();
	store.absorb(scanned);
	ScanPhaseOutcome {
		scanned: units.len(),
		slots: store.len(),
	}
}

fn scan_unit(cx: &CycleContext<'_>, unit: &Unit, store: &mut AccumulatorStore) {
	let scope = cx.resolver.resolve(unit.path());
	let options = cx.configs.get(&scope);
	for rule in cx.recipe.scanners() {
		let Some(scanner) = rule.erased_scanner() else {
			continue;
		};
		if !options.is_rule_enabled(rule.id().as_str()) {
			continue;
		}
		let rule_cx = RuleCx {
			rule: rule.id(),
			scope: &scope,
			options: &options,
			cycle: cx.cycle,
		};
		let slot = store.slot_mut(rule.id(), &scope, || scanner.initial());
		scanner.scan(unit, &rule_cx, slot);
	}
}

/// Runs the recipe's mutators over every unit of the snapshot.
///
/// Units are independent of each other; rule order is kept within each unit.
pub(crate) fn phase_mutate(cx: &CycleContext<'_>, units: &[&Unit], forest: &mut Forest) -> MutatePhaseOutcome {
	let results = cx.map_units(units, |unit| {
		let scope = cx.resolver.resolve(unit.path());
		let options = cx.configs.get(&scope);
		cx.recipe.mutate_unit(unit, &scope, &options, cx.cycle)
	});

	let mut outcome = MutatePhaseOutcome::default();
	for result in results {
		outcome.diagnostics.extend(result.diagnostics);
		if let Some(unit) = result.unit {
			trace!(path = %unit.path(), rules = result.applied.len(), "engine.unit_mutated");
			forest.insert(unit);
			outcome.mutated += 1;
		}
	}
	outcome
}

struct GenerateJob<'a> {
	rule: &'a Rule,
	scanner: &'a dyn ErasedScanner,
	scope: &'a ScopeId,
	acc: &'a dyn AccumulatorBox,
}

/// Invokes every generator once per scope with a non-initial value, then
/// merges the proposals into `forest`.
///
/// Proposals are ordered by rule declaration, then scope, whatever the
/// execution mode; merge writes are serialized.
pub(crate) fn phase_generate(cx: &CycleContext<'_>, store: &AccumulatorStore, forest: &mut Forest) -> GeneratePhaseOutcome {
	let mut jobs = Vec::new();
	for rule in cx.recipe.scanners() {
		let Some(scanner) = rule.erased_scanner() else {
			continue;
		};
		for (scope, acc) in store.scopes_for(rule.id()) {
			jobs.push(GenerateJob {
				rule,
				scanner,
				scope,
				acc,
			});
		}
	}

	let run_job = |job: &GenerateJob<'_>| -> Vec<GeneratedArtifact> {
		let options = cx.configs.get(job.scope);
		if !options.is_rule_enabled(job.rule.id().as_str()) {
			return Vec::new();
		}
		let rule_cx = RuleCx {
			rule: job.rule.id(),
			scope: job.scope,
			options: &options,
			cycle: cx.cycle,
		};
		job.scanner
			.generate(job.acc, &rule_cx)
			.into_iter()
			.map(|artifact| GeneratedArtifact::new(job.rule.id().clone(), job.scope.clone(), artifact))
			.collect()
	};
	let proposals: Vec<Vec<GeneratedArtifact>> = if cx.parallel {
		jobs.par_iter().map(run_job).collect()
	} else {
		jobs.iter().map(run_job).collect()
	};

	let proposals: Vec<GeneratedArtifact> = proposals.into_iter().flatten().collect();
	let generated = proposals.len();
	let summary = merge::apply(forest, proposals);
	GeneratePhaseOutcome {
		generated,
		written: summary.written.len(),
		diagnostics: summary.diagnostics,
	}
}
