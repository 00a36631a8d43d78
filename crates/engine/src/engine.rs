use std::sync::Arc;

use recast_codec::{CodecRegistry, load_forest};
use recast_config::{ConfigOptions, ConfigSource, EngineConfig, StaticConfig};
use recast_primitives::{Forest, UnitPath};
use tracing::info;

use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::error::RunError;
use crate::recipe::Recipe;
use crate::rule::RuleId;
use crate::scheduler::{RunReport, Scheduler};

/// Batch entry point: a recipe plus the configuration it runs under.
///
/// The engine keeps no state between runs; every [`Engine::run`] starts from
/// an empty accumulator store.
pub struct Engine {
	recipe: Recipe,
	config: EngineConfig,
	source: Arc<dyn ConfigSource>,
}

impl Engine {
	/// Engine with default engine settings and default options for every scope.
	pub fn new(recipe: Recipe) -> Self {
		Self {
			recipe,
			config: EngineConfig::default(),
			source: Arc::new(StaticConfig::new(ConfigOptions::default())),
		}
	}

	pub fn with_config(mut self, config: EngineConfig) -> Self {
		self.config = config;
		self
	}

	pub fn with_source(mut self, source: impl ConfigSource + 'static) -> Self {
		self.source = Arc::new(source);
		self
	}

	pub fn recipe(&self) -> &Recipe {
		&self.recipe
	}

	pub fn config(&self) -> &EngineConfig {
		&self.config
	}

	/// Runs the recipe over `forest` to convergence.
	///
	/// Besides rule and merge problems, the report lists every manual-review
	/// marker that was not already present in the input.
	pub fn run(&self, forest: Forest) -> Result<RunReport, RunError> {
		let initial = forest.clone();
		let scheduler = Scheduler::new(&self.recipe, &self.config, self.source.as_ref());
		let mut report = scheduler.run(forest)?;
		report.diagnostics.extend(review_diagnostics(&initial, &report.forest));
		info!(
			recipe = self.recipe.name(),
			cycles = report.cycle_count(),
			diagnostics = report.diagnostics.len(),
			"engine.converged"
		);
		Ok(report)
	}

	/// Parses `sources`, reports the ones that fail, and runs over the rest.
	pub fn run_sources<I, B>(&self, sources: I, codecs: &CodecRegistry) -> Result<RunReport, RunError>
	where
		I: IntoIterator<Item = (UnitPath, B)>,
		B: AsRef<[u8]>,
	{
		let loaded = load_forest(sources, codecs);
		let mut diagnostics: Vec<Diagnostic> = loaded
			.failures
			.into_iter()
			.map(|failure| Diagnostic::new(DiagnosticKind::Parse, failure.path, failure.error.to_string()))
			.collect();

		let mut report = self.run(loaded.forest)?;
		diagnostics.append(&mut report.diagnostics);
		report.diagnostics = diagnostics;
		Ok(report)
	}
}

/// One diagnostic per manual-review marker present in `after` but not in `before`.
fn review_diagnostics(before: &Forest, after: &Forest) -> Vec<Diagnostic> {
	let mut found = Vec::new();
	for unit in after.iter() {
		let previous = before.get(unit.path());
		for (kind, node, value) in unit.review_markers() {
			if previous.is_some_and(|prev| prev.has_marker(node, kind)) {
				continue;
			}
			let reason = value.as_note().unwrap_or("needs manual review");
			found.push(
				Diagnostic::new(DiagnosticKind::AmbiguousPattern, unit.path().clone(), format!("{node}: {reason}"))
					.with_rule(RuleId::new(kind.namespace())),
			);
		}
	}
	found
}
