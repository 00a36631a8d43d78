use pretty_assertions::assert_eq;
use recast_config::{EngineConfig, Execution};
use recast_primitives::{EntryDocument, Forest, NodeSpec, Section, Tree, Unit, UnitPath, kinds};
use rstest::rstest;

use crate::accumulator::Accumulator;
use crate::artifact::Artifact;
use crate::error::RunError;
use crate::recipe::Recipe;
use crate::rule::{Rule, RuleCx, Scanner};
use crate::scheduler::{Phase, RunReport};
use crate::{DiagnosticKind, Engine};

fn init_tracing() {
	let _ = tracing_subscriber::fmt().with_test_writer().with_max_level(tracing::Level::TRACE).try_init();
}

fn path(raw: &str) -> UnitPath {
	UnitPath::new(raw).unwrap()
}

fn source(raw: &str, lines: &[&str]) -> Unit {
	let root = NodeSpec::new(kinds::SOURCE).children(lines.iter().map(|l| NodeSpec::new(kinds::LINE).text(*l)));
	Unit::new(path(raw), Tree::build(root))
}

fn sources() -> Forest {
	[
		source("app/recast.toml", &[]),
		source("app/Main.java", &["class Main {}"]),
		source("app/Util.java", &["class Util {}"]),
		source("tool.txt", &["run"]),
	]
	.into_iter()
	.collect()
}

fn keys(report: &RunReport, raw: &str) -> Vec<String> {
	let unit = report.forest.get(&path(raw)).unwrap();
	EntryDocument::from_tree(unit.tree())
		.unwrap()
		.keys()
		.map(str::to_owned)
		.collect()
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Count(usize);

impl Accumulator for Count {
	fn merge(&mut self, other: Self) {
		self.0 += other.0;
	}
}

/// Counts source units holding `needle`; reports the count as a key.
struct CountLines {
	needle: &'static str,
}

impl Scanner for CountLines {
	type Acc = Count;

	fn scan(&self, unit: &Unit, _cx: &RuleCx<'_>, acc: &mut Count) {
		let root = unit.tree().root();
		if root.is(kinds::SOURCE) && root.children().any(|n| n.text() == Some(self.needle)) {
			acc.0 += 1;
		}
	}

	fn generate(&self, acc: &Count, cx: &RuleCx<'_>) -> Vec<Artifact> {
		let section = Section::untitled().entry(format!("{}-{}", self.needle, acc.0), "true");
		let path = cx.scope.base_dir().join("stats.properties").unwrap();
		vec![Artifact::new(path, EntryDocument::new().section(section))]
	}
}

fn mark_sources() -> Rule {
	Rule::new("mark").mutate_with(|unit, _cx| {
		let root = unit.tree().root();
		if !root.is(kinds::SOURCE) || root.children().any(|n| n.text() == Some("seen")) {
			return Ok(None);
		}
		let (tree, _) = unit.tree().append_child(root.id(), NodeSpec::new(kinds::LINE).text("seen"))?;
		Ok(Some(unit.with_tree(tree)))
	})
}

fn engine(rules: impl IntoIterator<Item = Rule>, execution: Execution) -> Engine {
	let recipe = Recipe::builder("invariants").rules(rules).build().unwrap();
	Engine::new(recipe).with_config(EngineConfig::default().with_execution(execution))
}

/// Must rebuild every accumulator from the current forest at the start of each cycle.
///
/// * Enforced in: `phases::phase_scan`
/// * Failure symptom: counts grow across cycles and generated keys never settle.
#[test]
fn test_accumulators_reset_every_cycle() {
	init_tracing();
	let counter = Rule::new("count").scanner(CountLines { needle: "run" });
	let report = engine([counter], Execution::Parallel).run(sources()).unwrap();

	assert_eq!(keys(&report, "stats.properties"), vec!["run-1"]);
	assert_eq!(report.cycle_count(), 2);
}

/// Must scan the forest as it stood when the cycle began.
///
/// * Enforced in: `Scheduler::run`
/// * Failure symptom: a generator observes same-cycle mutations in some
///   execution orders but not others.
#[rstest]
#[case::parallel(Execution::Parallel)]
#[case::sequential(Execution::Sequential)]
fn test_scan_reads_cycle_start_snapshot(#[case] execution: Execution) {
	let counter = Rule::new("count").scanner(CountLines { needle: "seen" });
	let report = engine([mark_sources(), counter], execution).run(sources()).unwrap();

	assert!(!report.cycles[0].changes.contains(&path("app/stats.properties")));
	assert!(report.cycles[1].changes.contains(&path("app/stats.properties")));
	assert_eq!(keys(&report, "app/stats.properties"), vec!["seen-3"]);
	assert_eq!(keys(&report, "stats.properties"), vec!["seen-1"]);
}

/// Must end every successful run with exactly one cycle that changed nothing.
///
/// * Enforced in: `Scheduler::run`
/// * Failure symptom: runs stop while generated artifacts are still pending.
#[test]
fn test_run_ends_with_single_empty_cycle() {
	let counter = Rule::new("count").scanner(CountLines { needle: "seen" });
	let report = engine([mark_sources(), counter], Execution::Parallel).run(sources()).unwrap();

	let (last, earlier) = report.cycles.split_last().unwrap();
	assert!(last.changes.is_empty());
	assert!(last.converged());
	assert!(earlier.iter().all(|c| !c.changes.is_empty() && !c.converged()));
}

/// Must move through scan, mutate and generate in order, then to a terminal or next-cycle state.
///
/// * Enforced in: `scheduler::enter`
/// * Failure symptom: generators run against a store that was not rebuilt.
#[test]
fn test_phase_sequence_is_legal() {
	let counter = Rule::new("count").scanner(CountLines { needle: "seen" });
	let report = engine([mark_sources(), counter], Execution::Sequential).run(sources()).unwrap();

	let mut state = Phase::Idle;
	for cycle in &report.cycles {
		for &phase in &cycle.phases {
			assert!(state.successors().contains(&phase), "{state:?} -> {phase:?}");
			state = phase;
		}
	}
	assert_eq!(state, Phase::Converged);
}

/// Must fail rather than return a partial forest when the cycle limit is reached.
///
/// * Enforced in: `Scheduler::run`
/// * Failure symptom: callers persist a forest that is still changing.
#[test]
fn test_cycle_limit_is_a_hard_failure() {
	let counter = Rule::new("count").scanner(CountLines { needle: "seen" });
	let recipe = Recipe::builder("invariants").rules([mark_sources(), counter]).build().unwrap();
	let engine = Engine::new(recipe).with_config(EngineConfig::default().with_cycle_limit(1));

	let err = engine.run(sources()).unwrap_err();
	let RunError::NonConvergence { limit, pending } = err;
	assert_eq!(limit, 1);
	assert_eq!(pending.len(), 4);
}

/// Must produce the same forest and diagnostics whatever the execution mode.
///
/// * Enforced in: `phases::phase_scan`, `phases::phase_generate`
/// * Failure symptom: output depends on thread scheduling.
#[test]
fn test_execution_mode_does_not_change_results() {
	let rules = || {
		[
			mark_sources(),
			Rule::new("count-seen").scanner(CountLines { needle: "seen" }),
			Rule::new("count-run").scanner(CountLines { needle: "run" }),
		]
	};
	let parallel = engine(rules(), Execution::Parallel).run(sources()).unwrap();
	let sequential = engine(rules(), Execution::Sequential).run(sources()).unwrap();

	assert_eq!(parallel.forest, sequential.forest);
	assert_eq!(parallel.diagnostics, sequential.diagnostics);
	assert_eq!(parallel.cycle_count(), sequential.cycle_count());
	assert_eq!(parallel.diagnostics_of(DiagnosticKind::MergeConflict).count(), 0);
}
