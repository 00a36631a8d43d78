#![allow(dead_code)]

use std::collections::BTreeMap;

use recast_codec::{CodecRegistry, load_forest, print_forest};
use recast_config::{EngineConfig, Execution};
use recast_engine::{Accumulator, Artifact, Recipe, Rule, RuleCx, Scanner};
use recast_primitives::{EntryDocument, Forest, MarkerKind, NodeSpec, Section, Unit, UnitPath, kinds};

pub fn path(raw: &str) -> UnitPath {
	UnitPath::new(raw).unwrap()
}

pub fn forest(files: &[(&str, &str)]) -> Forest {
	let loaded = load_forest(files.iter().map(|(p, text)| (path(p), *text)), &CodecRegistry::standard());
	assert!(loaded.failures.is_empty(), "{:?}", loaded.failures);
	loaded.forest
}

pub fn printed(forest: &Forest) -> BTreeMap<String, String> {
	print_forest(forest, &CodecRegistry::standard())
		.into_iter()
		.map(|(p, text)| (p.as_str().to_owned(), text))
		.collect()
}

pub fn sequential() -> EngineConfig {
	EngineConfig::default().with_execution(Execution::Sequential)
}

fn lines(unit: &Unit) -> impl Iterator<Item = &recast_primitives::Node> {
	let root = unit.tree().root();
	root.children().filter(move |n| root.is(kinds::SOURCE) && n.is(kinds::LINE))
}

/// Flags every `TODO` line for review; the review marker is its own guard.
pub fn flag_todo() -> Rule {
	Rule::new("flag-todo").mutate_with(|unit, cx| {
		let kind = MarkerKind::manual_review(cx.namespace());
		let pending: Vec<_> = lines(unit)
			.filter(|n| n.text().is_some_and(|t| t.contains("TODO")) && !unit.has_marker(n.id(), &kind))
			.map(|n| n.id())
			.collect();
		if pending.is_empty() {
			return Ok(None);
		}
		let mut next = unit.clone();
		for node in pending {
			next = next.flag_for_review(node, cx.namespace(), "TODO left in code");
		}
		Ok(Some(next))
	})
}

/// Review notes keyed by `path#node`; the smaller note wins on conflict.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Notes(pub BTreeMap<String, String>);

impl Accumulator for Notes {
	fn merge(&mut self, other: Self) {
		for (key, note) in other.0 {
			self.0
				.entry(key)
				.and_modify(|kept| {
					if note < *kept {
						kept.clone_from(&note);
					}
				})
				.or_insert(note);
		}
	}
}

pub struct ReviewReport;

impl Scanner for ReviewReport {
	type Acc = Notes;

	fn scan(&self, unit: &Unit, _cx: &RuleCx<'_>, acc: &mut Notes) {
		for (_, node, value) in unit.review_markers() {
			acc.0.insert(
				format!("{}{}", unit.path(), node),
				value.as_note().unwrap_or_default().to_owned(),
			);
		}
	}

	fn generate(&self, acc: &Notes, cx: &RuleCx<'_>) -> Vec<Artifact> {
		let mut section = Section::untitled();
		for (key, note) in &acc.0 {
			section.push(key.as_str(), note.as_str());
		}
		let path = cx.scope.base_dir().join("REVIEW.md").unwrap();
		vec![Artifact::new(path, EntryDocument::titled("Review report").section(section))]
	}
}

pub fn review_report() -> Rule {
	Rule::new("review-report").scanner(ReviewReport)
}

/// Keys requested by `need key=value` lines; the smaller value wins on conflict.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Needs(pub BTreeMap<String, String>);

impl Accumulator for Needs {
	fn merge(&mut self, other: Self) {
		for (key, value) in other.0 {
			self.0
				.entry(key)
				.and_modify(|kept| {
					if value < *kept {
						kept.clone_from(&value);
					}
				})
				.or_insert(value);
		}
	}
}

pub struct CollectNeeds {
	pub file: &'static str,
}

impl Scanner for CollectNeeds {
	type Acc = Needs;

	fn scan(&self, unit: &Unit, _cx: &RuleCx<'_>, acc: &mut Needs) {
		for line in lines(unit) {
			let Some((key, value)) = line.text().and_then(|t| t.strip_prefix("need ")).and_then(|t| t.split_once('='))
			else {
				continue;
			};
			acc.merge(Needs(BTreeMap::from([(key.to_owned(), value.to_owned())])));
		}
	}

	fn generate(&self, acc: &Needs, cx: &RuleCx<'_>) -> Vec<Artifact> {
		let mut section = Section::untitled();
		for (key, value) in &acc.0 {
			section.push(key.as_str(), value.as_str());
		}
		let path = cx.scope.base_dir().join(self.file).unwrap();
		vec![Artifact::new(path, EntryDocument::new().section(section))]
	}
}

pub fn collect_needs() -> Rule {
	Rule::new("collect-needs").scanner(CollectNeeds {
		file: "generated.properties",
	})
}

/// Flips a `tick` line to `tock` and back, forever.
pub fn oscillator() -> Rule {
	Rule::new("oscillator").mutate_with(|unit, _cx| {
		let Some(line) = lines(unit).find(|n| matches!(n.text(), Some("tick" | "tock"))) else {
			return Ok(None);
		};
		let flipped = if line.text() == Some("tick") { "tock" } else { "tick" };
		let tree = unit.tree().set_text(line.id(), Some(flipped))?;
		Ok(Some(unit.with_tree(tree)))
	})
}

/// Appends a line to every source unit that lacks it.
pub fn append_line(id: &str, text: &'static str) -> Rule {
	Rule::new(id).mutate_with(move |unit, _cx| {
		if !unit.tree().root().is(kinds::SOURCE) || lines(unit).any(|n| n.text() == Some(text)) {
			return Ok(None);
		}
		let root = unit.tree().root().id();
		let (tree, _) = unit.tree().append_child(root, NodeSpec::new(kinds::LINE).text(text))?;
		Ok(Some(unit.with_tree(tree)))
	})
}

pub fn recipe(rules: impl IntoIterator<Item = Rule>) -> Recipe {
	Recipe::builder("test").rules(rules).build().unwrap()
}
