//! `review-report`: collects manual-review markers per scope and generates a
//! Markdown report listing them.
//!
//! Markers added by mutators in one cycle are only seen by the next cycle's
//! scan, so the report trails the flags by one cycle.

use std::collections::BTreeMap;

use recast_engine::{Accumulator, Artifact, Rule, RuleCx, Scanner};
use recast_primitives::{EntryDocument, Section, Unit};
use tracing::warn;


pub const ID: &str = "review-report";
pub const TITLE: &str = "Review report";

pub fn review_report() -> Rule {
	Rule::new(ID)
		.describe("Lists every position flagged for manual review")
		.scanner(ReviewReport)
}

/// Review notes keyed by `path#node`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReviewNotes(pub BTreeMap<String, String>);

impl Accumulator for ReviewNotes {
	fn merge(&mut self, other: Self) {
		for (position, note) in other.0 {
			match self.0.get_mut(&position) {
				Some(kept) if note < *kept => *kept = note,
				Some(_) => {}
				None => {
					self.0.insert(position, note);
				}
			}
		}
	}
}

struct ReviewReport;

impl Scanner for ReviewReport {
	type Acc = ReviewNotes;

	fn scan(&self, unit: &Unit, _cx: &RuleCx<'_>, acc: &mut ReviewNotes) {
		for (kind, node, value) in unit.review_markers() {
			let note = match value.as_note() {
				Some(reason) => format!("{}: {reason}", kind.namespace()),
				None => kind.namespace().to_owned(),
			};
			acc.merge(ReviewNotes(BTreeMap::from([(format!("{}{node}", unit.path()), note)])));
		}
	}

	fn generate(&self, acc: &ReviewNotes, cx: &RuleCx<'_>) -> Vec<Artifact> {
		if cx.options.is_skip() {
			return Vec::new();
		}
		let path = match cx.scope.base_dir().join(&cx.options.output.report_file) {
			Ok(path) => path,
			Err(error) => {
				warn!(scope = %cx.scope, %error, "review_report.bad_output_path");
				return Vec::new();
			}
		};
		let mut section = Section::untitled();
		for (position, note) in &acc.0 {
			section.push(position.as_str(), note.as_str());
		}
		vec![Artifact::new(path, EntryDocument::titled(TITLE).section(section))]
	}
}
