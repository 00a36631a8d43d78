//! `flag-todo`: flags source lines carrying work tags for manual review.
//!
//! Tags default to `TODO` and `FIXME`; `[rules.flag-todo] tags = [...]`
//! overrides them per scope.

use recast_engine::{Rule, RuleCx, RuleError};
use recast_primitives::{MarkerKind, Unit, kinds};
use tracing::trace;


pub const ID: &str = "flag-todo";
pub const DEFAULT_TAGS: &[&str] = &["TODO", "FIXME"];

pub fn flag_todo() -> Rule {
	Rule::new(ID)
		.describe("Flags TODO and FIXME lines for manual review")
		.mutate_with(flag_lines)
}

fn flag_lines(unit: &Unit, cx: &RuleCx<'_>) -> Result<Option<Unit>, RuleError> {
	let root = unit.tree().root();
	if !root.is(kinds::SOURCE) {
		return Ok(None);
	}
	let tags = cx
		.options
		.rule_strings(cx.namespace(), "tags")
		.unwrap_or_else(|| DEFAULT_TAGS.to_vec());
	let review = MarkerKind::manual_review(cx.namespace());

	let mut next: Option<Unit> = None;
	for line in root.children().filter(|n| n.is(kinds::LINE)) {
		let Some(tag) = line.text().and_then(|text| tags.iter().find(|tag| text.contains(**tag))) else {
			continue;
		};
		if unit.has_marker(line.id(), &review) {
			continue;
		}
		let current = next.as_ref().unwrap_or(unit);
		next = Some(current.flag_for_review(line.id(), cx.namespace(), &format!("{tag} left in code")));
		trace!(path = %unit.path(), node = %line.id(), tag = *tag, "flag_todo.flagged");
	}
	Ok(next)
}
