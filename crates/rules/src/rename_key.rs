//! `rename-key`: renames one property key in properties units.
//!
//! Configured per scope:
//!
//! ```toml
//! [rules.rename-key]
//! from = "db.user"
//! to = "datasource.username"
//! ```
//!
//! Renamed entries carry a `rename-key/renamed` marker. An entry whose value
//! is an unresolved `${...}` reference, or whose new key is already defined,
//! is flagged for manual review and left as is.

use recast_engine::{Mutator, Rule, RuleCx, RuleError};
use recast_primitives::{MarkerKind, MarkerValue, Unit, entries};
use tracing::debug;


pub const ID: &str = "rename-key";
/// Marker name left on every renamed entry.
pub const RENAMED: &str = "renamed";

pub fn rename_key() -> Rule {
	Rule::new(ID)
		.describe("Renames a property key; ambiguous entries are flagged for review")
		.mutator(RenameKey)
}

struct RenameKey;

impl Mutator for RenameKey {
	fn mutate(&self, unit: &Unit, cx: &RuleCx<'_>) -> Result<Option<Unit>, RuleError> {
		if unit.path().extension() != Some("properties") || !entries::is_entry_document(unit.tree()) {
			return Ok(None);
		}
		let Some((from, to)) = configured_keys(cx)? else {
			return Ok(None);
		};

		let renamed = MarkerKind::new(cx.namespace(), RENAMED);
		let review = MarkerKind::manual_review(cx.namespace());
		let mut taken = entries::entry_nodes(unit.tree()).any(|(_, key, _)| key == to);
		let mut next = unit.clone();
		let mut changed = false;

		for (node, key, value) in entries::entry_nodes(unit.tree()) {
			if key != from || unit.has_marker(node, &renamed) || unit.has_marker(node, &review) {
				continue;
			}
			if value.contains("${") {
				next = next.flag_for_review(node, cx.namespace(), &format!("`{from}` holds an unresolved reference"));
			} else if taken {
				next = next.flag_for_review(node, cx.namespace(), &format!("`{to}` is already defined"));
			} else {
				let tree = next.tree().set_label(node, Some(to))?;
				next = next.with_tree(tree).with_marker(node, renamed.clone(), MarkerValue::note(from));
				taken = true;
				debug!(path = %unit.path(), node = %node, from, to, "rename_key.renamed");
			}
			changed = true;
		}

		Ok(changed.then_some(next))
	}
}

/// `(from, to)` from the rule's options; `None` when the rule is not configured.
fn configured_keys<'a>(cx: &'a RuleCx<'_>) -> Result<Option<(&'a str, &'a str)>, RuleError> {
	let Some(from) = cx.options.rule_str(cx.namespace(), "from") else {
		return Ok(None);
	};
	let to = match cx.options.rule_str(cx.namespace(), "to") {
		Some(to) if !to.is_empty() => to,
		_ => {
			return Err(RuleError::Option {
				key: "to".to_owned(),
				message: format!("a non-empty target key is required to rename `{from}`"),
			});
		}
	};
	if from.is_empty() || from == to {
		return Ok(None);
	}
	Ok(Some((from, to)))
}
