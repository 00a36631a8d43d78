//! Composite orchestration of rules.
//!
//! A [`Recipe`] is an ordered, flattened list of rules with unique ids.
//! Within one cycle every unit is passed through the recipe's mutators in
//! declaration order, each seeing the previous one's output. Scan effects are
//! not sequenced here: they surface through the accumulator store, and so
//! only in the following cycle.

use recast_config::ConfigOptions;
use recast_primitives::{ScopeId, Unit};
use rustc_hash::FxHashSet as HashSet;
use tracing::{debug, trace};

use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::error::{RecipeError, RuleError};
use crate::rule::{Rule, RuleCx, RuleId};


#[derive(Debug)]
pub struct Recipe {
	name: Box<str>,
	rules: Vec<Rule>,
}

/// Builder for [`Recipe`]; nested recipes are flattened in place.
#[derive(Debug)]
pub struct RecipeBuilder {
	name: Box<str>,
	rules: Vec<Rule>,
}

impl RecipeBuilder {
	pub fn rule(mut self, rule: Rule) -> Self {
		self.rules.push(rule);
		self
	}

	pub fn rules(mut self, rules: impl IntoIterator<Item = Rule>) -> Self {
		self.rules.extend(rules);
		self
	}

	/// Splices the rules of `recipe` at the current position.
	pub fn nest(mut self, recipe: Recipe) -> Self {
		self.rules.extend(recipe.rules);
		self
	}

	pub fn build(self) -> Result<Recipe, RecipeError> {
		let mut seen = HashSet::default();
		for rule in &self.rules {
			if !seen.insert(rule.id().clone()) {
				return Err(RecipeError::DuplicateRule(rule.id().clone()));
			}
		}
		Ok(Recipe {
			name: self.name,
			rules: self.rules,
		})
	}
}

/// Result of running the recipe's mutators over one unit.
#[derive(Debug, Clone, Default)]
pub struct UnitMutation {
	/// Final version, when any rule changed the unit.
	pub unit: Option<Unit>,
	/// Rules whose output was accepted, in order.
	pub applied: Vec<RuleId>,
	pub diagnostics: Vec<Diagnostic>,
}

impl Recipe {
	pub fn builder(name: &str) -> RecipeBuilder {
		RecipeBuilder {
			name: name.into(),
			rules: Vec::new(),
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn rules(&self) -> &[Rule] {
		&self.rules
	}

	pub fn len(&self) -> usize {
		self.rules.len()
	}

	pub fn is_empty(&self) -> bool {
		self.rules.is_empty()
	}

	pub fn get(&self, id: &str) -> Option<&Rule> {
		self.rules.iter().find(|rule| rule.id().as_str() == id)
	}

	pub fn mutators(&self) -> impl Iterator<Item = &Rule> {
		self.rules.iter().filter(|rule| rule.can_mutate())
	}

	pub fn scanners(&self) -> impl Iterator<Item = &Rule> {
		self.rules.iter().filter(|rule| rule.can_scan())
	}

	/// Runs every enabled mutator over `unit` in declaration order.
	///
	/// A failing rule is reported and skipped; the chain continues from the
	/// last accepted version. Output that moves the unit to another path is
	/// rejected the same way.
	pub fn mutate_unit(&self, unit: &Unit, scope: &ScopeId, options: &ConfigOptions, cycle: usize) -> UnitMutation {
		let mut outcome = UnitMutation::default();
		let mut current = unit.clone();

		for rule in self.mutators() {
			if !options.is_rule_enabled(rule.id().as_str()) {
				continue;
			}
			let cx = RuleCx {
				rule: rule.id(),
				scope,
				options,
				cycle,
			};
			let result = rule.mutate(&current, &cx).and_then(|next| match next {
				Some(next) if next.path() != current.path() => Err(RuleError::PathChanged {
					from: current.path().clone(),
					to: next.path().clone(),
				}),
				other => Ok(other),
			});
			match result {
				Ok(Some(next)) if next != current => {
					trace!(rule = %rule.id(), path = %current.path(), "recipe.mutated");
					outcome.applied.push(rule.id().clone());
					current = next;
				}
				Ok(_) => {}
				Err(error) => {
					debug!(rule = %rule.id(), path = %current.path(), %error, "recipe.rule_failed");
					outcome.diagnostics.push(
						Diagnostic::new(DiagnosticKind::RuleFailure, current.path().clone(), error.to_string())
							.with_rule(rule.id().clone()),
					);
				}
			}
		}

		if current != *unit {
			outcome.unit = Some(current);
		}
		outcome
	}
}
