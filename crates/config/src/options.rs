use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use toml::{Table, Value};

use crate::Result;


/// What generating rules do with their output in a scope.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputStrategy {
	/// Merge generated entries into existing files, adding only missing keys.
	#[default]
	Append,
	/// Generate nothing.
	Skip,
}

/// The `[output]` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OutputOptions {
	pub strategy: OutputStrategy,
	/// Generated configuration file, relative to the scope's base directory.
	pub config_file: String,
	/// Review report file, relative to the scope's base directory.
	pub report_file: String,
}

impl Default for OutputOptions {
	fn default() -> Self {
		Self {
			strategy: OutputStrategy::Append,
			config_file: "generated.properties".to_owned(),
			report_file: "REVIEW.md".to_owned(),
		}
	}
}

/// Options in effect for one scope.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ConfigOptions {
	/// Rule ids that do nothing in this scope.
	pub disabled_rules: Vec<String>,
	pub output: OutputOptions,
	/// Free-form `[rules.<id>]` tables.
	pub rules: BTreeMap<String, Table>,
}

impl ConfigOptions {
	pub fn parse(input: &str) -> Result<Self> {
		Ok(toml::from_str(input)?)
	}

	pub fn load(path: impl AsRef<Path>) -> Result<Self> {
		Self::parse(&crate::read(path.as_ref())?)
	}

	pub fn is_rule_enabled(&self, rule: &str) -> bool {
		!self.disabled_rules.iter().any(|id| id == rule)
	}

	pub fn is_skip(&self) -> bool {
		self.output.strategy == OutputStrategy::Skip
	}

	/// The `[rules.<rule>]` table, if configured.
	pub fn rule_table(&self, rule: &str) -> Option<&Table> {
		self.rules.get(rule)
	}

	pub fn rule_value(&self, rule: &str, key: &str) -> Option<&Value> {
		self.rule_table(rule)?.get(key)
	}

	pub fn rule_str(&self, rule: &str, key: &str) -> Option<&str> {
		self.rule_value(rule, key)?.as_str()
	}

	/// A string array option; non-string elements are skipped.
	pub fn rule_strings(&self, rule: &str, key: &str) -> Option<Vec<&str>> {
		let array = self.rule_value(rule, key)?.as_array()?;
		Some(array.iter().filter_map(Value::as_str).collect())
	}

	pub fn with_disabled(mut self, rule: &str) -> Self {
		self.disabled_rules.push(rule.to_owned());
		self
	}

	pub fn with_strategy(mut self, strategy: OutputStrategy) -> Self {
		self.output.strategy = strategy;
		self
	}

	pub fn with_rule_value(mut self, rule: &str, key: &str, value: impl Into<Value>) -> Self {
		self.rules
			.entry(rule.to_owned())
			.or_default()
			.insert(key.to_owned(), value.into());
		self
	}
}
