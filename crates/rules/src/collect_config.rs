//! `collect-config`: gathers `config("key", "default")` lookups per scope and
//! generates the scope's configuration file.
//!
//! The file name comes from `output.config_file`; `output.strategy = "skip"`
//! turns generation off for a scope. When two sources disagree on a default,
//! the lexically smallest one is kept so the result is independent of scan
//! order.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use recast_engine::{Accumulator, Artifact, Rule, RuleCx, Scanner};
use recast_primitives::{EntryDocument, Section, Unit, kinds};
use regex::Regex;
use tracing::warn;


pub const ID: &str = "collect-config";

static CONFIG_CALL: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r#"config\(\s*"([^"]+)"\s*,\s*"([^"]*)"\s*\)"#).expect("valid config call regex")
});

pub fn collect_config() -> Rule {
	Rule::new(ID)
		.describe("Generates configuration entries for every config(\"key\", \"default\") lookup")
		.scanner(CollectConfig)
}

/// Requested keys and their defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigKeys(pub BTreeMap<String, String>);

impl ConfigKeys {
	fn observe(&mut self, key: &str, default: &str) {
		match self.0.get_mut(key) {
			Some(kept) if default < kept.as_str() => default.clone_into(kept),
			Some(_) => {}
			None => {
				self.0.insert(key.to_owned(), default.to_owned());
			}
		}
	}
}

impl Accumulator for ConfigKeys {
	fn merge(&mut self, other: Self) {
		for (key, default) in other.0 {
			self.observe(&key, &default);
		}
	}
}

struct CollectConfig;

impl Scanner for CollectConfig {
	type Acc = ConfigKeys;

	fn scan(&self, unit: &Unit, _cx: &RuleCx<'_>, acc: &mut ConfigKeys) {
		let root = unit.tree().root();
		if !root.is(kinds::SOURCE) {
			return;
		}
		for text in root.children().filter(|n| n.is(kinds::LINE)).filter_map(|n| n.text()) {
			for call in CONFIG_CALL.captures_iter(text) {
				acc.observe(&call[1], &call[2]);
			}
		}
	}

	fn generate(&self, acc: &ConfigKeys, cx: &RuleCx<'_>) -> Vec<Artifact> {
		if cx.options.is_skip() {
			return Vec::new();
		}
		let path = match cx.scope.base_dir().join(&cx.options.output.config_file) {
			Ok(path) => path,
			Err(error) => {
				warn!(scope = %cx.scope, %error, "collect_config.bad_output_path");
				return Vec::new();
			}
		};
		let mut section = Section::untitled();
		for (key, default) in &acc.0 {
			section.push(key.as_str(), default.as_str());
		}
		vec![Artifact::new(path, EntryDocument::new().section(section))]
	}
}
