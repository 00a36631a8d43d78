//! Built-in rules.
//!
//! Each rule exercises one engine capability:
//!
//! * [`rename_key`] rewrites property keys in place, guarded by a marker.
//! * [`flag_todo`] attaches manual-review markers to source lines.
//! * [`collect_config`] scans sources and generates a per-scope configuration file.
//! * [`review_report`] turns review markers into a per-scope report one cycle later.
//!
//! Rule options live in `[rules.<rule-id>]` tables of the scope's configuration.

pub mod collect_config;
pub mod flag_todo;
pub mod rename_key;
pub mod review_report;

pub use collect_config::collect_config;
pub use flag_todo::flag_todo;
pub use recast_engine::RecipeError;
pub use rename_key::rename_key;
pub use review_report::review_report;

use recast_engine::{Recipe, Rule};

/// Every built-in rule, in the order the standard recipe runs them.
pub fn catalog() -> Vec<Rule> {
	vec![rename_key(), flag_todo(), collect_config(), review_report()]
}

/// Recipe running the whole catalog.
pub fn standard_recipe() -> Result<Recipe, RecipeError> {
	Recipe::builder("standard").rules(catalog()).build()
}
