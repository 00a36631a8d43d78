use std::fs;

use recast_primitives::UnitPath;

use super::*;
use crate::OutputStrategy;

fn module(path: &str) -> ScopeId {
	ScopeId::Module(UnitPath::new(path).unwrap())
}

#[test]
fn test_static_config_prefers_scope_overrides() {
	let config = StaticConfig::new(ConfigOptions::default())
		.with_scope(module("a"), ConfigOptions::default().with_disabled("flag-todo"));
	assert!(!config.load(&module("a")).is_rule_enabled("flag-todo"));
	assert!(config.load(&module("b")).is_rule_enabled("flag-todo"));
	assert!(config.load(&ScopeId::Default).is_rule_enabled("flag-todo"));
}

#[test]
fn test_dir_config_reads_module_files() {
	let dir = tempfile::tempdir().unwrap();
	fs::create_dir_all(dir.path().join("moduleA")).unwrap();
	fs::write(dir.path().join("moduleA/recast.toml"), "[output]\nstrategy = \"skip\"\n").unwrap();
	fs::write(dir.path().join("recast.toml"), "disabled_rules = [\"rename-key\"]\n").unwrap();

	let config = DirConfig::new(dir.path());
	assert_eq!(config.load(&module("moduleA")).output.strategy, OutputStrategy::Skip);
	assert!(!config.load(&ScopeId::Default).is_rule_enabled("rename-key"));
	assert_eq!(*config.load(&module("moduleB")), ConfigOptions::default());
}

#[test]
fn test_dir_config_caches_until_invalidated() {
	let dir = tempfile::tempdir().unwrap();
	let file = dir.path().join("recast.toml");
	fs::write(&file, "disabled_rules = [\"a\"]\n").unwrap();

	let config = DirConfig::new(dir.path());
	let first = config.load(&ScopeId::Default);
	fs::write(&file, "disabled_rules = [\"b\"]\n").unwrap();
	assert!(Arc::ptr_eq(&first, &config.load(&ScopeId::Default)));

	config.invalidate();
	assert!(config.load(&ScopeId::Default).is_rule_enabled("a"));
	assert!(!config.load(&ScopeId::Default).is_rule_enabled("b"));
}

#[test]
fn test_malformed_file_yields_defaults() {
	let dir = tempfile::tempdir().unwrap();
	fs::write(dir.path().join("custom.toml"), "disabled_rules = [").unwrap();
	let config = DirConfig::new(dir.path()).with_file_name("custom.toml");
	assert_eq!(config.path_for(&ScopeId::Default), dir.path().join("custom.toml"));
	assert_eq!(*config.load(&ScopeId::Default), ConfigOptions::default());
}
