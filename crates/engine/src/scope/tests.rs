use pretty_assertions::assert_eq;
use recast_primitives::{NodeSpec, Tree, Unit, kinds};

use super::*;

fn path(raw: &str) -> UnitPath {
	UnitPath::new(raw).unwrap()
}

fn module(raw: &str) -> ScopeId {
	ScopeId::Module(path(raw))
}

fn forest(paths: &[&str]) -> Forest {
	paths
		.iter()
		.map(|p| Unit::new(path(p), Tree::build(NodeSpec::new(kinds::SOURCE))))
		.collect()
}

#[test]
fn test_nearest_marker_ancestor_wins() {
	let markers = [path("app/pom.xml"), path("app/core/pom.xml")];
	assert_eq!(resolve_scope(&path("app/core/src/A.java"), &markers), module("app/core"));
	assert_eq!(resolve_scope(&path("app/web/B.java"), &markers), module("app"));
	assert_eq!(resolve_scope(&path("app/core/pom.xml"), &markers), module("app/core"));
}

#[test]
fn test_unscoped_paths_share_default_scope() {
	let markers = [path("app/pom.xml")];
	assert_eq!(resolve_scope(&path("tools/x.sh"), &markers), ScopeId::Default);
	assert_eq!(resolve_scope(&path("README.md"), &markers), ScopeId::Default);
}

#[test]
fn test_root_marker_makes_root_a_module() {
	let markers = [path("Cargo.toml")];
	assert_eq!(resolve_scope(&path("src/lib.rs"), &markers), ScopeId::Module(UnitPath::root()));
}

#[test]
fn test_sibling_prefix_is_not_an_ancestor() {
	let markers = [path("mod/pom.xml")];
	assert_eq!(resolve_scope(&path("module/A.java"), &markers), ScopeId::Default);
}

#[test]
fn test_resolver_indexes_forest_with_configured_markers() {
	let forest = forest(&["moduleA/build.gradle", "moduleA/src/A.java", "moduleB/notes.txt", "top.txt"]);
	let resolver = ScopeResolver::for_forest(&forest, &["build.gradle".to_owned()]);

	assert!(resolver.is_module(&path("moduleA")));
	assert!(!resolver.is_module(&path("moduleB")));
	assert_eq!(resolver.resolve(&path("moduleA/src/A.java")), module("moduleA"));
	assert_eq!(resolver.resolve(&path("moduleB/notes.txt")), ScopeId::Default);
	assert_eq!(resolver.resolve(&path("moduleA/generated.properties")), module("moduleA"));
	assert_eq!(
		resolver.scopes().into_iter().collect::<Vec<_>>(),
		vec![ScopeId::Default, module("moduleA")]
	);
}

#[test]
fn test_marker_added_later_changes_scope() {
	let before = ScopeResolver::for_forest(&forest(&["m/A.java"]), &["pom.xml".to_owned()]);
	let after = ScopeResolver::for_forest(&forest(&["m/A.java", "m/pom.xml"]), &["pom.xml".to_owned()]);
	assert_eq!(before.resolve(&path("m/A.java")), ScopeId::Default);
	assert_eq!(after.resolve(&path("m/A.java")), module("m"));
}
