use pretty_assertions::assert_eq;
use proptest::prelude::*;
use recast_codec::{Codec, PropertiesCodec};
use recast_primitives::ScopeId;

use super::*;
use crate::artifact::Artifact;

fn path() -> UnitPath {
	UnitPath::new("app/generated.properties").unwrap()
}

fn parse(text: &str) -> Unit {
	PropertiesCodec.parse(&path(), text.as_bytes()).unwrap()
}

fn print(unit: &Unit) -> String {
	PropertiesCodec.print(unit)
}

fn proposal(rule: &str, entries: &[(&str, &str)]) -> GeneratedArtifact {
	let mut section = Section::untitled();
	for (key, value) in entries {
		section.push(*key, *value);
	}
	GeneratedArtifact::new(
		RuleId::new(rule),
		ScopeId::Default,
		Artifact::new(path(), EntryDocument::new().section(section)),
	)
}

fn document(rule: &str, entries: &[(&str, &str)]) -> EntryDocument {
	proposal(rule, entries).artifact.document
}

#[test]
fn test_absent_target_adopts_document_verbatim() {
	let doc = document("collect-config", &[("a", "1"), ("b", "2")]);
	let merged = reconcile(None, &path(), &doc).unwrap();
	assert_eq!(merged.unit, doc.to_unit(path()));
	assert_eq!(print(&merged.unit), "# [collect-config]\na=1\nb=2\n");
}

#[test]
fn test_missing_keys_are_appended_in_a_provenance_section() {
	let existing = parse("# hand written\na = 1\n");
	let doc = document("collect-config", &[("a", "changed"), ("b", "2")]);
	let merged = reconcile(Some(&existing), &path(), &doc).unwrap();

	assert_eq!(merged.appended, vec![Box::from("b")]);
	assert_eq!(print(&merged.unit), "# hand written\na = 1\n\n# [collect-config]\nb=2\n");
}

#[test]
fn test_entries_join_the_section_with_the_same_header() {
	let existing = parse("# [collect-config]\na=1\n\n# [other]\nz=9\n");
	let doc = document("collect-config", &[("a", "1"), ("b", "2")]);
	let merged = reconcile(Some(&existing), &path(), &doc).unwrap();
	assert_eq!(print(&merged.unit), "# [collect-config]\na=1\nb=2\n\n# [other]\nz=9\n");
}

#[test]
fn test_remerge_is_a_no_op() {
	let existing = parse("x=0\n");
	let doc = document("collect-config", &[("a", "1")]);
	let once = reconcile(Some(&existing), &path(), &doc).unwrap();
	let twice = reconcile(Some(&once.unit), &path(), &doc).unwrap();
	assert!(twice.appended.is_empty());
	assert_eq!(twice.unit, once.unit);
}

#[test]
fn test_existing_markers_survive_appends() {
	let existing = parse("a=1\n");
	let (node, _, _) = entry_nodes(existing.tree()).next().unwrap();
	let flagged = existing.flag_for_review(node, "rename-key", "placeholder");
	let merged = reconcile(Some(&flagged), &path(), &document("collect-config", &[("b", "2")])).unwrap();
	assert_eq!(merged.unit.review_markers().count(), 1);
}

#[test]
fn test_non_document_target_is_rejected() {
	let source = Unit::new(path(), Tree::build(NodeSpec::new(kinds::SOURCE)));
	let err = reconcile(Some(&source), &path(), &document("r", &[("a", "1")])).unwrap_err();
	assert_eq!(
		err,
		MergeError::NotEntryDocument {
			path: path(),
			kind: kinds::SOURCE.to_owned()
		}
	);
}

#[test]
fn test_premerge_first_writer_wins() {
	let proposals = [
		proposal("first", &[("a", "1"), ("b", "2")]),
		proposal("second", &[("b", "3"), ("c", "4"), ("a", "1")]),
	];
	let (doc, conflicts) = premerge(&proposals);

	assert_eq!(doc.get("b"), Some("2"));
	assert_eq!(doc.keys().collect::<Vec<_>>(), vec!["a", "b", "c"]);
	assert_eq!(doc.sections[1].header.as_deref(), Some("second"));
	assert_eq!(
		conflicts,
		vec![KeyConflict {
			key: "b".into(),
			kept: "2".into(),
			kept_by: RuleId::new("first"),
			dropped: "3".into(),
			dropped_by: RuleId::new("second"),
		}]
	);
}

#[test]
fn test_apply_serializes_writes_and_reports() {
	let mut forest = Forest::new();
	forest.insert(Unit::new(
		UnitPath::new("src/Main.java").unwrap(),
		Tree::build(NodeSpec::new(kinds::SOURCE)),
	));

	let mut rejected = proposal("gen", &[("k", "v")]);
	rejected.artifact.path = UnitPath::new("src/Main.java").unwrap();
	let summary = apply(
		&mut forest,
		vec![
			proposal("first", &[("a", "1")]),
			rejected,
			proposal("second", &[("a", "2")]),
		],
	);

	assert_eq!(summary.written, vec![path()]);
	let found: Vec<DiagnosticKind> = summary.diagnostics.iter().map(|d| d.kind).collect();
	assert_eq!(found, vec![DiagnosticKind::MergeConflict, DiagnosticKind::MergeRejected]);
	assert_eq!(summary.diagnostics[0].rule, Some(RuleId::new("second")));
	assert_eq!(print(forest.get(&path()).unwrap()), "# [first]\na=1\n");
}

fn entries(unit: &Unit) -> Vec<(String, String)> {
	entry_nodes(unit.tree())
		.map(|(_, k, v)| (k.to_owned(), v.to_owned()))
		.collect()
}

proptest! {
	#[test]
	fn prop_merge_is_append_only(
		existing in prop::collection::btree_map("[a-f]", "[0-9]", 0..6),
		proposed in prop::collection::vec(("[a-h]", "[0-9]"), 0..8),
	) {
		let text: String = existing.iter().map(|(k, v)| format!("{k}={v}\n")).collect();
		let before = parse(&text);
		let pairs: Vec<(&str, &str)> = proposed.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
		let doc = document("collect-config", &pairs);

		let merged = reconcile(Some(&before), &path(), &doc).unwrap();
		let after = entries(&merged.unit);

		let kept: Vec<(String, String)> = after.iter().filter(|(k, _)| existing.contains_key(k)).cloned().collect();
		prop_assert_eq!(kept, entries(&before));
		for (key, _) in &proposed {
			prop_assert!(after.iter().any(|(k, _)| k == key));
		}
		let keys: HashSet<&String> = after.iter().map(|(k, _)| k).collect();
		prop_assert_eq!(keys.len(), after.len());

		let again = reconcile(Some(&merged.unit), &path(), &doc).unwrap();
		prop_assert!(again.appended.is_empty());
	}
}
