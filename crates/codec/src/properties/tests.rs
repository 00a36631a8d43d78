use pretty_assertions::assert_eq;
use recast_primitives::EntryDocument;
use recast_primitives::entries::entry_nodes;
use rstest::rstest;

use super::*;

fn path() -> UnitPath {
	UnitPath::new("app/application.properties").unwrap()
}

fn parse(source: &str) -> Unit {
	PropertiesCodec.parse(&path(), source.as_bytes()).unwrap()
}

#[rstest]
#[case::plain("a=1\nb = 2\n")]
#[case::colon_and_space("a: 1\nb 2\n   c\t=\tx\n")]
#[case::comments("# note\n! bang\na=1")]
#[case::sections("# [collect-config]\ndb.url=h2\n\n# [other]\nx=y\n")]
#[case::continuation("list=a,\\\n    b,\\\n    c\nnext=1\n")]
#[case::escaped_separator("we\\=ird=value\n")]
#[case::blank_with_spaces("a=1\n   \nb=2\n")]
fn test_print_reproduces_source(#[case] source: &str) {
	assert_eq!(PropertiesCodec.print(&parse(source)), source);
}

#[test]
fn test_entries_carry_key_and_value() {
	let unit = parse("  db.url = jdbc:h2:mem\nflag\n");
	let entries: Vec<(&str, &str)> = entry_nodes(unit.tree()).map(|(_, k, v)| (k, v)).collect();
	assert_eq!(entries, vec![("db.url", "jdbc:h2:mem"), ("flag", "")]);
}

#[test]
fn test_provenance_headers_open_sections_until_blank_line() {
	let unit = parse("top=1\n# [collect-config]\n# kept\na=1\n\nb=2\n");
	let shape: Vec<&str> = unit.tree().root().children().map(Node::kind).collect();
	assert_eq!(shape, vec![kinds::ENTRY, kinds::SECTION, kinds::BLANK, kinds::ENTRY]);

	let doc = EntryDocument::from_tree(unit.tree()).unwrap();
	assert_eq!(doc.sections[0].header, None);
	assert_eq!(doc.sections[1].header.as_deref(), Some("collect-config"));
	assert_eq!(doc.get("a"), Some("1"));
	assert_eq!(doc.get("b"), Some("2"));
}

#[test]
fn test_continuation_is_one_entry() {
	let unit = parse("list=a,\\\n  b\n");
	let values: Vec<&str> = entry_nodes(unit.tree()).map(|(_, _, v)| v).collect();
	assert_eq!(values, vec!["a,b"]);
}

#[test]
fn test_escapes_resolve_into_key_and_value() {
	let unit = parse("we\\=ird\\ key = C:\\\\dir\\tx\\u00e9\n");
	let entries: Vec<(&str, &str)> = entry_nodes(unit.tree()).map(|(_, k, v)| (k, v)).collect();
	assert_eq!(entries, vec![("we=ird key", "C:\\dir\txé")]);
	assert_eq!(PropertiesCodec.print(&unit), "we\\=ird\\ key = C:\\\\dir\\tx\\u00e9\n");
}

#[rstest]
#[case::space_in_key("db url", "x")]
#[case::separators_in_key("a=b:c", "v")]
#[case::leading_hash("#hash", "v")]
#[case::leading_bang("!bang", "v")]
#[case::backslash_in_key("C:\\dir", "v")]
#[case::tab_in_key("a\tb", "v")]
#[case::trailing_backslash("dir", "C:\\")]
#[case::leading_space_value("pad", "  x")]
#[case::leading_separator_value("eq", "=x")]
#[case::newline_value("multi", "a\nb")]
#[case::empty_value("flag", "")]
fn test_generated_entries_parse_back(#[case] key: &str, #[case] value: &str) {
	let doc = EntryDocument::new().section(recast_primitives::Section::new("gen").entry(key, value));
	let printed = PropertiesCodec.print(&doc.to_unit(path()));
	let reparsed = parse(&printed);
	let entries: Vec<(&str, &str)> = entry_nodes(reparsed.tree()).map(|(_, k, v)| (k, v)).collect();
	assert_eq!(entries, vec![(key, value)]);
	assert_eq!(PropertiesCodec.print(&reparsed), printed);
}

#[rstest]
#[case::space("db url", "db\\ url=x\n")]
#[case::separators("a=b:c", "a\\=b\\:c=x\n")]
#[case::hash("#k", "\\#k=x\n")]
#[case::inner_hash("k#", "k#=x\n")]
fn test_generated_keys_print_escaped(#[case] key: &str, #[case] expected: &str) {
	let doc = EntryDocument::new().section(recast_primitives::Section::new("gen").entry(key, "x"));
	let printed = PropertiesCodec.print(&doc.to_unit(path()));
	assert_eq!(printed, format!("# [gen]\n{expected}"));
}

#[test]
fn test_edited_value_drops_raw_spelling() {
	let unit = parse("path = old\\\n  value\n");
	let (id, _, _) = entry_nodes(unit.tree()).next().unwrap();
	let tree = unit.tree().set_text(id, Some("C:\\")).unwrap();
	let unit = unit.with_tree(tree);
	assert_eq!(PropertiesCodec.print(&unit), "path = C:\\\\\n");
}

#[rstest]
#[case::short("k=\\u00e\n")]
#[case::not_hex("k=\\uzzzz\n")]
fn test_malformed_unicode_escape(#[case] source: &str) {
	let err = PropertiesCodec.parse(&path(), source.as_bytes()).unwrap_err();
	assert!(matches!(err, ParseError::Malformed { line: 1, .. }), "{err:?}");
}

#[test]
fn test_missing_key_is_malformed() {
	let err = PropertiesCodec.parse(&path(), b"a=1\n  = orphan\n").unwrap_err();
	assert_eq!(
		err,
		ParseError::Malformed {
			path: path(),
			line: 2,
			message: "entry has no key".to_owned(),
		}
	);
}

#[test]
fn test_generated_document_prints_with_headers() {
	let doc = EntryDocument::new().section(recast_primitives::Section::new("collect-config").entry("k", "v"));
	let unit = doc.to_unit(path());
	assert_eq!(PropertiesCodec.print(&unit), "# [collect-config]\nk=v\n");
}

#[rstest]
#[case("# [x]", Some("x"))]
#[case("# []", None)]
#[case("# plain", None)]
#[case(" # [x]", None)]
fn test_section_header(#[case] line: &str, #[case] expected: Option<&str>) {
	assert_eq!(section_header(line), expected);
}
