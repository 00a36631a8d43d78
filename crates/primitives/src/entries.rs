//! Keyed entry documents.
//!
//! Generated configuration files and review reports share one tree shape: a
//! [`kinds::DOCUMENT`] root whose children are entries, preserved comment and
//! blank lines, and provenance sections grouping entries under a header. The
//! merge engine only ever reasons about keys in this shape; codecs decide how
//! it is printed.

use crate::kinds;
use crate::path::UnitPath;
use crate::tree::{Node, NodeId, NodeSpec, Tree};
use crate::unit::Unit;


/// Attribute holding the raw text between key and value.
pub const ATTR_SEPARATOR: &str = "sep";
/// Attribute holding leading whitespace before a key.
pub const ATTR_INDENT: &str = "indent";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
	pub key: Box<str>,
	pub value: Box<str>,
}

impl Entry {
	pub fn new(key: impl Into<Box<str>>, value: impl Into<Box<str>>) -> Self {
		Self {
			key: key.into(),
			value: value.into(),
		}
	}

	pub fn to_spec(&self) -> NodeSpec {
		NodeSpec::new(kinds::ENTRY)
			.label(self.key.clone())
			.text(self.value.clone())
	}
}

/// Group of entries under one provenance header.
///
/// A section without header renders its entries directly at document level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Section {
	pub header: Option<Box<str>>,
	pub entries: Vec<Entry>,
}

impl Section {
	pub fn new(header: impl Into<Box<str>>) -> Self {
		Self {
			header: Some(header.into()),
			entries: Vec::new(),
		}
	}

	pub fn untitled() -> Self {
		Self::default()
	}

	pub fn entry(mut self, key: impl Into<Box<str>>, value: impl Into<Box<str>>) -> Self {
		self.push(key, value);
		self
	}

	pub fn push(&mut self, key: impl Into<Box<str>>, value: impl Into<Box<str>>) {
		self.entries.push(Entry::new(key, value));
	}

	pub fn get(&self, key: &str) -> Option<&str> {
		self.entries
			.iter()
			.find(|e| &*e.key == key)
			.map(|e| &*e.value)
	}

	/// Section node holding `entries`; untitled sections have no node of their own.
	pub fn spec_for<'a>(header: &str, entries: impl IntoIterator<Item = &'a Entry>) -> NodeSpec {
		NodeSpec::new(kinds::SECTION)
			.label(header)
			.children(entries.into_iter().map(Entry::to_spec))
	}
}

/// Value form of a keyed entry document, as proposed by generating rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryDocument {
	pub title: Option<Box<str>>,
	pub sections: Vec<Section>,
}

impl EntryDocument {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn titled(title: impl Into<Box<str>>) -> Self {
		Self {
			title: Some(title.into()),
			sections: Vec::new(),
		}
	}

	pub fn section(mut self, section: Section) -> Self {
		self.sections.push(section);
		self
	}

	pub fn is_empty(&self) -> bool {
		self.sections.iter().all(|s| s.entries.is_empty())
	}

	/// Keys in document order.
	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.sections
			.iter()
			.flat_map(|s| s.entries.iter().map(|e| &*e.key))
	}

	pub fn get(&self, key: &str) -> Option<&str> {
		self.sections.iter().find_map(|s| s.get(key))
	}

	/// Builds the canonical tree: blank lines separate the title and sections.
	pub fn to_tree(&self) -> Tree {
		let mut root = NodeSpec::new(kinds::DOCUMENT).attr(kinds::ATTR_TRAILING_NEWLINE, "true");
		if let Some(title) = &self.title {
			root = root.label(title.clone());
		}

		let mut first = self.title.is_none();
		for section in self.sections.iter().filter(|s| !s.entries.is_empty()) {
			if !first {
				root = root.child(NodeSpec::new(kinds::BLANK).text(""));
			}
			first = false;
			root = match &section.header {
				Some(header) => root.child(Section::spec_for(header, &section.entries)),
				None => root.children(section.entries.iter().map(Entry::to_spec)),
			};
		}

		Tree::build(root)
	}

	pub fn to_unit(&self, path: UnitPath) -> Unit {
		Unit::new(path, self.to_tree())
	}

	/// Reads an entry tree back into value form.
	///
	/// Entries outside any section are collected into a leading untitled
	/// section. Returns `None` when the tree is not an entry document.
	pub fn from_tree(tree: &Tree) -> Option<EntryDocument> {
		let root = tree.root();
		if !root.is(kinds::DOCUMENT) {
			return None;
		}

		let mut loose = Section::untitled();
		let mut sections = Vec::new();
		for child in root.children() {
			if child.is(kinds::ENTRY) {
				loose.entries.push(entry_of(child));
			} else if child.is(kinds::SECTION) {
				let mut section = Section::new(child.label().unwrap_or_default());
				section.entries.extend(child.children().filter(|n| n.is(kinds::ENTRY)).map(entry_of));
				sections.push(section);
			}
		}
		if !loose.entries.is_empty() {
			sections.insert(0, loose);
		}

		Some(EntryDocument {
			title: root.label().map(Into::into),
			sections,
		})
	}
}

fn entry_of(node: &Node) -> Entry {
	Entry::new(node.label().unwrap_or_default(), node.text().unwrap_or_default())
}

pub fn is_entry_document(tree: &Tree) -> bool {
	tree.root().is(kinds::DOCUMENT)
}

/// Every entry node as `(id, key, value)`, in document order.
pub fn entry_nodes(tree: &Tree) -> impl Iterator<Item = (NodeId, &str, &str)> {
	tree.iter()
		.filter(|n| n.is(kinds::ENTRY))
		.map(|n| (n.id(), n.label().unwrap_or_default(), n.text().unwrap_or_default()))
}

/// Top-level section with the given header.
pub fn find_section(tree: &Tree, header: &str) -> Option<NodeId> {
	tree.root()
		.children()
		.find(|n| n.is(kinds::SECTION) && n.label() == Some(header))
		.map(Node::id)
}
