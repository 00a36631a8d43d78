use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use smallvec::SmallVec;
use thiserror::Error;


/// Stable identity of a node inside one tree.
///
/// Ids are allocated when nodes are built and survive every edit that does not
/// remove the node, so markers attached to an id stay attached even when the
/// surrounding content changes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
	pub const fn get(self) -> u32 {
		self.0
	}
}

impl fmt::Debug for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{}", self.0)
	}
}

impl fmt::Display for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{}", self.0)
	}
}

/// Errors from tree edits.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
	#[error("no node with id {0}")]
	UnknownNode(NodeId),
	#[error("the root node cannot be removed")]
	RemoveRoot,
	#[error("child index {index} out of range for {parent} with {len} children")]
	ChildIndexOutOfRange { parent: NodeId, index: usize, len: usize },
}

/// Small attribute list carried by a node (formatting intent, separators).
pub type Attrs = SmallVec<[(Box<str>, Box<str>); 2]>;

/// One node of an immutable tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
	id: NodeId,
	kind: Box<str>,
	label: Option<Box<str>>,
	text: Option<Box<str>>,
	attrs: Attrs,
	children: Vec<Arc<Node>>,
}

impl Node {
	pub fn id(&self) -> NodeId {
		self.id
	}

	pub fn kind(&self) -> &str {
		&self.kind
	}

	/// Returns true when the node has the given kind.
	pub fn is(&self, kind: &str) -> bool {
		&*self.kind == kind
	}

	pub fn label(&self) -> Option<&str> {
		self.label.as_deref()
	}

	pub fn text(&self) -> Option<&str> {
		self.text.as_deref()
	}

	pub fn attr(&self, name: &str) -> Option<&str> {
		self.attrs
			.iter()
			.find(|(k, _)| &**k == name)
			.map(|(_, v)| &**v)
	}

	pub fn attrs(&self) -> &[(Box<str>, Box<str>)] {
		&self.attrs
	}

	pub fn children(&self) -> impl ExactSizeIterator<Item = &Node> + DoubleEndedIterator {
		self.children.iter().map(|c| &**c)
	}

	pub fn child_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
		self.children.iter().map(|c| c.id)
	}

	/// Compares everything but children.
	pub(crate) fn same_content(&self, other: &Node) -> bool {
		self.kind == other.kind
			&& self.label == other.label
			&& self.text == other.text
			&& self.attrs == other.attrs
	}

	fn set_attr(&mut self, name: &str, value: &str) {
		match self.attrs.iter_mut().find(|(k, _)| &**k == name) {
			Some((_, v)) => *v = value.into(),
			None => self.attrs.push((name.into(), value.into())),
		}
	}
}

/// Unassigned node description used to build or extend a tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSpec {
	kind: Box<str>,
	label: Option<Box<str>>,
	text: Option<Box<str>>,
	attrs: Attrs,
	children: Vec<NodeSpec>,
}

impl NodeSpec {
	pub fn new(kind: &str) -> Self {
		Self {
			kind: kind.into(),
			label: None,
			text: None,
			attrs: Attrs::new(),
			children: Vec::new(),
		}
	}

	pub fn label(mut self, label: impl Into<Box<str>>) -> Self {
		self.label = Some(label.into());
		self
	}

	pub fn text(mut self, text: impl Into<Box<str>>) -> Self {
		self.text = Some(text.into());
		self
	}

	pub fn attr(mut self, name: &str, value: &str) -> Self {
		self.attrs.push((name.into(), value.into()));
		self
	}

	pub fn child(mut self, child: NodeSpec) -> Self {
		self.children.push(child);
		self
	}

	pub fn children(mut self, children: impl IntoIterator<Item = NodeSpec>) -> Self {
		self.children.extend(children);
		self
	}

	fn alloc(self, next_id: &mut u32) -> Node {
		let id = NodeId(*next_id);
		*next_id += 1;
		let children = self
			.children
			.into_iter()
			.map(|c| Arc::new(c.alloc(next_id)))
			.collect();
		Node {
			id,
			kind: self.kind,
			label: self.label,
			text: self.text,
			attrs: self.attrs,
			children,
		}
	}
}

static NEXT_LINEAGE: AtomicU64 = AtomicU64::new(0);

/// Immutable tree with structural sharing.
///
/// Every edit returns a new tree; untouched subtrees are shared with the
/// previous version. Edits keep the tree's lineage, [`Tree::build`] starts a
/// new one: node ids are only comparable within one lineage. Equality
/// compares node content and ids, never the allocator state or lineage.
#[derive(Debug, Clone)]
pub struct Tree {
	root: Arc<Node>,
	next_id: u32,
	lineage: u64,
}

impl PartialEq for Tree {
	fn eq(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.root, &other.root) || self.root == other.root
	}
}

impl Eq for Tree {}

impl Tree {
	/// Builds a tree, assigning ids in pre-order starting at zero.
	pub fn build(spec: NodeSpec) -> Self {
		let mut next_id = 0;
		let root = Arc::new(spec.alloc(&mut next_id));
		Self {
			root,
			next_id,
			lineage: NEXT_LINEAGE.fetch_add(1, AtomicOrdering::Relaxed),
		}
	}

	pub fn root(&self) -> &Node {
		&self.root
	}

	/// Returns true when both trees share the same root allocation.
	pub fn ptr_eq(&self, other: &Tree) -> bool {
		Arc::ptr_eq(&self.root, &other.root)
	}

	/// Returns true when `other` was derived from the same [`Tree::build`] by edits.
	pub fn same_lineage(&self, other: &Tree) -> bool {
		self.lineage == other.lineage
	}

	pub fn get(&self, id: NodeId) -> Option<&Node> {
		self.iter().find(|n| n.id == id)
	}

	pub fn contains(&self, id: NodeId) -> bool {
		self.get(id).is_some()
	}

	/// Number of nodes, including the root.
	pub fn node_count(&self) -> usize {
		self.iter().count()
	}

	/// Pre-order traversal.
	pub fn iter(&self) -> Iter<'_> {
		Iter {
			stack: vec![&*self.root],
		}
	}

	pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
		self.iter()
			.find(|n| n.children.iter().any(|c| c.id == id))
			.map(|n| n.id)
	}

	pub fn set_text(&self, id: NodeId, text: Option<&str>) -> Result<Tree, TreeError> {
		self.edit(id, |node, _| {
			node.text = text.map(Into::into);
			Ok(())
		})
		.map(|(tree, ())| tree)
	}

	pub fn set_label(&self, id: NodeId, label: Option<&str>) -> Result<Tree, TreeError> {
		self.edit(id, |node, _| {
			node.label = label.map(Into::into);
			Ok(())
		})
		.map(|(tree, ())| tree)
	}

	pub fn set_attr(&self, id: NodeId, name: &str, value: &str) -> Result<Tree, TreeError> {
		self.edit(id, |node, _| {
			node.set_attr(name, value);
			Ok(())
		})
		.map(|(tree, ())| tree)
	}

	/// Appends a new child under `parent`, returning the new tree and the child's id.
	pub fn append_child(&self, parent: NodeId, spec: NodeSpec) -> Result<(Tree, NodeId), TreeError> {
		self.edit(parent, |node, next_id| {
			let child = spec.alloc(next_id);
			let id = child.id;
			node.children.push(Arc::new(child));
			Ok(id)
		})
	}

	/// Inserts a new child at `index` under `parent`.
	pub fn insert_child(&self, parent: NodeId, index: usize, spec: NodeSpec) -> Result<(Tree, NodeId), TreeError> {
		self.edit(parent, |node, next_id| {
			let len = node.children.len();
			if index > len {
				return Err(TreeError::ChildIndexOutOfRange { parent, index, len });
			}
			let child = spec.alloc(next_id);
			let id = child.id;
			node.children.insert(index, Arc::new(child));
			Ok(id)
		})
	}

	/// Removes a node and its subtree.
	pub fn remove(&self, id: NodeId) -> Result<Tree, TreeError> {
		if id == self.root.id {
			return Err(TreeError::RemoveRoot);
		}
		let parent = self.parent_of(id).ok_or(TreeError::UnknownNode(id))?;
		self.edit(parent, |node, _| {
			node.children.retain(|c| c.id != id);
			Ok(())
		})
		.map(|(tree, ())| tree)
	}

	fn edit<R>(&self, id: NodeId, f: impl FnOnce(&mut Node, &mut u32) -> Result<R, TreeError>) -> Result<(Tree, R), TreeError> {
		let path = path_to(&self.root, id).ok_or(TreeError::UnknownNode(id))?;
		let mut root = Arc::clone(&self.root);
		let mut next_id = self.next_id;

		let mut node: &mut Node = Arc::make_mut(&mut root);
		for idx in path {
			node = Arc::make_mut(&mut node.children[idx]);
		}
		let out = f(node, &mut next_id)?;

		Ok((
			Tree {
				root,
				next_id,
				lineage: self.lineage,
			},
			out,
		))
	}
}

/// Child indices leading from `node` to the node with `id`.
fn path_to(node: &Node, id: NodeId) -> Option<Vec<usize>> {
	if node.id == id {
		return Some(Vec::new());
	}
	for (idx, child) in node.children.iter().enumerate() {
		if let Some(mut rest) = path_to(child, id) {
			rest.insert(0, idx);
			return Some(rest);
		}
	}
	None
}

/// Pre-order node iterator.
pub struct Iter<'a> {
	stack: Vec<&'a Node>,
}

impl<'a> Iterator for Iter<'a> {
	type Item = &'a Node;

	fn next(&mut self) -> Option<&'a Node> {
		let node = self.stack.pop()?;
		self.stack.extend(node.children.iter().rev().map(|c| &**c));
		Some(node)
	}
}
