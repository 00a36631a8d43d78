//! Markdown review reports.
//!
//! The accepted shape is small: an optional `# title` first line,
//! `## header` section lines and ``- `key`: value`` entry bullets. Anything
//! else is kept verbatim as a comment node.
//!
//! Entry keys are code spans: a key containing backticks is fenced with a
//! longer backtick run, and padded with one space on each side when it starts
//! or ends with a backtick.

use recast_primitives::{Node, NodeSpec, Tree, Unit, UnitPath, kinds};

use crate::text::{TRAILING, decode, join_lines, split_lines, trailing_attr};
use crate::{Codec, ParseError};


/// Attribute holding the key's code span as written in the source.
pub const ATTR_SPAN: &str = "span";

#[derive(Debug, Clone, Copy, Default)]
pub struct ReportCodec;

impl Codec for ReportCodec {
	fn name(&self) -> &'static str {
		"report"
	}

	fn parse(&self, path: &UnitPath, source: &[u8]) -> Result<Unit, ParseError> {
		let text = decode(path, source)?;
		let (mut lines, trailing) = split_lines(text);

		let mut root = NodeSpec::new(kinds::DOCUMENT).attr(TRAILING, trailing_attr(trailing));
		if let Some(title) = lines.first().and_then(|line| line.strip_prefix("# ")) {
			root = root.label(title);
			lines.remove(0);
		}

		let mut section: Option<NodeSpec> = None;
		for line in lines {
			if line.trim().is_empty() {
				if let Some(open) = section.take() {
					root = root.child(open);
				}
				root = root.child(NodeSpec::new(kinds::BLANK).text(line));
				continue;
			}
			if let Some(header) = line.strip_prefix("## ") {
				if let Some(open) = section.take() {
					root = root.child(open);
				}
				section = Some(NodeSpec::new(kinds::SECTION).label(header));
				continue;
			}

			let node = match parse_entry(line) {
				Some((span, key, value)) => NodeSpec::new(kinds::ENTRY).label(key).text(value).attr(ATTR_SPAN, span),
				None => NodeSpec::new(kinds::COMMENT).text(line),
			};
			section = match section {
				Some(open) => Some(open.child(node)),
				None => {
					root = root.child(node);
					None
				}
			};
		}
		if let Some(open) = section {
			root = root.child(open);
		}

		Ok(Unit::new(path.clone(), Tree::build(root)))
	}

	fn print(&self, unit: &Unit) -> String {
		let root = unit.tree().root();
		let mut lines = Vec::new();
		if let Some(title) = root.label() {
			lines.push(format!("# {title}"));
		}
		for child in root.children() {
			print_node(child, &mut lines);
		}
		join_lines(lines, root.attr(TRAILING))
	}
}

/// Splits a ``- `key`: value`` bullet into the key's code span, the key and the value.
fn parse_entry(line: &str) -> Option<(&str, &str, &str)> {
	let rest = line.strip_prefix("- ")?;
	let fence = rest.len() - rest.trim_start_matches('`').len();
	if fence == 0 {
		return None;
	}
	let close = fence + closing_fence(&rest[fence..], fence)?;
	let value = rest[close + fence..].strip_prefix(": ")?;
	let key = unpad(&rest[fence..close]);
	(!key.is_empty()).then_some((&rest[..close + fence], key, value))
}

/// Offset of the first backtick run in `body` exactly `fence` long.
fn closing_fence(body: &str, fence: usize) -> Option<usize> {
	let bytes = body.as_bytes();
	let mut idx = 0;
	while idx < bytes.len() {
		if bytes[idx] != b'`' {
			idx += 1;
			continue;
		}
		let start = idx;
		while idx < bytes.len() && bytes[idx] == b'`' {
			idx += 1;
		}
		if idx - start == fence {
			return Some(start);
		}
	}
	None
}

fn is_padded(inner: &str) -> bool {
	inner.len() >= 2 && inner.starts_with(' ') && inner.ends_with(' ') && !inner.bytes().all(|b| b == b' ')
}

fn unpad(inner: &str) -> &str {
	if is_padded(inner) { &inner[1..inner.len() - 1] } else { inner }
}

/// Content of a code span written as `span`, fences included.
fn span_content(span: &str) -> &str {
	let fence = span.len() - span.trim_start_matches('`').len();
	unpad(span.get(fence..span.len().saturating_sub(fence)).unwrap_or_default())
}

fn code_span(key: &str) -> String {
	let longest = key.split(|c: char| c != '`').map(str::len).max().unwrap_or(0);
	let fence = "`".repeat(longest + 1);
	if key.starts_with('`') || key.ends_with('`') || is_padded(key) {
		format!("{fence} {key} {fence}")
	} else {
		format!("{fence}{key}{fence}")
	}
}

fn print_node(node: &Node, out: &mut Vec<String>) {
	match node.kind() {
		kinds::ENTRY => {
			let key = node.label().unwrap_or_default();
			let span = match node.attr(ATTR_SPAN) {
				Some(span) if span_content(span) == key => span.to_owned(),
				_ => code_span(key),
			};
			out.push(format!("- {span}: {}", node.text().unwrap_or_default()));
		}
		kinds::SECTION => {
			out.push(format!("## {}", node.label().unwrap_or_default()));
			for child in node.children() {
				print_node(child, out);
			}
		}
		_ => out.push(node.text().unwrap_or_default().to_owned()),
	}
}
