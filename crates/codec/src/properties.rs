//! `key=value` configuration files.
//!
//! Besides plain entries the format recognizes provenance headers: a comment
//! line of the exact form `# [title]` opens a [`kinds::SECTION`] that collects
//! the following entries and comments until the next blank line or header.
//! Entry labels and texts hold the unescaped key and value. The raw spellings,
//! continuation lines included, are kept as attributes next to indentation and
//! separator, so untouched entries print byte for byte. Entries whose key or
//! value no longer matches its raw spelling are printed escaped.

use std::borrow::Cow;

use recast_primitives::entries::{ATTR_INDENT, ATTR_SEPARATOR};
use recast_primitives::{Node, NodeSpec, Tree, Unit, UnitPath, kinds};

use crate::text::{TRAILING, decode, join_lines, split_lines, trailing_attr};
use crate::{Codec, ParseError};

#[cfg(test)]
mod tests;

/// Attribute holding the key as written in the source.
pub const ATTR_RAW_KEY: &str = "raw-key";
/// Attribute holding the value as written in the source.
pub const ATTR_RAW_VALUE: &str = "raw-value";

#[derive(Debug, Clone, Copy, Default)]
pub struct PropertiesCodec;

impl Codec for PropertiesCodec {
	fn name(&self) -> &'static str {
		"properties"
	}

	fn parse(&self, path: &UnitPath, source: &[u8]) -> Result<Unit, ParseError> {
		let text = decode(path, source)?;
		let (lines, trailing) = split_lines(text);

		let mut root = NodeSpec::new(kinds::DOCUMENT).attr(TRAILING, trailing_attr(trailing));
		let mut section: Option<NodeSpec> = None;
		let mut idx = 0;
		while idx < lines.len() {
			let line = lines[idx];
			let start = idx;
			idx += 1;

			if line.trim().is_empty() {
				root = close(root, section.take());
				root = root.child(NodeSpec::new(kinds::BLANK).text(line));
				continue;
			}
			if let Some(title) = section_header(line) {
				root = close(root, section.take());
				section = Some(NodeSpec::new(kinds::SECTION).label(title));
				continue;
			}

			let trimmed = line.trim_start();
			let node = if trimmed.starts_with('#') || trimmed.starts_with('!') {
				NodeSpec::new(kinds::COMMENT).text(line)
			} else {
				let mut value_lines = vec![line];
				while continues(value_lines[value_lines.len() - 1]) && idx < lines.len() {
					value_lines.push(lines[idx]);
					idx += 1;
				}
				parse_entry(path, start + 1, &value_lines.join("\n"))?
			};
			section = match section {
				Some(open) => Some(open.child(node)),
				None => {
					root = root.child(node);
					None
				}
			};
		}
		root = close(root, section);

		Ok(Unit::new(path.clone(), Tree::build(root)))
	}

	fn print(&self, unit: &Unit) -> String {
		let root = unit.tree().root();
		let mut lines = Vec::new();
		for child in root.children() {
			print_node(child, &mut lines);
		}
		join_lines(lines, root.attr(TRAILING))
	}
}

fn close(root: NodeSpec, section: Option<NodeSpec>) -> NodeSpec {
	match section {
		Some(section) => root.child(section),
		None => root,
	}
}

/// Title of a `# [title]` provenance header line.
pub fn section_header(line: &str) -> Option<&str> {
	let title = line.strip_prefix("# [")?.strip_suffix(']')?;
	(!title.is_empty()).then_some(title)
}

/// Whether a physical line ends in an odd run of backslashes.
fn continues(line: &str) -> bool {
	line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

fn is_key_terminator(c: char) -> bool {
	matches!(c, '=' | ':' | ' ' | '\t' | '\x0c')
}

fn parse_entry(path: &UnitPath, line_no: usize, logical: &str) -> Result<NodeSpec, ParseError> {
	let rest = logical.trim_start_matches([' ', '\t', '\x0c']);
	let indent = &logical[..logical.len() - rest.len()];

	let mut key_end = rest.len();
	let mut escaped = false;
	for (pos, c) in rest.char_indices() {
		if escaped {
			escaped = false;
		} else if c == '\\' {
			escaped = true;
		} else if is_key_terminator(c) {
			key_end = pos;
			break;
		}
	}
	let raw_key = &rest[..key_end];
	if raw_key.is_empty() {
		return Err(malformed(path, line_no, "entry has no key"));
	}

	let after_key = &rest[key_end..];
	let mut sep_end = after_key.len() - after_key.trim_start_matches([' ', '\t', '\x0c']).len();
	if after_key[sep_end..].starts_with(['=', ':']) {
		sep_end += 1;
		let tail = &after_key[sep_end..];
		sep_end += tail.len() - tail.trim_start_matches([' ', '\t', '\x0c']).len();
	}
	let (sep, raw_value) = after_key.split_at(sep_end);

	let key = unescape(raw_key).ok_or_else(|| malformed(path, line_no, "malformed \\uXXXX escape in key"))?;
	let value = unescape(raw_value).ok_or_else(|| malformed(path, line_no, "malformed \\uXXXX escape in value"))?;
	Ok(NodeSpec::new(kinds::ENTRY)
		.label(key)
		.text(value)
		.attr(ATTR_INDENT, indent)
		.attr(ATTR_SEPARATOR, sep)
		.attr(ATTR_RAW_KEY, raw_key)
		.attr(ATTR_RAW_VALUE, raw_value))
}

fn malformed(path: &UnitPath, line: usize, message: &str) -> ParseError {
	ParseError::Malformed {
		path: path.clone(),
		line,
		message: message.to_owned(),
	}
}

/// Resolves backslash escapes and line continuations.
///
/// Returns `None` for a malformed `\uXXXX` escape.
fn unescape(raw: &str) -> Option<String> {
	let mut out = String::with_capacity(raw.len());
	let mut chars = raw.chars();
	while let Some(c) = chars.next() {
		if c != '\\' {
			out.push(c);
			continue;
		}
		match chars.next() {
			None => {}
			Some('\n') => {
				chars = chars.as_str().trim_start_matches([' ', '\t', '\x0c']).chars();
			}
			Some('t') => out.push('\t'),
			Some('n') => out.push('\n'),
			Some('r') => out.push('\r'),
			Some('f') => out.push('\x0c'),
			Some('u') => {
				let rest = chars.as_str();
				let hex = rest.get(..4).filter(|hex| hex.chars().all(|c| c.is_ascii_hexdigit()))?;
				out.push(char::from_u32(u32::from_str_radix(hex, 16).ok()?)?);
				chars = rest[4..].chars();
			}
			Some(other) => out.push(other),
		}
	}
	Some(out)
}

/// Escapes `text` so it parses back to itself as a key (`key`) or a value.
fn escape(text: &str, key: bool) -> String {
	let mut out = String::with_capacity(text.len());
	for (idx, c) in text.chars().enumerate() {
		match c {
			'\\' => out.push_str("\\\\"),
			'\t' => out.push_str("\\t"),
			'\n' => out.push_str("\\n"),
			'\r' => out.push_str("\\r"),
			'\x0c' => out.push_str("\\f"),
			' ' | '=' | ':' if key || idx == 0 => {
				out.push('\\');
				out.push(c);
			}
			'#' | '!' if key && idx == 0 => {
				out.push('\\');
				out.push(c);
			}
			_ => out.push(c),
		}
	}
	out
}

fn escape_key(key: &str) -> String {
	escape(key, true)
}

fn escape_value(value: &str) -> String {
	escape(value, false)
}

/// The raw spelling in `attr` while it still reads as `logical`, else the escaped form.
fn spelling<'n>(node: &'n Node, attr: &str, logical: &str, escape: fn(&str) -> String) -> Cow<'n, str> {
	match node.attr(attr) {
		Some(raw) if unescape(raw).as_deref() == Some(logical) => Cow::Borrowed(raw),
		_ => Cow::Owned(escape(logical)),
	}
}

fn print_node(node: &Node, out: &mut Vec<String>) {
	match node.kind() {
		kinds::ENTRY => out.push(format!(
			"{}{}{}{}",
			node.attr(ATTR_INDENT).unwrap_or_default(),
			spelling(node, ATTR_RAW_KEY, node.label().unwrap_or_default(), escape_key),
			node.attr(ATTR_SEPARATOR).unwrap_or("="),
			spelling(node, ATTR_RAW_VALUE, node.text().unwrap_or_default(), escape_value),
		)),
		kinds::SECTION => {
			out.push(format!("# [{}]", node.label().unwrap_or_default()));
			for child in node.children() {
				print_node(child, out);
			}
		}
		_ => out.push(node.text().unwrap_or_default().to_owned()),
	}
}
