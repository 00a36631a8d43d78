use recast_primitives::{UnitPath, kinds};

use crate::ParseError;

/// Decodes `source` as UTF-8.
pub(crate) fn decode<'a>(path: &UnitPath, source: &'a [u8]) -> Result<&'a str, ParseError> {
	std::str::from_utf8(source).map_err(|err| ParseError::InvalidUtf8 {
		path: path.clone(),
		offset: err.valid_up_to(),
	})
}

/// Splits text into physical lines and reports whether it ended with a newline.
///
/// `"a\nb\n"` yields `(["a", "b"], true)`; the empty string yields no lines.
pub(crate) fn split_lines(text: &str) -> (Vec<&str>, bool) {
	if text.is_empty() {
		return (Vec::new(), false);
	}
	let trailing = text.ends_with('\n');
	let body = if trailing { &text[..text.len() - 1] } else { text };
	(body.split('\n').collect(), trailing)
}

/// Joins printed lines, restoring the trailing newline flag of `root`.
pub(crate) fn join_lines(lines: Vec<String>, trailing: Option<&str>) -> String {
	let mut out = lines.join("\n");
	if trailing == Some("true") && !lines.is_empty() {
		out.push('\n');
	}
	out
}

pub(crate) fn trailing_attr(trailing: bool) -> &'static str {
	if trailing { "true" } else { "false" }
}

pub(crate) const TRAILING: &str = kinds::ATTR_TRAILING_NEWLINE;
