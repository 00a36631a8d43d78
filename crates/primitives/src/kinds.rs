//! Node kinds shared between codecs, the merge engine and rules.
//!
//! Kinds are plain strings so parsers can introduce their own; the constants
//! below are the ones the engine itself understands.

/// Root of a keyed entry document (properties files, review reports).
pub const DOCUMENT: &str = "document";
/// Provenance section inside an entry document; label holds the header.
pub const SECTION: &str = "section";
/// Keyed entry; label holds the key, text holds the value.
pub const ENTRY: &str = "entry";
/// Preserved non-entry line; text holds the raw line.
pub const COMMENT: &str = "comment";
/// Blank line; text holds any whitespace on it.
pub const BLANK: &str = "blank";

/// Root of a plain line-oriented source unit.
pub const SOURCE: &str = "source";
/// One source line; text holds the line without its terminator.
pub const LINE: &str = "line";

/// Root attribute recording whether the printed form ends with a newline.
pub const ATTR_TRAILING_NEWLINE: &str = "trailing-newline";
