//! Parser/printer collaborators.
//!
//! A [`Codec`] turns raw bytes into a [`Unit`] tree and back. The engine never
//! sees text: it receives parsed units and hands back units to print. Codecs
//! are lossless for the inputs they accept, so printing an untouched unit
//! reproduces its source bytes.

use recast_primitives::{Unit, UnitPath};
use thiserror::Error;

/// Loading and printing whole forests.
pub mod load;
/// Plain line-oriented text.
pub mod line;
/// `key=value` configuration files with provenance sections.
pub mod properties;
/// Extension-keyed codec lookup.
pub mod registry;
/// Markdown review reports.
pub mod report;

mod text;

pub use line::LineCodec;
pub use load::{LoadFailure, Loaded, load_forest, print_forest};
pub use properties::PropertiesCodec;
pub use registry::CodecRegistry;
pub use report::ReportCodec;

/// Failure to parse one source artifact.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
	#[error("{path}: invalid UTF-8 at byte {offset}")]
	InvalidUtf8 { path: UnitPath, offset: usize },
	#[error("{path}:{line}: {message}")]
	Malformed {
		path: UnitPath,
		line: usize,
		message: String,
	},
}

impl ParseError {
	pub fn path(&self) -> &UnitPath {
		match self {
			Self::InvalidUtf8 { path, .. } | Self::Malformed { path, .. } => path,
		}
	}
}

/// Parser and printer for one artifact format.
pub trait Codec: Send + Sync {
	/// Short format name used in logs.
	fn name(&self) -> &'static str;

	fn parse(&self, path: &UnitPath, source: &[u8]) -> Result<Unit, ParseError>;

	fn print(&self, unit: &Unit) -> String;
}
