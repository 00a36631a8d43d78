use recast_primitives::{Forest, UnitPath};
use tracing::debug;

use crate::{CodecRegistry, ParseError};


/// A source that could not be parsed and was left out of the forest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadFailure {
	pub path: UnitPath,
	pub error: ParseError,
}

/// Result of loading a batch of sources.
#[derive(Debug, Clone, Default)]
pub struct Loaded {
	pub forest: Forest,
	pub failures: Vec<LoadFailure>,
}

/// Parses every source with the codec registered for its path.
///
/// Unparseable sources are reported and excluded; they never abort the batch.
/// When a path occurs twice the later source wins.
pub fn load_forest<I, B>(sources: I, codecs: &CodecRegistry) -> Loaded
where
	I: IntoIterator<Item = (UnitPath, B)>,
	B: AsRef<[u8]>,
{
	let mut loaded = Loaded::default();
	for (path, bytes) in sources {
		let codec = codecs.for_path(&path);
		match codec.parse(&path, bytes.as_ref()) {
			Ok(unit) => {
				loaded.forest.insert(unit);
			}
			Err(error) => {
				debug!(codec = codec.name(), %path, %error, "codec.parse_failed");
				loaded.failures.push(LoadFailure { path, error });
			}
		}
	}
	loaded
}

/// Prints every unit of `forest` in path order.
pub fn print_forest(forest: &Forest, codecs: &CodecRegistry) -> Vec<(UnitPath, String)> {
	forest
		.iter()
		.map(|unit| (unit.path().clone(), codecs.for_path(unit.path()).print(unit)))
		.collect()
}
