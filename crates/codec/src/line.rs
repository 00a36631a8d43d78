use recast_primitives::{NodeSpec, Tree, Unit, UnitPath, kinds};

use crate::text::{TRAILING, decode, join_lines, split_lines, trailing_attr};
use crate::{Codec, ParseError};


/// Fallback codec: a [`kinds::SOURCE`] root with one [`kinds::LINE`] child per line.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineCodec;

impl Codec for LineCodec {
	fn name(&self) -> &'static str {
		"line"
	}

	fn parse(&self, path: &UnitPath, source: &[u8]) -> Result<Unit, ParseError> {
		let text = decode(path, source)?;
		let (lines, trailing) = split_lines(text);
		let root = NodeSpec::new(kinds::SOURCE)
			.attr(TRAILING, trailing_attr(trailing))
			.children(lines.into_iter().map(|line| NodeSpec::new(kinds::LINE).text(line)));
		Ok(Unit::new(path.clone(), Tree::build(root)))
	}

	fn print(&self, unit: &Unit) -> String {
		let root = unit.tree().root();
		let lines = root
			.children()
			.map(|line| line.text().unwrap_or_default().to_owned())
			.collect();
		join_lines(lines, root.attr(TRAILING))
	}
}
