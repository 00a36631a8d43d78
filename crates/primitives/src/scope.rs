use std::fmt;

use crate::path::UnitPath;

/// Logical module a unit belongs to.
///
/// `Module` holds the directory of the nearest ancestor containing a module
/// marker file; units without one share the synthetic `Default` scope.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ScopeId {
	Default,
	Module(UnitPath),
}

impl ScopeId {
	/// Directory generated artifacts for this scope are placed under.
	///
	/// The default scope generates at the forest root.
	pub fn base_dir(&self) -> UnitPath {
		match self {
			Self::Default => UnitPath::root(),
			Self::Module(dir) => dir.clone(),
		}
	}

	pub fn is_default(&self) -> bool {
		matches!(self, Self::Default)
	}
}

impl fmt::Debug for ScopeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "ScopeId({self})")
	}
}

impl fmt::Display for ScopeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Default => f.write_str("<default>"),
			Self::Module(dir) => fmt::Display::fmt(dir, f),
		}
	}
}
