use std::fmt;
use std::sync::Arc;

use thiserror::Error;


/// Errors produced when normalizing a logical path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
	/// The path climbs above the forest root.
	#[error("path escapes the forest root: {0}")]
	EscapesRoot(String),
	/// The path contains a NUL byte.
	#[error("path contains a NUL byte: {0:?}")]
	Nul(String),
}

/// Slash-separated logical path identifying a unit or a directory.
///
/// Paths are normalized on construction: backslashes become slashes, empty and
/// `.` segments are dropped, and `..` segments pop their parent. The empty
/// path is the forest root directory.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitPath(Arc<str>);

impl UnitPath {
	/// Parses and normalizes a path.
	pub fn new(raw: &str) -> Result<Self, PathError> {
		if raw.contains('\0') {
			return Err(PathError::Nul(raw.to_string()));
		}

		let mut segments: Vec<&str> = Vec::new();
		for segment in raw.split(['/', '\\']) {
			match segment {
				"" | "." => {}
				".." => {
					if segments.pop().is_none() {
						return Err(PathError::EscapesRoot(raw.to_string()));
					}
				}
				other => segments.push(other),
			}
		}

		Ok(Self(Arc::from(segments.join("/"))))
	}

	/// The forest root directory.
	pub fn root() -> Self {
		Self(Arc::from(""))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	pub fn is_root(&self) -> bool {
		self.0.is_empty()
	}

	/// Returns the final path segment, or `None` for the root.
	pub fn file_name(&self) -> Option<&str> {
		if self.is_root() {
			return None;
		}
		self.0.rsplit('/').next()
	}

	/// Returns the extension of the final segment, without the dot.
	pub fn extension(&self) -> Option<&str> {
		let name = self.file_name()?;
		let (stem, ext) = name.rsplit_once('.')?;
		(!stem.is_empty()).then_some(ext)
	}

	/// Returns the containing directory, or `None` for the root.
	pub fn parent(&self) -> Option<UnitPath> {
		if self.is_root() {
			return None;
		}
		match self.0.rsplit_once('/') {
			Some((dir, _)) => Some(Self(Arc::from(dir))),
			None => Some(Self::root()),
		}
	}

	/// Iterates ancestor directories from nearest to farthest, ending with the root.
	pub fn ancestors(&self) -> Ancestors {
		Ancestors { next: self.parent() }
	}

	/// Appends a relative path below this one.
	pub fn join(&self, rel: &str) -> Result<UnitPath, PathError> {
		if self.is_root() {
			return Self::new(rel);
		}
		Self::new(&format!("{}/{}", self.0, rel))
	}

	/// Returns true when `self` equals `dir` or lies below it.
	pub fn starts_with(&self, dir: &UnitPath) -> bool {
		if dir.is_root() {
			return true;
		}
		self.0
			.strip_prefix(dir.as_str())
			.is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
	}
}

impl fmt::Debug for UnitPath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "UnitPath({:?})", &*self.0)
	}
}

impl fmt::Display for UnitPath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.is_root() {
			f.write_str(".")
		} else {
			f.write_str(&self.0)
		}
	}
}

impl TryFrom<&str> for UnitPath {
	type Error = PathError;

	fn try_from(raw: &str) -> Result<Self, Self::Error> {
		Self::new(raw)
	}
}

/// Iterator over the ancestor directories of a path.
#[derive(Debug, Clone)]
pub struct Ancestors {
	next: Option<UnitPath>,
}

impl Iterator for Ancestors {
	type Item = UnitPath;

	fn next(&mut self) -> Option<UnitPath> {
		let current = self.next.take()?;
		self.next = current.parent();
		Some(current)
	}
}
