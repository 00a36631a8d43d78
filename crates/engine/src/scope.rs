//! Module scope resolution.
//!
//! A directory is a module when it directly contains a marker file (a build
//! descriptor, a `recast.toml`, ...). Every unit belongs to the nearest
//! enclosing module; units outside any module share [`ScopeId::Default`].

use std::collections::BTreeSet;

use recast_primitives::{Forest, ScopeId, UnitPath};
use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};

#[cfg(test)]
mod tests;

/// Resolves `path` against a set of marker file paths.
///
/// Walks the ancestor directories of `path` from nearest to farthest; the
/// first one holding a marker file is the scope.
pub fn resolve_scope<'a>(path: &UnitPath, marker_files: impl IntoIterator<Item = &'a UnitPath>) -> ScopeId {
	let module_dirs: HashSet<UnitPath> = marker_files.into_iter().filter_map(UnitPath::parent).collect();
	nearest_module(path, &module_dirs)
}

fn nearest_module(path: &UnitPath, module_dirs: &HashSet<UnitPath>) -> ScopeId {
	path.ancestors()
		.find(|dir| module_dirs.contains(dir))
		.map_or(ScopeId::Default, ScopeId::Module)
}

/// Scope lookups for one cycle.
///
/// Built from a forest snapshot: the module set is derived from the paths
/// whose file name is a configured marker, and every unit's scope is resolved
/// once up front. Paths outside the snapshot, such as generated artifact
/// targets, are resolved on demand against the same module set.
#[derive(Debug, Clone, Default)]
pub struct ScopeResolver {
	module_dirs: HashSet<UnitPath>,
	resolved: HashMap<UnitPath, ScopeId>,
}

impl ScopeResolver {
	pub fn new<'a>(marker_files: impl IntoIterator<Item = &'a UnitPath>) -> Self {
		Self {
			module_dirs: marker_files.into_iter().filter_map(UnitPath::parent).collect(),
			resolved: HashMap::default(),
		}
	}

	/// Indexes every unit of `forest`, treating files named in `markers` as module markers.
	pub fn for_forest(forest: &Forest, markers: &[String]) -> Self {
		let marker_files = forest
			.paths()
			.filter(|path| path.file_name().is_some_and(|name| markers.iter().any(|m| m == name)));
		let mut resolver = Self::new(marker_files);
		let resolved = forest
			.paths()
			.map(|path| (path.clone(), nearest_module(path, &resolver.module_dirs)))
			.collect();
		resolver.resolved = resolved;
		resolver
	}

	pub fn resolve(&self, path: &UnitPath) -> ScopeId {
		match self.resolved.get(path) {
			Some(scope) => scope.clone(),
			None => nearest_module(path, &self.module_dirs),
		}
	}

	pub fn is_module(&self, dir: &UnitPath) -> bool {
		self.module_dirs.contains(dir)
	}

	/// Distinct scopes of the indexed units, in scope order.
	pub fn scopes(&self) -> BTreeSet<ScopeId> {
		self.resolved.values().cloned().collect()
	}
}
