use std::collections::BTreeMap;
use std::collections::btree_map;

use crate::path::UnitPath;
use crate::unit::Unit;

/// The latest version of every unit, ordered by path.
///
/// Path order is the stable visiting order of every engine phase, which keeps
/// runs reproducible. Cloning is cheap relative to the units: trees are shared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Forest {
	units: BTreeMap<UnitPath, Unit>,
}

impl Forest {
	pub fn new() -> Self {
		Self::default()
	}

	/// Inserts a unit, returning the version it supersedes.
	pub fn insert(&mut self, unit: Unit) -> Option<Unit> {
		self.units.insert(unit.path().clone(), unit)
	}

	pub fn get(&self, path: &UnitPath) -> Option<&Unit> {
		self.units.get(path)
	}

	pub fn contains(&self, path: &UnitPath) -> bool {
		self.units.contains_key(path)
	}

	pub fn len(&self) -> usize {
		self.units.len()
	}

	pub fn is_empty(&self) -> bool {
		self.units.is_empty()
	}

	pub fn paths(&self) -> impl Iterator<Item = &UnitPath> {
		self.units.keys()
	}

	pub fn iter(&self) -> impl ExactSizeIterator<Item = &Unit> + DoubleEndedIterator {
		self.units.values()
	}

	/// Units as a slice-friendly vector, in path order.
	pub fn to_vec(&self) -> Vec<Unit> {
		self.units.values().cloned().collect()
	}
}

impl FromIterator<Unit> for Forest {
	fn from_iter<I: IntoIterator<Item = Unit>>(iter: I) -> Self {
		let mut forest = Forest::new();
		for unit in iter {
			forest.insert(unit);
		}
		forest
	}
}

impl Extend<Unit> for Forest {
	fn extend<I: IntoIterator<Item = Unit>>(&mut self, iter: I) {
		for unit in iter {
			self.insert(unit);
		}
	}
}

impl IntoIterator for Forest {
	type Item = Unit;
	type IntoIter = btree_map::IntoValues<UnitPath, Unit>;

	fn into_iter(self) -> Self::IntoIter {
		self.units.into_values()
	}
}
