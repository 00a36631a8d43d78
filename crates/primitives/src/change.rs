use crate::diff::UnitDiff;
use crate::forest::Forest;
use crate::path::UnitPath;
use crate::unit::Unit;


/// One unit superseded during a cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
	pub path: UnitPath,
	/// Version at the start of the cycle; `None` for units created by generation.
	pub before: Option<Unit>,
	/// Version at the end of the cycle.
	pub after: Unit,
}

impl Change {
	pub fn is_addition(&self) -> bool {
		self.before.is_none()
	}

	/// Structural detail of the change; `None` for additions.
	pub fn diff(&self) -> Option<UnitDiff> {
		self.before.as_ref().map(|before| before.diff(&self.after))
	}
}

/// Every unit that differs between the start and the end of one cycle.
///
/// Records are ordered by path. An empty change set is the scheduler's
/// convergence signal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
	changes: Vec<Change>,
}

impl ChangeSet {
	/// Compares two forest snapshots.
	///
	/// A unit touched several times within the cycle yields a single record
	/// from its start version to its final version; a unit changed and then
	/// restored yields none.
	pub fn between(before: &Forest, after: &Forest) -> Self {
		let changes = after
			.iter()
			.filter_map(|unit| match before.get(unit.path()) {
				Some(prev) if prev == unit => None,
				prev => Some(Change {
					path: unit.path().clone(),
					before: prev.cloned(),
					after: unit.clone(),
				}),
			})
			.collect();
		Self { changes }
	}

	pub fn is_empty(&self) -> bool {
		self.changes.is_empty()
	}

	pub fn len(&self) -> usize {
		self.changes.len()
	}

	pub fn iter(&self) -> impl ExactSizeIterator<Item = &Change> {
		self.changes.iter()
	}

	pub fn paths(&self) -> impl Iterator<Item = &UnitPath> {
		self.changes.iter().map(|c| &c.path)
	}

	pub fn get(&self, path: &UnitPath) -> Option<&Change> {
		self.changes
			.binary_search_by(|c| c.path.cmp(path))
			.ok()
			.map(|idx| &self.changes[idx])
	}

	pub fn contains(&self, path: &UnitPath) -> bool {
		self.get(path).is_some()
	}
}

impl<'a> IntoIterator for &'a ChangeSet {
	type Item = &'a Change;
	type IntoIter = std::slice::Iter<'a, Change>;

	fn into_iter(self) -> Self::IntoIter {
		self.changes.iter()
	}
}
