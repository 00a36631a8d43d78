//! Idempotent reconciliation of generated artifacts with the forest.
//!
//! Merging is append-only by key across the whole target document: existing
//! entries are never rewritten, removed or reordered, and a key already
//! present anywhere in the target is never appended again, whatever its
//! current value. Appended entries land in a provenance section named after
//! the producing rule, so re-merging the same proposal is a no-op.

use indexmap::IndexMap;
use recast_primitives::entries::{entry_nodes, find_section, is_entry_document};
use recast_primitives::{Entry, EntryDocument, Forest, NodeSpec, Section, Tree, Unit, UnitPath, kinds};
use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};
use tracing::{debug, warn};

use crate::artifact::GeneratedArtifact;
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::error::MergeError;
use crate::rule::RuleId;

#[cfg(test)]
mod tests;

/// Two proposals for one path disagreeing on a key's value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyConflict {
	pub key: Box<str>,
	pub kept: Box<str>,
	pub kept_by: RuleId,
	pub dropped: Box<str>,
	pub dropped_by: RuleId,
}

/// Combines the proposals for one path in order; the first writer of a key wins.
pub fn premerge<'a>(artifacts: impl IntoIterator<Item = &'a GeneratedArtifact>) -> (EntryDocument, Vec<KeyConflict>) {
	let mut document = EntryDocument::new();
	let mut owners: HashMap<Box<str>, (Box<str>, RuleId)> = HashMap::default();
	let mut conflicts = Vec::new();

	for proposal in artifacts {
		let proposed = &proposal.artifact.document;
		if document.title.is_none() {
			document.title.clone_from(&proposed.title);
		}
		for section in &proposed.sections {
			for entry in &section.entries {
				match owners.get(&entry.key) {
					Some((kept, kept_by)) => {
						if *kept != entry.value {
							conflicts.push(KeyConflict {
								key: entry.key.clone(),
								kept: kept.clone(),
								kept_by: kept_by.clone(),
								dropped: entry.value.clone(),
								dropped_by: proposal.rule.clone(),
							});
						}
					}
					None => {
						owners.insert(entry.key.clone(), (entry.value.clone(), proposal.rule.clone()));
						section_mut(&mut document, section.header.as_deref()).entries.push(entry.clone());
					}
				}
			}
		}
	}

	(document, conflicts)
}

fn section_mut<'d>(document: &'d mut EntryDocument, header: Option<&str>) -> &'d mut Section {
	let idx = match document.sections.iter().position(|s| s.header.as_deref() == header) {
		Some(idx) => idx,
		None => {
			document.sections.push(Section {
				header: header.map(Into::into),
				entries: Vec::new(),
			});
			document.sections.len() - 1
		}
	};
	&mut document.sections[idx]
}

/// Result of reconciling one document with the forest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Merged {
	pub unit: Unit,
	/// Keys that were added, in document order; empty when nothing changed.
	pub appended: Vec<Box<str>>,
}

/// Reconciles `document` with the unit currently at `path`.
///
/// Without an existing unit the document is adopted verbatim. Otherwise the
/// entries whose key is absent are appended: into the top-level section with
/// the same header when there is one, else into a new section separated from
/// the existing content by a blank line.
pub fn reconcile(existing: Option<&Unit>, path: &UnitPath, document: &EntryDocument) -> Result<Merged, MergeError> {
	let Some(existing) = existing else {
		return Ok(Merged {
			unit: document.to_unit(path.clone()),
			appended: document.keys().map(Into::into).collect(),
		});
	};
	if !is_entry_document(existing.tree()) {
		return Err(MergeError::NotEntryDocument {
			path: path.clone(),
			kind: existing.root_kind().to_owned(),
		});
	}

	let mut present: HashSet<Box<str>> = entry_nodes(existing.tree()).map(|(_, key, _)| key.into()).collect();
	let mut tree = existing.tree().clone();
	let mut appended = Vec::new();

	for section in &document.sections {
		let missing: Vec<&Entry> = section.entries.iter().filter(|e| present.insert(e.key.clone())).collect();
		if missing.is_empty() {
			continue;
		}
		appended.extend(missing.iter().map(|e| e.key.clone()));
		tree = append_section(tree, section.header.as_deref(), &missing)?;
	}

	if appended.is_empty() {
		return Ok(Merged {
			unit: existing.clone(),
			appended,
		});
	}
	Ok(Merged {
		unit: existing.with_tree(tree),
		appended,
	})
}

fn append_section(mut tree: Tree, header: Option<&str>, entries: &[&Entry]) -> Result<Tree, MergeError> {
	if let Some(section) = header.and_then(|h| find_section(&tree, h)) {
		for entry in entries {
			tree = tree.append_child(section, entry.to_spec())?.0;
		}
		return Ok(tree);
	}

	let root = tree.root().id();
	let needs_blank = match tree.root().children().next_back() {
		Some(last) => !last.is(kinds::BLANK),
		None => tree.root().label().is_some(),
	};
	if needs_blank {
		tree = tree.append_child(root, NodeSpec::new(kinds::BLANK).text(""))?.0;
	}
	match header {
		Some(header) => Ok(tree.append_child(root, Section::spec_for(header, entries.iter().copied()))?.0),
		None => {
			for entry in entries {
				tree = tree.append_child(root, entry.to_spec())?.0;
			}
			Ok(tree)
		}
	}
}

/// Outcome of folding one cycle's generated artifacts into the forest.
#[derive(Debug, Clone, Default)]
pub struct MergeSummary {
	/// Paths whose unit was created or extended.
	pub written: Vec<UnitPath>,
	pub diagnostics: Vec<Diagnostic>,
}

/// Groups `artifacts` by path in proposal order, premerges each group and
/// reconciles it with `forest`.
///
/// Writes are serialized here; proposals themselves may be produced in parallel.
pub fn apply(forest: &mut Forest, artifacts: Vec<GeneratedArtifact>) -> MergeSummary {
	let mut by_path: IndexMap<UnitPath, Vec<GeneratedArtifact>> = IndexMap::new();
	for artifact in artifacts {
		by_path.entry(artifact.path().clone()).or_default().push(artifact);
	}

	let mut summary = MergeSummary::default();
	for (path, proposals) in by_path {
		let (document, conflicts) = premerge(&proposals);
		for conflict in conflicts {
			warn!(%path, key = %conflict.key, kept_by = %conflict.kept_by, dropped_by = %conflict.dropped_by, "merge.conflict");
			summary.diagnostics.push(
				Diagnostic::new(
					DiagnosticKind::MergeConflict,
					path.clone(),
					format!(
						"`{}`: kept {:?} from {}, dropped {:?}",
						conflict.key, conflict.kept, conflict.kept_by, conflict.dropped
					),
				)
				.with_rule(conflict.dropped_by),
			);
		}

		match reconcile(forest.get(&path), &path, &document) {
			Ok(merged) if merged.appended.is_empty() => {
				debug!(%path, "merge.unchanged");
			}
			Ok(merged) => {
				debug!(%path, appended = merged.appended.len(), "merge.applied");
				forest.insert(merged.unit);
				summary.written.push(path);
			}
			Err(error) => {
				warn!(%path, %error, "merge.rejected");
				let mut diagnostic = Diagnostic::new(DiagnosticKind::MergeRejected, path.clone(), error.to_string());
				if let Some(first) = proposals.first() {
					diagnostic = diagnostic.with_rule(first.rule.clone());
				}
				summary.diagnostics.push(diagnostic);
			}
		}
	}
	summary
}
