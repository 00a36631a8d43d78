use recast_primitives::{EntryDocument, ScopeId, UnitPath};

use crate::rule::RuleId;

/// Entries a generating rule proposes for one path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
	pub path: UnitPath,
	pub document: EntryDocument,
}

impl Artifact {
	pub fn new(path: UnitPath, document: EntryDocument) -> Self {
		Self { path, document }
	}
}

/// An [`Artifact`] tagged with the rule and scope that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedArtifact {
	pub rule: RuleId,
	pub scope: ScopeId,
	pub artifact: Artifact,
}

impl GeneratedArtifact {
	/// Tags `artifact`, naming untitled sections after `rule` so every merged
	/// entry carries provenance.
	pub fn new(rule: RuleId, scope: ScopeId, mut artifact: Artifact) -> Self {
		for section in &mut artifact.document.sections {
			if section.header.is_none() {
				section.header = Some(rule.as_str().into());
			}
		}
		Self { rule, scope, artifact }
	}

	pub fn path(&self) -> &UnitPath {
		&self.artifact.path
	}
}
