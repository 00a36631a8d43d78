use std::fmt;

use recast_primitives::UnitPath;

use crate::rule::RuleId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
	Info,
	Warning,
	Error,
}

/// Non-fatal problem classes collected during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DiagnosticKind {
	/// A source could not be parsed and was excluded.
	Parse,
	/// A rule flagged a position for manual review instead of rewriting it.
	AmbiguousPattern,
	/// Two generated artifacts disagreed on a key's value; the first won.
	MergeConflict,
	/// A rule invocation failed; the unit kept its previous version.
	RuleFailure,
	/// A generated artifact targeted a unit that cannot hold entries.
	MergeRejected,
}

impl DiagnosticKind {
	pub fn label(self) -> &'static str {
		match self {
			Self::Parse => "parse",
			Self::AmbiguousPattern => "ambiguous-pattern",
			Self::MergeConflict => "merge-conflict",
			Self::RuleFailure => "rule-failure",
			Self::MergeRejected => "merge-rejected",
		}
	}

	pub fn severity(self) -> Severity {
		match self {
			Self::AmbiguousPattern => Severity::Info,
			Self::MergeConflict | Self::MergeRejected => Severity::Warning,
			Self::Parse | Self::RuleFailure => Severity::Error,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Diagnostic {
	pub severity: Severity,
	pub kind: DiagnosticKind,
	pub path: UnitPath,
	/// Rule the problem is attributed to, when there is one.
	pub rule: Option<RuleId>,
	pub message: String,
}

impl Diagnostic {
	pub fn new(kind: DiagnosticKind, path: UnitPath, message: impl Into<String>) -> Self {
		Self {
			severity: kind.severity(),
			kind,
			path,
			rule: None,
			message: message.into(),
		}
	}

	pub fn with_rule(mut self, rule: RuleId) -> Self {
		self.rule = Some(rule);
		self
	}
}

impl fmt::Display for Diagnostic {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}: {}", self.kind.label(), self.path)?;
		if let Some(rule) = &self.rule {
			write!(f, " [{rule}]")?;
		}
		write!(f, ": {}", self.message)
	}
}
