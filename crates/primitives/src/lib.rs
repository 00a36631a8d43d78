//! Core types for the transformation engine: unit paths, immutable trees,
//! markers, units, forests, structural diffs and per-cycle change sets.

/// Per-cycle change records.
pub mod change;
/// Structural comparison of two unit versions.
pub mod diff;
/// Keyed entry documents used by generated artifacts.
pub mod entries;
/// Path-ordered collection of the latest unit versions.
pub mod forest;
/// Conventional node kinds shared by codecs and rules.
pub mod kinds;
/// Rule-namespaced idempotence markers.
pub mod marker;
/// Slash-separated logical paths.
pub mod path;
/// Module scope identifiers.
pub mod scope;
/// Immutable node trees with stable node ids.
pub mod tree;
/// Path-identified snapshots of parsed artifacts.
pub mod unit;

pub use change::{Change, ChangeSet};
pub use diff::{NodeChange, UnitDiff};
pub use entries::{Entry, EntryDocument, Section};
pub use forest::Forest;
pub use marker::{MarkerKind, MarkerSet, MarkerValue};
pub use path::{PathError, UnitPath};
pub use scope::ScopeId;
pub use tree::{Node, NodeId, NodeSpec, Tree, TreeError};
pub use unit::Unit;
