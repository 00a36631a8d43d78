//! Configuration for recast.
//!
//! Two layers are configured independently:
//!
//! - **Engine**: the `[engine]` table of the project's root `recast.toml`
//!   controls the cycle limit, the execution mode and which file names mark a
//!   module directory.
//! - **Scope options**: every module may carry its own `recast.toml` with
//!   disabled rules, output settings and free-form per-rule tables. Rules
//!   read these through a [`ConfigSource`], keyed by scope.
//!
//! ```toml
//! [engine]
//! cycle_limit = 8
//! execution = "parallel"
//! module_markers = ["recast.toml", "Cargo.toml"]
//!
//! disabled_rules = ["flag-todo"]
//!
//! [output]
//! strategy = "append"
//! config_file = "generated.properties"
//!
//! [rules.rename-key]
//! from = "db.url"
//! to = "datasource.url"
//! ```
//!
//! Unknown keys are ignored so one file can carry both layers.

pub mod engine;
pub mod error;
pub mod options;
pub mod source;

use std::path::Path;

pub use engine::{EngineConfig, Execution};
pub use error::{ConfigError, Result};
pub use options::{ConfigOptions, OutputOptions, OutputStrategy};
pub use source::{ConfigSource, DirConfig, StaticConfig};
pub use toml::{Table, Value};

/// File name of per-scope configuration files.
pub const CONFIG_FILE: &str = "recast.toml";

/// Reads a file into a string, mapping failures to [`ConfigError::Io`].
pub(crate) fn read(path: &Path) -> Result<String> {
	std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
		path: path.to_path_buf(),
		error,
	})
}
