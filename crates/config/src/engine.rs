use std::path::Path;

use serde::Deserialize;

use crate::{ConfigError, Result};


/// How the scheduler runs per-unit work within a phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Execution {
	/// Fan out over the rayon pool.
	#[default]
	Parallel,
	/// Stay on the calling thread; output is identical.
	Sequential,
}

/// The `[engine]` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
	/// Maximum number of cycles before a run is declared non-convergent.
	pub cycle_limit: usize,
	pub execution: Execution,
	/// File names whose presence makes a directory a module.
	pub module_markers: Vec<String>,
}

impl Default for EngineConfig {
	fn default() -> Self {
		Self {
			cycle_limit: 8,
			execution: Execution::Parallel,
			module_markers: ["recast.toml", "Cargo.toml", "build.gradle", "pom.xml", "package.json"]
				.map(String::from)
				.to_vec(),
		}
	}
}

#[derive(Deserialize)]
struct EngineFile {
	#[serde(default)]
	engine: EngineConfig,
}

impl EngineConfig {
	/// Parses the `[engine]` table of a TOML document; other tables are ignored.
	pub fn parse(input: &str) -> Result<Self> {
		let file: EngineFile = toml::from_str(input)?;
		file.engine.validate()
	}

	pub fn load(path: impl AsRef<Path>) -> Result<Self> {
		Self::parse(&crate::read(path.as_ref())?)
	}

	pub fn with_cycle_limit(mut self, cycle_limit: usize) -> Self {
		self.cycle_limit = cycle_limit;
		self
	}

	pub fn with_execution(mut self, execution: Execution) -> Self {
		self.execution = execution;
		self
	}

	pub fn with_module_markers<I, S>(mut self, markers: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.module_markers = markers.into_iter().map(Into::into).collect();
		self
	}

	pub fn is_parallel(&self) -> bool {
		self.execution == Execution::Parallel
	}

	fn validate(self) -> Result<Self> {
		if self.cycle_limit == 0 {
			return Err(ConfigError::Invalid {
				field: "engine.cycle_limit",
				message: "must be at least 1".to_owned(),
			});
		}
		Ok(self)
	}
}
