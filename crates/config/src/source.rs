use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use recast_primitives::ScopeId;
use rustc_hash::FxHashMap as HashMap;
use tracing::{debug, warn};

use crate::{CONFIG_FILE, ConfigOptions};

#[cfg(test)]
mod tests;

/// Supplies the options in effect for a scope.
///
/// Implementations are shared across scheduler threads and may be asked for
/// the same scope many times per cycle.
pub trait ConfigSource: Send + Sync {
	fn load(&self, scope: &ScopeId) -> Arc<ConfigOptions>;
}

/// In-memory options: a default plus per-scope overrides.
#[derive(Debug, Clone, Default)]
pub struct StaticConfig {
	default: Arc<ConfigOptions>,
	scopes: BTreeMap<ScopeId, Arc<ConfigOptions>>,
}

impl StaticConfig {
	pub fn new(default: ConfigOptions) -> Self {
		Self {
			default: Arc::new(default),
			scopes: BTreeMap::new(),
		}
	}

	pub fn with_scope(mut self, scope: ScopeId, options: ConfigOptions) -> Self {
		self.scopes.insert(scope, Arc::new(options));
		self
	}
}

impl ConfigSource for StaticConfig {
	fn load(&self, scope: &ScopeId) -> Arc<ConfigOptions> {
		self.scopes.get(scope).unwrap_or(&self.default).clone()
	}
}

/// Reads `<root>/<scope base dir>/recast.toml`, caching the result per scope.
///
/// Missing files yield default options. Unreadable or malformed files are
/// logged and also yield defaults, so one bad module never aborts a run.
#[derive(Debug)]
pub struct DirConfig {
	root: PathBuf,
	file_name: String,
	cache: Mutex<HashMap<ScopeId, Arc<ConfigOptions>>>,
}

impl DirConfig {
	pub fn new(root: impl Into<PathBuf>) -> Self {
		Self {
			root: root.into(),
			file_name: CONFIG_FILE.to_owned(),
			cache: Mutex::new(HashMap::default()),
		}
	}

	pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
		self.file_name = file_name.into();
		self
	}

	pub fn root(&self) -> &Path {
		&self.root
	}

	/// Path of the options file for `scope`.
	pub fn path_for(&self, scope: &ScopeId) -> PathBuf {
		let base = scope.base_dir();
		let dir = if base.is_root() {
			self.root.clone()
		} else {
			self.root.join(base.as_str())
		};
		dir.join(&self.file_name)
	}

	/// Drops cached options so the next lookup rereads the files.
	pub fn invalidate(&self) {
		self.cache.lock().clear();
	}

	fn read(&self, scope: &ScopeId) -> ConfigOptions {
		let path = self.path_for(scope);
		if !path.exists() {
			debug!(%scope, path = %path.display(), "config.missing");
			return ConfigOptions::default();
		}
		match ConfigOptions::load(&path) {
			Ok(options) => options,
			Err(error) => {
				warn!(%scope, path = %path.display(), %error, "config.invalid; using defaults");
				ConfigOptions::default()
			}
		}
	}
}

impl ConfigSource for DirConfig {
	fn load(&self, scope: &ScopeId) -> Arc<ConfigOptions> {
		if let Some(options) = self.cache.lock().get(scope) {
			return options.clone();
		}
		let options = Arc::new(self.read(scope));
		self.cache
			.lock()
			.entry(scope.clone())
			.or_insert(options)
			.clone()
	}
}

impl<T: ConfigSource + ?Sized> ConfigSource for Arc<T> {
	fn load(&self, scope: &ScopeId) -> Arc<ConfigOptions> {
		(**self).load(scope)
	}
}
