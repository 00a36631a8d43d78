use std::fmt;
use std::sync::Arc;

use recast_primitives::UnitPath;
use rustc_hash::FxHashMap as HashMap;

use crate::{Codec, LineCodec, PropertiesCodec, ReportCodec};

/// Codec lookup by file extension with a fallback for everything else.
#[derive(Clone)]
pub struct CodecRegistry {
	by_extension: HashMap<Box<str>, Arc<dyn Codec>>,
	fallback: Arc<dyn Codec>,
}

impl CodecRegistry {
	/// Empty registry that parses every path with `fallback`.
	pub fn new(fallback: impl Codec + 'static) -> Self {
		Self {
			by_extension: HashMap::default(),
			fallback: Arc::new(fallback),
		}
	}

	/// `.properties` and `.md` codecs over the line fallback.
	pub fn standard() -> Self {
		Self::new(LineCodec)
			.with("properties", PropertiesCodec)
			.with("md", ReportCodec)
	}

	pub fn with(mut self, extension: &str, codec: impl Codec + 'static) -> Self {
		self.register(extension, codec);
		self
	}

	/// Registers `codec` for `extension`, replacing any previous registration.
	pub fn register(&mut self, extension: &str, codec: impl Codec + 'static) {
		self.by_extension.insert(extension.into(), Arc::new(codec));
	}

	pub fn for_path(&self, path: &UnitPath) -> &dyn Codec {
		match path.extension().and_then(|ext| self.by_extension.get(ext)) {
			Some(codec) => codec.as_ref(),
			None => self.fallback.as_ref(),
		}
	}
}

impl Default for CodecRegistry {
	fn default() -> Self {
		Self::standard()
	}
}

impl fmt::Debug for CodecRegistry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut extensions: Vec<_> = self.by_extension.iter().map(|(ext, codec)| (ext, codec.name())).collect();
		extensions.sort();
		f.debug_struct("CodecRegistry")
			.field("by_extension", &extensions)
			.field("fallback", &self.fallback.name())
			.finish()
	}
}
