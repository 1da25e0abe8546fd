use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::AmalgamError;
use crate::AmalgamResult;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] = [
	"amalgam.toml",
	".amalgam.toml",
	".config/amalgam.toml",
];

/// Configuration loaded from an `amalgam.toml` file.
///
/// ```toml
/// api = "ws_ctube_api.h"
/// output = "../ws_ctube.h"
/// source_dir = "src"
/// fragments = [
///   "likely.h",
///   "list.h",
///   "crypt.c",
///   "ws_ctube.c",
/// ]
///
/// [header]
/// guard = "WS_CTUBE_H"
/// linkage = true
///
/// [filter]
/// strip_file_docs = true
/// ```
///
/// The order of `fragments` is the order of the output. A fragment that
/// declares a type must come before the fragments that use it.
#[derive(Debug, Clone, Deserialize)]
pub struct AmalgamConfig {
	/// The public API fragment, emitted first and only banner/doc trimmed.
	pub api: String,
	/// Ordered fragment names, resolved against `source_dir`.
	#[serde(default)]
	pub fragments: Vec<String>,
	/// Destination of the amalgamated header, relative to the project root.
	pub output: PathBuf,
	/// Directory holding the fragments, relative to the project root.
	#[serde(default = "default_source_dir")]
	pub source_dir: PathBuf,
	/// Structure of the generated header.
	#[serde(default)]
	pub header: HeaderConfig,
	/// Fragment filtering switches.
	#[serde(default)]
	pub filter: FilterConfig,
}

/// The `[header]` table.
#[derive(Debug, Clone, Deserialize)]
pub struct HeaderConfig {
	/// Include-guard macro. Derived from the output file name when absent.
	#[serde(default)]
	pub guard: Option<String>,
	/// Wrap the declarations in `extern "C"` for C++ consumers.
	#[serde(default = "default_true")]
	pub linkage: bool,
	/// Text written before the include guard, verbatim.
	#[serde(default)]
	pub prologue: Option<String>,
}

impl Default for HeaderConfig {
	fn default() -> Self {
		Self {
			guard: None,
			linkage: true,
			prologue: None,
		}
	}
}

/// The `[filter]` table.
#[derive(Debug, Clone, Deserialize)]
pub struct FilterConfig {
	/// Remove the first `@file` doc block from every fragment.
	#[serde(default = "default_true")]
	pub strip_file_docs: bool,
}

impl Default for FilterConfig {
	fn default() -> Self {
		Self {
			strip_file_docs: true,
		}
	}
}

fn default_source_dir() -> PathBuf {
	PathBuf::from(".")
}

fn default_true() -> bool {
	true
}

/// The fragment names of one run: the API fragment plus the ordered list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
	pub api: String,
	pub fragments: Vec<String>,
}

impl Manifest {
	/// Build a manifest, rejecting empty fragment names.
	pub fn new(api: impl Into<String>, fragments: Vec<String>) -> AmalgamResult<Self> {
		let api = api.into();
		if api.trim().is_empty() || fragments.iter().any(|name| name.trim().is_empty()) {
			return Err(AmalgamError::EmptyFragmentName);
		}

		Ok(Self { api, fragments })
	}
}

impl AmalgamConfig {
	/// Resolve the config path from known discovery candidates.
	#[must_use]
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if no config file exists.
	pub fn load(root: &Path) -> AmalgamResult<Option<AmalgamConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		let content = std::fs::read_to_string(&config_path)?;
		Self::parse(&content).map(Some)
	}

	/// Parse config file contents.
	pub fn parse(content: &str) -> AmalgamResult<AmalgamConfig> {
		toml::from_str(content).map_err(|e| AmalgamError::ConfigParse(e.to_string()))
	}

	pub fn manifest(&self) -> AmalgamResult<Manifest> {
		Manifest::new(self.api.clone(), self.fragments.clone())
	}

	/// Directory the fragment names are resolved against.
	pub fn source_root(&self, root: &Path) -> PathBuf {
		root.join(&self.source_dir)
	}

	/// Destination of the amalgamation under `root`.
	pub fn output_path(&self, root: &Path) -> PathBuf {
		root.join(&self.output)
	}
}
