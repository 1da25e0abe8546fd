use std::collections::HashMap;
use std::io;
use std::path::Path;
use std::path::PathBuf;

use tracing::debug;

use crate::AmalgamError;
use crate::AmalgamResult;
use crate::assemble::AmalgamationDocument;
use crate::assemble::Layout;
use crate::assemble::assemble;
use crate::config::Manifest;
use crate::filter::Fragment;

/// Supplies fragment contents by name.
pub trait FragmentSource {
	/// Read the named fragment in full. A fragment that cannot be read fails
	/// with [`AmalgamError::FragmentUnreadable`].
	fn read(&self, name: &str) -> AmalgamResult<Fragment>;
}

/// Persists a finished document.
pub trait OutputSink {
	fn write(&mut self, document: &AmalgamationDocument) -> AmalgamResult<()>;
}

/// Reads fragments from files under a base directory.
#[derive(Debug, Clone)]
pub struct DirectorySource {
	root: PathBuf,
}

impl DirectorySource {
	pub fn new(root: impl Into<PathBuf>) -> Self {
		Self { root: root.into() }
	}

	pub fn root(&self) -> &Path {
		&self.root
	}
}

impl FragmentSource for DirectorySource {
	fn read(&self, name: &str) -> AmalgamResult<Fragment> {
		let path = self.root.join(name);
		let text = std::fs::read_to_string(&path).map_err(|source| {
			AmalgamError::FragmentUnreadable {
				name: name.to_string(),
				source,
			}
		})?;

		Ok(Fragment::new(name, &text))
	}
}

/// Fragments held in memory, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
	fragments: HashMap<String, String>,
}

impl MemorySource {
	pub fn new() -> Self {
		Self::default()
	}

	#[must_use]
	pub fn with(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
		self.insert(name, text);
		self
	}

	pub fn insert(&mut self, name: impl Into<String>, text: impl Into<String>) {
		self.fragments.insert(name.into(), text.into());
	}
}

impl FragmentSource for MemorySource {
	fn read(&self, name: &str) -> AmalgamResult<Fragment> {
		self.fragments
			.get(name)
			.map(|text| Fragment::new(name, text))
			.ok_or_else(|| {
				AmalgamError::FragmentUnreadable {
					name: name.to_string(),
					source: io::Error::new(io::ErrorKind::NotFound, "no such fragment"),
				}
			})
	}
}

/// Writes the document to a file, replacing it in one step.
///
/// The text goes to a temporary sibling which is then renamed over the
/// destination, so a failed write never leaves a truncated header behind.
#[derive(Debug, Clone)]
pub struct FileSink {
	path: PathBuf,
}

impl FileSink {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	fn persist(&self, text: &str) -> io::Result<()> {
		if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
			std::fs::create_dir_all(parent)?;
		}

		let file_name = self
			.path
			.file_name()
			.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "output has no file name"))?;
		let mut temp_name = file_name.to_os_string();
		temp_name.push(format!(".tmp-{}", std::process::id()));
		let temp_path = self.path.with_file_name(temp_name);

		std::fs::write(&temp_path, text)?;
		if let Err(error) = std::fs::rename(&temp_path, &self.path) {
			let _ = std::fs::remove_file(&temp_path);
			return Err(error);
		}

		Ok(())
	}
}

impl OutputSink for FileSink {
	fn write(&mut self, document: &AmalgamationDocument) -> AmalgamResult<()> {
		self.persist(document.as_str())
			.map_err(|source| {
				AmalgamError::SinkWriteFailure {
					path: self.path.clone(),
					source,
				}
			})?;

		debug!(path = %self.path.display(), bytes = document.as_str().len(), "wrote amalgamation");
		Ok(())
	}
}

/// Read every fragment named by `manifest` and assemble them in memory.
///
/// Reading stops at the first unreadable fragment.
pub fn build_document(
	source: &impl FragmentSource,
	manifest: &Manifest,
	layout: &Layout,
) -> AmalgamResult<AmalgamationDocument> {
	let api = source.read(&manifest.api)?;
	let fragments = manifest
		.fragments
		.iter()
		.map(|name| source.read(name))
		.collect::<AmalgamResult<Vec<_>>>()?;

	Ok(assemble(&api, &fragments, layout))
}

/// Build the document and hand it to `sink`.
///
/// The sink is invoked exactly once, and only after the whole document has
/// been assembled. Any read failure returns before the sink is touched.
pub fn amalgamate(
	source: &impl FragmentSource,
	sink: &mut impl OutputSink,
	manifest: &Manifest,
	layout: &Layout,
) -> AmalgamResult<AmalgamationDocument> {
	let document = build_document(source, manifest, layout)?;
	sink.write(&document)?;

	Ok(document)
}
