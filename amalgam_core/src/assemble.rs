use std::path::Path;

use tracing::info;

use crate::AmalgamError;
use crate::AmalgamResult;
use crate::config::AmalgamConfig;
use crate::filter::FilterOptions;
use crate::filter::Fragment;
use crate::filter::SystemIncludeSet;
use crate::filter::filter_fragment;
use crate::trim::trim_api;

/// Banner written when no prologue is configured.
pub const DEFAULT_PROLOGUE: &str = "/*\n * This file was generated by amalgam. Do not edit it \
                                    directly: edit the source fragments\n * and regenerate \
                                    it instead.\n */\n";

/// Guard used when the output path has no usable file name.
pub const FALLBACK_GUARD: &str = "AMALGAMATION_H";

const LINKAGE_OPEN: &str = "#ifdef __cplusplus\nextern \"C\" {\n#endif /* __cplusplus */\n";
const LINKAGE_CLOSE: &str = "#ifdef __cplusplus\n} /* extern \"C\" */\n#endif /* __cplusplus */\n";

/// Derive an include-guard macro from a file name: `ws_ctube.h` becomes
/// `WS_CTUBE_H`.
pub fn guard_from_file_name(path: &Path) -> String {
	let Some(file_name) = path.file_name().map(|name| name.to_string_lossy()) else {
		return FALLBACK_GUARD.to_string();
	};

	let mut guard: String = file_name
		.chars()
		.map(|c| {
			if c.is_ascii_alphanumeric() {
				c.to_ascii_uppercase()
			} else {
				'_'
			}
		})
		.collect();

	if guard.starts_with(|c: char| c.is_ascii_digit()) {
		guard.insert(0, '_');
	}

	if guard.is_empty() {
		FALLBACK_GUARD.to_string()
	} else {
		guard
	}
}

fn is_identifier(name: &str) -> bool {
	let mut chars = name.chars();
	chars
		.next()
		.is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
		&& chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Structure of the generated document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
	guard: String,
	linkage: bool,
	prologue: String,
	filter: FilterOptions,
}

impl Layout {
	/// A layout with the given guard, `extern "C"` wrapping and the default
	/// prologue.
	pub fn new(guard: impl Into<String>) -> AmalgamResult<Self> {
		let guard = guard.into();
		if !is_identifier(&guard) {
			return Err(AmalgamError::InvalidGuard(guard));
		}

		Ok(Self {
			guard,
			linkage: true,
			prologue: DEFAULT_PROLOGUE.to_string(),
			filter: FilterOptions::default(),
		})
	}

	/// Construct a [`Layout`] from an [`AmalgamConfig`].
	pub fn from_config(config: &AmalgamConfig) -> AmalgamResult<Self> {
		let guard = config
			.header
			.guard
			.clone()
			.unwrap_or_else(|| guard_from_file_name(&config.output));

		let mut layout = Self::new(guard)?
			.with_linkage(config.header.linkage)
			.with_filter(FilterOptions::from_config(config));
		if let Some(prologue) = &config.header.prologue {
			layout = layout.with_prologue(prologue.clone());
		}

		Ok(layout)
	}

	#[must_use]
	pub fn with_linkage(mut self, linkage: bool) -> Self {
		self.linkage = linkage;
		self
	}

	/// Replace the prologue. An empty prologue omits it entirely.
	#[must_use]
	pub fn with_prologue(mut self, prologue: impl Into<String>) -> Self {
		self.prologue = prologue.into();
		self
	}

	#[must_use]
	pub fn with_filter(mut self, filter: FilterOptions) -> Self {
		self.filter = filter;
		self
	}

	pub fn guard(&self) -> &str {
		&self.guard
	}

	pub fn linkage(&self) -> bool {
		self.linkage
	}

	pub fn prologue(&self) -> &str {
		&self.prologue
	}

	pub fn filter(&self) -> FilterOptions {
		self.filter
	}
}

/// The single merged header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmalgamationDocument {
	text: String,
	system_includes: Vec<String>,
	fragment_count: usize,
}

impl AmalgamationDocument {
	pub fn as_str(&self) -> &str {
		&self.text
	}

	pub fn into_string(self) -> String {
		self.text
	}

	/// Hoisted system include targets, in emitted order.
	pub fn system_includes(&self) -> &[String] {
		&self.system_includes
	}

	/// Number of fragments filtered into the body, the API fragment excluded.
	pub fn fragment_count(&self) -> usize {
		self.fragment_count
	}
}

fn push_terminated(document: &mut String, text: &str) {
	document.push_str(text);
	if !text.is_empty() && !text.ends_with('\n') {
		document.push('\n');
	}
}

/// Assemble the amalgamation from the API fragment and the ordered fragment
/// list.
///
/// Fragments are filtered strictly in the order given. The include set lives
/// only for this call, so repeated calls with the same input produce the same
/// bytes.
pub fn assemble(api: &Fragment, fragments: &[Fragment], layout: &Layout) -> AmalgamationDocument {
	let api_block = trim_api(&api.text());

	let mut includes = SystemIncludeSet::new();
	let mut bodies = String::new();
	for fragment in fragments {
		let body = filter_fragment(fragment, &mut includes, layout.filter());
		bodies.push_str(body.as_str());
	}

	let guard = layout.guard();
	let mut text = String::new();

	if !layout.prologue().is_empty() {
		push_terminated(&mut text, layout.prologue());
		text.push('\n');
	}

	text.push_str(&format!("#ifndef {guard}\n#define {guard}\n"));
	if layout.linkage() {
		text.push_str(LINKAGE_OPEN);
	}
	text.push('\n');

	push_terminated(&mut text, &api_block);
	text.push_str(&includes.render());
	text.push_str(&bodies);

	if layout.linkage() {
		text.push('\n');
		text.push_str(LINKAGE_CLOSE);
	}
	text.push_str(&format!("\n#endif /* {guard} */\n"));

	info!(
		fragments = fragments.len(),
		system_includes = includes.len(),
		bytes = text.len(),
		"assembled amalgamation"
	);

	AmalgamationDocument {
		text,
		system_includes: includes.iter().map(str::to_string).collect(),
		fragment_count: fragments.len(),
	}
}
