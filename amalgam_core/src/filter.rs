use std::collections::HashSet;

use tracing::debug;
use tracing::warn;

use crate::config::AmalgamConfig;
use crate::trim::strip_file_doc_block;
use crate::trim::strip_leading_block_comment;

const DIRECTIVE_MARKER: char = '#';
const INCLUDE_KEYWORD: &str = "include";
const LINE_COMMENT: &str = "//";

/// One named unit of source text contributed to the amalgamation.
///
/// Lines keep their terminators so that concatenating them reproduces the
/// original text byte for byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
	name: String,
	lines: Vec<String>,
}

impl Fragment {
	pub fn new(name: impl Into<String>, text: &str) -> Self {
		Self {
			name: name.into(),
			lines: text.split_inclusive('\n').map(str::to_string).collect(),
		}
	}

	/// Name used in diagnostics.
	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn lines(&self) -> &[String] {
		&self.lines
	}

	/// The full text of the fragment.
	pub fn text(&self) -> String {
		self.lines.concat()
	}
}

/// Ordered, duplicate-free set of system include targets for one run.
///
/// Iteration order is the order in which each target was first seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SystemIncludeSet {
	ordered: Vec<String>,
	seen: HashSet<String>,
}

impl SystemIncludeSet {
	pub fn new() -> Self {
		Self::default()
	}

	/// Record `target`. Returns `false` when it was already present.
	pub fn insert(&mut self, target: &str) -> bool {
		if self.seen.contains(target) {
			return false;
		}

		self.seen.insert(target.to_string());
		self.ordered.push(target.to_string());
		true
	}

	pub fn contains(&self, target: &str) -> bool {
		self.seen.contains(target)
	}

	pub fn len(&self) -> usize {
		self.ordered.len()
	}

	pub fn is_empty(&self) -> bool {
		self.ordered.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = &str> {
		self.ordered.iter().map(String::as_str)
	}

	/// Render one `#include <...>` line per target, in recorded order.
	pub fn render(&self) -> String {
		self.ordered
			.iter()
			.map(|target| format!("#include <{target}>\n"))
			.collect()
	}
}

/// What a single line of a fragment is, as far as the filter cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
	/// `#include <target>`: hoisted into the [`SystemIncludeSet`].
	SystemInclude(&'a str),
	/// `#include "target"`: dropped, its content is inlined elsewhere.
	LocalInclude(&'a str),
	/// Looks like an include but the delimiter is never closed.
	MalformedDirective,
	/// Anything else.
	Code,
}

/// Classify a line by its leading directive, if any.
///
/// Horizontal whitespace is allowed before and after `#`, and between
/// `include` and the target.
pub fn classify_line(line: &str) -> LineKind<'_> {
	let rest = line.trim_start_matches([' ', '\t']);
	let Some(rest) = rest.strip_prefix(DIRECTIVE_MARKER) else {
		return LineKind::Code;
	};
	let rest = rest.trim_start_matches([' ', '\t']);
	let Some(rest) = rest.strip_prefix(INCLUDE_KEYWORD) else {
		return LineKind::Code;
	};
	let rest = rest.trim_start_matches([' ', '\t']);

	if let Some(target) = rest.strip_prefix('<') {
		return delimited(target, '>').map_or(LineKind::MalformedDirective, LineKind::SystemInclude);
	}

	if let Some(target) = rest.strip_prefix('"') {
		return delimited(target, '"').map_or(LineKind::MalformedDirective, LineKind::LocalInclude);
	}

	LineKind::Code
}

/// The non-empty text before `close`, or `None` when `close` is missing or
/// the target is empty.
fn delimited(text: &str, close: char) -> Option<&str> {
	let line = text.trim_end_matches(['\r', '\n']);
	let end = line.find(close)?;
	let target = &line[..end];

	(!target.is_empty()).then_some(target)
}

/// The `\n` or `\r\n` that ends `line`, or an empty string for the last line
/// of a file without a trailing newline.
fn line_terminator(line: &str) -> &str {
	if line.ends_with("\r\n") {
		"\r\n"
	} else if line.ends_with('\n') {
		"\n"
	} else {
		""
	}
}

/// Cut `line` at its first `//`, keeping the code before the marker and the
/// line terminator.
///
/// This is lexical: a `//` inside a string or character literal is cut too.
pub fn truncate_line_comment(line: &str) -> String {
	match line.find(LINE_COMMENT) {
		Some(index) => {
			let mut truncated = line[..index].to_string();
			truncated.push_str(line_terminator(line));
			truncated
		}
		None => line.to_string(),
	}
}

/// Options for [`filter_fragment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterOptions {
	/// Also remove the first `@file` documentation block of each fragment.
	pub strip_file_docs: bool,
}

impl Default for FilterOptions {
	fn default() -> Self {
		Self {
			strip_file_docs: true,
		}
	}
}

impl FilterOptions {
	/// Construct [`FilterOptions`] from an [`AmalgamConfig`].
	pub fn from_config(config: &AmalgamConfig) -> Self {
		Self {
			strip_file_docs: config.filter.strip_file_docs,
		}
	}
}

/// What remains of a fragment after filtering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilteredBody {
	text: String,
}

impl FilteredBody {
	pub fn as_str(&self) -> &str {
		&self.text
	}

	pub fn into_string(self) -> String {
		self.text
	}

	pub fn is_empty(&self) -> bool {
		self.text.is_empty()
	}
}

/// Filter one fragment.
///
/// System includes are moved into `includes` (first occurrence wins), local
/// includes are dropped, and every other line loses its trailing `//`
/// comment. A block comment at the very start of what remains is then
/// removed as the fragment's banner. Malformed directives are logged and
/// kept verbatim.
pub fn filter_fragment(
	fragment: &Fragment,
	includes: &mut SystemIncludeSet,
	options: FilterOptions,
) -> FilteredBody {
	let mut body = String::new();
	let mut hoisted = 0_usize;

	for (index, line) in fragment.lines().iter().enumerate() {
		match classify_line(line) {
			LineKind::SystemInclude(target) => {
				if includes.insert(target) {
					hoisted += 1;
				}
			}
			LineKind::LocalInclude(_) => {}
			LineKind::MalformedDirective => {
				warn!(
					fragment = fragment.name(),
					line = index + 1,
					text = line.trim_end(),
					"malformed include directive passed through unchanged"
				);
				body.push_str(line);
			}
			LineKind::Code => body.push_str(&truncate_line_comment(line)),
		}
	}

	let stripped = strip_leading_block_comment(&body);
	let mut text = if options.strip_file_docs {
		strip_file_doc_block(stripped).into_owned()
	} else {
		stripped.to_string()
	};

	if !text.is_empty() && !text.ends_with('\n') {
		text.push('\n');
	}

	debug!(
		fragment = fragment.name(),
		lines = fragment.lines().len(),
		new_includes = hoisted,
		"filtered fragment"
	);

	FilteredBody { text }
}
