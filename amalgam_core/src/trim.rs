use std::borrow::Cow;

use tracing::debug;

const BLOCK_OPEN: &str = "/*";
const BLOCK_CLOSE: &str = "*/";
const DOC_OPEN: &str = "/**";

/// Marker that tags a documentation block as file-level front matter.
pub const FILE_TAG: &str = "@file";

/// Byte span of a single `/* ... */` comment, closing marker included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CommentSpan {
	start: usize,
	end: usize,
}

impl CommentSpan {
	fn is_doc(self, content: &str) -> bool {
		// `/**/` is an empty plain comment, not a doc block.
		content[self.start..].starts_with(DOC_OPEN) && self.end - self.start > DOC_OPEN.len() + 1
	}

	fn body(self, content: &str) -> &str {
		let inner_start = (self.start + BLOCK_OPEN.len()).min(self.end - BLOCK_CLOSE.len());
		&content[inner_start..self.end - BLOCK_CLOSE.len()]
	}
}

/// Iterate over the block comments of `content` in order of appearance.
///
/// Scanning is purely lexical: comment markers inside string literals or
/// after a `//` are treated like any other marker. A comment that is never
/// closed ends the iteration.
fn block_comments(content: &str) -> impl Iterator<Item = CommentSpan> + '_ {
	let mut search_from = 0;

	std::iter::from_fn(move || {
		let open = search_from + content.get(search_from..)?.find(BLOCK_OPEN)?;
		let after_open = open + BLOCK_OPEN.len();
		let close = after_open + content[after_open..].find(BLOCK_CLOSE)?;
		let end = close + BLOCK_CLOSE.len();
		search_from = end;

		Some(CommentSpan { start: open, end })
	})
}

/// Remove the block comment that opens `content`, along with the line break
/// that ends its closing line.
///
/// The comment must start at the first byte: a comment preceded by code,
/// blank lines or indentation is not a banner. When `content` does not start
/// with a closed block comment it is returned unchanged.
pub fn strip_leading_block_comment(content: &str) -> &str {
	if !content.starts_with(BLOCK_OPEN) {
		return content;
	}

	let Some(span) = block_comments(content).next() else {
		return content;
	};

	debug!(bytes = span.end, "stripped leading block comment");
	skip_line_break(&content[span.end..])
}

/// Drop trailing spaces and tabs plus one `\n` or `\r\n` from the start of
/// `rest`. Text that does not begin with such a line ending is left as is.
fn skip_line_break(rest: &str) -> &str {
	let after_blanks = rest.trim_start_matches([' ', '\t']);
	after_blanks
		.strip_prefix("\r\n")
		.or_else(|| after_blanks.strip_prefix('\n'))
		.unwrap_or(rest)
}

/// Remove the first `/** ... */` block whose body contains [`FILE_TAG`].
///
/// The line break directly after the closing marker goes with the block so no
/// blank line is left in its place. Absent such a block this is a no-op.
pub fn strip_file_doc_block(content: &str) -> Cow<'_, str> {
	let Some(span) = block_comments(content)
		.find(|span| span.is_doc(content) && span.body(content).contains(FILE_TAG))
	else {
		return Cow::Borrowed(content);
	};

	let rest = skip_line_break(&content[span.end..]);

	debug!(offset = span.start, "stripped file documentation block");
	let mut trimmed = String::with_capacity(span.start + rest.len());
	trimmed.push_str(&content[..span.start]);
	trimmed.push_str(rest);

	Cow::Owned(trimmed)
}

/// Prepare the API fragment for the amalgamation: drop its license banner,
/// then its file-level documentation block.
pub fn trim_api(text: &str) -> String {
	let text = strip_leading_block_comment(text);
	strip_file_doc_block(text).into_owned()
}
