//! Fenced code block scanning.
//!
//! A block opens on a line holding optional indentation, exactly three
//! back-ticks and an optional options string, and closes on the next line
//! whose only content is three back-ticks:
//!
//! ```text
//!     ```ruby Gemfile
//!     gem 'rails'
//!     ```
//! ```
//!
//! [`FenceScanner`] walks a document once and yields every block in order.

use std::borrow::Cow;
use std::ops::Range;
use std::sync::LazyLock;

use regex::{CaptureMatches, Regex};

/// Opening fence, body and closing fence.
///
/// The body group is lazily optional so an empty block closes on the very
/// next line instead of swallowing the following block.
static FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?m)^(?P<indent>[ \t]*)```[ \t]*(?P<options>[^`\r\n][^\r\n]*)?\r?\n",
        r"(?:(?P<code>(?s:.*?))\r?\n)??",
        r"[ \t]*```[ \t]*\r?$",
    ))
    .unwrap()
});

/// Indentation units stripped from uniformly indented bodies, in priority order.
const INDENT_UNITS: [&str; 2] = ["    ", "\t"];

/// One fenced block found in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlockMatch<'t> {
    /// Byte range of the whole block, from the indentation before the
    /// opening fence to the end of the closing fence (line break excluded).
    pub span: Range<usize>,
    /// Whitespace preceding the opening fence.
    pub indentation: &'t str,
    /// Text after the opening fence, trimmed. `None` when blank.
    pub options_line: Option<&'t str>,
    /// Lines between the fences, with a uniform indentation unit removed.
    pub code_body: Cow<'t, str>,
}

/// Lazy, single-pass iterator over the fenced blocks of a document.
///
/// # Example
///
/// ```
/// use codefence_highlight::FenceScanner;
///
/// let doc = "intro\n```sh\nls -la\n```\noutro";
/// let blocks: Vec<_> = FenceScanner::new(doc).collect();
///
/// assert_eq!(blocks.len(), 1);
/// assert_eq!(blocks[0].options_line, Some("sh"));
/// assert_eq!(blocks[0].code_body, "ls -la");
/// assert_eq!(&doc[blocks[0].span.clone()], "```sh\nls -la\n```");
/// ```
pub struct FenceScanner<'t> {
    captures: CaptureMatches<'static, 't>,
}

impl<'t> FenceScanner<'t> {
    /// Start scanning `text`.
    #[must_use]
    pub fn new(text: &'t str) -> Self {
        Self {
            captures: FENCE.captures_iter(text),
        }
    }
}

impl<'t> Iterator for FenceScanner<'t> {
    type Item = CodeBlockMatch<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        let caps = self.captures.next()?;
        let whole = caps.get(0)?;

        let options_line = caps
            .name("options")
            .map(|m| m.as_str().trim())
            .filter(|s| !s.is_empty());
        let body = caps.name("code").map_or("", |m| m.as_str());

        Some(CodeBlockMatch {
            span: whole.range(),
            indentation: caps.name("indent").map_or("", |m| m.as_str()),
            options_line,
            code_body: strip_indent_unit(body),
        })
    }
}

/// Remove one indentation unit from every line when all non-blank lines
/// carry it. Mixed or partial indentation is returned untouched.
fn strip_indent_unit(body: &str) -> Cow<'_, str> {
    let mut content_lines = body.lines().filter(|line| !line.trim().is_empty()).peekable();
    if content_lines.peek().is_none() {
        return Cow::Borrowed(body);
    }

    let Some(unit) = INDENT_UNITS.into_iter().find(|unit| {
        body.lines()
            .filter(|line| !line.trim().is_empty())
            .all(|line| line.starts_with(unit))
    }) else {
        return Cow::Borrowed(body);
    };

    Cow::Owned(
        body.split_inclusive('\n')
            .map(|line| line.strip_prefix(unit).unwrap_or(line))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(text: &str) -> Vec<CodeBlockMatch<'_>> {
        FenceScanner::new(text).collect()
    }

    #[test]
    fn test_no_fences() {
        assert!(scan("just\nsome text\n").is_empty());
    }

    #[test]
    fn test_single_block() {
        let doc = "before\n```ruby Gemfile\ngem 'rails'\ngem 'pg'\n```\nafter\n";
        let blocks = scan(doc);

        assert_eq!(blocks.len(), 1);
        let block = &blocks[0];
        assert_eq!(block.indentation, "");
        assert_eq!(block.options_line, Some("ruby Gemfile"));
        assert_eq!(block.code_body, "gem 'rails'\ngem 'pg'");
        assert_eq!(&doc[block.span.clone()], "```ruby Gemfile\ngem 'rails'\ngem 'pg'\n```");
    }

    #[test]
    fn test_no_options() {
        let blocks = scan("```\nplain text\n```");

        assert_eq!(blocks[0].options_line, None);
        assert_eq!(blocks[0].code_body, "plain text");
    }

    #[test]
    fn test_space_before_options() {
        let blocks = scan("``` ruby \nx\n```");

        assert_eq!(blocks[0].options_line, Some("ruby"));
    }

    #[test]
    fn test_multiple_blocks_in_order() {
        let doc = "```a\none\n```\ntext\n```b\ntwo\n```\n";
        let blocks = scan(doc);

        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].options_line, Some("a"));
        assert_eq!(blocks[1].options_line, Some("b"));
        assert!(blocks[0].span.end <= blocks[1].span.start);
    }

    #[test]
    fn test_closes_at_first_fence_line() {
        let blocks = scan("```a\none\n```\n```b\ntwo\n```");

        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].code_body, "one");
        assert_eq!(blocks[1].code_body, "two");
    }

    #[test]
    fn test_empty_body() {
        let doc = "```\n```\nbetween\n```sh\nls\n```";
        let blocks = scan(doc);

        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].code_body, "");
        assert_eq!(blocks[1].code_body, "ls");
    }

    #[test]
    fn test_indented_fences() {
        let doc = "1. Step\n\n   ```sh\n   make\n   ```\n";
        let blocks = scan(doc);

        assert_eq!(blocks[0].indentation, "   ");
        assert_eq!(&doc[blocks[0].span.clone()], "   ```sh\n   make\n   ```");
    }

    #[test]
    fn test_inline_backticks_are_not_fences() {
        assert!(scan("use ```code``` inline\n").is_empty());
    }

    #[test]
    fn test_four_backticks_do_not_open() {
        assert!(scan("````\ncode\n````").is_empty());
    }

    #[test]
    fn test_unclosed_fence() {
        assert!(scan("```ruby\nputs 1\n").is_empty());
    }

    #[test]
    fn test_closing_fence_with_text_does_not_close() {
        let blocks = scan("```md\n```ruby\ninner\n```");

        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].code_body, "```ruby\ninner");
    }

    #[test]
    fn test_crlf_line_endings() {
        let blocks = scan("```ruby\r\nputs 1\r\nputs 2\r\n```\r\n");

        assert_eq!(blocks[0].options_line, Some("ruby"));
        assert_eq!(blocks[0].code_body, "puts 1\r\nputs 2");
    }

    #[test]
    fn test_strip_four_spaces() {
        let blocks = scan("```ruby\n    def a\n      1\n    end\n```");

        assert_eq!(blocks[0].code_body, "def a\n  1\nend");
    }

    #[test]
    fn test_strip_tab() {
        let blocks = scan("```ruby\n\tdef a\n\t\t1\n\tend\n```");

        assert_eq!(blocks[0].code_body, "def a\n\t1\nend");
    }

    #[test]
    fn test_blank_lines_do_not_block_stripping() {
        let blocks = scan("```ruby\n    a\n\n    b\n```");

        assert_eq!(blocks[0].code_body, "a\n\nb");
    }

    #[test]
    fn test_partial_indentation_untouched() {
        let blocks = scan("```ruby\n    a\nb\n```");

        assert_eq!(blocks[0].code_body, "    a\nb");
        assert!(matches!(blocks[0].code_body, Cow::Borrowed(_)));
    }

    #[test]
    fn test_two_space_indentation_untouched() {
        let blocks = scan("```ruby\n  a\n  b\n```");

        assert_eq!(blocks[0].code_body, "  a\n  b");
    }
}
