//! Options line parsing.
//!
//! The text after an opening fence encodes the language, an optional caption
//! and an optional link:
//!
//! ```text
//! ```ruby Gemfile https://github.com/rails/rails/blob/main/Gemfile rails
//! ```
//!
//! Three shapes are tried in a fixed order and the first that matches wins.
//! The shapes overlap (a line with a link also matches the second shape), so
//! the order is part of the contract.

use std::sync::LazyLock;

use regex::Regex;

/// Language, caption, link and optional link title.
static LANGUAGE_CAPTION_AND_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?P<language>\S+)\s+(?P<caption>.+?)(?P<link>https?://\S+)\s*(?P<title>.+)?")
        .unwrap()
});

/// Language with an optional caption.
static LANGUAGE_AND_CAPTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?P<language>\S+)\s*(?P<caption>.+)?").unwrap());

/// Link text used when a link has no explicit title.
pub const DEFAULT_LINK_TITLE: &str = "link";

/// Which options-line shape produced a [`CodeBlockOptions`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionsShape {
    /// `language caption... https://url [title]`
    LanguageCaptionAndLink,
    /// `language [caption...]`
    LanguageAndCaption,
    /// Nothing matched (absent or blank line). Renders as plain code.
    Empty,
}

/// Parsed descriptor of a fence options line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlockOptions {
    /// First whitespace-delimited token; empty means plain.
    pub language: String,
    /// Caption text, trimmed. `None` when absent or blank.
    pub caption: Option<String>,
    /// Link target, only set by the link shape.
    pub link_url: Option<String>,
    /// Visible link text, [`DEFAULT_LINK_TITLE`] unless given.
    pub link_title: String,
    /// Shape that matched.
    pub shape: OptionsShape,
    /// The options line as written, trimmed.
    pub line: String,
}

impl Default for CodeBlockOptions {
    fn default() -> Self {
        Self {
            language: String::new(),
            caption: None,
            link_url: None,
            link_title: DEFAULT_LINK_TITLE.to_owned(),
            shape: OptionsShape::Empty,
            line: String::new(),
        }
    }
}

impl CodeBlockOptions {
    /// Parse an options line. Never fails: anything unrecognised yields the
    /// empty shape.
    ///
    /// # Example
    ///
    /// ```
    /// use codefence_highlight::CodeBlockOptions;
    ///
    /// let options = CodeBlockOptions::parse(Some("ruby Gemfile"));
    /// assert_eq!(options.language, "ruby");
    /// assert_eq!(options.caption.as_deref(), Some("Gemfile"));
    /// assert!(options.link_url.is_none());
    /// ```
    #[must_use]
    pub fn parse(options_line: Option<&str>) -> Self {
        let line = options_line.unwrap_or_default().trim();

        if let Some(caps) = LANGUAGE_CAPTION_AND_LINK.captures(line) {
            return Self {
                language: caps["language"].to_owned(),
                caption: non_blank(caps.name("caption").map(|m| m.as_str())),
                link_url: Some(caps["link"].to_owned()),
                link_title: non_blank(caps.name("title").map(|m| m.as_str()))
                    .unwrap_or_else(|| DEFAULT_LINK_TITLE.to_owned()),
                shape: OptionsShape::LanguageCaptionAndLink,
                line: line.to_owned(),
            };
        }

        if let Some(caps) = LANGUAGE_AND_CAPTION.captures(line) {
            return Self {
                language: caps["language"].to_owned(),
                caption: non_blank(caps.name("caption").map(|m| m.as_str())),
                shape: OptionsShape::LanguageAndCaption,
                line: line.to_owned(),
                ..Self::default()
            };
        }

        Self::default()
    }

    /// Text after the language token, or `""` when there is none.
    #[must_use]
    pub fn rest(&self) -> &str {
        self.line
            .split_once(char::is_whitespace)
            .map_or("", |(_, rest)| rest.trim_start())
    }
}

fn non_blank(text: Option<&str>) -> Option<String> {
    text.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}
