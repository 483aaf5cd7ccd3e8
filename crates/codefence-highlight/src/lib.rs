//! Back-tick code block rendering.
//!
//! This crate turns fenced code blocks in page text into highlighted HTML:
//! - [`FenceScanner`] finds ```` ``` ```` blocks and their options lines
//! - [`CodeBlockOptions`] parses the language, caption and link
//! - [`CodeBlockRenderer`] renders plain, raw and highlighted variants,
//!   calling a [`Highlighter`] service and caching its responses
//! - [`render_code_samples`] renders files fetched from a repository
//! - [`render_archives`] and [`render_windows`] expand download boxes and
//!   terminal or IRB session blocks
//!
//! # Architecture
//!
//! - [`scanner`]: fence recognition and indentation stripping
//! - [`options`]: options line parsing
//! - [`language`]: alias normalisation and variant selection
//! - [`service`]: pygmentize HTTP client and response extraction
//! - [`key`]: cache key hashing
//! - [`tableize`]: line-numbered table markup
//! - [`renderer`]: block and document rendering
//! - [`codesample`]: repository code samples
//! - [`archive`]: archive download boxes
//! - [`window`]: terminal and IRB windows
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//!
//! use codefence_highlight::{CodeBlockRenderer, PygmentizeClient};
//!
//! let client = PygmentizeClient::new("http://127.0.0.1:9/", Duration::from_secs(1));
//! let mut renderer = CodeBlockRenderer::new(client);
//!
//! // Blocks without a language never reach the service.
//! let html = renderer.render_document("```\nmake\n```");
//! assert!(html.starts_with("<figure class='code'>"));
//! ```

pub mod archive;
pub mod codesample;
pub mod key;
pub mod language;
pub mod options;
pub mod renderer;
pub mod scanner;
pub mod service;
pub mod tableize;
pub mod window;

pub use archive::{Archive, render_archive, render_archives};
pub use codesample::{
    CodeSample, CodeSampleError, RAW_GITHUB_URL, RemoteSampleFetcher, SampleFetcher,
    render_code_samples,
};
pub use key::HighlightKey;
pub use language::{LanguageAliases, RAW_SUFFIX, RenderVariant};
pub use options::{CodeBlockOptions, DEFAULT_LINK_TITLE, OptionsShape};
pub use renderer::{CodeBlockRenderer, HIGHLIGHT_BUCKET, RenderStats};
pub use scanner::{CodeBlockMatch, FenceScanner};
pub use service::{
    HighlightErrorKind, HighlightServiceError, Highlighter, PygmentizeClient, create_agent,
    extract_highlighted,
};
pub use tableize::{escape_angle_brackets, escape_html, tableize};
pub use window::{WindowKind, irbize, promptize, render_window, render_windows};
