//! Code block rendering and document substitution.
//!
//! [`CodeBlockRenderer`] turns one fenced block into an HTML fragment, and a
//! whole document into a document with every block replaced.

use std::fmt::Write;

use codefence_cache::{Cache, CacheBucket, CacheBucketExt, NullCache};

use crate::key::HighlightKey;
use crate::language::{LanguageAliases, RAW_SUFFIX, RenderVariant};
use crate::options::CodeBlockOptions;
use crate::scanner::FenceScanner;
use crate::service::{Highlighter, extract_highlighted};
use crate::tableize::{escape_angle_brackets, escape_html, tableize};

/// Bucket name used for highlighter responses.
pub const HIGHLIGHT_BUCKET: &str = "highlight";

/// Counters accumulated across render calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Blocks rendered, all variants.
    pub blocks: usize,
    /// Highlighted blocks served from the cache.
    pub cache_hits: usize,
    /// Calls made to the highlighter service.
    pub service_calls: usize,
    /// Highlighted blocks that fell back to plain markup.
    pub fallbacks: usize,
}

/// Renders fenced code blocks to HTML.
///
/// Configuration is fixed at construction: the highlighter, the alias table
/// and the cache bucket are all injected.
///
/// # Example
///
/// ```
/// use codefence_highlight::{CodeBlockRenderer, PygmentizeClient};
/// use std::time::Duration;
///
/// let client = PygmentizeClient::new("http://localhost:5000/", Duration::from_secs(5));
/// let mut renderer = CodeBlockRenderer::new(client);
///
/// // Plain blocks never reach the service.
/// let html = renderer.render_document("```\na < b\n```");
/// assert!(html.contains("a &lt; b"));
/// ```
pub struct CodeBlockRenderer {
    highlighter: Box<dyn Highlighter>,
    aliases: LanguageAliases,
    cache: Box<dyn CacheBucket>,
    stats: RenderStats,
}

impl CodeBlockRenderer {
    /// Create a renderer with the built-in aliases and no cache.
    #[must_use]
    pub fn new(highlighter: impl Highlighter + 'static) -> Self {
        Self {
            highlighter: Box::new(highlighter),
            aliases: LanguageAliases::default(),
            cache: NullCache.bucket(HIGHLIGHT_BUCKET),
            stats: RenderStats::default(),
        }
    }

    /// Replace the language alias table.
    #[must_use]
    pub fn aliases(mut self, aliases: LanguageAliases) -> Self {
        self.aliases = aliases;
        self
    }

    /// Cache highlighter responses in `cache`.
    ///
    /// Entries are keyed by [`HighlightKey`] and written only for
    /// well-formed responses.
    #[must_use]
    pub fn with_cache(mut self, cache: Box<dyn CacheBucket>) -> Self {
        self.cache = cache;
        self
    }

    /// Counters since construction.
    #[must_use]
    pub fn stats(&self) -> RenderStats {
        self.stats
    }

    /// Replace every fenced block in `text` with its rendered fragment.
    ///
    /// Each fragment is prefixed with the indentation of its opening fence.
    /// Text outside the blocks is copied unchanged.
    pub fn render_document(&mut self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;

        for block in FenceScanner::new(text) {
            out.push_str(&text[last..block.span.start]);
            out.push_str(block.indentation);

            let options = CodeBlockOptions::parse(block.options_line);
            out.push_str(&self.render_block(&block.code_body, &options));

            last = block.span.end;
        }

        out.push_str(&text[last..]);
        out
    }

    /// Render one code body.
    pub fn render_block(&mut self, code: &str, options: &CodeBlockOptions) -> String {
        self.stats.blocks += 1;

        let language = self.aliases.normalize(&options.language).to_owned();
        match RenderVariant::for_language(&language) {
            RenderVariant::Plain => {
                let table = tableize(&escape_angle_brackets(code), "");
                figure(options, &table)
            }
            RenderVariant::Raw => raw_block(code, &language, options.rest()),
            RenderVariant::Highlighted => {
                let table = self.highlighted_table(code, &language);
                figure(options, &table)
            }
        }
    }

    /// Highlighted table for `code`, from cache or service, falling back to
    /// escaped code when the service fails.
    fn highlighted_table(&mut self, code: &str, language: &str) -> String {
        let hash = HighlightKey { language, code }.compute_hash();

        if let Some(cached) = self.cache.get_string(&hash) {
            match extract_highlighted(language, &cached) {
                Ok(markup) => {
                    tracing::debug!(language, hash = %hash, "Highlight cache hit");
                    self.stats.cache_hits += 1;
                    return tableize(&markup, language);
                }
                Err(e) => {
                    tracing::warn!(hash = %hash, error = %e, "Ignoring malformed cache entry");
                }
            }
        }

        self.stats.service_calls += 1;
        let result = self.highlighter.highlight(language, code).and_then(|response| {
            let markup = extract_highlighted(language, &response)?;
            Ok((response, markup))
        });

        match result {
            Ok((response, markup)) => {
                self.cache.set_string(&hash, &response);
                tableize(&markup, language)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Highlighting failed, rendering unhighlighted code");
                self.stats.fallbacks += 1;
                tableize(&escape_angle_brackets(code), language)
            }
        }
    }
}

/// `<figure>` wrapper with an optional caption.
fn figure(options: &CodeBlockOptions, table: &str) -> String {
    format!("<figure class='code'>{}{table}</figure>", caption_html(options))
}

/// `<figcaption>` for the block, or an empty string without a caption.
fn caption_html(options: &CodeBlockOptions) -> String {
    let Some(caption) = &options.caption else {
        return String::new();
    };

    let mut html = format!("<figcaption><span>{}</span>", escape_html(caption));
    if let Some(url) = &options.link_url {
        let _ = write!(
            html,
            "<a href='{}'>{}</a>",
            escape_html(url),
            escape_html(&options.link_title)
        );
    }
    html.push_str("</figcaption>");
    html
}

/// Re-emit `code` between back-tick fences. The header keeps the rest of the
/// options line; only the `-raw` suffix of the language goes.
fn raw_block(code: &str, language: &str, rest: &str) -> String {
    let language = language.strip_suffix(RAW_SUFFIX).unwrap_or(language);
    if rest.is_empty() {
        format!("``` {language}\n{code}\n```\n")
    } else {
        format!("``` {language} {rest}\n{code}\n```\n")
    }
}
