//! CLI command implementations.

pub(crate) mod highlight;
pub(crate) mod render;

pub(crate) use highlight::HighlightArgs;
pub(crate) use render::RenderArgs;

use codefence_cache::{Cache, CacheBucket, FileCache, NullCache};
use codefence_config::Config;
use codefence_highlight::{CodeBlockRenderer, HIGHLIGHT_BUCKET, LanguageAliases, PygmentizeClient};

/// Build a renderer from resolved configuration.
pub(crate) fn build_renderer(config: &Config) -> CodeBlockRenderer {
    let highlight = &config.highlight_resolved;
    let client = PygmentizeClient::new(highlight.service_url.clone(), highlight.timeout);
    let aliases = LanguageAliases::default().extend(highlight.aliases.clone());

    let cache: Box<dyn CacheBucket> = if config.cache_resolved.enabled {
        tracing::info!(dir = %config.cache_resolved.dir.display(), "Using highlight cache");
        FileCache::new(config.cache_resolved.dir.clone()).bucket(HIGHLIGHT_BUCKET)
    } else {
        NullCache.bucket(HIGHLIGHT_BUCKET)
    };

    tracing::info!(url = %highlight.service_url, "Using highlighter service");
    CodeBlockRenderer::new(client).aliases(aliases).with_cache(cache)
}
