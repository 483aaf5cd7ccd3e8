//! `codefence highlight` command implementation.

use std::path::PathBuf;

use clap::Args;
use codefence_config::{CliSettings, Config};
use codefence_highlight::CodeBlockOptions;

use super::build_renderer;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the highlight command.
#[derive(Args)]
pub(crate) struct HighlightArgs {
    /// Options line as written after an opening fence, e.g.
    /// `ruby Gemfile https://example.com/Gemfile`.
    #[arg(short, long)]
    lang: String,

    /// File holding the code body (default: stdin).
    file: Option<PathBuf>,

    /// Disable the highlight cache.
    #[arg(long)]
    no_cache: bool,

    /// Highlighter service URL (overrides config).
    #[arg(long, env = "CODEFENCE_SERVICE_URL")]
    service_url: Option<String>,

    /// Path to configuration file (default: auto-discover codefence.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl HighlightArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            service_url: self.service_url.clone(),
            cache_enabled: self.no_cache.then_some(false),
            ..CliSettings::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        let input = match &self.file {
            Some(path) => std::fs::read_to_string(path).map_err(|source| CliError::Read {
                path: path.clone(),
                source,
            })?,
            None => std::io::read_to_string(std::io::stdin())?,
        };

        let options = CodeBlockOptions::parse(Some(&self.lang));
        let mut renderer = build_renderer(&config);
        let html = renderer.render_block(code_body(&input), &options);

        output.document(&html)?;
        output.document("\n")?;
        Ok(())
    }
}

/// Code body of `input`: a fenced body never ends with its last newline.
fn code_body(input: &str) -> &str {
    input
        .strip_suffix("\r\n")
        .or_else(|| input.strip_suffix('\n'))
        .unwrap_or(input)
}
