//! `codefence render` command implementation.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use clap::Args;
use codefence_config::{CliSettings, Config};
use codefence_highlight::{
    RemoteSampleFetcher, render_archives, render_code_samples, render_windows,
};

use super::build_renderer;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Documents to render.
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Write each rendered document here instead of stdout.
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Disable the highlight cache.
    #[arg(long)]
    no_cache: bool,

    /// Leave `{% codesample %}`, archive and window tags untouched.
    #[arg(long)]
    no_tags: bool,

    /// Highlighter service URL (overrides config).
    #[arg(long, env = "CODEFENCE_SERVICE_URL")]
    service_url: Option<String>,

    /// Path to configuration file (default: auto-discover codefence.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl RenderArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            service_url: self.service_url.clone(),
            cache_enabled: self.no_cache.then_some(false),
            ..CliSettings::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let mut renderer = build_renderer(&config);
        let fetcher = RemoteSampleFetcher::new(config.highlight_resolved.timeout);

        let destinations = match &self.output_dir {
            Some(dir) => output_paths(dir, &self.files)?,
            None => Vec::new(),
        };

        if let Some(dir) = &self.output_dir {
            std::fs::create_dir_all(dir).map_err(|source| CliError::Write {
                path: dir.clone(),
                source,
            })?;
        }

        for (index, file) in self.files.iter().enumerate() {
            let text = std::fs::read_to_string(file).map_err(|source| CliError::Read {
                path: file.clone(),
                source,
            })?;

            let mut html = renderer.render_document(&text);
            if !self.no_tags {
                html = render_code_samples(&html, &mut renderer, &fetcher);
                html = render_windows(&render_archives(&html));
            }

            match destinations.get(index) {
                Some(dest) => {
                    std::fs::write(dest, &html).map_err(|source| CliError::Write {
                        path: dest.clone(),
                        source,
                    })?;
                    output.info(&format!("{} -> {}", file.display(), dest.display()));
                }
                None => output.document(&html)?,
            }
        }

        let stats = renderer.stats();
        tracing::info!(
            blocks = stats.blocks,
            cache_hits = stats.cache_hits,
            service_calls = stats.service_calls,
            fallbacks = stats.fallbacks,
            "Render finished"
        );

        if stats.fallbacks > 0 {
            output.warning(&format!(
                "{} block(s) rendered without highlighting",
                stats.fallbacks
            ));
        }
        if self.output_dir.is_some() {
            output.success(&format!(
                "Rendered {} code block(s) in {} file(s)",
                stats.blocks,
                self.files.len()
            ));
        }
        Ok(())
    }
}

/// Destination for `file` inside `dir`, keeping the file name.
fn output_path(dir: &Path, file: &Path) -> Result<PathBuf, CliError> {
    let name = file
        .file_name()
        .ok_or_else(|| CliError::Validation(format!("not a file: {}", file.display())))?;
    Ok(dir.join(name))
}

/// Destinations for every input, rejecting inputs that share a file name.
fn output_paths(dir: &Path, files: &[PathBuf]) -> Result<Vec<PathBuf>, CliError> {
    let mut seen: HashMap<PathBuf, &Path> = HashMap::new();
    let mut destinations = Vec::with_capacity(files.len());

    for file in files {
        let dest = output_path(dir, file)?;
        if let Some(previous) = seen.insert(dest.clone(), file) {
            return Err(CliError::Validation(format!(
                "{} and {} would both be written to {}",
                previous.display(),
                file.display(),
                dest.display()
            )));
        }
        destinations.push(dest);
    }

    Ok(destinations)
}
