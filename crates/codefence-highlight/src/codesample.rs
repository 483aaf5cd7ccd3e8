//! Code samples pulled from a repository at a fixed commit.
//!
//! ```text
//! {% codesample github burtlo@eventmanager 7851:event_manager.rb %}
//! {% codesample gist 3788048 572b3865:readme.md %}
//! {% codesample file ../eventmanager 7851:lib/event_manager.rb %}
//! ```
//!
//! The fetched file is rendered like a fenced block whose language is the
//! file extension, so samples share the highlight cache with fences. A
//! sample that cannot be fetched renders as an empty block.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::LazyLock;
use std::time::Duration;

use regex::{Captures, Regex};
use ureq::Agent;

use crate::options::CodeBlockOptions;
use crate::renderer::CodeBlockRenderer;
use crate::service::create_agent;

static CODESAMPLE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{%\s*codesample\s+(?P<markup>[^%]*?)\s*%\}").unwrap());

static GITHUB_SAMPLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"github (?P<user>[^@\s]+)@(?P<repo>[^\s+]+) (?P<commit>[a-fA-F0-9]+):(?P<file>[^\s+]+)")
        .unwrap()
});

static FILEPATH_SAMPLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"file (?P<path>[^\s+]+) (?P<commit>[a-fA-F0-9]+):(?P<file>[^\s+]+)").unwrap()
});

static GIST_SAMPLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"gist (?P<gist>[^\s+]+) (?P<commit>[a-fA-F0-9]+):(?P<file>[^\s+]+)").unwrap()
});

/// Host serving raw repository and gist files.
pub const RAW_GITHUB_URL: &str = "https://raw.github.com";

/// Language for sample files without an extension.
const EXTENSIONLESS_LANGUAGE: &str = "ru";

/// Where a sample's code comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeSample {
    /// File in a GitHub repository.
    Github {
        user: String,
        repo: String,
        commit: String,
        file: String,
    },
    /// File in a gist.
    Gist {
        gist: String,
        commit: String,
        file: String,
    },
    /// File in a local git checkout.
    Filepath {
        path: PathBuf,
        commit: String,
        file: String,
    },
    /// Markup no sampler recognised.
    Unknown(String),
}

impl CodeSample {
    /// Recognise tag markup. GitHub wins over a local path, which wins over
    /// a gist; anything else is [`CodeSample::Unknown`].
    #[must_use]
    pub fn parse(markup: &str) -> Self {
        if let Some(caps) = GITHUB_SAMPLE.captures(markup) {
            return Self::Github {
                user: caps["user"].to_owned(),
                repo: caps["repo"].to_owned(),
                commit: caps["commit"].to_owned(),
                file: caps["file"].to_owned(),
            };
        }
        if let Some(caps) = FILEPATH_SAMPLE.captures(markup) {
            return Self::Filepath {
                path: PathBuf::from(&caps["path"]),
                commit: caps["commit"].to_owned(),
                file: caps["file"].to_owned(),
            };
        }
        if let Some(caps) = GIST_SAMPLE.captures(markup) {
            return Self::Gist {
                gist: caps["gist"].to_owned(),
                commit: caps["commit"].to_owned(),
                file: caps["file"].to_owned(),
            };
        }
        Self::Unknown(markup.trim().to_owned())
    }

    /// Language used to render the sample: the file extension, `ru` for
    /// files without one, and plain for unknown samples.
    #[must_use]
    pub fn language(&self) -> &str {
        match self {
            Self::Github { file, .. } | Self::Gist { file, .. } | Self::Filepath { file, .. } => {
                Path::new(file)
                    .extension()
                    .and_then(OsStr::to_str)
                    .unwrap_or(EXTENSIONLESS_LANGUAGE)
            }
            Self::Unknown(_) => "",
        }
    }

    /// Raw file URL under `base` for remote samples.
    #[must_use]
    pub fn url(&self, base: &str) -> Option<String> {
        let base = base.trim_end_matches('/');
        match self {
            Self::Github {
                user,
                repo,
                commit,
                file,
            } => Some(format!("{base}/{user}/{repo}/{commit}/{file}")),
            Self::Gist { gist, commit, file } => Some(format!("{base}/gist/{gist}/{commit}/{file}")),
            Self::Filepath { .. } | Self::Unknown(_) => None,
        }
    }
}

/// Failed sample fetch.
#[derive(Debug, thiserror::Error)]
pub enum CodeSampleError {
    #[error("fetching {url}: {message}")]
    Http { url: String, message: String },

    #[error("fetching {url}: HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("git show {revision} in {}: {message}", path.display())]
    Git {
        path: PathBuf,
        revision: String,
        message: String,
    },

    #[error("unrecognised code sample: {0}")]
    Unknown(String),
}

/// Source of sample code.
pub trait SampleFetcher: Send + Sync {
    /// Contents of the sampled file.
    fn fetch(&self, sample: &CodeSample) -> Result<String, CodeSampleError>;
}

/// [`SampleFetcher`] reading remote samples over HTTP and local ones with
/// `git show`.
pub struct RemoteSampleFetcher {
    agent: Agent,
    base_url: String,
}

impl RemoteSampleFetcher {
    /// Fetcher for [`RAW_GITHUB_URL`] with the given request timeout.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            agent: create_agent(timeout),
            base_url: RAW_GITHUB_URL.to_owned(),
        }
    }

    /// Serve remote samples from `base_url` instead.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn get(&self, url: String) -> Result<String, CodeSampleError> {
        let response = self.agent.get(&url).call().map_err(|e| CodeSampleError::Http {
            url: url.clone(),
            message: e.to_string(),
        })?;

        let status = response.status().as_u16();
        if status >= 400 {
            return Err(CodeSampleError::Status { url, status });
        }

        response
            .into_body()
            .read_to_string()
            .map_err(|e| CodeSampleError::Http {
                url,
                message: e.to_string(),
            })
    }
}

impl SampleFetcher for RemoteSampleFetcher {
    fn fetch(&self, sample: &CodeSample) -> Result<String, CodeSampleError> {
        match sample {
            CodeSample::Filepath { path, commit, file } => git_show(path, &format!("{commit}:{file}")),
            CodeSample::Unknown(markup) => Err(CodeSampleError::Unknown(markup.clone())),
            remote => match remote.url(&self.base_url) {
                Some(url) => self.get(url),
                None => Err(CodeSampleError::Unknown(format!("{remote:?}"))),
            },
        }
    }
}

/// `git show <revision>` run inside `path`.
fn git_show(path: &Path, revision: &str) -> Result<String, CodeSampleError> {
    let git_error = |message: String| CodeSampleError::Git {
        path: path.to_path_buf(),
        revision: revision.to_owned(),
        message,
    };

    let output = Command::new("git")
        .arg("show")
        .arg(revision)
        .current_dir(path)
        .output()
        .map_err(|e| git_error(e.to_string()))?;

    if !output.status.success() {
        return Err(git_error(String::from_utf8_lossy(&output.stderr).trim().to_owned()));
    }
    String::from_utf8(output.stdout).map_err(|e| git_error(e.to_string()))
}

/// Replace every `{% codesample %}` tag in `text` with a rendered block.
///
/// Fetch failures are logged and render an empty block.
pub fn render_code_samples(
    text: &str,
    renderer: &mut CodeBlockRenderer,
    fetcher: &dyn SampleFetcher,
) -> String {
    CODESAMPLE_TAG
        .replace_all(text, |caps: &Captures<'_>| {
            let sample = CodeSample::parse(&caps["markup"]);
            let code = fetcher.fetch(&sample).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Code sample unavailable, rendering empty block");
                String::new()
            });

            let code = code.strip_suffix('\n').unwrap_or(&code);
            let options = CodeBlockOptions::parse(Some(sample.language()));
            renderer.render_block(code, &options)
        })
        .into_owned()
}
