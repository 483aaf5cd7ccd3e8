//! Download boxes for tagged repository archives.
//!
//! ```text
//! {% archive burtlo@eventmanager iteration-alpha Source Code for Iteration 0 %}
//! All the source code up to this point.
//! {% endarchive %}
//! ```

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::tableize::escape_html;

static ARCHIVE_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?s)\{%\s*archive\s+(?P<markup>[^%]*?)\s*%\}(?P<body>.*?)\{%\s*endarchive\s*%?\}",
    )
    .unwrap()
});

static ARCHIVE_MARKUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<user>[^@]+)@(?P<repo>[^\s+]+) (?P<tag>[^\s+]+) (?P<title>.+)$").unwrap()
});

/// Tagged snapshot of a GitHub repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Archive {
    pub user: String,
    pub repo: String,
    pub tag: String,
    pub title: String,
}

impl Archive {
    /// Parse `user@repo tag title...`.
    #[must_use]
    pub fn parse(markup: &str) -> Option<Self> {
        let caps = ARCHIVE_MARKUP.captures(markup.trim())?;
        Some(Self {
            user: caps["user"].to_owned(),
            repo: caps["repo"].to_owned(),
            tag: caps["tag"].to_owned(),
            title: caps["title"].to_owned(),
        })
    }

    /// Zipball download URL for the tag.
    #[must_use]
    pub fn url(&self) -> String {
        format!(
            "https://github.com/{}/{}/zipball/{}",
            self.user, self.repo, self.tag
        )
    }
}

/// Download box linking to `archive`, with `description` inserted as-is.
#[must_use]
pub fn render_archive(archive: &Archive, description: &str) -> String {
    format!(
        concat!(
            "<div class='download'><img src='/images/download_tag.png'/>",
            "<div class='title'><a href='{url}'>{title}</a></div>",
            "<div class='description'>{description}</div></div>",
        ),
        url = escape_html(&archive.url()),
        title = escape_html(&archive.title),
        description = description.trim(),
    )
}

/// Replace every archive block in `text`. Blocks whose markup does not parse
/// are left untouched.
#[must_use]
pub fn render_archives(text: &str) -> String {
    ARCHIVE_BLOCK
        .replace_all(text, |caps: &Captures<'_>| {
            let markup = &caps["markup"];
            match Archive::parse(markup) {
                Some(archive) => render_archive(&archive, &caps["body"]),
                None => {
                    tracing::warn!(markup, "Unrecognised archive markup");
                    caps[0].to_owned()
                }
            }
        })
        .into_owned()
}
