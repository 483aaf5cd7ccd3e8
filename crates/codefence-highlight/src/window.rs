//! Terminal and IRB session windows.
//!
//! Pages show shell and IRB sessions inside a fake desktop window:
//!
//! ```text
//! {% terminal %}
//! $ gem install rails
//! Successfully installed rails-7.1.0
//! {% endterminal %}
//! ```
//!
//! Lines starting with `$` are commands; everything else is output. The
//! gutter shows `$` (terminal) or a numbered IRB prompt for commands.

use std::borrow::Cow;
use std::fmt::Write;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::tableize::{escape_angle_brackets, escape_html};

static TERMINAL_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\{%\s*terminal\s*%\}(?P<body>.*?)\{%\s*endterminal\s*%\}").unwrap()
});

static IRB_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{%\s*irb\s*%\}(?P<body>.*?)\{%\s*endirb\s*%\}").unwrap());

static WINDOW_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?s)\{%\s*window(?:\s+(?P<kind>[^%\s]+))?\s*%\}(?P<body>.*?)\{%\s*endwindow\s*%\}",
    )
    .unwrap()
});

/// Ruby version shown in IRB prompts.
const IRB_VERSION: &str = "2.1.1";

/// Gutter width in characters; longer lines wrap and get extra gutter rows.
const WRAP_WIDTH: usize = 87;

/// Window flavour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowKind {
    /// Shell session, body run through [`promptize`].
    Terminal,
    /// IRB session, body run through [`irbize`].
    Irb,
    /// Any other window; the body is inserted unchanged.
    Custom(String),
}

impl WindowKind {
    /// Kind named by a `{% window name %}` argument. Missing names mean a
    /// terminal window.
    #[must_use]
    pub fn from_name(name: Option<&str>) -> Self {
        match name.map(str::trim).filter(|n| !n.is_empty()) {
            None | Some("terminal") => Self::Terminal,
            Some("irb") => Self::Irb,
            Some(other) => Self::Custom(other.to_owned()),
        }
    }

    /// CSS class of the inner container.
    #[must_use]
    pub fn class(&self) -> &str {
        match self {
            Self::Terminal => "terminal",
            Self::Irb => "irb",
            Self::Custom(name) => name,
        }
    }

    /// Heading shown in the title bar.
    #[must_use]
    pub fn title(&self) -> String {
        match self {
            Self::Irb => "IRB".to_owned(),
            other => capitalize(other.class()),
        }
    }
}

/// Wrap `body` in window chrome, formatting it according to `kind`.
#[must_use]
pub fn render_window(kind: &WindowKind, body: &str) -> String {
    let content: Cow<'_, str> = match kind {
        WindowKind::Terminal => Cow::Owned(promptize(body)),
        WindowKind::Irb => Cow::Owned(irbize(body)),
        WindowKind::Custom(_) => Cow::Borrowed(body),
    };

    format!(
        concat!(
            r#"<div class="window"><nav class="control-window">"#,
            r##"<a href="#finder" class="close" data-rel="close">close</a>"##,
            r##"<a href="#" class="minimize">minimize</a>"##,
            r##"<a href="#" class="deactivate">deactivate</a>"##,
            r#"</nav><h1 class="titleInside">{title}</h1>"#,
            r#"<div class="container"><div class="{class}">{content}</div></div></div>"#,
        ),
        title = escape_html(&kind.title()),
        class = escape_html(kind.class()),
        content = content,
    )
}

/// Replace every terminal, IRB and generic window block in `text`.
///
/// Text outside the blocks is left untouched.
#[must_use]
pub fn render_windows(text: &str) -> String {
    let text = TERMINAL_BLOCK.replace_all(text, |caps: &Captures<'_>| {
        render_window(&WindowKind::Terminal, &caps["body"])
    });
    let text = IRB_BLOCK.replace_all(&text, |caps: &Captures<'_>| {
        render_window(&WindowKind::Irb, &caps["body"])
    });
    let text = WINDOW_BLOCK.replace_all(&text, |caps: &Captures<'_>| {
        let kind = WindowKind::from_name(caps.name("kind").map(|m| m.as_str()));
        render_window(&kind, &caps["body"])
    });
    text.into_owned()
}

/// Format a shell session as a gutter/code table.
#[must_use]
pub fn promptize(session: &str) -> String {
    session_table(session, |_| "$".to_owned())
}

/// Format an IRB session, numbering each command prompt.
#[must_use]
pub fn irbize(session: &str) -> String {
    session_table(session, |n| format!("{IRB_VERSION} :{n:03}&gt;"))
}

/// Shared table layout; `prompt` receives the 1-based command number.
fn session_table(session: &str, prompt: impl Fn(usize) -> String) -> String {
    let mut gutter = String::from(r#"<table><tr><td class="gutter"><pre class="line-numbers">"#);
    let mut code = String::new();
    let mut commands = 0;

    for line in session.trim().lines() {
        let (marker, class, text) = if let Some(command) = line.strip_prefix('$') {
            commands += 1;
            (prompt(commands), "command", command.trim())
        } else {
            ("&nbsp;".to_owned(), "output", line.trim())
        };

        let _ = writeln!(gutter, "<span class='line-number'>{marker}</span>");
        gutter.push_str(&"<br>".repeat(text.chars().count() / WRAP_WIDTH));
        let _ = write!(
            code,
            "<span class='line {class}'>{}</span>",
            escape_angle_brackets(text)
        );
    }

    let _ = write!(
        gutter,
        "</pre></td><td class='code'><pre><code>{code}</code></pre></td></tr></table>"
    );
    gutter
}

/// Upper-case the first character and lower-case the rest.
fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
