//! Line-numbered table markup.
//!
//! Every rendered block uses the same two-column layout: a gutter of line
//! numbers and the code itself, one `<span class='line'>` per line. Existing
//! stylesheets target these exact class names.

use std::fmt::Write;

/// Escape `<` and `>` only. Plain code keeps quotes and ampersands as typed.
#[must_use]
pub fn escape_angle_brackets(code: &str) -> String {
    code.replace('<', "&lt;").replace('>', "&gt;")
}

/// Escape text for use inside HTML elements and single- or double-quoted
/// attributes.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Wrap `code` in the line-numbered table.
///
/// `code` is inserted as-is: callers escape plain text first and pass
/// highlighter markup through untouched. Lines keep their line endings and
/// an empty string has no lines. The output depends only on the arguments.
///
/// # Example
///
/// ```
/// use codefence_highlight::tableize;
///
/// let html = tableize("a\nb", "ruby");
/// assert!(html.contains("<span class='line-number'>2</span>"));
/// assert!(html.contains("<code class='ruby'><span class='line'>a\n</span><span class='line'>b</span></code>"));
/// ```
#[must_use]
pub fn tableize(code: &str, language: &str) -> String {
    let mut gutter = String::from(
        r#"<div class="highlight"><table><tr><td class="gutter"><pre class="line-numbers">"#,
    );
    let mut lines = String::with_capacity(code.len() + 32);

    for (index, line) in code.split_inclusive('\n').enumerate() {
        let _ = writeln!(gutter, "<span class='line-number'>{}</span>", index + 1);
        let _ = write!(lines, "<span class='line'>{line}</span>");
    }

    let _ = write!(
        gutter,
        "</pre></td><td class='code'><pre><code class='{}'>{lines}</code></pre></td></tr></table></div>",
        escape_html(language)
    );
    gutter
}
