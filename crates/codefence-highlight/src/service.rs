//! Highlighter service client.
//!
//! The service is a pygmentize-style HTTP endpoint: it takes a form POST with
//! `lang` and `code` fields and answers with an HTML fragment containing a
//! `<pre>` block of highlighted markup. The response is treated as opaque
//! text beyond locating that block.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use ureq::Agent;

/// Outermost `<pre>` block of a service response.
static PRE_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<pre(?:\s[^>]*)?>(.+)</pre>").unwrap());

/// Trailing spaces before each line break (and at the end).
static TRAILING_SPACES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m) +$").unwrap());

/// Failed highlighter call for one language.
#[derive(Debug, thiserror::Error)]
#[error("highlighting {language}: {kind}")]
pub struct HighlightServiceError {
    pub language: String,
    pub kind: HighlightErrorKind,
}

/// Kind of highlighter failure.
#[derive(Debug, thiserror::Error)]
pub enum HighlightErrorKind {
    /// Transport failure, including timeouts.
    #[error("HTTP error: {0}")]
    Http(String),
    /// Non-success status code.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    /// Response body could not be read.
    #[error("I/O error: {0}")]
    Io(String),
    /// Body lacks a non-empty `<pre>` block.
    #[error("response has no highlighted <pre> block")]
    MissingMarkup,
}

impl HighlightServiceError {
    pub(crate) fn new(language: &str, kind: HighlightErrorKind) -> Self {
        Self {
            language: language.to_owned(),
            kind,
        }
    }
}

/// Source of highlighted markup.
///
/// Implementations return the raw service response; callers validate it
/// with [`extract_highlighted`] before caching.
pub trait Highlighter: Send + Sync {
    /// Highlight `code` as `language`.
    fn highlight(&self, language: &str, code: &str) -> Result<String, HighlightServiceError>;
}

/// Create an HTTP agent with a global per-request timeout.
///
/// Status codes are checked by the caller so error bodies can be logged.
pub fn create_agent(timeout: Duration) -> Agent {
    Agent::config_builder()
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build()
        .into()
}

/// [`Highlighter`] backed by a pygmentize-compatible HTTP service.
pub struct PygmentizeClient {
    url: String,
    agent: Agent,
}

impl PygmentizeClient {
    /// Create a client for `url` with the given request timeout.
    #[must_use]
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            agent: create_agent(timeout),
        }
    }

    /// Service endpoint.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Highlighter for PygmentizeClient {
    fn highlight(&self, language: &str, code: &str) -> Result<String, HighlightServiceError> {
        let response = self
            .agent
            .post(&self.url)
            .send_form([("lang", language), ("code", code)])
            .map_err(|e| HighlightServiceError::new(language, HighlightErrorKind::Http(e.to_string())))?;

        let status = response.status().as_u16();
        let mut body = response.into_body();

        if status >= 400 {
            let error_body = body
                .read_to_string()
                .unwrap_or_else(|_| String::from("(unable to read error body)"));
            return Err(HighlightServiceError::new(
                language,
                HighlightErrorKind::Status {
                    status,
                    body: error_body,
                },
            ));
        }

        body.read_to_string()
            .map_err(|e| HighlightServiceError::new(language, HighlightErrorKind::Io(e.to_string())))
    }
}

/// Pull the highlighted markup out of a service response.
///
/// Returns the content of the outermost `<pre>` block with trailing spaces
/// removed from every line, or [`HighlightErrorKind::MissingMarkup`] when the
/// response (empty ones included) has no such block.
pub fn extract_highlighted(language: &str, response: &str) -> Result<String, HighlightServiceError> {
    let inner = PRE_BLOCK
        .captures(response)
        .and_then(|caps| caps.get(1))
        .ok_or_else(|| HighlightServiceError::new(language, HighlightErrorKind::MissingMarkup))?;

    Ok(TRAILING_SPACES.replace_all(inner.as_str(), "").into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::thread::{self, JoinHandle};

    /// Accept one connection, record the request, then answer with
    /// `response` after `delay`.
    fn serve_once(response: &'static str, delay: Duration) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/", listener.local_addr().unwrap());

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let request = read_request(&stream);
            thread::sleep(delay);
            let _ = stream.write_all(response.as_bytes());
            request
        });

        (url, handle)
    }

    /// Request line, headers and body; chunked bodies are de-chunked.
    fn read_request(stream: &TcpStream) -> String {
        let mut reader = BufReader::new(stream.try_clone().unwrap());
        let mut request = String::new();
        let mut content_length = 0;
        let mut chunked = false;

        loop {
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            let lower = line.to_ascii_lowercase();
            if let Some(len) = lower.strip_prefix("content-length:") {
                content_length = len.trim().parse().unwrap();
            }
            if lower.starts_with("transfer-encoding:") && lower.contains("chunked") {
                chunked = true;
            }
            request.push_str(&line);
            if line == "\r\n" || line.is_empty() {
                break;
            }
        }

        let mut body = Vec::new();
        if chunked {
            loop {
                let mut size = String::new();
                reader.read_line(&mut size).unwrap();
                let size = usize::from_str_radix(size.trim(), 16).unwrap();
                let mut chunk = vec![0; size + 2];
                reader.read_exact(&mut chunk).unwrap();
                if size == 0 {
                    break;
                }
                body.extend_from_slice(&chunk[..size]);
            }
        } else {
            body.resize(content_length, 0);
            reader.read_exact(&mut body).unwrap();
        }

        request.push_str(&String::from_utf8(body).unwrap());
        request
    }

    #[test]
    fn test_extract_pygments_response() {
        let response = concat!(
            r#"<div class="highlight"><pre><span class="k">def</span> <span class="nf">a</span>   "#,
            "\n",
            r#"  <span class="mi">1</span>"#,
            "\n",
            r#"<span class="k">end</span></pre></div>"#,
        );

        let inner = extract_highlighted("ruby", response).unwrap();

        assert_eq!(
            inner,
            "<span class=\"k\">def</span> <span class=\"nf\">a</span>\n  <span class=\"mi\">1</span>\n<span class=\"k\">end</span>"
        );
    }

    #[test]
    fn test_extract_pre_with_attributes() {
        let inner = extract_highlighted("sh", "<pre class=\"x\">ls</pre>").unwrap();
        assert_eq!(inner, "ls");
    }

    #[test]
    fn test_extract_missing_pre() {
        let err = extract_highlighted("ruby", "<html>Application Error</html>").unwrap_err();

        assert!(matches!(err.kind, HighlightErrorKind::MissingMarkup));
        assert_eq!(err.language, "ruby");
    }

    #[test]
    fn test_extract_empty_response() {
        assert!(extract_highlighted("ruby", "").is_err());
        assert!(extract_highlighted("ruby", "<pre></pre>").is_err());
    }

    #[test]
    fn test_extract_ignores_lookalike_tags() {
        assert!(extract_highlighted("ruby", "<preview>x</preview>").is_err());
    }

    #[test]
    fn test_error_display() {
        let err = HighlightServiceError::new(
            "yaml",
            HighlightErrorKind::Status {
                status: 503,
                body: "unavailable".to_owned(),
            },
        );

        assert_eq!(err.to_string(), "highlighting yaml: HTTP 503: unavailable");
    }

    #[test]
    fn test_unreachable_service_is_http_error() {
        // Port 9 (discard) on localhost is not expected to accept HTTP.
        let client = PygmentizeClient::new("http://127.0.0.1:9/", Duration::from_millis(500));

        let err = client.highlight("ruby", "puts 1").unwrap_err();

        assert!(matches!(err.kind, HighlightErrorKind::Http(_)));
    }

    #[test]
    fn test_highlight_posts_form_and_returns_body() {
        let (url, server) = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Length: 21\r\nConnection: close\r\n\r\n<pre>x<b>=</b>1</pre>",
            Duration::ZERO,
        );
        let client = PygmentizeClient::new(url, Duration::from_secs(5));

        let body = client.highlight("ruby", "x=1&y").unwrap();
        let request = server.join().unwrap();

        assert!(request.starts_with("POST / HTTP/1.1\r\n"));
        assert!(request.to_ascii_lowercase().contains("application/x-www-form-urlencoded"));
        assert!(request.ends_with("\r\n\r\nlang=ruby&code=x%3D1%26y"));
        assert_eq!(extract_highlighted("ruby", &body).unwrap(), "x<b>=</b>1");
    }

    #[test]
    fn test_server_error_status() {
        let (url, server) = serve_once(
            "HTTP/1.1 503 Service Unavailable\r\nContent-Length: 11\r\nConnection: close\r\n\r\nunavailable",
            Duration::ZERO,
        );
        let client = PygmentizeClient::new(url, Duration::from_secs(5));

        let err = client.highlight("yaml", "a: 1").unwrap_err();
        server.join().unwrap();

        assert_eq!(err.language, "yaml");
        match err.kind {
            HighlightErrorKind::Status { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "unavailable");
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[test]
    fn test_body_without_pre_is_missing_markup() {
        let (url, server) = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Length: 30\r\nConnection: close\r\n\r\n<html>Application Error</html>",
            Duration::ZERO,
        );
        let client = PygmentizeClient::new(url, Duration::from_secs(5));

        let body = client.highlight("ruby", "puts 1").unwrap();
        server.join().unwrap();
        let err = extract_highlighted("ruby", &body).unwrap_err();

        assert!(matches!(err.kind, HighlightErrorKind::MissingMarkup));
    }

    #[test]
    fn test_slow_service_times_out() {
        let (url, server) = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Length: 12\r\nConnection: close\r\n\r\n<pre>x</pre>",
            Duration::from_secs(2),
        );
        let client = PygmentizeClient::new(url, Duration::from_millis(200));

        let err = client.highlight("ruby", "puts 1").unwrap_err();
        server.join().unwrap();

        assert!(matches!(err.kind, HighlightErrorKind::Http(_)));
    }

    #[test]
    fn test_client_url() {
        let client = PygmentizeClient::new("http://localhost:5000/", Duration::from_secs(1));
        assert_eq!(client.url(), "http://localhost:5000/");
    }
}
