//! End-to-end document rendering against a file-backed cache.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use codefence_cache::{Cache, FileCache};
use codefence_highlight::{
    CodeBlockRenderer, HIGHLIGHT_BUCKET, HighlightServiceError, Highlighter, render_windows,
};
use pretty_assertions::assert_eq;

/// Wraps the code in a pygments-style `<pre>` and counts calls.
#[derive(Clone, Default)]
struct EchoHighlighter {
    calls: Arc<AtomicUsize>,
}

impl Highlighter for EchoHighlighter {
    fn highlight(&self, language: &str, code: &str) -> Result<String, HighlightServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!(
            "<div class=\"highlight\"><pre><span class=\"{language}\">{code}</span>  </pre></div>"
        ))
    }
}

const POST: &str = "\
Install the gem:

```ruby Gemfile https://rubygems.org Source
gem 'rails'
```

Then run:

    ```sh
    bundle install
    ```

{% terminal %}
$ bundle exec rake
{% endterminal %}
";

#[test]
fn test_cache_survives_renderer_instances() {
    let dir = tempfile::tempdir().unwrap();
    let echo = EchoHighlighter::default();

    let first = {
        let cache = FileCache::new(dir.path());
        let mut renderer =
            CodeBlockRenderer::new(echo.clone()).with_cache(cache.bucket(HIGHLIGHT_BUCKET));
        let html = renderer.render_document(POST);
        assert_eq!(renderer.stats().service_calls, 2);
        html
    };

    let cache = FileCache::new(dir.path());
    let mut renderer =
        CodeBlockRenderer::new(echo.clone()).with_cache(cache.bucket(HIGHLIGHT_BUCKET));
    let second = renderer.render_document(POST);

    assert_eq!(first, second);
    assert_eq!(renderer.stats().cache_hits, 2);
    assert_eq!(renderer.stats().service_calls, 0);
    assert_eq!(echo.calls.load(Ordering::SeqCst), 2);
    assert!(dir.path().join(HIGHLIGHT_BUCKET).is_dir());
}

#[test]
fn test_full_page() {
    let mut renderer = CodeBlockRenderer::new(EchoHighlighter::default());

    let html = render_windows(&renderer.render_document(POST));

    assert!(html.starts_with("Install the gem:\n\n<figure class='code'><figcaption>"));
    assert!(html.contains(
        "<figcaption><span>Gemfile</span><a href='https://rubygems.org'>Source</a></figcaption>"
    ));
    assert!(html.contains("<span class='line'><span class=\"ruby\">gem 'rails'</span></span>"));
    assert!(html.contains("Then run:\n\n    <figure class='code'>"));
    assert!(html.contains("<code class='sh'>"));
    assert!(html.contains("<span class='line command'>bundle exec rake</span>"));
    assert!(!html.contains("```"));
    assert!(!html.contains("{%"));
}
