//! End-to-end tests over the syntect-backed highlighter.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use seatbelt_highlight::{
    ERROR_CLASS, HighlightConfig, Highlighter, Lexer, LexerRegistry, Result, StyleRegistry,
    SyntectLexers, TokenStream, default_formatter, samples,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier, OnceLock};
use std::thread;

/// Wraps the real registry and counts tokenizations.
struct CountingLexers {
    inner: SyntectLexers,
    tokenized: Arc<AtomicUsize>,
    enabled: Arc<AtomicBool>,
}

struct CountingLexer<'a> {
    inner: Box<dyn Lexer + 'a>,
    tokenized: Arc<AtomicUsize>,
}

impl LexerRegistry for CountingLexers {
    fn resolve(&self, language: &str) -> Option<Box<dyn Lexer + '_>> {
        if !self.enabled.load(Ordering::SeqCst) {
            return None;
        }
        let inner = self.inner.resolve(language)?;
        Some(Box::new(CountingLexer { inner, tokenized: Arc::clone(&self.tokenized) }))
    }
}

impl Lexer for CountingLexer<'_> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn tokenise<'s>(&self, source: &'s str) -> Result<TokenStream<'s>> {
        self.tokenized.fetch_add(1, Ordering::SeqCst);
        self.inner.tokenise(source)
    }
}

struct Harness {
    highlighter: Arc<Highlighter>,
    tokenized: Arc<AtomicUsize>,
    enabled: Arc<AtomicBool>,
}

fn harness() -> Harness {
    let tokenized = Arc::new(AtomicUsize::new(0));
    let enabled = Arc::new(AtomicBool::new(true));
    let lexers = CountingLexers {
        inner: SyntectLexers::new(),
        tokenized: Arc::clone(&tokenized),
        enabled: Arc::clone(&enabled),
    };
    let highlighter = Highlighter::new(
        HighlightConfig::default(),
        lexers,
        default_formatter(),
        &StyleRegistry::new(),
    )
    .expect("default highlighter");
    Harness { highlighter: Arc::new(highlighter), tokenized, enabled }
}

fn shared() -> &'static Highlighter {
    static HL: OnceLock<Highlighter> = OnceLock::new();
    HL.get_or_init(|| Highlighter::with_defaults().expect("default highlighter"))
}

#[test]
fn test_go_keyword_is_styled_without_document_wrapper() {
    let html = shared().highlight("go", "package main");
    let html = html.as_str();

    assert!(
        html.contains(r#"<span style="color:#0284c7">package</span>"#),
        "unexpected markup: {html}"
    );
    assert!(!html.contains("<html"));
    assert!(!html.contains("<body"));
    assert!(!html.contains("</body>"));
    assert!(!html.contains("<pre"));
    assert_eq!(html, html.trim());
}

#[test]
fn test_repeat_call_does_not_tokenize() {
    let h = harness();
    let source = "func add(a, b int) int {\n\treturn a + b\n}";

    let first = h.highlighter.highlight("go", source);
    let second = h.highlighter.highlight("go", source);

    assert_eq!(first, second);
    assert_eq!(h.tokenized.load(Ordering::SeqCst), 1);
    let stats = h.highlighter.stats();
    assert_eq!((stats.hits, stats.misses, stats.entries), (1, 1, 1));
}

#[test]
fn test_language_aliases_share_an_entry() {
    let h = harness();
    let source = "<p>{{ .Name }}</p>";

    let a = h.highlighter.highlight("go html template", source);
    let b = h.highlighter.highlight("GoHTML", source);
    let c = h.highlighter.highlight("tmpl", source);

    assert_eq!(a, b);
    assert_eq!(b, c);
    assert_eq!(h.tokenized.load(Ordering::SeqCst), 1);
}

#[test]
fn test_template_actions_differ_from_plain_html() {
    let h = harness();
    let source = "<p>{{ .Name }}</p>";

    let template = h.highlighter.highlight("go html template", source);
    let html = h.highlighter.highlight("html", source);

    assert_ne!(template, html);
    assert_eq!(h.highlighter.stats().entries, 2);
}

#[test]
fn test_template_samples_style_actions() {
    let rendered = samples::render(shared());

    let render = rendered["RenderHTML"].as_str();
    assert!(
        render.contains(r#"<span style="color:#0284c7">.Message</span>"#),
        "unexpected markup: {render}"
    );
    assert!(!render.contains("{{ .Message }}"));

    let session = rendered["SessionHTML"].as_str();
    assert!(session.contains(r#"<span style="color:#0284c7">.Name</span>"#), "{session}");
    assert!(session.contains(r#"<span style="color:#0f172a">csrf</span>"#), "{session}");
}

#[test]
fn test_same_text_different_languages_are_separate() {
    let h = harness();
    let source = "<b>\"x\"</b>";

    let go = h.highlighter.highlight("go", source);
    let html = h.highlighter.highlight("html", source);

    assert_ne!(go, html);
    assert_eq!(h.tokenized.load(Ordering::SeqCst), 2);
    assert_eq!(h.highlighter.stats().entries, 2);
}

#[test]
fn test_entries_are_independent() {
    let h = harness();
    let one = h.highlighter.highlight("go", "var one = 1");
    let _two = h.highlighter.highlight("go", "var two = 2");
    assert_eq!(h.highlighter.highlight("go", "var one = 1"), one);
    assert_eq!(h.tokenized.load(Ordering::SeqCst), 2);
}

#[test]
fn test_unknown_language_does_not_panic() {
    let html = shared().highlight("no-such-grammar", "anything at all");
    assert!(html.as_str().contains(ERROR_CLASS));
    assert!(html.as_str().contains("no-such-grammar"));
}

#[test]
fn test_failed_lookup_is_retried_once_available() {
    let h = harness();
    h.enabled.store(false, Ordering::SeqCst);

    let before = h.highlighter.highlight("go", "package retry");
    assert!(before.as_str().contains(ERROR_CLASS));

    h.enabled.store(true, Ordering::SeqCst);
    let after = h.highlighter.highlight("go", "package retry");
    assert!(!after.as_str().contains(ERROR_CLASS));
    assert!(after.as_str().contains("<span"));
}

#[test]
fn test_inline_is_exact_wrap() {
    let hl = shared();
    let source = "c.Session.Set(\"name\", v)";
    let block = hl.highlight("go", source);
    let inline = hl.highlight_inline("go", source);
    assert_eq!(
        inline.as_str(),
        format!("{}{}{}", hl.inline_open(), block, seatbelt_highlight::INLINE_CLOSE)
    );
}

#[test]
fn test_empty_source() {
    assert_eq!(shared().highlight("go", "").as_str(), "");
}

#[test]
fn test_html_source_is_escaped() {
    let html = shared().highlight("html", "<body><p>hi &amp; bye</p></body>");
    let html = html.as_str();
    assert!(!html.contains("<body"));
    assert!(!html.contains("<p>"));
    assert!(html.contains("&lt;"));
}

#[test]
fn test_concurrent_cold_cache() {
    let h = harness();
    let barrier = Arc::new(Barrier::new(8));
    let source = "package main\n\nfunc main() {\n\tprintln(\"hello\")\n}\n";

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let hl = Arc::clone(&h.highlighter);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                hl.highlight("go", source)
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|t| t.join().unwrap()).collect();
    assert!(results.windows(2).all(|w| w[0] == w[1]));
    assert!(results[0].as_str().contains("<span"));
    assert_eq!(h.tokenized.load(Ordering::SeqCst), 1);
}

#[test]
fn test_buffers_are_always_returned() {
    let h = harness();
    let _ = h.highlighter.highlight("go", "var x = 1");
    let _ = h.highlighter.highlight("unknown", "var x = 1");
    let _ = h.highlighter.highlight("go", "var y = 2");

    let pool = h.highlighter.pool_stats();
    assert_eq!(pool.acquired, pool.released);
    assert_eq!(pool.acquired, 2);
    assert!(pool.reused >= 1);
}

#[test]
fn test_samples_render() {
    let rendered = samples::render(shared());
    assert_eq!(rendered.len(), samples::SAMPLES.len());

    for (name, markup) in &rendered {
        let html = markup.as_str();
        assert!(!html.contains(ERROR_CLASS), "{name} failed: {html}");
        assert!(html.contains("<span"), "{name} has no styled tokens");
        assert!(!html.contains("<html"), "{name} leaked a document wrapper");
    }
    assert!(rendered["RenderHTML"].as_str().contains("&lt;"));
}
