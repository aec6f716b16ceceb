//! The highlight cache service.
//!
//! [`Highlighter`] owns the cache, the scratch buffer pool and the resolved
//! style, and drives the injected lexer registry and formatter:
//!
//! 1. normalize the language and hash the source into a [`CacheKey`]
//! 2. on a hit, return the stored markup (no tokenization, no formatting)
//! 3. on a miss, resolve the lexer, tokenize, format into a pooled buffer,
//!    strip the standalone document wrapper, store, and return
//!
//! Failures at any stage are returned by [`Highlighter::try_highlight`] and
//! rendered as error markup by [`Highlighter::highlight`]; neither caches them.
//!
//! ```rust
//! use seatbelt_highlight::Highlighter;
//!
//! let hl = Highlighter::with_defaults()?;
//! let html = hl.highlight("go", "package main");
//! assert!(html.as_str().contains(r#"<span style="color:#0284c7">package</span>"#));
//! assert!(!html.as_str().contains("<body"));
//! # Ok::<(), seatbelt_highlight::Error>(())
//! ```

use crate::cache::{CacheKey, CacheStatsSummary, HighlightCache};
use crate::formatter::strip_document_wrapper;
use crate::pool::{BufferPool, BufferPoolStatsSummary};
use crate::{
    Error, Formatter, HighlightConfig, HtmlFormatter, LexerRegistry, Markup, Result,
    SEATBELT_STYLE, Style, StyleRegistry, SyntectLexers, seatbelt_style,
};
use std::sync::Arc;
use tracing::warn;

/// Closing tag of inline highlights.
pub const INLINE_CLOSE: &str = "</code>";

/// Class of the element used to render fail-soft errors.
pub const ERROR_CLASS: &str = "highlight-error";

/// Cached syntax highlighter shared by all request handlers.
pub struct Highlighter {
    config: HighlightConfig,
    lexers: Box<dyn LexerRegistry>,
    formatter: Box<dyn Formatter>,
    style: Arc<Style>,
    cache: HighlightCache,
    pool: BufferPool,
    inline_open: String,
}

impl Highlighter {
    /// Build a highlighter from its collaborators.
    ///
    /// The seatbelt style is registered into `styles` when `config.style`
    /// names it; any other style must already be registered.
    pub fn new<L, F>(
        config: HighlightConfig,
        lexers: L,
        formatter: F,
        styles: &StyleRegistry,
    ) -> Result<Self>
    where
        L: LexerRegistry + 'static,
        F: Formatter + 'static,
    {
        config.validate()?;

        let style = match styles.get(&config.style) {
            Some(style) => style,
            None if config.style == SEATBELT_STYLE => styles.register(seatbelt_style()?),
            None => {
                return Err(Error::Config(format!("style '{}' is not registered", config.style)));
            },
        };

        let pool = BufferPool::new(
            config.pool.max_buffers,
            config.pool.initial_capacity,
            config.pool.max_retained_capacity,
        );
        let inline_open = format!(r#"<code class="{}">"#, config.inline_class);

        Ok(Self {
            config,
            lexers: Box::new(lexers),
            formatter: Box::new(formatter),
            style,
            cache: HighlightCache::new(),
            pool,
            inline_open,
        })
    }

    /// Default wiring: syntect grammars, standalone HTML formatter without
    /// `<pre>`, the seatbelt style, and default configuration.
    pub fn with_defaults() -> Result<Self> {
        Self::with_config(HighlightConfig::default())
    }

    /// Default collaborators with custom configuration.
    pub fn with_config(config: HighlightConfig) -> Result<Self> {
        Self::new(config, SyntectLexers::new(), default_formatter(), &StyleRegistry::new())
    }

    /// Highlight a block of code. Never fails: errors become error markup.
    pub fn highlight(&self, language: &str, source: &str) -> Markup {
        self.try_highlight(language, source).unwrap_or_else(|e| {
            warn!(language, category = e.category(), error = %e, "highlight failed");
            error_markup(&e)
        })
    }

    /// Highlight inline code: [`Self::highlight`] wrapped in a `<code>` element.
    pub fn highlight_inline(&self, language: &str, source: &str) -> Markup {
        let inner = self.highlight(language, source);
        let mut html =
            String::with_capacity(self.inline_open.len() + inner.len() + INLINE_CLOSE.len());
        html.push_str(&self.inline_open);
        html.push_str(inner.as_str());
        html.push_str(INLINE_CLOSE);
        Markup::new(html)
    }

    /// Highlight with the failure kept typed.
    pub fn try_highlight(&self, language: &str, source: &str) -> Result<Markup> {
        let language = self.config.normalize_language(language);
        let key = CacheKey::new(language.as_str(), source);
        self.cache
            .get_or_try_insert_with(&key, || self.render(&language, source))
    }

    /// Opening tag used by [`Self::highlight_inline`].
    pub fn inline_open(&self) -> &str {
        &self.inline_open
    }

    /// Active configuration.
    pub const fn config(&self) -> &HighlightConfig {
        &self.config
    }

    /// The resolved style.
    pub fn style(&self) -> &Style {
        &self.style
    }

    /// Cache counters.
    pub fn stats(&self) -> CacheStatsSummary {
        self.cache.stats()
    }

    /// Buffer pool counters.
    pub fn pool_stats(&self) -> BufferPoolStatsSummary {
        self.pool.stats()
    }

    /// The uncached pipeline: lex, tokenize, format, strip.
    fn render(&self, language: &str, source: &str) -> Result<Markup> {
        let lexer = self
            .lexers
            .resolve(language)
            .ok_or_else(|| Error::UnknownLanguage(language.to_string()))?;
        let tokens = lexer.tokenise(source)?;

        // Returned to the pool when dropped, on every path out of here.
        let mut buf = self.pool.acquire();
        self.formatter.format(&mut buf, &self.style, tokens)?;
        let document = std::str::from_utf8(&buf)
            .map_err(|e| Error::Format(format!("formatter produced invalid UTF-8: {e}")))?;

        Ok(Markup::new(strip_document_wrapper(document).to_string()))
    }
}

/// The formatter configuration the site uses.
pub const fn default_formatter() -> HtmlFormatter {
    HtmlFormatter::new().standalone(true).prevent_surrounding_pre(true)
}

/// Visible, non-fatal rendering of a failed highlight.
pub fn error_markup(error: &Error) -> Markup {
    Markup::new(format!(
        r#"<span class="{ERROR_CLASS}">{}</span>"#,
        html_escape::encode_text(&error.to_string())
    ))
}
