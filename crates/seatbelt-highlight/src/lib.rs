//! # seatbelt-highlight
//!
//! Cached syntax highlighting for the seatbelt documentation site.
//!
//! Code snippets in page templates are tokenized, rendered to inline-styled
//! HTML, and cached so every later request for the same snippet is a map read.
//!
//! ## Architecture
//!
//! - **Lexers**: [`LexerRegistry`] resolves a language name to a [`Lexer`];
//!   [`SyntectLexers`] provides the bundled grammars
//! - **Formatting**: [`Formatter`] renders tokens with a [`Style`];
//!   [`HtmlFormatter`] writes `<span style="…">` markup
//! - **Styles**: [`StyleRegistry`] holds named, immutable style tables
//! - **Service**: [`Highlighter`] combines the above with a single-flight
//!   [`HighlightCache`] and a scratch [`BufferPool`]
//! - **Templates**: [`TemplateFuncs`] exposes `highlight` and
//!   `highlightinline` to the page renderer
//!
//! ## Quick Start
//!
//! ```rust
//! use seatbelt_highlight::{Highlighter, TemplateFuncs};
//! use std::sync::Arc;
//!
//! let highlighter = Arc::new(Highlighter::with_defaults()?);
//! let funcs = TemplateFuncs::new(Arc::clone(&highlighter));
//!
//! let inline = funcs.call("highlightinline", "go", "c.Session.Get(\"name\")");
//! assert!(inline.is_some_and(|m| m.as_str().starts_with("<code class=")));
//! # Ok::<(), seatbelt_highlight::Error>(())
//! ```
//!
//! ## Error Handling
//!
//! Template-facing calls never fail: an unknown language or a tokenizer error
//! renders as a `<span class="highlight-error">` carrying the message, and is
//! not cached. [`Highlighter::try_highlight`] returns the typed [`Error`].

/// Insert-only single-flight result cache
pub mod cache;
/// Highlighter settings
pub mod config;
/// Error types and result aliases
pub mod error;
/// Token stream to HTML rendering
pub mod formatter;
/// The highlight cache service
pub mod highlighter;
/// Lexer lookup and syntect-backed tokenization
pub mod lexer;
mod markup;
/// Scratch buffer pool
pub mod pool;
/// Home page code samples
pub mod samples;
/// Style tables and registry
pub mod style;
/// Template function table
pub mod template;
/// Token categories and streams
pub mod token;

// Re-export commonly used types
pub use cache::{CacheKey, CacheStatsSummary, HighlightCache, content_hash};
pub use config::{DEFAULT_INLINE_CLASS, HighlightConfig, PoolConfig};
pub use error::{Error, Result};
pub use formatter::{Formatter, HtmlFormatter, strip_document_wrapper};
pub use highlighter::{ERROR_CLASS, Highlighter, INLINE_CLOSE, default_formatter, error_markup};
pub use lexer::{GO_HTML_TEMPLATE, Lexer, LexerRegistry, SyntectLexers};
pub use markup::Markup;
pub use pool::{BufferPool, BufferPoolStatsSummary, PooledBuffer};
pub use style::{Color, SEATBELT_STYLE, Style, StyleBuilder, StyleEntry, StyleRegistry, seatbelt_style};
pub use template::{HIGHLIGHT_FN, HIGHLIGHT_INLINE_FN, TemplateFn, TemplateFuncs};
pub use token::{Token, TokenCategory, TokenStream};
