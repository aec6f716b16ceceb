//! Error types for the highlighting pipeline.
//!
//! Every stage of a highlight (lexer lookup, tokenization, formatting) reports
//! failures through [`Error`]. The public template-facing operations never
//! surface these errors directly: [`Highlighter::highlight`] renders them as
//! visible error markup instead so a single bad snippet cannot abort a page
//! render. Callers that want the typed error use
//! [`Highlighter::try_highlight`].
//!
//! ## Error Categories
//!
//! - **Unknown language**: no lexer is registered for the requested name
//! - **Tokenize**: the source is not valid for the claimed grammar
//! - **Format**: the formatter failed to render the token stream
//! - **Style**: a style entry could not be parsed
//! - **Configuration**: invalid settings or unreadable config files
//!
//! ```rust
//! use seatbelt_highlight::Error;
//!
//! let err = Error::UnknownLanguage("cobol".to_string());
//! assert_eq!(err.category(), "unknown_language");
//! assert!(err.is_recoverable());
//! ```
//!
//! [`Highlighter::highlight`]: crate::Highlighter::highlight
//! [`Highlighter::try_highlight`]: crate::Highlighter::try_highlight

use thiserror::Error;

/// The main error type for seatbelt-highlight operations.
#[derive(Error, Debug)]
pub enum Error {
    /// No lexer could be resolved for the requested language.
    ///
    /// ## Recoverability
    ///
    /// Recoverable: a grammar registered later makes the same call succeed,
    /// which is why failed highlights are never cached.
    #[error("Unknown language: {0}")]
    UnknownLanguage(String),

    /// The tokenizer rejected the source.
    ///
    /// Carries the tokenizer's own message verbatim; it becomes the visible
    /// output of a fail-soft highlight.
    #[error("Tokenize error: {0}")]
    Tokenize(String),

    /// The formatter failed while rendering a token stream.
    #[error("Format error: {0}")]
    Format(String),

    /// A style entry could not be parsed.
    ///
    /// ## Common Causes
    ///
    /// - Colors that are not `#rgb` or `#rrggbb`
    /// - Unknown attribute words (anything other than `bold`, `italic`,
    ///   `underline`, their `no` forms, or `bg:<color>`)
    #[error("Style error: {0}")]
    Style(String),

    /// Configuration is invalid or inaccessible.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl Error {
    /// Check if retrying the same operation later might succeed.
    ///
    /// Returns `true` for unknown languages (the grammar may be registered
    /// afterwards) and for interrupted or timed-out I/O. Tokenize and format
    /// failures are deterministic for a given input and are not recoverable.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::UnknownLanguage(_) => true,
            Self::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut | std::io::ErrorKind::Interrupted
            ),
            _ => false,
        }
    }

    /// Get the error category as a static identifier for structured logging.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::UnknownLanguage(_) => "unknown_language",
            Self::Tokenize(_) => "tokenize",
            Self::Format(_) => "format",
            Self::Style(_) => "style",
            Self::Config(_) => "config",
            Self::Io(_) => "io",
            Self::Serialization(_) => "serialization",
        }
    }
}

/// Convenience type alias for `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
