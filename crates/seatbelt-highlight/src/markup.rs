//! Rendered HTML handed back to templates.

use std::fmt;

/// Trusted HTML produced by the highlighter, ready to embed in a template
/// without further escaping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Markup(String);

impl Markup {
    /// Wrap an already-safe HTML string.
    #[must_use]
    pub const fn new(html: String) -> Self {
        Self(html)
    }

    /// Borrow the HTML.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Take the HTML.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }

    /// Byte length of the HTML.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True for empty markup (e.g. an empty snippet).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Markup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Markup {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for Markup {
    fn from(html: String) -> Self {
        Self(html)
    }
}

impl From<Markup> for String {
    fn from(markup: Markup) -> Self {
        markup.0
    }
}
