//! Token stream → HTML rendering.
//!
//! [`HtmlFormatter`] writes inline-styled `<span>` elements. In standalone
//! mode it wraps them in an `<html>`/`<body>` document;
//! [`strip_document_wrapper`] removes that wrapper again by matching the tags
//! themselves rather than by counting characters, so it keeps working if the
//! body attributes change.

use crate::{Result, Style, TokenStream};

/// Renders a token stream plus a style into markup.
pub trait Formatter: Send + Sync {
    /// Append the rendering of `tokens` to `out`.
    fn format(&self, out: &mut Vec<u8>, style: &Style, tokens: TokenStream<'_>) -> Result<()>;
}

/// HTML formatter with inline `style` attributes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HtmlFormatter {
    standalone: bool,
    prevent_surrounding_pre: bool,
}

impl HtmlFormatter {
    /// Fragment output wrapped in `<pre>`.
    #[must_use]
    pub const fn new() -> Self {
        Self { standalone: false, prevent_surrounding_pre: false }
    }

    /// Emit a complete `<html>` document around the output.
    #[must_use]
    pub const fn standalone(mut self, standalone: bool) -> Self {
        self.standalone = standalone;
        self
    }

    /// Skip the `<pre>` element around the highlighted code.
    #[must_use]
    pub const fn prevent_surrounding_pre(mut self, prevent: bool) -> Self {
        self.prevent_surrounding_pre = prevent;
        self
    }
}

impl Formatter for HtmlFormatter {
    fn format(&self, out: &mut Vec<u8>, style: &Style, tokens: TokenStream<'_>) -> Result<()> {
        let background = style.background().map(crate::StyleEntry::to_css).unwrap_or_default();

        if self.standalone {
            out.extend_from_slice(b"<html>\n");
            push_open_tag(out, "body", &background);
            out.push(b'\n');
        }
        if !self.prevent_surrounding_pre {
            push_open_tag(out, "pre", &background);
        }

        for token in tokens {
            let css = style.get(token.category).to_css();
            let text = html_escape::encode_text(token.text);
            if css.is_empty() {
                out.extend_from_slice(text.as_bytes());
            } else {
                push_open_tag(out, "span", &css);
                out.extend_from_slice(text.as_bytes());
                out.extend_from_slice(b"</span>");
            }
        }

        if !self.prevent_surrounding_pre {
            out.extend_from_slice(b"</pre>");
        }
        if self.standalone {
            out.extend_from_slice(b"\n</body>\n</html>\n");
        }
        Ok(())
    }
}

fn push_open_tag(out: &mut Vec<u8>, tag: &str, css: &str) {
    out.push(b'<');
    out.extend_from_slice(tag.as_bytes());
    if !css.is_empty() {
        out.extend_from_slice(b" style=\"");
        out.extend_from_slice(html_escape::encode_double_quoted_attribute(css).as_bytes());
        out.push(b'"');
    }
    out.push(b'>');
}

/// Return the content between `<body …>` and `</body>` of a standalone
/// document, trimmed. Input without the wrapper is returned trimmed.
#[must_use]
pub fn strip_document_wrapper(document: &str) -> &str {
    let trimmed = document.trim();
    let Some(after_html) = trimmed.strip_prefix("<html>") else {
        return trimmed;
    };
    let after_html = after_html.trim_start();
    let Some(body_tag) = after_html.strip_prefix("<body") else {
        return trimmed;
    };
    // `<body` must end the tag name: `>` or whitespace before attributes
    if !body_tag.starts_with(['>', ' ', '\t', '\n']) {
        return trimmed;
    }
    let Some(tag_end) = body_tag.find('>') else {
        return trimmed;
    };
    let inner = &body_tag[tag_end + 1..];
    let Some(inner) = inner.trim_end().strip_suffix("</html>") else {
        return trimmed;
    };
    let Some(inner) = inner.trim_end().strip_suffix("</body>") else {
        return trimmed;
    };
    inner.trim()
}
