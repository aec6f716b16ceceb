//! Style tables and the process-wide style registry.
//!
//! A [`Style`] maps [`TokenCategory`] to display attributes. Entries are
//! written in the compact `"bold italic #0284c7 bg:#ffffff"` form and parsed
//! once when the style is built; lookups after that are plain map reads.
//!
//! ```rust
//! use seatbelt_highlight::{StyleRegistry, TokenCategory, seatbelt_style};
//!
//! let registry = StyleRegistry::new();
//! let style = registry.register(seatbelt_style()?);
//! let keyword = style.get(TokenCategory::KeywordType);
//! assert_eq!(keyword.color.map(|c| c.to_string()).as_deref(), Some("#0284c7"));
//! # Ok::<(), seatbelt_highlight::Error>(())
//! ```

use crate::{Error, Result, TokenCategory};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info};

/// Name the seatbelt documentation style is registered under.
pub const SEATBELT_STYLE: &str = "seatbelt";

/// 24-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
}

impl Color {
    /// Parse `#rgb` or `#rrggbb`.
    pub fn parse(s: &str) -> Result<Self> {
        let hex = s
            .strip_prefix('#')
            .ok_or_else(|| Error::Style(format!("color must start with '#': {s}")))?;
        let channel = |digits: &str| {
            u8::from_str_radix(digits, 16)
                .map_err(|_| Error::Style(format!("invalid hex color: {s}")))
        };
        match hex.len() {
            3 if hex.is_ascii() => {
                let expand = |i: usize| channel(hex[i..=i].repeat(2).as_str());
                Ok(Self { r: expand(0)?, g: expand(1)?, b: expand(2)? })
            },
            6 if hex.is_ascii() => Ok(Self {
                r: channel(&hex[0..2])?,
                g: channel(&hex[2..4])?,
                b: channel(&hex[4..6])?,
            }),
            _ => Err(Error::Style(format!("invalid hex color: {s}"))),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Display attributes for one token category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StyleEntry {
    /// Foreground color
    pub color: Option<Color>,
    /// Background color
    pub background: Option<Color>,
    /// Bold weight
    pub bold: bool,
    /// Italic
    pub italic: bool,
    /// Underline
    pub underline: bool,
}

impl StyleEntry {
    /// Parse an entry such as `"italic #616e87"` or `"bold bg:#ffffff"`.
    pub fn parse(spec: &str) -> Result<Self> {
        let mut entry = Self::default();
        for word in spec.split_whitespace() {
            match word {
                "bold" => entry.bold = true,
                "nobold" => entry.bold = false,
                "italic" => entry.italic = true,
                "noitalic" => entry.italic = false,
                "underline" => entry.underline = true,
                "nounderline" => entry.underline = false,
                w if w.starts_with("bg:") => entry.background = Some(Color::parse(&w[3..])?),
                w if w.starts_with('#') => entry.color = Some(Color::parse(w)?),
                w => return Err(Error::Style(format!("unknown style attribute '{w}' in '{spec}'"))),
            }
        }
        Ok(entry)
    }

    /// True when the entry carries no attributes at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Render as an inline CSS declaration list, e.g. `color:#0284c7;font-weight:bold`.
    #[must_use]
    pub fn to_css(&self) -> String {
        let mut decls = Vec::with_capacity(5);
        if let Some(color) = self.color {
            decls.push(format!("color:{color}"));
        }
        if let Some(bg) = self.background {
            decls.push(format!("background-color:{bg}"));
        }
        if self.bold {
            decls.push("font-weight:bold".to_string());
        }
        if self.italic {
            decls.push("font-style:italic".to_string());
        }
        if self.underline {
            decls.push("text-decoration:underline".to_string());
        }
        decls.join(";")
    }
}

/// Immutable, named mapping from token category to display attributes.
#[derive(Debug, Clone)]
pub struct Style {
    name: String,
    entries: HashMap<TokenCategory, StyleEntry>,
    background: Option<StyleEntry>,
}

impl Style {
    /// Start building a style.
    pub fn builder(name: impl Into<String>) -> StyleBuilder {
        StyleBuilder { name: name.into(), entries: Vec::new(), background: None }
    }

    /// Registered name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attributes for `category`, inherited from the nearest ancestor that has
    /// an entry. Categories with no styled ancestor get the empty entry.
    #[must_use]
    pub fn get(&self, category: TokenCategory) -> StyleEntry {
        category
            .ancestors()
            .find_map(|c| self.entries.get(&c).copied())
            .unwrap_or_default()
    }

    /// Document-level attributes (page background), if any.
    #[must_use]
    pub const fn background(&self) -> Option<&StyleEntry> {
        self.background.as_ref()
    }
}

/// Builder collecting unparsed entries for a [`Style`].
#[derive(Debug, Clone)]
pub struct StyleBuilder {
    name: String,
    entries: Vec<(TokenCategory, String)>,
    background: Option<String>,
}

impl StyleBuilder {
    /// Add an entry. Later entries for the same category replace earlier ones.
    #[must_use]
    pub fn entry(mut self, category: TokenCategory, spec: impl Into<String>) -> Self {
        self.entries.push((category, spec.into()));
        self
    }

    /// Set the document background entry.
    #[must_use]
    pub fn background(mut self, spec: impl Into<String>) -> Self {
        self.background = Some(spec.into());
        self
    }

    /// Parse every entry and produce the style.
    pub fn build(self) -> Result<Style> {
        let mut entries = HashMap::with_capacity(self.entries.len());
        for (category, spec) in &self.entries {
            let entry = StyleEntry::parse(spec)
                .map_err(|e| Error::Style(format!("{} ({category}): {e}", self.name)))?;
            entries.insert(*category, entry);
        }
        let background = self.background.as_deref().map(StyleEntry::parse).transpose()?;
        Ok(Style { name: self.name, entries, background })
    }
}

/// Registry of named styles shared by every highlighter in the process.
///
/// Registration is first-wins: registering a name that already exists
/// returns the existing handle and drops the new table.
#[derive(Debug, Default)]
pub struct StyleRegistry {
    styles: RwLock<HashMap<String, Arc<Style>>>,
}

impl StyleRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `style` under its name, or return the existing registration.
    pub fn register(&self, style: Style) -> Arc<Style> {
        let mut styles = self.styles.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = styles.get(style.name()) {
            debug!(style = style.name(), "style already registered");
            return Arc::clone(existing);
        }
        info!(style = style.name(), entries = style.entries.len(), "registered style");
        let style = Arc::new(style);
        styles.insert(style.name().to_string(), Arc::clone(&style));
        style
    }

    /// Look up a registered style.
    pub fn get(&self, name: &str) -> Option<Arc<Style>> {
        self.styles
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }
}

/// The seatbelt documentation palette.
pub fn seatbelt_style() -> Result<Style> {
    use TokenCategory as C;

    const BLACK: &str = "#0f172a";
    const BLUE: &str = "#0284c7";
    const PINK: &str = "#ec4899";
    const RED: &str = "#bf616a";
    const ORANGE: &str = "#d08770";
    const SLATE: &str = "#616e87";
    const YELLOW: &str = "#ebcb8b";

    Style::builder(SEATBELT_STYLE)
        .entry(C::Error, RED)
        .entry(C::Keyword, BLUE)
        .entry(C::KeywordPseudo, BLUE)
        .entry(C::KeywordType, BLUE)
        .entry(C::Name, BLACK)
        .entry(C::NameAttribute, BLUE)
        .entry(C::NameBuiltin, BLACK)
        .entry(C::NameClass, BLUE)
        .entry(C::NameConstant, BLUE)
        .entry(C::NameDecorator, ORANGE)
        .entry(C::NameEntity, ORANGE)
        .entry(C::NameException, RED)
        .entry(C::NameFunction, BLUE)
        .entry(C::NameLabel, BLUE)
        .entry(C::NameNamespace, BLUE)
        .entry(C::NameTag, BLACK)
        .entry(C::NameVariable, BLACK)
        .entry(C::LiteralString, PINK)
        .entry(C::LiteralStringDoc, SLATE)
        .entry(C::LiteralStringEscape, YELLOW)
        .entry(C::LiteralStringInterpol, PINK)
        .entry(C::LiteralStringOther, PINK)
        .entry(C::LiteralStringRegex, YELLOW)
        .entry(C::LiteralStringSymbol, PINK)
        .entry(C::LiteralNumber, PINK)
        .entry(C::Operator, BLACK)
        .entry(C::OperatorWord, BLACK)
        .entry(C::Punctuation, BLACK)
        .entry(C::Comment, format!("italic {SLATE}"))
        .entry(C::CommentPreproc, BLACK)
        .entry(C::GenericDeleted, RED)
        .entry(C::GenericEmph, "italic")
        .entry(C::GenericError, RED)
        .entry(C::GenericHeading, format!("bold {BLUE}"))
        .entry(C::GenericInserted, PINK)
        .entry(C::GenericOutput, BLACK)
        .entry(C::GenericPrompt, "bold #4c566a")
        .entry(C::GenericStrong, "bold")
        .entry(C::GenericSubheading, format!("bold {BLUE}"))
        .entry(C::GenericTraceback, RED)
        .entry(C::Whitespace, BLACK)
        .build()
}
