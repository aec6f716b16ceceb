//! Token categories and the token stream handed from lexers to formatters.
//!
//! Categories form a shallow hierarchy (`LiteralStringDoc` → `LiteralString`
//! → `Literal` → `Text`). Styles only need entries for the categories they
//! care about; lookups fall back along [`TokenCategory::parent`].

use std::fmt;

/// Semantic category of a lexed token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[allow(missing_docs)]
pub enum TokenCategory {
    Text,
    Whitespace,
    Error,

    Keyword,
    KeywordConstant,
    KeywordDeclaration,
    KeywordPseudo,
    KeywordType,

    Name,
    NameAttribute,
    NameBuiltin,
    NameClass,
    NameConstant,
    NameDecorator,
    NameEntity,
    NameException,
    NameFunction,
    NameLabel,
    NameNamespace,
    NameTag,
    NameVariable,

    Literal,
    LiteralString,
    LiteralStringDoc,
    LiteralStringEscape,
    LiteralStringInterpol,
    LiteralStringOther,
    LiteralStringRegex,
    LiteralStringSymbol,
    LiteralNumber,

    Operator,
    OperatorWord,
    Punctuation,

    Comment,
    CommentPreproc,

    Generic,
    GenericDeleted,
    GenericEmph,
    GenericError,
    GenericHeading,
    GenericInserted,
    GenericOutput,
    GenericPrompt,
    GenericStrong,
    GenericSubheading,
    GenericTraceback,
}

impl TokenCategory {
    /// The next more general category, or `None` for [`TokenCategory::Text`].
    #[must_use]
    pub const fn parent(self) -> Option<Self> {
        use TokenCategory as C;
        Some(match self {
            C::Text => return None,
            C::Whitespace | C::Error | C::Keyword | C::Name | C::Literal | C::Operator
            | C::Punctuation | C::Comment | C::Generic => C::Text,
            C::KeywordConstant | C::KeywordDeclaration | C::KeywordPseudo | C::KeywordType => {
                C::Keyword
            },
            C::NameAttribute
            | C::NameBuiltin
            | C::NameClass
            | C::NameConstant
            | C::NameDecorator
            | C::NameEntity
            | C::NameException
            | C::NameFunction
            | C::NameLabel
            | C::NameNamespace
            | C::NameTag
            | C::NameVariable => C::Name,
            C::LiteralString | C::LiteralNumber => C::Literal,
            C::LiteralStringDoc
            | C::LiteralStringEscape
            | C::LiteralStringInterpol
            | C::LiteralStringOther
            | C::LiteralStringRegex
            | C::LiteralStringSymbol => C::LiteralString,
            C::OperatorWord => C::Operator,
            C::CommentPreproc => C::Comment,
            C::GenericDeleted
            | C::GenericEmph
            | C::GenericError
            | C::GenericHeading
            | C::GenericInserted
            | C::GenericOutput
            | C::GenericPrompt
            | C::GenericStrong
            | C::GenericSubheading
            | C::GenericTraceback => C::Generic,
        })
    }

    /// Iterate from this category up to [`TokenCategory::Text`], inclusive.
    pub fn ancestors(self) -> impl Iterator<Item = Self> {
        std::iter::successors(Some(self), |c| c.parent())
    }
}

impl fmt::Display for TokenCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A categorized slice of the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'s> {
    /// Semantic category
    pub category: TokenCategory,
    /// Text borrowed from the source
    pub text: &'s str,
}

impl<'s> Token<'s> {
    /// Create a token.
    #[must_use]
    pub const fn new(category: TokenCategory, text: &'s str) -> Self {
        Self { category, text }
    }
}

/// Sequence of tokens produced by a [`Lexer`](crate::Lexer).
///
/// Lexers may parse up front and only borrow the token text lazily; a
/// stream being returned means tokenising has already succeeded.
pub type TokenStream<'s> = Box<dyn Iterator<Item = Token<'s>> + 's>;
