//! Lexer lookup and the syntect-backed tokenizer.
//!
//! [`LexerRegistry`] resolves a language name to a [`Lexer`]; a lexer turns
//! source text into a [`TokenStream`]. [`SyntectLexers`] is the production
//! registry built on syntect's bundled Sublime grammars, mapping TextMate
//! scopes onto [`TokenCategory`].

use crate::{Error, Result, Token, TokenCategory, TokenStream};
use std::ops::Range;
use syntect::easy::ScopeRangeIterator;
use syntect::parsing::{ParseState, ScopeStack, SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;
use tracing::debug;

/// A tokenizer for one grammar.
pub trait Lexer: Send + Sync {
    /// Grammar name, for logging.
    fn name(&self) -> &str;

    /// Tokenize `source`. Fails when the source is not valid for the grammar.
    fn tokenise<'s>(&self, source: &'s str) -> Result<TokenStream<'s>>;
}

/// Maps language names to lexers.
pub trait LexerRegistry: Send + Sync {
    /// Resolve `language`, or `None` when no grammar matches.
    ///
    /// Implementations must not substitute a plain-text lexer for an unknown
    /// name; the caller treats `None` as an error.
    fn resolve(&self, language: &str) -> Option<Box<dyn Lexer + '_>>;
}

/// TextMate scope prefixes mapped to categories, most specific first.
const SCOPE_CATEGORIES: &[(&str, TokenCategory)] = &[
    ("invalid", TokenCategory::Error),
    ("comment.block.documentation", TokenCategory::LiteralStringDoc),
    ("comment", TokenCategory::Comment),
    ("meta.preprocessor", TokenCategory::CommentPreproc),
    ("constant.character.escape", TokenCategory::LiteralStringEscape),
    ("constant.other.placeholder", TokenCategory::LiteralStringInterpol),
    ("string.regexp", TokenCategory::LiteralStringRegex),
    ("string.other", TokenCategory::LiteralStringOther),
    ("string", TokenCategory::LiteralString),
    ("constant.numeric", TokenCategory::LiteralNumber),
    ("constant.language", TokenCategory::KeywordConstant),
    ("constant.other.symbol", TokenCategory::LiteralStringSymbol),
    ("constant", TokenCategory::NameConstant),
    ("keyword.operator.word", TokenCategory::OperatorWord),
    ("keyword.operator", TokenCategory::Operator),
    ("keyword.declaration", TokenCategory::KeywordDeclaration),
    ("keyword", TokenCategory::Keyword),
    ("storage.type", TokenCategory::KeywordType),
    ("storage", TokenCategory::Keyword),
    ("support.type", TokenCategory::KeywordType),
    ("support.function.builtin", TokenCategory::NameBuiltin),
    ("support.function", TokenCategory::NameFunction),
    ("variable.language", TokenCategory::KeywordPseudo),
    ("variable.function", TokenCategory::NameFunction),
    ("variable", TokenCategory::NameVariable),
    ("entity.name.function", TokenCategory::NameFunction),
    ("entity.name.tag", TokenCategory::NameTag),
    ("entity.name.namespace", TokenCategory::NameNamespace),
    ("entity.name.package", TokenCategory::NameNamespace),
    ("entity.name.label", TokenCategory::NameLabel),
    ("entity.name.exception", TokenCategory::NameException),
    ("entity.name.class", TokenCategory::NameClass),
    ("entity.name.type", TokenCategory::NameClass),
    ("entity.name", TokenCategory::Name),
    ("entity.other.attribute-name", TokenCategory::NameAttribute),
    ("entity.other.inherited-class", TokenCategory::NameClass),
    ("entity.other", TokenCategory::NameDecorator),
    ("punctuation.definition.string", TokenCategory::LiteralString),
    ("punctuation.definition.comment", TokenCategory::Comment),
    ("punctuation", TokenCategory::Punctuation),
    ("markup.heading", TokenCategory::GenericHeading),
    ("markup.deleted", TokenCategory::GenericDeleted),
    ("markup.inserted", TokenCategory::GenericInserted),
    ("markup.italic", TokenCategory::GenericEmph),
    ("markup.bold", TokenCategory::GenericStrong),
];

/// Category of the innermost scope that maps to one, or `Text`.
fn category_for(stack: &ScopeStack) -> TokenCategory {
    stack
        .as_slice()
        .iter()
        .rev()
        .find_map(|scope| {
            let name = scope.build_string();
            SCOPE_CATEGORIES
                .iter()
                .find(|(prefix, _)| scope_has_prefix(&name, prefix))
                .map(|(_, category)| *category)
        })
        .unwrap_or(TokenCategory::Text)
}

/// Dotted-segment prefix match: `string` matches `string.quoted` but not `stringy`.
fn scope_has_prefix(scope: &str, prefix: &str) -> bool {
    scope
        .strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('.'))
}

/// Registry over syntect's bundled syntax definitions.
pub struct SyntectLexers {
    syntaxes: SyntaxSet,
}

impl SyntectLexers {
    /// Load the default syntax set.
    #[must_use]
    pub fn new() -> Self {
        Self::from_syntax_set(SyntaxSet::load_defaults_newlines())
    }

    /// Use a caller-provided syntax set (must be a "newlines" set).
    #[must_use]
    pub const fn from_syntax_set(syntaxes: SyntaxSet) -> Self {
        Self { syntaxes }
    }

    fn find(&self, language: &str) -> Option<&SyntaxReference> {
        self.syntaxes.find_syntax_by_token(language).or_else(|| {
            self.syntaxes
                .syntaxes()
                .iter()
                .find(|s| s.name.eq_ignore_ascii_case(language))
        })
    }
}

impl Default for SyntectLexers {
    fn default() -> Self {
        Self::new()
    }
}

impl LexerRegistry for SyntectLexers {
    fn resolve(&self, language: &str) -> Option<Box<dyn Lexer + '_>> {
        let language = language.trim();
        if language.is_empty() {
            return None;
        }
        if language.eq_ignore_ascii_case(GO_HTML_TEMPLATE) {
            let html = self.find("html")?;
            debug!(language, syntax = %html.name, "resolved template lexer");
            return Some(Box::new(GoTemplateLexer {
                html: SyntectLexer { syntaxes: &self.syntaxes, syntax: html },
            }));
        }
        let syntax = self.find(language)?;
        debug!(language, syntax = %syntax.name, "resolved lexer");
        Some(Box::new(SyntectLexer { syntaxes: &self.syntaxes, syntax }))
    }
}

/// `(category, start, end)` byte span into the source.
type Span = (TokenCategory, usize, usize);

/// Append a span, extending the previous one when it has the same category
/// and ends where this one starts.
fn push_span(spans: &mut Vec<Span>, category: TokenCategory, start: usize, end: usize) {
    if start >= end {
        return;
    }
    match spans.last_mut() {
        Some(last) if last.0 == category && last.2 == start => last.2 = end,
        _ => spans.push((category, start, end)),
    }
}

fn into_stream(source: &str, spans: Vec<Span>) -> TokenStream<'_> {
    Box::new(
        spans
            .into_iter()
            .map(move |(category, start, end)| Token::new(category, &source[start..end])),
    )
}

/// Lexer for one syntect grammar.
struct SyntectLexer<'a> {
    syntaxes: &'a SyntaxSet,
    syntax: &'a SyntaxReference,
}

impl SyntectLexer<'_> {
    fn spans(&self, source: &str) -> Result<Vec<Span>> {
        let mut state = ParseState::new(self.syntax);
        let mut stack = ScopeStack::new();
        let mut spans = Vec::new();
        let mut offset = 0;

        for line in LinesWithEndings::from(source) {
            let ops = state
                .parse_line(line, self.syntaxes)
                .map_err(|e| Error::Tokenize(e.to_string()))?;
            for (range, op) in ScopeRangeIterator::new(&ops, line) {
                stack
                    .apply(op)
                    .map_err(|e| Error::Tokenize(format!("{e:?}")))?;
                push_span(&mut spans, category_for(&stack), offset + range.start, offset + range.end);
            }
            offset += line.len();
        }
        Ok(spans)
    }
}

impl Lexer for SyntectLexer<'_> {
    fn name(&self) -> &str {
        &self.syntax.name
    }

    fn tokenise<'s>(&self, source: &'s str) -> Result<TokenStream<'s>> {
        let spans = self.spans(source)?;
        Ok(into_stream(source, spans))
    }
}

/// Name the Go `html/template` lexer resolves under.
pub const GO_HTML_TEMPLATE: &str = "go html template";

/// Words that are keywords inside a template action.
const TEMPLATE_KEYWORDS: &[&str] = &[
    "range", "if", "else", "while", "with", "template", "block", "define", "end", "break",
    "continue", "true", "false", "nil", "and", "call", "html", "index", "js", "len", "not", "or",
    "print", "printf", "println", "urlquery", "eq", "ne", "lt", "le", "gt", "ge",
];

/// HTML with Go template actions.
///
/// The whole document is lexed with the HTML grammar so markup state carries
/// across actions. Each `{{ ... }}` region is then cut out of the HTML spans
/// and lexed as a template pipeline.
struct GoTemplateLexer<'a> {
    html: SyntectLexer<'a>,
}

impl Lexer for GoTemplateLexer<'_> {
    fn name(&self) -> &str {
        "Go HTML Template"
    }

    fn tokenise<'s>(&self, source: &'s str) -> Result<TokenStream<'s>> {
        let html = self.html.spans(source)?;
        let mut spans = Vec::with_capacity(html.len());
        let mut next = 0;
        let mut cursor = 0;

        for action in template_actions(source) {
            clip_spans(&html, &mut next, cursor, action.start, &mut spans);
            action_spans(source, action.start, action.end, &mut spans);
            cursor = action.end;
        }
        clip_spans(&html, &mut next, cursor, source.len(), &mut spans);

        Ok(into_stream(source, spans))
    }
}

/// Copy the parts of `html` that fall inside `lo..hi`. `next` is the index
/// of the first span not yet fully consumed; ranges must be ascending.
fn clip_spans(html: &[Span], next: &mut usize, lo: usize, hi: usize, out: &mut Vec<Span>) {
    while let Some(&(category, start, end)) = html.get(*next) {
        if start >= hi {
            break;
        }
        push_span(out, category, start.max(lo), end.min(hi));
        if end > hi {
            break;
        }
        *next += 1;
    }
}

/// Byte ranges of `{{ ... }}` actions, delimiters included. An unclosed
/// `{{` is left to the HTML grammar.
fn template_actions(source: &str) -> Vec<Range<usize>> {
    let mut actions = Vec::new();
    let mut from = 0;

    while let Some(open) = source[from..].find("{{").map(|i| from + i) {
        let body = open + 2;
        let lead = if source[body..].starts_with("- ") { 2 } else { 0 };
        // Comments may contain `}}`; the action ends after `*/`.
        let search = if source[body + lead..].starts_with("/*") {
            match source[body + lead + 2..].find("*/") {
                Some(i) => body + lead + 2 + i + 2,
                None => break,
            }
        } else {
            body
        };
        let Some(close) = source[search..].find("}}").map(|i| search + i) else {
            break;
        };
        actions.push(open..close + 2);
        from = close + 2;
    }
    actions
}

/// Lex one action. Delimiters, including `-` trim markers, are
/// `CommentPreproc`; `{{/* ... */}}` is a single comment.
fn action_spans(source: &str, start: usize, end: usize, out: &mut Vec<Span>) {
    use TokenCategory as C;

    let bytes = source.as_bytes();
    let text = &bytes[start..end];
    let len = text.len();
    let open = if text.get(2) == Some(&b'-') && text.get(3).is_some_and(u8::is_ascii_whitespace) {
        3
    } else {
        2
    };
    let close = if len >= open + 4 && text[len - 3] == b'-' && text[len - 4].is_ascii_whitespace() {
        3
    } else {
        2
    };
    let (lo, hi) = (start + open, end - close);

    if source[lo..hi].trim_start().starts_with("/*") {
        push_span(out, C::Comment, start, end);
        return;
    }

    push_span(out, C::CommentPreproc, start, lo);
    lex_pipeline(bytes, lo, hi, out);
    push_span(out, C::CommentPreproc, hi, end);
}

const fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b >= 0x80
}

/// End of the run starting at `i` whose bytes satisfy `pred`, capped at `hi`.
fn run_end(bytes: &[u8], mut i: usize, hi: usize, pred: impl Fn(u8) -> bool) -> usize {
    while i < hi && pred(bytes[i]) {
        i += 1;
    }
    i
}

/// End of a quoted literal opening at `i`; unterminated literals run to `hi`.
fn quoted_end(bytes: &[u8], i: usize, hi: usize, quote: u8, escapes: bool) -> usize {
    let mut j = i + 1;
    while j < hi {
        match bytes[j] {
            b'\\' if escapes => j += 2,
            b if b == quote => return j + 1,
            _ => j += 1,
        }
    }
    hi
}

/// Lex the pipeline between an action's delimiters.
///
/// Split points only ever fall on ASCII bytes, so every span is a valid
/// `str` range.
fn lex_pipeline(bytes: &[u8], lo: usize, hi: usize, out: &mut Vec<Span>) {
    use TokenCategory as C;

    let mut i = lo;
    while i < hi {
        let b = bytes[i];
        let peek = bytes.get(i + 1).copied().filter(|_| i + 1 < hi);
        let (category, end) = match b {
            _ if b.is_ascii_whitespace() => {
                (C::Whitespace, run_end(bytes, i, hi, |b| b.is_ascii_whitespace()))
            },
            b'"' => (C::LiteralString, quoted_end(bytes, i, hi, b'"', true)),
            b'\'' => (C::LiteralString, quoted_end(bytes, i, hi, b'\'', true)),
            b'`' => (C::LiteralString, quoted_end(bytes, i, hi, b'`', false)),
            b'(' | b')' | b'|' | b',' | b'=' => (C::Operator, i + 1),
            b':' if peek == Some(b'=') => (C::Operator, i + 2),
            b'.' if peek.is_some_and(|p| p.is_ascii_digit()) => {
                (C::LiteralNumber, run_end(bytes, i + 1, hi, is_ident_byte))
            },
            b'.' => (C::NameAttribute, run_end(bytes, i + 1, hi, is_ident_byte)),
            b'$' if peek == Some(b'.') => {
                (C::NameAttribute, run_end(bytes, i + 2, hi, is_ident_byte))
            },
            b'$' => (C::NameVariable, run_end(bytes, i + 1, hi, is_ident_byte)),
            b'-' if peek.is_some_and(|p| p.is_ascii_digit()) => {
                (C::LiteralNumber, run_end(bytes, i + 1, hi, |b| is_ident_byte(b) || b == b'.'))
            },
            b'0'..=b'9' => {
                (C::LiteralNumber, run_end(bytes, i, hi, |b| is_ident_byte(b) || b == b'.'))
            },
            _ if is_ident_byte(b) => {
                let end = run_end(bytes, i, hi, is_ident_byte);
                let word = &bytes[i..end];
                if TEMPLATE_KEYWORDS.iter().any(|k| k.as_bytes() == word) {
                    (C::Keyword, end)
                } else {
                    (C::NameVariable, end)
                }
            },
            _ => (C::Text, i + 1),
        };
        let end = end.min(hi);
        push_span(out, category, i, end);
        i = end;
    }
}
