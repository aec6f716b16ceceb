//! Template function table.
//!
//! The page renderer looks functions up by name while executing a template.
//! [`TemplateFuncs`] binds the two highlight entry points to a shared
//! [`Highlighter`] so the renderer never touches a global.

use crate::{Highlighter, Markup};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Name of the block highlight function.
pub const HIGHLIGHT_FN: &str = "highlight";
/// Name of the inline highlight function.
pub const HIGHLIGHT_INLINE_FN: &str = "highlightinline";

/// A template-callable `(language, source) -> markup` function.
pub type TemplateFn = Arc<dyn Fn(&str, &str) -> Markup + Send + Sync>;

/// Named functions exposed to page templates.
#[derive(Clone)]
pub struct TemplateFuncs {
    funcs: BTreeMap<&'static str, TemplateFn>,
}

impl TemplateFuncs {
    /// Bind `highlight` and `highlightinline` to `highlighter`.
    pub fn new(highlighter: Arc<Highlighter>) -> Self {
        let mut funcs: BTreeMap<&'static str, TemplateFn> = BTreeMap::new();

        let hl = Arc::clone(&highlighter);
        funcs.insert(HIGHLIGHT_FN, Arc::new(move |lang: &str, src: &str| hl.highlight(lang, src)));

        let hl = highlighter;
        funcs.insert(HIGHLIGHT_INLINE_FN, Arc::new(move |lang: &str, src: &str| {
            hl.highlight_inline(lang, src)
        }));

        Self { funcs }
    }

    /// Look up a function by template name.
    pub fn get(&self, name: &str) -> Option<&TemplateFn> {
        self.funcs.get(name)
    }

    /// Call a function by name; `None` when no function has that name.
    pub fn call(&self, name: &str, language: &str, source: &str) -> Option<Markup> {
        self.get(name).map(|f| f(language, source))
    }

    /// Registered names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.funcs.keys().copied()
    }
}

impl fmt::Debug for TemplateFuncs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateFuncs")
            .field("names", &self.funcs.keys().collect::<Vec<_>>())
            .finish()
    }
}
