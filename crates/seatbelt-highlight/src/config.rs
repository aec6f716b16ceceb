//! Highlighter configuration.
//!
//! Settings are stored in TOML and every field has a default, so an empty
//! file (or no file) is valid. Environment variables with the
//! `SEATBELT_HIGHLIGHT_` prefix override file values.
//!
//! ## Example Configuration File
//!
//! ```toml
//! style = "seatbelt"
//! inline_class = "inline-block bg-slate-100 px-1 rounded-md text-sm sm:text-base"
//!
//! [aliases]
//! gohtml = "go html template"
//! golang = "go"
//!
//! [pool]
//! max_buffers = 32
//! initial_capacity = 4096
//! max_retained_capacity = 1048576
//! ```
//!
//! ## Environment Overrides
//!
//! | variable                              | field              |
//! |---------------------------------------|--------------------|
//! | `SEATBELT_HIGHLIGHT_STYLE`            | `style`            |
//! | `SEATBELT_HIGHLIGHT_INLINE_CLASS`     | `inline_class`     |
//! | `SEATBELT_HIGHLIGHT_POOL_MAX_BUFFERS` | `pool.max_buffers` |

use crate::{Error, GO_HTML_TEMPLATE, Result, SEATBELT_STYLE};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Default class list of the inline `<code>` wrapper.
pub const DEFAULT_INLINE_CLASS: &str = "inline-block bg-slate-100 px-1 rounded-md text-sm sm:text-base";

/// Top-level highlighter settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HighlightConfig {
    /// Name of the registered style to render with.
    ///
    /// `"seatbelt"` is registered automatically; any other name must already
    /// be present in the [`StyleRegistry`](crate::StyleRegistry) handed to the
    /// highlighter.
    pub style: String,

    /// Class attribute of the `<code>` element wrapping inline highlights.
    pub inline_class: String,

    /// Language aliases, applied after lower-casing and trimming.
    ///
    /// Keys are matched case-insensitively; values name a grammar the lexer
    /// registry can resolve.
    pub aliases: BTreeMap<String, String>,

    /// Scratch buffer pool sizing
    pub pool: PoolConfig,
}

/// Buffer pool sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PoolConfig {
    /// Idle buffers retained between calls
    pub max_buffers: usize,
    /// Capacity of newly allocated buffers, in bytes
    pub initial_capacity: usize,
    /// Buffers larger than this are freed instead of retained, in bytes
    pub max_retained_capacity: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_buffers: 32,
            initial_capacity: 4096,
            max_retained_capacity: 1024 * 1024,
        }
    }
}

impl Default for HighlightConfig {
    fn default() -> Self {
        let aliases = [
            ("go-html-template", GO_HTML_TEMPLATE),
            ("gohtml", GO_HTML_TEMPLATE),
            ("tmpl", GO_HTML_TEMPLATE),
            ("golang", "go"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            style: SEATBELT_STYLE.to_string(),
            inline_class: DEFAULT_INLINE_CLASS.to_string(),
            aliases,
            pool: PoolConfig::default(),
        }
    }
}

impl HighlightConfig {
    /// Load settings from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse settings from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Apply `SEATBELT_HIGHLIGHT_*` overrides from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides_from(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable source.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(style) = lookup("SEATBELT_HIGHLIGHT_STYLE") {
            self.style = style;
        }
        if let Some(class) = lookup("SEATBELT_HIGHLIGHT_INLINE_CLASS") {
            self.inline_class = class;
        }
        if let Some(raw) = lookup("SEATBELT_HIGHLIGHT_POOL_MAX_BUFFERS") {
            self.pool.max_buffers = raw.trim().parse().map_err(|e| {
                Error::Config(format!("SEATBELT_HIGHLIGHT_POOL_MAX_BUFFERS={raw:?}: {e}"))
            })?;
        }
        self.validate()
    }

    /// Reject settings that cannot work.
    pub fn validate(&self) -> Result<()> {
        if self.style.trim().is_empty() {
            return Err(Error::Config("style must not be empty".into()));
        }
        if self.inline_class.contains('"') {
            return Err(Error::Config("inline_class must not contain '\"'".into()));
        }
        if let Some((alias, _)) = self.aliases.iter().find(|(_, target)| target.trim().is_empty()) {
            return Err(Error::Config(format!("alias '{alias}' has an empty target")));
        }
        Ok(())
    }

    /// Normalize a language name: trim, lower-case, then resolve aliases.
    pub fn normalize_language(&self, language: &str) -> String {
        let name = language.trim().to_lowercase();
        self.aliases
            .iter()
            .find(|(alias, _)| alias.trim().eq_ignore_ascii_case(&name))
            .map_or(name, |(_, target)| target.trim().to_lowercase())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_values() {
        let config = HighlightConfig::default();
        assert_eq!(config.style, "seatbelt");
        assert_eq!(config.inline_class, DEFAULT_INLINE_CLASS);
        assert_eq!(config.aliases.get("gohtml").map(String::as_str), Some(GO_HTML_TEMPLATE));
        assert!(!config.aliases.contains_key(GO_HTML_TEMPLATE));
        assert_eq!(config.pool.max_buffers, 32);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(HighlightConfig::from_toml_str("").unwrap(), HighlightConfig::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let config = HighlightConfig::from_toml_str("[pool]\nmax_buffers = 4\n").unwrap();
        assert_eq!(config.pool.max_buffers, 4);
        assert_eq!(config.pool.initial_capacity, 4096);
        assert_eq!(config.style, "seatbelt");
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let err = HighlightConfig::from_toml_str("colour = \"red\"\n").unwrap_err();
        assert_eq!(err.category(), "config");
    }

    #[test]
    fn test_config_save_and_load_roundtrip() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("highlight.toml");

        let mut config = HighlightConfig::default();
        config.style = "custom".into();
        config.aliases.insert("jsx".into(), "javascript".into());
        fs::write(&path, config.to_toml_string()?)?;

        let loaded = HighlightConfig::load(&path)?;
        assert_eq!(loaded, config);
        Ok(())
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = HighlightConfig::load(&dir.path().join("nope.toml")).unwrap_err();
        assert_eq!(err.category(), "config");
        assert!(err.to_string().contains("nope.toml"));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("SEATBELT_HIGHLIGHT_STYLE", "dark"),
            ("SEATBELT_HIGHLIGHT_INLINE_CLASS", "code"),
            ("SEATBELT_HIGHLIGHT_POOL_MAX_BUFFERS", " 7 "),
        ]);
        let mut config = HighlightConfig::default();
        config
            .apply_overrides_from(|name| vars.get(name).map(|v| (*v).to_string()))
            .unwrap();

        assert_eq!(config.style, "dark");
        assert_eq!(config.inline_class, "code");
        assert_eq!(config.pool.max_buffers, 7);
    }

    #[test]
    fn test_env_override_bad_number() {
        let mut config = HighlightConfig::default();
        let err = config
            .apply_overrides_from(|name| {
                (name == "SEATBELT_HIGHLIGHT_POOL_MAX_BUFFERS").then(|| "many".to_string())
            })
            .unwrap_err();
        assert!(err.to_string().contains("SEATBELT_HIGHLIGHT_POOL_MAX_BUFFERS"));
    }

    #[test]
    fn test_validation() {
        let mut config = HighlightConfig::default();
        config.style = "  ".into();
        assert!(config.validate().is_err());

        let mut config = HighlightConfig::default();
        config.inline_class = "a\" onload=\"x".into();
        assert!(config.validate().is_err());

        let mut config = HighlightConfig::default();
        config.aliases.insert("x".into(), String::new());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_normalize_language() {
        let config = HighlightConfig::default();
        assert_eq!(config.normalize_language("  Go "), "go");
        assert_eq!(config.normalize_language("Go HTML Template"), "go html template");
        assert_eq!(config.normalize_language("TMPL"), "go html template");
        assert_eq!(config.normalize_language("golang"), "go");
        assert_eq!(config.normalize_language("rust"), "rust");
    }
}
