use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::error::HighlightResult;
use crate::themes::raw::RawTheme;
use crate::themes::style::StyleEntry;
use crate::tokens::TokenType;

/// An immutable colour theme: a style entry per token category.
///
/// Themes are shared as `Arc<Theme>`. Two themes are only considered the same by the class
/// cache if they are the same allocation, even if their entries are equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub name: String,
    entries: HashMap<TokenType, StyleEntry>,
}

impl Theme {
    pub fn builder(name: impl Into<String>) -> ThemeBuilder {
        ThemeBuilder {
            name: name.into(),
            entries: HashMap::new(),
        }
    }

    /// Parses a theme from JSON, eg `{"name": "github", "styles": {"Keyword": "bold #d73a49"}}`
    pub fn from_json(json: &str) -> HighlightResult<Self> {
        let raw: RawTheme = serde_json::from_str(json)?;
        raw.compile()
    }

    /// Reads the file and parses it as a JSON theme.
    pub fn load_from_file(path: impl AsRef<Path>) -> HighlightResult<Self> {
        RawTheme::load_from_file(path)?.compile()
    }

    /// The entry exactly as set in the theme, without any inheritance.
    pub fn raw_entry(&self, token_type: TokenType) -> Option<&StyleEntry> {
        self.entries.get(&token_type)
    }

    /// Resolves the style of a category.
    ///
    /// Unset fields are taken from the ancestor categories (nearest first), then `Text`, then
    /// `Background`. The walk stops at the first entry marked as `noinherit`. A category the
    /// theme knows nothing about gets an empty entry.
    pub fn get(&self, token_type: TokenType) -> StyleEntry {
        let mut out = self.raw_entry(token_type).copied().unwrap_or_default();
        if out.no_inherit {
            return out;
        }

        let ancestors = token_type
            .ancestors()
            .chain([TokenType::Text, TokenType::Background])
            .filter(|tt| *tt != token_type);

        for ancestor in ancestors {
            if let Some(entry) = self.raw_entry(ancestor) {
                out = out.inherit(entry);
                if entry.no_inherit {
                    break;
                }
            }
        }

        out
    }
}

/// Builds a [`Theme`] one category at a time
#[derive(Debug, Clone)]
pub struct ThemeBuilder {
    name: String,
    entries: HashMap<TokenType, StyleEntry>,
}

impl ThemeBuilder {
    pub fn entry(mut self, token_type: TokenType, entry: StyleEntry) -> Self {
        self.entries.insert(token_type, entry);
        self
    }

    /// Adds an entry from a descriptor like `bold #d73a49 bg:#ffffff`
    pub fn parse_entry(self, token_type: TokenType, descriptor: &str) -> HighlightResult<Self> {
        let entry = descriptor.parse()?;
        Ok(self.entry(token_type, entry))
    }

    pub fn build(self) -> Theme {
        Theme {
            name: self.name,
            entries: self.entries,
        }
    }

    pub fn build_arc(self) -> Arc<Theme> {
        Arc::new(self.build())
    }
}
