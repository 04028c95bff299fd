//! Turns a pair of themes into Tailwind utility classes.
//!
//! Every category gets the classes of its light appearance, followed by `dark:` variants that
//! either switch to the dark appearance or explicitly reset what the light classes set.

use std::fmt;

use crate::themes::{StyleEntry, Theme, Trilean};
use crate::tokens::TokenType;

/// Tab width browsers use when nothing is set
pub const DEFAULT_TAB_WIDTH: usize = 8;

/// The utility classes of a single category, in output order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassSet {
    /// Theme-independent classes for structural categories
    pub structural: Vec<String>,
    /// Classes that apply unconditionally
    pub light: Vec<String>,
    /// `dark:` variant classes
    pub dark: Vec<String>,
}

impl ClassSet {
    pub fn is_empty(&self) -> bool {
        self.structural.is_empty() && self.light.is_empty() && self.dark.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.structural
            .iter()
            .chain(&self.light)
            .chain(&self.dark)
            .map(String::as_str)
    }
}

impl fmt::Display for ClassSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, class) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            f.write_str(class)?;
        }
        Ok(())
    }
}

/// The class attribute value of every category for one (light, dark) theme pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassMapping {
    classes: Box<[String]>,
}

impl ClassMapping {
    /// The classes for that category, possibly empty.
    #[inline]
    pub fn get(&self, token_type: TokenType) -> &str {
        &self.classes[token_type.index()]
    }
}

/// The class-bearing values of an entry after background subtraction
#[derive(Debug, Default)]
struct EntryValues {
    text: Option<String>,
    bg: Option<String>,
    bold: bool,
    italic: bool,
    underline: bool,
}

impl From<&StyleEntry> for EntryValues {
    fn from(entry: &StyleEntry) -> Self {
        EntryValues {
            text: entry.colour.map(|c| format!("text-[{}]", c.as_hex())),
            bg: entry.background.map(|c| format!("bg-[{}]", c.as_hex())),
            bold: entry.bold == Trilean::Yes,
            italic: entry.italic == Trilean::Yes,
            underline: entry.underline == Trilean::Yes,
        }
    }
}

/// Everything from the formatter configuration that affects the generated classes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassGenerator {
    pub prefix: String,
    pub tab_width: usize,
    pub wrap_long_lines: bool,
    pub has_highlighted_lines: bool,
}

impl Default for ClassGenerator {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            tab_width: DEFAULT_TAB_WIDTH,
            wrap_long_lines: false,
            has_highlighted_lines: false,
        }
    }
}

impl ClassGenerator {
    #[inline]
    pub(crate) fn prefixed(&self, class: &str) -> String {
        format!("{}{class}", self.prefix)
    }

    #[inline]
    fn dark(&self, class: &str) -> String {
        format!("dark:{}{class}", self.prefix)
    }

    fn structural_classes(&self, token_type: TokenType) -> &'static [&'static str] {
        match token_type {
            TokenType::PreWrapper => match (self.has_highlighted_lines, self.wrap_long_lines) {
                (false, false) => &[],
                (true, false) => &["grid"],
                (false, true) => &["whitespace-pre-wrap", "break-words"],
                (true, true) => &["grid", "whitespace-pre-wrap", "break-words"],
            },
            TokenType::Line => &["flex"],
            TokenType::LineNumbers | TokenType::LineNumbersTable => {
                &["whitespace-pre", "select-none", "mr-[0.4em]", "px-[0.4em]"]
            }
            TokenType::LineTable => &[
                "border-separate",
                "border-spacing-0",
                "p-0",
                "m-0",
                "border-0",
            ],
            TokenType::LineTableTD => &["align-top", "p-0", "m-0", "border-0"],
            TokenType::LineLink => &["outline-none", "no-underline", "text-[inherit]"],
            _ => &[],
        }
    }

    /// `[tab-size:n]` when the tab width differs from what browsers use anyway
    fn tab_width_class(&self) -> Option<String> {
        if self.tab_width != 0 && self.tab_width != DEFAULT_TAB_WIDTH {
            Some(self.prefixed(&format!("[tab-size:{}]", self.tab_width)))
        } else {
            None
        }
    }

    /// Computes the classes of a single category for a (light, dark) pair of themes.
    pub fn compute_classes(&self, token_type: TokenType, light: &Theme, dark: &Theme) -> ClassSet {
        let mut light_entry = light.get(token_type);
        let mut dark_entry = dark.get(token_type);
        if token_type != TokenType::Background {
            light_entry = light_entry.sub(&light.get(TokenType::Background));
            dark_entry = dark_entry.sub(&dark.get(TokenType::Background));
        }

        let light_values = EntryValues::from(&light_entry);
        let dark_values = EntryValues::from(&dark_entry);

        ClassSet {
            structural: self
                .structural_classes(token_type)
                .iter()
                .map(|c| self.prefixed(c))
                .collect(),
            light: self.light_classes(&light_values),
            dark: self.dark_variant_classes(&light_values, &dark_values),
        }
    }

    fn light_classes(&self, values: &EntryValues) -> Vec<String> {
        let mut out = Vec::new();
        if let Some(text) = &values.text {
            out.push(self.prefixed(text));
        }
        if let Some(bg) = &values.bg {
            out.push(self.prefixed(bg));
        }
        if values.bold {
            out.push(self.prefixed("font-bold"));
        }
        if values.italic {
            out.push(self.prefixed("italic"));
        }
        if values.underline {
            out.push(self.prefixed("underline"));
        }
        out
    }

    /// A field set in dark mode is emitted as is, a field only set in light mode is reset so it
    /// does not leak into dark mode through the cascade.
    fn dark_variant_classes(&self, light: &EntryValues, dark: &EntryValues) -> Vec<String> {
        let mut out = Vec::new();
        match (&light.text, &dark.text) {
            (_, Some(text)) => out.push(self.dark(text)),
            (Some(_), None) => out.push(self.dark("text-[inherit]")),
            (None, None) => {}
        }
        match (&light.bg, &dark.bg) {
            (_, Some(bg)) => out.push(self.dark(bg)),
            (Some(_), None) => out.push(self.dark("bg-transparent")),
            (None, None) => {}
        }

        let flags = [
            (light.bold, dark.bold, "font-bold", "font-normal"),
            (light.italic, dark.italic, "italic", "not-italic"),
            (light.underline, dark.underline, "underline", "no-underline"),
        ];
        for (light_set, dark_set, class, reset) in flags {
            if dark_set {
                out.push(self.dark(class));
            } else if light_set {
                out.push(self.dark(reset));
            }
        }
        out
    }

    /// Computes the classes of every category for that pair of themes.
    pub fn mapping(&self, light: &Theme, dark: &Theme) -> ClassMapping {
        let mut classes: Vec<String> = TokenType::ALL
            .iter()
            .map(|&tt| self.compute_classes(tt, light, dark).to_string())
            .collect();

        if let Some(tab_class) = self.tab_width_class() {
            join_classes(&mut classes[TokenType::Background.index()], &tab_class);
        }
        let background = classes[TokenType::Background.index()].clone();
        join_classes(&mut classes[TokenType::PreWrapper.index()], &background);

        ClassMapping {
            classes: classes.into_boxed_slice(),
        }
    }
}

fn join_classes(target: &mut String, extra: &str) {
    if extra.is_empty() {
        return;
    }
    if !target.is_empty() {
        target.push(' ');
    }
    target.push_str(extra);
}
