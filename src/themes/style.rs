use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::themes::Color;

/// A flag that can be left unset so it is inherited from an ancestor category
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Debug)]
pub enum Trilean {
    #[default]
    Pass,
    Yes,
    No,
}

impl Trilean {
    #[inline]
    pub fn is_set(self) -> bool {
        self != Trilean::Pass
    }

    #[inline]
    fn or(self, other: Trilean) -> Trilean {
        if self.is_set() { self } else { other }
    }
}

/// The styling a theme gives to one token category. Every field is optional.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Debug)]
pub struct StyleEntry {
    pub colour: Option<Color>,
    pub background: Option<Color>,
    pub bold: Trilean,
    pub italic: Trilean,
    pub underline: Trilean,
    /// Do not inherit anything from the ancestor categories
    pub no_inherit: bool,
}

impl StyleEntry {
    pub const fn new() -> Self {
        Self {
            colour: None,
            background: None,
            bold: Trilean::Pass,
            italic: Trilean::Pass,
            underline: Trilean::Pass,
            no_inherit: false,
        }
    }

    pub fn with_colour(mut self, colour: Color) -> Self {
        self.colour = Some(colour);
        self
    }

    pub fn with_background(mut self, background: Color) -> Self {
        self.background = Some(background);
        self
    }

    pub fn bold(mut self) -> Self {
        self.bold = Trilean::Yes;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = Trilean::Yes;
        self
    }

    pub fn underline(mut self) -> Self {
        self.underline = Trilean::Yes;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.colour.is_none()
            && self.background.is_none()
            && !self.bold.is_set()
            && !self.italic.is_set()
            && !self.underline.is_set()
    }

    /// Fills the unset fields of this entry with the ones of `ancestor`.
    pub fn inherit(&self, ancestor: &StyleEntry) -> StyleEntry {
        StyleEntry {
            colour: self.colour.or(ancestor.colour),
            background: self.background.or(ancestor.background),
            bold: self.bold.or(ancestor.bold),
            italic: self.italic.or(ancestor.italic),
            underline: self.underline.or(ancestor.underline),
            no_inherit: self.no_inherit,
        }
    }

    /// Removes every field that is equal to the same field of `other`.
    ///
    /// Comparison is done field by field, which is how redundant colours inherited from the
    /// background end up unset.
    pub fn sub(&self, other: &StyleEntry) -> StyleEntry {
        fn keep<T: PartialEq + Default>(value: T, other: T) -> T {
            if value != other { value } else { T::default() }
        }

        StyleEntry {
            colour: keep(self.colour, other.colour),
            background: keep(self.background, other.background),
            bold: keep(self.bold, other.bold),
            italic: keep(self.italic, other.italic),
            underline: keep(self.underline, other.underline),
            no_inherit: self.no_inherit,
        }
    }
}

impl FromStr for StyleEntry {
    type Err = Error;

    /// Parses a descriptor like `bold noitalic #d73a49 bg:#ffffff`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut entry = StyleEntry::new();

        for part in s.split_whitespace() {
            match part {
                "bold" => entry.bold = Trilean::Yes,
                "nobold" => entry.bold = Trilean::No,
                "italic" => entry.italic = Trilean::Yes,
                "noitalic" => entry.italic = Trilean::No,
                "underline" => entry.underline = Trilean::Yes,
                "nounderline" => entry.underline = Trilean::No,
                "noinherit" => entry.no_inherit = true,
                "bg:" => entry.background = None,
                // Borders have no utility class counterpart here
                _ if part.starts_with("border:") => {}
                _ => {
                    if let Some(bg) = part.strip_prefix("bg:") {
                        entry.background = Some(Color::from_hex(bg)?);
                    } else if part.starts_with('#') {
                        entry.colour = Some(Color::from_hex(part)?);
                    } else {
                        return Err(Error::InvalidStyleEntry {
                            value: s.to_string(),
                            reason: format!("unknown style '{}'", part),
                        });
                    }
                }
            }
        }

        Ok(entry)
    }
}
