//! Renders tokenized code to HTML styled with Tailwind utility classes.
//!
//! Colours come from two themes at once: the light theme gives the plain classes and the dark
//! theme the `dark:` variants, so a single output follows the page's dark mode.
//! Tokenizing the source is left to the caller, see [`Tokenizer`].

mod cache;
mod classes;
mod error;
mod options;
mod renderers;
mod themes;
mod tokens;

pub use cache::{ClassCache, DEFAULT_CAPACITY};
pub use classes::{ClassGenerator, ClassMapping, ClassSet, DEFAULT_TAB_WIDTH};
pub use error::Error;
pub use options::Options;
pub use renderers::{
    DefaultPreWrapper, FnPreWrapper, InlineCodeWrapper, NoPreWrapper, PreWrapper,
    html::TailwindFormatter,
};
pub use themes::{Color, RawTheme, StyleEntry, Theme, ThemeBuilder, Trilean};
pub use tokens::{Fragment, Token, TokenType, Tokenizer, split_into_lines};
