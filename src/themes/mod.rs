mod color;
mod compiled;
mod raw;
mod style;

pub use color::Color;
pub use compiled::{Theme, ThemeBuilder};
pub use raw::RawTheme;
pub use style::{StyleEntry, Trilean};
