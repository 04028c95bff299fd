use std::fmt;
use std::io;

pub(crate) type HighlightResult<T> = Result<T, Error>;

/// Errors that can occur while loading themes or rendering code
#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    /// Writing to the output sink failed, or a theme file could not be read.
    /// Partial output may already have been written when this happens during rendering.
    Io(io::Error),

    /// JSON parsing failed when loading a theme or options.
    Json(serde_json::Error),

    /// An invalid hex color was encountered.
    /// Can only happen when building a theme.
    #[allow(missing_docs)]
    InvalidHexColor { value: String, reason: String },

    /// A style entry descriptor like `bold #ff0000 bg:#000` could not be parsed.
    #[allow(missing_docs)]
    InvalidStyleEntry { value: String, reason: String },

    /// A token category name that is not one of the standard categories.
    UnknownTokenType(String),

    /// The tokenizer failed. The original error is available via `source()`.
    Tokenize(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "I/O error: {}", err),
            Error::Json(err) => write!(f, "JSON parsing error: {}", err),
            Error::InvalidHexColor { value, reason } => {
                write!(f, "invalid hex color '{}': {}", value, reason)
            }
            Error::InvalidStyleEntry { value, reason } => {
                write!(f, "invalid style entry '{}': {}", value, reason)
            }
            Error::UnknownTokenType(name) => write!(f, "unknown token type '{}'", name),
            Error::Tokenize(err) => write!(f, "tokenizer error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Json(err) => Some(err),
            Error::Tokenize(err) => Some(err.as_ref()),
            Error::InvalidHexColor { .. }
            | Error::InvalidStyleEntry { .. }
            | Error::UnknownTokenType(_) => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err)
    }
}
