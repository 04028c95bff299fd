use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::HighlightResult;
use crate::themes::compiled::Theme;
use crate::tokens::TokenType;

/// Theme as found in a JSON file: category names mapped to style descriptors
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawTheme {
    pub name: String,
    #[serde(default)]
    pub styles: BTreeMap<String, String>,
}

impl RawTheme {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> HighlightResult<Self> {
        let file = File::open(path)?;
        let theme = serde_json::from_reader(BufReader::new(file))?;
        Ok(theme)
    }

    /// Resolves the category names and parses every descriptor.
    pub fn compile(self) -> HighlightResult<Theme> {
        let mut builder = Theme::builder(self.name);
        for (name, descriptor) in &self.styles {
            let token_type: TokenType = name.parse()?;
            builder = builder.parse_entry(token_type, descriptor)?;
        }
        Ok(builder.build())
    }
}
