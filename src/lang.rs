//! Supported document languages.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Languages the extraction pipeline accepts.
///
/// Anything else fails closed with [`Error::UnsupportedLanguage`]: taggers
/// trained for one language silently produce garbage on another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    /// English (`en`)
    #[serde(rename = "en")]
    English,
    /// Portuguese (`pt`)
    #[serde(rename = "pt")]
    Portuguese,
}

impl Language {
    /// Every supported language.
    pub const ALL: [Language; 2] = [Language::English, Language::Portuguese];

    /// Parse an ISO 639-1 code.
    pub fn from_code(code: &str) -> Result<Self> {
        let code = code.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|lang| lang.code() == code)
            .ok_or_else(|| Error::unsupported_language(code))
    }

    /// ISO 639-1 code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Portuguese => "pt",
        }
    }

    /// English name, as some taggers expect it.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Portuguese => "Portuguese",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_code(s)
    }
}
