//! Line-matching predicates
//!
//! A pattern is an opaque regex a single logical output line must satisfy.
//! The source text is retained so mismatch diagnostics can name the pattern
//! that was expected.

use std::fmt;

use regex::Regex;
use serde::{de, Deserialize, Deserializer};

use crate::common::{Error, Result};

/// A compiled line pattern together with its source text
#[derive(Debug, Clone)]
pub struct Pattern {
    re: Regex,
    source: String,
}

impl Pattern {
    /// Compile a pattern from its regex source
    pub fn new(source: &str) -> Result<Self> {
        let re = Regex::new(source).map_err(|e| Error::InvalidPattern {
            pattern: source.to_string(),
            source: e,
        })?;
        Ok(Self {
            re,
            source: source.to_string(),
        })
    }

    /// Whether a logical line satisfies this pattern
    pub fn is_match(&self, line: &str) -> bool {
        self.re.is_match(line)
    }

    /// The regex source this pattern was compiled from
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl<'de> Deserialize<'de> for Pattern {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let source = String::deserialize(deserializer)?;
        Pattern::new(&source).map_err(de::Error::custom)
    }
}
