//! Error types for the REPL harness
//!
//! Every failure here is fatal for the run as a whole: a single mismatch,
//! unexpected line, or timeout fails the entire scripted session. The only
//! recovery performed is best-effort child-process cleanup.

use std::io;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the REPL harness
#[derive(Error, Debug)]
pub enum Error {
    // === Interaction Errors ===
    #[error("Unexpected output with no pending expectation: '{line}'")]
    UnexpectedOutput { line: String },

    #[error("Pattern mismatch: got '{line}', expected /{pattern}/")]
    PatternMismatch { line: String, pattern: String },

    #[error("Timeout after {secs}s. Expected: /{pending}/")]
    Timeout { secs: u64, pending: String },

    #[error("Child exited cleanly but {remaining} turn(s) are still pending")]
    QueueNotDrained { remaining: usize },

    #[error("Child exited with code {code:?} before the script finished")]
    ChildExited { code: Option<i32> },

    // === Process Errors ===
    #[error("Failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    // === Scenario Errors ===
    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Scenario error: {0}")]
    Scenario(String),

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Create a pattern mismatch error from the actual line and the pattern
    pub fn pattern_mismatch(line: &str, pattern: &str) -> Self {
        Self::PatternMismatch {
            line: line.to_string(),
            pattern: pattern.to_string(),
        }
    }

    /// Create an unexpected output error
    pub fn unexpected_output(line: &str) -> Self {
        Self::UnexpectedOutput {
            line: line.to_string(),
        }
    }
}
