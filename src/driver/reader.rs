//! Line reassembly and cleaning
//!
//! The child's stdout arrives in arbitrary byte chunks. The reader
//! accumulates raw bytes until a newline boundary, keeps the trailing
//! partial segment (including any incomplete UTF-8 sequence) for the next
//! read, and cleans each complete line: repeated echoes of the prompt token
//! collapse to a single canonical prompt, and terminal escape sequences of
//! the shape `ESC [ <digits> <letter>` are stripped. Malformed input never
//! fails; bytes that don't look like an escape sequence pass through as
//! literal text.

use std::sync::OnceLock;

use regex::Regex;

use crate::common::{Error, Result};

fn escape_seq() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\x1b\[\d+\w").expect("static regex"))
}

/// Reassembles raw output chunks into cleaned logical lines
#[derive(Debug)]
pub struct LineReader {
    buf: Vec<u8>,
    prompt: String,
    prompt_echo: Regex,
}

impl LineReader {
    pub fn new(prompt: &str) -> Result<Self> {
        let prompt_echo =
            Regex::new(&format!("^(?:{})+", regex::escape(prompt))).map_err(|e| {
                Error::InvalidPattern {
                    pattern: prompt.to_string(),
                    source: e,
                }
            })?;
        Ok(Self {
            buf: Vec::new(),
            prompt: prompt.to_string(),
            prompt_echo,
        })
    }

    /// Feed one raw chunk, returning the complete logical lines it finished.
    ///
    /// The trailing partial segment stays buffered across calls, so a
    /// multi-byte character straddling a chunk boundary is only decoded once
    /// its line's newline has arrived.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(chunk);
        let mut lines = Vec::new();
        while let Some(idx) = self.buf.iter().position(|&b| b == b'\n') {
            let raw: Vec<u8> = self.buf.drain(..=idx).collect();
            let decoded = String::from_utf8_lossy(&raw);
            lines.push(self.clean(decoded.trim_end_matches(['\n', '\r'])));
        }
        lines
    }

    /// Collapse repeated prompt echoes, then strip escape sequences
    fn clean(&self, line: &str) -> String {
        let line = self.prompt_echo.replace(line, self.prompt.as_str());
        escape_seq().replace_all(&line, "").into_owned()
    }
}
