//! Expectation queue and interaction engine
//!
//! A pure state machine over the scripted turn queue. The engine owns the
//! queue exclusively and performs no I/O: `on_line` reports which inputs the
//! caller must send and whether the run is finished, and the session layer
//! handles the actual writes. Patterns within one turn match strictly in
//! order; turns match strictly in queue order; there is no look-ahead and no
//! retry, so a line that would satisfy a later pattern still fails against
//! the pending one.

use std::collections::VecDeque;

use crate::common::{Error, Result};
use crate::script::{Pattern, Script, Turn};

/// What the caller must do after a line was consumed
#[derive(Debug, Default)]
pub struct Advance {
    /// Input lines to send to the child, in order
    pub inputs: Vec<String>,
    /// Whether the queue fully drained and the run is complete
    pub finished: bool,
}

impl Advance {
    fn none() -> Self {
        Self::default()
    }
}

/// Interaction engine driving the expectation queue
#[derive(Debug)]
pub struct Engine {
    queue: VecDeque<Turn>,
}

impl Engine {
    pub fn new(script: Script) -> Self {
        Self {
            queue: script.into_turns(),
        }
    }

    /// Begin the run: consume any leading turns that expect no output.
    ///
    /// A turn with input but no patterns fires its input and advances
    /// immediately; one with neither is a no-op that advances instantly.
    /// For the usual case of a head turn with patterns and no input this
    /// sends nothing.
    pub fn start(&mut self) -> Advance {
        self.advance()
    }

    /// Match one logical line against the head turn's next pending pattern.
    ///
    /// Completing a turn's last pattern pops the turn and advances the
    /// queue, which may cascade through pattern-less turns.
    pub fn on_line(&mut self, line: &str) -> Result<Advance> {
        let Some(turn) = self.queue.front_mut() else {
            return Err(Error::unexpected_output(line));
        };
        let Some(pattern) = turn.expect.pop_front() else {
            // A pattern-less turn never waits at the head; advancement pops
            // it before lines are read. Output arriving here has no pending
            // expectation.
            return Err(Error::unexpected_output(line));
        };
        if !pattern.is_match(line) {
            return Err(Error::pattern_mismatch(line, pattern.as_str()));
        }
        if self
            .queue
            .front()
            .map(|t| t.expect.is_empty())
            .unwrap_or(false)
        {
            self.queue.pop_front();
            return Ok(self.advance());
        }
        Ok(Advance::none())
    }

    /// Advance to the next pending turn, collecting inputs to send along the
    /// way. Pattern-less turns are popped as soon as their input is
    /// collected; an emptied queue means the run completed.
    fn advance(&mut self) -> Advance {
        let mut inputs = Vec::new();
        loop {
            let Some(turn) = self.queue.front() else {
                return Advance {
                    inputs,
                    finished: true,
                };
            };
            if let Some(input) = &turn.input {
                inputs.push(input.clone());
            }
            if turn.expect.is_empty() {
                self.queue.pop_front();
                continue;
            }
            return Advance {
                inputs,
                finished: false,
            };
        }
    }

    /// The first still-pending pattern of the head turn, for diagnostics
    pub fn pending_pattern(&self) -> Option<&Pattern> {
        self.queue.front().and_then(|t| t.expect.front())
    }

    /// Number of turns not yet consumed
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    /// Whether the queue fully drained
    pub fn is_idle(&self) -> bool {
        self.queue.is_empty()
    }
}
