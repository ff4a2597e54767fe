//! Scripted turn sequences
//!
//! A script is an ordered queue of turns. Each turn optionally sends one
//! input line to the child and then requires an ordered list of output
//! patterns to be satisfied before the next turn begins. Turns are consumed
//! exactly once, front to back; no turn is revisited.

mod config;
mod pattern;

use std::collections::VecDeque;

use crate::common::Result;

pub use config::{Scenario, TargetConfig, TurnSpec};
pub use pattern::Pattern;

/// One scripted exchange with the child process
#[derive(Debug, Clone)]
pub struct Turn {
    /// Input line to send when this turn is reached (without trailing newline)
    pub input: Option<String>,
    /// Output patterns that must match, in order, before the turn completes
    pub expect: VecDeque<Pattern>,
}

impl Turn {
    pub fn new(input: Option<String>, expect: Vec<Pattern>) -> Self {
        Self {
            input,
            expect: expect.into(),
        }
    }
}

/// An ordered queue of turns, consumed monotonically from the front
#[derive(Debug, Clone, Default)]
pub struct Script {
    turns: VecDeque<Turn>,
}

impl Script {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn built from regex sources. Builder-style, used when
    /// constructing scripts in memory rather than from a scenario file.
    pub fn turn(mut self, input: Option<&str>, expect: &[&str]) -> Result<Self> {
        let patterns = expect
            .iter()
            .map(|p| Pattern::new(p))
            .collect::<Result<Vec<_>>>()?;
        self.turns
            .push_back(Turn::new(input.map(str::to_string), patterns));
        Ok(self)
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push_back(turn);
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub(crate) fn into_turns(self) -> VecDeque<Turn> {
        self.turns
    }
}
