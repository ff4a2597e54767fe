//! repl-harness - a scripted test driver for line-oriented debugger REPLs
//!
//! Spawns a child process exposing a prompt-driven read-eval-print
//! interface, feeds it a scripted sequence of commands and asserts that its
//! output matches an ordered sequence of line patterns within a wall-clock
//! budget. The child is opaque; only its stdio streams matter.

pub mod common;
pub mod driver;
pub mod script;

// Re-export commonly used types for tests
pub use common::{Error, Result};
pub use driver::{Engine, LineReader, Session};
pub use script::{Pattern, Scenario, Script, Turn};
