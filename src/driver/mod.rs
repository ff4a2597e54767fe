//! The interaction driver
//!
//! Wiring: the session spawns the child and feeds raw stdout chunks to the
//! line reader; cleaned logical lines go to the interaction engine, which
//! validates them against the expectation queue and tells the session what
//! input to send next. The supervisor stops a non-responsive child.

pub mod engine;
pub mod reader;
pub mod session;
pub mod supervisor;

pub use engine::{Advance, Engine};
pub use reader::LineReader;
pub use session::{run_scenario, Session};
