//! Scenario file types
//!
//! Defines the data structures for deserializing YAML scenarios: the child
//! process to spawn and the sequence of scripted turns to drive it with.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::{Pattern, Script, Turn};
use crate::common::{Error, Result};

/// A complete scripted session loaded from a YAML file
#[derive(Deserialize, Debug)]
pub struct Scenario {
    /// Name of the scenario
    pub name: String,
    /// Optional description of what the session verifies
    pub description: Option<String>,
    /// Canonical prompt token; repeated echoes collapse to a single one
    #[serde(default = "default_prompt")]
    pub prompt: String,
    /// Wall-clock budget for the whole run, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Configuration for the child process under test
    pub target: TargetConfig,
    /// The scripted turns, in order
    pub turns: Vec<TurnSpec>,
}

/// Configuration for the child process
#[derive(Deserialize, Debug)]
pub struct TargetConfig {
    /// Program to spawn
    pub program: PathBuf,
    /// Arguments; `{port}` is substituted with the configured port
    #[serde(default)]
    pub args: Vec<String>,
    /// Environment overrides, e.g. forcing simple line-input mode
    #[serde(default)]
    pub env: HashMap<String, String>,
}

/// One scripted turn as written in the scenario file
#[derive(Deserialize, Debug)]
pub struct TurnSpec {
    /// Input line to send when the turn is reached
    pub input: Option<String>,
    /// Ordered output patterns the turn must consume
    #[serde(default)]
    pub expect: Vec<Pattern>,
}

fn default_prompt() -> String {
    "debug> ".to_string()
}

fn default_timeout_secs() -> u64 {
    5
}

impl Scenario {
    /// Load and parse a scenario from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Scenario(format!("Failed to read scenario '{}': {}", path.display(), e))
        })?;
        let scenario: Scenario = serde_yaml::from_str(&content)
            .map_err(|e| Error::Scenario(format!("Failed to parse scenario: {}", e)))?;
        if scenario.turns.is_empty() {
            return Err(Error::Scenario("Scenario has no turns".to_string()));
        }
        Ok(scenario)
    }

    /// Build the turn queue from the parsed turn specs
    pub fn script(&self) -> Script {
        let mut script = Script::new();
        for spec in &self.turns {
            script.push(Turn::new(spec.input.clone(), spec.expect.clone()));
        }
        script
    }

    /// Resolve the target program path.
    ///
    /// A relative program that exists next to the scenario file is resolved
    /// against the scenario's directory; anything else is left untouched for
    /// PATH lookup.
    pub fn resolved_program(&self, scenario_dir: &Path) -> PathBuf {
        if self.target.program.is_relative() {
            let candidate = scenario_dir.join(&self.target.program);
            if candidate.exists() {
                return candidate;
            }
        }
        self.target.program.clone()
    }

    /// Argument list with the `{port}` placeholder substituted
    pub fn resolved_args(&self, port: u16) -> Vec<String> {
        self.target
            .args
            .iter()
            .map(|a| a.replace("{port}", &port.to_string()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO: &str = r#"
name: walkthrough
description: step through breakpoints
target:
  program: node
  args: ["debug", "--port={port}", "fixtures/breakpoints.js"]
  env:
    NODE_FORCE_READLINE: "1"
turns:
  - expect:
      - 'listening on port \d+'
      - 'connecting\.\.\. ok'
      - 'break in .*:1'
  - input: n
    expect:
      - 'debug> n'
      - 'break in .*:11'
  - input: ""
"#;

    #[test]
    fn parses_scenario_yaml() {
        let scenario: Scenario = serde_yaml::from_str(SCENARIO).unwrap();
        assert_eq!(scenario.name, "walkthrough");
        assert_eq!(scenario.prompt, "debug> ");
        assert_eq!(scenario.timeout_secs, 5);
        assert_eq!(scenario.turns.len(), 3);
        assert_eq!(scenario.turns[1].input.as_deref(), Some("n"));
        assert!(scenario.turns[2].expect.is_empty());
        assert_eq!(
            scenario.target.env.get("NODE_FORCE_READLINE").map(String::as_str),
            Some("1")
        );
    }

    #[test]
    fn substitutes_port_placeholder() {
        let scenario: Scenario = serde_yaml::from_str(SCENARIO).unwrap();
        let args = scenario.resolved_args(13683);
        assert_eq!(args[1], "--port=13683");
    }

    #[test]
    fn rejects_bad_pattern_in_yaml() {
        let bad = r#"
name: bad
target:
  program: node
turns:
  - expect: ['break in (']
"#;
        assert!(serde_yaml::from_str::<Scenario>(bad).is_err());
    }
}
