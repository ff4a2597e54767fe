//! Process lifecycle and the run loop
//!
//! The session owns the child process, its stream handles, the line reader
//! and the interaction engine. One `select!` loop processes events strictly
//! in arrival order on a single logical control thread: child output chunks
//! and the deadline timer. Termination is requested on every exit path.

use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use colored::Colorize;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};

use crate::common::{Error, Result};
use crate::script::Scenario;

use super::engine::Engine;
use super::reader::LineReader;
use super::supervisor;

/// How long to wait for an exit status once the child closes its stdout
const EOF_REAP_TIMEOUT: Duration = Duration::from_secs(2);

/// One scripted run against a spawned child process
pub struct Session {
    child: Child,
    stdin: ChildStdin,
    stdout: ChildStdout,
    engine: Engine,
    reader: LineReader,
    timeout: Duration,
    quit_sent: bool,
}

impl Session {
    /// Spawn the child described by the scenario and wire up its streams.
    ///
    /// stdout feeds the line reader, stdin is the engine's write path, and
    /// stderr goes straight to the parent's diagnostic output.
    pub fn spawn(scenario: &Scenario, scenario_dir: &Path, port: u16) -> Result<Self> {
        let program = scenario.resolved_program(scenario_dir);
        let args = scenario.resolved_args(port);

        tracing::info!(program = %program.display(), ?args, "spawning child");

        let mut child = Command::new(&program)
            .args(&args)
            .envs(&scenario.target.env)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Error::Spawn {
                program: program.display().to_string(),
                source: e,
            })?;

        let stdin = child.stdin.take().ok_or_else(|| {
            Error::Spawn {
                program: program.display().to_string(),
                source: std::io::Error::other("failed to capture child stdin"),
            }
        })?;
        let stdout = child.stdout.take().ok_or_else(|| {
            Error::Spawn {
                program: program.display().to_string(),
                source: std::io::Error::other("failed to capture child stdout"),
            }
        })?;

        Ok(Self {
            child,
            stdin,
            stdout,
            engine: Engine::new(scenario.script()),
            reader: LineReader::new(&scenario.prompt)?,
            timeout: Duration::from_secs(scenario.timeout_secs),
            quit_sent: false,
        })
    }

    /// Drive the scripted session to completion.
    ///
    /// Termination is requested on every exit path: the interrupt sequence
    /// on success, an idempotent quit plus interrupt on failure.
    pub async fn run(mut self) -> Result<()> {
        let result = self.drive().await;
        match &result {
            Ok(()) => self.finish().await,
            Err(Error::Timeout { .. }) => {} // escalation already ran
            Err(_) => self.abort().await,
        }
        result
    }

    async fn drive(&mut self) -> Result<()> {
        let start = self.engine.start();
        for input in &start.inputs {
            self.send_line(input).await?;
        }
        if start.finished {
            return Ok(());
        }

        let deadline = tokio::time::sleep(self.timeout);
        tokio::pin!(deadline);
        let mut buf = [0u8; 4096];

        loop {
            tokio::select! {
                read = self.stdout.read(&mut buf) => {
                    let n = read?;
                    if n == 0 {
                        // Child closed its stdout; the exit status decides
                        // whether a non-empty queue is a failure.
                        let status = self.reap_status().await?;
                        return self.check_exit(status);
                    }
                    for line in self.reader.push(&buf[..n]) {
                        eprintln!("{} {}", "line>".dimmed(), line);
                        tracing::debug!(%line, "line");
                        let advance = self.engine.on_line(&line)?;
                        for input in &advance.inputs {
                            self.send_line(input).await?;
                        }
                        if advance.finished {
                            return Ok(());
                        }
                    }
                }
                () = &mut deadline => {
                    return Err(self.on_timeout().await);
                }
            }
        }
    }

    /// Send one input line, honoring write backpressure: the awaits resolve
    /// only once the pipe accepted the bytes, and the trailing yield makes
    /// sure advancement runs on a fresh tick rather than re-entrantly.
    async fn send_line(&mut self, input: &str) -> Result<()> {
        tracing::debug!(%input, "send");
        self.stdin.write_all(input.as_bytes()).await?;
        self.stdin.write_all(b"\n").await?;
        self.stdin.flush().await?;
        tokio::task::yield_now().await;
        Ok(())
    }

    /// Issue the `quit` command at most once per run
    async fn quit(&mut self) {
        if self.quit_sent {
            return;
        }
        self.quit_sent = true;
        let _ = self.stdin.write_all(b"quit\n").await;
        let _ = self.stdin.flush().await;
    }

    fn check_exit(&self, status: ExitStatus) -> Result<()> {
        if !status.success() {
            return Err(Error::ChildExited {
                code: status.code(),
            });
        }
        if self.engine.is_idle() {
            Ok(())
        } else {
            // A clean exit with expectations still pending is itself a
            // failure signal.
            Err(Error::QueueNotDrained {
                remaining: self.engine.remaining(),
            })
        }
    }

    async fn reap_status(&mut self) -> Result<ExitStatus> {
        match tokio::time::timeout(EOF_REAP_TIMEOUT, self.child.wait()).await {
            Ok(status) => Ok(status?),
            Err(_) => {
                supervisor::terminate(&mut self.child);
                Ok(self.child.wait().await?)
            }
        }
    }

    /// The timeout path: capture the first unmet pattern for the diagnostic,
    /// then run the escalating cancellation sequence.
    async fn on_timeout(&mut self) -> Error {
        let pending = self
            .engine
            .pending_pattern()
            .map(|p| p.as_str().to_string())
            .unwrap_or_else(|| "<none>".to_string());
        tracing::warn!(%pending, "run timed out, escalating");
        self.quit().await;
        supervisor::escalate(&mut self.child).await;
        Error::Timeout {
            secs: self.timeout.as_secs(),
            pending,
        }
    }

    /// Normal completion: leave the interactive sub-prompt, the REPL, then
    /// the debugger itself.
    async fn finish(&mut self) {
        supervisor::interrupt(&mut self.child);
        supervisor::interrupt(&mut self.child);
        supervisor::interrupt(&mut self.child);
        supervisor::reap(&mut self.child).await;
    }

    /// Failure cleanup: ask the child to quit, then interrupt and reap it
    async fn abort(&mut self) {
        self.quit().await;
        supervisor::interrupt(&mut self.child);
        supervisor::reap(&mut self.child).await;
    }
}

/// Load a scenario file and run it to completion
pub async fn run_scenario(path: &Path, port: u16, timeout_secs: Option<u64>) -> Result<()> {
    let mut scenario = Scenario::load(path)?;
    if let Some(secs) = timeout_secs {
        scenario.timeout_secs = secs;
    }

    println!(
        "\n{} {}",
        "Running Scenario:".blue().bold(),
        scenario.name.white().bold()
    );
    if let Some(desc) = &scenario.description {
        println!("  {}", desc.dimmed());
    }

    let turns = scenario.turns.len();
    let scenario_dir = path.parent().unwrap_or(Path::new("."));
    let session = Session::spawn(&scenario, scenario_dir, port)?;
    session.run().await?;

    println!(
        "\n{} {}\n",
        "✓".green().bold(),
        format!("Scenario passed ({} turns)", turns).green().bold()
    );

    Ok(())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn cat_scenario() -> Scenario {
        serde_yaml::from_str(
            r#"
name: cat
target:
  program: cat
turns:
  - expect: ['quit']
"#,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn quit_is_idempotent() {
        let mut session = Session::spawn(&cat_scenario(), Path::new("."), 0).unwrap();
        session.quit().await;
        session.quit().await;

        let Session {
            mut child,
            stdin,
            mut stdout,
            ..
        } = session;
        drop(stdin); // close the pipe so cat exits

        let mut echoed = String::new();
        stdout.read_to_string(&mut echoed).await.unwrap();
        assert_eq!(echoed, "quit\n");
        assert!(child.wait().await.unwrap().success());
    }

    #[tokio::test]
    async fn send_line_completes_after_drain() {
        let mut session = Session::spawn(&cat_scenario(), Path::new("."), 0).unwrap();
        session.send_line("n").await.unwrap();

        let Session {
            mut child,
            stdin,
            mut stdout,
            ..
        } = session;
        drop(stdin);

        let mut echoed = String::new();
        stdout.read_to_string(&mut echoed).await.unwrap();
        assert_eq!(echoed, "n\n");
        let _ = child.wait().await;
    }
}
