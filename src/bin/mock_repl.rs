//! Mock debugger REPL binary for integration testing
//!
//! Speaks just enough of a prompt-driven debugger protocol to exercise the
//! harness without a real debugger: a startup banner, echoed commands with
//! break locations, and a handful of misbehaving modes.

use std::io::{BufRead, BufReader, Write};

enum Mode {
    /// Well-behaved walkthrough
    Scripted,
    /// Banner, then every command gets an unrelated reply
    Garbage,
    /// No output at all; block until killed
    Silent,
    /// Silent and ignoring interrupts; only a termination signal stops it
    Stubborn,
    /// Print one banner line and exit cleanly
    ExitEarly,
    /// Scripted, but with escape sequences and stuttered prompt echoes
    Noisy,
}

fn main() {
    let mut mode = Mode::Scripted;
    let mut port = 5858u16;

    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--garbage" => mode = Mode::Garbage,
            "--silent" => mode = Mode::Silent,
            "--stubborn" => mode = Mode::Stubborn,
            "--exit-early" => mode = Mode::ExitEarly,
            "--noisy" => mode = Mode::Noisy,
            other => {
                if let Some(p) = other.strip_prefix("--port=") {
                    port = p.parse().unwrap_or(port);
                }
            }
        }
    }

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut reader = BufReader::new(stdin.lock());
    let mut out = stdout.lock();

    match mode {
        Mode::Silent | Mode::Stubborn => {
            if matches!(mode, Mode::Stubborn) {
                ignore_interrupts();
            }
            // Never write; the harness has to time out and kill us
            let mut sink = String::new();
            while reader.read_line(&mut sink).unwrap_or(0) > 0 {
                sink.clear();
            }
            std::thread::sleep(std::time::Duration::from_secs(60));
        }
        Mode::ExitEarly => {
            emit(&mut out, &format!("listening on port {port}"));
        }
        Mode::Garbage => {
            banner(&mut out, port, false);
            let mut line = String::new();
            while reader.read_line(&mut line).unwrap_or(0) > 0 {
                if line.trim_end() == "quit" {
                    return;
                }
                emit(&mut out, "garbage from the child");
                line.clear();
            }
        }
        Mode::Scripted | Mode::Noisy => {
            let noisy = matches!(mode, Mode::Noisy);
            banner(&mut out, port, noisy);
            let mut last = String::new();
            let mut line = String::new();
            while reader.read_line(&mut line).unwrap_or(0) > 0 {
                let mut cmd = line.trim_end().to_string();
                line.clear();
                if cmd.is_empty() {
                    // Empty input repeats the last command
                    cmd = last.clone();
                    if cmd.is_empty() {
                        continue;
                    }
                }
                if cmd == "quit" {
                    return;
                }
                respond(&mut out, &cmd, noisy);
                last = cmd;
            }
        }
    }
}

fn banner<W: Write>(out: &mut W, port: u16, noisy: bool) {
    if noisy {
        emit(out, &format!("\u{1b}[1mlistening on port {port}\u{1b}[0m"));
        emit(out, "connecting... \u{1b}[32mok\u{1b}[0m");
    } else {
        emit(out, &format!("listening on port {port}"));
        emit(out, "connecting... ok");
    }
    emit(out, "break in fixtures/breakpoints.js:1");
}

fn respond<W: Write>(out: &mut W, cmd: &str, noisy: bool) {
    let prompt = if noisy {
        "debug> debug> debug> "
    } else {
        "debug> "
    };
    emit(out, &format!("{prompt}{cmd}"));
    match cmd {
        "n" => emit(out, "break in fixtures/breakpoints.js:11"),
        "c" => emit(out, "break in fixtures/breakpoints.js:5"),
        "o" => emit(out, "break in fixtures/breakpoints.js:12"),
        _ => {}
    }
}

fn emit<W: Write>(out: &mut W, line: &str) {
    writeln!(out, "{line}").ok();
    out.flush().ok();
}

#[cfg(unix)]
fn ignore_interrupts() {
    unsafe {
        libc::signal(libc::SIGINT, libc::SIG_IGN);
    }
}

#[cfg(not(unix))]
fn ignore_interrupts() {}
