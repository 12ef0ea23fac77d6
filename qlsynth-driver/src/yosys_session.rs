// SPDX-License-Identifier: Apache-2.0

//! A long-lived `yosys` process that holds the design between commands.
//!
//! Commands go to the child's stdin one at a time. Each one is followed by a
//! `log` of a numbered marker; everything the child prints up to the marker
//! belongs to that command, and an `ERROR:` line among it means the command
//! failed. Keeping one process alive preserves selections and other state
//! that later commands of a stage rely on.

use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use anyhow::Context;
use once_cell::sync::Lazy;
use qlsynth::{quote_path, DesignHandle, Invocation, OperationInvoker};
use regex::Regex;

static ERROR_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*ERROR:\s*(.*)$").expect("error line regex"));

/// The interactive prompt (`yosys> `, `yosys [top]> `). Yosys prints it
/// without a newline, so when stdin is not echoed the next command's output
/// starts on the prompt line.
static PROMPT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^yosys(?: \[[^\]]*\])?> ").expect("prompt regex"));

const ACK_PREFIX: &str = "qlsynth-ack-";

#[derive(Debug, PartialEq, Eq)]
enum OutputLine<'a> {
    /// The marker for the current command; it is done.
    Ack,
    Error(&'a str),
    Other,
}

/// Classifies one line of yosys output while waiting for `marker`, ignoring
/// any leading prompts. The echoed `log <marker>` command is not an
/// acknowledgement.
fn classify_line<'a>(line: &'a str, marker: &str) -> OutputLine<'a> {
    let mut text = line;
    while let Some(found) = PROMPT.find(text) {
        text = &text[found.end()..];
    }
    if text.trim_end() == marker {
        return OutputLine::Ack;
    }
    match ERROR_LINE.captures(text) {
        Some(captures) => OutputLine::Error(captures.get(1).map_or("", |m| m.as_str().trim())),
        None => OutputLine::Other,
    }
}

pub struct YosysSession {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    commands_sent: usize,
    loaded: bool,
    /// Set once the child stopped answering; nothing more can run.
    broken: Option<String>,
}

impl YosysSession {
    pub fn spawn(yosys_path: &Path) -> anyhow::Result<Self> {
        log::info!("starting yosys session; binary: {}", yosys_path.display());
        let mut child = Command::new(yosys_path)
            .arg("-Q")
            .arg("-T")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .with_context(|| format!("failed to start yosys at {}", yosys_path.display()))?;
        let stdin = child.stdin.take().context("yosys stdin was not captured")?;
        let stdout = child.stdout.take().context("yosys stdout was not captured")?;
        Ok(YosysSession {
            child,
            stdin,
            stdout: BufReader::new(stdout),
            commands_sent: 0,
            loaded: false,
            broken: None,
        })
    }

    /// Runs one yosys command and waits for it to finish.
    pub fn execute(&mut self, command: &str) -> Result<(), String> {
        if let Some(reason) = &self.broken {
            return Err(reason.clone());
        }
        self.commands_sent += 1;
        let marker = format!("{}{}", ACK_PREFIX, self.commands_sent);
        log::debug!("yosys> {}", command);
        if let Err(e) = writeln!(self.stdin, "{}\nlog {}", command, marker)
            .and_then(|_| self.stdin.flush())
        {
            return Err(self.mark_broken(format!("cannot send command to yosys: {}", e)));
        }

        let mut error: Option<String> = None;
        let mut line = String::new();
        loop {
            line.clear();
            match self.stdout.read_line(&mut line) {
                Ok(0) => {
                    let reason = error
                        .take()
                        .unwrap_or_else(|| "yosys exited unexpectedly".to_string());
                    return Err(self.mark_broken(reason));
                }
                Ok(_) => {}
                Err(e) => return Err(self.mark_broken(format!("reading yosys output: {}", e))),
            }
            match classify_line(&line, &marker) {
                OutputLine::Ack => break,
                OutputLine::Error(message) => {
                    log::debug!("yosys: {}", line.trim_end());
                    error.get_or_insert_with(|| message.to_string());
                }
                OutputLine::Other => log::debug!("yosys: {}", line.trim_end()),
            }
        }
        match error {
            Some(message) => Err(message),
            None => Ok(()),
        }
    }

    fn mark_broken(&mut self, reason: String) -> String {
        self.broken = Some(reason.clone());
        reason
    }

    pub fn read_inputs(&mut self, inputs: &[String]) -> anyhow::Result<()> {
        for input in inputs {
            self.execute(&format!("read_verilog {}", quote_path(input)))
                .map_err(|e| anyhow::anyhow!(e))
                .with_context(|| format!("reading input {}", input))?;
        }
        self.loaded = !inputs.is_empty();
        Ok(())
    }

    pub fn read_checkpoint(&mut self, path: &str) -> anyhow::Result<()> {
        self.execute(&format!("read_rtlil {}", quote_path(path)))
            .map_err(|e| anyhow::anyhow!(e))
            .with_context(|| format!("reading checkpoint {}", path))?;
        self.loaded = true;
        Ok(())
    }

    pub fn write_checkpoint(&mut self, path: &str) -> anyhow::Result<()> {
        log::info!("writing checkpoint to {}", path);
        self.execute(&format!("write_rtlil {}", quote_path(path)))
            .map_err(|e| anyhow::anyhow!(e))
            .with_context(|| format!("writing checkpoint {}", path))
    }

    /// Asks yosys to exit and waits for it.
    pub fn finish(mut self) -> anyhow::Result<()> {
        if self.broken.is_none() {
            // A child that already went away makes this write fail; the
            // status check below reports that.
            let _ = writeln!(self.stdin, "exit").and_then(|_| self.stdin.flush());
        }
        drop(self.stdin);
        let status = self.child.wait().context("waiting for yosys to exit")?;
        if !status.success() && self.broken.is_none() {
            anyhow::bail!("yosys exited with status {}", status);
        }
        Ok(())
    }
}

impl DesignHandle for YosysSession {
    fn check_ready(&self) -> Result<(), String> {
        if let Some(reason) = &self.broken {
            return Err(reason.clone());
        }
        if !self.loaded {
            return Err("no input files or checkpoint were read".to_string());
        }
        Ok(())
    }
}

/// Sends each invocation to the session verbatim.
pub struct YosysInvoker;

impl OperationInvoker<YosysSession> for YosysInvoker {
    fn invoke(&mut self, session: &mut YosysSession, invocation: &Invocation) -> Result<(), String> {
        session.execute(invocation.command())
    }
}
