// SPDX-License-Identifier: Apache-2.0

use std::io::Write;
use std::path::Path;

use anyhow::Context;
use qlsynth::{quote_path, DesignHandle, Invocation};


/// Stands in for a design by writing the commands that would be run against
/// it into a Yosys script.
#[derive(Debug, Default)]
pub struct ScriptFile {
    reads: Vec<String>,
    commands: Vec<String>,
}

impl ScriptFile {
    pub fn new(inputs: &[String]) -> Self {
        ScriptFile {
            reads: inputs
                .iter()
                .map(|input| format!("read_verilog {}", quote_path(input)))
                .collect(),
            commands: Vec::new(),
        }
    }

    pub fn record(&mut self, invocation: &Invocation) -> Result<(), String> {
        self.commands.push(invocation.command().to_string());
        Ok(())
    }

    pub fn render(&self, header: &str) -> String {
        let mut text = format!("# {}\n", header);
        for line in self.reads.iter().chain(self.commands.iter()) {
            text.push_str(line);
            text.push('\n');
        }
        text
    }

    /// Writes the script next to `path` first and renames it into place, so
    /// an interrupted run never leaves a truncated script behind.
    pub fn write_to(&self, path: &Path, header: &str) -> anyhow::Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir)
            .with_context(|| format!("creating temporary file in {}", dir.display()))?;
        tmp.write_all(self.render(header).as_bytes())
            .context("writing script")?;
        tmp.persist(path)
            .with_context(|| format!("writing script to {}", path.display()))?;
        log::info!(
            "wrote {} commands to {}",
            self.reads.len() + self.commands.len(),
            path.display()
        );
        Ok(())
    }
}

impl DesignHandle for ScriptFile {
    fn check_ready(&self) -> Result<(), String> {
        Ok(())
    }
}
