// SPDX-License-Identifier: Apache-2.0

//! The materialized synthesis script: a fixed sequence of labeled stages,
//! each holding the guarded command invocations built for one
//! `Configuration`.

use crate::config::{Configuration, ScriptMode};
use crate::family::Family;
use crate::guard::Guard;

/// Stage labels in execution order. The order and the set of labels never
/// depend on the configuration; only the stage contents do.
pub const STAGE_LABELS: [&str; 16] = [
    "begin",
    "prepare",
    "map_dsp",
    "coarse",
    "map_bram",
    "map_ffram",
    "map_gates",
    "map_ffs",
    "map_luts",
    "map_cells",
    "check",
    "iomap",
    "finalize",
    "blif",
    "edif",
    "verilog",
];

/// Renders a file name as a single Yosys command argument, quoting it when
/// it contains whitespace.
pub fn quote_path(path: &str) -> String {
    if path.chars().any(char::is_whitespace) {
        format!("\"{}\"", path)
    } else {
        path.to_string()
    }
}

/// One call of a named operation with a literal argument string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    command: String,
    guard: Guard,
}

impl Invocation {
    pub fn new(command: impl Into<String>, guard: Guard) -> Self {
        Invocation {
            command: command.into(),
            guard,
        }
    }

    /// The full command line, operation name first.
    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn name(&self) -> &str {
        self.command
            .split_once(' ')
            .map_or(self.command.as_str(), |(name, _)| name)
    }

    pub fn args(&self) -> &str {
        self.command.split_once(' ').map_or("", |(_, args)| args)
    }

    pub fn guard(&self) -> &Guard {
        &self.guard
    }

    /// Human readable condition for explain listings; `None` when the
    /// invocation is unconditional.
    pub fn annotation(&self) -> Option<String> {
        if self.guard.is_always() {
            None
        } else {
            Some(self.guard.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    label: &'static str,
    invocations: Vec<Invocation>,
}

impl Stage {
    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn invocations(&self) -> &[Invocation] {
        &self.invocations
    }

    pub fn is_empty(&self) -> bool {
        self.invocations.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    mode: ScriptMode,
    stages: Vec<Stage>,
}

impl Script {
    /// Builds the synthesis script for `config`. Pure: no I/O, and the same
    /// configuration always yields the same invocations.
    pub fn build(config: &Configuration) -> Script {
        crate::synth_quicklogic::build_script(config)
    }

    pub fn mode(&self) -> ScriptMode {
        self.mode
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn stage(&self, label: &str) -> Option<&Stage> {
        self.stages.iter().find(|stage| stage.label == label)
    }

    pub fn labels(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.label).collect()
    }

    pub fn invocations(&self) -> impl Iterator<Item = &Invocation> {
        self.stages.iter().flat_map(|stage| stage.invocations.iter())
    }

    pub fn commands(&self) -> Vec<&str> {
        self.invocations().map(Invocation::command).collect()
    }
}

/// Accumulates stages while the stage content code walks every branch.
///
/// Each invocation records the conjunction of the guards of all enclosing
/// `when`/`for_each_family` scopes. `finish` then keeps all of them for
/// explain mode, or only those whose guard holds for execution, so both
/// modes come out of one walk.
pub(crate) struct ScriptBuilder<'a> {
    config: &'a Configuration,
    guards: Vec<Guard>,
    current: Vec<Invocation>,
    stages: Vec<Stage>,
}

impl<'a> ScriptBuilder<'a> {
    pub(crate) fn new(config: &'a Configuration) -> Self {
        ScriptBuilder {
            config,
            guards: Vec::new(),
            current: Vec::new(),
            stages: Vec::with_capacity(STAGE_LABELS.len()),
        }
    }

    pub(crate) fn config(&self) -> &'a Configuration {
        self.config
    }

    pub(crate) fn stage(&mut self, label: &'static str, body: impl FnOnce(&mut Self)) {
        debug_assert_eq!(
            Some(&label),
            STAGE_LABELS.get(self.stages.len()),
            "stages must be emitted in label order"
        );
        body(self);
        let invocations = std::mem::take(&mut self.current);
        self.stages.push(Stage { label, invocations });
    }

    pub(crate) fn run(&mut self, command: impl Into<String>) {
        let guard = self
            .guards
            .iter()
            .cloned()
            .fold(Guard::Always, |acc, g| acc.and(g));
        self.current.push(Invocation::new(command, guard));
    }

    pub(crate) fn run_if(&mut self, guard: Guard, command: impl Into<String>) {
        self.when(guard, |b| b.run(command));
    }

    pub(crate) fn when(&mut self, guard: Guard, body: impl FnOnce(&mut Self)) {
        self.guards.push(guard);
        body(self);
        self.guards.pop();
    }

    /// Runs `body` once per family in `families`, each under a guard pinning
    /// that family, so family-specific paths render with the family that
    /// would actually use them.
    pub(crate) fn for_each_family(
        &mut self,
        families: &[Family],
        mut body: impl FnMut(&mut Self, Family),
    ) {
        for &family in families {
            self.when(Guard::family(family), |b| body(b, family));
        }
    }

    pub(crate) fn finish(self) -> Script {
        let config = self.config;
        let mode = config.mode();
        let stages = match mode {
            ScriptMode::Explain => self.stages,
            ScriptMode::Execute => self
                .stages
                .into_iter()
                .map(|stage| Stage {
                    label: stage.label,
                    invocations: stage
                        .invocations
                        .into_iter()
                        .filter(|invocation| invocation.guard.holds(config))
                        .collect(),
                })
                .collect(),
        };
        Script { mode, stages }
    }
}
