// SPDX-License-Identifier: Apache-2.0

//! Runs (or lists) the selected stages of a `Script`.

use std::ops::RangeInclusive;

use crate::config::ScriptMode;
use crate::invoker::{DesignHandle, OperationInvoker};
use crate::qlsynth_error::QlsynthError;
use crate::run_range::RunRange;
use crate::script::{Invocation, Script, Stage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Pending,
    Running,
    Completed,
    /// Stopped at a failed precondition or operation; the design keeps
    /// whatever the operations before the failure did to it.
    Aborted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Recorded without being invoked (explain).
    Listed,
    Invoked,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    pub stage: &'static str,
    pub command: String,
    pub annotation: Option<String>,
    pub outcome: Outcome,
}

/// What a run did, stage by stage. Renders as an indented listing with one
/// header per stage that was reached, including empty ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    labels: Vec<&'static str>,
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn labels(&self) -> &[&'static str] {
        &self.labels
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn commands(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.command.as_str()).collect()
    }

    pub fn invoked_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.outcome == Outcome::Invoked)
            .count()
    }

    fn begin_stage(&mut self, label: &'static str) {
        self.labels.push(label);
    }

    fn record(&mut self, stage: &'static str, invocation: &Invocation, outcome: Outcome) {
        self.entries.push(TranscriptEntry {
            stage,
            command: invocation.command().to_string(),
            annotation: invocation.annotation(),
            outcome,
        });
    }
}

impl std::fmt::Display for Transcript {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for label in &self.labels {
            writeln!(f, "{}:", label)?;
            for entry in self.entries.iter().filter(|e| e.stage == *label) {
                write!(f, "    {}", entry.command)?;
                if let Some(annotation) = &entry.annotation {
                    write!(f, "    ({})", annotation)?;
                }
                if entry.outcome == Outcome::Failed {
                    write!(f, "    [FAILED]")?;
                }
                writeln!(f)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Drives one pass over the stages a `RunRange` selects from a script.
///
/// An executor runs at most once. The range is resolved up front, so an
/// unknown or inverted range is reported before anything happens.
pub struct ScriptExecutor<'s> {
    script: &'s Script,
    range: RangeInclusive<usize>,
    state: RunState,
    transcript: Transcript,
}

impl<'s> ScriptExecutor<'s> {
    pub fn new(script: &'s Script, range: &RunRange) -> Result<Self, QlsynthError> {
        let range = range.resolve(&script.labels())?;
        Ok(ScriptExecutor {
            script,
            range,
            state: RunState::Pending,
            transcript: Transcript::default(),
        })
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn selected_stages(&self) -> &'s [Stage] {
        self.script
            .stages()
            .get(self.range.clone())
            .unwrap_or(&[])
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn into_transcript(self) -> Transcript {
        self.transcript
    }

    fn start(&mut self) -> Result<(), QlsynthError> {
        if self.state != RunState::Pending {
            return Err(QlsynthError::Precondition(format!(
                "script executor already ran (state: {:?})",
                self.state
            )));
        }
        self.state = RunState::Running;
        Ok(())
    }

    fn list_selected(&mut self) {
        for stage in self.selected_stages() {
            self.transcript.begin_stage(stage.label());
            for invocation in stage.invocations() {
                self.transcript
                    .record(stage.label(), invocation, Outcome::Listed);
            }
        }
    }

    /// Records the selected invocations without invoking anything,
    /// whatever mode the script was built for.
    pub fn explain(&mut self) -> Result<&Transcript, QlsynthError> {
        self.start()?;
        self.list_selected();
        self.state = RunState::Completed;
        Ok(&self.transcript)
    }

    /// Runs the selected stages against `design`.
    ///
    /// For a script built in explain mode this only lists, and neither
    /// `design` nor `invoker` is touched. Otherwise the invocations run
    /// strictly in order and the first failure aborts the run in place.
    pub fn run<D, I>(&mut self, design: &mut D, invoker: &mut I) -> Result<(), QlsynthError>
    where
        D: DesignHandle + ?Sized,
        I: OperationInvoker<D> + ?Sized,
    {
        self.start()?;
        let stages = self.selected_stages();
        log::info!(
            "running stages {}..{} ({:?})",
            stages.first().map_or("", Stage::label),
            stages.last().map_or("", Stage::label),
            self.script.mode()
        );

        if self.script.mode() == ScriptMode::Explain {
            self.list_selected();
            self.state = RunState::Completed;
            return Ok(());
        }

        if let Err(message) = design.check_ready() {
            self.state = RunState::Aborted;
            return Err(QlsynthError::Precondition(message));
        }

        for stage in stages {
            log::info!("stage {}", stage.label());
            self.transcript.begin_stage(stage.label());
            for invocation in stage.invocations() {
                log::debug!("invoking: {}", invocation.command());
                match invoker.invoke(design, invocation) {
                    Ok(()) => {
                        self.transcript
                            .record(stage.label(), invocation, Outcome::Invoked);
                    }
                    Err(cause) => {
                        self.transcript
                            .record(stage.label(), invocation, Outcome::Failed);
                        self.state = RunState::Aborted;
                        return Err(QlsynthError::OperationFailed {
                            stage: stage.label(),
                            command: invocation.command().to_string(),
                            cause,
                        });
                    }
                }
            }
        }
        self.state = RunState::Completed;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Configuration, SynthOptions};
    use pretty_assertions::assert_eq;

    struct Design {
        ready: bool,
        applied: Vec<String>,
    }

    impl DesignHandle for Design {
        fn check_ready(&self) -> Result<(), String> {
            if self.ready {
                Ok(())
            } else {
                Err("no design loaded".to_string())
            }
        }
    }

    fn apply(design: &mut Design, invocation: &Invocation) -> Result<(), String> {
        design.applied.push(invocation.command().to_string());
        Ok(())
    }

    fn script(explain: bool) -> Script {
        let mut options = SynthOptions::for_family("pp3");
        options.explain = explain;
        Script::build(&Configuration::resolve(&options).unwrap())
    }

    #[test]
    fn test_run_applies_selected_stages_in_order() {
        let script = script(false);
        let mut executor = ScriptExecutor::new(&script, &RunRange::single("check")).unwrap();
        let mut design = Design {
            ready: true,
            applied: Vec::new(),
        };
        executor.run(&mut design, &mut apply).unwrap();
        assert_eq!(executor.state(), RunState::Completed);
        assert_eq!(
            design.applied,
            vec!["autoname", "hierarchy -check", "stat", "check -noinit"]
        );
        assert_eq!(executor.transcript().invoked_count(), 4);
        assert_eq!(executor.transcript().labels(), &["check"]);
    }

    #[test]
    fn test_explain_mode_never_touches_design() {
        let script = script(true);
        let mut executor = ScriptExecutor::new(&script, &RunRange::all()).unwrap();
        let mut design = Design {
            ready: false,
            applied: Vec::new(),
        };
        let mut invoker =
            |_: &mut Design, _: &Invocation| -> Result<(), String> { panic!("invoked") };
        executor.run(&mut design, &mut invoker).unwrap();
        assert_eq!(executor.state(), RunState::Completed);
        assert!(design.applied.is_empty());
        let transcript = executor.into_transcript();
        assert_eq!(transcript.invoked_count(), 0);
        assert_eq!(transcript.labels().len(), 16);
        assert!(transcript
            .entries()
            .iter()
            .all(|e| e.outcome == Outcome::Listed));
    }

    #[test]
    fn test_precondition_failure_aborts_before_any_invocation() {
        let script = script(false);
        let mut executor = ScriptExecutor::new(&script, &RunRange::all()).unwrap();
        let mut design = Design {
            ready: false,
            applied: Vec::new(),
        };
        let err = executor.run(&mut design, &mut apply).unwrap_err();
        assert_eq!(err, QlsynthError::Precondition("no design loaded".to_string()));
        assert_eq!(executor.state(), RunState::Aborted);
        assert!(design.applied.is_empty());
    }

    #[test]
    fn test_failure_stops_at_failing_operation() {
        let script = script(false);
        let mut executor = ScriptExecutor::new(&script, &RunRange::single("check")).unwrap();
        let mut design = Design {
            ready: true,
            applied: Vec::new(),
        };
        let mut invoker = |design: &mut Design, invocation: &Invocation| {
            if invocation.name() == "stat" {
                return Err("out of memory".to_string());
            }
            apply(design, invocation)
        };
        let err = executor.run(&mut design, &mut invoker).unwrap_err();
        assert_eq!(
            err,
            QlsynthError::OperationFailed {
                stage: "check",
                command: "stat".to_string(),
                cause: "out of memory".to_string(),
            }
        );
        assert_eq!(executor.state(), RunState::Aborted);
        assert_eq!(design.applied, vec!["autoname", "hierarchy -check"]);
        assert!(executor.transcript().to_string().contains("stat    [FAILED]"));
    }

    #[test]
    fn test_executor_runs_once() {
        let script = script(false);
        let mut executor = ScriptExecutor::new(&script, &RunRange::single("iomap")).unwrap();
        executor.explain().unwrap();
        let mut design = Design {
            ready: true,
            applied: Vec::new(),
        };
        let err = executor.run(&mut design, &mut apply).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Precondition);
        assert!(design.applied.is_empty());
    }

    #[test]
    fn test_transcript_listing() {
        let script = script(true);
        let mut executor = ScriptExecutor::new(&script, &RunRange::between("iomap", "blif")).unwrap();
        let listing = executor.explain().unwrap().to_string();
        let want = "iomap:
    clkbufmap -inpad ckpad Q:P    (for pp3)
    iopadmap -bits -outpad outpad A:P -inpad inpad Q:P -tinoutpad bipad EN:Q:A:P A:top    (for pp3)

finalize:
    setundef -zero -params -undriven    (for pp3)
    hilomap -hicell logic_1 a -locell logic_0 a -singleton A:top    (for pp3 or if -edif)
    opt_clean -purge
    check
    blackbox =A:whitebox

blif:
    write_blif -param <file-name>    (if -blif)

";
        assert_eq!(listing, want);
    }
}
