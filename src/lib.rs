// SPDX-License-Identifier: Apache-2.0

//! Staged synthesis scripts for QuickLogic FPGA families.
//!
//! A `Configuration` is resolved from `SynthOptions`, a `Script` of sixteen
//! labeled stages is built from it, and a `ScriptExecutor` runs (or lists) a
//! `RunRange` of those stages against a caller-owned design through an
//! `OperationInvoker`.

pub mod bram_types;
pub mod config;
pub mod dsp;
pub mod executor;
pub mod family;
pub mod flip_flops;
pub mod guard;
pub mod invoker;
pub mod qlsynth_error;
pub mod run_range;
pub mod script;
mod synth_quicklogic;

pub use config::{Configuration, Flag, Flags, OutputFormat, ScriptMode, SynthOptions, TopModule};
pub use executor::{Outcome, RunState, ScriptExecutor, Transcript, TranscriptEntry};
pub use family::Family;
pub use guard::Guard;
pub use invoker::{DesignHandle, OperationInvoker};
pub use qlsynth_error::{ErrorKind, QlsynthError};
pub use run_range::RunRange;
pub use script::{quote_path, Invocation, Script, Stage, STAGE_LABELS};

/// Resolves `options`, builds the script and runs `range` of it against
/// `design`. Returns the transcript of a completed run.
pub fn synthesize<D, I>(
    options: &SynthOptions,
    range: &RunRange,
    design: &mut D,
    invoker: &mut I,
) -> Result<Transcript, QlsynthError>
where
    D: DesignHandle + ?Sized,
    I: OperationInvoker<D> + ?Sized,
{
    let config = Configuration::resolve(options)?;
    let script = Script::build(&config);
    let mut executor = ScriptExecutor::new(&script, range)?;
    executor.run(design, invoker)?;
    Ok(executor.into_transcript())
}
