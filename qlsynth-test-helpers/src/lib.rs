// SPDX-License-Identifier: Apache-2.0

use qlsynth::{DesignHandle, Invocation, OperationInvoker};

/// In-memory stand-in for a design: remembers every command applied to it,
/// in order.
#[derive(Debug, Clone, Default)]
pub struct RecordingDesign {
    pub loaded: bool,
    pub applied: Vec<String>,
}

impl RecordingDesign {
    /// A design that has had its inputs read and is ready to be synthesized.
    pub fn loaded() -> Self {
        RecordingDesign {
            loaded: true,
            applied: Vec::new(),
        }
    }
}

impl DesignHandle for RecordingDesign {
    fn check_ready(&self) -> Result<(), String> {
        if self.loaded {
            Ok(())
        } else {
            Err("no input design has been read".to_string())
        }
    }
}

/// Applies invocations to a `RecordingDesign`, optionally failing the
/// `fail_at`-th one (1-based) without applying it.
#[derive(Debug, Clone, Default)]
pub struct RecordingInvoker {
    pub fail_at: Option<usize>,
    pub calls: usize,
}

impl RecordingInvoker {
    pub fn failing_at(n: usize) -> Self {
        RecordingInvoker {
            fail_at: Some(n),
            calls: 0,
        }
    }
}

impl OperationInvoker<RecordingDesign> for RecordingInvoker {
    fn invoke(
        &mut self,
        design: &mut RecordingDesign,
        invocation: &Invocation,
    ) -> Result<(), String> {
        self.calls += 1;
        if self.fail_at == Some(self.calls) {
            log::info!("injecting failure at operation {}", self.calls);
            return Err(format!("injected failure in `{}`", invocation.name()));
        }
        design.applied.push(invocation.command().to_string());
        Ok(())
    }
}

/// Creates a unique temporary directory for tests under the system temp dir,
/// using the provided base prefix combined with the process id and a nanosecond
/// timestamp.
///
/// The directory is cleaned up automatically when the returned `TempDir` is
/// dropped.
pub fn make_test_tmpdir(base_prefix: &str) -> tempfile::TempDir {
    let pid = std::process::id();
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let prefix = format!("{}_{}_{}", base_prefix, pid, nanos);
    tempfile::Builder::new()
        .prefix(&prefix)
        .tempdir_in(std::env::temp_dir())
        .expect("tempdir create")
}

/// Initializes `env_logger` for a test binary; later calls are no-ops.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
