// SPDX-License-Identifier: Apache-2.0

//! Runs `synth` against a stand-in `yosys` written as a shell script. The
//! script logs every command it receives, answers `log` commands after a
//! prompt the way a non-echoing yosys shell does, and reports an `ERROR:`
//! for the command named in its `fail_on` file.

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::process::Command;
use std::sync::Mutex;

use pretty_assertions::assert_eq;

const DRIVER: &str = env!("CARGO_BIN_EXE_qlsynth-driver");

const FAKE_YOSYS: &str = r#"#!/bin/sh
dir=$(dirname "$0")
fail_on=$(cat "$dir/fail_on" 2>/dev/null)
while IFS= read -r line; do
  printf '%s\n' "$line" >> "$dir/commands.log"
  case "$line" in
    "log "*) printf '\nyosys> %s\n' "${line#log }" ;;
    exit) exit 0 ;;
    *)
      if [ "$line" = "$fail_on" ]; then
        printf 'ERROR: cannot run %s\n' "$line"
      else
        printf 'ok: %s\n' "$line"
      fi
      ;;
  esac
done
"#;

// Writing an executable while another thread forks can make exec fail with
// ETXTBSY, so these tests take turns.
static SERIAL: Mutex<()> = Mutex::new(());

fn install_fake_yosys(dir: &Path, fail_on: Option<&str>) {
    let yosys = dir.join("yosys");
    std::fs::write(&yosys, FAKE_YOSYS).unwrap();
    std::fs::set_permissions(&yosys, std::fs::Permissions::from_mode(0o755)).unwrap();
    if let Some(command) = fail_on {
        std::fs::write(dir.join("fail_on"), command).unwrap();
    }
    std::fs::write(
        dir.join("qlsynth-toolchain.toml"),
        format!("[toolchain]\nyosys_path = \"{}\"\n", yosys.display()),
    )
    .unwrap();
}

/// Commands the fake yosys received, without the acknowledgement markers.
fn received_commands(dir: &Path) -> Vec<String> {
    std::fs::read_to_string(dir.join("commands.log"))
        .unwrap()
        .lines()
        .filter(|line| !line.starts_with("log qlsynth-ack-"))
        .map(str::to_string)
        .collect()
}

fn run_driver(dir: &Path, args: &[&str]) -> std::process::Output {
    Command::new(DRIVER)
        .current_dir(dir)
        .args(args)
        .output()
        .expect("run driver")
}

#[test]
fn test_operation_error_aborts_and_writes_checkpoint() {
    let _serial = SERIAL.lock().unwrap_or_else(|e| e.into_inner());
    let tmp = qlsynth_test_helpers::make_test_tmpdir("qlsynth_yosys_abort");
    install_fake_yosys(tmp.path(), Some("stat"));

    let output = run_driver(
        tmp.path(),
        &[
            "synth",
            "--family",
            "qlf_k4n8",
            "--checkpoint",
            "work.il",
            "counter.v",
        ],
    );
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("operation failed in stage 'check': `stat`: cannot run stat"),
        "stderr: {}",
        stderr
    );
    assert!(stderr.contains("  stage:     check\n"), "stderr: {}", stderr);
    assert!(stderr.contains("  operation: stat\n"), "stderr: {}", stderr);

    let commands = received_commands(tmp.path());
    assert_eq!(commands[0], "read_verilog counter.v");
    let stat = commands.iter().position(|c| c == "stat").unwrap();
    assert_eq!(
        &commands[stat..],
        &["stat", "write_rtlil work.il", "exit"].map(String::from)
    );
    assert!(!commands.iter().any(|c| c == "check -noinit"));
}

#[test]
fn test_resume_range_from_checkpoint() {
    let _serial = SERIAL.lock().unwrap_or_else(|e| e.into_inner());
    let tmp = qlsynth_test_helpers::make_test_tmpdir("qlsynth_yosys_resume");
    install_fake_yosys(tmp.path(), None);
    std::fs::write(tmp.path().join("work.il"), "# saved design\n").unwrap();

    let output = run_driver(
        tmp.path(),
        &[
            "synth",
            "--family",
            "qlf_k4n8",
            "--checkpoint",
            "work.il",
            "--run",
            "check:check",
        ],
    );
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(
        received_commands(tmp.path()),
        vec![
            "read_rtlil work.il",
            "autoname",
            "hierarchy -check",
            "stat",
            "check -noinit",
            "write_rtlil work.il",
            "exit",
        ]
    );
}

#[test]
fn test_full_run_quotes_output_path() {
    let _serial = SERIAL.lock().unwrap_or_else(|e| e.into_inner());
    let tmp = qlsynth_test_helpers::make_test_tmpdir("qlsynth_yosys_full");
    install_fake_yosys(tmp.path(), None);

    let output = run_driver(
        tmp.path(),
        &[
            "synth",
            "--family",
            "qlf_k6n10f",
            "--verilog",
            "my out.v",
            "my counter.v",
        ],
    );
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let commands = received_commands(tmp.path());
    assert_eq!(commands[0], "read_verilog \"my counter.v\"");
    assert_eq!(
        &commands[commands.len() - 2..],
        &["write_verilog -noattr -nohex \"my out.v\"", "exit"].map(String::from)
    );
}

#[test]
fn test_no_design_is_precondition_error() {
    let _serial = SERIAL.lock().unwrap_or_else(|e| e.into_inner());
    let tmp = qlsynth_test_helpers::make_test_tmpdir("qlsynth_yosys_no_design");
    install_fake_yosys(tmp.path(), None);

    let output = run_driver(tmp.path(), &["synth", "--family", "pp3"]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("design precondition failed"), "stderr: {}", stderr);
    assert_eq!(received_commands(tmp.path()), vec!["exit"]);
}
