// SPDX-License-Identifier: Apache-2.0

use std::process::Command;

use pretty_assertions::assert_eq;
use test_case::test_case;

const DRIVER: &str = env!("CARGO_BIN_EXE_qlsynth-driver");

fn run_driver(dir: &std::path::Path, args: &[&str]) -> std::process::Output {
    Command::new(DRIVER)
        .current_dir(dir)
        .args(args)
        .output()
        .expect("run driver")
}

#[test]
fn test_explain_lists_annotated_candidates() {
    let tmp = qlsynth_test_helpers::make_test_tmpdir("qlsynth_explain");
    let output = run_driver(
        tmp.path(),
        &["synth", "--family", "qlf_k4n8", "--explain", "--run", "iomap:finalize"],
    );
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("iomap:\n"), "stdout: {}", stdout);
    assert!(stdout.contains("    clkbufmap -inpad ckpad Q:P    (for pp3)\n"));
    assert!(stdout.contains("\nfinalize:\n"));
    assert!(stdout.contains("(for pp3 or if -edif)"));
    assert!(!stdout.contains("blif:"));
}

#[test]
fn test_script_out_writes_reads_and_commands() {
    let tmp = qlsynth_test_helpers::make_test_tmpdir("qlsynth_script_out");
    let output = run_driver(
        tmp.path(),
        &[
            "synth",
            "--family",
            "qlf_k6n10",
            "--top",
            "counter",
            "--verilog",
            "out.v",
            "--script_out",
            "synth.ys",
            "counter.v",
        ],
    );
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let script = std::fs::read_to_string(tmp.path().join("synth.ys")).expect("read script");
    let lines: Vec<&str> = script.lines().collect();
    assert!(lines[0].starts_with("# generated by qlsynth-driver"));
    assert!(lines[0].ends_with("family: qlf_k6n10 run: :"));
    assert_eq!(lines[1], "read_verilog counter.v");
    assert_eq!(
        lines[2],
        "read_verilog -lib -specify -nomem2reg +/quicklogic/common/cells_sim.v \
         +/quicklogic/qlf_k6n10/cells_sim.v"
    );
    assert_eq!(lines[3], "hierarchy -check -top counter");
    assert_eq!(lines.last(), Some(&"write_verilog -noattr -nohex out.v"));
    assert!(lines.contains(&"ql_dsp"));
}

#[test]
fn test_script_out_quotes_paths_with_spaces() {
    let tmp = qlsynth_test_helpers::make_test_tmpdir("qlsynth_script_out_spaces");
    let output = run_driver(
        tmp.path(),
        &[
            "synth",
            "--run",
            "verilog",
            "--verilog",
            "my out.v",
            "--script_out",
            "verilog.ys",
            "my in.v",
        ],
    );
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let script = std::fs::read_to_string(tmp.path().join("verilog.ys")).unwrap();
    let lines: Vec<&str> = script.lines().skip(1).collect();
    assert_eq!(
        lines,
        vec![
            "read_verilog \"my in.v\"",
            "write_verilog -noattr -nohex \"my out.v\"",
        ]
    );
}

#[test]
fn test_toolchain_file_in_working_directory() {
    let tmp = qlsynth_test_helpers::make_test_tmpdir("qlsynth_toolchain");
    std::fs::write(
        tmp.path().join("qlsynth-toolchain.toml"),
        "[toolchain]\ndefault_family = \"pp3\"\nlib_path = \"/opt/ql\"\n",
    )
    .unwrap();
    let output = run_driver(
        tmp.path(),
        &["synth", "--run", "begin", "--script_out", "begin.ys"],
    );
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let script = std::fs::read_to_string(tmp.path().join("begin.ys")).unwrap();
    let lines: Vec<&str> = script.lines().skip(1).collect();
    assert_eq!(
        lines,
        vec![
            "read_verilog -lib -specify -nomem2reg /opt/ql/common/cells_sim.v /opt/ql/pp3/cells_sim.v",
            "hierarchy -check -auto-top",
        ]
    );
}

#[test_case(&["synth", "--family", "ice40", "--explain"], "invalid family specified: 'ice40'"; "unknown family")]
#[test_case(&["synth", "--run", "stageX", "--explain"], "unknown stage label: 'stageX'"; "unknown label")]
#[test_case(&["synth", "--run", "verilog:begin", "--explain"], "comes after end"; "inverted range")]
#[test_case(&["synth", "--script_out", "out.ys", "--family", "qlf_k5"], "qlf_k5"; "unknown family no script")]
fn test_configuration_errors_exit_nonzero(args: &[&str], want: &str) {
    let tmp = qlsynth_test_helpers::make_test_tmpdir("qlsynth_config_error");
    let output = run_driver(tmp.path(), args);
    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains(want), "stderr: {}", stderr);
    assert!(output.stdout.is_empty());
    assert!(!tmp.path().join("out.ys").exists());
}

#[test]
fn test_missing_toolchain_file() {
    let tmp = qlsynth_test_helpers::make_test_tmpdir("qlsynth_missing_toolchain");
    let output = run_driver(
        tmp.path(),
        &["--toolchain", "nope.toml", "stages"],
    );
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("toolchain toml file does not exist"));
}

#[test]
fn test_stages_listing() {
    let tmp = qlsynth_test_helpers::make_test_tmpdir("qlsynth_stages");
    let output = run_driver(tmp.path(), &["stages"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let labels: Vec<&str> = stdout.lines().collect();
    assert_eq!(labels, qlsynth::STAGE_LABELS.to_vec());
}

#[test]
fn test_families_listing() {
    let tmp = qlsynth_test_helpers::make_test_tmpdir("qlsynth_families");
    let output = run_driver(tmp.path(), &["families"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let rows: Vec<&str> = stdout.lines().skip(1).collect();
    assert_eq!(rows.len(), 4);
    assert!(rows[1].starts_with("qlf_k4n8"));
    assert!(rows[1].contains("8..8"));
}
