// SPDX-License-Identifier: Apache-2.0

//! Command line driver that runs the staged QuickLogic synthesis script.
//!
//! Commands are given like:
//!
//! ```text
//! qlsynth-driver <global-options> <command> <command-args-and-options>
//! ```
//!
//! Commands are:
//!
//! - synth: Synthesizes Verilog inputs for a QuickLogic family with yosys,
//!   writes the script that would do so (`--script_out`), or lists every
//!   candidate operation with its condition (`--explain`).
//! - stages: Lists the stage labels accepted by `synth --run`.
//! - families: Lists the supported families and their capabilities.
//!
//! Sample usage:
//!
//! ```shell
//! $ cargo run -- --toolchain=$HOME/qlsynth-toolchain.toml \
//!     synth --family qlf_k6n10f --top counter --verilog out.v counter.v
//! $ cargo run -- synth --family pp3 --explain --run map_ffs:map_luts
//! $ cargo run -- synth --checkpoint work.il --run :map_bram counter.v
//! $ cargo run -- synth --checkpoint work.il --run map_ffram: --blif out.blif
//! ```

mod common;
mod report_cli_error;
mod script_file;
mod synth;
mod toolchain_config;
mod yosys_session;

use crate::toolchain_config::{ToolchainConfig, DEFAULT_TOOLCHAIN_FILE};
use clap::{Arg, ArgAction};
use qlsynth::{Family, Flag, OutputFormat, STAGE_LABELS};
use report_cli_error::report_cli_error_and_exit;
use serde::Deserialize;

#[derive(Deserialize)]
struct QlsynthToolchain {
    toolchain: ToolchainConfig,
}

trait AppExt {
    fn add_target_args(self) -> Self;
    fn add_flag_switches(self) -> Self;
    fn add_output_args(self) -> Self;
    fn add_switch(self, long: &'static str, help: &'static str) -> Self;
}

impl AppExt for clap::Command {
    fn add_target_args(self) -> Self {
        (self as clap::Command)
            .arg(
                Arg::new("top")
                    .long("top")
                    .value_name("TOP")
                    .help("Use the specified module as top module (default: auto-detect)")
                    .action(ArgAction::Set),
            )
            .arg(
                Arg::new("family")
                    .long("family")
                    .value_name("FAMILY")
                    .help("Target architecture family: pp3, qlf_k4n8, qlf_k6n10 or qlf_k6n10f (default: qlf_k4n8)")
                    .action(ArgAction::Set),
            )
            .arg(
                Arg::new("lib_path")
                    .long("lib_path")
                    .value_name("LIB_PATH")
                    .help("Root of the QuickLogic cell libraries (default: +/quicklogic/)")
                    .action(ArgAction::Set),
            )
            .arg(
                Arg::new("abc9_delay_ps")
                    .long("abc9_delay_ps")
                    .value_name("PS")
                    .help("ABC9 delay target in picoseconds (default: 500)")
                    .value_parser(clap::value_parser!(u32))
                    .action(ArgAction::Set),
            )
    }

    fn add_flag_switches(self) -> Self {
        Flag::ALL
            .iter()
            .fold(self, |command, flag| {
                command.add_switch(flag.option_name(), flag.help())
            })
    }

    fn add_output_args(self) -> Self {
        OutputFormat::ALL.iter().fold(self, |command, format| {
            command.arg(
                Arg::new(format.option_name())
                    .long(format.option_name())
                    .value_name("FILE")
                    .help(format!(
                        "Write the synthesized design in {} format to FILE",
                        format.option_name()
                    ))
                    .action(ArgAction::Set),
            )
        })
    }

    fn add_switch(self, long: &'static str, help: &'static str) -> Self {
        (self as clap::Command).arg(
            Arg::new(long)
                .long(long)
                .action(ArgAction::SetTrue)
                .help(help),
        )
    }
}

fn load_toolchain(matches: &clap::ArgMatches) -> Option<ToolchainConfig> {
    let mut toml_path: Option<String> = matches
        .get_one::<String>("toolchain")
        .map(|s| s.to_string());

    // If there is no toolchain flag specified, but there is a
    // qlsynth-toolchain.toml in the current directory, use that.
    if toml_path.is_none() {
        let cwd_toml_path = std::path::Path::new(DEFAULT_TOOLCHAIN_FILE);
        if cwd_toml_path.exists() {
            log::info!(
                "Using {} in current directory",
                DEFAULT_TOOLCHAIN_FILE
            );
            toml_path = Some(DEFAULT_TOOLCHAIN_FILE.to_string());
        }
    }

    toml_path.map(|path| {
        if !std::path::Path::new(&path).exists() {
            let cwd = std::env::current_dir()
                .map(|dir| dir.display().to_string())
                .unwrap_or_default();
            report_cli_error_and_exit(
                "toolchain toml file does not exist",
                None,
                vec![("path", path.as_str()), ("working directory", cwd.as_str())],
            );
        }
        let toml_str = match std::fs::read_to_string(&path) {
            Ok(s) => s,
            Err(e) => report_cli_error_and_exit(
                "could not read toolchain toml file",
                None,
                vec![("path", path.as_str()), ("error", e.to_string().as_str())],
            ),
        };
        match toml::from_str::<QlsynthToolchain>(&toml_str) {
            Ok(toolchain) => toolchain.toolchain,
            Err(e) => report_cli_error_and_exit(
                "could not parse toolchain toml file",
                None,
                vec![("path", path.as_str()), ("error", e.to_string().as_str())],
            ),
        }
    })
}

fn print_families() {
    let yes_no = |b: bool| if b { "yes" } else { "no" };
    println!(
        "{:<12} {:<4} {:<5} {:<6} {:<9}",
        "family", "dsp", "bram", "adder", "shregmap"
    );
    for family in Family::ALL {
        let shregmap = match family.shift_register_bounds() {
            Some(bounds) => format!("{}..{}", bounds.min_len, bounds.max_len),
            None => "-".to_string(),
        };
        println!(
            "{:<12} {:<4} {:<5} {:<6} {:<9}",
            family.name(),
            yes_no(family.has_dsp()),
            yes_no(family.has_bram()),
            yes_no(family.has_adder_map()),
            shregmap
        );
    }
}

fn main() {
    let _ = env_logger::try_init();

    log::info!(
        "qlsynth-driver starting; version: {}",
        env!("CARGO_PKG_VERSION")
    );

    let matches = clap::Command::new("qlsynth-driver")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Command line driver for staged QuickLogic synthesis")
        .arg(
            Arg::new("toolchain")
                .long("toolchain")
                .value_name("TOOLCHAIN")
                .help("Path to a qlsynth-toolchain.toml file")
                .action(ArgAction::Set),
        )
        .subcommand(clap::Command::new("version").about("Prints the version of the driver"))
        .subcommand(
            clap::Command::new("synth")
                .about("Runs the QuickLogic synthesis script")
                .add_target_args()
                .arg(
                    Arg::new("run")
                        .long("run")
                        .value_name("FROM:TO")
                        .help("Only run the stages from label FROM to label TO, both included; either may be omitted")
                        .action(ArgAction::Set),
                )
                .add_flag_switches()
                .add_output_args()
                .add_switch(
                    "explain",
                    "List every candidate operation with its condition instead of running anything",
                )
                .arg(
                    Arg::new("checkpoint")
                        .long("checkpoint")
                        .value_name("FILE.il")
                        .help("Read the design from this RTLIL file when no inputs are given, and write it back after the run")
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("script_out")
                        .long("script_out")
                        .value_name("FILE.ys")
                        .help("Write the commands to a yosys script instead of running yosys")
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("INPUT")
                        .help("Verilog input files")
                        .num_args(0..)
                        .action(ArgAction::Append),
                ),
        )
        .subcommand(clap::Command::new("stages").about("Lists the stage labels in execution order"))
        .subcommand(
            clap::Command::new("families")
                .about("Lists the supported families and their capabilities"),
        )
        .get_matches();

    let config = load_toolchain(&matches);

    if let Some(matches) = matches.subcommand_matches("synth") {
        synth::handle_synth(matches, &config);
    } else if let Some(_matches) = matches.subcommand_matches("stages") {
        for label in STAGE_LABELS {
            println!("{}", label);
        }
    } else if let Some(_matches) = matches.subcommand_matches("families") {
        print_families();
    } else if let Some(_matches) = matches.subcommand_matches("version") {
        println!("{}", env!("CARGO_PKG_VERSION"));
    } else {
        report_cli_error_and_exit("No valid subcommand provided.", None, vec![]);
    }
}
