// SPDX-License-Identifier: Apache-2.0

use clap::ArgMatches;
use qlsynth::{Flag, OutputFormat, RunRange, SynthOptions};

use crate::toolchain_config::{
    get_abc9_delay_ps, get_family, get_lib_path, get_yosys_share_dir, ToolchainConfig,
};

/// Collects the `synth` subcommand's options, falling back to toolchain
/// config values for anything not given on the command line.
pub fn extract_synth_options(
    matches: &ArgMatches,
    config: &Option<ToolchainConfig>,
) -> SynthOptions {
    let mut options = SynthOptions {
        top: matches.get_one::<String>("top").cloned(),
        family: get_family(matches, config),
        lib_path: get_lib_path(matches, config),
        yosys_share_dir: get_yosys_share_dir(config),
        abc9_delay_ps: get_abc9_delay_ps(matches, config),
        explain: matches.get_flag("explain"),
        ..Default::default()
    };
    for flag in Flag::ALL {
        options.flags.set(flag, matches.get_flag(flag.option_name()));
    }
    for format in OutputFormat::ALL {
        *options.output_mut(format) = matches.get_one::<String>(format.option_name()).cloned();
    }
    log::debug!("extract_synth_options; options: {:?}", options);
    options
}

pub fn extract_run_range(matches: &ArgMatches) -> Result<RunRange, qlsynth::QlsynthError> {
    match matches.get_one::<String>("run") {
        Some(text) => text.parse(),
        None => Ok(RunRange::all()),
    }
}

pub fn extract_inputs(matches: &ArgMatches) -> Vec<String> {
    matches
        .get_many::<String>("INPUT")
        .map(|inputs| inputs.cloned().collect())
        .unwrap_or_default()
}
