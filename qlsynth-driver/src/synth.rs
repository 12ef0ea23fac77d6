// SPDX-License-Identifier: Apache-2.0

use std::path::Path;

use clap::ArgMatches;
use qlsynth::{Configuration, QlsynthError, Script, ScriptExecutor, ScriptMode};

use crate::common::{extract_inputs, extract_run_range, extract_synth_options};
use crate::report_cli_error::report_cli_error_and_exit;
use crate::script_file::ScriptFile;
use crate::toolchain_config::{get_yosys_path, ToolchainConfig};
use crate::yosys_session::{YosysInvoker, YosysSession};

pub fn handle_synth(matches: &ArgMatches, config: &Option<ToolchainConfig>) {
    log::info!("handle_synth");
    if let Err(e) = run_synth(matches, config) {
        let message = format!("{:#}", e);
        match e.downcast_ref::<QlsynthError>() {
            Some(QlsynthError::OperationFailed { stage, command, .. }) => {
                report_cli_error_and_exit(
                    &message,
                    Some("synth"),
                    vec![("stage", *stage), ("operation", command.as_str())],
                )
            }
            Some(err) => report_cli_error_and_exit(
                &message,
                Some("synth"),
                vec![("error kind", format!("{:?}", err.kind()).as_str())],
            ),
            None => report_cli_error_and_exit(&message, Some("synth"), vec![]),
        }
    }
}

fn run_synth(matches: &ArgMatches, toolchain: &Option<ToolchainConfig>) -> anyhow::Result<()> {
    let options = extract_synth_options(matches, toolchain);
    let range = extract_run_range(matches)?;
    let inputs = extract_inputs(matches);

    let config = Configuration::resolve(&options)?;
    let script = Script::build(&config);
    let mut executor = ScriptExecutor::new(&script, &range)?;

    if config.mode() == ScriptMode::Explain {
        let transcript = executor.explain()?;
        print!("{}", transcript);
        return Ok(());
    }

    if let Some(script_out) = matches.get_one::<String>("script_out") {
        let mut script_file = ScriptFile::new(&inputs);
        executor.run(&mut script_file, &mut ScriptFile::record)?;
        let header = format!(
            "generated by qlsynth-driver {}; family: {} run: {}",
            env!("CARGO_PKG_VERSION"),
            config.family(),
            range
        );
        return script_file.write_to(Path::new(script_out), &header);
    }

    let yosys_path = get_yosys_path(toolchain)?;
    let mut session = YosysSession::spawn(&yosys_path)?;
    let checkpoint = matches.get_one::<String>("checkpoint");
    match checkpoint {
        Some(path) if inputs.is_empty() && Path::new(path).exists() => {
            session.read_checkpoint(path)?
        }
        _ => session.read_inputs(&inputs)?,
    }

    let result = executor.run(&mut session, &mut YosysInvoker);
    // Whatever the run left behind is saved, so a failed range can be fixed
    // and resumed from here.
    let saved = checkpoint
        .map(|path| session.write_checkpoint(path))
        .transpose();
    let finished = session.finish();
    result?;
    saved?;
    finished?;
    log::info!(
        "synth completed; {} operations invoked",
        executor.transcript().invoked_count()
    );
    Ok(())
}
