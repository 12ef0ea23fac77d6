// SPDX-License-Identifier: Apache-2.0

use colored::Colorize;

/// Builds the report printed for a failed command: the message on the first
/// line, then one `key: value` line per detail with the values aligned.
fn render_report(message: &str, subcommand: Option<&str>, details: &[(&str, &str)]) -> String {
    let mut report = match subcommand {
        Some(subcommand) => format!("qlsynth-driver: {}: {}\n", subcommand, message.red().bold()),
        None => format!("qlsynth-driver: {}\n", message.red().bold()),
    };
    let key_width = details.iter().map(|(key, _)| key.len() + 1).max().unwrap_or(0);
    for (key, value) in details {
        let key = format!("{}:", key);
        report.push_str(&format!("  {:<width$} {}\n", key, value, width = key_width));
    }
    report
}

pub fn report_cli_error_and_exit(
    message: &str,
    subcommand: Option<&str>,
    details: Vec<(&str, &str)>,
) -> ! {
    eprint!("{}", render_report(message, subcommand, &details));
    std::process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_render_report_aligns_details() {
        colored::control::set_override(false);
        assert_eq!(
            render_report(
                "operation failed",
                Some("synth"),
                &[("stage", "check"), ("operation", "stat")]
            ),
            "qlsynth-driver: synth: operation failed\n  stage:     check\n  operation: stat\n"
        );
        assert_eq!(
            render_report("No valid subcommand provided.", None, &[]),
            "qlsynth-driver: No valid subcommand provided.\n"
        );
    }
}
