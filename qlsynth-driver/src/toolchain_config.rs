// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

use anyhow::Context;
use clap::ArgMatches;
use serde::Deserialize;

/// Name of the toolchain file picked up from the working directory when no
/// `--toolchain` flag is given.
pub const DEFAULT_TOOLCHAIN_FILE: &str = "qlsynth-toolchain.toml";

#[derive(Debug, Default, Deserialize)]
pub struct ToolchainConfig {
    /// Path to the `yosys` binary. Looked up on `PATH` when absent.
    pub yosys_path: Option<String>,

    /// Root of the QuickLogic cell libraries, e.g. `+/quicklogic/`.
    pub lib_path: Option<String>,

    /// Yosys share directory; `+/` paths that are handed to ABC (which does
    /// not know about the share directory) are rewritten against it.
    pub yosys_share_dir: Option<String>,

    /// Family used when `--family` is not given.
    pub default_family: Option<String>,

    /// ABC9 delay target in picoseconds.
    pub abc9_delay_ps: Option<u32>,
}

/// Helper for extracting a string setting from the command line flag, if
/// specified, or the toolchain config if it's present and the cmdline flag
/// isn't specified.
fn flag_or_config(
    matches: &ArgMatches,
    flag: &str,
    config: &Option<ToolchainConfig>,
    get: impl Fn(&ToolchainConfig) -> Option<&String>,
) -> Option<String> {
    if let Some(value) = matches.get_one::<String>(flag) {
        Some(value.to_string())
    } else if let Some(config) = config {
        get(config).cloned()
    } else {
        None
    }
}

pub fn get_family(matches: &ArgMatches, config: &Option<ToolchainConfig>) -> Option<String> {
    flag_or_config(matches, "family", config, |c| c.default_family.as_ref())
}

pub fn get_lib_path(matches: &ArgMatches, config: &Option<ToolchainConfig>) -> Option<String> {
    flag_or_config(matches, "lib_path", config, |c| c.lib_path.as_ref())
}

pub fn get_abc9_delay_ps(matches: &ArgMatches, config: &Option<ToolchainConfig>) -> Option<u32> {
    matches
        .get_one::<u32>("abc9_delay_ps")
        .copied()
        .or_else(|| config.as_ref().and_then(|c| c.abc9_delay_ps))
}

pub fn get_yosys_share_dir(config: &Option<ToolchainConfig>) -> Option<String> {
    config.as_ref().and_then(|c| c.yosys_share_dir.clone())
}

/// Returns the configured `yosys` binary, or the one found on `PATH`.
pub fn get_yosys_path(config: &Option<ToolchainConfig>) -> anyhow::Result<PathBuf> {
    if let Some(path) = config.as_ref().and_then(|c| c.yosys_path.as_ref()) {
        let path = PathBuf::from(path);
        if !path.exists() {
            anyhow::bail!(
                "yosys_path from toolchain config does not exist: {}",
                path.display()
            );
        }
        return Ok(path);
    }
    which::which("yosys").context("yosys not found on PATH; set toolchain.yosys_path")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Wrapper {
        toolchain: ToolchainConfig,
    }

    #[test]
    fn test_parse_toolchain_toml() {
        let wrapper: Wrapper = toml::from_str(
            r#"
[toolchain]
lib_path = "/opt/ql/"
default_family = "qlf_k6n10f"
abc9_delay_ps = 800
"#,
        )
        .unwrap();
        let config = wrapper.toolchain;
        assert_eq!(config.lib_path.as_deref(), Some("/opt/ql/"));
        assert_eq!(config.default_family.as_deref(), Some("qlf_k6n10f"));
        assert_eq!(config.abc9_delay_ps, Some(800));
        assert!(config.yosys_path.is_none());
    }

    #[test]
    fn test_missing_configured_yosys_is_error() {
        let config = Some(ToolchainConfig {
            yosys_path: Some("/definitely/not/here/yosys".to_string()),
            ..Default::default()
        });
        let err = get_yosys_path(&config).unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here/yosys"));
    }
}
