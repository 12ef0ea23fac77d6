// SPDX-License-Identifier: Apache-2.0

//! Raw synthesis options as given by a caller, and their resolution into the
//! immutable `Configuration` the script builder consumes.

use std::collections::BTreeMap;

use crate::family::{Family, DEFAULT_FAMILY};
use crate::qlsynth_error::QlsynthError;

/// Root of the QuickLogic cell libraries inside the Yosys share directory.
pub const DEFAULT_LIB_PATH: &str = "+/quicklogic/";

/// ABC9 delay target used when none is given: 12 MHz is 83.33ns, halved to
/// leave room for interconnect delay.
///
/// `Configuration::resolve` warns about the assumed clock only when ABC9
/// mapping will actually run for the family and flags, not whenever ABC9 is
/// merely left enabled.
pub const DEFAULT_ABC9_DELAY_PS: u32 = 500;

/// Independent boolean switches, named after their command line spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Flag {
    NoAbcOpt,
    NoAbc9,
    NoDsp,
    UseDspCfgParams,
    NoAdder,
    NoBram,
    BramTypes,
    NoFfMap,
    NoSdff,
}

impl Flag {
    pub const ALL: [Flag; 9] = [
        Flag::NoAbcOpt,
        Flag::NoAbc9,
        Flag::NoDsp,
        Flag::UseDspCfgParams,
        Flag::NoAdder,
        Flag::NoBram,
        Flag::BramTypes,
        Flag::NoFfMap,
        Flag::NoSdff,
    ];

    pub fn option_name(self) -> &'static str {
        match self {
            Flag::NoAbcOpt => "no_abc_opt",
            Flag::NoAbc9 => "no_abc9",
            Flag::NoDsp => "no_dsp",
            Flag::UseDspCfgParams => "use_dsp_cfg_params",
            Flag::NoAdder => "no_adder",
            Flag::NoBram => "no_bram",
            Flag::BramTypes => "bram_types",
            Flag::NoFfMap => "no_ff_map",
            Flag::NoSdff => "nosdff",
        }
    }

    pub fn help(self) -> &'static str {
        match self {
            Flag::NoAbcOpt => "Turn off ABC logic optimization and LUT mapping",
            Flag::NoAbc9 => "Map LUTs with classic ABC instead of timing-driven ABC9",
            Flag::NoDsp => "Do not use DSP blocks to implement multipliers",
            Flag::UseDspCfgParams => {
                "Configure DSP blocks through module parameters instead of ports"
            }
            Flag::NoAdder => "Do not map arithmetic onto adder cells",
            Flag::NoBram => "Do not map memories onto block RAM",
            Flag::BramTypes => {
                "Emit specialized BRAM cells per address/data width configuration"
            }
            Flag::NoFfMap => "Skip the flip-flop techmap",
            Flag::NoSdff => "Do not infer synchronous set/reset flip-flops",
        }
    }
}

impl std::fmt::Display for Flag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "-{}", self.option_name())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flags {
    pub no_abc_opt: bool,
    pub no_abc9: bool,
    pub no_dsp: bool,
    pub use_dsp_cfg_params: bool,
    pub no_adder: bool,
    pub no_bram: bool,
    pub bram_types: bool,
    pub no_ff_map: bool,
    pub nosdff: bool,
}

impl Flags {
    pub fn get(&self, flag: Flag) -> bool {
        match flag {
            Flag::NoAbcOpt => self.no_abc_opt,
            Flag::NoAbc9 => self.no_abc9,
            Flag::NoDsp => self.no_dsp,
            Flag::UseDspCfgParams => self.use_dsp_cfg_params,
            Flag::NoAdder => self.no_adder,
            Flag::NoBram => self.no_bram,
            Flag::BramTypes => self.bram_types,
            Flag::NoFfMap => self.no_ff_map,
            Flag::NoSdff => self.nosdff,
        }
    }

    pub fn set(&mut self, flag: Flag, value: bool) {
        let slot = match flag {
            Flag::NoAbcOpt => &mut self.no_abc_opt,
            Flag::NoAbc9 => &mut self.no_abc9,
            Flag::NoDsp => &mut self.no_dsp,
            Flag::UseDspCfgParams => &mut self.use_dsp_cfg_params,
            Flag::NoAdder => &mut self.no_adder,
            Flag::NoBram => &mut self.no_bram,
            Flag::BramTypes => &mut self.bram_types,
            Flag::NoFfMap => &mut self.no_ff_map,
            Flag::NoSdff => &mut self.nosdff,
        };
        *slot = value;
    }

    pub fn with(mut self, flag: Flag, value: bool) -> Self {
        self.set(flag, value);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OutputFormat {
    Blif,
    Edif,
    Verilog,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 3] = [
        OutputFormat::Blif,
        OutputFormat::Edif,
        OutputFormat::Verilog,
    ];

    pub fn option_name(self) -> &'static str {
        match self {
            OutputFormat::Blif => "blif",
            OutputFormat::Edif => "edif",
            OutputFormat::Verilog => "verilog",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "-{}", self.option_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopModule {
    Auto,
    Named(String),
}

impl TopModule {
    /// The `hierarchy` argument selecting this top.
    pub fn hierarchy_arg(&self) -> String {
        match self {
            TopModule::Auto => "-auto-top".to_string(),
            TopModule::Named(name) => format!("-top {}", name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptMode {
    /// Keep only the invocations whose guard holds and run them.
    Execute,
    /// Keep every candidate invocation, annotated, and run none of them.
    Explain,
}

/// Unvalidated options, e.g. as collected from a command line.
#[derive(Debug, Clone, Default)]
pub struct SynthOptions {
    pub top: Option<String>,
    pub family: Option<String>,
    pub flags: Flags,
    pub blif: Option<String>,
    pub edif: Option<String>,
    pub verilog: Option<String>,
    pub lib_path: Option<String>,
    pub yosys_share_dir: Option<String>,
    pub abc9_delay_ps: Option<u32>,
    pub explain: bool,
}

impl SynthOptions {
    pub fn for_family(family: &str) -> Self {
        SynthOptions {
            family: Some(family.to_string()),
            ..Default::default()
        }
    }

    pub fn output_mut(&mut self, format: OutputFormat) -> &mut Option<String> {
        match format {
            OutputFormat::Blif => &mut self.blif,
            OutputFormat::Edif => &mut self.edif,
            OutputFormat::Verilog => &mut self.verilog,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    family: Family,
    top: TopModule,
    flags: Flags,
    outputs: BTreeMap<OutputFormat, String>,
    lib_path: String,
    yosys_share_dir: Option<String>,
    abc9_delay_ps: u32,
    mode: ScriptMode,
}

/// Whether LUT mapping for `family` will go through ABC9 under `flags`.
fn runs_abc9(family: Family, flags: &Flags) -> bool {
    !flags.no_abc_opt && !flags.no_abc9 && family.maps_luts_with_abc9()
}

impl Configuration {
    pub fn resolve(options: &SynthOptions) -> Result<Configuration, QlsynthError> {
        let family = match &options.family {
            Some(name) => name.parse::<Family>()?,
            None => DEFAULT_FAMILY,
        };

        let mut flags = options.flags;
        if family.forbids_sync_reset() && !flags.nosdff {
            log::debug!(
                "family {} has no synchronous set/reset flip-flops; forcing -nosdff",
                family
            );
            flags.nosdff = true;
        }

        let abc9_delay_ps = match options.abc9_delay_ps {
            Some(delay_ps) => delay_ps,
            None => {
                if runs_abc9(family, &flags) {
                    log::warn!(
                        "delay target has not been set; assuming 12 MHz clock ({} ps)",
                        DEFAULT_ABC9_DELAY_PS
                    );
                }
                DEFAULT_ABC9_DELAY_PS
            }
        };

        let mut lib_path = options
            .lib_path
            .clone()
            .unwrap_or_else(|| DEFAULT_LIB_PATH.to_string());
        if !lib_path.ends_with('/') {
            lib_path.push('/');
        }

        let mut outputs = BTreeMap::new();
        for (format, path) in [
            (OutputFormat::Blif, &options.blif),
            (OutputFormat::Edif, &options.edif),
            (OutputFormat::Verilog, &options.verilog),
        ] {
            if let Some(path) = path {
                outputs.insert(format, path.clone());
            }
        }

        let config = Configuration {
            family,
            top: match &options.top {
                Some(name) => TopModule::Named(name.clone()),
                None => TopModule::Auto,
            },
            flags,
            outputs,
            lib_path,
            yosys_share_dir: options.yosys_share_dir.clone(),
            abc9_delay_ps,
            mode: if options.explain {
                ScriptMode::Explain
            } else {
                ScriptMode::Execute
            },
        };
        log::info!(
            "resolved configuration; family: {} top: {:?} flags: {:?}",
            config.family,
            config.top,
            config.flags
        );
        Ok(config)
    }

    pub fn family(&self) -> Family {
        self.family
    }

    pub fn top(&self) -> &TopModule {
        &self.top
    }

    pub fn flags(&self) -> &Flags {
        &self.flags
    }

    pub fn flag(&self, flag: Flag) -> bool {
        self.flags.get(flag)
    }

    pub fn output(&self, format: OutputFormat) -> Option<&str> {
        self.outputs.get(&format).map(String::as_str)
    }

    pub fn lib_path(&self) -> &str {
        &self.lib_path
    }

    /// Directory holding the cell library files of `family`.
    pub fn family_dir(&self, family: Family) -> String {
        format!("{}{}", self.lib_path, family)
    }

    pub fn abc9_delay_ps(&self) -> u32 {
        self.abc9_delay_ps
    }

    pub fn mode(&self) -> ScriptMode {
        self.mode
    }

    /// Extra `opt` arguments that keep `opt` from introducing flip-flop
    /// shapes the selected family cannot implement.
    pub fn opt_dff_args(&self) -> String {
        let mut args = String::new();
        if self.flags.nosdff {
            args.push_str(" -nosdff");
        }
        if self.family == Family::QlfK4n8 {
            args.push_str(" -nodffe");
        }
        args
    }

    /// Expands a leading `+/` to the Yosys share directory, for paths handed
    /// to tools that do not understand the share-relative notation.
    pub fn share_path(&self, path: &str) -> String {
        match (&self.yosys_share_dir, path.strip_prefix("+/")) {
            (Some(share_dir), Some(rest)) => {
                format!("{}/{}", share_dir.trim_end_matches('/'), rest)
            }
            _ => path.to_string(),
        }
    }
}
