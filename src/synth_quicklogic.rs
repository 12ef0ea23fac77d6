// SPDX-License-Identifier: Apache-2.0

//! Stage contents of the QuickLogic synthesis script.
//!
//! Every stage function walks all of its branches; the guards recorded by
//! `ScriptBuilder` decide afterwards which invocations a given
//! configuration executes.

use crate::bram_types::tdp36k_chtype_commands;
use crate::config::{Configuration, Flag, OutputFormat};
use crate::dsp::dsp_rules;
use crate::family::Family;
use crate::flip_flops::{dfflegalize_command, legal_cells, QLF_K6N10F_SYNC_RESET_CELL};
use crate::guard::Guard;
use crate::script::{quote_path, Script, ScriptBuilder};

/// Shown in place of an output path that was not configured.
const UNSET_OUTPUT_PLACEHOLDER: &str = "<file-name>";

const MEMORY_MAP_ARGS: &str = "-iattr -attr !ram_block -attr !rom_block -attr logic_block \
                               -attr syn_ramstyle=auto -attr syn_ramstyle=registers \
                               -attr syn_romstyle=auto -attr syn_romstyle=logic";

/// ABC script used for pp3 LUT mapping without ABC9.
fn pp3_abc_script(lutdefs: &str) -> String {
    format!(
        "+read_lut,{};strash;ifraig;scorr;dc2;dretime;strash;dch,-f;if;mfs2;\
         sweep;eliminate;if;mfs;lutpack;dress",
        lutdefs
    )
}

pub(crate) fn build_script(config: &Configuration) -> Script {
    let mut b = ScriptBuilder::new(config);
    b.stage("begin", begin);
    b.stage("prepare", prepare);
    b.stage("map_dsp", map_dsp);
    b.stage("coarse", coarse);
    b.stage("map_bram", map_bram);
    b.stage("map_ffram", map_ffram);
    b.stage("map_gates", map_gates);
    b.stage("map_ffs", map_ffs);
    b.stage("map_luts", map_luts);
    b.stage("map_cells", map_cells);
    b.stage("check", check);
    b.stage("iomap", iomap);
    b.stage("finalize", finalize);
    b.stage("blif", blif);
    b.stage("edif", edif);
    b.stage("verilog", verilog);
    b.finish()
}

fn sim_library_command(config: &Configuration, family: Family, bram_types: bool) -> String {
    let dir = config.family_dir(family);
    let mut command = format!(
        "read_verilog -lib -specify -nomem2reg {}common/cells_sim.v {}/cells_sim.v",
        config.lib_path(),
        dir
    );
    if family == Family::QlfK6n10f {
        command.push_str(&format!(" {dir}/dsp_sim.v {dir}/brams_sim.v"));
        if bram_types {
            command.push_str(&format!(" {dir}/bram_types_sim.v"));
        }
    }
    command
}

fn begin(b: &mut ScriptBuilder) {
    let config = b.config();
    // -nomem2reg: only port definitions and specify blocks are needed from
    // the cell models, and some BRAM models trip mem2reg.
    b.for_each_family(&Family::ALL, |b, family| {
        if family == Family::QlfK6n10f {
            b.run_if(
                Guard::unless(Flag::BramTypes),
                sim_library_command(config, family, false),
            );
            b.run_if(
                Guard::with(Flag::BramTypes),
                sim_library_command(config, family, true),
            );
        } else {
            b.run(sim_library_command(config, family, false));
        }
    });
    b.run(format!("hierarchy -check {}", config.top().hierarchy_arg()));
}

fn prepare(b: &mut ScriptBuilder) {
    let opt_args = b.config().opt_dff_args();
    b.run("proc");
    b.run("flatten");
    b.run_if(Guard::family(Family::Pp3), "tribuf -logic");
    b.run("deminout");
    b.run("opt_expr");
    b.run("opt_clean");
    b.run("check");
    b.run("opt -nodffe -nosdff");
    b.run("fsm");
    b.run(format!("opt{}", opt_args));
    b.run("wreduce");
    b.run("peepopt");
    b.run("opt_clean");
    b.run("share");
}

fn map_dsp(b: &mut ScriptBuilder) {
    let config = b.config();
    b.when(Guard::unless(Flag::NoDsp), |b| {
        b.for_each_family(&Family::matching(Family::has_dsp), |b, family| {
            let dir = config.family_dir(family);
            match family {
                Family::QlfK6n10 => {
                    b.run("memory_dff");
                    b.run("wreduce t:$mul");
                    for rule in dsp_rules(family) {
                        b.run(format!(
                            "techmap -map +/mul2dsp.v -map {}/dsp_map.v {}",
                            dir,
                            rule.mul2dsp_defines()
                        ));
                    }
                    b.run("select a:mul2dsp");
                    b.run("setattr -unset mul2dsp");
                    b.run("opt_expr -fine");
                    b.run("wreduce");
                    b.run("select -clear");
                    b.run("ql_dsp");
                    b.run("chtype -set $mul t:$__soft_mul");
                }
                _ => {
                    b.run("wreduce t:$mul");
                    b.run_if(Guard::unless(Flag::UseDspCfgParams), "ql_dsp_macc");
                    b.run_if(
                        Guard::with(Flag::UseDspCfgParams),
                        "ql_dsp_macc -use_dsp_cfg_params",
                    );
                    for rule in dsp_rules(family) {
                        b.run(format!(
                            "techmap -map +/mul2dsp.v {}",
                            rule.mul2dsp_defines()
                        ));
                        b.run("chtype -set $mul t:$__soft_mul");
                    }
                    b.run_if(
                        Guard::unless(Flag::UseDspCfgParams),
                        format!("techmap -map {}/dsp_map.v -D USE_DSP_CFG_PARAMS=0", dir),
                    );
                    b.run_if(
                        Guard::with(Flag::UseDspCfgParams),
                        format!("techmap -map {}/dsp_map.v -D USE_DSP_CFG_PARAMS=1", dir),
                    );
                    b.run("ql_dsp_simd");
                    b.run(format!("techmap -map {}/dsp_final_map.v", dir));
                    b.run("ql_dsp_io_regs");
                }
            }
        });
    });
}

fn coarse(b: &mut ScriptBuilder) {
    let opt_args = b.config().opt_dff_args();
    b.run("techmap -map +/cmp2lut.v -D LUT_WIDTH=4");
    b.run("opt_expr");
    b.run("opt_clean");
    b.run("alumacc");
    b.run("pmuxtree");
    b.run(format!("opt{}", opt_args));
    b.run("memory -nomap");
    b.run("opt_clean");
}

fn map_bram(b: &mut ScriptBuilder) {
    let config = b.config();
    b.when(Guard::unless(Flag::NoBram), |b| {
        b.for_each_family(&Family::matching(Family::has_bram), |b, family| {
            let dir = config.family_dir(family);
            if family == Family::QlfK6n10f {
                b.run(format!("memory_libmap -lib {}/libmap_brams.txt", dir));
                b.run("ql_bram_merge");
                b.run(format!("techmap -map {}/libmap_brams_map.v", dir));
            } else {
                b.run(format!("memory_bram -rules {}/brams.txt", dir));
            }
            if family == Family::Pp3 {
                b.run("pp3_braminit");
            }
            b.run(format!("techmap -autoproc -map {}/brams_map.v", dir));
            if family == Family::QlfK6n10f {
                b.run(format!("techmap -map {}/brams_final_map.v", dir));
                b.when(Guard::with(Flag::BramTypes), |b| {
                    for command in tdp36k_chtype_commands() {
                        b.run(command);
                    }
                });
            }
        });
    });
}

fn map_ffram(b: &mut ScriptBuilder) {
    let opt_args = b.config().opt_dff_args();
    b.run(format!("opt -fast -mux_undef -undriven -fine{}", opt_args));
    b.run(format!("memory_map {}", MEMORY_MAP_ARGS));
    b.run(format!("opt -undriven -fine{}", opt_args));
}

fn map_gates(b: &mut ScriptBuilder) {
    let config = b.config();
    let opt_args = config.opt_dff_args();
    let adder_families = Family::matching(Family::has_adder_map);
    let plain_families = Family::matching(|family| !family.has_adder_map());

    b.when(Guard::unless(Flag::NoAdder), |b| {
        b.for_each_family(&adder_families, |b, family| {
            b.run(format!(
                "techmap -map +/techmap.v -map {}/arith_map.v",
                config.family_dir(family)
            ));
        });
    });
    b.run_if(
        Guard::Any(vec![
            Guard::families(&plain_families),
            Guard::with(Flag::NoAdder),
        ]),
        "techmap",
    );
    b.run(format!("opt -fast{}", opt_args));
    b.run_if(Guard::family(Family::Pp3), "muxcover -mux8 -mux4");
    b.run("opt_expr");
    b.run("opt_merge");
    b.run("opt_clean");
    b.run(format!("opt{}", opt_args));
}

fn map_ffs(b: &mut ScriptBuilder) {
    let config = b.config();
    let opt_args = config.opt_dff_args();
    b.run("opt_expr");
    b.for_each_family(&Family::ALL, |b, family| {
        if let Some(bounds) = family.shift_register_bounds() {
            b.run(format!(
                "shregmap -minlen {} -maxlen {}",
                bounds.min_len, bounds.max_len
            ));
        }
        let cells = legal_cells(family);
        if family == Family::QlfK6n10f {
            b.run_if(
                Guard::unless(Flag::NoSdff),
                dfflegalize_command(
                    cells
                        .iter()
                        .chain(std::iter::once(&QLF_K6N10F_SYNC_RESET_CELL)),
                ),
            );
            b.run_if(Guard::with(Flag::NoSdff), dfflegalize_command(cells));
        } else {
            b.run(dfflegalize_command(cells));
        }
        if family == Family::Pp3 {
            b.run(format!(
                "techmap -map {}/cells_map.v",
                config.family_dir(family)
            ));
        }
    });
    b.run_if(
        Guard::unless(Flag::NoFfMap),
        format!(
            "techmap -map +/techmap.v -map {}/ffs_map.v",
            config.family_dir(config.family())
        ),
    );
    b.run_if(Guard::family(Family::Pp3), "opt_expr -mux_undef");
    b.run("opt_merge");
    b.run("opt_clean");
    b.run(format!("opt{}", opt_args));
}

fn map_luts(b: &mut ScriptBuilder) {
    let config = b.config();
    let delay_ps = config.abc9_delay_ps();
    b.when(Guard::unless(Flag::NoAbcOpt), |b| {
        b.for_each_family(&Family::ALL, |b, family| {
            let dir = config.family_dir(family);
            match family {
                Family::Pp3 => {
                    b.run(format!("techmap -map {}/latches_map.v", dir));
                    b.when(Guard::unless(Flag::NoAbc9), |b| {
                        b.run(format!(
                            "read_verilog -lib -specify -icells {}/abc9_model.v",
                            dir
                        ));
                        b.run(format!("techmap -map {}/abc9_map.v", dir));
                        b.run(format!("abc9 -maxlut 4 -dff -D {}", delay_ps));
                        b.run(format!("techmap -map {}/abc9_unmap.v", dir));
                    });
                    let lutdefs = config.share_path(&format!("{}/lutdefs.txt", dir));
                    b.run_if(
                        Guard::with(Flag::NoAbc9),
                        format!("abc -script {}", pp3_abc_script(&lutdefs)),
                    );
                }
                Family::QlfK4n8 => b.run("abc -lut 4"),
                Family::QlfK6n10 | Family::QlfK6n10f => {
                    // The 6-LUT families share the pp3 ABC9 box models.
                    b.when(Guard::unless(Flag::NoAbc9), |b| {
                        b.run(format!(
                            "read_verilog -lib -specify -icells {}pp3/abc9_model.v",
                            config.lib_path()
                        ));
                        b.run(format!("abc9 -maxlut 6 -D {}", delay_ps));
                    });
                    b.run_if(Guard::with(Flag::NoAbc9), "abc -lut 6");
                }
            }
        });
    });
    b.run("clean");
    b.run("opt_lut");
}

fn map_cells(b: &mut ScriptBuilder) {
    let config = b.config();
    b.for_each_family(&Family::matching(Family::has_lut_cell_map), |b, family| {
        b.run(format!("techmap -map {}/lut_map.v", config.family_dir(family)));
        b.run("clean");
    });
}

fn check(b: &mut ScriptBuilder) {
    b.run("autoname");
    b.run("hierarchy -check");
    b.run("stat");
    b.run("check -noinit");
}

fn iomap(b: &mut ScriptBuilder) {
    b.when(Guard::family(Family::Pp3), |b| {
        b.run("clkbufmap -inpad ckpad Q:P");
        b.run("iopadmap -bits -outpad outpad A:P -inpad inpad Q:P -tinoutpad bipad EN:Q:A:P A:top");
    });
}

fn finalize(b: &mut ScriptBuilder) {
    b.run_if(Guard::family(Family::Pp3), "setundef -zero -params -undriven");
    b.run_if(
        Guard::Any(vec![
            Guard::family(Family::Pp3),
            Guard::output(OutputFormat::Edif),
        ]),
        "hilomap -hicell logic_1 a -locell logic_0 a -singleton A:top",
    );
    b.run("opt_clean -purge");
    b.run("check");
    b.run("blackbox =A:whitebox");
}

fn output_path(config: &Configuration, format: OutputFormat) -> String {
    config
        .output(format)
        .map_or_else(|| UNSET_OUTPUT_PLACEHOLDER.to_string(), quote_path)
}

fn blif(b: &mut ScriptBuilder) {
    let path = output_path(b.config(), OutputFormat::Blif);
    b.run_if(
        Guard::output(OutputFormat::Blif),
        format!("write_blif -param {}", path),
    );
}

fn edif(b: &mut ScriptBuilder) {
    let path = output_path(b.config(), OutputFormat::Edif);
    b.when(Guard::output(OutputFormat::Edif), |b| {
        b.run("splitnets -ports -format ()");
        b.run("quicklogic_eqn");
        b.run(format!(
            "write_ql_edif -nogndvcc -attrprop -pvector par {}",
            path
        ));
    });
}

fn verilog(b: &mut ScriptBuilder) {
    let path = output_path(b.config(), OutputFormat::Verilog);
    b.run_if(
        Guard::output(OutputFormat::Verilog),
        format!("write_verilog -noattr -nohex {}", path),
    );
}
