// SPDX-License-Identifier: Apache-2.0

//! Retyping of generic `TDP36K` block RAM cells into per-configuration cell
//! names (`-bram_types`).
//!
//! Every combination of port data widths gets its own `chtype` so that
//! downstream tools see e.g. `TDP36K_FIFO_SYNC_A_X9_B_X18_nonsplit` instead of
//! a parameterized `TDP36K`. The width sets are the only inputs; the
//! iteration is a plain Cartesian product over them.

/// Port widths supported when the 36K block is used as a single memory.
pub const TDP36K_NONSPLIT_WIDTHS: &[u32] = &[1, 2, 4, 9, 18, 36];

/// Port widths supported when the block is split into two 18K halves.
pub const TDP36K_SPLIT_WIDTHS: &[u32] = &[1, 2, 4, 9, 18];

const NONSPLIT_PORTS: &[&str] = &["a", "b"];
const SPLIT_PORTS: &[&str] = &["a1", "b1", "a2", "b2"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tdp36kMode {
    Bram,
    FifoAsync,
    FifoSync,
}

impl Tdp36kMode {
    const ALL: [Tdp36kMode; 3] = [Tdp36kMode::Bram, Tdp36kMode::FifoAsync, Tdp36kMode::FifoSync];

    fn cell_infix(self) -> &'static str {
        match self {
            Tdp36kMode::Bram => "BRAM",
            Tdp36kMode::FifoAsync => "FIFO_ASYNC",
            Tdp36kMode::FifoSync => "FIFO_SYNC",
        }
    }

    fn selector(self) -> &'static str {
        match self {
            Tdp36kMode::Bram => "a:is_fifo=0 %i",
            Tdp36kMode::FifoAsync => "a:is_fifo=1 %i a:sync_fifo=0 %i",
            Tdp36kMode::FifoSync => "a:is_fifo=1 %i a:sync_fifo=1 %i",
        }
    }
}

/// All `arity`-tuples over `widths`, first position varying slowest.
fn width_tuples(widths: &[u32], arity: usize) -> Vec<Vec<u32>> {
    let mut tuples: Vec<Vec<u32>> = vec![Vec::new()];
    for _ in 0..arity {
        tuples = tuples
            .iter()
            .flat_map(|prefix| {
                widths.iter().map(move |&width| {
                    let mut tuple = prefix.clone();
                    tuple.push(width);
                    tuple
                })
            })
            .collect();
    }
    tuples
}

fn cell_name(mode: Tdp36kMode, ports: &[&str], widths: &[u32]) -> String {
    let shape: Vec<String> = ports
        .iter()
        .zip(widths)
        .map(|(port, width)| format!("{}_X{}", port.to_uppercase(), width))
        .collect();
    let split = if ports.len() > 2 { "split" } else { "nonsplit" };
    format!("TDP36K_{}_{}_{}", mode.cell_infix(), shape.join("_"), split)
}

fn width_selectors(ports: &[&str], widths: &[u32], attribute: &str) -> String {
    let selectors: Vec<String> = ports
        .iter()
        .zip(widths)
        .map(|(port, width)| format!("a:port_{}_{}={} %i", port, attribute, width))
        .collect();
    selectors.join(" ")
}

/// Retyping of explicitly instantiated cells, which carry `*_dwidth`
/// attributes and may be FIFOs.
fn instantiated_commands(ports: &[&str], widths: &[u32], commands: &mut Vec<String>) {
    for tuple in width_tuples(widths, ports.len()) {
        for mode in Tdp36kMode::ALL {
            let split_selector = if ports.len() > 2 { " a:is_split=1 %i" } else { "" };
            commands.push(format!(
                "chtype -set {} t:TDP36K a:is_inferred=0 %i{} {} {}",
                cell_name(mode, ports, &tuple),
                split_selector,
                mode.selector(),
                width_selectors(ports, &tuple, "dwidth")
            ));
        }
    }
}

/// Retyping of cells produced by memory inference, which carry `*_width`
/// attributes and are never FIFOs.
fn inferred_commands(ports: &[&str], widths: &[u32], commands: &mut Vec<String>) {
    for tuple in width_tuples(widths, ports.len()) {
        commands.push(format!(
            "chtype -set {} t:TDP36K a:is_inferred=1 %i {}",
            cell_name(Tdp36kMode::Bram, ports, &tuple),
            width_selectors(ports, &tuple, "width")
        ));
    }
}

pub fn tdp36k_chtype_commands() -> Vec<String> {
    let mut commands = Vec::new();
    instantiated_commands(NONSPLIT_PORTS, TDP36K_NONSPLIT_WIDTHS, &mut commands);
    instantiated_commands(SPLIT_PORTS, TDP36K_SPLIT_WIDTHS, &mut commands);
    inferred_commands(NONSPLIT_PORTS, TDP36K_NONSPLIT_WIDTHS, &mut commands);
    inferred_commands(SPLIT_PORTS, TDP36K_SPLIT_WIDTHS, &mut commands);
    commands
}
