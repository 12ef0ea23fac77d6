// SPDX-License-Identifier: Apache-2.0

//! Flip-flop and latch cell types each family can implement, as handed to
//! `dfflegalize`.

use crate::family::Family;

/// A `dfflegalize -cell <cell> <init>` entry. `init` is the set of allowed
/// initial values (`0`, `1`, `x` or a combination).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegalCell {
    pub cell: &'static str,
    pub init: &'static str,
}

const fn zero_init(cell: &'static str) -> LegalCell {
    LegalCell { cell, init: "0" }
}

pub const PP3_LEGAL_CELLS: &[LegalCell] = &[
    zero_init("$_DFFSRE_PPPP_"),
    LegalCell {
        cell: "$_DLATCH_?_",
        init: "x",
    },
];

pub const QLF_K4N8_LEGAL_CELLS: &[LegalCell] = &[
    zero_init("$_DFF_P_"),
    zero_init("$_DFF_P??_"),
    zero_init("$_DFF_N_"),
    zero_init("$_DFF_N??_"),
    zero_init("$_DFFSR_???_"),
];

pub const QLF_K6N10_LEGAL_CELLS: &[LegalCell] = &[
    zero_init("$_DFF_P_"),
    zero_init("$_DFF_PP?_"),
    zero_init("$_DFFE_PP?P_"),
    zero_init("$_DFFSR_PPP_"),
    zero_init("$_DFFSRE_PPPP_"),
    zero_init("$_DLATCHSR_PPP_"),
];

/// `dfflegalize` leaves `$_DLATCH_[NP]_` behind even when it is not listed,
/// so it is allowed here and mapped onto `$_DLATCHSR_[NP]NN_` by `ffs_map.v`.
pub const QLF_K6N10F_LEGAL_CELLS: &[LegalCell] = &[
    zero_init("$_DFFSRE_?NNP_"),
    zero_init("$_DLATCHSR_?NN_"),
    zero_init("$_DLATCH_?_"),
];

/// Added to `QLF_K6N10F_LEGAL_CELLS` unless synchronous set/reset inference
/// is turned off.
pub const QLF_K6N10F_SYNC_RESET_CELL: LegalCell = zero_init("$_SDFFE_?N?P_");

pub fn legal_cells(family: Family) -> &'static [LegalCell] {
    match family {
        Family::Pp3 => PP3_LEGAL_CELLS,
        Family::QlfK4n8 => QLF_K4N8_LEGAL_CELLS,
        Family::QlfK6n10 => QLF_K6N10_LEGAL_CELLS,
        Family::QlfK6n10f => QLF_K6N10F_LEGAL_CELLS,
    }
}

pub fn dfflegalize_command<'a>(cells: impl IntoIterator<Item = &'a LegalCell>) -> String {
    let mut command = String::from("dfflegalize");
    for legal in cells {
        command.push_str(&format!(" -cell {} {}", legal.cell, legal.init));
    }
    command
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(Family::Pp3, "dfflegalize -cell $_DFFSRE_PPPP_ 0 -cell $_DLATCH_?_ x"; "pp3")]
    #[test_case(
        Family::QlfK4n8,
        "dfflegalize -cell $_DFF_P_ 0 -cell $_DFF_P??_ 0 -cell $_DFF_N_ 0 -cell $_DFF_N??_ 0 -cell $_DFFSR_???_ 0";
        "qlf_k4n8")]
    #[test_case(
        Family::QlfK6n10,
        "dfflegalize -cell $_DFF_P_ 0 -cell $_DFF_PP?_ 0 -cell $_DFFE_PP?P_ 0 -cell $_DFFSR_PPP_ 0 -cell $_DFFSRE_PPPP_ 0 -cell $_DLATCHSR_PPP_ 0";
        "qlf_k6n10")]
    fn test_dfflegalize_command(family: Family, want: &str) {
        assert_eq!(dfflegalize_command(legal_cells(family)), want);
    }

    #[test]
    fn test_sync_reset_cell_appends() {
        let cells = legal_cells(Family::QlfK6n10f)
            .iter()
            .chain(std::iter::once(&QLF_K6N10F_SYNC_RESET_CELL));
        assert_eq!(
            dfflegalize_command(cells),
            "dfflegalize -cell $_DFFSRE_?NNP_ 0 -cell $_DLATCHSR_?NN_ 0 -cell $_DLATCH_?_ 0 \
             -cell $_SDFFE_?N?P_ 0"
        );
    }
}
