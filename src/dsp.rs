// SPDX-License-Identifier: Apache-2.0

//! Multiplier-to-DSP mapping rules per family.

use crate::family::Family;

/// Operand width window in which `mul2dsp` maps a multiplier onto `cell`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DspRule {
    pub a_max_width: u32,
    pub b_max_width: u32,
    pub a_min_width: u32,
    pub b_min_width: u32,
    pub y_min_width: Option<u32>,
    pub cell: &'static str,
}

pub const QLF_K6N10_DSP_RULES: &[DspRule] = &[DspRule {
    a_max_width: 16,
    b_max_width: 16,
    a_min_width: 2,
    b_min_width: 2,
    y_min_width: Some(11),
    cell: "$__MUL16X16",
}];

/// Tried in order: whatever the wide rule leaves behind as `$__soft_mul` is
/// retyped to `$mul` and offered to the narrow one.
pub const QLF_K6N10F_DSP_RULES: &[DspRule] = &[
    DspRule {
        a_max_width: 20,
        b_max_width: 18,
        a_min_width: 11,
        b_min_width: 10,
        y_min_width: None,
        cell: "$__QL_MUL20X18",
    },
    DspRule {
        a_max_width: 10,
        b_max_width: 9,
        a_min_width: 4,
        b_min_width: 4,
        y_min_width: None,
        cell: "$__QL_MUL10X9",
    },
];

pub fn dsp_rules(family: Family) -> &'static [DspRule] {
    match family {
        Family::QlfK6n10 => QLF_K6N10_DSP_RULES,
        Family::QlfK6n10f => QLF_K6N10F_DSP_RULES,
        Family::Pp3 | Family::QlfK4n8 => &[],
    }
}

impl DspRule {
    /// The `-D` defines that parameterize `+/mul2dsp.v` for this rule.
    pub fn mul2dsp_defines(&self) -> String {
        let mut defines = format!(
            "-D DSP_A_MAXWIDTH={} -D DSP_B_MAXWIDTH={} -D DSP_A_MINWIDTH={} -D DSP_B_MINWIDTH={}",
            self.a_max_width, self.b_max_width, self.a_min_width, self.b_min_width
        );
        if let Some(y_min_width) = self.y_min_width {
            defines.push_str(&format!(" -D DSP_Y_MINWIDTH={}", y_min_width));
        }
        defines.push_str(&format!(" -D DSP_NAME={}", self.cell));
        defines
    }
}
