// SPDX-License-Identifier: Apache-2.0

//! QuickLogic architecture families and the hardware capabilities that drive
//! which mapping steps apply to each of them.

use crate::qlsynth_error::QlsynthError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Family {
    Pp3,
    QlfK4n8,
    QlfK6n10,
    QlfK6n10f,
}

pub const DEFAULT_FAMILY: Family = Family::QlfK4n8;

/// Inclusive length bounds handed to `shregmap`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShiftRegisterBounds {
    pub min_len: u32,
    pub max_len: u32,
}

impl Family {
    pub const ALL: [Family; 4] = [
        Family::Pp3,
        Family::QlfK4n8,
        Family::QlfK6n10,
        Family::QlfK6n10f,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Family::Pp3 => "pp3",
            Family::QlfK4n8 => "qlf_k4n8",
            Family::QlfK6n10 => "qlf_k6n10",
            Family::QlfK6n10f => "qlf_k6n10f",
        }
    }

    /// Whether the fabric has hardened multiply/accumulate blocks.
    pub fn has_dsp(self) -> bool {
        matches!(self, Family::QlfK6n10 | Family::QlfK6n10f)
    }

    /// Whether the fabric has hardened block RAM.
    pub fn has_bram(self) -> bool {
        matches!(self, Family::Pp3 | Family::QlfK6n10 | Family::QlfK6n10f)
    }

    /// Whether the cell library provides a carry-chain adder techmap.
    pub fn has_adder_map(self) -> bool {
        matches!(
            self,
            Family::QlfK4n8 | Family::QlfK6n10 | Family::QlfK6n10f
        )
    }

    /// Whether LUTs are mapped onto library cells after ABC.
    pub fn has_lut_cell_map(self) -> bool {
        matches!(self, Family::Pp3 | Family::QlfK6n10)
    }

    /// Families whose flip-flops cannot take a synchronous set/reset.
    pub fn forbids_sync_reset(self) -> bool {
        matches!(self, Family::QlfK4n8)
    }

    /// Whether the family's LUT mapping goes through ABC9 by default.
    pub fn maps_luts_with_abc9(self) -> bool {
        !matches!(self, Family::QlfK4n8)
    }

    pub fn shift_register_bounds(self) -> Option<ShiftRegisterBounds> {
        match self {
            Family::QlfK4n8 => Some(ShiftRegisterBounds {
                min_len: 8,
                max_len: 8,
            }),
            Family::QlfK6n10f => Some(ShiftRegisterBounds {
                min_len: 8,
                max_len: 20,
            }),
            Family::Pp3 | Family::QlfK6n10 => None,
        }
    }

    /// Returns the families in `ALL` order that satisfy `predicate`.
    pub fn matching(predicate: impl Fn(Family) -> bool) -> Vec<Family> {
        Family::ALL.into_iter().filter(|f| predicate(*f)).collect()
    }
}

impl std::fmt::Display for Family {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for Family {
    type Err = QlsynthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Family::ALL
            .into_iter()
            .find(|family| family.name() == s)
            .ok_or_else(|| QlsynthError::UnknownFamily(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("pp3", Family::Pp3)]
    #[test_case("qlf_k4n8", Family::QlfK4n8)]
    #[test_case("qlf_k6n10", Family::QlfK6n10)]
    #[test_case("qlf_k6n10f", Family::QlfK6n10f)]
    fn test_parse_round_trips_name(text: &str, want: Family) {
        let family: Family = text.parse().expect("known family should parse");
        assert_eq!(family, want);
        assert_eq!(family.to_string(), text);
    }

    #[test_case("QLF_K4N8"; "wrong case")]
    #[test_case("k6n10"; "missing prefix")]
    #[test_case(""; "empty")]
    fn test_parse_rejects_unknown(text: &str) {
        let err = text.parse::<Family>().expect_err("should not parse");
        assert_eq!(err, QlsynthError::UnknownFamily(text.to_string()));
        assert!(err.to_string().contains("qlf_k6n10f"));
    }

    #[test]
    fn test_capability_sets() {
        assert_eq!(
            Family::matching(Family::has_dsp),
            vec![Family::QlfK6n10, Family::QlfK6n10f]
        );
        assert_eq!(
            Family::matching(Family::has_bram),
            vec![Family::Pp3, Family::QlfK6n10, Family::QlfK6n10f]
        );
        assert_eq!(
            Family::matching(|f| !f.has_adder_map()),
            vec![Family::Pp3]
        );
        assert_eq!(
            Family::matching(Family::forbids_sync_reset),
            vec![DEFAULT_FAMILY]
        );
    }
}
