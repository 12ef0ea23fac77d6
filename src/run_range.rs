// SPDX-License-Identifier: Apache-2.0

//! Selection of a contiguous, inclusive span of stages by label.

use std::ops::RangeInclusive;

use crate::qlsynth_error::QlsynthError;

/// A span of stages given by its first and last label. Open ends extend to
/// the first or last stage of the script.
///
/// Textual forms (as accepted by `--run`):
///
/// * `label`: just that stage
/// * `from:to`: `from` through `to`, both included
/// * `from:` / `:to`: open-ended
/// * empty: the whole script
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunRange {
    from: Option<String>,
    to: Option<String>,
}

impl RunRange {
    pub fn all() -> Self {
        RunRange::default()
    }

    pub fn single(label: &str) -> Self {
        RunRange::between(label, label)
    }

    pub fn between(from: &str, to: &str) -> Self {
        RunRange {
            from: Some(from.to_string()),
            to: Some(to.to_string()),
        }
    }

    pub fn starting_at(from: &str) -> Self {
        RunRange {
            from: Some(from.to_string()),
            to: None,
        }
    }

    pub fn ending_at(to: &str) -> Self {
        RunRange {
            from: None,
            to: Some(to.to_string()),
        }
    }

    pub fn from_label(&self) -> Option<&str> {
        self.from.as_deref()
    }

    pub fn to_label(&self) -> Option<&str> {
        self.to.as_deref()
    }

    /// Resolves the range against `labels` (in execution order) to the
    /// inclusive span of stage indices it selects.
    pub fn resolve(&self, labels: &[&str]) -> Result<RangeInclusive<usize>, QlsynthError> {
        let position = |label: &str| {
            labels
                .iter()
                .position(|candidate| *candidate == label)
                .ok_or_else(|| QlsynthError::UnknownStageLabel(label.to_string()))
        };
        let start = match &self.from {
            Some(label) => position(label)?,
            None => 0,
        };
        let end = match &self.to {
            Some(label) => position(label)?,
            None => labels.len().saturating_sub(1),
        };
        if start > end {
            return Err(QlsynthError::InvertedRange {
                from: labels[start].to_string(),
                to: labels[end].to_string(),
            });
        }
        Ok(start..=end)
    }
}

impl std::str::FromStr for RunRange {
    type Err = QlsynthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let nonempty = |part: &str| {
            let part = part.trim();
            if part.is_empty() {
                None
            } else {
                Some(part.to_string())
            }
        };
        let range = match s.split_once(':') {
            Some((from, to)) => RunRange {
                from: nonempty(from),
                to: nonempty(to),
            },
            None => RunRange {
                from: nonempty(s),
                to: nonempty(s),
            },
        };
        Ok(range)
    }
}

impl std::fmt::Display for RunRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.from, &self.to) {
            (Some(from), Some(to)) if from == to => write!(f, "{}", from),
            (from, to) => write!(
                f,
                "{}:{}",
                from.as_deref().unwrap_or(""),
                to.as_deref().unwrap_or("")
            ),
        }
    }
}
