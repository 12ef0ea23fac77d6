// SPDX-License-Identifier: Apache-2.0

//! Predicates over a `Configuration` that decide whether an invocation runs.
//!
//! The same value renders as the explain-mode annotation, e.g. `for pp3`,
//! `unless -no_dsp` or `for pp3 or if -edif`, so an annotation can never
//! disagree with the condition that is actually evaluated.

use crate::config::{Configuration, Flag, OutputFormat};
use crate::family::Family;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Guard {
    Always,
    /// The selected family is one of these.
    Family(Vec<Family>),
    /// The flag has the given value.
    Flag(Flag, bool),
    /// A destination for this output format was configured.
    Output(OutputFormat),
    All(Vec<Guard>),
    Any(Vec<Guard>),
}

impl Guard {
    pub fn family(family: Family) -> Guard {
        Guard::Family(vec![family])
    }

    pub fn families(families: &[Family]) -> Guard {
        Guard::Family(families.to_vec())
    }

    /// Holds while `flag` is not given.
    pub fn unless(flag: Flag) -> Guard {
        Guard::Flag(flag, false)
    }

    /// Holds when `flag` is given.
    pub fn with(flag: Flag) -> Guard {
        Guard::Flag(flag, true)
    }

    pub fn output(format: OutputFormat) -> Guard {
        Guard::Output(format)
    }

    pub fn is_always(&self) -> bool {
        matches!(self, Guard::Always)
    }

    /// Conjunction that keeps the result flat, so annotations read as a
    /// single comma-separated list.
    pub fn and(self, other: Guard) -> Guard {
        match (self, other) {
            (Guard::Always, g) | (g, Guard::Always) => g,
            (Guard::All(mut lhs), Guard::All(rhs)) => {
                lhs.extend(rhs);
                Guard::All(lhs)
            }
            (Guard::All(mut lhs), g) => {
                lhs.push(g);
                Guard::All(lhs)
            }
            (g, Guard::All(mut rhs)) => {
                rhs.insert(0, g);
                Guard::All(rhs)
            }
            (lhs, rhs) => Guard::All(vec![lhs, rhs]),
        }
    }

    pub fn holds(&self, config: &Configuration) -> bool {
        match self {
            Guard::Always => true,
            Guard::Family(families) => families.contains(&config.family()),
            Guard::Flag(flag, value) => config.flag(*flag) == *value,
            Guard::Output(format) => config.output(*format).is_some(),
            Guard::All(guards) => guards.iter().all(|g| g.holds(config)),
            Guard::Any(guards) => guards.iter().any(|g| g.holds(config)),
        }
    }
}

impl std::fmt::Display for Guard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Guard::Always => Ok(()),
            Guard::Family(families) => {
                let names: Vec<&str> = families.iter().map(|family| family.name()).collect();
                write!(f, "for {}", names.join(", "))
            }
            Guard::Flag(flag, true) => write!(f, "if {}", flag),
            Guard::Flag(flag, false) => write!(f, "unless {}", flag),
            Guard::Output(format) => write!(f, "if {}", format),
            Guard::All(guards) => {
                let parts: Vec<String> = guards
                    .iter()
                    .filter(|g| !g.is_always())
                    .map(|g| match g {
                        Guard::Any(_) => format!("({})", g),
                        _ => g.to_string(),
                    })
                    .collect();
                write!(f, "{}", parts.join(", "))
            }
            Guard::Any(guards) => {
                let parts: Vec<String> = guards
                    .iter()
                    .map(|g| match g {
                        Guard::All(_) => format!("({})", g),
                        _ => g.to_string(),
                    })
                    .collect();
                write!(f, "{}", parts.join(" or "))
            }
        }
    }
}
