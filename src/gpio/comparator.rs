//! Relational conditions evaluated against sampled line values.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RegistrationError;

/// The six relational operators a registration can use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompareOp {
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
}

impl CompareOp {
    pub const ALL: [Self; 6] = [Self::Eq, Self::Ne, Self::Lt, Self::Le, Self::Gt, Self::Ge];

    /// `value <op> threshold`.
    pub fn evaluate(self, value: f32, threshold: f32) -> bool {
        match self {
            Self::Eq => value == threshold,
            Self::Ne => value != threshold,
            Self::Lt => value < threshold,
            Self::Le => value <= threshold,
            Self::Gt => value > threshold,
            Self::Ge => value >= threshold,
        }
    }

    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }
}

/// Free-function form of [`CompareOp::evaluate`].
pub fn evaluate(value: f32, op: CompareOp, threshold: f32) -> bool {
    op.evaluate(value, threshold)
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for CompareOp {
    type Err = RegistrationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "==" | "=" => Ok(Self::Eq),
            "!=" | "≠" => Ok(Self::Ne),
            "<" => Ok(Self::Lt),
            "<=" | "≤" => Ok(Self::Le),
            ">" => Ok(Self::Gt),
            ">=" | "≥" => Ok(Self::Ge),
            _ => Err(RegistrationError::InvalidOperator),
        }
    }
}
