//! Request and outcome types for the mutation gateway.
//!
//! String forms are the ones clients send (`tutte`, `cycle`, ...). Parsing
//! failures are reported as plain messages; the gateway turns them into
//! `InvalidRequest`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::document::FaceId;

/// Layout algorithm applied by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutAlgorithm {
    Tutte,
    Lloyd,
}

impl LayoutAlgorithm {
    pub fn as_str(self) -> &'static str {
        match self {
            LayoutAlgorithm::Tutte => "tutte",
            LayoutAlgorithm::Lloyd => "lloyd",
        }
    }
}

impl fmt::Display for LayoutAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayoutAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tutte" => Ok(LayoutAlgorithm::Tutte),
            "lloyd" => Ok(LayoutAlgorithm::Lloyd),
            other => Err(format!("unknown layout algorithm '{other}'")),
        }
    }
}

/// Structural move kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveKind {
    Cycle,
    Square,
}

impl MoveKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MoveKind::Cycle => "cycle",
            MoveKind::Square => "square",
        }
    }
}

impl fmt::Display for MoveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MoveKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cycle" => Ok(MoveKind::Cycle),
            "square" => Ok(MoveKind::Square),
            other => Err(format!("unknown move kind '{other}'")),
        }
    }
}

/// A proposed move. `face` stays optional so that a missing face id is
/// reported by the gateway as an invalid request instead of a parse error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveRequest {
    pub kind: MoveKind,
    pub face: Option<FaceId>,
    /// Orientation flag; only meaningful for cycle moves.
    pub inverse: bool,
}

impl MoveRequest {
    pub fn cycle(face: FaceId, inverse: bool) -> Self {
        Self {
            kind: MoveKind::Cycle,
            face: Some(face),
            inverse,
        }
    }

    pub fn square(face: FaceId) -> Self {
        Self {
            kind: MoveKind::Square,
            face: Some(face),
            inverse: false,
        }
    }
}

/// Result of a validity-gated move.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveOutcome {
    /// False when the validity predicate rejected the move; the document was
    /// left untouched and not re-saved.
    pub applied: bool,
    /// Analysis projection of the document after the call.
    pub analysis: Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_client_spellings() {
        assert_eq!("tutte".parse::<LayoutAlgorithm>(), Ok(LayoutAlgorithm::Tutte));
        assert_eq!(" Lloyd ".parse::<LayoutAlgorithm>(), Ok(LayoutAlgorithm::Lloyd));
        assert_eq!("SQUARE".parse::<MoveKind>(), Ok(MoveKind::Square));
        assert_eq!("cycle".parse::<MoveKind>(), Ok(MoveKind::Cycle));
    }

    #[test]
    fn rejects_unknown_names() {
        let err = "spring".parse::<LayoutAlgorithm>().unwrap_err();
        assert_eq!(err, "unknown layout algorithm 'spring'");
        assert!("flip".parse::<MoveKind>().is_err());
    }

    #[test]
    fn display_matches_parse() {
        for algorithm in [LayoutAlgorithm::Tutte, LayoutAlgorithm::Lloyd] {
            assert_eq!(algorithm.to_string().parse::<LayoutAlgorithm>(), Ok(algorithm));
        }
        for kind in [MoveKind::Cycle, MoveKind::Square] {
            assert_eq!(kind.to_string().parse::<MoveKind>(), Ok(kind));
        }
    }
}
