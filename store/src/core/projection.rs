//! Read-only views of a document for the different applets.

use std::str::FromStr;

use serde_json::Value;

use crate::core::document::GraphDocument;

/// Which projection a consumer wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionKind {
    /// Full record (dataset selector, editor).
    Raw,
    /// Analysis view (analyzer).
    Analysis,
}

impl ProjectionKind {
    /// Projection served to a named applet (`datasets`, `editor`, `analyzer`).
    pub fn for_applet(applet: &str) -> Option<Self> {
        match applet {
            "datasets" | "editor" => Some(ProjectionKind::Raw),
            "analyzer" => Some(ProjectionKind::Analysis),
            _ => None,
        }
    }
}

impl FromStr for ProjectionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "raw" => Ok(ProjectionKind::Raw),
            "analysis" => Ok(ProjectionKind::Analysis),
            other => {
                ProjectionKind::for_applet(other).ok_or_else(|| format!("unknown projection '{other}'"))
            }
        }
    }
}

/// Project `doc` without side effects.
pub fn project<D: GraphDocument>(doc: &D, kind: ProjectionKind) -> Value {
    match kind {
        ProjectionKind::Raw => doc.to_record(),
        ProjectionKind::Analysis => doc.to_analysis(),
    }
}
