//! Labeling rank derived from interior vertex degrees.

use crate::core::document::GraphDocument;

/// Maximum total degree among the interior vertices, or `None` when the
/// document has no interior vertex.
pub fn labeling_rank<D: GraphDocument>(doc: &D) -> Option<usize> {
    doc.interior_total_degrees().max()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedDocument;

    #[test]
    fn rank_is_max_interior_degree() {
        let mut doc = ScriptedDocument::with_boundary(3).expect("doc");
        doc.interior_degrees = vec![2, 5, 3];
        assert_eq!(labeling_rank(&doc), Some(5));
    }

    #[test]
    fn no_interior_vertices_has_no_rank() {
        let mut doc = ScriptedDocument::with_boundary(3).expect("doc");
        doc.interior_degrees.clear();
        assert_eq!(labeling_rank(&doc), None);
    }
}
