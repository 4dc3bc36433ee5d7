// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Cleanup passes run around the sweep.

use super::{EdgeIdx, Mesh};
use crate::error::Result;
use crate::geom::vert_eq;

impl Mesh {
    /// Fold the winding of `src` into `dst` (both halves).
    pub fn add_winding(&mut self, dst: EdgeIdx, src: EdgeIdx) {
        let w = self.winding(src);
        let ws = self.winding(src ^ 1);
        self.he_mut(dst).winding += w;
        self.he_mut(dst ^ 1).winding += ws;
    }

    /// Collapse zero-length edges and delete contours of one or two edges.
    ///
    /// Runs before the sweep, so edge slots are still in creation order and
    /// every contour is a simple loop.
    pub fn remove_degenerate_edges(&mut self) -> Result<()> {
        for mut e in self.edge_pairs() {
            if !self.edge_is_live(e) {
                continue;
            }
            let mut e_lnext = self.lnext(e);

            if vert_eq(self.org_pos(e), self.dst_pos(e)) && self.lnext(e_lnext) != e {
                // Zero-length edge in a contour of three or more edges:
                // merge its endpoints, then drop the resulting self-loop.
                self.splice(e_lnext, e)?;
                self.delete_edge(e)?;
                e = e_lnext;
                e_lnext = self.lnext(e);
            }

            if self.lnext(e_lnext) == e {
                // Contour of one or two edges.
                if e_lnext != e {
                    self.delete_edge(e_lnext)?;
                }
                self.delete_edge(e)?;
            }
        }
        Ok(())
    }

    /// Remove faces bounded by only two edges, folding the deleted edge's
    /// winding into its neighbor.
    pub fn remove_degenerate_faces(&mut self) -> Result<()> {
        for f in self.faces.indices() {
            let Some(face) = self.faces.get(f) else {
                continue;
            };
            let e = face.an_edge;
            if self.lnext(self.lnext(e)) == e {
                let onext = self.onext(e);
                self.add_winding(onext, e);
                self.delete_edge(e)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::polygon;
    use super::*;

    #[test]
    fn zero_length_edge_collapses() {
        let mut mesh = Mesh::new();
        let e = polygon(
            &mut mesh,
            &[(0.0, 0.0), (1.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)],
        );
        assert_eq!(mesh.loop_len(e), 5);
        mesh.remove_degenerate_edges().unwrap();
        assert_eq!(mesh.verts.len(), 4);
        assert_eq!(mesh.edge_count(), 4);
        for v in mesh.verts.indices() {
            assert_eq!(mesh.loop_len(mesh.verts[v].an_edge), 4);
        }
        mesh.check().unwrap();
    }

    #[test]
    fn two_edge_contour_is_deleted() {
        let mut mesh = Mesh::new();
        polygon(&mut mesh, &[(0.0, 0.0), (3.0, 1.0)]);
        mesh.remove_degenerate_edges().unwrap();
        assert_eq!(mesh.edge_count(), 0);
        assert!(mesh.verts.is_empty());
        assert!(mesh.faces.is_empty());
    }

    #[test]
    fn single_point_contour_is_deleted() {
        let mut mesh = Mesh::new();
        polygon(&mut mesh, &[(2.0, 2.0)]);
        mesh.remove_degenerate_edges().unwrap();
        assert_eq!(mesh.edge_count(), 0);
        assert!(mesh.verts.is_empty());
    }

    #[test]
    fn collapsed_triangle_becomes_empty() {
        // Two coincident points leave a two-edge contour after collapsing.
        let mut mesh = Mesh::new();
        polygon(&mut mesh, &[(0.0, 0.0), (0.0, 0.0), (5.0, 5.0)]);
        mesh.remove_degenerate_edges().unwrap();
        assert_eq!(mesh.edge_count(), 0);
    }

    #[test]
    fn healthy_contour_is_untouched() {
        let mut mesh = Mesh::new();
        polygon(&mut mesh, &[(0.0, 0.0), (4.0, 0.0), (2.0, 3.0)]);
        mesh.remove_degenerate_edges().unwrap();
        assert_eq!(mesh.edge_count(), 3);
        assert_eq!(mesh.verts.len(), 3);
        mesh.check().unwrap();
    }

    #[test]
    fn two_edge_face_folds_winding() {
        let mut mesh = Mesh::new();
        let a = polygon(&mut mesh, &[(0.0, 0.0), (2.0, 0.0), (1.0, 2.0)]);
        let b = mesh.lnext(a);
        let c = mesh.lnext(b);
        // A second edge alongside b, leaving a two-edge face between them.
        let twin = mesh.connect(a, c).unwrap();
        mesh.he_mut(twin).winding = 1;
        mesh.he_mut(twin ^ 1).winding = -1;
        assert_eq!(mesh.loop_len(twin ^ 1), 2);

        mesh.remove_degenerate_faces().unwrap();
        assert_eq!(mesh.edge_count(), 3);
        assert_eq!(mesh.winding(b), 2);
        assert_eq!(mesh.winding(b ^ 1), -2);
        mesh.check().unwrap();
    }

    #[test]
    fn isolated_two_edge_loop_disappears() {
        let mut mesh = Mesh::new();
        polygon(&mut mesh, &[(0.0, 0.0), (1.0, 1.0)]);
        mesh.remove_degenerate_faces().unwrap();
        assert_eq!(mesh.edge_count(), 0);
        assert!(mesh.faces.is_empty());
    }
}
