// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Triangulation of x-monotone faces.

use super::{FaceIdx, Mesh};
use crate::error::{invariant, Result};
use crate::geom::{edge_sign, vert_leq};

impl Mesh {
    /// Triangulate one x-monotone face whose loop runs counter-clockwise.
    ///
    /// Two chains are advanced from the rightmost vertex toward the left. A
    /// diagonal is added whenever the newest vertex sees past the previous
    /// one; the final fan closes the region. An n-edge face yields n-2
    /// triangles.
    pub fn tessellate_mono_region(&mut self, face: FaceIdx) -> Result<()> {
        let mut up = self.faces[face].an_edge;
        if self.lnext(up) == up || self.lnext(self.lnext(up)) == up {
            return Err(invariant(format!(
                "face {} has fewer than three edges",
                face
            )));
        }

        // Find the half-edge whose origin is the rightmost vertex.
        while vert_leq(self.dst_pos(up), self.org_pos(up)) {
            up = self.lprev(up);
        }
        while vert_leq(self.org_pos(up), self.dst_pos(up)) {
            up = self.lnext(up);
        }
        let mut lo = self.lprev(up);

        while self.lnext(up) != lo {
            if vert_leq(self.dst_pos(up), self.org_pos(lo)) {
                // up->Dst is on the left: fan triangles from lo->Org.
                while self.lnext(lo) != up {
                    let lo_lnext = self.lnext(lo);
                    let convex = self.edge_goes_left(lo_lnext)
                        || edge_sign(self.org_pos(lo), self.dst_pos(lo), self.dst_pos(lo_lnext))
                            <= 0.0;
                    if !convex {
                        break;
                    }
                    lo = self.connect(lo_lnext, lo)? ^ 1;
                }
                lo = self.lprev(lo);
            } else {
                // lo->Org is on the left: fan triangles from up->Dst.
                while self.lnext(lo) != up {
                    let up_lprev = self.lprev(up);
                    let convex = self.edge_goes_right(up_lprev)
                        || edge_sign(self.dst_pos(up), self.org_pos(up), self.org_pos(up_lprev))
                            >= 0.0;
                    if !convex {
                        break;
                    }
                    up = self.connect(up, up_lprev)? ^ 1;
                }
                up = self.lnext(up);
            }
        }

        if self.lnext(lo) == up {
            return Err(invariant(format!("face {} lost its lower chain", face)));
        }
        while self.lnext(self.lnext(lo)) != up {
            let lo_lnext = self.lnext(lo);
            lo = self.connect(lo_lnext, lo)? ^ 1;
        }
        Ok(())
    }

    /// Triangulate every face marked inside. Faces created along the way are
    /// already triangles and are not revisited.
    pub fn tessellate_interior(&mut self) -> Result<()> {
        for f in self.faces.indices() {
            if self.faces.get(f).map_or(false, |face| face.inside) {
                self.tessellate_mono_region(f)?;
            }
        }
        Ok(())
    }
}
