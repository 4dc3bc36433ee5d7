// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Keeping the dictionary consistent: splicing vertices that violate the edge
// order into their neighbors, splitting crossing edges at their intersection,
// and walking the regions marked dirty until nothing changes.

use log::trace;

use super::Sweep;
use crate::error::{Result, TessellationError};
use crate::geom::{edge_intersect, edge_sign, vert_eq, vert_leq};
use crate::mesh::{RegionIdx, INVALID};

impl<'m> Sweep<'m> {
    /// Check the order of the right endpoints of the upper and lower edges of
    /// `reg_up`. If the origin of one lies on the wrong side of the other
    /// edge, it is spliced into that edge. Returns true if the mesh changed.
    pub(super) fn check_for_right_splice(&mut self, reg_up: RegionIdx) -> Result<bool> {
        let reg_lo = self.below(reg_up);
        let e_up = self.e_up(reg_up);
        let e_lo = self.e_up(reg_lo);
        let org_up = self.mesh.org_pos(e_up);
        let org_lo = self.mesh.org_pos(e_lo);

        if vert_leq(org_up, org_lo) {
            if edge_sign(self.mesh.dst_pos(e_lo), org_up, org_lo) > 0.0 {
                return Ok(false);
            }
            // e_up's origin appears to be below e_lo.
            if !vert_eq(org_up, org_lo) {
                self.mesh.split_edge(e_lo ^ 1)?;
                let b = self.mesh.oprev(e_lo);
                self.mesh.splice(e_up, b)?;
                self.mark_dirty(reg_up);
                self.mark_dirty(reg_lo);
            } else if self.mesh.org(e_up) != self.mesh.org(e_lo) {
                // Coincident origins: drop e_up's from the queue and merge.
                let v = self.mesh.org(e_up);
                if let Some(handle) = self.mesh.verts[v].pq_handle.take() {
                    self.pq.delete(handle);
                }
                let a = self.mesh.oprev(e_lo);
                self.mesh.splice(a, e_up)?;
            }
        } else {
            if edge_sign(self.mesh.dst_pos(e_up), org_lo, org_up) < 0.0 {
                return Ok(false);
            }
            // e_lo's origin appears to be above e_up.
            let above = self.above(reg_up);
            self.mark_dirty(above);
            self.mark_dirty(reg_up);
            self.mesh.split_edge(e_up ^ 1)?;
            let a = self.mesh.oprev(e_lo);
            self.mesh.splice(a, e_up)?;
        }
        Ok(true)
    }

    /// Same check for the left endpoints, which have both been processed.
    /// The one on the wrong side is spliced into the other edge and the new
    /// face takes the region's inside flag. Returns true if the mesh changed.
    pub(super) fn check_for_left_splice(&mut self, reg_up: RegionIdx) -> Result<bool> {
        let reg_lo = self.below(reg_up);
        let e_up = self.e_up(reg_up);
        let e_lo = self.e_up(reg_lo);
        let dst_up = self.mesh.dst_pos(e_up);
        let dst_lo = self.mesh.dst_pos(e_lo);

        if vert_leq(dst_up, dst_lo) {
            if edge_sign(dst_up, dst_lo, self.mesh.org_pos(e_up)) < 0.0 {
                return Ok(false);
            }
            // e_lo's destination is above e_up.
            let above = self.above(reg_up);
            self.mark_dirty(above);
            self.mark_dirty(reg_up);
            let e = self.mesh.split_edge(e_up)?;
            self.mesh.splice(e_lo ^ 1, e)?;
            let f = self.mesh.lface(e);
            self.mesh.faces[f].inside = self.regions[reg_up].inside;
        } else {
            if edge_sign(dst_lo, dst_up, self.mesh.org_pos(e_lo)) > 0.0 {
                return Ok(false);
            }
            // e_up's destination is below e_lo.
            self.mark_dirty(reg_up);
            self.mark_dirty(reg_lo);
            let e = self.mesh.split_edge(e_lo)?;
            let a = self.mesh.lnext(e_up);
            self.mesh.splice(a, e_lo ^ 1)?;
            let f = self.mesh.rface(e);
            self.mesh.faces[f].inside = self.regions[reg_up].inside;
        }
        Ok(true)
    }

    /// Test the upper and lower edges of `reg_up` for a crossing right of
    /// the sweep line and, if found, split both at the crossing and queue
    /// the new vertex.
    ///
    /// When the crossing can only be resolved by finishing regions at the
    /// event, the region to continue the dirty walk from is returned.
    pub(super) fn check_for_intersect(&mut self, reg_up: RegionIdx) -> Result<Option<RegionIdx>> {
        let mut reg_up = reg_up;
        let mut reg_lo = self.below(reg_up);
        let e_up = self.e_up(reg_up);
        let e_lo = self.e_up(reg_lo);
        let org_up = self.mesh.org(e_up);
        let org_lo = self.mesh.org(e_lo);
        let dst_up = self.mesh.dst(e_up);
        let dst_lo = self.mesh.dst(e_lo);
        let event = self.event;

        let p_org_up = self.mesh.pos(org_up);
        let p_org_lo = self.mesh.pos(org_lo);
        let p_dst_up = self.mesh.pos(dst_up);
        let p_dst_lo = self.mesh.pos(dst_lo);
        let p_event = self.mesh.pos(event);

        if org_up == org_lo {
            return Ok(None);
        }

        // Disjoint y ranges cannot cross.
        let y_min_up = p_org_up.y.min(p_dst_up.y);
        let y_max_lo = p_org_lo.y.max(p_dst_lo.y);
        if y_min_up > y_max_lo {
            return Ok(None);
        }

        if vert_leq(p_org_up, p_org_lo) {
            if edge_sign(p_dst_lo, p_org_up, p_org_lo) > 0.0 {
                return Ok(None);
            }
        } else if edge_sign(p_dst_up, p_org_lo, p_org_up) < 0.0 {
            return Ok(None);
        }

        // The edges intersect, at least marginally.
        let mut isect = edge_intersect(p_dst_up, p_org_up, p_dst_lo, p_org_lo);

        // Keep the crossing right of the sweep line and left of the nearer
        // right endpoint.
        if vert_leq(isect, p_event) {
            isect = p_event;
        }
        let p_org_min = if vert_leq(p_org_up, p_org_lo) {
            p_org_up
        } else {
            p_org_lo
        };
        if vert_leq(p_org_min, isect) {
            isect = p_org_min;
        }

        if vert_eq(isect, p_org_up) || vert_eq(isect, p_org_lo) {
            // The crossing is at one of the right endpoints.
            self.check_for_right_splice(reg_up)?;
            return Ok(None);
        }

        let up_wrong_side = !vert_eq(p_dst_up, p_event) && edge_sign(p_dst_up, p_event, isect) >= 0.0;
        let lo_wrong_side = !vert_eq(p_dst_lo, p_event) && edge_sign(p_dst_lo, p_event, isect) <= 0.0;
        if up_wrong_side || lo_wrong_side {
            // Splitting here would route an edge through or past the event.
            if dst_lo == event {
                // Splice the event into e_up and redo the regions there.
                self.mesh.split_edge(e_up ^ 1)?;
                self.mesh.splice(e_lo ^ 1, e_up)?;
                reg_up = self.top_left_region(reg_up)?;
                let below = self.below(reg_up);
                let e_up = self.e_up(below);
                self.finish_left_regions(below, Some(reg_lo))?;
                let first = self.mesh.oprev(e_up);
                let last = self.add_right_edges(reg_up, first, e_up, Some(e_up))?;
                return Ok(Some(last));
            }
            if dst_up == event {
                // Splice the event into e_lo and redo the regions there.
                self.mesh.split_edge(e_lo ^ 1)?;
                let a = self.mesh.lnext(e_up);
                let b = self.mesh.oprev(e_lo);
                self.mesh.splice(a, b)?;
                reg_lo = reg_up;
                reg_up = self.top_right_region(reg_up);
                let e = self.mesh.rprev(self.e_up(self.below(reg_up)));
                self.regions[reg_lo].e_up = self.mesh.oprev(e_lo);
                let e_lo = self.finish_left_regions(reg_lo, None)?;
                let first = self.mesh.onext(e_lo);
                let last_edge = self.mesh.rprev(e_up);
                let last = self.add_right_edges(reg_up, first, last_edge, Some(e))?;
                return Ok(Some(last));
            }

            // Split whichever edge passes on the wrong side of the event;
            // connect_right_vertex splices the piece in afterwards.
            if edge_sign(p_dst_up, p_event, isect) >= 0.0 {
                let above = self.above(reg_up);
                self.mark_dirty(above);
                self.mark_dirty(reg_up);
                self.mesh.split_edge(e_up ^ 1)?;
                let v = self.mesh.org(e_up);
                self.mesh.verts[v].pos = p_event;
            }
            if edge_sign(p_dst_lo, p_event, isect) <= 0.0 {
                self.mark_dirty(reg_up);
                self.mark_dirty(reg_lo);
                self.mesh.split_edge(e_lo ^ 1)?;
                let v = self.mesh.org(e_lo);
                self.mesh.verts[v].pos = p_event;
            }
            return Ok(None);
        }

        // General case: split both edges and join them at a new vertex.
        self.stats.intersections += 1;
        if self.stats.intersections > self.intersection_limit {
            return Err(TessellationError::IntersectionLimit {
                limit: self.intersection_limit,
            });
        }
        trace!(
            "intersection at {:?} between edges {} and {}",
            isect,
            e_up,
            e_lo
        );
        self.mesh.split_edge(e_up ^ 1)?;
        self.mesh.split_edge(e_lo ^ 1)?;
        let a = self.mesh.oprev(e_lo);
        self.mesh.splice(a, e_up)?;
        let v = self.mesh.org(e_up);
        self.mesh.verts[v].pos = isect;
        self.mesh.verts[v].source = None;
        let handle = self.pq.insert(isect, v)?;
        self.mesh.verts[v].pq_handle = Some(handle);

        let above = self.above(reg_up);
        self.mark_dirty(above);
        self.mark_dirty(reg_up);
        self.mark_dirty(reg_lo);
        Ok(None)
    }

    /// Restore the dictionary invariants around every dirty region, starting
    /// from `reg_up` and working upward. Fixing one pair may dirty others,
    /// so the walk keeps going until no dirty region remains.
    pub(super) fn walk_dirty_regions(&mut self, reg_up: RegionIdx) -> Result<()> {
        let mut reg_up = reg_up;
        let mut reg_lo = self.below(reg_up);

        loop {
            // Find the lowest dirty region.
            while self.regions[reg_lo].dirty {
                reg_up = reg_lo;
                reg_lo = self.below(reg_lo);
            }
            if !self.regions[reg_up].dirty {
                reg_lo = reg_up;
                reg_up = self.above(reg_up);
                if reg_up == INVALID || !self.regions[reg_up].dirty {
                    return Ok(());
                }
            }
            self.regions[reg_up].dirty = false;
            let mut e_up = self.e_up(reg_up);
            let mut e_lo = self.e_up(reg_lo);

            if self.mesh.dst(e_up) != self.mesh.dst(e_lo) && self.check_for_left_splice(reg_up)? {
                // A temporary edge is no longer needed once the
                // destinations were spliced.
                if self.regions[reg_lo].fix_upper_edge {
                    self.delete_region(reg_lo);
                    self.mesh.delete_edge(e_lo)?;
                    reg_lo = self.below(reg_up);
                    e_lo = self.e_up(reg_lo);
                } else if self.regions[reg_up].fix_upper_edge {
                    self.delete_region(reg_up);
                    self.mesh.delete_edge(e_up)?;
                    reg_up = self.above(reg_lo);
                    e_up = self.e_up(reg_up);
                }
            }

            if self.mesh.org(e_up) != self.mesh.org(e_lo) {
                let dst_up = self.mesh.dst(e_up);
                let dst_lo = self.mesh.dst(e_lo);
                if dst_up != dst_lo
                    && !self.regions[reg_up].fix_upper_edge
                    && !self.regions[reg_lo].fix_upper_edge
                    && (dst_up == self.event || dst_lo == self.event)
                {
                    // The event lies between the two edges, so it can serve
                    // as a fallback crossing point.
                    if let Some(next) = self.check_for_intersect(reg_up)? {
                        reg_up = next;
                        reg_lo = self.below(next);
                        continue;
                    }
                } else {
                    // Intersection testing is unsafe here, but the origins
                    // may still be out of order.
                    self.check_for_right_splice(reg_up)?;
                }
            }

            if self.mesh.org(e_up) == self.mesh.org(e_lo) && self.mesh.dst(e_up) == self.mesh.dst(e_lo) {
                // Two-edge loop: fold it into the lower edge.
                self.mesh.add_winding(e_lo, e_up);
                self.delete_region(reg_up);
                self.mesh.delete_edge(e_up)?;
                reg_up = self.above(reg_lo);
            }
        }
    }
}
