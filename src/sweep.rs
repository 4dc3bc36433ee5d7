// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Plane sweep that splits the contour mesh into regions and labels each one
// inside or outside under a winding rule.
//
// Vertices are processed left to right (by x, then y). Every gap between two
// consecutive edges crossing the sweep line is an "active region" kept in the
// edge dictionary, ordered bottom to top at the current event. Finishing a
// region fixes the face to its left. Crossings and near-coincidences are
// resolved as they are found by splitting and splicing edges, so the finished
// mesh is planar and every inside face is x-monotone.
//
// The upper edge of every region points right to left: its origin is right
// of (or at) the sweep line, its destination left of it.

mod splice;

use log::{debug, trace};

use crate::bucketalloc::BucketAlloc;
use crate::dict::{Dict, NodeIdx};
use crate::error::{invariant, Result};
use crate::geom::{edge_eval, edge_sign, vert_eq, vert_leq, Point};
use crate::mesh::{EdgeIdx, Mesh, RegionIdx, VertIdx, INVALID};
use crate::priorityq::PriorityQ;
use crate::tess::WindingRule;

/// The area between two adjacent dictionary edges.
#[derive(Clone, Debug)]
pub struct ActiveRegion {
    /// Upper edge, directed right to left.
    pub e_up: EdgeIdx,
    /// Node in the edge dictionary for this region.
    pub node_up: NodeIdx,
    /// Winding number of the region.
    pub winding_number: i32,
    pub inside: bool,
    /// Marks the two bounding edges far above and below the input.
    pub sentinel: bool,
    /// Upper or lower edge changed; ordering and intersections need a look.
    pub dirty: bool,
    /// The upper edge is a temporary one added for a vertex that had no
    /// right-going edges, and can be replaced.
    pub fix_upper_edge: bool,
}

impl ActiveRegion {
    fn new(e_up: EdgeIdx) -> Self {
        Self {
            e_up,
            node_up: INVALID,
            winding_number: 0,
            inside: false,
            sentinel: false,
            dirty: false,
            fix_upper_edge: false,
        }
    }
}

/// Counters reported once the sweep is done.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepStats {
    pub events: usize,
    pub intersections: usize,
}

/// Ordering of two dictionary edges at `event`: true if `e1` is at or below
/// `e2` where the sweep line crosses them.
///
/// An edge ending exactly at the event is compared by slope against the
/// other one; otherwise both are evaluated at the event's x.
pub fn edge_leq(mesh: &Mesh, event: VertIdx, e1: EdgeIdx, e2: EdgeIdx) -> bool {
    let ev = mesh.pos(event);
    let (o1, d1) = (mesh.org_pos(e1), mesh.dst_pos(e1));
    let (o2, d2) = (mesh.org_pos(e2), mesh.dst_pos(e2));
    let e1_ends = mesh.dst(e1) == event;
    let e2_ends = mesh.dst(e2) == event;

    match (e1_ends, e2_ends) {
        (true, true) => {
            // Both end at the event: compare their right endpoints.
            if vert_leq(o1, o2) {
                edge_sign(d2, o1, o2) <= 0.0
            } else {
                edge_sign(d1, o2, o1) >= 0.0
            }
        }
        (true, false) => edge_sign(d2, ev, o2) <= 0.0,
        (false, true) => edge_sign(d1, ev, o1) >= 0.0,
        (false, false) => edge_eval(d1, ev, o1) >= edge_eval(d2, ev, o2),
    }
}

fn region_leq(
    mesh: &Mesh,
    regions: &BucketAlloc<ActiveRegion>,
    event: VertIdx,
    r1: RegionIdx,
    r2: RegionIdx,
) -> bool {
    edge_leq(mesh, event, regions[r1].e_up, regions[r2].e_up)
}

pub struct Sweep<'m> {
    mesh: &'m mut Mesh,
    dict: Dict,
    regions: BucketAlloc<ActiveRegion>,
    pq: PriorityQ,
    event: VertIdx,
    rule: WindingRule,
    stats: SweepStats,
    intersection_limit: usize,
}

impl<'m> Sweep<'m> {
    pub fn new(mesh: &'m mut Mesh, rule: WindingRule, intersection_limit: usize) -> Result<Self> {
        Ok(Sweep {
            mesh,
            dict: Dict::new()?,
            regions: BucketAlloc::new("active region"),
            pq: PriorityQ::new(),
            event: INVALID,
            rule,
            stats: SweepStats::default(),
            intersection_limit,
        })
    }

    /// Queue every mesh vertex as an event. Returns the number queued.
    pub fn build_queue(&mut self) -> Result<usize> {
        let verts = self.mesh.verts.indices();
        for &v in &verts {
            let pos = self.mesh.pos(v);
            let handle = self.pq.insert(pos, v)?;
            self.mesh.verts[v].pq_handle = Some(handle);
        }
        self.pq.init()?;
        Ok(verts.len())
    }

    /// Add the two horizontal sentinel edges bounding the sweep, with a
    /// margin around the bounding box `bmin..bmax`.
    pub fn add_sentinels(&mut self, bmin: Point, bmax: Point) -> Result<()> {
        let w = (bmax.x - bmin.x) + 0.01;
        let h = (bmax.y - bmin.y) + 0.01;
        let smin = bmin.x - w;
        let smax = bmax.x + w;
        self.add_sentinel(smin, smax, bmin.y - h)?;
        self.add_sentinel(smin, smax, bmax.y + h)
    }

    fn add_sentinel(&mut self, smin: f64, smax: f64, y: f64) -> Result<()> {
        let e = self.mesh.make_edge()?;
        let org = self.mesh.org(e);
        let dst = self.mesh.dst(e);
        self.mesh.verts[org].pos = Point::new(smax, y);
        self.mesh.verts[dst].pos = Point::new(smin, y);
        self.event = dst;

        let mut region = ActiveRegion::new(e);
        region.sentinel = true;
        let reg = self.regions.alloc(region)?;
        let (mesh, regions, event) = (&*self.mesh, &self.regions, self.event);
        let node = self
            .dict
            .insert(reg, |a, b| region_leq(mesh, regions, event, a, b))?;
        self.regions[reg].node_up = node;
        Ok(())
    }

    /// Process every queued event. Vertices at identical positions are
    /// merged as they come off the queue.
    pub fn run(&mut self) -> Result<()> {
        while let Some(v) = self.pq.extract_min() {
            self.mesh.verts[v].pq_handle = None;
            while self.pq.minimum_pos() == Some(self.mesh.pos(v)) {
                let Some(v_next) = self.pq.extract_min() else {
                    break;
                };
                self.mesh.verts[v_next].pq_handle = None;
                let a = self.mesh.verts[v].an_edge;
                let b = self.mesh.verts[v_next].an_edge;
                self.mesh.splice(a, b)?;
            }
            self.sweep_event(v)?;
        }
        Ok(())
    }

    /// Release the dictionary. Only the sentinels and at most one temporary
    /// edge may remain.
    pub fn finish(mut self) -> Result<SweepStats> {
        loop {
            let reg = self.dict.key(self.dict.min());
            if reg == INVALID {
                break;
            }
            let r = &self.regions[reg];
            if !r.sentinel && !r.fix_upper_edge {
                return Err(invariant(format!(
                    "region {} still active after the sweep",
                    reg
                )));
            }
            self.delete_region(reg);
        }
        debug!(
            "sweep finished: {} events, {} intersections",
            self.stats.events, self.stats.intersections
        );
        Ok(self.stats)
    }

    // ─────────────────────────── Region helpers ──────────────────────────────

    #[inline]
    fn below(&self, reg: RegionIdx) -> RegionIdx {
        self.dict.key(self.dict.pred(self.regions[reg].node_up))
    }

    /// INVALID above the top sentinel.
    #[inline]
    fn above(&self, reg: RegionIdx) -> RegionIdx {
        self.dict.key(self.dict.succ(self.regions[reg].node_up))
    }

    #[inline]
    fn e_up(&self, reg: RegionIdx) -> EdgeIdx {
        self.regions[reg].e_up
    }

    fn mark_dirty(&mut self, reg: RegionIdx) {
        if reg != INVALID {
            self.regions[reg].dirty = true;
        }
    }

    fn is_inside(&self, winding: i32) -> bool {
        self.rule.is_inside(winding)
    }

    /// New region below `reg_above` with upper edge `e_new_up`. The winding
    /// number is left for the caller.
    fn add_region_below(&mut self, reg_above: RegionIdx, e_new_up: EdgeIdx) -> Result<RegionIdx> {
        let reg = self.regions.alloc(ActiveRegion::new(e_new_up))?;
        let above_node = self.regions[reg_above].node_up;
        let (mesh, regions, event) = (&*self.mesh, &self.regions, self.event);
        let node = self
            .dict
            .insert_before(above_node, reg, |a, b| region_leq(mesh, regions, event, a, b))?;
        self.regions[reg].node_up = node;
        self.mesh.he_mut(e_new_up).active_region = Some(reg);
        Ok(reg)
    }

    fn delete_region(&mut self, reg: RegionIdx) {
        let r = &self.regions[reg];
        let (e_up, node) = (r.e_up, r.node_up);
        debug_assert!(!r.fix_upper_edge || self.mesh.winding(e_up) == 0);
        self.mesh.he_mut(e_up).active_region = None;
        self.dict.delete(node);
        self.regions.free(reg);
    }

    /// Replace a temporary upper edge with `new_edge`.
    fn fix_upper_edge(&mut self, reg: RegionIdx, new_edge: EdgeIdx) -> Result<()> {
        debug_assert!(self.regions[reg].fix_upper_edge);
        let old = self.e_up(reg);
        self.mesh.delete_edge(old)?;
        let r = &mut self.regions[reg];
        r.fix_upper_edge = false;
        r.e_up = new_edge;
        self.mesh.he_mut(new_edge).active_region = Some(reg);
        Ok(())
    }

    /// First region above `reg` whose upper edge has a different origin. A
    /// temporary edge found there is replaced by a real one first.
    fn top_left_region(&mut self, mut reg: RegionIdx) -> Result<RegionIdx> {
        let org = self.mesh.org(self.e_up(reg));
        loop {
            reg = self.above(reg);
            if self.mesh.org(self.e_up(reg)) != org {
                break;
            }
        }
        if self.regions[reg].fix_upper_edge {
            let a = self.e_up(self.below(reg)) ^ 1;
            let b = self.mesh.lnext(self.e_up(reg));
            let e = self.mesh.connect(a, b)?;
            self.fix_upper_edge(reg, e)?;
            reg = self.above(reg);
        }
        Ok(reg)
    }

    /// First region above `reg` whose upper edge has a different destination.
    fn top_right_region(&self, mut reg: RegionIdx) -> RegionIdx {
        let dst = self.mesh.dst(self.e_up(reg));
        loop {
            reg = self.above(reg);
            if self.mesh.dst(self.e_up(reg)) != dst {
                return reg;
            }
        }
    }

    fn compute_winding(&mut self, reg: RegionIdx) {
        let above = self.regions[self.above(reg)].winding_number;
        let w = above + self.mesh.winding(self.e_up(reg));
        let inside = self.is_inside(w);
        let r = &mut self.regions[reg];
        r.winding_number = w;
        r.inside = inside;
    }

    /// Label the face left of the region's upper edge and drop the region.
    fn finish_region(&mut self, reg: RegionIdx) {
        let e = self.e_up(reg);
        let f = self.mesh.lface(e);
        let face = &mut self.mesh.faces[f];
        face.inside = self.regions[reg].inside;
        face.an_edge = e;
        self.delete_region(reg);
    }

    // ───────────────────────────── Event handling ────────────────────────────

    /// Finish the regions from `reg_first` downward whose edges end at the
    /// event, stopping at `reg_last` (or at the first edge with a different
    /// origin). Returns the lowest left-going edge at the event.
    fn finish_left_regions(&mut self, reg_first: RegionIdx, reg_last: Option<RegionIdx>) -> Result<EdgeIdx> {
        let mut reg_prev = reg_first;
        let mut e_prev = self.e_up(reg_first);
        while Some(reg_prev) != reg_last {
            self.regions[reg_prev].fix_upper_edge = false;
            let reg = self.below(reg_prev);
            let mut e = self.e_up(reg);
            if self.mesh.org(e) != self.mesh.org(e_prev) {
                if !self.regions[reg].fix_upper_edge {
                    self.finish_region(reg_prev);
                    break;
                }
                // The lower edge is temporary: swap it for one ending at the
                // event.
                let a = self.mesh.lprev(e_prev);
                e = self.mesh.connect(a, e ^ 1)?;
                self.fix_upper_edge(reg, e)?;
            }

            // Keep the edge order around the event consistent with the
            // dictionary.
            if self.mesh.onext(e_prev) != e {
                let a = self.mesh.oprev(e);
                self.mesh.splice(a, e)?;
                self.mesh.splice(e_prev, e)?;
            }
            self.finish_region(reg_prev);
            e_prev = self.e_up(reg);
            reg_prev = reg;
        }
        Ok(e_prev)
    }

    /// Insert regions for the right-going edges `e_first ..= e_last` (an
    /// onext range, top to bottom) below `reg_up`, then set their winding
    /// numbers and fix the edge order at their shared origin. `e_top_left`
    /// is the edge just above the new ones in that ring, or `None` to derive
    /// it. Returns the lowest touched region; callers walk the dirty regions
    /// from there.
    fn add_right_edges(
        &mut self,
        reg_up: RegionIdx,
        e_first: EdgeIdx,
        e_last: EdgeIdx,
        e_top_left: Option<EdgeIdx>,
    ) -> Result<RegionIdx> {
        let mut e = e_first;
        loop {
            debug_assert!(vert_leq(self.mesh.org_pos(e), self.mesh.dst_pos(e)));
            self.add_region_below(reg_up, e ^ 1)?;
            e = self.mesh.onext(e);
            if e == e_last {
                break;
            }
        }

        let e_top_left = match e_top_left {
            Some(e) => e,
            None => self.mesh.rprev(self.e_up(self.below(reg_up))),
        };

        let mut reg_prev = reg_up;
        let mut e_prev = e_top_left;
        let mut first_time = true;
        loop {
            let reg = self.below(reg_prev);
            let e = self.e_up(reg) ^ 1;
            if self.mesh.org(e) != self.mesh.org(e_prev) {
                break;
            }

            if self.mesh.onext(e) != e_prev {
                // Unlink e and relink it just below e_prev.
                let a = self.mesh.oprev(e);
                self.mesh.splice(a, e)?;
                let b = self.mesh.oprev(e_prev);
                self.mesh.splice(b, e)?;
            }

            let w = self.regions[reg_prev].winding_number - self.mesh.winding(e);
            let inside = self.is_inside(w);
            let r = &mut self.regions[reg];
            r.winding_number = w;
            r.inside = inside;

            self.regions[reg_prev].dirty = true;
            if !first_time && self.check_for_right_splice(reg_prev)? {
                self.mesh.add_winding(e, e_prev);
                self.delete_region(reg_prev);
                self.mesh.delete_edge(e_prev)?;
            }
            first_time = false;
            reg_prev = reg;
            e_prev = e;
        }
        self.regions[reg_prev].dirty = true;
        Ok(reg_prev)
    }

    fn sweep_event(&mut self, v_event: VertIdx) -> Result<()> {
        loop {
            self.event = v_event;
            self.stats.events += 1;
            trace!("event {} at {:?}", v_event, self.mesh.pos(v_event));

            // Look for an edge at the event that is already in the
            // dictionary.
            let an_edge = self.mesh.verts[v_event].an_edge;
            let mut e = an_edge;
            let active = loop {
                if let Some(reg) = self.mesh.he(e).active_region {
                    break Some(reg);
                }
                e = self.mesh.onext(e);
                if e == an_edge {
                    break None;
                }
            };

            let Some(active) = active else {
                // Every edge goes right.
                if self.connect_left_vertex(v_event)? {
                    continue;
                }
                return Ok(());
            };

            // Close the regions ending at the event, then add the
            // right-going edges.
            let reg_up = self.top_left_region(active)?;
            let reg = self.below(reg_up);
            let e_top_left = self.e_up(reg);
            let e_bottom_left = self.finish_left_regions(reg, None)?;

            if self.mesh.onext(e_bottom_left) == e_top_left {
                self.connect_right_vertex(reg_up, e_bottom_left)?;
            } else {
                let first = self.mesh.onext(e_bottom_left);
                let last = self.add_right_edges(reg_up, first, e_top_left, Some(e_top_left))?;
                self.walk_dirty_regions(last)?;
            }
            return Ok(());
        }
    }

    /// The event has left-going edges only. Fix up any intersection or
    /// coincidence with the edges around it, then connect it to a vertex on
    /// the right with a temporary edge so the region stays monotone.
    fn connect_right_vertex(&mut self, mut reg_up: RegionIdx, mut e_bottom_left: EdgeIdx) -> Result<()> {
        let mut e_top_left = self.mesh.onext(e_bottom_left);
        let reg_lo = self.below(reg_up);
        let e_up = self.e_up(reg_up);
        let e_lo = self.e_up(reg_lo);
        let mut degenerate = false;

        if self.mesh.dst(e_up) != self.mesh.dst(e_lo) {
            if let Some(reg) = self.check_for_intersect(reg_up)? {
                self.walk_dirty_regions(reg)?;
            }
        }

        // The upper or lower edge may now pass through the event.
        let event_pos = self.mesh.pos(self.event);
        if vert_eq(self.mesh.org_pos(e_up), event_pos) {
            let a = self.mesh.oprev(e_top_left);
            self.mesh.splice(a, e_up)?;
            reg_up = self.top_left_region(reg_up)?;
            let below = self.below(reg_up);
            e_top_left = self.e_up(below);
            self.finish_left_regions(below, Some(reg_lo))?;
            degenerate = true;
        }
        if vert_eq(self.mesh.org_pos(e_lo), event_pos) {
            let b = self.mesh.oprev(e_lo);
            self.mesh.splice(e_bottom_left, b)?;
            e_bottom_left = self.finish_left_regions(reg_lo, None)?;
            degenerate = true;
        }
        if degenerate {
            let first = self.mesh.onext(e_bottom_left);
            let last = self.add_right_edges(reg_up, first, e_top_left, Some(e_top_left))?;
            return self.walk_dirty_regions(last);
        }

        // Connect to the closer of the two right endpoints.
        let target = if vert_leq(self.mesh.org_pos(e_lo), self.mesh.org_pos(e_up)) {
            self.mesh.oprev(e_lo)
        } else {
            e_up
        };
        let a = self.mesh.lprev(e_bottom_left);
        let e_new = self.mesh.connect(a, target)?;

        // No cleanup yet: e_new must be marked temporary before anything can
        // remove it.
        let after = self.mesh.onext(e_new);
        self.add_right_edges(reg_up, e_new, after, Some(after))?;
        let reg = self
            .mesh
            .he(e_new ^ 1)
            .active_region
            .ok_or_else(|| invariant("temporary edge has no region"))?;
        self.regions[reg].fix_upper_edge = true;
        self.walk_dirty_regions(reg_up)
    }

    /// The event lies on (or at an endpoint of) the upper edge of `reg_up`.
    /// Returns true when the event must be swept again.
    fn connect_left_degenerate(&mut self, reg_up: RegionIdx, v_event: VertIdx) -> Result<bool> {
        let e = self.e_up(reg_up);
        let event_pos = self.mesh.pos(v_event);

        if vert_eq(self.mesh.org_pos(e), event_pos) {
            // e->Org is still queued: merge and wait for it.
            let an = self.mesh.verts[v_event].an_edge;
            self.mesh.splice(e, an)?;
            return Ok(false);
        }

        if !vert_eq(self.mesh.dst_pos(e), event_pos) {
            // The event lies in the middle of e: split e there.
            self.mesh.split_edge(e ^ 1)?;
            if self.regions[reg_up].fix_upper_edge {
                // Drop the unused part of the temporary edge.
                let unused = self.mesh.onext(e);
                self.mesh.delete_edge(unused)?;
                self.regions[reg_up].fix_upper_edge = false;
            }
            let an = self.mesh.verts[v_event].an_edge;
            self.mesh.splice(an, e)?;
            return Ok(true);
        }

        // The event coincides with e->Dst, which was already processed:
        // splice in the extra right-going edges.
        let reg_up = self.top_right_region(reg_up);
        let reg = self.below(reg_up);
        let mut e_top_right = self.e_up(reg) ^ 1;
        let e_last = self.mesh.onext(e_top_right);
        if self.regions[reg].fix_upper_edge {
            // The only right-going edge was temporary.
            self.delete_region(reg);
            self.mesh.delete_edge(e_top_right)?;
            e_top_right = self.mesh.oprev(e_last);
        }
        let an = self.mesh.verts[v_event].an_edge;
        self.mesh.splice(an, e_top_right)?;
        let e_top_left = if self.mesh.edge_goes_left(e_last) {
            Some(e_last)
        } else {
            None
        };
        let first = self.mesh.onext(e_top_right);
        let last = self.add_right_edges(reg_up, first, e_last, e_top_left)?;
        self.walk_dirty_regions(last)?;
        Ok(false)
    }

    /// The event has no processed neighbors. Locate the region containing
    /// it; inside regions get a connecting edge so they stay monotone.
    /// Returns true when the event must be swept again.
    fn connect_left_vertex(&mut self, v_event: VertIdx) -> Result<bool> {
        let an_edge = self.mesh.verts[v_event].an_edge;

        let probe = self.regions.alloc(ActiveRegion::new(an_edge ^ 1))?;
        let node = {
            let (mesh, regions, event) = (&*self.mesh, &self.regions, self.event);
            self.dict
                .search(probe, |a, b| region_leq(mesh, regions, event, a, b))
        };
        self.regions.free(probe);

        let reg_up = self.dict.key(node);
        if reg_up == INVALID {
            return Err(invariant(format!("vertex {} lies above the sweep bounds", v_event)));
        }
        let reg_lo = self.below(reg_up);
        if reg_lo == INVALID {
            return Ok(false);
        }
        let e_up = self.e_up(reg_up);
        let e_lo = self.e_up(reg_lo);

        let event_pos = self.mesh.pos(v_event);
        if edge_sign(self.mesh.dst_pos(e_up), event_pos, self.mesh.org_pos(e_up)) == 0.0 {
            return self.connect_left_degenerate(reg_up, v_event);
        }

        // Connect to the closer of the two left endpoints.
        let reg = if vert_leq(self.mesh.dst_pos(e_lo), self.mesh.dst_pos(e_up)) {
            reg_up
        } else {
            reg_lo
        };

        if self.regions[reg_up].inside || self.regions[reg].fix_upper_edge {
            let e_new = if reg == reg_up {
                let b = self.mesh.lnext(e_up);
                self.mesh.connect(an_edge ^ 1, b)?
            } else {
                let a = self.mesh.dnext(e_lo);
                self.mesh.connect(a, an_edge)? ^ 1
            };
            if self.regions[reg].fix_upper_edge {
                self.fix_upper_edge(reg, e_new)?;
            } else {
                let new_reg = self.add_region_below(reg_up, e_new)?;
                self.compute_winding(new_reg);
            }
            Ok(true)
        } else {
            // Outside the fill: no connection needed.
            let last = self.add_right_edges(reg_up, an_edge, an_edge, None)?;
            self.walk_dirty_regions(last)?;
            Ok(false)
        }
    }
}
