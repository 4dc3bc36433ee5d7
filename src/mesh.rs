// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Half-edge mesh (Guibas/Stolfi quad-edge restricted to the plane).
//
// Every topological object lives in a `BucketAlloc` arena and is addressed by
// a u32 index:
//   - half-edges are allocated in pairs; pair `p` holds edges `2p` and
//     `2p + 1`, so `sym(e) = e ^ 1`
//   - INVALID (u32::MAX) stands in for "no object"
//
// The operations follow the classic primitives: make_edge, splice,
// delete_edge, add_edge_vertex, split_edge and connect. Each keeps the vertex
// rings (onext) and face loops (lnext) closed and re-points `org` / `lface`
// of every affected edge.

pub mod cleanup;
pub mod monotone;

use crate::bucketalloc::BucketAlloc;
use crate::error::{invariant, Result};
use crate::geom::{vert_leq, Point};
use crate::priorityq::PqHandle;

pub const INVALID: u32 = u32::MAX;

/// Index into `Mesh::verts`
pub type VertIdx = u32;
/// Index into `Mesh::faces`
pub type FaceIdx = u32;
/// Half-edge index; the pair slot is `e >> 1`.
pub type EdgeIdx = u32;
/// Index of a sweep region (owned by the sweep, recorded on edges).
pub type RegionIdx = u32;

/// The other half of the pair.
#[inline(always)]
pub fn sym(e: EdgeIdx) -> EdgeIdx {
    e ^ 1
}

#[derive(Clone, Debug)]
pub struct Vertex {
    /// Some half-edge with this vertex as its origin.
    pub an_edge: EdgeIdx,
    pub pos: Point,
    /// Set while the vertex waits in the event queue.
    pub pq_handle: Option<PqHandle>,
    /// Output slot, assigned during extraction.
    pub n: u32,
    /// Input point this vertex came from; `None` for intersections.
    pub source: Option<u32>,
}

#[derive(Clone, Debug)]
pub struct Face {
    /// Some half-edge with this face on its left.
    pub an_edge: EdgeIdx,
    /// Whether the face lies in the filled region.
    pub inside: bool,
}

#[derive(Clone, Debug)]
pub struct HalfEdge {
    /// Next edge counter-clockwise around the origin.
    pub onext: EdgeIdx,
    /// Next edge counter-clockwise around the left face.
    pub lnext: EdgeIdx,
    pub org: VertIdx,
    pub lface: FaceIdx,
    /// Sweep region whose upper edge this is, while the edge is active.
    pub active_region: Option<RegionIdx>,
    /// Change in winding number when crossing from the right face to the left.
    pub winding: i32,
}

impl Default for HalfEdge {
    fn default() -> Self {
        Self {
            onext: INVALID,
            lnext: INVALID,
            org: INVALID,
            lface: INVALID,
            active_region: None,
            winding: 0,
        }
    }
}

pub struct Mesh {
    pub verts: BucketAlloc<Vertex>,
    pub faces: BucketAlloc<Face>,
    edges: BucketAlloc<[HalfEdge; 2]>,
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}

impl Mesh {
    pub fn new() -> Self {
        Mesh {
            verts: BucketAlloc::new("vertex"),
            faces: BucketAlloc::new("face"),
            edges: BucketAlloc::new("edge"),
        }
    }

    // ─────────────────────────────── Navigation ──────────────────────────────

    #[inline]
    pub fn he(&self, e: EdgeIdx) -> &HalfEdge {
        &self.edges[e >> 1][(e & 1) as usize]
    }

    #[inline]
    pub fn he_mut(&mut self, e: EdgeIdx) -> &mut HalfEdge {
        &mut self.edges[e >> 1][(e & 1) as usize]
    }

    #[inline]
    pub fn org(&self, e: EdgeIdx) -> VertIdx {
        self.he(e).org
    }

    #[inline]
    pub fn dst(&self, e: EdgeIdx) -> VertIdx {
        self.he(e ^ 1).org
    }

    #[inline]
    pub fn onext(&self, e: EdgeIdx) -> EdgeIdx {
        self.he(e).onext
    }

    #[inline]
    pub fn lnext(&self, e: EdgeIdx) -> EdgeIdx {
        self.he(e).lnext
    }

    #[inline]
    pub fn lface(&self, e: EdgeIdx) -> FaceIdx {
        self.he(e).lface
    }

    #[inline]
    pub fn rface(&self, e: EdgeIdx) -> FaceIdx {
        self.he(e ^ 1).lface
    }

    /// Sym->Lnext
    #[inline]
    pub fn oprev(&self, e: EdgeIdx) -> EdgeIdx {
        self.he(e ^ 1).lnext
    }

    /// Onext->Sym
    #[inline]
    pub fn lprev(&self, e: EdgeIdx) -> EdgeIdx {
        self.he(e).onext ^ 1
    }

    /// Sym->Onext
    #[inline]
    pub fn rprev(&self, e: EdgeIdx) -> EdgeIdx {
        self.he(e ^ 1).onext
    }

    /// Rprev->Sym
    #[inline]
    pub fn dnext(&self, e: EdgeIdx) -> EdgeIdx {
        self.he(e ^ 1).onext ^ 1
    }

    #[inline]
    pub fn winding(&self, e: EdgeIdx) -> i32 {
        self.he(e).winding
    }

    #[inline]
    pub fn pos(&self, v: VertIdx) -> Point {
        self.verts[v].pos
    }

    #[inline]
    pub fn org_pos(&self, e: EdgeIdx) -> Point {
        self.pos(self.org(e))
    }

    #[inline]
    pub fn dst_pos(&self, e: EdgeIdx) -> Point {
        self.pos(self.dst(e))
    }

    #[inline]
    pub fn edge_goes_left(&self, e: EdgeIdx) -> bool {
        vert_leq(self.dst_pos(e), self.org_pos(e))
    }

    #[inline]
    pub fn edge_goes_right(&self, e: EdgeIdx) -> bool {
        vert_leq(self.org_pos(e), self.dst_pos(e))
    }

    /// Live half-edge `e`?
    pub fn edge_is_live(&self, e: EdgeIdx) -> bool {
        self.edges.is_live(e >> 1)
    }

    /// Snapshot of one half-edge (the even one) per live edge pair.
    pub fn edge_pairs(&self) -> Vec<EdgeIdx> {
        self.edges.indices().into_iter().map(|p| p << 1).collect()
    }

    /// Number of live edge pairs.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Number of edges around the left face of `e`.
    pub fn loop_len(&self, e: EdgeIdx) -> usize {
        let mut n = 1;
        let mut cur = self.lnext(e);
        while cur != e {
            n += 1;
            cur = self.lnext(cur);
        }
        n
    }

    // ─────────────────────────── Allocation helpers ──────────────────────────

    /// New isolated edge pair: each half is its own origin ring, and the two
    /// halves form one face loop.
    fn make_edge_pair(&mut self) -> Result<EdgeIdx> {
        let p = self
            .edges
            .alloc([HalfEdge::default(), HalfEdge::default()])?;
        let e = p << 1;
        let es = e ^ 1;
        {
            let h = self.he_mut(e);
            h.onext = e;
            h.lnext = es;
        }
        {
            let h = self.he_mut(es);
            h.onext = es;
            h.lnext = e;
        }
        Ok(e)
    }

    /// New vertex owning the origin ring of `e_orig`.
    fn make_vertex(&mut self, e_orig: EdgeIdx, pos: Point) -> Result<VertIdx> {
        let v = self.verts.alloc(Vertex {
            an_edge: e_orig,
            pos,
            pq_handle: None,
            n: INVALID,
            source: None,
        })?;
        let mut e = e_orig;
        loop {
            self.he_mut(e).org = v;
            e = self.onext(e);
            if e == e_orig {
                break;
            }
        }
        Ok(v)
    }

    /// New face owning the left loop of `e_orig`.
    fn make_face(&mut self, e_orig: EdgeIdx, inside: bool) -> Result<FaceIdx> {
        let f = self.faces.alloc(Face {
            an_edge: e_orig,
            inside,
        })?;
        let mut e = e_orig;
        loop {
            self.he_mut(e).lface = f;
            e = self.lnext(e);
            if e == e_orig {
                break;
            }
        }
        Ok(f)
    }

    /// Free `v_del`, re-pointing its ring at `new_org` (INVALID to orphan it).
    fn kill_vertex(&mut self, v_del: VertIdx, new_org: VertIdx) {
        let e_start = self.verts[v_del].an_edge;
        let mut e = e_start;
        loop {
            self.he_mut(e).org = new_org;
            e = self.onext(e);
            if e == e_start {
                break;
            }
        }
        self.verts.free(v_del);
    }

    /// Free `f_del`, re-pointing its loop at `new_lface` (INVALID to orphan it).
    fn kill_face(&mut self, f_del: FaceIdx, new_lface: FaceIdx) {
        let e_start = self.faces[f_del].an_edge;
        let mut e = e_start;
        loop {
            self.he_mut(e).lface = new_lface;
            e = self.lnext(e);
            if e == e_start {
                break;
            }
        }
        self.faces.free(f_del);
    }

    fn kill_edge(&mut self, e: EdgeIdx) {
        self.edges.free(e >> 1);
    }

    /// Exchange a->Onext and b->Onext, fixing the lnext links that point at
    /// them. Does not touch `org` or `lface`.
    fn raw_splice(&mut self, a: EdgeIdx, b: EdgeIdx) {
        let a_onext = self.onext(a);
        let b_onext = self.onext(b);
        self.he_mut(a_onext ^ 1).lnext = b;
        self.he_mut(b_onext ^ 1).lnext = a;
        self.he_mut(a).onext = b_onext;
        self.he_mut(b).onext = a_onext;
    }

    // ───────────────────────────── Public operations ─────────────────────────

    /// One edge, two vertices, one face (outside).
    pub fn make_edge(&mut self) -> Result<EdgeIdx> {
        let e = self.make_edge_pair()?;
        self.make_vertex(e, Point::default())?;
        self.make_vertex(e ^ 1, Point::default())?;
        self.make_face(e, false)?;
        Ok(e)
    }

    /// Exchange e_org->Onext and e_dst->Onext.
    ///
    /// If the two origins differ they are merged (e_dst's vertex is freed);
    /// otherwise the ring is split and e_dst gets a new vertex at the same
    /// position. Faces behave the same way: distinct left faces merge into
    /// e_org's, a shared one is split in two.
    pub fn splice(&mut self, e_org: EdgeIdx, e_dst: EdgeIdx) -> Result<()> {
        if e_org == e_dst {
            return Ok(());
        }

        let org_org = self.org(e_org);
        let dst_org = self.org(e_dst);
        let org_lface = self.lface(e_org);
        let dst_lface = self.lface(e_dst);

        let joining_vertices = dst_org != org_org;
        if joining_vertices {
            self.kill_vertex(dst_org, org_org);
        }
        let joining_loops = dst_lface != org_lface;
        if joining_loops {
            self.kill_face(dst_lface, org_lface);
        }

        self.raw_splice(e_dst, e_org);

        if !joining_vertices {
            let pos = self.verts[org_org].pos;
            self.make_vertex(e_dst, pos)?;
            self.verts[org_org].an_edge = e_org;
        }
        if !joining_loops {
            let inside = self.faces[org_lface].inside;
            self.make_face(e_dst, inside)?;
            self.faces[org_lface].an_edge = e_org;
        }
        Ok(())
    }

    /// Remove `e_del`. Its two faces merge, or if they were the same face it
    /// splits. Vertices left without edges are freed.
    pub fn delete_edge(&mut self, e_del: EdgeIdx) -> Result<()> {
        let e_del_sym = e_del ^ 1;

        let joining_loops = self.lface(e_del) != self.rface(e_del);
        if joining_loops {
            let lf = self.lface(e_del);
            let rf = self.rface(e_del);
            self.kill_face(lf, rf);
        }

        if self.onext(e_del) == e_del {
            let org = self.org(e_del);
            self.kill_vertex(org, INVALID);
        } else {
            let rf = self.rface(e_del);
            let oprev = self.oprev(e_del);
            self.faces[rf].an_edge = oprev;
            let org = self.org(e_del);
            let onext = self.onext(e_del);
            self.verts[org].an_edge = onext;

            self.raw_splice(e_del, oprev);
            if !joining_loops {
                let lf = self.lface(e_del);
                let inside = self.faces[lf].inside;
                self.make_face(e_del, inside)?;
            }
        }

        if self.onext(e_del_sym) == e_del_sym {
            let org = self.org(e_del_sym);
            self.kill_vertex(org, INVALID);
            let lf = self.lface(e_del_sym);
            self.kill_face(lf, INVALID);
        } else {
            let lf = self.lface(e_del);
            let sym_oprev = self.oprev(e_del_sym);
            self.faces[lf].an_edge = sym_oprev;
            let org = self.org(e_del_sym);
            let onext = self.onext(e_del_sym);
            self.verts[org].an_edge = onext;
            self.raw_splice(e_del_sym, sym_oprev);
        }

        self.kill_edge(e_del);
        Ok(())
    }

    /// New edge `e_new = e_org->Lnext` whose destination is a new vertex.
    /// Both share e_org's left face.
    pub fn add_edge_vertex(&mut self, e_org: EdgeIdx) -> Result<EdgeIdx> {
        let e_new = self.make_edge_pair()?;
        let e_new_sym = e_new ^ 1;

        let lnext = self.lnext(e_org);
        self.raw_splice(e_new, lnext);

        let dst = self.dst(e_org);
        self.he_mut(e_new).org = dst;
        let pos = self.verts[dst].pos;
        self.make_vertex(e_new_sym, pos)?;

        let lf = self.lface(e_org);
        self.he_mut(e_new).lface = lf;
        self.he_mut(e_new_sym).lface = lf;
        Ok(e_new)
    }

    /// Split `e_org` in two by inserting a vertex; returns the second half
    /// `e_new = e_org->Lnext`. The new vertex starts at e_org's old
    /// destination position; callers move it. Winding is copied to both halves.
    pub fn split_edge(&mut self, e_org: EdgeIdx) -> Result<EdgeIdx> {
        let temp = self.add_edge_vertex(e_org)?;
        let e_new = temp ^ 1;
        let e_org_sym = e_org ^ 1;

        // Disconnect e_org from its destination and reconnect it to e_new's
        // origin.
        let sym_oprev = self.oprev(e_org_sym);
        self.raw_splice(e_org_sym, sym_oprev);
        self.raw_splice(e_org_sym, e_new);

        let new_org = self.org(e_new);
        self.he_mut(e_org_sym).org = new_org;
        let new_dst = self.dst(e_new);
        self.verts[new_dst].an_edge = e_new ^ 1;

        let rf = self.rface(e_org);
        self.he_mut(e_new ^ 1).lface = rf;
        let w = self.winding(e_org);
        let ws = self.winding(e_org_sym);
        self.he_mut(e_new).winding = w;
        self.he_mut(e_new ^ 1).winding = ws;
        Ok(e_new)
    }

    /// New edge from e_org->Dst to e_dst->Org. If the two left faces differ
    /// they merge; otherwise the face is split and the new edge's left side
    /// gets a new face.
    pub fn connect(&mut self, e_org: EdgeIdx, e_dst: EdgeIdx) -> Result<EdgeIdx> {
        let e_new = self.make_edge_pair()?;
        let e_new_sym = e_new ^ 1;

        let org_lface = self.lface(e_org);
        let dst_lface = self.lface(e_dst);
        let joining_loops = dst_lface != org_lface;
        if joining_loops {
            self.kill_face(dst_lface, org_lface);
        }

        let lnext = self.lnext(e_org);
        self.raw_splice(e_new, lnext);
        self.raw_splice(e_new_sym, e_dst);

        let a = self.dst(e_org);
        let b = self.org(e_dst);
        self.he_mut(e_new).org = a;
        self.he_mut(e_new_sym).org = b;
        self.he_mut(e_new).lface = org_lface;
        self.he_mut(e_new_sym).lface = org_lface;

        self.faces[org_lface].an_edge = e_new_sym;

        if !joining_loops {
            let inside = self.faces[org_lface].inside;
            self.make_face(e_new, inside)?;
        }
        Ok(e_new)
    }

    // ───────────────────────────── Consistency check ─────────────────────────

    /// Verify the structural invariants of every live face, vertex and edge.
    pub fn check(&self) -> Result<()> {
        let limit = 2 * self.edges.len() + 1;

        for (f, face) in self.faces.iter() {
            let e_start = face.an_edge;
            if !self.edge_is_live(e_start) {
                return Err(invariant(format!("face {} has a dead edge {}", f, e_start)));
            }
            let mut e = e_start;
            let mut steps = 0;
            loop {
                self.check_links(e)?;
                if self.lface(e) != f {
                    return Err(invariant(format!("edge {} in loop of face {} has lface {}", e, f, self.lface(e))));
                }
                e = self.lnext(e);
                steps += 1;
                if e == e_start {
                    break;
                }
                if steps > limit {
                    return Err(invariant(format!("face {} loop does not close", f)));
                }
            }
        }

        for (v, vert) in self.verts.iter() {
            let e_start = vert.an_edge;
            if !self.edge_is_live(e_start) {
                return Err(invariant(format!("vertex {} has a dead edge {}", v, e_start)));
            }
            let mut e = e_start;
            let mut steps = 0;
            loop {
                self.check_links(e)?;
                if self.org(e) != v {
                    return Err(invariant(format!("edge {} in ring of vertex {} has org {}", e, v, self.org(e))));
                }
                e = self.onext(e);
                steps += 1;
                if e == e_start {
                    break;
                }
                if steps > limit {
                    return Err(invariant(format!("vertex {} ring does not close", v)));
                }
            }
        }

        for e in self.edge_pairs() {
            for h in [e, e ^ 1] {
                self.check_links(h)?;
                if !self.verts.is_live(self.org(h)) {
                    return Err(invariant(format!("edge {} has no origin", h)));
                }
                if !self.faces.is_live(self.lface(h)) {
                    return Err(invariant(format!("edge {} has no left face", h)));
                }
            }
        }
        Ok(())
    }

    fn check_links(&self, e: EdgeIdx) -> Result<()> {
        let onext = self.onext(e);
        let lnext = self.lnext(e);
        if !self.edge_is_live(onext) || !self.edge_is_live(lnext) {
            return Err(invariant(format!("edge {} links to a dead edge", e)));
        }
        if self.onext(lnext) ^ 1 != e {
            return Err(invariant(format!("edge {}: lnext->onext->sym is not the edge", e)));
        }
        if self.lnext(onext ^ 1) != e {
            return Err(invariant(format!("edge {}: onext->sym->lnext is not the edge", e)));
        }
        Ok(())
    }
}
