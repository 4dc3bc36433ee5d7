// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Public tessellator API.
//
// A `Tessellator` collects contours, then `tessellate` runs the whole pipeline
// once: degenerate-edge cleanup, the plane sweep that labels faces inside or
// outside, degenerate-face cleanup, monotone triangulation and output
// extraction. Input problems are recorded as they happen and reported by
// `tessellate`; any failure leaves the instance in `Phase::Failed`.

mod output;

use log::debug;

pub use self::output::Tessellation;

use crate::error::{Result, TessellationError};
use crate::geom::{vert_leq, Point};
use crate::mesh::{EdgeIdx, Mesh};
use crate::sweep::Sweep;

/// Largest coordinate magnitude accepted. Products of two coordinate
/// differences in the predicates must stay finite.
pub const MAX_COORD: f64 = 1e150;

/// Which regions count as inside, by winding number.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum WindingRule {
    /// Odd winding numbers.
    #[default]
    Odd,
    /// Any non-zero winding number.
    NonZero,
    Positive,
    Negative,
    /// |winding| >= 2.
    AbsGeqTwo,
}

impl WindingRule {
    pub fn is_inside(self, winding: i32) -> bool {
        match self {
            WindingRule::Odd => winding & 1 != 0,
            WindingRule::NonZero => winding != 0,
            WindingRule::Positive => winding > 0,
            WindingRule::Negative => winding < 0,
            WindingRule::AbsGeqTwo => winding.unsigned_abs() >= 2,
        }
    }
}

/// Per-contour toggles, set between contours.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TessOption {
    /// Add following contours with the opposite orientation.
    ReverseContours,
}

/// Construction-time settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TessellatorOptions {
    pub winding_rule: WindingRule,
    /// Maximum number of intersection vertices the sweep may create.
    /// `None` derives a bound from the input size.
    pub intersection_limit: Option<usize>,
    /// Run the mesh consistency check after the sweep.
    pub check_mesh: bool,
}

impl Default for TessellatorOptions {
    fn default() -> Self {
        Self {
            winding_rule: WindingRule::Odd,
            intersection_limit: None,
            check_mesh: true,
        }
    }
}

impl TessellatorOptions {
    pub fn with_winding_rule(mut self, rule: WindingRule) -> Self {
        self.winding_rule = rule;
        self
    }

    pub fn with_intersection_limit(mut self, limit: usize) -> Self {
        self.intersection_limit = Some(limit);
        self
    }

    pub fn with_check_mesh(mut self, check: bool) -> Self {
        self.check_mesh = check;
        self
    }

    /// The limit in effect for a mesh of `vertex_count` vertices.
    fn limit_for(&self, vertex_count: usize) -> usize {
        self.intersection_limit.unwrap_or_else(|| {
            vertex_count
                .saturating_mul(vertex_count)
                .saturating_mul(4)
                .max(4096)
        })
    }
}

/// Names one contour between `begin_contour` and `end_contour`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ContourHandle(u32);

impl ContourHandle {
    pub fn id(self) -> u32 {
        self.0
    }
}

/// Where a `Tessellator` is in its single run.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Accepting contours.
    Init,
    BoundingBoxComputed,
    PriorityQueueBuilt,
    Sweeping,
    InteriorComputed,
    Tessellated,
    OutputExtracted,
    Done,
    Failed,
}

struct OpenContour {
    handle: ContourHandle,
    /// Edge whose origin is the most recent point; `None` until one is added.
    last: Option<EdgeIdx>,
}

pub struct Tessellator {
    options: TessellatorOptions,
    reverse_contours: bool,
    mesh: Mesh,
    phase: Phase,
    open: Option<OpenContour>,
    next_handle: u32,
    /// Index given to the next accepted input point.
    next_source: u32,
    /// First input error, reported by `tessellate`.
    input_error: Option<TessellationError>,
    output: Tessellation,
}

impl Default for Tessellator {
    fn default() -> Self {
        Self::new()
    }
}

impl Tessellator {
    pub fn new() -> Self {
        Self::with_options(TessellatorOptions::default())
    }

    pub fn with_options(options: TessellatorOptions) -> Self {
        Tessellator {
            options,
            reverse_contours: false,
            mesh: Mesh::new(),
            phase: Phase::Init,
            open: None,
            next_handle: 0,
            next_source: 0,
            input_error: None,
            output: Tessellation::default(),
        }
    }

    pub fn options(&self) -> &TessellatorOptions {
        &self.options
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn set_option(&mut self, option: TessOption, value: bool) {
        match option {
            TessOption::ReverseContours => self.reverse_contours = value,
        }
    }

    // ─────── Contour input ─────────────────────────────────────────────────

    /// Open a new contour. A contour still open is closed first.
    pub fn begin_contour(&mut self) -> ContourHandle {
        if let Some(prev) = self.open.take() {
            debug!("contour {} closed implicitly", prev.handle.0);
        }
        let handle = ContourHandle(self.next_handle);
        self.next_handle += 1;
        self.open = Some(OpenContour { handle, last: None });
        handle
    }

    /// Append a point to the open contour. The contour is closed back to its
    /// first point implicitly.
    pub fn contour_point(&mut self, handle: ContourHandle, x: f64, y: f64) {
        if self.input_error.is_some() || self.phase != Phase::Init {
            return;
        }
        let last = match &self.open {
            Some(open) if open.handle == handle => open.last,
            _ => {
                self.input_error = Some(TessellationError::ContourMismatch(handle));
                return;
            }
        };
        if !is_valid_coord(x) || !is_valid_coord(y) {
            self.input_error = Some(TessellationError::InvalidCoordinate {
                index: self.next_source,
                x,
                y,
            });
            return;
        }
        match self.append_point(last, Point::new(x, y)) {
            Ok(e) => {
                if let Some(open) = self.open.as_mut() {
                    open.last = Some(e);
                }
            }
            Err(err) => self.input_error = Some(err),
        }
    }

    /// Close the open contour.
    pub fn end_contour(&mut self, handle: ContourHandle) {
        if self.input_error.is_some() {
            return;
        }
        match &self.open {
            Some(open) if open.handle == handle => self.open = None,
            _ => self.input_error = Some(TessellationError::ContourMismatch(handle)),
        }
    }

    /// Add a whole contour in one call.
    pub fn add_contour(&mut self, points: &[Point]) {
        let handle = self.begin_contour();
        for p in points {
            self.contour_point(handle, p.x, p.y);
        }
        self.end_contour(handle);
    }

    /// Grow the contour loop by one vertex after `last` (or start it) and
    /// return the edge whose origin is the new vertex.
    fn append_point(&mut self, last: Option<EdgeIdx>, pos: Point) -> Result<EdgeIdx> {
        let mesh = &mut self.mesh;
        let e = match last {
            None => {
                // A self-loop: one vertex, one edge.
                let e = mesh.make_edge()?;
                mesh.splice(e, e ^ 1)?;
                e
            }
            Some(last) => {
                mesh.split_edge(last)?;
                mesh.lnext(last)
            }
        };

        let org = mesh.org(e);
        let v = &mut mesh.verts[org];
        v.pos = pos;
        v.source = Some(self.next_source);
        self.next_source += 1;

        // The left face is the interior for counter-clockwise input.
        let w = if self.reverse_contours { -1 } else { 1 };
        mesh.he_mut(e).winding = w;
        mesh.he_mut(e ^ 1).winding = -w;
        Ok(e)
    }

    // ─────── Pipeline ──────────────────────────────────────────────────────

    /// Run the tessellation. Callable once per instance.
    pub fn tessellate(&mut self) -> Result<()> {
        if self.phase != Phase::Init {
            return Err(TessellationError::AlreadyTessellated);
        }
        if let Some(err) = self.input_error.take() {
            self.phase = Phase::Failed;
            debug!("tessellation rejected: {}", err);
            return Err(err);
        }
        self.open = None;

        match self.run() {
            Ok(()) => {
                self.phase = Phase::Done;
                Ok(())
            }
            Err(err) => {
                self.phase = Phase::Failed;
                debug!("tessellation failed: {}", err);
                Err(err)
            }
        }
    }

    fn enter(&mut self, phase: Phase) {
        debug!("phase {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
    }

    fn run(&mut self) -> Result<()> {
        debug!("tessellating {} input points", self.next_source);
        self.mesh.remove_degenerate_edges()?;

        let distinct = distinct_positions(&self.mesh);
        if distinct < 3 {
            return Err(TessellationError::DegenerateTopology { distinct });
        }

        let (bmin, bmax) = bounding_box(&self.mesh);
        self.enter(Phase::BoundingBoxComputed);

        let limit = self.options.limit_for(self.mesh.verts.len());
        let rule = self.options.winding_rule;
        let mut sweep = Sweep::new(&mut self.mesh, rule, limit)?;
        let queued = sweep.build_queue()?;
        debug!("phase {:?} -> {:?} ({} events)", self.phase, Phase::PriorityQueueBuilt, queued);
        self.phase = Phase::PriorityQueueBuilt;

        sweep.add_sentinels(bmin, bmax)?;
        debug!("phase {:?} -> {:?}", self.phase, Phase::Sweeping);
        self.phase = Phase::Sweeping;
        sweep.run()?;
        sweep.finish()?;

        self.mesh.remove_degenerate_faces()?;
        if self.options.check_mesh {
            self.mesh.check()?;
        }
        self.enter(Phase::InteriorComputed);

        self.mesh.tessellate_interior()?;
        self.enter(Phase::Tessellated);

        self.output = output::extract(&mut self.mesh)?;
        self.enter(Phase::OutputExtracted);
        debug!(
            "{} triangles over {} vertices",
            self.output.triangles.len(),
            self.output.vertices.len()
        );
        self.mesh = Mesh::new();
        Ok(())
    }

    // ─────── Output ────────────────────────────────────────────────────────

    pub fn vertices(&self) -> &[Point] {
        &self.output.vertices
    }

    /// Counter-clockwise triangles indexing `vertices()`.
    pub fn triangles(&self) -> &[[u32; 3]] {
        &self.output.triangles
    }

    /// Input point index for every output vertex; `None` for vertices created
    /// at intersections.
    pub fn vertex_sources(&self) -> &[Option<u32>] {
        &self.output.vertex_sources
    }

    pub fn output(&self) -> &Tessellation {
        &self.output
    }

    pub fn into_output(self) -> Tessellation {
        self.output
    }
}

fn is_valid_coord(c: f64) -> bool {
    c.is_finite() && c.abs() <= MAX_COORD
}

fn distinct_positions(mesh: &Mesh) -> usize {
    let mut pts: Vec<Point> = mesh.verts.iter().map(|(_, v)| v.pos).collect();
    pts.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    pts.dedup();
    pts.len()
}

fn bounding_box(mesh: &Mesh) -> (Point, Point) {
    let mut bmin = Point::new(f64::INFINITY, f64::INFINITY);
    let mut bmax = Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
    for (_, v) in mesh.verts.iter() {
        bmin.x = bmin.x.min(v.pos.x);
        bmin.y = bmin.y.min(v.pos.y);
        bmax.x = bmax.x.max(v.pos.x);
        bmax.y = bmax.y.max(v.pos.y);
    }
    debug_assert!(vert_leq(bmin, bmax));
    (bmin, bmax)
}
