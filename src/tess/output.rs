// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Output extraction: numbers the vertices of inside faces and emits one
// index triple per face.

use crate::error::{invariant, Result};
use crate::geom::Point;
use crate::mesh::{Mesh, INVALID};

/// The result of a tessellation: shared vertices and counter-clockwise index
/// triples into them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Tessellation {
    pub vertices: Vec<Point>,
    pub triangles: Vec<[u32; 3]>,
    /// For each vertex, the index of the input point it came from, or `None`
    /// for vertices created at intersections.
    pub vertex_sources: Vec<Option<u32>>,
}

impl Tessellation {
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// The corner positions of triangle `i`.
    pub fn triangle(&self, i: usize) -> [Point; 3] {
        self.triangles[i].map(|v| self.vertices[v as usize])
    }

    /// Total area covered by the triangles.
    pub fn area(&self) -> f64 {
        (0..self.triangles.len())
            .map(|i| {
                let [a, b, c] = self.triangle(i);
                ((b.x - a.x) * (c.y - a.y) - (c.x - a.x) * (b.y - a.y)) * 0.5
            })
            .sum()
    }
}

/// Collect the inside faces of a fully triangulated mesh. Vertices are
/// numbered in the order they are first met.
pub(crate) fn extract(mesh: &mut Mesh) -> Result<Tessellation> {
    let verts = mesh.verts.indices();
    for &v in &verts {
        mesh.verts[v].n = INVALID;
    }

    let mut out = Tessellation::default();
    for f in mesh.faces.indices() {
        let face = &mesh.faces[f];
        if !face.inside {
            continue;
        }
        let start = face.an_edge;
        let mut tri = [0u32; 3];
        let mut count = 0;
        let mut e = start;
        loop {
            if count == 3 {
                return Err(invariant(format!("inside face {} is not a triangle", f)));
            }
            let org = mesh.org(e);
            let vert = &mut mesh.verts[org];
            if vert.n == INVALID {
                vert.n = out.vertices.len() as u32;
                out.vertices.push(vert.pos);
                out.vertex_sources.push(vert.source);
            }
            tri[count] = vert.n;
            count += 1;
            e = mesh.lnext(e);
            if e == start {
                break;
            }
        }
        if count != 3 {
            return Err(invariant(format!("inside face {} has {} edges", f, count)));
        }
        out.triangles.push(tri);
    }
    Ok(out)
}
