// sweep-tess: planar-sweep polygon tessellator
// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)

//! Converts flattened 2D contours (self-intersecting, several loops, holes) into
//! counter-clockwise triangles covering the region selected by a winding rule.
//!
//! ```
//! use sweep_tess::{Point, Tessellator};
//!
//! let mut tess = Tessellator::new();
//! tess.add_contour(&[
//!     Point::new(0.0, 0.0),
//!     Point::new(10.0, 0.0),
//!     Point::new(10.0, 10.0),
//!     Point::new(0.0, 10.0),
//! ]);
//! tess.tessellate().unwrap();
//! assert_eq!(tess.triangles().len(), 2);
//! ```

pub mod bucketalloc;
pub mod dict;
pub mod error;
pub mod geom;
pub mod mesh;
pub mod priorityq;
pub mod sweep;
pub mod tess;

pub use error::{Result, TessellationError};
pub use geom::Point;
pub use tess::{
    ContourHandle, Phase, TessOption, Tessellation, Tessellator, TessellatorOptions, WindingRule,
};
