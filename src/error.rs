// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Error taxonomy for the tessellation pipeline.

use thiserror::Error;

use crate::tess::ContourHandle;

/// Everything that can stop a tessellation.
///
/// Near-degenerate geometry is never reported here: the sweep resolves it by
/// clamping and splicing. Every variant is terminal for the `Tessellator` that
/// produced it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TessellationError {
    /// An arena could not grow.
    #[error("allocation failed while growing the {0} arena")]
    AllocationFailure(&'static str),

    /// The mesh or sweep state broke one of its structural invariants.
    #[error("internal invariant violated: {0}")]
    InvariantViolation(String),

    /// Fewer than three distinct vertices survived cleanup.
    #[error("input has {distinct} distinct vertices after cleanup, at least 3 are required")]
    DegenerateTopology { distinct: usize },

    /// A coordinate was NaN, infinite, or too large to sweep safely.
    #[error("invalid coordinate ({x}, {y}) for input point {index}")]
    InvalidCoordinate { index: u32, x: f64, y: f64 },

    /// A point or end-of-contour was issued against a contour that is not open.
    #[error("contour {0:?} is not the open contour")]
    ContourMismatch(ContourHandle),

    /// The sweep synthesized more intersection vertices than allowed.
    #[error("sweep synthesized more than {limit} intersection vertices")]
    IntersectionLimit { limit: usize },

    /// `tessellate` was already called on this instance.
    #[error("tessellator already ran, construct a new one")]
    AlreadyTessellated,
}

pub type Result<T> = std::result::Result<T, TessellationError>;

pub(crate) fn invariant(msg: impl Into<String>) -> TessellationError {
    TessellationError::InvariantViolation(msg.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        let e = TessellationError::DegenerateTopology { distinct: 2 };
        assert_eq!(
            e.to_string(),
            "input has 2 distinct vertices after cleanup, at least 3 are required"
        );
        let e = TessellationError::AllocationFailure("vertex");
        assert!(e.to_string().contains("vertex"));
    }

    #[test]
    fn invariant_helper_wraps_message() {
        assert_eq!(
            invariant("lnext cycle open"),
            TessellationError::InvariantViolation("lnext cycle open".to_string())
        );
    }
}
