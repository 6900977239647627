// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Error taxonomy: the GLU tessellator error codes delivered through the
// ERROR callback, and the mesh-level failures they are built from.

use thiserror::Error;

/// Errors reported by the tessellator. Codes match GLU's `GLU_TESS_*` values
/// so callers bridging to GL-era code can translate them directly.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq, Hash)]
pub enum TessError {
    #[error("missing begin_polygon")]
    MissingBeginPolygon,
    #[error("missing begin_contour")]
    MissingBeginContour,
    #[error("missing end_polygon")]
    MissingEndPolygon,
    #[error("missing end_contour")]
    MissingEndContour,
    #[error("tessellation coordinate too large")]
    CoordTooLarge,
    #[error("need combine callback")]
    NeedCombineCallback,
    #[error("out of memory")]
    OutOfMemory,
    #[error("invalid enumerant")]
    InvalidEnum,
    #[error("invalid value")]
    InvalidValue,
}

impl TessError {
    pub fn code(self) -> u32 {
        match self {
            TessError::MissingBeginPolygon => 100151,
            TessError::MissingBeginContour => 100152,
            TessError::MissingEndPolygon => 100153,
            TessError::MissingEndContour => 100154,
            TessError::CoordTooLarge => 100155,
            TessError::NeedCombineCallback => 100156,
            TessError::InvalidEnum => 100900,
            TessError::InvalidValue => 100901,
            TessError::OutOfMemory => 100902,
        }
    }

    pub fn from_code(code: u32) -> Option<TessError> {
        Some(match code {
            100151 => TessError::MissingBeginPolygon,
            100152 => TessError::MissingBeginContour,
            100153 => TessError::MissingEndPolygon,
            100154 => TessError::MissingEndContour,
            100155 => TessError::CoordTooLarge,
            100156 => TessError::NeedCombineCallback,
            100900 => TessError::InvalidEnum,
            100901 => TessError::InvalidValue,
            100902 => TessError::OutOfMemory,
            _ => return None,
        })
    }

    /// Fatal errors abandon the output of the current polygon. Protocol
    /// and clamping errors leave the call usable.
    pub fn is_fatal(self) -> bool {
        matches!(self, TessError::NeedCombineCallback | TessError::OutOfMemory)
    }
}

/// Failures of half-edge mesh surgery and validation.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum MeshError {
    #[error("mesh arena exhausted")]
    ArenaExhausted,
    #[error("mesh invariant violated at {element} {index}: {reason}")]
    Inconsistent {
        element: &'static str,
        index: u32,
        reason: &'static str,
    },
}

impl From<MeshError> for TessError {
    fn from(err: MeshError) -> Self {
        match err {
            MeshError::ArenaExhausted => TessError::OutOfMemory,
            // A broken mesh can only come from a sweep bug; GLU has no
            // better code for it.
            MeshError::Inconsistent { .. } => TessError::OutOfMemory,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip() {
        let all = [
            TessError::MissingBeginPolygon,
            TessError::MissingBeginContour,
            TessError::MissingEndPolygon,
            TessError::MissingEndContour,
            TessError::CoordTooLarge,
            TessError::NeedCombineCallback,
            TessError::OutOfMemory,
            TessError::InvalidEnum,
            TessError::InvalidValue,
        ];
        for err in all {
            assert_eq!(TessError::from_code(err.code()), Some(err));
        }
        assert_eq!(TessError::from_code(42), None);
    }

    #[test]
    fn only_combine_and_memory_errors_are_fatal() {
        assert!(TessError::NeedCombineCallback.is_fatal());
        assert!(TessError::OutOfMemory.is_fatal());
        assert!(!TessError::CoordTooLarge.is_fatal());
        assert!(!TessError::MissingBeginContour.is_fatal());
    }

    #[test]
    fn messages_name_the_missing_call() {
        assert_eq!(TessError::MissingEndContour.to_string(), "missing end_contour");
        let err = MeshError::Inconsistent {
            element: "face",
            index: 3,
            reason: "broken loop",
        };
        assert_eq!(err.to_string(), "mesh invariant violated at face 3: broken loop");
    }
}
