// glu-tess: GLU-style polygon tessellation and winding booleans in Rust
// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)

pub mod arena;
pub mod dict;
pub mod error;
pub mod geom;
pub mod mesh;
pub mod point;
pub mod priorityq;
pub mod sweep;
pub mod tess;
pub mod winding;

pub use error::{MeshError, TessError};
pub use geom::Real;
pub use point::{Point, Polygon};
pub use sweep::WindingRule;
pub use tess::run::{run, run_with, Primitive, TessOptions, TessOutput, DEFAULT_OPTIONS};
pub use tess::{Callback, CallbackKind, GluTesselator, PolygonMesh, PrimitiveType, TessProperty, TessState};
pub use winding::{Bounds, WindingOrder};
