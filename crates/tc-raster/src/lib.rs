// SPDX-License-Identifier: MIT
//! # tc-raster: a tiny 3D pipeline for character cells
//!
//! Turns triangle meshes into colored cells on any [`tc_term::Canvas`],
//! either as wireframes or as depth-buffered solids.
//!
//! # Pipeline
//!
//! ```text
//! Model (static vertices + faces)
//!     │
//!     ▼
//! scene.rs:  Transform × Camera  →  model-view-projection matrix
//!     │
//!     ▼
//! raster.rs: project to cells, Bresenham edges or scanline fill
//!     │
//!     ▼
//! depth.rs:  nearest triangle wins each cell
//!     │
//!     ▼
//! Canvas::draw_pixel
//! ```
//!
//! Character cells are about twice as tall as they are wide, so the camera
//! halves the canvas aspect ratio before projecting. There is no lighting
//! and no clipping: every visible cell of a solid gets the solid's color.

// Single-letter vector components and matrix indices are standard here.
#![allow(clippy::many_single_char_names)]
// Cell coordinates become floats for interpolation and back again.
#![allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
// Exact comparison against zero guards the perspective divide.
#![allow(clippy::float_cmp)]

pub mod depth;
pub mod math;
pub mod model;
pub mod raster;
pub mod scene;

pub use depth::DepthBuffer;
pub use math::{Mat4, Vec3};
pub use model::{CUBE, Model, Triangle};
pub use raster::{draw_line, draw_triangle_filled, draw_triangle_wireframe, project};
pub use scene::{Camera, Rasterizer, Transform};
