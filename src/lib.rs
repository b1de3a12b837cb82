//! Exact-pixel rasterizer for rotated elliptical shapes.
//!
//! Draws ellipses, arcs, chords, pie segments and true chords, filled or
//! outlined, with an optional wall thickness and any rotation, onto a
//! [`Canvas`]. Every pixel is decided against the exact region of the
//! shape and written at most once per call.
//!
//! ```
//! use ellarc::{DrawRequest, Raster, Rgba, draw_shape};
//! use glam::ivec2;
//!
//! let mut raster = Raster::new(64, 64);
//! let request = DrawRequest::new(ivec2(32, 32), 40, 24)
//!     .angles(30.0, 300.0)
//!     .rotation(15.0)
//!     .shape("pieslice")
//!     .thickness(3);
//! let outcome = draw_shape(&mut raster, Rgba::BLACK, &request);
//! assert!(outcome.error.is_drawable());
//! assert_eq!(raster.max_writes(), 1);
//! ```

pub mod canvas;
pub mod errors;
pub mod log;
pub mod render;
pub mod types;

pub use canvas::{Canvas, Raster, Rgba};
pub use errors::{ErrorCode, ThicknessError};
pub use render::{DrawOutcome, DrawRequest, ShapeDescriptor, ShapeKind, draw_shape, normalize};
pub use types::{Degrees, Thickness};
