//! Shape rasterization
//!
//! This module is organized into submodules:
//! - `defaults`: Tuned tolerances and step sizes
//! - `types`: Core types like ShapeDescriptor, GridParity, BoundaryLine, Span
//! - `normalize`: Request canonicalization and error codes
//! - `geometry`: Ellipse kernel, lattice snapping, row crossings
//! - `region`: Exact material regions per shape kind
//! - `locator`: Straight boundary lines and their pixels
//! - `truechord`: Chord/hollow contact for true chords
//! - `scanline`: Filled rendering
//! - `outline`: Outlined rendering
//! - `context`: Per-call row arena, pixel list and canvas adapter

pub mod context;
pub mod defaults;
pub mod geometry;
pub mod locator;
pub mod normalize;
pub mod outline;
pub mod region;
pub mod scanline;
pub mod truechord;
pub mod types;

// Re-export commonly used items
pub use context::DrawContext;
pub use normalize::normalize;
pub use types::*;

use enum_dispatch::enum_dispatch;
use glam::{DVec2, IVec2};

use crate::canvas::Canvas;
use crate::errors::ErrorCode;
use crate::log;
use crate::types::{Degrees, Thickness};

use geometry::{Rotation, extreme_point_for_alpha};
use outline::OutlineRasterizer;
use region::Region;
use scanline::FillRasterizer;

// ============================================================================
// Requests
// ============================================================================

/// One draw call as the caller states it.
///
/// Angles and sizes are taken as given; [`normalize`] sorts out negative
/// sizes, angle ranges and shape aliases.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawRequest {
    /// Absolute canvas position of the center (y down)
    pub center: IVec2,
    pub width: i32,
    pub height: i32,
    pub start: Degrees,
    pub end: Degrees,
    /// Counter-clockwise, in degrees
    pub rotation: Degrees,
    /// Shape name with optional modifier substrings, e.g. `"arcchordflipv"`
    pub shape: String,
    /// Wall thickness; negative components ask for an outline
    pub thickness: Thickness,
}

impl DrawRequest {
    /// A solid, unrotated full ellipse
    pub fn new(center: IVec2, width: i32, height: i32) -> Self {
        Self {
            center,
            width,
            height,
            start: Degrees::ZERO,
            end: Degrees::FULL,
            rotation: Degrees::ZERO,
            shape: "ellipse".to_string(),
            thickness: Thickness::SOLID,
        }
    }

    pub fn angles(mut self, start: f64, end: f64) -> Self {
        self.start = Degrees(start);
        self.end = Degrees(end);
        self
    }

    pub fn rotation(mut self, rotation: f64) -> Self {
        self.rotation = Degrees(rotation);
        self
    }

    pub fn shape(mut self, shape: impl Into<String>) -> Self {
        self.shape = shape.into();
        self
    }

    pub fn thickness(mut self, thickness: impl Into<Thickness>) -> Self {
        self.thickness = thickness.into();
        self
    }
}

/// What a draw call did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawOutcome {
    /// Canonical kind, `None` when the shape token was not recognized
    pub kind: Option<ShapeKind>,
    pub error: ErrorCode,
    /// Pixels handed to the canvas
    pub pixels: usize,
}

// ============================================================================
// Plan
// ============================================================================

/// Everything derived from a descriptor before any pixel is produced
#[derive(Debug, Clone)]
pub struct ShapePlan {
    pub desc: ShapeDescriptor,
    pub parity: GridParity,
    pub rot: Rotation,
    pub region: Region,
    pub true_chord: Option<TrueChordState>,
    pub lines: Vec<BoundaryLine>,
    /// Topmost lattice row
    pub top: f64,
}

impl ShapePlan {
    pub fn new(desc: ShapeDescriptor) -> Self {
        let parity = GridParity::for_shape(&desc);
        let rot = Rotation::new(desc.rotation);
        let region = Region::for_shape(&desc);
        let true_chord = match desc.kind {
            ShapeKind::TrueChord => truechord::resolve(&desc, &rot, parity),
            _ => None,
        };
        let lines = locator::boundary_lines(&desc, &region, &rot, parity, true_chord.as_ref());
        let (a, b) = desc.semi_axes();
        let top = extreme_point_for_alpha(&rot, a, b, parity).y;

        Self {
            desc,
            parity,
            rot,
            region,
            true_chord,
            lines,
            top,
        }
    }

    /// Rotated-frame point back in the shape's own frame
    pub fn local(&self, p: DVec2) -> DVec2 {
        self.rot.inverse(p)
    }
}

// ============================================================================
// Rasterizers
// ============================================================================

/// Turns a plan into pixels in a draw context
#[enum_dispatch]
pub trait Rasterize {
    fn rasterize(&self, plan: &ShapePlan, ctx: &mut DrawContext);
}

#[enum_dispatch(Rasterize)]
#[derive(Debug, Clone, Copy)]
pub enum Rasterizer {
    FillRasterizer,
    OutlineRasterizer,
}

impl Rasterizer {
    pub fn for_shape(desc: &ShapeDescriptor) -> Self {
        if desc.filled {
            FillRasterizer.into()
        } else {
            OutlineRasterizer.into()
        }
    }
}

/// Normalize, plan and rasterize one shape onto `canvas`.
///
/// Never fails: problems come back as the additive code in the outcome, and
/// a code of 8 or more means nothing was drawn.
pub fn draw_shape<C: Canvas>(canvas: &mut C, color: C::Color, request: &DrawRequest) -> DrawOutcome {
    let desc = match normalize(request) {
        Ok(desc) => desc,
        Err(error) => {
            return DrawOutcome {
                kind: None,
                error,
                pixels: 0,
            };
        }
    };
    let kind = desc.kind;
    let error = desc.error;
    if !error.is_drawable() {
        log::debug!(kind = %kind, code = error.raw(), "shape not drawn");
        return DrawOutcome {
            kind: Some(kind),
            error,
            pixels: 0,
        };
    }

    let rasterizer = Rasterizer::for_shape(&desc);
    let plan = ShapePlan::new(desc);
    let mut ctx = DrawContext::new(request.center, plan.parity, plan.top);
    rasterizer.rasterize(&plan, &mut ctx);
    let pixels = ctx.flush(canvas, color);

    log::debug!(kind = %kind, code = error.raw(), pixels, "shape drawn");
    DrawOutcome {
        kind: Some(kind),
        error,
        pixels,
    }
}
