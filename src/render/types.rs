//! Core value types shared by the rasterization stages
//!
//! Everything here is built fresh for one draw call and dropped with it.

use std::fmt;

use glam::DVec2;

use crate::errors::ErrorCode;
use crate::types::Degrees;

// ============================================================================
// Shape descriptor
// ============================================================================

/// Canonical shape family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Arc,
    Chord,
    Segment,
    TrueChord,
    Circle,
    Ellipse,
}

impl ShapeKind {
    /// Full-turn shapes ignore start/end angles
    pub fn is_closed(self) -> bool {
        matches!(self, Self::Circle | Self::Ellipse)
    }

    /// Shapes whose open ends are closed by a straight line between the tips
    pub fn is_chordal(self) -> bool {
        matches!(self, Self::Chord | Self::TrueChord)
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ShapeKind::Arc => "arc",
            ShapeKind::Chord => "chord",
            ShapeKind::Segment => "segment",
            ShapeKind::TrueChord => "truechord",
            ShapeKind::Circle => "circle",
            ShapeKind::Ellipse => "ellipse",
        };
        f.write_str(name)
    }
}

/// Modifier flags carried in the shape token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    /// Mirror top/bottom (`flipv`)
    pub flip_v: bool,
    /// Mirror left/right (`fliph`)
    pub flip_h: bool,
    /// Draw the complementary sweep (`comp`)
    pub complement: bool,
    /// Remove the outermost rows and isolated pixels (`trim`)
    pub trim: bool,
    /// Remove isolated pixels (`smooth`)
    pub smooth: bool,
}

impl Modifiers {
    /// Isolated-pixel suppression is active
    pub fn suppresses_isolated(self) -> bool {
        self.trim || self.smooth
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flags = [
            (self.trim, "trim"),
            (self.smooth, "smooth"),
            (self.flip_v, "flipv"),
            (self.flip_h, "fliph"),
            (self.complement, "comp"),
        ];
        let names: Vec<&str> = flags.iter().filter(|(on, _)| *on).map(|(_, n)| *n).collect();
        if names.is_empty() {
            f.write_str("-")
        } else {
            f.write_str(&names.join("+"))
        }
    }
}

/// A shape request after normalization.
///
/// Invariants once `error.is_drawable()`: `width >= height > 0`,
/// `start` in `[0, 360)`, `start < end <= start + 360`, thickness strictly
/// below each semi-axis.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeDescriptor {
    pub kind: ShapeKind,
    /// Outer width in pixels (the larger dimension)
    pub width: u32,
    /// Outer height in pixels
    pub height: u32,
    pub start: Degrees,
    pub end: Degrees,
    /// Rotation, counter-clockwise, in `[0, 360)`
    pub rotation: Degrees,
    /// Wall thickness along the shape's own x axis (0 = solid)
    pub thickness_x: u32,
    /// Wall thickness along the shape's own y axis (0 = solid)
    pub thickness_y: u32,
    /// Filled (scanline) rather than outlined
    pub filled: bool,
    pub modifiers: Modifiers,
    /// Width and height were exchanged (and 90° added) to keep width >= height
    pub radii_swapped: bool,
    pub error: ErrorCode,
}

impl ShapeDescriptor {
    pub fn sweep(&self) -> f64 {
        self.end.raw() - self.start.raw()
    }

    pub fn is_full_sweep(&self) -> bool {
        self.sweep() >= 360.0
    }

    /// Outer semi-axes `(a, b)`
    pub fn semi_axes(&self) -> (f64, f64) {
        (self.width as f64 / 2.0, self.height as f64 / 2.0)
    }

    /// Inner semi-axes, or `None` for a solid shape
    pub fn inner_semi_axes(&self) -> Option<(f64, f64)> {
        if self.thickness_x == 0 && self.thickness_y == 0 {
            return None;
        }
        let (a, b) = self.semi_axes();
        let inner = (a - self.thickness_x as f64, b - self.thickness_y as f64);
        (inner.0 > 0.0 && inner.1 > 0.0).then_some(inner)
    }

    /// Thickness of straight walls (radial sides, chord wall)
    pub fn wall(&self) -> f64 {
        self.thickness_x.min(self.thickness_y) as f64
    }
}

// ============================================================================
// Grid parity
// ============================================================================

/// Which lattice each screen axis snaps to.
///
/// An odd axis has an odd pixel count and a pixel on the center, so it snaps
/// to integers; an even axis snaps to half-integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridParity {
    pub x_odd: bool,
    pub y_odd: bool,
}

impl GridParity {
    /// Parity for a normalized shape.
    ///
    /// A shape spanning `w` pixels covers `w + 1` lattice positions, so an
    /// even dimension is an odd axis. At exactly 90° or 270° the screen axes
    /// see the shape's height and width the other way round.
    pub fn for_shape(desc: &ShapeDescriptor) -> Self {
        let rotation = desc.rotation.to_360().raw();
        let (screen_w, screen_h) = if rotation == 90.0 || rotation == 270.0 {
            (desc.height, desc.width)
        } else {
            (desc.width, desc.height)
        };
        Self {
            x_odd: screen_w % 2 == 0,
            y_odd: screen_h % 2 == 0,
        }
    }
}

// ============================================================================
// Boundary lines
// ============================================================================

/// Which side of a boundary line holds no material
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExcludedSide {
    Left,
    Right,
    Top,
    Bottom,
    None,
}

/// What a boundary line bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineRole {
    /// Start-angle side of an arc or segment
    StartFace,
    /// End-angle side of an arc or segment
    EndFace,
    /// Straight side of a chord or true chord, joining the outer tips
    Chord,
    /// Straight side of a chord's hollow, joining the inner tips
    InnerChord,
}

impl LineRole {
    /// Lines whose own pixels are material (drawn), as opposed to lines that
    /// only bound a hollow
    pub fn bounds_material(self) -> bool {
        !matches!(self, LineRole::InnerChord)
    }
}

/// A straight boundary between two lattice points (rotated frame).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryLine {
    pub start: DVec2,
    pub end: DVec2,
    pub excluded: ExcludedSide,
    pub role: LineRole,
}

impl BoundaryLine {
    pub fn is_degenerate(&self) -> bool {
        self.start == self.end
    }
}

// ============================================================================
// True chord
// ============================================================================

/// How the truncating chord of a true chord meets the inner boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChordContact {
    /// No inner boundary, or the chord stays clear of it
    Clear,
    /// The chord grazes the inner boundary
    Tangential,
    /// The chord cuts through the hollow
    Intersecting,
}

/// Resolved true-chord geometry.
///
/// `p` and `q` lie on the inner boundary (or are the chord endpoints when
/// the chord never reaches it), rotated but not snapped; `p` is the one
/// nearer the start angle. The adjacent pixels are their lattice snaps,
/// taken just outside the hollow when the chord reaches it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrueChordState {
    pub contact: ChordContact,
    pub p: DVec2,
    pub q: DVec2,
    /// True angles (unrotated frame) of `p` and `q`
    pub p_angle: Degrees,
    pub q_angle: Degrees,
    pub p_adjacent: DVec2,
    pub q_adjacent: DVec2,
    /// Slope of the chord in the rotated frame, clamped; `None` when vertical
    pub slope: Option<f64>,
    /// The inner boundary lies on the requested side of the chord
    pub inner_on_requested_side: bool,
    /// Draw the chord as an explicit line
    pub draw_line: bool,
}

impl TrueChordState {
    pub fn is_tangential(&self) -> bool {
        self.contact == ChordContact::Tangential
    }
}

// ============================================================================
// Rows
// ============================================================================

/// Per-row limits no span may cross.
///
/// `outer` holds the left/right lattice tips of the outer boundary; `inner`
/// the continuous x range of the hollow. Rows without a hollow get a
/// reversed sentinel pair so "inside the hollow" is always false.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowExclusionSet {
    pub outer: (f64, f64),
    pub inner: (f64, f64),
}

impl RowExclusionSet {
    pub const EMPTY: RowExclusionSet = RowExclusionSet {
        outer: (f64::INFINITY, f64::NEG_INFINITY),
        inner: (f64::INFINITY, f64::NEG_INFINITY),
    };

    /// Inside the outer tips (inclusive)
    pub fn within_outer(&self, x: f64) -> bool {
        x >= self.outer.0 && x <= self.outer.1
    }

    /// Strictly inside the hollow
    pub fn inside_hollow(&self, x: f64) -> bool {
        x > self.inner.0 && x < self.inner.1
    }
}

impl Default for RowExclusionSet {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// A half-open run of lattice x values `[start, end)` on one row.
///
/// Consecutive spans share no pixel: a span's `end` is the next one's
/// earliest possible `start`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    pub start: f64,
    pub end: f64,
}

impl Span {
    /// Span covering the inclusive lattice range `first..=last`
    pub fn inclusive(first: f64, last: f64) -> Self {
        Self {
            start: first,
            end: last + 1.0,
        }
    }

    /// Last covered lattice value
    pub fn last(&self) -> f64 {
        self.end - 1.0
    }

    pub fn len(&self) -> usize {
        (self.end - self.start).round().max(0.0) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_single(&self) -> bool {
        self.len() == 1
    }
}
