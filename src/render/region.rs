//! Exact pixel regions
//!
//! Every shape kind is a boolean combination of the outer ellipse, the inner
//! ellipse, angular sectors and half-planes, all in the shape's local
//! (unrotated) frame. The scanline filler asks this module two questions:
//! where a row can change membership, and whether a point is material.

use glam::DVec2;

use crate::types::Degrees;

use super::defaults::{ELLIPSE_NEAR_HIGH, ELLIPSE_NEAR_LOW};
use super::geometry::{
    RowCrossing, Rotation, ellipse_value, local_point_at_angle, signed_distance, unit, x_on_line_at, xs_at_row,
};
use super::types::{GridParity, ShapeDescriptor, ShapeKind};

/// Points this close to an edge count as on it
const EDGE_TOLERANCE: f64 = 1e-9;

/// How far inside a hollow's straight edge a line pixel must be before it
/// is dropped
const HOLLOW_MARGIN: f64 = 0.5;

// ============================================================================
// Primitives
// ============================================================================

/// Angular sector `[start, end]` (counter-clockwise) with its apex anywhere
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sector {
    pub apex: DVec2,
    pub start: DVec2,
    pub end: DVec2,
    /// Sweep above 180°
    pub reflex: bool,
}

impl Sector {
    pub fn new(apex: DVec2, start: Degrees, end: Degrees) -> Self {
        Self {
            apex,
            start: unit(start),
            end: unit(end),
            reflex: end.raw() - start.raw() > 180.0,
        }
    }

    /// Distance from `p` to the nearer edge, negative outside.
    ///
    /// A convex sector is the intersection of the half-planes left of the
    /// start edge and right of the end edge; a reflex one is their union.
    pub fn depth(&self, p: DVec2) -> f64 {
        let v = p - self.apex;
        let past_start = self.start.perp_dot(v);
        let before_end = v.perp_dot(self.end);
        if self.reflex {
            past_start.max(before_end)
        } else {
            past_start.min(before_end)
        }
    }

    pub fn contains(&self, p: DVec2) -> bool {
        self.depth(p) >= -EDGE_TOLERANCE
    }

    /// The two edge lines, each as a pair of points
    pub fn edges(&self) -> [(DVec2, DVec2); 2] {
        [
            (self.apex, self.apex + self.start),
            (self.apex, self.apex + self.end),
        ]
    }
}

/// The closed half-plane on one side of the line through `p0`, `p1`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HalfPlane {
    pub p0: DVec2,
    pub p1: DVec2,
    /// `1.0` when the kept side is left of `p0 -> p1`, else `-1.0`
    pub side: f64,
}

impl HalfPlane {
    /// Half-plane of the line `p0`-`p1` that holds `toward`
    pub fn through(p0: DVec2, p1: DVec2, toward: DVec2) -> Option<Self> {
        if p0 == p1 {
            return None;
        }
        let side = if signed_distance(toward, p0, p1) >= 0.0 { 1.0 } else { -1.0 };
        Some(Self { p0, p1, side })
    }

    /// Signed distance, positive on the kept side
    pub fn depth(&self, p: DVec2) -> f64 {
        self.side * signed_distance(p, self.p0, self.p1)
    }

    pub fn contains(&self, p: DVec2) -> bool {
        self.depth(p) >= -EDGE_TOLERANCE
    }

    /// Unit normal pointing into the kept side
    pub fn normal(&self) -> DVec2 {
        let d = (self.p1 - self.p0).normalize_or_zero();
        DVec2::new(-d.y, d.x) * self.side
    }

    /// The same half-plane with its edge moved `distance` into the kept side
    pub fn shifted(&self, distance: f64) -> Self {
        let offset = self.normal() * distance;
        Self {
            p0: self.p0 + offset,
            p1: self.p1 + offset,
            side: self.side,
        }
    }
}

/// The part of the inner ellipse that is cut away
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Hollow {
    /// Nothing cut away
    Solid,
    /// The whole inner ellipse
    Ring,
    /// Inner ellipse within a sector (pie hollow)
    Sector(Sector),
    /// Inner ellipse on the kept side of a line (chord hollow)
    Cut(HalfPlane),
}

// ============================================================================
// Row candidates
// ============================================================================

/// Where a membership change on a row comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Outer,
    Inner,
    /// A straight edge of the material
    Line,
    /// A straight edge of the hollow
    HollowLine,
}

impl Edge {
    /// Span ends on this edge do not include a pixel lying exactly on it,
    /// so a wall of thickness `t` covers exactly `t` pixels
    pub fn is_exclusive(self) -> bool {
        matches!(self, Edge::Inner | Edge::HollowLine)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub x: f64,
    pub edge: Edge,
}

/// Everything the filler needs to know about one row
#[derive(Debug, Clone, PartialEq)]
pub struct RowCandidates {
    pub outer: RowCrossing,
    pub inner: Option<RowCrossing>,
    /// Sorted by x, deduplicated, all within the outer crossings
    pub xs: Vec<Candidate>,
}

// ============================================================================
// Region
// ============================================================================

/// The exact set of material points of one shape
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub outer: (f64, f64),
    pub inner: Option<(f64, f64)>,
    /// Material is confined to this sector (arc, segment)
    pub sector: Option<Sector>,
    /// Material is confined to this half-plane (chord, true chord)
    pub cut: Option<HalfPlane>,
    pub hollow: Hollow,
}

impl Region {
    pub fn for_shape(desc: &ShapeDescriptor) -> Self {
        let outer = desc.semi_axes();
        let inner = desc.inner_semi_axes();
        let mut region = Region {
            outer,
            inner,
            sector: None,
            cut: None,
            hollow: if inner.is_some() { Hollow::Ring } else { Hollow::Solid },
        };

        if desc.is_full_sweep() {
            return region;
        }

        match desc.kind {
            ShapeKind::Circle | ShapeKind::Ellipse => {}
            ShapeKind::Arc => {
                region.sector = Some(Sector::new(DVec2::ZERO, desc.start, desc.end));
            }
            ShapeKind::Segment => {
                region.sector = Some(Sector::new(DVec2::ZERO, desc.start, desc.end));
                region.hollow = match inner {
                    Some((ai, bi)) => {
                        let apex = segment_apex(desc);
                        // The hollow needs room for both walls
                        if ellipse_value(apex, ai, bi) < 1.0 {
                            Hollow::Sector(Sector::new(apex, desc.start, desc.end))
                        } else {
                            Hollow::Solid
                        }
                    }
                    None => Hollow::Solid,
                };
            }
            ShapeKind::Chord => {
                region.cut = chord_cut(desc);
                if let (Some(cut), Some(_)) = (region.cut, inner) {
                    region.hollow = Hollow::Cut(cut.shifted(desc.wall()));
                }
            }
            ShapeKind::TrueChord => {
                region.cut = chord_cut(desc);
            }
        }

        region
    }

    fn inner_value(&self, p: DVec2) -> Option<f64> {
        self.inner.map(|(ai, bi)| ellipse_value(p, ai, bi))
    }

    /// Inside the cut-away part (closed: its boundary is not material)
    pub fn in_hollow(&self, p: DVec2) -> bool {
        let Some(value) = self.inner_value(p) else {
            return false;
        };
        if value > 1.0 + EDGE_TOLERANCE {
            return false;
        }
        match self.hollow {
            Hollow::Solid => false,
            Hollow::Ring => true,
            Hollow::Sector(sector) => sector.contains(p),
            Hollow::Cut(cut) => cut.contains(p),
        }
    }

    /// Well inside the hollow, clear of every hollow edge
    pub fn deep_in_hollow(&self, p: DVec2) -> bool {
        let Some(value) = self.inner_value(p) else {
            return false;
        };
        if value >= ELLIPSE_NEAR_LOW {
            return false;
        }
        match self.hollow {
            Hollow::Solid => false,
            Hollow::Ring => true,
            Hollow::Sector(sector) => sector.depth(p) >= HOLLOW_MARGIN,
            Hollow::Cut(cut) => cut.depth(p) >= HOLLOW_MARGIN,
        }
    }

    /// On or just outside the inner boundary, within the tuned band, inside
    /// the outer boundary and on the requested side of any cut
    pub fn on_inner_rim(&self, p: DVec2) -> bool {
        let on_rim = self
            .inner_value(p)
            .is_some_and(|v| v >= 1.0 - EDGE_TOLERANCE && v <= ELLIPSE_NEAR_HIGH);
        let (a, b) = self.outer;
        on_rim && ellipse_value(p, a, b) <= 1.0 + EDGE_TOLERANCE && self.cut.is_none_or(|c| c.contains(p))
    }

    /// Whether the local point `p` is material
    pub fn contains(&self, p: DVec2) -> bool {
        let (a, b) = self.outer;
        if ellipse_value(p, a, b) > 1.0 + EDGE_TOLERANCE {
            return false;
        }
        if self.sector.is_some_and(|s| !s.contains(p)) {
            return false;
        }
        if self.cut.is_some_and(|c| !c.contains(p)) {
            return false;
        }
        !self.in_hollow(p)
    }

    /// Every x on row `y` (rotated frame) where membership may change.
    ///
    /// `None` when the row misses the outer ellipse.
    pub fn row_candidates(&self, y: f64, rot: &Rotation, parity: GridParity) -> Option<RowCandidates> {
        let (a, b) = self.outer;
        let outer = xs_at_row(y, rot, a, b, parity)?;
        let inner = self
            .inner
            .and_then(|(ai, bi)| xs_at_row(y, rot, ai, bi, parity));

        let mut xs = vec![
            Candidate { x: outer.left, edge: Edge::Outer },
            Candidate { x: outer.right, edge: Edge::Outer },
        ];
        if let Some(inner) = inner {
            xs.push(Candidate { x: inner.left, edge: Edge::Inner });
            xs.push(Candidate { x: inner.right, edge: Edge::Inner });
        }

        let mut lines: Vec<((DVec2, DVec2), Edge)> = Vec::new();
        if let Some(sector) = self.sector {
            lines.extend(sector.edges().map(|e| (e, Edge::Line)));
        }
        if let Some(cut) = self.cut {
            lines.push(((cut.p0, cut.p1), Edge::Line));
        }
        match self.hollow {
            Hollow::Sector(sector) => lines.extend(sector.edges().map(|e| (e, Edge::HollowLine))),
            Hollow::Cut(cut) => lines.push(((cut.p0, cut.p1), Edge::HollowLine)),
            Hollow::Solid | Hollow::Ring => {}
        }
        for ((p0, p1), edge) in lines {
            if let Some(x) = x_on_line_at(rot.apply(p0), rot.apply(p1), y) {
                xs.push(Candidate { x, edge });
            }
        }

        xs.retain(|c| c.x >= outer.left - EDGE_TOLERANCE && c.x <= outer.right + EDGE_TOLERANCE);
        xs.sort_by(|l, r| l.x.total_cmp(&r.x));

        // Coincident candidates collapse into one; an exclusive edge wins
        let mut merged: Vec<Candidate> = Vec::with_capacity(xs.len());
        for c in xs {
            match merged.last_mut() {
                Some(last) if (c.x - last.x).abs() <= EDGE_TOLERANCE => {
                    if c.edge.is_exclusive() {
                        last.edge = c.edge;
                    }
                }
                _ => merged.push(c),
            }
        }

        Some(RowCandidates { outer, inner, xs: merged })
    }
}

/// Apex of a pie hollow: on the mid-angle ray, far enough out that both
/// straight walls are `wall` thick
pub fn segment_apex(desc: &ShapeDescriptor) -> DVec2 {
    let half = desc.sweep() / 2.0;
    let sin = half.to_radians().sin();
    if sin <= 0.0 {
        return DVec2::ZERO;
    }
    unit(desc.start + Degrees(half)) * (desc.wall() / sin)
}

/// Half-plane of the line through the outer tips that holds the arc
pub fn chord_cut(desc: &ShapeDescriptor) -> Option<HalfPlane> {
    let (a, b) = desc.semi_axes();
    let tip_start = local_point_at_angle(desc.start, a, b)?;
    let tip_end = local_point_at_angle(desc.end, a, b)?;
    let middle = local_point_at_angle(desc.start + Degrees(desc.sweep() / 2.0), a, b)?;
    HalfPlane::through(tip_start, tip_end, middle)
}
