//! Geometry kernel: closed-form math on rotated ellipses
//!
//! All functions are pure. Coordinates are relative to the shape center with
//! y up; "local" means the shape's own unrotated frame. Degenerate input
//! (a zero semi-axis, coincident points, a negative discriminant) yields
//! `None` instead of a point.

use glam::{DVec2, dvec2};

use crate::types::Degrees;

use super::defaults::{SLOPE_LIMIT, SNAP_EPSILON};
use super::types::GridParity;

/// Rows whose squared half-width is above this (in px²) still touch the
/// ellipse; absorbs round-off at the top and bottom rows.
const TOUCH_TOLERANCE: f64 = 1e-6;

/// Unit vector at `angle`, exact on the axes
pub fn unit(angle: Degrees) -> DVec2 {
    let a = angle.to_360().raw();
    if a == 0.0 {
        dvec2(1.0, 0.0)
    } else if a == 90.0 {
        dvec2(0.0, 1.0)
    } else if a == 180.0 {
        dvec2(-1.0, 0.0)
    } else if a == 270.0 {
        dvec2(0.0, -1.0)
    } else {
        let (sin, cos) = a.to_radians().sin_cos();
        dvec2(cos, sin)
    }
}

/// Counter-clockwise rotation by a fixed angle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rotation {
    pub angle: Degrees,
    pub cos: f64,
    pub sin: f64,
}

impl Rotation {
    pub fn new(angle: Degrees) -> Self {
        let angle = angle.to_360();
        let u = unit(angle);
        Self {
            angle,
            cos: u.x,
            sin: u.y,
        }
    }

    /// Local frame to rotated frame
    #[inline]
    pub fn apply(&self, v: DVec2) -> DVec2 {
        dvec2(v.x * self.cos - v.y * self.sin, v.x * self.sin + v.y * self.cos)
    }

    /// Rotated frame back to local frame
    #[inline]
    pub fn inverse(&self, v: DVec2) -> DVec2 {
        dvec2(v.x * self.cos + v.y * self.sin, -v.x * self.sin + v.y * self.cos)
    }
}

// ============================================================================
// Lattice snapping
// ============================================================================

#[inline]
fn lattice_offset(odd: bool) -> f64 {
    if odd { 0.0 } else { 0.5 }
}

/// Snap toward zero onto the integer (odd) or half-integer (even) lattice.
///
/// The magnitude never grows. On the half-integer lattice the result always
/// ends in `.5`, so values under 0.5 in magnitude snap out to ±0.5, the
/// innermost half-integer line.
pub fn grid_adjust(value: f64, odd: bool) -> f64 {
    let magnitude = value.abs();
    let snapped = if odd {
        (magnitude + SNAP_EPSILON).floor()
    } else {
        ((magnitude + 0.5 + SNAP_EPSILON).floor() - 0.5).max(0.5)
    };
    if value < 0.0 { -snapped } else { snapped }
}

/// Snap away from zero onto the lattice; the magnitude never shrinks
pub fn grid_adjust_outward(value: f64, odd: bool) -> f64 {
    let magnitude = value.abs();
    let snapped = if odd {
        (magnitude - SNAP_EPSILON).ceil().max(0.0)
    } else {
        ((magnitude - 0.5 - SNAP_EPSILON).ceil() + 0.5).max(0.5)
    };
    if value < 0.0 { -snapped } else { snapped }
}

/// Smallest lattice value `>= x`
pub fn lattice_ceil(x: f64, odd: bool) -> f64 {
    let off = lattice_offset(odd);
    (x - off - SNAP_EPSILON).ceil() + off
}

/// Largest lattice value `<= x`
pub fn lattice_floor(x: f64, odd: bool) -> f64 {
    let off = lattice_offset(odd);
    (x - off + SNAP_EPSILON).floor() + off
}

/// Smallest lattice value strictly above `x`
pub fn lattice_above(x: f64, odd: bool) -> f64 {
    let off = lattice_offset(odd);
    (x - off + SNAP_EPSILON).floor() + 1.0 + off
}

/// Largest lattice value strictly below `x`
pub fn lattice_below(x: f64, odd: bool) -> f64 {
    let off = lattice_offset(odd);
    (x - off - SNAP_EPSILON).ceil() - 1.0 + off
}

/// Nearest lattice value (ties away from the center)
pub fn lattice_round(x: f64, odd: bool) -> f64 {
    let off = lattice_offset(odd);
    if odd {
        x.round()
    } else {
        // Half-integer lattice: ties sit on integers, push them outward
        let shifted = x - off;
        if x >= 0.0 {
            (shifted + SNAP_EPSILON).round() + off
        } else {
            (shifted - SNAP_EPSILON).round() + off
        }
    }
}

// ============================================================================
// Points on the ellipse
// ============================================================================

/// Distance from the center to the boundary along the ray at `theta`
pub fn polar_radius(theta: Degrees, a: f64, b: f64) -> Option<f64> {
    if a <= 0.0 || b <= 0.0 {
        return None;
    }
    let u = unit(theta);
    let denom = ((b * u.x).powi(2) + (a * u.y).powi(2)).sqrt();
    (denom > 0.0).then(|| a * b / denom)
}

/// Boundary point at true angle `theta`, local frame, unsnapped
pub fn local_point_at_angle(theta: Degrees, a: f64, b: f64) -> Option<DVec2> {
    polar_radius(theta, a, b).map(|r| unit(theta) * r)
}

/// Boundary point at true angle `phi` of the ellipse rotated by `rot`,
/// snapped onto the lattice with [`grid_adjust`].
pub fn point_at_angle(
    phi: Degrees,
    rot: &Rotation,
    a: f64,
    b: f64,
    parity: GridParity,
) -> Option<DVec2> {
    let p = rot.apply(local_point_at_angle(phi, a, b)?);
    Some(dvec2(grid_adjust(p.x, parity.x_odd), grid_adjust(p.y, parity.y_odd)))
}

/// Value of the ellipse equation; below 1 inside, above 1 outside
#[inline]
pub fn ellipse_value(local: DVec2, a: f64, b: f64) -> f64 {
    (local.x / a).powi(2) + (local.y / b).powi(2)
}

/// Polar angle of a local-frame point in `[0, 360)`
pub fn true_angle(local: DVec2) -> Degrees {
    Degrees(local.y.atan2(local.x).to_degrees()).to_360()
}

/// Where one row crosses a rotated ellipse
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowCrossing {
    pub left: f64,
    pub right: f64,
    /// True angles (local frame) of the two crossings
    pub left_angle: Degrees,
    pub right_angle: Degrees,
    /// Outermost lattice values inside the crossing pair
    pub left_px: f64,
    pub right_px: f64,
}

/// Solve the rotated-ellipse quadratic for the x values on row `y`.
///
/// Returns the two crossings left-most first, or `None` when the row misses
/// the ellipse. The single touching point of the top or bottom row comes
/// back as a pair with `left == right`.
pub fn xs_at_row(y: f64, rot: &Rotation, a: f64, b: f64, parity: GridParity) -> Option<RowCrossing> {
    if a <= 0.0 || b <= 0.0 {
        return None;
    }

    let (c, s) = (rot.cos, rot.sin);
    let inv_a2 = 1.0 / (a * a);
    let inv_b2 = 1.0 / (b * b);

    let qa = c * c * inv_a2 + s * s * inv_b2;
    let qb = 2.0 * y * c * s * (inv_a2 - inv_b2);
    let qc = y * y * (s * s * inv_a2 + c * c * inv_b2) - 1.0;

    let mid = -qb / (2.0 * qa);
    let mut half_width_sq = (qb * qb - 4.0 * qa * qc) / (4.0 * qa * qa);
    if half_width_sq < 0.0 {
        if half_width_sq < -TOUCH_TOLERANCE {
            return None;
        }
        half_width_sq = 0.0;
    }
    let half_width = half_width_sq.sqrt();
    let (left, right) = (mid - half_width, mid + half_width);

    Some(RowCrossing {
        left,
        right,
        left_angle: true_angle(rot.inverse(dvec2(left, y))),
        right_angle: true_angle(rot.inverse(dvec2(right, y))),
        left_px: lattice_ceil(left, parity.x_odd),
        right_px: lattice_floor(right, parity.x_odd),
    })
}

/// Topmost point of the rotated ellipse, snapped.
///
/// At exactly 0/90/180/270 degrees the answer is taken from the semi-axes
/// directly; going through sin/cos there can land a hair under the true
/// extent and lose a whole row.
pub fn extreme_point_for_alpha(rot: &Rotation, a: f64, b: f64, parity: GridParity) -> DVec2 {
    let alpha = rot.angle.raw();
    if alpha == 0.0 || alpha == 180.0 {
        return dvec2(0.0, grid_adjust(b, parity.y_odd));
    }
    if alpha == 90.0 || alpha == 270.0 {
        return dvec2(0.0, grid_adjust(a, parity.y_odd));
    }

    let (c, s) = (rot.cos, rot.sin);
    let y = (a * a * s * s + b * b * c * c).sqrt();
    let qa = c * c / (a * a) + s * s / (b * b);
    let x = -y * c * s * (1.0 / (a * a) - 1.0 / (b * b)) / qa;
    dvec2(grid_adjust(x, parity.x_odd), grid_adjust(y, parity.y_odd))
}

/// Where the ray from `origin` at `theta` leaves the ellipse (local frame)
pub fn ray_exit(origin: DVec2, theta: Degrees, a: f64, b: f64) -> Option<DVec2> {
    if a <= 0.0 || b <= 0.0 {
        return None;
    }
    let d = unit(theta);
    let qa = (d.x / a).powi(2) + (d.y / b).powi(2);
    let qb = 2.0 * (origin.x * d.x / (a * a) + origin.y * d.y / (b * b));
    let qc = ellipse_value(origin, a, b) - 1.0;
    let disc = qb * qb - 4.0 * qa * qc;
    if disc < 0.0 {
        return None;
    }
    let t = (-qb + disc.sqrt()) / (2.0 * qa);
    (t >= 0.0).then(|| origin + d * t)
}

/// Both points where the infinite line through `p0`, `p1` meets the
/// ellipse (local frame), ordered from `p0` toward `p1`.
pub fn line_ellipse_intersections(p0: DVec2, p1: DVec2, a: f64, b: f64) -> Option<(DVec2, DVec2)> {
    if a <= 0.0 || b <= 0.0 {
        return None;
    }
    let d = p1 - p0;
    if d == DVec2::ZERO {
        return None;
    }
    let qa = (d.x / a).powi(2) + (d.y / b).powi(2);
    let qb = 2.0 * (p0.x * d.x / (a * a) + p0.y * d.y / (b * b));
    let qc = ellipse_value(p0, a, b) - 1.0;
    let disc = qb * qb - 4.0 * qa * qc;
    if disc < 0.0 {
        return None;
    }
    let root = disc.sqrt();
    let t0 = (-qb - root) / (2.0 * qa);
    let t1 = (-qb + root) / (2.0 * qa);
    Some((p0 + d * t0, p0 + d * t1))
}

// ============================================================================
// Straight lines
// ============================================================================

/// Slope `dy/dx` of a direction; `None` when vertical or steeper than
/// [`SLOPE_LIMIT`]
pub fn clamped_slope(d: DVec2) -> Option<f64> {
    if d.x == 0.0 {
        return None;
    }
    let slope = d.y / d.x;
    (slope.abs() <= SLOPE_LIMIT).then_some(slope)
}

/// x where the infinite line through `p0`, `p1` crosses row `y`; `None` for
/// horizontal or degenerate lines
pub fn x_on_line_at(p0: DVec2, p1: DVec2, y: f64) -> Option<f64> {
    let d = p1 - p0;
    if d.y == 0.0 {
        return None;
    }
    match clamped_slope(d) {
        None => Some(p0.x),
        Some(slope) => Some(p0.x + (y - p0.y) / slope),
    }
}

/// y where the infinite line through `p0`, `p1` crosses column `x`
pub fn y_on_line_at(p0: DVec2, p1: DVec2, x: f64) -> Option<f64> {
    let d = p1 - p0;
    if d.x == 0.0 {
        return None;
    }
    match clamped_slope(d) {
        None => None,
        Some(slope) => Some(p0.y + (x - p0.x) * slope),
    }
}

/// Signed distance from `p` to the line through `p0`, `p1`; positive on the
/// left of the direction `p0 -> p1`
pub fn signed_distance(p: DVec2, p0: DVec2, p1: DVec2) -> f64 {
    let d = p1 - p0;
    let len = d.length();
    if len == 0.0 {
        return (p - p0).length();
    }
    d.perp_dot(p - p0) / len
}

#[cfg(test)]
mod tests {
    use super::*;

    const ODD: GridParity = GridParity { x_odd: true, y_odd: true };
    const EVEN: GridParity = GridParity { x_odd: false, y_odd: false };

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn grid_adjust_odd_never_grows() {
        for v in [-10.7, -3.2, -0.4, 0.0, 0.9, 4.99, 9.5, 12.0] {
            let g = grid_adjust(v, true);
            assert!(g.abs() <= v.abs().floor() + 1e-12, "{v} -> {g}");
            assert_eq!(g.fract(), 0.0);
        }
    }

    #[test]
    fn grid_adjust_even_ends_in_half() {
        for v in [-10.7, -3.2, -0.4, 0.0, 0.9, 4.99, 9.5, 12.0] {
            let g = grid_adjust(v, false);
            assert_eq!(g.abs().fract(), 0.5, "{v} -> {g}");
        }
        assert_eq!(grid_adjust(9.7, false), 9.5);
        assert_eq!(grid_adjust(9.4, false), 8.5);
        assert_eq!(grid_adjust(-9.4, false), -8.5);
    }

    #[test]
    fn grid_adjust_absorbs_round_off() {
        assert_eq!(grid_adjust(9.999_999_999_9, true), 10.0);
        assert_eq!(grid_adjust(10.499_999_999_9, false), 10.5);
    }

    #[test]
    fn grid_adjust_outward_never_shrinks() {
        assert_eq!(grid_adjust_outward(10.23, true), 11.0);
        assert_eq!(grid_adjust_outward(-33.47, true), -34.0);
        assert_eq!(grid_adjust_outward(35.000_000_000_1, true), 35.0);
        assert_eq!(grid_adjust_outward(1e-15, true), 0.0);
        assert_eq!(grid_adjust_outward(9.7, false), 10.5);
        assert_eq!(grid_adjust_outward(-9.4, false), -9.5);
        assert_eq!(grid_adjust_outward(0.0, false), 0.5);
    }

    #[test]
    fn lattice_helpers() {
        assert_eq!(lattice_ceil(2.3, true), 3.0);
        assert_eq!(lattice_ceil(2.3, false), 2.5);
        assert_eq!(lattice_floor(2.3, false), 1.5);
        assert_eq!(lattice_above(3.0, true), 4.0);
        assert_eq!(lattice_below(3.0, true), 2.0);
        assert_eq!(lattice_above(2.5, false), 3.5);
        assert_eq!(lattice_round(-2.4, true), -2.0);
        assert_eq!(lattice_round(2.2, false), 2.5);
        assert_eq!(lattice_round(-2.0, false), -2.5);
        assert_eq!(lattice_round(2.0, false), 2.5);
    }

    #[test]
    fn rotation_is_exact_on_quadrants() {
        let rot = Rotation::new(Degrees(90.0));
        assert_eq!(rot.apply(dvec2(3.0, 0.0)), dvec2(0.0, 3.0));
        assert_eq!(rot.inverse(dvec2(0.0, 3.0)), dvec2(3.0, 0.0));
        let rot = Rotation::new(Degrees(-180.0));
        assert_eq!(rot.apply(dvec2(1.0, 2.0)), dvec2(-1.0, -2.0));
    }

    #[test]
    fn point_at_axis_angles() {
        let rot = Rotation::new(Degrees(0.0));
        assert_eq!(point_at_angle(Degrees(0.0), &rot, 10.0, 5.0, ODD), Some(dvec2(10.0, 0.0)));
        assert_eq!(point_at_angle(Degrees(90.0), &rot, 10.0, 5.0, ODD), Some(dvec2(0.0, 5.0)));
        assert_eq!(point_at_angle(Degrees(0.0), &rot, 0.0, 5.0, ODD), None);
    }

    #[test]
    fn point_on_rotated_ellipse() {
        let rot = Rotation::new(Degrees(90.0));
        assert_eq!(point_at_angle(Degrees(0.0), &rot, 10.0, 5.0, ODD), Some(dvec2(0.0, 10.0)));
    }

    #[test]
    fn circle_rows_are_symmetric() {
        let rot = Rotation::new(Degrees(0.0));
        for y in -10..=10 {
            let row = xs_at_row(y as f64, &rot, 10.0, 10.0, ODD).unwrap();
            assert_eq!(row.left_px, -row.right_px, "row {y}");
        }
        let middle = xs_at_row(0.0, &rot, 10.0, 10.0, ODD).unwrap();
        assert_eq!((middle.left_px, middle.right_px), (-10.0, 10.0));
        assert!(close(middle.left_angle.raw(), 180.0));
        assert!(close(middle.right_angle.raw(), 0.0));
        assert!(xs_at_row(10.5, &rot, 10.0, 10.0, ODD).is_none());
    }

    #[test]
    fn top_row_touches_once() {
        let rot = Rotation::new(Degrees(0.0));
        let top = xs_at_row(5.0, &rot, 10.0, 5.0, ODD).unwrap();
        assert_eq!(top.left_px, 0.0);
        assert_eq!(top.right_px, 0.0);
    }

    #[test]
    fn quarter_turn_swaps_extents() {
        let rot = Rotation::new(Degrees(90.0));
        let middle = xs_at_row(0.0, &rot, 10.0, 5.0, ODD).unwrap();
        assert!(close(middle.left, -5.0));
        assert!(close(middle.right, 5.0));
        assert_eq!(extreme_point_for_alpha(&rot, 10.0, 5.0, ODD), dvec2(0.0, 10.0));
    }

    #[test]
    fn extreme_point_of_tilted_ellipse() {
        let rot = Rotation::new(Degrees(45.0));
        let top = extreme_point_for_alpha(&rot, 10.0, 5.0, EVEN);
        // sqrt((100 + 25) / 2) = 7.9..
        assert_eq!(top.y, 7.5);
        assert!(top.x > 0.0);
    }

    #[test]
    fn ray_exit_from_center_matches_polar_radius() {
        for theta in [0.0, 30.0, 90.0, 200.0] {
            let exit = ray_exit(DVec2::ZERO, Degrees(theta), 12.0, 7.0).unwrap();
            let r = polar_radius(Degrees(theta), 12.0, 7.0).unwrap();
            assert!(close(exit.length(), r));
        }
    }

    #[test]
    fn line_meets_circle_twice() {
        let (p, q) = line_ellipse_intersections(dvec2(-20.0, 3.0), dvec2(20.0, 3.0), 5.0, 5.0).unwrap();
        assert!(close(p.x, -4.0) && close(q.x, 4.0));
        assert!(line_ellipse_intersections(dvec2(-20.0, 6.0), dvec2(20.0, 6.0), 5.0, 5.0).is_none());
    }

    #[test]
    fn steep_lines_are_vertical() {
        assert_eq!(clamped_slope(dvec2(1e-6, 1.0)), None);
        assert_eq!(clamped_slope(dvec2(2.0, 1.0)), Some(0.5));
        assert_eq!(x_on_line_at(dvec2(3.0, 0.0), dvec2(3.0 + 1e-6, 10.0), 5.0), Some(3.0));
        assert_eq!(x_on_line_at(dvec2(0.0, 1.0), dvec2(5.0, 1.0), 1.0), None);
    }

    #[test]
    fn true_angles() {
        assert_eq!(true_angle(dvec2(1.0, 0.0)), Degrees(0.0));
        assert!(close(true_angle(dvec2(0.0, -2.0)).raw(), 270.0));
    }

    #[test]
    fn signed_distance_sides() {
        let d = signed_distance(dvec2(0.0, 2.0), dvec2(-1.0, 0.0), dvec2(1.0, 0.0));
        assert!(close(d, 2.0));
        let d = signed_distance(dvec2(0.0, -2.0), dvec2(-1.0, 0.0), dvec2(1.0, 0.0));
        assert!(close(d, -2.0));
    }
}
