//! Segment and chord locator
//!
//! Produces the straight boundary lines of a shape in the rotated frame,
//! snapped onto the lattice, and rasterizes them into per-row pixel ranges.

use glam::{DVec2, dvec2};

use super::geometry::{
    Rotation, grid_adjust, lattice_round, line_ellipse_intersections, point_at_angle, unit, x_on_line_at,
    y_on_line_at,
};
use super::region::{Hollow, Region, chord_cut};
use super::types::{BoundaryLine, ExcludedSide, GridParity, LineRole, ShapeDescriptor, ShapeKind, TrueChordState};
use crate::log;

/// Pixels one line occupies on one row, inclusive
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineRow {
    pub y: f64,
    pub x_min: f64,
    pub x_max: f64,
}

/// Snap a rotated-frame point onto the lattice
pub fn snap(p: DVec2, parity: GridParity) -> DVec2 {
    dvec2(grid_adjust(p.x, parity.x_odd), grid_adjust(p.y, parity.y_odd))
}

/// Which side of `start`-`end` holds no material, given a normal pointing
/// into the material
pub fn excluded_side(start: DVec2, end: DVec2, material_normal: DVec2) -> ExcludedSide {
    if start == end {
        ExcludedSide::None
    } else if start.y != end.y {
        if material_normal.x > 0.0 {
            ExcludedSide::Left
        } else {
            ExcludedSide::Right
        }
    } else if material_normal.y > 0.0 {
        ExcludedSide::Bottom
    } else {
        ExcludedSide::Top
    }
}

fn line(start: DVec2, end: DVec2, material_normal: DVec2, role: LineRole) -> BoundaryLine {
    BoundaryLine {
        start,
        end,
        excluded: excluded_side(start, end, material_normal),
        role,
    }
}

/// Boundary lines of a shape, in the rotated frame
pub fn boundary_lines(
    desc: &ShapeDescriptor,
    region: &Region,
    rot: &Rotation,
    parity: GridParity,
    true_chord: Option<&TrueChordState>,
) -> Vec<BoundaryLine> {
    let (a, b) = desc.semi_axes();
    let outer_at = |theta| point_at_angle(theta, rot, a, b, parity);
    let (Some(outer_start), Some(outer_end)) = (outer_at(desc.start), outer_at(desc.end)) else {
        return Vec::new();
    };

    if desc.is_full_sweep() {
        let roles: &[LineRole] = match desc.kind {
            ShapeKind::Arc | ShapeKind::Segment => &[LineRole::StartFace, LineRole::EndFace],
            ShapeKind::Chord | ShapeKind::TrueChord => &[LineRole::Chord],
            ShapeKind::Circle | ShapeKind::Ellipse => &[],
        };
        return roles
            .iter()
            .map(|&role| line(outer_start, outer_start, DVec2::ZERO, role))
            .collect();
    }

    let u_start = unit(desc.start);
    let u_end = unit(desc.end);
    // Material lies counter-clockwise of the start edge and clockwise of the end edge
    let start_normal = rot.apply(dvec2(-u_start.y, u_start.x));
    let end_normal = rot.apply(dvec2(u_end.y, -u_end.x));
    let center = snap(DVec2::ZERO, parity);

    let mut lines = Vec::new();
    match desc.kind {
        ShapeKind::Circle | ShapeKind::Ellipse => {}
        ShapeKind::Arc => {
            let inner_at = |theta| {
                desc.inner_semi_axes()
                    .and_then(|(ai, bi)| point_at_angle(theta, rot, ai, bi, parity))
                    .unwrap_or(center)
            };
            lines.push(line(inner_at(desc.start), outer_start, start_normal, LineRole::StartFace));
            lines.push(line(inner_at(desc.end), outer_end, end_normal, LineRole::EndFace));
        }
        ShapeKind::Segment => {
            lines.push(line(center, outer_start, start_normal, LineRole::StartFace));
            lines.push(line(center, outer_end, end_normal, LineRole::EndFace));
        }
        ShapeKind::Chord => {
            if let Some(cut) = chord_cut(desc) {
                lines.push(line(outer_start, outer_end, rot.apply(cut.normal()), LineRole::Chord));
            }
            if let (Hollow::Cut(inner_cut), Some((ai, bi))) = (region.hollow, region.inner) {
                if let Some((t0, t1)) = line_ellipse_intersections(inner_cut.p0, inner_cut.p1, ai, bi) {
                    let tips = (snap(rot.apply(t0), parity), snap(rot.apply(t1), parity));
                    lines.push(line(tips.0, tips.1, -rot.apply(inner_cut.normal()), LineRole::InnerChord));
                }
            }
        }
        ShapeKind::TrueChord => {
            let Some(state) = true_chord else {
                return lines;
            };
            if state.draw_line {
                if let Some(cut) = chord_cut(desc) {
                    lines.push(line(outer_start, outer_end, rot.apply(cut.normal()), LineRole::Chord));
                }
            }
        }
    }

    log::trace!(count = lines.len(), "boundary lines");
    lines
}

/// Rasterize a line by rows and by columns and merge the two, so steep
/// lines skip no row and shallow lines leave no horizontal gap.
pub fn rasterize(line: &BoundaryLine, parity: GridParity) -> Vec<LineRow> {
    let (s, e) = (line.start, line.end);
    let (x_lo, x_hi) = (s.x.min(e.x), s.x.max(e.x));
    let (y_lo, y_hi) = (s.y.min(e.y), s.y.max(e.y));

    // One slot per lattice row, indexed by offset from the lowest
    let count = (y_hi - y_lo).round() as usize + 1;
    let mut rows: Vec<Option<LineRow>> = vec![None; count];
    let mut record = |y: f64, x: f64| {
        let Some(slot) = rows.get_mut((y - y_lo).round() as usize) else {
            return;
        };
        match slot {
            Some(row) => {
                row.x_min = row.x_min.min(x);
                row.x_max = row.x_max.max(x);
            }
            None => *slot = Some(LineRow { y, x_min: x, x_max: x }),
        }
    };

    if s == e {
        record(s.y, s.x);
    }

    if s.y != e.y {
        let steps = (y_hi - y_lo).round() as i64;
        for i in 0..=steps {
            let y = y_lo + i as f64;
            if let Some(x) = x_on_line_at(s, e, y) {
                record(y, lattice_round(x, parity.x_odd).clamp(x_lo, x_hi));
            }
        }
    }

    if s.x != e.x {
        let steps = (x_hi - x_lo).round() as i64;
        for i in 0..=steps {
            let x = x_lo + i as f64;
            if let Some(y) = y_on_line_at(s, e, x) {
                record(lattice_round(y, parity.y_odd).clamp(y_lo, y_hi), x);
            }
        }
    }

    rows.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;
    use crate::render::types::Modifiers;
    use crate::types::Degrees;

    const ODD: GridParity = GridParity { x_odd: true, y_odd: true };

    fn shape(kind: ShapeKind, start: f64, end: f64, thickness: u32) -> ShapeDescriptor {
        ShapeDescriptor {
            kind,
            width: 40,
            height: 40,
            start: Degrees(start),
            end: Degrees(end),
            rotation: Degrees(0.0),
            thickness_x: thickness,
            thickness_y: thickness,
            filled: true,
            modifiers: Modifiers::default(),
            radii_swapped: false,
            error: ErrorCode::NONE,
        }
    }

    fn lines_for(desc: &ShapeDescriptor) -> Vec<BoundaryLine> {
        let rot = Rotation::new(desc.rotation);
        boundary_lines(desc, &Region::for_shape(desc), &rot, ODD, None)
    }

    #[test]
    fn excluded_sides() {
        let vertical = excluded_side(dvec2(0.0, 0.0), dvec2(0.0, 10.0), dvec2(1.0, 0.0));
        assert_eq!(vertical, ExcludedSide::Left);
        let vertical = excluded_side(dvec2(0.0, 0.0), dvec2(0.0, 10.0), dvec2(-1.0, 0.0));
        assert_eq!(vertical, ExcludedSide::Right);
        let flat = excluded_side(dvec2(0.0, 0.0), dvec2(10.0, 0.0), dvec2(0.0, 1.0));
        assert_eq!(flat, ExcludedSide::Bottom);
        let point = excluded_side(dvec2(3.0, 3.0), dvec2(3.0, 3.0), dvec2(0.0, 1.0));
        assert_eq!(point, ExcludedSide::None);
    }

    #[test]
    fn arc_faces_run_inner_to_outer() {
        let lines = lines_for(&shape(ShapeKind::Arc, 0.0, 90.0, 5));
        assert_eq!(lines.len(), 2);
        assert_eq!((lines[0].start, lines[0].end), (dvec2(15.0, 0.0), dvec2(20.0, 0.0)));
        assert_eq!(lines[0].excluded, ExcludedSide::Bottom);
        assert_eq!((lines[1].start, lines[1].end), (dvec2(0.0, 15.0), dvec2(0.0, 20.0)));
        assert_eq!(lines[1].excluded, ExcludedSide::Left);
    }

    #[test]
    fn segment_faces_start_at_center() {
        let lines = lines_for(&shape(ShapeKind::Segment, 90.0, 180.0, 0));
        assert!(lines.iter().all(|l| l.start == DVec2::ZERO));
        assert_eq!(lines[1].end, dvec2(-20.0, 0.0));
    }

    #[test]
    fn chord_with_hollow_has_inner_chord() {
        let lines = lines_for(&shape(ShapeKind::Chord, 0.0, 180.0, 4));
        let roles: Vec<LineRole> = lines.iter().map(|l| l.role).collect();
        assert_eq!(roles, [LineRole::Chord, LineRole::InnerChord]);
        // Outer chord along y = 0, material above
        assert_eq!(lines[0].excluded, ExcludedSide::Bottom);
        // Hollow chord at y = 4, material below
        assert_eq!(lines[1].start.y, 4.0);
        assert_eq!(lines[1].excluded, ExcludedSide::Top);
    }

    #[test]
    fn full_sweep_lines_are_degenerate() {
        let lines = lines_for(&shape(ShapeKind::Segment, 10.0, 370.0, 2));
        assert!(!lines.is_empty());
        assert!(lines.iter().all(|l| l.is_degenerate() && l.excluded == ExcludedSide::None));
    }

    #[test]
    fn point_line_occupies_one_row() {
        let point = BoundaryLine {
            start: dvec2(4.0, -7.0),
            end: dvec2(4.0, -7.0),
            excluded: ExcludedSide::None,
            role: LineRole::Chord,
        };
        assert_eq!(rasterize(&point, ODD), [LineRow { y: -7.0, x_min: 4.0, x_max: 4.0 }]);
    }

    #[test]
    fn rasterized_line_has_no_row_gaps() {
        let steep = BoundaryLine {
            start: dvec2(0.0, 0.0),
            end: dvec2(3.0, 12.0),
            excluded: ExcludedSide::Left,
            role: LineRole::StartFace,
        };
        let rows = rasterize(&steep, ODD);
        assert_eq!(rows.len(), 13);
        assert!(rows.windows(2).all(|w| w[1].y - w[0].y == 1.0));
    }

    #[test]
    fn rasterized_shallow_line_has_no_column_gaps() {
        let shallow = BoundaryLine {
            start: dvec2(0.0, 0.0),
            end: dvec2(12.0, 3.0),
            excluded: ExcludedSide::Right,
            role: LineRole::Chord,
        };
        let rows = rasterize(&shallow, ODD);
        assert_eq!(rows.len(), 4);
        let covered: f64 = rows.iter().map(|r| r.x_max - r.x_min + 1.0).sum();
        assert!(covered >= 13.0);
        assert_eq!(rows[0].x_min, 0.0);
        assert_eq!(rows[3].x_max, 12.0);
    }
}
