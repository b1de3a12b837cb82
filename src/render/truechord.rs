//! True-chord resolver
//!
//! Decides how the straight cut of a true chord meets the hollow. The test
//! runs in the shape's unrotated frame so the verdict does not change as the
//! shape turns: the inner boundary is sampled at whole-degree steps from the
//! start angle and each sample's signed distance to the chord is examined.

use glam::{DVec2, dvec2};

use crate::log;
use crate::types::Degrees;

use super::defaults::{ANGLE_STEP, CHORD_SAMPLES, CLOSE_APPROACH, CROSSING_GAP, WIDE_SWEEP};
use super::geometry::{
    Rotation, clamped_slope, grid_adjust, grid_adjust_outward, local_point_at_angle, point_at_angle, xs_at_row,
};
use super::region::chord_cut;
use super::types::{ChordContact, GridParity, ShapeDescriptor, TrueChordState};

#[derive(Debug, Clone, Copy)]
struct Sample {
    theta: Degrees,
    point: DVec2,
    /// Signed distance to the chord, positive on the requested side
    distance: f64,
}

impl Sample {
    fn on_requested_side(&self) -> bool {
        self.distance >= 0.0
    }
}

/// Classified inner-boundary samples: the two points that bracket the
/// chord's contact, and the verdict
struct Verdict {
    contact: ChordContact,
    p: Sample,
    q: Sample,
}

/// Angular distance between two angles, whichever way round is shorter
fn angle_gap(a: Degrees, b: Degrees) -> f64 {
    let d = (a - b).to_360().raw();
    d.min(360.0 - d)
}

/// Whether the inner boundary holds a single lattice x on the sample's row
fn single_x_at_row(sample: &Sample, (ai, bi): (f64, f64), parity: GridParity) -> bool {
    let y = grid_adjust(sample.point.y, parity.y_odd);
    xs_at_row(y, &Rotation::new(Degrees::ZERO), ai, bi, parity)
        .is_none_or(|row| row.right_px <= row.left_px)
}

/// The close sample nearest to `angle`
fn nearest(close: &[Sample], angle: Degrees) -> Option<Sample> {
    close
        .iter()
        .copied()
        .min_by(|l, r| angle_gap(l.theta, angle).total_cmp(&angle_gap(r.theta, angle)))
}

fn classify(samples: &[Sample], desc: &ShapeDescriptor, inner: (f64, f64), parity: GridParity) -> Option<Verdict> {
    let n = samples.len();
    let first = *samples.first()?;

    let mut changes = 0usize;
    let mut rise = None;
    let mut fall = None;
    for k in 0..n {
        let (cur, next) = (samples[k], samples[(k + 1) % n]);
        if cur.on_requested_side() != next.on_requested_side() {
            changes += 1;
            if cur.on_requested_side() {
                fall.get_or_insert(cur);
            } else {
                rise.get_or_insert(next);
            }
        }
    }

    let close: Vec<Sample> = samples
        .iter()
        .copied()
        .filter(|s| s.distance.abs() < CLOSE_APPROACH)
        .collect();

    if changes == 0 && close.is_empty() {
        return Some(Verdict {
            contact: ChordContact::Clear,
            p: first,
            q: first,
        });
    }

    if let [only] = close.as_slice() {
        if single_x_at_row(only, inner, parity) {
            return Some(Verdict {
                contact: ChordContact::Tangential,
                p: *only,
                q: *only,
            });
        }
    }

    if changes >= 2 {
        if let (Some(p), Some(q)) = (rise, fall) {
            if p.point.distance(q.point) > CROSSING_GAP {
                return Some(Verdict {
                    contact: ChordContact::Intersecting,
                    p,
                    q,
                });
            }
        }
    }

    // P is the close sample nearest the start tip, Q the one nearest the end
    let (p, q) = match (nearest(&close, desc.start), nearest(&close, desc.end), rise, fall) {
        (Some(p), Some(q), _, _) => (p, q),
        (_, _, Some(p), Some(q)) if angle_gap(q.theta, desc.start) < angle_gap(p.theta, desc.start) => (q, p),
        (_, _, Some(p), Some(q)) => (p, q),
        _ => (first, first),
    };
    Some(Verdict {
        contact: ChordContact::Tangential,
        p,
        q,
    })
}

/// Lattice point next to the inner boundary at `theta`, snapped away from
/// the center so it sits outside the hollow
fn rim_point(theta: Degrees, rot: &Rotation, (ai, bi): (f64, f64), parity: GridParity) -> Option<DVec2> {
    let p = rot.apply(local_point_at_angle(theta, ai, bi)?);
    Some(dvec2(grid_adjust_outward(p.x, parity.x_odd), grid_adjust_outward(p.y, parity.y_odd)))
}

/// Rim points along the inner boundary from Q counter-clockwise to P,
/// rotated frame.
///
/// Only a tangential chord over a wide sweep pinches the wall against the
/// hollow; every other shape gets no stitch.
pub fn stitch_points(
    desc: &ShapeDescriptor,
    state: &TrueChordState,
    rot: &Rotation,
    parity: GridParity,
) -> Vec<DVec2> {
    let Some(inner) = desc.inner_semi_axes() else {
        return Vec::new();
    };
    if !state.is_tangential() || desc.sweep() <= WIDE_SWEEP {
        return Vec::new();
    }

    let from = state.q_angle;
    let mut to = state.p_angle;
    while to < from {
        to += Degrees::FULL;
    }
    let steps = ((to - from).raw() / ANGLE_STEP).ceil() as usize;
    (0..steps)
        .map(|k| from + Degrees(k as f64 * ANGLE_STEP))
        .chain(std::iter::once(to))
        .filter_map(|theta| rim_point(theta, rot, inner, parity))
        .collect()
}

/// Resolve the chord of a true chord against its hollow.
///
/// `None` for degenerate geometry (a full sweep has no chord).
pub fn resolve(desc: &ShapeDescriptor, rot: &Rotation, parity: GridParity) -> Option<TrueChordState> {
    if desc.is_full_sweep() {
        return None;
    }
    let (a, b) = desc.semi_axes();
    let cut = chord_cut(desc)?;
    let slope = clamped_slope(rot.apply(cut.p1 - cut.p0));

    let Some((ai, bi)) = desc.inner_semi_axes() else {
        let p_adjacent = point_at_angle(desc.start, rot, a, b, parity)?;
        let q_adjacent = point_at_angle(desc.end, rot, a, b, parity)?;
        return Some(TrueChordState {
            contact: ChordContact::Clear,
            p: rot.apply(cut.p0),
            q: rot.apply(cut.p1),
            p_angle: desc.start,
            q_angle: desc.end,
            p_adjacent,
            q_adjacent,
            slope,
            inner_on_requested_side: false,
            draw_line: true,
        });
    };

    let step = 360.0 / CHORD_SAMPLES as f64;
    let samples: Vec<Sample> = (0..CHORD_SAMPLES)
        .filter_map(|k| {
            let theta = (desc.start + Degrees(k as f64 * step)).to_360();
            let point = local_point_at_angle(theta, ai, bi)?;
            Some(Sample {
                theta,
                point,
                distance: cut.depth(point),
            })
        })
        .collect();

    let verdict = classify(&samples, desc, (ai, bi), parity)?;
    let requested = samples.iter().filter(|s| s.on_requested_side()).count();
    let inner_on_requested_side = requested * 2 > samples.len();

    // Clear chords never reach the hollow: P and Q stay on the outer tips
    let (p_angle, q_angle, p, q, p_adjacent, q_adjacent) = match verdict.contact {
        ChordContact::Clear => (
            desc.start,
            desc.end,
            cut.p0,
            cut.p1,
            point_at_angle(desc.start, rot, a, b, parity)?,
            point_at_angle(desc.end, rot, a, b, parity)?,
        ),
        _ => (
            verdict.p.theta,
            verdict.q.theta,
            verdict.p.point,
            verdict.q.point,
            rim_point(verdict.p.theta, rot, (ai, bi), parity)?,
            rim_point(verdict.q.theta, rot, (ai, bi), parity)?,
        ),
    };
    let (p, q) = (rot.apply(p), rot.apply(q));

    let state = TrueChordState {
        contact: verdict.contact,
        p,
        q,
        p_angle,
        q_angle,
        p_adjacent,
        q_adjacent,
        slope,
        inner_on_requested_side,
        draw_line: verdict.contact != ChordContact::Intersecting,
    };

    log::debug!(
        contact = ?state.contact,
        p_angle = state.p_angle.raw(),
        q_angle = state.q_angle.raw(),
        draw_line = state.draw_line,
        "true chord resolved"
    );

    Some(state)
}
