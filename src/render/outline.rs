//! Outline tracer
//!
//! Walks each boundary contour of a shape at whole-degree steps and joins
//! consecutive points with straight segments. A contour is a closed list of
//! lattice points in the rotated frame; the dot connector turns it into
//! absolute pixels and plots each one once.

use glam::{DVec2, IVec2};

use crate::canvas::line_pixels;
use crate::log;
use crate::types::Degrees;

use super::defaults::ANGLE_STEP;
use super::geometry::{line_ellipse_intersections, point_at_angle, ray_exit, true_angle};
use super::locator::snap;
use super::region::Hollow;
use super::types::{ChordContact, ShapeKind};
use super::{DrawContext, Rasterize, ShapePlan};

/// Outlined rendering through the dot connector
#[derive(Debug, Clone, Copy, Default)]
pub struct OutlineRasterizer;

impl Rasterize for OutlineRasterizer {
    fn rasterize(&self, plan: &ShapePlan, ctx: &mut DrawContext) {
        let contours = contours(plan);
        for contour in &contours {
            connect(ctx, contour);
        }
        log::trace!(contours = contours.len(), pixels = ctx.pixels().len(), "outline traced");
    }
}

/// Boundary points from `from` counter-clockwise to `to`, the exact end
/// angle last
fn walk(plan: &ShapePlan, from: Degrees, to: Degrees, (a, b): (f64, f64)) -> Vec<DVec2> {
    let sweep = (to.raw() - from.raw()).max(0.0);
    let steps = (sweep / ANGLE_STEP).ceil() as usize;
    (0..steps)
        .map(|k| from + Degrees(k as f64 * ANGLE_STEP))
        .chain(std::iter::once(to))
        .filter_map(|theta| point_at_angle(theta, &plan.rot, a, b, plan.parity))
        .collect()
}

/// `to`, moved up by whole turns until it lies after `from`
fn after(from: Degrees, to: Degrees) -> Degrees {
    let mut to = to;
    while to <= from {
        to += Degrees::FULL;
    }
    to
}

/// A local-frame point, rotated and snapped
fn lattice_point(plan: &ShapePlan, local: DVec2) -> DVec2 {
    snap(plan.rot.apply(local), plan.parity)
}

fn full_loop(plan: &ShapePlan, axes: (f64, f64)) -> Vec<DVec2> {
    walk(plan, Degrees::ZERO, Degrees::FULL, axes)
}

fn contours(plan: &ShapePlan) -> Vec<Vec<DVec2>> {
    let desc = &plan.desc;
    let outer = plan.region.outer;
    let inner = plan.region.inner;
    let center = lattice_point(plan, DVec2::ZERO);

    if desc.is_full_sweep() {
        let mut loops = vec![full_loop(plan, outer)];
        loops.extend(inner.map(|axes| full_loop(plan, axes)));
        return loops;
    }

    let outer_arc = walk(plan, desc.start, desc.end, outer);
    let mut loops = Vec::new();
    match desc.kind {
        ShapeKind::Circle | ShapeKind::Ellipse => {}
        ShapeKind::Arc => {
            let mut contour = outer_arc;
            match inner {
                Some(axes) => contour.extend(walk(plan, desc.start, desc.end, axes).into_iter().rev()),
                None => contour.push(center),
            }
            loops.push(contour);
        }
        ShapeKind::Segment => {
            let mut contour = outer_arc;
            contour.push(center);
            loops.push(contour);
            if let (Hollow::Sector(sector), Some((ai, bi))) = (plan.region.hollow, inner) {
                let exits = (
                    ray_exit(sector.apex, desc.start, ai, bi),
                    ray_exit(sector.apex, desc.end, ai, bi),
                );
                if let (Some(first), Some(last)) = exits {
                    let from = true_angle(first);
                    let to = after(from, true_angle(last));
                    let mut hollow = vec![lattice_point(plan, sector.apex)];
                    hollow.extend(walk(plan, from, to, (ai, bi)));
                    loops.push(hollow);
                }
            }
        }
        ShapeKind::Chord => {
            loops.push(outer_arc);
            if let (Hollow::Cut(cut), Some(axes)) = (plan.region.hollow, inner) {
                match line_ellipse_intersections(cut.p0, cut.p1, axes.0, axes.1) {
                    Some((t0, t1)) => {
                        let (a0, a1) = (true_angle(t0), true_angle(t1));
                        let mid = desc.start + Degrees(desc.sweep() / 2.0);
                        // The hollow's curved side is the one facing the arc's middle
                        let (from, to) = if after(a0, mid) < after(a0, a1) { (a0, a1) } else { (a1, a0) };
                        loops.push(walk(plan, from, after(from, to), axes));
                    }
                    None if cut.depth(DVec2::ZERO) > 0.0 => loops.push(full_loop(plan, axes)),
                    None => {}
                }
            }
        }
        ShapeKind::TrueChord => match (plan.true_chord, inner) {
            (Some(state), Some(axes)) if state.contact == ChordContact::Intersecting => {
                let mut contour = outer_arc;
                let q_angle = after(state.p_angle, state.q_angle);
                contour.extend(walk(plan, state.p_angle, q_angle, axes).into_iter().rev());
                loops.push(contour);
            }
            (state, inner) => {
                loops.push(outer_arc);
                let inside = state.is_some_and(|s| s.inner_on_requested_side);
                if let (true, Some(axes)) = (inside, inner) {
                    loops.push(full_loop(plan, axes));
                }
            }
        },
    }
    loops
}

/// Join a closed contour's points with straight segments and plot them
fn connect(ctx: &mut DrawContext, contour: &[DVec2]) {
    let mut points: Vec<IVec2> = contour.iter().map(|&p| ctx.to_absolute(p)).collect();
    points.dedup();
    if points.len() > 1 && points.first() == points.last() {
        points.pop();
    }

    let n = points.len();
    if n == 1 {
        ctx.plot(points[0]);
    }
    if n < 2 {
        return;
    }

    for i in 0..n {
        let (from, to) = (points[i], points[(i + 1) % n]);
        if (to - from).length_squared() < 2 {
            ctx.plot(from);
            continue;
        }
        let pixels = line_pixels(from, to);
        // The destination is the next segment's start
        for &at in &pixels[..pixels.len() - 1] {
            ctx.plot(at);
        }
    }
}
