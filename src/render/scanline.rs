//! Scanline filler
//!
//! Fills a shape row by row. Each row is cut at every place membership can
//! change; each piece between two cuts is kept or dropped by testing its
//! midpoint against the exact region, and kept pieces are snapped inward
//! onto the lattice. Straight boundaries are then rasterized as lines and
//! unioned in so that thin walls never break up.

use glam::dvec2;

use crate::log;

use super::context::{Row, RowArena};
use super::geometry::{grid_adjust, lattice_above, lattice_below, lattice_ceil, lattice_floor};
use super::locator::{self, LineRow};
use super::region::{Candidate, Edge, RowCandidates};
use super::truechord;
use super::types::{ExcludedSide, LineRole, RowExclusionSet, Span};
use super::{DrawContext, Rasterize, ShapePlan};

/// Candidates closer than this bound no piece of their own
const ZERO_WIDTH: f64 = 1e-9;

/// Filled rendering through the row arena
#[derive(Debug, Clone, Copy, Default)]
pub struct FillRasterizer;

impl Rasterize for FillRasterizer {
    fn rasterize(&self, plan: &ShapePlan, ctx: &mut DrawContext) {
        for row in ctx.rows.iter_mut() {
            let Some(candidates) = plan.region.row_candidates(row.y, &plan.rot, plan.parity) else {
                continue;
            };
            row.limits = RowExclusionSet {
                outer: (candidates.outer.left_px, candidates.outer.right_px),
                inner: candidates
                    .inner
                    .map_or(RowExclusionSet::EMPTY.inner, |inner| (inner.left, inner.right)),
            };
            row.spans = region_spans(plan, row.y, &candidates);
        }

        let rasterized: Vec<(LineRole, ExcludedSide, Vec<LineRow>)> = plan
            .lines
            .iter()
            .map(|line| (line.role, line.excluded, locator::rasterize(line, plan.parity)))
            .collect();

        for (_, excluded, line_rows) in &rasterized {
            for line_row in line_rows {
                record_exclusion(&mut ctx.rows, *excluded, line_row);
            }
        }
        for row in ctx.rows.iter_mut() {
            apply_exclusions(plan, row);
        }

        for (role, _, line_rows) in &rasterized {
            if !role.bounds_material() {
                continue;
            }
            for line_row in line_rows {
                if let Some(row) = ctx.rows.get_mut(line_row.y) {
                    add_line_pixels(plan, row, line_row);
                }
            }
        }

        if let Some(state) = &plan.true_chord {
            for p in truechord::stitch_points(&plan.desc, state, &plan.rot, plan.parity) {
                if !plan.region.on_inner_rim(plan.local(p)) {
                    continue;
                }
                if let Some(row) = ctx.rows.get_mut(p.y) {
                    row.spans = union_spans(std::mem::take(&mut row.spans), vec![Span::inclusive(p.x, p.x)]);
                }
            }
        }

        let modifiers = plan.desc.modifiers;
        if modifiers.trim {
            trim_rows(&mut ctx.rows);
        }
        if modifiers.suppresses_isolated() {
            for row in ctx.rows.iter_mut() {
                suppress_isolated(row);
            }
        }

        #[cfg(feature = "tracing")]
        for row in ctx.rows.iter() {
            log::trace!(y = row.y, spans = row.spans.len(), pixels = row.pixel_count(), "row filled");
        }
    }
}

/// Kept pieces of one row, snapped onto the lattice
fn region_spans(plan: &ShapePlan, y: f64, candidates: &RowCandidates) -> Vec<Span> {
    let odd = plan.parity.x_odd;
    let material = |x: f64| plan.region.contains(plan.local(dvec2(x, y)));
    let outer = candidates.outer;

    // Top and bottom rows can touch the outer boundary in a single point,
    // and thin rows can hold no lattice point at all; either way the row
    // keeps the one pixel nearest its middle
    if outer.right - outer.left <= ZERO_WIDTH || outer.left_px > outer.right_px {
        let middle = (outer.left + outer.right) / 2.0;
        if !material(middle) {
            return Vec::new();
        }
        let x = if outer.left_px <= outer.right_px {
            outer.left_px
        } else {
            grid_adjust(middle, odd)
        };
        return vec![Span::inclusive(x, x)];
    }

    let mut spans = Vec::new();
    let mut run: Option<(Candidate, Candidate)> = None;
    for pair in candidates.xs.windows(2) {
        let (left, right) = (pair[0], pair[1]);
        if right.x - left.x <= ZERO_WIDTH {
            continue;
        }
        if !material((left.x + right.x) / 2.0) {
            if let Some((first, last)) = run.take() {
                push_piece(&mut spans, first, last, odd);
            }
            continue;
        }
        run = match run {
            // Two kept pieces meeting at a point that is itself a hole
            Some((first, _)) if !material(left.x) => {
                let hole = Candidate { edge: Edge::Inner, ..left };
                push_piece(&mut spans, first, hole, odd);
                Some((hole, right))
            }
            Some((first, _)) => Some((first, right)),
            None => Some((left, right)),
        };
    }
    if let Some((first, last)) = run {
        push_piece(&mut spans, first, last, odd);
    }
    // Snapping can make pieces separated by a sliver share a pixel
    union_spans(spans, Vec::new())
}

fn push_piece(spans: &mut Vec<Span>, first: Candidate, last: Candidate, odd: bool) {
    let start = if first.edge.is_exclusive() {
        lattice_above(first.x, odd)
    } else {
        lattice_ceil(first.x, odd)
    };
    let end = if last.edge.is_exclusive() {
        lattice_below(last.x, odd)
    } else {
        lattice_floor(last.x, odd)
    };
    if start <= end {
        spans.push(Span::inclusive(start, end));
    }
}

/// Note the lattice pixels just past a line on its empty side
fn record_exclusion(rows: &mut RowArena, side: ExcludedSide, line_row: &LineRow) {
    let LineRow { y, x_min, x_max } = *line_row;
    let (target_y, xs): (f64, Vec<f64>) = match side {
        ExcludedSide::None => return,
        ExcludedSide::Left => (y, vec![x_min - 1.0]),
        ExcludedSide::Right => (y, vec![x_max + 1.0]),
        ExcludedSide::Top | ExcludedSide::Bottom => {
            let target = if side == ExcludedSide::Top { y + 1.0 } else { y - 1.0 };
            let count = (x_max - x_min).round() as usize;
            (target, (0..=count).map(|i| x_min + i as f64).collect())
        }
    };
    if let Some(row) = rows.get_mut(target_y) {
        row.excluded.extend(xs);
    }
}

/// Drop excluded pixels the region does not vouch for
fn apply_exclusions(plan: &ShapePlan, row: &mut Row) {
    if row.excluded.is_empty() || row.spans.is_empty() {
        return;
    }
    let y = row.y;
    let mut dropped: Vec<f64> = row
        .excluded
        .iter()
        .copied()
        .filter(|&x| row.covers(x) && !plan.region.contains(plan.local(dvec2(x, y))))
        .collect();
    if dropped.is_empty() {
        return;
    }
    dropped.sort_by(f64::total_cmp);
    dropped.dedup();

    let mut spans = Vec::with_capacity(row.spans.len() + dropped.len());
    for span in &row.spans {
        let mut start = span.start;
        for &x in dropped.iter().filter(|&&x| x >= span.start && x < span.end) {
            if x > start {
                spans.push(Span { start, end: x });
            }
            start = x + 1.0;
        }
        if start < span.end {
            spans.push(Span { start, end: span.end });
        }
    }
    log::trace!(y, dropped = dropped.len(), "excluded pixels removed");
    row.spans = spans;
}

/// Union a line's pixels on one row into the row's spans
fn add_line_pixels(plan: &ShapePlan, row: &mut Row, line_row: &LineRow) {
    let y = row.y;
    let count = (line_row.x_max - line_row.x_min).round() as usize;
    let mut accepted: Vec<Span> = Vec::new();
    for i in 0..=count {
        let x = line_row.x_min + i as f64;
        if !row.limits.within_outer(x) {
            continue;
        }
        let local = plan.local(dvec2(x, y));
        if row.limits.inside_hollow(x) && plan.region.deep_in_hollow(local) {
            continue;
        }
        match accepted.last_mut() {
            Some(last) if last.end == x => last.end += 1.0,
            _ => accepted.push(Span::inclusive(x, x)),
        }
    }
    if !accepted.is_empty() {
        row.spans = union_spans(std::mem::take(&mut row.spans), accepted);
    }
}

/// Merge two span lists. Overlapping spans fuse; spans that merely touch
/// stay apart.
pub fn union_spans(mut spans: Vec<Span>, extra: Vec<Span>) -> Vec<Span> {
    spans.extend(extra);
    spans.sort_by(|l, r| l.start.total_cmp(&r.start));

    let mut merged: Vec<Span> = Vec::with_capacity(spans.len());
    for span in spans {
        match merged.last_mut() {
            Some(last) if span.start < last.end => last.end = last.end.max(span.end),
            _ => merged.push(span),
        }
    }
    merged
}

/// Empty the first and last rows that hold any pixel
fn trim_rows(rows: &mut RowArena) {
    let filled: Vec<f64> = rows
        .iter()
        .filter(|row| !row.spans.is_empty())
        .map(|row| row.y)
        .collect();
    let (Some(&first), Some(&last)) = (filled.first(), filled.last()) else {
        return;
    };
    for y in [first, last] {
        if let Some(row) = rows.get_mut(y) {
            row.spans.clear();
        }
    }
}

/// Remove single-pixel spans with no pixel directly to their left
fn suppress_isolated(row: &mut Row) {
    let mut kept: Vec<Span> = Vec::with_capacity(row.spans.len());
    let mut previous: Option<Span> = None;
    for &span in &row.spans {
        let joined = previous.is_some_and(|p| p.end == span.start);
        if !span.is_single() || joined {
            kept.push(span);
        }
        previous = Some(span);
    }
    row.spans = kept;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::geometry::ellipse_value;
    use crate::render::types::ChordContact;
    use crate::render::{DrawRequest, normalize};
    use glam::ivec2;

    fn fill(request: DrawRequest) -> DrawContext {
        let desc = normalize(&request).unwrap();
        let plan = ShapePlan::new(desc);
        let mut ctx = DrawContext::new(ivec2(0, 0), plan.parity, plan.top);
        FillRasterizer.rasterize(&plan, &mut ctx);
        ctx
    }

    fn spans_at(ctx: &DrawContext, y: f64) -> Vec<(f64, f64)> {
        ctx.rows
            .get(y)
            .map(|row| row.spans.iter().map(|s| (s.start, s.last())).collect())
            .unwrap_or_default()
    }

    #[test]
    fn solid_circle_rows() {
        let ctx = fill(DrawRequest::new(ivec2(0, 0), 20, 20).shape("circle"));
        assert_eq!(spans_at(&ctx, 0.0), [(-10.0, 10.0)]);
        assert_eq!(spans_at(&ctx, 10.0), [(0.0, 0.0)]);
        assert_eq!(spans_at(&ctx, -10.0), [(0.0, 0.0)]);
    }

    #[test]
    fn ring_walls_match_thickness() {
        let ctx = fill(DrawRequest::new(ivec2(0, 0), 40, 40).shape("circle").thickness(3));
        assert_eq!(spans_at(&ctx, 0.0), [(-20.0, -18.0), (18.0, 20.0)]);
    }

    #[test]
    fn quarter_arc_stays_in_its_quadrant() {
        let ctx = fill(DrawRequest::new(ivec2(0, 0), 40, 40).angles(0.0, 90.0).shape("arc"));
        assert_eq!(spans_at(&ctx, 5.0), [(0.0, 19.0)]);
        assert_eq!(spans_at(&ctx, 0.0), [(0.0, 20.0)]);
        assert!(spans_at(&ctx, -1.0).is_empty());
    }

    #[test]
    fn pie_hollow_keeps_both_walls() {
        let ctx = fill(
            DrawRequest::new(ivec2(0, 0), 40, 40)
                .angles(0.0, 90.0)
                .shape("segment")
                .thickness(4),
        );
        let row = ctx.rows.get(8.0).unwrap();
        assert!(row.covers(0.0) && row.covers(3.0));
        assert!(!row.covers(4.0) && !row.covers(8.0));
        assert!(row.covers(19.0));
    }

    #[test]
    fn true_chord_keeps_the_arc_side() {
        let ctx = fill(DrawRequest::new(ivec2(0, 0), 40, 40).angles(45.0, 225.0).shape("truechord"));
        assert!(ctx.rows.get(10.0).unwrap().covers(-10.0));
        assert!(!ctx.rows.get(-10.0).unwrap().covers(10.0));
    }

    #[test]
    fn thin_rows_keep_their_middle_pixel() {
        let ctx = fill(DrawRequest::new(ivec2(0, 0), 3, 3).shape("circle"));
        assert_eq!(spans_at(&ctx, 1.5), [(0.5, 0.5)]);
        assert_eq!(spans_at(&ctx, 0.5), [(-0.5, 0.5)]);
        assert_eq!(spans_at(&ctx, -0.5), [(-0.5, 0.5)]);
        assert_eq!(spans_at(&ctx, -1.5), [(0.5, 0.5)]);

        // Five tall, one wide: every row is narrower than the lattice
        let ctx = fill(DrawRequest::new(ivec2(0, 0), 1, 5));
        assert_eq!(ctx.rows.len(), 6);
        assert!(ctx.rows.iter().all(|row| row.spans == [Span::inclusive(0.5, 0.5)]));
    }

    #[test]
    fn wide_grazing_true_chord_closes_the_pinch_on_the_rim() {
        let request = DrawRequest::new(ivec2(0, 0), 80, 80)
            .angles(118.0, 62.0)
            .shape("truechord")
            .thickness(5);
        let plan = ShapePlan::new(normalize(&request).unwrap());
        let state = plan.true_chord.unwrap();
        assert_eq!(state.contact, ChordContact::Tangential);
        let stitch = truechord::stitch_points(&plan.desc, &state, &plan.rot, plan.parity);
        assert!(!stitch.is_empty());

        let mut ctx = DrawContext::new(ivec2(0, 0), plan.parity, plan.top);
        FillRasterizer.rasterize(&plan, &mut ctx);

        // The wall is pinched to nothing where the chord grazes the hollow
        assert!(ctx.rows.get(35.0).unwrap().covers(0.0));
        for p in stitch.iter().filter(|p| plan.region.on_inner_rim(**p)) {
            assert!(ctx.rows.get(p.y).unwrap().covers(p.x), "{p} not drawn");
        }
        // Nothing is drawn inside the hollow
        for row in ctx.rows.iter() {
            for span in &row.spans {
                let mut x = span.start;
                while x < span.end {
                    let value = ellipse_value(dvec2(x, row.y), 35.0, 35.0);
                    assert!(value >= 1.0 - 1e-9, "({x}, {}) is in the hollow", row.y);
                    x += 1.0;
                }
            }
        }
    }

    #[test]
    fn trim_drops_outer_rows() {
        let ctx = fill(DrawRequest::new(ivec2(0, 0), 20, 20).shape("circletrim"));
        assert!(spans_at(&ctx, 10.0).is_empty());
        assert!(spans_at(&ctx, -10.0).is_empty());
        assert_eq!(spans_at(&ctx, 0.0), [(-10.0, 10.0)]);
    }

    #[test]
    fn smooth_drops_lone_pixels_only() {
        let ctx = fill(DrawRequest::new(ivec2(0, 0), 20, 20).shape("circlesmooth"));
        assert!(spans_at(&ctx, 10.0).is_empty());
        assert_eq!(spans_at(&ctx, 9.0), [(-4.0, 4.0)]);
    }

    #[test]
    fn spans_stay_sorted_and_disjoint() {
        for shape in ["arc", "chord", "segment", "truechord", "ellipse"] {
            for rotation in [0.0, 30.0, 90.0, 157.0] {
                for thickness in [0, 3] {
                    let ctx = fill(
                        DrawRequest::new(ivec2(0, 0), 41, 26)
                            .angles(20.0, 250.0)
                            .rotation(rotation)
                            .shape(shape)
                            .thickness(thickness),
                    );
                    for row in ctx.rows.iter() {
                        assert!(
                            row.spans.windows(2).all(|w| w[0].end <= w[1].start),
                            "{shape} at {rotation} t={thickness}, row {}: {:?}",
                            row.y,
                            row.spans
                        );
                        assert!(row.spans.iter().all(|s| !s.is_empty()));
                    }
                }
            }
        }
    }

    #[test]
    fn union_fuses_overlaps_but_not_neighbours() {
        let merged = union_spans(
            vec![Span::inclusive(0.0, 3.0), Span::inclusive(8.0, 9.0)],
            vec![Span::inclusive(2.0, 5.0), Span::inclusive(6.0, 7.0)],
        );
        assert_eq!(
            merged,
            [Span::inclusive(0.0, 5.0), Span::inclusive(6.0, 7.0), Span::inclusive(8.0, 9.0)]
        );
    }

    #[test]
    fn isolated_pixel_needs_a_left_neighbour() {
        let mut row = RowArena::new(0.0).iter().next().cloned().unwrap();
        row.spans = vec![
            Span::inclusive(0.0, 0.0),
            Span::inclusive(1.0, 1.0),
            Span::inclusive(5.0, 5.0),
            Span::inclusive(7.0, 9.0),
        ];
        suppress_isolated(&mut row);
        assert_eq!(row.spans, [Span::inclusive(1.0, 1.0), Span::inclusive(7.0, 9.0)]);
    }
}
