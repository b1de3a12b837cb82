//! Draw context - per-call scratch state
//!
//! One [`DrawContext`] lives for exactly one draw call. It owns the row
//! arena the scanline filler writes spans into and the deduplicated pixel
//! list the outline tracer writes into, and it maps engine coordinates to
//! canvas pixels when flushing.

use std::collections::HashSet;

use glam::{DVec2, IVec2, ivec2};

use crate::canvas::Canvas;
use crate::log;

use super::types::{GridParity, RowExclusionSet, Span};

/// One scanline of the bounding box
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Lattice y, engine frame (y up)
    pub y: f64,
    pub limits: RowExclusionSet,
    /// Sorted, non-overlapping
    pub spans: Vec<Span>,
    /// Lattice x values just outside a boundary line
    pub excluded: Vec<f64>,
}

impl Row {
    fn new(y: f64) -> Self {
        Self {
            y,
            limits: RowExclusionSet::EMPTY,
            spans: Vec::new(),
            excluded: Vec::new(),
        }
    }

    /// Whether lattice `x` is covered by a span
    pub fn covers(&self, x: f64) -> bool {
        self.spans.iter().any(|s| x >= s.start && x < s.end)
    }

    pub fn pixel_count(&self) -> usize {
        self.spans.iter().map(Span::len).sum()
    }
}

/// Rows of the bounding box, top row first, indexed by offset from the top
#[derive(Debug, Clone, Default)]
pub struct RowArena {
    top: f64,
    rows: Vec<Row>,
}

impl RowArena {
    /// Arena covering lattice rows `top`, `top - 1`, ... down to `-top`
    pub fn new(top: f64) -> Self {
        let count = if top >= 0.0 { (2.0 * top).round() as usize + 1 } else { 0 };
        let rows = (0..count).map(|i| Row::new(top - i as f64)).collect();
        Self { top, rows }
    }

    pub fn top(&self) -> f64 {
        self.top
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn offset(&self, y: f64) -> Option<usize> {
        let offset = (self.top - y).round();
        (offset >= 0.0 && (offset as usize) < self.rows.len()).then_some(offset as usize)
    }

    pub fn get(&self, y: f64) -> Option<&Row> {
        self.offset(y).map(|i| &self.rows[i])
    }

    pub fn get_mut(&mut self, y: f64) -> Option<&mut Row> {
        self.offset(y).map(|i| &mut self.rows[i])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Row> {
        self.rows.iter_mut()
    }
}

/// Scratch state of one draw call
#[derive(Debug)]
pub struct DrawContext {
    /// Absolute canvas position of the shape center
    pub center: IVec2,
    pub parity: GridParity,
    pub rows: RowArena,
    pixels: Vec<IVec2>,
    seen: HashSet<IVec2>,
}

impl DrawContext {
    pub fn new(center: IVec2, parity: GridParity, top: f64) -> Self {
        Self {
            center,
            parity,
            rows: RowArena::new(top),
            pixels: Vec::new(),
            seen: HashSet::new(),
        }
    }

    /// Canvas x of lattice x. Half-integer values land on the pixel to the
    /// left of the lattice point.
    pub fn absolute_x(&self, x: f64) -> i32 {
        let x = if self.parity.x_odd { x } else { x - 0.5 };
        self.center.x + x.round() as i32
    }

    /// Canvas y of lattice y (canvas y grows downward). Half-integer values
    /// land on the pixel above the lattice point.
    pub fn absolute_y(&self, y: f64) -> i32 {
        let y = if self.parity.y_odd { y } else { y + 0.5 };
        self.center.y - y.round() as i32
    }

    pub fn to_absolute(&self, p: DVec2) -> IVec2 {
        ivec2(self.absolute_x(p.x), self.absolute_y(p.y))
    }

    /// Queue a single absolute pixel; repeats are ignored
    pub fn plot(&mut self, at: IVec2) {
        if self.seen.insert(at) {
            self.pixels.push(at);
        }
    }

    pub fn pixels(&self) -> &[IVec2] {
        &self.pixels
    }

    /// Write everything queued to the canvas. Returns the number of pixels
    /// written.
    pub fn flush<C: Canvas>(&self, canvas: &mut C, color: C::Color) -> usize {
        let mut written = 0;
        for row in self.rows.iter() {
            let y = self.absolute_y(row.y);
            for span in &row.spans {
                let len = span.len();
                if len == 0 {
                    continue;
                }
                let x0 = self.absolute_x(span.start);
                if len == 1 {
                    canvas.set_pixel(ivec2(x0, y), color);
                } else {
                    canvas.draw_line(ivec2(x0, y), ivec2(x0 + len as i32 - 1, y), color);
                }
                written += len;
            }
        }
        for &at in &self.pixels {
            canvas.set_pixel(at, color);
        }
        written += self.pixels.len();

        log::trace!(written, "flushed draw context");
        written
    }
}
