//! Canvas collaborator
//!
//! The engine only ever writes through [`Canvas`]. [`Raster`] is an
//! in-memory RGBA implementation that also counts writes per pixel, which
//! is what the tests use to check that no pixel is plotted twice.

use glam::{IVec2, ivec2};

/// Drawing surface the engine writes to. Coordinates are absolute, y down.
pub trait Canvas {
    type Color: Copy;

    fn set_pixel(&mut self, at: IVec2, color: Self::Color);

    /// Straight line, both endpoints included
    fn draw_line(&mut self, from: IVec2, to: IVec2, color: Self::Color);

    fn draw_filled_polygon(&mut self, points: &[IVec2], color: Self::Color);

    fn allocate_color(&mut self, r: u8, g: u8, b: u8) -> Self::Color;

    /// Color with a transparency percentage (0 opaque, 100 invisible)
    fn allocate_color_alpha(&mut self, r: u8, g: u8, b: u8, transparency_pct: u8) -> Self::Color;
}

/// Bresenham line from `from` to `to`, both ends included
pub fn line_pixels(from: IVec2, to: IVec2) -> Vec<IVec2> {
    let dx = (to.x - from.x).abs();
    let dy = -(to.y - from.y).abs();
    let sx = if from.x < to.x { 1 } else { -1 };
    let sy = if from.y < to.y { 1 } else { -1 };
    let mut err = dx + dy;
    let mut at = from;

    let mut pixels = Vec::with_capacity((dx.max(-dy) + 1) as usize);
    loop {
        pixels.push(at);
        if at == to {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            at.x += sx;
        }
        if e2 <= dx {
            err += dx;
            at.y += sy;
        }
    }
    pixels
}

// ============================================================================
// Colors
// ============================================================================

/// 8-bit RGBA color; `a` is opacity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba { r: 0, g: 0, b: 0, a: 0 };
    pub const WHITE: Rgba = Rgba { r: 255, g: 255, b: 255, a: 255 };
    pub const BLACK: Rgba = Rgba { r: 0, g: 0, b: 0, a: 255 };

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// From a 0-100 transparency percentage, going through the 0-127 alpha
    /// scale (127 fully transparent)
    pub fn with_transparency(r: u8, g: u8, b: u8, transparency_pct: u8) -> Self {
        let alpha_127 = u32::from(transparency_pct.min(100)) * 127 / 100;
        let a = 255 - alpha_127 * 255 / 127;
        Self { r, g, b, a: a as u8 }
    }

    /// Source-over compositing of `self` onto `dst`
    pub fn over(self, dst: Rgba) -> Rgba {
        let sa = u32::from(self.a);
        let da = u32::from(dst.a) * (255 - sa) / 255;
        let out_a = sa + da;
        if out_a == 0 {
            return Rgba::TRANSPARENT;
        }
        let mix = |s: u8, d: u8| ((u32::from(s) * sa + u32::from(d) * da) / out_a) as u8;
        Rgba {
            r: mix(self.r, dst.r),
            g: mix(self.g, dst.g),
            b: mix(self.b, dst.b),
            a: out_a as u8,
        }
    }
}

// ============================================================================
// Raster
// ============================================================================

/// In-memory RGBA canvas with a write counter per pixel
#[derive(Debug, Clone)]
pub struct Raster {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
    writes: Vec<u32>,
}

impl Raster {
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, Rgba::TRANSPARENT)
    }

    pub fn filled(width: u32, height: u32, background: Rgba) -> Self {
        let len = width as usize * height as usize;
        Self {
            width,
            height,
            pixels: vec![background; len],
            writes: vec![0; len],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    fn index(&self, at: IVec2) -> Option<usize> {
        let in_bounds = at.x >= 0 && at.y >= 0 && (at.x as u32) < self.width && (at.y as u32) < self.height;
        in_bounds.then(|| at.y as usize * self.width as usize + at.x as usize)
    }

    pub fn pixel(&self, at: IVec2) -> Option<Rgba> {
        self.index(at).map(|i| self.pixels[i])
    }

    /// How many times `at` was written
    pub fn writes_at(&self, at: IVec2) -> u32 {
        self.index(at).map_or(0, |i| self.writes[i])
    }

    /// Highest write count of any pixel
    pub fn max_writes(&self) -> u32 {
        self.writes.iter().copied().max().unwrap_or(0)
    }

    /// Every pixel written at least once, row by row
    pub fn painted(&self) -> Vec<IVec2> {
        let width = self.width as usize;
        self.writes
            .iter()
            .enumerate()
            .filter(|(_, w)| **w > 0)
            .map(|(i, _)| ivec2((i % width) as i32, (i / width) as i32))
            .collect()
    }

    pub fn is_painted(&self, at: IVec2) -> bool {
        self.writes_at(at) > 0
    }

    /// Forget write counts, keeping the pixels
    pub fn reset_writes(&mut self) {
        self.writes.iter_mut().for_each(|w| *w = 0);
    }
}

impl Canvas for Raster {
    type Color = Rgba;

    fn set_pixel(&mut self, at: IVec2, color: Rgba) {
        if let Some(i) = self.index(at) {
            self.pixels[i] = color.over(self.pixels[i]);
            self.writes[i] += 1;
        }
    }

    fn draw_line(&mut self, from: IVec2, to: IVec2, color: Rgba) {
        for at in line_pixels(from, to) {
            self.set_pixel(at, color);
        }
    }

    /// Even-odd scanline fill sampled at pixel centers
    fn draw_filled_polygon(&mut self, points: &[IVec2], color: Rgba) {
        if points.len() < 3 {
            for &p in points {
                self.set_pixel(p, color);
            }
            return;
        }
        let (Some(top), Some(bottom)) = (
            points.iter().map(|p| p.y).min(),
            points.iter().map(|p| p.y).max(),
        ) else {
            return;
        };

        let mut crossings: Vec<f64> = Vec::new();
        for y in top..=bottom {
            let sample = f64::from(y) + 0.5;
            crossings.clear();
            for (i, &p0) in points.iter().enumerate() {
                let p1 = points[(i + 1) % points.len()];
                let (y0, y1) = (f64::from(p0.y), f64::from(p1.y));
                if (y0 <= sample) != (y1 <= sample) {
                    let t = (sample - y0) / (y1 - y0);
                    crossings.push(f64::from(p0.x) + t * f64::from(p1.x - p0.x));
                }
            }
            crossings.sort_by(f64::total_cmp);
            for pair in crossings.chunks_exact(2) {
                let first = (pair[0] - 0.5).ceil() as i32;
                let last = (pair[1] - 0.5).floor() as i32;
                for x in first..=last {
                    self.set_pixel(ivec2(x, y), color);
                }
            }
        }
    }

    fn allocate_color(&mut self, r: u8, g: u8, b: u8) -> Rgba {
        Rgba::opaque(r, g, b)
    }

    fn allocate_color_alpha(&mut self, r: u8, g: u8, b: u8, transparency_pct: u8) -> Rgba {
        Rgba::with_transparency(r, g, b, transparency_pct)
    }
}
