//! Software framebuffer and clipped drawing primitives.
//!
//! A [`Canvas`] is a flat `0xAARRGGBB` buffer, row-major, the format `minifb`
//! presents directly. Drawing goes through a [`Painter`], which owns a clip
//! rectangle and translates local coordinates into it: nothing a painter
//! draws ever lands outside its rectangle.

use std::ops::Range;

// ════════════════════════════════════════════════════════════════════════════
// Rect
// ════════════════════════════════════════════════════════════════════════════

/// Axis-aligned rectangle in canvas pixels. Always non-empty once clipped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub x: usize,
    pub y: usize,
    pub w: usize,
    pub h: usize,
}

// ════════════════════════════════════════════════════════════════════════════
// Canvas
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Canvas {
    width:  usize,
    height: usize,
    pixels: Vec<u32>,
}

impl Canvas {
    pub fn new(width: usize, height: usize, fill: u32) -> Self {
        Canvas { width, height, pixels: vec![fill; width * height] }
    }

    pub fn width(&self) -> usize { self.width }
    pub fn height(&self) -> usize { self.height }
    pub fn pixels(&self) -> &[u32] { &self.pixels }

    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        if x < self.width && y < self.height {
            Some(self.pixels[y * self.width + x])
        } else {
            None
        }
    }

    pub fn fill(&mut self, color: u32) {
        self.pixels.iter_mut().for_each(|p| *p = color);
    }

    /// Fit a requested rectangle onto the canvas.
    ///
    /// The origin is clamped into the canvas and the extent shrunk to fit.
    /// Returns `None` when the canvas is empty or the request has no area.
    pub fn clip(&self, x: i32, y: i32, w: i32, h: i32) -> Option<Rect> {
        if self.width == 0 || self.height == 0 || w <= 0 || h <= 0 {
            return None;
        }
        let cx = x.clamp(0, self.width as i32 - 1) as usize;
        let cy = y.clamp(0, self.height as i32 - 1) as usize;
        let cw = (w as usize).min(self.width - cx);
        let ch = (h as usize).min(self.height - cy);
        Some(Rect { x: cx, y: cy, w: cw, h: ch })
    }

    /// A painter over the whole canvas, or `None` if the canvas is empty.
    pub fn painter(&mut self) -> Option<Painter<'_>> {
        let (w, h) = (self.width as i32, self.height as i32);
        self.painter_in(0, 0, w, h)
    }

    /// A painter clipped to the given rectangle.
    pub fn painter_in(&mut self, x: i32, y: i32, w: i32, h: i32) -> Option<Painter<'_>> {
        let clip = self.clip(x, y, w, h)?;
        Some(Painter { canvas: self, clip })
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Painter
// ════════════════════════════════════════════════════════════════════════════

/// Draws into one clipped rectangle of a canvas, in rectangle-local `i32`
/// coordinates. Out-of-range pixels are silently dropped.
pub struct Painter<'a> {
    canvas: &'a mut Canvas,
    clip:   Rect,
}

impl<'a> Painter<'a> {
    pub fn width(&self) -> i32 { self.clip.w as i32 }
    pub fn height(&self) -> i32 { self.clip.h as i32 }
    pub fn rect(&self) -> Rect { self.clip }

    pub fn set(&mut self, x: i32, y: i32, color: u32) {
        if x < 0 || y < 0 || x >= self.width() || y >= self.height() {
            return;
        }
        let gx = self.clip.x + x as usize;
        let gy = self.clip.y + y as usize;
        let w  = self.canvas.width;
        self.canvas.pixels[gy * w + gx] = color;
    }

    pub fn clear(&mut self, color: u32) {
        let (w, h) = (self.width(), self.height());
        self.fill_rect(0, 0, w, h, color);
    }

    // ── Primitive drawing helpers ─────────────────────────────────────────
    //
    // Coordinates may be anywhere in `i32`; extents are computed in `i64`
    // and loops only visit the part that intersects the clip rectangle.

    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: u32) {
        self.fill_span(x as i64, y as i64, x as i64 + w as i64, y as i64 + h as i64, color);
    }

    fn fill_span(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, color: u32) {
        let x0 = x0.max(0);
        let y0 = y0.max(0);
        let x1 = x1.min(self.width() as i64);
        let y1 = y1.min(self.height() as i64);
        for row in y0..y1 {
            for col in x0..x1 {
                self.set(col as i32, row as i32, color);
            }
        }
    }

    /// Rectangle outline `thickness` pixels wide, drawn inward.
    pub fn stroke_rect(&mut self, x: i32, y: i32, w: i32, h: i32, thickness: i32, color: u32) {
        let t = thickness.max(1) as i64;
        let (x, y, w, h) = (x as i64, y as i64, w as i64, h as i64);
        self.fill_span(x, y, x + w, y + t, color);
        self.fill_span(x, y + h - t, x + w, y + h, color);
        self.fill_span(x, y, x + t, y + h, color);
        self.fill_span(x + w - t, y, x + w, y + h, color);
    }

    /// Bresenham line with a square brush. The segment is first clipped to
    /// the brush-padded rectangle, so the walk is bounded by its size.
    pub fn line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, thickness: i32, color: u32) {
        let r = ((thickness.max(1) - 1) / 2).min(self.width() + self.height()) as i64;
        let Some(((x0, y0), (x1, y1))) = self.clip_segment(x0, y0, x1, y1, r) else { return };
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let (mut x, mut y, mut err) = (x0, y0, dx + dy);
        loop {
            self.fill_span(x - r, y - r, x + r + 1, y + r + 1, color);
            if x == x1 && y == y1 { break; }
            let e2 = 2 * err;
            if e2 >= dy { err += dy; x += sx; }
            if e2 <= dx { err += dx; y += sy; }
        }
    }

    /// Liang–Barsky clip of a segment against the rectangle grown by `pad`.
    fn clip_segment(
        &self,
        x0: i32, y0: i32, x1: i32, y1: i32,
        pad: i64,
    ) -> Option<((i64, i64), (i64, i64))> {
        let lo = -(pad as f64) - 1.0;
        let (x_hi, y_hi) = ((self.width() as i64 + pad) as f64, (self.height() as i64 + pad) as f64);
        let (fx, fy) = (x0 as f64, y0 as f64);
        let (dx, dy) = (x1 as f64 - fx, y1 as f64 - fy);
        let (mut t0, mut t1) = (0.0_f64, 1.0_f64);
        for (p, q) in [(-dx, fx - lo), (dx, x_hi - fx), (-dy, fy - lo), (dy, y_hi - fy)] {
            if p == 0.0 {
                if q < 0.0 { return None; }
                continue;
            }
            let t = q / p;
            if p < 0.0 {
                if t > t1 { return None; }
                t0 = t0.max(t);
            } else {
                if t < t0 { return None; }
                t1 = t1.min(t);
            }
        }
        let at = |t: f64| ((fx + t * dx).round() as i64, (fy + t * dy).round() as i64);
        Some((at(t0), at(t1)))
    }

    /// Canvas-local rows and columns a `rx × ry` box around `(cx, cy)` covers.
    fn visible_box(&self, cx: i64, cy: i64, rx: i64, ry: i64) -> Option<(Range<i64>, Range<i64>)> {
        let xs = (cx - rx).max(0)..(cx + rx + 1).min(self.width() as i64);
        let ys = (cy - ry).max(0)..(cy + ry + 1).min(self.height() as i64);
        (!xs.is_empty() && !ys.is_empty()).then_some((ys, xs))
    }

    pub fn fill_circle(&mut self, cx: i32, cy: i32, r: i32, color: u32) {
        self.fill_ellipse(cx, cy, r, r, color);
    }

    /// Ring between radius `r - thickness` and `r`.
    pub fn circle(&mut self, cx: i32, cy: i32, r: i32, thickness: i32, color: u32) {
        if r <= 0 { return; }
        let (cx, cy, r) = (cx as i64, cy as i64, r as i64);
        let outer = (r * r) as i128;
        let inner = ((r - thickness.max(1) as i64).max(0) as i128).pow(2);
        let Some((ys, xs)) = self.visible_box(cx, cy, r, r) else { return };
        for y in ys {
            let dy = (y - cy) as i128;
            for x in xs.clone() {
                let dx = (x - cx) as i128;
                let d = dx * dx + dy * dy;
                if d <= outer && d > inner {
                    self.set(x as i32, y as i32, color);
                }
            }
        }
    }

    pub fn fill_ellipse(&mut self, cx: i32, cy: i32, rx: i32, ry: i32, color: u32) {
        if rx <= 0 || ry <= 0 { return; }
        let (cx, cy, rx, ry) = (cx as i64, cy as i64, rx as i64, ry as i64);
        let (rx2, ry2) = ((rx * rx) as i128, (ry * ry) as i128);
        let Some((ys, xs)) = self.visible_box(cx, cy, rx, ry) else { return };
        for y in ys {
            let dy = (y - cy) as i128;
            for x in xs.clone() {
                let dx = (x - cx) as i128;
                if dx * dx * ry2 + dy * dy * rx2 <= rx2 * ry2 {
                    self.set(x as i32, y as i32, color);
                }
            }
        }
    }

    /// Arc of an axis-aligned ellipse between two angles, in degrees.
    ///
    /// Angles follow screen convention: 0° points right and positive angles
    /// sweep clockwise, so 0..180 is the lower half.
    pub fn ellipse_arc(
        &mut self,
        cx: i32, cy: i32, rx: i32, ry: i32,
        start_deg: f32, end_deg: f32,
        thickness: i32, color: u32,
    ) {
        if rx <= 0 || ry <= 0 || start_deg.is_nan() || end_deg.is_nan() || end_deg <= start_deg { return; }
        let end_deg = end_deg.min(start_deg + 360.0);
        let steps = ((end_deg - start_deg) / 4.0).ceil().max(1.0) as i32;
        let point = |deg: f32| {
            let a = deg.to_radians();
            (
                cx.saturating_add((rx as f32 * a.cos()).round() as i32),
                cy.saturating_add((ry as f32 * a.sin()).round() as i32),
            )
        };
        let mut prev = point(start_deg);
        for i in 1..=steps {
            let deg  = start_deg + (end_deg - start_deg) * i as f32 / steps as f32;
            let next = point(deg);
            self.line(prev.0, prev.1, next.0, next.1, thickness, color);
            prev = next;
        }
    }

    /// Bitmap text, each font pixel drawn as a `scale × scale` block.
    /// Returns the x coordinate just past the last glyph.
    pub fn text(&mut self, text: &str, x: i32, y: i32, scale: i32, color: u32) -> i32 {
        let s = scale.max(1);
        let mut cx = x;
        for ch in text.chars() {
            let glyph = char_glyph(ch).unwrap_or(MISSING_GLYPH);
            for (row, &bits) in glyph.iter().enumerate() {
                for col in 0..3_i32 {
                    if bits & (1 << (2 - col)) != 0 {
                        let gx = cx.saturating_add(col.saturating_mul(s));
                        let gy = y.saturating_add((row as i32).saturating_mul(s));
                        self.fill_rect(gx, gy, s, s, color);
                    }
                }
            }
            cx = cx.saturating_add(GLYPH_ADVANCE.saturating_mul(s));
            if cx >= self.width() { break; }
        }
        cx
    }
}

/// Horizontal advance per glyph at scale 1 (3 wide + 1 gap).
pub const GLYPH_ADVANCE: i32 = 4;
/// Glyph height at scale 1.
pub const GLYPH_HEIGHT: i32 = 5;

/// Width in pixels `text` occupies at `scale`.
pub fn text_width(text: &str, scale: i32) -> i32 {
    text.chars().count() as i32 * GLYPH_ADVANCE * scale.max(1)
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

/// Drawn for characters the font lacks.
const MISSING_GLYPH: [u8; 5] = [0b000, 0b000, 0b010, 0b000, 0b000];

/// Whether the bitmap font has a real glyph for `c`.
pub fn has_glyph(c: char) -> bool {
    char_glyph(c).is_some()
}

fn char_glyph(c: char) -> Option<[u8; 5]> {
    let rows = match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'a' | 'A' | 'ă' | 'Ă' | 'â' | 'Â' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'b' | 'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' | 'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'd' | 'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' | 'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'f' | 'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'g' | 'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'h' | 'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' | 'I' | 'î' | 'Î' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'j' | 'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'k' | 'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' | 'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' | 'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'n' | 'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'o' | 'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'p' | 'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'q' | 'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'r' | 'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' | 'S' | 'ș' | 'Ș' | 'ş' | 'Ş' => [0b111, 0b100, 0b111, 0b001, 0b111],
        't' | 'T' | 'ț' | 'Ț' | 'ţ' | 'Ţ' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' | 'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' | 'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'w' | 'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'x' | 'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'y' | 'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'z' | 'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        '!' => [0b010, 0b010, 0b010, 0b000, 0b010],
        '?' => [0b111, 0b001, 0b011, 0b000, 0b010],
        '\'' => [0b010, 0b010, 0b000, 0b000, 0b000],
        '#' => [0b101, 0b111, 0b101, 0b111, 0b101],
        '|' => [0b010, 0b010, 0b010, 0b010, 0b010],
        '(' => [0b001, 0b010, 0b010, 0b010, 0b001],
        ')' => [0b100, 0b010, 0b010, 0b010, 0b100],
        '[' => [0b110, 0b100, 0b100, 0b100, 0b110],
        ']' => [0b011, 0b001, 0b001, 0b001, 0b011],
        '"' => [0b101, 0b101, 0b000, 0b000, 0b000],
        '_' => [0b000, 0b000, 0b000, 0b000, 0b111],
        '*' => [0b000, 0b101, 0b010, 0b101, 0b000],
        '<' => [0b001, 0b010, 0b100, 0b010, 0b001],
        '>' => [0b100, 0b010, 0b001, 0b010, 0b100],
        '%' => [0b101, 0b001, 0b010, 0b100, 0b101],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _   => return None,
    };
    Some(rows)
}

/// Mix two ARGB colours. `t` = 0.0 → all `a`, `t` = 1.0 → all `b`.
pub fn blend(a: u32, b: u32, t: f32) -> u32 {
    let t = t.clamp(0.0, 1.0);
    let lerp = |ca: u32, cb: u32| (ca as f32 * (1.0 - t) + cb as f32 * t) as u32;
    let ar = (a >> 16) & 0xFF; let br = (b >> 16) & 0xFF;
    let ag = (a >>  8) & 0xFF; let bg = (b >>  8) & 0xFF;
    let ab =  a        & 0xFF; let bb =  b        & 0xFF;
    0xFF00_0000 | (lerp(ar, br) << 16) | (lerp(ag, bg) << 8) | lerp(ab, bb)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    const BG: u32 = 0xFF00_0000;
    const FG: u32 = 0xFFFF_FFFF;

    fn painted(c: &Canvas) -> usize {
        c.pixels().iter().filter(|&&p| p != BG).count()
    }

    #[test]
    fn clip_clamps_origin_and_shrinks_extent() {
        let c = Canvas::new(100, 50, BG);
        assert_eq!(c.clip(90, 40, 30, 30), Some(Rect { x: 90, y: 40, w: 10, h: 10 }));
        assert_eq!(c.clip(-5, -5, 20, 20), Some(Rect { x: 0, y: 0, w: 20, h: 20 }));
        assert_eq!(c.clip(500, 500, 20, 20), Some(Rect { x: 99, y: 49, w: 1, h: 1 }));
    }

    #[test]
    fn clip_rejects_empty_requests() {
        let c = Canvas::new(100, 50, BG);
        assert_eq!(c.clip(0, 0, 0, 10), None);
        assert_eq!(c.clip(0, 0, 10, -1), None);
        assert_eq!(Canvas::new(0, 0, BG).clip(0, 0, 10, 10), None);
    }

    #[test]
    fn painter_never_escapes_its_rect() {
        let mut c = Canvas::new(40, 40, BG);
        {
            let mut p = c.painter_in(10, 10, 10, 10).unwrap();
            p.fill_rect(-100, -100, 1000, 1000, FG);
            p.line(-50, -50, 80, 80, 5, FG);
            p.fill_circle(5, 5, 50, FG);
        }
        for y in 0..40 {
            for x in 0..40 {
                let inside = (10..20).contains(&x) && (10..20).contains(&y);
                assert_eq!(c.pixel(x, y) == Some(FG), inside, "({x},{y})");
            }
        }
    }

    #[test]
    fn line_hits_both_endpoints() {
        let mut c = Canvas::new(20, 20, BG);
        c.painter().unwrap().line(2, 3, 17, 11, 1, FG);
        assert_eq!(c.pixel(2, 3), Some(FG));
        assert_eq!(c.pixel(17, 11), Some(FG));
    }

    #[test]
    fn ring_leaves_centre_empty() {
        let mut c = Canvas::new(30, 30, BG);
        c.painter().unwrap().circle(15, 15, 10, 2, FG);
        assert_eq!(c.pixel(15, 15), Some(BG));
        assert_eq!(c.pixel(25, 15), Some(FG));
    }

    #[test]
    fn lower_arc_stays_below_centre() {
        let mut c = Canvas::new(40, 40, BG);
        c.painter().unwrap().ellipse_arc(20, 20, 10, 6, 20.0, 160.0, 1, FG);
        assert!(painted(&c) > 0);
        for y in 0..20 {
            for x in 0..40 {
                assert_eq!(c.pixel(x, y), Some(BG));
            }
        }
    }

    #[test]
    fn text_advances_per_glyph() {
        let mut c = Canvas::new(64, 16, BG);
        let end = c.painter().unwrap().text("OK", 0, 0, 2, FG);
        assert_eq!(end, text_width("OK", 2));
        assert!(painted(&c) > 0);
    }

    #[test]
    fn extreme_coordinates_draw_nothing() {
        let mut c = Canvas::new(32, 24, BG);
        {
            let mut p = c.painter().unwrap();
            for far in [i32::MAX, 1e10 as i32, i32::MIN] {
                p.fill_rect(far, far, 50, 50, FG);
                p.fill_rect(far, far, i32::MAX, i32::MAX, FG);
                p.stroke_rect(far, far, 40, 40, 3, FG);
                p.line(far, far, far, far, 5, FG);
                p.circle(far, far, 22, 3, FG);
                p.fill_circle(far, far, 10, FG);
                p.fill_ellipse(far, far, i32::MAX, 3, FG);
                p.ellipse_arc(far, far, 18, 10, 20.0, 160.0, 2, FG);
                p.text("THUMBS UP", far, far, 2, FG);
            }
        }
        assert_eq!(painted(&c), 0);
    }

    #[test]
    fn huge_shapes_near_canvas_are_clipped() {
        let mut c = Canvas::new(32, 24, BG);
        c.painter().unwrap().fill_rect(i32::MAX, 0, i32::MAX, 24, FG);
        assert_eq!(painted(&c), 0);
        c.painter().unwrap().fill_rect(-1, -1, i32::MAX, i32::MAX, FG);
        assert_eq!(painted(&c), 32 * 24);
    }

    #[test]
    fn full_range_line_is_bounded_and_hits_the_diagonal() {
        let mut c = Canvas::new(32, 32, BG);
        let t0 = std::time::Instant::now();
        c.painter().unwrap().line(i32::MIN, i32::MIN, i32::MAX, i32::MAX, 1, FG);
        assert!(t0.elapsed() < std::time::Duration::from_secs(1));
        for i in [0, 7, 16, 31] {
            assert_eq!(c.pixel(i, i), Some(FG), "({i},{i})");
        }
        assert_eq!(c.pixel(31, 0), Some(BG));
    }

    #[test]
    fn romanian_letters_share_base_glyphs() {
        for (accented, base) in [('ă', 'a'), ('Â', 'A'), ('î', 'i'), ('ș', 's'), ('ţ', 't')] {
            assert_eq!(char_glyph(accented), char_glyph(base), "{accented}");
        }
    }

    #[test]
    fn missing_glyph_is_a_centre_dot() {
        assert!(!has_glyph('€'));
        let mut c = Canvas::new(3, 5, BG);
        c.painter().unwrap().text("€", 0, 0, 1, FG);
        assert_eq!(painted(&c), 1);
        assert_eq!(c.pixel(1, 2), Some(FG));
    }

    #[test]
    fn blend_endpoints() {
        assert_eq!(blend(BG, FG, 0.0), BG);
        assert_eq!(blend(BG, FG, 1.0), FG);
        assert_eq!(blend(BG, FG, 0.5), 0xFF7F_7F7F);
    }
}
