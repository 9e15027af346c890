//! Pure rasterization algorithms. Nothing here touches the bus; the drawing
//! methods in `draw` feed these points into the frame surface.

use core::f32::consts::PI;

use embedded_graphics_core::geometry::Point;

/// Integer Bresenham line between two inclusive endpoints.
///
/// Each step along the major axis picks the minor coordinate nearest the
/// ideal line, rounding halves up. Endpoints are put in a canonical order
/// first, so `(a, b)` and `(b, a)` yield the same pixels. Arithmetic is done
/// in 64/128 bits so any pair of `i32` endpoints is safe.
#[derive(Debug, Clone)]
pub struct Bresenham {
    origin: (i64, i64),
    /// Distance along the major axis, `>= 0`.
    major: i64,
    /// Signed distance along the minor axis.
    minor: i64,
    /// Major axis direction: `+1` along x, `+1` or `-1` along y.
    step: i64,
    x_major: bool,
    next: i64,
    last: i64,
}

impl Bresenham {
    pub fn new(a: Point, b: Point) -> Self {
        let (start, end) = if (a.x, a.y) <= (b.x, b.y) { (a, b) } else { (b, a) };
        let dx = end.x as i64 - start.x as i64;
        let dy = end.y as i64 - start.y as i64;
        let x_major = dx >= dy.abs();
        let (major, minor, step) = if x_major {
            (dx, dy, 1)
        } else {
            (dy.abs(), dx, dy.signum())
        };
        Self {
            origin: (start.x as i64, start.y as i64),
            major,
            minor,
            step,
            x_major,
            next: 0,
            last: major,
        }
    }

    /// Skip the steps whose major coordinate lies outside a
    /// `width` x `height` area at the origin. Points that are off-area on the
    /// minor axis are still produced, so callers keep clipping per pixel.
    pub fn clipped(mut self, width: u32, height: u32) -> Self {
        let (origin, limit) = if self.x_major {
            (self.origin.0, width as i64)
        } else {
            (self.origin.1, height as i64)
        };
        // steps k where 0 <= origin + step * k < limit
        let (lo, hi) = if self.step >= 0 {
            (-origin, limit - 1 - origin)
        } else {
            (origin - (limit - 1), origin)
        };
        self.next = self.next.max(lo);
        self.last = self.last.min(hi);
        self
    }

    fn at(&self, k: i64) -> Point {
        let offset = round_div(k as i128 * self.minor as i128, self.major as i128);
        let (major, minor) = (self.step * k, offset);
        let (x, y) = if self.x_major {
            (self.origin.0 + major, self.origin.1 + minor)
        } else {
            (self.origin.0 + minor, self.origin.1 + major)
        };
        Point::new(saturate(x), saturate(y))
    }
}

impl Iterator for Bresenham {
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        if self.next > self.last {
            return None;
        }
        let point = self.at(self.next);
        self.next += 1;
        Some(point)
    }
}

/// `n / d` rounded to nearest, halves up. `d == 0` only happens for a single
/// point line, where `n` is zero as well.
fn round_div(n: i128, d: i128) -> i64 {
    if d == 0 {
        return 0;
    }
    (2 * n + d).div_euclid(2 * d) as i64
}

fn saturate(v: i64) -> i32 {
    v.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

/// Midpoint circle: the `(x, y)` offsets of one octant, `0 <= x <= y`.
/// Mirroring each offset eight ways gives the full circle.
#[derive(Debug, Clone)]
pub struct CircleOctant {
    x: i64,
    y: i64,
    d: i64,
}

impl CircleOctant {
    pub fn new(radius: u32) -> Self {
        let r = radius as i64;
        Self { x: 0, y: r, d: 1 - r }
    }
}

impl Iterator for CircleOctant {
    type Item = (i64, i64);

    fn next(&mut self) -> Option<(i64, i64)> {
        if self.x > self.y {
            return None;
        }
        let item = (self.x, self.y);
        if self.d < 0 {
            self.d += 2 * self.x + 3;
        } else {
            self.d += 2 * (self.x - self.y) + 5;
            self.y -= 1;
        }
        self.x += 1;
        Some(item)
    }
}

/// `center + (dx, dy)`, saturated to the `i32` plane.
pub fn shift(center: Point, dx: i64, dy: i64) -> Point {
    Point::new(
        saturate(center.x as i64 + dx),
        saturate(center.y as i64 + dy),
    )
}

/// The distinct mirror images of an octant offset around `center`: one
/// point for the center itself, four on the axes and diagonals, eight
/// elsewhere.
pub fn octants(center: Point, x: i64, y: i64) -> impl Iterator<Item = Point> {
    let all = [
        shift(center, x, y),
        shift(center, -x, y),
        shift(center, x, -y),
        shift(center, -x, -y),
        shift(center, y, x),
        shift(center, -y, x),
        shift(center, y, -x),
        shift(center, -y, -x),
    ];
    all.into_iter()
        .enumerate()
        .filter(move |&(i, p)| !all[..i].contains(&p))
        .map(|(_, p)| p)
}

/// Whether the square of half-side `radius` around `center` touches a
/// `width` x `height` area at the origin.
pub fn touches(center: Point, radius: u32, width: u16, height: u16) -> bool {
    let r = radius as i64;
    let (cx, cy) = (center.x as i64, center.y as i64);
    cx + r >= 0 && cy + r >= 0 && cx - r < width as i64 && cy - r < height as i64
}

/// Clockwise (on screen) rotation by a whole number of degrees.
#[derive(Debug, Clone, Copy)]
pub struct Rotation {
    sin: f32,
    cos: f32,
}

impl Rotation {
    pub fn degrees(angle: i32) -> Self {
        Self::radians(angle as f32 * PI / 180.0)
    }

    fn radians(rad: f32) -> Self {
        Self {
            sin: libm::sinf(rad),
            cos: libm::cosf(rad),
        }
    }

    /// Rotate the offset `(dx, dy)` and place it relative to `center`.
    pub fn apply(&self, center: Point, dx: f32, dy: f32) -> Point {
        offset(
            center,
            dx * self.cos - dy * self.sin,
            dx * self.sin + dy * self.cos,
        )
    }
}

fn offset(center: Point, dx: f32, dy: f32) -> Point {
    shift(center, libm::roundf(dx) as i64, libm::roundf(dy) as i64)
}

/// Isosceles triangle (apex up at angle 0) of base `w` and height `h`,
/// rotated about its centroid.
pub fn triangle_vertices(center: Point, w: u32, h: u32, angle: i32) -> [Point; 3] {
    let rot = Rotation::degrees(angle);
    let (w, h) = (w as f32, h as f32);
    [
        rot.apply(center, 0.0, -2.0 * h / 3.0),
        rot.apply(center, w / 2.0, h / 3.0),
        rot.apply(center, -w / 2.0, h / 3.0),
    ]
}

/// Corners of a `w` x `h` rectangle rotated about its center, in drawing order.
pub fn rect_vertices(center: Point, w: u32, h: u32, angle: i32) -> [Point; 4] {
    let rot = Rotation::degrees(angle);
    let (hw, hh) = (w as f32 / 2.0, h as f32 / 2.0);
    [
        rot.apply(center, -hw, -hh),
        rot.apply(center, hw, -hh),
        rot.apply(center, hw, hh),
        rot.apply(center, -hw, hh),
    ]
}

/// Vertex `i` of a regular `n`-gon inscribed in a circle of radius `r`,
/// the first vertex at `angle` degrees from the +x axis.
pub fn polygon_vertex(center: Point, n: u32, r: u32, angle: i32, i: u32) -> Point {
    let theta = 2.0 * PI * (i % n) as f32 / n as f32 + angle as f32 * PI / 180.0;
    Rotation::radians(theta).apply(center, r as f32, 0.0)
}

/// Arrow head at `tip` for a shaft coming from `tail`: `[tip, left, right]`.
///
/// The head is `2 * w` long (capped at the shaft length) and `2 * w` wide.
/// `None` for a zero-length shaft.
pub fn arrow_head(tail: Point, tip: Point, w: u32) -> Option<[Point; 3]> {
    let vx = (tip.x as i64 - tail.x as i64) as f32;
    let vy = (tip.y as i64 - tail.y as i64) as f32;
    let len = libm::sqrtf(vx * vx + vy * vy);
    if len == 0.0 {
        return None;
    }
    let (ux, uy) = (vx / len, vy / len);
    let w = w as f32;
    let head = (2.0 * w).min(len);
    let (bx, by) = (-ux * head, -uy * head);
    let left = offset(tip, bx - uy * w, by + ux * w);
    let right = offset(tip, bx + uy * w, by - ux * w);
    Some([tip, left, right])
}

/// Horizontal spans `(y, x_start, x_end)` covering a filled triangle.
#[derive(Debug, Clone)]
pub struct TriangleSpans {
    p: [Point; 3],
    y: i64,
    end: i64,
}

impl TriangleSpans {
    pub fn new(a: Point, b: Point, c: Point) -> Self {
        let mut p = [a, b, c];
        p.sort_unstable_by_key(|v| (v.y, v.x));
        Self {
            y: p[0].y as i64,
            end: p[2].y as i64,
            p,
        }
    }

    /// Only the rows `0..height`.
    pub fn clipped(mut self, height: u16) -> Self {
        self.y = self.y.max(0);
        self.end = self.end.min(height as i64 - 1);
        self
    }

    fn edge_x(a: Point, b: Point, y: i64) -> i64 {
        let (ax, ay) = (a.x as i64, a.y as i64);
        if ay == b.y as i64 {
            return ax;
        }
        let t = (y - ay) as i128 * (b.x as i64 - ax) as i128 / (b.y as i64 - ay) as i128;
        ax + t as i64
    }
}

impl Iterator for TriangleSpans {
    type Item = (i32, i32, i32);

    fn next(&mut self) -> Option<(i32, i32, i32)> {
        let [p0, p1, p2] = self.p;
        let y = self.y;
        if y > self.end {
            return None;
        }
        self.y += 1;

        if p0.y == p2.y {
            let lo = p0.x.min(p1.x).min(p2.x);
            let hi = p0.x.max(p1.x).max(p2.x);
            return Some((saturate(y), lo, hi));
        }
        let long = Self::edge_x(p0, p2, y);
        let (p1y, p0y) = (p1.y as i64, p0.y as i64);
        let short = if y < p1y || (y == p1y && p0y != p1y) {
            Self::edge_x(p0, p1, y)
        } else {
            Self::edge_x(p1, p2, y)
        };
        Some((
            saturate(y),
            saturate(long.min(short)),
            saturate(long.max(short)),
        ))
    }
}
