//! Shape drawing on top of the frame surface.
//!
//! Outlines are plotted pixel by pixel; spans and solid rectangles go through
//! the surface fill path so direct mode sends one window per span.

use core::convert::Infallible;

use embedded_graphics_core::geometry::Point;
use embedded_graphics_core::pixelcolor::Rgb565;
use embedded_hal::digital::OutputPin;
#[cfg(not(feature = "async"))]
use embedded_hal::spi::SpiDevice;
#[cfg(feature = "async")]
use embedded_hal_async::spi::SpiDevice;

use crate::primitives::{
    arrow_head, octants, polygon_vertex, rect_vertices, shift, touches, triangle_vertices,
    Bresenham, CircleOctant, TriangleSpans,
};
use crate::surface::FrameMode;
use crate::{Error, St7789, Timer};

#[maybe_async_cfg::maybe(
    sync(cfg(not(feature = "async")), self = "St7789",),
    async(feature = "async", keep_self)
)]
impl<'b, SPI, DC, RST, BL, E, TIMER, MODE> St7789<'b, SPI, DC, RST, BL, TIMER, MODE>
where
    SPI: SpiDevice<Error = E>,
    DC: OutputPin<Error = Infallible>,
    RST: OutputPin<Error = Infallible>,
    BL: OutputPin<Error = Infallible>,
    TIMER: Timer,
    MODE: FrameMode,
{
    /// Draw a line between two inclusive endpoints.
    pub async fn draw_line(
        &mut self,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        color: Rgb565,
    ) -> Result<(), Error<E>> {
        if x1 == x2 || y1 == y2 {
            return self.fill_area(x1, y1, x2, y2, color).await;
        }
        let line = Bresenham::new(Point::new(x1, y1), Point::new(x2, y2))
            .clipped(self.width as u32, self.height as u32);
        for point in line {
            self.set_pixel(point.x, point.y, color).await?;
        }
        Ok(())
    }

    async fn draw_segment(&mut self, a: Point, b: Point, color: Rgb565) -> Result<(), Error<E>> {
        self.draw_line(a.x, a.y, b.x, b.y, color).await
    }

    /// Outline of the rectangle with corners `(x1, y1)` and `(x2, y2)`.
    pub async fn draw_rect(
        &mut self,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        color: Rgb565,
    ) -> Result<(), Error<E>> {
        if x1 > x2 || y1 > y2 {
            return Err(Error::InvalidArgument);
        }
        self.fill_area(x1, y1, x2, y1, color).await?;
        self.fill_area(x1, y2, x2, y2, color).await?;
        self.fill_area(x1, y1, x1, y2, color).await?;
        self.fill_area(x2, y1, x2, y2, color).await
    }

    /// Solid rectangle, sent as a single window.
    pub async fn fill_rect(
        &mut self,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        color: Rgb565,
    ) -> Result<(), Error<E>> {
        if x1 > x2 || y1 > y2 {
            return Err(Error::InvalidArgument);
        }
        self.fill_area(x1, y1, x2, y2, color).await
    }

    /// Rectangle outline with rounded corners. The radius is clamped to half
    /// the shorter side.
    pub async fn draw_round_rect(
        &mut self,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        radius: u32,
        color: Rgb565,
    ) -> Result<(), Error<E>> {
        if x1 > x2 || y1 > y2 {
            return Err(Error::InvalidArgument);
        }
        let width = x2 as i64 - x1 as i64 + 1;
        let height = y2 as i64 - y1 as i64 + 1;
        let r = (radius as i64).min(width.min(height) / 2);
        if r == 0 {
            return self.draw_rect(x1, y1, x2, y2, color).await;
        }
        // arc centers; r is at most half of each side so they stay inside
        let top_left = shift(Point::new(x1, y1), r, r);
        let top_right = shift(Point::new(x2, y1), -r, r);
        let bottom_left = shift(Point::new(x1, y2), r, -r);
        let bottom_right = shift(Point::new(x2, y2), -r, -r);

        self.fill_area(top_left.x, y1, top_right.x, y1, color).await?;
        self.fill_area(bottom_left.x, y2, bottom_right.x, y2, color).await?;
        self.fill_area(x1, top_left.y, x1, bottom_left.y, color).await?;
        self.fill_area(x2, top_right.y, x2, bottom_right.y, color).await?;

        let visible = [top_left, top_right, bottom_left, bottom_right]
            .iter()
            .any(|&c| touches(c, r as u32, self.width, self.height));
        if !visible {
            return Ok(());
        }
        for (x, y) in CircleOctant::new(r as u32) {
            let corners = [
                shift(top_left, -x, -y),
                shift(top_left, -y, -x),
                shift(top_right, x, -y),
                shift(top_right, y, -x),
                shift(bottom_left, -x, y),
                shift(bottom_left, -y, x),
                shift(bottom_right, x, y),
                shift(bottom_right, y, x),
            ];
            for p in corners {
                self.set_pixel(p.x, p.y, color).await?;
            }
        }
        Ok(())
    }

    /// Circle outline; a zero radius plots the center.
    pub async fn draw_circle(
        &mut self,
        xc: i32,
        yc: i32,
        radius: u32,
        color: Rgb565,
    ) -> Result<(), Error<E>> {
        let center = Point::new(xc, yc);
        if !touches(center, radius, self.width, self.height) {
            return Ok(());
        }
        for (x, y) in CircleOctant::new(radius) {
            for point in octants(center, x, y) {
                self.set_pixel(point.x, point.y, color).await?;
            }
        }
        Ok(())
    }

    /// Solid circle built from horizontal spans.
    pub async fn fill_circle(
        &mut self,
        xc: i32,
        yc: i32,
        radius: u32,
        color: Rgb565,
    ) -> Result<(), Error<E>> {
        let center = Point::new(xc, yc);
        if !touches(center, radius, self.width, self.height) {
            return Ok(());
        }
        // Every row is sent once: rows at +-x as they come, rows at +-y only
        // at their widest, i.e. on the last step before y changes.
        let mut octant = CircleOctant::new(radius).peekable();
        while let Some((x, y)) = octant.next() {
            self.fill_span(center, x, y, color).await?;
            let widest = octant.peek().is_none_or(|&(_, next_y)| next_y != y);
            if widest && y != x {
                self.fill_span(center, y, x, color).await?;
            }
        }
        Ok(())
    }

    /// The rows `dy` above and below `center` (one row when `dy == 0`), each
    /// spanning `half` pixels either side.
    async fn fill_span(
        &mut self,
        center: Point,
        dy: i64,
        half: i64,
        color: Rgb565,
    ) -> Result<(), Error<E>> {
        let (left, right) = (shift(center, -half, -dy), shift(center, half, -dy));
        self.fill_area(left.x, left.y, right.x, right.y, color).await?;
        if dy != 0 {
            let (left, right) = (shift(center, -half, dy), shift(center, half, dy));
            self.fill_area(left.x, left.y, right.x, right.y, color).await?;
        }
        Ok(())
    }

    /// Isosceles triangle of base `w` and height `h` centered on `(xc, yc)`,
    /// apex up, rotated clockwise by `angle` degrees.
    pub async fn draw_triangle(
        &mut self,
        xc: i32,
        yc: i32,
        w: u32,
        h: u32,
        angle: i32,
        color: Rgb565,
    ) -> Result<(), Error<E>> {
        if w == 0 || h == 0 {
            return Ok(());
        }
        let vertices = triangle_vertices(Point::new(xc, yc), w, h, angle);
        self.draw_polygon(&vertices, color).await
    }

    /// Solid triangle through three arbitrary points.
    pub async fn fill_triangle(
        &mut self,
        a: Point,
        b: Point,
        c: Point,
        color: Rgb565,
    ) -> Result<(), Error<E>> {
        for (y, x1, x2) in TriangleSpans::new(a, b, c).clipped(self.height) {
            self.fill_area(x1, y, x2, y, color).await?;
        }
        // integer spans can fall short of the true edges
        self.draw_polygon(&[a, b, c], color).await
    }

    /// Closed polyline through `points`.
    pub async fn draw_polygon(&mut self, points: &[Point], color: Rgb565) -> Result<(), Error<E>> {
        match points {
            [] => Ok(()),
            [p] => self.set_pixel(p.x, p.y, color).await,
            [a, b] => self.draw_segment(*a, *b, color).await,
            _ => {
                for (i, &a) in points.iter().enumerate() {
                    let b = points[(i + 1) % points.len()];
                    self.draw_segment(a, b, color).await?;
                }
                Ok(())
            }
        }
    }

    /// Regular `sides`-gon inscribed in a circle of `radius`, first vertex
    /// at `angle` degrees.
    pub async fn draw_regular_polygon(
        &mut self,
        xc: i32,
        yc: i32,
        sides: u32,
        radius: u32,
        angle: i32,
        color: Rgb565,
    ) -> Result<(), Error<E>> {
        if sides < 3 {
            return Err(Error::InvalidArgument);
        }
        if radius == 0 {
            return Ok(());
        }
        let center = Point::new(xc, yc);
        debug!("polygon sides={=u32} radius={=u32}", sides, radius);
        for i in 0..sides {
            let a = polygon_vertex(center, sides, radius, angle, i);
            let b = polygon_vertex(center, sides, radius, angle, i + 1);
            self.draw_segment(a, b, color).await?;
        }
        Ok(())
    }

    /// Outline of a `w` x `h` rectangle centered on `(xc, yc)` and rotated
    /// clockwise by `angle` degrees.
    pub async fn draw_rect_angle(
        &mut self,
        xc: i32,
        yc: i32,
        w: u32,
        h: u32,
        angle: i32,
        color: Rgb565,
    ) -> Result<(), Error<E>> {
        if w == 0 || h == 0 {
            return Ok(());
        }
        let corners = rect_vertices(Point::new(xc, yc), w, h, angle);
        self.draw_polygon(&corners, color).await
    }

    /// Arrow from `(x0, y0)` to the tip at `(x1, y1)` with an outlined head
    /// of half-width `w`.
    pub async fn draw_arrow(
        &mut self,
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        w: u32,
        color: Rgb565,
    ) -> Result<(), Error<E>> {
        self.draw_line(x0, y0, x1, y1, color).await?;
        if let Some(head) = arrow_head(Point::new(x0, y0), Point::new(x1, y1), w) {
            self.draw_polygon(&head, color).await?;
        }
        Ok(())
    }

    /// Like [`St7789::draw_arrow`] with a solid head.
    pub async fn fill_arrow(
        &mut self,
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        w: u32,
        color: Rgb565,
    ) -> Result<(), Error<E>> {
        self.draw_line(x0, y0, x1, y1, color).await?;
        if let Some([tip, left, right]) = arrow_head(Point::new(x0, y0), Point::new(x1, y1), w) {
            self.fill_triangle(tip, left, right, color).await?;
        }
        Ok(())
    }
}
