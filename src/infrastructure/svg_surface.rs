// SVG implementation of the chart drawing surface
use crate::domain::chart::{Anchor, Color, Point, Rect, Surface};
use plotters::backend::{DrawingBackend, SVGBackend};
use plotters_backend::{BackendCoord, DrawingErrorKind};
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{Color as _, FontDesc, FontFamily, FontStyle, RGBColor};

const FONT_SIZE: f64 = 11.0;

#[derive(Debug, thiserror::Error)]
#[error("failed to draw power chart: {0}")]
pub struct DrawError(String);

/// Draws into a caller-owned string; the document is complete once
/// `finish` returns.
pub struct SvgSurface<'a> {
    backend: SVGBackend<'a>,
    width: u32,
    height: u32,
    error: Option<String>,
}

impl<'a> SvgSurface<'a> {
    pub fn new(buffer: &'a mut String, width: u32, height: u32) -> Self {
        Self {
            backend: SVGBackend::with_string(buffer, (width, height)),
            width,
            height,
            error: None,
        }
    }

    /// Close the document, reporting the first drawing failure if any.
    pub fn finish(mut self) -> Result<(), DrawError> {
        let presented = self.backend.present();
        self.record(presented);
        match self.error.take() {
            Some(message) => Err(DrawError(message)),
            None => Ok(()),
        }
    }

    fn record<E>(&mut self, result: Result<(), DrawingErrorKind<E>>)
    where
        E: std::error::Error + Send + Sync,
    {
        if let Err(e) = result {
            self.error.get_or_insert_with(|| e.to_string());
        }
    }
}

fn coord(p: Point) -> BackendCoord {
    (p.x.round() as i32, p.y.round() as i32)
}

fn rgb(color: Color) -> RGBColor {
    RGBColor(color.0, color.1, color.2)
}

fn stroke(width: f64) -> u32 {
    width.round().max(1.0) as u32
}

impl Surface for SvgSurface<'_> {
    fn width(&self) -> f64 {
        f64::from(self.width)
    }

    fn height(&self) -> f64 {
        f64::from(self.height)
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        let upper_left = coord(Point::new(rect.x, rect.y));
        let bottom_right = coord(Point::new(rect.x + rect.width, rect.y + rect.height));
        let drawn = self
            .backend
            .draw_rect(upper_left, bottom_right, &rgb(color).filled(), true);
        self.record(drawn);
    }

    fn line(&mut self, from: Point, to: Point, color: Color, width: f64) {
        let drawn = self
            .backend
            .draw_line(coord(from), coord(to), &rgb(color).stroke_width(stroke(width)));
        self.record(drawn);
    }

    fn polyline(&mut self, points: &[Point], color: Color, width: f64) {
        let drawn = self.backend.draw_path(
            points.iter().copied().map(coord),
            &rgb(color).stroke_width(stroke(width)),
        );
        self.record(drawn);
    }

    fn text(&mut self, text: &str, at: Point, anchor: Anchor, color: Color) {
        let h_pos = match anchor {
            Anchor::Start => HPos::Left,
            Anchor::Middle => HPos::Center,
            Anchor::End => HPos::Right,
        };
        let style = FontDesc::new(FontFamily::SansSerif, FONT_SIZE, FontStyle::Normal)
            .color(&rgb(color))
            .pos(Pos::new(h_pos, VPos::Bottom));
        let drawn = self.backend.draw_text(text, &style, coord(at));
        self.record(drawn);
    }
}
