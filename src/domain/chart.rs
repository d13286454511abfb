// Power chart rendering onto an abstract drawing surface
use super::format::format_axis_time;
use super::power::Sample;

const PAD_LEFT: f64 = 40.0;
const PAD_RIGHT: f64 = 52.0;
const PAD_TOP: f64 = 10.0;
const PAD_BOTTOM: f64 = 24.0;
const CHARGING_STRIP_HEIGHT: f64 = 5.0;
const MV_PADDING: f64 = 60.0;

const PERCENT_GRID: [f64; 5] = [0.0, 25.0, 50.0, 75.0, 100.0];
const PERCENT_LABELS: [f64; 3] = [0.0, 50.0, 100.0];

pub const EMPTY_MESSAGE: &str = "No power samples in this window";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color(pub u8, pub u8, pub u8);

pub mod palette {
    use super::Color;

    pub const BACKGROUND: Color = Color(255, 255, 255);
    pub const USB_BAND: Color = Color(220, 236, 252);
    pub const BATTERY_BAND: Color = Color(253, 235, 214);
    pub const CHARGING: Color = Color(46, 160, 67);
    pub const NOT_CHARGING: Color = Color(203, 208, 214);
    pub const GRID: Color = Color(226, 230, 234);
    pub const LABEL: Color = Color(96, 104, 112);
    pub const PERCENT_LINE: Color = Color(37, 99, 235);
    pub const MV_LINE: Color = Color(217, 119, 6);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    fn right(&self) -> f64 {
        self.x + self.width
    }

    fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Start,
    Middle,
    End,
}

/// Drawing primitives the chart needs. Implementations must not keep
/// state between calls beyond what they have drawn.
pub trait Surface {
    fn width(&self) -> f64;
    fn height(&self) -> f64;
    fn fill_rect(&mut self, rect: Rect, color: Color);
    fn line(&mut self, from: Point, to: Point, color: Color, width: f64);
    fn polyline(&mut self, points: &[Point], color: Color, width: f64);
    fn text(&mut self, text: &str, at: Point, anchor: Anchor, color: Color);
}

/// Horizontal bounds requested by the caller. Either side falls back to
/// the series' own extremes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChartWindow {
    pub from_epoch: Option<i64>,
    pub to_epoch: Option<i64>,
    /// Offset applied to time labels.
    pub utc_offset_minutes: i32,
}

impl ChartWindow {
    pub fn new(from_epoch: i64, to_epoch: i64, utc_offset_minutes: i32) -> Self {
        Self {
            from_epoch: Some(from_epoch),
            to_epoch: Some(to_epoch),
            utc_offset_minutes,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Domain {
    lo: f64,
    hi: f64,
}

impl Domain {
    fn mid(&self) -> f64 {
        (self.lo + self.hi) / 2.0
    }

    fn fraction(&self, v: f64) -> f64 {
        let span = self.hi - self.lo;
        if !(span > 0.0) {
            return 0.0;
        }
        ((v - self.lo) / span).clamp(0.0, 1.0)
    }
}

struct Axes {
    plot: Rect,
    time: Domain,
    millivolts: Option<Domain>,
}

impl Axes {
    fn x(&self, epoch: i64) -> f64 {
        self.plot.x + self.time.fraction(epoch as f64) * self.plot.width
    }

    fn y_percent(&self, percent: f64) -> f64 {
        self.plot.bottom() - (percent / 100.0).clamp(0.0, 1.0) * self.plot.height
    }

    fn y_mv(&self, domain: Domain, mv: f64) -> f64 {
        self.plot.bottom() - domain.fraction(mv) * self.plot.height
    }
}

fn time_domain(samples: &[Sample], window: &ChartWindow) -> Domain {
    let first = samples.first().map(|s| s.sample_epoch).unwrap_or(0);
    let last = samples.last().map(|s| s.sample_epoch).unwrap_or(first);
    let lo = window.from_epoch.unwrap_or(first);
    let mut hi = window.to_epoch.unwrap_or(last);
    if hi <= lo {
        hi = lo.saturating_add(1);
    }
    Domain {
        lo: lo as f64,
        hi: hi as f64,
    }
}

fn millivolt_domain(samples: &[Sample]) -> Option<Domain> {
    let mut values = samples.iter().filter_map(|s| s.battery_mv).map(f64::from);
    let first = values.next()?;
    let (min, max) = values.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));

    let lo = min - MV_PADDING;
    let mut hi = max + MV_PADDING;
    if !(hi > lo) {
        hi = lo + 1.0;
    }
    Some(Domain { lo, hi })
}

/// Render a sample series as a dual-axis chart.
///
/// Percent is plotted on the left axis (fixed 0..100), millivolts on the
/// right axis when any sample reports them. Background bands show USB vs
/// battery power per sample interval.
pub fn render(surface: &mut dyn Surface, samples: &[Sample], window: &ChartWindow) {
    let width = surface.width().max(1.0);
    let height = surface.height().max(1.0);

    surface.fill_rect(Rect::new(0.0, 0.0, width, height), palette::BACKGROUND);

    if samples.is_empty() {
        surface.text(
            EMPTY_MESSAGE,
            Point::new(width / 2.0, height / 2.0),
            Anchor::Middle,
            palette::LABEL,
        );
        return;
    }

    let plot = Rect::new(
        PAD_LEFT,
        PAD_TOP,
        (width - PAD_LEFT - PAD_RIGHT).max(1.0),
        (height - PAD_TOP - PAD_BOTTOM).max(1.0),
    );
    let axes = Axes {
        plot,
        time: time_domain(samples, window),
        millivolts: millivolt_domain(samples),
    };

    draw_bands(surface, samples, &axes, plot.y, plot.height, |s| {
        s.vbus_good.map(|usb| {
            if usb {
                palette::USB_BAND
            } else {
                palette::BATTERY_BAND
            }
        })
    });
    draw_bands(surface, samples, &axes, plot.y, CHARGING_STRIP_HEIGHT, |s| {
        s.charging.map(|charging| {
            if charging {
                palette::CHARGING
            } else {
                palette::NOT_CHARGING
            }
        })
    });

    for percent in PERCENT_GRID {
        let y = axes.y_percent(percent);
        surface.line(
            Point::new(plot.x, y),
            Point::new(plot.right(), y),
            palette::GRID,
            1.0,
        );
    }

    for percent in PERCENT_LABELS {
        surface.text(
            &format!("{}%", percent as i64),
            Point::new(plot.x - 6.0, axes.y_percent(percent) + 4.0),
            Anchor::End,
            palette::LABEL,
        );
    }

    if let Some(mv) = axes.millivolts {
        for value in [mv.lo, mv.mid(), mv.hi] {
            surface.text(
                &format!("{}mV", value.round() as i64),
                Point::new(plot.right() + 6.0, axes.y_mv(mv, value) + 4.0),
                Anchor::Start,
                palette::LABEL,
            );
        }
    }

    let time = axes.time;
    let label_y = plot.bottom() + 16.0;
    for (epoch, x, anchor) in [
        (time.lo, plot.x, Anchor::Start),
        (time.mid(), plot.x + plot.width / 2.0, Anchor::Middle),
        (time.hi, plot.right(), Anchor::End),
    ] {
        surface.text(
            &format_axis_time(epoch.round() as i64, window.utc_offset_minutes),
            Point::new(x, label_y),
            anchor,
            palette::LABEL,
        );
    }

    draw_gapped_line(surface, samples, palette::PERCENT_LINE, |s| {
        s.battery_percent
            .map(|p| Point::new(axes.x(s.sample_epoch), axes.y_percent(f64::from(p))))
    });

    if let Some(mv) = axes.millivolts {
        draw_gapped_line(surface, samples, palette::MV_LINE, |s| {
            s.battery_mv
                .map(|v| Point::new(axes.x(s.sample_epoch), axes.y_mv(mv, f64::from(v))))
        });
    }
}

/// Each sample colors the span up to the next sample's epoch; the last
/// sample extends to the end of the time domain. Unknown states are left
/// unpainted.
fn draw_bands<F>(
    surface: &mut dyn Surface,
    samples: &[Sample],
    axes: &Axes,
    top: f64,
    height: f64,
    color_of: F,
) where
    F: Fn(&Sample) -> Option<Color>,
{
    for (i, sample) in samples.iter().enumerate() {
        let Some(color) = color_of(sample) else {
            continue;
        };
        let x0 = axes.x(sample.sample_epoch);
        let x1 = match samples.get(i + 1) {
            Some(next) => axes.x(next.sample_epoch),
            None => axes.plot.right(),
        };
        if x1 > x0 {
            surface.fill_rect(Rect::new(x0, top, x1 - x0, height), color);
        }
    }
}

/// Connect consecutive defined points; an undefined value breaks the line.
fn draw_gapped_line<F>(surface: &mut dyn Surface, samples: &[Sample], color: Color, point_of: F)
where
    F: Fn(&Sample) -> Option<Point>,
{
    let mut segment: Vec<Point> = Vec::new();
    for sample in samples {
        match point_of(sample) {
            Some(point) => segment.push(point),
            None => flush_segment(surface, &mut segment, color),
        }
    }
    flush_segment(surface, &mut segment, color);
}

fn flush_segment(surface: &mut dyn Surface, segment: &mut Vec<Point>, color: Color) {
    match segment.len() {
        0 => {}
        // An isolated reading still gets a visible mark.
        1 => {
            let p = segment[0];
            surface.fill_rect(Rect::new(p.x - 1.0, p.y - 1.0, 2.0, 2.0), color);
        }
        _ => surface.polyline(segment, color, 1.5),
    }
    segment.clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    pub enum DrawCall {
        FillRect(Rect, Color),
        Line(Point, Point, Color),
        Polyline(Vec<Point>, Color),
        Text(String, Point, Anchor),
    }

    pub struct RecordingSurface {
        pub width: f64,
        pub height: f64,
        pub calls: Vec<DrawCall>,
    }

    impl RecordingSurface {
        pub fn new(width: f64, height: f64) -> Self {
            Self {
                width,
                height,
                calls: Vec::new(),
            }
        }

        fn texts(&self) -> Vec<&str> {
            self.calls
                .iter()
                .filter_map(|c| match c {
                    DrawCall::Text(t, _, _) => Some(t.as_str()),
                    _ => None,
                })
                .collect()
        }

        fn polylines(&self) -> Vec<&DrawCall> {
            self.calls
                .iter()
                .filter(|c| matches!(c, DrawCall::Polyline(..)))
                .collect()
        }
    }

    impl Surface for RecordingSurface {
        fn width(&self) -> f64 {
            self.width
        }

        fn height(&self) -> f64 {
            self.height
        }

        fn fill_rect(&mut self, rect: Rect, color: Color) {
            self.calls.push(DrawCall::FillRect(rect, color));
        }

        fn line(&mut self, from: Point, to: Point, color: Color, _width: f64) {
            self.calls.push(DrawCall::Line(from, to, color));
        }

        fn polyline(&mut self, points: &[Point], color: Color, _width: f64) {
            self.calls.push(DrawCall::Polyline(points.to_vec(), color));
        }

        fn text(&mut self, text: &str, at: Point, anchor: Anchor, _color: Color) {
            self.calls.push(DrawCall::Text(text.to_string(), at, anchor));
        }
    }

    fn sample(epoch: i64, percent: Option<u8>, mv: Option<u32>, vbus: Option<bool>) -> Sample {
        Sample::new(epoch)
            .with_percent(percent)
            .with_mv(mv)
            .with_vbus(vbus)
    }

    fn series() -> Vec<Sample> {
        vec![
            sample(1000, Some(90), Some(4100), Some(true)).with_charging(Some(true)),
            sample(2000, Some(80), Some(4000), Some(false)).with_charging(Some(false)),
            sample(3000, None, Some(3900), Some(false)),
            sample(4000, Some(60), Some(3800), Some(false)),
            sample(5000, Some(50), None, None),
        ]
    }

    #[test]
    fn test_empty_series_draws_placeholder_only() {
        let mut surface = RecordingSurface::new(600.0, 200.0);
        render(&mut surface, &[], &ChartWindow::default());

        assert_eq!(surface.calls.len(), 2);
        assert!(matches!(surface.calls[0], DrawCall::FillRect(_, palette::BACKGROUND)));
        assert_eq!(surface.texts(), vec![EMPTY_MESSAGE]);
        assert!(!surface
            .calls
            .iter()
            .any(|c| matches!(c, DrawCall::Line(..) | DrawCall::Polyline(..))));
    }

    #[test]
    fn test_render_is_deterministic() {
        let window = ChartWindow::new(500, 6000, 0);
        let mut first = RecordingSurface::new(800.0, 240.0);
        let mut second = RecordingSurface::new(800.0, 240.0);

        render(&mut first, &series(), &window);
        render(&mut second, &series(), &window);

        assert_eq!(first.calls, second.calls);
    }

    #[test]
    fn test_gridlines_and_labels() {
        let mut surface = RecordingSurface::new(800.0, 240.0);
        render(&mut surface, &series(), &ChartWindow::default());

        let gridlines = surface
            .calls
            .iter()
            .filter(|c| matches!(c, DrawCall::Line(_, _, palette::GRID)))
            .count();
        assert_eq!(gridlines, 5);

        let texts = surface.texts();
        assert!(texts.contains(&"0%"));
        assert!(texts.contains(&"50%"));
        assert!(texts.contains(&"100%"));
        // observed 3800..4100 padded by 60 each side
        assert!(texts.contains(&"3740mV"));
        assert!(texts.contains(&"3950mV"));
        assert!(texts.contains(&"4160mV"));
    }

    #[test]
    fn test_percent_line_breaks_on_gap() {
        let mut surface = RecordingSurface::new(800.0, 240.0);
        render(&mut surface, &series(), &ChartWindow::default());

        let percent_lines: Vec<_> = surface
            .polylines()
            .into_iter()
            .filter(|c| matches!(c, DrawCall::Polyline(_, palette::PERCENT_LINE)))
            .collect();
        // [90, 80] | gap | [60, 50]
        assert_eq!(percent_lines.len(), 2);

        let mv_lines = surface
            .polylines()
            .into_iter()
            .filter(|c| matches!(c, DrawCall::Polyline(_, palette::MV_LINE)))
            .count();
        assert_eq!(mv_lines, 1);
    }

    #[test]
    fn test_no_millivolt_axis_without_readings() {
        let samples = vec![
            sample(1000, Some(70), None, Some(true)),
            sample(2000, Some(65), None, Some(false)),
        ];
        let mut surface = RecordingSurface::new(800.0, 240.0);
        render(&mut surface, &samples, &ChartWindow::default());

        assert!(!surface.texts().iter().any(|t| t.ends_with("mV")));
        assert!(!surface
            .calls
            .iter()
            .any(|c| matches!(c, DrawCall::Polyline(_, palette::MV_LINE))));
    }

    #[test]
    fn test_bands_follow_next_sample_and_extend_to_domain_end() {
        let samples = vec![
            sample(1000, Some(70), None, Some(true)),
            sample(2000, Some(65), None, Some(false)),
        ];
        let mut surface = RecordingSurface::new(600.0, 200.0);
        render(&mut surface, &samples, &ChartWindow::new(1000, 3000, 0));

        let bands: Vec<Rect> = surface
            .calls
            .iter()
            .filter_map(|c| match c {
                DrawCall::FillRect(r, palette::USB_BAND | palette::BATTERY_BAND) => Some(*r),
                _ => None,
            })
            .collect();
        assert_eq!(bands.len(), 2);

        let plot_width = 600.0 - PAD_LEFT - PAD_RIGHT;
        assert!((bands[0].x - PAD_LEFT).abs() < 1e-9);
        assert!((bands[0].width - plot_width / 2.0).abs() < 1e-9);
        assert!((bands[1].x + bands[1].width - (PAD_LEFT + plot_width)).abs() < 1e-9);
    }

    #[test]
    fn test_single_sample_has_padded_domain() {
        let samples = vec![sample(1000, Some(70), Some(3900), Some(true))];
        let mut surface = RecordingSurface::new(600.0, 200.0);
        render(&mut surface, &samples, &ChartWindow::default());

        // isolated reading is drawn as a dot, not a polyline
        assert!(surface.polylines().is_empty());
        let dot = surface
            .calls
            .iter()
            .find_map(|c| match c {
                DrawCall::FillRect(r, palette::PERCENT_LINE) => Some(*r),
                _ => None,
            })
            .unwrap();
        assert!((dot.x + 1.0 - PAD_LEFT).abs() < 1e-9);

        // time domain 1000..1001, millivolts 3900 padded by 60 each side
        let texts = surface.texts();
        let end_label = format_axis_time(1001, 0);
        assert!(texts.contains(&end_label.as_str()));
        assert!(texts.contains(&"3840mV"));
        assert!(texts.contains(&"3900mV"));
        assert!(texts.contains(&"3960mV"));
    }

    #[test]
    fn test_extreme_epoch_renders_finite_shapes() {
        let samples = vec![Sample::new(i64::MAX).with_percent(Some(50))];
        let mut surface = RecordingSurface::new(600.0, 200.0);
        render(&mut surface, &samples, &ChartWindow::default());

        for call in &surface.calls {
            if let DrawCall::FillRect(r, _) = call {
                assert!(r.x.is_finite() && r.y.is_finite());
                assert!(r.width.is_finite() && r.height.is_finite());
            }
        }
        assert!(surface
            .calls
            .iter()
            .any(|c| matches!(c, DrawCall::FillRect(_, palette::PERCENT_LINE))));
    }

    #[test]
    fn test_charging_strip_drawn() {
        let mut surface = RecordingSurface::new(800.0, 240.0);
        render(&mut surface, &series(), &ChartWindow::default());

        let strips = surface
            .calls
            .iter()
            .filter(|c| {
                matches!(
                    c,
                    DrawCall::FillRect(r, palette::CHARGING | palette::NOT_CHARGING)
                        if (r.height - CHARGING_STRIP_HEIGHT).abs() < 1e-9
                )
            })
            .count();
        assert_eq!(strips, 2);
    }
}
