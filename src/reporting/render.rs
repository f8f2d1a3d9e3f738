//! Chart renderers: terminal text always, SVG with the `svg` feature

use super::charts::{Bar, BoxStats, ChartSpec, Series, StackSegment};
use crate::error::Result;
use colored::*;
use std::fmt::Write as _;

/// Consumes chart descriptions
pub trait ChartRenderer {
    type Output;

    fn render(&self, chart: &ChartSpec) -> Result<Self::Output>;

    fn render_all(&self, charts: &[ChartSpec]) -> Result<Vec<Self::Output>> {
        charts.iter().map(|c| self.render(c)).collect()
    }
}

const SPARK: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
const SEGMENT_COLORS: [(u8, u8, u8); 4] = [(120, 170, 255), (255, 140, 110), (100, 210, 120), (220, 190, 90)];

/// Renders charts as plain or colored terminal text
#[derive(Debug, Clone)]
pub struct TextRenderer {
    /// Width of the plotting area in characters
    width: usize,
    color: bool,
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self { width: 40, color: true }
    }
}

impl TextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width.max(8);
        self
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    fn paint(&self, s: &str, rgb: (u8, u8, u8)) -> String {
        if self.color {
            s.truecolor(rgb.0, rgb.1, rgb.2).to_string()
        } else {
            s.to_string()
        }
    }

    fn title(&self, out: &mut String, title: &str) {
        if self.color {
            let _ = writeln!(out, "{}", title.white().bold());
        } else {
            let _ = writeln!(out, "{}", title);
        }
    }

    fn heatmap(&self, out: &mut String, labels: &[String], values: &[Vec<f64>]) {
        let short: Vec<String> = labels.iter().map(|l| truncate(l, 6)).collect();
        let _ = write!(out, "{:>12}", "");
        for l in &short {
            let _ = write!(out, " {:>6}", l);
        }
        let _ = writeln!(out);
        for (label, row) in labels.iter().zip(values) {
            let _ = write!(out, "{:>12}", truncate(label, 12));
            for &v in row {
                let cell = format!(" {:>6.2}", v);
                let shade = (v.abs().min(1.0) * 155.0) as u8 + 100;
                let rgb = if v >= 0.0 { (shade, 110, 110) } else { (110, 110, shade) };
                out.push_str(&self.paint(&cell, rgb));
            }
            let _ = writeln!(out);
        }
    }

    fn bars(&self, out: &mut String, y_label: &str, bars: &[Bar]) {
        let max = bars.iter().map(|b| b.value.abs()).fold(0.0, f64::max);
        let label_width = bars.iter().map(|b| b.label.chars().count()).max().unwrap_or(0).min(28);
        for bar in bars {
            let len = if max > 0.0 && bar.value > 0.0 {
                ((bar.value / max) * self.width as f64).round() as usize
            } else {
                0
            };
            let value = match bar.error {
                Some(e) => format!("{:.4} ± {:.4}", bar.value, e),
                None => format!("{:.4}", bar.value),
            };
            let _ = writeln!(
                out,
                "{:>w$} │{} {}",
                truncate(&bar.label, label_width),
                self.paint(&"█".repeat(len), SEGMENT_COLORS[0]),
                value,
                w = label_width
            );
        }
        let _ = writeln!(out, "{:>w$}   ({})", "", y_label, w = label_width);
    }

    fn stacked(&self, out: &mut String, categories: &[String], segments: &[StackSegment]) {
        let totals: Vec<f64> = (0..categories.len())
            .map(|i| segments.iter().map(|s| s.values.get(i).copied().unwrap_or(0.0)).sum())
            .collect();
        let max = totals.iter().copied().fold(0.0, f64::max);
        for (i, category) in categories.iter().enumerate() {
            let _ = write!(out, "{:>8} │", truncate(category, 8));
            for (k, segment) in segments.iter().enumerate() {
                let v = segment.values.get(i).copied().unwrap_or(0.0);
                let len = if max > 0.0 { ((v / max) * self.width as f64).round() as usize } else { 0 };
                out.push_str(&self.paint(&"█".repeat(len), SEGMENT_COLORS[k % SEGMENT_COLORS.len()]));
            }
            let counts: Vec<String> = segments
                .iter()
                .map(|s| format!("{}", s.values.get(i).copied().unwrap_or(0.0)))
                .collect();
            let _ = writeln!(out, " {}", counts.join(" / "));
        }
        let legend: Vec<String> = segments
            .iter()
            .enumerate()
            .map(|(k, s)| format!("{} {}", self.paint("█", SEGMENT_COLORS[k % SEGMENT_COLORS.len()]), s.name))
            .collect();
        let _ = writeln!(out, "{:>8}   {}", "", legend.join("  "));
    }

    fn boxes(&self, out: &mut String, y_label: &str, boxes: &[BoxStats]) {
        let lo = boxes.iter().map(|b| b.min).fold(f64::INFINITY, f64::min);
        let hi = boxes.iter().map(|b| b.max).fold(f64::NEG_INFINITY, f64::max);
        let span = if hi > lo { hi - lo } else { 1.0 };
        let pos = |v: f64| (((v - lo) / span) * (self.width - 1) as f64).round() as usize;

        for b in boxes {
            let mut line: Vec<char> = vec![' '; self.width];
            for c in line.iter_mut().take(pos(b.max) + 1).skip(pos(b.min)) {
                *c = '─';
            }
            for c in line.iter_mut().take(pos(b.q3) + 1).skip(pos(b.q1)) {
                *c = '▒';
            }
            line[pos(b.min)] = '├';
            line[pos(b.max)] = '┤';
            line[pos(b.median)] = '┃';
            let drawn: String = line.into_iter().collect();
            let _ = writeln!(
                out,
                "{:>12} {} median {:.2}",
                truncate(&b.label, 12),
                self.paint(&drawn, SEGMENT_COLORS[0]),
                b.median
            );
        }
        let _ = writeln!(out, "{:>12} {:<w$.2}{:>8.2}  ({})", "", lo, hi, y_label, w = self.width - 8);
    }

    fn lines(&self, out: &mut String, x_label: &str, y_label: &str, series: &[Series]) {
        let name_width = series.iter().map(|s| s.name.chars().count()).max().unwrap_or(0).min(20);
        for (k, s) in series.iter().enumerate() {
            let ys: Vec<f64> = resample(&s.points, self.width).into_iter().map(|(_, y)| y).collect();
            let _ = writeln!(
                out,
                "{:>w$} {} {}",
                truncate(&s.name, name_width),
                self.paint(&sparkline(&ys), SEGMENT_COLORS[k % SEGMENT_COLORS.len()]),
                range_note(&ys),
                w = name_width
            );
        }
        let _ = writeln!(out, "{:>w$} x: {}  y: {}", "", x_label, y_label, w = name_width);
    }
}

impl ChartRenderer for TextRenderer {
    type Output = String;

    fn render(&self, chart: &ChartSpec) -> Result<String> {
        let mut out = String::new();
        self.title(&mut out, chart.title());
        match chart {
            ChartSpec::Heatmap { labels, values, .. } => self.heatmap(&mut out, labels, values),
            ChartSpec::Bar { y_label, bars, .. } => self.bars(&mut out, y_label, bars),
            ChartSpec::StackedBar { categories, segments, .. } => self.stacked(&mut out, categories, segments),
            ChartSpec::BoxPlot { y_label, boxes, .. } => self.boxes(&mut out, y_label, boxes),
            ChartSpec::Lines { x_label, y_label, series, .. } => self.lines(&mut out, x_label, y_label, series),
        }
        Ok(out)
    }
}

fn truncate(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}

/// At most `n` points, picked evenly along the series
fn resample(points: &[(f64, f64)], n: usize) -> Vec<(f64, f64)> {
    if points.len() <= n || n < 2 {
        return points.to_vec();
    }
    (0..n)
        .map(|i| points[i * (points.len() - 1) / (n - 1)])
        .collect()
}

fn sparkline(values: &[f64]) -> String {
    let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    values
        .iter()
        .map(|&v| {
            if hi > lo {
                SPARK[(((v - lo) / (hi - lo)) * 7.0).round() as usize]
            } else {
                SPARK[3]
            }
        })
        .collect()
}

fn range_note(values: &[f64]) -> String {
    match (values.first(), values.last()) {
        (Some(first), Some(last)) => format!("{:.3} → {:.3}", first, last),
        _ => "empty".to_string(),
    }
}

#[cfg(feature = "svg")]
pub use svg::SvgRenderer;

#[cfg(feature = "svg")]
mod svg {
    use super::ChartRenderer;
    use crate::reporting::charts::{Bar, BoxStats, ChartSpec, Series, StackSegment};
    use crate::error::{ClinicalError, Result};
    use plotters::coord::Shift;
    use plotters::prelude::*;
    use std::path::{Path, PathBuf};
    use tracing::info;

    const PALETTE: [RGBColor; 6] = [
        RGBColor(66, 133, 244),
        RGBColor(234, 67, 53),
        RGBColor(52, 168, 83),
        RGBColor(251, 188, 5),
        RGBColor(142, 68, 173),
        RGBColor(0, 150, 136),
    ];

    type Area<'a> = DrawingArea<SVGBackend<'a>, Shift>;

    fn render_err<E: std::fmt::Display>(err: E) -> ClinicalError {
        ClinicalError::RenderError(err.to_string())
    }

    fn color(k: usize) -> RGBColor {
        PALETTE[k % PALETTE.len()]
    }

    /// Padded (low, high) that is never empty
    fn padded(lo: f64, hi: f64) -> (f64, f64) {
        if hi > lo {
            let pad = (hi - lo) * 0.05;
            (lo - pad, hi + pad)
        } else {
            (lo - 1.0, hi + 1.0)
        }
    }

    /// Renders charts to SVG documents with plotters
    #[derive(Debug, Clone)]
    pub struct SvgRenderer {
        width: u32,
        height: u32,
    }

    impl Default for SvgRenderer {
        fn default() -> Self {
            Self { width: 900, height: 600 }
        }
    }

    impl SvgRenderer {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_size(mut self, width: u32, height: u32) -> Self {
            self.width = width;
            self.height = height;
            self
        }

        /// Write every chart to `dir` as `NN_<slug>.svg`
        pub fn save_all(&self, charts: &[ChartSpec], dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
            let dir = dir.as_ref();
            std::fs::create_dir_all(dir)?;
            let mut paths = Vec::with_capacity(charts.len());
            for (i, chart) in charts.iter().enumerate() {
                let path = dir.join(format!("{:02}_{}.svg", i + 1, chart.slug()));
                std::fs::write(&path, self.render(chart)?)?;
                paths.push(path);
            }
            info!(dir = %dir.display(), charts = paths.len(), "Wrote SVG charts");
            Ok(paths)
        }

        fn heatmap(&self, root: &Area<'_>, title: &str, labels: &[String], values: &[Vec<f64>]) -> Result<()> {
            let n = labels.len() as i32;
            let mut chart = ChartBuilder::on(root)
                .caption(title, ("sans-serif", 20))
                .margin(10)
                .x_label_area_size(60)
                .y_label_area_size(120)
                .build_cartesian_2d((0..n).into_segmented(), (0..n).into_segmented())
                .map_err(render_err)?;
            let label_of = |v: &SegmentValue<i32>| match v {
                SegmentValue::CenterOf(i) => labels.get(*i as usize).cloned().unwrap_or_default(),
                _ => String::new(),
            };
            chart
                .configure_mesh()
                .disable_mesh()
                .x_labels(labels.len())
                .y_labels(labels.len())
                .x_label_formatter(&label_of)
                .y_label_formatter(&label_of)
                .draw()
                .map_err(render_err)?;

            let cells = values.iter().enumerate().flat_map(|(i, row)| {
                row.iter().enumerate().map(move |(j, &v)| {
                    let t = v.clamp(-1.0, 1.0);
                    let fade = (255.0 * (1.0 - t.abs())) as u8;
                    let fill = if t >= 0.0 { RGBColor(255, fade, fade) } else { RGBColor(fade, fade, 255) };
                    let (i, j) = (i as i32, j as i32);
                    Rectangle::new(
                        [(SegmentValue::Exact(j), SegmentValue::Exact(i)), (SegmentValue::Exact(j + 1), SegmentValue::Exact(i + 1))],
                        fill.filled(),
                    )
                })
            });
            chart.draw_series(cells).map_err(render_err)?;
            Ok(())
        }

        fn bars(&self, root: &Area<'_>, title: &str, y_label: &str, bars: &[Bar]) -> Result<()> {
            let n = bars.len() as i32;
            let lo = bars.iter().map(|b| b.value - b.error.unwrap_or(0.0)).fold(0.0, f64::min);
            let hi = bars.iter().map(|b| b.value + b.error.unwrap_or(0.0)).fold(0.0, f64::max);
            let (lo, hi) = padded(lo, hi);
            let mut chart = ChartBuilder::on(root)
                .caption(title, ("sans-serif", 20))
                .margin(10)
                .x_label_area_size(60)
                .y_label_area_size(60)
                .build_cartesian_2d((0..n).into_segmented(), lo..hi)
                .map_err(render_err)?;
            chart
                .configure_mesh()
                .disable_x_mesh()
                .x_labels(bars.len())
                .x_label_formatter(&|v: &SegmentValue<i32>| match v {
                    SegmentValue::CenterOf(i) => bars.get(*i as usize).map(|b| b.label.clone()).unwrap_or_default(),
                    _ => String::new(),
                })
                .y_desc(y_label)
                .draw()
                .map_err(render_err)?;

            chart
                .draw_series(bars.iter().enumerate().map(|(i, b)| {
                    let i = i as i32;
                    let mut rect = Rectangle::new(
                        [(SegmentValue::Exact(i), 0.0), (SegmentValue::Exact(i + 1), b.value)],
                        color(0).filled(),
                    );
                    rect.set_margin(0, 0, 8, 8);
                    rect
                }))
                .map_err(render_err)?;
            chart
                .draw_series(bars.iter().enumerate().filter_map(|(i, b)| {
                    b.error.map(|e| {
                        let x = SegmentValue::CenterOf(i as i32);
                        PathElement::new(vec![(x.clone(), b.value - e), (x, b.value + e)], BLACK.stroke_width(1))
                    })
                }))
                .map_err(render_err)?;
            Ok(())
        }

        fn stacked(&self, root: &Area<'_>, title: &str, categories: &[String], segments: &[StackSegment]) -> Result<()> {
            let n = categories.len() as i32;
            let total = (0..categories.len())
                .map(|i| segments.iter().map(|s| s.values.get(i).copied().unwrap_or(0.0)).sum::<f64>())
                .fold(0.0, f64::max);
            let mut chart = ChartBuilder::on(root)
                .caption(title, ("sans-serif", 20))
                .margin(10)
                .x_label_area_size(40)
                .y_label_area_size(60)
                .build_cartesian_2d((0..n).into_segmented(), 0.0..padded(0.0, total).1)
                .map_err(render_err)?;
            chart
                .configure_mesh()
                .disable_x_mesh()
                .x_labels(categories.len())
                .x_label_formatter(&|v: &SegmentValue<i32>| match v {
                    SegmentValue::CenterOf(i) => categories.get(*i as usize).cloned().unwrap_or_default(),
                    _ => String::new(),
                })
                .y_desc("rows")
                .draw()
                .map_err(render_err)?;

            let mut bottoms = vec![0.0; categories.len()];
            for (k, segment) in segments.iter().enumerate() {
                let fill = color(k);
                let rects: Vec<_> = bottoms
                    .iter_mut()
                    .enumerate()
                    .map(|(i, bottom)| {
                        let v = segment.values.get(i).copied().unwrap_or(0.0);
                        let x = i as i32;
                        let mut rect = Rectangle::new(
                            [(SegmentValue::Exact(x), *bottom), (SegmentValue::Exact(x + 1), *bottom + v)],
                            fill.filled(),
                        );
                        rect.set_margin(0, 0, 12, 12);
                        *bottom += v;
                        rect
                    })
                    .collect();
                chart
                    .draw_series(rects)
                    .map_err(render_err)?
                    .label(segment.name.clone())
                    .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], fill.filled()));
            }
            chart
                .configure_series_labels()
                .background_style(&WHITE.mix(0.8))
                .border_style(&BLACK)
                .draw()
                .map_err(render_err)?;
            Ok(())
        }

        fn boxes(&self, root: &Area<'_>, title: &str, y_label: &str, boxes: &[BoxStats]) -> Result<()> {
            let n = boxes.len() as i32;
            let lo = boxes.iter().map(|b| b.min).fold(f64::INFINITY, f64::min);
            let hi = boxes.iter().map(|b| b.max).fold(f64::NEG_INFINITY, f64::max);
            let (lo, hi) = padded(lo, hi);
            let mut chart = ChartBuilder::on(root)
                .caption(title, ("sans-serif", 20))
                .margin(10)
                .x_label_area_size(40)
                .y_label_area_size(60)
                .build_cartesian_2d((0..n).into_segmented(), lo..hi)
                .map_err(render_err)?;
            chart
                .configure_mesh()
                .disable_x_mesh()
                .x_labels(boxes.len())
                .x_label_formatter(&|v: &SegmentValue<i32>| match v {
                    SegmentValue::CenterOf(i) => boxes.get(*i as usize).map(|b| b.label.clone()).unwrap_or_default(),
                    _ => String::new(),
                })
                .y_desc(y_label)
                .draw()
                .map_err(render_err)?;

            for (i, b) in boxes.iter().enumerate() {
                let x = i as i32;
                let center = SegmentValue::CenterOf(x);
                let mut body = Rectangle::new(
                    [(SegmentValue::Exact(x), b.q1), (SegmentValue::Exact(x + 1), b.q3)],
                    color(i).mix(0.6).filled(),
                );
                body.set_margin(0, 0, 30, 30);
                chart.draw_series(std::iter::once(body)).map_err(render_err)?;
                chart
                    .draw_series(vec![
                        PathElement::new(vec![(center.clone(), b.min), (center.clone(), b.q1)], BLACK.stroke_width(1)),
                        PathElement::new(vec![(center.clone(), b.q3), (center, b.max)], BLACK.stroke_width(1)),
                    ])
                    .map_err(render_err)?;
                let mut median = Rectangle::new(
                    [(SegmentValue::Exact(x), b.median), (SegmentValue::Exact(x + 1), b.median)],
                    BLACK.stroke_width(2),
                );
                median.set_margin(0, 0, 30, 30);
                chart.draw_series(std::iter::once(median)).map_err(render_err)?;
            }
            Ok(())
        }

        fn lines(&self, root: &Area<'_>, title: &str, x_label: &str, y_label: &str, series: &[Series], diagonal: bool) -> Result<()> {
            let points = series.iter().flat_map(|s| s.points.iter());
            let (x_lo, x_hi, y_lo, y_hi) = points.fold(
                (f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY),
                |(a, b, c, d), &(x, y)| (a.min(x), b.max(x), c.min(y), d.max(y)),
            );
            let ((x_lo, x_hi), (y_lo, y_hi)) = if diagonal {
                ((0.0, 1.0), (0.0, 1.0))
            } else if x_lo.is_finite() {
                (padded(x_lo, x_hi), padded(y_lo, y_hi))
            } else {
                ((0.0, 1.0), (0.0, 1.0))
            };
            let mut chart = ChartBuilder::on(root)
                .caption(title, ("sans-serif", 20))
                .margin(10)
                .x_label_area_size(40)
                .y_label_area_size(60)
                .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)
                .map_err(render_err)?;
            chart
                .configure_mesh()
                .x_desc(x_label)
                .y_desc(y_label)
                .draw()
                .map_err(render_err)?;

            if diagonal {
                chart
                    .draw_series(LineSeries::new(vec![(0.0, 0.0), (1.0, 1.0)], BLACK.mix(0.4).stroke_width(1)))
                    .map_err(render_err)?;
            }
            for (k, s) in series.iter().enumerate() {
                let stroke = color(k);
                chart
                    .draw_series(LineSeries::new(s.points.iter().copied(), stroke.stroke_width(2)))
                    .map_err(render_err)?
                    .label(s.name.clone())
                    .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], stroke.stroke_width(2)));
            }
            chart
                .configure_series_labels()
                .background_style(&WHITE.mix(0.8))
                .border_style(&BLACK)
                .draw()
                .map_err(render_err)?;
            Ok(())
        }
    }

    impl ChartRenderer for SvgRenderer {
        type Output = String;

        fn render(&self, chart: &ChartSpec) -> Result<String> {
            let mut buf = String::new();
            {
                let root = SVGBackend::with_string(&mut buf, (self.width, self.height)).into_drawing_area();
                root.fill(&WHITE).map_err(render_err)?;
                match chart {
                    ChartSpec::Heatmap { title, labels, values } => self.heatmap(&root, title, labels, values)?,
                    ChartSpec::Bar { title, y_label, bars } => self.bars(&root, title, y_label, bars)?,
                    ChartSpec::StackedBar { title, categories, segments } => {
                        self.stacked(&root, title, categories, segments)?
                    }
                    ChartSpec::BoxPlot { title, y_label, boxes } => self.boxes(&root, title, y_label, boxes)?,
                    ChartSpec::Lines { title, x_label, y_label, series, diagonal } => {
                        self.lines(&root, title, x_label, y_label, series, *diagonal)?
                    }
                }
                root.present().map_err(render_err)?;
            }
            Ok(buf)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() -> TextRenderer {
        TextRenderer::new().with_width(20).with_color(false)
    }

    #[test]
    fn test_bar_lengths() {
        let chart = ChartSpec::Bar {
            title: "Test accuracy".to_string(),
            y_label: "accuracy".to_string(),
            bars: vec![Bar::new("lr", 0.8), Bar::new("rf", 0.4)],
        };
        let text = plain().render(&chart).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Test accuracy");
        assert_eq!(lines[1].matches('█').count(), 20);
        assert_eq!(lines[2].matches('█').count(), 10);
        assert!(lines[1].contains("0.8000"));
    }

    #[test]
    fn test_render_every_kind() {
        let charts = vec![
            ChartSpec::Heatmap {
                title: "h".to_string(),
                labels: vec!["a".to_string(), "b".to_string()],
                values: vec![vec![1.0, -0.5], vec![-0.5, 1.0]],
            },
            ChartSpec::StackedBar {
                title: "s".to_string(),
                categories: vec!["0".to_string(), "1".to_string()],
                segments: vec![StackSegment { name: "outcome 0".to_string(), values: vec![3.0, 1.0] }],
            },
            ChartSpec::BoxPlot {
                title: "b".to_string(),
                y_label: "age".to_string(),
                boxes: vec![BoxStats { label: "outcome 0".to_string(), min: 40.0, q1: 50.0, median: 60.0, q3: 70.0, max: 90.0 }],
            },
            ChartSpec::Lines {
                title: "l".to_string(),
                x_label: "fpr".to_string(),
                y_label: "tpr".to_string(),
                series: vec![Series { name: "fold 1".to_string(), points: vec![(0.0, 0.0), (0.5, 0.8), (1.0, 1.0)] }],
                diagonal: true,
            },
        ];
        let rendered = plain().render_all(&charts).unwrap();
        assert_eq!(rendered.len(), 4);
        assert!(rendered[0].contains("-0.50"));
        assert!(rendered[2].contains("median 60.00"));
        assert!(rendered[3].contains("0.000 → 1.000"));
    }

    #[test]
    fn test_sparkline_and_resample() {
        assert_eq!(sparkline(&[0.0, 1.0]), "▁█");
        let points: Vec<(f64, f64)> = (0..100).map(|i| (i as f64, i as f64)).collect();
        let sampled = resample(&points, 10);
        assert_eq!(sampled.len(), 10);
        assert_eq!(sampled[0], (0.0, 0.0));
        assert_eq!(sampled[9], (99.0, 99.0));
    }

    #[cfg(feature = "svg")]
    #[test]
    fn test_svg_document() {
        let chart = ChartSpec::Bar {
            title: "Test accuracy".to_string(),
            y_label: "accuracy".to_string(),
            bars: vec![Bar::new("lr", 0.8).with_error(0.05)],
        };
        let svg = SvgRenderer::new().render(&chart).unwrap();
        assert!(svg.starts_with("<svg"));
    }
}
