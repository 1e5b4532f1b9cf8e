//! Chart building and rendering.
//!
//! Pages describe a chart as a [`Scene`] (plain polylines and markers) and
//! [`render_svg`] draws it with plotters into an in-memory SVG. No text is drawn,
//! so no system fonts are needed.

use crate::domain::model::StandardForm;
use crate::utils::error::{LabError, Result};
use plotters::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotSettings {
    /// The rational window is `[p - W, p + W] × [q - W, q + W]`.
    pub half_window: f64,
    /// Sample count per branch or curve.
    pub samples: usize,
    /// No sample lands closer than this to the vertical asymptote.
    pub exclusion: f64,
    pub width: u32,
    pub height: u32,
}

impl Default for PlotSettings {
    fn default() -> Self {
        Self {
            half_window: 10.0,
            samples: 400,
            exclusion: 0.01,
            width: 800,
            height: 600,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlotWindow {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl PlotWindow {
    pub fn centered(x: f64, y: f64, half: f64) -> Self {
        Self {
            x_min: x - half,
            x_max: x + half,
            y_min: y - half,
            y_max: y + half,
        }
    }

    pub fn contains(&self, (x, y): (f64, f64)) -> bool {
        (self.x_min..=self.x_max).contains(&x) && (self.y_min..=self.y_max).contains(&y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    Curve,
    Reference,
    Asymptote,
    Axis,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Polyline {
    pub label: String,
    pub kind: LineKind,
    pub points: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scene {
    pub window: PlotWindow,
    pub lines: Vec<Polyline>,
    pub markers: Vec<(f64, f64)>,
}

impl Scene {
    pub fn new(window: PlotWindow) -> Self {
        Self {
            window,
            lines: Vec::new(),
            markers: Vec::new(),
        }
    }

    /// Adds the coordinate axes where they cross the window.
    pub fn with_axes(mut self) -> Self {
        let w = self.window;
        if (w.y_min..=w.y_max).contains(&0.0) {
            self.push_line("x axis", LineKind::Axis, vec![(w.x_min, 0.0), (w.x_max, 0.0)]);
        }
        if (w.x_min..=w.x_max).contains(&0.0) {
            self.push_line("y axis", LineKind::Axis, vec![(0.0, w.y_min), (0.0, w.y_max)]);
        }
        self
    }

    pub fn push_line(&mut self, label: &str, kind: LineKind, points: Vec<(f64, f64)>) {
        self.lines.push(Polyline {
            label: label.to_string(),
            kind,
            points,
        });
    }

    /// Adds a sampled curve, split wherever it leaves the window.
    pub fn push_curve(&mut self, label: &str, kind: LineKind, points: Vec<(f64, f64)>) {
        for segment in clip_to_window(&points, &self.window) {
            self.push_line(label, kind, segment);
        }
    }

    pub fn curves(&self) -> impl Iterator<Item = &Polyline> {
        self.lines
            .iter()
            .filter(|l| matches!(l.kind, LineKind::Curve | LineKind::Reference))
    }
}

/// `n` evenly spaced values from `start` to `end` inclusive.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n).map(|i| start + step * i as f64).collect()
        }
    }
}

/// Splits a polyline into runs of consecutive in-window, finite points.
pub fn clip_to_window(points: &[(f64, f64)], window: &PlotWindow) -> Vec<Vec<(f64, f64)>> {
    let mut segments = Vec::new();
    let mut current = Vec::new();
    for &point in points {
        if point.1.is_finite() && window.contains(point) {
            current.push(point);
        } else if !current.is_empty() {
            segments.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments.retain(|s| s.len() > 1);
    segments
}

/// Samples one side of `x = p`. Points closer than `exclusion` to `p` are never produced.
pub fn sample_branch(
    form: &StandardForm,
    from: f64,
    to: f64,
    settings: &PlotSettings,
) -> Vec<(f64, f64)> {
    linspace(from, to, settings.samples)
        .into_iter()
        .filter(|x| (x - form.p).abs() >= settings.exclusion)
        .map(|x| (x, form.evaluate(x)))
        .collect()
}

/// Two branches split at `x = p`, both asymptotes, their intersection and the axes.
pub fn rational_scene(form: &StandardForm, settings: &PlotSettings) -> Scene {
    let window = PlotWindow::centered(form.p, form.q, settings.half_window);
    let mut scene = Scene::new(window).with_axes();

    scene.push_line(
        "vertical asymptote",
        LineKind::Asymptote,
        vec![(form.p, window.y_min), (form.p, window.y_max)],
    );
    scene.push_line(
        "horizontal asymptote",
        LineKind::Asymptote,
        vec![(window.x_min, form.q), (window.x_max, form.q)],
    );

    let left = sample_branch(form, window.x_min, form.p - settings.exclusion, settings);
    let right = sample_branch(form, form.p + settings.exclusion, window.x_max, settings);
    scene.push_curve("left branch", LineKind::Curve, left);
    scene.push_curve("right branch", LineKind::Curve, right);

    scene.markers.push((form.p, form.q));
    scene
}

fn plot_error<E: std::fmt::Display>(e: E) -> LabError {
    LabError::PlotError {
        message: e.to_string(),
    }
}

fn line_style(kind: LineKind) -> ShapeStyle {
    match kind {
        LineKind::Curve => BLUE.stroke_width(2),
        LineKind::Reference => RGBColor(100, 149, 237).stroke_width(1),
        LineKind::Asymptote => RGBColor(128, 128, 128).stroke_width(1),
        LineKind::Axis => RGBColor(200, 200, 200).stroke_width(1),
    }
}

pub fn render_svg(scene: &Scene, settings: &PlotSettings) -> Result<String> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (settings.width, settings.height))
            .into_drawing_area();
        root.fill(&WHITE).map_err(plot_error)?;

        let w = scene.window;
        let mut chart = ChartBuilder::on(&root)
            .margin(20)
            .build_cartesian_2d(w.x_min..w.x_max, w.y_min..w.y_max)
            .map_err(plot_error)?;

        // Axes and asymptotes first so curves sit on top.
        let mut lines: Vec<&Polyline> = scene.lines.iter().collect();
        lines.sort_by_key(|l| match l.kind {
            LineKind::Axis => 0,
            LineKind::Asymptote => 1,
            LineKind::Reference => 2,
            LineKind::Curve => 3,
        });
        for line in lines {
            chart
                .draw_series(LineSeries::new(line.points.iter().copied(), line_style(line.kind)))
                .map_err(plot_error)?;
        }

        chart
            .draw_series(
                scene
                    .markers
                    .iter()
                    .map(|&at| Circle::new(at, 4, RED.filled())),
            )
            .map_err(plot_error)?;

        root.present().map_err(plot_error)?;
    }
    tracing::debug!("Rendered SVG chart ({} bytes)", svg.len());
    Ok(svg)
}

/// `series,x,y` rows for every sampled curve in the scene.
pub fn samples_csv(scene: &Scene) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["series", "x", "y"])?;
    for line in scene.curves() {
        for &(x, y) in &line.points {
            writer.serialize((&line.label, x, y))?;
        }
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| LabError::IoError(e.into_error()))?;
    String::from_utf8(bytes).map_err(plot_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(p: f64, q: f64, k: f64) -> StandardForm {
        StandardForm { p, q, k }
    }

    #[test]
    fn test_linspace_endpoints() {
        let xs = linspace(-10.0, 10.0, 5);
        assert_eq!(xs, vec![-10.0, -5.0, 0.0, 5.0, 10.0]);
        assert!(linspace(0.0, 1.0, 0).is_empty());
    }

    #[test]
    fn test_window_is_centered_on_asymptotes() {
        let scene = rational_scene(&form(3.0, 2.0, 7.0), &PlotSettings::default());
        assert_eq!(
            scene.window,
            PlotWindow {
                x_min: -7.0,
                x_max: 13.0,
                y_min: -8.0,
                y_max: 12.0
            }
        );
        assert_eq!(scene.markers, vec![(3.0, 2.0)]);
    }

    #[test]
    fn test_branches_never_touch_excluded_value() {
        let settings = PlotSettings::default();
        for f in [
            form(3.0, 2.0, 7.0),
            form(-2.0, 2.0, 0.0),
            form(0.0, 0.0, 5.0),
            form(1.0 / 3.0, -4.5, -0.2),
        ] {
            let scene = rational_scene(&f, &settings);
            let curves: Vec<&Polyline> = scene.curves().collect();
            assert!(!curves.is_empty());
            for curve in curves {
                assert!(curve
                    .points
                    .iter()
                    .all(|(x, _)| (x - f.p).abs() >= settings.exclusion));
                // Each polyline stays on one side of the asymptote.
                let left = curve.points.iter().all(|(x, _)| *x < f.p);
                let right = curve.points.iter().all(|(x, _)| *x > f.p);
                assert!(left ^ right, "{} crosses x = p", curve.label);
            }
        }
    }

    #[test]
    fn test_branch_points_stay_in_window() {
        let scene = rational_scene(&form(0.0, 0.0, 5.0), &PlotSettings::default());
        for curve in scene.curves() {
            assert!(curve.points.iter().all(|&pt| scene.window.contains(pt)));
        }
    }

    #[test]
    fn test_clip_splits_on_gaps() {
        let window = PlotWindow::centered(0.0, 0.0, 1.0);
        let points = vec![(0.0, 0.0), (0.1, 0.5), (0.2, 5.0), (0.3, 0.2), (0.4, 0.1)];
        let segments = clip_to_window(&points, &window);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].len(), 2);
        assert_eq!(segments[1].len(), 2);
    }

    #[test]
    fn test_render_svg_produces_document() {
        let settings = PlotSettings::default();
        let scene = rational_scene(&form(3.0, 2.0, 7.0), &settings);
        let svg = render_svg(&scene, &settings).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("</svg>"));
        assert!(svg.contains("polyline") || svg.contains("path"));
    }

    #[test]
    fn test_samples_csv_has_header_and_rows() {
        let settings = PlotSettings {
            samples: 11,
            ..PlotSettings::default()
        };
        let scene = rational_scene(&form(0.0, 0.0, 1.0), &settings);
        let csv = samples_csv(&scene).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("series,x,y"));
        assert!(lines.all(|l| l.starts_with("left branch,") || l.starts_with("right branch,")));
    }
}
