use crate::core::plot::{linspace, LineKind, PlotSettings, PlotWindow, Scene};
use crate::domain::model::{format_number, QuadraticForm};
use crate::utils::error::{LabError, Result};
use crate::utils::validation::{validate_choice, validate_range, validate_step};
use regex::Regex;
use serde::Serialize;

/// Values offered for `a` on the explorer page.
pub const A_CHOICES: [f64; 6] = [1.0, -1.0, 0.5, -0.5, 2.0, -2.0];
pub const SHIFT_MIN: f64 = -5.0;
pub const SHIFT_MAX: f64 = 5.0;
pub const SHIFT_STEP: f64 = 0.5;
/// The explorer always draws over `[-10, 10] × [-10, 10]`.
pub const VIEW_HALF_WIDTH: f64 = 10.0;

/// Builds a form from slider values, enforcing the page's allowed inputs.
pub fn form_from_sliders(a: f64, p: f64, q: f64) -> Result<QuadraticForm> {
    validate_choice("a", a, &A_CHOICES)?;
    for (field, value) in [("p", p), ("q", q)] {
        validate_range(field, value, SHIFT_MIN, SHIFT_MAX)?;
        validate_step(field, value, SHIFT_MIN, SHIFT_STEP)?;
    }
    QuadraticForm::new(a, p, q)
}

#[derive(Debug, Clone, Serialize)]
pub struct QuadraticFacts {
    pub form: QuadraticForm,
    pub vertex: (f64, f64),
    pub opens_upward: bool,
    pub x_shift: f64,
    pub y_shift: f64,
}

pub fn describe(form: &QuadraticForm) -> QuadraticFacts {
    QuadraticFacts {
        form: *form,
        vertex: form.vertex(),
        opens_upward: form.opens_upward(),
        x_shift: form.p(),
        y_shift: form.q(),
    }
}

impl QuadraticFacts {
    pub fn summary(&self) -> String {
        let (p, q) = self.vertex;
        let mut lines = vec![
            format!("Function: {}", self.form),
            format!("Vertex: ({}, {})", format_number(p), format_number(q)),
            format!(
                "Shape: opens {}",
                if self.opens_upward { "upward" } else { "downward" }
            ),
            format!(
                "Translation of y = {}x^2: {} along x, {} along y",
                format_number(self.form.a()),
                format_number(self.x_shift),
                format_number(self.y_shift)
            ),
        ];
        if self.x_shift != 0.0 {
            lines.push(format!(
                "Note: with (x - p) the vertex x-coordinate is +p, here {}",
                format_number(self.x_shift)
            ));
        }
        lines.join("\n")
    }
}

/// The parabola, the reference `y = ax²`, the vertex and the axes.
pub fn quadratic_scene(form: &QuadraticForm, settings: &PlotSettings) -> Scene {
    let window = PlotWindow::centered(0.0, 0.0, VIEW_HALF_WIDTH);
    let mut scene = Scene::new(window).with_axes();
    let xs = linspace(window.x_min, window.x_max, settings.samples);

    let reference = xs.iter().map(|&x| (x, form.a() * x * x)).collect();
    scene.push_curve("reference", LineKind::Reference, reference);

    let curve = xs.iter().map(|&x| (x, form.evaluate(x))).collect();
    scene.push_curve("parabola", LineKind::Curve, curve);

    let vertex = form.vertex();
    if window.contains(vertex) {
        scene.markers.push(vertex);
    }
    scene
}

/// The fixed concept-check question from the explorer page.
#[derive(Debug, Clone, Serialize)]
pub struct VertexQuiz {
    pub question: String,
    pub form: QuadraticForm,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizOutcome {
    pub correct: bool,
    pub expected: (f64, f64),
    pub given: (f64, f64),
}

impl VertexQuiz {
    pub fn standard() -> Result<Self> {
        Ok(Self {
            question: "What is the vertex of y = -3(x+2)^2 + 5?".to_string(),
            form: QuadraticForm::new(-3.0, -2.0, 5.0)?,
        })
    }

    pub fn expected_answer(&self) -> String {
        let (p, q) = self.form.vertex();
        format!("({}, {})", format_number(p), format_number(q))
    }

    /// Accepts `(-2, 5)`, `(-2,5)` or `-2, 5`.
    pub fn check(&self, answer: &str) -> Result<QuizOutcome> {
        let re = Regex::new(r"^\s*\(?\s*(-?\d+(?:\.\d+)?)\s*,\s*(-?\d+(?:\.\d+)?)\s*\)?\s*$")
            .map_err(|e| LabError::ValidationError {
                message: e.to_string(),
            })?;
        let caps = re.captures(answer).ok_or_else(|| LabError::ValidationError {
            message: format!("'{}' is not a coordinate pair like (-2, 5)", answer.trim()),
        })?;

        let parse = |i: usize| -> Result<f64> {
            caps[i].parse::<f64>().map_err(|e| LabError::ValidationError {
                message: e.to_string(),
            })
        };
        let given = (parse(1)?, parse(2)?);
        let expected = self.form.vertex();
        let correct = (given.0 - expected.0).abs() < 1e-9 && (given.1 - expected.1).abs() < 1e-9;

        Ok(QuizOutcome {
            correct,
            expected,
            given,
        })
    }
}
