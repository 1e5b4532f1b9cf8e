use crate::core::analysis::{analyze, RationalAnalysis};
use crate::core::lotto::{compare, generate_tickets};
use crate::core::plot::{rational_scene, render_svg, samples_csv, PlotSettings, Scene};
use crate::core::quadratic::{describe, quadratic_scene, QuadraticFacts, QuizOutcome, VertexQuiz};
use crate::domain::model::{
    format_number, DrawResult, MatchReport, QuadraticForm, Rendered, Shape, Ticket,
};
use crate::domain::ports::{DrawSource, Page};
use crate::utils::error::Result;
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub plot: bool,
    pub export_csv: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            plot: true,
            export_csv: false,
        }
    }
}

fn render_scene(
    scene: &Scene,
    settings: &PlotSettings,
    options: RenderOptions,
) -> Result<(Option<String>, Option<String>)> {
    let svg = if options.plot {
        Some(render_svg(scene, settings)?)
    } else {
        None
    };
    let csv = if options.export_csv {
        Some(samples_csv(scene)?)
    } else {
        None
    };
    Ok((svg, csv))
}

pub struct RationalPage {
    pub expression: String,
    pub tolerance: f64,
    pub plot: PlotSettings,
    pub options: RenderOptions,
}

#[async_trait]
impl Page for RationalPage {
    type Output = RationalAnalysis;

    fn name(&self) -> &str {
        "rational"
    }

    async fn compute(&self) -> Result<RationalAnalysis> {
        analyze(&self.expression, self.tolerance)
    }

    fn render(&self, analysis: &RationalAnalysis) -> Result<Rendered> {
        let form = analysis.standard_form;
        let report = &analysis.report;

        let standard = match analysis.shape() {
            Shape::Hyperbola => form.to_string(),
            Shape::Line => format!("y = {} (k ≈ 0, constant line)", format_number(form.q)),
        };
        let text = [
            format!("Function: f(x) = {}", analysis.input),
            format!("Standard form: {}", standard),
            format!(
                "p = {}, q = {}, k = {}",
                format_number(form.p),
                format_number(form.q),
                format_number(form.k)
            ),
            format!("Domain: {}", report.domain()),
            format!("Range: {}", report.range()),
            format!("Codomain: {}", report.codomain()),
            format!("Asymptotes: {}", report.asymptotes()),
        ]
        .join("\n");

        let scene = rational_scene(&form, &self.plot);
        let (chart_svg, samples_csv) = render_scene(&scene, &self.plot, self.options)?;

        let mut warnings = analysis.warnings.clone();
        if scene.curves().next().is_none() {
            // |p| or |q| so large that x ± half_window rounds back onto p
            warnings.push(format!(
                "no part of the curve fits the chart window around ({}, {})",
                format_number(form.p),
                format_number(form.q)
            ));
        }

        Ok(Rendered {
            title: "Rational function: domain, codomain, range and asymptotes".to_string(),
            text,
            chart_svg,
            samples_csv,
            warnings,
            details: serde_json::to_value(analysis)?,
        })
    }
}

pub struct QuadraticPage {
    pub form: QuadraticForm,
    pub plot: PlotSettings,
    pub options: RenderOptions,
}

#[async_trait]
impl Page for QuadraticPage {
    type Output = QuadraticFacts;

    fn name(&self) -> &str {
        "quadratic"
    }

    async fn compute(&self) -> Result<QuadraticFacts> {
        Ok(describe(&self.form))
    }

    fn render(&self, facts: &QuadraticFacts) -> Result<Rendered> {
        let scene = quadratic_scene(&self.form, &self.plot);
        let (chart_svg, samples_csv) = render_scene(&scene, &self.plot, self.options)?;

        Ok(Rendered {
            title: "Quadratic function in vertex form y = a(x-p)^2 + q".to_string(),
            text: facts.summary(),
            chart_svg,
            samples_csv,
            warnings: Vec::new(),
            details: serde_json::to_value(facts)?,
        })
    }
}

pub struct QuizPage {
    pub quiz: VertexQuiz,
    pub answer: String,
}

#[async_trait]
impl Page for QuizPage {
    type Output = QuizOutcome;

    fn name(&self) -> &str {
        "quiz"
    }

    async fn compute(&self) -> Result<QuizOutcome> {
        self.quiz.check(&self.answer)
    }

    fn render(&self, outcome: &QuizOutcome) -> Result<Rendered> {
        let verdict = if outcome.correct {
            "Correct!".to_string()
        } else {
            format!("Not quite. The vertex is {}", self.quiz.expected_answer())
        };
        Ok(Rendered {
            title: "Vertex quiz".to_string(),
            text: format!("{}\nYour answer: {}\n{}", self.quiz.question, self.answer.trim(), verdict),
            details: serde_json::to_value(outcome)?,
            ..Rendered::default()
        })
    }
}

pub struct LottoGeneratePage {
    pub sets: usize,
    pub seed: Option<u64>,
}

#[async_trait]
impl Page for LottoGeneratePage {
    type Output = Vec<Ticket>;

    fn name(&self) -> &str {
        "lotto_generate"
    }

    async fn compute(&self) -> Result<Vec<Ticket>> {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        generate_tickets(&mut rng, self.sets)
    }

    fn render(&self, tickets: &Vec<Ticket>) -> Result<Rendered> {
        let text = tickets
            .iter()
            .enumerate()
            .map(|(i, t)| format!("Set {:>2}: {}", i + 1, t))
            .collect::<Vec<_>>()
            .join("\n");
        Ok(Rendered {
            title: "Lotto 6/45 number generator".to_string(),
            text,
            details: serde_json::to_value(tickets)?,
            ..Rendered::default()
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Comparison {
    pub draw: DrawResult,
    pub report: MatchReport,
}

pub struct LottoComparePage<D: DrawSource> {
    pub source: D,
    pub ticket: Ticket,
    pub round: Option<u32>,
}

#[async_trait]
impl<D: DrawSource> Page for LottoComparePage<D> {
    type Output = Comparison;

    fn name(&self) -> &str {
        "lotto_compare"
    }

    async fn compute(&self) -> Result<Comparison> {
        let draw = self.source.fetch(self.round).await?;
        let report = compare(&self.ticket, &draw);
        Ok(Comparison { draw, report })
    }

    fn render(&self, comparison: &Comparison) -> Result<Rendered> {
        let draw = &comparison.draw;
        let report = &comparison.report;

        let date = draw
            .date
            .map(|d| format!(" ({})", d.format("%Y-%m-%d")))
            .unwrap_or_default();
        let matched = if report.matched.is_empty() {
            "none".to_string()
        } else {
            report
                .matched
                .iter()
                .map(|n| n.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        };
        let result = match report.rank {
            Some(rank) => format!("Result: {}", rank),
            None => "Result: no prize".to_string(),
        };

        let text = [
            format!("Round {}{}: {} + bonus {}", draw.round, date, draw.winning, draw.bonus),
            format!("Your numbers: {}", report.ticket),
            format!("Matched {}: {}", report.match_count(), matched),
            format!("Bonus matched: {}", if report.bonus_matched { "yes" } else { "no" }),
            result,
        ]
        .join("\n");

        Ok(Rendered {
            title: "Lotto 6/45 comparison".to_string(),
            text,
            details: serde_json::to_value(comparison)?,
            ..Rendered::default()
        })
    }
}
