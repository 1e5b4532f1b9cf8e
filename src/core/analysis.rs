use crate::core::parser::parse_rational;
use crate::domain::model::{
    format_number, DomainRangeReport, RationalFunctionInput, Shape, StandardForm,
};
use crate::utils::error::Result;
use serde::Serialize;

/// `|k|` below this collapses the graph to the line `y = q`.
pub const DEGENERATE_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RationalAnalysis {
    pub expression: String,
    pub input: RationalFunctionInput,
    pub standard_form: StandardForm,
    pub report: DomainRangeReport,
    pub warnings: Vec<String>,
}

impl RationalAnalysis {
    pub fn shape(&self) -> Shape {
        self.report.shape
    }

    pub fn is_degenerate(&self) -> bool {
        self.report.shape == Shape::Line
    }
}

/// `p = -d/c`, `q = a/c`, `k = (bc - ad)/c²`.
pub fn derive_standard_form(input: &RationalFunctionInput) -> StandardForm {
    let (a, b, c, d) = input.coefficients();
    StandardForm {
        p: -d / c,
        q: a / c,
        k: (b * c - a * d) / (c * c),
    }
}

pub fn report_domain_range(form: &StandardForm, tolerance: f64) -> DomainRangeReport {
    DomainRangeReport {
        domain_excluded: form.p,
        range_excluded: form.q,
        shape: if form.is_degenerate(tolerance) {
            Shape::Line
        } else {
            Shape::Hyperbola
        },
    }
}

/// Runs an already parsed function through derivation and reporting.
pub fn analyze_input(
    expression: &str,
    input: RationalFunctionInput,
    tolerance: f64,
) -> RationalAnalysis {
    let standard_form = derive_standard_form(&input);
    let report = report_domain_range(&standard_form, tolerance);

    let mut warnings = Vec::new();
    if report.shape == Shape::Line {
        tracing::warn!(
            "k = {:e} is within {:e} of zero; '{}' degenerates to a line",
            standard_form.k,
            tolerance,
            expression
        );
        warnings.push(format!(
            "k ≈ 0: the function degenerates to the constant line y = {} (undefined at x = {})",
            format_number(standard_form.q),
            format_number(standard_form.p)
        ));
    }

    RationalAnalysis {
        expression: expression.to_string(),
        input,
        standard_form,
        report,
        warnings,
    }
}

/// Text in, standard form and domain/range facts out.
pub fn analyze(expression: &str, tolerance: f64) -> Result<RationalAnalysis> {
    let input = parse_rational(expression)?;
    tracing::debug!("Parsed '{}' as {}", expression, input);
    Ok(analyze_input(expression, input, tolerance))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::LabError;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
    }

    #[test]
    fn test_concrete_scenario() {
        let analysis = analyze("(2*x+1)/(x-3)", DEGENERATE_TOLERANCE).unwrap();
        assert_eq!(analysis.input.coefficients(), (2.0, 1.0, 1.0, -3.0));
        assert_eq!(
            analysis.standard_form,
            StandardForm {
                p: 3.0,
                q: 2.0,
                k: 7.0
            }
        );
        assert_eq!(analysis.report.domain(), "{x | x ≠ 3, x ∈ R}");
        assert_eq!(analysis.report.range(), "{y | y ≠ 2, y ∈ R}");
        assert!(!analysis.is_degenerate());
        assert!(analysis.warnings.is_empty());
    }

    #[test]
    fn test_constant_numerator_is_not_degenerate() {
        let input = RationalFunctionInput::from_coefficients(0.0, 5.0, 1.0, 0.0).unwrap();
        let form = derive_standard_form(&input);
        assert!(close(form.p, 0.0));
        assert!(close(form.q, 0.0));
        assert!(close(form.k, 5.0));
        assert!(!form.is_degenerate(DEGENERATE_TOLERANCE));
    }

    #[test]
    fn test_proportional_ratio_degenerates_to_line() {
        let analysis = analyze("(2x+4)/(x+2)", DEGENERATE_TOLERANCE).unwrap();
        assert_eq!(analysis.input.coefficients(), (2.0, 4.0, 1.0, 2.0));
        assert!(close(analysis.standard_form.p, -2.0));
        assert!(close(analysis.standard_form.q, 2.0));
        assert!(close(analysis.standard_form.k, 0.0));
        assert_eq!(analysis.shape(), Shape::Line);
        assert_eq!(analysis.warnings.len(), 1);
        assert!(analysis.warnings[0].contains("y = 2"));
        assert_eq!(analysis.report.range(), "{2}");
    }

    #[test]
    fn test_constant_denominator_rejected() {
        let err = analyze("(x+1)/4", DEGENERATE_TOLERANCE).unwrap_err();
        assert!(matches!(err, LabError::NotARationalFunction { .. }));
    }

    #[test]
    fn test_standard_form_matches_original_function() {
        let input = RationalFunctionInput::from_coefficients(-3.5, 2.0, 4.0, 1.0).unwrap();
        let form = derive_standard_form(&input);
        for x in [-10.0, -1.0, 0.0, 0.5, 7.25] {
            let original = input.evaluate(x).unwrap();
            assert!(close(form.evaluate(x), original), "x = {}", x);
        }
    }

    #[test]
    fn test_random_integer_coefficients_round_trip() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for _ in 0..200 {
            let a = rng.random_range(-20..=20) as f64;
            let b = rng.random_range(-20..=20) as f64;
            let c = loop {
                let c = rng.random_range(-20..=20);
                if c != 0 {
                    break c as f64;
                }
            };
            let d = rng.random_range(-20..=20) as f64;

            let input = RationalFunctionInput::from_coefficients(a, b, c, d).unwrap();
            let form = derive_standard_form(&input);
            assert!(close(form.p, -d / c));
            assert!(close(form.q, a / c));
            assert!(close(form.k, (b * c - a * d) / (c * c)));

            for offset in [-7.5, -2.0, -0.25, 0.75, 3.0] {
                let x = form.p + offset;
                let original = input.evaluate(x).unwrap();
                assert!(
                    close(form.evaluate(x), original),
                    "({}, {}, {}, {}) at x = {}",
                    a,
                    b,
                    c,
                    d,
                    x
                );
            }
        }
    }

    #[test]
    fn test_tolerance_is_configurable() {
        let input = RationalFunctionInput::from_coefficients(1.0, 1e-6, 1.0, 0.0).unwrap();
        assert_eq!(
            analyze_input("x/x", input, DEGENERATE_TOLERANCE).shape(),
            Shape::Hyperbola
        );
        assert_eq!(analyze_input("x/x", input, 1e-3).shape(), Shape::Line);
    }
}
