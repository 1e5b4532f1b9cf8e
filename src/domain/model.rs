use crate::utils::error::{LabError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// `slope·x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearPolynomial {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearPolynomial {
    pub fn new(slope: f64, intercept: f64) -> Self {
        Self { slope, intercept }
    }

    pub fn evaluate(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

impl fmt::Display for LinearPolynomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.slope == 0.0 {
            return write!(f, "{}", format_number(self.intercept));
        }
        let slope = match self.slope {
            s if s == 1.0 => String::new(),
            s if s == -1.0 => "-".to_string(),
            s => format_number(s),
        };
        if self.intercept == 0.0 {
            write!(f, "{}x", slope)
        } else if self.intercept < 0.0 {
            write!(f, "{}x - {}", slope, format_number(-self.intercept))
        } else {
            write!(f, "{}x + {}", slope, format_number(self.intercept))
        }
    }
}

/// `(a·x + b) / (c·x + d)` with `c ≠ 0`.
///
/// The only way to build one is [`RationalFunctionInput::new`], so every value
/// in circulation has a vertical asymptote.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RationalFunctionInput {
    numerator: LinearPolynomial,
    denominator: LinearPolynomial,
}

impl RationalFunctionInput {
    pub fn new(numerator: LinearPolynomial, denominator: LinearPolynomial) -> Result<Self> {
        if denominator.slope == 0.0 || !denominator.slope.is_finite() {
            return Err(LabError::NotARationalFunction {
                reason: format!(
                    "the denominator is the constant {}",
                    format_number(denominator.intercept)
                ),
            });
        }
        Ok(Self {
            numerator,
            denominator,
        })
    }

    pub fn from_coefficients(a: f64, b: f64, c: f64, d: f64) -> Result<Self> {
        Self::new(LinearPolynomial::new(a, b), LinearPolynomial::new(c, d))
    }

    /// `(a, b, c, d)`
    pub fn coefficients(&self) -> (f64, f64, f64, f64) {
        (
            self.numerator.slope,
            self.numerator.intercept,
            self.denominator.slope,
            self.denominator.intercept,
        )
    }

    /// `None` where the denominator vanishes.
    pub fn evaluate(&self, x: f64) -> Option<f64> {
        let den = self.denominator.evaluate(x);
        if den == 0.0 {
            None
        } else {
            Some(self.numerator.evaluate(x) / den)
        }
    }
}

impl fmt::Display for RationalFunctionInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}) / ({})", self.numerator, self.denominator)
    }
}

/// `y = k/(x - p) + q`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StandardForm {
    pub p: f64,
    pub q: f64,
    pub k: f64,
}

impl StandardForm {
    pub fn evaluate(&self, x: f64) -> f64 {
        self.k / (x - self.p) + self.q
    }

    pub fn is_degenerate(&self, tolerance: f64) -> bool {
        self.k.abs() < tolerance
    }
}

impl fmt::Display for StandardForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shift = if self.p == 0.0 {
            "x".to_string()
        } else if self.p < 0.0 {
            format!("x + {}", format_number(-self.p))
        } else {
            format!("x - {}", format_number(self.p))
        };
        write!(f, "y = {}/({})", format_number(self.k), shift)?;
        if self.q < 0.0 {
            write!(f, " - {}", format_number(-self.q))
        } else if self.q > 0.0 {
            write!(f, " + {}", format_number(self.q))
        } else {
            Ok(())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    Hyperbola,
    /// `k ≈ 0`: the graph is the line `y = q` with a hole at `x = p`.
    Line,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DomainRangeReport {
    pub domain_excluded: f64,
    pub range_excluded: f64,
    pub shape: Shape,
}

impl DomainRangeReport {
    pub const CODOMAIN: &'static str = "R";

    pub fn domain(&self) -> String {
        format!("{{x | x ≠ {}, x ∈ R}}", format_number(self.domain_excluded))
    }

    pub fn range(&self) -> String {
        match self.shape {
            Shape::Hyperbola => {
                format!("{{y | y ≠ {}, y ∈ R}}", format_number(self.range_excluded))
            }
            Shape::Line => format!("{{{}}}", format_number(self.range_excluded)),
        }
    }

    pub fn codomain(&self) -> &'static str {
        Self::CODOMAIN
    }

    pub fn asymptotes(&self) -> String {
        format!(
            "x = {}, y = {}",
            format_number(self.domain_excluded),
            format_number(self.range_excluded)
        )
    }
}

/// `y = a(x - p)² + q`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QuadraticForm {
    a: f64,
    p: f64,
    q: f64,
}

impl QuadraticForm {
    pub fn new(a: f64, p: f64, q: f64) -> Result<Self> {
        if a == 0.0 || !a.is_finite() {
            return Err(LabError::ValidationError {
                message: "a must be a non-zero number, otherwise the graph is not a parabola"
                    .to_string(),
            });
        }
        if !p.is_finite() || !q.is_finite() {
            return Err(LabError::ValidationError {
                message: "p and q must be finite numbers".to_string(),
            });
        }
        Ok(Self { a, p, q })
    }

    pub fn a(&self) -> f64 {
        self.a
    }

    pub fn p(&self) -> f64 {
        self.p
    }

    pub fn q(&self) -> f64 {
        self.q
    }

    pub fn evaluate(&self, x: f64) -> f64 {
        self.a * (x - self.p).powi(2) + self.q
    }

    pub fn vertex(&self) -> (f64, f64) {
        (self.p, self.q)
    }

    pub fn opens_upward(&self) -> bool {
        self.a > 0.0
    }
}

impl fmt::Display for QuadraticForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shift = if self.p == 0.0 {
            "x".to_string()
        } else if self.p < 0.0 {
            format!("(x + {})", format_number(-self.p))
        } else {
            format!("(x - {})", format_number(self.p))
        };
        write!(f, "y = {}{}^2", format_number(self.a), shift)?;
        if self.q < 0.0 {
            write!(f, " - {}", format_number(-self.q))
        } else if self.q > 0.0 {
            write!(f, " + {}", format_number(self.q))
        } else {
            Ok(())
        }
    }
}

pub const LOTTO_MIN: u8 = 1;
pub const LOTTO_MAX: u8 = 45;
pub const LOTTO_PICK: usize = 6;

/// Six distinct numbers in `1..=45`, kept sorted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ticket {
    numbers: [u8; LOTTO_PICK],
}

impl Ticket {
    pub fn new(numbers: &[u8]) -> Result<Self> {
        if numbers.len() != LOTTO_PICK {
            return Err(LabError::ValidationError {
                message: format!(
                    "a ticket needs exactly {} numbers, got {}",
                    LOTTO_PICK,
                    numbers.len()
                ),
            });
        }
        if let Some(n) = numbers
            .iter()
            .find(|n| !(LOTTO_MIN..=LOTTO_MAX).contains(*n))
        {
            return Err(LabError::ValidationError {
                message: format!("{} is outside {}..={}", n, LOTTO_MIN, LOTTO_MAX),
            });
        }

        let mut sorted = [0u8; LOTTO_PICK];
        sorted.copy_from_slice(numbers);
        sorted.sort_unstable();
        if sorted.windows(2).any(|w| w[0] == w[1]) {
            return Err(LabError::ValidationError {
                message: "ticket numbers must be distinct".to_string(),
            });
        }
        Ok(Self { numbers: sorted })
    }

    pub fn numbers(&self) -> &[u8] {
        &self.numbers
    }

    pub fn contains(&self, n: u8) -> bool {
        self.numbers.binary_search(&n).is_ok()
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.numbers.iter().map(|n| format!("{:2}", n)).collect();
        write!(f, "[{}]", parts.join(", "))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawResult {
    pub round: u32,
    pub date: Option<NaiveDate>,
    pub winning: Ticket,
    pub bonus: u8,
}

impl DrawResult {
    pub fn new(round: u32, date: Option<NaiveDate>, winning: Ticket, bonus: u8) -> Result<Self> {
        if !(LOTTO_MIN..=LOTTO_MAX).contains(&bonus) || winning.contains(bonus) {
            return Err(LabError::DrawParseError {
                message: format!("bonus number {} is invalid for round {}", bonus, round),
            });
        }
        Ok(Self {
            round,
            date,
            winning,
            bonus,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PrizeRank {
    First,
    Second,
    Third,
    Fourth,
    Fifth,
}

impl fmt::Display for PrizeRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PrizeRank::First => "1st prize",
            PrizeRank::Second => "2nd prize",
            PrizeRank::Third => "3rd prize",
            PrizeRank::Fourth => "4th prize",
            PrizeRank::Fifth => "5th prize",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchReport {
    pub ticket: Ticket,
    pub matched: Vec<u8>,
    pub bonus_matched: bool,
    pub rank: Option<PrizeRank>,
}

impl MatchReport {
    pub fn match_count(&self) -> usize {
        self.matched.len()
    }
}

/// What a page hands back to the UI: text facts plus an optional chart.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Rendered {
    pub title: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart_svg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub samples_csv: Option<String>,
    pub warnings: Vec<String>,
    pub details: serde_json::Value,
}

/// Compact decimal: `3`, `2.5`, `-0.333333`. Never prints `-0`.
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let rounded = (value * 1e6).round() / 1e6;
    if rounded == 0.0 {
        return "0".to_string();
    }
    let text = format!("{:.6}", rounded);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    text.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(-1.0 / 3.0), "-0.333333");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(0.1 + 0.2), "0.3");
        assert_eq!(format_number(-20.0), "-20");
    }

    #[test]
    fn test_rational_input_rejects_constant_denominator() {
        let err = RationalFunctionInput::from_coefficients(1.0, 1.0, 0.0, 4.0).unwrap_err();
        assert!(matches!(err, LabError::NotARationalFunction { .. }));
    }

    #[test]
    fn test_rational_input_evaluate() {
        let f = RationalFunctionInput::from_coefficients(2.0, 1.0, 1.0, -3.0).unwrap();
        assert_eq!(f.evaluate(3.0), None);
        assert_eq!(f.evaluate(4.0), Some(9.0));
        assert_eq!(f.to_string(), "(2x + 1) / (x - 3)");
    }

    #[test]
    fn test_standard_form_display() {
        let form = StandardForm {
            p: 3.0,
            q: 2.0,
            k: 7.0,
        };
        assert_eq!(form.to_string(), "y = 7/(x - 3) + 2");

        let form = StandardForm {
            p: -2.0,
            q: -1.5,
            k: -1.0,
        };
        assert_eq!(form.to_string(), "y = -1/(x + 2) - 1.5");
    }

    #[test]
    fn test_domain_range_strings() {
        let report = DomainRangeReport {
            domain_excluded: 3.0,
            range_excluded: 2.0,
            shape: Shape::Hyperbola,
        };
        assert_eq!(report.domain(), "{x | x ≠ 3, x ∈ R}");
        assert_eq!(report.range(), "{y | y ≠ 2, y ∈ R}");
        assert_eq!(report.codomain(), "R");
        assert_eq!(report.asymptotes(), "x = 3, y = 2");
    }

    #[test]
    fn test_quadratic_form() {
        assert!(QuadraticForm::new(0.0, 1.0, 1.0).is_err());

        let f = QuadraticForm::new(-3.0, -2.0, 5.0).unwrap();
        assert_eq!(f.vertex(), (-2.0, 5.0));
        assert_eq!(f.evaluate(-2.0), 5.0);
        assert_eq!(f.evaluate(-1.0), 2.0);
        assert!(!f.opens_upward());
        assert_eq!(f.to_string(), "y = -3(x + 2)^2 + 5");
    }

    #[test]
    fn test_ticket_validation() {
        let ticket = Ticket::new(&[45, 3, 12, 7, 1, 30]).unwrap();
        assert_eq!(ticket.numbers(), &[1, 3, 7, 12, 30, 45]);
        assert!(ticket.contains(12));
        assert!(!ticket.contains(13));

        assert!(Ticket::new(&[1, 2, 3, 4, 5]).is_err());
        assert!(Ticket::new(&[1, 2, 3, 4, 5, 46]).is_err());
        assert!(Ticket::new(&[0, 2, 3, 4, 5, 6]).is_err());
        assert!(Ticket::new(&[1, 1, 3, 4, 5, 6]).is_err());
    }

    #[test]
    fn test_draw_result_rejects_bonus_among_winning() {
        let winning = Ticket::new(&[1, 2, 3, 4, 5, 6]).unwrap();
        assert!(DrawResult::new(1, None, winning.clone(), 6).is_err());
        assert!(DrawResult::new(1, None, winning, 7).is_ok());
    }
}
