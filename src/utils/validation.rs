use crate::utils::error::{LabError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Accepts http(s) URLs; a `{round}` placeholder is allowed anywhere in the path or query.
pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(LabError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    let probe = url_str.replace("{round}", "1");
    match Url::parse(&probe) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(LabError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(LabError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(LabError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(LabError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(LabError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_positive_float(field_name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(LabError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value must be a positive finite number".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(LabError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// Slider values move in fixed increments starting from `origin`.
pub fn validate_step(field_name: &str, value: f64, origin: f64, step: f64) -> Result<()> {
    let steps = (value - origin) / step;
    if (steps - steps.round()).abs() > 1e-9 {
        return Err(LabError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be a multiple of {}", step),
        });
    }
    Ok(())
}

pub fn validate_choice(field_name: &str, value: f64, choices: &[f64]) -> Result<()> {
    if choices.iter().any(|c| (c - value).abs() < 1e-12) {
        return Ok(());
    }
    let allowed: Vec<String> = choices.iter().map(|c| c.to_string()).collect();
    Err(LabError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: value.to_string(),
        reason: format!("Allowed values: {}", allowed.join(", ")),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("lotto.endpoint", "https://example.com").is_ok());
        assert!(validate_url("lotto.endpoint", "http://example.com/draw?no={round}").is_ok());
        assert!(validate_url("lotto.endpoint", "").is_err());
        assert!(validate_url("lotto.endpoint", "invalid-url").is_err());
        assert!(validate_url("lotto.endpoint", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("plot.samples", 5, 2).is_ok());
        assert!(validate_positive_number("plot.samples", 1, 2).is_err());
    }

    #[test]
    fn test_validate_step() {
        assert!(validate_step("p", 1.5, -5.0, 0.5).is_ok());
        assert!(validate_step("p", -5.0, -5.0, 0.5).is_ok());
        assert!(validate_step("p", 1.25, -5.0, 0.5).is_err());
    }

    #[test]
    fn test_validate_choice() {
        let choices = [1.0, -1.0, 0.5];
        assert!(validate_choice("a", -1.0, &choices).is_ok());
        assert!(validate_choice("a", 3.0, &choices).is_err());
    }

    #[test]
    fn test_validate_positive_float() {
        assert!(validate_positive_float("plot.half_window", 10.0).is_ok());
        assert!(validate_positive_float("plot.half_window", 0.0).is_err());
        assert!(validate_positive_float("plot.half_window", f64::NAN).is_err());
    }
}
