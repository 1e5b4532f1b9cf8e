use crate::core::analysis::DEGENERATE_TOLERANCE;
use crate::core::lotto::LottoSettings;
use crate::core::plot::PlotSettings;
use crate::utils::error::{LabError, Result};
use crate::utils::validation::{
    validate_path, validate_positive_float, validate_positive_number, validate_range,
    validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Every section is optional; a missing file or section means defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub analysis: AnalysisConfig,
    pub plot: PlotSettings,
    pub lotto: LottoSettings,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub degenerate_tolerance: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            degenerate_tolerance: DEGENERATE_TOLERANCE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: "./output".to_string(),
        }
    }
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(LabError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| LabError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables are left as is.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| LabError::ConfigValidationError {
            field: "env_substitution".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_positive_float(
            "analysis.degenerate_tolerance",
            self.analysis.degenerate_tolerance,
        )?;

        validate_positive_float("plot.half_window", self.plot.half_window)?;
        validate_positive_float("plot.exclusion", self.plot.exclusion)?;
        if self.plot.exclusion >= self.plot.half_window {
            return Err(LabError::InvalidConfigValueError {
                field: "plot.exclusion".to_string(),
                value: self.plot.exclusion.to_string(),
                reason: "Must be smaller than plot.half_window".to_string(),
            });
        }
        validate_range("plot.samples", self.plot.samples, 2, 100_000)?;
        validate_range("plot.width", self.plot.width, 100, 8000)?;
        validate_range("plot.height", self.plot.height, 100, 8000)?;

        validate_url("lotto.endpoint", &self.lotto.endpoint)?;
        validate_positive_number("lotto.max_sets", self.lotto.max_sets, 1)?;
        validate_range("lotto.timeout_seconds", self.lotto.timeout_seconds, 1, 300)?;

        validate_path("output.path", &self.output.path)?;

        Ok(())
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
