#[cfg(feature = "cli")]
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::cli::LocalStorage;
pub use core::analysis::{analyze, RationalAnalysis};
pub use core::engine::{PageEngine, PageOutcome};
pub use core::parser::parse_rational;
pub use utils::error::{LabError, Result};
