use crate::config::cli::LocalStorage;
use crate::config::toml_config::TomlConfig;
use crate::config::{CliConfig, Command, LottoCommand};
use crate::core::engine::{PageEngine, PageOutcome};
use crate::core::lotto::HttpDrawSource;
use crate::core::pages::{
    LottoComparePage, LottoGeneratePage, QuadraticPage, QuizPage, RationalPage, RenderOptions,
};
use crate::core::quadratic::{form_from_sliders, VertexQuiz};
use crate::domain::model::Ticket;
use crate::utils::error::Result;
use crate::utils::validation::{validate_range, Validate};

/// Loads the TOML file named by `--config` (or defaults) and applies CLI overrides.
pub fn load_settings(cli: &CliConfig) -> Result<TomlConfig> {
    let mut settings = match &cli.config {
        Some(path) => {
            tracing::debug!("Loading configuration from: {}", path);
            TomlConfig::from_file(path)?
        }
        None => TomlConfig::default(),
    };

    if let Some(output_path) = &cli.output_path {
        settings.output.path = output_path.clone();
    }

    settings.validate()?;
    Ok(settings)
}

pub async fn run_command(cli: &CliConfig, settings: &TomlConfig) -> Result<PageOutcome> {
    let engine = PageEngine::new(LocalStorage::new(settings.output.path.clone()));
    let options = RenderOptions {
        plot: !cli.no_plot,
        export_csv: cli.export_csv,
    };

    match &cli.command {
        Command::Rational { expression } => {
            let page = RationalPage {
                expression: expression.clone(),
                tolerance: settings.analysis.degenerate_tolerance,
                plot: settings.plot.clone(),
                options,
            };
            engine.run(&page).await
        }
        Command::Quadratic { a, p, q } => {
            let page = QuadraticPage {
                form: form_from_sliders(*a, *p, *q)?,
                plot: settings.plot.clone(),
                options,
            };
            engine.run(&page).await
        }
        Command::Quiz { answer } => {
            let page = QuizPage {
                quiz: VertexQuiz::standard()?,
                answer: answer.clone(),
            };
            engine.run(&page).await
        }
        Command::Lotto(LottoCommand::Generate { sets, seed }) => {
            validate_range("sets", *sets, 1, settings.lotto.max_sets)?;
            let page = LottoGeneratePage {
                sets: *sets,
                seed: *seed,
            };
            engine.run(&page).await
        }
        Command::Lotto(LottoCommand::Compare { numbers, round }) => {
            let page = LottoComparePage {
                source: HttpDrawSource::new(&settings.lotto)?,
                ticket: Ticket::new(numbers)?,
                round: *round,
            };
            engine.run(&page).await
        }
    }
}
