use clap::Parser;
use function_lab::app::{load_settings, run_command};
use function_lab::utils::error::LabError;
use function_lab::utils::logger;
use function_lab::{CliConfig, PageOutcome};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // In JSON mode stdout carries only the result document
    if cli.json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting function-lab");
    tracing::debug!("CLI config: {:?}", cli);

    let settings = match load_settings(&cli) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            exit_with(&e);
        }
    };

    match run_command(&cli, &settings).await {
        Ok(outcome) => {
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                print_outcome(&outcome);
            }
        }
        Err(e) => {
            tracing::error!(
                "❌ {} failed: {} (Category: {:?}, Severity: {:?})",
                command_name(&cli),
                e,
                e.category(),
                e.severity()
            );
            exit_with(&e);
        }
    }

    Ok(())
}

fn command_name(cli: &CliConfig) -> &'static str {
    use function_lab::config::{Command, LottoCommand};
    match cli.command {
        Command::Rational { .. } => "rational",
        Command::Quadratic { .. } => "quadratic",
        Command::Quiz { .. } => "quiz",
        Command::Lotto(LottoCommand::Generate { .. }) => "lotto generate",
        Command::Lotto(LottoCommand::Compare { .. }) => "lotto compare",
    }
}

fn print_outcome(outcome: &PageOutcome) {
    let rendered = &outcome.rendered;
    println!("✅ {}", rendered.title);
    println!("{}", rendered.text);
    for warning in &rendered.warnings {
        println!("⚠️  {}", warning);
    }
    for path in &outcome.saved_files {
        println!("📁 Saved to: {}", path);
    }
}

fn exit_with(e: &LabError) -> ! {
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    let exit_code = e.severity().exit_code();
    std::process::exit(exit_code);
}
