pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "function-lab")]
#[command(about = "Explore rational and quadratic functions, and play with Lotto 6/45 numbers")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Directory for charts and exported samples (overrides [output].path)
    #[arg(long, global = true)]
    pub output_path: Option<String>,

    #[arg(long, global = true, help = "Print the result as JSON")]
    pub json: bool,

    #[arg(long, global = true, help = "Skip chart rendering")]
    pub no_plot: bool,

    #[arg(long, global = true, help = "Also write the sampled curve points as CSV")]
    pub export_csv: bool,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Analyze a rational function such as "(2*x+1)/(x-3)" or "1/(x-3) + 2"
    Rational {
        #[arg(allow_hyphen_values = true)]
        expression: String,
    },

    /// Plot y = a(x-p)^2 + q next to y = ax^2
    Quadratic {
        /// Width and direction, one of 1, -1, 0.5, -0.5, 2, -2
        #[arg(short, long, default_value_t = 2.0, allow_negative_numbers = true)]
        a: f64,

        /// Shift along x, -5 to 5 in steps of 0.5
        #[arg(short, long, default_value_t = 1.0, allow_negative_numbers = true)]
        p: f64,

        /// Shift along y, -5 to 5 in steps of 0.5
        #[arg(short, long, default_value_t = 2.0, allow_negative_numbers = true)]
        q: f64,
    },

    /// Answer the vertex quiz for y = -3(x+2)^2 + 5, e.g. "(-2, 5)"
    Quiz {
        #[arg(allow_hyphen_values = true)]
        answer: String,
    },

    /// Lotto 6/45 number generator and comparator
    #[command(subcommand)]
    Lotto(LottoCommand),
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum LottoCommand {
    /// Recommend sets of six numbers from 1 to 45
    Generate {
        #[arg(short, long, default_value_t = 5)]
        sets: usize,

        /// Seed for reproducible sets
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Compare six numbers with a draw's winning numbers
    Compare {
        /// Six numbers, comma separated
        #[arg(value_delimiter = ',', required = true, num_args = 1..)]
        numbers: Vec<u8>,

        /// Draw number; defaults to the latest draw
        #[arg(short, long)]
        round: Option<u32>,
    },
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rational_with_leading_minus() {
        let cli = CliConfig::try_parse_from(["function-lab", "rational", "-1/(x-2)"]).unwrap();
        match cli.command {
            Command::Rational { expression } => assert_eq!(expression, "-1/(x-2)"),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_quadratic_negative_values() {
        let cli = CliConfig::try_parse_from([
            "function-lab", "quadratic", "-a", "-0.5", "-p", "-2", "-q", "3", "--no-plot",
        ])
        .unwrap();
        assert!(cli.no_plot);
        match cli.command {
            Command::Quadratic { a, p, q } => assert_eq!((a, p, q), (-0.5, -2.0, 3.0)),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_lotto_compare() {
        let cli = CliConfig::try_parse_from([
            "function-lab", "--json", "lotto", "compare", "1,7,21,31,39,43", "--round", "1101",
        ])
        .unwrap();
        assert!(cli.json);
        match cli.command {
            Command::Lotto(LottoCommand::Compare { numbers, round }) => {
                assert_eq!(numbers, vec![1, 7, 21, 31, 39, 43]);
                assert_eq!(round, Some(1101));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
