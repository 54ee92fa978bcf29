use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser};
use std::path::PathBuf;
use std::process::ExitCode;

use tapcheck::config::{self, Config, DEFAULT_UPSTREAM_REPO};
use tapcheck::{ActionError, Orchestrator, RunReport, SystemRunner, colors};

#[derive(Parser, Debug)]
#[command(name = "tapcheck")]
#[command(author, version, about = "Homebrew formula audit, install, and test", long_about = None)]
struct Cli {
    /// Homebrew formula file to audit, install, and test
    #[arg(long, alias = "formula_file", env = "INPUT_FORMULA_FILE")]
    formula_file: PathBuf,

    /// Run audit, install, and test after staging the formula
    #[arg(
        long,
        env = "INPUT_VALIDATE",
        default_value_t = true,
        value_parser = BoolishValueParser::new(),
        action = ArgAction::Set
    )]
    validate: bool,

    /// Prepare a branch in the homebrew-core fork
    #[arg(
        long,
        env = "INPUT_CONTRIBUTE_TO_HOMEBREW_CORE",
        default_value_t = false,
        value_parser = BoolishValueParser::new(),
        action = ArgAction::Set
    )]
    contribute_to_upstream: bool,

    /// Upstream repository the fork tracks (owner/name)
    #[arg(long, env = "INPUT_UPSTREAM_HOMEBREW_CORE_REPO", default_value = DEFAULT_UPSTREAM_REPO)]
    upstream_repo: String,

    /// First temp root searched for brew's kept build directories
    #[arg(long, env = "HOMEBREW_TEMP")]
    temp_dir_override: Option<String>,

    /// Workspace holding the checked-out repositories
    #[arg(long, env = "GITHUB_WORKSPACE")]
    workspace: Option<String>,

    /// File the named outputs are appended to
    #[arg(long, env = "GITHUB_OUTPUT")]
    output_file: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn into_config(self) -> Config {
        let workspace = config::non_empty_path(self.workspace)
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."));

        Config {
            formula_file: self.formula_file,
            validate: self.validate,
            contribute_upstream: self.contribute_to_upstream,
            upstream_repo: self.upstream_repo,
            temp_dir_override: config::non_empty_path(self.temp_dir_override),
            workspace,
            output_file: config::non_empty_path(self.output_file),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    colors::init_colors();

    let config = cli.into_config();
    tracing::debug!(?config, "Resolved configuration");

    let mut orchestrator = Orchestrator::new(SystemRunner::new(), config);
    match orchestrator.run().await.and_then(RunReport::into_result) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            println!("{}", failure_message(&e));
            ExitCode::FAILURE
        }
    }
}

/// Annotation printed for a failed run. Input errors name the offending input.
fn failure_message(err: &ActionError) -> String {
    if err.is_input_error() {
        format!("::error title=Invalid formula_file input:: {}", err)
    } else {
        format!("::error:: {}", err)
    }
}
