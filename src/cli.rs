//! CLI argument parsing and stage dispatch

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use baseline_builder::config::{self, Credentials, GitIdentity, Settings};
use baseline_builder::error::Error;
use baseline_builder::output::{OutputConfig, Printer};
use baseline_builder::repository::{DockerCli, SystemGit};
use baseline_builder::spec::{self, DEFAULT_SPEC_FILE};
use baseline_builder::stages::{orchestrator, status, Selection, Stage, StageContext};
use baseline_builder::workspace::{Workspace, DEFAULT_OUTPUT_DIR};

/// Baseline Builder - Tag a consistent snapshot of component repositories
///
/// Without arguments all five stages run for every component. With a stage
/// and a component (or `all`) only that stage runs.
#[derive(Parser, Debug)]
#[command(name = "baseline-builder")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Stage to run on its own
    #[arg(value_enum, requires = "component")]
    stage: Option<StageArg>,

    /// Repository name of the component, or `all`
    #[arg(requires = "stage")]
    component: Option<String>,

    /// Path to the baseline spec file
    #[arg(long, value_name = "PATH", env = "BASELINE_SPEC", default_value = DEFAULT_SPEC_FILE)]
    spec: PathBuf,

    /// Directory receiving the working copies
    #[arg(long, value_name = "PATH", env = "BASELINE_OUTPUT_DIR", default_value = DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,

    /// Base URL the GitHub repository paths are resolved against
    #[arg(long, value_name = "URL", env = "BASELINE_GITHUB_URL", default_value = config::DEFAULT_GITHUB_URL)]
    github_url: String,

    /// Docker registry to log into (Docker Hub when unset)
    #[arg(long, value_name = "SERVER", env = "DOCKER_REGISTRY")]
    registry: Option<String>,

    /// Author name for merge commits and tags
    #[arg(long, value_name = "NAME", env = "BASELINE_GIT_USER_NAME", requires = "git_user_email")]
    git_user_name: Option<String>,

    /// Author email for merge commits and tags
    #[arg(long, value_name = "EMAIL", env = "BASELINE_GIT_USER_EMAIL", requires = "git_user_name")]
    git_user_email: Option<String>,

    /// Colorize output (always, never, auto)
    #[arg(long, value_name = "WHEN", default_value = "auto",
          value_parser = ["auto", "always", "never"])]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, value_name = "LEVEL", default_value = "info",
          value_parser = ["error", "warn", "info", "debug", "trace"])]
    log_level: String,
}

/// Stage names accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StageArg {
    Checkout,
    Merge,
    Tag,
    Push,
    Docker,
    /// Print the recorded state; needs no credentials
    Status,
}

impl StageArg {
    fn stage(self) -> Option<Stage> {
        match self {
            StageArg::Checkout => Some(Stage::Checkout),
            StageArg::Merge => Some(Stage::Merge),
            StageArg::Tag => Some(Stage::Tag),
            StageArg::Push => Some(Stage::Push),
            StageArg::Docker => Some(Stage::Docker),
            StageArg::Status => None,
        }
    }
}

impl Cli {
    /// Execute the requested stage, or the complete build
    pub fn execute(self) -> Result<()> {
        env_logger::Builder::from_env(
            env_logger::Env::default().default_filter_or(self.log_level.as_str()),
        )
        .init();

        let printer = Printer::stdout(OutputConfig::from_env_and_flag(&self.color));
        println!("Starting baseline builder...");

        let selection = self.component.as_deref().map(Selection::parse);
        let workspace = Workspace::new(&self.output_dir);

        if self.stage == Some(StageArg::Status) {
            let spec = self.read_spec()?;
            let selection = selection.unwrap_or(Selection::All);
            status::execute(&spec, &workspace, &selection, &printer)?;
            return Ok(());
        }

        let credentials = match Credentials::from_env() {
            Ok(credentials) => credentials,
            Err(Error::MissingEnvironment { names }) => {
                for name in names {
                    println!("{} variable is missing.", name);
                }
                std::process::exit(1);
            }
            Err(e) => return Err(e.into()),
        };

        let spec = self.read_spec()?;
        let settings = self.settings()?;
        let git = SystemGit::new(settings.git_identity.clone());
        let registry = DockerCli;

        let ctx = StageContext {
            spec: &spec,
            credentials: &credentials,
            settings: &settings,
            workspace: &workspace,
            git: &git,
            registry: &registry,
            printer: &printer,
        };

        match (self.stage.and_then(StageArg::stage), selection) {
            (Some(stage), Some(selection)) => {
                orchestrator::run(stage, &ctx, &selection)?;
            }
            _ => {
                orchestrator::run_all(&ctx)?;
                println!("Baseline {} was built.", spec.tag);
            }
        }
        Ok(())
    }

    fn read_spec(&self) -> Result<spec::BaselineSpec> {
        println!("Reading baseline spec file...");
        spec::from_file(&self.spec)
            .with_context(|| format!("Failed to load baseline spec from {}", self.spec.display()))
    }

    fn settings(&self) -> Result<Settings> {
        let github_url = config::parse_base_url(&self.github_url)
            .with_context(|| format!("Invalid GitHub URL '{}'", self.github_url))?;
        let git_identity = match (&self.git_user_name, &self.git_user_email) {
            (Some(name), Some(email)) => Some(GitIdentity {
                name: name.clone(),
                email: email.clone(),
            }),
            _ => None,
        };
        Ok(Settings {
            github_url,
            registry: self.registry.clone(),
            git_identity,
        })
    }
}
