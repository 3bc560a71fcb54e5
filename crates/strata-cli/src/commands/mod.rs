use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use strata_config::{ArgvFlags, ConfigLoader, ConfigSource};
use tracing::debug;

mod check;
mod sources;

/// strata — schema-driven layered configuration
#[derive(Parser)]
#[command(name = "strata", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Log level override (e.g. debug, info, warn, error)
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,

    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress all log output (errors only)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Toml,
}

/// Inputs shared by every command that loads a configuration.
#[derive(Args, Debug)]
struct LoadArgs {
    /// Schema file (JSON, or TOML by extension)
    #[arg(short, long, env = "STRATA_SCHEMA")]
    schema: String,

    /// Configuration file to merge; repeat to layer, later files win
    #[arg(short, long = "config")]
    configs: Vec<String>,

    /// Flags read by schema `arg` fields, given after `--`
    #[arg(last = true)]
    flags: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the configuration and report whether it is valid
    Check {
        #[command(flatten)]
        load: LoadArgs,
    },
    /// Print the merged configuration
    Show {
        #[command(flatten)]
        load: LoadArgs,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
        /// Print the configuration even when it fails validation
        #[arg(long)]
        allow_invalid: bool,
    },
    /// List schema fields that read environment variables or flags
    Sources {
        /// Schema file (JSON, or TOML by extension)
        #[arg(short, long, env = "STRATA_SCHEMA")]
        schema: String,
    },
    /// Generate shell completions for bash, zsh, or fish
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl Cli {
    pub fn run(self) -> strata_core::Result<()> {
        // Resolve log level: --verbose > --quiet > --log-level > default
        let log_level = if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            self.log_level.as_deref().unwrap_or("warn")
        };

        // Logs go to stderr so `show` output stays pipeable.
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));
        // try_init: a subscriber may already be installed when embedded.
        let _ = match self.log_format {
            LogFormat::Json => tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .json()
                .with_target(true)
                .try_init(),
            LogFormat::Pretty => tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .try_init(),
        };

        match self.command {
            Commands::Check { load } => check::cmd_check(load),
            Commands::Show {
                load,
                format,
                allow_invalid,
            } => check::cmd_show(load, format, allow_invalid),
            Commands::Sources { schema } => sources::cmd_sources(&schema),
            Commands::Completions { shell } => Self::cmd_completions(shell),
        }
    }

    fn cmd_completions(shell: Shell) -> strata_core::Result<()> {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "strata", &mut std::io::stdout());
        Ok(())
    }
}

/// Build a loader from the CLI inputs and run one load over the given files.
///
/// Returns the loader alongside the load outcome so callers can still inspect
/// an invalid state.
fn load(args: LoadArgs) -> strata_core::Result<(ConfigLoader, strata_core::Result<()>)> {
    let mut loader = ConfigLoader::builder()
        .schema(args.schema.as_str())
        .args(ArgvFlags::parse(args.flags))
        .build()?;

    debug!(configs = args.configs.len(), "merging configuration files");
    let outcome = if args.configs.is_empty() {
        loader.load().map(|_| ())
    } else {
        loader.load_from(ConfigSource::from(args.configs)).map(|_| ())
    };

    match outcome {
        Err(e) if !e.is_validation() => Err(e),
        outcome => Ok((loader, outcome)),
    }
}
