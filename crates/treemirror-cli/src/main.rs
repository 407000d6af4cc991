//! treemirror - periodic one-way directory mirroring
//!
//! Keeps a replica directory identical to a source directory, re-checking both
//! trees on a fixed interval until interrupted.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use treemirror_config::{Config, ConfigBuilder};
use treemirror_sync::{FileLog, Runner, SyncCycle};
use treemirror_types::OperationLog;

/// treemirror - periodic one-way directory mirroring
#[derive(Parser, Debug)]
#[command(
    name = "treemirror",
    version = env!("CARGO_PKG_VERSION"),
    about = "Periodic one-way directory mirroring",
    long_about = "treemirror keeps a replica directory identical to a source directory.\n\
                  Every interval it creates missing directories, copies new or changed files\n\
                  (compared by SHA-256), and removes replica entries absent from the source.\n\
                  Every change is appended to the log file and echoed to standard output."
)]
struct Cli {
    /// Source directory to mirror from
    source_path: PathBuf,

    /// Replica directory to mirror into (created if missing)
    replica_path: PathBuf,

    /// Seconds between the starts of two synchronization cycles
    #[arg(value_parser = clap::value_parser!(u64).range(1..))]
    interval_seconds: u64,

    /// File the operation log is appended to
    log_file_path: PathBuf,

    /// Configuration file (YAML, TOML or JSON) for the `logging` section.
    /// Paths and interval always come from the positional arguments.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Run a single cycle and exit
    #[arg(long)]
    once: bool,

    /// Do not echo operation log lines to standard output
    #[arg(long)]
    no_echo: bool,

    /// Enable debug diagnostics
    #[arg(short, long)]
    debug: bool,

    /// Verbose mode - per-cycle diagnostics
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode - errors only
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    /// Diagnostic level requested on the command line, if any
    fn level_override(&self) -> Option<&'static str> {
        if self.debug {
            Some("debug")
        } else if self.verbose {
            Some("info")
        } else if self.quiet {
            Some("error")
        } else {
            None
        }
    }

    /// Layer defaults, `--config`, `TREEMIRROR__*` and the arguments.
    ///
    /// The positionals are mandatory and applied last, so only the `logging`
    /// keys of the file and environment layers can take effect here.
    fn load_config(&self) -> Result<Config> {
        let mut builder = ConfigBuilder::new().add_defaults();
        if let Some(path) = &self.config {
            builder = builder.add_source_file(path);
        }
        builder = builder
            .add_default_env()
            .with_paths(&self.source_path, &self.replica_path, &self.log_file_path)
            .with_interval(self.interval_seconds);
        if let Some(level) = self.level_override() {
            builder = builder.with_log_level(level);
        }
        if self.no_echo {
            let mut config = builder.build()?;
            config.logging.echo_stdout = false;
            return Ok(config);
        }
        Ok(builder.build()?)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(error) => {
            // --help and --version go to stdout and succeed; usage errors fail with 1
            let code = u8::from(error.use_stderr());
            let _ = error.print();
            return ExitCode::from(code);
        }
    };

    match run(cli).await {
        Ok(code) => code,
        Err(error) => {
            eprintln!("Error: {:#}", error);
            ExitCode::from(1)
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = cli.load_config()?;
    init_logging(&config.logging.level)?;

    let log = FileLog::open(&config.paths.log_file)?.with_echo(config.logging.echo_stdout);
    let log: Arc<dyn OperationLog> = Arc::new(log);

    let shutdown = CancellationToken::new();
    tokio::spawn(shutdown_signal(shutdown.clone()));

    let cycle = SyncCycle::new(&config.paths.source, &config.paths.replica, log);
    let mut runner = Runner::new(cycle, config.sync.interval.as_duration(), shutdown);
    if cli.once {
        runner = runner.with_max_cycles(1);
    }

    info!(
        source = %config.paths.source.display(),
        replica = %config.paths.replica.display(),
        interval_secs = config.sync.interval.get(),
        "treemirror v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    let outcome = runner.run().await;
    Ok(ExitCode::from(outcome.exit_code()))
}

fn init_logging(level: &str) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .with_context(|| format!("Invalid log level '{}'", level))?;

    // Diagnostics go to stderr; stdout carries the operation log echo.
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Waits for SIGINT or SIGTERM and cancels the token
async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT (Ctrl+C)");
        }
        () = terminate => {
            info!("Received SIGTERM");
        }
    }

    token.cancel();
}
