use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use c4flow::cli::CommandContext;
use c4flow::cli::commands::{self, monitor::MonitorOptions};
use c4flow::constants::{exit_code, monitor};

#[derive(Parser)]
#[command(name = "c4flow")]
#[command(
    version,
    about = "Evaluate Python codebases, draft C4 diagrams and publish them to Structurizr"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (replaces the global and project files)
    #[arg(long, short, global = true, env = "C4FLOW_CONFIG")]
    config: Option<PathBuf>,

    #[arg(long, global = true)]
    verbose: bool,

    #[arg(long, short, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a specific DSL file
    Upload {
        #[arg(help = "Path to DSL file")]
        file: PathBuf,
        #[arg(long, help = "Do not open the workspace in a browser")]
        no_browser: bool,
    },

    /// Wait for a new *_c4.dsl file and upload it
    Monitor {
        #[arg(default_value = ".", help = "Directory to monitor")]
        directory: PathBuf,
        #[arg(long, default_value_t = monitor::DEFAULT_INTERVAL_SECS, help = "Check interval in seconds")]
        interval: u64,
        #[arg(long, default_value_t = monitor::DEFAULT_TIMEOUT_SECS, help = "Maximum wait in seconds")]
        timeout: u64,
        #[arg(long, help = "Do not open the workspace in a browser")]
        no_browser: bool,
    },

    /// Run the complete flow: evaluate, draft, publish
    Complete {
        #[arg(help = "Path to codebase")]
        codebase: PathBuf,
        #[arg(long, help = "Project name (defaults to the directory name)")]
        name: Option<String>,
        #[arg(long, help = "Do not open the workspace in a browser")]
        no_browser: bool,
    },

    /// Upload a DSL file that is about to be generated
    Process {
        #[arg(long = "file", alias = "dsl-file", help = "Expected DSL file path")]
        file: PathBuf,
        #[arg(long, help = "Do not open the workspace in a browser")]
        no_browser: bool,
    },

    /// Evaluate a codebase without drafting (exit 0 if a diagram can be drafted)
    Evaluate {
        #[arg(help = "Path to codebase")]
        codebase: PathBuf,
        #[arg(
            short = 'f',
            long,
            default_value = "text",
            help = "Output format: text, json"
        )]
        format: String,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration (merged from all sources)
    Show {
        #[arg(
            short = 'f',
            long,
            default_value = "text",
            help = "Output format: text, json, yaml"
        )]
        format: String,
    },
    /// Show configuration file paths
    Path,
    /// Write a starter config file
    Init {
        #[arg(long, short, help = "Initialize global config")]
        global: bool,
        #[arg(long, help = "Overwrite existing config")]
        force: bool,
    },
}

/// Set up panic handler for graceful error reporting
fn setup_panic_handler() {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("\n\x1b[1;31m━━━ PANIC ━━━\x1b[0m");
        eprintln!("\x1b[31mc4flow encountered an unexpected error:\x1b[0m");
        eprintln!("  {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "\x1b[90mLocation: {}:{}:{}\x1b[0m",
                location.file(),
                location.line(),
                location.column()
            );
        }
        eprintln!();

        // backtrace when RUST_BACKTRACE=1
        default_hook(panic_info);
    }));
}

fn main() -> ExitCode {
    setup_panic_handler();

    match run_cli() {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {}", e);
            ExitCode::from(exit_code::ERROR)
        }
    }
}

fn run_cli() -> anyhow::Result<u8> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // init must work even when the existing config is broken
    let ctx = match &cli.command {
        Commands::Config {
            action: ConfigAction::Init { .. },
        } => CommandContext::with_defaults(cli.quiet),
        _ => CommandContext::load(cli.config.as_deref(), cli.quiet)?,
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        tokio::select! {
            result = dispatch(&ctx, cli.command) => {
                let succeeded = result?;
                Ok::<u8, anyhow::Error>(if succeeded { exit_code::SUCCESS } else { exit_code::FAILURE })
            }
            _ = tokio::signal::ctrl_c() => {
                eprintln!("\nInterrupted");
                Ok(exit_code::INTERRUPTED)
            }
        }
    })
}

async fn dispatch(ctx: &CommandContext, command: Commands) -> c4flow::Result<bool> {
    match command {
        Commands::Upload { file, no_browser } => {
            commands::upload::run(ctx, &file, no_browser).await
        }
        Commands::Monitor {
            directory,
            interval,
            timeout,
            no_browser,
        } => {
            let options = MonitorOptions {
                interval: Duration::from_secs(interval.max(1)),
                timeout: Duration::from_secs(timeout),
                no_browser,
            };
            commands::monitor::run(ctx, &directory, options).await
        }
        Commands::Complete {
            codebase,
            name,
            no_browser,
        } => commands::complete::run(ctx, &codebase, name.as_deref(), no_browser).await,
        Commands::Process { file, no_browser } => {
            commands::process::run(ctx, &file, no_browser).await
        }
        Commands::Evaluate { codebase, format } => {
            commands::evaluate::run(ctx, &codebase, &format).await
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { format } => commands::config::show(ctx, &format),
            ConfigAction::Path => commands::config::path(ctx),
            ConfigAction::Init { global, force } => commands::config::init(ctx, global, force),
        },
    }
}
