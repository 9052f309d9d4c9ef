use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::runtime::Runtime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use codelens::AnalysisMode;
use codelens::cli::{CommandContext, commands, load_config, session_provider};

#[derive(Parser)]
#[command(name = "codelens")]
#[command(version, about = "Explain, improve and find bugs in code with an LLM")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, short, global = true, help = "Use this config file instead of the layered chain")]
    config: Option<PathBuf>,

    #[arg(long, global = true)]
    verbose: bool,

    #[arg(long, short, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a file (or stdin)
    Analyze {
        #[arg(help = "File to analyze; reads stdin when omitted")]
        file: Option<PathBuf>,
        #[arg(
            short,
            long,
            default_value = "explain",
            help = "Analysis mode: explain, improve, bugs"
        )]
        mode: AnalysisMode,
        #[arg(long, short, help = "Write improved code to this path")]
        write: Option<PathBuf>,
        #[arg(
            short = 'f',
            long,
            default_value = "text",
            help = "Output format: text, json"
        )]
        format: String,
    },

    /// Show your analysis history
    History {
        #[arg(
            short = 'f',
            long,
            default_value = "text",
            help = "Output format: text, json"
        )]
        format: String,
        #[arg(long, help = "Show full code and response for each entry")]
        full: bool,
        #[arg(short = 'n', long, help = "Show at most N entries")]
        limit: Option<usize>,
    },

    /// Sign in with the configured profile
    Login,

    /// Sign out
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Run the HTTP callable server
    Serve {
        #[arg(long, short, help = "Listen address (overrides server.bind)")]
        bind: Option<String>,
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
            default_value = "toml",
            help = "Output format: toml, json"
        )]
        format: String,
    },
    /// Show configuration file paths
    Path,
    /// Initialize configuration
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
        eprintln!("\x1b[31mCodeLens encountered an unexpected error:\x1b[0m");
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

        // Default hook prints the backtrace when RUST_BACKTRACE=1
        default_hook(panic_info);
    }));
}

fn main() -> ExitCode {
    setup_panic_handler();

    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<()> {
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

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Analyze {
            file,
            mode,
            write,
            format,
        } => {
            let ctx = CommandContext::load(config_path)?;
            let rt = Runtime::new()?;
            rt.block_on(commands::analyze::run(
                &ctx,
                file.as_deref(),
                mode,
                write,
                &format,
            ))?;
        }
        Commands::History {
            format,
            full,
            limit,
        } => {
            let ctx = CommandContext::load(config_path)?;
            commands::history::run(&ctx, &format, full, limit)?;
        }
        Commands::Login => {
            let session = session_provider(&load_config(config_path)?);
            Runtime::new()?.block_on(commands::session::login(&session))?;
        }
        Commands::Logout => {
            let session = session_provider(&load_config(config_path)?);
            Runtime::new()?.block_on(commands::session::logout(&session))?;
        }
        Commands::Whoami => {
            let ctx = CommandContext::load(config_path)?;
            commands::session::whoami(&ctx)?;
        }
        Commands::Serve { bind } => {
            let config = load_config(config_path)?;
            Runtime::new()?.block_on(commands::serve::run(config, bind))?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { format } => {
                commands::config::show(&load_config(config_path)?, &format)?;
            }
            ConfigAction::Path => {
                commands::config::path()?;
            }
            ConfigAction::Init { global, force } => {
                commands::config::init(global, force)?;
            }
        },
    }

    Ok(())
}
