use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use fxc::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for fxc::AppCommand {
    fn from(cmd: Commands) -> fxc::AppCommand {
        match cmd {
            Commands::Currencies { search } => fxc::AppCommand::Currencies { search },
            Commands::Convert {
                amount,
                from,
                to,
                swap,
            } => fxc::AppCommand::Convert {
                amount,
                from,
                to,
                swap,
            },
            Commands::History { from, to } => fxc::AppCommand::History { from, to },
            Commands::Theme { toggle } => fxc::AppCommand::Theme { toggle },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// List supported currencies
    Currencies {
        /// Only show currencies whose code or name contains this text
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Convert an amount between two currencies
    Convert {
        /// Amount to convert; anything that is not a number counts as 0
        amount: Option<String>,
        /// Currency to convert from
        #[arg(short, long)]
        from: Option<String>,
        /// Currency to convert to
        #[arg(short, long)]
        to: Option<String>,
        /// Swap the from and to currencies
        #[arg(short, long)]
        swap: bool,
    },
    /// Show the last 7 days of rates for a currency pair
    History {
        #[arg(short, long)]
        from: Option<String>,
        #[arg(short, long)]
        to: Option<String>,
    },
    /// Show or toggle the color theme
    Theme {
        #[arg(long)]
        toggle: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose)?;

    let result = match cli.command {
        Some(Commands::Setup) => fxc::cli::setup::setup(),
        Some(cmd) => fxc::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
