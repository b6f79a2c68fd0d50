//! CLI entry and dispatch.

use anyhow::{Context, Result};
use clap::Parser;
use rmx_core::config::Config;
use tracing::debug;

mod commands;

#[derive(Parser)]
#[command(name = "rmx")]
#[command(version = "0.1")]
#[command(about = "Rent-management service client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Log in and persist the session
    Login {
        /// Tenant ID or owner email
        #[arg(short, long)]
        user: String,

        /// Account password
        #[arg(short, long)]
        password: String,
    },

    /// Log out (clear the persisted session)
    Logout,

    /// Show the current session
    Whoami,

    /// Fetch and render the tenant dashboard
    Dashboard,

    /// Initiate a payment for the current billing period
    Pay {
        /// Payment method: card, bank-transfer, or cash
        #[arg(short, long)]
        method: String,
    },

    /// Owner tools for managing tenants
    Tenant {
        #[command(subcommand)]
        command: TenantCommands,
    },

    /// Change the account password
    Passwd {
        /// Current password
        #[arg(long)]
        current: String,

        /// New password
        #[arg(long)]
        new: String,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum TenantCommands {
    /// Register a new tenant (prints the generated credentials once)
    Register {
        /// Tenant display name
        #[arg(long)]
        name: String,

        /// Monthly rent amount
        #[arg(long)]
        rent: f64,

        /// Initial electricity meter reading
        #[arg(long)]
        electricity: f64,

        /// Initial water meter reading
        #[arg(long)]
        water: f64,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
    /// Set the API base URL
    SetUrl {
        /// Base URL, e.g. https://rent.example.com/api
        #[arg(value_name = "URL")]
        url: String,
    },
}

pub fn run() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;
    rt.block_on(async move { dispatch(cli).await })
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn dispatch(cli: Cli) -> Result<()> {
    let config = Config::load().context("load config")?;
    debug!(base_url = %config.resolve_base_url(), "config loaded");

    match cli.command {
        Commands::Login {
            user,
            password,
        } => commands::auth::login(&config, &user, &password).await,

        Commands::Logout => commands::auth::logout(),

        Commands::Whoami => commands::auth::whoami(),

        Commands::Dashboard => commands::dashboard::run(&config).await,

        Commands::Pay {
            method,
        } => commands::payment::run(&config, &method).await,

        Commands::Tenant { command } => match command {
            TenantCommands::Register {
                name,
                rent,
                electricity,
                water,
            } => commands::tenant::register(&config, name, rent, electricity, water).await,
        },

        Commands::Passwd {
            current,
            new,
        } => commands::auth::passwd(&config, &current, &new).await,

        Commands::Config { command } => match command {
            ConfigCommands::Path => commands::config::path(),
            ConfigCommands::Init => commands::config::init(),
            ConfigCommands::SetUrl {
                url,
            } => commands::config::set_url(&url),
        },
    }
}
