//! View service CLI.
//!
//! # Quick Start
//!
//! ```bash
//! # Run the view service
//! viewservice start --address 127.0.0.1:7700
//!
//! # Act as a replica server (new terminal)
//! viewservice heartbeat s1
//!
//! # Ask who is primary
//! viewservice get
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use viewservice_config::ViewServiceConfig;

/// Primary/backup view service: tracks which server is primary and which is backup.
#[derive(Parser)]
#[command(name = "viewservice")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Directory searched for viewservice.toml and viewservice.local.toml.
    #[arg(long, global = true, default_value = ".")]
    project: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version information.
    Version,

    /// Run the view service.
    Start {
        /// Address to bind to (overrides server.bind_address).
        #[arg(short, long)]
        address: Option<String>,

        /// Heartbeat period in milliseconds (overrides detector.ping_interval_ms).
        #[arg(long)]
        ping_interval_ms: Option<u64>,

        /// Missed intervals before a server is presumed dead (overrides detector.dead_pings).
        #[arg(long)]
        dead_pings: Option<u32>,

        /// Maximum concurrent connections (overrides server.max_connections).
        #[arg(long)]
        max_connections: Option<usize>,
    },

    /// Print the current view.
    Get {
        /// View service address.
        #[arg(short, long)]
        server: Option<String>,
    },

    /// Send a single ping and print the reply.
    Ping {
        /// Identity of the pinging server.
        id: String,

        /// Last view number this server has seen.
        #[arg(short, long, default_value = "0")]
        viewnum: u64,

        /// View service address.
        #[arg(short, long)]
        server: Option<String>,
    },

    /// Ping on every interval as a replica server would, printing view changes.
    Heartbeat {
        /// Identity of the pinging server.
        id: String,

        /// View service address.
        #[arg(short, long)]
        server: Option<String>,
    },

    /// Configuration commands.
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the effective configuration.
    Show {
        /// Output format (text, toml).
        #[arg(short, long, default_value = "text")]
        format: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = ViewServiceConfig::load_from_dir(&cli.project)?;

    // RUST_LOG wins over log.filter
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log.filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Version => {
            commands::version::run();
            Ok(())
        }
        Commands::Start {
            address,
            ping_interval_ms,
            dead_pings,
            max_connections,
        } => {
            let overrides = commands::start::Overrides {
                address,
                ping_interval_ms,
                dead_pings,
                max_connections,
            };
            commands::start::run(config, overrides)
        }
        Commands::Get { server } => commands::query::get(&config, server),
        Commands::Ping {
            id,
            viewnum,
            server,
        } => commands::query::ping(&config, server, &id, viewnum),
        Commands::Heartbeat { id, server } => commands::heartbeat::run(&config, server, &id),
        Commands::Config(ConfigCommands::Show { format }) => {
            commands::config::show(&config, &format)
        }
    }
}
