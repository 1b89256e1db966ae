use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "cartfill")]
#[command(about = "Fill a storefront cart from spreadsheet order lines", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve every order line against the storefront and write run artifacts
    Run {
        /// Layered config paths in merge order (base -> env -> local...)
        #[arg(long = "config", required = true)]
        config_paths: Vec<String>,

        /// Read order lines from this CSV instead of the configured source
        #[arg(long = "orders-csv")]
        orders_csv: Option<PathBuf>,

        /// Root directory for exports/<run_id>/
        #[arg(long, default_value = "exports")]
        exports: PathBuf,
    },

    /// Log in to the storefront (LIVE) and persist the session token
    Login {
        #[arg(long = "config", required = true)]
        config_paths: Vec<String>,
    },

    /// Load and print order lines with their match patterns. No storefront access.
    CheckOrders {
        #[arg(long = "config", required = true)]
        config_paths: Vec<String>,

        #[arg(long = "orders-csv")]
        orders_csv: Option<PathBuf>,
    },

    /// Compute layered config hash + print canonical JSON
    ConfigHash {
        #[arg(required = true)]
        paths: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Silent if the file does not exist; production injects env vars directly.
    let _ = dotenvy::from_filename(".env.local");

    init_tracing();

    let cli = Cli::parse();

    match cli.cmd {
        Commands::Run {
            config_paths,
            orders_csv,
            exports,
        } => commands::run::run_fulfillment(config_paths, orders_csv, exports).await?,

        Commands::Login { config_paths } => commands::login::login(config_paths).await?,

        Commands::CheckOrders {
            config_paths,
            orders_csv,
        } => commands::orders::check_orders(config_paths, orders_csv).await?,

        Commands::ConfigHash { paths } => {
            let path_refs: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
            let loaded = cartfill_config::load_layered_yaml(&path_refs)?;
            println!("config_hash={}", loaded.config_hash);
            println!("{}", loaded.canonical_json);
        }
    }

    Ok(())
}

/// Logs go to stderr so stdout stays parseable `key=value` output.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();
}
