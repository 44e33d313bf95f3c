//! # Lost & Found CLI (`lf`)
//!
//! ## Usage
//!
//! ```bash
//! lf --config ./config/lf.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `lf post` | Post a lost or found report and notify any matches |
//! | `lf preview` | Show the matches a report would get, without storing it |
//! | `lf items --owner <id>` | List a user's own reports |
//! | `lf notifications --owner <id>` | List a user's notifications, newest first |
//! | `lf read <id>` | Mark a notification as read |
//! | `lf similarity <a> <b>` | Print the similarity score of two texts |
//! | `lf serve` | Start the HTTP API |

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use lostfound::report::NewReport;
use lostfound::{config, logging, profile, report, server, Status};
use lostfound_core::similarity::similarity;

/// Lost & Found: post lost and found items and get notified of matches.
#[derive(Parser)]
#[command(name = "lf", version)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/lf.toml")]
    config: PathBuf,

    /// Print machine-readable JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    /// Enable debug logging (overrides RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Post a report and notify the owners of any matching reports.
    Post(ReportArgs),

    /// Show matches for a report without storing it or notifying anyone.
    Preview(ReportArgs),

    /// List a user's own reports.
    Items {
        #[arg(long)]
        owner: String,
    },

    /// List a user's notifications, newest first, with the unread count.
    Notifications {
        #[arg(long)]
        owner: String,
    },

    /// Mark a notification as read.
    Read {
        /// Notification id.
        id: String,
    },

    /// Score two texts with the matcher's similarity function.
    Similarity { first: String, second: String },

    /// Start the HTTP API on `[server].bind`.
    Serve,
}

#[derive(Args)]
struct ReportArgs {
    /// Id of the reporting user.
    #[arg(long)]
    owner: String,

    /// `lost` or `found`.
    #[arg(long)]
    status: Status,

    /// Item category, e.g. `wallet`. Compared case-insensitively.
    #[arg(long = "type")]
    item_type: String,

    #[arg(long)]
    name: Option<String>,

    #[arg(long)]
    location: Option<String>,

    #[arg(long)]
    description: Option<String>,

    /// When the item was lost or found (YYYY-MM-DD or RFC 3339).
    #[arg(long)]
    date: String,
}

impl From<ReportArgs> for NewReport {
    fn from(args: ReportArgs) -> Self {
        NewReport {
            owner_id: args.owner,
            status: args.status,
            item_type: args.item_type,
            item_name: args.name,
            location: args.location,
            description: args.description,
            date: args.date,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    // Commands that don't require config
    if let Commands::Similarity { first, second } = &cli.command {
        let score = similarity(first, second);
        if cli.json {
            println!("{}", serde_json::json!({ "similarity": score, "percent": score.round() }));
        } else {
            println!("{:.2}% (rounded {})", score, score.round());
        }
        return Ok(());
    }

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Post(args) => {
            report::run_post(&cfg, args.into(), cli.json).await?;
        }
        Commands::Preview(args) => {
            report::run_preview(&cfg, args.into(), cli.json).await?;
        }
        Commands::Items { owner } => {
            profile::run_items(&cfg, &owner, cli.json).await?;
        }
        Commands::Notifications { owner } => {
            profile::run_notifications(&cfg, &owner, cli.json).await?;
        }
        Commands::Read { id } => {
            profile::run_read(&cfg, &id, cli.json).await?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::Similarity { .. } => {
            // Handled above (before config loading)
            unreachable!()
        }
    }

    Ok(())
}
