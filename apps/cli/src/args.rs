//! # CLI Argument Definitions

use bns::notifications::NotificationKind;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "bns-alerts")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(arg_required_else_help = true)]
#[command(about = "Domain expiry alerts and notification log for BNS names")]
pub struct Cli {
    /// Config file (TOML, JSON or YAML). Defaults to ./bns.* when present
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the notification log; overrides `storage.data_dir`
    #[arg(short, long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Evaluate expiry alerts for a list of domains, most urgent first
    Check {
        /// JSON file with an array of domains
        #[arg(long)]
        domains: PathBuf,
        /// Evaluate at this instant (ms since the Unix epoch) instead of now
        #[arg(long, allow_negative_numbers = true)]
        now: Option<i64>,
    },
    /// Print totals and the domains expiring within the warning window
    Summary {
        #[arg(long)]
        domains: PathBuf,
        #[arg(long, allow_negative_numbers = true)]
        now: Option<i64>,
    },
    /// Append expiry notifications for alerting domains outside their cooldown
    Sweep {
        #[arg(long)]
        domains: PathBuf,
    },
    /// List notifications, newest first
    List {
        /// Only unread notifications
        #[arg(long)]
        unread: bool,
    },
    /// Print the unread count
    Unread,
    /// Mark one notification as read
    Read { id: String },
    /// Mark every notification as read
    ReadAll,
    /// Delete one notification
    Delete { id: String },
    /// Delete every notification
    Clear,
    /// Append a notification
    Add {
        /// expiry, renewal, sale or info
        #[arg(long = "type", value_name = "TYPE")]
        kind: NotificationKind,
        #[arg(long)]
        title: String,
        #[arg(long)]
        message: String,
        #[arg(long)]
        domain_id: Option<String>,
        #[arg(long)]
        action_url: Option<String>,
    },
    /// Poll the log for changes made by other processes and reprint it
    Watch {
        /// Seconds between polls
        #[arg(long, default_value_t = 2)]
        interval: u64,
        /// Stop after this many polls
        #[arg(long, hide = true)]
        polls: Option<u64>,
    },
}
