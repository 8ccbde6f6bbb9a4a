//! Command-line argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use lc_ledger::config::LedgerConfig;
use lc_ledger::contract::TransitionPolicy;

/// Letter of credit ledger.
#[derive(Parser, Debug)]
#[command(name = "lc-ledger")]
#[command(about = "Request, issue and accept letters of credit on a versioned ledger")]
#[command(version)]
pub struct Cli {
    /// Database directory.
    #[arg(long, global = true, default_value = "lc-ledger.db")]
    pub db: PathBuf,

    /// Use a throwaway database.
    #[arg(long, global = true)]
    pub temporary: bool,

    /// Only allow Requested -> Issued -> Accepted, one step at a time.
    #[arg(long, global = true)]
    pub strict: bool,

    /// Log level (trace, debug, info, warn, error). RUST_LOG takes precedence.
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Request a new letter of credit
    Request(RequestArgs),
    /// Mark a letter of credit as issued
    Issue { lc_id: String },
    /// Mark a letter of credit as accepted
    Accept { lc_id: String },
    /// Show the latest version of a letter of credit
    Get { lc_id: String },
    /// Show every version of a letter of credit
    History {
        lc_id: String,
        #[arg(long)]
        pretty: bool,
    },
    /// Write a tombstone for a letter of credit
    Delete { lc_id: String },
}

#[derive(Args, Debug)]
pub struct RequestArgs {
    /// Raw JSON payload; overrides every other flag.
    #[arg(long)]
    pub json: Option<String>,

    /// Generated when omitted.
    #[arg(long)]
    pub id: Option<String>,

    #[arg(long, default_value = "")]
    pub expiry_date: String,

    #[arg(long, default_value = "")]
    pub buyer: String,

    #[arg(long, default_value = "")]
    pub bank: String,

    #[arg(long, default_value = "")]
    pub seller: String,

    #[arg(long, default_value_t = 0)]
    pub amount: u64,
}

impl Cli {
    pub fn ledger_config(&self) -> LedgerConfig {
        LedgerConfig {
            db_path: self.db.clone(),
            temporary: self.temporary,
            policy: if self.strict {
                TransitionPolicy::Strict
            } else {
                TransitionPolicy::Lenient
            },
            ..LedgerConfig::default()
        }
    }
}
