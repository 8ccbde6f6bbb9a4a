//! Letter of credit ledger binary.

mod cli;

use anyhow::Context;
use clap::Parser;
use lc_ledger::contract::LcContract;
use lc_ledger::store::VersionedStore;
use lc_ledger::utils;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, RequestArgs};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = cli.ledger_config();
    let store = config
        .open_store()
        .with_context(|| format!("failed to open ledger at {}", config.db_path.display()))?;
    let contract = LcContract::with_policy(config.policy);
    contract.init()?;
    tracing::debug!(db = %config.db_path.display(), policy = ?contract.policy(), "ledger opened");

    match cli.command {
        Command::Request(args) => {
            let payload = request_payload(args)?;
            let lc = contract.request_lc(&store, &payload)?;
            println!("{}", lc.id());
        }
        Command::Issue { lc_id } => {
            let payload = serde_json::json!({ "lcID": lc_id }).to_string();
            contract.issue_lc(&store, &payload)?;
        }
        Command::Accept { lc_id } => {
            let payload = serde_json::json!({ "lcID": lc_id }).to_string();
            contract.accept_lc(&store, &payload)?;
        }
        Command::Get { lc_id } => {
            if let Some(bytes) = contract.get_lc(&store, &lc_id)? {
                println!("{}", String::from_utf8_lossy(&bytes));
            }
        }
        Command::History { lc_id, pretty } => {
            let document = contract.get_lc_history(&store, &lc_id)?;
            if pretty {
                let value: serde_json::Value = serde_json::from_str(&document)?;
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                println!("{document}");
            }
        }
        Command::Delete { lc_id } => {
            let tx_id = store.delete(&lc_id)?;
            tracing::warn!(%lc_id, %tx_id, "LC tombstoned");
        }
    }

    store.flush()?;
    Ok(())
}

fn request_payload(args: RequestArgs) -> anyhow::Result<String> {
    if let Some(json) = args.json {
        return Ok(json);
    }
    let id = match args.id {
        Some(id) => id,
        None => utils::new_uuid_to_bech32("lc")?,
    };
    Ok(serde_json::json!({
        "lcId": id,
        "expiryDate": args.expiry_date,
        "buyer": args.buyer,
        "bank": args.bank,
        "seller": args.seller,
        "amount": args.amount,
    })
    .to_string())
}
