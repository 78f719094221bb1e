// Trace inspection tool
//
// Loads a trace dump (actions + address book + transactions + tree) from a
// JSON file and prints the reconstructed activities with their real fees.
// Useful for debugging fee attribution against captured indexer responses.
//
// Usage:
//   tool_trace_inspect dump.json --wallet EQDJk3Cg_zbV... [--testnet] [--json]

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use serde::Deserialize;
use tabled::{Table, Tabled};

use tracescan::activities::Activity;
use tracescan::actions::RawAction;
use tracescan::address::{AddressBook, Network};
use tracescan::engine::reconstruct_activities_from_trace;
use tracescan::tokens::{to_decimal, MetadataMap};
use tracescan::trace::{build_transaction_index, RawTransaction, TraceNode};

#[derive(Parser)]
#[command(name = "tool_trace_inspect", about = "Reconstruct activities from a trace dump")]
struct Args {
    /// Path to the trace dump JSON file
    trace_file: PathBuf,

    /// Canonical user-friendly address of the wallet
    #[arg(long)]
    wallet: String,

    /// Interpret addresses as testnet addresses
    #[arg(long)]
    testnet: bool,

    /// Print raw JSON instead of a table
    #[arg(long)]
    json: bool,
}

/// On-disk dump shape: the indexer's trace response, trimmed
#[derive(Deserialize)]
struct TraceDump {
    actions: Vec<RawAction>,
    address_book: AddressBook,
    #[serde(default)]
    metadata: MetadataMap,
    transactions: HashMap<String, RawTransaction>,
    trace: TraceNode,
}

#[derive(Tabled)]
struct ActivityRow {
    #[tabled(rename = "Id")]
    id: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Asset")]
    asset: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Fee")]
    fee: String,
    #[tabled(rename = "Counterparty")]
    counterparty: String,
    #[tabled(rename = "Hidden")]
    hidden: String,
}

fn activity_row(activity: &Activity) -> ActivityRow {
    match activity {
        Activity::Transaction(tx) => ActivityRow {
            id: tx.id.clone(),
            kind: tx
                .transaction_type
                .map(|t| format!("{:?}", t))
                .unwrap_or_else(|| if tx.is_incoming { "Received".into() } else { "Sent".into() }),
            asset: tx.slug.clone(),
            amount: tx.amount.to_string(),
            fee: if tx.should_load_details {
                "?".to_string()
            } else {
                tx.fee.to_string()
            },
            counterparty: tx.normalized_address.clone(),
            hidden: if tx.should_hide { "yes".into() } else { String::new() },
        },
        Activity::Swap(swap) => ActivityRow {
            id: swap.id.clone(),
            kind: "Swap".to_string(),
            asset: format!("{} -> {}", swap.from, swap.to),
            amount: format!("-{} / +{}", swap.from_amount, swap.to_amount),
            fee: swap.network_fee.clone(),
            counterparty: String::new(),
            hidden: String::new(),
        },
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let raw = fs::read_to_string(&args.trace_file)
        .with_context(|| format!("reading {}", args.trace_file.display()))?;
    let dump: TraceDump = serde_json::from_str(&raw).context("parsing trace dump")?;

    let network = if args.testnet { Network::Testnet } else { Network::Mainnet };

    let transactions: Vec<RawTransaction> = dump.transactions.into_values().collect();
    let index = build_transaction_index(&transactions, &dump.address_book)
        .context("decomposing transactions")?;

    let result = reconstruct_activities_from_trace(
        network,
        &args.wallet,
        &dump.actions,
        &dump.trace,
        &dump.address_book,
        &index,
        &dump.metadata,
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    let rows: Vec<ActivityRow> = result.activities.iter().map(activity_row).collect();
    println!("{}", Table::new(rows));

    println!(
        "\n{} sent {} | received {} | network fee {}",
        "totals:".bold(),
        to_decimal(result.totals.sent, 9).green(),
        to_decimal(result.totals.received, 9).green(),
        to_decimal(result.totals.network_fee, 9).yellow(),
    );

    Ok(())
}
