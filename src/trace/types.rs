// =============================================================================
// TRACE DATA STRUCTURES
// =============================================================================

use std::collections::HashMap;

use serde::Deserialize;

use crate::address::AddressBook;
use crate::errors::EngineResult;
use crate::util::{serde_amount, serde_amount_opt};

/// One node of the causal message-delivery tree: a child's inbound message
/// hash matches some parent message's hash.
#[derive(Debug, Clone, Deserialize)]
pub struct TraceNode {
    pub tx_hash: String,
    #[serde(default)]
    pub in_msg_hash: Option<String>,
    #[serde(default)]
    pub children: Vec<TraceNode>,
}

/// One fee-relevant message of a ledger transaction.
///
/// A transaction carrying several outbound messages decomposes into several
/// records sharing `tx_hash`, each independently fee-relevant.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageRecord {
    pub tx_hash: String,
    pub from_address: String,
    pub to_address: String,
    /// Nanotons, negative when outgoing
    pub amount: i128,
    pub is_incoming: bool,
    /// Total fee charged on the owning transaction
    pub fee: u128,
    /// This message's own hash; children link to it via `in_msg_hash`
    pub msg_hash: String,
    pub is_bounced: bool,
}

/// The indexer's raw transaction shape, trimmed to what fee math needs
#[derive(Debug, Clone, Deserialize)]
pub struct RawTransaction {
    pub hash: String,
    #[serde(with = "serde_amount")]
    pub total_fees: u128,
    #[serde(default)]
    pub in_msg: Option<RawMessage>,
    #[serde(default)]
    pub out_msgs: Vec<RawMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawMessage {
    pub hash: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default, with = "serde_amount_opt")]
    pub value: Option<u128>,
    #[serde(default)]
    pub bounced: Option<bool>,
}

/// Decompose one raw transaction into message records.
///
/// A transaction triggered by an internal message contributes that inbound
/// delivery followed by its outbound messages; an externally triggered one
/// contributes only its outbound messages. The outbound records are what
/// lets the walker descend - a child transaction's inbound hash is one of
/// them.
pub fn parse_raw_transaction(
    raw: &RawTransaction,
    address_book: &AddressBook,
) -> EngineResult<Vec<MessageRecord>> {
    let inbound = raw
        .in_msg
        .as_ref()
        .filter(|msg| msg.source.as_deref().is_some_and(|source| !source.is_empty()));

    let msgs = inbound
        .into_iter()
        .map(|msg| (msg, true))
        .chain(raw.out_msgs.iter().map(|msg| (msg, false)));

    let mut records = Vec::new();
    for (msg, is_incoming) in msgs {
        // External-out messages (logs) carry no destination and no value
        let (Some(source), Some(destination)) = (msg.source.as_deref(), msg.destination.as_deref())
        else {
            log::debug!("Skipping external message {} of tx {}", msg.hash, raw.hash);
            continue;
        };

        let value = msg.value.unwrap_or(0);
        records.push(MessageRecord {
            tx_hash: raw.hash.clone(),
            from_address: address_book.canonical(source)?.to_string(),
            to_address: address_book.canonical(destination)?.to_string(),
            amount: if is_incoming { value as i128 } else { -(value as i128) },
            is_incoming,
            fee: raw.total_fees,
            msg_hash: msg.hash.clone(),
            is_bounced: msg.bounced.unwrap_or(false),
        });
    }

    Ok(records)
}

/// Group the parsed messages of a whole trace by transaction hash
pub fn build_transaction_index(
    transactions: &[RawTransaction],
    address_book: &AddressBook,
) -> EngineResult<HashMap<String, Vec<MessageRecord>>> {
    let mut by_hash: HashMap<String, Vec<MessageRecord>> = HashMap::new();
    for raw in transactions {
        let records = parse_raw_transaction(raw, address_book)?;
        by_hash.entry(raw.hash.clone()).or_default().extend(records);
    }
    Ok(by_hash)
}
