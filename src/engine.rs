// Pipeline entry points
//
// Two consumers exist: the activity feed, which only needs classification
// (fees load lazily when a row is opened), and the transaction-details
// view, which runs the full classify -> walk -> reconcile -> aggregate
// pipeline over one trace.

use std::collections::HashMap;

use serde::Serialize;

use crate::actions::{classify_action, classify_actions, ClassifyContext, RawAction};
use crate::activities::Activity;
use crate::address::{AddressBook, Network};
use crate::fee::{aggregate_excess, find_bucket, reconcile_activity, ReconcileContext};
use crate::tokens::MetadataMap;
use crate::trace::{walk_trace, MessageRecord, TraceNode};

/// Trace-wide money movement totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TraceTotals {
    pub sent: u128,
    pub received: u128,
    pub network_fee: u128,
}

/// Output of the full pipeline for one trace
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceActivities {
    pub activities: Vec<Activity>,
    pub totals: TraceTotals,
}

/// Classifier-only entry point, used for activity-feed listing.
///
/// Fees stay provisional; activities marked `should_load_details` are
/// resolved later through [`reconstruct_activities_from_trace`].
pub fn classify_action_batch(
    network: Network,
    wallet_address: &str,
    raw_actions: &[RawAction],
    address_book: &AddressBook,
    metadata: &MetadataMap,
) -> Vec<Activity> {
    let ctx = ClassifyContext { network, wallet_address, address_book, metadata };
    classify_actions(raw_actions, &ctx)
}

/// Full pipeline for one trace: classify every action, walk the transaction
/// tree into buckets, reconcile each detail-needing activity against its
/// bucket and fold the leftover excess into one displayed activity.
pub fn reconstruct_activities_from_trace(
    network: Network,
    wallet_address: &str,
    raw_actions: &[RawAction],
    trace_root: &TraceNode,
    address_book: &AddressBook,
    transactions: &HashMap<String, Vec<MessageRecord>>,
    metadata: &MetadataMap,
) -> TraceActivities {
    let ctx = ClassifyContext { network, wallet_address, address_book, metadata };

    // Classification, keeping track of which action produced each activity
    let mut classified: Vec<(usize, Activity)> = Vec::new();
    for (index, action) in raw_actions.iter().enumerate() {
        match classify_action(action, &ctx) {
            Ok(batch) => classified.extend(batch.into_iter().map(|activity| (index, activity))),
            Err(err) => {
                log::warn!("Skipping action {}: {}", action.action_id, err);
            }
        }
    }

    let walk = walk_trace(trace_root, transactions, wallet_address);
    let reconcile_ctx = ReconcileContext { trace_actions: raw_actions, metadata };

    let mut activities = Vec::with_capacity(classified.len());
    let mut excess_total: u128 = 0;

    for (action_index, activity) in classified {
        if !activity.should_load_details() {
            activities.push(activity);
            continue;
        }

        let action = &raw_actions[action_index];
        match find_bucket(&walk.buckets, action) {
            Some(bucket) => {
                let result = reconcile_activity(activity, action, bucket, &reconcile_ctx);
                excess_total += result.excess;
                activities.push(result.activity);
            }
            None => {
                // Fail closed: better a provisional fee than a guessed one
                log::warn!(
                    "No trace bucket matches action {}; fee left unresolved",
                    action.action_id
                );
                activities.push(activity);
            }
        }
    }

    let trace_id = raw_actions
        .first()
        .map(|action| action.trace_id.as_str())
        .unwrap_or(trace_root.tx_hash.as_str());
    let activities = aggregate_excess(activities, excess_total, trace_id, wallet_address);

    TraceActivities {
        activities,
        totals: TraceTotals {
            sent: walk.total_sent,
            received: walk.total_received,
            network_fee: walk.total_network_fee,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::types::*;
    use crate::activities::TransactionType;
    use crate::trace::{build_transaction_index, RawMessage, RawTransaction};

    const WALLET_RAW: &str = "0:C99370A0FF36D59DC489F357D80FEA30A7C2791732C41DC2C86448FED350339A";
    const WALLET: &str = "EQDJk3Cg_zbVncSJ81fYD-owp8J5FzLEHcLIZEj-01AzmuB0";
    const PEER_RAW: &str = "0:DA542E12327F39741ADE64EF2C7A5EFF5D99F474B52A64DAB5D46FE0687F2CC5";
    const PEER: &str = "EQDaVC4SMn85dBreZO8sel7_XZn0dLUqZNq11G_gaH8sxYy3";
    const JETTON_WALLET_RAW: &str =
        "0:AFD96114EA3396F0E90D1188E33EFA88289F4E3D89D75A58813AEBC982ECE125";
    const JETTON_WALLET: &str = "EQCv2WEU6jOW8OkNEYjjPvqIKJ9OPYnXWliBOuvJguzhJYIG";
    const TOKEN_RAW: &str = "0:3A40925062FB37CD3A0C6AEBCA810E16D9876CA159E774B965B4003D56CFDD8A";
    const TOKEN: &str = "EQA6QJJQYvs3zToMauvKgQ4W2YdsoVnndLlltAA9Vs_dilmG";

    fn book() -> AddressBook {
        let mut book = AddressBook::new();
        book.insert(WALLET_RAW, WALLET);
        book.insert(PEER_RAW, PEER);
        book.insert(JETTON_WALLET_RAW, JETTON_WALLET);
        book.insert(TOKEN_RAW, TOKEN);
        book
    }

    fn message(hash: &str, source: Option<&str>, destination: Option<&str>, value: Option<u128>) -> RawMessage {
        RawMessage {
            hash: hash.to_string(),
            source: source.map(str::to_string),
            destination: destination.map(str::to_string),
            value,
            bounced: None,
        }
    }

    fn ton_transfer_action(value: u128, hashes: &[&str]) -> RawAction {
        RawAction {
            trace_id: "trace".to_string(),
            action_id: "a1".to_string(),
            start_lt: 100,
            end_lt: 110,
            start_utime: 1_700_000_000,
            end_utime: 1_700_000_010,
            transactions: hashes.iter().map(|h| h.to_string()).collect(),
            success: true,
            trace_end_lt: Some(110),
            kind: ActionKind::TonTransfer(TonTransferDetails {
                source: WALLET_RAW.to_string(),
                destination: PEER_RAW.to_string(),
                value,
                comment: Some("hi".to_string()),
                encrypted: false,
            }),
        }
    }

    #[test]
    fn plain_transfer_end_to_end() {
        let book = book();
        let metadata = MetadataMap::new();

        let actions = vec![ton_transfer_action(5_000_000_000, &["w1", "p1"])];

        let raw_transactions = vec![
            RawTransaction {
                hash: "w1".to_string(),
                total_fees: 2_345_629,
                in_msg: Some(message("ext", None, Some(WALLET_RAW), None)),
                out_msgs: vec![message("m1", Some(WALLET_RAW), Some(PEER_RAW), Some(5_000_000_000))],
            },
            RawTransaction {
                hash: "p1".to_string(),
                total_fees: 100,
                in_msg: Some(message("m1", Some(WALLET_RAW), Some(PEER_RAW), Some(5_000_000_000))),
                out_msgs: vec![],
            },
        ];
        let index = build_transaction_index(&raw_transactions, &book).unwrap();

        let root = TraceNode {
            tx_hash: "w1".to_string(),
            in_msg_hash: None,
            children: vec![TraceNode {
                tx_hash: "p1".to_string(),
                in_msg_hash: Some("m1".to_string()),
                children: vec![],
            }],
        };

        let result = reconstruct_activities_from_trace(
            Network::Mainnet,
            WALLET,
            &actions,
            &root,
            &book,
            &index,
            &metadata,
        );

        assert_eq!(result.activities.len(), 1);
        let tx = result.activities[0].as_transaction().unwrap();
        assert_eq!(tx.id, "trace:100-a1");
        assert_eq!(tx.amount, -5_000_000_000);
        assert_eq!(tx.fee, 2_345_629);
        assert!(!tx.is_incoming);
        assert!(!tx.should_load_details);
        assert_eq!(tx.comment.as_deref(), Some("hi"));
        assert_eq!(tx.normalized_address, PEER);

        assert_eq!(result.totals.sent, 5_000_000_000);
        assert_eq!(result.totals.received, 0);
        assert_eq!(result.totals.network_fee, 2_345_629);
    }

    #[test]
    fn pipeline_is_deterministic() {
        let book = book();
        let metadata = MetadataMap::new();
        let actions = vec![ton_transfer_action(5_000_000_000, &["w1", "p1"])];
        let raw_transactions = vec![
            RawTransaction {
                hash: "w1".to_string(),
                total_fees: 2_345_629,
                in_msg: Some(message("ext", None, Some(WALLET_RAW), None)),
                out_msgs: vec![message("m1", Some(WALLET_RAW), Some(PEER_RAW), Some(5_000_000_000))],
            },
            RawTransaction {
                hash: "p1".to_string(),
                total_fees: 100,
                in_msg: Some(message("m1", Some(WALLET_RAW), Some(PEER_RAW), Some(5_000_000_000))),
                out_msgs: vec![],
            },
        ];
        let index = build_transaction_index(&raw_transactions, &book).unwrap();
        let root = TraceNode {
            tx_hash: "w1".to_string(),
            in_msg_hash: None,
            children: vec![TraceNode {
                tx_hash: "p1".to_string(),
                in_msg_hash: Some("m1".to_string()),
                children: vec![],
            }],
        };

        let run = || {
            reconstruct_activities_from_trace(
                Network::Mainnet,
                WALLET,
                &actions,
                &root,
                &book,
                &index,
                &metadata,
            )
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn jetton_transfer_produces_an_excess_activity() {
        let book = book();
        let metadata = MetadataMap::new();

        let actions = vec![RawAction {
            trace_id: "trace".to_string(),
            action_id: "a1".to_string(),
            start_lt: 100,
            end_lt: 110,
            start_utime: 1_700_000_000,
            end_utime: 1_700_000_010,
            transactions: vec!["w1".to_string(), "j1".to_string(), "w2".to_string()],
            success: true,
            trace_end_lt: Some(110),
            kind: ActionKind::JettonTransfer(JettonTransferDetails {
                asset: TOKEN_RAW.to_string(),
                sender: WALLET_RAW.to_string(),
                receiver: PEER_RAW.to_string(),
                amount: 90_000_000,
                comment: None,
                is_encrypted_comment: false,
                forward_payload: None,
            }),
        }];

        // wallet -> jetton wallet (0.05 TON gas), 0.045 TON excess back
        let raw_transactions = vec![
            RawTransaction {
                hash: "w1".to_string(),
                total_fees: 2_220_787,
                in_msg: Some(message("ext", None, Some(WALLET_RAW), None)),
                out_msgs: vec![message(
                    "m1",
                    Some(WALLET_RAW),
                    Some(JETTON_WALLET_RAW),
                    Some(50_000_000),
                )],
            },
            RawTransaction {
                hash: "j1".to_string(),
                total_fees: 3_000_000,
                in_msg: Some(message(
                    "m1",
                    Some(WALLET_RAW),
                    Some(JETTON_WALLET_RAW),
                    Some(50_000_000),
                )),
                out_msgs: vec![message(
                    "m2",
                    Some(JETTON_WALLET_RAW),
                    Some(WALLET_RAW),
                    Some(45_000_000),
                )],
            },
            RawTransaction {
                hash: "w2".to_string(),
                total_fees: 50,
                in_msg: Some(message(
                    "m2",
                    Some(JETTON_WALLET_RAW),
                    Some(WALLET_RAW),
                    Some(45_000_000),
                )),
                out_msgs: vec![],
            },
        ];
        let index = build_transaction_index(&raw_transactions, &book).unwrap();

        let root = TraceNode {
            tx_hash: "w1".to_string(),
            in_msg_hash: None,
            children: vec![TraceNode {
                tx_hash: "j1".to_string(),
                in_msg_hash: Some("m1".to_string()),
                children: vec![TraceNode {
                    tx_hash: "w2".to_string(),
                    in_msg_hash: Some("m2".to_string()),
                    children: vec![],
                }],
            }],
        };

        let result = reconstruct_activities_from_trace(
            Network::Mainnet,
            WALLET,
            &actions,
            &root,
            &book,
            &index,
            &metadata,
        );

        assert_eq!(result.activities.len(), 2);

        let transfer = result.activities[0].as_transaction().unwrap();
        assert_eq!(transfer.fee, 7_220_787);
        assert_eq!(transfer.slug, "ton-eqa6qjjqyv");

        let excess = result.activities[1].as_transaction().unwrap();
        assert_eq!(excess.transaction_type, Some(TransactionType::Excess));
        assert_eq!(excess.amount, 45_000_000);
        assert_eq!(excess.id, "trace:excess");

        assert_eq!(result.totals.sent, 50_000_000);
        assert_eq!(result.totals.received, 45_000_000);
    }

    #[test]
    fn unmatched_activity_keeps_its_provisional_fee() {
        let book = book();
        let metadata = MetadataMap::new();

        // The action references transactions absent from the trace
        let actions = vec![ton_transfer_action(1_000, &["elsewhere"])];
        let raw_transactions = vec![RawTransaction {
            hash: "w1".to_string(),
            total_fees: 10,
            in_msg: Some(message("ext", None, Some(WALLET_RAW), None)),
            out_msgs: vec![message("m1", Some(WALLET_RAW), Some(PEER_RAW), Some(1_000))],
        }];
        let index = build_transaction_index(&raw_transactions, &book).unwrap();
        let root = TraceNode { tx_hash: "w1".to_string(), in_msg_hash: None, children: vec![] };

        let result = reconstruct_activities_from_trace(
            Network::Mainnet,
            WALLET,
            &actions,
            &root,
            &book,
            &index,
            &metadata,
        );

        let tx = result.activities[0].as_transaction().unwrap();
        assert_eq!(tx.fee, 0);
        assert!(tx.should_load_details, "unmatched activity must stay unresolved");
    }
}
