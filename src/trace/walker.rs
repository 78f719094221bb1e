// Trace walking
//
// Splits the transaction tree of one trace into buckets, one per logical
// wallet-initiated action. Implemented as an explicit work stack carrying
// (node, inherited bucket index) pairs; the result is an immutable bucket
// list plus trace-wide totals.
//
// Bucket assignment:
// - Nodes visited before the wallet's own outgoing message is found are
//   skipped for accumulation but still descended into (gasless/relayed
//   flows put intermediary hops above the wallet's transaction).
// - A node entered without an inherited index opens one bucket per message
//   position: one wallet transaction with N outbound messages represents N
//   user-initiated sends.
// - Descending through a message reuses its bucket index, so an entire
//   causal subtree accumulates into the bucket of the send that caused it.
// - A node whose index already has a bucket contributes its hash to that
//   bucket. The bucket's own opening hash is deliberately not inserted:
//   sibling out-messages of one wallet transaction share that hash, and
//   inserting it would make every bucket match every action.

use std::collections::{HashMap, HashSet};

use super::types::{MessageRecord, TraceNode};
use crate::util::bigint_abs;

/// Accumulated state of one logical wallet-initiated action
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TraceBucket {
    pub hashes: HashSet<String>,
    pub sent: u128,
    pub received: u128,
    pub network_fee: u128,
}

/// All buckets of one trace plus trace-wide totals
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WalkResult {
    pub buckets: Vec<TraceBucket>,
    pub total_sent: u128,
    pub total_received: u128,
    pub total_network_fee: u128,
}

/// Walk the transaction tree of one trace into per-action buckets.
///
/// `transactions_by_hash` maps each transaction hash to its decomposed
/// messages; hashes missing from the map (truncated traces) are tolerated,
/// the walk just returns what it can build.
pub fn walk_trace(
    root: &TraceNode,
    transactions_by_hash: &HashMap<String, Vec<MessageRecord>>,
    wallet_address: &str,
) -> WalkResult {
    let mut buckets: Vec<TraceBucket> = Vec::new();
    let mut wallet_transaction_found = false;

    // LIFO stack; children pushed in reverse to preserve sibling order
    let mut stack: Vec<(&TraceNode, Option<usize>)> = vec![(root, None)];

    while let Some((node, inherited)) = stack.pop() {
        let Some(msgs) = transactions_by_hash.get(&node.tx_hash) else {
            log::debug!("Trace references unknown transaction {}", node.tx_hash);
            for child in node.children.iter().rev() {
                stack.push((child, inherited));
            }
            continue;
        };

        if !wallet_transaction_found {
            wallet_transaction_found = msgs
                .iter()
                .any(|msg| msg.from_address == wallet_address && !msg.is_incoming);

            // In gasless operations, transactions before our wallet's own
            // are someone else's; skip them but keep descending.
            if !wallet_transaction_found {
                for child in node.children.iter().rev() {
                    stack.push((child, None));
                }
                continue;
            }
        }

        for (position, msg) in msgs.iter().enumerate() {
            let index = inherited.unwrap_or(position);

            if index >= buckets.len() {
                buckets.push(TraceBucket::default());
            } else {
                buckets[index].hashes.insert(node.tx_hash.clone());
            }
            let bucket = &mut buckets[index];

            if msg.from_address == wallet_address && !msg.is_incoming {
                bucket.sent += bigint_abs(msg.amount);
                // The fee is charged once, on the wallet's own outbound
                // message; deeper hops must not overwrite it
                if bucket.network_fee == 0 {
                    bucket.network_fee = msg.fee;
                }
            } else if msg.to_address == wallet_address && msg.is_incoming && !msg.is_bounced {
                // Bounced messages are a failed call's refund, not income
                bucket.received += bigint_abs(msg.amount);
            }

            if let Some(child) = node
                .children
                .iter()
                .find(|child| child.in_msg_hash.as_deref() == Some(msg.msg_hash.as_str()))
            {
                stack.push((child, Some(index)));
            }
        }
    }

    let mut result = WalkResult { buckets, ..Default::default() };
    for bucket in &result.buckets {
        result.total_sent += bucket.sent;
        result.total_received += bucket.received;
        result.total_network_fee += bucket.network_fee;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    const WALLET: &str = "EQWALLET";
    const PEER: &str = "EQPEER";
    const RELAYER: &str = "EQRELAYER";

    fn outgoing(tx: &str, from: &str, to: &str, amount: u128, fee: u128, msg: &str) -> MessageRecord {
        MessageRecord {
            tx_hash: tx.into(),
            from_address: from.into(),
            to_address: to.into(),
            amount: -(amount as i128),
            is_incoming: false,
            fee,
            msg_hash: msg.into(),
            is_bounced: false,
        }
    }

    fn incoming(tx: &str, from: &str, to: &str, amount: u128, msg: &str) -> MessageRecord {
        MessageRecord {
            tx_hash: tx.into(),
            from_address: from.into(),
            to_address: to.into(),
            amount: amount as i128,
            is_incoming: true,
            fee: 0,
            msg_hash: msg.into(),
            is_bounced: false,
        }
    }

    fn node(tx: &str, in_msg: Option<&str>, children: Vec<TraceNode>) -> TraceNode {
        TraceNode {
            tx_hash: tx.into(),
            in_msg_hash: in_msg.map(str::to_string),
            children,
        }
    }

    #[test]
    fn plain_transfer_builds_one_bucket() {
        // wallet -> peer, the peer transaction is a child of the wallet's
        let root = node("w1", None, vec![node("p1", Some("m1"), vec![])]);
        let mut index = HashMap::new();
        index.insert("w1".to_string(), vec![outgoing("w1", WALLET, PEER, 5_000_000_000, 2_345_629, "m1")]);
        index.insert("p1".to_string(), vec![incoming("p1", WALLET, PEER, 5_000_000_000, "m1")]);

        let result = walk_trace(&root, &index, WALLET);
        assert_eq!(result.buckets.len(), 1);
        assert_eq!(result.buckets[0].sent, 5_000_000_000);
        assert_eq!(result.buckets[0].received, 0);
        assert_eq!(result.buckets[0].network_fee, 2_345_629);
        assert_eq!(result.total_sent, 5_000_000_000);
        assert_eq!(result.total_network_fee, 2_345_629);
        // The child hash joins the bucket, the opening hash does not
        assert!(result.buckets[0].hashes.contains("p1"));
        assert!(!result.buckets[0].hashes.contains("w1"));
    }

    #[test]
    fn gasless_prefix_is_skipped_but_descended() {
        // relayer -> wallet -> peer; the relayer's spend is not ours
        let root = node(
            "r1",
            None,
            vec![node("w1", Some("rm"), vec![node("p1", Some("m1"), vec![])])],
        );
        let mut index = HashMap::new();
        index.insert("r1".to_string(), vec![outgoing("r1", RELAYER, WALLET, 900, 10, "rm")]);
        index.insert(
            "w1".to_string(),
            vec![
                incoming("w1", RELAYER, WALLET, 900, "rm"),
                outgoing("w1", WALLET, PEER, 700, 5, "m1"),
            ],
        );
        index.insert("p1".to_string(), vec![incoming("p1", WALLET, PEER, 700, "m1")]);

        let result = walk_trace(&root, &index, WALLET);
        assert_eq!(result.buckets.len(), 2);
        // Message 0 of the wallet node is the relayer's delivery
        assert_eq!(result.buckets[0].received, 900);
        assert_eq!(result.buckets[1].sent, 700);
        assert_eq!(result.buckets[1].network_fee, 5);
        assert_eq!(result.total_sent, 700);
        assert_eq!(result.total_received, 900);
    }

    #[test]
    fn bounced_refund_is_not_income() {
        let mut refund = incoming("w2", PEER, WALLET, 600, "m2");
        refund.is_bounced = true;

        let root = node(
            "w1",
            None,
            vec![node("p1", Some("m1"), vec![node("w2", Some("m2"), vec![])])],
        );
        let mut index = HashMap::new();
        index.insert("w1".to_string(), vec![outgoing("w1", WALLET, PEER, 600, 7, "m1")]);
        index.insert("p1".to_string(), vec![
            incoming("p1", WALLET, PEER, 600, "m1"),
            outgoing("p1", PEER, WALLET, 600, 3, "m2"),
        ]);
        index.insert("w2".to_string(), vec![refund]);

        let result = walk_trace(&root, &index, WALLET);
        assert_eq!(result.buckets.len(), 1);
        assert_eq!(result.buckets[0].received, 0);
        assert_eq!(result.buckets[0].sent, 600);
    }

    #[test]
    fn multi_message_transaction_opens_one_bucket_per_send() {
        // One wallet transaction carrying three sends (an NFT batch)
        let root = node(
            "w1",
            None,
            vec![
                node("p1", Some("m1"), vec![]),
                node("p2", Some("m2"), vec![]),
                node("p3", Some("m3"), vec![]),
            ],
        );
        let mut index = HashMap::new();
        index.insert(
            "w1".to_string(),
            vec![
                outgoing("w1", WALLET, PEER, 100, 9, "m1"),
                outgoing("w1", WALLET, PEER, 200, 9, "m2"),
                outgoing("w1", WALLET, PEER, 300, 9, "m3"),
            ],
        );
        for (tx, msg, amount) in [("p1", "m1", 100u128), ("p2", "m2", 200), ("p3", "m3", 300)] {
            index.insert(tx.to_string(), vec![incoming(tx, WALLET, PEER, amount, msg)]);
        }

        let result = walk_trace(&root, &index, WALLET);
        assert_eq!(result.buckets.len(), 3);
        assert_eq!(result.buckets[0].sent, 100);
        assert_eq!(result.buckets[1].sent, 200);
        assert_eq!(result.buckets[2].sent, 300);
        // Each bucket holds only its own subtree's hashes
        assert!(result.buckets[0].hashes.contains("p1"));
        assert!(!result.buckets[0].hashes.contains("p2"));
        assert!(result.buckets[1].hashes.contains("p2"));
    }

    #[test]
    fn deeper_wallet_hop_does_not_steal_the_fee() {
        // wallet -> peer -> wallet -> peer (a round trip through our own
        // account); the first outbound message owns the fee
        let root = node(
            "w1",
            None,
            vec![node(
                "p1",
                Some("m1"),
                vec![node("w2", Some("m2"), vec![node("p2", Some("m3"), vec![])])],
            )],
        );
        let mut index = HashMap::new();
        index.insert("w1".to_string(), vec![outgoing("w1", WALLET, PEER, 1_000, 50, "m1")]);
        index.insert("p1".to_string(), vec![
            incoming("p1", WALLET, PEER, 1_000, "m1"),
            outgoing("p1", PEER, WALLET, 800, 4, "m2"),
        ]);
        index.insert("w2".to_string(), vec![
            incoming("w2", PEER, WALLET, 800, "m2"),
            outgoing("w2", WALLET, PEER, 500, 30, "m3"),
        ]);
        index.insert("p2".to_string(), vec![incoming("p2", WALLET, PEER, 500, "m3")]);

        let result = walk_trace(&root, &index, WALLET);
        assert_eq!(result.buckets.len(), 1);
        assert_eq!(result.buckets[0].network_fee, 50);
        assert_eq!(result.buckets[0].sent, 1_500);
        assert_eq!(result.buckets[0].received, 800);
    }

    #[test]
    fn bucket_count_never_exceeds_wallet_sends() {
        let root = node(
            "w1",
            None,
            vec![node("p1", Some("m1"), vec![]), node("p2", Some("m2"), vec![])],
        );
        let mut index = HashMap::new();
        index.insert(
            "w1".to_string(),
            vec![
                outgoing("w1", WALLET, PEER, 10, 1, "m1"),
                outgoing("w1", WALLET, PEER, 20, 1, "m2"),
            ],
        );
        index.insert("p1".to_string(), vec![incoming("p1", WALLET, PEER, 10, "m1")]);
        index.insert("p2".to_string(), vec![incoming("p2", WALLET, PEER, 20, "m2")]);

        let result = walk_trace(&root, &index, WALLET);
        let wallet_sends = 2;
        assert!(result.buckets.len() <= wallet_sends);
    }

    #[test]
    fn truncated_trace_still_produces_buckets() {
        let root = node("w1", None, vec![node("missing", Some("m1"), vec![])]);
        let mut index = HashMap::new();
        index.insert("w1".to_string(), vec![outgoing("w1", WALLET, PEER, 42, 3, "m1")]);

        let result = walk_trace(&root, &index, WALLET);
        assert_eq!(result.buckets.len(), 1);
        assert_eq!(result.buckets[0].sent, 42);
    }

    #[test]
    fn conservation_over_a_synthetic_tree() {
        // wallet sends 1000, gets 150 back as excess
        let root = node(
            "w1",
            None,
            vec![node("p1", Some("m1"), vec![node("w2", Some("m2"), vec![])])],
        );
        let mut index = HashMap::new();
        index.insert("w1".to_string(), vec![outgoing("w1", WALLET, PEER, 1_000, 25, "m1")]);
        index.insert("p1".to_string(), vec![
            incoming("p1", WALLET, PEER, 1_000, "m1"),
            outgoing("p1", PEER, WALLET, 150, 2, "m2"),
        ]);
        index.insert("w2".to_string(), vec![incoming("w2", PEER, WALLET, 150, "m2")]);

        let result = walk_trace(&root, &index, WALLET);
        let net_change = result.total_received as i128 - result.total_sent as i128;
        assert_eq!(net_change, -850);
        assert_eq!(
            result.buckets.iter().map(|b| b.sent).sum::<u128>(),
            result.total_sent
        );
        assert_eq!(
            result.buckets.iter().map(|b| b.received).sum::<u128>(),
            result.total_received
        );
        assert_eq!(
            result.buckets.iter().map(|b| b.network_fee).sum::<u128>(),
            result.total_network_fee
        );
    }
}
