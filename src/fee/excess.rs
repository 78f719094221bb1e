// Excess aggregation
//
// Overpaid gas comes back to the wallet in refund messages that belong to
// no single displayed activity. The reconciler leaves those amounts behind
// as per-activity `excess`; this pass folds the batch-wide sum into one
// displayed excess row, reusing an existing one when the classifier
// already produced it.

use crate::activities::id::{build_tx_id, EXCESS_SUB_ID};
use crate::activities::{Activity, TransactionActivity, TransactionType};
use crate::constants::{BURN_ADDRESS, TONCOIN_SLUG};

/// Fold the summed leftover excess into the activity list.
///
/// An existing excess activity absorbs the sum and moves to the end of the
/// list; otherwise a non-zero sum synthesizes a new incoming activity
/// attributed to the burn/void address, timestamped like the last activity
/// of the batch.
pub fn aggregate_excess(
    mut activities: Vec<Activity>,
    excess_total: u128,
    trace_id: &str,
    wallet_address: &str,
) -> Vec<Activity> {
    let existing = activities.iter().position(|activity| {
        matches!(
            activity,
            Activity::Transaction(tx) if tx.transaction_type == Some(TransactionType::Excess)
        )
    });

    if let Some(position) = existing {
        let mut activity = activities.remove(position);
        if let Activity::Transaction(tx) = &mut activity {
            tx.amount += excess_total as i128;
        }
        activities.push(activity);
        return activities;
    }

    if excess_total == 0 {
        return activities;
    }

    let Some(last) = activities.last() else {
        return activities;
    };

    let excess_activity = TransactionActivity {
        id: build_tx_id(trace_id, Some(EXCESS_SUB_ID), None),
        timestamp: last.timestamp(),
        slug: TONCOIN_SLUG.to_string(),
        amount: excess_total as i128,
        from_address: BURN_ADDRESS.to_string(),
        to_address: wallet_address.to_string(),
        normalized_address: BURN_ADDRESS.to_string(),
        is_incoming: true,
        fee: 0,
        transaction_type: Some(TransactionType::Excess),
        nft: None,
        comment: None,
        encrypted_comment: None,
        should_hide: false,
        should_load_details: false,
        extra: None,
    };

    activities.push(Activity::Transaction(excess_activity));
    activities
}
