// Real-fee computation
//
// Base formula: real_fee = network_fee + sent_for_fee - excess, where
// sent_for_fee starts at the bucket's sent total and excess at its received
// total. Type-specific adjustments then strip out the semantically
// transferred principal - money that moved on the user's behalf is not a
// fee, and money that came back is not income.

use crate::activities::{Activity, SwapActivity, TransactionActivity};
use crate::constants::{op, OUR_FEE_PAYLOAD_BOC, TON_DECIMALS};
use crate::tokens::{jetton_decimals, to_decimal, MetadataMap};
use crate::trace::TraceBucket;
use crate::util::parse_opcode;

use crate::actions::types::{
    ActionKind, CallContractDetails, DexDepositLiquidityDetails, JettonTransferDetails,
    SwapDetails,
};
use crate::actions::RawAction;

/// Read-only context for one reconciliation pass
pub struct ReconcileContext<'a> {
    /// All actions of the trace; swaps scan them for the protocol fee skim
    pub trace_actions: &'a [RawAction],
    pub metadata: &'a MetadataMap,
}

/// Reconciler output: the activity with its fee resolved, plus the
/// intermediate values the excess aggregator consumes.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityDetailsResult {
    pub activity: Activity,
    pub sent_for_fee: u128,
    pub excess: u128,
}

/// Find the bucket implementing an action: the one whose hash set
/// intersects the action's transaction hashes. The first match wins;
/// overlapping matches would be upstream data corruption.
pub fn find_bucket<'a>(buckets: &'a [TraceBucket], action: &RawAction) -> Option<&'a TraceBucket> {
    let action_hashes = action.transaction_hashes();
    buckets
        .iter()
        .find(|bucket| bucket.hashes.iter().any(|hash| action_hashes.contains(hash.as_str())))
}

/// Resolve the real fee of one classified activity from its trace bucket
pub fn reconcile_activity(
    activity: Activity,
    action: &RawAction,
    bucket: &TraceBucket,
    ctx: &ReconcileContext,
) -> ActivityDetailsResult {
    let network_fee = bucket.network_fee as i128;
    let mut sent_for_fee = bucket.sent as i128;
    let mut excess = bucket.received as i128;
    // Liquidity operations display one action as several related activities;
    // the fee (and the leftover excess) is split evenly across them
    let mut split = 1;

    match &action.kind {
        ActionKind::TonTransfer(details) => {
            sent_for_fee -= details.value as i128;
        }
        ActionKind::CallContract(details) => {
            sent_for_fee -= details.value as i128;
        }
        ActionKind::AuctionBid(details) => {
            sent_for_fee -= details.amount as i128;
        }
        ActionKind::NftTransfer(details) => {
            if details.is_purchase {
                if let Some(price) = details.price {
                    sent_for_fee -= price as i128;
                }
            }
        }
        ActionKind::StakeDeposit(details) => {
            sent_for_fee -= details.amount as i128;
        }
        ActionKind::StakeWithdrawal(details) => {
            excess -= details.amount as i128;
        }
        ActionKind::DexDepositLiquidity(details) => {
            if details.asset_1.is_none() {
                sent_for_fee -= details.amount_1.unwrap_or(0) as i128;
            } else if details.lp_tokens_minted.is_some() && details.asset_2.is_none() {
                sent_for_fee -= details.amount_2.unwrap_or(0) as i128;
            }
            split = deposit_activity_count(details) as i128;
        }
        ActionKind::DexWithdrawLiquidity(details) => {
            if details.asset_1.is_none() {
                excess -= details.amount_1 as i128;
            } else if details.asset_2.is_none() {
                excess -= details.amount_2 as i128;
            }
            split = 2;
        }
        ActionKind::JettonSwap(details) => {
            if details.asset_in.is_none() {
                // TON -> token: the swapped-in TON is principal
                sent_for_fee -= details.dex_incoming_transfer.amount as i128;
            } else if details.asset_out.is_none() {
                // token -> TON: the swapped-out TON is proceeds, not excess
                excess -= details.dex_outgoing_transfer.amount as i128;
            }
        }
        // The attached TON of these kinds is all gas
        ActionKind::JettonTransfer(_)
        | ActionKind::JettonMint(_)
        | ActionKind::JettonBurn(_)
        | ActionKind::NftMint(_)
        | ActionKind::StakeWithdrawalRequest(_)
        | ActionKind::ChangeDns(_)
        | ActionKind::DeleteDns(_)
        | ActionKind::RenewDns(_)
        | ActionKind::ContractDeploy(_)
        | ActionKind::Unknown => {}
    }

    let real_fee = (network_fee + sent_for_fee - excess) / split;
    sent_for_fee /= split;
    excess /= split;

    log::debug!(
        "Fee for action {}: sent={} received={} network_fee={} real_fee={}",
        action.action_id,
        bucket.sent,
        bucket.received,
        bucket.network_fee,
        real_fee,
    );

    let activity = match activity {
        Activity::Transaction(tx) => Activity::Transaction(apply_transaction_fee(tx, real_fee)),
        Activity::Swap(swap) => Activity::Swap(apply_swap_fee(swap, real_fee, action, ctx)),
    };

    ActivityDetailsResult {
        activity,
        sent_for_fee: sent_for_fee.max(0) as u128,
        excess: excess.max(0) as u128,
    }
}

fn apply_transaction_fee(mut tx: TransactionActivity, real_fee: i128) -> TransactionActivity {
    tx.fee = real_fee;
    tx.should_load_details = false;
    tx
}

fn apply_swap_fee(
    mut swap: SwapActivity,
    real_fee: i128,
    action: &RawAction,
    ctx: &ReconcileContext,
) -> SwapActivity {
    swap.network_fee = to_decimal(real_fee.max(0) as u128, TON_DECIMALS);
    swap.should_load_details = false;

    if let ActionKind::JettonSwap(details) = &action.kind {
        if let Some((our_fee, decimals)) = find_swap_our_fee(details, ctx) {
            swap.our_fee = to_decimal(our_fee, decimals);
        }
    }

    swap
}

/// Locate the protocol fee skim among the sibling actions of a swap.
///
/// TON-denominated swaps pay it with a contract call carrying the our-fee
/// op code; token-denominated swaps pay it with a jetton transfer carrying
/// the our-fee forward payload. The returned value is denominated in the
/// input asset.
fn find_swap_our_fee(details: &SwapDetails, ctx: &ReconcileContext) -> Option<(u128, u8)> {
    if details.asset_in.is_none() {
        let value = ctx.trace_actions.iter().find_map(|action| match &action.kind {
            ActionKind::CallContract(CallContractDetails { opcode, value, .. })
                if opcode.as_deref().and_then(parse_opcode) == Some(op::OUR_FEE) =>
            {
                Some(*value)
            }
            _ => None,
        })?;
        Some((value, TON_DECIMALS))
    } else {
        let amount = ctx.trace_actions.iter().find_map(|action| match &action.kind {
            ActionKind::JettonTransfer(JettonTransferDetails { forward_payload, amount, .. })
                if forward_payload.as_deref() == Some(OUR_FEE_PAYLOAD_BOC) =>
            {
                Some(*amount)
            }
            _ => None,
        })?;
        let decimals = jetton_decimals(ctx.metadata, details.asset_in.as_deref()?);
        Some((amount, decimals))
    }
}

/// How many activities the classifier displays for one liquidity deposit
fn deposit_activity_count(details: &DexDepositLiquidityDetails) -> usize {
    if details.amount_2.is_some() {
        2
    } else {
        1
    }
}
