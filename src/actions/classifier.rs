// Action classification
//
// Maps one coarse indexer action into zero, one or several typed activities,
// resolving direction (relative to the wallet) and semantic subtype from
// side-channel data: op codes, well-known counterparty addresses, payload
// markers and DNS record discriminators. Fees are left provisional here -
// accurate fee math needs trace-wide aggregation (see the fee module).

use chrono::{DateTime, Utc};

use crate::activities::id::{build_activity_id, build_additional_activity_id};
use crate::activities::{
    Activity, ActivityExtra, DexLabel, SwapActivity, SwapStatus, TransactionActivity,
    TransactionType,
};
use crate::address::{normalize_address, AddressBook, Network};
use crate::boc;
use crate::constants::{
    BURN_ADDRESS, ETHENA_STAKING_VAULT, EXCESS_OP_CODES, LIQUID_POOL, MYCOIN_STAKING_POOL, op,
    OUR_FEE_PAYLOAD_BOC, RAW_LIQUID_POOL_ADDRESS, STON_PTON_ADDRESS, TME_RENEW_HASH_SUFFIX,
    TONCOIN_SLUG, TON_DECIMALS, TSUSDE_TOKEN_ADDRESS, USDE_TOKEN_ADDRESS,
};
use crate::errors::EngineResult;
use crate::tokens::{build_token_slug, jetton_decimals, to_decimal, MetadataMap};
use crate::util::parse_opcode;

use super::nft::{is_hidden_collection, parse_nft};
use super::types::*;

/// Read-only lookups the classifier needs, injected per call
#[derive(Clone, Copy)]
pub struct ClassifyContext<'a> {
    pub network: Network,
    /// Canonical user-friendly address of the active wallet
    pub wallet_address: &'a str,
    pub address_book: &'a AddressBook,
    pub metadata: &'a MetadataMap,
}

/// Classify a batch of actions, skipping the ones that fail.
///
/// A failed action (usually a missing address-book entry) never aborts the
/// batch - the indexer is expected to ship a complete address book, so a
/// miss is logged as a caller bug and the action dropped.
pub fn classify_actions(actions: &[RawAction], ctx: &ClassifyContext) -> Vec<Activity> {
    let mut activities = Vec::new();
    for action in actions {
        match classify_action(action, ctx) {
            Ok(mut batch) => activities.append(&mut batch),
            Err(err) => {
                log::warn!("Skipping action {}: {}", action.action_id, err);
            }
        }
    }
    activities
}

/// Classify one action into its displayed activities.
///
/// Most kinds yield exactly one activity; liquidity operations yield one per
/// asset side, contract self-deployments and unrecognized kinds yield none.
pub fn classify_action(action: &RawAction, ctx: &ClassifyContext) -> EngineResult<Vec<Activity>> {
    let mut result = match &action.kind {
        ActionKind::TonTransfer(details) => {
            vec![Activity::Transaction(parse_ton_transfer(action, details, ctx)?)]
        }
        ActionKind::CallContract(details) => {
            vec![Activity::Transaction(parse_call_contract(action, details, ctx)?)]
        }
        ActionKind::ContractDeploy(details) => parse_contract_deploy(action, details, ctx)?
            .into_iter()
            .map(Activity::Transaction)
            .collect(),
        ActionKind::JettonTransfer(details) => {
            vec![Activity::Transaction(parse_jetton_transfer(action, details, ctx)?)]
        }
        ActionKind::JettonMint(details) => {
            vec![Activity::Transaction(parse_jetton_mint(action, details, ctx)?)]
        }
        ActionKind::JettonBurn(details) => {
            vec![Activity::Transaction(parse_jetton_burn(action, details, ctx)?)]
        }
        ActionKind::NftTransfer(details) => {
            vec![Activity::Transaction(parse_nft_transfer(action, details, ctx)?)]
        }
        ActionKind::NftMint(details) => {
            vec![Activity::Transaction(parse_nft_mint(action, details, ctx)?)]
        }
        ActionKind::StakeDeposit(details) => {
            vec![Activity::Transaction(parse_stake_deposit(action, details, ctx)?)]
        }
        ActionKind::StakeWithdrawal(details) => {
            vec![Activity::Transaction(parse_stake_withdrawal(action, details, ctx)?)]
        }
        ActionKind::StakeWithdrawalRequest(details) => vec![Activity::Transaction(
            parse_stake_withdrawal_request(action, details, ctx)?,
        )],
        ActionKind::JettonSwap(details) => {
            vec![Activity::Swap(parse_jetton_swap(action, details, ctx)?)]
        }
        ActionKind::ChangeDns(details) => {
            let subtype = match details.value.sum_type {
                DnsSumType::SmcAddress => Some(TransactionType::DnsChangeAddress),
                DnsSumType::AdnlAddress => Some(TransactionType::DnsChangeSite),
                DnsSumType::StorageAddress => Some(TransactionType::DnsChangeStorage),
                DnsSumType::NextResolver => Some(TransactionType::DnsChangeSubdomains),
                DnsSumType::Unknown => None,
            };
            vec![Activity::Transaction(parse_dns(
                action, &details.source, &details.asset, subtype, ctx,
            )?)]
        }
        ActionKind::DeleteDns(details) => {
            // A delete whose record hash is all-zero padded is a t.me renewal
            let subtype = if details.hash.ends_with(TME_RENEW_HASH_SUFFIX) {
                Some(TransactionType::DnsRenew)
            } else {
                Some(TransactionType::DnsDelete)
            };
            vec![Activity::Transaction(parse_dns(
                action, &details.source, &details.asset, subtype, ctx,
            )?)]
        }
        ActionKind::RenewDns(details) => vec![Activity::Transaction(parse_dns(
            action,
            &details.source,
            &details.asset,
            Some(TransactionType::DnsRenew),
            ctx,
        )?)],
        ActionKind::AuctionBid(details) => {
            vec![Activity::Transaction(parse_auction_bid(action, details, ctx)?)]
        }
        ActionKind::DexDepositLiquidity(details) => parse_liquidity_deposit(action, details, ctx)?
            .into_iter()
            .map(Activity::Transaction)
            .collect(),
        ActionKind::DexWithdrawLiquidity(details) => {
            parse_liquidity_withdraw(action, details, ctx)?
                .into_iter()
                .map(Activity::Transaction)
                .collect()
        }
        ActionKind::Unknown => {
            log::debug!("Unrecognized action kind in trace {}", action.trace_id);
            Vec::new()
        }
    };

    finalize(&mut result);
    Ok(result)
}

/// Common post-pass: hidden NFTs hide their activity, and every outgoing
/// transaction defers accurate fee computation to the trace details.
fn finalize(result: &mut [Activity]) {
    for activity in result {
        if let Activity::Transaction(tx) = activity {
            if tx.nft.as_ref().is_some_and(|nft| nft.is_hidden) {
                tx.should_hide = true;
            }
            if !tx.is_incoming && tx.transaction_type != Some(TransactionType::ContractDeploy) {
                tx.should_load_details = true;
            }
        }
    }
}

fn action_timestamp(unix_seconds: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(unix_seconds, 0).unwrap_or_default()
}

/// Build the direction-resolved skeleton shared by all transaction kinds
fn base_transaction(
    action: &RawAction,
    ctx: &ClassifyContext,
    raw_from: &str,
    raw_to: &str,
    amount: u128,
) -> EngineResult<TransactionActivity> {
    let from_address = ctx.address_book.canonical(raw_from)?.to_string();
    let to_address = ctx.address_book.canonical(raw_to)?.to_string();
    base_transaction_canonical(action, ctx, from_address, to_address, amount)
}

/// Same as [`base_transaction`] for already-canonical addresses
fn base_transaction_canonical(
    action: &RawAction,
    ctx: &ClassifyContext,
    from_address: String,
    to_address: String,
    amount: u128,
) -> EngineResult<TransactionActivity> {
    let is_incoming = to_address == ctx.wallet_address;
    let counterparty = if is_incoming { &from_address } else { &to_address };
    let normalized_address = normalize_address(counterparty, ctx.network)?;
    let amount = if is_incoming { amount as i128 } else { -(amount as i128) };

    Ok(TransactionActivity {
        id: build_activity_id(&action.trace_id, action.start_lt, &action.action_id),
        timestamp: action_timestamp(action.end_utime),
        slug: TONCOIN_SLUG.to_string(),
        amount,
        from_address,
        to_address,
        normalized_address,
        is_incoming,
        fee: 0, // resolved when details are loaded
        transaction_type: None,
        nft: None,
        comment: None,
        encrypted_comment: None,
        should_hide: false,
        should_load_details: false,
        extra: None,
    })
}

fn parse_ton_transfer(
    action: &RawAction,
    details: &TonTransferDetails,
    ctx: &ClassifyContext,
) -> EngineResult<TransactionActivity> {
    let mut tx = base_transaction(action, ctx, &details.source, &details.destination, details.value)?;
    if details.encrypted {
        tx.encrypted_comment = details.comment.clone();
    } else {
        tx.comment = details.comment.clone();
    }
    Ok(tx)
}

fn parse_call_contract(
    action: &RawAction,
    details: &CallContractDetails,
    ctx: &ClassifyContext,
) -> EngineResult<TransactionActivity> {
    let mut tx = base_transaction(action, ctx, &details.source, &details.destination, details.value)?;
    let opcode = details.opcode.as_deref().and_then(parse_opcode);

    tx.should_hide =
        !tx.is_incoming && matches!(opcode, Some(op::OUR_FEE) | Some(op::TELEITEM_OK));

    tx.transaction_type = match opcode {
        Some(code) if EXCESS_OP_CODES.contains(&code) => Some(TransactionType::Excess),
        Some(op::BOUNCED) => Some(TransactionType::Bounced),
        Some(op::UNSTAKE_REQUEST) | Some(op::CLAIM_REWARDS) => {
            Some(TransactionType::UnstakeRequest)
        }
        _ if tx.to_address != ctx.wallet_address => Some(TransactionType::CallContract),
        _ => None,
    };

    Ok(tx)
}

fn parse_contract_deploy(
    action: &RawAction,
    details: &ContractDeployDetails,
    ctx: &ClassifyContext,
) -> EngineResult<Option<TransactionActivity>> {
    // No source means the wallet deployed itself; that is not an activity
    let Some(source) = details.source.as_deref() else {
        return Ok(None);
    };

    // The deploy always occurs alongside another action that already carries
    // the value movement, so amount and fee are pinned to zero.
    let mut tx = base_transaction(action, ctx, source, &details.destination, 0)?;
    tx.transaction_type = Some(TransactionType::ContractDeploy);
    tx.fee = 0;
    Ok(Some(tx))
}

fn parse_jetton_transfer(
    action: &RawAction,
    details: &JettonTransferDetails,
    ctx: &ClassifyContext,
) -> EngineResult<TransactionActivity> {
    let mut tx = base_transaction(action, ctx, &details.sender, &details.receiver, details.amount)?;
    let token_address = ctx.address_book.canonical(&details.asset)?;
    tx.slug = build_token_slug("ton", token_address);

    tx.should_hide =
        !tx.is_incoming && details.forward_payload.as_deref() == Some(OUR_FEE_PAYLOAD_BOC);

    tx.transaction_type = if tx.to_address == BURN_ADDRESS {
        Some(TransactionType::Burn)
    } else if tx.to_address == MYCOIN_STAKING_POOL {
        Some(TransactionType::Stake)
    } else if tx.from_address == MYCOIN_STAKING_POOL {
        Some(TransactionType::Unstake)
    } else if token_address == USDE_TOKEN_ADDRESS {
        if tx.from_address == ETHENA_STAKING_VAULT {
            Some(TransactionType::Unstake)
        } else if tx.to_address == ETHENA_STAKING_VAULT {
            Some(TransactionType::Stake)
        } else {
            None
        }
    } else {
        None
    };

    if details.is_encrypted_comment {
        tx.encrypted_comment = details.comment.clone();
    } else {
        tx.comment = details.comment.clone();
    }

    Ok(tx)
}

fn parse_jetton_mint(
    action: &RawAction,
    details: &JettonMintDetails,
    ctx: &ClassifyContext,
) -> EngineResult<TransactionActivity> {
    let token_address = ctx.address_book.canonical(&details.asset)?.to_string();
    let slug = build_token_slug("ton", &token_address);

    // TODO Drop once the indexer stops reporting tsUSDe unstake requests
    // as mints (detectable by the mint not ending the trace)
    if token_address == TSUSDE_TOKEN_ADDRESS && action.trace_end_lt != Some(action.end_lt) {
        let mut tx = base_transaction(action, ctx, &details.receiver, &details.receiver, 0)?;
        tx.slug = slug;
        tx.to_address = ETHENA_STAKING_VAULT.to_string();
        tx.normalized_address = ETHENA_STAKING_VAULT.to_string();
        tx.is_incoming = false;
        tx.transaction_type = Some(TransactionType::UnstakeRequest);
        return Ok(tx);
    }

    let mut tx = base_transaction(
        action,
        ctx,
        &details.receiver_jetton_wallet,
        &details.receiver,
        details.amount,
    )?;
    tx.slug = slug;
    tx.transaction_type = Some(TransactionType::Mint);
    Ok(tx)
}

fn parse_jetton_burn(
    action: &RawAction,
    details: &JettonBurnDetails,
    ctx: &ClassifyContext,
) -> EngineResult<TransactionActivity> {
    let mut tx = base_transaction(
        action,
        ctx,
        &details.owner,
        &details.owner_jetton_wallet,
        details.amount,
    )?;
    tx.slug = build_token_slug("ton", &normalize_address(&details.asset, ctx.network)?);
    tx.transaction_type = Some(TransactionType::Burn);
    Ok(tx)
}

fn parse_nft_transfer(
    action: &RawAction,
    details: &NftTransferDetails,
    ctx: &ClassifyContext,
) -> EngineResult<TransactionActivity> {
    let nft = parse_nft(
        ctx.metadata,
        ctx.network,
        &details.nft_item,
        details.nft_collection.as_deref(),
        details.nft_item_index.as_deref(),
    );

    let mut should_hide = match (&nft, details.nft_collection.as_deref()) {
        (None, Some(collection)) => is_hidden_collection(ctx.metadata, collection),
        _ => false,
    };

    // Marketplace listings produce a duplicate transfer where the wallet is
    // only the response destination; hide those.
    if let (Some(old_owner), Some(_)) = (&details.old_owner, &details.response_destination) {
        let old_address = ctx.address_book.canonical(old_owner).ok();
        let new_address = ctx.address_book.canonical(&details.new_owner).ok();
        if old_address != Some(ctx.wallet_address) && new_address != Some(ctx.wallet_address) {
            should_hide = true;
        }
    }

    let raw_from = details.old_owner.as_deref().unwrap_or(&details.nft_item);
    let mut tx = base_transaction(action, ctx, raw_from, &details.new_owner, 0)?;
    tx.nft = nft;
    tx.should_hide = should_hide;
    tx.comment = details.forward_payload.as_deref().and_then(boc::read_comment);

    if tx.to_address == BURN_ADDRESS {
        tx.transaction_type = Some(TransactionType::Burn);
    } else if details.is_purchase {
        if let Some(price) = details.price {
            let is_buying = tx.to_address == ctx.wallet_address;
            tx.transaction_type = Some(TransactionType::NftTrade);
            tx.is_incoming = !is_buying;
            tx.amount = if is_buying { -(price as i128) } else { price as i128 };
            tx.extra = Some(ActivityExtra {
                dex: None,
                marketplace: details.marketplace.clone(),
            });
        }
    }

    Ok(tx)
}

fn parse_nft_mint(
    action: &RawAction,
    details: &NftMintDetails,
    ctx: &ClassifyContext,
) -> EngineResult<TransactionActivity> {
    let mut tx = base_transaction(action, ctx, &details.owner, &details.nft_item, 0)?;
    tx.nft = parse_nft(
        ctx.metadata,
        ctx.network,
        &details.nft_item,
        details.nft_collection.as_deref(),
        details.nft_item_index.as_deref(),
    );
    tx.transaction_type = Some(TransactionType::Mint);
    Ok(tx)
}

fn parse_stake_deposit(
    action: &RawAction,
    details: &StakeDepositDetails,
    ctx: &ClassifyContext,
) -> EngineResult<TransactionActivity> {
    let mut tx = base_transaction(action, ctx, &details.stake_holder, &details.pool, details.amount)?;
    tx.transaction_type = Some(TransactionType::Stake);
    Ok(tx)
}

fn parse_stake_withdrawal(
    action: &RawAction,
    details: &StakeWithdrawalDetails,
    ctx: &ClassifyContext,
) -> EngineResult<TransactionActivity> {
    // Old indexer data reports no pool for liquid withdrawals
    let pool_raw = details.pool.as_deref().unwrap_or(RAW_LIQUID_POOL_ADDRESS);
    let from_address = ctx
        .address_book
        .canonical(pool_raw)
        .unwrap_or(LIQUID_POOL)
        .to_string();
    let to_address = ctx.address_book.canonical(&details.stake_holder)?.to_string();

    let mut tx = base_transaction_canonical(action, ctx, from_address, to_address, details.amount)?;
    tx.transaction_type = Some(TransactionType::Unstake);
    tx.should_load_details =
        details.provider.as_deref() == Some("tonstakers") && details.payout_nft.is_none();
    Ok(tx)
}

fn parse_stake_withdrawal_request(
    action: &RawAction,
    details: &StakeWithdrawalRequestDetails,
    ctx: &ClassifyContext,
) -> EngineResult<TransactionActivity> {
    let mut tx = base_transaction(action, ctx, &details.stake_holder, &details.pool, 0)?;
    tx.transaction_type = Some(TransactionType::UnstakeRequest);
    Ok(tx)
}

fn parse_jetton_swap(
    action: &RawAction,
    details: &SwapDetails,
    ctx: &ClassifyContext,
) -> EngineResult<SwapActivity> {
    let from_asset = details.dex_incoming_transfer.asset.as_deref();
    let to_asset = details.dex_outgoing_transfer.asset.as_deref();

    let decimals_from = from_asset
        .map(|asset| jetton_decimals(ctx.metadata, asset))
        .unwrap_or(TON_DECIMALS);
    let decimals_to = to_asset
        .map(|asset| jetton_decimals(ctx.metadata, asset))
        .unwrap_or(TON_DECIMALS);

    Ok(SwapActivity {
        id: build_activity_id(&action.trace_id, action.start_lt, &action.action_id),
        timestamp: action_timestamp(action.end_utime),
        from: swap_asset_slug(from_asset, ctx)?,
        from_amount: to_decimal(details.dex_incoming_transfer.amount, decimals_from),
        to: swap_asset_slug(to_asset, ctx)?,
        to_amount: to_decimal(details.dex_outgoing_transfer.amount, decimals_to),
        network_fee: "0".to_string(),
        our_fee: "0".to_string(),
        status: if action.success { SwapStatus::Completed } else { SwapStatus::Failed },
        should_load_details: true,
    })
}

/// Slug of one swap side; the STON.fi proxy-TON wrapper counts as TON
fn swap_asset_slug(raw_asset: Option<&str>, ctx: &ClassifyContext) -> EngineResult<String> {
    match raw_asset {
        None => Ok(TONCOIN_SLUG.to_string()),
        Some(raw) => {
            let token_address = normalize_address(raw, ctx.network)?;
            if token_address == STON_PTON_ADDRESS {
                Ok(TONCOIN_SLUG.to_string())
            } else {
                Ok(build_token_slug("ton", &token_address))
            }
        }
    }
}

fn parse_dns(
    action: &RawAction,
    raw_source: &str,
    raw_asset: &str,
    subtype: Option<TransactionType>,
    ctx: &ClassifyContext,
) -> EngineResult<TransactionActivity> {
    let mut tx = base_transaction(action, ctx, raw_source, raw_asset, 0)?;
    tx.nft = parse_nft(ctx.metadata, ctx.network, raw_asset, None, None);
    tx.transaction_type = subtype;
    Ok(tx)
}

fn parse_auction_bid(
    action: &RawAction,
    details: &AuctionBidDetails,
    ctx: &ClassifyContext,
) -> EngineResult<TransactionActivity> {
    let mut tx = base_transaction(action, ctx, &details.bidder, &details.auction, details.amount)?;
    tx.transaction_type = Some(TransactionType::AuctionBid);
    if let Some(nft_item) = details.nft_item.as_deref() {
        tx.nft = parse_nft(
            ctx.metadata,
            ctx.network,
            nft_item,
            details.nft_collection.as_deref(),
            details.nft_item_index.as_deref(),
        );
    }
    Ok(tx)
}

fn parse_liquidity_deposit(
    action: &RawAction,
    details: &DexDepositLiquidityDetails,
    ctx: &ClassifyContext,
) -> EngineResult<Vec<TransactionActivity>> {
    let raw_to = details
        .pool
        .as_deref()
        .or(details.destination_liquidity.as_deref())
        .unwrap_or(&details.source);
    let common = base_transaction(action, ctx, &details.source, raw_to, 0)?;
    let dex = convert_dex_label(details.dex.as_deref());

    let mut first = common.clone();
    first.transaction_type = Some(TransactionType::LiquidityDeposit);
    first.extra = Some(ActivityExtra { dex, marketplace: None });
    first.amount = -(details.amount_1.unwrap_or(0) as i128);
    first.slug = asset_slug(details.asset_1.as_deref(), ctx)?;

    let mut activities = vec![first];

    if let Some(amount_2) = details.amount_2 {
        let mut second = common;
        second.id = build_additional_activity_id(&action.trace_id, action.start_lt, &action.action_id);
        second.transaction_type = Some(TransactionType::LiquidityDeposit);
        second.extra = Some(ActivityExtra { dex, marketplace: None });
        second.amount = -(amount_2 as i128);
        second.slug = asset_slug(details.asset_2.as_deref(), ctx)?;
        activities.push(second);
    }

    Ok(activities)
}

fn parse_liquidity_withdraw(
    action: &RawAction,
    details: &DexWithdrawLiquidityDetails,
    ctx: &ClassifyContext,
) -> EngineResult<Vec<TransactionActivity>> {
    let common = base_transaction(action, ctx, &details.pool, &details.source, 0)?;
    let dex = convert_dex_label(details.dex.as_deref());

    let mut first = common.clone();
    first.transaction_type = Some(TransactionType::LiquidityWithdraw);
    first.extra = Some(ActivityExtra { dex, marketplace: None });
    first.should_load_details = true;
    first.amount = details.amount_1 as i128;
    first.slug = asset_slug(details.asset_1.as_deref(), ctx)?;

    let mut second = common;
    second.id = build_additional_activity_id(&action.trace_id, action.start_lt, &action.action_id);
    second.transaction_type = Some(TransactionType::LiquidityWithdraw);
    second.extra = Some(ActivityExtra { dex, marketplace: None });
    second.should_load_details = true;
    second.amount = details.amount_2 as i128;
    second.slug = asset_slug(details.asset_2.as_deref(), ctx)?;

    Ok(vec![first, second])
}

/// Slug of a liquidity side: no asset means native TON
fn asset_slug(raw_asset: Option<&str>, ctx: &ClassifyContext) -> EngineResult<String> {
    match raw_asset {
        None => Ok(TONCOIN_SLUG.to_string()),
        Some(raw) => Ok(build_token_slug("ton", ctx.address_book.canonical(raw)?)),
    }
}

fn convert_dex_label(dex: Option<&str>) -> Option<DexLabel> {
    match dex {
        Some("dedust") => Some(DexLabel::Dedust),
        Some("stonfi") | Some("stonfi_v2") => Some(DexLabel::Ston),
        _ => None,
    }
}
