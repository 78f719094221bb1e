// =============================================================================
// ACTIVITY DATA STRUCTURES
// =============================================================================

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Semantic subtype of a transaction activity.
///
/// `None` on the activity means a plain transfer; everything else changes
/// how the wallet titles and renders the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TransactionType {
    Stake,
    Unstake,
    UnstakeRequest,
    CallContract,
    Excess,
    ContractDeploy,
    Bounced,
    Mint,
    Burn,
    AuctionBid,
    NftTrade,
    DnsChangeAddress,
    DnsChangeSite,
    DnsChangeSubdomains,
    DnsChangeStorage,
    DnsDelete,
    DnsRenew,
    LiquidityDeposit,
    LiquidityWithdraw,
}

/// DEX label shown next to swap and liquidity activities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DexLabel {
    Dedust,
    Ston,
}

/// Display-ready NFT attached to an activity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiNft {
    pub index: Option<u64>,
    pub name: Option<String>,
    pub address: String,
    pub thumbnail: Option<String>,
    pub image: Option<String>,
    pub description: Option<String>,
    pub collection_address: Option<String>,
    pub collection_name: Option<String>,
    pub is_hidden: bool,
}

/// Extra per-type attributes that do not warrant their own variant
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ActivityExtra {
    pub dex: Option<DexLabel>,
    pub marketplace: Option<String>,
}

impl ActivityExtra {
    pub fn is_empty(&self) -> bool {
        self.dex.is_none() && self.marketplace.is_none()
    }
}

/// One non-swap activity: a transfer-shaped event from the wallet's
/// perspective. Amounts are in the asset's minimal units, negative when
/// outgoing. `fee` is provisional (0) until the trace details are loaded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionActivity {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub slug: String,
    pub amount: i128,
    pub from_address: String,
    pub to_address: String,
    /// Canonical counterparty address (sender when incoming, recipient
    /// when outgoing)
    pub normalized_address: String,
    pub is_incoming: bool,
    pub fee: i128,
    #[serde(rename = "type")]
    pub transaction_type: Option<TransactionType>,
    pub nft: Option<ApiNft>,
    pub comment: Option<String>,
    pub encrypted_comment: Option<String>,
    /// Protocol noise the wallet should not display
    pub should_hide: bool,
    /// Accurate fee requires trace-wide aggregation; resolved lazily
    pub should_load_details: bool,
    pub extra: Option<ActivityExtra>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SwapStatus {
    Completed,
    Failed,
}

/// A DEX swap. Amounts are pre-rendered decimal strings because the two
/// sides use different decimal counts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwapActivity {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub from: String,
    pub from_amount: String,
    pub to: String,
    pub to_amount: String,
    pub network_fee: String,
    /// Protocol fee skimmed by the wallet vendor, in the input asset
    pub our_fee: String,
    pub status: SwapStatus,
    pub should_load_details: bool,
}

/// The union the rest of the wallet consumes
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Activity {
    Transaction(TransactionActivity),
    Swap(SwapActivity),
}

impl Activity {
    pub fn id(&self) -> &str {
        match self {
            Activity::Transaction(tx) => &tx.id,
            Activity::Swap(swap) => &swap.id,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Activity::Transaction(tx) => tx.timestamp,
            Activity::Swap(swap) => swap.timestamp,
        }
    }

    pub fn should_load_details(&self) -> bool {
        match self {
            Activity::Transaction(tx) => tx.should_load_details,
            Activity::Swap(swap) => swap.should_load_details,
        }
    }

    pub fn as_transaction(&self) -> Option<&TransactionActivity> {
        match self {
            Activity::Transaction(tx) => Some(tx),
            Activity::Swap(_) => None,
        }
    }

    pub fn as_swap(&self) -> Option<&SwapActivity> {
        match self {
            Activity::Transaction(_) => None,
            Activity::Swap(swap) => Some(swap),
        }
    }
}
