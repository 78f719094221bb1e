// =============================================================================
// RAW ACTION DATA STRUCTURES
// =============================================================================
//
// One coarse, already-partially-interpreted operation as reported by the
// indexer. The `type` tag plus kind-specific `details` payload deserialize
// into the closed `ActionKind` sum type; kinds this build does not know
// about land in `Unknown` and are skipped by the classifier, because the
// indexer schema grows faster than wallet releases.

use std::collections::HashSet;

use serde::Deserialize;

use crate::util::{serde_amount, serde_amount_opt, serde_lt, serde_lt_opt};

/// One raw action of a trace
#[derive(Debug, Clone, Deserialize)]
pub struct RawAction {
    pub trace_id: String,
    pub action_id: String,
    #[serde(with = "serde_lt")]
    pub start_lt: u64,
    #[serde(with = "serde_lt")]
    pub end_lt: u64,
    #[serde(default)]
    pub start_utime: i64,
    #[serde(default)]
    pub end_utime: i64,
    /// Hashes of the ledger transactions implementing this action
    #[serde(default)]
    pub transactions: Vec<String>,
    #[serde(default = "default_true")]
    pub success: bool,
    #[serde(default, with = "serde_lt_opt")]
    pub trace_end_lt: Option<u64>,
    #[serde(flatten)]
    pub kind: ActionKind,
}

fn default_true() -> bool {
    true
}

impl RawAction {
    /// Transaction hash set for bucket matching
    pub fn transaction_hashes(&self) -> HashSet<&str> {
        self.transactions.iter().map(String::as_str).collect()
    }
}

/// The closed union of action kinds this engine understands
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", content = "details", rename_all = "snake_case")]
pub enum ActionKind {
    TonTransfer(TonTransferDetails),
    CallContract(CallContractDetails),
    ContractDeploy(ContractDeployDetails),
    JettonTransfer(JettonTransferDetails),
    JettonMint(JettonMintDetails),
    JettonBurn(JettonBurnDetails),
    NftTransfer(NftTransferDetails),
    NftMint(NftMintDetails),
    StakeDeposit(StakeDepositDetails),
    StakeWithdrawal(StakeWithdrawalDetails),
    StakeWithdrawalRequest(StakeWithdrawalRequestDetails),
    JettonSwap(SwapDetails),
    ChangeDns(ChangeDnsDetails),
    DeleteDns(DeleteDnsDetails),
    RenewDns(RenewDnsDetails),
    AuctionBid(AuctionBidDetails),
    DexDepositLiquidity(DexDepositLiquidityDetails),
    DexWithdrawLiquidity(DexWithdrawLiquidityDetails),
    /// Forward-compatibility boundary: silently skipped by the classifier
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TonTransferDetails {
    pub source: String,
    pub destination: String,
    #[serde(with = "serde_amount")]
    pub value: u128,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub encrypted: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallContractDetails {
    #[serde(default)]
    pub opcode: Option<String>,
    pub source: String,
    pub destination: String,
    #[serde(with = "serde_amount")]
    pub value: u128,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContractDeployDetails {
    /// Absent when this is the wallet's own initial deployment
    #[serde(default)]
    pub source: Option<String>,
    pub destination: String,
    #[serde(default, with = "serde_amount_opt")]
    pub value: Option<u128>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JettonTransferDetails {
    pub asset: String,
    pub sender: String,
    pub receiver: String,
    #[serde(with = "serde_amount")]
    pub amount: u128,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub is_encrypted_comment: bool,
    #[serde(default)]
    pub forward_payload: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JettonMintDetails {
    pub asset: String,
    pub receiver: String,
    pub receiver_jetton_wallet: String,
    #[serde(with = "serde_amount")]
    pub amount: u128,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JettonBurnDetails {
    pub owner: String,
    pub owner_jetton_wallet: String,
    pub asset: String,
    #[serde(with = "serde_amount")]
    pub amount: u128,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NftTransferDetails {
    #[serde(default)]
    pub nft_collection: Option<String>,
    pub nft_item: String,
    #[serde(default)]
    pub nft_item_index: Option<String>,
    pub new_owner: String,
    #[serde(default)]
    pub old_owner: Option<String>,
    #[serde(default)]
    pub is_purchase: bool,
    #[serde(default, with = "serde_amount_opt")]
    pub price: Option<u128>,
    #[serde(default)]
    pub forward_payload: Option<String>,
    #[serde(default)]
    pub response_destination: Option<String>,
    #[serde(default)]
    pub marketplace: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NftMintDetails {
    pub owner: String,
    pub nft_item: String,
    #[serde(default)]
    pub nft_collection: Option<String>,
    #[serde(default)]
    pub nft_item_index: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StakeDepositDetails {
    #[serde(default)]
    pub provider: Option<String>,
    pub stake_holder: String,
    pub pool: String,
    #[serde(with = "serde_amount")]
    pub amount: u128,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StakeWithdrawalDetails {
    #[serde(default)]
    pub provider: Option<String>,
    pub stake_holder: String,
    /// Missing in old indexer data; falls back to the liquid pool
    #[serde(default)]
    pub pool: Option<String>,
    #[serde(with = "serde_amount")]
    pub amount: u128,
    #[serde(default)]
    pub payout_nft: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StakeWithdrawalRequestDetails {
    #[serde(default)]
    pub provider: Option<String>,
    pub stake_holder: String,
    pub pool: String,
    #[serde(default)]
    pub payout_nft: Option<String>,
}

/// One leg of a DEX swap
#[derive(Debug, Clone, Deserialize)]
pub struct DexTransfer {
    #[serde(default)]
    pub asset: Option<String>,
    pub source: String,
    pub destination: String,
    #[serde(with = "serde_amount")]
    pub amount: u128,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SwapDetails {
    #[serde(default)]
    pub dex: Option<String>,
    pub sender: String,
    /// `None` means the input side is native TON
    #[serde(default)]
    pub asset_in: Option<String>,
    /// `None` means the output side is native TON
    #[serde(default)]
    pub asset_out: Option<String>,
    pub dex_incoming_transfer: DexTransfer,
    pub dex_outgoing_transfer: DexTransfer,
}

/// Discriminator of a DNS record value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum DnsSumType {
    SmcAddress,
    AdnlAddress,
    StorageAddress,
    NextResolver,
    Unknown,
}

impl From<String> for DnsSumType {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "DNSSmcAddress" => DnsSumType::SmcAddress,
            "DNSAdnlAddress" => DnsSumType::AdnlAddress,
            "DNSStorageAddress" => DnsSumType::StorageAddress,
            "DNSNextResolver" => DnsSumType::NextResolver,
            _ => DnsSumType::Unknown,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DnsRecordValue {
    pub sum_type: DnsSumType,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChangeDnsDetails {
    #[serde(default)]
    pub key: Option<String>,
    pub value: DnsRecordValue,
    pub source: String,
    pub asset: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeleteDnsDetails {
    pub hash: String,
    pub source: String,
    pub asset: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenewDnsDetails {
    pub source: String,
    pub asset: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuctionBidDetails {
    #[serde(with = "serde_amount")]
    pub amount: u128,
    pub bidder: String,
    pub auction: String,
    #[serde(default)]
    pub nft_item: Option<String>,
    #[serde(default)]
    pub nft_collection: Option<String>,
    #[serde(default)]
    pub nft_item_index: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DexDepositLiquidityDetails {
    #[serde(default)]
    pub dex: Option<String>,
    #[serde(default, with = "serde_amount_opt")]
    pub amount_1: Option<u128>,
    #[serde(default, with = "serde_amount_opt")]
    pub amount_2: Option<u128>,
    #[serde(default)]
    pub asset_1: Option<String>,
    #[serde(default)]
    pub asset_2: Option<String>,
    pub source: String,
    #[serde(default)]
    pub pool: Option<String>,
    #[serde(default)]
    pub destination_liquidity: Option<String>,
    #[serde(default, with = "serde_amount_opt")]
    pub lp_tokens_minted: Option<u128>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DexWithdrawLiquidityDetails {
    #[serde(default)]
    pub dex: Option<String>,
    #[serde(with = "serde_amount")]
    pub amount_1: u128,
    #[serde(with = "serde_amount")]
    pub amount_2: u128,
    #[serde(default)]
    pub asset_1: Option<String>,
    #[serde(default)]
    pub asset_2: Option<String>,
    pub source: String,
    pub pool: String,
}
