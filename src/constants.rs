/// Global constants used across the trace engine
///
/// This module contains protocol-level constants that are not configurable
/// and are used across multiple modules.

// ============================================================================
// TON BLOCKCHAIN CONSTANTS
// ============================================================================

/// Display slug of the native coin
pub const TONCOIN_SLUG: &str = "toncoin";

/// Number of decimal places for the native coin
pub const TON_DECIMALS: u8 = 9;

/// Nanotons per TON (10^9)
pub const NANOTONS_PER_TON: u128 = 1_000_000_000;

// ============================================================================
// WELL-KNOWN ADDRESSES
// ============================================================================

/// The conventional burn/void address (workchain 0, all-zero hash)
pub const BURN_ADDRESS: &str = "UQAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAJKZ";

/// STON.fi proxy-TON wrapper; swaps through it are displayed as plain TON
pub const STON_PTON_ADDRESS: &str = "EQCM3B12QK1e4yZSf8GtBRT0aLMNyEsBc_DhVfRRtOEffLez";

/// Tonstakers liquid staking pool
pub const LIQUID_POOL: &str = "EQCkWxfyhAkim3g2DjKQQg8T5P4g-Q1-K_jErGcDJZ4i-vqR";

/// Raw form of [`LIQUID_POOL`], as referenced by old indexer data
pub const RAW_LIQUID_POOL_ADDRESS: &str =
    "0:A45B17F28409229B78360E3290420F13E4FE20F90D7E2BF8C4AC6703259E22FA";

/// MY coin staking pool; jetton transfers to/from it are stake/unstake
pub const MYCOIN_STAKING_POOL: &str = "EQCbOjwru5tBb2aaXZEHbiTCVIYQ6yDNAe8SSZkP4CozibHM";

/// Ethena USDe staking vault
pub const ETHENA_STAKING_VAULT: &str = "EQBcW3dlEyHAwEpQYwOLRotlQ-zR_r4bJOS5QTVr6W7FNYly";

/// USDe jetton master
pub const USDE_TOKEN_ADDRESS: &str = "EQAIb6KmdfdDR7CN1GBqVJuP25iCnLKCvBlJ07Evuu2dzP5f";

/// Staked USDe (tsUSDe) jetton master
pub const TSUSDE_TOKEN_ADDRESS: &str = "EQB7MfZPQzpyyrKu53qGeFl5D64sSUwB7ktLFtalAH3BNSmB";

// ============================================================================
// OP CODES
// ============================================================================

/// Message operation codes recognized by the classifier
pub mod op {
    /// Plain-text comment prefix
    pub const COMMENT: u32 = 0;
    /// Encrypted comment prefix
    pub const ENCRYPTED_COMMENT: u32 = 0x2167_da4b;
    /// Protocol fee skim sent by the wallet vendor contract
    pub const OUR_FEE: u32 = 0x4d23_8543;
    /// Marker of a bounced message body
    pub const BOUNCED: u32 = 0xffff_ffff;
    /// Jetton wallet excess-return notification
    pub const JETTON_EXCESSES: u32 = 0xd532_76db;
    /// Teleitem OK response (auction/gift contracts)
    pub const TELEITEM_OK: u32 = 0xa37a_0983;
    /// Jetton staking unstake request
    pub const UNSTAKE_REQUEST: u32 = 0x499a_9262;
    /// Jetton staking reward claim
    pub const CLAIM_REWARDS: u32 = 0x78d9_f109;
}

/// Op codes whose incoming messages are overpayment refunds, not income
pub const EXCESS_OP_CODES: [u32; 2] = [op::JETTON_EXCESSES, op::TELEITEM_OK];

/// Serialized forward payload attached to jetton transfers that carry the
/// protocol fee (a bare cell holding [`op::OUR_FEE`])
pub const OUR_FEE_PAYLOAD_BOC: &str = "te6cckEBAQEABgAACE0jhUPUcYAL";

/// A `delete_dns` whose record hash ends with this suffix is actually a
/// t.me domain renewal
pub const TME_RENEW_HASH_SUFFIX: &str = "0000000000000000000000000000000000000000000000";

// ============================================================================
// NFT TRANSFER GAS
// ============================================================================

/// TON attached to each NFT during a transfer
pub const NFT_TRANSFER_AMOUNT: u128 = 100_000_000; // 0.1 TON

/// Approximate TON actually consumed per transferred NFT
pub const NFT_TRANSFER_REAL_AMOUNT: u128 = 5_000_000; // 0.005 TON

/// How many NFTs fit in one multi-transaction batch
pub const NFT_BATCH_SIZE: usize = 4;
