// Wallet-facing activity records and their identifiers

pub mod id;
pub mod types;

pub use id::{
    build_activity_id, build_tx_id, parse_action_sub_id, parse_activity_id, ParsedActivityId,
};
pub use types::{
    Activity, ActivityExtra, ApiNft, DexLabel, SwapActivity, SwapStatus, TransactionActivity,
    TransactionType,
};
