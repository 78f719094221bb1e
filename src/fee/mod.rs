// Fee reconciliation: turning provisional per-activity fees into the real
// network fee the user actually paid, plus handling of leftover excess.

pub mod excess;
pub mod nft_batch;
pub mod reconciler;


pub use excess::aggregate_excess;
pub use nft_batch::calculate_nft_transfer_fee;
pub use reconciler::{find_bucket, reconcile_activity, ActivityDetailsResult, ReconcileContext};
