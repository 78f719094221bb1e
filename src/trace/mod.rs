// Transaction tree parsing and per-action bucket aggregation

pub mod types;
pub mod walker;

pub use types::{
    build_transaction_index, parse_raw_transaction, MessageRecord, RawMessage, RawTransaction,
    TraceNode,
};
pub use walker::{walk_trace, TraceBucket, WalkResult};
