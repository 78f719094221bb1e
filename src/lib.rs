//! Trace-to-activity reconstruction and fee attribution for TON wallets.
//!
//! The indexing service reports coarse "actions" plus the raw transaction
//! tree of every trace. This crate turns that data into wallet-centric,
//! display-ready activities with an accurate network fee:
//! - `actions` classifies raw actions into typed activities
//! - `trace` walks the transaction tree into per-action buckets
//! - `fee` reconciles per-activity fees and folds leftover excess
//! - `engine` wires the full pipeline behind two entry points

pub mod actions;
pub mod activities;
pub mod address;
pub mod boc;
pub mod constants;
pub mod engine;
pub mod errors;
pub mod fee;
pub mod tokens;
pub mod trace;
pub mod util;
