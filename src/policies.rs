//! Ready-made [`DecodePolicy`](crate::protobuf::DecodePolicy) implementations.

mod collector;
mod fee;
mod selector;

pub use collector::{CapturedField, FieldCollector};
pub use fee::{FEE_AMOUNT_PATH, FEE_DENOM_PATH, Fee, FeeExtractor, GAS_LIMIT_PATH};
pub use selector::PathSelector;
