//! protoscan extracts values from [Protocol Buffers][protobuf] messages
//! without a schema.
//!
//! Many systems only need a handful of values from large encoded messages.
//! Blockchain indexers for example receive transactions as encoded `Tx`
//! messages and want only the fee, but generating and maintaining bindings
//! for every message type they might encounter is a lot of work. protoscan
//! instead walks the encoded fields directly and lets a policy pick out the
//! values of interest by their position in the message tree.
//!
//! # Usage
//!
//! To extract the fee from a Cosmos SDK transaction:
//!
//! ```
//! use protoscan::policies::FeeExtractor;
//! use protoscan::protobuf::parse;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! # let tx_bytes: Vec<u8> = vec![0x12, 0x11, 0x12, 0x0f, 0x0a, 0x0d, 0x0a, 0x05,
//! #     b'u', b'a', b't', b'o', b'm', 0x12, 0x04, b'5', b'0', b'0', b'0'];
//! let mut extractor = FeeExtractor::new();
//! parse(&tx_bytes, &mut extractor)?;
//!
//! if let Some(fee) = extractor.fee() {
//!     println!("Fee: {} {}", fee.amount, fee.denom);
//! }
//! # Ok(()) }
//! ```
//!
//! To extract arbitrary fields, use a [`FieldCollector`](policies::FieldCollector)
//! with a [`PathSelector`](policies::PathSelector), or implement
//! [`DecodePolicy`](protobuf::DecodePolicy). See the [`protobuf`] module
//! for details of how messages are walked.
//!
//! ## Threading
//!
//! Each message is decoded on a single thread. [`batch::parse_batch`] decodes
//! many messages in parallel using a Rayon thread pool, which is sized to
//! match the number of physical cores. See [`threading::thread_pool`].
//!
//! ## Logging
//!
//! Parse failures, parse completion and batch summaries are reported as
//! [tracing](https://docs.rs/tracing) events at the `debug` level, and
//! decisions for individual length-delimited fields at the `trace` level.
//!
//! # Crate features
//!
//! - `serde` - Implement `Serialize` for [`policies::Fee`] and
//!   [`protobuf::WireType`].
//!
//! [protobuf]: https://protobuf.dev/

// This crate parses untrusted input, so it is preferable to avoid unsafe code.
#![forbid(unsafe_code)]

pub mod batch;
pub mod policies;
pub mod protobuf;
pub mod threading;
