//! Append-only chain of records linked by SHA-256 hashes, each admitted after
//! a proof-of-work search for a digest with enough leading zero hex digits.
pub mod block;
pub mod chain;
pub mod constants;
pub mod error;
pub mod pow;
pub mod shared;

pub use block::{Block, BlockBuilder, BlockSummary};
pub use chain::{Chain, ChainConfig};
pub use error::{ChainError, IntegrityError};
pub use pow::MiningStrategy;
pub use shared::SharedChain;

pub type Hash = [u8; 32];
