use crate::{
    constants::{HASH_SIZE, MAX_DIFFICULTY},
    pow::{self, MiningStrategy},
    Hash,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::{
    borrow::Cow,
    time::{SystemTime, UNIX_EPOCH},
};
use tracing::debug;

/// A mined block. Only obtainable through [`BlockBuilder::mine`], so `hash`
/// always matches the other fields at construction time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Block {
    pub(crate) timestamp: u64,
    pub(crate) payload: Vec<u8>,
    pub(crate) prev_hash: Option<Hash>,
    pub(crate) hash: Hash,
    pub(crate) nonce: u64,
}

impl Block {
    /// Mines a block over `payload` on top of `prev_hash`, stamped with the current time.
    pub fn new(payload: impl Into<Vec<u8>>, prev_hash: Option<Hash>, difficulty: u32) -> Self {
        BlockBuilder::new(payload).prev_hash(prev_hash).mine(difficulty)
    }

    pub fn builder(payload: impl Into<Vec<u8>>) -> BlockBuilder {
        BlockBuilder::new(payload)
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn payload_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.payload)
    }

    /// `None` for a genesis block.
    pub fn prev_hash(&self) -> Option<&Hash> {
        self.prev_hash.as_ref()
    }

    pub fn hash(&self) -> &Hash {
        &self.hash
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn hash_hex(&self) -> String {
        hex::encode(self.hash)
    }

    /// Empty string when there is no previous block.
    pub fn prev_hash_hex(&self) -> String {
        self.prev_hash.map(hex::encode).unwrap_or_default()
    }

    /// Hashing preimage: prev hash, payload, decimal timestamp, decimal nonce,
    /// concatenated with no delimiters.
    pub fn serialize(&self) -> Vec<u8> {
        let mut bytes = preimage_prefix(self.prev_hash.as_ref(), &self.payload, self.timestamp);
        bytes.extend_from_slice(self.nonce.to_string().as_bytes());
        bytes
    }

    /// Recomputes the digest from the stored fields, ignoring the stored hash.
    pub fn compute_hash(&self) -> Hash {
        pow::sha256(&self.serialize())
    }

    pub fn meets_difficulty(&self, difficulty: u32) -> bool {
        pow::meets_difficulty(&self.hash, difficulty)
    }

    pub fn summary(&self, index: usize) -> BlockSummary {
        BlockSummary {
            index,
            timestamp: self.timestamp,
            prev_hash: self.prev_hash_hex(),
            payload: self.payload_lossy().into_owned(),
            nonce: self.nonce,
            hash: self.hash_hex(),
        }
    }
}

/// Display-oriented copy of a block, hashes hex-encoded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockSummary {
    pub index: usize,
    pub timestamp: u64,
    pub prev_hash: String,
    pub payload: String,
    pub nonce: u64,
    pub hash: String,
}

/// Collects the fixed fields of a block before mining.
#[derive(Clone, Debug)]
pub struct BlockBuilder {
    payload: Vec<u8>,
    prev_hash: Option<Hash>,
    timestamp: Option<u64>,
    start_nonce: u64,
    strategy: MiningStrategy,
}

impl BlockBuilder {
    pub fn new(payload: impl Into<Vec<u8>>) -> Self {
        Self {
            payload: payload.into(),
            prev_hash: None,
            timestamp: None,
            start_nonce: 0,
            strategy: MiningStrategy::default(),
        }
    }

    pub fn prev_hash(mut self, prev_hash: Option<Hash>) -> Self {
        self.prev_hash = prev_hash;
        self
    }

    /// Pins the timestamp instead of reading the clock when mining starts.
    pub fn timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn start_nonce(mut self, nonce: u64) -> Self {
        self.start_nonce = nonce;
        self
    }

    pub fn strategy(mut self, strategy: MiningStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Runs the proof-of-work search and freezes the result into a [`Block`].
    ///
    /// # Panics
    ///
    /// If `difficulty` exceeds [`MAX_DIFFICULTY`]; no SHA-256 digest could satisfy it.
    pub fn mine(self, difficulty: u32) -> Block {
        assert!(
            difficulty <= MAX_DIFFICULTY,
            "difficulty {difficulty} exceeds {MAX_DIFFICULTY}"
        );
        let timestamp = self.timestamp.unwrap_or_else(unix_now);

        // Only the nonce varies per attempt, so hash the fixed prefix once.
        let base = Sha256::new_with_prefix(preimage_prefix(
            self.prev_hash.as_ref(),
            &self.payload,
            timestamp,
        ));
        let (nonce, hash) = self
            .strategy
            .search(self.start_nonce, difficulty, |nonce| {
                let mut hasher = base.clone();
                hasher.update(nonce.to_string().as_bytes());
                pow::finalize(hasher)
            })
            .expect("nonce space exhausted (practically impossible)");

        debug!(
            nonce,
            difficulty,
            hash = %hex::encode(hash),
            "mined block"
        );

        Block {
            timestamp,
            payload: self.payload,
            prev_hash: self.prev_hash,
            hash,
            nonce,
        }
    }
}

fn preimage_prefix(prev_hash: Option<&Hash>, payload: &[u8], timestamp: u64) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(HASH_SIZE + payload.len() + 20 + 20);
    if let Some(prev) = prev_hash {
        bytes.extend_from_slice(prev);
    }
    bytes.extend_from_slice(payload);
    bytes.extend_from_slice(timestamp.to_string().as_bytes());
    bytes
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
