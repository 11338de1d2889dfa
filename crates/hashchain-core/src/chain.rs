use crate::{
    block::{Block, BlockSummary},
    constants::{DEFAULT_DIFFICULTY, GENESIS_PAYLOAD, MAX_DIFFICULTY},
    error::{ChainError, IntegrityError},
    pow::MiningStrategy,
};
use tracing::{debug, warn};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChainConfig {
    pub difficulty: u32,
    pub genesis_payload: Vec<u8>,
    pub strategy: MiningStrategy,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            difficulty: DEFAULT_DIFFICULTY,
            genesis_payload: GENESIS_PAYLOAD.as_bytes().to_vec(),
            strategy: MiningStrategy::Sequential,
        }
    }
}

/// Append-only sequence of mined blocks sharing one difficulty.
/// Always holds at least the genesis block.
#[derive(Clone, Debug)]
pub struct Chain {
    blocks: Vec<Block>,
    difficulty: u32,
    strategy: MiningStrategy,
}

impl Chain {
    pub fn new(difficulty: u32) -> Result<Self, ChainError> {
        Self::with_config(ChainConfig {
            difficulty,
            ..ChainConfig::default()
        })
    }

    pub fn with_config(config: ChainConfig) -> Result<Self, ChainError> {
        if config.difficulty > MAX_DIFFICULTY {
            return Err(ChainError::DifficultyOutOfRange {
                difficulty: config.difficulty,
                max: MAX_DIFFICULTY,
            });
        }
        let genesis = Block::builder(config.genesis_payload)
            .strategy(config.strategy)
            .mine(config.difficulty);
        debug!(difficulty = config.difficulty, hash = %genesis.hash_hex(), "created chain");
        Ok(Self {
            blocks: vec![genesis],
            difficulty: config.difficulty,
            strategy: config.strategy,
        })
    }

    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    pub fn strategy(&self) -> MiningStrategy {
        self.strategy
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn genesis(&self) -> &Block {
        &self.blocks[0]
    }

    pub fn tip(&self) -> &Block {
        &self.blocks[self.blocks.len() - 1]
    }

    pub fn get(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    pub fn summaries(&self) -> Vec<BlockSummary> {
        self.blocks
            .iter()
            .enumerate()
            .map(|(i, b)| b.summary(i))
            .collect()
    }

    /// Mines `payload` on top of the current tip and stores it.
    pub fn append(&mut self, payload: impl Into<Vec<u8>>) -> &Block {
        let block = Block::builder(payload)
            .prev_hash(Some(*self.tip().hash()))
            .strategy(self.strategy)
            .mine(self.difficulty);
        self.push(block)
    }

    /// Stores `block` only if it was mined on the current tip; otherwise hands it back.
    pub(crate) fn try_push(&mut self, block: Block) -> Result<&Block, Block> {
        if block.prev_hash() != Some(self.tip().hash()) {
            return Err(block);
        }
        Ok(self.push(block))
    }

    fn push(&mut self, block: Block) -> &Block {
        debug!(
            index = self.blocks.len(),
            nonce = block.nonce(),
            hash = %block.hash_hex(),
            "appended block"
        );
        self.blocks.push(block);
        self.tip()
    }

    /// `true` when every block after genesis links to its predecessor and
    /// carries the hash of its own contents.
    pub fn validate(&self) -> bool {
        self.verify().is_ok()
    }

    /// Same walk as [`Chain::validate`], reporting the first failure.
    /// Genesis is only checked as a predecessor.
    pub fn verify(&self) -> Result<(), IntegrityError> {
        for (i, pair) in self.blocks.windows(2).enumerate() {
            let index = i + 1;
            let (prev, curr) = (&pair[0], &pair[1]);
            if curr.prev_hash() != Some(prev.hash()) {
                return Err(report(IntegrityError::BrokenLink { index }));
            }
            if curr.compute_hash() != *curr.hash() {
                return Err(report(IntegrityError::HashMismatch { index }));
            }
        }
        Ok(())
    }

    /// Stricter than [`Chain::verify`]: genesis must have no parent, and every
    /// block, genesis included, must hash correctly and meet the chain difficulty.
    pub fn verify_strict(&self) -> Result<(), IntegrityError> {
        if self.genesis().prev_hash().is_some() {
            return Err(report(IntegrityError::GenesisHasParent));
        }
        self.verify()?;
        for (index, block) in self.blocks.iter().enumerate() {
            if block.compute_hash() != *block.hash() {
                return Err(report(IntegrityError::HashMismatch { index }));
            }
            if !block.meets_difficulty(self.difficulty) {
                return Err(report(IntegrityError::InsufficientWork {
                    index,
                    difficulty: self.difficulty,
                }));
            }
        }
        Ok(())
    }
}

fn report(err: IntegrityError) -> IntegrityError {
    warn!(index = err.index(), "chain integrity check failed: {err}");
    err
}
