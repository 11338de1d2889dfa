use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChainError {
    #[error("difficulty {difficulty} is out of range (max {max})")]
    DifficultyOutOfRange { difficulty: u32, max: u32 },
}

/// First integrity violation found while walking a chain.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IntegrityError {
    #[error("block {index}: previous hash does not match its predecessor")]
    BrokenLink { index: usize },
    #[error("block {index}: stored hash does not match its contents")]
    HashMismatch { index: usize },
    #[error("block {index}: hash does not meet difficulty {difficulty}")]
    InsufficientWork { index: usize, difficulty: u32 },
    #[error("genesis block has a previous hash")]
    GenesisHasParent,
}

impl IntegrityError {
    /// Index of the offending block.
    pub fn index(&self) -> usize {
        match self {
            IntegrityError::BrokenLink { index }
            | IntegrityError::HashMismatch { index }
            | IntegrityError::InsufficientWork { index, .. } => *index,
            IntegrityError::GenesisHasParent => 0,
        }
    }
}
