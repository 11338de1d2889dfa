use crate::{block::Block, chain::Chain, error::IntegrityError};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::trace;

/// Clonable handle for appending to one [`Chain`] from several threads.
///
/// Mining runs with no lock held; only the final tip check and push happen
/// under the write lock. A block mined against a tip that moved in the
/// meantime is re-mined on the new tip.
#[derive(Clone, Debug)]
pub struct SharedChain {
    inner: Arc<RwLock<Chain>>,
}

impl SharedChain {
    pub fn new(chain: Chain) -> Self {
        Self {
            inner: Arc::new(RwLock::new(chain)),
        }
    }

    /// Returns a copy of the stored block.
    pub fn append(&self, payload: impl Into<Vec<u8>>) -> Block {
        let payload = payload.into();
        loop {
            let (prev_hash, difficulty, strategy) = {
                let chain = self.inner.read();
                (*chain.tip().hash(), chain.difficulty(), chain.strategy())
            };

            let candidate = Block::builder(payload.clone())
                .prev_hash(Some(prev_hash))
                .strategy(strategy)
                .mine(difficulty);

            match self.inner.write().try_push(candidate) {
                Ok(block) => return block.clone(),
                Err(_) => trace!("tip moved while mining, retrying"),
            }
        }
    }

    pub fn validate(&self) -> bool {
        self.inner.read().validate()
    }

    pub fn verify(&self) -> Result<(), IntegrityError> {
        self.inner.read().verify()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn snapshot(&self) -> Chain {
        self.inner.read().clone()
    }

    /// Unwraps the chain if this is the last handle.
    pub fn into_inner(self) -> Result<Chain, Self> {
        Arc::try_unwrap(self.inner)
            .map(|lock| lock.into_inner())
            .map_err(|inner| Self { inner })
    }
}

impl From<Chain> for SharedChain {
    fn from(chain: Chain) -> Self {
        Self::new(chain)
    }
}
