use crate::Hash;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// How the nonce space is walked while mining.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MiningStrategy {
    /// One nonce at a time on the calling thread.
    #[default]
    Sequential,
    /// Nonces are split across the rayon pool. Still yields the lowest winning nonce.
    Parallel,
}

impl MiningStrategy {
    pub fn search<F>(self, start: u64, difficulty: u32, hash_fn: F) -> Option<(u64, Hash)>
    where
        F: Fn(u64) -> Hash + Sync + Send,
    {
        match self {
            MiningStrategy::Sequential => find_valid_nonce(start, difficulty, hash_fn),
            MiningStrategy::Parallel => find_valid_nonce_parallel(start, difficulty, hash_fn),
        }
    }
}

pub fn sha256(bytes: &[u8]) -> Hash {
    finalize(Sha256::new_with_prefix(bytes))
}

pub(crate) fn finalize(hasher: Sha256) -> Hash {
    let digest = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest[..]);
    out
}

/// Number of leading `'0'` characters in the lowercase hex rendering of `hash`.
pub fn count_leading_zero_nibbles(hash: &Hash) -> u32 {
    let mut total = 0u32;
    for b in hash {
        if *b == 0 {
            total += 2;
        } else {
            if *b < 0x10 {
                total += 1;
            }
            break;
        }
    }
    total
}

pub fn meets_difficulty(hash: &Hash, difficulty: u32) -> bool {
    count_leading_zero_nibbles(hash) >= difficulty
}

/// Tries nonces `start, start + 1, ...` until `hash_fn(nonce)` has at least
/// `difficulty` leading zero hex digits. Returns the winning nonce and its hash,
/// or `None` once the nonce space is exhausted.
pub fn find_valid_nonce<F>(start: u64, difficulty: u32, hash_fn: F) -> Option<(u64, Hash)>
where
    F: Fn(u64) -> Hash,
{
    (start..u64::MAX)
        .map(|nonce| (nonce, hash_fn(nonce)))
        .find(|(_, hash)| meets_difficulty(hash, difficulty))
}

/// Parallel counterpart of [`find_valid_nonce`]. `find_first` keeps the result
/// identical to the sequential search: the lowest qualifying nonce wins.
pub fn find_valid_nonce_parallel<F>(start: u64, difficulty: u32, hash_fn: F) -> Option<(u64, Hash)>
where
    F: Fn(u64) -> Hash + Sync + Send,
{
    (start..u64::MAX)
        .into_par_iter()
        .map(|nonce| (nonce, hash_fn(nonce)))
        .find_first(|(_, hash)| meets_difficulty(hash, difficulty))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hash_of(prefix: &str) -> impl Fn(u64) -> Hash + Sync + Send + '_ {
        move |nonce| sha256(format!("{prefix}{nonce}").as_bytes())
    }

    #[test]
    fn leading_zero_nibbles_examples() {
        let mut h = [0u8; 32];
        assert_eq!(count_leading_zero_nibbles(&h), 64);
        h[0] = 0x0F; // "0f"
        assert_eq!(count_leading_zero_nibbles(&h), 1);
        h[0] = 0x10; // "10"
        assert_eq!(count_leading_zero_nibbles(&h), 0);
        h = [0u8; 32];
        h[1] = 0x80; // "0080"
        assert_eq!(count_leading_zero_nibbles(&h), 2);
        h[1] = 0x04; // "0004"
        assert_eq!(count_leading_zero_nibbles(&h), 3);
    }

    #[test]
    fn nibble_count_matches_hex_rendering() {
        for i in 0u64..200 {
            let h = sha256(&i.to_le_bytes());
            let hex = hex::encode(h);
            let zeros = hex.chars().take_while(|c| *c == '0').count() as u32;
            assert_eq!(count_leading_zero_nibbles(&h), zeros);
        }
    }

    #[test]
    fn sha256_known_vector() {
        assert_eq!(
            hex::encode(sha256(b"abc")),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn difficulty_zero_accepts_first_nonce() {
        let (nonce, _) = find_valid_nonce(0, 0, hash_of("anything")).unwrap();
        assert_eq!(nonce, 0);
        let (nonce, _) = find_valid_nonce(17, 0, hash_of("anything")).unwrap();
        assert_eq!(nonce, 17);
    }

    #[test]
    fn search_finds_lowest_winning_nonce() {
        let hash_fn = hash_of("Genesis Block1600000000");
        let (nonce, hash) = find_valid_nonce(0, 2, &hash_fn).unwrap();
        assert_eq!(nonce, 302);
        assert!(hex::encode(hash).starts_with("00"));
        for earlier in 0..nonce {
            assert!(!meets_difficulty(&hash_fn(earlier), 2));
        }
    }

    #[test]
    fn parallel_agrees_with_sequential() {
        for difficulty in 0..=3 {
            let hash_fn = hash_of("payload-");
            let seq = find_valid_nonce(0, difficulty, &hash_fn);
            let par = find_valid_nonce_parallel(0, difficulty, &hash_fn);
            assert_eq!(seq, par, "difficulty {difficulty}");
        }
    }

    #[test]
    fn strategy_dispatch() {
        let seq = MiningStrategy::Sequential.search(5, 1, hash_of("x"));
        let par = MiningStrategy::Parallel.search(5, 1, hash_of("x"));
        assert_eq!(seq, par);
        assert!(seq.unwrap().0 >= 5);
        assert_eq!(MiningStrategy::default(), MiningStrategy::Sequential);
    }
}
