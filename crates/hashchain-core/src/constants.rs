pub const HASH_SIZE: usize = 32;
pub const HASH_HEX_SIZE: usize = HASH_SIZE * 2;
/// Each unit of difficulty is one leading `'0'` hex digit, so a SHA-256 digest caps it at 64.
pub const MAX_DIFFICULTY: u32 = HASH_HEX_SIZE as u32;
pub const DEFAULT_DIFFICULTY: u32 = 3;
pub const GENESIS_PAYLOAD: &str = "Genesis Block";
