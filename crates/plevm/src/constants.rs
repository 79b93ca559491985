pub const WORD_SIZE: usize = 32;

pub const STACK_LIMIT: usize = 1024;

pub const MAX_CODE_SIZE: usize = 0x6000;
pub const MAX_INITCODE_SIZE: usize = 2 * MAX_CODE_SIZE;

pub const MEMORY_EXPANSION_QUOTIENT: u64 = 512;

/// Soft cap on how far memory may grow in a single frame. Offsets past this
/// point fail with `OutOfBounds` before any allocation happens.
pub const MEMORY_SIZE_LIMIT: usize = 16 * 1024 * 1024;

pub const LAST_AVAILABLE_BLOCK_LIMIT: u64 = 256;

pub const MAX_SWAP_DEPTH: usize = 16;
pub const MAX_DUP_DEPTH: usize = 16;

pub const EMPTY_CODE_HASH_STR: &str =
    "0xc5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470";
