//! Run-to-run stable hashing.
//!
//! Intrinsic ids and rig ids are derived from content, so they must not depend
//! on process state (random seeds, addresses). Everything here is SHA-256
//! truncated to 32 bits.

use std::path::Path;

use sha2::{Digest, Sha256};

/// Incremental hasher with explicit, endianness-fixed field encoding.
#[derive(Clone, Default)]
pub struct StableHasher {
    inner: Sha256,
}

impl StableHasher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Length-prefixed so that `("ab", "c")` and `("a", "bc")` differ.
    pub fn write_str(&mut self, value: &str) {
        self.write_u64(value.len() as u64);
        self.inner.update(value.as_bytes());
    }

    pub fn write_u32(&mut self, value: u32) {
        self.inner.update(value.to_le_bytes());
    }

    pub fn write_u64(&mut self, value: u64) {
        self.inner.update(value.to_le_bytes());
    }

    /// `-0.0` is folded onto `0.0`; every other value hashes by bit pattern.
    pub fn write_f64(&mut self, value: f64) {
        let value = if value == 0.0 { 0.0 } else { value };
        self.inner.update(value.to_bits().to_le_bytes());
    }

    pub fn finish_u32(self) -> u32 {
        let digest = self.inner.finalize();
        u32::from_le_bytes([digest[0], digest[1], digest[2], digest[3]])
    }
}

/// Stable 32-bit id for a filesystem path, hashed on its lossy UTF-8 form.
pub fn path_id(path: &Path) -> u32 {
    let mut hasher = StableHasher::new();
    hasher.write_str(&path.to_string_lossy());
    hasher.finish_u32()
}
