//! Patch Generation Value Object
//!
//! One id per patch cycle. Synthesized symbol names, the patch entry point
//! and the artifact file names are all derived from it, so they never
//! collide within a process lifetime.

use std::fmt;

use serde::Serialize;

/// Prefix of the exported entry point every patch library carries
pub const ENTRY_SYMBOL_PREFIX: &str = "__hot_reload_patch_";

/// A patch generation id
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Generation(u64);

impl Generation {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(self) -> u64 {
        self.0
    }

    /// `{original}_patch_{id}`
    pub fn patch_name(self, original: &str) -> String {
        format!("{}_patch_{}", original, self.0)
    }

    /// Name of the exported entry point of this generation's library
    pub fn entry_symbol(self) -> String {
        format!("{}{}", ENTRY_SYMBOL_PREFIX, self.0)
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonic allocator of generation ids. Ids are never handed out twice.
#[derive(Debug, Default)]
pub struct GenerationCounter {
    next: u64,
}

impl GenerationCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next generation
    pub fn allocate(&mut self) -> Generation {
        let generation = Generation(self.next);
        self.next += 1;
        generation
    }

    /// The id the next call to [`allocate`](Self::allocate) will return
    pub fn peek(&self) -> Generation {
        Generation(self.next)
    }
}
