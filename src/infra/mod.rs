//! Language server plumbing: process, framing, backoff

pub mod lsp;
pub mod retry;

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Hash document text to detect no-op updates
#[inline]
pub fn hash_content(content: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    hasher.finish()
}
