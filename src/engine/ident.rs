//! Per-engine identity minting.

use std::sync::atomic::{AtomicU64, Ordering};

/// An opaque identity minted by an [`IdentAllocator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ident(u64);

/// Monotonic identity allocator.
///
/// Each component that needs identities owns its own allocator; there is no
/// process-wide counter, so independent engines never share id sequences.
#[derive(Debug, Default)]
pub struct IdentAllocator {
    next: AtomicU64,
}

impl IdentAllocator {
    /// Create an allocator starting at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint the next identity.
    pub fn mint(&self) -> Ident {
        Ident(self.next.fetch_add(1, Ordering::Relaxed))
    }
}
