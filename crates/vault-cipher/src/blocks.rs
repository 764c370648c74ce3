//! Fixed-size block splitting.

use std::iter::{once, Chain, Once};
use std::slice::ChunksExact;

/// Lazy sequence of `size`-byte blocks followed by one remainder block.
///
/// The remainder is always yielded, even when empty, so an empty input or an
/// input that is an exact multiple of `size` ends with a zero-length block.
pub type Blocks<'a> = Chain<ChunksExact<'a, u8>, Once<&'a [u8]>>;

/// Split `data` into consecutive `size`-byte blocks plus the remainder.
///
/// # Panics
///
/// Panics if `size` is zero.
pub fn blocks(data: &[u8], size: usize) -> Blocks<'_> {
    let full = data.chunks_exact(size);
    let remainder = full.remainder();
    full.chain(once(remainder))
}
