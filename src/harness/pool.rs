//! Buffers placed at a chosen distance from a page edge
//!
//! Validators are run on copies of each test item that start (or end) a
//! given number of bytes from a page boundary, so reads past either end land
//! in known filler instead of in the item's neighbours. Large blocks are
//! expensive to fault in, so the pool keeps the last released block and
//! hands it out again when it is big enough.

use std::ops::{Deref, DerefMut};
use std::sync::Mutex;

pub const PAGE_SIZE: usize = 4096;
/// Placed requests always get at least this much, so the allocator serves
/// them from fresh pages.
pub const MIN_ALLOCATION: usize = 128 * 1024;
/// Filler for the bytes of a block outside the returned window
pub const FILL: u8 = 0xFE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Placement {
    #[default]
    Anywhere,
    /// `gap` bytes after the start of a page
    StartOfPage,
    /// Ending `gap` bytes before the end of a page
    EndOfPage,
}

/// Hands out placed buffers and caches one released block.
#[derive(Debug, Default)]
pub struct BlockPool {
    cached: Mutex<Option<Vec<u8>>>,
}

impl BlockPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// A zeroed buffer of `size` bytes at the requested placement.
    pub fn acquire(&self, size: usize, placement: Placement, gap: usize) -> Placed<'_> {
        let mut placed = self.place(size, placement, gap);
        placed.fill(0);
        placed
    }

    /// A copy of `data` at the requested placement.
    pub fn acquire_copy(&self, data: &[u8], placement: Placement, gap: usize) -> Placed<'_> {
        let mut placed = self.place(data.len(), placement, gap);
        placed.copy_from_slice(data);
        placed
    }

    /// Capacity of the cached block, if one is held.
    pub fn cached_len(&self) -> Option<usize> {
        self.lock().as_ref().map(Vec::len)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Vec<u8>>> {
        // a panic elsewhere cannot leave the cache half-updated
        self.cached.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn place(&self, size: usize, placement: Placement, gap: usize) -> Placed<'_> {
        let gap = if placement == Placement::Anywhere { 0 } else { gap };

        if size == 0 || (placement == Placement::Anywhere && size < MIN_ALLOCATION) {
            return Placed {
                pool: None,
                block: vec![0; size],
                start: 0,
                len: size,
            };
        }

        let needed = size + gap;
        let mut block = match self.lock().take() {
            Some(block) if window(&block).1 >= needed => block,
            _ => {
                let window_len = needed.max(MIN_ALLOCATION).next_multiple_of(PAGE_SIZE);
                tracing::trace!(window_len, "allocating placed block");
                // one spare page so the window can start on a page boundary
                vec![FILL; window_len + PAGE_SIZE]
            }
        };
        block.fill(FILL);

        let (window_start, window_len) = window(&block);
        let start = match placement {
            Placement::EndOfPage => window_start + window_len - gap - size,
            Placement::StartOfPage | Placement::Anywhere => window_start + gap,
        };

        Placed {
            pool: Some(self),
            block,
            start,
            len: size,
        }
    }

    fn release(&self, block: Vec<u8>) {
        // the previously cached block, if any, is dropped here
        *self.lock() = Some(block);
    }
}

/// Page-aligned region inside `block`: (offset, length).
fn window(block: &[u8]) -> (usize, usize) {
    let start = block.as_ptr().align_offset(PAGE_SIZE).min(block.len());
    let len = (block.len() - start) / PAGE_SIZE * PAGE_SIZE;
    (start, len)
}

/// A buffer handed out by [`BlockPool`]; returns its block on drop.
#[derive(Debug)]
pub struct Placed<'a> {
    pool: Option<&'a BlockPool>,
    block: Vec<u8>,
    start: usize,
    len: usize,
}

impl Placed<'_> {
    /// The whole underlying block, filler included.
    pub fn block(&self) -> &[u8] {
        &self.block
    }

    /// Offset of the buffer within [`Placed::block`].
    pub fn offset(&self) -> usize {
        self.start
    }
}

impl Deref for Placed<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.block[self.start..self.start + self.len]
    }
}

impl DerefMut for Placed<'_> {
    fn deref_mut(&mut self) -> &mut [u8] {
        &mut self.block[self.start..self.start + self.len]
    }
}

impl Drop for Placed<'_> {
    fn drop(&mut self) {
        if let Some(pool) = self.pool {
            pool.release(std::mem::take(&mut self.block));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_unplaced_is_private() {
        let pool = BlockPool::new();
        let placed = pool.acquire_copy(b"abc", Placement::Anywhere, 17);
        assert_eq!(&*placed, b"abc");
        assert_eq!(placed.offset(), 0);
        drop(placed);
        assert_eq!(pool.cached_len(), None);
    }

    #[test]
    fn test_start_of_page_gap() {
        let pool = BlockPool::new();
        for gap in [0, 1, 15, 63] {
            let placed = pool.acquire_copy(b"hello", Placement::StartOfPage, gap);
            assert_eq!(placed.as_ptr().addr() % PAGE_SIZE, gap);
            assert_eq!(&*placed, b"hello");
        }
    }

    #[test]
    fn test_end_of_page_gap_and_filler() {
        let pool = BlockPool::new();
        let placed = pool.acquire(10, Placement::EndOfPage, 3);
        let end = placed.as_ptr().addr() + placed.len();
        assert_eq!(end % PAGE_SIZE, PAGE_SIZE - 3);
        assert!(placed.iter().all(|&b| b == 0));

        let block = placed.block();
        let after = placed.offset() + placed.len();
        assert_eq!(&block[after..after + 3], &[FILL; 3]);
        assert_eq!(block[placed.offset() - 1], FILL);
    }

    #[test]
    fn test_released_block_is_reused() {
        let pool = BlockPool::new();
        let first = pool.acquire(100, Placement::StartOfPage, 0);
        let first_block = first.block().as_ptr();
        drop(first);
        let cached = pool.cached_len().unwrap();
        assert!(cached >= MIN_ALLOCATION);

        let second = pool.acquire(200, Placement::EndOfPage, 7);
        assert_eq!(second.block().as_ptr(), first_block);
        assert_eq!(pool.cached_len(), None);
    }

    #[test]
    fn test_large_request_grows_the_block() {
        let pool = BlockPool::new();
        drop(pool.acquire(1, Placement::StartOfPage, 0));
        let big = MIN_ALLOCATION * 2 + 5;
        let placed = pool.acquire(big, Placement::StartOfPage, 9);
        assert_eq!(placed.len(), big);
        assert_eq!(placed.as_ptr().addr() % PAGE_SIZE, 9);
        drop(placed);
        assert!(pool.cached_len().unwrap() >= big + 9);
    }
}
