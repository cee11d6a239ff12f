//! Chunk planning arithmetic.
//!
//! A scan never materializes the whole module image: the buffer is divided
//! into fixed-size chunks that are read, searched, and dropped independently,
//! bounding peak memory to the chunk size rather than the buffer size.
//!
//! Each chunk read (except for the final chunk) extends `overlap` bytes past
//! the chunk's logical end — one byte less than the longest pattern — so a
//! match whose first byte sits near a chunk boundary is still fully visible
//! within a single read:
//!
//! ```text
//! chunk 0: |............{4|        { } = the pattern we want
//! chunk 1: |6 9}..........|        overlap makes chunk 0's read cover it
//! ```
//!
//! No read ever requests bytes past the real buffer end.

/// A contiguous byte range of the source buffer, searched independently
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    /// Absolute offset of the chunk's first byte
    pub offset: usize,
    /// Logical chunk size (uniform except possibly the final chunk)
    pub size: usize,
    /// Bytes to actually read: `size` plus overlap, clamped to the buffer end
    pub read_len: usize,
}

/// The chunk decomposition of one scan
#[derive(Debug, Clone)]
pub struct ChunkPlan {
    total_size: usize,
    max_chunk_size: usize,
    overlap: usize,
    chunk_count: usize,
}

impl ChunkPlan {
    /// Plans the chunk decomposition of a `total_size`-byte buffer.
    ///
    /// `chunk_count = ceil(total_size / max_chunk_size)`; every chunk has
    /// size `max_chunk_size` except the last, which holds the remainder.
    pub fn new(total_size: usize, max_chunk_size: usize, overlap: usize) -> Self {
        assert!(max_chunk_size > 0, "max_chunk_size must be non-zero");

        let chunk_count = total_size.div_ceil(max_chunk_size);

        Self {
            total_size,
            max_chunk_size,
            overlap,
            chunk_count,
        }
    }

    /// Returns the number of chunks
    pub fn chunk_count(&self) -> usize {
        self.chunk_count
    }

    /// Returns the total buffer size this plan covers
    pub fn total_size(&self) -> usize {
        self.total_size
    }

    /// Returns the chunk at `index`, or `None` past the end of the plan
    pub fn chunk(&self, index: usize) -> Option<Chunk> {
        if index >= self.chunk_count {
            return None;
        }

        let offset = index * self.max_chunk_size;
        let size = if index == self.chunk_count - 1 {
            self.total_size - offset
        } else {
            self.max_chunk_size
        };
        let read_len = (size + self.overlap).min(self.total_size - offset);

        Some(Chunk {
            offset,
            size,
            read_len,
        })
    }

    /// Iterates over all chunks in offset order
    pub fn chunks(&self) -> impl Iterator<Item = Chunk> + '_ {
        (0..self.chunk_count).filter_map(|i| self.chunk(i))
    }
}
