//! Parallel signature scanning over chunked buffer reads.
//!
//! This module provides the scan engine that locates every pattern of a
//! [`PatternSet`] inside a large byte buffer exactly once.
//!
//! ## Algorithm Overview
//!
//! 1. Divide the buffer into bounded-size chunks (see [`ChunkPlan`]), each
//!    read with enough overlap that boundary-straddling matches stay visible
//! 2. Distribute chunks across a bounded worker pool; within each chunk,
//!    distribute candidate byte offsets across the same pool
//! 3. Evaluate every pattern at every visited offset; record matches in the
//!    shared scan state
//! 4. Once every pattern has been found, a cooperative stop flag keeps new
//!    units of work from starting; work in flight runs to completion
//! 5. Aggregate the found offsets into the final `name -> offset` mapping,
//!    or fail if any pattern is missing or occurred more than once
//!
//! Chunk buffers are owned by the worker searching them and dropped as soon
//! as that search finishes, so peak memory stays proportional to the chunk
//! size, not the buffer size.
//!
//! ## Extensibility
//!
//! The [`MemorySource`] trait abstracts where the bytes come from. Byte
//! slices implement it directly; a caller scanning a live target supplies its
//! own source:
//!
//! ```no_run
//! use bytesig_core::{MemorySource, Result};
//!
//! struct ProcessSource { /* handle, base address, ... */ }
//!
//! impl MemorySource for ProcessSource {
//!     fn read(&self, offset: usize, length: usize) -> Result<Vec<u8>> {
//!         // read `length` bytes at `offset` from the target
//!         Ok(vec![])
//!     }
//! }
//! ```

mod chunks;
mod state;

use crate::error::{Error, Result};
use crate::pattern::PatternSet;
use crate::{DEFAULT_MAX_CHUNK_SIZE, DEFAULT_PARALLELISM};
use rayon::prelude::*;
use state::ScanState;
use std::collections::HashMap;
use tracing::{debug, trace};

pub use chunks::{Chunk, ChunkPlan};

/// A byte-range read operation over the buffer being scanned.
///
/// The engine only ever requests ranges that lie entirely inside the
/// `total_size` it was given; an implementation is free to treat anything
/// else as a hard error. Read failures are propagated out of the scan
/// unchanged — the engine never retries, since retry policy belongs to
/// whatever owns the underlying memory.
pub trait MemorySource: Sync {
    /// Reads `length` bytes starting at `offset`
    fn read(&self, offset: usize, length: usize) -> Result<Vec<u8>>;
}

impl MemorySource for [u8] {
    fn read(&self, offset: usize, length: usize) -> Result<Vec<u8>> {
        let end = offset
            .checked_add(length)
            .filter(|&end| end <= self.len())
            .ok_or_else(|| {
                Error::source_read(
                    offset,
                    length,
                    format!("range exceeds buffer of {} bytes", self.len()),
                )
            })?;

        Ok(self[offset..end].to_vec())
    }
}

/// Configuration for the scan engine
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Maximum logical chunk size in bytes; bounds peak per-worker memory
    pub max_chunk_size: usize,
    /// Number of worker threads shared by both parallel levels
    pub parallelism: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_chunk_size: DEFAULT_MAX_CHUNK_SIZE,
            parallelism: DEFAULT_PARALLELISM,
        }
    }
}

impl ScanConfig {
    /// Creates a new scan config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum chunk size (clamped to at least 1 byte)
    pub fn max_chunk_size(mut self, size: usize) -> Self {
        self.max_chunk_size = size.max(1);
        self
    }

    /// Sets the worker pool size (clamped to at least 1 thread)
    pub fn parallelism(mut self, degree: usize) -> Self {
        self.parallelism = degree.max(1);
        self
    }
}

/// The parallel signature scan engine
#[derive(Debug, Clone, Default)]
pub struct Scanner {
    config: ScanConfig,
}

impl Scanner {
    /// Creates a new scanner with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new scanner with custom configuration
    pub fn with_config(config: ScanConfig) -> Self {
        Self { config }
    }

    /// Scans `total_size` bytes of `source` for every pattern in `patterns`.
    ///
    /// Returns the `name -> offset` mapping with each pattern's skip
    /// adjustment already applied. Fails with [`Error::PatternNotFound`] if
    /// the buffer is exhausted with patterns still unfound, and with
    /// [`Error::NonUniquePattern`] if a pattern matched at two distinct
    /// offsets — both are configuration errors in the pattern data and are
    /// never retried. No partial mapping is returned on failure.
    pub fn scan<S>(
        &self,
        source: &S,
        total_size: usize,
        patterns: &PatternSet,
    ) -> Result<HashMap<String, usize>>
    where
        S: MemorySource + ?Sized,
    {
        if patterns.is_empty() {
            debug!("empty pattern set, nothing to scan");
            return Ok(HashMap::new());
        }

        let plan = ChunkPlan::new(total_size, self.config.max_chunk_size, patterns.overlap());
        let state = ScanState::new(patterns.len());

        debug!(
            "scanning {} bytes in {} chunks for {} patterns ({} workers)",
            total_size,
            plan.chunk_count(),
            patterns.len(),
            self.config.parallelism
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.parallelism)
            .build()?;

        let chunks: Vec<Chunk> = plan.chunks().collect();
        pool.install(|| {
            chunks.par_iter().try_for_each(|chunk| -> Result<()> {
                if state.should_stop() {
                    return Ok(());
                }

                let data = source.read(chunk.offset, chunk.read_len)?;
                trace!(
                    "searching chunk at offset {} ({} bytes)",
                    chunk.offset,
                    data.len()
                );

                (0..data.len()).into_par_iter().for_each(|position| {
                    if state.should_stop() {
                        return;
                    }

                    for (index, pattern) in patterns.iter().enumerate() {
                        if pattern.matches_at(&data, position) {
                            state.record(index, chunk.offset + position);
                        }
                    }
                });

                // chunk buffer dropped on return, before this worker
                // picks up another chunk
                Ok(())
            })
        })?;

        let results = state.into_results(patterns)?;
        debug!("scan complete: located {} patterns", results.len());
        Ok(results)
    }
}

/// Scan a module image stored on disk
///
/// This is a convenience function that reads the file and scans it.
pub fn scan_file(
    path: impl AsRef<std::path::Path>,
    patterns: &PatternSet,
) -> Result<HashMap<String, usize>> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|e| Error::file_read(path, e))?;
    Scanner::new().scan(&data[..], data.len(), patterns)
}

/// Scan a module image stored on disk with custom configuration
pub fn scan_file_with_config(
    path: impl AsRef<std::path::Path>,
    config: ScanConfig,
    patterns: &PatternSet,
) -> Result<HashMap<String, usize>> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|e| Error::file_read(path, e))?;
    Scanner::with_config(config).scan(&data[..], data.len(), patterns)
}
