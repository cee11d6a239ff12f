//! # bytesig-core
//!
//! A library for locating masked byte signatures in process module images.
//!
//! This crate provides the core functionality for:
//! - Defining named byte patterns with per-byte wildcard masks
//! - Scanning large buffers in bounded-size chunks, in parallel, with
//!   cooperative early exit once every pattern has been found
//! - Producing a `name -> offset` mapping with per-pattern skip adjustments
//!   applied, or failing hard when a pattern is missing or non-unique
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`pattern`]: Pattern definitions and the byte-level matching primitive
//! - [`scanner`]: Chunk planning and the parallel scan engine
//! - [`error`]: Error types and handling
//!
//! ## Example
//!
//! ```no_run
//! use bytesig_core::{Pattern, PatternSet, Scanner};
//! use std::fs;
//!
//! // Read a dumped module image
//! let data = fs::read("./game_module.bin")?;
//!
//! // The signatures to locate; each must occur exactly once
//! let patterns = PatternSet::new(vec![
//!     Pattern::from_hex("GameStates", "48 8B ?? ?? 05 C3", 3)?,
//!     Pattern::from_hex("AreaChange", "E8 ?? ?? ?? ?? 33 F6", 1)?,
//! ])?;
//!
//! // Scan and report each signature's adjusted offset
//! let offsets = Scanner::new().scan(&data[..], data.len(), &patterns)?;
//! for (name, offset) in &offsets {
//!     println!("{name}: 0x{offset:X}");
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Extensibility
//!
//! The [`MemorySource`] trait abstracts the byte-range read operation, so
//! the same engine scans in-memory buffers, files, or a caller-supplied
//! view of a live target.

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unreachable_pub)]

pub mod error;
pub mod pattern;
pub mod scanner;

// Re-export primary types for convenience
pub use error::{Error, Result};
pub use pattern::{Pattern, PatternSet};
pub use scanner::{Chunk, ChunkPlan, MemorySource, ScanConfig, Scanner};

/// Crate version for programmatic access
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default maximum chunk size in bytes.
///
/// Chosen so each chunk read stays comfortably under the ~85 kB threshold
/// past which some allocators treat buffers as long-lived large objects;
/// the margin leaves room for the overlap bytes appended to each read.
pub const DEFAULT_MAX_CHUNK_SIZE: usize = 84_000;

/// Default number of scan worker threads
pub const DEFAULT_PARALLELISM: usize = 4;
