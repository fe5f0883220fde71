//! # Ozma Core
//!
//! Core components for the Ozma LZMA1 compression library.
//!
//! This crate provides the building blocks shared by the codec and the CLI:
//!
//! - [`crc`]: the CRC-32 lookup table the match finder hashes with
//! - [`error`]: Error types
//!
//! ## Architecture
//!
//! Ozma is a small layered stack:
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ CLI                                         │
//! │     ozma compress / ozma decompress         │
//! ├─────────────────────────────────────────────┤
//! │ Codec (ozma-codec)                          │
//! │     match finder, range coder, parsers      │
//! ├─────────────────────────────────────────────┤
//! │ Core (this crate)                           │
//! │     CRC-32 table, error types               │
//! └─────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod crc;
pub mod error;

// Re-exports for convenience
pub use crc::CRC32_TABLE;
pub use error::{OzmaError, Result};
