//! Common Utilities and Types Library
//!
//! This crate provides shared types, byte/bit buffers and utilities used
//! across the UE protocol stack.

pub mod bits;
pub mod buffer;
pub mod logging;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use bits::{BitError, BitMessage, BitReader, BitWriter};
pub use buffer::{BufferError, BufferPool, ByteBuffer};
pub use types::*;
pub use utils::*;
