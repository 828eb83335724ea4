//! Pool-managed byte buffers
//!
//! `ByteBuffer` is a move-only handle: exactly one layer owns it at a time,
//! and it goes back to its pool exactly once, when released or dropped.
//! The pool keeps counters so ownership can be checked in tests.

use bytes::{BufMut, Bytes, BytesMut};
use crossbeam_queue::ArrayQueue;
use std::fmt;
use std::ops::Deref;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

use crate::utils::bytes_to_hex;

/// Default capacity of one buffer in bytes
pub const MAX_BUFFER_SIZE_BYTES: usize = 12756;

/// Default number of buffers a pool hands out concurrently
pub const DEFAULT_POOL_CAPACITY: usize = 1024;

/// Buffer errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BufferError {
    #[error("Buffer pool exhausted: {0} buffers outstanding")]
    PoolExhausted(usize),

    #[error("Write of {requested} bytes overflows buffer ({len}/{capacity} bytes used)")]
    Overflow {
        requested: usize,
        len: usize,
        capacity: usize,
    },
}

struct PoolInner {
    free: ArrayQueue<BytesMut>,
    buffer_size: usize,
    capacity: usize,
    outstanding: AtomicUsize,
    allocations: AtomicUsize,
    releases: AtomicUsize,
}

/// Shared fixed-capacity buffer pool
///
/// Cloning the pool clones a handle to the same storage.
#[derive(Clone)]
pub struct BufferPool {
    inner: Arc<PoolInner>,
}

impl BufferPool {
    /// Create a pool handing out at most `capacity` buffers of `buffer_size` bytes
    pub fn new(capacity: usize, buffer_size: usize) -> Self {
        Self {
            inner: Arc::new(PoolInner {
                free: ArrayQueue::new(capacity.max(1)),
                buffer_size,
                capacity,
                outstanding: AtomicUsize::new(0),
                allocations: AtomicUsize::new(0),
                releases: AtomicUsize::new(0),
            }),
        }
    }

    /// Take a buffer from the pool
    pub fn allocate(&self) -> Result<ByteBuffer, BufferError> {
        let prev = self.inner.outstanding.fetch_add(1, Ordering::AcqRel);
        if prev >= self.inner.capacity {
            self.inner.outstanding.fetch_sub(1, Ordering::AcqRel);
            warn!("Buffer pool exhausted ({} outstanding)", prev);
            return Err(BufferError::PoolExhausted(prev));
        }

        let data = self
            .inner
            .free
            .pop()
            .unwrap_or_else(|| BytesMut::with_capacity(self.inner.buffer_size));
        self.inner.allocations.fetch_add(1, Ordering::Relaxed);

        Ok(ByteBuffer {
            data,
            pool: self.inner.clone(),
        })
    }

    /// Take a buffer and fill it with `data`
    pub fn allocate_from(&self, data: &[u8]) -> Result<ByteBuffer, BufferError> {
        let mut buf = self.allocate()?;
        buf.append(data)?;
        Ok(buf)
    }

    /// Buffers currently held by some layer
    pub fn outstanding(&self) -> usize {
        self.inner.outstanding.load(Ordering::Acquire)
    }

    /// Total successful allocations since creation
    pub fn allocations(&self) -> usize {
        self.inner.allocations.load(Ordering::Relaxed)
    }

    /// Total releases since creation
    pub fn releases(&self) -> usize {
        self.inner.releases.load(Ordering::Relaxed)
    }

    /// Size in bytes of every buffer
    pub fn buffer_size(&self) -> usize {
        self.inner.buffer_size
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new(DEFAULT_POOL_CAPACITY, MAX_BUFFER_SIZE_BYTES)
    }
}

impl fmt::Debug for BufferPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufferPool")
            .field("buffer_size", &self.inner.buffer_size)
            .field("capacity", &self.inner.capacity)
            .field("outstanding", &self.outstanding())
            .finish()
    }
}

/// Owned byte buffer borrowed from a `BufferPool`
pub struct ByteBuffer {
    data: BytesMut,
    pool: Arc<PoolInner>,
}

impl ByteBuffer {
    /// Fixed capacity in bytes
    pub fn capacity(&self) -> usize {
        self.pool.buffer_size
    }

    /// Append bytes, failing if the fixed capacity would be exceeded
    pub fn append(&mut self, bytes: &[u8]) -> Result<(), BufferError> {
        if self.data.len() + bytes.len() > self.capacity() {
            return Err(BufferError::Overflow {
                requested: bytes.len(),
                len: self.data.len(),
                capacity: self.capacity(),
            });
        }
        self.data.put_slice(bytes);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Copy the contents out, e.g. for a decoded message that outlives the buffer
    pub fn to_bytes(&self) -> Bytes {
        Bytes::copy_from_slice(&self.data)
    }

    /// Hex dump for logging
    pub fn hex(&self) -> String {
        bytes_to_hex(&self.data)
    }

    /// Hand the buffer back to its pool
    pub fn release(self) {}
}

impl Deref for ByteBuffer {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.data
    }
}

impl Drop for ByteBuffer {
    fn drop(&mut self) {
        let mut data = std::mem::take(&mut self.data);
        data.clear();
        // A full free list just lets the storage go
        let _ = self.pool.free.push(data);
        self.pool.releases.fetch_add(1, Ordering::Relaxed);
        self.pool.outstanding.fetch_sub(1, Ordering::AcqRel);
    }
}

impl fmt::Debug for ByteBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ByteBuffer[{}]({})", self.data.len(), self.hex())
    }
}
