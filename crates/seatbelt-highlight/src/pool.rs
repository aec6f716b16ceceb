// Scratch buffer pool for formatter output
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use tracing::debug;

/// Pool of reusable byte buffers.
///
/// Buffers are handed out as [`PooledBuffer`] guards that return themselves on
/// drop, so every exit path of a caller releases its buffer. The pool is a
/// pure allocation optimization: a caller sees the same empty `Vec<u8>`
/// whether it was recycled or freshly allocated.
pub struct BufferPool {
    /// Idle buffers, most recently returned last
    free: Mutex<Vec<Vec<u8>>>,

    /// Maximum number of idle buffers retained
    max_buffers: usize,

    /// Capacity of freshly allocated buffers
    initial_capacity: usize,

    /// Buffers that grew beyond this are dropped instead of retained
    max_retained_capacity: usize,

    /// Statistics
    stats: BufferPoolStats,
}

/// Thread-safe counters for a [`BufferPool`].
#[derive(Default)]
struct BufferPoolStats {
    acquired: AtomicUsize,
    released: AtomicUsize,
    reused: AtomicUsize,
    allocated: AtomicUsize,
    discarded: AtomicUsize,
}

impl BufferPool {
    /// Create a pool retaining at most `max_buffers` idle buffers.
    pub fn new(max_buffers: usize, initial_capacity: usize, max_retained_capacity: usize) -> Self {
        Self {
            free: Mutex::new(Vec::with_capacity(max_buffers)),
            max_buffers,
            initial_capacity,
            max_retained_capacity,
            stats: BufferPoolStats::default(),
        }
    }

    /// Take an empty buffer from the pool, allocating when none is idle.
    pub fn acquire(&self) -> PooledBuffer<'_> {
        self.stats.acquired.fetch_add(1, Ordering::Relaxed);

        let recycled = self.free.lock().unwrap_or_else(PoisonError::into_inner).pop();
        let buffer = if let Some(mut buf) = recycled {
            self.stats.reused.fetch_add(1, Ordering::Relaxed);
            buf.clear();
            buf
        } else {
            self.stats.allocated.fetch_add(1, Ordering::Relaxed);
            Vec::with_capacity(self.initial_capacity)
        };

        PooledBuffer { buffer, pool: self }
    }

    /// Return a buffer to the pool
    fn release(&self, mut buffer: Vec<u8>) {
        self.stats.released.fetch_add(1, Ordering::Relaxed);

        if buffer.capacity() > self.max_retained_capacity {
            self.stats.discarded.fetch_add(1, Ordering::Relaxed);
            debug!(capacity = buffer.capacity(), "dropping oversized pooled buffer");
            return;
        }

        let mut free = self.free.lock().unwrap_or_else(PoisonError::into_inner);
        if free.len() < self.max_buffers {
            buffer.clear(); // Clear contents but keep capacity
            free.push(buffer);
        } else {
            self.stats.discarded.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Number of idle buffers currently held.
    pub fn idle(&self) -> usize {
        self.free.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Buffers acquired but not yet released.
    pub fn outstanding(&self) -> usize {
        let acquired = self.stats.acquired.load(Ordering::Relaxed);
        let released = self.stats.released.load(Ordering::Relaxed);
        acquired.saturating_sub(released)
    }

    /// Get current pool statistics
    pub fn stats(&self) -> BufferPoolStatsSummary {
        BufferPoolStatsSummary {
            acquired: self.stats.acquired.load(Ordering::Relaxed),
            released: self.stats.released.load(Ordering::Relaxed),
            reused: self.stats.reused.load(Ordering::Relaxed),
            allocated: self.stats.allocated.load(Ordering::Relaxed),
            discarded: self.stats.discarded.load(Ordering::Relaxed),
            idle: self.idle(),
        }
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new(32, 4096, 1024 * 1024) // 32 buffers, 4KB initial, 1MB retained max
    }
}

/// Snapshot of [`BufferPool`] counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferPoolStatsSummary {
    /// Buffers handed out
    pub acquired: usize,
    /// Buffers given back
    pub released: usize,
    /// Acquisitions served from the idle list
    pub reused: usize,
    /// Acquisitions that allocated
    pub allocated: usize,
    /// Released buffers dropped (pool full or buffer oversized)
    pub discarded: usize,
    /// Idle buffers at snapshot time
    pub idle: usize,
}

/// RAII guard for a pooled buffer
pub struct PooledBuffer<'a> {
    buffer: Vec<u8>,
    pool: &'a BufferPool,
}

impl Deref for PooledBuffer<'_> {
    type Target = Vec<u8>;

    fn deref(&self) -> &Self::Target {
        &self.buffer
    }
}

impl DerefMut for PooledBuffer<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.buffer
    }
}

impl Drop for PooledBuffer<'_> {
    fn drop(&mut self) {
        self.pool.release(std::mem::take(&mut self.buffer));
    }
}
