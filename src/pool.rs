//! Bounded, lock-free object pools.
//!
//! Encoders and byte buffers are recycled through [`Pool`] so that steady-state
//! logging does not allocate per call. A pool only ever holds blank instances:
//! items are [`Reset`] on the way back in, and a full pool simply drops what it
//! is handed.
//!
//! # Example
//!
//! ```rust
//! use serde_logtext::pool::Pool;
//!
//! let pool: Pool<Vec<u8>> = Pool::new(4, || Vec::with_capacity(64));
//!
//! let mut buf = pool.get();
//! buf.extend_from_slice(b"key=value");
//! pool.put(buf);
//!
//! // The recycled buffer comes back empty.
//! assert!(pool.get().is_empty());
//! ```

use crossbeam::queue::ArrayQueue;
use std::sync::atomic::{AtomicU64, Ordering};

/// Items that can be returned to a [`Pool`].
pub trait Reset {
    /// Clears all per-use state so the next borrower starts from a blank slate.
    fn reset(&mut self);

    /// Whether this item is worth keeping. Defaults to `true`.
    fn reusable(&self) -> bool {
        true
    }
}

/// Largest buffer capacity kept by pools; bigger buffers are dropped on return.
pub const MAX_POOLED_CAPACITY: usize = 64 * 1024;

impl Reset for Vec<u8> {
    fn reset(&mut self) {
        self.clear();
    }

    fn reusable(&self) -> bool {
        self.capacity() <= MAX_POOLED_CAPACITY
    }
}

/// Pool usage counters.
#[derive(Debug, Default)]
pub struct PoolMetrics {
    hits: AtomicU64,
    misses: AtomicU64,
    returns: AtomicU64,
    drops: AtomicU64,
}

/// Point-in-time copy of [`PoolMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub returns: u64,
    pub drops: u64,
}

impl PoolMetrics {
    pub const fn new() -> Self {
        Self {
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            returns: AtomicU64::new(0),
            drops: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> PoolSnapshot {
        PoolSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            returns: self.returns.load(Ordering::Relaxed),
            drops: self.drops.load(Ordering::Relaxed),
        }
    }
}

/// A bounded free-list of reusable instances.
///
/// `get` hands out an exclusively owned instance, allocating a fresh one when
/// the free-list is empty. `put` resets the instance and keeps it if there is
/// room. The pool holds no business state of its own.
pub struct Pool<T> {
    queue: ArrayQueue<T>,
    make: fn() -> T,
    metrics: PoolMetrics,
}

impl<T: Reset> Pool<T> {
    /// Creates an empty pool that keeps at most `capacity` idle instances.
    ///
    /// A capacity of zero is bumped to one.
    pub fn new(capacity: usize, make: fn() -> T) -> Self {
        Self {
            queue: ArrayQueue::new(capacity.max(1)),
            make,
            metrics: PoolMetrics::new(),
        }
    }

    /// Checks an instance out of the pool.
    #[inline]
    pub fn get(&self) -> T {
        match self.queue.pop() {
            Some(item) => {
                self.metrics.hits.fetch_add(1, Ordering::Relaxed);
                item
            }
            None => {
                self.metrics.misses.fetch_add(1, Ordering::Relaxed);
                tracing::trace!("pool empty, allocating");
                (self.make)()
            }
        }
    }

    /// Returns an instance to the pool, resetting it first.
    #[inline]
    pub fn put(&self, mut item: T) {
        if !item.reusable() {
            self.metrics.drops.fetch_add(1, Ordering::Relaxed);
            return;
        }
        item.reset();
        match self.queue.push(item) {
            Ok(()) => {
                self.metrics.returns.fetch_add(1, Ordering::Relaxed);
            }
            Err(_) => {
                self.metrics.drops.fetch_add(1, Ordering::Relaxed);
                tracing::trace!("pool full, dropping instance");
            }
        }
    }

    /// Number of idle instances currently held.
    #[inline]
    pub fn available(&self) -> usize {
        self.queue.len()
    }

    /// Maximum number of idle instances.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.queue.capacity()
    }

    #[inline]
    pub fn metrics(&self) -> &PoolMetrics {
        &self.metrics
    }
}
