//! crates/fd_io/src/counter.rs
//! Byte counter capabilities used by the counted buffer variants.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Receives the number of bytes each successful transfer moved.
///
/// Buffers call [`record`](Self::record) only with byte counts the kernel
/// confirmed, and never reset the sink.
pub trait CountSink {
    /// Adds `bytes` to the running total.
    fn record(&mut self, bytes: u64);
}

/// The plain variant: counting compiles to nothing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NoCount;

impl CountSink for NoCount {
    #[inline]
    fn record(&mut self, _bytes: u64) {}
}

/// Shared, thread-safe byte total.
///
/// Clones observe the same total, so the caller keeps one clone and hands
/// another to the buffer.
///
/// ```
/// use fd_io::{ByteCount, CountSink};
///
/// let total = ByteCount::new();
/// let mut handle = total.clone();
/// handle.record(12);
/// assert_eq!(total.get(), 12);
/// ```
#[derive(Clone, Debug, Default)]
pub struct ByteCount {
    total: Arc<AtomicU64>,
}

impl ByteCount {
    /// Creates a counter starting at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current total.
    pub fn get(&self) -> u64 {
        self.total.load(Ordering::Acquire)
    }
}

impl CountSink for ByteCount {
    fn record(&mut self, bytes: u64) {
        self.total.fetch_add(bytes, Ordering::AcqRel);
    }
}

/// Adapts any `FnMut(u64)` closure into a [`CountSink`].
#[derive(Clone, Copy, Debug)]
pub struct FnCount<F>(pub F);

impl<F> CountSink for FnCount<F>
where
    F: FnMut(u64),
{
    fn record(&mut self, bytes: u64) {
        (self.0)(bytes);
    }
}

impl CountSink for u64 {
    fn record(&mut self, bytes: u64) {
        *self += bytes;
    }
}

impl<T> CountSink for &mut T
where
    T: CountSink + ?Sized,
{
    fn record(&mut self, bytes: u64) {
        (**self).record(bytes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_count_clones_share_total() {
        let total = ByteCount::new();
        let mut a = total.clone();
        let mut b = total.clone();
        a.record(3);
        b.record(4);
        assert_eq!(total.get(), 7);
    }

    #[test]
    fn borrowed_integer_accumulates() {
        let mut total = 0u64;
        {
            let mut sink = &mut total;
            sink.record(10);
            sink.record(0);
            sink.record(5);
        }
        assert_eq!(total, 15);
    }

    #[test]
    fn closure_sink_sees_each_delta() {
        let mut deltas = Vec::new();
        {
            let mut sink = FnCount(|n| deltas.push(n));
            sink.record(1);
            sink.record(1024);
        }
        assert_eq!(deltas, vec![1, 1024]);
    }

    #[test]
    fn no_count_is_zero_sized() {
        assert_eq!(std::mem::size_of::<NoCount>(), 0);
    }
}
