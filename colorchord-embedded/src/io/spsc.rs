//! Lock-free single-producer single-consumer sample ring.
//!
//! The sampling interrupt owns the [`Producer`] half and the processing task
//! owns the [`Consumer`] half. Both sides only touch their own index, so no
//! critical section is needed and the interrupt never blocks.
//!
//! # Safety Contract
//!
//! The split borrows the ring mutably, so at most one producer and one
//! consumer exist at a time. The halves may live in different interrupt
//! priorities or threads.

use core::cell::UnsafeCell;
use core::marker::PhantomData;
use core::mem::MaybeUninit;
use core::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

/// Fixed-capacity ring of `Copy` samples with explicit atomic head/tail.
///
/// Usable capacity is `N - 1`; one slot tells "full" apart from "empty".
pub struct SampleRing<T, const N: usize> {
    slots: [UnsafeCell<MaybeUninit<T>>; N],
    /// Next slot the producer writes. Only stored by the producer.
    head: AtomicUsize,
    /// Next slot the consumer reads. Only stored by the consumer.
    tail: AtomicUsize,
    /// Samples rejected because the ring was full.
    overruns: AtomicU32,
}

// SAFETY: slots are only written by the producer before publishing `head`
// and only read by the consumer before publishing `tail`.
unsafe impl<T: Copy + Send, const N: usize> Sync for SampleRing<T, N> {}
unsafe impl<T: Copy + Send, const N: usize> Send for SampleRing<T, N> {}

impl<T: Copy, const N: usize> SampleRing<T, N> {
    /// Create an empty ring.
    pub const fn new() -> Self {
        assert!(N >= 2, "sample ring needs at least 2 slots (1 usable)");

        SampleRing {
            // SAFETY: an array of MaybeUninit needs no initialization.
            slots: unsafe { MaybeUninit::<[UnsafeCell<MaybeUninit<T>>; N]>::uninit().assume_init() },
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
            overruns: AtomicU32::new(0),
        }
    }

    /// Hand out the interrupt-side and task-side halves.
    pub fn split(&mut self) -> (Producer<'_, T, N>, Consumer<'_, T, N>) {
        let ring: &Self = self;
        (
            Producer { ring, _not_sync: PhantomData },
            Consumer { ring, _not_sync: PhantomData },
        )
    }

    /// Largest number of samples the ring can hold.
    pub const fn capacity(&self) -> usize {
        N - 1
    }

    /// Samples currently queued.
    pub fn len(&self) -> usize {
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Acquire);
        (head + N - tail) % N
    }

    pub fn is_empty(&self) -> bool {
        self.head.load(Ordering::Acquire) == self.tail.load(Ordering::Acquire)
    }

    /// Total samples dropped because the consumer fell behind.
    pub fn overruns(&self) -> u32 {
        self.overruns.load(Ordering::Relaxed)
    }
}

impl<T: Copy, const N: usize> Default for SampleRing<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Interrupt-side half of a [`SampleRing`].
pub struct Producer<'a, T, const N: usize> {
    ring: &'a SampleRing<T, N>,
    _not_sync: PhantomData<*const ()>,
}

// SAFETY: a producer may move into another context; it is still the only one.
unsafe impl<T: Copy + Send, const N: usize> Send for Producer<'_, T, N> {}

impl<T: Copy, const N: usize> Producer<'_, T, N> {
    /// Queue one sample.
    ///
    /// When the ring is full the sample is handed back and the overrun
    /// counter advances; queued samples are never overwritten.
    pub fn push(&mut self, sample: T) -> Result<(), T> {
        let ring = self.ring;
        let head = ring.head.load(Ordering::Relaxed);
        let next = (head + 1) % N;

        if next == ring.tail.load(Ordering::Acquire) {
            ring.overruns.fetch_add(1, Ordering::Relaxed);
            return Err(sample);
        }

        // SAFETY: `head` is owned by this producer and `next != tail` means
        // the consumer is not reading this slot.
        unsafe {
            (*ring.slots[head].get()).write(sample);
        }
        ring.head.store(next, Ordering::Release);
        Ok(())
    }

    pub fn is_full(&self) -> bool {
        let head = self.ring.head.load(Ordering::Relaxed);
        (head + 1) % N == self.ring.tail.load(Ordering::Acquire)
    }
}

/// Task-side half of a [`SampleRing`].
pub struct Consumer<'a, T, const N: usize> {
    ring: &'a SampleRing<T, N>,
    _not_sync: PhantomData<*const ()>,
}

// SAFETY: see `Producer`.
unsafe impl<T: Copy + Send, const N: usize> Send for Consumer<'_, T, N> {}

impl<T: Copy, const N: usize> Consumer<'_, T, N> {
    /// Take the oldest queued sample, if any.
    pub fn pop(&mut self) -> Option<T> {
        let ring = self.ring;
        let tail = ring.tail.load(Ordering::Relaxed);

        if tail == ring.head.load(Ordering::Acquire) {
            return None;
        }

        // SAFETY: `tail != head`, so the producer published this slot and
        // will not touch it until `tail` moves past it.
        let sample = unsafe { (*ring.slots[tail].get()).assume_init_read() };
        ring.tail.store((tail + 1) % N, Ordering::Release);
        Some(sample)
    }

    /// Whether at least one sample is waiting.
    pub fn is_ready(&self) -> bool {
        self.ring.tail.load(Ordering::Relaxed) != self.ring.head.load(Ordering::Acquire)
    }

    pub fn len(&self) -> usize {
        self.ring.len()
    }

    pub fn overruns(&self) -> u32 {
        self.ring.overruns()
    }
}
