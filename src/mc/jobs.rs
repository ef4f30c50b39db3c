//! Job batches, the bounded queue that hands them out, and cancellation.

use std::ops::Range;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, sync_channel};
use std::sync::{Arc, Mutex, PoisonError};

use crate::core::SimulationResult;

/// A contiguous batch of paths together with the result slots it owns.
///
/// Slots are a disjoint sub-slice of the run's result array, so a path's
/// result is written by whichever worker holds the job and by nobody else.
#[derive(Debug)]
pub struct SimulationJob<'a> {
    pub index: usize,
    pub start_iteration: usize,
    pub end_iteration: usize,
    slots: &'a mut [Option<SimulationResult>],
}

impl<'a> SimulationJob<'a> {
    pub fn new(
        index: usize,
        start_iteration: usize,
        slots: &'a mut [Option<SimulationResult>],
    ) -> Self {
        Self {
            index,
            start_iteration,
            end_iteration: start_iteration + slots.len(),
            slots,
        }
    }

    /// Half-open range of path indices covered by this job.
    pub fn iterations(&self) -> Range<usize> {
        self.start_iteration..self.end_iteration
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slots_mut(&mut self) -> &mut [Option<SimulationResult>] {
        &mut *self.slots
    }
}

/// Splits a result array into jobs of at most `batch_size` paths.
pub fn partition_jobs(
    results: &mut [Option<SimulationResult>],
    batch_size: usize,
) -> impl ExactSizeIterator<Item = SimulationJob<'_>> {
    let batch_size = batch_size.max(1);
    results
        .chunks_mut(batch_size)
        .enumerate()
        .map(move |(index, slots)| SimulationJob::new(index, index * batch_size, slots))
}

/// First-come queue over a fixed set of items.
///
/// The queue is filled once and closed on construction; [`Self::next`]
/// returns `None` once it is drained. Each item is handed out at most once.
#[derive(Debug)]
pub struct JobQueue<T> {
    receiver: Mutex<Receiver<T>>,
    len: usize,
}

impl<T> JobQueue<T> {
    pub fn new<I>(items: I) -> Self
    where
        I: ExactSizeIterator<Item = T>,
    {
        let len = items.len();
        let (sender, receiver) = sync_channel(len);
        for item in items {
            // The receiver is alive and the channel holds `len` items.
            if sender.try_send(item).is_err() {
                break;
            }
        }
        drop(sender);
        Self {
            receiver: Mutex::new(receiver),
            len,
        }
    }

    /// Number of items the queue was created with.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Next unclaimed item, blocking only on contention with other workers.
    pub fn next(&self) -> Option<T> {
        self.receiver
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .recv()
            .ok()
    }
}

/// Shared cancellation flag observed at job boundaries.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}
