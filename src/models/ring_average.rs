use crate::error::{Error, Result};
use crate::models::sample::Sample;
use crate::util::ring_buffer::RingBuffer;
use tracing::{debug, trace};

/// Sliding-window arithmetic mean over the last `capacity` samples.
///
/// The running sum is updated on every push, so `average()` is O(1).
/// Not synchronised: callers sharing an instance across threads must wrap it
/// in their own lock.
#[derive(Debug, Clone)]
pub struct RingAverage {
    slots:           RingBuffer<Sample>,
    running_sum:     f64,
    current_average: f64,
    next_seq:        u64,
}

impl RingAverage {
    pub fn new(capacity: usize) -> Result<Self> {
        let slots = RingBuffer::with_capacity(capacity)?;
        debug!(capacity, "created moving average");
        Ok(Self {
            slots,
            running_sum:     0.0,
            current_average: 0.0,
            next_seq:        0,
        })
    }

    /// Adds `value` as the newest sample, evicting the oldest once full.
    pub fn push(&mut self, value: f64) -> Result {
        if !value.is_finite() {
            return Err(Error::NonFiniteSample(value));
        }

        let sample = Sample { seq: self.next_seq, value };
        self.next_seq += 1;

        let evicted = self.slots.push(sample);
        if let Some(old) = evicted {
            self.running_sum -= old.value;
        }
        self.running_sum += value;
        self.current_average = self.running_sum / self.slots.len() as f64;

        trace!(
            value,
            evicted = ?evicted.map(|s| s.value),
            count = self.slots.len(),
            "pushed sample"
        );
        Ok(())
    }

    pub fn average(&self) -> Result<f64> {
        if self.slots.is_empty() {
            return Err(Error::EmptyBuffer);
        }
        Ok(self.current_average)
    }

    pub fn count(&self) -> usize { self.slots.len() }
    pub fn capacity(&self) -> usize { self.slots.capacity() }
    pub fn is_empty(&self) -> bool { self.slots.is_empty() }
    pub fn is_full(&self) -> bool { self.slots.is_full() }

    /// Slot the next sample goes to. Equals `count()` while filling; once
    /// full it points at the oldest sample.
    pub fn write_cursor(&self) -> usize { self.slots.head() }

    pub fn running_sum(&self) -> f64 { self.running_sum }

    /// Sequence number the next pushed sample will receive.
    pub fn next_sequence(&self) -> u64 { self.next_seq }

    /// Drops all samples. Capacity is unchanged; sequence numbering continues.
    pub fn reset(&mut self) {
        self.slots.clear();
        self.running_sum = 0.0;
        self.current_average = 0.0;
        debug!(capacity = self.capacity(), "reset moving average");
    }

    /// Changes the window size, keeping the most recent samples that fit.
    ///
    /// Storage is always rebuilt in chronological order, so FIFO eviction
    /// stays correct whether the window grows or shrinks.
    pub fn resize(&mut self, new_capacity: usize) -> Result {
        if new_capacity == 0 {
            return Err(Error::InvalidCapacity(new_capacity));
        }
        let old_capacity = self.capacity();
        if new_capacity == old_capacity {
            return Ok(());
        }

        let dropped = self.slots.relinearize(new_capacity)?;
        if dropped > 0 {
            self.running_sum = self.sum_retained();
        }
        self.current_average = if self.slots.is_empty() {
            0.0
        } else {
            self.running_sum / self.slots.len() as f64
        };

        debug!(old_capacity, new_capacity, dropped, count = self.count(), "resized moving average");
        Ok(())
    }

    /// Retained values, oldest first.
    pub fn snapshot(&self) -> Vec<f64> {
        self.slots.iter().map(|s| s.value).collect()
    }

    /// Retained samples with their sequence numbers, oldest first.
    pub fn samples(&self) -> impl Iterator<Item = Sample> + '_ {
        self.slots.iter()
    }

    /// Recomputes the running sum from the retained samples, discarding any
    /// accumulated rounding error. Returns the correction applied.
    pub fn resync(&mut self) -> f64 {
        let exact = self.sum_retained();
        let drift = exact - self.running_sum;
        self.running_sum = exact;
        if !self.slots.is_empty() {
            self.current_average = exact / self.slots.len() as f64;
        }
        debug!(drift, "resynced running sum");
        drift
    }

    fn sum_retained(&self) -> f64 {
        self.slots.iter().map(|s| s.value).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(capacity: usize, values: &[f64]) -> RingAverage {
        let mut avg = RingAverage::new(capacity).unwrap();
        for &v in values {
            avg.push(v).unwrap();
        }
        avg
    }

    #[test]
    fn new_rejects_zero_capacity() {
        assert_eq!(RingAverage::new(0).unwrap_err(), Error::InvalidCapacity(0));
    }

    #[test]
    fn new_buffer_is_empty() -> crate::Result {
        let avg = RingAverage::new(4)?;
        assert_eq!(avg.count(), 0);
        assert_eq!(avg.write_cursor(), 0);
        assert_eq!(avg.running_sum(), 0.0);
        assert_eq!(avg.average(), Err(Error::EmptyBuffer));
        assert!(avg.snapshot().is_empty());
        Ok(())
    }

    #[test]
    fn average_of_partial_window() -> crate::Result {
        let avg = filled(5, &[2.0, 4.0, 9.0]);
        assert_eq!(avg.count(), 3);
        assert_eq!(avg.write_cursor(), 3);
        assert!((avg.average()? - 5.0).abs() < f64::EPSILON);
        Ok(())
    }

    #[test]
    fn full_window_evicts_oldest() -> crate::Result {
        let avg = filled(3, &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(avg.count(), 3);
        assert_eq!(avg.average()?, 3.0);
        assert_eq!(avg.snapshot(), vec![2.0, 3.0, 4.0]);
        assert_eq!(avg.write_cursor(), 1);
        Ok(())
    }

    #[test]
    fn push_after_full_shifts_snapshot() -> crate::Result {
        let mut avg = filled(3, &[1.0, 2.0, 3.0]);
        avg.push(10.0)?;
        assert_eq!(avg.snapshot(), vec![2.0, 3.0, 10.0]);
        avg.push(11.0)?;
        assert_eq!(avg.snapshot(), vec![3.0, 10.0, 11.0]);
        Ok(())
    }

    #[test]
    fn non_finite_samples_are_rejected() {
        let mut avg = filled(3, &[1.0]);
        assert!(matches!(avg.push(f64::NAN), Err(Error::NonFiniteSample(_))));
        assert_eq!(avg.push(f64::INFINITY), Err(Error::NonFiniteSample(f64::INFINITY)));
        assert_eq!(avg.count(), 1);
        assert_eq!(avg.running_sum(), 1.0);
    }

    #[test]
    fn reset_matches_fresh_buffer() -> crate::Result {
        let mut avg = filled(3, &[5.0, 6.0, 7.0, 8.0]);
        avg.reset();
        assert_eq!(avg.count(), 0);
        assert_eq!(avg.capacity(), 3);
        assert_eq!(avg.average(), Err(Error::EmptyBuffer));

        let mut fresh = RingAverage::new(3)?;
        for v in [1.0, 2.0, 3.0, 4.0, 5.0] {
            avg.push(v)?;
            fresh.push(v)?;
        }
        assert_eq!(avg.snapshot(), fresh.snapshot());
        assert_eq!(avg.average()?, fresh.average()?);
        assert_eq!(avg.write_cursor(), fresh.write_cursor());
        Ok(())
    }

    #[test]
    fn reset_is_idempotent() -> crate::Result {
        let mut avg = RingAverage::new(2)?;
        avg.reset();
        avg.reset();
        assert_eq!(avg.count(), 0);
        assert_eq!(avg.write_cursor(), 0);
        assert_eq!(avg.running_sum(), 0.0);
        Ok(())
    }

    #[test]
    fn sequence_numbers_continue_across_reset() -> crate::Result {
        let mut avg = filled(2, &[1.0, 2.0, 3.0]);
        assert_eq!(avg.samples().map(|s| s.seq).collect::<Vec<_>>(), vec![1, 2]);
        avg.reset();
        avg.push(9.0)?;
        assert_eq!(avg.samples().next().map(|s| s.seq), Some(3));
        assert_eq!(avg.next_sequence(), 4);
        Ok(())
    }

    #[test]
    fn grow_then_fill_evicts_nothing() -> crate::Result {
        let mut avg = filled(3, &[1.0, 2.0, 3.0]);
        avg.resize(5)?;
        avg.push(4.0)?;
        avg.push(5.0)?;
        assert_eq!(avg.snapshot(), vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(avg.average()?, 3.0);
        Ok(())
    }

    #[test]
    fn grow_after_wraparound_keeps_fifo_order() -> crate::Result {
        let mut avg = filled(3, &[1.0, 2.0, 3.0, 4.0, 5.0]);
        avg.resize(5)?;
        assert_eq!(avg.write_cursor(), 3);
        avg.push(6.0)?;
        avg.push(7.0)?;
        assert_eq!(avg.snapshot(), vec![3.0, 4.0, 5.0, 6.0, 7.0]);
        avg.push(8.0)?;
        assert_eq!(avg.snapshot(), vec![4.0, 5.0, 6.0, 7.0, 8.0]);
        assert_eq!(avg.running_sum(), 30.0);
        Ok(())
    }

    #[test]
    fn shrink_keeps_most_recent() -> crate::Result {
        let mut avg = filled(5, &[1.0, 2.0, 3.0, 4.0, 5.0]);
        avg.resize(2)?;
        assert_eq!(avg.snapshot(), vec![4.0, 5.0]);
        assert_eq!(avg.average()?, 4.5);
        assert_eq!(avg.running_sum(), 9.0);
        assert_eq!(avg.write_cursor(), 0);
        assert!(avg.is_full());
        Ok(())
    }

    #[test]
    fn shrink_when_samples_fit() -> crate::Result {
        let mut avg = filled(6, &[1.0, 2.0]);
        avg.resize(3)?;
        assert_eq!(avg.capacity(), 3);
        assert_eq!(avg.snapshot(), vec![1.0, 2.0]);
        assert_eq!(avg.write_cursor(), 2);
        assert_eq!(avg.running_sum(), 3.0);
        Ok(())
    }

    #[test]
    fn resize_to_zero_fails_without_change() {
        let mut avg = filled(3, &[1.0, 2.0]);
        assert_eq!(avg.resize(0), Err(Error::InvalidCapacity(0)));
        assert_eq!(avg.capacity(), 3);
        assert_eq!(avg.snapshot(), vec![1.0, 2.0]);
    }

    #[test]
    fn unallocatable_capacity_is_out_of_memory() {
        assert_eq!(RingAverage::new(usize::MAX).unwrap_err(), Error::OutOfMemory(usize::MAX));
    }

    #[test]
    fn failed_grow_leaves_state_untouched() -> crate::Result {
        let mut avg = filled(3, &[1.0, 2.0, 3.0, 4.0]);
        let huge = usize::MAX / 2;
        assert_eq!(avg.resize(huge), Err(Error::OutOfMemory(huge)));
        assert_eq!(avg.capacity(), 3);
        assert_eq!(avg.write_cursor(), 1);
        assert_eq!(avg.snapshot(), vec![2.0, 3.0, 4.0]);
        assert_eq!(avg.running_sum(), 9.0);
        assert_eq!(avg.average()?, 3.0);

        avg.push(5.0)?;
        assert_eq!(avg.snapshot(), vec![3.0, 4.0, 5.0]);
        Ok(())
    }

    #[test]
    fn resize_to_same_capacity_is_noop() -> crate::Result {
        let mut avg = filled(3, &[1.0, 2.0, 3.0, 4.0]);
        avg.resize(3)?;
        assert_eq!(avg.write_cursor(), 1);
        assert_eq!(avg.snapshot(), vec![2.0, 3.0, 4.0]);
        Ok(())
    }

    #[test]
    fn resync_removes_drift() -> crate::Result {
        let mut avg = RingAverage::new(3)?;
        for _ in 0..10_000 {
            avg.push(0.1)?;
            avg.push(1e9)?;
        }
        avg.resync();
        let exact: f64 = avg.snapshot().iter().sum();
        assert_eq!(avg.running_sum(), exact);
        assert_eq!(avg.average()?, exact / 3.0);
        Ok(())
    }
}
