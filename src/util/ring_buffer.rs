use crate::error::{Error, Result};

/// Fixed-capacity ring buffer. Oldest entry is overwritten when full.
///
/// Storage is allocated once up front; `push` never allocates. Only
/// `relinearize` replaces the backing store.
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    data: Vec<T>,
    head: usize,
    len:  usize,
    cap:  usize,
}

fn alloc_slots<T: Copy + Default>(cap: usize) -> Result<Vec<T>> {
    if cap == 0 {
        return Err(Error::InvalidCapacity(cap));
    }
    let mut data = Vec::new();
    data.try_reserve_exact(cap).map_err(|_| Error::OutOfMemory(cap))?;
    data.resize(cap, T::default());
    Ok(data)
}

impl<T: Copy + Default> RingBuffer<T> {
    pub fn with_capacity(cap: usize) -> Result<Self> {
        Ok(Self { data: alloc_slots(cap)?, head: 0, len: 0, cap })
    }

    /// Writes `val` at the cursor and returns the value it evicted, if the
    /// buffer was already full.
    pub fn push(&mut self, val: T) -> Option<T> {
        let evicted = if self.len == self.cap {
            Some(self.data[self.head])
        } else {
            self.len += 1;
            None
        };
        self.data[self.head] = val;
        self.head = (self.head + 1) % self.cap;
        evicted
    }

    /// Slot index of the oldest retained entry.
    fn start(&self) -> usize {
        (self.head + self.cap - self.len) % self.cap
    }

    /// Iterate from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        let start = self.start();
        let cap = self.cap;
        (0..self.len).map(move |i| self.data[(start + i) % cap])
    }

    /// Returns up to `n` most-recent values, oldest first.
    pub fn last_n(&self, n: usize) -> Vec<T> {
        let n = n.min(self.len);
        self.iter().skip(self.len - n).collect()
    }

    /// Moves the retained entries into a fresh store of `new_cap` slots, in
    /// chronological order starting at slot 0. When `new_cap` is smaller than
    /// `len`, only the most recent `new_cap` entries survive.
    ///
    /// Returns how many entries were discarded. On error the buffer is left
    /// exactly as it was.
    pub fn relinearize(&mut self, new_cap: usize) -> Result<usize> {
        let mut data = alloc_slots(new_cap)?;
        let kept = self.last_n(new_cap);
        data[..kept.len()].copy_from_slice(&kept);
        let dropped = self.len - kept.len();

        self.data = data;
        self.cap  = new_cap;
        self.len  = kept.len();
        self.head = kept.len() % new_cap;
        Ok(dropped)
    }

    /// Drops every entry. Capacity and the backing store are kept.
    pub fn clear(&mut self) {
        self.data.fill(T::default());
        self.head = 0;
        self.len = 0;
    }

    pub fn len(&self) -> usize { self.len }
    pub fn is_empty(&self) -> bool { self.len == 0 }
    pub fn is_full(&self) -> bool { self.len == self.cap }
    pub fn capacity(&self) -> usize { self.cap }

    /// Slot the next `push` writes to.
    pub fn head(&self) -> usize { self.head }
}
