//! Fixed-capacity snapshot history.
//!
//! [`History`] records one frame of per-entity state per simulation step into
//! a preallocated arena of reusable records. Nothing is allocated after
//! construction: every commit overwrites the oldest frame in place.
//!
//! # Layout
//!
//! Records live in a single flat pool addressed by
//! `(frame_index % capacity) * frame_size + slot`. Each frame remembers how
//! many of its slots were written by the last commit, so readers only walk
//! the occupied prefix. Slots past that prefix are always marked empty.
//!
//! # Offsets
//!
//! `snapshot(0)` is the most recent commit, `snapshot(1)` the one before it,
//! and so on. Offsets at or beyond the number of frames actually held
//! (`min(commits, capacity)`) resolve to an empty snapshot. Reads never wrap
//! around to a newer frame.
//!
//! # Example
//!
//! ```ignore
//! let mut history = History::new(Dot::default, 300, 4096);
//!
//! // Once per executed step:
//! history.put_snapshot(field.particles(), Dot::copy_from);
//!
//! for dot in history.snapshot(10).iter() {
//!     // ...
//! }
//! ```

use tracing::{debug, warn};

/// A pooled record stored in a [`History`].
///
/// Implementors must be able to represent "nothing was here this frame"
/// without giving up their storage.
pub trait Record {
    /// Reset the record to the empty sentinel.
    fn mark_empty(&mut self);

    /// Whether the record holds the empty sentinel.
    fn is_empty(&self) -> bool;
}

/// Ring buffer of frames, each frame a fixed number of pooled records.
pub struct History<T: Record> {
    /// Flat record pool, `capacity * frame_size` long.
    slots: Vec<T>,
    /// Number of occupied slots per frame.
    lens: Vec<usize>,
    /// Frames held before the oldest is overwritten.
    capacity: usize,
    /// Records per frame.
    frame_size: usize,
    /// Frame index the next commit writes to.
    cursor: usize,
    /// Total commits since construction or the last `clear`.
    commits: u64,
    /// Entities that did not fit in the most recent frame.
    dropped: usize,
}

impl<T: Record> History<T> {
    /// Create a history holding `capacity` frames of `frame_size` records.
    ///
    /// `factory` is called exactly `capacity * frame_size` times, here and
    /// never again.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new<F>(mut factory: F, capacity: usize, frame_size: usize) -> Self
    where
        F: FnMut() -> T,
    {
        assert!(capacity > 0, "history capacity must be at least one frame");

        let mut slots = Vec::with_capacity(capacity * frame_size);
        for _ in 0..capacity * frame_size {
            let mut record = factory();
            record.mark_empty();
            slots.push(record);
        }

        Self {
            slots,
            lens: vec![0; capacity],
            capacity,
            frame_size,
            cursor: 0,
            commits: 0,
            dropped: 0,
        }
    }

    /// Record the current state of `source` as the newest frame.
    ///
    /// `copy` must fully populate the destination record from one entity.
    /// Entities beyond `frame_size` are skipped and counted in
    /// [`dropped`](Self::dropped). Returns the number of records written.
    pub fn put_snapshot<I, F>(&mut self, source: I, mut copy: F) -> usize
    where
        I: IntoIterator,
        F: FnMut(I::Item, &mut T),
    {
        let base = self.cursor * self.frame_size;
        let frame = &mut self.slots[base..base + self.frame_size];

        let mut written = 0;
        let mut dropped = 0;
        for entity in source {
            match frame.get_mut(written) {
                Some(record) => {
                    copy(entity, record);
                    written += 1;
                }
                None => dropped += 1,
            }
        }

        // Slots the previous occupant of this frame used but we did not.
        let stale = self.lens[self.cursor];
        if stale > written {
            for record in &mut frame[written..stale] {
                record.mark_empty();
            }
        }

        if dropped > 0 && self.dropped == 0 {
            warn!(
                dropped,
                frame_size = self.frame_size,
                "Snapshot frame full, extra entities not recorded"
            );
        }

        self.lens[self.cursor] = written;
        self.dropped = dropped;
        self.cursor = (self.cursor + 1) % self.capacity;
        self.commits += 1;

        debug!(written, commits = self.commits, "Snapshot committed");
        written
    }

    /// Frame committed `offset` commits before the most recent one.
    ///
    /// Returns an empty snapshot when `offset` is not held.
    pub fn snapshot(&self, offset: usize) -> Snapshot<'_, T> {
        match self.frame_index(offset) {
            Some(frame) => {
                let base = frame * self.frame_size;
                Snapshot {
                    records: &self.slots[base..base + self.lens[frame]],
                }
            }
            None => Snapshot { records: &[] },
        }
    }

    /// Direct access to one slot of a held frame, occupied or not.
    pub fn get(&self, offset: usize, slot: usize) -> Option<&T> {
        if slot >= self.frame_size {
            return None;
        }
        let frame = self.frame_index(offset)?;
        self.slots.get(frame * self.frame_size + slot)
    }

    /// Number of frames currently held.
    pub fn len(&self) -> usize {
        self.commits.min(self.capacity as u64) as usize
    }

    /// Whether nothing has been committed yet.
    pub fn is_empty(&self) -> bool {
        self.commits == 0
    }

    /// Maximum number of frames held.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Records per frame.
    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    /// Total commits since construction or the last [`clear`](Self::clear).
    pub fn commits(&self) -> u64 {
        self.commits
    }

    /// Entities left out of the most recent commit.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Forget all history. The record pool is kept and emptied in place.
    pub fn clear(&mut self) {
        for frame in 0..self.capacity {
            let base = frame * self.frame_size;
            for record in &mut self.slots[base..base + self.lens[frame]] {
                record.mark_empty();
            }
            self.lens[frame] = 0;
        }
        self.cursor = 0;
        self.commits = 0;
        self.dropped = 0;
    }

    fn frame_index(&self, offset: usize) -> Option<usize> {
        if offset >= self.len() {
            return None;
        }
        Some((self.cursor + self.capacity - 1 - offset) % self.capacity)
    }
}

/// Read-only view of one committed frame.
///
/// Cheap to copy and can be iterated any number of times. It borrows the
/// [`History`], so it cannot be held across the next commit.
pub struct Snapshot<'a, T> {
    records: &'a [T],
}

impl<T> Clone for Snapshot<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Snapshot<'_, T> {}

impl<'a, T> Snapshot<'a, T> {
    /// Iterate the records written by the frame's commit.
    pub fn iter(&self) -> std::slice::Iter<'a, T> {
        self.records.iter()
    }

    /// Number of records written by the frame's commit.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the frame holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<'a, T> IntoIterator for Snapshot<'a, T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default, Debug, Clone, PartialEq)]
    struct Mark {
        value: u32,
        live: bool,
    }

    impl Record for Mark {
        fn mark_empty(&mut self) {
            self.live = false;
        }

        fn is_empty(&self) -> bool {
            !self.live
        }
    }

    fn write(mark: &u32, record: &mut Mark) {
        record.value = *mark;
        record.live = true;
    }

    fn values(history: &History<Mark>, offset: usize) -> Vec<u32> {
        history.snapshot(offset).iter().map(|m| m.value).collect()
    }

    #[test]
    fn test_empty_before_first_commit() {
        let history: History<Mark> = History::new(Mark::default, 4, 2);
        assert!(history.is_empty());
        assert!(history.snapshot(0).is_empty());
        assert!(history.get(0, 0).is_none());
    }

    #[test]
    fn test_recency_order() {
        let mut history = History::new(Mark::default, 4, 2);
        for frame in 1..=3u32 {
            history.put_snapshot(&[frame, frame * 10], write);
        }

        assert_eq!(values(&history, 0), vec![3, 30]);
        assert_eq!(values(&history, 1), vec![2, 20]);
        assert_eq!(values(&history, 2), vec![1, 10]);
        // Only three frames held so far.
        assert!(history.snapshot(3).is_empty());
    }

    #[test]
    fn test_wraps_over_oldest() {
        let mut history = History::new(Mark::default, 3, 1);
        for frame in 0..5u32 {
            history.put_snapshot(&[frame], write);
        }

        assert_eq!(history.len(), 3);
        assert_eq!(values(&history, 0), vec![4]);
        assert_eq!(values(&history, 2), vec![2]);
        assert!(history.snapshot(3).is_empty());
    }

    #[test]
    fn test_surplus_slots_marked_empty() {
        let mut history = History::new(Mark::default, 1, 3);
        history.put_snapshot(&[1, 2, 3], write);
        history.put_snapshot(&[9], write);

        assert_eq!(values(&history, 0), vec![9]);
        assert!(history.get(0, 1).is_some_and(|m| m.is_empty()));
        assert!(history.get(0, 2).is_some_and(|m| m.is_empty()));
        assert!(history.get(0, 3).is_none());
    }

    #[test]
    fn test_overflow_is_counted() {
        let mut history = History::new(Mark::default, 2, 2);
        let written = history.put_snapshot(&[1, 2, 3, 4], write);
        assert_eq!(written, 2);
        assert_eq!(history.dropped(), 2);

        history.put_snapshot(&[5], write);
        assert_eq!(history.dropped(), 0);
    }

    #[test]
    fn test_snapshot_is_restartable() {
        let mut history = History::new(Mark::default, 2, 3);
        history.put_snapshot(&[7, 8], write);

        let snapshot = history.snapshot(0);
        let first: Vec<u32> = snapshot.iter().map(|m| m.value).collect();
        let second: Vec<u32> = snapshot.into_iter().map(|m| m.value).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_clear_forgets_frames() {
        let mut history = History::new(Mark::default, 2, 2);
        history.put_snapshot(&[1, 2], write);
        history.clear();

        assert_eq!(history.commits(), 0);
        assert!(history.snapshot(0).is_empty());

        history.put_snapshot(&[3], write);
        assert_eq!(values(&history, 0), vec![3]);
        assert!(history.snapshot(1).is_empty());
    }
}
