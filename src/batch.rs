//! Fixed-capacity geometry batches for trail instances.
//!
//! A batch is a CPU-side instance buffer that a renderer can upload as-is.
//! It is rebuilt wholesale: [`InstanceBatch::begin_update_state`] starts a
//! new pass, [`BatchUpdate::put`] appends instances and
//! [`BatchUpdate::complete`] finishes it. The update borrows the batch
//! mutably and `complete` consumes it, so a pass is finished exactly once.
//! Dropping an unfinished update completes it.
//!
//! # Overflow
//!
//! Storage is reserved up front and never grows. Instances past capacity are
//! discarded and counted in [`BatchStats::dropped`]; one warning is logged
//! per pass that overflowed.

use bytemuck::{Pod, Zeroable};
use glam::{Quat, Vec3, Vec4};
use tracing::warn;

/// Maximum instances per batch used when none is configured.
pub const DEFAULT_BATCH_CAPACITY: usize = 80_000;

/// One point-trail instance.
///
/// `color` is HSLA with every channel in `[0, 1]`.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct PointInstance {
    pub position: Vec3,
    /// Diffusion magnitude applied by the point shader.
    pub diffusion: f32,
    pub color: Vec4,
    /// Seed-keyed phase for diffusion jitter.
    pub shake: f32,
    /// Size multiplier.
    pub size: f32,
    pub _pad: [f32; 2],
}

/// One oriented-shape trail instance.
///
/// `color` is HSLA with every channel in `[0, 1]`.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct ShapeInstance {
    pub position: Vec3,
    pub _pad: f32,
    pub rotation: Quat,
    pub color: Vec4,
}

/// Summary of one completed batch pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchStats {
    /// Instances kept.
    pub written: usize,
    /// Instances discarded because the batch was full.
    pub dropped: usize,
}

/// Instance buffer rebuilt once per trail pass.
pub struct InstanceBatch<I: Pod> {
    instances: Vec<I>,
    capacity: usize,
    /// Whether the renderer should draw this batch. Hidden batches are not rebuilt.
    pub visible: bool,
    last: BatchStats,
    revision: u64,
}

impl<I: Pod> InstanceBatch<I> {
    /// Batch holding at most `capacity` instances.
    pub fn new(capacity: usize) -> Self {
        Self {
            instances: Vec::with_capacity(capacity),
            capacity,
            visible: true,
            last: BatchStats::default(),
            revision: 0,
        }
    }

    /// Start a new pass, discarding the previous contents.
    pub fn begin_update_state(&mut self) -> BatchUpdate<'_, I> {
        self.instances.clear();
        BatchUpdate {
            batch: self,
            dropped: 0,
            finished: false,
        }
    }

    /// Instances written by the last pass.
    pub fn instances(&self) -> &[I] {
        &self.instances
    }

    /// Raw bytes of [`instances`](Self::instances), ready for upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.instances)
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Stats of the last completed pass.
    pub fn last_stats(&self) -> BatchStats {
        self.last
    }

    /// Number of completed passes. Renderers re-upload when this changes.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

/// An in-progress batch pass.
#[must_use = "a batch update should be completed"]
pub struct BatchUpdate<'a, I: Pod> {
    batch: &'a mut InstanceBatch<I>,
    dropped: usize,
    finished: bool,
}

impl<I: Pod> BatchUpdate<'_, I> {
    /// Append an instance. Returns `false` if the batch is full and the
    /// instance was dropped.
    #[inline]
    pub fn put(&mut self, instance: I) -> bool {
        if self.batch.instances.len() < self.batch.capacity {
            self.batch.instances.push(instance);
            true
        } else {
            self.dropped += 1;
            false
        }
    }

    /// Instances written so far in this pass.
    pub fn len(&self) -> usize {
        self.batch.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batch.instances.is_empty()
    }

    /// Finish the pass.
    pub fn complete(mut self) -> BatchStats {
        self.finish()
    }

    fn finish(&mut self) -> BatchStats {
        let stats = BatchStats {
            written: self.batch.instances.len(),
            dropped: self.dropped,
        };
        if stats.dropped > 0 {
            warn!(
                written = stats.written,
                dropped = stats.dropped,
                capacity = self.batch.capacity,
                "Trail batch full, instances dropped"
            );
        }
        self.batch.last = stats;
        self.batch.revision += 1;
        self.finished = true;
        stats
    }
}

impl<I: Pod> Drop for BatchUpdate<'_, I> {
    fn drop(&mut self) {
        if !self.finished {
            self.finish();
        }
    }
}
