//! Trail reconstruction from snapshot history.
//!
//! Each rebuild walks a window of past frames in the [`History`] and emits
//! one instance per occupied record into two batches: soft points and
//! oriented shapes. Older frames are drawn dimmer, hue-shifted and, for
//! points, diffused, so a particle's recent path reads as a trail.
//!
//! # Per-frame parameters
//!
//! For trail frame `i` of a kind with length `L`:
//!
//! | Quantity | Value |
//! |----------|-------|
//! | `t` | `i / (L - 0.9)` |
//! | lightness | `lightness * attenuation(t)` |
//! | hue | `(dot.hue + hue_offset + hue_transition * i / L) / 360`, wrapped to `[0, 1)` |
//! | diffusion (points) | `(1 - diffusion_transition(t)) * diffusion_scale` |
//! | shake (points) | `dot.lifetime * diffusion_shakiness + dot.seed * 100` |
//! | size (points) | `size_transition(t)` |
//! | rotation (shapes) | `dot.rotation * rot_z(PI * 0.02 * dot.lifetime)` |
//!
//! The `- 0.9` keeps `t` strictly below 1 at the tail, and exactly 0 for a
//! single-frame trail.
//!
//! Reconstruction only reads the history. Skipping it leaves the previous
//! geometry valid.

use crate::batch::{BatchStats, InstanceBatch, PointInstance, ShapeInstance, DEFAULT_BATCH_CAPACITY};
use crate::curve::Curve;
use crate::dot::Dot;
use crate::history::History;
use glam::{Quat, Vec4};
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;
use tracing::debug;

/// Extra spin of shape instances, in half-turns per step of lifetime.
pub const SHAPE_SPIN_RATE: f32 = 0.02;

/// Trail settings for oriented shapes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeTrailOptions {
    pub saturation: f32,
    pub lightness: f32,
    /// Frames skipped before the trail starts.
    pub snapshot_offset: usize,
    /// Degrees added to every hue.
    pub hue_offset: f32,
    /// Degrees of hue rotation across the full trail.
    pub hue_transition: f32,
    /// Number of frames sampled.
    pub trail_length: f32,
    /// Sample every n-th frame. Floored, at least 1.
    pub trail_step: f32,
    pub trail_attenuation: Curve,
}

impl Default for ShapeTrailOptions {
    fn default() -> Self {
        Self {
            saturation: 0.5,
            lightness: 0.5,
            snapshot_offset: 0,
            hue_offset: 0.0,
            hue_transition: 0.0,
            trail_length: 1.0,
            trail_step: 1.0,
            trail_attenuation: Curve::Linear,
        }
    }
}

/// Trail settings for points.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointTrailOptions {
    pub saturation: f32,
    pub lightness: f32,
    pub size_transition: Curve,
    /// Frames skipped before the trail starts.
    pub snapshot_offset: usize,
    /// Degrees added to every hue.
    pub hue_offset: f32,
    /// Degrees of hue rotation across the full trail.
    pub hue_transition: f32,
    /// Number of frames sampled.
    pub trail_length: f32,
    pub trail_attenuation: Curve,
    pub trail_diffusion_scale: f32,
    pub trail_diffusion_transition: Curve,
    pub trail_diffusion_shakiness: f32,
}

impl Default for PointTrailOptions {
    fn default() -> Self {
        Self {
            saturation: 0.5,
            lightness: 0.5,
            size_transition: Curve::Linear,
            snapshot_offset: 10,
            hue_offset: 0.0,
            hue_transition: 0.0,
            trail_length: 1.0,
            trail_attenuation: Curve::Linear,
            trail_diffusion_scale: 0.0,
            trail_diffusion_transition: Curve::Linear,
            trail_diffusion_shakiness: 0.0,
        }
    }
}

/// Result of one [`TrailRenderer::update_state`] call.
///
/// `None` means the kind is hidden and its batch was left untouched.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RebuildStats {
    pub points: Option<BatchStats>,
    pub shapes: Option<BatchStats>,
}

/// Owns the trail options and the two output batches.
pub struct TrailRenderer {
    pub points: InstanceBatch<PointInstance>,
    pub shapes: InstanceBatch<ShapeInstance>,
    pub point_options: PointTrailOptions,
    pub shape_options: ShapeTrailOptions,
}

impl TrailRenderer {
    /// Renderer with default options and [`DEFAULT_BATCH_CAPACITY`] per batch.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_BATCH_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: InstanceBatch::new(capacity),
            shapes: InstanceBatch::new(capacity),
            point_options: PointTrailOptions::default(),
            shape_options: ShapeTrailOptions::default(),
        }
    }

    /// Rebuild every visible batch from `history`.
    pub fn update_state(&mut self, history: &History<Dot>) -> RebuildStats {
        let shapes = self
            .shapes
            .visible
            .then(|| build_shapes(&self.shape_options, history, &mut self.shapes));
        let points = self
            .points
            .visible
            .then(|| build_points(&self.point_options, history, &mut self.points));

        debug!(
            points = points.map(|s| s.written),
            shapes = shapes.map(|s| s.written),
            "Trails rebuilt"
        );
        RebuildStats { points, shapes }
    }
}

impl Default for TrailRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalized position of trail frame `i` in a trail of `length` frames.
#[inline]
pub fn trail_position(i: usize, length: f32) -> f32 {
    let t = i as f32 / (length - 0.9);
    if t.is_nan() {
        0.0
    } else {
        t
    }
}

/// Hue of a record on trail frame `i`, in `[0, 1)`.
#[inline]
pub fn trail_hue(dot_hue: f32, hue_offset: f32, hue_transition: f32, i: usize, length: f32) -> f32 {
    ((dot_hue + hue_offset + hue_transition * i as f32 / length) / 360.0).rem_euclid(1.0)
}

/// Trail frames worth visiting: `ceil(length)`, cut at the last frame
/// `history` still holds past `offset`.
fn frame_count(length: f32, offset: usize, history: &History<Dot>) -> usize {
    let requested = if length.is_finite() && length > 0.0 {
        length.ceil() as usize
    } else {
        0
    };
    requested.min(history.len().saturating_sub(offset))
}

fn build_shapes(
    options: &ShapeTrailOptions,
    history: &History<Dot>,
    batch: &mut InstanceBatch<ShapeInstance>,
) -> BatchStats {
    let length = options.trail_length;
    let step = (options.trail_step.floor() as usize).max(1);

    let mut update = batch.begin_update_state();
    let frames = frame_count(length, options.snapshot_offset, history);
    for i in (0..frames).step_by(step) {
        let l = options.trail_attenuation.eval(trail_position(i, length));
        for dot in history.snapshot(options.snapshot_offset.saturating_add(i)) {
            if dot.opacity == 0.0 {
                continue;
            }
            let rotation = dot.rotation * Quat::from_rotation_z(PI * SHAPE_SPIN_RATE * dot.lifetime);
            let hue = trail_hue(dot.hue, options.hue_offset, options.hue_transition, i, length);
            update.put(ShapeInstance {
                position: dot.position,
                _pad: 0.0,
                rotation,
                color: Vec4::new(hue, options.saturation, options.lightness * l, dot.opacity),
            });
        }
    }
    update.complete()
}

fn build_points(
    options: &PointTrailOptions,
    history: &History<Dot>,
    batch: &mut InstanceBatch<PointInstance>,
) -> BatchStats {
    let length = options.trail_length;

    let mut update = batch.begin_update_state();
    let frames = frame_count(length, options.snapshot_offset, history);
    for i in 0..frames {
        let t = trail_position(i, length);
        let l = options.trail_attenuation.eval(t);
        let diffusion = (1.0 - options.trail_diffusion_transition.eval(t)) * options.trail_diffusion_scale;
        let size = options.size_transition.eval(t);
        for dot in history.snapshot(options.snapshot_offset.saturating_add(i)) {
            if dot.opacity == 0.0 {
                continue;
            }
            let hue = trail_hue(dot.hue, options.hue_offset, options.hue_transition, i, length);
            update.put(PointInstance {
                position: dot.position,
                diffusion,
                color: Vec4::new(hue, options.saturation, options.lightness * l, dot.opacity),
                shake: dot.lifetime * options.trail_diffusion_shakiness + dot.seed * 100.0,
                size,
                _pad: [0.0; 2],
            });
        }
    }
    update.complete()
}
