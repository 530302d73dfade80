//! Integration tests for recording live particles into history.
//!
//! These drive a real [`Field`] and check what the history holds afterwards.

use dotrail::dot::Dot;
use dotrail::field::Field;
use dotrail::history::{History, Record};
use dotrail::prelude::*;

fn mover(speed: f32) -> Box<dyn Behavior> {
    Box::new(FnBehavior(move |state: &mut ParticleState, delta: f32, _: &mut Offspring| {
        state.lifetime += delta;
        state.position.x += speed * delta;
        Fate::Alive
    }))
}

fn fading(step: f32) -> Box<dyn Behavior> {
    Box::new(FnBehavior(move |state: &mut ParticleState, _: f32, _: &mut Offspring| {
        state.opacity -= step;
        Fate::Alive
    }))
}

fn record(field: &Field, history: &mut History<Dot>) -> usize {
    history.put_snapshot(field.particles(), Dot::copy_from)
}

// ============================================================================
// Recency and Wrap
// ============================================================================

#[test]
fn test_offset_zero_is_latest_commit() {
    let mut field = Field::with_seed(1);
    field.spawn(mover(1.0));
    let mut history = History::new(Dot::default, 300, 16);

    for _ in 0..5 {
        field.update(1.0);
        record(&field, &mut history);
    }

    for offset in 0..5 {
        let frame = history.snapshot(offset);
        assert_eq!(frame.len(), 1);
        let dot = frame.iter().next().copied().unwrap_or_default();
        assert_eq!(dot.position.x, (5 - offset) as f32);
        assert_eq!(dot.lifetime, (5 - offset) as f32);
    }
    assert!(history.snapshot(5).is_empty());
}

#[test]
fn test_wrap_keeps_most_recent_capacity_frames() {
    let mut field = Field::with_seed(2);
    field.spawn(mover(1.0));
    let mut history = History::new(Dot::default, 300, 4);

    for _ in 0..305 {
        field.update(1.0);
        record(&field, &mut history);
    }

    assert_eq!(history.commits(), 305);
    assert_eq!(history.len(), 300);
    assert_eq!(history.get(0, 0).map(|d| d.position.x), Some(305.0));
    // Commit 6 is the oldest survivor; commits 1..=5 were overwritten.
    assert_eq!(history.get(299, 0).map(|d| d.position.x), Some(6.0));
    assert!(history.snapshot(300).is_empty());
}

// ============================================================================
// Dead Slots and Copy Fidelity
// ============================================================================

#[test]
fn test_shrinking_population_leaves_no_stale_records() {
    let mut history = History::new(Dot::default, 2, 8);
    let mut field = Field::with_seed(3);
    for _ in 0..6 {
        field.spawn(mover(0.5));
    }
    field.update(1.0);
    assert_eq!(record(&field, &mut history), 6);

    // Fill the second frame, then wrap back onto the six-dot frame with two.
    field.update(1.0);
    record(&field, &mut history);
    field.clear();
    field.spawn(mover(0.5));
    field.spawn(mover(0.5));
    field.update(1.0);
    assert_eq!(record(&field, &mut history), 2);

    assert_eq!(history.snapshot(0).len(), 2);
    for slot in 2..6 {
        let dot = history.get(0, slot).copied().unwrap_or_default();
        assert!(dot.is_empty(), "slot {slot} should be empty");
    }
}

#[test]
fn test_records_are_detached_from_particles() {
    let mut field = Field::with_seed(4);
    field.spawn(mover(2.0));
    let mut history = History::new(Dot::default, 8, 4);

    field.update(1.0);
    record(&field, &mut history);
    let before = history.get(0, 0).copied();

    // Further simulation must not reach back into committed frames.
    field.update(1.0);
    assert_eq!(history.get(0, 0).copied(), before);

    let live = field.particles().next().map(|p| p.state);
    assert_eq!(live.map(|s| s.position.x), Some(4.0));
    assert_eq!(before.map(|d| d.position.x), Some(2.0));
}

#[test]
fn test_copy_preserves_every_field() {
    let mut field = Field::with_seed(5);
    field.spawn(Box::new(FnBehavior(|state: &mut ParticleState, _: f32, _: &mut Offspring| {
        state.lifetime = 12.5;
        state.position = Vec3::new(1.0, -2.0, 3.0);
        state.rotation = Quat::from_rotation_x(0.3);
        state.opacity = 0.75;
        state.hue = 210.0;
        Fate::Alive
    })));
    let mut history = History::new(Dot::default, 4, 4);

    field.update(1.0);
    record(&field, &mut history);

    let state = field.particles().next().map(|p| p.state).unwrap_or_default();
    let dot = history.get(0, 0).copied().unwrap_or_default();
    assert_eq!(dot.seed, state.seed);
    assert_eq!(dot.lifetime, 12.5);
    assert_eq!(dot.position, Vec3::new(1.0, -2.0, 3.0));
    assert_eq!(dot.rotation, state.rotation);
    assert_eq!(dot.opacity, 0.75);
    assert_eq!(dot.hue, 210.0);
}

#[test]
fn test_reaped_particles_are_not_recorded() {
    let mut field = Field::with_seed(6);
    field.spawn(fading(0.5));
    field.spawn(mover(1.0));
    let mut history = History::new(Dot::default, 4, 4);

    field.update(1.0);
    assert_eq!(record(&field, &mut history), 2);
    field.update(1.0);
    assert_eq!(record(&field, &mut history), 1);
    assert!(history.snapshot(0).iter().all(|d| d.opacity > 0.0));
}

#[test]
fn test_full_frame_counts_dropped() {
    let mut field = Field::with_seed(7);
    for _ in 0..5 {
        field.spawn(mover(1.0));
    }
    let mut history = History::new(Dot::default, 4, 3);

    field.update(1.0);
    assert_eq!(record(&field, &mut history), 3);
    assert_eq!(history.dropped(), 2);
    assert_eq!(history.snapshot(0).len(), 3);
}
