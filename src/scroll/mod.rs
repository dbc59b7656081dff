// SPDX-License-Identifier: GPL-3.0-only
//! Mouse-wheel control over the tray indicator
//!
//! The tray collaborator records where its icon is whenever it reports a
//! hover. A low-level mouse hook then asks [`classify`] for every wheel event:
//! inside the zone the event is swallowed and turned into a brightness step,
//! anywhere else it passes through untouched.
//!
//! [`ScrollZone`] is read from the hook thread and written from the owning
//! thread, so it is lock-free.

#[cfg(windows)]
mod hook;

use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};

#[cfg(windows)]
pub use hook::ScrollFilter;

/// Half-size of the square around the anchor that counts as "over the icon"
pub const TOLERANCE_PX: i32 = 20;

/// Screen position in physical pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// Signed step for a brightness change of `step` percent
    pub fn apply(self, step: i32) -> i32 {
        match self {
            Direction::Up => step,
            Direction::Down => -step,
        }
    }
}

/// What the hook should do with a wheel event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDecision {
    /// Hand the event to the next hook
    PassThrough,
    /// Consume the event and step brightness
    Swallow(Direction),
}

/// Last known center of the tray icon
#[derive(Debug, Default)]
pub struct ScrollZone {
    known: AtomicBool,
    x: AtomicI32,
    y: AtomicI32,
}

impl ScrollZone {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember the icon center reported by a tray hover
    pub fn record_hover(&self, center: Point) {
        self.x.store(center.x, Ordering::Relaxed);
        self.y.store(center.y, Ordering::Relaxed);
        self.known.store(true, Ordering::Release);
    }

    /// Forget the anchor, e.g. when the tray icon is hidden
    pub fn clear(&self) {
        self.known.store(false, Ordering::Release);
    }

    pub fn anchor(&self) -> Option<Point> {
        if !self.known.load(Ordering::Acquire) {
            return None;
        }
        Some(Point::new(
            self.x.load(Ordering::Relaxed),
            self.y.load(Ordering::Relaxed),
        ))
    }

    /// Whether `cursor` is within [`TOLERANCE_PX`] of the anchor, edges
    /// included
    pub fn contains(&self, cursor: Point) -> bool {
        self.anchor().is_some_and(|anchor| {
            (cursor.x - anchor.x).abs() <= TOLERANCE_PX && (cursor.y - anchor.y).abs() <= TOLERANCE_PX
        })
    }
}

/// Decide what to do with one wheel event
///
/// # Arguments
///
/// * `cursor` - Cursor position of the event
/// * `delta` - Signed wheel delta, positive away from the user
pub fn classify(zone: &ScrollZone, cursor: Point, delta: i16) -> ScrollDecision {
    if delta == 0 || !zone.contains(cursor) {
        return ScrollDecision::PassThrough;
    }
    if delta > 0 {
        ScrollDecision::Swallow(Direction::Up)
    } else {
        ScrollDecision::Swallow(Direction::Down)
    }
}
