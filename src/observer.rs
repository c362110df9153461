//! Single-fire visibility observation for deferred work.
//!
//! The [`Observer`] is a registry of element bounds waiting to intersect the
//! viewport — the terminal analogue of a viewport-intersection facility. Each
//! registration fires at most once: when a sweep finds the element's visible
//! fraction at or above its threshold (within a proximity margin), the
//! observer produces a [`VisibleMsg`] and drops the registration. A
//! registration that never intersects never fires, and can be cancelled at
//! any time.
//!
//! Sweeps are driven by the caller, typically from a scroll handler:
//!
//! ```rust
//! use lazylist_widgets::observer::{Bounds, ObserveOptions, Observer};
//!
//! let mut observer = Observer::new();
//! observer.observe(1, Bounds::new(120, 4), ObserveOptions::default());
//!
//! // After a scroll, sweep with the current viewport.
//! let fired = observer.sweep(Bounds::new(100, 40));
//! assert_eq!(fired.len(), 1);
//! assert!(!observer.is_observing(1)); // one-shot
//! ```

use std::collections::HashMap;

/// Default proximity margin, in cells, added on both sides of the viewport.
pub const DEFAULT_MARGIN: usize = 50;

/// Default minimum visible fraction required to fire.
pub const DEFAULT_THRESHOLD: f64 = 0.1;

/// Configuration for a single observation.
#[derive(Debug, Clone, Copy)]
pub struct ObserveOptions {
    /// Proximity margin in cells; the viewport is expanded by this much on
    /// each side before computing intersection, so observations fire
    /// slightly before the element actually scrolls into view.
    pub margin: usize,
    /// Minimum fraction of the element that must fall inside the expanded
    /// viewport for the observation to fire, in `0.0..=1.0`.
    pub threshold: f64,
}

impl Default for ObserveOptions {
    fn default() -> Self {
        Self {
            margin: DEFAULT_MARGIN,
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

/// A vertical extent in canvas cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    /// Top edge, in cells from the top of the canvas.
    pub top: usize,
    /// Height in cells.
    pub height: usize,
}

impl Bounds {
    /// Creates a bounds value.
    pub fn new(top: usize, height: usize) -> Self {
        Self { top, height }
    }

    fn bottom(&self) -> usize {
        self.top + self.height
    }
}

/// Message produced when an observed element becomes visible.
///
/// Carried back into the update loop by the caller; the `id` matches the id
/// passed to [`Observer::observe`].
#[derive(Debug, Clone)]
pub struct VisibleMsg {
    /// Identifier of the registration that fired.
    pub id: i64,
}

#[derive(Debug)]
struct Entry {
    bounds: Bounds,
    opts: ObserveOptions,
}

/// Registry of pending visibility observations.
///
/// There is no cross-instance shared state: each observer owns its entries,
/// and lifecycle management is limited to registering, sweeping, and
/// cancelling.
#[derive(Debug, Default)]
pub struct Observer {
    entries: HashMap<i64, Entry>,
}

impl Observer {
    /// Creates an empty observer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `bounds` under `id`, replacing any previous registration
    /// with the same id.
    pub fn observe(&mut self, id: i64, bounds: Bounds, opts: ObserveOptions) {
        self.entries.insert(id, Entry { bounds, opts });
    }

    /// Cancels a pending observation. Returns whether one existed.
    pub fn cancel(&mut self, id: i64) -> bool {
        self.entries.remove(&id).is_some()
    }

    /// Returns whether `id` has a pending observation.
    pub fn is_observing(&self, id: i64) -> bool {
        self.entries.contains_key(&id)
    }

    /// Number of pending observations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether no observations are pending.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Checks every pending observation against `viewport` and fires those
    /// whose visible fraction meets their threshold.
    ///
    /// Fired registrations are removed before returning, so an id can fire
    /// at most once per registration regardless of how often the caller
    /// sweeps.
    pub fn sweep(&mut self, viewport: Bounds) -> Vec<VisibleMsg> {
        let fired: Vec<i64> = self
            .entries
            .iter()
            .filter(|(_, entry)| {
                visible_fraction(entry.bounds, viewport, entry.opts.margin)
                    >= entry.opts.threshold
            })
            .map(|(&id, _)| id)
            .collect();

        fired
            .into_iter()
            .map(|id| {
                self.entries.remove(&id);
                VisibleMsg { id }
            })
            .collect()
    }
}

/// Fraction of `bounds` inside `viewport` expanded by `margin` on each side.
fn visible_fraction(bounds: Bounds, viewport: Bounds, margin: usize) -> f64 {
    let view_top = viewport.top.saturating_sub(margin);
    let view_bottom = viewport.bottom() + margin;

    if bounds.height == 0 {
        // Degenerate elements count as fully visible when their edge is in range.
        return if bounds.top >= view_top && bounds.top <= view_bottom {
            1.0
        } else {
            0.0
        };
    }

    let overlap_top = bounds.top.max(view_top);
    let overlap_bottom = bounds.bottom().min(view_bottom);
    if overlap_bottom <= overlap_top {
        return 0.0;
    }
    (overlap_bottom - overlap_top) as f64 / bounds.height as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(margin: usize, threshold: f64) -> ObserveOptions {
        ObserveOptions { margin, threshold }
    }

    #[test]
    fn test_fires_once_and_is_removed() {
        let mut obs = Observer::new();
        obs.observe(7, Bounds::new(10, 5), opts(0, 0.1));

        let fired = obs.sweep(Bounds::new(0, 20));
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].id, 7);

        // Second sweep over the same viewport: nothing left to fire.
        assert!(obs.sweep(Bounds::new(0, 20)).is_empty());
        assert!(!obs.is_observing(7));
    }

    #[test]
    fn test_never_fires_out_of_range() {
        let mut obs = Observer::new();
        obs.observe(1, Bounds::new(1000, 5), opts(0, 0.1));

        for offset in [0, 100, 500] {
            assert!(obs.sweep(Bounds::new(offset, 50)).is_empty());
        }
        assert!(obs.is_observing(1)); // still pending, never fired
    }

    #[test]
    fn test_margin_fires_before_entry() {
        let mut obs = Observer::new();
        // Element starts at 140; viewport ends at 100. A 50-cell margin
        // reaches it, no margin does not.
        obs.observe(1, Bounds::new(140, 10), opts(0, 0.1));
        obs.observe(2, Bounds::new(140, 10), opts(50, 0.1));

        let fired = obs.sweep(Bounds::new(60, 40));
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].id, 2);
        assert!(obs.is_observing(1));
    }

    #[test]
    fn test_threshold_requires_enough_overlap() {
        let mut obs = Observer::new();
        // 2 of 100 cells visible: fraction 0.02.
        obs.observe(1, Bounds::new(48, 100), opts(0, 0.1));
        assert!(obs.sweep(Bounds::new(0, 50)).is_empty());

        // 20 of 100 cells visible: fraction 0.2.
        assert_eq!(obs.sweep(Bounds::new(0, 68)).len(), 1);
    }

    #[test]
    fn test_cancel_prevents_firing() {
        let mut obs = Observer::new();
        obs.observe(1, Bounds::new(0, 10), ObserveOptions::default());
        assert!(obs.cancel(1));
        assert!(!obs.cancel(1));
        assert!(obs.sweep(Bounds::new(0, 100)).is_empty());
    }

    #[test]
    fn test_sweep_fires_multiple_entries() {
        let mut obs = Observer::new();
        obs.observe(1, Bounds::new(0, 5), opts(0, 0.5));
        obs.observe(2, Bounds::new(5, 5), opts(0, 0.5));
        obs.observe(3, Bounds::new(500, 5), opts(0, 0.5));

        let mut ids: Vec<i64> = obs.sweep(Bounds::new(0, 20)).iter().map(|m| m.id).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(obs.len(), 1);
    }
}
