//! Debounce and throttle stabilizers for rapidly changing values.
//!
//! Both components rate-limit how often a stream of updates to a single
//! value is allowed to propagate:
//!
//! - [`Debounce`] waits for a quiet period: a value is committed only after
//!   `delay` elapses with no newer value arriving. The last value of a
//!   burst always wins; superseded values are never emitted.
//! - [`Throttle`] bounds the emission rate: the first value in an interval
//!   is committed immediately, later ones coalesce into a single trailing
//!   emission at the interval's end, so the latest value is never dropped.
//!
//! Timers are Bubble Tea tick commands tagged with `(id, tag)`. Every
//! superseding update bumps the tag, so a stale timer that fires after its
//! value was replaced — or after the consumer was discarded — is rejected
//! in `update` instead of emitting. This is the release-on-teardown
//! guarantee: nothing can emit once its tag is no longer current.
//!
//! # Debouncing a search query
//!
//! ```rust
//! use lazylist_widgets::stabilize::{Debounce, DebouncedMsg};
//! use std::time::Duration;
//!
//! let mut query: Debounce<String> = Debounce::new(Duration::from_millis(300));
//!
//! // Each keystroke supersedes the previous pending value.
//! let _cmd = query.set("f".to_string());
//! let _cmd = query.set("fi".to_string());
//! let cmd = query.set("fil".to_string());
//! // Only the tick scheduled by the last `set` will commit; when the
//! // runtime delivers it, `update` emits DebouncedMsg { value: "fil" }.
//! # let _ = cmd;
//! ```

use bubbletea_rs::{tick as bubbletea_tick, Cmd, Msg};
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{Duration, Instant};

// Internal ID management shared by both stabilizer kinds
static LAST_ID: AtomicI64 = AtomicI64::new(0);

fn next_id() -> i64 {
    LAST_ID.fetch_add(1, Ordering::SeqCst) + 1
}

/// Internal tick ending a debounce quiet period.
#[derive(Debug, Clone)]
pub struct DebounceTickMsg {
    /// Identifier of the target debouncer.
    pub id: i64,
    tag: i64,
}

/// Emitted when a debounced value is committed.
#[derive(Debug, Clone)]
pub struct DebouncedMsg<T> {
    /// Identifier of the emitting debouncer.
    pub id: i64,
    /// The committed value.
    pub value: T,
}

/// Internal tick delivering a throttle's trailing emission.
#[derive(Debug, Clone)]
pub struct ThrottleTickMsg {
    /// Identifier of the target throttler.
    pub id: i64,
    tag: i64,
}

/// Emitted when a throttled value is committed.
#[derive(Debug, Clone)]
pub struct ThrottledMsg<T> {
    /// Identifier of the emitting throttler.
    pub id: i64,
    /// The committed value.
    pub value: T,
}

fn emit<M: Clone + Send + 'static>(msg: M) -> Cmd {
    bubbletea_tick(Duration::from_nanos(1), move |_| {
        Box::new(msg.clone()) as Msg
    })
}

/// Debounce stabilizer: commits the newest value once updates go quiet for
/// `delay`.
///
/// Guarantees, per quiescent period: at most one emission; the final value
/// of a burst is eventually emitted; superseded values are never emitted.
#[derive(Debug)]
pub struct Debounce<T> {
    delay: Duration,
    id: i64,
    tag: i64,
    pending: Option<T>,
    value: Option<T>,
}

impl<T: Clone + Send + 'static> Debounce<T> {
    /// Creates a debouncer with the given quiet-period length.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            id: next_id(),
            tag: 0,
            pending: None,
            value: None,
        }
    }

    /// Returns the unique identifier of this debouncer.
    pub fn id(&self) -> i64 {
        self.id
    }

    /// The last committed value, if any.
    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// Supersedes the pending value and restarts the quiet period.
    ///
    /// The returned command must be handed to the runtime; bumping the tag
    /// here is what cancels the previously scheduled tick.
    pub fn set(&mut self, value: T) -> Cmd {
        self.pending = Some(value);
        self.tag += 1;
        let id = self.id;
        let tag = self.tag;
        bubbletea_tick(self.delay, move |_| {
            Box::new(DebounceTickMsg { id, tag }) as Msg
        })
    }

    /// Handles quiet-period ticks.
    ///
    /// A tick whose tag is no longer current belongs to a superseded value
    /// and is dropped. The surviving tick commits the pending value and
    /// returns a command emitting [`DebouncedMsg`].
    pub fn update(&mut self, msg: Msg) -> Option<Cmd> {
        if let Some(tick_msg) = msg.downcast_ref::<DebounceTickMsg>() {
            if tick_msg.id != self.id || tick_msg.tag != self.tag {
                return None;
            }
            if let Some(value) = self.pending.take() {
                self.value = Some(value.clone());
                return Some(emit(DebouncedMsg { id: self.id, value }));
            }
        }
        None
    }
}

/// Throttle stabilizer: bounds emissions to one per `delay`, with
/// trailing-edge delivery of the latest coalesced value.
#[derive(Debug)]
pub struct Throttle<T> {
    delay: Duration,
    id: i64,
    tag: i64,
    last_emit: Option<Instant>,
    pending: Option<T>,
    trailing_scheduled: bool,
    value: Option<T>,
}

impl<T: Clone + Send + 'static> Throttle<T> {
    /// Creates a throttler with the given minimum emission interval.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            id: next_id(),
            tag: 0,
            last_emit: None,
            pending: None,
            trailing_scheduled: false,
            value: None,
        }
    }

    /// Returns the unique identifier of this throttler.
    pub fn id(&self) -> i64 {
        self.id
    }

    /// The last committed value, if any.
    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// Offers a new value.
    ///
    /// When at least `delay` has passed since the last emission the value
    /// is committed immediately and a [`ThrottledMsg`] command is returned.
    /// Otherwise the value replaces any pending one; a single trailing
    /// tick is scheduled for the remainder of the interval (`None` is
    /// returned when one is already in flight).
    pub fn set(&mut self, value: T) -> Option<Cmd> {
        let now = Instant::now();
        let within_interval = self
            .last_emit
            .is_some_and(|last| now.duration_since(last) < self.delay);

        if !within_interval {
            self.value = Some(value.clone());
            self.last_emit = Some(now);
            self.pending = None;
            // A trailing tick from the previous interval may still be in
            // flight; bump the tag so it is rejected as stale and cannot
            // emit inside the interval this emission just opened.
            self.tag += 1;
            self.trailing_scheduled = false;
            return Some(emit(ThrottledMsg { id: self.id, value }));
        }

        self.pending = Some(value);
        if self.trailing_scheduled {
            return None;
        }
        self.trailing_scheduled = true;
        self.tag += 1;
        let elapsed = self
            .last_emit
            .map(|last| now.duration_since(last))
            .unwrap_or_default();
        let remainder = self.delay.saturating_sub(elapsed);
        let id = self.id;
        let tag = self.tag;
        Some(bubbletea_tick(remainder, move |_| {
            Box::new(ThrottleTickMsg { id, tag }) as Msg
        }))
    }

    /// Handles trailing-edge ticks.
    ///
    /// Commits whatever value is pending when the interval ends, resetting
    /// the reference time so the next interval starts from this emission.
    pub fn update(&mut self, msg: Msg) -> Option<Cmd> {
        if let Some(tick_msg) = msg.downcast_ref::<ThrottleTickMsg>() {
            if tick_msg.id != self.id || tick_msg.tag != self.tag {
                return None;
            }
            self.trailing_scheduled = false;
            if let Some(value) = self.pending.take() {
                self.value = Some(value.clone());
                self.last_emit = Some(Instant::now());
                return Some(emit(ThrottledMsg { id: self.id, value }));
            }
        }
        None
    }
}
