//! Lazily loaded image component.
//!
//! Defers fetching an image (or any expensive preview) until its slot
//! scrolls into view. The model walks a strictly forward state machine:
//!
//! ```text
//! NotInView ──VisibleMsg──▶ Loading ──LoadedMsg────▶ Loaded
//!                              │
//!                              └────LoadErrorMsg──▶ Errored
//! ```
//!
//! `Loaded` and `Errored` are terminal for a given source; the component
//! never retries a failed fetch. Visibility comes from a one-shot
//! [`crate::observer::Observer`] registration, so re-entering view after the
//! first signal has no effect.
//!
//! The fetch itself is the environment's job: on the visibility signal the
//! model emits a [`FetchMsg`] carrying the source URL. The application
//! performs the request however it likes and reports back with
//! [`LoadedMsg`] or [`LoadErrorMsg`].
//!
//! # Usage
//!
//! ```rust
//! use lazylist_widgets::lazy_image::{Model, LoadState};
//! use lazylist_widgets::observer::{Bounds, Observer};
//!
//! let mut thumb = Model::new("https://example.com/a.png", "vacation photo");
//! let mut observer = Observer::new();
//! thumb.observe(&mut observer, Bounds::new(200, 8));
//!
//! // Until the observation fires, nothing is fetched.
//! assert_eq!(thumb.state(), LoadState::NotInView);
//!
//! for msg in observer.sweep(Bounds::new(180, 40)) {
//!     let _fetch_cmd = thumb.update(Box::new(msg));
//! }
//! assert_eq!(thumb.state(), LoadState::Loading);
//! ```

use crate::observer::{Bounds, ObserveOptions, Observer, VisibleMsg};
use bubbletea_rs::{tick as bubbletea_tick, Cmd, Msg};
use lipgloss_extras::prelude::*;
use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

// Internal ID management for lazy image instances
static LAST_ID: AtomicI64 = AtomicI64::new(0);

fn next_id() -> i64 {
    LAST_ID.fetch_add(1, Ordering::SeqCst) + 1
}

/// Frames of the pulsing placeholder decoration.
static PULSE_FRAMES: Lazy<Vec<String>> = Lazy::new(|| {
    vec![
        "█".to_string(),
        "▓".to_string(),
        "▒".to_string(),
        "░".to_string(),
    ]
});

const PULSE_FPS: Duration = Duration::from_millis(125); // time.Second / 8

/// Load state of a lazy image instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// The slot has not entered the viewport; nothing has been fetched.
    NotInView,
    /// Visible; the real fetch is in flight and the placeholder is shown.
    Loading,
    /// The image content arrived. Terminal.
    Loaded,
    /// The fetch failed. Terminal; never retried.
    Errored,
}

/// Message asking the environment to fetch an image source.
///
/// Emitted exactly once per instance, when its visibility observation
/// fires. The application resolves it by sending [`LoadedMsg`] or
/// [`LoadErrorMsg`] with the same `id`.
#[derive(Debug, Clone)]
pub struct FetchMsg {
    /// Identifier of the requesting instance.
    pub id: i64,
    /// Source URL to fetch.
    pub src: String,
}

/// Message reporting a completed fetch.
#[derive(Debug, Clone)]
pub struct LoadedMsg {
    /// Identifier of the target instance.
    pub id: i64,
    /// Rendered image content (e.g. a block-art thumbnail).
    pub content: String,
}

/// Message reporting a failed fetch.
#[derive(Debug, Clone)]
pub struct LoadErrorMsg {
    /// Identifier of the target instance.
    pub id: i64,
    /// Human-readable failure description.
    pub reason: String,
}

/// Tick driving the placeholder pulse animation.
#[derive(Debug, Clone)]
pub struct PulseTickMsg {
    /// Identifier of the target instance.
    pub id: i64,
    tag: i64,
}

/// Lazy image model.
#[derive(Debug, Clone)]
pub struct Model {
    /// Source URL of the image.
    pub src: String,
    /// Alternative text, shown in the error state.
    pub alt: String,
    /// Optional placeholder shown while the real image loads.
    pub placeholder: Option<String>,
    /// Style for the pulsing/placeholder presentation.
    pub placeholder_style: Style,
    /// Style for the error presentation.
    pub error_style: Style,
    /// Observation margin/threshold used by [`Model::observe`].
    pub observe_options: ObserveOptions,

    state: LoadState,
    content: Option<String>,
    error: Option<String>,
    frame: usize,
    id: i64,
    tag: i64,
}

impl Model {
    /// Creates a lazy image for `src` with the given alt text.
    pub fn new(src: impl Into<String>, alt: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            alt: alt.into(),
            placeholder: None,
            placeholder_style: Style::new().foreground(Color::from("240")),
            error_style: Style::new().foreground(Color::from("1")),
            observe_options: ObserveOptions::default(),
            state: LoadState::NotInView,
            content: None,
            error: None,
            frame: 0,
            id: next_id(),
            tag: 0,
        }
    }

    /// Builder method to set the placeholder shown while loading.
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// Builder method to override the observation margin and threshold.
    pub fn with_observe_options(mut self, opts: ObserveOptions) -> Self {
        self.observe_options = opts;
        self
    }

    /// Returns the unique identifier of this instance.
    pub fn id(&self) -> i64 {
        self.id
    }

    /// Current load state.
    pub fn state(&self) -> LoadState {
        self.state
    }

    /// The loaded content, once in the `Loaded` state.
    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    /// Registers this instance's slot with a visibility observer.
    ///
    /// Only meaningful while `NotInView`; once the observation has fired
    /// (or the state has otherwise advanced) this is a no-op so the
    /// one-shot contract holds even if the caller re-registers on every
    /// layout pass.
    pub fn observe(&self, observer: &mut Observer, bounds: Bounds) {
        if self.state == LoadState::NotInView {
            observer.observe(self.id, bounds, self.observe_options);
        }
    }

    /// Cancels any pending observation, e.g. on teardown.
    pub fn unobserve(&self, observer: &mut Observer) {
        observer.cancel(self.id);
    }

    /// Starts the placeholder pulse animation.
    pub fn init(&self) -> Cmd {
        self.pulse_tick()
    }

    fn pulse_tick(&self) -> Cmd {
        let id = self.id;
        let tag = self.tag;
        bubbletea_tick(PULSE_FPS, move |_| {
            Box::new(PulseTickMsg { id, tag }) as Msg
        })
    }

    fn fetch_cmd(&self) -> Cmd {
        let id = self.id;
        let src = self.src.clone();
        bubbletea_tick(Duration::from_nanos(1), move |_| {
            Box::new(FetchMsg {
                id,
                src: src.clone(),
            }) as Msg
        })
    }

    /// Handles visibility, load-result, and pulse messages.
    ///
    /// Messages for other instances (mismatched `id`) are ignored, as are
    /// transitions that would move the state machine backwards.
    pub fn update(&mut self, msg: Msg) -> Option<Cmd> {
        if let Some(visible) = msg.downcast_ref::<VisibleMsg>() {
            if visible.id != self.id || self.state != LoadState::NotInView {
                return None;
            }
            self.state = LoadState::Loading;
            return Some(self.fetch_cmd());
        }

        if let Some(loaded) = msg.downcast_ref::<LoadedMsg>() {
            if loaded.id != self.id || self.state != LoadState::Loading {
                return None;
            }
            self.state = LoadState::Loaded;
            self.content = Some(loaded.content.clone());
            return None;
        }

        if let Some(err) = msg.downcast_ref::<LoadErrorMsg>() {
            if err.id != self.id || self.state != LoadState::Loading {
                return None;
            }
            self.state = LoadState::Errored;
            self.error = Some(err.reason.clone());
            return None;
        }

        if let Some(tick_msg) = msg.downcast_ref::<PulseTickMsg>() {
            if tick_msg.id != self.id {
                return None;
            }
            // Reject stale ticks so the pulse cannot run twice as fast.
            if tick_msg.tag != self.tag {
                return None;
            }
            // Terminal states have nothing to animate.
            if matches!(self.state, LoadState::Loaded | LoadState::Errored) {
                return None;
            }
            self.frame = (self.frame + 1) % PULSE_FRAMES.len();
            self.tag += 1;
            return Some(self.pulse_tick());
        }

        None
    }

    /// Renders the current state.
    ///
    /// `NotInView` shows the pulsing decoration; `Loading` shows the
    /// placeholder (or keeps pulsing when none is set); `Loaded` shows the
    /// fetched content; `Errored` shows a permanent error marker with the
    /// alt text.
    pub fn view(&self) -> String {
        match self.state {
            LoadState::NotInView => self.placeholder_style.render(&PULSE_FRAMES[self.frame]),
            LoadState::Loading => match &self.placeholder {
                Some(p) => self.placeholder_style.render(p),
                None => self.placeholder_style.render(&PULSE_FRAMES[self.frame]),
            },
            LoadState::Loaded => self.content.clone().unwrap_or_default(),
            LoadState::Errored => self.error_style.render(&format!("⚠ {}", self.alt)),
        }
    }
}

/// Creates a lazy image; shorthand for [`Model::new`].
pub fn new(src: impl Into<String>, alt: impl Into<String>) -> Model {
    Model::new(src, alt)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn visible(id: i64) -> Msg {
        Box::new(VisibleMsg { id })
    }

    #[test]
    fn test_starts_not_in_view() {
        let img = Model::new("https://example.com/a.png", "a");
        assert_eq!(img.state(), LoadState::NotInView);
        assert!(img.content().is_none());
    }

    #[test]
    fn test_visibility_triggers_single_fetch() {
        let mut img = Model::new("https://example.com/a.png", "a");

        let first = img.update(visible(img.id()));
        assert!(first.is_some()); // fetch requested
        assert_eq!(img.state(), LoadState::Loading);

        // A second visibility signal is ignored: no re-observation, no refetch.
        let second = img.update(visible(img.id()));
        assert!(second.is_none());
        assert_eq!(img.state(), LoadState::Loading);
    }

    #[test]
    fn test_never_observed_never_fetches() {
        let mut img = Model::new("https://example.com/a.png", "a");
        let mut observer = Observer::new();
        img.observe(&mut observer, Bounds::new(10_000, 4));

        // Sweeps that never reach the slot leave the instance untouched.
        for offset in [0, 50, 200] {
            for msg in observer.sweep(Bounds::new(offset, 40)) {
                img.update(Box::new(msg));
            }
        }
        assert_eq!(img.state(), LoadState::NotInView);
        assert!(observer.is_observing(img.id()));
    }

    #[test]
    fn test_load_success_is_terminal() {
        let mut img = Model::new("https://example.com/a.png", "a");
        img.update(visible(img.id()));
        img.update(Box::new(LoadedMsg {
            id: img.id(),
            content: "▄▀▄▀".to_string(),
        }));
        assert_eq!(img.state(), LoadState::Loaded);
        assert_eq!(img.content(), Some("▄▀▄▀"));

        // A late error report cannot move a terminal state.
        img.update(Box::new(LoadErrorMsg {
            id: img.id(),
            reason: "timeout".to_string(),
        }));
        assert_eq!(img.state(), LoadState::Loaded);
    }

    #[test]
    fn test_load_error_is_terminal() {
        let mut img = Model::new("https://example.com/a.png", "broken");
        img.update(visible(img.id()));
        img.update(Box::new(LoadErrorMsg {
            id: img.id(),
            reason: "404".to_string(),
        }));
        assert_eq!(img.state(), LoadState::Errored);
        assert!(img.view().contains("broken"));

        // No retry: a stray success afterwards is rejected.
        img.update(Box::new(LoadedMsg {
            id: img.id(),
            content: "late".to_string(),
        }));
        assert_eq!(img.state(), LoadState::Errored);
    }

    #[test]
    fn test_messages_for_other_instances_ignored() {
        let mut img = Model::new("https://example.com/a.png", "a");
        let other = img.id() + 999;
        assert!(img.update(visible(other)).is_none());
        assert_eq!(img.state(), LoadState::NotInView);
    }

    #[test]
    fn test_pulse_tag_filtering() {
        let mut img = Model::new("https://example.com/a.png", "a");
        img.tag = 3;

        let stale: Msg = Box::new(PulseTickMsg {
            id: img.id(),
            tag: 0,
        });
        assert!(img.update(stale).is_none());

        let current: Msg = Box::new(PulseTickMsg {
            id: img.id(),
            tag: 3,
        });
        assert!(img.update(current).is_some()); // schedules the next frame
        assert_eq!(img.tag, 4);
    }

    #[test]
    fn test_pulse_stops_in_terminal_states() {
        let mut img = Model::new("https://example.com/a.png", "a");
        img.update(visible(img.id()));
        img.update(Box::new(LoadedMsg {
            id: img.id(),
            content: "x".to_string(),
        }));

        let tick: Msg = Box::new(PulseTickMsg {
            id: img.id(),
            tag: img.tag,
        });
        assert!(img.update(tick).is_none());
    }

    #[test]
    fn test_observe_after_fire_is_noop() {
        let mut img = Model::new("https://example.com/a.png", "a");
        let mut observer = Observer::new();
        img.update(visible(img.id()));

        img.observe(&mut observer, Bounds::new(0, 4));
        assert!(observer.is_empty());
    }

    #[test]
    fn test_placeholder_shown_while_loading() {
        let mut img =
            Model::new("https://example.com/a.png", "a").with_placeholder("[thumbnail]");
        img.update(visible(img.id()));
        assert!(img.view().contains("[thumbnail]"));
    }
}
