#![warn(missing_docs)]
#![doc(html_root_url = "https://docs.rs/lazylist-widgets/")]

//! # lazylist-widgets
//!
//! Virtualized rendering components for building terminal applications with
//! [bubbletea-rs](https://github.com/joshka/bubbletea-rs): a windowed list
//! that renders only the visible slice of a large collection, a lazy image
//! loader driven by single-fire visibility observations, and
//! debounce/throttle stabilizers for rapidly changing values.
//!
//! ## Overview
//!
//! Each component follows the Elm Architecture pattern with `update()` and
//! `view()` methods, exchanging messages through the bubbletea-rs runtime.
//! State transitions happen only in response to messages (key input, timer
//! ticks, visibility signals, load results), never concurrently, so the
//! components need no locking of their own.
//!
//! | Component | Description | Use Case |
//! |-----------|-------------|----------|
//! | `VirtualList` | Fixed-row-height windowed list | File listings, logs, search results |
//! | `LazyImage` | Deferred image/preview loading | Thumbnail grids, media browsers |
//! | `Observer` | One-shot visibility observation | Driving lazy loading from scroll state |
//! | `Debounce` | Emit after a quiet period | Search-as-you-type queries |
//! | `Throttle` | Bound emission rate | Scroll-position listeners |
//!
//! ## Quick Start
//!
//! ```rust
//! use lazylist_widgets::prelude::*;
//! use std::sync::Arc;
//!
//! let files: Vec<String> = (0..50_000).map(|i| format!("photo-{i:05}.jpg")).collect();
//!
//! let mut list = VirtualList::new(files, 1, 24, Arc::new(|f: &String, _| f.clone()))
//!     .with_width(60);
//!
//! list.page_down();
//! let frame = list.view();
//! # let _ = frame;
//! ```
//!
//! ## Composing the components
//!
//! The pieces are independent but designed to click together: register each
//! visible thumbnail's canvas bounds with an [`observer::Observer`], sweep
//! it from the list's scroll callback (wrapped in a
//! [`stabilize::Throttle`] if sweeps get expensive), and feed the resulting
//! [`observer::VisibleMsg`]s to the matching [`lazy_image::Model`]s.

pub mod key;
pub mod lazy_image;
pub mod observer;
pub mod stabilize;
pub mod virtual_list;

pub use key::{Binding, Help as KeyHelp, KeyMap, KeyPress};
pub use lazy_image::{
    new as lazy_image_new, FetchMsg, LoadErrorMsg, LoadState, LoadedMsg, Model as LazyImage,
    PulseTickMsg,
};
pub use observer::{Bounds, ObserveOptions, Observer, VisibleMsg};
pub use stabilize::{
    Debounce, DebounceTickMsg, DebouncedMsg, Throttle, ThrottleTickMsg, ThrottledMsg,
};
pub use virtual_list::{
    new as virtual_list_new, Model as VirtualList, RenderItem, Row, ScrollCallback,
    VirtualListKeyMap,
};

/// Prelude module for convenient imports.
///
/// ```rust
/// use lazylist_widgets::prelude::*;
/// ```
pub mod prelude {
    pub use crate::key::{Binding, Help as KeyHelp, KeyMap, KeyPress};
    pub use crate::lazy_image::{
        FetchMsg, LoadErrorMsg, LoadState, LoadedMsg, Model as LazyImage,
    };
    pub use crate::observer::{Bounds, ObserveOptions, Observer, VisibleMsg};
    pub use crate::stabilize::{Debounce, DebouncedMsg, Throttle, ThrottledMsg};
    pub use crate::virtual_list::{Model as VirtualList, Row, VirtualListKeyMap};
}
