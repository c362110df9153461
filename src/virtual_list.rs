//! Virtualized (windowed) list component for rendering large collections.
//!
//! This module provides a fixed-row-height virtual list: given an ordered
//! collection of N items it materializes only the rows that intersect the
//! current viewport, plus a small overscan margin, so rendering cost is
//! bounded by the viewport size rather than by N.
//!
//! # Core Features
//!
//! - **Windowing**: only the visible index range is rendered, recomputed
//!   purely from the current scroll offset on every update
//! - **Overscan**: extra rows are materialized beyond the visible range to
//!   mask popping-in during fast scrolling (default 5)
//! - **Loading and empty states**: explicit visual states with customizable
//!   text and styling; loading takes precedence over empty
//! - **Scroll notifications**: an optional callback receives the raw scroll
//!   offset on every scroll change, unthrottled
//! - **Keyboard navigation**: vim-style bindings with arrow key alternatives
//!
//! # Quick Start
//!
//! ```rust
//! use lazylist_widgets::virtual_list::Model;
//! use std::sync::Arc;
//!
//! let items: Vec<String> = (0..10_000).map(|i| format!("file-{i}.txt")).collect();
//!
//! // One cell per row, a 24-cell-high container.
//! let mut list = Model::new(items, 1, 24, Arc::new(|item: &String, _| item.clone()));
//!
//! list.scroll_down(3);
//! let (start, end) = list.visible_range().unwrap();
//! assert!(start <= end);
//! let frame = list.view(); // exactly 24 terminal lines
//! # let _ = frame;
//! ```
//!
//! # Windowing Math
//!
//! With `scroll_top` in cells, uniform `item_height`, `container_height`, and
//! `overscan` the window is:
//!
//! ```text
//! start = max(0, scroll_top / item_height - overscan)
//! end   = min(N - 1, ceil((scroll_top + container_height) / item_height) + overscan)
//! ```
//!
//! Rows are conceptually positioned at `top = index * item_height` inside a
//! virtual canvas of height `N * item_height`; [`Model::view`] paints the
//! `container_height`-cell slice of that canvas starting at `scroll_top`.
//!
//! Variable-height rows are out of scope; every item must occupy exactly
//! `item_height` cells.

use crate::key::{self, KeyMap as KeyMapTrait};
use bubbletea_rs::{Cmd, KeyMsg, Msg};
use crossterm::event::{KeyCode, KeyModifiers};
use lipgloss_extras::prelude::*;
use std::sync::Arc;
use unicode_width::UnicodeWidthChar;

/// Renders one item into its row content.
///
/// The returned string may contain up to `item_height` lines; extra lines
/// are ignored and missing lines are padded with blanks.
pub type RenderItem<T> = Arc<dyn Fn(&T, usize) -> String + Send + Sync>;

/// Callback invoked with the raw scroll offset on every scroll change.
///
/// Delivery is unthrottled by design; callers that need rate limiting can
/// wrap the callback with [`crate::stabilize::Throttle`].
pub type ScrollCallback = Arc<dyn Fn(usize) + Send + Sync>;

/// Keyboard bindings for virtual list navigation.
///
/// Mirrors common pager controls: arrow keys and vim-style alternatives for
/// line movement, page and half-page scrolling, and home/end jumps.
#[derive(Debug, Clone)]
pub struct VirtualListKeyMap {
    /// Scroll up one row.
    pub up: key::Binding,
    /// Scroll down one row.
    pub down: key::Binding,
    /// Scroll up one page.
    pub page_up: key::Binding,
    /// Scroll down one page.
    pub page_down: key::Binding,
    /// Scroll up half a page.
    pub half_page_up: key::Binding,
    /// Scroll down half a page.
    pub half_page_down: key::Binding,
    /// Jump to the first row.
    pub go_to_start: key::Binding,
    /// Jump to the last row.
    pub go_to_end: key::Binding,
}

impl Default for VirtualListKeyMap {
    fn default() -> Self {
        Self {
            up: key::Binding::new(vec![KeyCode::Up, KeyCode::Char('k')]).with_help("↑/k", "up"),
            down: key::Binding::new(vec![KeyCode::Down, KeyCode::Char('j')])
                .with_help("↓/j", "down"),
            page_up: key::Binding::new(vec![KeyCode::PageUp, KeyCode::Char('b')])
                .with_help("b/pgup", "page up"),
            page_down: key::Binding::new(vec![
                KeyCode::PageDown,
                KeyCode::Char(' '),
                KeyCode::Char('f'),
            ])
            .with_help("f/pgdn", "page down"),
            half_page_up: key::Binding::new(vec![(KeyCode::Char('u'), KeyModifiers::CONTROL)])
                .with_help("ctrl+u", "½ page up"),
            half_page_down: key::Binding::new(vec![(KeyCode::Char('d'), KeyModifiers::CONTROL)])
                .with_help("ctrl+d", "½ page down"),
            go_to_start: key::Binding::new(vec![KeyCode::Home, KeyCode::Char('g')])
                .with_help("g/home", "go to start"),
            go_to_end: key::Binding::new(vec![KeyCode::End, KeyCode::Char('G')])
                .with_help("G/end", "go to end"),
        }
    }
}

impl KeyMapTrait for VirtualListKeyMap {
    fn short_help(&self) -> Vec<&key::Binding> {
        vec![&self.up, &self.down, &self.page_up, &self.page_down]
    }

    fn full_help(&self) -> Vec<Vec<&key::Binding>> {
        vec![
            vec![&self.up, &self.down],
            vec![&self.page_up, &self.page_down],
            vec![&self.half_page_up, &self.half_page_down],
            vec![&self.go_to_start, &self.go_to_end],
        ]
    }
}

/// A materialized row: its item index, its position in the virtual canvas,
/// and its rendered content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// Index of the item in the collection.
    pub index: usize,
    /// Top position of the row in canvas cells (`index * item_height`).
    pub top: usize,
    /// Rendered row content, clipped to the list width.
    pub content: String,
}

/// Virtualized list model.
///
/// The model owns the item collection for the duration of a render cycle;
/// callers replace it wholesale via [`Model::set_items`] when it changes.
/// All windowing state is derived from `scroll_top` on demand — there is no
/// cached window to go stale.
///
/// # Examples
///
/// ```rust
/// use lazylist_widgets::virtual_list::Model;
/// use std::sync::Arc;
///
/// let mut list = Model::new(
///     vec!["a".to_string(), "b".to_string()],
///     1,
///     10,
///     Arc::new(|item: &String, i| format!("{i:>3}  {item}")),
/// )
/// .with_width(40)
/// .with_overscan(2);
///
/// assert_eq!(list.visible_range(), Some((0, 1)));
/// ```
///
/// # Invalid inputs
///
/// `item_height == 0` or `container_height == 0` are not validated; the
/// caller is responsible for supplying positive dimensions.
pub struct Model<T> {
    /// Uniform height of every row, in cells. Must be positive.
    pub item_height: usize,
    /// Height of the scrollable region, in cells. Must be positive.
    pub container_height: usize,
    /// Width the rendered rows are clipped to. `0` disables clipping.
    pub width: usize,
    /// Rows materialized beyond the strictly visible range on each side.
    pub overscan: usize,
    /// When set, the loading state is rendered instead of any rows. Takes
    /// precedence over the empty state.
    pub loading: bool,
    /// Style applied to the assembled frame.
    pub style: Style,
    /// Style for the loading state text.
    pub loading_style: Style,
    /// Style for the empty state text.
    pub empty_style: Style,
    /// Text shown while `loading` is set.
    pub loading_text: String,
    /// Text shown when the collection is empty.
    pub empty_text: String,
    /// Keyboard binding configuration.
    pub keymap: VirtualListKeyMap,

    items: Vec<T>,
    scroll_top: usize,
    render_item: RenderItem<T>,
    on_scroll: Option<ScrollCallback>,
}

impl<T> Model<T> {
    /// Creates a virtual list over `items`.
    ///
    /// `item_height` is the uniform per-row height and `container_height`
    /// the viewport height, both in cells. `render_item` produces the
    /// content of a single row and must be pure.
    pub fn new(
        items: Vec<T>,
        item_height: usize,
        container_height: usize,
        render_item: RenderItem<T>,
    ) -> Self {
        Self {
            item_height,
            container_height,
            width: 0,
            overscan: 5,
            loading: false,
            style: Style::new(),
            loading_style: Style::new().foreground(Color::from("240")),
            empty_style: Style::new().foreground(Color::from("240")),
            loading_text: "Loading…".to_string(),
            empty_text: "Nothing to show".to_string(),
            keymap: VirtualListKeyMap::default(),
            items,
            scroll_top: 0,
            render_item,
            on_scroll: None,
        }
    }

    /// Builder method to clip rendered rows to `width` cells.
    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    /// Builder method to set the overscan row count (default 5).
    pub fn with_overscan(mut self, overscan: usize) -> Self {
        self.overscan = overscan;
        self
    }

    /// Builder method to apply a lipgloss style to the assembled frame.
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Builder method to replace the loading state text.
    pub fn with_loading_text(mut self, text: impl Into<String>) -> Self {
        self.loading_text = text.into();
        self
    }

    /// Builder method to replace the empty state text.
    pub fn with_empty_text(mut self, text: impl Into<String>) -> Self {
        self.empty_text = text.into();
        self
    }

    /// Builder method to register a scroll-position callback.
    ///
    /// The callback receives the raw clamped offset on every scroll event,
    /// including ones that leave the offset unchanged (e.g. scrolling up
    /// while already at the top), with no rate limiting.
    pub fn on_scroll(mut self, callback: ScrollCallback) -> Self {
        self.on_scroll = Some(callback);
        self
    }

    /// Returns the items currently backing the list.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Replaces the item collection.
    ///
    /// The scroll offset is re-clamped so the viewport never points past
    /// the end of the new collection.
    pub fn set_items(&mut self, items: Vec<T>) {
        self.items = items;
        self.scroll_top = self.scroll_top.min(self.max_scroll_top());
    }

    /// Number of items in the collection.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns whether the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Current scroll offset in cells from the top of the virtual canvas.
    pub fn scroll_top(&self) -> usize {
        self.scroll_top
    }

    /// Total height of the virtual canvas: `len() * item_height`.
    pub fn total_height(&self) -> usize {
        self.items.len() * self.item_height
    }

    fn max_scroll_top(&self) -> usize {
        self.total_height().saturating_sub(self.container_height)
    }

    /// Returns whether the list is scrolled to the very top.
    pub fn at_top(&self) -> bool {
        self.scroll_top == 0
    }

    /// Returns whether the list is scrolled to the bottom.
    pub fn at_bottom(&self) -> bool {
        self.scroll_top >= self.max_scroll_top()
    }

    /// Vertical scroll progress from 0.0 (top) to 1.0 (bottom).
    pub fn scroll_percent(&self) -> f64 {
        let max = self.max_scroll_top();
        if max == 0 {
            return 1.0;
        }
        (self.scroll_top as f64 / max as f64).clamp(0.0, 1.0)
    }

    /// Sets the scroll offset, clamped to the valid range, and fires the
    /// scroll callback with the resulting raw offset.
    pub fn set_scroll_top(&mut self, offset: usize) {
        self.scroll_top = offset.min(self.max_scroll_top());
        if let Some(cb) = &self.on_scroll {
            cb(self.scroll_top);
        }
    }

    /// Scrolls down by `n` cells.
    pub fn scroll_down(&mut self, n: usize) {
        self.set_scroll_top(self.scroll_top.saturating_add(n));
    }

    /// Scrolls up by `n` cells.
    pub fn scroll_up(&mut self, n: usize) {
        self.set_scroll_top(self.scroll_top.saturating_sub(n));
    }

    /// Scrolls down one full page (`container_height` cells).
    pub fn page_down(&mut self) {
        self.scroll_down(self.container_height);
    }

    /// Scrolls up one full page.
    pub fn page_up(&mut self) {
        self.scroll_up(self.container_height);
    }

    /// Scrolls down half a page.
    pub fn half_page_down(&mut self) {
        self.scroll_down(self.container_height / 2);
    }

    /// Scrolls up half a page.
    pub fn half_page_up(&mut self) {
        self.scroll_up(self.container_height / 2);
    }

    /// Jumps to the top of the list.
    pub fn goto_top(&mut self) {
        self.set_scroll_top(0);
    }

    /// Jumps to the bottom of the list.
    pub fn goto_bottom(&mut self) {
        self.set_scroll_top(self.max_scroll_top());
    }

    /// Computes the materialized index window for the current offset.
    ///
    /// Returns `None` for an empty collection. Otherwise the window
    /// satisfies `0 <= start <= end <= len() - 1` and covers the visible
    /// slice plus `overscan` rows on each side.
    ///
    /// The computation is pure: the same offset and dimensions always
    /// produce the same window.
    pub fn visible_range(&self) -> Option<(usize, usize)> {
        if self.items.is_empty() || self.item_height == 0 {
            return None;
        }
        let n = self.items.len();
        let start = (self.scroll_top / self.item_height).saturating_sub(self.overscan);
        let visible_bottom = self.scroll_top + self.container_height;
        let end = (div_ceil(visible_bottom, self.item_height) + self.overscan).min(n - 1);
        Some((start.min(n - 1), end))
    }

    /// Materializes the rows of the current window.
    ///
    /// Only indices within [`Model::visible_range`] are rendered; each row
    /// carries its canvas position `top = index * item_height`.
    pub fn rows(&self) -> Vec<Row> {
        let Some((start, end)) = self.visible_range() else {
            return Vec::new();
        };
        (start..=end)
            .map(|index| {
                let mut content = (self.render_item)(&self.items[index], index);
                if self.width > 0 {
                    content = content
                        .split('\n')
                        .map(|line| truncate_to_width(line, self.width))
                        .collect::<Vec<_>>()
                        .join("\n");
                }
                Row {
                    index,
                    top: index * self.item_height,
                    content,
                }
            })
            .collect()
    }

    /// Handles navigation key messages.
    ///
    /// Returns `None` always; scrolling is synchronous state mutation and
    /// needs no follow-up command.
    pub fn update(&mut self, msg: Msg) -> Option<Cmd> {
        if let Some(key_msg) = msg.downcast_ref::<KeyMsg>() {
            if self.keymap.down.matches(key_msg) {
                self.scroll_down(self.item_height);
            } else if self.keymap.up.matches(key_msg) {
                self.scroll_up(self.item_height);
            } else if self.keymap.page_down.matches(key_msg) {
                self.page_down();
            } else if self.keymap.page_up.matches(key_msg) {
                self.page_up();
            } else if self.keymap.half_page_down.matches(key_msg) {
                self.half_page_down();
            } else if self.keymap.half_page_up.matches(key_msg) {
                self.half_page_up();
            } else if self.keymap.go_to_start.matches(key_msg) {
                self.goto_top();
            } else if self.keymap.go_to_end.matches(key_msg) {
                self.goto_bottom();
            }
        }
        None
    }

    /// Renders the `container_height`-cell frame for the current offset.
    ///
    /// State precedence: `loading` first, then the empty state, then the
    /// windowed rows. Rows are painted at their canvas positions so partial
    /// rows at the frame edges stay aligned while scrolling.
    pub fn view(&self) -> String {
        if self.loading {
            return self.style.render(&self.loading_style.render(&self.loading_text));
        }
        if self.items.is_empty() {
            return self.style.render(&self.empty_style.render(&self.empty_text));
        }

        let rows = self.rows();
        let mut frame_lines = Vec::with_capacity(self.container_height);
        for screen_line in 0..self.container_height {
            let canvas_y = self.scroll_top + screen_line;
            let line = rows
                .iter()
                .find(|row| {
                    canvas_y >= row.top && canvas_y < row.top + self.item_height
                })
                .map(|row| {
                    row.content
                        .split('\n')
                        .nth(canvas_y - row.top)
                        .unwrap_or("")
                        .to_string()
                })
                .unwrap_or_default();
            frame_lines.push(line);
        }
        self.style.render(&frame_lines.join("\n"))
    }
}

fn div_ceil(a: usize, b: usize) -> usize {
    a / b + usize::from(a % b != 0)
}

fn truncate_to_width(s: &str, width: usize) -> String {
    let mut out = String::new();
    let mut used = 0;
    for ch in s.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        used += w;
        out.push(ch);
    }
    out
}

/// Creates a virtual list; shorthand for [`Model::new`].
pub fn new<T>(
    items: Vec<T>,
    item_height: usize,
    container_height: usize,
    render_item: RenderItem<T>,
) -> Model<T> {
    Model::new(items, item_height, container_height, render_item)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn plain_list(n: usize, item_height: usize, container_height: usize) -> Model<String> {
        Model::new(
            (0..n).map(|i| format!("item {i}")).collect(),
            item_height,
            container_height,
            Arc::new(|item: &String, _| item.clone()),
        )
    }

    #[test]
    fn test_window_example_from_contract() {
        // itemHeight=50, containerHeight=500, overscan=5, N=1000, scrollTop=1000
        let mut list = plain_list(1000, 50, 500);
        list.set_scroll_top(1000);
        assert_eq!(list.visible_range(), Some((15, 35)));
    }

    #[test]
    fn test_window_invariants() {
        for (n, item_height, container, overscan, offset) in [
            (1usize, 1usize, 10usize, 0usize, 0usize),
            (10, 2, 5, 3, 7),
            (100, 1, 24, 5, 99),
            (3, 4, 50, 5, 0),
            (1000, 50, 500, 5, 49_500),
        ] {
            let mut list = plain_list(n, item_height, container).with_overscan(overscan);
            list.set_scroll_top(offset);
            let (start, end) = list.visible_range().unwrap();
            assert!(start <= end, "start {start} > end {end}");
            assert!(end <= n - 1, "end {end} out of bounds for N={n}");
            assert!(list.rows().len() <= end - start + 1);
        }
    }

    #[test]
    fn test_empty_collection_has_no_window() {
        let mut list = plain_list(0, 1, 10);
        assert_eq!(list.visible_range(), None);
        assert!(list.rows().is_empty());

        // Empty state regardless of scroll offset.
        list.set_scroll_top(500);
        assert!(list.view().contains("Nothing to show"));
    }

    #[test]
    fn test_loading_takes_precedence_over_empty() {
        let mut list = plain_list(0, 1, 10);
        list.loading = true;
        let frame = list.view();
        assert!(frame.contains("Loading"));
        assert!(!frame.contains("Nothing to show"));
    }

    #[test]
    fn test_rewindowing_is_idempotent() {
        let mut list = plain_list(200, 2, 30);
        let initial = list.visible_range();
        list.set_scroll_top(180);
        assert_ne!(list.visible_range(), initial);
        list.set_scroll_top(0);
        assert_eq!(list.visible_range(), initial);
    }

    #[test]
    fn test_scroll_offset_is_clamped() {
        let mut list = plain_list(10, 1, 5);
        list.set_scroll_top(10_000);
        assert_eq!(list.scroll_top(), 5); // 10*1 - 5
        assert!(list.at_bottom());
    }

    #[test]
    fn test_scroll_callback_receives_raw_offsets() {
        let seen: Arc<Mutex<Vec<usize>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut list = plain_list(100, 1, 10)
            .on_scroll(Arc::new(move |offset| sink.lock().unwrap().push(offset)));

        list.scroll_down(3);
        list.scroll_down(3);
        list.goto_top();
        assert_eq!(*seen.lock().unwrap(), vec![3, 6, 0]);
    }

    #[test]
    fn test_view_height_matches_container() {
        let mut list = plain_list(50, 1, 12);
        list.scroll_down(5);
        assert_eq!(list.view().lines().count(), 12);
    }

    #[test]
    fn test_multi_cell_rows_stay_aligned() {
        let list = Model::new(
            vec!["a".to_string(), "b".to_string()],
            2,
            4,
            Arc::new(|item: &String, _| format!("{item}\n  detail")),
        );
        let frame = list.view();
        let lines: Vec<&str> = frame.lines().collect();
        assert_eq!(lines[0], "a");
        assert_eq!(lines[1], "  detail");
        assert_eq!(lines[2], "b");
    }

    #[test]
    fn test_partial_row_at_frame_top() {
        let mut list = Model::new(
            (0..10).map(|i| i.to_string()).collect(),
            2,
            4,
            Arc::new(|item: &String, _| format!("{item}\nsecond")),
        );
        // Scrolled mid-row: the frame starts on the second line of row 0.
        list.set_scroll_top(1);
        let frame = list.view();
        assert_eq!(frame.lines().next(), Some("second"));
    }

    #[test]
    fn test_rows_clipped_to_width() {
        let list = Model::new(
            vec!["0123456789".to_string()],
            1,
            3,
            Arc::new(|item: &String, _| item.clone()),
        )
        .with_width(4);
        assert_eq!(list.rows()[0].content, "0123");
    }

    #[test]
    fn test_keymap_scrolls_by_row_height() {
        let mut list = plain_list(100, 3, 30);
        let msg: Msg = Box::new(KeyMsg {
            key: KeyCode::Char('j'),
            modifiers: KeyModifiers::NONE,
        });
        list.update(msg);
        assert_eq!(list.scroll_top(), 3);

        let msg: Msg = Box::new(KeyMsg {
            key: KeyCode::PageDown,
            modifiers: KeyModifiers::NONE,
        });
        list.update(msg);
        assert_eq!(list.scroll_top(), 33);
    }

    #[test]
    fn test_set_items_reclamps_offset() {
        let mut list = plain_list(100, 1, 10);
        list.goto_bottom();
        assert_eq!(list.scroll_top(), 90);
        list.set_items((0..20).map(|i| i.to_string()).collect());
        assert_eq!(list.scroll_top(), 10);
    }

    #[test]
    fn test_zero_dimensions_degrade_without_panicking() {
        // Invalid numeric inputs are the caller's responsibility, but
        // rendering must still produce output rather than divide by zero.
        let mut zero_row = plain_list(10, 0, 10);
        zero_row.set_scroll_top(3);
        assert_eq!(zero_row.visible_range(), None);
        assert!(zero_row.rows().is_empty());
        let _ = zero_row.view();

        let zero_container = plain_list(10, 1, 0);
        let (start, end) = zero_container.visible_range().unwrap();
        assert!(start <= end && end <= 9);
        assert_eq!(zero_container.view(), "");
    }

    #[test]
    fn test_scroll_percent_bounds() {
        let mut list = plain_list(100, 1, 10);
        assert_eq!(list.scroll_percent(), 0.0);
        list.goto_bottom();
        assert_eq!(list.scroll_percent(), 1.0);

        // Everything visible: treated as fully scrolled.
        let short = plain_list(3, 1, 10);
        assert_eq!(short.scroll_percent(), 1.0);
    }
}
