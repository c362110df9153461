//! Type-safe key bindings for component keymaps.
//!
//! A [`Binding`] groups one or more key combinations under a single action,
//! together with the help text shown by help views. Components collect their
//! bindings in a keymap struct and implement the [`KeyMap`] trait so help
//! rendering can stay generic.
//!
//! ```rust
//! use lazylist_widgets::key::Binding;
//! use crossterm::event::{KeyCode, KeyModifiers};
//!
//! let down = Binding::new(vec![KeyCode::Down, KeyCode::Char('j')])
//!     .with_help("↓/j", "down");
//! let save = Binding::new(vec![(KeyCode::Char('s'), KeyModifiers::CONTROL)])
//!     .with_help("ctrl+s", "save");
//! ```

use bubbletea_rs::KeyMsg;
use crossterm::event::{KeyCode, KeyModifiers};

/// A single key combination: a key code plus its modifier set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    /// The key code of the combination.
    pub code: KeyCode,
    /// Modifier keys that must be held.
    pub mods: KeyModifiers,
}

impl From<KeyCode> for KeyPress {
    fn from(code: KeyCode) -> Self {
        Self {
            code,
            mods: KeyModifiers::NONE,
        }
    }
}

impl From<(KeyCode, KeyModifiers)> for KeyPress {
    fn from((code, mods): (KeyCode, KeyModifiers)) -> Self {
        Self { code, mods }
    }
}

/// Help text for a binding: the key label and a short action description.
#[derive(Debug, Clone, Default)]
pub struct Help {
    /// Display label for the keys, e.g. `"↓/j"`.
    pub key: String,
    /// Short description of the action, e.g. `"down"`.
    pub desc: String,
}

/// A named action triggered by one or more key combinations.
#[derive(Debug, Clone, Default)]
pub struct Binding {
    keys: Vec<KeyPress>,
    help: Help,
    disabled: bool,
}

impl Binding {
    /// Creates a binding from a list of key combinations.
    pub fn new<P: Into<KeyPress>>(keys: Vec<P>) -> Self {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
            help: Help::default(),
            disabled: false,
        }
    }

    /// Sets the help label and description shown in help views.
    pub fn with_help(mut self, key: impl Into<String>, desc: impl Into<String>) -> Self {
        self.help = Help {
            key: key.into(),
            desc: desc.into(),
        };
        self
    }

    /// Disables the binding; disabled bindings never match.
    pub fn with_disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    /// Returns whether the binding is currently active.
    pub fn enabled(&self) -> bool {
        !self.disabled && !self.keys.is_empty()
    }

    /// Returns the binding's help text.
    pub fn help(&self) -> &Help {
        &self.help
    }

    /// Returns the key combinations this binding responds to.
    pub fn keys(&self) -> &[KeyPress] {
        &self.keys
    }

    /// Reports whether a key message triggers this binding.
    ///
    /// Bindings declared without modifiers also match when only SHIFT is
    /// held, so `KeyCode::Char('G')` style bindings work as expected.
    pub fn matches(&self, msg: &KeyMsg) -> bool {
        if !self.enabled() {
            return false;
        }
        self.keys.iter().any(|p| {
            p.code == msg.key
                && (p.mods == msg.modifiers
                    || (p.mods == KeyModifiers::NONE && msg.modifiers == KeyModifiers::SHIFT))
        })
    }
}

/// Trait implemented by component keymaps for help rendering.
pub trait KeyMap {
    /// The most essential bindings, for compact help lines.
    fn short_help(&self) -> Vec<&Binding>;
    /// All bindings, grouped by category, for full help panels.
    fn full_help(&self) -> Vec<Vec<&Binding>>;
}
