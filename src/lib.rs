// ── Safety policy ────────────────────────────────────────────────────────────
// Unsafe code is forbidden everywhere except `platform::win32` (Win32 FFI).
// Each unsafe block in that module MUST carry a `// SAFETY:` comment.
#![deny(unsafe_code)]

//! Process-wide global hotkeys routed through the UI thread's message loop.
//!
//! A [`HotkeyRegistry`] owns the identifier → entry table and subscribes a
//! dispatch hook into the host's [`MessagePump`] the first time it is needed.
//! Each [`Hotkey`] claims one OS binding, releases it when dropped, and runs
//! its [`HotkeyHandler`] synchronously when the combination is pressed.

pub mod config;
pub mod error;
pub mod hotkey;
pub mod keys;
pub mod platform;

pub use error::{HotkeyError, Result};
pub use hotkey::{
    Hotkey, HotkeyEntry, HotkeyHandler, HotkeyHost, HotkeyId, HotkeyRegistry, HotkeyState,
    MessageFilter, MessagePump, SystemMessage, WM_HOTKEY,
};
pub use keys::{Key, KeyCombo, KeyParseError, Modifiers};
