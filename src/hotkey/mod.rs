// ── Hotkey registration & dispatch ────────────────────────────────────────────
//
// Three pieces:
//   • `registry` – identifier → live entry table, owns the hook subscription.
//   • `entry`    – one binding and its register / rebind / dispose lifecycle.
//   • `dispatch` – the message filter that routes WM_HOTKEY to the registry.
//
// Everything here lives on the message-loop thread.  The types are built on
// `Rc`/`RefCell` and are therefore `!Send`; the compiler enforces the thread
// affinity that RegisterHotKey requires.

use std::fmt;

use crate::keys::{Key, Modifiers};

pub mod dispatch;
pub mod entry;
pub mod host;
pub mod registry;

#[cfg(test)]
pub(crate) mod testing;

pub use dispatch::{DispatchHook, MessageFilter, MessagePump, SystemMessage, WM_HOTKEY};
pub use entry::{Hotkey, HotkeyEntry, HotkeyState};
pub use host::HotkeyHost;
pub use registry::HotkeyRegistry;

// ── Identifier ────────────────────────────────────────────────────────────────

/// Process-scoped token shared by the OS registration and the registry table.
///
/// Derived as `virtual_key + modifiers * 0x10000`: virtual-key codes stay in
/// the low byte, modifier bits start at bit 16, so distinct combos never
/// collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HotkeyId(i32);

impl HotkeyId {
    const MODIFIER_SHIFT: i32 = 0x10000;

    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        // Both casts are lossless: virtual keys are < 0x100, modifiers < 0x10.
        Self(key.virtual_key() as i32 + modifiers.bits() as i32 * Self::MODIFIER_SHIFT)
    }

    /// Recover the identifier from a `WM_HOTKEY` message's `wParam`.
    pub fn from_wparam(wparam: usize) -> Self {
        Self(wparam as i32)
    }

    pub const fn get(self) -> i32 {
        self.0
    }
}

impl fmt::Display for HotkeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

// ── Handler ───────────────────────────────────────────────────────────────────

/// The work a hotkey performs when it fires.
///
/// Called synchronously on the message-loop thread with the entry that fired.
/// Any `FnMut(&HotkeyEntry)` closure is a handler.
pub trait HotkeyHandler {
    fn on_hotkey(&mut self, hotkey: &HotkeyEntry);
}

impl<F> HotkeyHandler for F
where
    F: FnMut(&HotkeyEntry),
{
    fn on_hotkey(&mut self, hotkey: &HotkeyEntry) {
        self(hotkey)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
