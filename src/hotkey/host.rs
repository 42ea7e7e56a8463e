// ── OS boundary ───────────────────────────────────────────────────────────────
//
// The three operations the registry consumes from the host windowing system.
// The Win32 implementation lives in `platform::win32::hotkeys`; tests use the
// fake in `hotkey::testing`.

use std::rc::Rc;

use super::{HotkeyId, MessageFilter};
use crate::error::Result;
use crate::keys::Modifiers;

pub trait HotkeyHost {
    /// Install a system-wide hotkey.  An `Err` means the OS refused the
    /// binding, typically because another registration already owns it.
    fn register_hotkey(&self, id: HotkeyId, modifiers: Modifiers, virtual_key: u32) -> Result<()>;

    /// Release a hotkey previously installed with `register_hotkey`.
    fn unregister_hotkey(&self, id: HotkeyId) -> Result<()>;

    /// Subscribe `filter` to every message pumped on the UI thread, ahead of
    /// normal dispatch.  Subscriptions are permanent.
    fn install_hook(&self, filter: Rc<dyn MessageFilter>) -> Result<()>;
}
