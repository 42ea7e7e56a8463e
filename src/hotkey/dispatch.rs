// ── Message filtering & hotkey dispatch ───────────────────────────────────────
//
// `MessagePump` is the subscription point the host exposes: an ordered chain
// of filters that sees every raw message before TranslateMessage /
// DispatchMessage.  `DispatchHook` is the filter the registry subscribes.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::trace;

use super::registry::RegistryInner;
use super::{HotkeyId, HotkeyRegistry};

/// Win32 `WM_HOTKEY`: posted to the registering thread when a hotkey fires.
pub const WM_HOTKEY: u32 = 0x0312;

/// The parts of a Win32 `MSG` the filters look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemMessage {
    pub message: u32,
    pub wparam: usize,
    pub lparam: isize,
}

impl SystemMessage {
    /// A `WM_HOTKEY` message carrying `id` in `wParam`, as the OS posts it.
    pub fn hotkey(id: HotkeyId) -> Self {
        Self {
            message: WM_HOTKEY,
            wparam: id.get() as usize,
            lparam: 0,
        }
    }
}

/// A pre-dispatch message filter.
///
/// `handled` arrives set if an earlier filter consumed the message.  Setting
/// it stops the message from reaching default processing.
pub trait MessageFilter {
    fn filter(&self, msg: &SystemMessage, handled: &mut bool);
}

// ── Pump ──────────────────────────────────────────────────────────────────────

/// Ordered filter chain run for every message on the UI thread.
#[derive(Default)]
pub struct MessagePump {
    filters: RefCell<Vec<Rc<dyn MessageFilter>>>,
}

impl MessagePump {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, filter: Rc<dyn MessageFilter>) {
        self.filters.borrow_mut().push(filter);
    }

    pub fn filter_count(&self) -> usize {
        self.filters.borrow().len()
    }

    /// Run every filter over `msg`.  Returns `true` if the message was marked
    /// handled and must not be translated or dispatched.
    pub fn pre_dispatch(&self, msg: &SystemMessage) -> bool {
        // Snapshot so a filter may subscribe further filters mid-dispatch.
        let filters: Vec<_> = self.filters.borrow().clone();
        let mut handled = false;
        for filter in &filters {
            filter.filter(msg, &mut handled);
        }
        handled
    }
}

// ── Dispatch hook ─────────────────────────────────────────────────────────────

/// Routes `WM_HOTKEY` to the entry registered under the message's identifier.
///
/// Holds the registry weakly: the pump subscription is never torn down, and
/// once the registry is gone the hook simply stops matching anything.
pub struct DispatchHook {
    registry: Weak<RegistryInner>,
}

impl DispatchHook {
    pub(crate) fn new(registry: Weak<RegistryInner>) -> Self {
        Self { registry }
    }
}

impl MessageFilter for DispatchHook {
    fn filter(&self, msg: &SystemMessage, handled: &mut bool) {
        if *handled || msg.message != WM_HOTKEY {
            return;
        }
        let Some(inner) = self.registry.upgrade() else {
            return;
        };
        let registry = HotkeyRegistry::from_inner(inner);
        let id = HotkeyId::from_wparam(msg.wparam);

        // Stale or foreign identifiers are expected during rebinds; leave the
        // message for default processing.
        let Some(entry) = registry.resolve(id) else {
            trace!(%id, "WM_HOTKEY for unknown id ignored");
            return;
        };

        entry.invoke();
        *handled = true;
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
