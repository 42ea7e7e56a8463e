// ── Hotkey entries ────────────────────────────────────────────────────────────
//
// `HotkeyEntry` is one key + modifier binding and its handler.  `Hotkey` is the
// owning handle the application keeps; dropping it disposes the entry, so the
// OS binding is released on every exit path, unwinding included.
//
// State machine:
//
//   Unregistered ──register ok──▶ Active ──unregister──▶ Unregistered
//        │                          │  ▲
//        │                          └──┘ rebind ok (id changes)
//        └────────── dispose ──────────────▶ Disposed (terminal)

use std::cell::{Cell, RefCell};
use std::fmt;
use std::ops::Deref;
use std::rc::{Rc, Weak};

use tracing::{debug, error, trace, warn};

use super::{HotkeyHandler, HotkeyId, HotkeyRegistry};
use crate::error::{HotkeyError, Result};
use crate::keys::{Key, KeyCombo, Modifiers};

/// Lifecycle state of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotkeyState {
    /// No OS binding held.  Initial state, and the state after `unregister()`
    /// or a failed `register()` / `rebind()`.
    Unregistered,
    /// Bound in the OS and present in the registry.
    Active,
    /// Released for good.  `register()` always fails from here.
    Disposed,
}

#[derive(Clone, Copy)]
struct Binding {
    combo: KeyCombo,
    id: HotkeyId,
    state: HotkeyState,
}

/// One registered (or registerable) global hotkey.
///
/// Handlers receive a `&HotkeyEntry` and may call any method on it, including
/// `rebind` and `dispose`, from inside the callback.
pub struct HotkeyEntry {
    registry: HotkeyRegistry,
    this: Weak<HotkeyEntry>,
    binding: Cell<Binding>,
    handler: RefCell<Option<Box<dyn HotkeyHandler>>>,
}

impl HotkeyEntry {
    pub(crate) fn new_shared(
        registry: &HotkeyRegistry,
        key: Key,
        modifiers: Modifiers,
        handler: Option<Box<dyn HotkeyHandler>>,
    ) -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            registry: registry.clone(),
            this: this.clone(),
            binding: Cell::new(Binding {
                combo: KeyCombo::new(key, modifiers),
                id: HotkeyId::new(key, modifiers),
                state: HotkeyState::Unregistered,
            }),
            handler: RefCell::new(handler),
        })
    }

    // ── Accessors ─────────────────────────────────────────────────────────────

    pub fn key(&self) -> Key {
        self.binding.get().combo.key
    }

    pub fn modifiers(&self) -> Modifiers {
        self.binding.get().combo.modifiers
    }

    pub fn combo(&self) -> KeyCombo {
        self.binding.get().combo
    }

    pub fn id(&self) -> HotkeyId {
        self.binding.get().id
    }

    pub fn state(&self) -> HotkeyState {
        self.binding.get().state
    }

    pub fn is_active(&self) -> bool {
        self.state() == HotkeyState::Active
    }

    fn update(&self, f: impl FnOnce(&mut Binding)) {
        let mut binding = self.binding.get();
        f(&mut binding);
        self.binding.set(binding);
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────────

    /// Claim the OS binding for the current key + modifiers.
    ///
    /// Returns `false` if the combination is already taken (by another
    /// process, or by another entry in this registry) or the entry has been
    /// disposed.  The failure is logged; the entry stays `Unregistered`.
    pub fn register(&self) -> bool {
        match self.try_register() {
            Ok(()) => true,
            Err(e @ HotkeyError::HookInstall { .. }) => {
                error!(combo = %self.combo(), error = %e, "hotkey registration failed");
                false
            }
            Err(e) => {
                warn!(combo = %self.combo(), error = %e, "hotkey registration failed");
                false
            }
        }
    }

    /// Like `register`, but returns the reason for a failure.
    ///
    /// Calling this on an `Active` entry is a no-op.
    pub fn try_register(&self) -> Result<()> {
        let Binding { combo, id, state } = self.binding.get();
        match state {
            HotkeyState::Active => return Ok(()),
            HotkeyState::Disposed => return Err(HotkeyError::Disposed { id }),
            HotkeyState::Unregistered => {}
        }

        self.registry.ensure_hook_installed()?;

        // The OS rejects a second registration of an id from this thread as
        // well, but checking the table first keeps the registry intact no
        // matter what the host does.
        if self.registry.contains(id) {
            return Err(HotkeyError::RegistrationConflict {
                combo,
                id,
                code: None,
            });
        }

        self.registry
            .host()
            .register_hotkey(id, combo.modifiers, combo.key.virtual_key())
            .map_err(|e| match e {
                HotkeyError::Win32 { code, .. } => HotkeyError::RegistrationConflict {
                    combo,
                    id,
                    code: Some(code),
                },
                other => other,
            })?;

        self.registry.insert(id, self.this.clone());
        self.update(|b| b.state = HotkeyState::Active);
        debug!(%combo, %id, "hotkey registered");
        Ok(())
    }

    /// Move the entry to a new key + modifiers.
    ///
    /// The old binding is released before the new one is claimed.  If the new
    /// registration fails the entry is left `Unregistered`: the previous
    /// binding is *not* restored, and the caller must decide what to do.
    pub fn rebind(&self, key: Key, modifiers: Modifiers) -> bool {
        if self.state() == HotkeyState::Disposed {
            warn!(combo = %self.combo(), "rebind on a disposed hotkey ignored");
            return false;
        }

        self.unregister();
        self.update(|b| {
            b.combo = KeyCombo::new(key, modifiers);
            b.id = HotkeyId::new(key, modifiers);
        });
        self.register()
    }

    /// Release the OS binding if this entry holds one.  Never fails; calling
    /// it on an entry that is not `Active` does nothing.
    pub fn unregister(&self) {
        let Binding { combo, id, state } = self.binding.get();
        if state != HotkeyState::Active {
            return;
        }

        self.update(|b| b.state = HotkeyState::Unregistered);
        if !self.registry.remove(id) {
            return;
        }
        match self.registry.host().unregister_hotkey(id) {
            Ok(()) => debug!(%combo, %id, "hotkey unregistered"),
            Err(e) => warn!(%combo, %id, error = %e, "OS refused to release hotkey"),
        }
    }

    /// Unregister and enter the terminal `Disposed` state.  Idempotent.
    pub fn dispose(&self) {
        if self.state() == HotkeyState::Disposed {
            return;
        }
        self.unregister();
        self.update(|b| b.state = HotkeyState::Disposed);
    }

    // ── Handler ───────────────────────────────────────────────────────────────

    /// Replace the handler.  Ignored (with a warning) when called from inside
    /// this entry's own handler.
    pub fn set_handler(&self, handler: impl HotkeyHandler + 'static) {
        self.replace_handler(Some(Box::new(handler)));
    }

    /// Remove the handler.  The entry keeps its binding and still consumes
    /// its trigger messages.
    pub fn clear_handler(&self) {
        self.replace_handler(None);
    }

    fn replace_handler(&self, handler: Option<Box<dyn HotkeyHandler>>) {
        match self.handler.try_borrow_mut() {
            Ok(mut slot) => *slot = handler,
            Err(_) => warn!(combo = %self.combo(), "handler cannot be replaced while it runs"),
        }
    }

    /// Run the handler, if any.  A trigger that arrives while the handler is
    /// already running (nested message loop) is dropped.
    pub(crate) fn invoke(&self) {
        let Ok(mut slot) = self.handler.try_borrow_mut() else {
            trace!(combo = %self.combo(), "hotkey handler already running; trigger dropped");
            return;
        };
        if let Some(handler) = slot.as_mut() {
            handler.on_hotkey(self);
        }
    }
}

impl fmt::Debug for HotkeyEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = self.binding.get();
        f.debug_struct("HotkeyEntry")
            .field("combo", &b.combo)
            .field("id", &b.id)
            .field("state", &b.state)
            .finish_non_exhaustive()
    }
}

// ── Owning handle ─────────────────────────────────────────────────────────────

/// Owning handle for a `HotkeyEntry`.  Dropping it disposes the entry.
#[derive(Debug)]
pub struct Hotkey {
    entry: Rc<HotkeyEntry>,
}

impl Hotkey {
    /// Create an entry and register it immediately.  Check `is_active()` to
    /// find out whether the OS accepted the binding.
    pub fn new(
        registry: &HotkeyRegistry,
        key: Key,
        modifiers: Modifiers,
        handler: impl HotkeyHandler + 'static,
    ) -> Self {
        let hotkey = Self::unregistered(registry, key, modifiers, handler);
        hotkey.register();
        hotkey
    }

    /// Create an entry without touching the OS.
    pub fn unregistered(
        registry: &HotkeyRegistry,
        key: Key,
        modifiers: Modifiers,
        handler: impl HotkeyHandler + 'static,
    ) -> Self {
        Self {
            entry: HotkeyEntry::new_shared(registry, key, modifiers, Some(Box::new(handler))),
        }
    }

    #[cfg(test)]
    pub(crate) fn downgrade(&self) -> Weak<HotkeyEntry> {
        Rc::downgrade(&self.entry)
    }
}

impl Deref for Hotkey {
    type Target = HotkeyEntry;

    fn deref(&self) -> &HotkeyEntry {
        &self.entry
    }
}

impl Drop for Hotkey {
    fn drop(&mut self) {
        self.entry.dispose();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
