// ── Hotkey registry ───────────────────────────────────────────────────────────
//
// The live identifier → entry table.  Invariant: every key in `table` has a
// successful OS registration behind it.  Entries insert themselves only after
// the OS accepted the binding and remove themselves before asking the OS to
// release it, so the two tables never drift apart.
//
// The registry is an explicit object owned by the application's composition
// root; entries hold a clone of the handle, the table holds entries weakly.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::info;

use super::{DispatchHook, HotkeyEntry, HotkeyHost, HotkeyId, MessageFilter};
use crate::error::{HotkeyError, Result};

pub(crate) struct RegistryInner {
    host: Box<dyn HotkeyHost>,
    table: RefCell<HashMap<HotkeyId, Weak<HotkeyEntry>>>,
    hook_installed: Cell<bool>,
}

/// Shared handle to the identifier → entry table.  Cloning is cheap.
#[derive(Clone)]
pub struct HotkeyRegistry {
    inner: Rc<RegistryInner>,
}

impl HotkeyRegistry {
    /// Create an empty registry backed by `host`.  The dispatch hook is not
    /// subscribed until `ensure_hook_installed` runs, either explicitly at
    /// startup or lazily on the first registration.
    pub fn new(host: impl HotkeyHost + 'static) -> Self {
        Self {
            inner: Rc::new(RegistryInner {
                host: Box::new(host),
                table: RefCell::new(HashMap::new()),
                hook_installed: Cell::new(false),
            }),
        }
    }

    pub(crate) fn from_inner(inner: Rc<RegistryInner>) -> Self {
        Self { inner }
    }

    #[cfg(test)]
    pub(crate) fn inner(&self) -> &Rc<RegistryInner> {
        &self.inner
    }

    pub(crate) fn host(&self) -> &dyn HotkeyHost {
        self.inner.host.as_ref()
    }

    // ── Table ─────────────────────────────────────────────────────────────────

    /// Record `entry` under `id`.  The OS registration must already have
    /// succeeded; this never calls into the OS.
    pub(crate) fn insert(&self, id: HotkeyId, entry: Weak<HotkeyEntry>) {
        let previous = self.inner.table.borrow_mut().insert(id, entry);
        debug_assert!(
            previous.map_or(true, |p| p.strong_count() == 0),
            "id {id} inserted twice"
        );
    }

    /// Drop `id` from the table.  Returns whether it was present.
    pub(crate) fn remove(&self, id: HotkeyId) -> bool {
        self.inner.table.borrow_mut().remove(&id).is_some()
    }

    /// Look up the live entry for `id`.
    ///
    /// The table borrow is released before returning, so the caller may run
    /// the entry's handler and let it mutate the registry.
    pub fn resolve(&self, id: HotkeyId) -> Option<Rc<HotkeyEntry>> {
        let weak = self.inner.table.borrow().get(&id).cloned()?;
        match weak.upgrade() {
            Some(entry) => Some(entry),
            None => {
                // Entry dropped without going through dispose.
                self.inner.table.borrow_mut().remove(&id);
                None
            }
        }
    }

    pub fn contains(&self, id: HotkeyId) -> bool {
        self.resolve(id).is_some()
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.inner
            .table
            .borrow()
            .values()
            .filter(|w| w.strong_count() > 0)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Live identifiers in ascending order.
    pub fn ids(&self) -> Vec<HotkeyId> {
        let mut ids: Vec<_> = self
            .inner
            .table
            .borrow()
            .iter()
            .filter(|(_, w)| w.strong_count() > 0)
            .map(|(id, _)| *id)
            .collect();
        ids.sort_unstable();
        ids
    }

    // ── Hook ──────────────────────────────────────────────────────────────────

    /// Subscribe the dispatch hook into the host's message pump.  Only the
    /// first successful call does anything.
    ///
    /// A failure here means hotkeys can never be delivered; callers at
    /// startup should treat it as fatal.
    pub fn ensure_hook_installed(&self) -> Result<()> {
        if self.inner.hook_installed.get() {
            return Ok(());
        }

        let hook: Rc<dyn MessageFilter> = Rc::new(DispatchHook::new(Rc::downgrade(&self.inner)));
        self.inner.host.install_hook(hook).map_err(|e| match e {
            HotkeyError::HookInstall { .. } => e,
            other => HotkeyError::HookInstall {
                reason: other.to_string(),
            },
        })?;

        self.inner.hook_installed.set(true);
        info!("hotkey dispatch hook installed");
        Ok(())
    }

    pub fn hook_installed(&self) -> bool {
        self.inner.hook_installed.get()
    }
}

impl fmt::Debug for HotkeyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HotkeyRegistry")
            .field("ids", &self.ids())
            .field("hook_installed", &self.hook_installed())
            .finish()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
