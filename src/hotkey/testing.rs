// In-memory host for tests: records OS registrations and owns the pump the
// dispatch hook subscribes to.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use super::{HotkeyEntry, HotkeyHost, HotkeyId, HotkeyRegistry, MessageFilter, MessagePump};
use crate::error::{HotkeyError, Result};
use crate::keys::Modifiers;

pub(crate) const ERROR_HOTKEY_ALREADY_REGISTERED: u32 = 1409;
pub(crate) const ERROR_HOTKEY_NOT_REGISTERED: u32 = 1419;

#[derive(Default)]
pub(crate) struct FakeState {
    pub pump: MessagePump,
    pub installs: Cell<usize>,
    pub register_calls: Cell<usize>,
    pub unregister_calls: Cell<usize>,
    pub fail_install: Cell<bool>,
    pub fail_unregister: Cell<bool>,
    registered: RefCell<HashMap<HotkeyId, (Modifiers, u32)>>,
    foreign: RefCell<HashSet<HotkeyId>>,
}

impl FakeState {
    pub fn is_registered(&self, id: HotkeyId) -> bool {
        self.registered.borrow().contains_key(&id)
    }

    pub fn registration(&self, id: HotkeyId) -> Option<(Modifiers, u32)> {
        self.registered.borrow().get(&id).copied()
    }

    /// Pretend another process owns `id`.
    pub fn claim_foreign(&self, id: HotkeyId) {
        self.foreign.borrow_mut().insert(id);
    }
}

pub(crate) struct FakeHost(Rc<FakeState>);

impl HotkeyHost for FakeHost {
    fn register_hotkey(&self, id: HotkeyId, modifiers: Modifiers, virtual_key: u32) -> Result<()> {
        let state = &self.0;
        state.register_calls.set(state.register_calls.get() + 1);
        if state.foreign.borrow().contains(&id) || state.is_registered(id) {
            return Err(HotkeyError::Win32 {
                function: "RegisterHotKey",
                code: ERROR_HOTKEY_ALREADY_REGISTERED,
            });
        }
        state.registered.borrow_mut().insert(id, (modifiers, virtual_key));
        Ok(())
    }

    fn unregister_hotkey(&self, id: HotkeyId) -> Result<()> {
        let state = &self.0;
        state.unregister_calls.set(state.unregister_calls.get() + 1);
        let removed = state.registered.borrow_mut().remove(&id).is_some();
        if !removed || state.fail_unregister.get() {
            return Err(HotkeyError::Win32 {
                function: "UnregisterHotKey",
                code: ERROR_HOTKEY_NOT_REGISTERED,
            });
        }
        Ok(())
    }

    fn install_hook(&self, filter: Rc<dyn MessageFilter>) -> Result<()> {
        let state = &self.0;
        if state.fail_install.get() {
            return Err(HotkeyError::HookInstall {
                reason: "message queue unavailable".to_owned(),
            });
        }
        state.installs.set(state.installs.get() + 1);
        state.pump.subscribe(filter);
        Ok(())
    }
}

/// A registry on a fresh fake host, plus a handle to inspect the host.
pub(crate) fn fixture() -> (HotkeyRegistry, Rc<FakeState>) {
    let state = Rc::new(FakeState::default());
    let registry = HotkeyRegistry::new(FakeHost(state.clone()));
    (registry, state)
}

/// A handler that counts its invocations.
pub(crate) fn counter() -> (Rc<Cell<u32>>, impl FnMut(&HotkeyEntry) + 'static) {
    let count = Rc::new(Cell::new(0));
    let count_in = count.clone();
    (count, move |_: &HotkeyEntry| count_in.set(count_in.get() + 1))
}
