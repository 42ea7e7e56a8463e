// ── Win32 hotkey host ─────────────────────────────────────────────────────────
//
// RegisterHotKey with a null HWND binds the hotkey to the *calling thread*:
// WM_HOTKEY arrives as a thread message in that thread's queue.  The host is
// built on `Rc` and therefore `!Send`, which keeps every call on the thread
// that owns the message loop.

#![allow(unsafe_code)]

use std::rc::Rc;

use tracing::debug;
use windows::Win32::{
    Foundation::{BOOL, ERROR_NOT_ENOUGH_MEMORY, HWND, TRUE},
    System::Threading::GetCurrentThreadId,
    UI::Input::KeyboardAndMouse::{RegisterHotKey, UnregisterHotKey, HOT_KEY_MODIFIERS},
    UI::WindowsAndMessaging::{IsGUIThread, PeekMessageW, MSG, PM_NOREMOVE},
};

use crate::error::{HotkeyError, Result};
use crate::hotkey::{HotkeyHost, HotkeyId, MessageFilter, MessagePump};
use crate::keys::Modifiers;

use super::message_loop::last_error;

/// `HotkeyHost` backed by user32, delivering into a `MessagePump` that the
/// thread's message loop drains.
pub struct Win32Host {
    pump: Rc<MessagePump>,
    thread_id: u32,
}

impl Win32Host {
    /// Must be called on the thread that will run the message loop.
    pub fn new(pump: Rc<MessagePump>) -> Self {
        // SAFETY: GetCurrentThreadId has no preconditions and cannot fail.
        let thread_id = unsafe { GetCurrentThreadId() };
        Self { pump, thread_id }
    }

    pub fn thread_id(&self) -> u32 {
        self.thread_id
    }
}

impl HotkeyHost for Win32Host {
    fn register_hotkey(&self, id: HotkeyId, modifiers: Modifiers, virtual_key: u32) -> Result<()> {
        // SAFETY: a null HWND is documented as valid and associates the hotkey
        // with the calling thread.  id, modifiers and vk are plain integers.
        unsafe {
            RegisterHotKey(
                HWND::default(),
                id.get(),
                HOT_KEY_MODIFIERS(modifiers.bits()),
                virtual_key,
            )
        }
        .map_err(|e| HotkeyError::from_hresult("RegisterHotKey", e.code().0))
    }

    fn unregister_hotkey(&self, id: HotkeyId) -> Result<()> {
        // SAFETY: same null-HWND contract as RegisterHotKey; an unknown id
        // makes the call fail, it never touches memory.
        unsafe { UnregisterHotKey(HWND::default(), id.get()) }
            .map_err(|e| HotkeyError::from_hresult("UnregisterHotKey", e.code().0))
    }

    fn install_hook(&self, filter: Rc<dyn MessageFilter>) -> Result<()> {
        // SAFETY: IsGUIThread(TRUE) converts the calling thread to a GUI
        // thread; it only fails when the system is out of resources.
        gui_thread_converted(unsafe { IsGUIThread(TRUE) })?;

        // Force creation of the thread's message queue so WM_HOTKEY posted
        // before the loop starts is not lost.
        let mut msg = MSG::default();
        // SAFETY: &mut msg is a valid MSG pointer; PM_NOREMOVE leaves any
        // message in place for GetMessageW.  The BOOL result (whether a
        // message was waiting) is irrelevant here.
        unsafe {
            let _ = PeekMessageW(&mut msg, HWND::default(), 0, 0, PM_NOREMOVE);
        }

        self.pump.subscribe(filter);
        debug!(thread_id = self.thread_id, "dispatch hook subscribed");
        Ok(())
    }
}

/// `IsGUIThread(TRUE)` reports a failed conversion as
/// `ERROR_NOT_ENOUGH_MEMORY`, which is a nonzero (truthy) `BOOL`.
fn gui_thread_converted(ret: BOOL) -> Result<()> {
    let reason = if ret.0 == ERROR_NOT_ENOUGH_MEMORY.0 as i32 {
        HotkeyError::Win32 {
            function: "IsGUIThread",
            code: ERROR_NOT_ENOUGH_MEMORY.0,
        }
    } else if ret.0 == 0 {
        last_error("IsGUIThread")
    } else {
        return Ok(());
    };
    Err(HotkeyError::HookInstall {
        reason: reason.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_memory_is_a_failed_conversion() {
        match gui_thread_converted(BOOL(ERROR_NOT_ENOUGH_MEMORY.0 as i32)) {
            Err(HotkeyError::HookInstall { reason }) => {
                assert_eq!(reason, "IsGUIThread failed (error 0x00000008)")
            }
            other => panic!("expected HookInstall, got {other:?}"),
        }
    }

    #[test]
    fn true_is_a_gui_thread() {
        assert!(gui_thread_converted(TRUE).is_ok());
    }

    #[test]
    fn false_is_a_failed_conversion() {
        assert!(matches!(
            gui_thread_converted(BOOL(0)),
            Err(HotkeyError::HookInstall { .. })
        ));
    }

    #[test]
    fn install_hook_converts_the_test_thread() {
        let pump = Rc::new(MessagePump::new());
        let host = Win32Host::new(Rc::clone(&pump));
        struct Ignore;
        impl MessageFilter for Ignore {
            fn filter(&self, _msg: &crate::hotkey::SystemMessage, _handled: &mut bool) {}
        }
        host.install_hook(Rc::new(Ignore)).expect("install");
        assert_eq!(pump.filter_count(), 1);
    }
}
