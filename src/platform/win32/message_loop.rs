// ── Message loop ──────────────────────────────────────────────────────────────
//
// Responsibilities in this file (unsafe confined here):
//   • Build the registry on the UI thread and register configured bindings.
//   • Run the Win32 message loop, giving the filter pump first look at every
//     message before TranslateMessage / DispatchMessageW.
//   • Expose safe helpers for quitting the loop and reporting fatal errors.

#![allow(unsafe_code)]

use std::rc::Rc;

use tracing::{debug, info, warn};
use windows::{
    core::PCWSTR,
    Win32::{
        Foundation::{GetLastError, HWND},
        UI::WindowsAndMessaging::{
            DispatchMessageW, GetMessageW, MessageBoxW, PostQuitMessage, TranslateMessage,
            MB_ICONERROR, MB_OK, MSG,
        },
    },
};

use super::hotkeys::Win32Host;
use crate::config::{Action, ResolvedBinding};
use crate::error::{HotkeyError, Result};
use crate::hotkey::{Hotkey, HotkeyEntry, HotkeyRegistry, MessagePump, SystemMessage};

// ── Public API ────────────────────────────────────────────────────────────────

/// Register `bindings` on the calling thread and pump messages until a quit
/// hotkey (or any other `WM_QUIT`) arrives.  Every binding is released before
/// returning.
///
/// Fails only if the dispatch hook cannot be installed or the message loop
/// itself breaks; individual registration conflicts are logged and skipped.
pub fn run(bindings: &[ResolvedBinding]) -> Result<()> {
    let t0 = std::time::Instant::now();

    let pump = Rc::new(MessagePump::new());
    let host = Win32Host::new(Rc::clone(&pump));
    let thread_id = host.thread_id();
    let registry = HotkeyRegistry::new(host);
    registry.ensure_hook_installed()?;

    let hotkeys: Vec<Hotkey> = bindings.iter().map(|b| bind(&registry, b)).collect();
    let active = hotkeys.iter().filter(|h| h.is_active()).count();
    if active == 0 && !bindings.is_empty() {
        warn!("none of the configured hotkeys could be registered");
    }
    info!(active, configured = bindings.len(), thread_id, "entering message loop");

    debug!(elapsed_ms = t0.elapsed().as_secs_f64() * 1000.0, "ready");

    let result = message_loop(&pump);
    drop(hotkeys);
    info!("hotkeys released");
    result
}

/// Ask the current thread's message loop to exit.
pub fn request_quit() {
    // SAFETY: PostQuitMessage has no preconditions; it posts WM_QUIT to the
    // calling thread's queue.
    unsafe { PostQuitMessage(0) };
}

/// Show a modal error dialog with the given message.
///
/// Safe to call from any context; performs the UTF-16 conversion internally.
/// Used by `main()` when startup fails.
pub fn show_error_dialog(message: &str) {
    let msg_wide: Vec<u16> = message.encode_utf16().chain(std::iter::once(0)).collect();
    let title_wide: Vec<u16> = "Hotkey Router: Fatal Error"
        .encode_utf16()
        .chain(std::iter::once(0))
        .collect();

    // SAFETY: msg_wide and title_wide are valid null-terminated UTF-16 strings
    // that remain allocated for the duration of the MessageBoxW call.
    // HWND::default() (null) means the dialog has no owner window.
    // Return value (button pressed) is intentionally unused for an error dialog.
    unsafe {
        let _ = MessageBoxW(
            HWND::default(),
            PCWSTR(msg_wide.as_ptr()),
            PCWSTR(title_wide.as_ptr()),
            MB_OK | MB_ICONERROR,
        );
    }
}

// ── Bindings ──────────────────────────────────────────────────────────────────

fn bind(registry: &HotkeyRegistry, binding: &ResolvedBinding) -> Hotkey {
    let key = binding.combo.key;
    let modifiers = binding.combo.modifiers;
    let name = binding.name.clone();

    let hotkey = match binding.action {
        Action::Log => Hotkey::new(registry, key, modifiers, move |e: &HotkeyEntry| {
            info!(name = %name, combo = %e.combo(), id = %e.id(), "hotkey fired");
        }),
        Action::Quit => Hotkey::new(registry, key, modifiers, move |e: &HotkeyEntry| {
            info!(name = %name, combo = %e.combo(), "quit hotkey fired");
            request_quit();
        }),
    };

    if !hotkey.is_active() {
        warn!(name = %binding.name, combo = %binding.combo, "binding skipped");
    }
    hotkey
}

// ── Pump ──────────────────────────────────────────────────────────────────────

fn message_loop(pump: &MessagePump) -> Result<()> {
    let mut msg = MSG::default();

    loop {
        // SAFETY: &mut msg is a valid MSG pointer; HWND::default() retrieves
        // messages for all windows on this thread *and* thread messages such
        // as WM_HOTKEY from a null-HWND RegisterHotKey; 0,0 accepts all.
        let ret = unsafe { GetMessageW(&mut msg, HWND::default(), 0, 0) };

        match ret.0 {
            // GetMessageW returns -1 on error.
            -1 => return Err(last_error("GetMessageW")),
            // Returns 0 when WM_QUIT is retrieved: exit the loop cleanly.
            0 => break,
            _ => {
                let sys = SystemMessage {
                    message: msg.message,
                    wparam: msg.wParam.0,
                    lparam: msg.lParam.0,
                };
                if pump.pre_dispatch(&sys) {
                    continue;
                }
                // SAFETY: msg was populated by a successful GetMessageW call.
                // TranslateMessage return value (whether it generated WM_CHAR)
                // and DispatchMessageW's LRESULT are intentionally unused.
                unsafe {
                    let _ = TranslateMessage(&msg);
                    let _ = DispatchMessageW(&msg);
                }
            }
        }
    }

    Ok(())
}

// ── Error helpers ─────────────────────────────────────────────────────────────

/// Capture the current Win32 last-error code and wrap it in a `HotkeyError`.
///
/// Call immediately after a Win32 function that signals failure: `GetLastError`
/// reads thread-local state that can be overwritten by any subsequent API call.
pub(crate) fn last_error(function: &'static str) -> HotkeyError {
    // SAFETY: GetLastError reads thread-local state set by the last Win32 call.
    // It is always safe to call and never fails.
    let code = unsafe { GetLastError() };
    HotkeyError::Win32 {
        function,
        code: code.0,
    }
}
