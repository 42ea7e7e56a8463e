// ── Central error type ────────────────────────────────────────────────────────
//
// All fallible operations in the crate return `error::Result<T>`.  Only a
// failed hook subscription is fatal; everything else is reported as a value
// and the process keeps running.

use crate::hotkey::HotkeyId;
use crate::keys::{KeyCombo, KeyParseError};

/// Every error the hotkey subsystem can produce.
#[derive(Debug, thiserror::Error)]
pub enum HotkeyError {
    /// The OS (or this registry) already holds a binding for the identifier.
    #[error("{combo} (id {id}) is already registered{}", code_suffix(.code))]
    RegistrationConflict {
        combo: KeyCombo,
        id: HotkeyId,
        /// Raw Win32 error code, when the refusal came from the OS.
        code: Option<u32>,
    },

    /// `register()` was called on an entry that has been disposed.
    #[error("hotkey {id} has been disposed")]
    Disposed { id: HotkeyId },

    /// The dispatch hook could not be subscribed into the message pump.
    #[error("failed to install the hotkey dispatch hook: {reason}")]
    HookInstall { reason: String },

    /// A Win32 API call returned a failure code.
    #[error("{function} failed (error {code:#010x})")]
    Win32 {
        /// The name of the failing function, for display purposes.
        function: &'static str,
        /// The raw Win32 error code (`GetLastError()` value) or HRESULT.
        code: u32,
    },

    #[error(transparent)]
    Parse(#[from] KeyParseError),

    #[error("invalid bindings file: {0}")]
    Config(#[from] serde_json::Error),

    #[error("bindings file version {found} is not supported (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("global hotkeys are not supported on this platform")]
    Unsupported,
}

fn code_suffix(code: &Option<u32>) -> String {
    match code {
        Some(code) => format!(" (error {code:#010x})"),
        None => String::new(),
    }
}

impl HotkeyError {
    /// Build a `Win32` error from a failed call's HRESULT, unwrapping
    /// `HRESULT_FROM_WIN32` so the code matches `GetLastError()`.
    pub fn from_hresult(function: &'static str, hresult: i32) -> Self {
        Self::Win32 {
            function,
            code: win32_code(hresult),
        }
    }
}

/// `0x8007xxxx` carries a Win32 error in its low word; anything else is kept
/// as the raw HRESULT bits.
fn win32_code(hresult: i32) -> u32 {
    let hr = hresult as u32;
    if hr & 0xFFFF_0000 == 0x8007_0000 {
        hr & 0xFFFF
    } else {
        hr
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, HotkeyError>;

// ── Tests ─────────────────────────────────────────────────────────────────────
