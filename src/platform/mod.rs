// ── Platform abstraction layer ────────────────────────────────────────────────
//
// The hotkey core only talks to the OS through `hotkey::HotkeyHost`.  This
// module holds the concrete backends; all FFI is confined to them and never
// leaks outward.

#[cfg(windows)]
pub mod win32;
