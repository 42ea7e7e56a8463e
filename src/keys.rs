// ── Keys, modifiers and key combinations ──────────────────────────────────────
//
// Platform-independent key symbols plus their Win32 virtual-key codes.  The
// registry never sees anything but `Key::virtual_key()` and `Modifiers::bits()`,
// so a different backend only has to agree on these two numbers.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use std::str::FromStr;

// ── Key ───────────────────────────────────────────────────────────────────────

macro_rules! key_table {
    ($($variant:ident => $name:literal, $vk:literal;)*) => {
        /// A logical key that can be bound to a global hotkey.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Key {
            $($variant,)*
        }

        impl Key {
            /// Every bindable key, in table order.
            pub const ALL: &'static [Key] = &[$(Key::$variant,)*];

            /// The Win32 virtual-key code (`VK_*`) for this key.
            pub fn virtual_key(self) -> u32 {
                match self {
                    $(Key::$variant => $vk,)*
                }
            }

            /// Canonical display name, as accepted by `KeyCombo::from_str`.
            pub fn name(self) -> &'static str {
                match self {
                    $(Key::$variant => $name,)*
                }
            }
        }
    };
}

key_table! {
    A => "A", 0x41; B => "B", 0x42; C => "C", 0x43; D => "D", 0x44;
    E => "E", 0x45; F => "F", 0x46; G => "G", 0x47; H => "H", 0x48;
    I => "I", 0x49; J => "J", 0x4A; K => "K", 0x4B; L => "L", 0x4C;
    M => "M", 0x4D; N => "N", 0x4E; O => "O", 0x4F; P => "P", 0x50;
    Q => "Q", 0x51; R => "R", 0x52; S => "S", 0x53; T => "T", 0x54;
    U => "U", 0x55; V => "V", 0x56; W => "W", 0x57; X => "X", 0x58;
    Y => "Y", 0x59; Z => "Z", 0x5A;

    D0 => "0", 0x30; D1 => "1", 0x31; D2 => "2", 0x32; D3 => "3", 0x33;
    D4 => "4", 0x34; D5 => "5", 0x35; D6 => "6", 0x36; D7 => "7", 0x37;
    D8 => "8", 0x38; D9 => "9", 0x39;

    F1 => "F1", 0x70; F2 => "F2", 0x71; F3 => "F3", 0x72; F4 => "F4", 0x73;
    F5 => "F5", 0x74; F6 => "F6", 0x75; F7 => "F7", 0x76; F8 => "F8", 0x77;
    F9 => "F9", 0x78; F10 => "F10", 0x79; F11 => "F11", 0x7A; F12 => "F12", 0x7B;
    F13 => "F13", 0x7C; F14 => "F14", 0x7D; F15 => "F15", 0x7E; F16 => "F16", 0x7F;
    F17 => "F17", 0x80; F18 => "F18", 0x81; F19 => "F19", 0x82; F20 => "F20", 0x83;
    F21 => "F21", 0x84; F22 => "F22", 0x85; F23 => "F23", 0x86; F24 => "F24", 0x87;

    Backspace => "Backspace", 0x08;
    Tab => "Tab", 0x09;
    Enter => "Enter", 0x0D;
    Pause => "Pause", 0x13;
    Escape => "Escape", 0x1B;
    Space => "Space", 0x20;
    PageUp => "PageUp", 0x21;
    PageDown => "PageDown", 0x22;
    End => "End", 0x23;
    Home => "Home", 0x24;
    Left => "Left", 0x25;
    Up => "Up", 0x26;
    Right => "Right", 0x27;
    Down => "Down", 0x28;
    PrintScreen => "PrintScreen", 0x2C;
    Insert => "Insert", 0x2D;
    Delete => "Delete", 0x2E;

    NumPad0 => "NumPad0", 0x60; NumPad1 => "NumPad1", 0x61; NumPad2 => "NumPad2", 0x62;
    NumPad3 => "NumPad3", 0x63; NumPad4 => "NumPad4", 0x64; NumPad5 => "NumPad5", 0x65;
    NumPad6 => "NumPad6", 0x66; NumPad7 => "NumPad7", 0x67; NumPad8 => "NumPad8", 0x68;
    NumPad9 => "NumPad9", 0x69;

    // OEM keys as laid out on a US keyboard.
    Semicolon => ";", 0xBA;
    Equals => "=", 0xBB;
    Comma => ",", 0xBC;
    Minus => "-", 0xBD;
    Period => ".", 0xBE;
    Slash => "/", 0xBF;
    Backquote => "`", 0xC0;
    LeftBracket => "[", 0xDB;
    Backslash => "\\", 0xDC;
    RightBracket => "]", 0xDD;
    Quote => "'", 0xDE;
}

impl Key {
    /// Look up a key by name, ignoring ASCII case.  Accepts the canonical
    /// names plus a handful of common aliases.
    pub fn from_name(name: &str) -> Option<Key> {
        let alias = match name.to_ascii_lowercase().as_str() {
            "esc" => Some(Key::Escape),
            "return" => Some(Key::Enter),
            "del" => Some(Key::Delete),
            "ins" => Some(Key::Insert),
            "pgup" => Some(Key::PageUp),
            "pgdn" | "pgdown" => Some(Key::PageDown),
            "prtsc" | "printscr" => Some(Key::PrintScreen),
            "plus" => Some(Key::Equals),
            _ => None,
        };
        alias.or_else(|| {
            Key::ALL
                .iter()
                .copied()
                .find(|k| k.name().eq_ignore_ascii_case(name))
        })
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ── Modifiers ─────────────────────────────────────────────────────────────────

/// Order-independent set of modifier keys.
///
/// Bit values are the Win32 `MOD_ALT`, `MOD_CONTROL`, `MOD_SHIFT` and
/// `MOD_WIN` constants, so `bits()` can be handed to `RegisterHotKey` as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers(u32);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);
    pub const ALT: Modifiers = Modifiers(0x1);
    pub const CTRL: Modifiers = Modifiers(0x2);
    pub const SHIFT: Modifiers = Modifiers(0x4);
    /// The Windows / Super / Command key.
    pub const META: Modifiers = Modifiers(0x8);

    const MASK: u32 = 0xF;

    /// Display order: Ctrl, Alt, Shift, Meta.
    const NAMED: [(Modifiers, &'static str); 4] = [
        (Modifiers::CTRL, "Ctrl"),
        (Modifiers::ALT, "Alt"),
        (Modifiers::SHIFT, "Shift"),
        (Modifiers::META, "Meta"),
    ];

    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Build a set from raw bits, dropping anything outside the four known
    /// modifiers.
    pub const fn from_bits_truncate(bits: u32) -> Modifiers {
        Modifiers(bits & Self::MASK)
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, other: Modifiers) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: Modifiers) {
        self.0 |= other.0;
    }

    fn from_name(name: &str) -> Option<Modifiers> {
        match name.to_ascii_lowercase().as_str() {
            "ctrl" | "control" => Some(Modifiers::CTRL),
            "alt" | "option" => Some(Modifiers::ALT),
            "shift" => Some(Modifiers::SHIFT),
            "meta" | "win" | "super" | "cmd" | "command" => Some(Modifiers::META),
            _ => None,
        }
    }
}

impl BitOr for Modifiers {
    type Output = Modifiers;

    fn bitor(self, rhs: Modifiers) -> Modifiers {
        Modifiers(self.0 | rhs.0)
    }
}

impl BitOrAssign for Modifiers {
    fn bitor_assign(&mut self, rhs: Modifiers) {
        self.insert(rhs);
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (flag, name) in Self::NAMED {
            if self.contains(flag) {
                if !first {
                    f.write_str("+")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}

// ── KeyCombo ──────────────────────────────────────────────────────────────────

/// A key plus the modifiers that must be held with it, e.g. `Ctrl+Alt+F1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyCombo {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyCombo {
    pub const fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.is_empty() {
            write!(f, "{}", self.key)
        } else {
            write!(f, "{}+{}", self.modifiers, self.key)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyParseError {
    #[error("hotkey must contain a key, e.g. 'F1' or 'Ctrl+Alt+F1'")]
    MissingKey,
    #[error("unsupported key token '{0}'")]
    UnsupportedKey(String),
    #[error("hotkey '{0}' names more than one key")]
    MultipleKeys(String),
}

impl FromStr for KeyCombo {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // "Ctrl++" and "Ctrl+Plus" both mean Ctrl with the =/+ key; a trailing
        // empty token after a '+' separator is that key.
        let trimmed = s.trim();
        let (body, plus_key) = match trimmed.strip_suffix("++") {
            Some(rest) => (rest, true),
            None => (trimmed, false),
        };

        let mut modifiers = Modifiers::NONE;
        let mut key = if plus_key { Some(Key::Equals) } else { None };

        for token in body.split('+').map(str::trim) {
            if token.is_empty() {
                if body.is_empty() && plus_key {
                    continue;
                }
                return Err(KeyParseError::MissingKey);
            }
            if let Some(m) = Modifiers::from_name(token) {
                modifiers |= m;
                continue;
            }
            let parsed =
                Key::from_name(token).ok_or_else(|| KeyParseError::UnsupportedKey(token.to_owned()))?;
            if key.replace(parsed).is_some() {
                return Err(KeyParseError::MultipleKeys(trimmed.to_owned()));
            }
        }

        key.map(|key| KeyCombo { key, modifiers })
            .ok_or(KeyParseError::MissingKey)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn virtual_keys_match_win32_constants() {
        assert_eq!(Key::A.virtual_key(), 0x41);
        assert_eq!(Key::D0.virtual_key(), 0x30);
        assert_eq!(Key::F1.virtual_key(), 0x70);
        assert_eq!(Key::F24.virtual_key(), 0x87);
        assert_eq!(Key::Space.virtual_key(), 0x20);
        assert_eq!(Key::PrintScreen.virtual_key(), 0x2C);
        assert_eq!(Key::Backquote.virtual_key(), 0xC0);
    }

    #[test]
    fn virtual_keys_fit_below_modifier_bits() {
        for key in Key::ALL {
            assert!(key.virtual_key() < 0x100, "{key} overflows the low byte");
        }
    }

    #[test]
    fn every_key_name_parses_back() {
        for &key in Key::ALL {
            assert_eq!(Key::from_name(key.name()), Some(key), "{}", key.name());
        }
    }

    #[test]
    fn modifiers_display_in_fixed_order() {
        let m = Modifiers::META | Modifiers::SHIFT | Modifiers::ALT | Modifiers::CTRL;
        assert_eq!(m.to_string(), "Ctrl+Alt+Shift+Meta");
        assert_eq!(Modifiers::NONE.to_string(), "");
    }

    #[test]
    fn modifier_bits_match_win32() {
        assert_eq!(Modifiers::ALT.bits(), 1);
        assert_eq!(Modifiers::CTRL.bits(), 2);
        assert_eq!(Modifiers::SHIFT.bits(), 4);
        assert_eq!(Modifiers::META.bits(), 8);
        assert_eq!(Modifiers::from_bits_truncate(0xFF), Modifiers::from_bits_truncate(0xF));
    }

    #[test]
    fn parse_is_case_insensitive_and_order_free() {
        let a: KeyCombo = "ctrl+ALT+f1".parse().expect("parse");
        let b: KeyCombo = "Alt + Control + F1".parse().expect("parse");
        assert_eq!(a, b);
        assert_eq!(a, KeyCombo::new(Key::F1, Modifiers::CTRL | Modifiers::ALT));
        assert_eq!(a.to_string(), "Ctrl+Alt+F1");
    }

    #[test]
    fn parse_accepts_aliases() {
        let c: KeyCombo = "Win+Esc".parse().expect("parse");
        assert_eq!(c, KeyCombo::new(Key::Escape, Modifiers::META));
        let c: KeyCombo = "Super+PgDn".parse().expect("parse");
        assert_eq!(c, KeyCombo::new(Key::PageDown, Modifiers::META));
    }

    #[test]
    fn parse_plus_key() {
        let c: KeyCombo = "Ctrl++".parse().expect("parse");
        assert_eq!(c, KeyCombo::new(Key::Equals, Modifiers::CTRL));
        let c: KeyCombo = "Ctrl+Plus".parse().expect("parse");
        assert_eq!(c, KeyCombo::new(Key::Equals, Modifiers::CTRL));
        assert_eq!("+".parse::<KeyCombo>(), Err(KeyParseError::MissingKey));
    }

    #[test]
    fn parse_bare_key() {
        let c: KeyCombo = "F5".parse().expect("parse");
        assert_eq!(c, KeyCombo::new(Key::F5, Modifiers::NONE));
        assert_eq!(c.to_string(), "F5");
    }

    #[test]
    fn parse_rejects_bad_input() {
        assert_eq!("".parse::<KeyCombo>(), Err(KeyParseError::MissingKey));
        assert_eq!("Ctrl+Alt".parse::<KeyCombo>(), Err(KeyParseError::MissingKey));
        assert_eq!("Ctrl++A".parse::<KeyCombo>(), Err(KeyParseError::MissingKey));
        assert_eq!(
            "Hyper+A".parse::<KeyCombo>(),
            Err(KeyParseError::UnsupportedKey("Hyper".to_owned()))
        );
        assert_eq!(
            "Ctrl+A+B".parse::<KeyCombo>(),
            Err(KeyParseError::MultipleKeys("Ctrl+A+B".to_owned()))
        );
    }
}
