// ── Bindings file ─────────────────────────────────────────────────────────────
//
// Reads and writes `%APPDATA%\HotkeyRouter\bindings.json`.
// No `unsafe`: pure safe Rust + serde_json.

use std::{ffi::OsString, fs, io, path::Path, path::PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{HotkeyError, Result};
use crate::hotkey::HotkeyId;
use crate::keys::KeyCombo;

// ── On-disk types ─────────────────────────────────────────────────────────────

/// Root of the JSON bindings file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BindingsFile {
    pub version: u32,
    pub bindings: Vec<BindingEntry>,
}

/// One configured hotkey.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingEntry {
    /// Label used in log output.
    pub name: String,
    /// Key combination text, e.g. `"Ctrl+Alt+F1"`.
    pub hotkey: String,
    #[serde(default)]
    pub action: Action,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

/// What the bundled runner does when a binding fires.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Log the trigger.
    #[default]
    Log,
    /// Leave the message loop.
    Quit,
}

fn enabled_by_default() -> bool {
    true
}

impl BindingEntry {
    pub fn combo(&self) -> Result<KeyCombo> {
        Ok(self.hotkey.parse::<KeyCombo>()?)
    }
}

// ── Format version ────────────────────────────────────────────────────────────

pub const BINDINGS_VERSION: u32 = 1;

// ── Path ──────────────────────────────────────────────────────────────────────

/// Return the default bindings path: `%APPDATA%\HotkeyRouter\bindings.json`.
///
/// Returns `None` if the `APPDATA` environment variable is not set.
pub fn bindings_path() -> Option<PathBuf> {
    bindings_path_in(std::env::var_os("APPDATA"))
}

fn bindings_path_in(appdata: Option<OsString>) -> Option<PathBuf> {
    let mut p = PathBuf::from(appdata?);
    p.push("HotkeyRouter");
    p.push("bindings.json");
    Some(p)
}

/// An explicit `--config` path wins; otherwise the `%APPDATA%` location.
pub fn resolve_path(explicit: Option<&Path>) -> Option<PathBuf> {
    explicit.map(Path::to_path_buf).or_else(bindings_path)
}

// ── Defaults ──────────────────────────────────────────────────────────────────

/// The bindings written by `--write-default` and used when no file exists.
pub fn default_bindings() -> BindingsFile {
    BindingsFile {
        version: BINDINGS_VERSION,
        bindings: vec![
            BindingEntry {
                name: "hello".to_owned(),
                hotkey: "Ctrl+Alt+F1".to_owned(),
                action: Action::Log,
                enabled: true,
            },
            BindingEntry {
                name: "quit".to_owned(),
                hotkey: "Ctrl+Alt+Q".to_owned(),
                action: Action::Quit,
                enabled: true,
            },
        ],
    }
}

// ── Save ──────────────────────────────────────────────────────────────────────

/// Write `file` as pretty-printed JSON, creating the parent directory if it
/// does not exist.
pub fn save(path: &Path, file: &BindingsFile) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let out = fs::File::create(path)?;
    serde_json::to_writer_pretty(out, file)?;
    Ok(())
}

/// Write `default_bindings()` to `path`.  An existing file is left alone
/// unless `overwrite` is set.
pub fn write_default(path: &Path, overwrite: bool) -> Result<()> {
    if !overwrite && path.exists() {
        return Err(HotkeyError::Io(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{} already exists; pass --force to replace it", path.display()),
        )));
    }
    save(path, &default_bindings())
}

// ── Load ──────────────────────────────────────────────────────────────────────

/// Read and parse a bindings file.
///
/// Unlike a missing file, a malformed one or an unrecognised version is an
/// error: silently dropping a user's shortcuts is worse than refusing to start.
pub fn load(path: &Path) -> Result<BindingsFile> {
    let data = fs::read(path)?;
    parse(&data)
}

fn parse(data: &[u8]) -> Result<BindingsFile> {
    let file: BindingsFile = serde_json::from_slice(data)?;
    if file.version != BINDINGS_VERSION {
        return Err(HotkeyError::UnsupportedVersion {
            found: file.version,
            expected: BINDINGS_VERSION,
        });
    }
    Ok(file)
}

/// Load `path`, or fall back to `default_bindings()` when it does not exist.
pub fn load_or_default(path: &Path) -> Result<BindingsFile> {
    match load(path) {
        Err(HotkeyError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
            tracing::warn!(path = %path.display(), "no bindings file; using defaults");
            Ok(default_bindings())
        }
        other => other,
    }
}

/// Load the bindings at `path`, or the defaults when there is no location
/// to read from at all (no `--config` and no `%APPDATA%`).
pub fn load_from(path: Option<&Path>) -> Result<BindingsFile> {
    match path {
        Some(path) => load_or_default(path),
        None => {
            tracing::warn!("no bindings location; using defaults");
            Ok(default_bindings())
        }
    }
}

// ── Resolution ────────────────────────────────────────────────────────────────

/// An enabled binding with its parsed combo and identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBinding {
    pub name: String,
    pub combo: KeyCombo,
    pub id: HotkeyId,
    pub action: Action,
}

/// Parse every enabled binding.  The first unparsable hotkey string aborts
/// the whole set.
pub fn resolve_combos(file: &BindingsFile) -> Result<Vec<ResolvedBinding>> {
    file.bindings
        .iter()
        .filter(|b| b.enabled)
        .map(|b| {
            let combo = b.combo()?;
            Ok(ResolvedBinding {
                name: b.name.clone(),
                combo,
                id: HotkeyId::new(combo.key, combo.modifiers),
                action: b.action,
            })
        })
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{Key, KeyParseError, Modifiers};

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("bindings.json");
        save(&path, &default_bindings()).expect("save");

        let loaded = load(&path).expect("load");
        assert_eq!(loaded.version, BINDINGS_VERSION);
        assert_eq!(loaded.bindings, default_bindings().bindings);
    }

    #[test]
    fn action_and_enabled_have_defaults() {
        let json = r#"{"version":1,"bindings":[{"name":"x","hotkey":"F5"}]}"#;
        let file = parse(json.as_bytes()).expect("parse");
        assert_eq!(file.bindings[0].action, Action::Log);
        assert!(file.bindings[0].enabled);
    }

    #[test]
    fn actions_are_lowercase_in_json() {
        let json = r#"{"version":1,"bindings":[{"name":"q","hotkey":"Ctrl+Q","action":"quit"}]}"#;
        let file = parse(json.as_bytes()).expect("parse");
        assert_eq!(file.bindings[0].action, Action::Quit);
        let bad = r#"{"version":1,"bindings":[{"name":"q","hotkey":"Ctrl+Q","action":"Quit"}]}"#;
        assert!(matches!(parse(bad.as_bytes()), Err(HotkeyError::Config(_))));
    }

    #[test]
    fn wrong_version_is_rejected() {
        let json = r#"{"version":99,"bindings":[]}"#;
        match parse(json.as_bytes()) {
            Err(HotkeyError::UnsupportedVersion { found, expected }) => {
                assert_eq!(found, 99);
                assert_eq!(expected, BINDINGS_VERSION);
            }
            other => panic!("expected version error, got {other:?}"),
        }
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = load_or_default(&dir.path().join("absent.json")).expect("defaults");
        assert_eq!(file.bindings.len(), 2);
    }

    #[test]
    fn no_location_falls_back_to_defaults() {
        let file = load_from(None).expect("defaults");
        assert_eq!(file.bindings, default_bindings().bindings);
    }

    #[test]
    fn explicit_path_wins_over_appdata() {
        let explicit = Path::new("custom.json");
        assert_eq!(resolve_path(Some(explicit)), Some(PathBuf::from("custom.json")));
    }

    #[test]
    fn appdata_location_layout() {
        assert_eq!(bindings_path_in(None), None);
        let p = bindings_path_in(Some(OsString::from("roaming"))).expect("path");
        assert_eq!(p, Path::new("roaming").join("HotkeyRouter").join("bindings.json"));
    }

    #[test]
    fn write_default_refuses_to_replace_existing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("bindings.json");
        fs::write(&path, br#"{"version":1,"bindings":[]}"#).expect("write");

        match write_default(&path, false) {
            Err(HotkeyError::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::AlreadyExists),
            other => panic!("expected AlreadyExists, got {other:?}"),
        }
        assert!(load(&path).expect("load").bindings.is_empty());

        write_default(&path, true).expect("overwrite");
        assert_eq!(load(&path).expect("load").bindings.len(), 2);
    }

    #[test]
    fn write_default_creates_missing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("new").join("bindings.json");
        write_default(&path, false).expect("write");
        assert_eq!(load(&path).expect("load").bindings, default_bindings().bindings);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("bindings.json");
        fs::write(&path, b"{ not json").expect("write");
        assert!(matches!(load_or_default(&path), Err(HotkeyError::Config(_))));
    }

    #[test]
    fn resolve_skips_disabled_and_computes_ids() {
        let json = r#"{"version":1,"bindings":[
            {"name":"a","hotkey":"Alt+F1"},
            {"name":"b","hotkey":"Ctrl+B","enabled":false},
            {"name":"c","hotkey":"Ctrl+Alt+Q","action":"quit"}
        ]}"#;
        let file = parse(json.as_bytes()).expect("parse");
        let resolved = resolve_combos(&file).expect("resolve");

        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].name, "a");
        assert_eq!(resolved[0].id, HotkeyId::new(Key::F1, Modifiers::ALT));
        assert_eq!(resolved[1].combo, KeyCombo::new(Key::Q, Modifiers::CTRL | Modifiers::ALT));
        assert_eq!(resolved[1].action, Action::Quit);
    }

    #[test]
    fn resolve_reports_bad_hotkey_text() {
        let json = r#"{"version":1,"bindings":[{"name":"a","hotkey":"Ctrl+Nope"}]}"#;
        let file = parse(json.as_bytes()).expect("parse");
        match resolve_combos(&file) {
            Err(HotkeyError::Parse(KeyParseError::UnsupportedKey(tok))) => assert_eq!(tok, "Nope"),
            other => panic!("expected parse error, got {other:?}"),
        }
    }
}
