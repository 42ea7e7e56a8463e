// ── Safety policy ────────────────────────────────────────────────────────────
// The binary itself contains no unsafe code; all Win32 FFI lives in the
// library's `platform::win32` module.
#![deny(unsafe_code)]

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use hotkey_router::config::{self, ResolvedBinding};
use hotkey_router::{HotkeyError, Result};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Bindings file [default: %APPDATA%\HotkeyRouter\bindings.json]
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Parse the bindings and print their identifiers without registering
    #[arg(long)]
    check: bool,

    /// Write the default bindings file and exit
    #[arg(long)]
    write_default: bool,

    /// Allow --write-default to replace an existing file
    #[arg(long, requires = "write_default")]
    force: bool,
}

fn main() {
    // Initialize logging (respects RUST_LOG)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("hotkey_router=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(&args) {
        error!(error = %e, "hotkey-router failed");
        report_fatal(&e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let path = config::resolve_path(args.config.as_deref());

    if args.write_default {
        let path = path.ok_or_else(|| {
            HotkeyError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "APPDATA not set; pass --config",
            ))
        })?;
        config::write_default(&path, args.force)?;
        info!(path = %path.display(), "default bindings written");
        return Ok(());
    }

    let file = config::load_from(path.as_deref())?;
    let bindings = config::resolve_combos(&file)?;

    if args.check {
        for b in &bindings {
            println!(
                "{:<16} {:<24} {:>10}  {:?}",
                b.name,
                b.combo.to_string(),
                b.id.to_string(),
                b.action
            );
        }
        return Ok(());
    }

    listen(&bindings)
}

#[cfg(windows)]
fn listen(bindings: &[ResolvedBinding]) -> Result<()> {
    hotkey_router::platform::win32::message_loop::run(bindings)
}

#[cfg(not(windows))]
fn listen(_bindings: &[ResolvedBinding]) -> Result<()> {
    Err(HotkeyError::Unsupported)
}

#[cfg(windows)]
fn report_fatal(e: &HotkeyError) {
    // A modal dialog is the only output a user sees when launched from Explorer.
    hotkey_router::platform::win32::message_loop::show_error_dialog(&e.to_string());
}

#[cfg(not(windows))]
fn report_fatal(_e: &HotkeyError) {}
