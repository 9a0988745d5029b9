#![forbid(unsafe_code)]
#![warn(
    unused,
    unused_must_use,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs
)]
//! Curator UI wasm entry point.
//!
//! Native builds check a `curator-config` JSON block before it is embedded in
//! a page: `curator-ui path/to/config.json`.

#[cfg(target_arch = "wasm32")]
fn main() {
    curator_ui::run_app();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    use std::io::{self, Write};
    use std::process::ExitCode;

    let mut stdout = io::stdout().lock();
    let result = match std::env::args().nth(1) {
        Some(path) => native::check_file(&path, &mut stdout),
        None => stdout.write_all(native::USAGE).map(|()| true),
    };
    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            let _ = writeln!(io::stderr(), "curator-ui: {err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::io::{self, Write};

    use curator_ui::core::config::UiConfig;
    use curator_ui::core::error::ConfigError;

    pub(crate) const USAGE: &[u8] = b"curator-ui runs in the browser; build it for wasm32-unknown-unknown.\n\
Natively it validates a configuration block: curator-ui <config.json>\n";

    pub(crate) fn check_file(path: &str, out: &mut impl Write) -> io::Result<bool> {
        let raw = std::fs::read_to_string(path)?;
        check(&raw, out)
    }

    /// Validate `raw` and print the effective settings. `Ok(false)` means invalid.
    pub(crate) fn check(raw: &str, out: &mut impl Write) -> io::Result<bool> {
        let config = match UiConfig::from_json(raw) {
            Ok(config) => config,
            Err(err) => {
                let detail = match &err {
                    ConfigError::Parse { detail } => detail.clone(),
                    ConfigError::InvalidField { field, reason } => format!("{field} {reason}"),
                };
                writeln!(out, "invalid configuration: {err} ({detail})")?;
                return Ok(false);
            }
        };
        writeln!(out, "bulk endpoint: {}", config.bulk_endpoint)?;
        writeln!(out, "undo window: {} ms", config.undo_window_ms)?;
        writeln!(out, "preference pages: {}", config.page_kinds.join(", "))?;
        for (key, value) in &config.preference_defaults {
            writeln!(out, "default {key}={value}")?;
        }
        Ok(true)
    }
}
