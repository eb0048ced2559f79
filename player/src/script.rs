//! Input scripts for headless rendering
//!
//! ```toml
//! frames = [
//!     { f = 0, buttons = "idle" },
//!     { f = 120, buttons = "right" },
//!     { f = 121, buttons = "select+start" },
//! ]
//! ```
//!
//! Each entry holds until the next one.

use anyhow::{Context, Result, bail};
use cartvox_core::Buttons;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct InputScript {
    #[serde(default)]
    frames: Vec<ScriptEntry>,
}

#[derive(Debug, Deserialize)]
struct ScriptEntry {
    f: u64,
    buttons: String,
}

/// Parse `+`-joined button names, e.g. `"l+start"`
pub fn parse_buttons(spec: &str) -> Result<Buttons> {
    let mut buttons = Buttons::empty();
    for name in spec.split('+') {
        let name = name.trim().to_ascii_lowercase();
        match Buttons::from_label(&name) {
            Some(button) => buttons |= button,
            None => bail!("Unknown button '{}' in '{}'", name, spec),
        }
    }
    Ok(buttons)
}

pub fn parse(content: &str) -> Result<Vec<(u64, Buttons)>> {
    let script: InputScript = toml::from_str(content)?;
    script
        .frames
        .into_iter()
        .map(|entry| {
            let buttons = parse_buttons(&entry.buttons)
                .with_context(|| format!("Bad input at tick {}", entry.f))?;
            Ok((entry.f, buttons))
        })
        .collect()
}

pub fn load(path: &Path) -> Result<Vec<(u64, Buttons)>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read script: {}", path.display()))?;
    parse(&content).with_context(|| format!("Invalid script: {}", path.display()))
}
