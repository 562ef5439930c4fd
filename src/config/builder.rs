//! Default config creation.
//!
//! The default file is assembled with a small builder that aligns the
//! trailing comments of every setting into one column.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::common::constants::*;
use crate::common::utils::private_path;
use crate::time::zones::detect_local_zone;

/// Write a commented default config to `path`.
///
/// The source zone is pre-filled with the detected local zone.
pub fn create_default_config(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    let local_zone = detect_local_zone();

    let config_content = ConfigBuilder::new()
        .add_section("Zones")
        .add_setting(
            "source_zone",
            &format!("\"{}\"", local_zone.name()),
            "Zone the entered date and time are read in",
        )
        .add_setting(
            "destination_zone",
            &format!("\"{DEFAULT_DESTINATION_ZONE}\""),
            "Zone conversions and alarms are shown in",
        )
        .add_section("Alarms")
        .add_setting(
            "trigger_policy",
            "\"strict\"",
            "\"strict\" (fire on time only) or \"catch_up\" (fire late ticks too)",
        )
        .add_setting(
            "beep_duration",
            &DEFAULT_BEEP_DURATION_MS.to_string(),
            &format!(
                "Beep length in milliseconds ({MINIMUM_BEEP_DURATION_MS}-{MAXIMUM_BEEP_DURATION_MS}, ignored by the terminal bell)"
            ),
        )
        .build();

    fs::write(path, config_content + "\n")
        .with_context(|| format!("Failed to write default config to {}", path.display()))?;

    log_block_start!("Created default configuration at {}", private_path(path));
    Ok(())
}

struct ConfigBuilder {
    entries: Vec<ConfigEntry>,
}

struct ConfigEntry {
    content: String,
    entry_type: EntryType,
}

enum EntryType {
    Section,
    Setting { line: String, comment: String },
}

impl ConfigBuilder {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn add_section(mut self, title: &str) -> Self {
        self.entries.push(ConfigEntry {
            content: format!("#[{title}]"),
            entry_type: EntryType::Section,
        });
        self
    }

    fn add_setting(mut self, key: &str, value: &str, comment: &str) -> Self {
        let line = format!("{key} = {value}");
        self.entries.push(ConfigEntry {
            content: line.clone(),
            entry_type: EntryType::Setting {
                line,
                comment: format!("# {comment}"),
            },
        });
        self
    }

    fn build(self) -> String {
        // Widest setting line plus one space
        let max_width = self
            .entries
            .iter()
            .filter_map(|entry| match &entry.entry_type {
                EntryType::Setting { line, .. } => Some(line.len()),
                EntryType::Section => None,
            })
            .max()
            .unwrap_or(0)
            + 1;

        let mut result = Vec::new();
        let mut first_section = true;

        for entry in self.entries {
            match entry.entry_type {
                EntryType::Section => {
                    if !first_section {
                        result.push(String::new());
                    }
                    result.push(entry.content);
                    first_section = false;
                }
                EntryType::Setting { line, comment } => {
                    let padding = " ".repeat(max_width - line.len());
                    result.push(format!("{line}{padding}{comment}"));
                }
            }
        }

        result.join("\n")
    }
}
