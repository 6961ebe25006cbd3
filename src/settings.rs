use std::path::{Path, PathBuf};

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, Result};
use crate::layout::{self, LayoutFamily};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub data_dir: String,
    #[serde(default)]
    pub parsing: ParseSettings,
    #[serde(default)]
    pub matching: MatchSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseSettings {
    /// Layout family key, e.g. `uber_weekly_v1`.
    pub layout: String,
    /// Maximum vertical distance between fragments on the same row.
    pub row_tolerance: f64,
    /// Tokens that open a transaction block ("Sat, Oct 11"). Includes
    /// spacing artifacts seen in real statements.
    pub weekday_tokens: Vec<String>,
}

impl Default for ParseSettings {
    fn default() -> Self {
        Self {
            layout: LayoutFamily::UberWeeklyV1.key().to_string(),
            row_tolerance: 2.0,
            weekday_tokens: ["Mon", "Tue", "T ue", "Wed", "Thu", "Fri", "Sat", "Sun"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl ParseSettings {
    pub fn layout_family(&self) -> Result<LayoutFamily> {
        layout::resolve(&self.layout)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchSettings {
    /// Hours the platform's operational day is shifted from midnight.
    pub boundary_offset_hours: i64,
    /// Assumed length of a shift that has not ended yet.
    pub open_shift_hours: i64,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            boundary_offset_hours: 4,
            open_shift_hours: 24,
        }
    }
}

const BOUNDARY_OFFSET_RANGE: std::ops::RangeInclusive<i64> = 0..=23;
const OPEN_SHIFT_RANGE: std::ops::RangeInclusive<i64> = 1..=168;

impl MatchSettings {
    /// Rejects hand-edited values outside the supported ranges.
    pub fn validate(&self) -> Result<()> {
        if !BOUNDARY_OFFSET_RANGE.contains(&self.boundary_offset_hours) {
            return Err(LedgerError::Settings(format!(
                "boundary_offset_hours must be between 0 and 23, got {}",
                self.boundary_offset_hours
            )));
        }
        if !OPEN_SHIFT_RANGE.contains(&self.open_shift_hours) {
            return Err(LedgerError::Settings(format!(
                "open_shift_hours must be between 1 and 168, got {}",
                self.open_shift_hours
            )));
        }
        Ok(())
    }

    // Accessors clamp so an unvalidated value can never overflow.
    pub fn boundary_offset(&self) -> Duration {
        let (lo, hi) = BOUNDARY_OFFSET_RANGE.into_inner();
        Duration::hours(self.boundary_offset_hours.clamp(lo, hi))
    }

    pub fn open_shift_length(&self) -> Duration {
        let (lo, hi) = OPEN_SHIFT_RANGE.into_inner();
        Duration::hours(self.open_shift_hours.clamp(lo, hi))
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir().to_string_lossy().to_string(),
            parsing: ParseSettings::default(),
            matching: MatchSettings::default(),
        }
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("shiftledger")
}

fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Documents")
        .join("shiftledger")
}

pub fn load_settings() -> Settings {
    load_settings_from(&settings_path())
}

/// Missing or unreadable files fall back to defaults.
pub fn load_settings_from(path: &Path) -> Settings {
    if path.exists() {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        match serde_json::from_str(&content) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("ignoring invalid settings at {}: {e}", path.display());
                Settings::default()
            }
        }
    } else {
        Settings::default()
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir)?;
    save_settings_to(settings, &settings_path())
}

pub fn save_settings_to(settings: &Settings, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| LedgerError::Settings(e.to_string()))?;
    std::fs::write(path, format!("{json}\n"))?;
    Ok(())
}

pub fn get_data_dir() -> PathBuf {
    PathBuf::from(&load_settings().data_dir)
}

pub fn db_path() -> PathBuf {
    get_data_dir().join("shiftledger.db")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let mut settings = Settings {
            data_dir: "/tmp/test".to_string(),
            ..Settings::default()
        };
        settings.matching.boundary_offset_hours = 5;
        settings.parsing.weekday_tokens.push("S at".to_string());
        save_settings_to(&settings, &path).unwrap();
        let loaded = load_settings_from(&path);
        assert_eq!(loaded.data_dir, "/tmp/test");
        assert_eq!(loaded.matching.boundary_offset_hours, 5);
        assert!(loaded.parsing.weekday_tokens.contains(&"S at".to_string()));
    }

    #[test]
    fn test_load_returns_defaults_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let s = load_settings_from(&dir.path().join("missing.json"));
        assert_eq!(s.matching.boundary_offset_hours, 4);
        assert_eq!(s.parsing.layout, "uber_weekly_v1");
        assert!(s.parsing.weekday_tokens.contains(&"T ue".to_string()));
        assert!(!s.data_dir.is_empty());
    }

    #[test]
    fn test_load_merges_with_defaults() {
        let json = r#"{"data_dir": "/tmp/test", "matching": {"open_shift_hours": 12}}"#;
        let s: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(s.matching.open_shift_hours, 12);
        assert_eq!(s.matching.boundary_offset_hours, 4);
        assert_eq!(s.parsing.row_tolerance, 2.0);
    }

    #[test]
    fn test_invalid_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();
        let s = load_settings_from(&path);
        assert_eq!(s.parsing, ParseSettings::default());
    }

    #[test]
    fn test_boundary_offset_duration() {
        assert_eq!(MatchSettings::default().boundary_offset(), Duration::hours(4));
    }

    #[test]
    fn test_match_settings_out_of_range() {
        assert!(MatchSettings::default().validate().is_ok());
        let huge = MatchSettings {
            open_shift_hours: i64::MAX,
            ..MatchSettings::default()
        };
        assert!(matches!(huge.validate(), Err(LedgerError::Settings(_))));
        assert_eq!(huge.open_shift_length(), Duration::hours(168));

        let negative = MatchSettings {
            boundary_offset_hours: -3,
            ..MatchSettings::default()
        };
        assert!(matches!(negative.validate(), Err(LedgerError::Settings(_))));
        assert_eq!(negative.boundary_offset(), Duration::zero());
    }
}
