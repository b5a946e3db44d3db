// ABOUTME: CLI utility functions shared by every subcommand
// ABOUTME: Database opening, table styling and compact cell formatting

use chrono::{DateTime, Utc};
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, ContentArrangement, Table};
use sentinel_config::DatabaseSettings;
use sentinel_db::DbState;
use serde_json::Value;
use std::path::PathBuf;

/// Open the database from the environment, optionally at another path
pub async fn open_database(path: Option<PathBuf>) -> Result<DbState, Box<dyn std::error::Error>> {
    let mut settings = DatabaseSettings::from_env()?;
    if let Some(path) = path {
        settings.path = path;
    }

    Ok(DbState::init_with_settings(&settings).await?)
}

pub fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

pub fn format_date(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Shorten text to at most `max_len` characters
pub fn truncate(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
}

/// Single-line JSON for table cells
pub fn compact_json(value: &Value, max_len: usize) -> String {
    truncate(&value.to_string(), max_len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("bash", 10), "bash");
        assert_eq!(truncate("a very long description", 10), "a very ...");
        assert_eq!(truncate("ééééé", 5), "ééééé");
    }

    #[test]
    fn test_compact_json() {
        assert_eq!(compact_json(&json!({"cmd": "ls"}), 40), r#"{"cmd":"ls"}"#);
        assert_eq!(compact_json(&json!({"cmd": "ls -la /tmp"}), 10), r#"{"cmd":..."#);
    }

    #[test]
    fn test_format_date() {
        let ts = Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 5).unwrap();
        assert_eq!(format_date(&ts), "2024-06-01 09:30:05");
    }
}
