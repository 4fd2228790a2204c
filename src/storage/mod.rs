//! Result persistence: incremental JSON append plus CSV / JSON snapshots.
//!
//! Every write builds the full file in memory and renames a sibling `.tmp`
//! file into place, so a failed write leaves the previous file untouched.

use crate::error::StoreError;
use crate::models::{CsvRow, PlayerEntry, StoredEntry};
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use serde_json::Value;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
const JSON_INDENT: &[u8] = b"    ";

// ── Incremental JSON ──────────────────────────────────────────────────────────

/// Read the JSON array at `path`. A missing, empty, corrupt or non-array
/// file counts as an empty collection; only read failures are errors.
pub fn read_existing(path: &Path) -> Result<Vec<Value>, StoreError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(StoreError::io(path, e)),
    };

    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(&bytes);
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }

    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Array(items)) => Ok(items),
        Ok(other) => {
            warn!(
                "{:?} holds a JSON {} instead of an array, starting from empty",
                path,
                json_kind(&other)
            );
            Ok(Vec::new())
        }
        Err(e) => {
            warn!("{:?} is not valid JSON ({}), starting from empty", path, e);
            Ok(Vec::new())
        }
    }
}

/// Highest numeric `id` among `items`, or `items.len()` when none carries one.
fn last_id(items: &[Value]) -> usize {
    items
        .iter()
        .filter_map(|v| v.get("id").and_then(Value::as_u64))
        .max()
        .map(|id| id as usize)
        .unwrap_or(items.len())
}

/// Append `entries` to the array stored at `path` and rewrite the file.
/// New entries get ids after the highest existing id; existing objects
/// are written back as they were. Returns the new total.
pub fn append_json(entries: &[PlayerEntry], path: &Path) -> Result<usize, StoreError> {
    let mut all = read_existing(path)?;

    if entries.is_empty() {
        debug!("Nothing to append to {:?}", path);
        return Ok(all.len());
    }

    let start = last_id(&all);
    for (i, entry) in entries.iter().enumerate() {
        let stored = StoredEntry { id: start + i + 1, entry };
        all.push(serde_json::to_value(&stored).map_err(|e| StoreError::json(path, e))?);
    }

    write_json(&all, path)?;
    info!(
        "Appended {} records to {:?} ({} total)",
        entries.len(),
        path,
        all.len()
    );
    Ok(all.len())
}

// ── Snapshots ─────────────────────────────────────────────────────────────────

/// Overwrite `path` with the given entries as a fresh JSON array.
pub fn write_json_snapshot(entries: &[PlayerEntry], path: &Path) -> Result<usize, StoreError> {
    if entries.is_empty() {
        warn!("No data to save to {:?}", path);
        return Ok(0);
    }

    let stored: Vec<StoredEntry<'_>> = entries
        .iter()
        .enumerate()
        .map(|(i, entry)| StoredEntry { id: i + 1, entry })
        .collect();

    write_json(&stored, path)?;
    info!("Data saved to {:?} ({} records)", path, entries.len());
    Ok(entries.len())
}

/// Overwrite `path` with a BOM-prefixed CSV of the given entries.
pub fn write_csv(entries: &[PlayerEntry], path: &Path) -> Result<usize, StoreError> {
    if entries.is_empty() {
        warn!("No data to save to {:?}", path);
        return Ok(0);
    }

    let mut buf = UTF8_BOM.to_vec();
    {
        let mut writer = csv::Writer::from_writer(&mut buf);
        for (i, entry) in entries.iter().enumerate() {
            writer
                .serialize(CsvRow::new(i + 1, entry))
                .map_err(|e| StoreError::csv(path, e))?;
        }
        writer.flush().map_err(|e| StoreError::io(path, e))?;
    }

    write_atomic(path, &buf)?;
    info!("Data saved to {:?} ({} records)", path, entries.len());
    Ok(entries.len())
}

// ── File plumbing ─────────────────────────────────────────────────────────────

fn write_json<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<(), StoreError> {
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(JSON_INDENT));
    value
        .serialize(&mut ser)
        .map_err(|e| StoreError::json(path, e))?;
    buf.push(b'\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
    }

    let tmp = tmp_path(path);
    fs::write(&tmp, bytes).map_err(|e| StoreError::io(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        StoreError::io(path, e)
    })
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PlayerRecord, TeamStint};
    use chrono::NaiveDate;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("wiki_scraper_store_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        let _ = fs::remove_file(&path);
        path
    }

    fn entry(href: &str, name: &str) -> PlayerEntry {
        PlayerEntry {
            href: href.to_string(),
            title: Some(name.to_string()),
            scraped_at: NaiveDate::from_ymd_opt(2026, 10, 19)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
            record: PlayerRecord {
                real_name: Some(name.to_string()),
                role: Some("Mid".to_string()),
                player_image_url: None,
                team_history: vec![
                    TeamStint {
                        year: "2013".into(),
                        href: "/teams/sktt1".into(),
                        title: "SK Telecom T1".into(),
                    },
                    TeamStint {
                        year: "2023".into(),
                        href: "/teams/t1".into(),
                        title: "T1".into(),
                    },
                ],
            },
        }
    }

    fn ids(path: &Path) -> Vec<u64> {
        read_existing(path)
            .unwrap()
            .iter()
            .map(|v| v["id"].as_u64().unwrap())
            .collect()
    }

    #[test]
    fn append_to_missing_file_starts_empty() {
        let path = scratch("missing.json");
        let total = append_json(&[entry("/Faker", "Faker"), entry("/Chovy", "Chovy")], &path).unwrap();
        assert_eq!(total, 2);
        assert_eq!(ids(&path), vec![1, 2]);
    }

    #[test]
    fn append_to_corrupt_file_starts_empty() {
        let path = scratch("corrupt.json");
        fs::write(&path, "[{ not json").unwrap();
        let total = append_json(&[entry("/Faker", "Faker")], &path).unwrap();
        assert_eq!(total, 1);

        let path = scratch("object.json");
        fs::write(&path, r#"{"id": 1}"#).unwrap();
        assert_eq!(append_json(&[entry("/Faker", "Faker")], &path).unwrap(), 1);
    }

    #[test]
    fn append_to_non_utf8_file_starts_empty() {
        let path = scratch("binary.json");
        fs::write(&path, b"[\xff\xfe garbage").unwrap();
        assert_eq!(append_json(&[entry("/Faker", "Faker")], &path).unwrap(), 1);
        assert_eq!(ids(&path), vec![1]);
    }

    #[test]
    fn bom_prefixed_array_is_read() {
        let path = scratch("bom.json");
        fs::write(&path, b"\xEF\xBB\xBF[{\"id\": 1}]").unwrap();
        assert_eq!(append_json(&[entry("/Faker", "Faker")], &path).unwrap(), 2);
        assert_eq!(ids(&path), vec![1, 2]);
    }

    #[test]
    fn ids_continue_after_highest_existing_id() {
        let path = scratch("gaps.json");
        fs::write(&path, r#"[{"id": 1}, {"id": 3}]"#).unwrap();
        append_json(&[entry("/Faker", "Faker"), entry("/Zeus", "Zeus")], &path).unwrap();
        assert_eq!(ids(&path), vec![1, 3, 4, 5]);

        let path = scratch("no_ids.json");
        fs::write(&path, r#"[{"name": "a"}, {"name": "b"}]"#).unwrap();
        append_json(&[entry("/Faker", "Faker")], &path).unwrap();
        let all = read_existing(&path).unwrap();
        assert_eq!(all[2]["id"], 3);
    }

    #[test]
    fn append_is_associative() {
        let a = vec![entry("/Faker", "Faker")];
        let b = vec![entry("/Chovy", "Chovy"), entry("/Zeus", "Zeus")];

        let split = scratch("split.json");
        append_json(&a, &split).unwrap();
        append_json(&b, &split).unwrap();

        let joined = scratch("joined.json");
        let ab: Vec<_> = a.iter().chain(b.iter()).cloned().collect();
        append_json(&ab, &joined).unwrap();

        assert_eq!(fs::read(&split).unwrap(), fs::read(&joined).unwrap());
        assert_eq!(ids(&split), vec![1, 2, 3]);
    }

    #[test]
    fn prior_entries_are_kept_as_written() {
        let path = scratch("prior.json");
        fs::write(&path, r#"[{"id": 7, "zzz": "kept", "a": 1}]"#).unwrap();

        append_json(&[entry("/Faker", "Faker")], &path).unwrap();

        let all = read_existing(&path).unwrap();
        assert_eq!(all.len(), 2);
        let first = all[0].as_object().unwrap();
        let keys: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["id", "zzz", "a"]);
        assert_eq!(all[1]["id"], 8);
        assert_eq!(all[1]["RealName"], "Faker");
    }

    #[test]
    fn json_is_indented_and_keeps_non_ascii() {
        let path = scratch("unicode.json");
        append_json(&[entry("/Faker", "이상혁")], &path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"RealName\": \"이상혁\""));
        assert!(text.starts_with("[\n    {\n        \"id\": 1,"));
        assert!(!text.contains("PlayerImageUrl"));
    }

    #[test]
    fn csv_has_bom_header_and_flattened_history() {
        let path = scratch("players.csv");
        let n = write_csv(&[entry("/Faker", "Faker")], &path).unwrap();
        assert_eq!(n, 1);

        let bytes = fs::read(&path).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));
        let text = String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("id,href,title,ScrapedAt,RealName,Role,PlayerImageUrl,TeamHistory")
        );
        assert_eq!(
            lines.next(),
            Some("1,/Faker,Faker,2026-10-19 12:00:00,Faker,Mid,,2013 SK Telecom T1 (/teams/sktt1); 2023 T1 (/teams/t1)")
        );
    }

    #[test]
    fn snapshot_overwrites() {
        let path = scratch("snapshot.json");
        write_json_snapshot(&[entry("/Faker", "Faker"), entry("/Zeus", "Zeus")], &path).unwrap();
        write_json_snapshot(&[entry("/Chovy", "Chovy")], &path).unwrap();

        let all = read_existing(&path).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0]["href"], "/Chovy");
        assert_eq!(all[0]["id"], 1);
    }

    #[test]
    fn empty_snapshots_write_nothing() {
        let csv_path = scratch("empty.csv");
        let json_path = scratch("empty.json");
        assert_eq!(write_csv(&[], &csv_path).unwrap(), 0);
        assert_eq!(write_json_snapshot(&[], &json_path).unwrap(), 0);
        assert!(!csv_path.exists());
        assert!(!json_path.exists());
    }
}
