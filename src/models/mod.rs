use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ── Extracted player ──────────────────────────────────────────────────────────

/// Fields pulled from one player page.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PlayerRecord {
    #[serde(rename = "RealName", default, skip_serializing_if = "Option::is_none")]
    pub real_name: Option<String>,

    #[serde(rename = "Role", default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    #[serde(rename = "PlayerImageUrl", default, skip_serializing_if = "Option::is_none")]
    pub player_image_url: Option<String>,

    /// One entry per history row, in document order.
    #[serde(rename = "TeamHistory", default)]
    pub team_history: Vec<TeamStint>,
}

impl PlayerRecord {
    /// True when nothing at all was found on the page.
    pub fn is_empty(&self) -> bool {
        self.real_name.is_none()
            && self.role.is_none()
            && self.player_image_url.is_none()
            && self.team_history.is_empty()
    }

    /// Number of populated items, used for per-page log lines.
    pub fn item_count(&self) -> usize {
        [&self.real_name, &self.role, &self.player_image_url]
            .iter()
            .filter(|f| f.is_some())
            .count()
            + self.team_history.len()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TeamStint {
    pub year: String,
    pub href: String,
    pub title: String,
}

// ── Batch input ───────────────────────────────────────────────────────────────

/// One `{href, title}` entry of the batch input file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TargetLink {
    pub href: String,
    #[serde(default)]
    pub title: String,
}

// ── Persisted entry ───────────────────────────────────────────────────────────

/// A record together with where and when it was scraped.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerEntry {
    pub href: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(rename = "ScrapedAt")]
    pub scraped_at: NaiveDateTime,

    #[serde(flatten)]
    pub record: PlayerRecord,
}

/// Entry as written to disk: sequential id first, then the entry fields.
#[derive(Debug, Serialize)]
pub struct StoredEntry<'a> {
    pub id: usize,
    #[serde(flatten)]
    pub entry: &'a PlayerEntry,
}

/// Flat CSV row; nested team history is rendered as one cell.
#[derive(Debug, Serialize)]
pub struct CsvRow<'a> {
    pub id: usize,
    pub href: &'a str,
    pub title: &'a str,
    #[serde(rename = "ScrapedAt")]
    pub scraped_at: String,
    #[serde(rename = "RealName")]
    pub real_name: &'a str,
    #[serde(rename = "Role")]
    pub role: &'a str,
    #[serde(rename = "PlayerImageUrl")]
    pub player_image_url: &'a str,
    #[serde(rename = "TeamHistory")]
    pub team_history: String,
}

impl<'a> CsvRow<'a> {
    pub fn new(id: usize, entry: &'a PlayerEntry) -> Self {
        let record = &entry.record;
        Self {
            id,
            href: &entry.href,
            title: entry.title.as_deref().unwrap_or_default(),
            scraped_at: entry.scraped_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            real_name: record.real_name.as_deref().unwrap_or_default(),
            role: record.role.as_deref().unwrap_or_default(),
            player_image_url: record.player_image_url.as_deref().unwrap_or_default(),
            team_history: record
                .team_history
                .iter()
                .map(|s| format!("{} {} ({})", s.year, s.title, s.href))
                .collect::<Vec<_>>()
                .join("; "),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_fields_are_omitted_from_json() {
        let record = PlayerRecord {
            role: Some("Mid".into()),
            ..Default::default()
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json, serde_json::json!({ "Role": "Mid", "TeamHistory": [] }));
    }

    #[test]
    fn item_count_includes_history_rows() {
        let record = PlayerRecord {
            real_name: Some("Faker".into()),
            team_history: vec![TeamStint {
                year: "2023".into(),
                href: "/teams/t1".into(),
                title: "T1".into(),
            }],
            ..Default::default()
        };
        assert_eq!(record.item_count(), 2);
        assert!(!record.is_empty());
        assert!(PlayerRecord::default().is_empty());
    }
}
