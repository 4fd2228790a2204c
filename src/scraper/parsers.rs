use crate::config::ExtractionRules;
use crate::error::ExtractError;
use crate::models::{PlayerRecord, TeamStint};
use crate::scraper::cleaner::{attr, element_text, next_element_sibling, non_empty};
use crate::scraper::Document;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

// ── Compiled rule set ─────────────────────────────────────────────────────────

/// Applies an [`ExtractionRules`] set to player pages.
///
/// Selectors are compiled once; extraction itself never fails, it only
/// leaves fields unset.
pub struct FieldExtractor {
    table_primary: Selector,
    table_fallback: Selector,
    row: Selector,
    row_link: Selector,
    row_year: Selector,
    image: Selector,
    label: Selector,
    name_label: String,
    role_label: String,
}

fn compile(selector: &str) -> Result<Selector, ExtractError> {
    Selector::parse(selector).map_err(|e| ExtractError::Selector {
        selector: selector.to_string(),
        reason: format!("{:?}", e),
    })
}

impl FieldExtractor {
    pub fn new(rules: &ExtractionRules) -> Result<Self, ExtractError> {
        Ok(Self {
            table_primary: compile(&rules.table_primary)?,
            table_fallback: compile(&rules.table_fallback)?,
            row: compile(&rules.row)?,
            row_link: compile(&rules.row_link)?,
            row_year: compile(&rules.row_year)?,
            image: compile(&rules.image)?,
            label: compile(&rules.label)?,
            name_label: rules.name_label.trim().to_string(),
            role_label: rules.role_label.trim().to_string(),
        })
    }

    /// Extract from a page that may not have been fetched at all.
    pub fn extract_page(&self, doc: Option<&Document>) -> PlayerRecord {
        match doc {
            Some(doc) => self.extract(doc),
            None => PlayerRecord::default(),
        }
    }

    pub fn extract(&self, doc: &Document) -> PlayerRecord {
        let html = doc.html();

        let team_history = match self.team_history(html) {
            Ok(rows) => rows,
            Err(e) => {
                warn!("{}: {}", doc.url(), e);
                Vec::new()
            }
        };

        let (real_name, role) = self.infobox_values(html);

        let record = PlayerRecord {
            real_name,
            role,
            player_image_url: self.image_url(html),
            team_history,
        };

        if record.is_empty() {
            warn!("{}: no fields extracted", doc.url());
        } else {
            debug!(
                "{}: name={:?} role={:?} {} history rows",
                doc.url(),
                record.real_name,
                record.role,
                record.team_history.len()
            );
        }
        record
    }

    // ── Content table ─────────────────────────────────────────────────────────

    /// First match of the primary selector, else first match of the fallback.
    pub fn content_table<'a>(&self, html: &'a Html) -> Option<ElementRef<'a>> {
        if let Some(table) = html.select(&self.table_primary).next() {
            return Some(table);
        }
        debug!("Primary table selector missed, trying fallback");
        html.select(&self.table_fallback).next()
    }

    /// Walk the table row by row. A row contributes an entry only when it has
    /// both a titled link and a year cell; anything else is skipped.
    pub fn team_history(&self, html: &Html) -> Result<Vec<TeamStint>, ExtractError> {
        let table = self.content_table(html).ok_or(ExtractError::TableNotFound)?;

        let mut stints = Vec::new();
        let mut skipped = 0usize;

        for tr in table.select(&self.row) {
            let link = tr.select(&self.row_link).next();
            let year = tr
                .select(&self.row_year)
                .next()
                .and_then(|td| non_empty(&element_text(&td)));

            let (Some(link), Some(year)) = (link, year) else {
                skipped += 1;
                continue;
            };

            let href = attr(&link, "href").unwrap_or_default();
            let title = attr(&link, "title")
                .or_else(|| non_empty(&element_text(&link)))
                .unwrap_or_default();

            stints.push(TeamStint { year, href, title });
        }

        if skipped > 0 {
            debug!("Skipped {} table rows without both a team link and a year", skipped);
        }
        Ok(stints)
    }

    // ── Infobox ───────────────────────────────────────────────────────────────

    /// Label scan: the element after a matching label holds the value.
    /// First match per label wins.
    fn infobox_values(&self, html: &Html) -> (Option<String>, Option<String>) {
        // Outer `Some` once the label has been seen, even with an empty value
        let mut name: Option<Option<String>> = None;
        let mut role: Option<Option<String>> = None;

        for label in html.select(&self.label) {
            if name.is_some() && role.is_some() {
                break;
            }
            let text = element_text(&label);
            let slot = if text == self.name_label {
                &mut name
            } else if text == self.role_label {
                &mut role
            } else {
                continue;
            };
            if slot.is_none() {
                *slot = Some(next_element_sibling(&label).and_then(|v| non_empty(&element_text(&v))));
            }
        }

        (name.flatten(), role.flatten())
    }

    fn image_url(&self, html: &Html) -> Option<String> {
        html.select(&self.image).next().and_then(|img| attr(&img, "src"))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
