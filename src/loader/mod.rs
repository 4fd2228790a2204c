//! Batch input: the JSON list of player links produced by an upstream
//! discovery step.

use crate::models::TargetLink;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::{info, warn};
use url::Url;

/// Read a JSON array of `{href, title}` objects.
pub fn load_targets(path: &Path) -> Result<Vec<TargetLink>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Could not read input file {:?}", path))?;

    let targets: Vec<TargetLink> = serde_json::from_str(text.trim_start_matches('\u{feff}'))
        .with_context(|| format!("{:?} is not a JSON array of {{href, title}} entries", path))?;

    info!("{} targets loaded from {:?}", targets.len(), path);
    Ok(targets)
}

/// Resolve a (possibly relative) href against the wiki base URL.
/// "/leagueoflegends/Faker" → "https://liquipedia.net/leagueoflegends/Faker"
pub fn resolve_target(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    match base.join(href) {
        Ok(url) => Some(url),
        Err(e) => {
            warn!("Skipping unresolvable href {:?}: {}", href, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_target_list() {
        let dir = std::env::temp_dir().join(format!("wiki_scraper_loader_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("players.json");
        std::fs::write(
            &path,
            r#"[{"href": "/leagueoflegends/Faker", "title": "Faker"},
                {"href": "/leagueoflegends/Chovy"}]"#,
        )
        .unwrap();

        let targets = load_targets(&path).unwrap();
        assert_eq!(targets.len(), 2);
        assert_eq!(targets[0].title, "Faker");
        assert_eq!(targets[1].title, "");
    }

    #[test]
    fn missing_input_is_an_error() {
        let path = std::env::temp_dir().join("wiki_scraper_no_such_input.json");
        assert!(load_targets(&path).is_err());
    }

    #[test]
    fn resolves_relative_and_absolute_hrefs() {
        let base = Url::parse("https://liquipedia.net/leagueoflegends/").unwrap();
        assert_eq!(
            resolve_target(&base, "/leagueoflegends/Faker").unwrap().as_str(),
            "https://liquipedia.net/leagueoflegends/Faker"
        );
        assert_eq!(
            resolve_target(&base, "https://example.org/x").unwrap().as_str(),
            "https://example.org/x"
        );
        assert!(resolve_target(&base, "  ").is_none());
    }
}
