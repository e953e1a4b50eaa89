//! Seed authority list.
//!
//! Loaded from a TOML file so deployments can extend coverage without a
//! rebuild: explicit path (`SEEDS_PATH`) first, then `config/seeds.toml` in
//! the working directory, then the copy embedded at compile time.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use super::{Source, SourceTier};

const DEFAULT_SEEDS_PATH: &str = "config/seeds.toml";
const EMBEDDED_SEEDS: &str = include_str!("../../config/seeds.toml");

#[derive(Debug, Deserialize)]
struct SeedFile {
    seeds: Vec<SeedEntry>,
}

#[derive(Debug, Deserialize)]
struct SeedEntry {
    name: String,
    base_url: String,
    #[serde(default)]
    rss_url: Option<String>,
    #[serde(default)]
    regione: String,
    #[serde(default)]
    provincia: String,
    #[serde(default)]
    comune: String,
}

/// Load seeds from an explicit path, the default path, or the embedded copy.
pub fn load_seeds(path: Option<&Path>) -> Result<Vec<Source>> {
    if let Some(p) = path {
        let content = fs::read_to_string(p)
            .with_context(|| format!("reading seed file {}", p.display()))?;
        return parse_seeds(&content);
    }
    let default = PathBuf::from(DEFAULT_SEEDS_PATH);
    if default.exists() {
        let content = fs::read_to_string(&default)
            .with_context(|| format!("reading seed file {}", default.display()))?;
        return parse_seeds(&content);
    }
    Ok(embedded_seeds())
}

/// The compile-time seed list. Infallible: the embedded file is validated by
/// tests.
pub fn embedded_seeds() -> Vec<Source> {
    parse_seeds(EMBEDDED_SEEDS).expect("embedded seed list parses")
}

fn parse_seeds(content: &str) -> Result<Vec<Source>> {
    let file: SeedFile = toml::from_str(content).context("parsing seed toml")?;
    Ok(file
        .seeds
        .into_iter()
        .map(|s| Source {
            name: s.name,
            base_url: s.base_url,
            rss_url: s.rss_url,
            regione: s.regione,
            provincia: s.provincia,
            comune: s.comune,
            tier: SourceTier::Usr,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_list_parses_and_is_nonempty() {
        let seeds = embedded_seeds();
        assert!(!seeds.is_empty());
        assert!(seeds.iter().all(|s| s.base_url.starts_with("http")));
        assert!(seeds.iter().all(|s| s.tier == SourceTier::Usr));
    }

    #[test]
    fn optional_fields_default() {
        let toml = r#"
            [[seeds]]
            name = "USR Test"
            base_url = "https://example.test"
        "#;
        let seeds = parse_seeds(toml).unwrap();
        assert_eq!(seeds.len(), 1);
        assert!(seeds[0].rss_url.is_none());
        assert!(seeds[0].regione.is_empty());
    }
}
