//! Bulk school registry.
//!
//! The ministry open-data anagrafe ships one CSV row per school. Column names
//! have drifted across dataset vintages, so every field reads an ordered list
//! of candidate headers. Rows without a usable absolute website URL are
//! dropped.

use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Context, Result};

use super::{Source, SourceTier};
use crate::fetch::Fetcher;

pub const REGISTRY_CSV_URL: &str =
    "https://dati.istruzione.it/opendata/opendata/catalogo/elements1/leaf/SCUANAGRAFESTAT20252620250901.csv";

const FETCH_TIMEOUT: Duration = Duration::from_secs(120);

const FALLBACK_SCHOOL_NAME: &str = "Istituto Scolastico";

/// Fetch and parse the registry dataset into tier-3 sources.
pub async fn load_schools(fetcher: &dyn Fetcher) -> Result<Vec<Source>> {
    let page = fetcher
        .get(REGISTRY_CSV_URL, FETCH_TIMEOUT)
        .await
        .context("fetching school registry csv")?;
    if page.status != 200 {
        anyhow::bail!("school registry returned status {}", page.status);
    }
    parse_registry(&page.body)
}

/// Parse registry CSV text. Malformed rows are skipped, not fatal.
pub fn parse_registry(csv_text: &str) -> Result<Vec<Source>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(csv_text.as_bytes());
    let headers = reader.headers().context("reading registry csv header")?;
    let index: HashMap<String, usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.trim().to_string(), i))
        .collect();

    let field = |record: &csv::StringRecord, names: &[&str]| -> String {
        for name in names {
            if let Some(&i) = index.get(*name) {
                if let Some(v) = record.get(i) {
                    let v = v.trim();
                    if !v.is_empty() {
                        return v.to_string();
                    }
                }
            }
        }
        String::new()
    };

    let mut out = Vec::new();
    for record in reader.records() {
        let record = match record {
            Ok(r) => r,
            Err(_) => continue,
        };
        let url = field(&record, &["SitoWebScuola", "SitoWeb"]);
        if !url.starts_with("http") {
            continue;
        }
        let name = {
            let n = field(
                &record,
                &["DenominazioneIstitutoRiferimento", "DenominazioneScuola"],
            );
            if n.is_empty() {
                FALLBACK_SCHOOL_NAME.to_string()
            } else {
                n
            }
        };
        out.push(Source {
            name,
            base_url: url,
            rss_url: None,
            regione: field(&record, &["Regione", "DescrizioneRegione"]),
            provincia: field(&record, &["Provincia", "DescrizioneProvincia"]),
            comune: field(&record, &["DescrizioneComune", "Comune"]),
            tier: SourceTier::Scuola,
        });
    }
    Ok(out)
}
