//! Register page: places and people with their authority-file links.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::types::{PersonBio, RegisterEntry, RegisterFile};

/// Register data prepared for the page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPage {
    /// Places, `normdata` replaced by `gndUrl`/`wikidataUrl`.
    pub places: Vec<RegisterEntry>,
    /// People, same shape as places.
    pub people: Vec<RegisterEntry>,
    /// Biography text by person label.
    pub person_bios_by_label: BTreeMap<String, String>,
}

impl RegisterPage {
    /// Build the page from the register export and the biographies.
    ///
    /// When two biographies share a label the later one wins.
    pub fn build(register: &RegisterFile, bios: &[PersonBio]) -> Self {
        let (places, people) = match &register.register_data {
            Some(data) => (
                data.places.iter().map(with_norm_links).collect(),
                data.people.iter().map(with_norm_links).collect(),
            ),
            None => (Vec::new(), Vec::new()),
        };

        let person_bios_by_label = bios
            .iter()
            .map(|b| (b.label.clone(), b.bio.clone()))
            .collect();

        Self {
            places,
            people,
            person_bios_by_label,
        }
    }

    /// Number of register entries.
    pub fn entry_count(&self) -> usize {
        self.places.len() + self.people.len()
    }
}

/// Expand a Wikidata reference into a URL.
///
/// Protocol-relative URLs get `https:`, absolute URLs pass through, bare
/// item ids (`Q42`) become wiki links. Anything else is returned unchanged.
pub fn resolve_wikidata_url(value: Option<&str>) -> Option<String> {
    let value = value.filter(|v| !v.is_empty())?;
    if let Some(rest) = value.strip_prefix("//") {
        Some(format!("https://{}", rest))
    } else if value.starts_with("http") {
        Some(value.to_string())
    } else if value.starts_with('Q') {
        Some(format!("https://www.wikidata.org/wiki/{}", value))
    } else {
        Some(value.to_string())
    }
}

fn str_at<'a>(value: Option<&'a Value>, path: &[&str]) -> Option<&'a str> {
    let mut current = value?;
    for key in path {
        current = current.get(key)?;
    }
    current.as_str()
}

/// Copy an entry without `normdata`, adding `gndUrl` and `wikidataUrl`.
pub fn with_norm_links(entry: &RegisterEntry) -> RegisterEntry {
    let norm = entry.get("normdata");
    let gnd_url = str_at(norm, &["gnd", "uri"])
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    let wikidata_url = resolve_wikidata_url(str_at(norm, &["wikidata", "url"]))
        .or_else(|| resolve_wikidata_url(str_at(norm, &["gnd", "wikidata"])));

    let mut out: RegisterEntry = entry
        .iter()
        .filter(|(k, _)| k.as_str() != "normdata")
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    out.insert("gndUrl".into(), gnd_url.map_or(Value::Null, Value::String));
    out.insert(
        "wikidataUrl".into(),
        wikidata_url.map_or(Value::Null, Value::String),
    );
    out
}
