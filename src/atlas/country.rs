//! Country reference data.
//!
//! The raw table follows the REST Countries layout: alpha-2 (`cca2`),
//! alpha-3 (`cca3`) and numeric (`ccn3`) codes, a `[lat, lng]` centroid, the
//! English common name and land borders as alpha-3 codes. Loading turns it
//! into `CountryRecord`s keyed by alpha-2 code. Records that cannot be placed
//! on the map are dropped, and so are border codes that do not resolve.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use serde::Deserialize;

use super::geo::LatLng;

/// The country table shipped with the crate.
pub const BUNDLED_COUNTRIES_JSON: &str = include_str!("../../data/countries.json");

/// Errors that can occur while loading a country table.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid country dataset JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// A country entry as it appears in the raw table.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCountry {
    #[serde(default)]
    pub cca2: Option<String>,
    #[serde(default)]
    pub cca3: Option<String>,
    #[serde(default)]
    pub ccn3: Option<String>,
    #[serde(default)]
    pub name: Option<RawName>,
    #[serde(default)]
    pub latlng: Option<Vec<f64>>,
    #[serde(default)]
    pub borders: Vec<String>,
}

/// Name block of a raw entry. Only the common name is used.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawName {
    #[serde(default)]
    pub common: Option<String>,
}

/// A country that can be placed on the map.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryRecord {
    /// Uppercase alpha-2 code, unique within an `Atlas`.
    pub code: String,
    /// Three-digit numeric code, used to join against polygon datasets.
    pub numeric_code: Option<String>,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    /// Alpha-2 codes of countries sharing a land border.
    pub borders: Vec<String>,
}

impl CountryRecord {
    pub fn position(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }

    /// Returns true if `code` is listed as a land neighbor of this country.
    pub fn borders_on(&self, code: &str) -> bool {
        self.borders.iter().any(|b| b == code)
    }
}

/// The immutable country table plus its lookup indexes.
///
/// Built once at startup and passed by reference to everything that needs
/// country data.
#[derive(Debug, Clone)]
pub struct Atlas {
    records: Vec<CountryRecord>,
    by_code: HashMap<String, usize>,
    by_numeric: HashMap<String, usize>,
}

impl Atlas {
    /// Loads the bundled country table.
    pub fn bundled() -> Result<Atlas, DatasetError> {
        Atlas::from_json(BUNDLED_COUNTRIES_JSON)
    }

    /// Loads a country table from a JSON file.
    pub fn load(path: &Path) -> Result<Atlas, DatasetError> {
        let data = fs::read_to_string(path).map_err(|source| DatasetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Atlas::from_json(&data)
    }

    /// Parses a JSON array of raw records.
    pub fn from_json(json: &str) -> Result<Atlas, DatasetError> {
        let raw: Vec<RawCountry> = serde_json::from_str(json)?;
        Ok(Atlas::from_raw(raw))
    }

    /// Builds the table from raw records, dropping the unusable ones.
    pub fn from_raw(raw: Vec<RawCountry>) -> Atlas {
        let alpha3_to_alpha2: HashMap<String, String> = raw
            .iter()
            .filter_map(|r| {
                let a3 = non_empty(r.cca3.as_deref())?.to_ascii_uppercase();
                let a2 = non_empty(r.cca2.as_deref())?.to_ascii_uppercase();
                Some((a3, a2))
            })
            .collect();

        let total = raw.len();
        let mut records = Vec::with_capacity(total);
        let mut seen = HashSet::new();
        let mut dropped_borders = 0usize;

        for entry in raw {
            let Some(code) = non_empty(entry.cca2.as_deref()).map(str::to_ascii_uppercase) else {
                continue;
            };
            let Some(name) = entry
                .name
                .as_ref()
                .and_then(|n| non_empty(n.common.as_deref()))
                .map(str::to_string)
            else {
                continue;
            };
            let Some(position) = centroid(entry.latlng.as_deref()) else {
                continue;
            };
            if !seen.insert(code.clone()) {
                debug!("duplicate country code {code}, keeping the first entry");
                continue;
            }

            let mut borders: Vec<String> = Vec::with_capacity(entry.borders.len());
            for a3 in &entry.borders {
                match alpha3_to_alpha2.get(&a3.trim().to_ascii_uppercase()) {
                    Some(a2) if *a2 != code && !borders.contains(a2) => borders.push(a2.clone()),
                    Some(_) => {}
                    None => dropped_borders += 1,
                }
            }

            records.push(CountryRecord {
                code,
                numeric_code: entry.ccn3.as_deref().and_then(normalize_numeric),
                name,
                lat: position.lat,
                lng: position.lng,
                borders,
            });
        }

        debug!(
            "loaded {} of {} countries ({} unresolved border codes dropped)",
            records.len(),
            total,
            dropped_borders
        );

        Atlas::from_records(records)
    }

    /// Wraps already-clean records. Later duplicates of a code are ignored by
    /// the lookups.
    pub fn from_records(records: Vec<CountryRecord>) -> Atlas {
        let mut by_code = HashMap::with_capacity(records.len());
        let mut by_numeric = HashMap::new();
        for (i, r) in records.iter().enumerate() {
            by_code.entry(r.code.clone()).or_insert(i);
            if let Some(num) = &r.numeric_code {
                by_numeric.entry(num.clone()).or_insert(i);
            }
        }
        Atlas {
            records,
            by_code,
            by_numeric,
        }
    }

    /// Looks up a country by alpha-2 code, ignoring case and surrounding
    /// whitespace.
    pub fn get(&self, code: &str) -> Option<&CountryRecord> {
        let code = code.trim();
        self.by_code
            .get(code)
            .or_else(|| self.by_code.get(&code.to_ascii_uppercase()))
            .map(|&i| &self.records[i])
    }

    /// Returns true if the code names a country in the table.
    pub fn contains(&self, code: &str) -> bool {
        self.get(code).is_some()
    }

    /// Looks up a country by numeric code. `"20"`, `"020"` and `20` as text
    /// all find Andorra.
    pub fn by_numeric_code(&self, numeric: &str) -> Option<&CountryRecord> {
        let key = normalize_numeric(numeric)?;
        self.by_numeric.get(&key).map(|&i| &self.records[i])
    }

    /// All records in table order.
    pub fn records(&self) -> &[CountryRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CountryRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<'a> IntoIterator for &'a Atlas {
    type Item = &'a CountryRecord;
    type IntoIter = std::slice::Iter<'a, CountryRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

fn centroid(latlng: Option<&[f64]>) -> Option<LatLng> {
    match latlng? {
        [lat, lng, ..] => Some(LatLng::new(*lat, *lng)).filter(|p| p.is_finite()),
        _ => None,
    }
}

/// Zero-pads a numeric code to three digits. Anything that is not 1-3
/// ASCII digits is rejected.
fn normalize_numeric(s: &str) -> Option<String> {
    let s = s.trim();
    if s.is_empty() || s.len() > 3 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(format!("{:0>3}", s))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[
        {"cca2": "es", "cca3": "ESP", "ccn3": "724", "name": {"common": "Spain"}, "latlng": [40, -4], "borders": ["PRT", "FRA", "XXX", "ESP"]},
        {"cca2": "PT", "cca3": "PRT", "ccn3": "620", "name": {"common": "Portugal"}, "latlng": [39.5, -8], "borders": ["ESP"]},
        {"cca2": "FR", "cca3": "FRA", "ccn3": "250", "name": {"common": "France"}, "latlng": [46, 2]},
        {"cca2": "AQ", "cca3": "ATA", "name": {"common": "Antarctica"}},
        {"cca3": "NOA", "name": {"common": "No Alpha Two"}, "latlng": [1, 1]},
        {"cca2": "NN", "cca3": "NNN", "latlng": [1, 1]},
        {"cca2": "HL", "cca3": "HLF", "name": {"common": "Half"}, "latlng": [1]},
        {"cca2": "PT", "cca3": "PRX", "name": {"common": "Portugal Again"}, "latlng": [0, 0]}
    ]"#;

    fn sample() -> Atlas {
        Atlas::from_json(SAMPLE).unwrap()
    }

    #[test]
    fn drops_unplaceable_records() {
        let atlas = sample();
        let codes: Vec<&str> = atlas.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, vec!["ES", "PT", "FR"]);
    }

    #[test]
    fn first_duplicate_code_wins() {
        let atlas = sample();
        assert_eq!(atlas.get("PT").unwrap().name, "Portugal");
    }

    #[test]
    fn translates_borders_and_drops_unknown() {
        let atlas = sample();
        let spain = atlas.get("ES").unwrap();
        // XXX has no alpha-2 entry; the self reference is discarded.
        assert_eq!(spain.borders, vec!["PT".to_string(), "FR".to_string()]);
        assert!(atlas.get("FR").unwrap().borders.is_empty());
    }

    #[test]
    fn asymmetric_borders_are_kept_as_given() {
        let atlas = sample();
        assert!(atlas.get("ES").unwrap().borders_on("FR"));
        assert!(!atlas.get("FR").unwrap().borders_on("ES"));
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let atlas = sample();
        assert_eq!(atlas.get("es").unwrap().code, "ES");
        assert_eq!(atlas.get(" pt ").unwrap().code, "PT");
        assert!(atlas.get("zz").is_none());
        assert!(atlas.get("").is_none());
    }

    #[test]
    fn numeric_lookup_pads() {
        let atlas = Atlas::bundled().unwrap();
        assert_eq!(atlas.by_numeric_code("20").unwrap().code, "AD");
        assert_eq!(atlas.by_numeric_code("020").unwrap().code, "AD");
        assert_eq!(atlas.by_numeric_code("724").unwrap().code, "ES");
        assert!(atlas.by_numeric_code("abc").is_none());
        assert!(atlas.by_numeric_code("9999").is_none());
    }

    #[test]
    fn bundled_table_is_consistent() {
        let atlas = Atlas::bundled().unwrap();
        assert!(atlas.len() > 200);
        let mut seen = HashSet::new();
        for r in &atlas {
            assert_eq!(r.code.len(), 2, "{}", r.code);
            assert_eq!(r.code, r.code.to_ascii_uppercase());
            assert!(seen.insert(r.code.clone()), "duplicate {}", r.code);
            assert!(r.lat.is_finite() && r.lng.is_finite());
            for b in &r.borders {
                assert!(atlas.contains(b), "{} borders unknown {}", r.code, b);
            }
        }
    }

    #[test]
    fn bundled_spain_borders() {
        let atlas = Atlas::bundled().unwrap();
        let spain = atlas.get("ES").unwrap();
        for code in ["AD", "FR", "PT", "MA", "GI"] {
            assert!(spain.borders_on(code), "missing {code}");
        }
        assert_eq!(spain.numeric_code.as_deref(), Some("724"));
    }

    #[test]
    fn kosovo_has_no_numeric_code() {
        let atlas = Atlas::bundled().unwrap();
        assert_eq!(atlas.get("XK").unwrap().numeric_code, None);
    }

    #[test]
    fn invalid_json_is_an_error() {
        assert!(matches!(
            Atlas::from_json("{not json"),
            Err(DatasetError::Json(_))
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = Atlas::load(Path::new("/nonexistent/countries.json")).unwrap_err();
        assert!(matches!(err, DatasetError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/countries.json"));
    }

    #[test]
    fn bundled_table_covers_sea_crossing_islands() {
        let atlas = Atlas::bundled().unwrap();
        assert_eq!(atlas.len(), 207);
        for code in ["IS", "MT", "JM", "CU", "HT", "JP", "GF", "XK", "AQ"] {
            assert!(atlas.contains(code), "{code}");
        }
    }
}
