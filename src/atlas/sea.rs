//! Sea-neighbor adjacency.
//!
//! Countries without a shared land border can still be "adjacent" across a
//! short stretch of water. For every country in a candidate set we keep the
//! nearest other candidates within a distance threshold, capped at a fixed
//! count. Distances are plain great-circle distances between centroids, not
//! real shipping routes.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use rayon::prelude::*;

use super::country::CountryRecord;
use super::geo::haversine_km;

/// Nearest-first sea neighbors for each country of a candidate set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeaNeighborIndex {
    neighbors: HashMap<String, Vec<String>>,
}

impl SeaNeighborIndex {
    /// Sea neighbors of `code`, nearest first. Empty for unknown codes.
    pub fn get(&self, code: &str) -> &[String] {
        self.neighbors.get(code).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of countries with a row in the index (including empty rows).
    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.neighbors
            .iter()
            .map(|(code, row)| (code.as_str(), row.as_slice()))
    }
}

/// Builds the sea-neighbor index over `countries`.
///
/// Each row holds the other candidates within `max_distance_km`, sorted by
/// distance and truncated to `max_neighbors`. Equal distances keep input
/// order. O(n²) in the number of candidates; rows are computed on the rayon
/// pool, which does not change the result.
pub fn build_sea_neighbors(
    countries: &[&CountryRecord],
    max_distance_km: f64,
    max_neighbors: usize,
) -> SeaNeighborIndex {
    let neighbors = countries
        .par_iter()
        .map(|country| {
            let row = sea_neighbors_of(country, countries, max_distance_km, max_neighbors);
            (country.code.clone(), row)
        })
        .collect();

    SeaNeighborIndex { neighbors }
}

/// One row of the index: the sea neighbors of `country` among `candidates`.
/// `country` itself is skipped if it is a candidate.
pub fn sea_neighbors_of(
    country: &CountryRecord,
    candidates: &[&CountryRecord],
    max_distance_km: f64,
    max_neighbors: usize,
) -> Vec<String> {
    if max_neighbors == 0 {
        return Vec::new();
    }

    let origin = country.position();
    let mut in_range: Vec<(&str, f64)> = candidates
        .iter()
        .filter(|other| other.code != country.code)
        .map(|other| (other.code.as_str(), haversine_km(origin, other.position())))
        .filter(|(_, d)| *d <= max_distance_km)
        .collect();

    // Stable sort keeps input order for equal distances.
    in_range.sort_by(|a, b| a.1.total_cmp(&b.1));
    in_range.truncate(max_neighbors);
    in_range.into_iter().map(|(code, _)| code.to_string()).collect()
}

/// Key for a memoized index: threshold bits, neighbor cap, sorted candidate
/// codes.
type CacheKey = (u64, usize, Vec<String>);

/// Indexes kept by a default `SeaIndexCache`.
pub const DEFAULT_SEA_CACHE_CAPACITY: usize = 8;

#[derive(Debug, Default)]
struct CacheEntries {
    map: HashMap<CacheKey, Arc<SeaNeighborIndex>>,
    // Insertion order, oldest first.
    order: VecDeque<CacheKey>,
}

/// Memoizes sea-neighbor indexes.
///
/// The country table never changes while the process runs, so an index built
/// for a given threshold, cap and candidate set stays valid forever. At most
/// `capacity` indexes are kept; the oldest one is evicted first.
#[derive(Debug)]
pub struct SeaIndexCache {
    entries: Mutex<CacheEntries>,
    capacity: usize,
}

impl Default for SeaIndexCache {
    fn default() -> Self {
        SeaIndexCache::with_capacity(DEFAULT_SEA_CACHE_CAPACITY)
    }
}

impl SeaIndexCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// A cache holding at most `capacity` indexes (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        SeaIndexCache {
            entries: Mutex::new(CacheEntries::default()),
            capacity: capacity.max(1),
        }
    }

    /// Returns the cached index for these parameters, building it on a miss.
    pub fn get_or_build(
        &self,
        countries: &[&CountryRecord],
        max_distance_km: f64,
        max_neighbors: usize,
    ) -> Arc<SeaNeighborIndex> {
        let mut codes: Vec<String> = countries.iter().map(|c| c.code.clone()).collect();
        codes.sort_unstable();
        let key = (max_distance_km.to_bits(), max_neighbors, codes);

        if let Some(hit) = self.lock().map.get(&key) {
            return Arc::clone(hit);
        }

        // Built outside the lock; a racing builder produces the same index.
        let index = Arc::new(build_sea_neighbors(countries, max_distance_km, max_neighbors));

        let mut entries = self.lock();
        if let Some(existing) = entries.map.get(&key) {
            return Arc::clone(existing);
        }
        while entries.map.len() >= self.capacity {
            let Some(oldest) = entries.order.pop_front() else {
                break;
            };
            entries.map.remove(&oldest);
        }
        entries.order.push_back(key.clone());
        entries.map.insert(key, Arc::clone(&index));
        index
    }

    /// Number of memoized indexes.
    pub fn len(&self) -> usize {
        self.lock().map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().map.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CacheEntries> {
        // Nothing panics between updating the map and the queue.
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::country::Atlas;

    fn record(code: &str, lat: f64, lng: f64) -> CountryRecord {
        CountryRecord {
            code: code.to_string(),
            numeric_code: None,
            name: code.to_string(),
            lat,
            lng,
            borders: Vec::new(),
        }
    }

    #[test]
    fn keeps_nearest_within_threshold() {
        // Along the equator one degree is ~111 km.
        let records = vec![
            record("AA", 0.0, 0.0),
            record("BB", 0.0, 1.0),
            record("CC", 0.0, 3.0),
            record("DD", 0.0, 2.0),
            record("EE", 0.0, 10.0),
        ];
        let refs: Vec<&CountryRecord> = records.iter().collect();
        let index = build_sea_neighbors(&refs, 400.0, 10);
        assert_eq!(index.get("AA"), ["BB", "DD", "CC"]);
        assert!(index.get("EE").is_empty());
        assert_eq!(index.len(), 5);
    }

    #[test]
    fn respects_neighbor_cap() {
        let records = vec![
            record("AA", 0.0, 0.0),
            record("BB", 0.0, 1.0),
            record("CC", 0.0, 2.0),
            record("DD", 0.0, 3.0),
        ];
        let refs: Vec<&CountryRecord> = records.iter().collect();
        let index = build_sea_neighbors(&refs, 1000.0, 2);
        assert_eq!(index.get("AA"), ["BB", "CC"]);
        assert_eq!(index.get("BB").len(), 2);
    }

    #[test]
    fn equal_distances_keep_input_order() {
        let records = vec![
            record("MM", 0.0, 0.0),
            record("ZZ", 0.0, 1.0),
            record("AA", 0.0, -1.0),
        ];
        let refs: Vec<&CountryRecord> = records.iter().collect();
        let index = build_sea_neighbors(&refs, 500.0, 1);
        assert_eq!(index.get("MM"), ["ZZ"]);
    }

    #[test]
    fn zero_cap_yields_empty_rows() {
        let records = vec![record("AA", 0.0, 0.0), record("BB", 0.0, 1.0)];
        let refs: Vec<&CountryRecord> = records.iter().collect();
        let index = build_sea_neighbors(&refs, 1000.0, 0);
        assert!(index.get("AA").is_empty());
        assert!(index.get("BB").is_empty());
    }

    #[test]
    fn unknown_code_has_no_neighbors() {
        let index = SeaNeighborIndex::default();
        assert!(index.get("ES").is_empty());
        assert!(index.is_empty());
    }

    #[test]
    fn jamaica_reaches_cuba_and_haiti() {
        let atlas = Atlas::bundled().unwrap();
        let refs: Vec<&CountryRecord> = atlas.iter().collect();
        let index = build_sea_neighbors(&refs, 600.0, 3);
        let row = index.get("JM");
        assert!(row.iter().any(|c| c == "CU"), "{row:?}");
        assert!(row.iter().any(|c| c == "HT"), "{row:?}");
    }

    #[test]
    fn rows_never_contain_self_or_far_countries() {
        let atlas = Atlas::bundled().unwrap();
        let refs: Vec<&CountryRecord> = atlas.iter().collect();
        let index = build_sea_neighbors(&refs, 600.0, 3);
        for (code, row) in index.iter() {
            let origin = atlas.get(code).unwrap();
            assert!(row.len() <= 3);
            let mut last = 0.0;
            for n in row {
                assert_ne!(n, code);
                let d = haversine_km(origin.position(), atlas.get(n).unwrap().position());
                assert!(d <= 600.0, "{code}->{n} is {d} km");
                assert!(d >= last, "{code} row not sorted");
                last = d;
            }
        }
    }

    #[test]
    fn cache_matches_direct_build() {
        let atlas = Atlas::bundled().unwrap();
        let refs: Vec<&CountryRecord> = atlas.iter().collect();
        let cache = SeaIndexCache::new();
        let cached = cache.get_or_build(&refs, 600.0, 3);
        assert_eq!(*cached, build_sea_neighbors(&refs, 600.0, 3));

        let again = cache.get_or_build(&refs, 600.0, 3);
        assert!(Arc::ptr_eq(&cached, &again));
        assert_eq!(cache.len(), 1);

        cache.get_or_build(&refs, 800.0, 3);
        cache.get_or_build(&refs[..10], 600.0, 3);
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn cache_evicts_oldest_when_full() {
        let atlas = Atlas::bundled().unwrap();
        let refs: Vec<&CountryRecord> = atlas.iter().take(20).collect();
        let cache = SeaIndexCache::with_capacity(4);

        let first = cache.get_or_build(&refs, 100.0, 3);
        for km in 1..500 {
            cache.get_or_build(&refs, 100.0 + f64::from(km), 3);
            assert!(cache.len() <= cache.capacity());
        }
        assert_eq!(cache.len(), 4);

        let rebuilt = cache.get_or_build(&refs, 100.0, 3);
        assert!(!Arc::ptr_eq(&first, &rebuilt));
        assert_eq!(first, rebuilt);
    }

    #[test]
    fn single_row_matches_index_row() {
        let atlas = Atlas::bundled().unwrap();
        let refs: Vec<&CountryRecord> = atlas.iter().collect();
        let index = build_sea_neighbors(&refs, 600.0, 3);
        let jamaica = atlas.get("JM").unwrap();
        assert_eq!(sea_neighbors_of(jamaica, &refs, 600.0, 3), index.get("JM"));
    }
}
