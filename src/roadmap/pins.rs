//! Roadmap pin computation.
//!
//! Given the countries a player has completed and one or more starting
//! countries, decides for every country whether it is locked, available
//! to quiz, or completed. A country becomes available when it is a start
//! country or lies one land border (or, optionally, one short sea crossing)
//! away from a completed country.

use std::collections::{BTreeSet, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::atlas::{
    build_sea_neighbors, sea_neighbors_of, Atlas, CountryRecord, SeaIndexCache, SeaNeighborIndex,
};

/// Default sea-crossing threshold in kilometers.
pub const DEFAULT_SEA_NEIGHBOR_KM: f64 = 600.0;

/// Default number of sea neighbors kept per country.
pub const DEFAULT_MAX_SEA_NEIGHBORS: usize = 3;

/// Unlock status of a country on the roadmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinStatus {
    Locked,
    Available,
    Completed,
}

impl PinStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            PinStatus::Locked => "locked",
            PinStatus::Available => "available",
            PinStatus::Completed => "completed",
        }
    }

    /// Returns true if a quiz may be started for a country in this status.
    pub const fn is_playable(self) -> bool {
        !matches!(self, PinStatus::Locked)
    }
}

impl fmt::Display for PinStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A map marker for one country.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryPin {
    pub code: String,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub status: PinStatus,
}

/// Inputs to the pin builder.
#[derive(Debug, Clone, PartialEq)]
pub struct RoadmapOptions {
    /// Countries that are available whenever they are not completed.
    pub start_codes: Vec<String>,
    /// Countries the player has finished. Case-insensitive, duplicates ignored.
    pub completed_codes: Vec<String>,
    /// Collapse the available set to its lexicographically smallest code.
    pub single_available: bool,
    /// When set, only these countries appear on the roadmap at all.
    pub allowed_codes: Option<Vec<String>>,
    pub include_sea_neighbors: bool,
    pub sea_neighbor_km: f64,
    pub max_sea_neighbors: usize,
}

impl Default for RoadmapOptions {
    fn default() -> Self {
        RoadmapOptions {
            start_codes: Vec::new(),
            completed_codes: Vec::new(),
            single_available: false,
            allowed_codes: None,
            include_sea_neighbors: false,
            sea_neighbor_km: DEFAULT_SEA_NEIGHBOR_KM,
            max_sea_neighbors: DEFAULT_MAX_SEA_NEIGHBORS,
        }
    }
}

impl RoadmapOptions {
    /// Options for a fresh roadmap seeded at a single country.
    pub fn starting_at(code: &str) -> Self {
        RoadmapOptions {
            start_codes: vec![code.to_string()],
            ..Default::default()
        }
    }

    /// Adds `code` to the completed set unless it is already there.
    pub fn mark_completed(&mut self, code: &str) {
        let code = normalize_code(code);
        if code.is_empty() {
            return;
        }
        if !self.completed_codes.iter().any(|c| normalize_code(c) == code) {
            self.completed_codes.push(code);
        }
    }
}

/// Builds the roadmap pins, computing the sea-neighbor index from scratch
/// when sea crossings are enabled.
pub fn build_roadmap_pins(atlas: &Atlas, options: &RoadmapOptions) -> Vec<CountryPin> {
    let universe = Universe::new(atlas, options.allowed_codes.as_deref());
    let sea = options.include_sea_neighbors.then(|| {
        build_sea_neighbors(
            &universe.records,
            options.sea_neighbor_km,
            options.max_sea_neighbors,
        )
    });
    pins_for(&universe, options, sea.as_ref())
}

/// Same as `build_roadmap_pins`, but reuses sea-neighbor indexes from `cache`.
pub fn build_roadmap_pins_cached(
    atlas: &Atlas,
    options: &RoadmapOptions,
    cache: &SeaIndexCache,
) -> Vec<CountryPin> {
    let universe = Universe::new(atlas, options.allowed_codes.as_deref());
    let sea = options.include_sea_neighbors.then(|| {
        cache.get_or_build(
            &universe.records,
            options.sea_neighbor_km,
            options.max_sea_neighbors,
        )
    });
    pins_for(&universe, options, sea.as_deref())
}

/// Uppercases and trims a country code.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

/// The countries eligible for pins: the whole atlas or its allow-listed part.
struct Universe<'a> {
    atlas: &'a Atlas,
    records: Vec<&'a CountryRecord>,
    codes: HashSet<&'a str>,
}

impl<'a> Universe<'a> {
    fn new(atlas: &'a Atlas, allowed: Option<&[String]>) -> Self {
        let allowed: Option<HashSet<String>> =
            allowed.map(|codes| codes.iter().map(|c| normalize_code(c)).collect());
        let records: Vec<&CountryRecord> = atlas
            .iter()
            .filter(|r| allowed.as_ref().map_or(true, |set| set.contains(&r.code)))
            .collect();
        let codes = records.iter().map(|r| r.code.as_str()).collect();
        Universe {
            atlas,
            records,
            codes,
        }
    }

    fn get(&self, code: &str) -> Option<&'a CountryRecord> {
        self.atlas
            .get(code)
            .filter(|r| self.codes.contains(r.code.as_str()))
    }
}

fn pins_for(
    universe: &Universe<'_>,
    options: &RoadmapOptions,
    sea: Option<&SeaNeighborIndex>,
) -> Vec<CountryPin> {
    let completed: HashSet<String> = options
        .completed_codes
        .iter()
        .map(|c| normalize_code(c))
        .filter(|c| !c.is_empty())
        .collect();

    let mut available: BTreeSet<&str> = BTreeSet::new();
    let mut unlock = |code: &str| {
        if let Some(country) = universe.get(code) {
            if !completed.contains(&country.code) {
                available.insert(country.code.as_str());
            }
        }
    };

    for start in &options.start_codes {
        unlock(start);
    }

    // Completed countries expand even when the allow-list hides them; only
    // the neighbors they reach are filtered.
    for code in &completed {
        let Some(origin) = universe.atlas.get(code) else {
            continue;
        };
        for neighbor in &origin.borders {
            unlock(neighbor);
        }
        let Some(sea) = sea else {
            continue;
        };
        if universe.codes.contains(origin.code.as_str()) {
            for neighbor in sea.get(&origin.code) {
                unlock(neighbor);
            }
        } else {
            let row = sea_neighbors_of(
                origin,
                &universe.records,
                options.sea_neighbor_km,
                options.max_sea_neighbors,
            );
            for neighbor in &row {
                unlock(neighbor);
            }
        }
    }

    if options.single_available {
        if let Some(&first) = available.iter().next() {
            available = BTreeSet::from([first]);
        }
    }

    universe
        .records
        .iter()
        .map(|r| {
            let status = if completed.contains(&r.code) {
                PinStatus::Completed
            } else if available.contains(r.code.as_str()) {
                PinStatus::Available
            } else {
                PinStatus::Locked
            };
            CountryPin {
                code: r.code.clone(),
                name: r.name.clone(),
                lat: r.lat,
                lng: r.lng,
                status,
            }
        })
        .collect()
}
