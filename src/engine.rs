//! Engine state management.
//!
//! Holds the country atlas, the current player's progress (start, completed
//! and allowed countries) and the engine options, and answers the protocol
//! commands that read or change them.

use std::collections::HashMap;
use std::io::{self, Write};

use log::{debug, warn};

use crate::atlas::{haversine_km, Atlas, CountryRecord, SeaIndexCache};
use crate::protocol::notation::format_code_list;
use crate::roadmap::{
    build_roadmap_pins_cached, calculate_quiz_points, calculate_xp, complete_country_cached,
    RoadmapOptions, DEFAULT_MAX_SEA_NEIGHBORS, DEFAULT_SEA_NEIGHBOR_KM,
};

/// Smallest accepted sea-crossing threshold.
const MIN_SEA_NEIGHBOR_KM: f64 = 1.0;

/// Largest accepted sea-crossing threshold: half the Earth's circumference.
const MAX_SEA_NEIGHBOR_KM: f64 = 20_000.0;

/// Largest accepted sea-neighbor count.
const MAX_SEA_NEIGHBORS: usize = 50;

/// Holds the mutable state of the engine between commands.
pub struct Engine {
    atlas: Atlas,
    pub progress: RoadmapOptions,
    pub options: HashMap<String, String>,
    sea_cache: SeaIndexCache,
}

impl Engine {
    /// Creates an engine over `atlas` with no progress.
    pub fn new(atlas: Atlas) -> Self {
        Engine {
            atlas,
            progress: RoadmapOptions::default(),
            options: HashMap::new(),
            sea_cache: SeaIndexCache::new(),
        }
    }

    pub fn atlas(&self) -> &Atlas {
        &self.atlas
    }

    /// Forgets all progress. Options and cached indexes are kept.
    pub fn new_game(&mut self) {
        self.progress = RoadmapOptions::default();
    }

    pub fn set_start(&mut self, codes: Vec<String>) {
        self.progress.start_codes = codes;
    }

    pub fn set_completed(&mut self, codes: Vec<String>) {
        self.progress.completed_codes = codes;
    }

    pub fn set_allowed(&mut self, codes: Option<Vec<String>>) {
        self.progress.allowed_codes = codes;
    }

    /// Sets an engine option. Unknown names and unparsable values are
    /// logged and ignored. A check option given without a value is enabled.
    pub fn set_option(&mut self, name: String, value: Option<String>) {
        let valid = match name.as_str() {
            "SeaNeighbors" | "SingleAvailable" => {
                value.as_deref().map_or(true, |v| parse_check(v).is_some())
            }
            "SeaNeighborKm" => value
                .as_deref()
                .and_then(|v| v.parse::<f64>().ok())
                .is_some_and(|km| (MIN_SEA_NEIGHBOR_KM..=MAX_SEA_NEIGHBOR_KM).contains(&km)),
            "MaxSeaNeighbors" => value
                .as_deref()
                .and_then(|v| v.parse::<usize>().ok())
                .is_some_and(|n| n <= MAX_SEA_NEIGHBORS),
            _ => {
                warn!("unknown option: {}", name);
                return;
            }
        };
        if !valid {
            warn!("invalid value for option {}: {:?}", name, value);
            return;
        }
        debug!("option {} = {:?}", name, value);
        self.options
            .insert(name, value.unwrap_or_else(|| "true".to_string()));
    }

    fn check_option(&self, name: &str) -> bool {
        self.options
            .get(name)
            .and_then(|v| parse_check(v))
            .unwrap_or(false)
    }

    /// Returns the configured sea-crossing threshold, or the default.
    fn sea_neighbor_km(&self) -> f64 {
        self.options
            .get("SeaNeighborKm")
            .and_then(|v| v.parse::<f64>().ok())
            .unwrap_or(DEFAULT_SEA_NEIGHBOR_KM)
    }

    /// Returns the configured sea-neighbor count, or the default.
    fn max_sea_neighbors(&self) -> usize {
        self.options
            .get("MaxSeaNeighbors")
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(DEFAULT_MAX_SEA_NEIGHBORS)
    }

    /// Current progress combined with the configured options.
    pub fn roadmap_options(&self) -> RoadmapOptions {
        RoadmapOptions {
            single_available: self.check_option("SingleAvailable"),
            include_sea_neighbors: self.check_option("SeaNeighbors"),
            sea_neighbor_km: self.sea_neighbor_km(),
            max_sea_neighbors: self.max_sea_neighbors(),
            ..self.progress.clone()
        }
    }

    /// Handles the handshake: writes id, options, protocol_version, and wqiok.
    pub fn handle_wqi<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "id name worldquest")?;
        writeln!(out, "id author worldquest")?;
        writeln!(out, "option name SeaNeighbors type check default false")?;
        writeln!(
            out,
            "option name SeaNeighborKm type spin default {} min {} max {}",
            DEFAULT_SEA_NEIGHBOR_KM, MIN_SEA_NEIGHBOR_KM, MAX_SEA_NEIGHBOR_KM
        )?;
        writeln!(
            out,
            "option name MaxSeaNeighbors type spin default {} min 0 max {}",
            DEFAULT_MAX_SEA_NEIGHBORS, MAX_SEA_NEIGHBORS
        )?;
        writeln!(out, "option name SingleAvailable type check default false")?;
        writeln!(out, "countries {}", self.atlas.len())?;
        writeln!(out, "protocol_version 1")?;
        writeln!(out, "wqiok")?;
        out.flush()
    }

    /// Handles the `isready` command.
    pub fn handle_isready<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "readyok")?;
        out.flush()
    }

    /// Handles `roadmap`: writes the pins as one JSON array.
    pub fn handle_roadmap<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let options = self.roadmap_options();
        let pins = build_roadmap_pins_cached(&self.atlas, &options, &self.sea_cache);
        write!(out, "pins ")?;
        serde_json::to_writer(&mut *out, &pins)?;
        writeln!(out)?;
        out.flush()
    }

    /// Handles `complete <code>`, recording the completion on success.
    pub fn handle_complete<W: Write>(&mut self, out: &mut W, code: &str) -> io::Result<()> {
        let mut options = self.roadmap_options();
        match complete_country_cached(&self.atlas, &mut options, code, &self.sea_cache) {
            Ok(done) => {
                self.progress.completed_codes = options.completed_codes;
                writeln!(
                    out,
                    "unlocked {} {} xp {}",
                    done.completed,
                    format_code_list(&done.unlocked),
                    done.xp_bonus
                )?;
            }
            Err(e) => {
                debug!("complete {}: {}", code, e);
                writeln!(out, "error {}", e)?;
            }
        }
        out.flush()
    }

    /// Handles `neighbors <code>`: land borders as listed in the atlas and
    /// sea neighbors under the current sea options.
    pub fn handle_neighbors<W: Write>(&self, out: &mut W, code: &str) -> io::Result<()> {
        let Some(country) = self.atlas.get(code) else {
            writeln!(out, "error country not found: '{}'", code)?;
            return out.flush();
        };
        let candidates: Vec<&CountryRecord> = self.atlas.iter().collect();
        let sea = self.sea_cache.get_or_build(
            &candidates,
            self.sea_neighbor_km(),
            self.max_sea_neighbors(),
        );
        writeln!(
            out,
            "neighbors {} land {} sea {}",
            country.code,
            format_code_list(&country.borders),
            format_code_list(sea.get(&country.code))
        )?;
        out.flush()
    }

    /// Handles `distance <a> <b>`.
    pub fn handle_distance<W: Write>(&self, out: &mut W, from: &str, to: &str) -> io::Result<()> {
        match (self.atlas.get(from), self.atlas.get(to)) {
            (Some(a), Some(b)) => {
                let km = haversine_km(a.position(), b.position());
                writeln!(out, "distance {} {} {:.1}", a.code, b.code, km)?;
            }
            (None, _) => writeln!(out, "error country not found: '{}'", from)?,
            (_, None) => writeln!(out, "error country not found: '{}'", to)?,
        }
        out.flush()
    }

    /// Handles `score <answers>`.
    pub fn handle_score<W: Write>(&self, out: &mut W, answers: &[bool]) -> io::Result<()> {
        let xp = calculate_xp(answers.iter().copied());
        let correct = answers.iter().filter(|&&a| a).count();
        let points = calculate_quiz_points(
            u32::try_from(correct).unwrap_or(u32::MAX),
            u32::try_from(answers.len()).unwrap_or(u32::MAX),
        );
        writeln!(out, "score xp {} points {}", xp, points)?;
        out.flush()
    }
}

/// Parses a check option value.
fn parse_check(v: &str) -> Option<bool> {
    match v.to_ascii_lowercase().as_str() {
        "true" | "on" | "1" | "yes" => Some(true),
        "false" | "off" | "0" | "no" => Some(false),
        _ => None,
    }
}
