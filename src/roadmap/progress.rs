//! Quiz completion.
//!
//! Completing a country is only allowed once it is unlocked. The result
//! reports which countries the completion newly unlocked, which is what the
//! map animates and what the unlock XP bonus is paid on.

use std::collections::HashMap;

use serde::Serialize;

use super::pins::{
    build_roadmap_pins, build_roadmap_pins_cached, normalize_code, CountryPin, PinStatus,
    RoadmapOptions,
};
use super::scoring::unlock_bonus;
use crate::atlas::{Atlas, SeaIndexCache};

/// Errors that can occur when completing a country.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProgressError {
    #[error("country code is required")]
    EmptyCode,

    #[error("country not found: '{0}'")]
    UnknownCountry(String),

    #[error("country is not on this roadmap: '{0}'")]
    NotAllowed(String),

    #[error("country is locked: '{0}'")]
    Locked(String),
}

/// Outcome of a successful completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Completion {
    pub completed: String,
    /// Countries that were locked before and are available now, sorted.
    pub unlocked: Vec<String>,
    pub xp_bonus: u32,
}

/// Marks `code` as completed in `options` and reports what it unlocked.
///
/// `options` is left untouched when an error is returned. Completing a
/// country twice succeeds and unlocks nothing the second time.
pub fn complete_country(
    atlas: &Atlas,
    options: &mut RoadmapOptions,
    code: &str,
) -> Result<Completion, ProgressError> {
    complete_with(atlas, options, code, build_roadmap_pins)
}

/// Same as `complete_country`, reusing sea-neighbor indexes from `cache`.
pub fn complete_country_cached(
    atlas: &Atlas,
    options: &mut RoadmapOptions,
    code: &str,
    cache: &SeaIndexCache,
) -> Result<Completion, ProgressError> {
    complete_with(atlas, options, code, |atlas, options| {
        build_roadmap_pins_cached(atlas, options, cache)
    })
}

fn complete_with<F>(
    atlas: &Atlas,
    options: &mut RoadmapOptions,
    code: &str,
    pins: F,
) -> Result<Completion, ProgressError>
where
    F: Fn(&Atlas, &RoadmapOptions) -> Vec<CountryPin>,
{
    let code = normalize_code(code);
    if code.is_empty() {
        return Err(ProgressError::EmptyCode);
    }
    if !atlas.contains(&code) {
        return Err(ProgressError::UnknownCountry(code));
    }

    let before = pins(atlas, &*options);
    let status = match before.iter().find(|p| p.code == code) {
        Some(pin) => pin.status,
        None => return Err(ProgressError::NotAllowed(code)),
    };
    if !status.is_playable() {
        return Err(ProgressError::Locked(code));
    }

    options.mark_completed(&code);
    let after = pins(atlas, &*options);
    let unlocked = newly_available(&before, &after);

    Ok(Completion {
        xp_bonus: unlock_bonus(unlocked.len()),
        completed: code,
        unlocked,
    })
}

/// Codes that went from locked to available between two pin sets.
pub fn newly_available(before: &[CountryPin], after: &[CountryPin]) -> Vec<String> {
    let previous: HashMap<&str, PinStatus> =
        before.iter().map(|p| (p.code.as_str(), p.status)).collect();
    let mut codes: Vec<String> = after
        .iter()
        .filter(|p| p.status == PinStatus::Available)
        .filter(|p| matches!(previous.get(p.code.as_str()), Some(PinStatus::Locked) | None))
        .map(|p| p.code.clone())
        .collect();
    codes.sort_unstable();
    codes
}
