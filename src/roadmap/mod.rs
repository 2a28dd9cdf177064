//! Unlock progress on the country roadmap.
//!
//! Pin status computation, quiz completion gating, and the XP formulas that
//! reward progress.

pub mod pins;
pub mod progress;
pub mod scoring;

pub use pins::{
    build_roadmap_pins, build_roadmap_pins_cached, normalize_code, CountryPin, PinStatus,
    RoadmapOptions, DEFAULT_MAX_SEA_NEIGHBORS, DEFAULT_SEA_NEIGHBOR_KM,
};
pub use progress::{
    complete_country, complete_country_cached, newly_available, Completion, ProgressError,
};
pub use scoring::{
    calculate_match_points, calculate_quiz_points, calculate_xp, unlock_bonus, QUIZ_POINTS_MAX,
    STREAK_BONUS_STEP, XP_PER_CORRECT, XP_PER_UNLOCK,
};
