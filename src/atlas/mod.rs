//! Static country data and the geometry built on top of it.
//!
//! Contains the country table loader, great-circle distance, and the
//! sea-neighbor index used to model short water crossings.

pub mod country;
pub mod geo;
pub mod sea;

pub use country::{Atlas, CountryRecord, DatasetError, RawCountry, BUNDLED_COUNTRIES_JSON};
pub use geo::{haversine_km, LatLng, EARTH_RADIUS_KM};
pub use sea::{
    build_sea_neighbors, sea_neighbors_of, SeaIndexCache, SeaNeighborIndex,
    DEFAULT_SEA_CACHE_CAPACITY,
};
