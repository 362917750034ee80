//! Nearest-store resolution and coordinate formatting.
//!
//! The store candidates here are synthesized from the user's position with
//! fixed deterministic offsets, standing in for a real store-locator
//! integration. A genuine lookup can replace the bodies of [`nearest_store`]
//! and [`nearby_stores`] without changing their contracts or the formatting.

use serde::{Deserialize, Serialize};

use crate::capabilities::Position;

/// Rendered when no position is available.
pub const UNKNOWN_LOCATION: &str = "Unknown location";

/// The single user-visible category for every position failure. The caller
/// never distinguishes permission, availability, or platform errors.
pub const LOCATE_FAILED_MESSAGE: &str = "Could not locate nearest store";

/// Fallback for the one-line nearest-store summary when the position fetch fails.
pub const SUMMARY_UNAVAILABLE_MESSAGE: &str = "Location services not available";

/// Stores known to operate physical locations. Everything else is treated as
/// online-only.
const STORES_WITH_PHYSICAL_LOCATIONS: &[&str] = &["Target", "Walmart", "Best Buy"];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl From<&Position> for Coordinates {
    fn from(p: &Position) -> Self {
        Self::new(p.latitude, p.longitude)
    }
}

/// A resolved physical location for a store brand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreLocation {
    pub name: String,
    pub address: String,
    pub distance_label: String,
    pub coordinates: Coordinates,
}

/// Membership test against the physical-presence allow-list. Pure and total.
#[must_use]
pub fn has_physical_presence(store: &str) -> bool {
    STORES_WITH_PHYSICAL_LOCATIONS.contains(&store)
}

/// `"GPS(D.DDDD° {N|S}, D.DDDD° {E|W})"` with hemispheres chosen by sign;
/// zero renders as N/E. `None` renders the unknown-location sentinel.
#[must_use]
pub fn format_coordinates(coords: Option<Coordinates>) -> String {
    let Some(c) = coords else {
        return UNKNOWN_LOCATION.to_string();
    };

    let lat_hemisphere = if c.latitude >= 0.0 { 'N' } else { 'S' };
    let lon_hemisphere = if c.longitude >= 0.0 { 'E' } else { 'W' };

    format!(
        "GPS({:.4}° {}, {:.4}° {})",
        c.latitude.abs(),
        lat_hemisphere,
        c.longitude.abs(),
        lon_hemisphere
    )
}

/// Best-effort single candidate, deterministically offset from `origin`.
#[must_use]
pub fn nearest_store(store: &str, origin: Coordinates) -> StoreLocation {
    StoreLocation {
        name: format!("{store} Store"),
        address: "123 Main St, Your City".into(),
        distance_label: "2.4 miles".into(),
        coordinates: Coordinates::new(origin.latitude + 0.01, origin.longitude - 0.01),
    }
}

/// Three candidates with distinct offsets and ascending distance labels.
/// Deterministic for a given `origin` so results stay testable.
#[must_use]
pub fn nearby_stores(store: &str, origin: Coordinates) -> Vec<StoreLocation> {
    let candidates: [(&str, &str, &str, f64, f64); 3] = [
        ("Downtown", "123 Main St, Downtown", "1.2 miles", 0.01, -0.01),
        ("Uptown", "456 Park Ave, Uptown", "2.8 miles", -0.02, 0.02),
        ("Westside", "789 Ocean Blvd, Westside", "3.5 miles", 0.03, -0.03),
    ];

    candidates
        .iter()
        .map(|(area, address, distance, d_lat, d_lon)| StoreLocation {
            name: format!("{store} - {area}"),
            address: (*address).into(),
            distance_label: (*distance).into(),
            coordinates: Coordinates::new(origin.latitude + d_lat, origin.longitude + d_lon),
        })
        .collect()
}

/// One-line summary for the detail view:
/// `"{name}: {address} ({distance} away) {GPS(...)}"`.
#[must_use]
pub fn nearest_store_summary(store: &str, origin: Coordinates) -> String {
    let location = nearest_store(store, origin);
    format!(
        "{}: {} ({} away) {}",
        location.name,
        location.address,
        location.distance_label,
        format_coordinates(Some(location.coordinates))
    )
}
