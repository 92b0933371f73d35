//! Geographic coordinates and their textual labels.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Marker that identifies a coordinate label rather than a real address.
pub const DEGREE_MARKER: char = '°';

/// A latitude/longitude pair in decimal degrees.
///
/// # Examples
///
/// ```
/// use bikeshare_server::domain::Coordinates;
///
/// let bratislava = Coordinates::new(48.1486, 17.1077);
/// assert_eq!(bratislava.label(), "48.1486°, 17.1077°");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    /// Create a coordinate pair.
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Format as a fixed four-decimal label with degree symbols.
    ///
    /// This is the address written back when no provider could name the place.
    pub fn label(&self) -> String {
        format!(
            "{:.4}{DEGREE_MARKER}, {:.4}{DEGREE_MARKER}",
            self.lat, self.lng
        )
    }

    /// Key used to share lookups between coordinates that produce the same label.
    pub fn rounded_key(&self) -> (i64, i64) {
        (
            (self.lat * 10_000.0).round() as i64,
            (self.lng * 10_000.0).round() as i64,
        )
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Returns true if the address is a coordinate label placeholder.
pub fn is_coordinate_label(address: &str) -> bool {
    address.contains(DEGREE_MARKER)
}
