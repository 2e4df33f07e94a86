//! Distance checks between a device position and a session's location.

use serde::{Deserialize, Serialize};

use crate::model::structs::Position;

/// Mean Earth radius in meters
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationCheck {
    pub within_range: bool,
    /// Great-circle distance in meters, rounded to centimeters
    pub distance_meters: f64,
}

/// Haversine distance in meters.
pub fn distance_meters(a: &Position, b: &Position) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlat = lat2 - lat1;
    let dlon = (b.longitude - a.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_M * c
}

/// Whether `student` is close enough to `session` to count as present.
///
/// The allowed distance is widened by the reported GPS accuracy. A session
/// without coordinates never matches and reports a distance of 0.
pub fn check_location(
    student: &Position,
    session: Option<&Position>,
    max_distance_meters: f64,
    accuracy_meters: Option<f64>,
) -> LocationCheck {
    let Some(session) = session else {
        return LocationCheck {
            within_range: false,
            distance_meters: 0.0,
        };
    };

    let distance = distance_meters(student, session);
    let allowed = max_distance_meters + accuracy_meters.unwrap_or(0.0);

    LocationCheck {
        within_range: distance <= allowed,
        distance_meters: (distance * 100.0).round() / 100.0,
    }
}
