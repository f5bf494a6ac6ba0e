//! Geographic position normalization.
//!
//! Source documents carry degrees-minutes coordinates in many shapes
//! (`46°53,546' N`, `46° 53.546 N`, `2°08,997' O`). The canonical form is
//! `DD°MM,mmm' H, DDD°MM,mmm' H` with `O` (Ouest) mapped to `W`.
//! Normalization is idempotent: re-normalizing a canonical string yields
//! the same string.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref LATITUDE: Regex =
        Regex::new(r"(\d{1,2})\s*°\s*(\d{1,2})\s*(?:[,.]\s*(\d{1,3}))?\s*['′]?\s*([NS])").unwrap();
    static ref LONGITUDE: Regex =
        Regex::new(r"(\d{1,3})\s*°\s*(\d{1,2})\s*(?:[,.]\s*(\d{1,3}))?\s*['′]?\s*([EWO])").unwrap();
}

/// Normalize a raw degrees-minutes coordinate pair to canonical form.
///
/// Returns `None` when either half cannot be parsed; the caller records a
/// warning and omits the field.
pub fn normalize(raw: &str) -> Option<String> {
    let lat = LATITUDE.captures(raw)?;
    // Longitude is searched after the latitude match to avoid re-reading
    // the latitude digits.
    let lat_end = lat.get(0).map(|m| m.end()).unwrap_or(0);
    let lon = LONGITUDE.captures(&raw[lat_end..])?;

    let lat_part = format_half(&lat, &["N", "S"])?;
    let lon_part = format_half(&lon, &["E", "W", "O"])?;

    Some(format!("{}, {}", lat_part, lon_part))
}

fn format_half(caps: &regex::Captures<'_>, hemispheres: &[&str]) -> Option<String> {
    let degrees: u32 = caps.get(1)?.as_str().parse().ok()?;
    let minutes: u32 = caps.get(2)?.as_str().parse().ok()?;
    if minutes >= 60 {
        return None;
    }

    let mut hemisphere = caps.get(4)?.as_str().to_uppercase();
    if hemisphere == "O" {
        hemisphere = "W".to_string();
    }
    if !hemispheres.contains(&caps.get(4)?.as_str().to_uppercase().as_str()) {
        return None;
    }

    Some(match caps.get(3) {
        // Keep the fractional digits exactly as written.
        Some(frac) => format!("{}°{:02},{}' {}", degrees, minutes, frac.as_str(), hemisphere),
        None => format!("{}°{:02}' {}", degrees, minutes, hemisphere),
    })
}
