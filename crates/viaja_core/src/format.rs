//! Display formatting: travel time, distances, BRL fares, and address lines.
//!
//! These functions are the only place where numbers are rounded; everything
//! upstream works at full precision.

use crate::address::AddressCandidate;

/// Format a duration in seconds for display.
///
/// Under a minute collapses to `"< 1 min"`; under an hour shows rounded whole
/// minutes; an hour or more shows hours plus remaining minutes, dropping the
/// minutes term when it is zero.
pub fn format_time(total_seconds: u64) -> String {
    if total_seconds < 60 {
        return "< 1 min".to_string();
    }
    let minutes = (total_seconds + 30) / 60;
    if minutes < 60 {
        return format!("{minutes} min");
    }
    let hours = minutes / 60;
    let remaining = minutes % 60;
    if remaining == 0 {
        format!("{hours} h")
    } else {
        format!("{hours} h {remaining} min")
    }
}

/// Format a distance in kilometres with two decimal places.
pub fn format_distance_km(distance_km: f64) -> String {
    format!("{distance_km:.2} km")
}

/// Format a fare in BRL with a comma decimal separator, or a placeholder when
/// no fare is available (unknown vehicle class).
pub fn format_fare_brl(fare: Option<f64>) -> String {
    match fare {
        Some(amount) => format!("R$ {amount:.2}").replace('.', ","),
        None => "R$ --".to_string(),
    }
}

/// The route summary line shown after a route is traced.
pub fn format_route_summary(distance_km: f64, time_seconds: u64) -> String {
    format!(
        "Distância: {} | Tempo Aprox.: {}",
        format_distance_km(distance_km),
        format_time(time_seconds)
    )
}

/// Build a short human-readable address line from a candidate.
///
/// Order: POI name, road (with house number), suburb, "city - state".
/// The road is skipped when it repeats the POI name, and duplicate parts
/// (e.g. a suburb named after the city) are collapsed.
pub fn format_place(candidate: &AddressCandidate) -> String {
    let mut parts: Vec<String> = Vec::new();

    if let Some(poi) = &candidate.poi_name {
        parts.push(poi.clone());
    }

    if let Some(road) = &candidate.road {
        let repeats_poi = candidate
            .poi_name
            .as_deref()
            .is_some_and(|poi| poi.eq_ignore_ascii_case(road));
        if !repeats_poi {
            match &candidate.house_number {
                Some(number) => parts.push(format!("{road}, {number}")),
                None => parts.push(road.clone()),
            }
        }
    }

    if let Some(suburb) = &candidate.suburb {
        parts.push(suburb.clone());
    }

    match (&candidate.city, &candidate.state) {
        (Some(city), Some(state)) => parts.push(format!("{city} - {state}")),
        (Some(city), None) => parts.push(city.clone()),
        (None, Some(state)) => parts.push(state.clone()),
        (None, None) => {}
    }

    let mut seen: Vec<String> = Vec::new();
    for part in parts {
        if !seen.contains(&part) {
            seen.push(part);
        }
    }
    seen.join(", ")
}
