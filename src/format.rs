//! Human-readable distance and duration text for the summary panel.

/// Whole meters below one kilometer, kilometers with one decimal above.
pub fn format_distance(meters: f64) -> String {
    if meters < 1000.0 {
        return format!("{} m", meters.round() as i64);
    }

    format!("{:.1} km", meters / 1000.0)
}

/// Floors to whole minutes; anything under a minute reads "Less than 1 min".
pub fn format_duration(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };

    let hours = total / 3600;
    let minutes = (total % 3600) / 60;

    match (hours, minutes) {
        (0, 0) => "Less than 1 min".into(),
        (0, minutes) => format!("{} min", minutes),
        (hours, minutes) => format!("{} hr {} min", hours, minutes),
    }
}
