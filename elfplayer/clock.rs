use crate::error::App;

/// Text shown on a clock before any time is known.
pub const ZERO_CLOCK: &str = "00:00";

/// Convert a number of seconds to a `MM:SS` clock, or `HH:MM:SS` once the
/// rounded total reaches an hour.
pub fn format_clock(seconds: f64) -> Result<String, App> {
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(App::InvalidInput(format!(
            "clock expects a non-negative number of seconds, got {seconds}"
        )));
    }

    let total = seconds.round() as u64;
    let hh = total / 3600;
    let mm = (total % 3600) / 60;
    let ss = total % 60;

    if total >= 3600 {
        Ok(format!("{hh:02}:{mm:02}:{ss:02}"))
    } else {
        Ok(format!("{mm:02}:{ss:02}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(format_clock(0.0).unwrap(), "00:00");
        assert_eq!(format_clock(59.0).unwrap(), "00:59");
        assert_eq!(format_clock(60.0).unwrap(), "01:00");
        assert_eq!(format_clock(3599.0).unwrap(), "59:59");
    }

    #[test]
    fn hour_field_appears_at_one_hour() {
        assert_eq!(format_clock(3600.0).unwrap(), "01:00:00");
        assert_eq!(format_clock(3661.0).unwrap(), "01:01:01");
        assert_eq!(format_clock(7325.0).unwrap(), "02:02:05");
    }

    #[test]
    fn rounds_to_nearest_second() {
        assert_eq!(format_clock(59.6).unwrap(), "01:00");
        assert_eq!(format_clock(59.4).unwrap(), "00:59");
        // Rounding can push the total over the hour boundary.
        assert_eq!(format_clock(3599.6).unwrap(), "01:00:00");
    }

    #[test]
    fn rejects_negative_and_non_numeric_values() {
        assert!(matches!(format_clock(-1.0), Err(App::InvalidInput(_))));
        assert!(matches!(format_clock(f64::NAN), Err(App::InvalidInput(_))));
        assert!(matches!(
            format_clock(f64::INFINITY),
            Err(App::InvalidInput(_))
        ));
    }
}
