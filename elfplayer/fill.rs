use crate::error::App;

/// How far along a range slider sits, as a fraction in `[0, 1]`.
///
/// The caller paints a two-color gradient with the result (foreground up to
/// the fraction, background beyond it); this only computes the number.
pub fn fill_fraction(value: f64, min: f64, max: f64) -> Result<f64, App> {
    if value.is_nan() || min.is_nan() || max.is_nan() {
        return Err(App::InvalidInput(
            "fill fraction expects numeric value, min and max".to_string(),
        ));
    }
    if max <= min {
        return Err(App::InvalidRange(format!(
            "degenerate range {min}..{max}"
        )));
    }

    Ok(((value - min) / (max - min)).clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn midpoint_is_half() {
        assert!((fill_fraction(50.0, 0.0, 100.0).unwrap() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn values_outside_the_range_are_clamped() {
        assert!(fill_fraction(-10.0, 0.0, 100.0).unwrap().abs() < f64::EPSILON);
        assert!((fill_fraction(150.0, 0.0, 100.0).unwrap() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn nonzero_minimum_shifts_the_fraction() {
        assert!((fill_fraction(15.0, 10.0, 20.0).unwrap() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn degenerate_range_is_rejected() {
        assert!(matches!(
            fill_fraction(5.0, 10.0, 10.0),
            Err(App::InvalidRange(_))
        ));
        assert!(matches!(
            fill_fraction(5.0, 20.0, 10.0),
            Err(App::InvalidRange(_))
        ));
    }

    #[test]
    fn non_numeric_arguments_are_rejected() {
        assert!(matches!(
            fill_fraction(f64::NAN, 0.0, 100.0),
            Err(App::InvalidInput(_))
        ));
    }
}
