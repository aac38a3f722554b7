/// Simulated luminosity in the sensor's 0-100 range for a point in a
/// day cycle, `day_fraction` in [0, 1) with 0 = midnight.
///
/// Daylight ramps in and out smoothly around sunrise and sunset; night
/// sits well under the default threshold so the demo LED actually cycles.
pub fn simulated_luminosity(day_fraction: f64) -> i64 {
    const MAX_DAYLIGHT: f64 = 95.0;
    const MOONLIGHT: f64 = 4.0;

    const SUNRISE_START: f64 = 0.23;
    const SUNRISE_END: f64 = 0.27;
    const SUNSET_START: f64 = 0.73;
    const SUNSET_END: f64 = 0.77;

    let lux = if day_fraction >= SUNRISE_START && day_fraction <= SUNSET_END {
        if day_fraction <= SUNRISE_END {
            let ramp = (day_fraction - SUNRISE_START) / (SUNRISE_END - SUNRISE_START);
            let radians = ramp * std::f64::consts::PI / 2.0;
            MOONLIGHT + radians.sin() * (MAX_DAYLIGHT - MOONLIGHT)
        } else if day_fraction >= SUNSET_START {
            let ramp = (day_fraction - SUNSET_START) / (SUNSET_END - SUNSET_START);
            let radians = ramp * std::f64::consts::PI / 2.0;
            MOONLIGHT + radians.cos() * (MAX_DAYLIGHT - MOONLIGHT)
        } else {
            MAX_DAYLIGHT
        }
    } else {
        MOONLIGHT
    };

    lux.round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_night_is_under_default_threshold() {
        assert!(simulated_luminosity(0.0) < 40);
        assert!(simulated_luminosity(0.1) < 40);
        assert!(simulated_luminosity(0.9) < 40);
    }

    #[test]
    fn test_midday_is_over_default_threshold() {
        assert!(simulated_luminosity(0.5) >= 40);
    }

    #[test]
    fn test_values_stay_in_sensor_range() {
        for step in 0..100 {
            let lux = simulated_luminosity(step as f64 / 100.0);
            assert!((0..=100).contains(&lux), "out of range at step {step}: {lux}");
        }
    }
}
