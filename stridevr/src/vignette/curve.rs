use once_cell::sync::Lazy;
use ordered_float::OrderedFloat;

/// Comfort response used when a config does not bring its own keyframes:
/// fully open at walking-pace onset, tightening toward sprint speeds.
pub static DEFAULT_COMFORT_CURVE: Lazy<SpeedRadiusCurve> =
    Lazy::new(|| SpeedRadiusCurve::from_keys([(0.0, 1.0), (0.25, 1.0), (3.0, 0.35)]));

/// Keyframed speed -> radius response, linearly interpolated and clamped
/// outside the key range
#[derive(Clone, Debug, PartialEq)]
pub struct SpeedRadiusCurve {
    /// (speed, radius) pairs sorted by speed
    keys: Vec<(f32, f32)>,
}

impl SpeedRadiusCurve {
    pub fn from_keys(keys: impl IntoIterator<Item = (f32, f32)>) -> SpeedRadiusCurve {
        let mut keys: Vec<(f32, f32)> = keys
            .into_iter()
            .filter(|(speed, radius)| speed.is_finite() && radius.is_finite())
            .collect();
        keys.sort_by_key(|(speed, _)| OrderedFloat(*speed));
        keys.dedup_by_key(|(speed, _)| OrderedFloat(*speed));
        SpeedRadiusCurve { keys }
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> &[(f32, f32)] {
        &self.keys
    }

    /// Radius for the given speed. An empty curve leaves the viewport fully
    /// open.
    pub fn radius_for_speed(&self, speed: f32) -> f32 {
        let Some(first) = self.keys.first() else {
            return 1.0;
        };
        if speed <= first.0 {
            return first.1;
        }
        let last = self.keys[self.keys.len() - 1];
        if speed >= last.0 {
            return last.1;
        }

        for pair in self.keys.windows(2) {
            let (lo_speed, lo_radius) = pair[0];
            let (hi_speed, hi_radius) = pair[1];
            if speed <= hi_speed {
                let span = hi_speed - lo_speed;
                if span <= f32::EPSILON {
                    return hi_radius;
                }
                let t = (speed - lo_speed) / span;
                return lo_radius + (hi_radius - lo_radius) * t;
            }
        }
        last.1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpolates_between_keys() {
        let curve = SpeedRadiusCurve::from_keys([(0.0, 1.0), (2.0, 0.5)]);
        assert!((curve.radius_for_speed(1.0) - 0.75).abs() < 1e-6);
        assert!((curve.radius_for_speed(0.5) - 0.875).abs() < 1e-6);
    }

    #[test]
    fn test_clamps_outside_key_range() {
        let curve = SpeedRadiusCurve::from_keys([(0.5, 0.9), (3.0, 0.3)]);
        assert_eq!(curve.radius_for_speed(0.0), 0.9);
        assert_eq!(curve.radius_for_speed(100.0), 0.3);
    }

    #[test]
    fn test_sorts_unordered_keys() {
        let curve = SpeedRadiusCurve::from_keys([(3.0, 0.3), (0.0, 1.0)]);
        assert_eq!(curve.radius_for_speed(0.0), 1.0);
        assert!((curve.radius_for_speed(1.5) - 0.65).abs() < 1e-6);
    }

    #[test]
    fn test_duplicate_speeds_collapse() {
        let curve = SpeedRadiusCurve::from_keys([(1.0, 0.8), (1.0, 0.2), (2.0, 0.1)]);
        let radius = curve.radius_for_speed(1.0);
        assert!(radius.is_finite());
        assert_eq!(curve.keys().len(), 2);
    }

    #[test]
    fn test_empty_curve_leaves_viewport_open() {
        let curve = SpeedRadiusCurve::from_keys([]);
        assert!(curve.is_empty());
        assert_eq!(curve.radius_for_speed(5.0), 1.0);
    }

    #[test]
    fn test_default_curve_tightens_with_speed() {
        let open = DEFAULT_COMFORT_CURVE.radius_for_speed(0.0);
        let tight = DEFAULT_COMFORT_CURVE.radius_for_speed(3.0);
        assert_eq!(open, 1.0);
        assert!(tight < open);
    }
}
