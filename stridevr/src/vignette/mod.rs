// Comfort Vignette ("blinkers")
//
// Narrows the player's field of view while they move artificially, which
// measurably reduces simulator sickness. This module only computes the
// parameters; the host applies them in its post-process.

pub mod curve;

pub use curve::{DEFAULT_COMFORT_CURVE, SpeedRadiusCurve};

use cgmath::{InnerSpace, Matrix4, Vector2, Vector3, vec2};
use tracing::warn;

use crate::config::VignetteConfig;

/// Distance along the movement direction to the projected focal point
const FOCAL_DISTANCE: f32 = 1000.0;
/// Below this speed the center stays glued to the middle of the view
const MIN_FOCAL_SPEED: f32 = 0.05;

/// Per-eye camera state the host pushes when it wants the vignette center to
/// follow the focal point of motion
#[derive(Clone, Copy, Debug)]
pub struct ViewContext {
    pub view_projection: Matrix4<f32>,
    pub eye_position: Vector3<f32>,
    pub forward: Vector3<f32>,
}

/// What the host binds into its vignette post-process each frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VignetteParams {
    /// Fraction of the viewport left clear, 1 meaning no darkening
    pub radius: f32,
    /// Center of the clear region as a viewport fraction, origin top-left
    pub center: Vector2<f32>,
}

impl Default for VignetteParams {
    fn default() -> Self {
        VignetteParams {
            radius: 1.0,
            center: vec2(0.5, 0.5),
        }
    }
}

/// Computes vignette parameters from the body's velocity each tick
pub struct ComfortVignette {
    enabled: bool,
    enhanced_center: bool,
    curve: Option<SpeedRadiusCurve>,
    missing_curve_warned: bool,
    params: VignetteParams,
}

impl ComfortVignette {
    pub fn new(config: &VignetteConfig) -> ComfortVignette {
        let curve = config
            .curve_keys
            .as_ref()
            .map(|keys| SpeedRadiusCurve::from_keys(keys.iter().copied()))
            .filter(|curve| !curve.is_empty());

        ComfortVignette {
            enabled: config.enabled,
            enhanced_center: config.enhanced_center,
            curve,
            missing_curve_warned: false,
            params: VignetteParams::default(),
        }
    }

    pub fn params(&self) -> VignetteParams {
        self.params
    }

    pub fn update(
        &mut self,
        velocity: Vector3<f32>,
        view: Option<&ViewContext>,
    ) -> VignetteParams {
        if !self.enabled {
            self.params = VignetteParams::default();
            return self.params;
        }

        let Some(curve) = &self.curve else {
            if !self.missing_curve_warned {
                warn!("comfort vignette is enabled but no speed curve is configured; skipping the effect");
                self.missing_curve_warned = true;
            }
            self.params = VignetteParams::default();
            return self.params;
        };

        let speed = velocity.magnitude();
        let radius = curve.radius_for_speed(speed).clamp(0.0, 1.0);
        let center = if self.enhanced_center {
            Self::focal_center(velocity, speed, view)
        } else {
            vec2(0.5, 0.5)
        };

        self.params = VignetteParams { radius, center };
        self.params
    }

    /// Project a focal point far along the direction of travel into viewport
    /// coordinates, so the clear region leads (or trails) the motion instead
    /// of sitting dead center
    fn focal_center(
        velocity: Vector3<f32>,
        speed: f32,
        view: Option<&ViewContext>,
    ) -> Vector2<f32> {
        let neutral = vec2(0.5, 0.5);
        if speed < MIN_FOCAL_SPEED {
            return neutral;
        }
        let Some(view) = view else {
            return neutral;
        };

        let direction = velocity / speed;
        // Moving away from where we look projects behind the camera; flip the
        // focal point in front so it mirrors across the view center
        let focal = if direction.dot(view.forward) >= 0.0 {
            view.eye_position + direction * FOCAL_DISTANCE
        } else {
            view.eye_position - direction * FOCAL_DISTANCE
        };

        let clip = view.view_projection * focal.extend(1.0);
        if clip.w.abs() <= f32::EPSILON {
            return neutral;
        }
        let u = 0.5 + 0.5 * clip.x / clip.w;
        let v = 0.5 - 0.5 * clip.y / clip.w;
        vec2(u.clamp(0.0, 1.0), v.clamp(0.0, 1.0))
    }
}
