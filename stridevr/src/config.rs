use cgmath::{Vector3, vec3};
use serde::{Deserialize, Serialize};

use crate::input_context::Handedness;

/// Top-level tuning for the locomotion controller, fixed at construction
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocomotionConfig {
    /// Walking speed from a fully deflected input, in meters per second
    pub walk_speed: f32,
    /// Downward acceleration while falling, in meters per second squared
    pub gravity: f32,
    /// Half the capsule height; the body position is the capsule center
    pub capsule_half_height: f32,
    /// Hand that aims the teleport arc
    pub aim_hand: Handedness,
    /// Squeeze value at or above which a grip is considered held
    pub grip_threshold: f32,
    pub teleport: TeleportTuning,
    pub vignette: VignetteConfig,
}

impl Default for LocomotionConfig {
    fn default() -> Self {
        LocomotionConfig {
            walk_speed: 2.0,
            gravity: 9.8,
            capsule_half_height: 0.9,
            aim_hand: Handedness::Right,
            grip_threshold: 0.5,
            teleport: TeleportTuning::default(),
            vignette: VignetteConfig::default(),
        }
    }
}

/// Tuning for teleport targeting and the fade transition
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeleportTuning {
    pub enabled: bool,
    /// Launch speed of the simulated projectile, in meters per second
    pub launch_speed: f32,
    /// Gravity applied to the simulated projectile
    pub arc_gravity: f32,
    /// Interval between arc samples, in seconds of simulated flight
    pub sample_interval: f32,
    /// Simulated flight time budget; arcs that have not landed by now are
    /// treated as missing entirely
    pub max_sim_time: f32,
    /// Radius of the swept projectile
    pub projectile_radius: f32,
    /// Landings farther than this from the aim origin are invalid
    pub max_distance: f32,
    /// Half-size of the box searched when projecting a landing onto the
    /// navigable surface
    pub nav_search_extent: Vector3<f32>,
    /// Duration of each fade half (out, then in), in seconds
    pub fade_duration: f32,
    pub button_mapping: ConfirmButton,
    pub trigger_threshold: f32,
}

impl Default for TeleportTuning {
    fn default() -> Self {
        TeleportTuning {
            enabled: true,
            launch_speed: 10.0,
            arc_gravity: 9.8,
            sample_interval: 0.02,
            max_sim_time: 2.0,
            projectile_radius: 0.1,
            max_distance: 20.0,
            nav_search_extent: vec3(1.0, 1.0, 1.0),
            fade_duration: 0.3,
            button_mapping: ConfirmButton::Trigger,
            trigger_threshold: 0.5,
        }
    }
}

/// Button mapping options for confirming a teleport
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum ConfirmButton {
    Trigger,
    AButton,
    Squeeze,
}

/// Tuning for the comfort vignette
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VignetteConfig {
    pub enabled: bool,
    /// Steer the vignette center toward the focal point of motion instead of
    /// keeping it fixed at the viewport center
    pub enhanced_center: bool,
    /// (speed, radius) keyframes for the speed response. `None` disables the
    /// effect with a one-time warning.
    pub curve_keys: Option<Vec<(f32, f32)>>,
}

impl Default for VignetteConfig {
    fn default() -> Self {
        VignetteConfig {
            enabled: true,
            enhanced_center: true,
            curve_keys: Some(crate::vignette::DEFAULT_COMFORT_CURVE.keys().to_vec()),
        }
    }
}
