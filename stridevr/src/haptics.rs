use crate::input_context::Handedness;

/// Outbound haptic feedback, delivered by the host runtime
pub trait HapticSink {
    /// Fire a short pulse on the given controller. Intensity is in [0, 1].
    fn pulse(&mut self, hand: Handedness, intensity: f32);
}

/// Sink that drops every pulse, for hosts without haptic hardware
pub struct NullHaptics;

impl HapticSink for NullHaptics {
    fn pulse(&mut self, _hand: Handedness, _intensity: f32) {}
}
