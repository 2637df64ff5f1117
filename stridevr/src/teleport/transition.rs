use cgmath::Vector3;
use tracing::info;

/// Phase of the two-stage teleport fade
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TeleportPhase {
    Idle,
    /// Screen darkening; the destination was snapshotted at confirmation and
    /// is immune to later marker movement
    FadingOut {
        remaining: f32,
        destination: Vector3<f32>,
    },
    /// Relocation done, screen clearing
    FadingIn { remaining: f32 },
}

/// Drives the confirm -> fade out -> relocate -> fade in sequence from the
/// tick clock. At most one teleport can be in flight.
pub struct TeleportTransition {
    phase: TeleportPhase,
    fade_duration: f32,
}

impl TeleportTransition {
    pub fn new(fade_duration: f32) -> TeleportTransition {
        TeleportTransition {
            phase: TeleportPhase::Idle,
            fade_duration: fade_duration.max(0.0),
        }
    }

    pub fn phase(&self) -> TeleportPhase {
        self.phase
    }

    pub fn is_pending(&self) -> bool {
        !matches!(self.phase, TeleportPhase::Idle)
    }

    /// Begin a teleport toward `destination`. Refused while another teleport
    /// is in flight.
    pub fn begin(&mut self, destination: Vector3<f32>) -> bool {
        if self.is_pending() {
            return false;
        }
        info!("teleport transition started toward {:?}", destination);
        self.phase = TeleportPhase::FadingOut {
            remaining: self.fade_duration,
            destination,
        };
        true
    }

    /// Advance the fade. Returns the snapshotted destination exactly once,
    /// on the tick the fade-out completes and the body should relocate.
    pub fn advance(&mut self, delta: f32) -> Option<Vector3<f32>> {
        match self.phase {
            TeleportPhase::Idle => None,
            TeleportPhase::FadingOut {
                remaining,
                destination,
            } => {
                let remaining = remaining - delta;
                if remaining <= 0.0 {
                    self.phase = TeleportPhase::FadingIn {
                        remaining: self.fade_duration,
                    };
                    Some(destination)
                } else {
                    self.phase = TeleportPhase::FadingOut {
                        remaining,
                        destination,
                    };
                    None
                }
            }
            TeleportPhase::FadingIn { remaining } => {
                let remaining = remaining - delta;
                self.phase = if remaining <= 0.0 {
                    TeleportPhase::Idle
                } else {
                    TeleportPhase::FadingIn { remaining }
                };
                None
            }
        }
    }

    /// Screen fade level for the host to apply: 0 is clear, 1 is fully dark
    pub fn fade_alpha(&self) -> f32 {
        if self.fade_duration <= f32::EPSILON {
            return 0.0;
        }
        match self.phase {
            TeleportPhase::Idle => 0.0,
            TeleportPhase::FadingOut { remaining, .. } => {
                (1.0 - remaining / self.fade_duration).clamp(0.0, 1.0)
            }
            TeleportPhase::FadingIn { remaining } => (remaining / self.fade_duration).clamp(0.0, 1.0),
        }
    }
}
