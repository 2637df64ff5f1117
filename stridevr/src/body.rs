use cgmath::{Quaternion, Vector3, Zero, vec3};

/// How the body responds to gravity and input
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MovementMode {
    /// Grounded, driven by movement input
    Walking,
    /// Airborne, gravity applies
    Falling,
    /// Gravity suspended; the body moves only through climbing
    Flying,
}

/// The player capsule. `position` is the capsule center.
#[derive(Clone, Debug)]
pub struct CharacterBody {
    pub position: Vector3<f32>,
    pub orientation: Quaternion<f32>,
    pub linear_velocity: Vector3<f32>,
    pub movement_mode: MovementMode,
    pub capsule_half_height: f32,
}

impl CharacterBody {
    pub fn new(feet_position: Vector3<f32>, capsule_half_height: f32) -> CharacterBody {
        CharacterBody {
            position: feet_position + vec3(0.0, capsule_half_height, 0.0),
            orientation: Quaternion {
                v: Vector3::zero(),
                s: 1.0,
            },
            linear_velocity: Vector3::zero(),
            movement_mode: MovementMode::Walking,
            capsule_half_height,
        }
    }

    pub fn feet_position(&self) -> Vector3<f32> {
        self.position - vec3(0.0, self.capsule_half_height, 0.0)
    }

    /// Change the movement mode. Returns `Some((old, new))` if the mode
    /// actually changed, `None` otherwise.
    pub fn set_movement_mode(
        &mut self,
        mode: MovementMode,
    ) -> Option<(MovementMode, MovementMode)> {
        if self.movement_mode == mode {
            return None;
        }
        let old = self.movement_mode;
        self.movement_mode = mode;
        Some((old, mode))
    }

    /// Place the feet at `destination` and discard any accumulated velocity
    pub fn relocate_feet(&mut self, destination: Vector3<f32>) {
        self.position = destination + vec3(0.0, self.capsule_half_height, 0.0);
        self.linear_velocity = Vector3::zero();
    }
}
