// Input context is an abstraction layer over the tracked devices that the runtime will provide.
// Positions and rotations are expressed in tracking space; the locomotion controller maps them
// into world space through the play origin.

use cgmath::{Quaternion, Vector2, Vector3, Zero};
use serde::{Deserialize, Serialize};

#[derive(Debug)]
pub struct InputContext {
    // Information about the tracked headset
    pub head: Head,

    // Information about each of the hands
    pub left_hand: Hand,
    pub right_hand: Hand,
}

impl InputContext {
    pub fn default() -> InputContext {
        InputContext {
            head: Head::default(),

            left_hand: Hand::default(),
            right_hand: Hand::default(),
        }
    }

    pub fn hand(&self, handedness: Handedness) -> &Hand {
        match handedness {
            Handedness::Left => &self.left_hand,
            Handedness::Right => &self.right_hand,
        }
    }
}

#[derive(Debug)]
pub struct Head {
    pub position: Vector3<f32>,
    pub rotation: Quaternion<f32>,
}

impl Head {
    pub fn default() -> Head {
        Head {
            position: Vector3::zero(),
            rotation: Quaternion {
                v: Vector3::zero(),
                s: 1.0,
            },
        }
    }
}

// Context for an individual hand (motion controller)
#[derive(Debug)]
pub struct Hand {
    pub position: Vector3<f32>,
    pub rotation: Quaternion<f32>,
    pub thumbstick: Vector2<f32>,
    pub trigger_value: f32,
    pub squeeze_value: f32,
    pub a_value: f32,
}

impl Hand {
    pub fn default() -> Hand {
        Hand {
            position: Vector3::zero(),
            rotation: Quaternion {
                v: Vector3::zero(),
                s: 1.0,
            },
            thumbstick: Vector2::zero(),
            trigger_value: 0.0,
            squeeze_value: 0.0,
            a_value: 0.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Handedness {
    Left,
    Right,
}

impl Handedness {
    pub fn opposite(&self) -> Handedness {
        match self {
            Handedness::Left => Handedness::Right,
            Handedness::Right => Handedness::Left,
        }
    }
}
