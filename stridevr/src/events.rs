use cgmath::Vector3;

use crate::{
    body::MovementMode,
    environment::SurfaceId,
    input_context::Handedness,
};

/// Discrete outcomes of an update, drained by the host each tick
#[derive(Clone, Debug, PartialEq)]
pub enum LocomotionEvent {
    TeleportStarted {
        destination: Vector3<f32>,
    },
    TeleportCompleted {
        destination: Vector3<f32>,
    },
    TeleportRejected {
        reason: TeleportRejection,
    },
    ClimbableDetected {
        hand: Handedness,
        surface: SurfaceId,
    },
    ClimbStarted {
        hand: Handedness,
    },
    ClimbEnded {
        hand: Handedness,
    },
    MovementModeChanged {
        from: MovementMode,
        to: MovementMode,
    },
}

/// Why a teleport confirmation was refused
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TeleportRejection {
    /// No validated destination at the time of confirmation
    InvalidDestination,
    /// A fade transition is already in flight
    TransitionPending,
    /// Teleport is disabled by configuration
    Disabled,
}

pub(crate) struct EventQueue {
    events: Vec<LocomotionEvent>,
}

impl EventQueue {
    pub fn new() -> EventQueue {
        EventQueue { events: Vec::new() }
    }

    pub fn push(&mut self, event: LocomotionEvent) {
        self.events.push(event);
    }

    pub fn drain(&mut self) -> Vec<LocomotionEvent> {
        std::mem::take(&mut self.events)
    }
}
