//! Paired-hand climbing.
//!
//! Each motion controller tracks what it could grab (from host overlap
//! notifications) and whether it is currently hauling the body. Both hands
//! live inside a [`HandRig`], which owns the pairing rule: at most one hand
//! climbs at a time, and a fresh grip steals the climb from the other hand.
//!
//! # Climb states
//! - `Idle`: nothing grabbable in reach
//! - `CanClimb`: at least one overlapped surface is climbable
//! - `Climbing`: squeezing started here; the grab point is pinned as the
//!   anchor and the body is dragged opposite the hand's motion each tick
//!
//! While a climb is active the body flies (gravity suspended). Releasing
//! drops it into falling and the regular ground probe takes over.

use cgmath::Vector3;
use tracing::{info, warn};

use crate::{
    body::{CharacterBody, MovementMode},
    environment::{SurfaceFlags, SurfaceId},
    events::{EventQueue, LocomotionEvent},
    input_context::Handedness,
};

/// One motion-tracked hand and its climb state
pub struct HandController {
    handedness: Handedness,
    /// Every volume the hand is currently inside, with its tags
    overlaps: Vec<(SurfaceId, SurfaceFlags)>,
    climb: ClimbState,
    was_squeeze_held: bool,
    world_position: Vector3<f32>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ClimbState {
    Idle,
    CanClimb,
    Climbing { anchor: Vector3<f32> },
}

impl HandController {
    fn new(handedness: Handedness) -> HandController {
        HandController {
            handedness,
            overlaps: Vec::new(),
            climb: ClimbState::Idle,
            was_squeeze_held: false,
            world_position: Vector3::new(0.0, 0.0, 0.0),
        }
    }

    pub fn handedness(&self) -> Handedness {
        self.handedness
    }

    pub fn climb_state(&self) -> ClimbState {
        self.climb
    }

    pub fn is_climbing(&self) -> bool {
        matches!(self.climb, ClimbState::Climbing { .. })
    }

    pub fn world_position(&self) -> Vector3<f32> {
        self.world_position
    }

    /// Register an overlap. Returns true when this overlap newly put a
    /// climbable surface in reach.
    fn begin_overlap(&mut self, surface: SurfaceId, flags: SurfaceFlags) -> bool {
        if !self.overlaps.iter().any(|(id, _)| *id == surface) {
            self.overlaps.push((surface, flags));
        }
        let was_reaching = self.climb != ClimbState::Idle;
        self.rescan_overlaps();
        !was_reaching && self.climb == ClimbState::CanClimb
    }

    fn end_overlap(&mut self, surface: SurfaceId) {
        self.overlaps.retain(|(id, _)| *id != surface);
        self.rescan_overlaps();
    }

    /// Recompute reach from the full overlap set. Correct under simultaneous
    /// overlaps: losing one climbable keeps `CanClimb` while another remains.
    /// Never disturbs an active climb.
    fn rescan_overlaps(&mut self) {
        if self.is_climbing() {
            return;
        }
        let climbable = self
            .overlaps
            .iter()
            .any(|(_, flags)| flags.contains(SurfaceFlags::CLIMBABLE));
        self.climb = if climbable {
            ClimbState::CanClimb
        } else {
            ClimbState::Idle
        };
    }

    /// Pin the current hand position as the climb anchor. Only possible with
    /// a climbable surface in reach.
    fn try_grip(&mut self) -> bool {
        if self.climb != ClimbState::CanClimb {
            return false;
        }
        self.climb = ClimbState::Climbing {
            anchor: self.world_position,
        };
        true
    }

    /// Let go. Returns true if this hand was the one climbing; falls back to
    /// whatever the current overlap set allows.
    fn release(&mut self) -> bool {
        if !self.is_climbing() {
            return false;
        }
        self.climb = ClimbState::Idle;
        self.rescan_overlaps();
        true
    }

    /// Body translation for this tick: the hand is pulled back toward its
    /// anchor, so the body moves opposite the hand's drift
    fn body_translation(&self) -> Option<Vector3<f32>> {
        match self.climb {
            ClimbState::Climbing { anchor } => Some(anchor - self.world_position),
            _ => None,
        }
    }
}

/// Both hands plus the pairing rule. Constructing the two controllers
/// together is what makes "at most one hand climbs" unrepresentable to break.
pub struct HandRig {
    left: HandController,
    right: HandController,
}

impl HandRig {
    pub fn new() -> HandRig {
        HandRig {
            left: HandController::new(Handedness::Left),
            right: HandController::new(Handedness::Right),
        }
    }

    pub fn hand(&self, handedness: Handedness) -> &HandController {
        match handedness {
            Handedness::Left => &self.left,
            Handedness::Right => &self.right,
        }
    }

    fn hand_mut(&mut self, handedness: Handedness) -> &mut HandController {
        match handedness {
            Handedness::Left => &mut self.left,
            Handedness::Right => &mut self.right,
        }
    }

    /// Refresh the world-space hand poses, once per tick before any edges
    /// are processed
    pub fn set_world_positions(&mut self, left: Vector3<f32>, right: Vector3<f32>) {
        self.left.world_position = left;
        self.right.world_position = right;
    }

    /// Relay a host overlap notification. Returns true when the surface
    /// newly put a climb in reach for that hand.
    pub fn begin_overlap(
        &mut self,
        handedness: Handedness,
        surface: SurfaceId,
        flags: SurfaceFlags,
    ) -> bool {
        self.hand_mut(handedness).begin_overlap(surface, flags)
    }

    pub fn end_overlap(&mut self, handedness: Handedness, surface: SurfaceId) {
        self.hand_mut(handedness).end_overlap(surface);
    }

    pub fn climbing_hand(&self) -> Option<Handedness> {
        if self.left.is_climbing() {
            Some(Handedness::Left)
        } else if self.right.is_climbing() {
            Some(Handedness::Right)
        } else {
            None
        }
    }

    /// Body translation from whichever hand is climbing this tick
    pub fn body_translation(&self) -> Option<Vector3<f32>> {
        self.left
            .body_translation()
            .or_else(|| self.right.body_translation())
    }

    /// Start a climb on `handedness`. A successful grip steals the climb
    /// from the other hand and suspends gravity.
    pub(crate) fn grip(
        &mut self,
        handedness: Handedness,
        body: &mut CharacterBody,
        events: &mut EventQueue,
    ) {
        if !self.hand_mut(handedness).try_grip() {
            return;
        }

        // Hand-over-hand: the previous climber quietly lets go. The body
        // stays flying because this hand now holds it.
        let other = self.hand_mut(handedness.opposite());
        let stolen = other.release();
        if stolen {
            events.push(LocomotionEvent::ClimbEnded {
                hand: handedness.opposite(),
            });
        }

        if !stolen && body.movement_mode == MovementMode::Flying {
            warn!("climb gripped while movement mode was already Flying");
        }

        if let Some((from, to)) = body.set_movement_mode(MovementMode::Flying) {
            info!("climb started with {:?} hand, {:?} -> {:?}", handedness, from, to);
            events.push(LocomotionEvent::MovementModeChanged { from, to });
        }
        events.push(LocomotionEvent::ClimbStarted { hand: handedness });
    }

    /// End a climb on `handedness`. Releasing a hand that was not climbing
    /// changes nothing.
    pub(crate) fn release(
        &mut self,
        handedness: Handedness,
        body: &mut CharacterBody,
        events: &mut EventQueue,
    ) {
        if !self.hand_mut(handedness).release() {
            return;
        }
        events.push(LocomotionEvent::ClimbEnded { hand: handedness });

        // Exclusivity means no other hand can still be climbing here
        if body.movement_mode != MovementMode::Flying {
            warn!(
                "climb released while movement mode was {:?}, expected Flying",
                body.movement_mode
            );
        }
        if let Some((from, to)) = body.set_movement_mode(MovementMode::Falling) {
            events.push(LocomotionEvent::MovementModeChanged { from, to });
        }
    }

    /// Edge-detect the squeeze input for one hand and route it into grip or
    /// release
    pub(crate) fn update_squeeze(
        &mut self,
        handedness: Handedness,
        squeeze_value: f32,
        threshold: f32,
        body: &mut CharacterBody,
        events: &mut EventQueue,
    ) {
        let held = squeeze_value >= threshold;
        let hand = self.hand_mut(handedness);
        let was_held = hand.was_squeeze_held;
        hand.was_squeeze_held = held;

        if held && !was_held {
            self.grip(handedness, body, events);
        } else if !held && was_held {
            self.release(handedness, body, events);
        }
    }
}

impl Default for HandRig {
    fn default() -> Self {
        Self::new()
    }
}
