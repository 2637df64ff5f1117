// Room-scale locomotion controller
//
// Owns the player capsule and everything that moves it: tracking-space
// reconciliation (the capsule follows the physical headset), smooth walking
// and falling, arc teleportation with a fade transition, climbing through the
// hand rig, and the comfort vignette parameters derived from all of it.
//
// The host calls `update` once per tick with the tracked input and its
// collision/navigation query engines, applies the returned events, and reads
// the presentation state (fade alpha, path segments, marker, vignette) back
// out through the getters.

use cgmath::{InnerSpace, Vector3, Zero, vec3};
use tracing::{debug, info, warn};

use crate::{
    body::{CharacterBody, MovementMode},
    config::{ConfirmButton, LocomotionConfig},
    environment::{NavQueryEngine, SurfaceFlags, SurfaceId, TraceQueryEngine},
    events::{EventQueue, LocomotionEvent, TeleportRejection},
    hand_controller::HandRig,
    haptics::HapticSink,
    input_context::{Handedness, InputContext},
    teleport::{
        DestinationMarker, PathSegment, SplinePath, TeleportPhase, TeleportTarget,
        TeleportTransition,
    },
    time::Time,
    vignette::{ComfortVignette, ViewContext, VignetteParams},
};

/// Extra reach below the feet that still counts as standing on ground,
/// letting the capsule follow small steps down without going airborne
const STEP_TOLERANCE: f32 = 0.35;
/// Haptic strength when a climbable surface first comes into reach
const DETECTION_PULSE: f32 = 0.6;

pub struct LocomotionController {
    config: LocomotionConfig,
    body: CharacterBody,
    /// Offset from the body position to the tracking-space origin
    play_origin_offset: Vector3<f32>,
    rig: HandRig,
    transition: TeleportTransition,
    target: TeleportTarget,
    marker: DestinationMarker,
    path: SplinePath,
    vignette: ComfortVignette,
    view: Option<ViewContext>,
    events: EventQueue,
    haptics: Option<Box<dyn HapticSink>>,
    haptics_missing_warned: bool,
    was_confirm_held: bool,
    input_forward: f32,
    input_right: f32,
}

impl LocomotionController {
    pub fn new(
        config: LocomotionConfig,
        spawn_feet: Vector3<f32>,
        haptics: Option<Box<dyn HapticSink>>,
    ) -> LocomotionController {
        let body = CharacterBody::new(spawn_feet, config.capsule_half_height);
        LocomotionController {
            // Tracking origin starts at the feet, so a tracked head at
            // standing height lines up with the capsule top
            play_origin_offset: vec3(0.0, -config.capsule_half_height, 0.0),
            transition: TeleportTransition::new(config.teleport.fade_duration),
            vignette: ComfortVignette::new(&config.vignette),
            body,
            rig: HandRig::new(),
            target: TeleportTarget::none(),
            marker: DestinationMarker::default(),
            path: SplinePath::new(),
            view: None,
            events: EventQueue::new(),
            haptics,
            haptics_missing_warned: false,
            was_confirm_held: false,
            input_forward: 0.0,
            input_right: 0.0,
            config,
        }
    }

    /// Advance the simulation by one tick. Returns every discrete event that
    /// fired since the previous drain, including those queued by the
    /// out-of-band entry points.
    pub fn update(
        &mut self,
        time: &Time,
        input: &InputContext,
        trace: &dyn TraceQueryEngine,
        nav: &dyn NavQueryEngine,
    ) -> Vec<LocomotionEvent> {
        let delta = time.elapsed.as_secs_f32();

        self.reconcile_tracking(input);

        let origin = self.tracking_origin();
        self.rig.set_world_positions(
            origin + input.left_hand.position,
            origin + input.right_hand.position,
        );

        self.rig.update_squeeze(
            Handedness::Left,
            input.left_hand.squeeze_value,
            self.config.grip_threshold,
            &mut self.body,
            &mut self.events,
        );
        self.rig.update_squeeze(
            Handedness::Right,
            input.right_hand.squeeze_value,
            self.config.grip_threshold,
            &mut self.body,
            &mut self.events,
        );

        // Haul the body opposite the climbing hand's drift. The play space
        // rides on the body, so the hand converges back onto its anchor.
        if let Some(translation) = self.rig.body_translation() {
            self.body.position += translation;
        }

        self.integrate_movement(input, delta, trace);
        self.advance_transition(delta);
        self.update_targeting(input, trace, nav);
        self.update_confirm_edge(input);
        self.vignette
            .update(self.body.linear_velocity, self.view.as_ref());

        self.events.drain()
    }

    /// World-space position of the tracking-space origin
    pub fn tracking_origin(&self) -> Vector3<f32> {
        self.body.position + self.play_origin_offset
    }

    pub fn body(&self) -> &CharacterBody {
        &self.body
    }

    pub fn hands(&self) -> &HandRig {
        &self.rig
    }

    pub fn fade_alpha(&self) -> f32 {
        self.transition.fade_alpha()
    }

    pub fn teleport_phase(&self) -> TeleportPhase {
        self.transition.phase()
    }

    pub fn destination_marker(&self) -> DestinationMarker {
        self.marker
    }

    pub fn path_segments(&self) -> &[PathSegment] {
        self.path.segments()
    }

    pub fn vignette_params(&self) -> VignetteParams {
        self.vignette.params()
    }

    /// Push the camera state used to steer the vignette center. Without it
    /// the center stays at the middle of the view.
    pub fn set_view_context(&mut self, view: ViewContext) {
        self.view = Some(view);
    }

    /// Feed the forward movement axis from a non-VR input path. The value
    /// clamps to [-1, 1], stacks with the thumbstick, and latches until
    /// changed.
    pub fn move_forward(&mut self, value: f32) {
        self.input_forward = value.clamp(-1.0, 1.0);
    }

    /// Feed the strafe movement axis. Same semantics as `move_forward`.
    pub fn move_right(&mut self, value: f32) {
        self.input_right = value.clamp(-1.0, 1.0);
    }

    /// Relay a host overlap notification for a hand. Fires the detection
    /// pulse and event when this newly puts a climb in reach.
    pub fn begin_overlap(&mut self, hand: Handedness, surface: SurfaceId, flags: SurfaceFlags) {
        if !self.rig.begin_overlap(hand, surface, flags) {
            return;
        }
        self.events
            .push(LocomotionEvent::ClimbableDetected { hand, surface });
        match self.haptics.as_mut() {
            Some(sink) => sink.pulse(hand, DETECTION_PULSE),
            None => {
                if !self.haptics_missing_warned {
                    warn!("no haptic sink wired up; climbable detection pulses will be skipped");
                    self.haptics_missing_warned = true;
                }
            }
        }
    }

    pub fn end_overlap(&mut self, hand: Handedness, surface: SurfaceId) {
        self.rig.end_overlap(hand, surface);
    }

    /// Grip entry point for hosts that bind their own input instead of
    /// relaying squeeze values. Only takes hold with a climbable surface in
    /// reach; the outcome events are returned by the next `update`.
    pub fn grip(&mut self, hand: Handedness) {
        self.rig.grip(hand, &mut self.body, &mut self.events);
    }

    /// Release entry point. A hand that is not climbing is left untouched.
    pub fn release(&mut self, hand: Handedness) {
        self.rig.release(hand, &mut self.body, &mut self.events);
    }

    /// Commit to the currently validated destination. Refused while a
    /// transition is in flight or without a valid target; the outcome event
    /// is queued and returned by the next `update`.
    pub fn confirm_teleport(&mut self) -> bool {
        if !self.config.teleport.enabled {
            self.events.push(LocomotionEvent::TeleportRejected {
                reason: TeleportRejection::Disabled,
            });
            return false;
        }
        if self.transition.is_pending() {
            debug!("teleport confirm refused, a transition is already in flight");
            self.events.push(LocomotionEvent::TeleportRejected {
                reason: TeleportRejection::TransitionPending,
            });
            return false;
        }
        match self.target.destination {
            Some(destination) if self.target.is_valid => {
                self.transition.begin(destination);
                self.events
                    .push(LocomotionEvent::TeleportStarted { destination });
                true
            }
            _ => {
                debug!("teleport confirm refused, no valid destination");
                self.events.push(LocomotionEvent::TeleportRejected {
                    reason: TeleportRejection::InvalidDestination,
                });
                false
            }
        }
    }

    /// Recenter the capsule under the tracked headset without moving the
    /// headset's world position: the capsule absorbs the horizontal offset
    /// and the play origin gives it back
    fn reconcile_tracking(&mut self, input: &InputContext) {
        let mut offset = self.play_origin_offset + input.head.position;
        offset.y = 0.0;
        self.body.position += offset;
        self.play_origin_offset -= offset;
    }

    fn integrate_movement(
        &mut self,
        input: &InputContext,
        delta: f32,
        trace: &dyn TraceQueryEngine,
    ) {
        if delta <= 0.0 {
            return;
        }
        match self.body.movement_mode {
            MovementMode::Walking => self.integrate_walking(input, delta, trace),
            MovementMode::Falling => self.integrate_falling(delta, trace),
            MovementMode::Flying => {
                // Climbing is the only mover; artificial velocity stays
                // parked so the vignette does not react to the haul
                self.body.linear_velocity = Vector3::zero();
            }
        }
    }

    fn movement_axes(&self, input: &InputContext) -> (f32, f32) {
        // Smooth locomotion lives on the off hand's stick; the aim hand
        // keeps its inputs for teleport
        let stick = input.hand(self.config.aim_hand.opposite()).thumbstick;
        let forward = (self.input_forward + stick.y).clamp(-1.0, 1.0);
        let right = (self.input_right + stick.x).clamp(-1.0, 1.0);
        (forward, right)
    }

    fn integrate_walking(
        &mut self,
        input: &InputContext,
        delta: f32,
        trace: &dyn TraceQueryEngine,
    ) {
        let (forward_input, right_input) = self.movement_axes(input);

        let mut velocity = Vector3::zero();
        if forward_input != 0.0 || right_input != 0.0 {
            let forward = flatten(input.head.rotation * vec3(0.0, 0.0, -1.0));
            let right = flatten(input.head.rotation * vec3(1.0, 0.0, 0.0));
            if let (Some(forward), Some(right)) = (forward, right) {
                let mut direction = forward * forward_input + right * right_input;
                if direction.magnitude2() > 1.0 {
                    direction = direction.normalize();
                }
                velocity = direction * self.config.walk_speed;
            }
        }

        let candidate = self.body.position + velocity * delta;

        // Ray straight down from the candidate center: ground within a step
        // of the feet keeps us walking, anything less is a ledge
        let probe_to = candidate
            - vec3(
                0.0,
                self.body.capsule_half_height + STEP_TOLERANCE,
                0.0,
            );
        match trace.cast_segment(candidate, probe_to, 0.0) {
            Some(ground) => {
                self.body.position = vec3(
                    candidate.x,
                    ground.point.y + self.body.capsule_half_height,
                    candidate.z,
                );
                self.body.linear_velocity = velocity;
            }
            None => {
                self.body.position = candidate;
                self.body.linear_velocity = velocity;
                if let Some((from, to)) = self.body.set_movement_mode(MovementMode::Falling) {
                    info!("walked off a ledge at {:?}", self.body.feet_position());
                    self.events
                        .push(LocomotionEvent::MovementModeChanged { from, to });
                }
            }
        }
    }

    fn integrate_falling(&mut self, delta: f32, trace: &dyn TraceQueryEngine) {
        self.body.linear_velocity.y -= self.config.gravity * delta;
        let candidate = self.body.position + self.body.linear_velocity * delta;

        // Sweep from the previous center down to the candidate feet so fast
        // falls cannot tunnel through the ground
        let probe_from = vec3(candidate.x, self.body.position.y, candidate.z);
        let probe_to = vec3(
            candidate.x,
            candidate.y - self.body.capsule_half_height,
            candidate.z,
        );
        match trace.cast_segment(probe_from, probe_to, 0.0) {
            Some(ground) => {
                self.body.position = vec3(
                    candidate.x,
                    ground.point.y + self.body.capsule_half_height,
                    candidate.z,
                );
                self.body.linear_velocity.y = 0.0;
                if let Some((from, to)) = self.body.set_movement_mode(MovementMode::Walking) {
                    self.events
                        .push(LocomotionEvent::MovementModeChanged { from, to });
                }
            }
            None => {
                self.body.position = candidate;
            }
        }
    }

    fn advance_transition(&mut self, delta: f32) {
        let Some(destination) = self.transition.advance(delta) else {
            return;
        };

        // Relocation invalidates any climb anchor, so an active climb ends
        // before the jump
        if let Some(hand) = self.rig.climbing_hand() {
            self.rig.release(hand, &mut self.body, &mut self.events);
        }

        self.body.relocate_feet(destination);
        if let Some((from, to)) = self.body.set_movement_mode(MovementMode::Walking) {
            self.events
                .push(LocomotionEvent::MovementModeChanged { from, to });
        }
        info!("teleport completed at {:?}", destination);
        self.events
            .push(LocomotionEvent::TeleportCompleted { destination });
    }

    fn update_targeting(
        &mut self,
        input: &InputContext,
        trace: &dyn TraceQueryEngine,
        nav: &dyn NavQueryEngine,
    ) {
        if !self.config.teleport.enabled {
            self.target = TeleportTarget::none();
            self.marker = DestinationMarker::default();
            self.path.rebuild(&[]);
            return;
        }

        let hand = input.hand(self.config.aim_hand);
        let start = self.tracking_origin() + hand.position;
        let direction = hand.rotation * vec3(0.0, 0.0, -1.0);

        self.target = TeleportTarget::resolve(start, direction, &self.config.teleport, trace, nav);
        self.marker = self.target.marker();
        self.path.rebuild(&self.target.trajectory.points);
    }

    fn update_confirm_edge(&mut self, input: &InputContext) {
        let hand = input.hand(self.config.aim_hand);
        let value = match self.config.teleport.button_mapping {
            ConfirmButton::Trigger => hand.trigger_value,
            ConfirmButton::AButton => hand.a_value,
            ConfirmButton::Squeeze => hand.squeeze_value,
        };
        let held = value >= self.config.teleport.trigger_threshold;
        let pressed = held && !self.was_confirm_held;
        self.was_confirm_held = held;
        if pressed {
            self.confirm_teleport();
        }
    }
}

/// Project a direction onto the horizontal plane. `None` when it degenerates
/// (looking straight up or down).
fn flatten(direction: Vector3<f32>) -> Option<Vector3<f32>> {
    let horizontal = vec3(direction.x, 0.0, direction.z);
    if horizontal.magnitude2() <= 1e-6 {
        return None;
    }
    Some(horizontal.normalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::StaticEnvironment;
    use crate::hand_controller::ClimbState;
    use cgmath::{Deg, Euler, Quaternion, vec2};
    use std::cell::RefCell;
    use std::rc::Rc;

    const FLOOR: SurfaceId = SurfaceId(1);
    const WALL: SurfaceId = SurfaceId(2);
    const PLATFORM: SurfaceId = SurfaceId(3);

    const TICK: f32 = 0.02;

    fn test_world() -> StaticEnvironment {
        let mut world = StaticEnvironment::new();
        world.add_volume(
            FLOOR,
            SurfaceFlags::WALKABLE | SurfaceFlags::BLOCKING,
            vec3(-20.0, -1.0, -20.0),
            vec3(20.0, 0.0, 20.0),
        );
        world.add_nav_region(vec3(-20.0, -1.0, -20.0), vec3(20.0, 0.0, 20.0));
        world.add_volume(
            WALL,
            SurfaceFlags::CLIMBABLE | SurfaceFlags::BLOCKING,
            vec3(-2.0, 0.0, 8.0),
            vec3(2.0, 4.0, 8.6),
        );
        world.add_volume(
            PLATFORM,
            SurfaceFlags::WALKABLE | SurfaceFlags::BLOCKING,
            vec3(5.0, 0.0, -5.0),
            vec3(9.0, 1.2, -1.0),
        );
        world
    }

    fn fast_config() -> LocomotionConfig {
        let mut config = LocomotionConfig::default();
        config.teleport.fade_duration = 0.1;
        config
    }

    fn controller_at(feet: Vector3<f32>) -> LocomotionController {
        LocomotionController::new(fast_config(), feet, None)
    }

    fn standing_input() -> InputContext {
        let mut input = InputContext::default();
        input.head.position = vec3(0.0, 1.6, 0.0);
        input
    }

    /// Right hand pitched down a little, landing the arc on the floor ahead
    fn aimed_input() -> InputContext {
        let mut input = standing_input();
        input.right_hand.position = vec3(0.2, 1.4, 0.2);
        input.right_hand.rotation = Quaternion::from(Euler::new(Deg(-10.0), Deg(0.0), Deg(0.0)));
        input
    }

    struct Sim {
        world: StaticEnvironment,
        total: f32,
    }

    impl Sim {
        fn new() -> Sim {
            Sim {
                world: test_world(),
                total: 0.0,
            }
        }

        fn tick(
            &mut self,
            controller: &mut LocomotionController,
            input: &InputContext,
        ) -> Vec<LocomotionEvent> {
            self.total += TICK;
            let time = Time::from_seconds(TICK, self.total);
            controller.update(&time, input, &self.world, &self.world)
        }
    }

    #[derive(Clone)]
    struct RecordingHaptics(Rc<RefCell<Vec<(Handedness, f32)>>>);

    impl HapticSink for RecordingHaptics {
        fn pulse(&mut self, hand: Handedness, intensity: f32) {
            self.0.borrow_mut().push((hand, intensity));
        }
    }

    #[test]
    fn test_reconciliation_recenters_capsule_under_head() {
        let mut sim = Sim::new();
        let mut controller = controller_at(vec3(0.0, 0.0, 0.0));

        let mut input = standing_input();
        input.head.position = vec3(0.5, 1.6, -0.3);
        let head_world_before = controller.tracking_origin() + input.head.position;

        sim.tick(&mut controller, &input);

        let head_world_after = controller.tracking_origin() + input.head.position;
        assert!((head_world_after - head_world_before).magnitude() < 1e-4);

        // The capsule slid under the headset
        let body = controller.body();
        assert!((body.position.x - 0.5).abs() < 1e-4);
        assert!((body.position.z - -0.3).abs() < 1e-4);
        assert!((body.position.y - 0.9).abs() < 1e-4);
    }

    #[test]
    fn test_thumbstick_walk_moves_along_head_yaw() {
        let mut sim = Sim::new();
        let mut controller = controller_at(vec3(0.0, 0.0, 0.0));

        let mut input = standing_input();
        input.left_hand.thumbstick = vec2(0.0, 1.0);

        for _ in 0..25 {
            sim.tick(&mut controller, &input);
        }

        let body = controller.body();
        // Head faces -Z, so forward walking goes -Z at walk speed
        assert!(body.position.z < -0.8);
        assert!((body.linear_velocity.magnitude() - 2.0).abs() < 1e-3);
        assert!(controller.vignette_params().radius < 1.0);

        // Letting go of the stick stops the body and reopens the view
        let input = standing_input();
        sim.tick(&mut controller, &input);
        assert!(controller.body().linear_velocity.magnitude() < 1e-5);
        assert_eq!(controller.vignette_params().radius, 1.0);
    }

    #[test]
    fn test_host_axes_clamp_and_move() {
        let mut sim = Sim::new();
        let mut controller = controller_at(vec3(0.0, 0.0, 0.0));
        let input = standing_input();

        controller.move_forward(5.0); // clamps to 1.0
        for _ in 0..10 {
            sim.tick(&mut controller, &input);
        }
        let z_fast = controller.body().position.z;

        let mut reference = controller_at(vec3(0.0, 0.0, 0.0));
        reference.move_forward(1.0);
        let mut sim2 = Sim::new();
        for _ in 0..10 {
            sim2.tick(&mut reference, &input);
        }

        assert!((z_fast - reference.body().position.z).abs() < 1e-5);

        controller.move_forward(0.0);
        sim.tick(&mut controller, &input);
        assert!(controller.body().linear_velocity.magnitude() < 1e-5);
    }

    #[test]
    fn test_walk_off_ledge_falls_then_lands() {
        let mut sim = Sim::new();
        // Spawn on the platform, walking toward its -Z edge
        let mut controller = controller_at(vec3(7.0, 1.2, -2.0));

        let mut input = standing_input();
        input.left_hand.thumbstick = vec2(0.0, 1.0);

        let mut saw_falling = false;
        let mut saw_landing = false;
        for _ in 0..120 {
            for event in sim.tick(&mut controller, &input) {
                match event {
                    LocomotionEvent::MovementModeChanged {
                        from: MovementMode::Walking,
                        to: MovementMode::Falling,
                    } => saw_falling = true,
                    LocomotionEvent::MovementModeChanged {
                        from: MovementMode::Falling,
                        to: MovementMode::Walking,
                    } => saw_landing = true,
                    _ => {}
                }
            }
        }

        assert!(saw_falling);
        assert!(saw_landing);
        // Down on the floor now
        assert!((controller.body().feet_position().y - 0.0).abs() < 1e-3);
    }

    #[test]
    fn test_teleport_cycle_relocates_to_confirmed_destination() {
        let mut sim = Sim::new();
        let mut controller = controller_at(vec3(0.0, 0.0, 0.0));
        let input = aimed_input();

        sim.tick(&mut controller, &input);
        let marker = controller.destination_marker();
        assert!(marker.visible);
        assert!(controller.path_segments().iter().any(|s| s.visible));

        assert!(controller.confirm_teleport());

        let mut completed_at = None;
        for _ in 0..20 {
            for event in sim.tick(&mut controller, &input) {
                if let LocomotionEvent::TeleportCompleted { destination } = event {
                    completed_at = Some(destination);
                }
            }
        }

        let destination = completed_at.expect("teleport should complete");
        assert!((destination - marker.position).magnitude() < 1e-4);
        assert!((controller.body().feet_position() - destination).magnitude() < 1e-3);
        assert_eq!(controller.body().linear_velocity, Vector3::zero());
        assert_eq!(controller.body().movement_mode, MovementMode::Walking);
        assert_eq!(controller.fade_alpha(), 0.0);
        assert_eq!(controller.teleport_phase(), TeleportPhase::Idle);
    }

    #[test]
    fn test_confirm_without_valid_destination_rejected() {
        // Geometry but nothing navigable
        let mut world = StaticEnvironment::new();
        world.add_volume(
            FLOOR,
            SurfaceFlags::BLOCKING,
            vec3(-20.0, -1.0, -20.0),
            vec3(20.0, 0.0, 20.0),
        );
        let mut controller = controller_at(vec3(0.0, 0.0, 0.0));
        let input = aimed_input();

        let time = Time::from_seconds(TICK, TICK);
        controller.update(&time, &input, &world, &world);
        assert!(!controller.destination_marker().visible);

        assert!(!controller.confirm_teleport());
        let events = controller.update(&Time::from_seconds(TICK, 2.0 * TICK), &input, &world, &world);
        assert!(events.contains(&LocomotionEvent::TeleportRejected {
            reason: TeleportRejection::InvalidDestination
        }));
    }

    #[test]
    fn test_confirm_while_pending_rejected() {
        let mut sim = Sim::new();
        let mut controller = controller_at(vec3(0.0, 0.0, 0.0));
        let input = aimed_input();

        sim.tick(&mut controller, &input);
        assert!(controller.confirm_teleport());
        assert!(!controller.confirm_teleport());

        let events = sim.tick(&mut controller, &input);
        assert!(events.contains(&LocomotionEvent::TeleportRejected {
            reason: TeleportRejection::TransitionPending
        }));
    }

    #[test]
    fn test_destination_snapshot_survives_aim_drift() {
        let mut sim = Sim::new();
        let mut controller = controller_at(vec3(0.0, 0.0, 0.0));

        sim.tick(&mut controller, &aimed_input());
        let confirmed = controller.destination_marker().position;
        assert!(controller.confirm_teleport());

        // Whip the aim somewhere else during the fade
        let mut drifted = aimed_input();
        drifted.right_hand.rotation = Quaternion::from(Euler::new(Deg(-35.0), Deg(40.0), Deg(0.0)));

        let mut completed_at = None;
        for _ in 0..20 {
            for event in sim.tick(&mut controller, &drifted) {
                if let LocomotionEvent::TeleportCompleted { destination } = event {
                    completed_at = Some(destination);
                }
            }
        }

        assert_eq!(completed_at, Some(confirmed));
    }

    #[test]
    fn test_teleport_disabled_rejects_and_hides_targeting() {
        let mut config = fast_config();
        config.teleport.enabled = false;
        let mut controller = LocomotionController::new(config, vec3(0.0, 0.0, 0.0), None);
        let mut sim = Sim::new();

        sim.tick(&mut controller, &aimed_input());
        assert!(!controller.destination_marker().visible);
        assert_eq!(controller.path_segments().iter().filter(|s| s.visible).count(), 0);

        assert!(!controller.confirm_teleport());
        let events = sim.tick(&mut controller, &aimed_input());
        assert!(events.contains(&LocomotionEvent::TeleportRejected {
            reason: TeleportRejection::Disabled
        }));
    }

    #[test]
    fn test_climb_hauls_body_against_hand_drift() {
        let mut sim = Sim::new();
        let mut controller = controller_at(vec3(0.0, 0.0, 0.0));

        controller.begin_overlap(
            Handedness::Right,
            WALL,
            SurfaceFlags::CLIMBABLE | SurfaceFlags::BLOCKING,
        );

        let mut input = standing_input();
        input.right_hand.position = vec3(0.3, 1.4, 0.5);
        input.right_hand.squeeze_value = 0.9;
        let events = sim.tick(&mut controller, &input);
        assert!(events.contains(&LocomotionEvent::ClimbableDetected {
            hand: Handedness::Right,
            surface: WALL
        }));
        assert!(events.contains(&LocomotionEvent::ClimbStarted {
            hand: Handedness::Right
        }));
        assert_eq!(controller.body().movement_mode, MovementMode::Flying);

        // Hand drifts up 0.3 while gripping: the body lowers by the same
        input.right_hand.position = vec3(0.3, 1.7, 0.5);
        sim.tick(&mut controller, &input);
        assert!((controller.body().position.y - 0.6).abs() < 1e-4);
        assert_eq!(controller.body().linear_velocity, Vector3::zero());
        assert_eq!(controller.vignette_params().radius, 1.0);

        // Holding still converges: the hand is back on its anchor
        sim.tick(&mut controller, &input);
        assert!((controller.body().position.y - 0.6).abs() < 1e-4);

        // Release drops into falling and the ground probe takes over
        input.right_hand.squeeze_value = 0.0;
        let events = sim.tick(&mut controller, &input);
        assert!(events.contains(&LocomotionEvent::ClimbEnded {
            hand: Handedness::Right
        }));

        let mut landed = false;
        for _ in 0..120 {
            for event in sim.tick(&mut controller, &input) {
                if matches!(
                    event,
                    LocomotionEvent::MovementModeChanged {
                        to: MovementMode::Walking,
                        ..
                    }
                ) {
                    landed = true;
                }
            }
        }
        assert!(landed);
        assert!((controller.body().feet_position().y - 0.0).abs() < 1e-3);
    }

    #[test]
    fn test_host_grip_and_release_entry_points() {
        let mut sim = Sim::new();
        let mut controller = controller_at(vec3(0.0, 0.0, 0.0));

        controller.begin_overlap(
            Handedness::Right,
            WALL,
            SurfaceFlags::CLIMBABLE | SurfaceFlags::BLOCKING,
        );

        // Squeeze stays at zero throughout: the host drives the climb
        // through the dedicated entry points
        let mut input = standing_input();
        input.right_hand.position = vec3(0.3, 1.4, 0.5);
        sim.tick(&mut controller, &input);

        controller.grip(Handedness::Right);
        let events = sim.tick(&mut controller, &input);
        assert!(events.contains(&LocomotionEvent::ClimbStarted {
            hand: Handedness::Right
        }));
        assert_eq!(controller.body().movement_mode, MovementMode::Flying);

        // The climb haul works the same as with squeeze-driven grips
        input.right_hand.position = vec3(0.3, 1.7, 0.5);
        sim.tick(&mut controller, &input);
        assert!((controller.body().position.y - 0.6).abs() < 1e-4);

        controller.release(Handedness::Right);
        let events = sim.tick(&mut controller, &input);
        assert!(events.contains(&LocomotionEvent::ClimbEnded {
            hand: Handedness::Right
        }));

        // Releasing again without a climb is a no-op
        controller.release(Handedness::Right);
        let events = sim.tick(&mut controller, &input);
        assert!(!events.iter().any(|event| matches!(
            event,
            LocomotionEvent::ClimbEnded { .. }
        )));
    }

    #[test]
    fn test_teleport_completion_releases_active_climb() {
        let mut sim = Sim::new();
        let mut controller = controller_at(vec3(0.0, 0.0, 0.0));
        controller.begin_overlap(
            Handedness::Left,
            WALL,
            SurfaceFlags::CLIMBABLE | SurfaceFlags::BLOCKING,
        );

        // Left hand climbs while the right aims and confirms
        let mut input = aimed_input();
        input.left_hand.position = vec3(-0.3, 1.4, 0.5);
        input.left_hand.squeeze_value = 0.9;

        sim.tick(&mut controller, &input);
        assert_eq!(
            controller.hands().climbing_hand(),
            Some(Handedness::Left)
        );
        assert!(controller.confirm_teleport());

        let mut climb_ended = false;
        let mut completed = false;
        for _ in 0..20 {
            for event in sim.tick(&mut controller, &input) {
                match event {
                    LocomotionEvent::ClimbEnded { hand } => {
                        climb_ended = hand == Handedness::Left;
                    }
                    LocomotionEvent::TeleportCompleted { .. } => completed = true,
                    _ => {}
                }
            }
            // The squeeze is still held; drop it so the climb does not
            // restart from the lingering overlap
            input.left_hand.squeeze_value = 0.0;
        }

        assert!(climb_ended);
        assert!(completed);
        assert_eq!(controller.body().movement_mode, MovementMode::Walking);
    }

    #[test]
    fn test_detection_pulse_fires_once_per_reach() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let haptics = RecordingHaptics(log.clone());
        let mut controller = LocomotionController::new(
            fast_config(),
            vec3(0.0, 0.0, 0.0),
            Some(Box::new(haptics)),
        );

        let climbable = SurfaceFlags::CLIMBABLE | SurfaceFlags::BLOCKING;
        controller.begin_overlap(Handedness::Right, WALL, climbable);
        // A second climbable while already in reach stays quiet
        controller.begin_overlap(Handedness::Right, SurfaceId(99), climbable);
        assert_eq!(log.borrow().len(), 1);
        assert_eq!(log.borrow()[0].0, Handedness::Right);

        // Leaving and coming back pulses again
        controller.end_overlap(Handedness::Right, WALL);
        controller.end_overlap(Handedness::Right, SurfaceId(99));
        controller.begin_overlap(Handedness::Right, WALL, climbable);
        assert_eq!(log.borrow().len(), 2);

        assert_eq!(
            controller.hands().hand(Handedness::Right).climb_state(),
            ClimbState::CanClimb
        );
    }

    #[test]
    fn test_events_drain_between_updates() {
        let mut sim = Sim::new();
        let mut controller = controller_at(vec3(0.0, 0.0, 0.0));

        controller.begin_overlap(
            Handedness::Right,
            WALL,
            SurfaceFlags::CLIMBABLE | SurfaceFlags::BLOCKING,
        );
        let input = standing_input();

        let first = sim.tick(&mut controller, &input);
        assert!(!first.is_empty());

        let second = sim.tick(&mut controller, &input);
        assert!(second.is_empty());
    }
}
