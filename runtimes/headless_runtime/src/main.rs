// Headless Runtime - scripted locomotion scenario without a renderer
//
// Drives the locomotion controller through a fixed script (walk, teleport,
// approach a wall, climb it, let go) over an analytic environment, relaying
// overlap notifications the way a physics host would and logging every event.
// Useful for exercising the gameplay layer end to end without VR hardware.

use std::{collections::HashSet, fs, path::PathBuf};

use anyhow::{Context, ensure};
use cgmath::{Deg, Euler, Quaternion, Vector3, vec2, vec3};
use clap::Parser;
use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::info;

use stridevr::{
    Handedness, InputContext, LocomotionConfig, LocomotionController, LocomotionEvent,
    StaticEnvironment, SurfaceFlags, SurfaceId, TeleportPhase, Time,
};

const FLOOR: SurfaceId = SurfaceId(1);
const WALL: SurfaceId = SurfaceId(2);

/// Sphere radius around each hand used for the overlap relay
const HAND_REACH_RADIUS: f32 = 0.15;
/// Tracking jitter amplitude per axis, in meters
const JITTER: f32 = 0.003;

#[derive(Parser)]
#[command(name = "headless_runtime")]
#[command(about = "Scripted VR locomotion scenario without a renderer")]
struct Args {
    /// Locomotion tuning file (JSON); built-in defaults when absent
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for the simulated hand-tracking jitter
    #[arg(long, default_value = "7")]
    seed: u64,

    /// Simulation ticks per second
    #[arg(long, default_value = "90")]
    tick_rate: u32,
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<LocomotionConfig> {
    let Some(path) = path else {
        return Ok(LocomotionConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("unable to read config file {}", path.display()))?;
    let config = serde_json::from_str(&text)
        .with_context(|| format!("unable to parse config file {}", path.display()))?;
    Ok(config)
}

/// Floor with a non-navigable gap, plus a climbable wall across the far end
fn build_world() -> StaticEnvironment {
    let mut world = StaticEnvironment::new();
    world.add_volume(
        FLOOR,
        SurfaceFlags::WALKABLE | SurfaceFlags::BLOCKING,
        vec3(-30.0, -1.0, -30.0),
        vec3(30.0, 0.0, 30.0),
    );
    // A strip of floor at z in (-12.5, -11.5) stays off the nav surface, so
    // arcs landing there produce no destination
    world.add_nav_region(vec3(-30.0, -1.0, -11.5), vec3(30.0, 0.0, 30.0));
    world.add_nav_region(vec3(-30.0, -1.0, -30.0), vec3(30.0, 0.0, -12.5));
    world.add_volume(
        WALL,
        SurfaceFlags::CLIMBABLE | SurfaceFlags::BLOCKING,
        vec3(-30.0, 0.0, -9.6),
        vec3(30.0, 6.0, -9.0),
    );
    world
}

/// Mirrors the begin/end overlap notifications a physics host would send as
/// the hands move through tagged volumes
struct OverlapRelay {
    left: HashSet<SurfaceId>,
    right: HashSet<SurfaceId>,
}

impl OverlapRelay {
    fn new() -> OverlapRelay {
        OverlapRelay {
            left: HashSet::new(),
            right: HashSet::new(),
        }
    }

    fn relay(
        &mut self,
        hand: Handedness,
        position: Vector3<f32>,
        world: &StaticEnvironment,
        controller: &mut LocomotionController,
    ) {
        let touching = world.surfaces_overlapping(position, HAND_REACH_RADIUS);
        let tracked = match hand {
            Handedness::Left => &mut self.left,
            Handedness::Right => &mut self.right,
        };

        for (surface, flags) in &touching {
            if tracked.insert(*surface) {
                controller.begin_overlap(hand, *surface, *flags);
            }
        }
        let still: HashSet<SurfaceId> = touching.iter().map(|(id, _)| *id).collect();
        for surface in tracked.clone() {
            if !still.contains(&surface) {
                tracked.remove(&surface);
                controller.end_overlap(hand, surface);
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    /// Thumbstick walk toward the wall
    Walk,
    /// Aim the arc at the floor ahead and squeeze the trigger
    Aim,
    /// Hold still while the fade runs and the body relocates
    Fade,
    /// Walk the rest of the way to the wall
    Approach,
    /// Grip the wall and pull the hand down, hauling the body up
    Climb,
    /// Let go and fall back to the floor
    Release,
    Done,
}

/// The scripted pilot: produces one `InputContext` per tick and decides when
/// each phase of the scenario is over
struct Script {
    phase: Phase,
    phase_elapsed: f32,
    rng: StdRng,
}

impl Script {
    fn new(seed: u64) -> Script {
        Script {
            phase: Phase::Walk,
            phase_elapsed: 0.0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn input(&mut self) -> InputContext {
        let mut input = InputContext::default();
        input.head.position = vec3(0.0, 1.6, 0.0);
        input.left_hand.position = vec3(-0.25, 1.3, -0.3);
        input.right_hand.position = vec3(0.25, 1.3, -0.3);

        match self.phase {
            Phase::Walk | Phase::Approach => {
                input.left_hand.thumbstick = vec2(0.0, 1.0);
            }
            Phase::Aim => {
                input.right_hand.rotation =
                    Quaternion::from(Euler::new(Deg(-40.0), Deg(0.0), Deg(0.0)));
                if self.phase_elapsed > 0.8 {
                    input.right_hand.trigger_value = 1.0;
                }
            }
            Phase::Fade => {}
            Phase::Climb => {
                let progress = (self.phase_elapsed / 1.5).min(1.0);
                input.right_hand.position = vec3(0.25, 1.3 - 0.45 * progress, -0.55);
                input.right_hand.squeeze_value = 1.0;
            }
            Phase::Release | Phase::Done => {}
        }

        // Reaching hand pose while closing in on the wall
        if self.phase == Phase::Approach {
            input.right_hand.position = vec3(0.25, 1.3, -0.55);
        }

        input.left_hand.position += self.jitter();
        input.right_hand.position += self.jitter();
        input
    }

    fn jitter(&mut self) -> Vector3<f32> {
        vec3(
            self.rng.gen_range(-JITTER..JITTER),
            self.rng.gen_range(-JITTER..JITTER),
            self.rng.gen_range(-JITTER..JITTER),
        )
    }

    /// Advance the script clock and move to the next phase when the current
    /// one has done its job (or its time cap expires)
    fn advance(&mut self, controller: &LocomotionController, delta: f32) {
        self.phase_elapsed += delta;
        let feet = controller.body().feet_position();

        let next = match self.phase {
            Phase::Walk if self.phase_elapsed >= 2.0 => Some(Phase::Aim),
            Phase::Aim if self.phase_elapsed >= 1.0 => Some(Phase::Fade),
            Phase::Fade
                if self.phase_elapsed >= 0.2
                    && controller.teleport_phase() == TeleportPhase::Idle =>
            {
                Some(Phase::Approach)
            }
            Phase::Fade if self.phase_elapsed >= 3.0 => Some(Phase::Approach),
            Phase::Approach if feet.z <= -8.5 || self.phase_elapsed >= 6.0 => Some(Phase::Climb),
            Phase::Climb if self.phase_elapsed >= 1.5 => Some(Phase::Release),
            Phase::Release if self.phase_elapsed >= 2.0 => Some(Phase::Done),
            _ => None,
        };

        if let Some(next) = next {
            info!(
                "phase {:?} -> {:?} at feet {:?}",
                self.phase, next, feet
            );
            self.phase = next;
            self.phase_elapsed = 0.0;
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "headless_runtime=info,stridevr=info".into()),
        )
        .init();

    let args = Args::parse();
    ensure!(args.tick_rate > 0, "tick rate must be positive");

    let config = load_config(args.config.as_ref())?;
    let world = build_world();
    let mut controller = LocomotionController::new(config, vec3(0.0, 0.0, 0.0), None);
    let mut relay = OverlapRelay::new();
    let mut script = Script::new(args.seed);

    info!("starting scripted scenario with seed {}", args.seed);

    let delta = 1.0 / args.tick_rate as f32;
    let mut total = 0.0f32;
    let mut tick = 0u64;

    let mut teleport_completed = false;
    let mut climb_started = false;

    while script.phase != Phase::Done {
        let input = script.input();
        total += delta;
        tick += 1;

        let time = Time::from_seconds(delta, total);
        for event in controller.update(&time, &input, &world, &world) {
            info!("event: {:?}", event);
            match event {
                LocomotionEvent::TeleportCompleted { .. } => teleport_completed = true,
                LocomotionEvent::ClimbStarted { .. } => climb_started = true,
                _ => {}
            }
        }

        let origin = controller.tracking_origin();
        relay.relay(
            Handedness::Left,
            origin + input.left_hand.position,
            &world,
            &mut controller,
        );
        relay.relay(
            Handedness::Right,
            origin + input.right_hand.position,
            &world,
            &mut controller,
        );

        if tick % u64::from(args.tick_rate) == 0 {
            let body = controller.body();
            info!(
                "t={:.1}s feet={:?} mode={:?} vignette_radius={:.2}",
                total,
                body.feet_position(),
                body.movement_mode,
                controller.vignette_params().radius
            );
        }

        script.advance(&controller, delta);
    }

    ensure!(teleport_completed, "scenario never completed a teleport");
    ensure!(climb_started, "scenario never started a climb");
    info!(
        "scenario complete after {:.1}s, feet at {:?}",
        total,
        controller.body().feet_position()
    );
    Ok(())
}
