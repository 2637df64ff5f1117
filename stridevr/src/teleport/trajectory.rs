use cgmath::{InnerSpace, Vector3};

use crate::{
    config::TeleportTuning,
    environment::{SurfaceHit, TraceQueryEngine},
};

/// Arc trajectory calculation for VR teleportation
#[derive(Clone, Debug)]
pub struct ArcTrajectory {
    /// Points along the arc, ending at the impact point. Empty when the arc
    /// never collided inside the simulation budget.
    pub points: Vec<Vector3<f32>>,
    /// First surface the arc hit (if any)
    pub impact: Option<SurfaceHit>,
}

impl ArcTrajectory {
    /// Simulate a ballistic arc from `start` along `direction`, sweeping each
    /// sampled segment against the environment. Sampling stops at the first
    /// impact or when the flight time budget runs out.
    pub fn simulate(
        start: Vector3<f32>,
        direction: Vector3<f32>,
        tuning: &TeleportTuning,
        trace: &dyn TraceQueryEngine,
    ) -> Self {
        if tuning.sample_interval <= 0.0 || direction.magnitude2() <= f32::EPSILON {
            return Self::empty();
        }

        let velocity = direction.normalize() * tuning.launch_speed;

        let mut points = vec![start];
        let mut previous = start;
        let mut time = tuning.sample_interval;
        while time <= tuning.max_sim_time {
            let next = Self::position_at_time(start, velocity, tuning.arc_gravity, time);
            if let Some(hit) = trace.cast_segment(previous, next, tuning.projectile_radius) {
                points.push(hit.point);
                return ArcTrajectory {
                    points,
                    impact: Some(hit),
                };
            }
            points.push(next);
            previous = next;
            time += tuning.sample_interval;
        }

        // No collision inside the budget: nothing to land on, nothing to draw
        Self::empty()
    }

    fn empty() -> Self {
        ArcTrajectory {
            points: Vec::new(),
            impact: None,
        }
    }

    /// Position at a specific flight time using the kinematic equation
    fn position_at_time(
        start: Vector3<f32>,
        initial_velocity: Vector3<f32>,
        gravity: f32,
        time: f32,
    ) -> Vector3<f32> {
        Vector3::new(
            start.x + initial_velocity.x * time,
            start.y + initial_velocity.y * time - 0.5 * gravity * time * time,
            start.z + initial_velocity.z * time,
        )
    }
}
