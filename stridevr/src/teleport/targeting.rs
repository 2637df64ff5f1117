use cgmath::{InnerSpace, Vector3, Zero};

use crate::{
    config::TeleportTuning,
    environment::{NavQueryEngine, TraceQueryEngine},
};

use super::ArcTrajectory;

/// Where the destination indicator should be drawn this tick
#[derive(Clone, Copy, Debug)]
pub struct DestinationMarker {
    pub position: Vector3<f32>,
    pub visible: bool,
}

impl Default for DestinationMarker {
    fn default() -> Self {
        DestinationMarker {
            position: Vector3::zero(),
            visible: false,
        }
    }
}

/// Result of one targeting pass: the simulated arc plus the validated
/// destination derived from it
#[derive(Clone, Debug)]
pub struct TeleportTarget {
    pub trajectory: ArcTrajectory,
    /// Impact point projected onto the navigable surface, when valid
    pub destination: Option<Vector3<f32>>,
    pub is_valid: bool,
}

impl TeleportTarget {
    /// Simulate the arc and validate its landing. A landing is valid only
    /// when it is within range and projects onto the navigable surface; a
    /// failed projection is a miss for this tick, never an error.
    pub fn resolve(
        start: Vector3<f32>,
        direction: Vector3<f32>,
        tuning: &TeleportTuning,
        trace: &dyn TraceQueryEngine,
        nav: &dyn NavQueryEngine,
    ) -> Self {
        let trajectory = ArcTrajectory::simulate(start, direction, tuning, trace);

        let mut destination = None;
        if let Some(hit) = &trajectory.impact {
            let in_range = (hit.point - start).magnitude() <= tuning.max_distance;
            if in_range {
                destination = nav.project_point(hit.point, tuning.nav_search_extent);
            }
        }

        TeleportTarget {
            trajectory,
            is_valid: destination.is_some(),
            destination,
        }
    }

    pub fn none() -> Self {
        TeleportTarget {
            trajectory: ArcTrajectory {
                points: Vec::new(),
                impact: None,
            },
            destination: None,
            is_valid: false,
        }
    }

    pub fn marker(&self) -> DestinationMarker {
        match self.destination {
            Some(position) if self.is_valid => DestinationMarker {
                position,
                visible: true,
            },
            _ => DestinationMarker::default(),
        }
    }
}
