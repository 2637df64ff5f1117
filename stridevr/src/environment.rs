use bitflags::bitflags;
use cgmath::{EuclideanSpace, InnerSpace, Point3, Vector3, vec3};
use collision::{Aabb, Aabb3, Continuous, Ray3};
use serde::{Deserialize, Serialize};

bitflags! {
    #[derive(Serialize, Deserialize)]
    pub struct SurfaceFlags: u32 {
        const WALKABLE = 1 << 0;
        const CLIMBABLE = 1 << 1;
        const BLOCKING = 1 << 2;
    }
}

/// Identifier for an environment volume, assigned by the host
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SurfaceId(pub u32);

/// Result of a swept collision query
#[derive(Clone, Copy, Debug)]
pub struct SurfaceHit {
    pub point: Vector3<f32>,
    pub surface: SurfaceId,
    pub flags: SurfaceFlags,
    /// Distance from the sweep start to the hit point
    pub distance: f32,
}

/// Collision query interface for the hosting environment.
/// Provides swept lookups without requiring the full physics world.
pub trait TraceQueryEngine {
    /// Sweep a sphere of the given radius from `from` to `to`, returning the
    /// nearest hit along the segment (if any)
    fn cast_segment(
        &self,
        from: Vector3<f32>,
        to: Vector3<f32>,
        radius: f32,
    ) -> Option<SurfaceHit>;
}

/// Navigation query interface for the hosting environment.
pub trait NavQueryEngine {
    /// Project a point onto the nearest navigable surface, searching within a
    /// half-size box `extent` around the point. `None` when nothing navigable
    /// is in range.
    fn project_point(&self, point: Vector3<f32>, extent: Vector3<f32>) -> Option<Vector3<f32>>;
}

struct TaggedVolume {
    id: SurfaceId,
    flags: SurfaceFlags,
    bounds: Aabb3<f32>,
}

/// Analytic environment built from tagged axis-aligned volumes and flat
/// navigable regions. Backs the headless runtime and the test suites; hosts
/// with real collision and navmesh data supply their own engine impls.
pub struct StaticEnvironment {
    volumes: Vec<TaggedVolume>,
    nav_regions: Vec<Aabb3<f32>>,
}

impl StaticEnvironment {
    pub fn new() -> StaticEnvironment {
        StaticEnvironment {
            volumes: Vec::new(),
            nav_regions: Vec::new(),
        }
    }

    pub fn add_volume(
        &mut self,
        id: SurfaceId,
        flags: SurfaceFlags,
        min: Vector3<f32>,
        max: Vector3<f32>,
    ) {
        self.volumes.push(TaggedVolume {
            id,
            flags,
            bounds: Aabb3::new(Point3::from_vec(min), Point3::from_vec(max)),
        });
    }

    /// Mark a flat region as navigable. Points project onto its top face.
    pub fn add_nav_region(&mut self, min: Vector3<f32>, max: Vector3<f32>) {
        self.nav_regions
            .push(Aabb3::new(Point3::from_vec(min), Point3::from_vec(max)));
    }

    /// All volumes a sphere at `center` currently touches. Hosts use this to
    /// drive begin/end overlap notifications for the hands.
    pub fn surfaces_overlapping(
        &self,
        center: Vector3<f32>,
        radius: f32,
    ) -> Vec<(SurfaceId, SurfaceFlags)> {
        self.volumes
            .iter()
            .filter(|volume| {
                let nearest = clamp_to_bounds(center, &volume.bounds);
                (nearest - center).magnitude2() <= radius * radius
            })
            .map(|volume| (volume.id, volume.flags))
            .collect()
    }
}

impl Default for StaticEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

impl TraceQueryEngine for StaticEnvironment {
    fn cast_segment(
        &self,
        from: Vector3<f32>,
        to: Vector3<f32>,
        radius: f32,
    ) -> Option<SurfaceHit> {
        let delta = to - from;
        let length = delta.magnitude();
        if length <= f32::EPSILON {
            return None;
        }
        let ray = Ray3::new(Point3::from_vec(from), delta / length);

        let mut nearest: Option<SurfaceHit> = None;
        for volume in &self.volumes {
            // Inflating the bounds by the radius approximates the swept sphere
            let inflated = volume.bounds.add_margin(vec3(radius, radius, radius));
            if let Some(point) = ray.intersection(&inflated) {
                let distance = (point.to_vec() - from).magnitude();
                if distance > length {
                    continue;
                }
                if nearest.as_ref().map_or(true, |hit| distance < hit.distance) {
                    nearest = Some(SurfaceHit {
                        point: point.to_vec(),
                        surface: volume.id,
                        flags: volume.flags,
                        distance,
                    });
                }
            }
        }
        nearest
    }
}

impl NavQueryEngine for StaticEnvironment {
    fn project_point(&self, point: Vector3<f32>, extent: Vector3<f32>) -> Option<Vector3<f32>> {
        let mut nearest: Option<(f32, Vector3<f32>)> = None;
        for region in &self.nav_regions {
            let projected = vec3(
                point.x.clamp(region.min.x, region.max.x),
                region.max.y,
                point.z.clamp(region.min.z, region.max.z),
            );
            let delta = projected - point;
            if delta.x.abs() > extent.x || delta.y.abs() > extent.y || delta.z.abs() > extent.z {
                continue;
            }
            let distance = delta.magnitude2();
            if nearest.map_or(true, |(best, _)| distance < best) {
                nearest = Some((distance, projected));
            }
        }
        nearest.map(|(_, projected)| projected)
    }
}

fn clamp_to_bounds(point: Vector3<f32>, bounds: &Aabb3<f32>) -> Vector3<f32> {
    vec3(
        point.x.clamp(bounds.min.x, bounds.max.x),
        point.y.clamp(bounds.min.y, bounds.max.y),
        point.z.clamp(bounds.min.z, bounds.max.z),
    )
}
