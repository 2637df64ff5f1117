use cgmath::{Vector3, Zero};

/// One renderable piece of the teleport path. Hosts instance a mesh per
/// visible segment and deform it along the cubic described by the endpoints
/// and tangents.
#[derive(Clone, Copy, Debug)]
pub struct PathSegment {
    pub start: Vector3<f32>,
    pub start_tangent: Vector3<f32>,
    pub end: Vector3<f32>,
    pub end_tangent: Vector3<f32>,
    pub visible: bool,
}

impl Default for PathSegment {
    fn default() -> Self {
        PathSegment {
            start: Vector3::zero(),
            start_tangent: Vector3::zero(),
            end: Vector3::zero(),
            end_tangent: Vector3::zero(),
            visible: false,
        }
    }
}

/// Smooth curve through the arc samples, backed by a segment pool that grows
/// to the longest path seen and never shrinks. Surplus segments from an
/// earlier longer path stay allocated and are hidden.
pub struct SplinePath {
    segments: Vec<PathSegment>,
}

impl SplinePath {
    pub fn new() -> SplinePath {
        SplinePath {
            segments: Vec::new(),
        }
    }

    /// Rebuild the spline from this tick's samples. Fewer than two samples
    /// hides every pooled segment.
    pub fn rebuild(&mut self, points: &[Vector3<f32>]) {
        let active = points.len().saturating_sub(1);

        if self.segments.len() < active {
            self.segments.resize(active, PathSegment::default());
        }

        for (i, segment) in self.segments.iter_mut().enumerate() {
            if i < active {
                segment.start = points[i];
                segment.start_tangent = tangent_at(points, i);
                segment.end = points[i + 1];
                segment.end_tangent = tangent_at(points, i + 1);
                segment.visible = true;
            } else {
                segment.visible = false;
            }
        }
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn visible_count(&self) -> usize {
        self.segments.iter().filter(|s| s.visible).count()
    }

    /// Total pool size, including hidden surplus
    pub fn pool_size(&self) -> usize {
        self.segments.len()
    }

    /// Evaluate the cubic Hermite curve of a segment at `t` in [0, 1]
    pub fn sample_segment(segment: &PathSegment, t: f32) -> Vector3<f32> {
        let t = t.clamp(0.0, 1.0);
        let t2 = t * t;
        let t3 = t2 * t;

        let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
        let h10 = t3 - 2.0 * t2 + t;
        let h01 = -2.0 * t3 + 3.0 * t2;
        let h11 = t3 - t2;

        segment.start * h00
            + segment.start_tangent * h10
            + segment.end * h01
            + segment.end_tangent * h11
    }
}

impl Default for SplinePath {
    fn default() -> Self {
        Self::new()
    }
}

/// Catmull-Rom tangent at sample `i`, clamped to one-sided differences at the
/// ends of the path
fn tangent_at(points: &[Vector3<f32>], i: usize) -> Vector3<f32> {
    let last = points.len() - 1;
    if i == 0 {
        points[1] - points[0]
    } else if i == last {
        points[last] - points[last - 1]
    } else {
        (points[i + 1] - points[i - 1]) * 0.5
    }
}
