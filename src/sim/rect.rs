//! Rectangle geometry
//!
//! Oriented rectangles for the separating axis test, plus the axis-aligned
//! boxes used for push-out, ricochet normals and line of sight.

use glam::Vec2;

use crate::ecs::{Collider, EntityId, Transform, World};
use crate::rotate_vec;

/// Two axes closer to parallel than this are treated as one
const PARALLEL_EPSILON: f32 = 1e-6;

/// A rectangle rotated about its centre
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientedRect {
    pub center: Vec2,
    pub half_extents: Vec2,
    /// Radians, same convention as `Transform::rotation`
    pub rotation: f32,
}

impl OrientedRect {
    pub fn new(center: Vec2, half_extents: Vec2, rotation: f32) -> Self {
        Self {
            center,
            half_extents,
            rotation,
        }
    }

    /// Bounds of a transform/collider pair. The collider offset is not
    /// rotated and scale is ignored.
    pub fn from_parts(transform: &Transform, collider: &Collider) -> Self {
        Self::new(
            transform.position + collider.offset,
            collider.half_extents,
            transform.rotation,
        )
    }

    /// Same rectangle moved by `delta`
    pub fn translated(&self, delta: Vec2) -> Self {
        Self {
            center: self.center + delta,
            ..*self
        }
    }

    /// Corners in traversal order: top-left, top-right, bottom-right, bottom-left
    pub fn corners(&self) -> [Vec2; 4] {
        let h = self.half_extents;
        [
            Vec2::new(-h.x, -h.y),
            Vec2::new(h.x, -h.y),
            Vec2::new(h.x, h.y),
            Vec2::new(-h.x, h.y),
        ]
        .map(|local| rotate_vec(local, self.rotation) + self.center)
    }

    /// Normalised edge directions; degenerate edges yield zero vectors
    fn edge_axes(&self) -> [Vec2; 4] {
        let c = self.corners();
        [
            (c[1] - c[0]).normalize_or_zero(),
            (c[2] - c[1]).normalize_or_zero(),
            (c[3] - c[2]).normalize_or_zero(),
            (c[0] - c[3]).normalize_or_zero(),
        ]
    }

    /// Separating axis test. Touching rectangles count as intersecting.
    pub fn intersects(&self, other: &OrientedRect) -> bool {
        let mut axes: Vec<Vec2> = Vec::with_capacity(4);
        for axis in self.edge_axes().into_iter().chain(other.edge_axes()) {
            if axis == Vec2::ZERO {
                continue;
            }
            if axes.iter().any(|kept| kept.perp_dot(axis).abs() < PARALLEL_EPSILON) {
                continue;
            }
            axes.push(axis);
        }
        // Both rectangles collapsed to points
        if axes.is_empty() {
            axes.extend([Vec2::X, Vec2::Y]);
        }

        let a = self.corners();
        let b = other.corners();
        axes.iter().all(|&axis| {
            let (min1, max1) = project(&a, axis);
            let (min2, max2) = project(&b, axis);
            !(max1 < min2 || max2 < min1)
        })
    }

    /// First crossing of this rectangle's edges with `other`'s, walking
    /// this rectangle's edges in the outer loop. `None` when no edges cross
    /// (containment) or all candidate pairs are parallel.
    pub fn contact_point(&self, other: &OrientedRect) -> Option<Vec2> {
        let a = self.corners();
        let b = other.corners();
        for i in 0..4 {
            let (a1, a2) = (a[i], a[(i + 1) % 4]);
            for j in 0..4 {
                let (b1, b2) = (b[j], b[(j + 1) % 4]);
                if let Some(point) = segment_intersection(a1, a2, b1, b2) {
                    return Some(point);
                }
            }
        }
        None
    }

    /// Axis-aligned box enclosing the rotated corners
    pub fn aabb(&self) -> Aabb {
        let corners = self.corners();
        let mut min = corners[0];
        let mut max = corners[0];
        for &c in &corners[1..] {
            min = min.min(c);
            max = max.max(c);
        }
        Aabb { min, max }
    }
}

fn project(corners: &[Vec2; 4], axis: Vec2) -> (f32, f32) {
    let mut min = corners[0].dot(axis);
    let mut max = min;
    for c in &corners[1..] {
        let d = c.dot(axis);
        min = min.min(d);
        max = max.max(d);
    }
    (min, max)
}

/// Intersection point of segments `p1-p2` and `q1-q2`, endpoints included.
/// Parallel segments never intersect.
pub fn segment_intersection(p1: Vec2, p2: Vec2, q1: Vec2, q2: Vec2) -> Option<Vec2> {
    let r = p2 - p1;
    let s = q2 - q1;
    let denominator = r.perp_dot(s);
    if denominator.abs() <= f32::EPSILON {
        return None;
    }

    let qp = q1 - p1;
    let t = qp.perp_dot(s) / denominator;
    let u = qp.perp_dot(r) / denominator;
    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some(p1 + r * t)
    } else {
        None
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn half_size(&self) -> Vec2 {
        (self.max - self.min) * 0.5
    }

    /// Overlap depth along each world axis (negative when separated)
    pub fn overlap(&self, other: &Aabb) -> Vec2 {
        self.max.min(other.max) - self.min.max(other.min)
    }

    /// Whether the segment `from-to` touches this box (slab clipping)
    pub fn intersects_segment(&self, from: Vec2, to: Vec2) -> bool {
        let delta = to - from;
        let mut t_min = 0.0_f32;
        let mut t_max = 1.0_f32;

        for axis in 0..2 {
            let (origin, d, lo, hi) = (from[axis], delta[axis], self.min[axis], self.max[axis]);
            if d.abs() <= f32::EPSILON {
                if origin < lo || origin > hi {
                    return false;
                }
                continue;
            }
            let mut t0 = (lo - origin) / d;
            let mut t1 = (hi - origin) / d;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_min > t_max {
                return false;
            }
        }
        true
    }
}

/// Current bounds of an entity, or `None` if it lacks a transform or
/// collider. Never cached.
pub fn entity_bounds(world: &World, entity: EntityId) -> Option<OrientedRect> {
    let transform = world.try_get::<Transform>(entity)?;
    let collider = world.try_get::<Collider>(entity)?;
    Some(OrientedRect::from_parts(transform, collider))
}
