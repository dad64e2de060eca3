//! Spatial primitives for brushing and filtering.
//!
//! World space is the tracked-space frame the controllers report in. The
//! visualization has its own local frame ([`VisFrame`]); box brushes and
//! filter rectangles are axis-aligned in that local frame, so they are
//! stored as a [`LocalBox`] plus the frame that places them in the world.

use nalgebra::{Isometry3, Point2, Point3, Unit, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

/// Placement of the visualization in world space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisFrame {
    isometry: Isometry3<f32>,
}

impl VisFrame {
    /// Creates a frame from a translation and rotation.
    pub fn new(translation: Vector3<f32>, rotation: UnitQuaternion<f32>) -> Self {
        Self {
            isometry: Isometry3::from_parts(translation.into(), rotation),
        }
    }

    /// The identity frame: local and world coordinates coincide.
    pub fn identity() -> Self {
        Self {
            isometry: Isometry3::identity(),
        }
    }

    /// Converts a world-space point into visualization-local coordinates.
    pub fn to_local(&self, world: &Point3<f32>) -> Point3<f32> {
        self.isometry.inverse_transform_point(world)
    }

    /// Converts a visualization-local point into world space.
    pub fn to_world(&self, local: &Point3<f32>) -> Point3<f32> {
        self.isometry.transform_point(local)
    }

    /// Converts a world-space direction into the local frame.
    pub fn vector_to_local(&self, world: &Vector3<f32>) -> Vector3<f32> {
        self.isometry.inverse_transform_vector(world)
    }

    /// Rotation of the frame relative to world space.
    pub fn rotation(&self) -> UnitQuaternion<f32> {
        self.isometry.rotation
    }
}

impl Default for VisFrame {
    fn default() -> Self {
        Self::identity()
    }
}

/// A controller ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Point3<f32>,
    pub direction: Unit<Vector3<f32>>,
}

impl Ray {
    /// Creates a ray. Returns `None` for a zero-length direction.
    pub fn new(origin: Point3<f32>, direction: Vector3<f32>) -> Option<Self> {
        Unit::try_new(direction, f32::EPSILON).map(|direction| Self { origin, direction })
    }

    /// Point at parameter `t` along the ray.
    pub fn at(&self, t: f32) -> Point3<f32> {
        self.origin + self.direction.into_inner() * t
    }
}

/// Sphere in world space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sphere {
    pub center: Point3<f32>,
    pub radius: f32,
}

impl Sphere {
    pub fn new(center: Point3<f32>, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Inclusive containment test.
    pub fn contains(&self, point: &Point3<f32>) -> bool {
        nalgebra::distance_squared(&self.center, point) <= self.radius * self.radius
    }
}

/// Axis-aligned box in visualization-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocalBox {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl LocalBox {
    /// Builds a box spanning two corners in the local XY plane with the given
    /// half-depth along local Z, centred on z = 0.
    pub fn from_corners(a: &Point3<f32>, b: &Point3<f32>, half_depth: f32) -> Self {
        Self {
            min: Point3::new(a.x.min(b.x), a.y.min(b.y), -half_depth),
            max: Point3::new(a.x.max(b.x), a.y.max(b.y), half_depth),
        }
    }

    /// Builds a box from explicit local extents on X and Y.
    pub fn from_extents(left: f32, right: f32, bottom: f32, top: f32, half_depth: f32) -> Self {
        Self::from_corners(
            &Point3::new(left, bottom, 0.0),
            &Point3::new(right, top, 0.0),
            half_depth,
        )
    }

    /// Inclusive containment test for a local point.
    pub fn contains(&self, local: &Point3<f32>) -> bool {
        local.x >= self.min.x
            && local.x <= self.max.x
            && local.y >= self.min.y
            && local.y <= self.max.y
            && local.z >= self.min.z
            && local.z <= self.max.z
    }

    pub fn center(&self) -> Point3<f32> {
        nalgebra::center(&self.min, &self.max)
    }

    pub fn size(&self) -> Vector3<f32> {
        self.max - self.min
    }

    /// True when the box has no area in the local XY plane.
    pub fn is_degenerate(&self) -> bool {
        let size = self.size();
        size.x <= 0.0 || size.y <= 0.0
    }
}

/// A [`LocalBox`] placed in the world by a visualization frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrientedBox {
    pub frame: VisFrame,
    pub bounds: LocalBox,
}

impl OrientedBox {
    pub fn new(frame: VisFrame, bounds: LocalBox) -> Self {
        Self { frame, bounds }
    }

    pub fn contains(&self, world: &Point3<f32>) -> bool {
        self.bounds.contains(&self.frame.to_local(world))
    }

    /// World-space centre of the box.
    pub fn center(&self) -> Point3<f32> {
        self.frame.to_world(&self.bounds.center())
    }
}

/// Overlap volume used by spatial queries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum QueryVolume {
    Sphere(Sphere),
    Box(OrientedBox),
}

impl QueryVolume {
    pub fn contains(&self, world: &Point3<f32>) -> bool {
        match self {
            QueryVolume::Sphere(sphere) => sphere.contains(world),
            QueryVolume::Box(oriented) => oriented.contains(world),
        }
    }
}

/// What a ray hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SurfaceTag {
    /// The visualization backplate; brushing may start here.
    Brushable,
    /// Any other collider (shelves, tablet, walls).
    Solid,
}

/// Result of a ray cast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub point: Point3<f32>,
    pub distance: f32,
    pub tag: SurfaceTag,
}

/// Ray casting against the scene's colliders.
///
/// The physics layer is an external collaborator; this is the seam it plugs
/// into. [`SceneColliders`] is a small planar implementation good enough for
/// tests and headless sessions.
pub trait Raycaster {
    /// Nearest hit within `max_distance`, if any.
    fn raycast(&self, ray: &Ray, max_distance: f32) -> Option<RayHit>;
}

/// Rectangular planar collider lying in the local XY plane of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quad {
    pub frame: VisFrame,
    pub min: Point2<f32>,
    pub max: Point2<f32>,
    pub tag: SurfaceTag,
}

impl Quad {
    pub fn new(frame: VisFrame, min: Point2<f32>, max: Point2<f32>, tag: SurfaceTag) -> Self {
        Self {
            frame,
            min,
            max,
            tag,
        }
    }

    fn intersect(&self, ray: &Ray, max_distance: f32) -> Option<RayHit> {
        let origin = self.frame.to_local(&ray.origin);
        let direction = self.frame.vector_to_local(&ray.direction.into_inner());
        if direction.z.abs() <= f32::EPSILON {
            return None;
        }

        let t = -origin.z / direction.z;
        if !(0.0..=max_distance).contains(&t) {
            return None;
        }

        let local = origin + direction * t;
        let inside = local.x >= self.min.x
            && local.x <= self.max.x
            && local.y >= self.min.y
            && local.y <= self.max.y;
        inside.then(|| RayHit {
            point: ray.at(t),
            distance: t,
            tag: self.tag,
        })
    }
}

/// A flat list of planar colliders.
#[derive(Debug, Clone, Default)]
pub struct SceneColliders {
    colliders: Vec<Quad>,
}

impl SceneColliders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, quad: Quad) {
        self.colliders.push(quad);
    }

    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }
}

impl Raycaster for SceneColliders {
    fn raycast(&self, ray: &Ray, max_distance: f32) -> Option<RayHit> {
        self.colliders
            .iter()
            .filter_map(|quad| quad.intersect(ray, max_distance))
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn rotated_frame() -> VisFrame {
        VisFrame::new(
            Vector3::new(1.0, 0.0, 0.0),
            UnitQuaternion::from_axis_angle(&Vector3::y_axis(), FRAC_PI_2),
        )
    }

    #[test]
    fn test_frame_round_trip() {
        let frame = rotated_frame();
        let world = Point3::new(0.3, 0.7, -0.2);
        let back = frame.to_world(&frame.to_local(&world));
        assert!((back - world).norm() < 1e-5);
    }

    #[test]
    fn test_local_box_normalises_corners() {
        let b = LocalBox::from_corners(&Point3::new(0.4, 0.1, 0.0), &Point3::new(0.1, 0.3, 0.0), 0.05);
        assert_eq!(b.min, Point3::new(0.1, 0.1, -0.05));
        assert_eq!(b.max, Point3::new(0.4, 0.3, 0.05));
        assert!(b.contains(&Point3::new(0.1, 0.3, 0.0)));
        assert!(!b.contains(&Point3::new(0.1, 0.3, 0.06)));
    }

    #[test]
    fn test_oriented_box_uses_local_frame() {
        let frame = rotated_frame();
        let bounds = LocalBox::from_extents(0.0, 0.2, 0.0, 0.2, 0.01);
        let oriented = OrientedBox::new(frame, bounds);
        let inside = frame.to_world(&Point3::new(0.1, 0.1, 0.0));
        assert!(oriented.contains(&inside));
        // Same world coordinates without the rotation land outside.
        assert!(!oriented.contains(&Point3::new(1.1, 0.1, 0.0)));
    }

    #[test]
    fn test_degenerate_box() {
        assert!(LocalBox::from_extents(0.2, 0.2, 0.0, 0.5, 0.05).is_degenerate());
        assert!(!LocalBox::from_extents(0.1, 0.2, 0.0, 0.5, 0.05).is_degenerate());
    }

    #[test]
    fn test_ray_rejects_zero_direction() {
        assert!(Ray::new(Point3::origin(), Vector3::zeros()).is_none());
    }

    #[test]
    fn test_raycast_picks_nearest_quad() {
        let mut scene = SceneColliders::new();
        let near = VisFrame::new(Vector3::new(0.0, 0.0, 1.0), UnitQuaternion::identity());
        let far = VisFrame::new(Vector3::new(0.0, 0.0, 1.5), UnitQuaternion::identity());
        let extent = (Point2::new(-1.0, -1.0), Point2::new(1.0, 1.0));
        scene.add(Quad::new(far, extent.0, extent.1, SurfaceTag::Solid));
        scene.add(Quad::new(near, extent.0, extent.1, SurfaceTag::Brushable));

        let ray = Ray::new(Point3::new(0.2, 0.1, 0.0), Vector3::z()).unwrap();
        let hit = scene.raycast(&ray, 2.0).unwrap();
        assert_eq!(hit.tag, SurfaceTag::Brushable);
        assert!((hit.distance - 1.0).abs() < 1e-6);
        assert!((hit.point - Point3::new(0.2, 0.1, 1.0)).norm() < 1e-6);

        // Beyond reach
        assert!(scene.raycast(&ray, 0.5).is_none());
    }

    #[test]
    fn test_raycast_misses_outside_quad() {
        let mut scene = SceneColliders::new();
        scene.add(Quad::new(
            VisFrame::new(Vector3::new(0.0, 0.0, 1.0), UnitQuaternion::identity()),
            Point2::new(0.0, 0.0),
            Point2::new(0.5, 0.5),
            SurfaceTag::Brushable,
        ));
        let ray = Ray::new(Point3::new(0.8, 0.1, 0.0), Vector3::z()).unwrap();
        assert!(scene.raycast(&ray, 2.0).is_none());
    }
}
