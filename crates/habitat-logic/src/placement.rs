//! Pointer-driven placement of functional areas.
//!
//! A pointer press casts a ray through the camera and picks the nearest
//! area box it hits. While a drag is active, each pointer move intersects
//! a fresh ray with the horizontal ground plane and moves the dragged area
//! there, as long as the hit lies strictly inside the containment radius.
//! Moves outside the radius are dropped; the area keeps its last accepted
//! position.
//!
//! ```text
//!            pointer_down (hit)           pointer_up
//!   Idle ─────────────────────────▶ Dragging ─────────▶ Idle
//!     ▲                                │  ▲
//!     └──── pointer_down (miss) ───────┘  └─ pointer_down (hit): retarget
//! ```
//!
//! Pointer positions are normalized device coordinates: x and y in -1..=1,
//! y pointing up. Use [`pointer_to_ndc`] to convert container pixels.

use glam::{Mat4, Vec2, Vec3, Vec4Swizzles};
use serde::{Deserialize, Serialize};

use crate::areas::AreaRegistry;
use crate::mesh::Aabb;
use crate::scene::SceneGraph;

/// Drag acceptance radius around the world origin (scene units).
pub const DEFAULT_CONTAINMENT_RADIUS: f32 = 11.0;

const PARALLEL_EPSILON: f32 = 1e-8;

// ============================================================================
// RAYS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit length.
    pub direction: Vec3,
}

impl Ray {
    /// `None` when `direction` has no usable length.
    pub fn new(origin: Vec3, direction: Vec3) -> Option<Self> {
        let direction = direction.try_normalize()?;
        Some(Self { origin, direction })
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Point where the ray crosses `plane`, if it does so in front of the origin.
    pub fn intersect_plane(&self, plane: &Plane) -> Option<Vec3> {
        let denom = plane.normal.dot(self.direction);
        if denom.abs() < PARALLEL_EPSILON {
            return None;
        }
        let t = -(plane.normal.dot(self.origin) + plane.constant) / denom;
        (t >= 0.0).then(|| self.at(t))
    }

    /// Distance along the ray to the first point inside `aabb` (slab test).
    /// Zero when the origin is already inside.
    pub fn intersect_aabb(&self, aabb: &Aabb) -> Option<f32> {
        let mut t_near = f32::NEG_INFINITY;
        let mut t_far = f32::INFINITY;

        for axis in 0..3 {
            let origin = self.origin[axis];
            let dir = self.direction[axis];
            let (min, max) = (aabb.min[axis], aabb.max[axis]);
            if dir.abs() < PARALLEL_EPSILON {
                // Parallel to this slab: must already be between its planes.
                if origin < min || origin > max {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / dir;
            let (mut t0, mut t1) = ((min - origin) * inv, (max - origin) * inv);
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_near = t_near.max(t0);
            t_far = t_far.min(t1);
            if t_near > t_far {
                return None;
            }
        }

        if t_far < 0.0 {
            return None;
        }
        Some(t_near.max(0.0))
    }
}

/// Plane `normal · p + constant = 0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    pub normal: Vec3,
    pub constant: f32,
}

impl Plane {
    /// Horizontal plane through the origin.
    pub const GROUND: Plane = Plane {
        normal: Vec3::Y,
        constant: 0.0,
    };

    pub fn distance_to(&self, p: Vec3) -> f32 {
        self.normal.dot(p) + self.constant
    }
}

// ============================================================================
// CAMERA
// ============================================================================

/// Anything that can turn a pointer position into a world-space ray.
pub trait Projection {
    fn ray_from_ndc(&self, ndc: Vec2) -> Option<Ray>;
}

/// Right-handed perspective camera looking at a target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerspectiveCamera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y_degrees: f32,
    /// Width / height.
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self {
            position: Vec3::new(15.0, 10.0, 15.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y_degrees: 75.0,
            aspect: 1.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl PerspectiveCamera {
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.fov_y_degrees.to_radians(),
            self.aspect,
            self.near,
            self.far,
        )
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Update the aspect ratio after a viewport resize. Degenerate sizes are ignored.
    pub fn set_aspect(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.aspect = width / height;
        }
    }

    pub fn look_at(&mut self, position: Vec3, target: Vec3) {
        self.position = position;
        self.target = target;
    }
}

impl Projection for PerspectiveCamera {
    fn ray_from_ndc(&self, ndc: Vec2) -> Option<Ray> {
        let inverse = self.view_projection_matrix().inverse();
        if !inverse.is_finite() {
            return None;
        }
        let far = inverse * ndc.extend(1.0).extend(1.0);
        if far.w.abs() < PARALLEL_EPSILON {
            return None;
        }
        Ray::new(self.position, far.xyz() / far.w - self.position)
    }
}

/// Convert a container-local pixel position (origin top-left) to NDC.
pub fn pointer_to_ndc(pixel: Vec2, viewport: Vec2) -> Option<Vec2> {
    if viewport.x <= 0.0 || viewport.y <= 0.0 {
        return None;
    }
    Some(Vec2::new(
        pixel.x / viewport.x * 2.0 - 1.0,
        -(pixel.y / viewport.y) * 2.0 + 1.0,
    ))
}

// ============================================================================
// CONTROLLER
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        area_id: String,
    },
}

/// What a pointer move did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DragOutcome {
    /// No drag active.
    NotDragging,
    /// The area now sits at (`x`, `z`).
    Moved { area_id: String, x: f32, z: f32 },
    /// Ground hit too far from the origin; area not moved.
    OutsideRadius { area_id: String, distance: f32 },
    /// The pointer ray missed the ground (e.g. pointing at the sky).
    NoGroundHit,
    /// Accepted, but the registry had nothing to change.
    Unchanged,
}

impl DragOutcome {
    pub fn moved(&self) -> bool {
        matches!(self, Self::Moved { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementController {
    state: DragState,
    containment_radius: f32,
    ground: Plane,
}

impl Default for PlacementController {
    fn default() -> Self {
        Self::new(DEFAULT_CONTAINMENT_RADIUS)
    }
}

impl PlacementController {
    pub fn new(containment_radius: f32) -> Self {
        Self {
            state: DragState::Idle,
            containment_radius,
            ground: Plane::GROUND,
        }
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    pub fn dragged_area(&self) -> Option<&str> {
        match &self.state {
            DragState::Dragging { area_id } => Some(area_id),
            DragState::Idle => None,
        }
    }

    pub fn containment_radius(&self) -> f32 {
        self.containment_radius
    }

    /// Start dragging the nearest area under the pointer.
    ///
    /// Any drag already in progress ends first; a miss leaves the
    /// controller idle.
    pub fn pointer_down<P: Projection + ?Sized>(
        &mut self,
        ndc: Vec2,
        projection: &P,
        scene: &SceneGraph,
    ) -> Option<&str> {
        self.state = DragState::Idle;
        let ray = projection.ray_from_ndc(ndc)?;

        let nearest = scene
            .area_volumes()
            .filter_map(|(id, bounds)| ray.intersect_aabb(&bounds).map(|t| (id, t)))
            .min_by(|a, b| a.1.total_cmp(&b.1))?;

        log::debug!("drag started on {} at distance {:.2}", nearest.0, nearest.1);
        self.state = DragState::Dragging {
            area_id: nearest.0.to_string(),
        };
        self.dragged_area()
    }

    /// Move the dragged area to where the pointer meets the ground.
    pub fn pointer_move<P: Projection + ?Sized>(
        &mut self,
        ndc: Vec2,
        projection: &P,
        registry: &mut AreaRegistry,
    ) -> DragOutcome {
        let DragState::Dragging { area_id } = &self.state else {
            return DragOutcome::NotDragging;
        };
        let Some(hit) = projection
            .ray_from_ndc(ndc)
            .and_then(|ray| ray.intersect_plane(&self.ground))
        else {
            return DragOutcome::NoGroundHit;
        };

        let distance = hit.length();
        if !(distance < self.containment_radius) {
            log::trace!("drag of {} rejected at distance {:.2}", area_id, distance);
            return DragOutcome::OutsideRadius {
                area_id: area_id.clone(),
                distance,
            };
        }

        if registry.reposition(area_id, hit.x, hit.z) {
            DragOutcome::Moved {
                area_id: area_id.clone(),
                x: hit.x,
                z: hit.z,
            }
        } else {
            DragOutcome::Unchanged
        }
    }

    /// End any drag. Returns the area that was being dragged.
    pub fn pointer_up(&mut self) -> Option<String> {
        match std::mem::take(&mut self.state) {
            DragState::Dragging { area_id } => Some(area_id),
            DragState::Idle => None,
        }
    }
}
