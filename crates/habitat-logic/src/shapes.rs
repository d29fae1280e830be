//! Habitat shape generator.
//!
//! Maps a [`HabitatDescriptor`] (shape + height + width) to geometry. Four
//! shapes produce a single solid with its feature-edge outline; the wheel
//! produces a ring station of discrete modules joined by two ring tori.
//!
//! Generation is a pure function: same descriptor in, identical geometry
//! out. Changing shape means generating again from scratch.
//!
//! ```
//! use habitat_logic::shapes::{generate, HabitatGeometry, HabitatShape};
//!
//! let geometry = generate(HabitatShape::Wheel, 10.0, 5.0);
//! match geometry {
//!     HabitatGeometry::Wheel(wheel) => assert_eq!(wheel.modules.len(), 16),
//!     HabitatGeometry::Solid(_) => unreachable!(),
//! }
//! ```

use std::f32::consts::{FRAC_PI_2, TAU};
use std::fmt;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::mesh::{Aabb, Outline, Pose, TriMesh};

/// Height used when the supplied value is zero, negative or not finite.
pub const DEFAULT_HEIGHT: f32 = 10.0;
/// Width used when the supplied value is zero, negative or not finite.
pub const DEFAULT_WIDTH: f32 = 5.0;

pub const CYLINDER_SEGMENTS: u32 = 32;
pub const SPHERE_SEGMENTS: u32 = 32;
pub const TORUS_RADIAL_SEGMENTS: u32 = 16;
pub const TORUS_TUBULAR_SEGMENTS: u32 = 100;

pub const WHEEL_MODULE_COUNT: usize = 16;
/// Fraction of each module's arc slot that is filled (the rest is the gap).
pub const WHEEL_MODULE_FILL: f32 = 0.95;
pub const WHEEL_MODULE_DEPTH: f32 = 3.0;
pub const WHEEL_RING_TUBE: f32 = 0.15;
pub const WHEEL_RING_RADIAL_SEGMENTS: u32 = 8;
pub const WHEEL_RING_TUBULAR_SEGMENTS: u32 = 64;

// ============================================================================
// SHAPES
// ============================================================================

/// Primary habitat shape. Unrecognised names map to [`HabitatShape::Cylinder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum HabitatShape {
    #[default]
    Cylinder,
    Sphere,
    Torus,
    Cube,
    Wheel,
}

impl HabitatShape {
    pub fn all() -> &'static [HabitatShape] {
        &[
            Self::Cylinder,
            Self::Sphere,
            Self::Torus,
            Self::Cube,
            Self::Wheel,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Cylinder => "cylinder",
            Self::Sphere => "sphere",
            Self::Torus => "torus",
            Self::Cube => "cube",
            Self::Wheel => "wheel",
        }
    }

    /// Parse a shape name, falling back to the cylinder for anything unknown.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "sphere" => Self::Sphere,
            "torus" => Self::Torus,
            "cube" => Self::Cube,
            "wheel" => Self::Wheel,
            _ => Self::Cylinder,
        }
    }

    pub fn from_u8(val: u8) -> Self {
        match val {
            1 => Self::Sphere,
            2 => Self::Torus,
            3 => Self::Cube,
            4 => Self::Wheel,
            _ => Self::Cylinder,
        }
    }

    /// Next shape in display order, wrapping around.
    pub fn next(&self) -> Self {
        let all = Self::all();
        let i = all.iter().position(|s| s == self).unwrap_or(0);
        all[(i + 1) % all.len()]
    }
}

impl fmt::Display for HabitatShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<String> for HabitatShape {
    fn from(name: String) -> Self {
        Self::from_name(&name)
    }
}

impl From<HabitatShape> for String {
    fn from(shape: HabitatShape) -> Self {
        shape.name().to_string()
    }
}

/// The user-configured primary volume.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HabitatDescriptor {
    pub shape: HabitatShape,
    /// Height in meters.
    pub height: f32,
    /// Width in meters (also used as depth for the cube).
    pub width: f32,
}

impl Default for HabitatDescriptor {
    fn default() -> Self {
        Self {
            shape: HabitatShape::Cylinder,
            height: DEFAULT_HEIGHT,
            width: DEFAULT_WIDTH,
        }
    }
}

impl HabitatDescriptor {
    pub fn new(shape: HabitatShape, height: f32, width: f32) -> Self {
        Self {
            shape,
            height,
            width,
        }
    }

    pub fn effective_height(&self) -> f32 {
        sanitize(self.height, DEFAULT_HEIGHT)
    }

    pub fn effective_width(&self) -> f32 {
        sanitize(self.width, DEFAULT_WIDTH)
    }

    /// Copy with both effective dimensions multiplied by `factor`.
    pub fn scaled(&self, factor: f32) -> Self {
        let factor = sanitize(factor, 1.0);
        Self {
            shape: self.shape,
            height: self.effective_height() * factor,
            width: self.effective_width() * factor,
        }
    }

    pub fn generate(&self) -> HabitatGeometry {
        generate(self.shape, self.height, self.width)
    }
}

fn sanitize(value: f32, fallback: f32) -> f32 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        fallback
    }
}

// ============================================================================
// GEOMETRY
// ============================================================================

/// A single closed solid with its wireframe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeSolid {
    pub mesh: TriMesh,
    pub outline: Outline,
}

/// One box module of a wheel station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WheelModule {
    pub index: usize,
    pub pose: Pose,
    pub mesh: TriMesh,
    pub outline: Outline,
}

/// One of the two connecting rings of a wheel station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WheelRing {
    pub pose: Pose,
    pub mesh: TriMesh,
}

/// Compound ring station: modules evenly spaced on a circle plus two rings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WheelAssembly {
    pub radius: f32,
    pub module_width: f32,
    pub module_height: f32,
    pub module_depth: f32,
    pub modules: Vec<WheelModule>,
    pub rings: Vec<WheelRing>,
}

/// Output of [`generate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HabitatGeometry {
    Solid(ShapeSolid),
    Wheel(WheelAssembly),
}

impl HabitatGeometry {
    /// World-space bounds of every part.
    pub fn bounds(&self) -> Aabb {
        match self {
            Self::Solid(solid) => solid.mesh.bounds(),
            Self::Wheel(wheel) => {
                let modules = wheel.modules.iter().map(|m| m.mesh.bounds_with(&m.pose));
                let rings = wheel.rings.iter().map(|r| r.mesh.bounds_with(&r.pose));
                modules
                    .chain(rings)
                    .reduce(|a, b| a.union(&b))
                    .unwrap_or(Aabb {
                        min: Vec3::ZERO,
                        max: Vec3::ZERO,
                    })
            }
        }
    }

    /// Number of separately placed parts (1 for a solid).
    pub fn part_count(&self) -> usize {
        match self {
            Self::Solid(_) => 1,
            Self::Wheel(wheel) => wheel.modules.len() + wheel.rings.len(),
        }
    }

    pub fn is_compound(&self) -> bool {
        matches!(self, Self::Wheel(_))
    }
}

/// Generate habitat geometry for `shape` at the given dimensions.
///
/// Non-positive or non-finite dimensions fall back to
/// [`DEFAULT_HEIGHT`]/[`DEFAULT_WIDTH`].
pub fn generate(shape: HabitatShape, height: f32, width: f32) -> HabitatGeometry {
    let height = sanitize(height, DEFAULT_HEIGHT);
    let width = sanitize(width, DEFAULT_WIDTH);

    let mesh = match shape {
        HabitatShape::Cylinder => TriMesh::cylinder(width / 2.0, height, CYLINDER_SEGMENTS),
        HabitatShape::Sphere => {
            TriMesh::uv_sphere(width.max(height) / 2.0, SPHERE_SEGMENTS, SPHERE_SEGMENTS)
        }
        HabitatShape::Torus => TriMesh::torus(
            width / 2.0,
            width / 4.0,
            TORUS_RADIAL_SEGMENTS,
            TORUS_TUBULAR_SEGMENTS,
        ),
        HabitatShape::Cube => TriMesh::cuboid(width, height, width),
        HabitatShape::Wheel => return HabitatGeometry::Wheel(generate_wheel(height, width)),
    };
    let outline = mesh.outline();
    HabitatGeometry::Solid(ShapeSolid { mesh, outline })
}

fn generate_wheel(height: f32, width: f32) -> WheelAssembly {
    let radius = width * 2.0;
    let slot = TAU * radius / WHEEL_MODULE_COUNT as f32;
    let module_width = slot * WHEEL_MODULE_FILL;
    let module_height = height / 2.0;

    let module_mesh = TriMesh::cuboid(module_width, module_height, WHEEL_MODULE_DEPTH);
    let module_outline = module_mesh.outline();

    let modules = (0..WHEEL_MODULE_COUNT)
        .map(|index| {
            let angle = index as f32 / WHEEL_MODULE_COUNT as f32 * TAU;
            let translation = Vec3::new(angle.cos() * radius, 0.0, angle.sin() * radius);
            // Local X (the module's long side) maps onto the circle tangent.
            let rotation = Quat::from_rotation_y(-(angle + FRAC_PI_2));
            WheelModule {
                index,
                pose: Pose::new(translation, rotation),
                mesh: module_mesh.clone(),
                outline: module_outline.clone(),
            }
        })
        .collect();

    let ring_mesh = TriMesh::torus(
        radius,
        WHEEL_RING_TUBE,
        WHEEL_RING_RADIAL_SEGMENTS,
        WHEEL_RING_TUBULAR_SEGMENTS,
    );
    // Tori are generated around Z; lay them flat so they follow the modules.
    let flat = Quat::from_rotation_x(FRAC_PI_2);
    let rings = [module_height / 2.0, -module_height / 2.0]
        .into_iter()
        .map(|y| WheelRing {
            pose: Pose::new(Vec3::new(0.0, y, 0.0), flat),
            mesh: ring_mesh.clone(),
        })
        .collect();

    WheelAssembly {
        radius,
        module_width,
        module_height,
        module_depth: WHEEL_MODULE_DEPTH,
        modules,
        rings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size_of(shape: HabitatShape, h: f32, w: f32) -> Vec3 {
        generate(shape, h, w).bounds().size()
    }

    #[test]
    fn unknown_names_fall_back_to_cylinder() {
        assert_eq!(HabitatShape::from_name("dodecahedron"), HabitatShape::Cylinder);
        assert_eq!(HabitatShape::from_name(" Wheel "), HabitatShape::Wheel);
        assert_eq!(HabitatShape::from_u8(99), HabitatShape::Cylinder);
    }

    #[test]
    fn shape_serde_uses_names_and_tolerates_unknown() {
        let json = serde_json::to_string(&HabitatShape::Torus).unwrap();
        assert_eq!(json, "\"torus\"");
        let parsed: HabitatShape = serde_json::from_str("\"pyramid\"").unwrap();
        assert_eq!(parsed, HabitatShape::Cylinder);
    }

    #[test]
    fn next_cycles_through_every_shape() {
        let mut shape = HabitatShape::Cylinder;
        for _ in 0..HabitatShape::all().len() {
            shape = shape.next();
        }
        assert_eq!(shape, HabitatShape::Cylinder);
    }

    #[test]
    fn cylinder_matches_dimensions() {
        let s = size_of(HabitatShape::Cylinder, 10.0, 5.0);
        assert!((s.x - 5.0).abs() < 1e-3);
        assert!((s.y - 10.0).abs() < 1e-3);
    }

    #[test]
    fn sphere_uses_larger_dimension() {
        let s = size_of(HabitatShape::Sphere, 10.0, 4.0);
        assert!((s.y - 10.0).abs() < 1e-3);
    }

    #[test]
    fn torus_follows_width_only() {
        let s = size_of(HabitatShape::Torus, 3.0, 8.0);
        // major 4, minor 2 → outer diameter 12, tube thickness 4
        assert!((s.x - 12.0).abs() < 1e-3);
        assert!((s.z - 4.0).abs() < 1e-3);
        assert_eq!(s, size_of(HabitatShape::Torus, 50.0, 8.0));
    }

    #[test]
    fn cube_reuses_width_for_depth() {
        let s = size_of(HabitatShape::Cube, 7.0, 3.0);
        assert!((s.x - 3.0).abs() < 1e-4);
        assert!((s.y - 7.0).abs() < 1e-4);
        assert!((s.z - 3.0).abs() < 1e-4);
    }

    #[test]
    fn solids_carry_outlines() {
        for &shape in &HabitatShape::all()[..4] {
            match generate(shape, 10.0, 5.0) {
                HabitatGeometry::Solid(solid) => assert!(!solid.outline.is_empty()),
                HabitatGeometry::Wheel(_) => panic!("{shape} should be a single solid"),
            }
        }
    }

    #[test]
    fn wheel_structure() {
        let HabitatGeometry::Wheel(wheel) = generate(HabitatShape::Wheel, 12.0, 4.0) else {
            panic!("wheel expected");
        };
        assert_eq!(wheel.modules.len(), WHEEL_MODULE_COUNT);
        assert_eq!(wheel.rings.len(), 2);
        assert!((wheel.radius - 8.0).abs() < 1e-5);
        assert!((wheel.module_height - 6.0).abs() < 1e-5);
        let expected_width = TAU * 8.0 / 16.0 * 0.95;
        assert!((wheel.module_width - expected_width).abs() < 1e-4);
        assert!(wheel.modules.iter().all(|m| !m.outline.is_empty()));
        assert!((wheel.rings[0].pose.translation.y - 3.0).abs() < 1e-5);
        assert!((wheel.rings[1].pose.translation.y + 3.0).abs() < 1e-5);
    }

    #[test]
    fn wheel_modules_face_the_tangent() {
        let HabitatGeometry::Wheel(wheel) = generate(HabitatShape::Wheel, 10.0, 5.0) else {
            panic!("wheel expected");
        };
        for module in &wheel.modules {
            let radial = module.pose.translation.normalize();
            let long_axis = module.pose.rotation * Vec3::X;
            assert!(
                long_axis.dot(radial).abs() < 1e-4,
                "module {} not tangent",
                module.index
            );
            assert!((module.pose.translation.length() - wheel.radius).abs() < 1e-3);
        }
    }

    #[test]
    fn wheel_rings_lie_flat() {
        let HabitatGeometry::Wheel(wheel) = generate(HabitatShape::Wheel, 10.0, 5.0) else {
            panic!("wheel expected");
        };
        let ring = &wheel.rings[0];
        let b = ring.mesh.bounds_with(&ring.pose);
        assert!(b.size().y < 1.0);
        assert!((b.size().x - 2.0 * (wheel.radius + WHEEL_RING_TUBE)).abs() < 1e-3);
    }

    #[test]
    fn invalid_dimensions_use_defaults() {
        let fallback = generate(HabitatShape::Cube, 0.0, f32::NAN);
        let reference = generate(HabitatShape::Cube, DEFAULT_HEIGHT, DEFAULT_WIDTH);
        assert_eq!(fallback, reference);
        assert_eq!(
            generate(HabitatShape::Cylinder, -3.0, 5.0),
            generate(HabitatShape::Cylinder, DEFAULT_HEIGHT, 5.0)
        );
    }

    #[test]
    fn generation_is_deterministic() {
        for &shape in HabitatShape::all() {
            assert_eq!(generate(shape, 13.0, 6.5), generate(shape, 13.0, 6.5));
        }
    }

    #[test]
    fn scaled_descriptor() {
        let d = HabitatDescriptor::new(HabitatShape::Sphere, 10.0, 5.0).scaled(2.5);
        assert_eq!(d.height, 25.0);
        assert_eq!(d.width, 12.5);
        assert_eq!(d.shape, HabitatShape::Sphere);
    }
}
