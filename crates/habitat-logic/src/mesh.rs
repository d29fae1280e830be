//! Triangle meshes, outlines and bounding boxes.
//!
//! Primitive builders follow the usual parametric layouts (box faces,
//! cylinder torso plus caps, UV sphere, ring torus) so the generated
//! vertex counts and outlines are predictable. Everything here is plain
//! data: no handles, no GPU buffers.

use std::collections::HashMap;
use std::f32::consts::{PI, TAU};

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Angle (degrees) between adjacent faces above which a shared edge is drawn.
pub const OUTLINE_THRESHOLD_DEGREES: f32 = 1.0;

/// Position quantisation used when merging seam vertices for edge detection.
const EDGE_PRECISION: f32 = 1e4;

// ── Pose ────────────────────────────────────────────────────────────────

/// Rigid placement of a mesh: rotation about the local origin, then translation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub translation: Vec3,
    pub rotation: Quat,
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Pose {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            rotation: Quat::IDENTITY,
        }
    }

    pub fn new(translation: Vec3, rotation: Quat) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.translation)
    }

    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        self.rotation * p + self.translation
    }

    /// Compose `self` (parent) with `child`.
    pub fn then(&self, child: &Pose) -> Pose {
        Pose {
            translation: self.transform_point(child.translation),
            rotation: self.rotation * child.rotation,
        }
    }
}

// ── Aabb ────────────────────────────────────────────────────────────────

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn from_center_size(center: Vec3, size: Vec3) -> Self {
        let half = size.abs() * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Smallest box containing every point, or `None` for an empty iterator.
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bounds = Self {
            min: first,
            max: first,
        };
        for p in iter {
            bounds.min = bounds.min.min(p);
            bounds.max = bounds.max.max(p);
        }
        Some(bounds)
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn volume(&self) -> f32 {
        let s = self.size();
        s.x * s.y * s.z
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn contains(&self, p: Vec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }
}

// ── Outline ─────────────────────────────────────────────────────────────

/// Wireframe made of independent line segments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Outline {
    pub segments: Vec<[Vec3; 2]>,
}

impl Outline {
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Square grid of `divisions` × `divisions` cells on the XZ plane.
    pub fn grid(size: f32, divisions: u32) -> Self {
        let divisions = divisions.max(1);
        let half = size / 2.0;
        let step = size / divisions as f32;
        let mut segments = Vec::with_capacity(2 * (divisions as usize + 1));
        for i in 0..=divisions {
            let k = -half + i as f32 * step;
            segments.push([Vec3::new(-half, 0.0, k), Vec3::new(half, 0.0, k)]);
            segments.push([Vec3::new(k, 0.0, -half), Vec3::new(k, 0.0, half)]);
        }
        Self { segments }
    }

    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::from_points(self.segments.iter().flat_map(|s| s.iter().copied()))
    }
}

// ── TriMesh ─────────────────────────────────────────────────────────────

/// Indexed triangle list with per-vertex normals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TriMesh {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub indices: Vec<u32>,
}

impl TriMesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| {
            [
                self.positions[t[0] as usize],
                self.positions[t[1] as usize],
                self.positions[t[2] as usize],
            ]
        })
    }

    /// Local-space bounds. An empty mesh collapses to the origin.
    pub fn bounds(&self) -> Aabb {
        Aabb::from_points(self.positions.iter().copied()).unwrap_or(Aabb {
            min: Vec3::ZERO,
            max: Vec3::ZERO,
        })
    }

    /// Bounds after placing the mesh with `pose`.
    pub fn bounds_with(&self, pose: &Pose) -> Aabb {
        Aabb::from_points(self.positions.iter().map(|&p| pose.transform_point(p))).unwrap_or(
            Aabb {
                min: pose.translation,
                max: pose.translation,
            },
        )
    }

    /// Rectangular box centred on the origin.
    pub fn cuboid(width: f32, height: f32, depth: f32) -> Self {
        let half = Vec3::new(width, height, depth) * 0.5;
        // (normal, u, v) with u × v = normal so every face winds outward.
        let faces = [
            (Vec3::X, Vec3::Y, Vec3::Z),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y),
            (Vec3::Y, Vec3::Z, Vec3::X),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z),
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::Y, Vec3::X),
        ];
        let mut mesh = TriMesh::default();
        for (normal, u, v) in faces {
            let hn = normal.abs().dot(half);
            let hu = u.abs().dot(half);
            let hv = v.abs().dot(half);
            let base = mesh.positions.len() as u32;
            let centre = normal * hn;
            for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
                mesh.positions.push(centre + u * (hu * su) + v * (hv * sv));
                mesh.normals.push(normal);
            }
            mesh.indices
                .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }
        mesh
    }

    /// Closed cylinder along Y, centred on the origin.
    pub fn cylinder(radius: f32, height: f32, radial_segments: u32) -> Self {
        let segments = radial_segments.max(3);
        let half_height = height / 2.0;
        let mut mesh = TriMesh::default();

        // Torso: row 0 at the top, row 1 at the bottom.
        let mut rows = [Vec::new(), Vec::new()];
        for (row, indices) in rows.iter_mut().enumerate() {
            let y = if row == 0 { half_height } else { -half_height };
            for x in 0..=segments {
                let theta = x as f32 / segments as f32 * TAU;
                let (sin, cos) = theta.sin_cos();
                indices.push(mesh.positions.len() as u32);
                mesh.positions.push(Vec3::new(radius * sin, y, radius * cos));
                mesh.normals.push(Vec3::new(sin, 0.0, cos));
            }
        }
        for x in 0..segments as usize {
            let a = rows[0][x];
            let b = rows[1][x];
            let c = rows[1][x + 1];
            let d = rows[0][x + 1];
            mesh.indices.extend_from_slice(&[a, b, d, b, c, d]);
        }

        for top in [true, false] {
            let y = if top { half_height } else { -half_height };
            let normal = if top { Vec3::Y } else { Vec3::NEG_Y };
            let centre_start = mesh.positions.len() as u32;
            for _ in 0..segments {
                mesh.positions.push(Vec3::new(0.0, y, 0.0));
                mesh.normals.push(normal);
            }
            let ring_start = mesh.positions.len() as u32;
            for x in 0..=segments {
                let theta = x as f32 / segments as f32 * TAU;
                let (sin, cos) = theta.sin_cos();
                mesh.positions.push(Vec3::new(radius * sin, y, radius * cos));
                mesh.normals.push(normal);
            }
            for x in 0..segments {
                let c = centre_start + x;
                let i = ring_start + x;
                if top {
                    mesh.indices.extend_from_slice(&[c, i, i + 1]);
                } else {
                    mesh.indices.extend_from_slice(&[c, i + 1, i]);
                }
            }
        }
        mesh
    }

    /// UV sphere centred on the origin.
    pub fn uv_sphere(radius: f32, width_segments: u32, height_segments: u32) -> Self {
        let ws = width_segments.max(3);
        let hs = height_segments.max(2);
        let mut mesh = TriMesh::default();
        let mut grid: Vec<Vec<u32>> = Vec::with_capacity(hs as usize + 1);

        for iy in 0..=hs {
            let v = iy as f32 / hs as f32;
            let mut row = Vec::with_capacity(ws as usize + 1);
            for ix in 0..=ws {
                let u = ix as f32 / ws as f32;
                let normal = Vec3::new(
                    -(u * TAU).cos() * (v * PI).sin(),
                    (v * PI).cos(),
                    (u * TAU).sin() * (v * PI).sin(),
                );
                row.push(mesh.positions.len() as u32);
                mesh.positions.push(normal * radius);
                mesh.normals.push(normal);
            }
            grid.push(row);
        }

        for iy in 0..hs as usize {
            for ix in 0..ws as usize {
                let a = grid[iy][ix + 1];
                let b = grid[iy][ix];
                let c = grid[iy + 1][ix];
                let d = grid[iy + 1][ix + 1];
                if iy != 0 {
                    mesh.indices.extend_from_slice(&[a, b, d]);
                }
                if iy != hs as usize - 1 {
                    mesh.indices.extend_from_slice(&[b, c, d]);
                }
            }
        }
        mesh
    }

    /// Ring torus around the Z axis (the ring lies in the XY plane).
    pub fn torus(
        major_radius: f32,
        minor_radius: f32,
        radial_segments: u32,
        tubular_segments: u32,
    ) -> Self {
        let radial = radial_segments.max(3);
        let tubular = tubular_segments.max(3);
        let mut mesh = TriMesh::default();

        for j in 0..=radial {
            let v = j as f32 / radial as f32 * TAU;
            for i in 0..=tubular {
                let u = i as f32 / tubular as f32 * TAU;
                let ring = major_radius + minor_radius * v.cos();
                let p = Vec3::new(ring * u.cos(), ring * u.sin(), minor_radius * v.sin());
                let centre = Vec3::new(major_radius * u.cos(), major_radius * u.sin(), 0.0);
                mesh.positions.push(p);
                mesh.normals.push((p - centre).normalize_or_zero());
            }
        }

        let stride = tubular + 1;
        for j in 1..=radial {
            for i in 1..=tubular {
                let a = stride * j + i - 1;
                let b = stride * (j - 1) + i - 1;
                let c = stride * (j - 1) + i;
                let d = stride * j + i;
                mesh.indices.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }
        mesh
    }

    /// Feature-edge wireframe of this mesh.
    ///
    /// An edge is kept when it borders a single triangle, or when its two
    /// triangles meet at more than [`OUTLINE_THRESHOLD_DEGREES`]. Degenerate
    /// triangles (two corners merged) are skipped.
    pub fn outline(&self) -> Outline {
        let threshold_dot = OUTLINE_THRESHOLD_DEGREES.to_radians().cos();
        let mut slots: Vec<Option<EdgeRecord>> = Vec::new();
        let mut by_key: HashMap<(VertexKey, VertexKey), usize> = HashMap::new();
        let mut segments = Vec::new();

        for tri in self.triangles() {
            let keys = tri.map(VertexKey::quantise);
            if keys[0] == keys[1] || keys[1] == keys[2] || keys[2] == keys[0] {
                continue;
            }
            let normal = (tri[1] - tri[0]).cross(tri[2] - tri[0]).normalize_or_zero();

            for j in 0..3 {
                let next = (j + 1) % 3;
                let forward = (keys[j], keys[next]);
                let reverse = (keys[next], keys[j]);

                if let Some(&slot) = by_key.get(&reverse) {
                    if let Some(record) = slots[slot].take() {
                        if normal.dot(record.normal) <= threshold_dot {
                            segments.push([record.start, record.end]);
                        }
                        continue;
                    }
                }
                if !by_key.contains_key(&forward) {
                    by_key.insert(forward, slots.len());
                    slots.push(Some(EdgeRecord {
                        start: tri[j],
                        end: tri[next],
                        normal,
                    }));
                }
            }
        }

        // Unmatched edges border exactly one face.
        segments.extend(slots.into_iter().flatten().map(|r| [r.start, r.end]));
        Outline { segments }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct VertexKey(i64, i64, i64);

impl VertexKey {
    fn quantise(p: Vec3) -> Self {
        let q = |v: f32| (v * EDGE_PRECISION).round() as i64;
        Self(q(p.x), q(p.y), q(p.z))
    }
}

struct EdgeRecord {
    start: Vec3,
    end: Vec3,
    normal: Vec3,
}
