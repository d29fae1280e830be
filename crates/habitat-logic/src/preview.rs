//! 3D preview shown on the mission report.
//!
//! Unlike the design scene, the report lays the areas out on a helix
//! around the habitat axis instead of at their dragged positions, and
//! adds the destination body and a star field behind it.

use std::f32::consts::TAU;

use glam::Vec3;

use crate::mesh::{Pose, TriMesh};
use crate::mission::MissionConfiguration;
use crate::scene::{
    area_node, habitat_node, AreaPalette, HabitatStyle, Material, NodeKind, Rgb, SceneGraph,
    SceneNode,
};

pub const STAR_COUNT: usize = 1000;
/// Edge length of the cube the stars are scattered in.
pub const STAR_FIELD_SIZE: f32 = 100.0;
pub const STAR_SEED: u64 = 0x5EED_57A2;

/// Camera placement used by report renderers.
pub const PREVIEW_CAMERA_POSITION: Vec3 = Vec3::new(0.0, 5.0, 15.0);

pub const BACKDROP_TAG: &str = "backdrop";
pub const STARS_TAG: &str = "stars";

const BACKDROP_SEGMENTS: u32 = 32;
const AREA_SPACING: f32 = 0.5;

/// Simple deterministic hash for star placement, returns 0.0..1.0.
fn simple_hash(seed: u64, index: usize) -> f32 {
    let mut h = seed
        .wrapping_mul(6364136223846793005)
        .wrapping_add(index as u64);
    h ^= h >> 33;
    h = h.wrapping_mul(0xff51afd7ed558ccd);
    h ^= h >> 33;
    (h >> 40) as f32 / (1u64 << 24) as f32
}

/// `count` points inside a cube of edge `size` centred on the origin.
pub fn star_field(seed: u64, count: usize, size: f32) -> Vec<Vec3> {
    (0..count)
        .map(|i| {
            let x = simple_hash(seed, 3 * i) - 0.5;
            let y = simple_hash(seed, 3 * i + 1) - 0.5;
            let z = simple_hash(seed, 3 * i + 2) - 0.5;
            Vec3::new(x, y, z) * size
        })
        .collect()
}

/// Where the `index`-th of `count` areas sits in the report preview.
pub fn preview_slot(index: usize, count: usize, habitat_width: f32, area_height: f32) -> Vec3 {
    let angle = index as f32 / count.max(1) as f32 * TAU;
    let radius = habitat_width / 3.0;
    let y = (index as f32 - count as f32 / 2.0) * (area_height + AREA_SPACING);
    Vec3::new(angle.cos() * radius, y, angle.sin() * radius)
}

/// Build the report preview scene for a finalized configuration.
pub fn assemble_report_preview(
    config: &MissionConfiguration,
    palette: &AreaPalette,
) -> SceneGraph {
    let destination = config.destination;
    let mut graph = SceneGraph::new(destination.background());

    graph.push(habitat_node(config.habitat.generate(), HabitatStyle::REPORT));

    let areas = config.areas.as_deref().unwrap_or_default();
    let width = config.habitat.effective_width();
    for (i, area) in areas.iter().enumerate() {
        let material = Material {
            color: palette.color_for(&area.id),
            opacity: 0.8,
            metallic: 0.3,
            roughness: 0.7,
            double_sided: false,
        };
        let slot = preview_slot(i, areas.len(), width, area.size.height);
        graph.push(area_node(area, material, slot));
    }

    let body = destination.backdrop();
    graph.push(
        SceneNode::new(BACKDROP_TAG, NodeKind::Backdrop)
            .with_pose(Pose::from_translation(body.position))
            .with_mesh(
                TriMesh::uv_sphere(body.radius, BACKDROP_SEGMENTS, BACKDROP_SEGMENTS),
                Material {
                    color: body.color,
                    opacity: 1.0,
                    metallic: 0.3,
                    roughness: 0.7,
                    double_sided: false,
                },
            ),
    );

    let mut stars = SceneNode::new(STARS_TAG, NodeKind::Stars);
    stars.material.color = Rgb::WHITE;
    stars.points = star_field(STAR_SEED, STAR_COUNT, STAR_FIELD_SIZE);
    graph.push(stars);

    graph
}
