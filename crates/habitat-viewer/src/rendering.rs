//! Mirrors the logic scene graph into Bevy meshes, materials and gizmos.

use bevy::prelude::*;
use bevy::render::mesh::{Indices, PrimitiveTopology};
use bevy::render::render_asset::RenderAssetUsages;
use bevy::render::render_resource::Face;
use habitat_logic::mesh::{Pose, TriMesh};
use habitat_logic::preview::PREVIEW_CAMERA_POSITION;
use habitat_logic::scene::{Material, NodeKind, Rgb};

use crate::state::{
    changed_slots, DesignCamera, Designer, HabitatSpin, MirrorKey, SceneEntity, SceneMirror,
};

/// Half-length of the cross drawn for each star.
const STAR_SIZE: f32 = 0.08;

pub fn rgb_color(rgb: Rgb) -> Color {
    Color::srgb(rgb.r(), rgb.g(), rgb.b())
}

fn bevy_mesh(mesh: &TriMesh) -> Mesh {
    let positions: Vec<[f32; 3]> = mesh.positions.iter().map(|p| p.to_array()).collect();
    let normals: Vec<[f32; 3]> = mesh.normals.iter().map(|n| n.to_array()).collect();
    Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::default())
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
        .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, normals)
        .with_inserted_indices(Indices::U32(mesh.indices.clone()))
}

fn bevy_material(material: &Material) -> StandardMaterial {
    let color = material.color;
    StandardMaterial {
        base_color: Color::srgba(color.r(), color.g(), color.b(), material.opacity),
        metallic: material.metallic,
        perceptual_roughness: material.roughness,
        alpha_mode: if material.is_transparent() {
            AlphaMode::Blend
        } else {
            AlphaMode::Opaque
        },
        double_sided: material.double_sided,
        cull_mode: if material.double_sided {
            None
        } else {
            Some(Face::Back)
        },
        ..default()
    }
}

fn pose_transform(pose: &Pose) -> Transform {
    Transform {
        translation: pose.translation,
        rotation: pose.rotation,
        scale: Vec3::ONE,
    }
}

fn spins(kind: NodeKind) -> bool {
    matches!(kind, NodeKind::Habitat | NodeKind::HabitatPart)
}

/// Re-mirror the top-level nodes that changed since the last mirrored scene.
/// Switching between the design and report scenes re-mirrors everything.
pub fn sync_scene(
    designer: NonSend<Designer>,
    mut mirror: Local<SceneMirror>,
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut clear_color: ResMut<ClearColor>,
) {
    let key = designer.mirror_key();
    if mirror.key == key {
        return;
    }
    let same_source = matches!(
        (mirror.key, key),
        (Some(MirrorKey::Design(_)), Some(MirrorKey::Design(_)))
    );
    mirror.key = key;
    if !same_source {
        mirror.clear(&mut commands);
    }

    let Some(graph) = designer.displayed_scene() else {
        mirror.clear(&mut commands);
        return;
    };
    clear_color.0 = rgb_color(graph.background);

    let stale = changed_slots(&mirror.nodes, graph.nodes());
    for &slot in &stale {
        if let Some(entities) = mirror.entities.get_mut(slot) {
            for entity in entities.drain(..) {
                commands.entity(entity).despawn();
            }
        }
    }
    mirror.nodes.truncate(graph.len());
    mirror.entities.resize_with(graph.len(), Vec::new);

    let mut spawned = 0;
    for &slot in &stale {
        let Some(top) = graph.nodes().get(slot) else {
            continue;
        };
        let mut entities = Vec::new();
        top.visit(&Pose::IDENTITY, &mut |node, world| {
            let Some(mesh) = &node.mesh else {
                return;
            };
            let transform = pose_transform(&world);
            let mut entity = commands.spawn((
                Mesh3d(meshes.add(bevy_mesh(mesh))),
                MeshMaterial3d(materials.add(bevy_material(&node.material))),
                transform,
                SceneEntity,
                Name::new(node.name.clone()),
            ));
            if spins(node.kind) {
                entity.insert(HabitatSpin { base: transform });
            }
            entities.push(entity.id());
        });
        spawned += entities.len();
        mirror.entities[slot] = entities;
        if slot < mirror.nodes.len() {
            mirror.nodes[slot] = top.clone();
        } else {
            mirror.nodes.push(top.clone());
        }
    }
    debug!(
        "mirrored scene {:?}: {} slots changed, {} mesh entities spawned",
        key,
        stale.len(),
        spawned
    );
}

/// Apply the preview self-rotation around the habitat origin.
pub fn apply_spin(
    designer: NonSend<Designer>,
    mut parts: Query<(&mut Transform, &HabitatSpin)>,
) {
    let rotation = designer.habitat_rotation();
    for (mut transform, spin) in parts.iter_mut() {
        *transform = Transform::from_rotation(rotation) * spin.base;
    }
}

/// Keep the Bevy camera on the logic camera so pointer rays line up.
pub fn sync_camera(
    designer: NonSend<Designer>,
    mut camera: Query<(&mut Transform, &mut Projection), With<DesignCamera>>,
) {
    let Ok((mut transform, mut projection)) = camera.get_single_mut() else {
        return;
    };

    if designer.show_report && designer.report_scene.is_some() {
        *transform = Transform::from_translation(PREVIEW_CAMERA_POSITION)
            .looking_at(Vec3::ZERO, Vec3::Y);
        return;
    }

    let Some(view) = &designer.view else {
        return;
    };
    let camera = view.camera();
    *transform = Transform::from_translation(camera.position).looking_at(camera.target, camera.up);
    if let Projection::Perspective(perspective) = &mut *projection {
        perspective.fov = camera.fov_y_degrees.to_radians();
        perspective.near = camera.near;
        perspective.far = camera.far;
    }
}

/// Draw edge outlines, the grid and the star field.
pub fn draw_outlines(designer: NonSend<Designer>, mut gizmos: Gizmos) {
    let Some(graph) = designer.displayed_scene() else {
        return;
    };
    let spin = Pose::new(Vec3::ZERO, designer.habitat_rotation());

    graph.visit(&mut |node, world| {
        let world = if spins(node.kind) {
            spin.then(&world)
        } else {
            world
        };

        if let Some(outline) = &node.outline {
            let color = rgb_color(node.outline_color);
            for [a, b] in &outline.segments {
                gizmos.line(world.transform_point(*a), world.transform_point(*b), color);
            }
        }

        for &star in &node.points {
            let p = world.transform_point(star);
            gizmos.line(p - Vec3::X * STAR_SIZE, p + Vec3::X * STAR_SIZE, Color::WHITE);
            gizmos.line(p - Vec3::Y * STAR_SIZE, p + Vec3::Y * STAR_SIZE, Color::WHITE);
        }
    });
}
