//! Scene graph assembly.
//!
//! The scene is a pure function of the habitat descriptor and the ordered
//! functional areas: [`assemble`] builds it from scratch. [`SceneAssembler`]
//! keeps one graph alive across edits and replaces nodes by tag (the habitat
//! on shape/dimension changes, a single area on resize or drag), which always
//! ends in the same graph a full [`assemble`] would produce.
//!
//! Nodes carry geometry as plain [`TriMesh`]/[`Outline`] data. A renderer
//! mirrors them into whatever GPU objects it uses; see [`crate::view`].

use std::collections::BTreeMap;
use std::f32::consts::FRAC_PI_2;
use std::fmt;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::areas::FunctionalArea;
use crate::mesh::{Aabb, Outline, Pose, TriMesh};
use crate::shapes::{HabitatDescriptor, HabitatGeometry};

/// Name of the habitat node.
pub const HABITAT_TAG: &str = "main_habitat";
/// Name of the ground grid node.
pub const GRID_TAG: &str = "grid";

/// Default multiplier applied to habitat dimensions in the functional view.
pub const DEFAULT_HABITAT_SCALE: f32 = 2.5;

const FUNCTIONAL_GRID_SIZE: f32 = 30.0;
const FUNCTIONAL_GRID_DIVISIONS: u32 = 30;
const PREVIEW_GRID_SIZE: f32 = 20.0;
const PREVIEW_GRID_DIVISIONS: u32 = 20;

// ── Colour & material ───────────────────────────────────────────────────

/// 24-bit `0xRRGGBB` colour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u32);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0x000000);
    pub const WHITE: Rgb = Rgb(0xFFFFFF);
    pub const CYAN: Rgb = Rgb(0x00FFFF);

    pub fn r(&self) -> f32 {
        ((self.0 >> 16) & 0xFF) as f32 / 255.0
    }

    pub fn g(&self) -> f32 {
        ((self.0 >> 8) & 0xFF) as f32 / 255.0
    }

    pub fn b(&self) -> f32 {
        (self.0 & 0xFF) as f32 / 255.0
    }

    pub fn to_array(&self) -> [f32; 3] {
        [self.r(), self.g(), self.b()]
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06X}", self.0 & 0xFF_FFFF)
    }
}

/// Surface parameters of a mesh node (metallic/roughness model).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub color: Rgb,
    /// 1.0 is opaque.
    pub opacity: f32,
    pub metallic: f32,
    pub roughness: f32,
    pub double_sided: bool,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: Rgb::WHITE,
            opacity: 1.0,
            metallic: 0.0,
            roughness: 0.5,
            double_sided: false,
        }
    }
}

impl Material {
    pub fn is_transparent(&self) -> bool {
        self.opacity < 1.0
    }
}

// ── Nodes ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// The habitat shell, or the group holding a wheel's parts.
    Habitat,
    /// A wheel module or ring.
    HabitatPart,
    /// A draggable functional-area box. Named by the area id.
    FunctionalArea,
    Grid,
    /// Destination planet/moon behind the report preview.
    Backdrop,
    Stars,
}

impl NodeKind {
    /// Only functional areas take part in pointer hit-testing.
    pub fn is_hit_testable(&self) -> bool {
        matches!(self, Self::FunctionalArea)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneNode {
    pub name: String,
    pub kind: NodeKind,
    /// Relative to the parent node (or the world for top-level nodes).
    pub pose: Pose,
    pub mesh: Option<TriMesh>,
    pub material: Material,
    pub outline: Option<Outline>,
    pub outline_color: Rgb,
    /// Point sprites (star field).
    pub points: Vec<Vec3>,
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            pose: Pose::IDENTITY,
            mesh: None,
            material: Material::default(),
            outline: None,
            outline_color: Rgb::WHITE,
            points: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_pose(mut self, pose: Pose) -> Self {
        self.pose = pose;
        self
    }

    pub fn with_mesh(mut self, mesh: TriMesh, material: Material) -> Self {
        self.mesh = Some(mesh);
        self.material = material;
        self
    }

    pub fn with_outline(mut self, outline: Outline, color: Rgb) -> Self {
        self.outline = Some(outline);
        self.outline_color = color;
        self
    }

    /// World-space bounds of this node's own mesh.
    pub fn mesh_bounds(&self, parent: &Pose) -> Option<Aabb> {
        let world = parent.then(&self.pose);
        self.mesh.as_ref().map(|m| m.bounds_with(&world))
    }

    /// Depth-first walk handing each node its world pose.
    pub fn visit<'a>(&'a self, parent: &Pose, f: &mut impl FnMut(&'a SceneNode, Pose)) {
        let world = parent.then(&self.pose);
        f(self, world);
        for child in &self.children {
            child.visit(&world, f);
        }
    }

    /// Total node count including descendants.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(SceneNode::node_count).sum::<usize>()
    }
}

/// Top-level nodes plus the clear colour.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneGraph {
    pub background: Rgb,
    nodes: Vec<SceneNode>,
}

impl SceneGraph {
    pub fn new(background: Rgb) -> Self {
        Self {
            background,
            nodes: Vec::new(),
        }
    }

    pub fn nodes(&self) -> &[SceneNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn find(&self, name: &str) -> Option<&SceneNode> {
        self.nodes.iter().find(|n| n.name == name)
    }

    pub fn habitat(&self) -> Option<&SceneNode> {
        self.position(NodeKind::Habitat, HABITAT_TAG)
            .map(|i| &self.nodes[i])
    }

    pub fn area_node(&self, id: &str) -> Option<&SceneNode> {
        self.nodes
            .iter()
            .find(|n| n.kind == NodeKind::FunctionalArea && n.name == id)
    }

    pub fn push(&mut self, node: SceneNode) {
        self.nodes.push(node);
    }

    fn position(&self, kind: NodeKind, name: &str) -> Option<usize> {
        self.nodes
            .iter()
            .position(|n| n.kind == kind && n.name == name)
    }

    /// Swap in `node` for the top-level node with the same kind and name,
    /// keeping its slot. Appends when no such node exists. Returns the
    /// replaced node.
    pub fn replace(&mut self, node: SceneNode) -> Option<SceneNode> {
        match self.position(node.kind, &node.name) {
            Some(i) => Some(std::mem::replace(&mut self.nodes[i], node)),
            None => {
                self.nodes.push(node);
                None
            }
        }
    }

    pub fn remove(&mut self, kind: NodeKind, name: &str) -> Option<SceneNode> {
        let i = self.position(kind, name)?;
        Some(self.nodes.remove(i))
    }

    /// World-space boxes of every hit-testable node, in scene order.
    pub fn area_volumes(&self) -> impl Iterator<Item = (&str, Aabb)> + '_ {
        self.nodes
            .iter()
            .filter(|n| n.kind.is_hit_testable())
            .filter_map(|n| Some((n.name.as_str(), n.mesh_bounds(&Pose::IDENTITY)?)))
    }

    pub fn visit<'a>(&'a self, f: &mut impl FnMut(&'a SceneNode, Pose)) {
        for node in &self.nodes {
            node.visit(&Pose::IDENTITY, f);
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.iter().map(SceneNode::node_count).sum()
    }
}

// ── Palette & settings ──────────────────────────────────────────────────

/// Area id → colour lookup with a fallback for unknown ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaPalette {
    pub colors: BTreeMap<String, Rgb>,
    pub fallback: Rgb,
}

impl Default for AreaPalette {
    fn default() -> Self {
        let colors = [
            ("sleep", 0x4ADE80),
            ("exercise", 0xEF4444),
            ("hygiene", 0x60A5FA),
            ("galley", 0xFBBF24),
            ("eclss", 0xA78BFA),
            ("medical", 0xF472B6),
        ]
        .into_iter()
        .map(|(id, c)| (id.to_string(), Rgb(c)))
        .collect();
        Self {
            colors,
            fallback: Rgb(0x6366F1),
        }
    }
}

impl AreaPalette {
    pub fn color_for(&self, id: &str) -> Rgb {
        self.colors.get(id).copied().unwrap_or(self.fallback)
    }

    /// Overlay `overrides` on top of the current mapping.
    pub fn merged<'a>(mut self, overrides: impl IntoIterator<Item = (&'a String, &'a Rgb)>) -> Self {
        for (id, color) in overrides {
            self.colors.insert(id.clone(), *color);
        }
        self
    }
}

/// Which of the two designer scenes to build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SceneMode {
    /// Habitat at scale with draggable, resizable areas.
    #[default]
    FunctionalAreas,
    /// Habitat alone at its real dimensions, slowly spinning.
    HabitatPreview,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SceneSettings {
    pub mode: SceneMode,
    pub habitat_scale: f32,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            mode: SceneMode::FunctionalAreas,
            habitat_scale: DEFAULT_HABITAT_SCALE,
        }
    }
}

// ── Styles ──────────────────────────────────────────────────────────────

/// Colours for the habitat and its wireframe.
#[derive(Debug, Clone, Copy)]
pub(crate) struct HabitatStyle {
    pub shell: Material,
    pub outline: Rgb,
}

impl HabitatStyle {
    pub(crate) const FUNCTIONAL: HabitatStyle = HabitatStyle {
        shell: Material {
            color: Rgb(0x1E40AF),
            opacity: 0.08,
            metallic: 0.5,
            roughness: 0.5,
            double_sided: true,
        },
        outline: Rgb::CYAN,
    };

    pub(crate) const PREVIEW: HabitatStyle = HabitatStyle {
        shell: Material {
            color: Rgb(0x3B82F6),
            opacity: 0.8,
            metallic: 0.0,
            roughness: 0.5,
            double_sided: true,
        },
        outline: Rgb(0x3B82F6),
    };

    pub(crate) const REPORT: HabitatStyle = HabitatStyle {
        shell: Material {
            color: Rgb(0x3B82F6),
            opacity: 0.3,
            metallic: 0.6,
            roughness: 0.3,
            double_sided: false,
        },
        outline: Rgb::WHITE,
    };
}

const WHEEL_MODULE_MATERIAL: Material = Material {
    color: Rgb(0x2563EB),
    opacity: 1.0,
    metallic: 0.6,
    roughness: 0.4,
    double_sided: false,
};

const WHEEL_RING_MATERIAL: Material = Material {
    color: Rgb::CYAN,
    opacity: 1.0,
    metallic: 0.8,
    roughness: 0.2,
    double_sided: false,
};

pub(crate) const AREA_OPACITY: f32 = 0.7;

// ── Assembly ────────────────────────────────────────────────────────────

/// Build the habitat node (with wheel parts as children).
pub(crate) fn habitat_node(geometry: HabitatGeometry, style: HabitatStyle) -> SceneNode {
    match geometry {
        HabitatGeometry::Solid(solid) => SceneNode::new(HABITAT_TAG, NodeKind::Habitat)
            .with_mesh(solid.mesh, style.shell)
            .with_outline(solid.outline, style.outline),
        HabitatGeometry::Wheel(wheel) => {
            let mut group = SceneNode::new(HABITAT_TAG, NodeKind::Habitat);
            for module in wheel.modules {
                group.children.push(
                    SceneNode::new(format!("module_{}", module.index), NodeKind::HabitatPart)
                        .with_pose(module.pose)
                        .with_mesh(module.mesh, WHEEL_MODULE_MATERIAL)
                        .with_outline(module.outline, Rgb::WHITE),
                );
            }
            for (i, ring) in wheel.rings.into_iter().enumerate() {
                group.children.push(
                    SceneNode::new(format!("ring_{i}"), NodeKind::HabitatPart)
                        .with_pose(ring.pose)
                        .with_mesh(ring.mesh, WHEEL_RING_MATERIAL),
                );
            }
            group
        }
    }
}

/// Semi-transparent box with a white outline, named by the area id.
pub(crate) fn area_node(area: &FunctionalArea, material: Material, position: Vec3) -> SceneNode {
    let mesh = TriMesh::cuboid(area.size.width, area.size.height, area.size.depth);
    let outline = mesh.outline();
    SceneNode::new(area.id.clone(), NodeKind::FunctionalArea)
        .with_pose(Pose::from_translation(position))
        .with_mesh(mesh, material)
        .with_outline(outline, Rgb::WHITE)
}

fn functional_area_node(area: &FunctionalArea, palette: &AreaPalette) -> SceneNode {
    let material = Material {
        color: palette.color_for(&area.id),
        opacity: AREA_OPACITY,
        metallic: 0.3,
        roughness: 0.7,
        double_sided: false,
    };
    area_node(area, material, area.position)
}

fn grid_node(mode: SceneMode) -> SceneNode {
    match mode {
        SceneMode::FunctionalAreas => SceneNode::new(GRID_TAG, NodeKind::Grid).with_outline(
            Outline::grid(FUNCTIONAL_GRID_SIZE, FUNCTIONAL_GRID_DIVISIONS),
            Rgb(0x004466),
        ),
        // Stands upright behind the spinning habitat.
        SceneMode::HabitatPreview => SceneNode::new(GRID_TAG, NodeKind::Grid)
            .with_pose(Pose::new(Vec3::ZERO, Quat::from_rotation_x(FRAC_PI_2)))
            .with_outline(
                Outline::grid(PREVIEW_GRID_SIZE, PREVIEW_GRID_DIVISIONS),
                Rgb(0x1E3A5F),
            ),
    }
}

fn scene_habitat(habitat: &HabitatDescriptor, settings: &SceneSettings) -> SceneNode {
    match settings.mode {
        SceneMode::FunctionalAreas => habitat_node(
            habitat.scaled(settings.habitat_scale).generate(),
            HabitatStyle::FUNCTIONAL,
        ),
        SceneMode::HabitatPreview => habitat_node(habitat.generate(), HabitatStyle::PREVIEW),
    }
}

fn background(mode: SceneMode) -> Rgb {
    match mode {
        SceneMode::FunctionalAreas => Rgb::BLACK,
        SceneMode::HabitatPreview => Rgb(0x0A1628),
    }
}

/// Build the complete scene: grid, habitat, then one node per area in order.
///
/// The habitat-preview mode leaves the areas out.
pub fn assemble(
    habitat: &HabitatDescriptor,
    areas: &[FunctionalArea],
    palette: &AreaPalette,
    settings: &SceneSettings,
) -> SceneGraph {
    let mut graph = SceneGraph::new(background(settings.mode));
    graph.push(grid_node(settings.mode));
    graph.push(scene_habitat(habitat, settings));
    if settings.mode == SceneMode::FunctionalAreas {
        for area in areas {
            graph.push(functional_area_node(area, palette));
        }
    }
    graph
}

// ── Assembler ───────────────────────────────────────────────────────────

/// Long-lived scene that is patched in place after each confirmed mutation.
#[derive(Debug, Clone)]
pub struct SceneAssembler {
    palette: AreaPalette,
    settings: SceneSettings,
    graph: SceneGraph,
    revision: u64,
}

impl SceneAssembler {
    pub fn new(palette: AreaPalette, settings: SceneSettings) -> Self {
        Self {
            graph: SceneGraph::new(background(settings.mode)),
            palette,
            settings,
            revision: 0,
        }
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    pub fn settings(&self) -> &SceneSettings {
        &self.settings
    }

    pub fn palette(&self) -> &AreaPalette {
        &self.palette
    }

    /// Bumped on every rebuild or patch.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Discard the graph and assemble it from scratch.
    pub fn rebuild(&mut self, habitat: &HabitatDescriptor, areas: &[FunctionalArea]) {
        self.graph = assemble(habitat, areas, &self.palette, &self.settings);
        self.revision += 1;
        log::debug!(
            "scene rebuilt: {} nodes (revision {})",
            self.graph.node_count(),
            self.revision
        );
    }

    /// Replace the habitat node after a shape or dimension change.
    pub fn refresh_habitat(&mut self, habitat: &HabitatDescriptor) {
        self.graph.replace(scene_habitat(habitat, &self.settings));
        self.revision += 1;
        log::debug!("habitat regenerated as {} (revision {})", habitat.shape, self.revision);
    }

    /// Replace one area's node after a resize or reposition.
    pub fn refresh_area(&mut self, area: &FunctionalArea) {
        if self.settings.mode != SceneMode::FunctionalAreas {
            return;
        }
        self.graph.replace(functional_area_node(area, &self.palette));
        self.revision += 1;
    }

    /// Switch scene mode; the caller must rebuild afterwards.
    pub fn set_mode(&mut self, mode: SceneMode) {
        self.settings.mode = mode;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::areas::{default_catalog, AreaRegistry, Dimension};
    use crate::shapes::{HabitatShape, WHEEL_MODULE_COUNT};

    fn functional(habitat: &HabitatDescriptor, areas: &[FunctionalArea]) -> SceneGraph {
        assemble(habitat, areas, &AreaPalette::default(), &SceneSettings::default())
    }

    #[test]
    fn node_order_is_grid_habitat_areas() {
        let graph = functional(&HabitatDescriptor::default(), &default_catalog());
        let names: Vec<_> = graph.nodes().iter().map(|n| n.name.as_str()).collect();
        assert_eq!(
            names,
            [GRID_TAG, HABITAT_TAG, "sleep", "exercise", "hygiene", "galley", "eclss", "medical"]
        );
        assert_eq!(graph.background, Rgb::BLACK);
    }

    #[test]
    fn habitat_is_scaled_in_functional_mode() {
        let habitat = HabitatDescriptor::new(HabitatShape::Cube, 4.0, 2.0);
        let graph = functional(&habitat, &[]);
        let bounds = graph
            .habitat()
            .and_then(|n| n.mesh_bounds(&Pose::IDENTITY))
            .unwrap();
        assert!((bounds.size() - Vec3::new(5.0, 10.0, 5.0)).length() < 1e-4);
    }

    #[test]
    fn wheel_habitat_is_a_group() {
        let habitat = HabitatDescriptor::new(HabitatShape::Wheel, 10.0, 5.0);
        let graph = functional(&habitat, &[]);
        let node = graph.habitat().unwrap();
        assert!(node.mesh.is_none());
        assert_eq!(node.children.len(), WHEEL_MODULE_COUNT + 2);
        let outlined = node.children.iter().filter(|c| c.outline.is_some()).count();
        assert_eq!(outlined, WHEEL_MODULE_COUNT);
    }

    #[test]
    fn unknown_area_ids_use_fallback_color() {
        let mut areas = default_catalog();
        areas[0].id = "airlock".into();
        let graph = functional(&HabitatDescriptor::default(), &areas);
        let node = graph.area_node("airlock").unwrap();
        assert_eq!(node.material.color, Rgb(0x6366F1));
        assert_eq!(graph.area_node("exercise").unwrap().material.color, Rgb(0xEF4444));
    }

    #[test]
    fn only_areas_are_hit_testable() {
        let graph = functional(&HabitatDescriptor::default(), &default_catalog());
        let ids: Vec<_> = graph.area_volumes().map(|(id, _)| id).collect();
        assert_eq!(ids.len(), 6);
        assert!(!ids.contains(&GRID_TAG));
        assert!(!ids.contains(&HABITAT_TAG));
        let (_, sleep) = graph.area_volumes().next().unwrap();
        assert!(sleep.contains(Vec3::new(-4.0, 3.0, 0.0)));
    }

    #[test]
    fn preview_mode_has_no_areas() {
        let settings = SceneSettings {
            mode: SceneMode::HabitatPreview,
            ..SceneSettings::default()
        };
        let graph = assemble(
            &HabitatDescriptor::default(),
            &default_catalog(),
            &AreaPalette::default(),
            &settings,
        );
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.background, Rgb(0x0A1628));
        assert_eq!(graph.area_volumes().count(), 0);
        // Unscaled: cylinder of height 10.
        let b = graph.habitat().and_then(|n| n.mesh_bounds(&Pose::IDENTITY)).unwrap();
        assert!((b.size().y - 10.0).abs() < 1e-4);
    }

    #[test]
    fn patching_matches_full_assembly() {
        let mut habitat = HabitatDescriptor::default();
        let mut registry = AreaRegistry::with_default_catalog();
        let mut assembler = SceneAssembler::new(AreaPalette::default(), SceneSettings::default());
        assembler.rebuild(&habitat, registry.areas());

        habitat.shape = HabitatShape::Wheel;
        assembler.refresh_habitat(&habitat);
        registry.resize("galley", Dimension::Depth, 1.5);
        assembler.refresh_area(registry.get("galley").unwrap());
        registry.reposition("sleep", 2.0, -3.0);
        assembler.refresh_area(registry.get("sleep").unwrap());

        let fresh = functional(&habitat, registry.areas());
        assert_eq!(assembler.graph(), &fresh);
        assert_eq!(assembler.revision(), 4);
    }

    #[test]
    fn replace_keeps_slot() {
        let mut graph = SceneGraph::new(Rgb::BLACK);
        graph.push(SceneNode::new("a", NodeKind::Grid));
        graph.push(SceneNode::new("b", NodeKind::Grid));
        let moved = Pose::from_translation(Vec3::Y);
        let old = graph.replace(SceneNode::new("a", NodeKind::Grid).with_pose(moved));
        assert_eq!(old.map(|n| n.pose), Some(Pose::IDENTITY));
        assert_eq!(graph.nodes()[0].pose, moved);
        assert!(graph.replace(SceneNode::new("c", NodeKind::Stars)).is_none());
        assert_eq!(graph.len(), 3);
        assert!(graph.remove(NodeKind::Grid, "b").is_some());
        assert!(graph.remove(NodeKind::Grid, "b").is_none());
    }

    #[test]
    fn replace_never_crosses_node_kinds() {
        let mut graph = SceneGraph::new(Rgb::BLACK);
        graph.push(SceneNode::new("a", NodeKind::Grid));
        assert!(graph.replace(SceneNode::new("a", NodeKind::FunctionalArea)).is_none());
        let kinds: Vec<_> = graph.nodes().iter().map(|n| n.kind).collect();
        assert_eq!(kinds, [NodeKind::Grid, NodeKind::FunctionalArea]);
    }

    #[test]
    fn areas_named_like_fixed_nodes_patch_their_own_slot() {
        let habitat = HabitatDescriptor::default();
        let mut areas = default_catalog();
        areas[0].id = GRID_TAG.into();
        areas[1].id = HABITAT_TAG.into();
        let mut registry = AreaRegistry::new(areas);
        let mut assembler = SceneAssembler::new(AreaPalette::default(), SceneSettings::default());
        assembler.rebuild(&habitat, registry.areas());

        registry.resize(GRID_TAG, Dimension::Width, 2.0);
        assembler.refresh_area(registry.get(GRID_TAG).unwrap());
        registry.reposition(HABITAT_TAG, 3.0, 1.0);
        assembler.refresh_area(registry.get(HABITAT_TAG).unwrap());
        assembler.refresh_habitat(&habitat);

        let graph = assembler.graph();
        assert_eq!(graph, &functional(&habitat, registry.areas()));
        assert_eq!(graph.nodes()[0].kind, NodeKind::Grid);
        assert_eq!(graph.habitat().map(|n| n.kind), Some(NodeKind::Habitat));
        let ids: Vec<_> = graph.area_volumes().map(|(id, _)| id).collect();
        assert_eq!(ids.len(), 6);
        assert_eq!(&ids[..2], [GRID_TAG, HABITAT_TAG]);
    }

    #[test]
    fn palette_overrides_merge() {
        let overrides: BTreeMap<String, Rgb> = [("sleep".to_string(), Rgb(0x123456))].into();
        let palette = AreaPalette::default().merged(&overrides);
        assert_eq!(palette.color_for("sleep"), Rgb(0x123456));
        assert_eq!(palette.color_for("galley"), Rgb(0xFBBF24));
        assert_eq!(Rgb(0x00FF80).to_string(), "#00FF80");
    }
}
