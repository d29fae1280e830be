//! One habitat design session.
//!
//! [`DesignSession`] owns the mission configuration, the area registry, the
//! selection checklist, the drag controller and the assembled scene. Every
//! mutation runs to completion in the same order: update the data, patch
//! the scene, then notify area listeners. A renderer that reads
//! [`DesignSession::scene`] between calls therefore never sees a scene that
//! lags behind the registry.

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::areas::{AreaRegistry, AreaSummary, Dimension, FunctionalArea};
use crate::config::DesignerConfig;
use crate::mission::{validate_configuration, ConfigIssue, Destination, MissionConfiguration};
use crate::placement::{DragOutcome, PlacementController, Projection};
use crate::scene::{SceneAssembler, SceneGraph, SceneMode};
use crate::scoring::{score, MissionReport};
use crate::selection::AreaSelection;
use crate::shapes::{HabitatDescriptor, HabitatShape};

/// Callback receiving fresh area summaries after every registry or crew change.
pub type AreasListener = Box<dyn FnMut(&[AreaSummary])>;

/// Everything produced when the user finalizes a design.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalizedDesign {
    pub configuration: MissionConfiguration,
    pub summaries: Vec<AreaSummary>,
    pub report: MissionReport,
    /// Out-of-range widget values. Informational only.
    pub validation: Vec<ConfigIssue>,
}

pub struct DesignSession {
    config: MissionConfiguration,
    registry: AreaRegistry,
    selection: AreaSelection,
    placement: PlacementController,
    assembler: SceneAssembler,
    resize_step: f32,
    listeners: Vec<AreasListener>,
}

impl fmt::Debug for DesignSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DesignSession")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .field("selection", &self.selection)
            .field("placement", &self.placement)
            .field("scene_revision", &self.assembler.revision())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl DesignSession {
    /// Start a functional-area session. Areas supplied by the host replace
    /// the default catalog.
    pub fn new(config: MissionConfiguration, designer: &DesignerConfig) -> Self {
        Self::with_mode(config, designer, SceneMode::FunctionalAreas)
    }

    pub fn with_mode(
        mut config: MissionConfiguration,
        designer: &DesignerConfig,
        mode: SceneMode,
    ) -> Self {
        let registry = match config.areas.take() {
            Some(areas) => AreaRegistry::new(areas),
            None => AreaRegistry::with_default_catalog(),
        };
        let mut assembler =
            SceneAssembler::new(designer.palette(), designer.scene_settings(mode));
        assembler.rebuild(&config.habitat, registry.areas());

        Self {
            config,
            registry,
            selection: AreaSelection::new(),
            placement: PlacementController::new(designer.containment_radius),
            assembler,
            resize_step: designer.resize_step,
            listeners: Vec::new(),
        }
    }

    // ── Queries ─────────────────────────────────────────────────────────

    /// Current configuration, without area snapshots (see [`Self::snapshot`]).
    pub fn configuration(&self) -> &MissionConfiguration {
        &self.config
    }

    pub fn habitat(&self) -> &HabitatDescriptor {
        &self.config.habitat
    }

    pub fn registry(&self) -> &AreaRegistry {
        &self.registry
    }

    pub fn selection(&self) -> &AreaSelection {
        &self.selection
    }

    pub fn placement(&self) -> &PlacementController {
        &self.placement
    }

    pub fn scene(&self) -> &SceneGraph {
        self.assembler.graph()
    }

    pub fn scene_revision(&self) -> u64 {
        self.assembler.revision()
    }

    pub fn scene_mode(&self) -> SceneMode {
        self.assembler.settings().mode
    }

    pub fn resize_step(&self) -> f32 {
        self.resize_step
    }

    pub fn is_dragging(&self) -> bool {
        self.placement.is_dragging()
    }

    pub fn summaries(&self) -> Vec<AreaSummary> {
        self.registry.summaries(self.config.crew_size)
    }

    /// Configuration with the current areas attached.
    pub fn snapshot(&self) -> MissionConfiguration {
        MissionConfiguration {
            areas: Some(self.registry.snapshot()),
            ..self.config.clone()
        }
    }

    // ── Habitat & mission ───────────────────────────────────────────────

    /// Replace the habitat descriptor and regenerate its geometry.
    pub fn set_habitat(&mut self, habitat: HabitatDescriptor) {
        if self.config.habitat == habitat {
            return;
        }
        self.config.habitat = habitat;
        self.assembler.refresh_habitat(&self.config.habitat);
    }

    pub fn set_shape(&mut self, shape: HabitatShape) {
        self.set_habitat(HabitatDescriptor {
            shape,
            ..self.config.habitat
        });
    }

    pub fn set_dimensions(&mut self, height: f32, width: f32) {
        self.set_habitat(HabitatDescriptor {
            height,
            width,
            ..self.config.habitat
        });
    }

    pub fn set_destination(&mut self, destination: Destination) {
        self.config.destination = destination;
    }

    pub fn set_duration(&mut self, days: i32) {
        self.config.duration_days = days;
    }

    /// Change crew size. Per-person ratios change, so listeners are notified.
    pub fn set_crew_size(&mut self, crew_size: i32) {
        if self.config.crew_size == crew_size {
            return;
        }
        self.config.crew_size = crew_size;
        self.notify();
    }

    /// Switch between the functional-area scene and the habitat preview.
    pub fn set_scene_mode(&mut self, mode: SceneMode) {
        if self.scene_mode() == mode {
            return;
        }
        self.placement.pointer_up();
        self.assembler.set_mode(mode);
        self.assembler.rebuild(&self.config.habitat, self.registry.areas());
    }

    // ── Areas ───────────────────────────────────────────────────────────

    pub fn resize_area(&mut self, id: &str, dimension: Dimension, delta: f32) -> bool {
        if !self.registry.resize(id, dimension, delta) {
            return false;
        }
        self.area_changed(id);
        true
    }

    /// Grow or shrink the focused area by one resize step.
    pub fn step_focused(&mut self, dimension: Dimension, grow: bool) -> bool {
        let delta = if grow {
            self.resize_step
        } else {
            -self.resize_step
        };
        match self.registry.focused().map(|a| a.id.clone()) {
            Some(id) => self.resize_area(&id, dimension, delta),
            None => false,
        }
    }

    pub fn focus_area(&mut self, id: &str) -> bool {
        self.registry.focus(id)
    }

    pub fn focus_next(&mut self) -> Option<&FunctionalArea> {
        self.registry.focus_next()
    }

    pub fn reposition_area(&mut self, id: &str, x: f32, z: f32) -> bool {
        if !self.registry.reposition(id, x, z) {
            return false;
        }
        self.area_changed(id);
        true
    }

    /// Flip a checklist item. Does not add or remove draggable areas.
    pub fn toggle_membership(&mut self, id: &str) -> bool {
        self.selection.toggle(id)
    }

    // ── Pointer ─────────────────────────────────────────────────────────

    pub fn pointer_down<P: Projection + ?Sized>(
        &mut self,
        ndc: Vec2,
        projection: &P,
    ) -> Option<String> {
        let scene = self.assembler.graph();
        self.placement
            .pointer_down(ndc, projection, scene)
            .map(str::to_string)
    }

    pub fn pointer_move<P: Projection + ?Sized>(
        &mut self,
        ndc: Vec2,
        projection: &P,
    ) -> DragOutcome {
        let outcome = self
            .placement
            .pointer_move(ndc, projection, &mut self.registry);
        if let DragOutcome::Moved { area_id, .. } = &outcome {
            self.area_changed(area_id);
        }
        outcome
    }

    pub fn pointer_up(&mut self) -> Option<String> {
        self.placement.pointer_up()
    }

    // ── Host interface ──────────────────────────────────────────────────

    /// Register a callback for area summaries.
    pub fn on_areas_update(&mut self, listener: impl FnMut(&[AreaSummary]) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Detach every area listener.
    pub fn clear_listeners(&mut self) {
        self.listeners.clear();
    }

    /// Snapshot the design and score it.
    pub fn finalize(&self) -> FinalizedDesign {
        let configuration = self.snapshot();
        let report = score(&configuration);
        let validation = validate_configuration(&configuration);
        log::info!(
            "design finalized: {} habitat for {} crew, score {}",
            configuration.habitat.shape,
            configuration.crew_size,
            report.score
        );
        FinalizedDesign {
            summaries: self.summaries(),
            configuration,
            report,
            validation,
        }
    }

    fn area_changed(&mut self, id: &str) {
        if let Some(area) = self.registry.get(id) {
            self.assembler.refresh_area(area);
        }
        self.notify();
    }

    fn notify(&mut self) {
        if self.listeners.is_empty() {
            return;
        }
        let summaries = self.summaries();
        for listener in &mut self.listeners {
            listener(&summaries);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::areas::AreaStatus;
    use crate::scene::{assemble, HABITAT_TAG};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn session() -> DesignSession {
        DesignSession::new(MissionConfiguration::default(), &DesignerConfig::default())
    }

    fn recorder(session: &mut DesignSession) -> Rc<RefCell<Vec<Vec<AreaSummary>>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        session.on_areas_update(move |s| sink.borrow_mut().push(s.to_vec()));
        log
    }

    #[test]
    fn starts_with_default_catalog_and_scene() {
        let s = session();
        assert_eq!(s.registry().len(), 6);
        assert!(s.scene().find(HABITAT_TAG).is_some());
        assert_eq!(s.scene().area_volumes().count(), 6);
        assert_eq!(s.scene_revision(), 1);
    }

    #[test]
    fn host_areas_replace_catalog() {
        let areas = vec![crate::areas::default_catalog().remove(2)];
        let config = MissionConfiguration::default().with_areas(areas);
        let s = DesignSession::new(config, &DesignerConfig::default());
        assert_eq!(s.registry().len(), 1);
        assert!(s.configuration().areas.is_none());
        assert!(s.snapshot().areas.is_some());
    }

    #[test]
    fn resize_patches_scene_then_notifies() {
        let mut s = session();
        let log = recorder(&mut s);
        assert!(s.resize_area("sleep", Dimension::Width, 2.0));
        let node = s.scene().area_node("sleep").unwrap();
        let bounds = node.mesh.as_ref().unwrap().bounds();
        assert!((bounds.size().x - 4.0).abs() < 1e-5);

        let calls = log.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0][0].size.width, 4.0);
    }

    #[test]
    fn noop_mutations_do_not_notify() {
        let mut s = session();
        let log = recorder(&mut s);
        assert!(!s.resize_area("unknown", Dimension::Width, 1.0));
        assert!(!s.reposition_area("unknown", 1.0, 1.0));
        s.set_crew_size(16);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn crew_change_reclassifies() {
        let mut s = session();
        let log = recorder(&mut s);
        s.set_crew_size(1);
        let calls = log.borrow();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].iter().all(|a| a.status == AreaStatus::Large));
    }

    #[test]
    fn shape_change_regenerates_habitat() {
        let mut s = session();
        let before = s.scene_revision();
        s.set_shape(HabitatShape::Wheel);
        assert_eq!(s.scene_revision(), before + 1);
        assert!(!s.scene().habitat().unwrap().children.is_empty());
        s.set_shape(HabitatShape::Wheel);
        assert_eq!(s.scene_revision(), before + 1, "same shape is a no-op");
    }

    #[test]
    fn scene_matches_fresh_assembly_after_edits() {
        let mut s = session();
        s.set_dimensions(20.0, 8.0);
        s.resize_area("galley", Dimension::Height, -0.5);
        s.reposition_area("eclss", 5.0, 5.0);
        s.focus_area("hygiene");
        s.step_focused(Dimension::Depth, true);
        let designer = DesignerConfig::default();
        let fresh = assemble(
            s.habitat(),
            s.registry().areas(),
            &designer.palette(),
            &designer.scene_settings(SceneMode::FunctionalAreas),
        );
        assert_eq!(s.scene(), &fresh);
        assert_eq!(s.registry().get("hygiene").unwrap().size.depth, 2.5);
    }

    #[test]
    fn toggling_membership_leaves_registry_alone() {
        let mut s = session();
        let before = s.registry().clone();
        assert!(s.toggle_membership("power"));
        assert!(s.toggle_membership("exercise"));
        assert!(!s.toggle_membership("power"));
        assert_eq!(s.registry(), &before);
        assert_eq!(s.selection().len(), 1);
    }

    #[test]
    fn preview_mode_drops_areas() {
        let mut s = session();
        s.set_scene_mode(SceneMode::HabitatPreview);
        assert_eq!(s.scene().area_volumes().count(), 0);
        // Area edits still reach the registry.
        assert!(s.resize_area("sleep", Dimension::Width, 1.0));
        assert_eq!(s.scene().area_volumes().count(), 0);
        s.set_scene_mode(SceneMode::FunctionalAreas);
        assert_eq!(s.scene().area_volumes().count(), 6);
    }

    #[test]
    fn finalize_scores_snapshot() {
        let s = session();
        let done = s.finalize();
        // Six 2×2 areas at crew 16 are all too small; cylinder 10×5 gives
        // 3.125 m² per crew over 50 days.
        assert_eq!(done.report.score, 0);
        assert_eq!(done.report.issues.len(), 7);
        assert_eq!(done.summaries.len(), 6);
        assert!(done.validation.is_empty());
        assert_eq!(done.configuration.areas.as_ref().map(Vec::len), Some(6));
    }
}
