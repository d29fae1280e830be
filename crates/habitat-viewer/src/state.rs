//! Shared state for the habitat viewer.
//!
//! The design view owns area listeners (boxed `FnMut` closures), so it lives
//! in a non-send resource and is only touched from the main thread.

use std::cell::RefCell;
use std::rc::Rc;

use bevy::prelude::*;
use habitat_logic::areas::AreaSummary;
use habitat_logic::config::DesignerConfig;
use habitat_logic::placement::PerspectiveCamera;
use habitat_logic::scene::{SceneGraph, SceneNode};
use habitat_logic::session::{DesignSession, FinalizedDesign};
use habitat_logic::view::{DesignView, Frame, RenderTarget, Viewport};

// ── Render target ───────────────────────────────────────────────────────

/// Collects what the design view hands over each frame so Bevy systems can
/// mirror it into entities and gizmos.
#[derive(Debug, Default)]
pub struct BevyTarget {
    pub viewport: Option<Viewport>,
    pub scene: Option<SceneGraph>,
    pub scene_revision: Option<u64>,
    pub camera: PerspectiveCamera,
    pub habitat_rotation: Quat,
    pub released: bool,
}

impl RenderTarget for BevyTarget {
    fn resize(&mut self, viewport: Viewport) {
        self.viewport = Some(viewport);
    }

    fn draw(&mut self, frame: &Frame<'_>) {
        if self.scene_revision != Some(frame.scene_revision) {
            self.scene = Some(frame.scene.clone());
            self.scene_revision = Some(frame.scene_revision);
        }
        self.camera = *frame.camera;
        self.habitat_rotation = frame.habitat_rotation;
    }

    fn release(&mut self) {
        self.scene = None;
        self.scene_revision = None;
        self.released = true;
    }
}

// ── Designer resource (non-send) ────────────────────────────────────────

/// Which scene the world currently mirrors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorKey {
    Design(u64),
    Report,
}

pub struct Designer {
    pub view: Option<DesignView<BevyTarget>>,
    pub config: DesignerConfig,
    /// Latest payload of the area listener.
    pub summaries: Rc<RefCell<Vec<AreaSummary>>>,
    pub finalized: Option<FinalizedDesign>,
    pub report_scene: Option<SceneGraph>,
    pub show_report: bool,
}

impl Designer {
    pub fn new(mut session: DesignSession, config: DesignerConfig) -> Self {
        let summaries = Rc::new(RefCell::new(session.summaries()));
        let sink = Rc::clone(&summaries);
        session.on_areas_update(move |latest| *sink.borrow_mut() = latest.to_vec());

        let view = DesignView::new(session, BevyTarget::default(), &config);
        Self {
            view: Some(view),
            config,
            summaries,
            finalized: None,
            report_scene: None,
            show_report: false,
        }
    }

    pub fn mirror_key(&self) -> Option<MirrorKey> {
        if self.show_report && self.report_scene.is_some() {
            return Some(MirrorKey::Report);
        }
        self.view
            .as_ref()
            .and_then(|v| v.target().scene_revision)
            .map(MirrorKey::Design)
    }

    /// Scene currently on screen: the report preview or the design scene.
    pub fn displayed_scene(&self) -> Option<&SceneGraph> {
        if self.show_report {
            if let Some(report) = &self.report_scene {
                return Some(report);
            }
        }
        self.view.as_ref().and_then(|v| v.target().scene.as_ref())
    }

    pub fn habitat_rotation(&self) -> Quat {
        match &self.view {
            Some(view) if !self.show_report => view.target().habitat_rotation,
            _ => Quat::IDENTITY,
        }
    }
}

// ── Scene mirror ────────────────────────────────────────────────────────

/// Top-level scene nodes currently mirrored into entities, slot by slot.
#[derive(Default)]
pub struct SceneMirror {
    pub key: Option<MirrorKey>,
    pub nodes: Vec<SceneNode>,
    pub entities: Vec<Vec<Entity>>,
}

impl SceneMirror {
    /// Despawn everything and forget the mirrored nodes.
    pub fn clear(&mut self, commands: &mut Commands) {
        for entity in self.entities.drain(..).flatten() {
            commands.entity(entity).despawn();
        }
        self.nodes.clear();
    }
}

/// Slots whose top-level node differs between two scenes, ascending. A slot
/// present in only one of them counts as changed.
pub fn changed_slots(previous: &[SceneNode], next: &[SceneNode]) -> Vec<usize> {
    (0..previous.len().max(next.len()))
        .filter(|&i| previous.get(i) != next.get(i))
        .collect()
}

// ── Components ──────────────────────────────────────────────────────────

/// Entity spawned from a scene node; despawned when its slot changes.
#[derive(Component)]
pub struct SceneEntity;

/// Habitat part that follows the preview spin. Holds the unrotated transform.
#[derive(Component)]
pub struct HabitatSpin {
    pub base: Transform,
}

#[derive(Component)]
pub struct DesignCamera;

#[derive(Component)]
pub struct HudText;

#[derive(Component)]
pub struct AreaPanel;

#[derive(Component)]
pub struct ReportPanel;
