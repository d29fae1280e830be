//! View lifecycle and the per-frame render loop.
//!
//! A [`DesignView`] binds a [`DesignSession`] to a [`RenderTarget`]. It is
//! created unmounted; [`DesignView::mount`] succeeds once the container has
//! a non-zero size, and a failed mount is retried on the next
//! [`DesignView::resize`]. While mounted, [`DesignView::frame`] advances the
//! auto-orbit and hands the current scene to the target.
//!
//! Teardown consumes the view: the target releases its resources, listeners
//! are detached and the session is handed back. No frame can be requested
//! afterwards because there is no view left to request it from.

use std::fmt;

use glam::{Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::config::DesignerConfig;
use crate::placement::{pointer_to_ndc, DragOutcome, PerspectiveCamera};
use crate::scene::{SceneGraph, SceneMode};
use crate::session::DesignSession;

/// Self-rotation of the habitat in preview mode (radians per second, both
/// the X and Y axes).
pub const PREVIEW_SPIN_RATE: f32 = 0.3;

// ============================================================================
// TYPES
// ============================================================================

/// Container size in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }
}

/// Slow azimuthal camera rotation around the vertical axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrbitCamera {
    pub radius: f32,
    pub height: f32,
    /// Radians per second.
    pub angular_speed: f32,
    pub angle: f32,
    pub enabled: bool,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            radius: 20.0,
            height: 10.0,
            angular_speed: 0.1,
            angle: 0.0,
            enabled: true,
        }
    }
}

impl OrbitCamera {
    pub fn advance(&mut self, dt: f32) {
        if dt.is_finite() && dt > 0.0 {
            self.angle = (self.angle + self.angular_speed * dt) % std::f32::consts::TAU;
        }
    }

    pub fn position(&self) -> Vec3 {
        Vec3::new(
            self.angle.cos() * self.radius,
            self.height,
            self.angle.sin() * self.radius,
        )
    }
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub index: u64,
    pub scene: &'a SceneGraph,
    /// Changes whenever the scene graph was patched or rebuilt.
    pub scene_revision: u64,
    pub camera: &'a PerspectiveCamera,
    /// Extra rotation for the habitat node (preview spin).
    pub habitat_rotation: Quat,
}

/// Backend that draws frames and owns GPU-side resources.
pub trait RenderTarget {
    /// Container size changed (also called once on mount).
    fn resize(&mut self, _viewport: Viewport) {}

    fn draw(&mut self, frame: &Frame<'_>);

    /// Free every resource. Called exactly once, on teardown.
    fn release(&mut self);
}

/// A lifecycle call skipped by a precondition guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewError {
    NotMounted,
    ZeroViewport,
}

impl fmt::Display for ViewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewError::NotMounted => write!(f, "view is not mounted"),
            ViewError::ZeroViewport => write!(f, "viewport has zero width or height"),
        }
    }
}

impl std::error::Error for ViewError {}

// ============================================================================
// VIEW
// ============================================================================

pub struct DesignView<R: RenderTarget> {
    session: DesignSession,
    target: R,
    camera: PerspectiveCamera,
    orbit: OrbitCamera,
    viewport: Viewport,
    mounted: bool,
    frame_index: u64,
    spin: f32,
}

impl<R: RenderTarget> DesignView<R> {
    pub fn new(session: DesignSession, target: R, designer: &DesignerConfig) -> Self {
        Self {
            session,
            target,
            camera: designer.camera(1.0),
            orbit: designer.orbit_camera(),
            viewport: Viewport::default(),
            mounted: false,
            frame_index: 0,
            spin: 0.0,
        }
    }

    pub fn session(&self) -> &DesignSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut DesignSession {
        &mut self.session
    }

    pub fn target(&self) -> &R {
        &self.target
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn orbit(&self) -> &OrbitCamera {
        &self.orbit
    }

    pub fn set_orbit_enabled(&mut self, enabled: bool) {
        self.orbit.enabled = enabled;
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Attach to a container of the given size.
    pub fn mount(&mut self, viewport: Viewport) -> Result<(), ViewError> {
        if viewport.is_empty() {
            log::warn!(
                "skipping view mount: container is {}x{}",
                viewport.width,
                viewport.height
            );
            return Err(ViewError::ZeroViewport);
        }
        self.apply_viewport(viewport);
        if !self.mounted {
            self.mounted = true;
            log::info!("design view mounted at {}x{}", viewport.width, viewport.height);
        }
        Ok(())
    }

    /// Container resized. Retries a mount that was skipped earlier.
    pub fn resize(&mut self, viewport: Viewport) -> Result<(), ViewError> {
        if !self.mounted {
            return self.mount(viewport);
        }
        if viewport.is_empty() {
            return Err(ViewError::ZeroViewport);
        }
        self.apply_viewport(viewport);
        Ok(())
    }

    fn apply_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.camera.set_aspect(viewport.width as f32, viewport.height as f32);
        self.target.resize(viewport);
    }

    /// Advance animation by `dt` seconds and draw one frame.
    ///
    /// The orbit holds still while an area is being dragged so the pointer
    /// ray stays stable under the cursor.
    pub fn frame(&mut self, dt: f32) -> Result<u64, ViewError> {
        if !self.mounted {
            return Err(ViewError::NotMounted);
        }

        if self.orbit.enabled && !self.session.is_dragging() {
            self.orbit.advance(dt);
            self.camera.look_at(self.orbit.position(), Vec3::ZERO);
        }

        let habitat_rotation = if self.session.scene_mode() == SceneMode::HabitatPreview {
            if dt.is_finite() && dt > 0.0 {
                self.spin = (self.spin + PREVIEW_SPIN_RATE * dt) % std::f32::consts::TAU;
            }
            Quat::from_rotation_y(self.spin) * Quat::from_rotation_x(self.spin)
        } else {
            Quat::IDENTITY
        };

        let frame = Frame {
            index: self.frame_index,
            scene: self.session.scene(),
            scene_revision: self.session.scene_revision(),
            camera: &self.camera,
            habitat_rotation,
        };
        self.target.draw(&frame);
        self.frame_index += 1;
        Ok(frame.index)
    }

    // ── Pointer input (normalized device coordinates) ───────────────────

    pub fn pointer_down(&mut self, ndc: Vec2) -> Option<String> {
        self.session.pointer_down(ndc, &self.camera)
    }

    pub fn pointer_move(&mut self, ndc: Vec2) -> DragOutcome {
        self.session.pointer_move(ndc, &self.camera)
    }

    pub fn pointer_up(&mut self) -> Option<String> {
        self.session.pointer_up()
    }

    // ── Pointer input (container pixels, origin top-left) ───────────────

    pub fn pointer_down_px(&mut self, pixel: Vec2) -> Option<String> {
        let ndc = pointer_to_ndc(pixel, self.viewport.size())?;
        self.pointer_down(ndc)
    }

    pub fn pointer_move_px(&mut self, pixel: Vec2) -> DragOutcome {
        match pointer_to_ndc(pixel, self.viewport.size()) {
            Some(ndc) => self.pointer_move(ndc),
            None => DragOutcome::NoGroundHit,
        }
    }

    /// Release the render target and listeners, returning the session.
    pub fn teardown(mut self) -> DesignSession {
        self.session.pointer_up();
        self.target.release();
        self.session.clear_listeners();
        log::info!("design view torn down after {} frames", self.frame_index);
        self.session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mission::MissionConfiguration;
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Recorder {
        frames: Vec<(u64, u64, Vec3)>,
        resizes: Vec<Viewport>,
        released: Rc<Cell<u32>>,
    }

    impl RenderTarget for Recorder {
        fn resize(&mut self, viewport: Viewport) {
            self.resizes.push(viewport);
        }

        fn draw(&mut self, frame: &Frame<'_>) {
            self.frames
                .push((frame.index, frame.scene_revision, frame.camera.position));
        }

        fn release(&mut self) {
            self.released.set(self.released.get() + 1);
        }
    }

    fn view() -> DesignView<Recorder> {
        let designer = DesignerConfig::default();
        let session = DesignSession::new(MissionConfiguration::default(), &designer);
        DesignView::new(session, Recorder::default(), &designer)
    }

    #[test]
    fn zero_viewport_skips_mount_until_resize() {
        let mut v = view();
        assert_eq!(v.mount(Viewport::new(0, 600)), Err(ViewError::ZeroViewport));
        assert!(!v.is_mounted());
        assert_eq!(v.frame(0.016), Err(ViewError::NotMounted));
        assert!(v.target().frames.is_empty());

        assert_eq!(v.resize(Viewport::new(800, 600)), Ok(()));
        assert!(v.is_mounted());
        assert!((v.camera().aspect - 800.0 / 600.0).abs() < 1e-6);
        assert_eq!(v.frame(0.016), Ok(0));
        assert_eq!(v.target().frames.len(), 1);
    }

    #[test]
    fn orbit_advances_and_looks_at_origin() {
        let mut v = view();
        v.mount(Viewport::new(100, 100)).unwrap();
        v.frame(1.0).unwrap();
        let p = v.camera().position;
        assert!((p.y - 10.0).abs() < 1e-6);
        assert!((Vec2::new(p.x, p.z).length() - 20.0).abs() < 1e-4);
        assert!((v.orbit().angle - 0.1).abs() < 1e-6);
        assert_eq!(v.camera().target, Vec3::ZERO);
    }

    #[test]
    fn orbit_pauses_while_dragging() {
        let mut v = view();
        v.set_orbit_enabled(false);
        v.mount(Viewport::new(800, 800)).unwrap();
        // Look straight at "exercise" from above and in front.
        v.camera.look_at(Vec3::new(0.0, 12.0, 6.0), Vec3::new(0.0, -3.0, 0.0));
        assert_eq!(v.pointer_down(Vec2::ZERO).as_deref(), Some("exercise"));

        v.set_orbit_enabled(true);
        let before = v.camera().position;
        v.frame(1.0).unwrap();
        assert_eq!(v.camera().position, before);
        v.pointer_up();
        v.frame(1.0).unwrap();
        assert_ne!(v.camera().position, before);
    }

    #[test]
    fn frames_carry_scene_revision() {
        let mut v = view();
        v.mount(Viewport::new(640, 480)).unwrap();
        v.frame(0.016).unwrap();
        v.session_mut()
            .resize_area("sleep", crate::areas::Dimension::Width, 1.0);
        v.frame(0.016).unwrap();
        let frames = &v.target().frames;
        assert_eq!(frames[0].0, 0);
        assert_eq!(frames[1].0, 1);
        assert_eq!(frames[1].1, frames[0].1 + 1);
    }

    #[test]
    fn teardown_releases_target_and_listeners() {
        let mut v = view();
        let released = Rc::clone(&v.target().released);
        v.session_mut().on_areas_update(|_| {});
        v.mount(Viewport::new(10, 10)).unwrap();
        v.pointer_down_px(Vec2::new(5.0, 5.0));

        let session = v.teardown();
        assert_eq!(released.get(), 1);
        assert_eq!(session.listener_count(), 0);
        assert!(!session.is_dragging());

        // Remounting a fresh view on the same session works.
        let designer = DesignerConfig::default();
        let mut again = DesignView::new(session, Recorder::default(), &designer);
        again.mount(Viewport::new(10, 10)).unwrap();
        assert_eq!(again.frame(0.0), Ok(0));
    }

    #[test]
    fn resize_to_zero_keeps_previous_viewport() {
        let mut v = view();
        v.mount(Viewport::new(300, 200)).unwrap();
        assert_eq!(v.resize(Viewport::new(300, 0)), Err(ViewError::ZeroViewport));
        assert_eq!(v.viewport(), Viewport::new(300, 200));
        assert_eq!(v.target().resizes, [Viewport::new(300, 200)]);
    }
}
