//! Input handling: window lifecycle, mouse dragging and keyboard controls.

use bevy::prelude::*;
use bevy::window::{PrimaryWindow, WindowResized};
use habitat_logic::areas::Dimension;
use habitat_logic::mission::{Destination, CREW_RANGE, DIMENSION_RANGE, DURATION_RANGE};
use habitat_logic::placement::DragOutcome;
use habitat_logic::preview::assemble_report_preview;
use habitat_logic::scene::SceneMode;
use habitat_logic::shapes::{HabitatDescriptor, HabitatShape};
use habitat_logic::view::{ViewError, Viewport};

use crate::state::Designer;

/// Habitat height/width change per arrow-key press (meters).
const DIMENSION_STEP: f32 = 1.0;
/// Mission duration change per bracket-key press (days).
const DURATION_STEP: i32 = 5;

fn window_viewport(window: &Window) -> Viewport {
    Viewport::new(window.width() as u32, window.height() as u32)
}

/// Mount the design view into the primary window.
pub fn mount_view(
    mut designer: NonSendMut<Designer>,
    windows: Query<&Window, With<PrimaryWindow>>,
) {
    let Ok(window) = windows.get_single() else {
        warn!("No primary window, design view stays unmounted");
        return;
    };
    let Some(view) = designer.view.as_mut() else {
        return;
    };
    match view.mount(window_viewport(window)) {
        Ok(()) => info!("Design view mounted at {}x{}", window.width(), window.height()),
        Err(ViewError::ZeroViewport) => warn!("Window has no area yet, mount deferred"),
        Err(e) => warn!("Mount skipped: {}", e),
    }
}

pub fn handle_resize(mut designer: NonSendMut<Designer>, mut events: EventReader<WindowResized>) {
    let Some(view) = designer.view.as_mut() else {
        events.clear();
        return;
    };
    for event in events.read() {
        let viewport = Viewport::new(event.width as u32, event.height as u32);
        if let Err(e) = view.resize(viewport) {
            debug!("Resize to {:?} skipped: {}", viewport, e);
        }
    }
}

/// Left button drags functional areas across the ground plane.
pub fn handle_pointer(
    mut designer: NonSendMut<Designer>,
    buttons: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
) {
    if designer.show_report {
        return;
    }
    let Some(view) = designer.view.as_mut() else {
        return;
    };
    let cursor = windows.get_single().ok().and_then(Window::cursor_position);

    if let Some(cursor) = cursor {
        if buttons.just_pressed(MouseButton::Left) {
            if let Some(id) = view.pointer_down_px(cursor) {
                info!("Dragging {}", id);
            }
        } else if buttons.pressed(MouseButton::Left) && view.session().is_dragging() {
            if let DragOutcome::OutsideRadius { area_id, distance } = view.pointer_move_px(cursor)
            {
                trace!("{} held back at {:.1} m", area_id, distance);
            }
        }
    }

    if buttons.just_released(MouseButton::Left) {
        view.pointer_up();
    }
}

/// Keyboard controls.
///
/// 1-5 shape, arrows habitat size, Tab focus next area, Q/A W/S E/D resize
/// the focused area, +/- crew, [ ] duration, T destination, P preview mode,
/// O orbit, Enter finalize, R report preview, Escape quit.
pub fn handle_keyboard(
    mut designer: NonSendMut<Designer>,
    keyboard: Res<ButtonInput<KeyCode>>,
    mut app_exit: EventWriter<AppExit>,
) {
    if keyboard.just_pressed(KeyCode::Escape) {
        if let Some(view) = designer.view.take() {
            let session = view.teardown();
            match session.snapshot().to_json_pretty() {
                Ok(json) => info!("Final design:\n{}", json),
                Err(e) => warn!("Could not export design: {}", e),
            }
        }
        app_exit.send(AppExit::Success);
        return;
    }

    if keyboard.just_pressed(KeyCode::KeyR) {
        designer.show_report = !designer.show_report && designer.report_scene.is_some();
    }

    if keyboard.just_pressed(KeyCode::Enter) {
        finalize(&mut designer);
    }

    let Some(view) = designer.view.as_mut() else {
        return;
    };

    let shape_keys = [
        KeyCode::Digit1,
        KeyCode::Digit2,
        KeyCode::Digit3,
        KeyCode::Digit4,
        KeyCode::Digit5,
    ];
    for (i, key) in shape_keys.iter().enumerate() {
        if keyboard.just_pressed(*key) {
            view.session_mut().set_shape(HabitatShape::from_u8(i as u8));
        }
    }

    if keyboard.just_pressed(KeyCode::KeyP) {
        let mode = match view.session().scene_mode() {
            SceneMode::FunctionalAreas => SceneMode::HabitatPreview,
            SceneMode::HabitatPreview => SceneMode::FunctionalAreas,
        };
        view.session_mut().set_scene_mode(mode);
    }
    if keyboard.just_pressed(KeyCode::KeyO) {
        let enabled = !view.orbit().enabled;
        view.set_orbit_enabled(enabled);
    }

    let session = view.session_mut();

    // Habitat dimensions
    let pressed = |key| i32::from(keyboard.just_pressed(key));
    let height_steps = pressed(KeyCode::ArrowUp) - pressed(KeyCode::ArrowDown);
    let width_steps = pressed(KeyCode::ArrowRight) - pressed(KeyCode::ArrowLeft);
    if let Some((height, width)) = stepped_dimensions(session.habitat(), height_steps, width_steps)
    {
        session.set_dimensions(height, width);
    }

    // Focused area
    if keyboard.just_pressed(KeyCode::Tab) {
        if let Some(area) = session.focus_next() {
            info!("Focused {}", area.name);
        }
    }
    let resize_keys = [
        (KeyCode::KeyQ, Dimension::Width, true),
        (KeyCode::KeyA, Dimension::Width, false),
        (KeyCode::KeyW, Dimension::Height, true),
        (KeyCode::KeyS, Dimension::Height, false),
        (KeyCode::KeyE, Dimension::Depth, true),
        (KeyCode::KeyD, Dimension::Depth, false),
    ];
    for (key, dimension, grow) in resize_keys {
        if keyboard.just_pressed(key) {
            session.step_focused(dimension, grow);
        }
    }

    // Mission parameters
    let config = session.configuration();
    let (crew, days, destination) = (config.crew_size, config.duration_days, config.destination);
    if keyboard.just_pressed(KeyCode::Equal) || keyboard.just_pressed(KeyCode::NumpadAdd) {
        session.set_crew_size((crew + 1).clamp(CREW_RANGE.0, CREW_RANGE.1));
    }
    if keyboard.just_pressed(KeyCode::Minus) || keyboard.just_pressed(KeyCode::NumpadSubtract) {
        session.set_crew_size((crew - 1).clamp(CREW_RANGE.0, CREW_RANGE.1));
    }
    if keyboard.just_pressed(KeyCode::BracketRight) {
        session.set_duration((days + DURATION_STEP).clamp(DURATION_RANGE.0, DURATION_RANGE.1));
    }
    if keyboard.just_pressed(KeyCode::BracketLeft) {
        session.set_duration((days - DURATION_STEP).clamp(DURATION_RANGE.0, DURATION_RANGE.1));
    }
    if keyboard.just_pressed(KeyCode::KeyT) {
        let all = Destination::all();
        let next = all
            .iter()
            .position(|d| *d == destination)
            .map_or(0, |i| (i + 1) % all.len());
        session.set_destination(all[next]);
        info!("Destination: {}", all[next]);
    }
}

/// Arrow-key nudge of the habitat dimensions. Only a stepped axis is clamped
/// into range; `None` when no arrow was pressed.
fn stepped_dimensions(
    habitat: &HabitatDescriptor,
    height_steps: i32,
    width_steps: i32,
) -> Option<(f32, f32)> {
    if height_steps == 0 && width_steps == 0 {
        return None;
    }
    let (min_dim, max_dim) = DIMENSION_RANGE;
    let step = |value: f32, steps: i32| {
        if steps == 0 {
            value
        } else {
            (value + steps as f32 * DIMENSION_STEP).clamp(min_dim, max_dim)
        }
    };
    Some((
        step(habitat.height, height_steps),
        step(habitat.width, width_steps),
    ))
}

/// Score the current design, log the report and build its preview scene.
fn finalize(designer: &mut Designer) {
    let Some(view) = designer.view.as_ref() else {
        return;
    };
    let finalized = view.session().finalize();
    let report = &finalized.report;

    info!(
        "Mission report: {} / 100 ({})",
        report.score,
        report.rating()
    );
    for issue in &report.issues {
        info!("  issue: {}", issue);
    }
    for suggestion in &report.suggestions {
        info!("  suggestion: {}", suggestion);
    }
    for issue in &finalized.validation {
        warn!("  out of range: {}", issue);
    }

    designer.report_scene = Some(assemble_report_preview(
        &finalized.configuration,
        &designer.config.palette(),
    ));
    designer.finalized = Some(finalized);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_frames_leave_loaded_dimensions_alone() {
        let habitat = HabitatDescriptor::new(HabitatShape::Cube, 250.0, 0.5);
        assert_eq!(stepped_dimensions(&habitat, 0, 0), None);
    }

    #[test]
    fn arrow_steps_clamp_only_the_stepped_axis() {
        let habitat = HabitatDescriptor::new(HabitatShape::Cube, 250.0, 0.5);
        assert_eq!(stepped_dimensions(&habitat, 0, 1), Some((250.0, 1.5)));
        assert_eq!(stepped_dimensions(&habitat, -1, 0), Some((100.0, 0.5)));

        let default = HabitatDescriptor::default();
        assert_eq!(
            stepped_dimensions(&default, 1, -1),
            Some((default.height + 1.0, default.width - 1.0))
        );
    }
}
