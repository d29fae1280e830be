//! Habitat Viewer - Bevy front end for the habitat designer
//!
//! Usage:
//!   cargo run -p habitat-viewer
//!   cargo run -p habitat-viewer -- --config designer.json --design design.json --preview

mod input;
mod rendering;
mod state;
mod ui;

use bevy::prelude::*;
use habitat_logic::config::DesignerConfig;
use habitat_logic::mission::MissionConfiguration;
use habitat_logic::scene::SceneMode;
use habitat_logic::session::DesignSession;

use state::{DesignCamera, Designer};

struct LaunchOptions {
    design: Option<String>,
    preview: bool,
}

impl LaunchOptions {
    fn from_args(args: &[String]) -> Self {
        let mut options = LaunchOptions {
            design: None,
            preview: false,
        };
        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--design" if i + 1 < args.len() => {
                    i += 1;
                    options.design = Some(args[i].clone());
                }
                "--preview" => options.preview = true,
                _ => {}
            }
            i += 1;
        }
        options
    }
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let options = LaunchOptions::from_args(&args);

    let config = match DesignerConfig::from_args() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load designer config: {}", e);
            std::process::exit(2);
        }
    };
    let mission = match &options.design {
        Some(path) => match MissionConfiguration::load(path) {
            Ok(mission) => mission,
            Err(e) => {
                eprintln!("Failed to load design {}: {}", path, e);
                std::process::exit(2);
            }
        },
        None => MissionConfiguration::default(),
    };
    let mode = if options.preview {
        SceneMode::HabitatPreview
    } else {
        SceneMode::FunctionalAreas
    };
    let session = DesignSession::with_mode(mission, &config, mode);

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Habitat Designer".to_string(),
                resolution: (1280.0, 720.0).into(),
                present_mode: bevy::window::PresentMode::AutoVsync,
                ..default()
            }),
            ..default()
        }))
        .insert_non_send_resource(Designer::new(session, config))
        .insert_resource(ClearColor(Color::BLACK))
        .add_systems(Startup, (setup_camera, ui::setup_ui, input::mount_view))
        .add_systems(
            Update,
            (
                input::handle_resize,
                input::handle_keyboard,
                input::handle_pointer,
                advance_view,
                rendering::sync_scene,
                rendering::apply_spin,
                rendering::sync_camera,
                rendering::draw_outlines,
                ui::render_hud,
            )
                .chain(),
        )
        .run();
}

fn setup_camera(mut commands: Commands, designer: NonSend<Designer>) {
    let camera = designer.config.camera(16.0 / 9.0);
    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: camera.fov_y_degrees.to_radians(),
            near: camera.near,
            far: camera.far,
            ..default()
        }),
        Transform::from_translation(camera.position).looking_at(camera.target, camera.up),
        DesignCamera,
    ));

    commands.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: 400.0,
    });

    commands.spawn((
        DirectionalLight {
            illuminance: 3000.0,
            shadows_enabled: false,
            ..default()
        },
        Transform::from_xyz(10.0, 10.0, 5.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}

/// Advance the orbit/spin and hand the current scene to the target.
fn advance_view(time: Res<Time>, mut designer: NonSendMut<Designer>) {
    let Some(view) = designer.view.as_mut() else {
        return;
    };
    if let Err(e) = view.frame(time.delta_secs()) {
        trace!("Frame skipped: {}", e);
    }
}
