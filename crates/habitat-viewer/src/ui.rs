//! HUD overlay: mission parameters, area summaries and the last report.

use std::fmt::Write as _;

use bevy::prelude::*;
use habitat_logic::areas::AreaStatus;

use crate::rendering::rgb_color;
use crate::state::{AreaPanel, Designer, HudText, ReportPanel};

const CONTROLS: &str = "1-5 shape | arrows size | Tab focus | Q/A W/S E/D resize | +/- crew \
                        | [ ] days | T destination | P preview | O orbit | Enter finalize \
                        | R report | Esc quit";

pub fn setup_ui(mut commands: Commands) {
    // Mission parameters (top-left)
    commands.spawn((
        Text::new(""),
        TextFont {
            font_size: 14.0,
            ..default()
        },
        TextColor(Color::WHITE),
        Node {
            position_type: PositionType::Absolute,
            left: Val::Px(10.0),
            top: Val::Px(10.0),
            ..default()
        },
        HudText,
    ));

    // Area summaries (right side)
    commands.spawn((
        Text::new(""),
        TextFont {
            font_size: 13.0,
            ..default()
        },
        TextColor(Color::srgb(0.85, 0.9, 1.0)),
        Node {
            position_type: PositionType::Absolute,
            right: Val::Px(10.0),
            top: Val::Px(10.0),
            max_width: Val::Px(360.0),
            ..default()
        },
        AreaPanel,
    ));

    // Report (bottom-left)
    commands.spawn((
        Text::new(""),
        TextFont {
            font_size: 13.0,
            ..default()
        },
        TextColor(Color::WHITE),
        Node {
            position_type: PositionType::Absolute,
            left: Val::Px(10.0),
            bottom: Val::Px(10.0),
            max_width: Val::Px(720.0),
            ..default()
        },
        ReportPanel,
    ));
}

fn status_marker(status: AreaStatus) -> &'static str {
    match status {
        AreaStatus::Small => "!!",
        AreaStatus::Recommended => "~ ",
        AreaStatus::Large => "ok",
    }
}

pub fn render_hud(
    designer: NonSend<Designer>,
    mut hud: Query<&mut Text, (With<HudText>, Without<AreaPanel>, Without<ReportPanel>)>,
    mut areas: Query<&mut Text, (With<AreaPanel>, Without<HudText>, Without<ReportPanel>)>,
    mut report: Query<
        (&mut Text, &mut TextColor),
        (With<ReportPanel>, Without<HudText>, Without<AreaPanel>),
    >,
) {
    let Some(view) = &designer.view else {
        return;
    };
    let session = view.session();
    let config = session.configuration();

    if let Ok(mut text) = hud.get_single_mut() {
        let focused = session
            .registry()
            .focused()
            .map(|a| a.name.as_str())
            .unwrap_or("-");
        text.0 = format!(
            "{} habitat {:.0} x {:.0} m | {} | {} days | crew {}\n\
             Mode: {:?} | Focus: {}{}\n{}",
            config.habitat.shape,
            config.habitat.height,
            config.habitat.width,
            config.destination,
            config.duration_days,
            config.crew_size,
            session.scene_mode(),
            focused,
            if session.is_dragging() { " (dragging)" } else { "" },
            CONTROLS,
        );
    }

    if let Ok(mut text) = areas.get_single_mut() {
        let mut panel = String::from("Functional areas (m² per crew)\n");
        for summary in designer.summaries.borrow().iter() {
            let _ = writeln!(
                panel,
                "{} {:<32} {:>4.1} x {:>4.1} x {:>4.1}  {:>5.2}  {}",
                status_marker(summary.status),
                summary.name,
                summary.size.width,
                summary.size.height,
                summary.size.depth,
                summary.area_per_person,
                summary.status
            );
        }
        text.0 = panel;
    }

    if let Ok((mut text, mut color)) = report.get_single_mut() {
        match &designer.finalized {
            Some(finalized) => {
                let report = &finalized.report;
                let mut panel = format!(
                    "Mission success: {} / 100  {}{}\n",
                    report.score,
                    report.rating(),
                    if designer.show_report { "  [preview]" } else { "" }
                );
                for issue in &report.issues {
                    let _ = writeln!(panel, "  - {}", issue);
                }
                for suggestion in &report.suggestions {
                    let _ = writeln!(panel, "  + {}", suggestion);
                }
                text.0 = panel;
                color.0 = rgb_color(report.rating().color());
            }
            None => text.0.clear(),
        }
    }
}
