//! Mission success scoring.
//!
//! A fixed heuristic: start from 100, deduct points for cramped areas, a
//! cubic shell and insufficient living space on long missions, then clamp
//! to 0..=100. Every rule is evaluated against the unmodified
//! configuration, so deductions are independent of each other.
//!
//! | Finding | Deduction | Kind |
//! |---------|-----------|------|
//! | area below minimum per crew member | 15 each | issue |
//! | area between minimum and recommended | 5 each | suggestion |
//! | cubic habitat | 10 | issue |
//! | < 5 m² per crew member and > 30 days | 10 | issue |
//!
//! ```
//! use habitat_logic::mission::{Destination, MissionConfiguration};
//! use habitat_logic::scoring::score;
//! use habitat_logic::shapes::{HabitatDescriptor, HabitatShape};
//!
//! let config = MissionConfiguration::new(
//!     HabitatDescriptor::new(HabitatShape::Cube, 10.0, 5.0),
//!     Destination::Moon,
//!     50,
//!     16,
//! )
//! .with_areas(Vec::new());
//! assert_eq!(score(&config).score, 80);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::areas::AreaStatus;
use crate::mission::MissionConfiguration;
use crate::scene::Rgb;
use crate::shapes::HabitatShape;

pub const BASELINE_SCORE: i32 = 100;
pub const SMALL_AREA_PENALTY: i32 = 15;
pub const BORDERLINE_AREA_PENALTY: i32 = 5;
pub const CUBE_PENALTY: i32 = 10;
pub const CRAMPED_PENALTY: i32 = 10;

/// Below this many m² of habitat cross-section per crew member a long
/// mission is considered cramped.
pub const CRAMPED_SPACE_PER_CREW: f32 = 5.0;
/// Missions longer than this many days are long-duration.
pub const LONG_MISSION_DAYS: i32 = 30;

const CUBE_ISSUE: &str = "A cubic habitat is not optimal for space missions. \
    A cylindrical or spherical shape is recommended.";
const CRAMPED_ISSUE: &str = "Space per crew member is insufficient for long missions \
    and could lead to cohabitation problems.";

/// Outcome of scoring a finalized design.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissionReport {
    /// 0..=100.
    pub score: u8,
    /// Hard problems, each of which cost points.
    pub issues: Vec<String>,
    /// Soft warnings.
    pub suggestions: Vec<String>,
}

impl MissionReport {
    pub fn rating(&self) -> ReportRating {
        ReportRating::from_score(self.score)
    }
}

/// Headline tier shown above the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportRating {
    Critical,
    NeedsImprovement,
    Acceptable,
    Excellent,
}

impl ReportRating {
    pub fn from_score(score: u8) -> Self {
        match score {
            85.. => Self::Excellent,
            70..=84 => Self::Acceptable,
            50..=69 => Self::NeedsImprovement,
            _ => Self::Critical,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent Design!",
            Self::Acceptable => "Acceptable Design",
            Self::NeedsImprovement => "Design Needs Improvement",
            Self::Critical => "Critical Design",
        }
    }

    /// Status colour: green, amber or red.
    pub fn color(&self) -> Rgb {
        match self {
            Self::Excellent => Rgb(0x4ADE80),
            Self::Acceptable => Rgb(0xFBBF24),
            Self::NeedsImprovement | Self::Critical => Rgb(0xEF4444),
        }
    }
}

impl fmt::Display for ReportRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Score a finalized design. Pure and deterministic.
///
/// A configuration without area snapshots (`areas: None`) is treated as
/// incomplete and returns the baseline with no findings.
pub fn score(config: &MissionConfiguration) -> MissionReport {
    let Some(areas) = &config.areas else {
        return MissionReport {
            score: BASELINE_SCORE as u8,
            issues: Vec::new(),
            suggestions: Vec::new(),
        };
    };

    let mut total = BASELINE_SCORE;
    let mut issues = Vec::new();
    let mut suggestions = Vec::new();

    for area in areas {
        let per_person = area.area_per_person(config.crew_size);
        match area.status(config.crew_size) {
            AreaStatus::Small => {
                total -= SMALL_AREA_PENALTY;
                issues.push(format!(
                    "The {} module provides {:.1} m² per crew member, below the NASA \
                     recommendation for crew wellbeing.",
                    area.name.to_lowercase(),
                    per_person
                ));
            }
            AreaStatus::Recommended => {
                total -= BORDERLINE_AREA_PENALTY;
                suggestions.push(format!(
                    "The {} area is borderline. Consider enlarging it for more comfort.",
                    area.name.to_lowercase()
                ));
            }
            AreaStatus::Large => {}
        }
    }

    if config.habitat.shape == HabitatShape::Cube {
        total -= CUBE_PENALTY;
        issues.push(CUBE_ISSUE.to_string());
    }

    if config.space_per_crew() < CRAMPED_SPACE_PER_CREW && config.duration_days > LONG_MISSION_DAYS
    {
        total -= CRAMPED_PENALTY;
        issues.push(CRAMPED_ISSUE.to_string());
    }

    let clamped = total.clamp(0, BASELINE_SCORE) as u8;
    log::debug!(
        "scored design: {} ({} issues, {} suggestions)",
        clamped,
        issues.len(),
        suggestions.len()
    );

    MissionReport {
        score: clamped,
        issues,
        suggestions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::areas::{AreaSize, FunctionalArea};
    use crate::mission::Destination;
    use crate::shapes::HabitatDescriptor;
    use glam::Vec3;

    fn area(id: &str, edge: f32, min: f32, rec: f32) -> FunctionalArea {
        FunctionalArea::new(id, id.to_uppercase(), AreaSize::cube(edge), Vec3::ZERO, min, rec)
    }

    fn roomy(crew: i32) -> MissionConfiguration {
        MissionConfiguration::new(
            HabitatDescriptor::new(HabitatShape::Cylinder, 20.0, 20.0),
            Destination::EarthOrbit,
            10,
            crew,
        )
    }

    #[test]
    fn missing_areas_scores_baseline() {
        let report = score(&MissionConfiguration {
            areas: None,
            ..roomy(0)
        });
        assert_eq!(report.score, 100);
        assert!(report.issues.is_empty());
        assert!(report.suggestions.is_empty());
    }

    #[test]
    fn small_area_deducts_fifteen() {
        let config = roomy(16).with_areas(vec![area("gym", 2.0, 2.0, 3.0)]);
        let report = score(&config);
        assert_eq!(report.score, 85);
        assert_eq!(report.issues.len(), 1);
        assert!(report.issues[0].contains("gym module"));
        assert!(report.issues[0].contains("0.2 m²") || report.issues[0].contains("0.3 m²"));
    }

    #[test]
    fn borderline_area_is_a_suggestion() {
        // 4 m² / 1 crew sits between 3 and 5.
        let config = roomy(1).with_areas(vec![area("lab", 2.0, 3.0, 5.0)]);
        let report = score(&config);
        assert_eq!(report.score, 95);
        assert!(report.issues.is_empty());
        assert_eq!(
            report.suggestions,
            ["The lab area is borderline. Consider enlarging it for more comfort."]
        );
    }

    #[test]
    fn cube_and_cramped_penalties() {
        let config = MissionConfiguration::new(
            HabitatDescriptor::new(HabitatShape::Cube, 10.0, 5.0),
            Destination::Mars,
            50,
            16,
        )
        .with_areas(Vec::new());
        let report = score(&config);
        assert_eq!(report.score, 80);
        assert_eq!(report.issues, [CUBE_ISSUE, CRAMPED_ISSUE]);
    }

    #[test]
    fn short_missions_are_never_cramped() {
        let mut config = MissionConfiguration::new(
            HabitatDescriptor::new(HabitatShape::Sphere, 10.0, 5.0),
            Destination::Mars,
            30,
            16,
        )
        .with_areas(Vec::new());
        assert_eq!(score(&config).score, 100);
        config.duration_days = 31;
        assert_eq!(score(&config).score, 90);
    }

    #[test]
    fn score_floors_at_zero() {
        let areas = (0..10).map(|i| area(&format!("a{i}"), 1.0, 5.0, 6.0)).collect();
        let config = MissionConfiguration::new(
            HabitatDescriptor::new(HabitatShape::Cube, 1.0, 1.0),
            Destination::Moon,
            100,
            20,
        )
        .with_areas(areas);
        let report = score(&config);
        assert_eq!(report.score, 0);
        assert_eq!(report.issues.len(), 12);
        assert_eq!(report.rating(), ReportRating::Critical);
    }

    #[test]
    fn non_positive_crew_never_produces_nan() {
        let config = roomy(-3).with_areas(vec![area("gym", 2.0, 2.0, 3.0)]);
        let report = score(&config);
        assert_eq!(report.score, 100);
        assert!(report.issues.iter().all(|s| !s.contains("NaN") && !s.contains("inf")));
    }

    #[test]
    fn findings_follow_area_order() {
        let config = roomy(16).with_areas(vec![
            area("beta", 2.0, 2.0, 3.0),
            area("alpha", 2.0, 2.0, 3.0),
        ]);
        let report = score(&config);
        assert!(report.issues[0].contains("beta"));
        assert!(report.issues[1].contains("alpha"));
    }

    #[test]
    fn rating_tiers() {
        assert_eq!(ReportRating::from_score(100), ReportRating::Excellent);
        assert_eq!(ReportRating::from_score(85), ReportRating::Excellent);
        assert_eq!(ReportRating::from_score(84), ReportRating::Acceptable);
        assert_eq!(ReportRating::from_score(70), ReportRating::Acceptable);
        assert_eq!(ReportRating::from_score(69), ReportRating::NeedsImprovement);
        assert_eq!(ReportRating::from_score(50), ReportRating::NeedsImprovement);
        assert_eq!(ReportRating::from_score(49), ReportRating::Critical);
        assert_eq!(ReportRating::Acceptable.color(), Rgb(0xFBBF24));
        assert_eq!(ReportRating::NeedsImprovement.color(), Rgb(0xEF4444));
    }
}
