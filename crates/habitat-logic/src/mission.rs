//! Mission configuration: destination, duration, crew and habitat.
//!
//! A [`MissionConfiguration`] is the snapshot handed to the scoring engine
//! when a design is finalized. The design widgets constrain its numeric
//! fields to fixed ranges; [`validate_configuration`] reports values outside
//! them, but nothing downstream relies on validation having passed.

use std::fmt;
use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::areas::{effective_crew, FunctionalArea};
use crate::config::ConfigLoadError;
use crate::scene::Rgb;
use crate::shapes::HabitatDescriptor;

// ============================================================================
// DESTINATIONS
// ============================================================================

/// Where the habitat is going.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Destination {
    /// Low Earth orbit.
    #[default]
    EarthOrbit,
    /// Lunar surface.
    Moon,
    /// Martian surface.
    Mars,
}

/// The celestial body drawn behind the report preview.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BackdropBody {
    pub radius: f32,
    pub position: Vec3,
    pub color: Rgb,
}

impl Destination {
    pub fn all() -> [Destination; 3] {
        [Self::EarthOrbit, Self::Moon, Self::Mars]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::EarthOrbit => "Earth Orbit",
            Self::Moon => "Moon",
            Self::Mars => "Mars",
        }
    }

    /// Clear colour of the report preview.
    pub fn background(&self) -> Rgb {
        match self {
            Self::EarthOrbit => Rgb(0x001133),
            Self::Moon => Rgb(0x1A1A1A),
            Self::Mars => Rgb(0x8B4513),
        }
    }

    pub fn backdrop(&self) -> BackdropBody {
        match self {
            Self::EarthOrbit => BackdropBody {
                radius: 8.0,
                position: Vec3::new(-15.0, -5.0, -20.0),
                color: Rgb(0x2563EB),
            },
            Self::Moon => BackdropBody {
                radius: 6.0,
                position: Vec3::new(12.0, -3.0, -15.0),
                color: Rgb(0x808080),
            },
            Self::Mars => BackdropBody {
                radius: 7.0,
                position: Vec3::new(-12.0, -4.0, -18.0),
                color: Rgb(0xCD5C5C),
            },
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Everything the scoring engine needs to know about a design.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionConfiguration {
    pub habitat: HabitatDescriptor,
    #[serde(default)]
    pub destination: Destination,
    pub duration_days: i32,
    pub crew_size: i32,
    /// Area snapshots in registry order. `None` when the design never
    /// reached the functional-area stage.
    #[serde(default)]
    pub areas: Option<Vec<FunctionalArea>>,
}

impl Default for MissionConfiguration {
    fn default() -> Self {
        Self {
            habitat: HabitatDescriptor::default(),
            destination: Destination::EarthOrbit,
            duration_days: 50,
            crew_size: 16,
            areas: None,
        }
    }
}

impl MissionConfiguration {
    pub fn new(
        habitat: HabitatDescriptor,
        destination: Destination,
        duration_days: i32,
        crew_size: i32,
    ) -> Self {
        Self {
            habitat,
            destination,
            duration_days,
            crew_size,
            areas: None,
        }
    }

    pub fn with_areas(mut self, areas: Vec<FunctionalArea>) -> Self {
        self.areas = Some(areas);
        self
    }

    /// Parse a design snapshot, as written by [`Self::to_json_pretty`].
    pub fn from_json_str(json: &str) -> Result<Self, ConfigLoadError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigLoadError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigLoadError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn effective_crew(&self) -> u32 {
        effective_crew(self.crew_size)
    }

    /// Habitat height × width divided by the (clamped) crew size.
    pub fn space_per_crew(&self) -> f32 {
        self.habitat.effective_height() * self.habitat.effective_width()
            / self.effective_crew() as f32
    }
}

// ============================================================================
// VALIDATION
// ============================================================================

/// Inclusive range accepted by the height/width widgets (meters).
pub const DIMENSION_RANGE: (f32, f32) = (1.0, 100.0);
/// Inclusive range accepted by the duration widget (days).
pub const DURATION_RANGE: (i32, i32) = (1, 100);
/// Inclusive range accepted by the crew widget.
pub const CREW_RANGE: (i32, i32) = (1, 20);

/// A widget value outside its accepted range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigIssue {
    HeightOutOfRange(f32),
    WidthOutOfRange(f32),
    DurationOutOfRange(i32),
    CrewOutOfRange(i32),
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HeightOutOfRange(v) => write!(
                f,
                "height {v} m outside {}..={} m",
                DIMENSION_RANGE.0, DIMENSION_RANGE.1
            ),
            Self::WidthOutOfRange(v) => write!(
                f,
                "width {v} m outside {}..={} m",
                DIMENSION_RANGE.0, DIMENSION_RANGE.1
            ),
            Self::DurationOutOfRange(v) => write!(
                f,
                "duration {v} days outside {}..={} days",
                DURATION_RANGE.0, DURATION_RANGE.1
            ),
            Self::CrewOutOfRange(v) => {
                write!(f, "crew size {v} outside {}..={}", CREW_RANGE.0, CREW_RANGE.1)
            }
        }
    }
}

fn dimension_in_range(v: f32) -> bool {
    v.is_finite() && (DIMENSION_RANGE.0..=DIMENSION_RANGE.1).contains(&v)
}

/// Report every widget value outside its range. Advisory only.
pub fn validate_configuration(config: &MissionConfiguration) -> Vec<ConfigIssue> {
    let mut issues = Vec::new();

    if !dimension_in_range(config.habitat.height) {
        issues.push(ConfigIssue::HeightOutOfRange(config.habitat.height));
    }
    if !dimension_in_range(config.habitat.width) {
        issues.push(ConfigIssue::WidthOutOfRange(config.habitat.width));
    }
    if !(DURATION_RANGE.0..=DURATION_RANGE.1).contains(&config.duration_days) {
        issues.push(ConfigIssue::DurationOutOfRange(config.duration_days));
    }
    if !(CREW_RANGE.0..=CREW_RANGE.1).contains(&config.crew_size) {
        issues.push(ConfigIssue::CrewOutOfRange(config.crew_size));
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::HabitatShape;

    #[test]
    fn snapshot_json_defaults_optional_fields() {
        let config = MissionConfiguration::from_json_str(
            r#"{ "habitat": { "shape": "wheel", "height": 20.0, "width": 8.0 },
                 "duration_days": 120, "crew_size": 6 }"#,
        )
        .unwrap();
        assert_eq!(config.habitat.shape, HabitatShape::Wheel);
        assert_eq!(config.destination, Destination::EarthOrbit);
        assert!(config.areas.is_none());

        let with_areas = config.with_areas(crate::areas::default_catalog());
        let json = with_areas.to_json_pretty().unwrap();
        assert_eq!(MissionConfiguration::from_json_str(&json).unwrap(), with_areas);
    }

    #[test]
    fn default_config_is_valid() {
        let config = MissionConfiguration::default();
        assert!(validate_configuration(&config).is_empty());
        assert_eq!(config.crew_size, 16);
        assert!(config.areas.is_none());
    }

    #[test]
    fn out_of_range_values_are_reported() {
        let config = MissionConfiguration::new(
            HabitatDescriptor::new(HabitatShape::Sphere, 0.5, 150.0),
            Destination::Mars,
            0,
            25,
        );
        let issues = validate_configuration(&config);
        assert_eq!(
            issues,
            vec![
                ConfigIssue::HeightOutOfRange(0.5),
                ConfigIssue::WidthOutOfRange(150.0),
                ConfigIssue::DurationOutOfRange(0),
                ConfigIssue::CrewOutOfRange(25),
            ]
        );
        assert_eq!(issues[3].to_string(), "crew size 25 outside 1..=20");
    }

    #[test]
    fn space_per_crew_clamps_crew() {
        let mut config = MissionConfiguration::new(
            HabitatDescriptor::new(HabitatShape::Cube, 10.0, 5.0),
            Destination::Moon,
            50,
            16,
        );
        assert!((config.space_per_crew() - 3.125).abs() < 1e-6);
        config.crew_size = 0;
        assert_eq!(config.space_per_crew(), 50.0);
    }

    #[test]
    fn destinations_have_distinct_backdrops() {
        let colors: Vec<_> = Destination::all().iter().map(|d| d.background()).collect();
        assert_eq!(colors, [Rgb(0x001133), Rgb(0x1A1A1A), Rgb(0x8B4513)]);
        assert_eq!(Destination::Moon.backdrop().radius, 6.0);
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&Destination::EarthOrbit).unwrap();
        assert_eq!(json, "\"earth_orbit\"");
        let config: MissionConfiguration = serde_json::from_str(
            r#"{"habitat":{"shape":"torus","height":8,"width":6},"duration_days":20,"crew_size":4}"#,
        )
        .unwrap();
        assert_eq!(config.habitat.shape, HabitatShape::Torus);
        assert_eq!(config.destination, Destination::EarthOrbit);
        assert!(config.areas.is_none());
    }
}
