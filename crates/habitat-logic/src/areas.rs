//! Functional areas and the area registry.
//!
//! A functional area is a box-shaped zone inside the habitat (sleep,
//! hygiene, exercise, ...). The registry owns the session's areas and
//! exposes the two mutations the designer performs on them: resizing one
//! dimension in bounded steps and dragging the area across the floor.
//!
//! Habitability is derived, never stored: floor area divided by crew size,
//! classified against two per-area thresholds.
//!
//! Unknown ids are silent no-ops everywhere in this module. The drag path
//! calls into the registry every pointer move and must never fail.

use std::fmt;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::mesh::Aabb;

/// Smallest allowed extent of an area along any dimension (meters).
pub const MIN_AREA_EXTENT: f32 = 1.0;
/// Largest allowed extent of an area along any dimension (meters).
pub const MAX_AREA_EXTENT: f32 = 10.0;

/// Crew size actually used for per-person ratios (never below 1).
pub fn effective_crew(crew_size: i32) -> u32 {
    crew_size.max(1) as u32
}

// ============================================================================
// TYPES
// ============================================================================

/// One of the three box dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Width,
    Height,
    Depth,
}

impl Dimension {
    pub fn all() -> [Dimension; 3] {
        [Self::Width, Self::Height, Self::Depth]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Width => "Width",
            Self::Height => "Height",
            Self::Depth => "Depth",
        }
    }
}

/// Box extents in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AreaSize {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
}

impl AreaSize {
    pub fn new(width: f32, height: f32, depth: f32) -> Self {
        Self {
            width,
            height,
            depth,
        }
    }

    pub fn cube(edge: f32) -> Self {
        Self::new(edge, edge, edge)
    }

    pub fn get(&self, dimension: Dimension) -> f32 {
        match dimension {
            Dimension::Width => self.width,
            Dimension::Height => self.height,
            Dimension::Depth => self.depth,
        }
    }

    fn get_mut(&mut self, dimension: Dimension) -> &mut f32 {
        match dimension {
            Dimension::Width => &mut self.width,
            Dimension::Height => &mut self.height,
            Dimension::Depth => &mut self.depth,
        }
    }

    pub fn as_vec3(&self) -> Vec3 {
        Vec3::new(self.width, self.height, self.depth)
    }
}

/// Habitability classification of a functional area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AreaStatus {
    /// Below the minimum recommendation.
    Small,
    /// Between minimum and recommended: borderline.
    Recommended,
    /// At or above the recommendation.
    Large,
}

impl AreaStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Small => "AREA TOO SMALL",
            Self::Recommended => "RECOMMENDED",
            Self::Large => "OPTIMAL",
        }
    }
}

impl fmt::Display for AreaStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classify a per-person floor area against two ascending thresholds.
pub fn classify(area_per_person: f32, min_recommended: f32, recommended: f32) -> AreaStatus {
    if area_per_person < min_recommended {
        AreaStatus::Small
    } else if area_per_person < recommended {
        AreaStatus::Recommended
    } else {
        AreaStatus::Large
    }
}

/// A purpose-built zone inside the habitat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionalArea {
    /// Stable key within a design session.
    pub id: String,
    /// Human label.
    pub name: String,
    pub size: AreaSize,
    /// Box centre. Only x/z change after creation.
    pub position: Vec3,
    /// m² per crew member below which the area is too small.
    pub min_recommended: f32,
    /// m² per crew member at which the area becomes optimal.
    pub recommended: f32,
}

impl FunctionalArea {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        size: AreaSize,
        position: Vec3,
        min_recommended: f32,
        recommended: f32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            size,
            position,
            min_recommended,
            recommended,
        }
    }

    /// Floor area (width × depth) in m².
    pub fn floor_area(&self) -> f32 {
        self.size.width * self.size.depth
    }

    pub fn area_per_person(&self, crew_size: i32) -> f32 {
        area_per_person(self, crew_size)
    }

    pub fn status(&self, crew_size: i32) -> AreaStatus {
        area_status(self, crew_size)
    }

    /// World-space box occupied by this area.
    pub fn bounds(&self) -> Aabb {
        Aabb::from_center_size(self.position, self.size.as_vec3())
    }

    pub fn summary(&self, crew_size: i32) -> AreaSummary {
        AreaSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            size: self.size,
            area_per_person: self.area_per_person(crew_size),
            status: self.status(crew_size),
        }
    }
}

/// Floor area divided by crew size (crew clamped to at least 1).
pub fn area_per_person(area: &FunctionalArea, crew_size: i32) -> f32 {
    area.floor_area() / effective_crew(crew_size) as f32
}

pub fn area_status(area: &FunctionalArea, crew_size: i32) -> AreaStatus {
    classify(
        area_per_person(area, crew_size),
        area.min_recommended,
        area.recommended,
    )
}

/// Derived view of an area, handed to the host on every registry change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaSummary {
    pub id: String,
    pub name: String,
    pub size: AreaSize,
    pub area_per_person: f32,
    pub status: AreaStatus,
}

/// The fixed catalog every design session starts with.
pub fn default_catalog() -> Vec<FunctionalArea> {
    let cube = AreaSize::cube(2.0);
    vec![
        FunctionalArea::new("sleep", "Sleep (bunks)", cube, Vec3::new(-4.0, 3.0, 0.0), 2.0, 3.0),
        FunctionalArea::new("exercise", "Exercise", cube, Vec3::new(0.0, -3.0, 0.0), 2.0, 3.0),
        FunctionalArea::new("hygiene", "Hygiene", cube, Vec3::new(4.0, 3.0, 0.0), 1.5, 2.5),
        FunctionalArea::new("galley", "Galley", cube, Vec3::new(-4.0, -3.0, 2.0), 2.5, 3.5),
        FunctionalArea::new(
            "eclss",
            "Environmental Control (ECLSS)",
            cube,
            Vec3::new(4.0, -3.0, 2.0),
            2.0,
            3.0,
        ),
        FunctionalArea::new("medical", "Medical Bay", cube, Vec3::new(0.0, 3.0, -2.0), 1.8, 2.8),
    ]
}

/// Area the resize controls act on when a session starts.
pub const DEFAULT_FOCUS: &str = "exercise";

// ============================================================================
// REGISTRY
// ============================================================================

/// Owns the functional areas of one design session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaRegistry {
    areas: Vec<FunctionalArea>,
    focused: Option<String>,
    revision: u64,
}

impl Default for AreaRegistry {
    fn default() -> Self {
        Self::with_default_catalog()
    }
}

impl AreaRegistry {
    pub fn new(areas: Vec<FunctionalArea>) -> Self {
        let focused = areas.first().map(|a| a.id.clone());
        Self {
            areas,
            focused,
            revision: 0,
        }
    }

    pub fn with_default_catalog() -> Self {
        let mut registry = Self::new(default_catalog());
        registry.focus(DEFAULT_FOCUS);
        registry
    }

    pub fn len(&self) -> usize {
        self.areas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&FunctionalArea> {
        self.areas.iter().find(|a| a.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FunctionalArea> {
        self.areas.iter()
    }

    pub fn areas(&self) -> &[FunctionalArea] {
        &self.areas
    }

    /// Incremented on every effective mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Add `delta` to one dimension, clamped to
    /// [`MIN_AREA_EXTENT`]..=[`MAX_AREA_EXTENT`].
    ///
    /// Returns `true` when the stored value changed. Unknown ids and
    /// non-finite deltas are ignored.
    pub fn resize(&mut self, id: &str, dimension: Dimension, delta: f32) -> bool {
        if !delta.is_finite() {
            return false;
        }
        let Some(area) = self.areas.iter_mut().find(|a| a.id == id) else {
            return false;
        };
        let value = area.size.get_mut(dimension);
        let next = (*value + delta).clamp(MIN_AREA_EXTENT, MAX_AREA_EXTENT);
        if next == *value {
            return false;
        }
        *value = next;
        self.revision += 1;
        true
    }

    /// Move an area across the floor. `y` is fixed at creation.
    pub fn reposition(&mut self, id: &str, x: f32, z: f32) -> bool {
        if !(x.is_finite() && z.is_finite()) {
            return false;
        }
        let Some(area) = self.areas.iter_mut().find(|a| a.id == id) else {
            return false;
        };
        if area.position.x == x && area.position.z == z {
            return false;
        }
        area.position.x = x;
        area.position.z = z;
        self.revision += 1;
        true
    }

    pub fn focused(&self) -> Option<&FunctionalArea> {
        self.focused.as_deref().and_then(|id| self.get(id))
    }

    /// Focus an area for the resize controls. Unknown ids leave focus as is.
    pub fn focus(&mut self, id: &str) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        self.focused = Some(id.to_string());
        true
    }

    /// Move focus to the next area in registry order, wrapping around.
    pub fn focus_next(&mut self) -> Option<&FunctionalArea> {
        if self.areas.is_empty() {
            return None;
        }
        let current = self
            .focused
            .as_deref()
            .and_then(|id| self.areas.iter().position(|a| a.id == id));
        let next = current.map_or(0, |i| (i + 1) % self.areas.len());
        self.focused = Some(self.areas[next].id.clone());
        self.areas.get(next)
    }

    pub fn resize_focused(&mut self, dimension: Dimension, delta: f32) -> bool {
        match self.focused.clone() {
            Some(id) => self.resize(&id, dimension, delta),
            None => false,
        }
    }

    pub fn summaries(&self, crew_size: i32) -> Vec<AreaSummary> {
        self.areas.iter().map(|a| a.summary(crew_size)).collect()
    }

    /// Owned copy of the areas, in registry order.
    pub fn snapshot(&self) -> Vec<FunctionalArea> {
        self.areas.clone()
    }
}
