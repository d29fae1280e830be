//! Pure design logic for the habitat designer.
//!
//! This crate contains the procedural geometry, drag-and-size interaction
//! and mission scoring of the designer, independent of any engine or
//! window system. Functions take plain data and return results, so every
//! piece is unit-testable headless; the Bevy viewer and the simtest
//! harness are thin hosts around it.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`areas`] | Functional areas, per-crew ratios, status, the area registry |
//! | [`config`] | Designer settings (scale, drag radius, camera, orbit, palette) |
//! | [`mesh`] | Triangle meshes, edge outlines, poses and bounding boxes |
//! | [`mission`] | Mission configuration, destinations, widget-range validation |
//! | [`placement`] | Pointer rays, camera projection, the drag state machine |
//! | [`preview`] | 3D scene for the mission report (helix layout, backdrop, stars) |
//! | [`scene`] | Scene graph, area palette, assembly and in-place patching |
//! | [`scoring`] | Mission success score, issues and suggestions |
//! | [`selection`] | Coarse facility checklist (set membership) |
//! | [`session`] | One design session: mutate, patch scene, notify |
//! | [`shapes`] | Habitat shape descriptors and the shape generator |
//! | [`view`] | Mount/resize/frame/teardown lifecycle and auto-orbit |

pub mod areas;
pub mod config;
pub mod mesh;
pub mod mission;
pub mod placement;
pub mod preview;
pub mod scene;
pub mod scoring;
pub mod selection;
pub mod session;
pub mod shapes;
pub mod view;
