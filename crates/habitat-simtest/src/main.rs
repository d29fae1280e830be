//! Habitat Designer Headless Harness
//!
//! Validates geometry, placement, scene assembly and scoring without a
//! window. Runs entirely in-process: no GPU, no event loop.
//!
//! Usage:
//!   cargo run -p habitat-simtest
//!   cargo run -p habitat-simtest -- --verbose
//!   cargo run -p habitat-simtest -- --config designer.json --design design.json
//!   cargo run -p habitat-simtest -- --seed 42

use glam::{Vec2, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use habitat_logic::areas::{
    classify, default_catalog, AreaRegistry, AreaStatus, Dimension, MAX_AREA_EXTENT,
    MIN_AREA_EXTENT,
};
use habitat_logic::config::DesignerConfig;
use habitat_logic::mission::{validate_configuration, Destination, MissionConfiguration};
use habitat_logic::placement::{DragOutcome, PerspectiveCamera};
use habitat_logic::preview::{assemble_report_preview, STARS_TAG, STAR_COUNT};
use habitat_logic::scene::{assemble, SceneMode, GRID_TAG, HABITAT_TAG};
use habitat_logic::scoring::{score, MissionReport, ReportRating};
use habitat_logic::selection::{is_catalog_item, CHECKLIST};
use habitat_logic::session::DesignSession;
use habitat_logic::shapes::{
    generate, HabitatDescriptor, HabitatShape, DEFAULT_HEIGHT, DEFAULT_WIDTH, WHEEL_MODULE_COUNT,
};
use habitat_logic::view::{DesignView, Frame, RenderTarget, ViewError, Viewport};

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

struct Options {
    verbose: bool,
    seed: u64,
    design: Option<String>,
}

impl Options {
    fn from_args(args: &[String]) -> Self {
        let mut options = Options {
            verbose: false,
            seed: 0x4841_4249,
            design: None,
        };
        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--verbose" | "-v" => options.verbose = true,
                "--seed" if i + 1 < args.len() => {
                    i += 1;
                    if let Ok(seed) = args[i].parse() {
                        options.seed = seed;
                    }
                }
                "--design" if i + 1 < args.len() => {
                    i += 1;
                    options.design = Some(args[i].clone());
                }
                _ => {}
            }
            i += 1;
        }
        options
    }
}

fn main() {
    env_logger::init();
    let args: Vec<String> = std::env::args().collect();
    let options = Options::from_args(&args);
    println!("=== Habitat Designer Harness ===\n");

    let designer = match DesignerConfig::from_args() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load designer config: {}", e);
            std::process::exit(2);
        }
    };
    let mut rng = StdRng::seed_from_u64(options.seed);

    let mut results = Vec::new();

    // 1. Shape generator
    results.extend(validate_shapes(&mut rng, options.verbose));

    // 2. Area registry & checklist
    results.extend(validate_areas(&mut rng));

    // 3. Placement through a real camera
    results.extend(validate_placement(&designer));

    // 4. Scene assembly & patching
    results.extend(validate_scene(&designer, &mut rng));

    // 5. Scoring scenarios
    results.extend(validate_scoring(options.verbose));

    // 6. View lifecycle
    results.extend(validate_view(&designer));

    // 7. Report preview
    results.extend(validate_report_preview(&designer));

    // 8. Optional design file
    if let Some(path) = &options.design {
        results.extend(score_design_file(path, &designer));
    }

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || options.verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── 1. Shapes ───────────────────────────────────────────────────────────

fn validate_shapes(rng: &mut StdRng, verbose: bool) -> Vec<TestResult> {
    println!("--- Shape Generator ---");
    let mut results = Vec::new();

    for &shape in HabitatShape::all() {
        let geometry = generate(shape, DEFAULT_HEIGHT, DEFAULT_WIDTH);
        let size = geometry.bounds().size();
        results.push(TestResult {
            name: format!("shape_{}_bounds", shape),
            passed: size.is_finite() && size.min_element() > 0.0,
            detail: format!(
                "{} parts, bounds {:.2} x {:.2} x {:.2}",
                geometry.part_count(),
                size.x,
                size.y,
                size.z
            ),
        });
    }

    let wheel = generate(HabitatShape::Wheel, 30.0, 12.0);
    results.push(TestResult {
        name: "shape_wheel_parts".into(),
        passed: wheel.is_compound() && wheel.part_count() == WHEEL_MODULE_COUNT + 2,
        detail: format!("{} parts", wheel.part_count()),
    });

    // Degenerate input falls back to the default dimensions.
    let fallback_ok = HabitatShape::all().iter().all(|&shape| {
        generate(shape, 0.0, f32::NAN) == generate(shape, DEFAULT_HEIGHT, DEFAULT_WIDTH)
            && generate(shape, -3.0, f32::INFINITY)
                == generate(shape, DEFAULT_HEIGHT, DEFAULT_WIDTH)
    });
    results.push(TestResult {
        name: "shape_dimension_fallback".into(),
        passed: fallback_ok,
        detail: "zero, negative and non-finite dimensions use 10 x 5".into(),
    });

    // Bounds never shrink as a solid gets wider.
    let mut regressions = 0;
    for _ in 0..50 {
        let h = rng.gen_range(1.0..100.0_f32);
        let w = rng.gen_range(1.0..90.0_f32);
        for &shape in &HabitatShape::all()[..4] {
            let base = generate(shape, h, w).bounds().volume();
            let wider = generate(shape, h, w + 10.0).bounds().volume();
            if wider < base * 0.9999 {
                regressions += 1;
            }
        }
    }
    results.push(TestResult {
        name: "shape_monotone_width".into(),
        passed: regressions == 0,
        detail: format!("{} regressions over 200 samples", regressions),
    });

    if verbose {
        println!("  Outline edges at default size:");
        for &shape in &HabitatShape::all()[..4] {
            if let habitat_logic::shapes::HabitatGeometry::Solid(solid) =
                generate(shape, DEFAULT_HEIGHT, DEFAULT_WIDTH)
            {
                println!(
                    "    {:9}: {:5} triangles, {:4} outline edges",
                    shape.name(),
                    solid.mesh.triangle_count(),
                    solid.outline.len()
                );
            }
        }
    }

    results
}

// ── 2. Areas ────────────────────────────────────────────────────────────

fn validate_areas(rng: &mut StdRng) -> Vec<TestResult> {
    println!("--- Functional Areas ---");
    let mut results = Vec::new();

    let catalog = default_catalog();
    results.push(TestResult {
        name: "areas_catalog".into(),
        passed: catalog.len() == 6,
        detail: format!("{} areas in the default catalog", catalog.len()),
    });

    let mut registry = AreaRegistry::new(catalog);
    let ids: Vec<String> = registry.iter().map(|a| a.id.clone()).collect();
    let mut out_of_bounds = 0;
    for _ in 0..1000 {
        let id = &ids[rng.gen_range(0..ids.len())];
        let dim = Dimension::all()[rng.gen_range(0..3)];
        registry.resize(id, dim, rng.gen_range(-4.0..4.0_f32));
        out_of_bounds += registry
            .iter()
            .flat_map(|a| Dimension::all().map(|d| a.size.get(d)))
            .filter(|v| !(MIN_AREA_EXTENT..=MAX_AREA_EXTENT).contains(v))
            .count();
    }
    results.push(TestResult {
        name: "areas_resize_clamped".into(),
        passed: out_of_bounds == 0,
        detail: format!("{} extents left [1, 10] over 1000 random resizes", out_of_bounds),
    });

    let before = registry.clone();
    let unknown_noop = !registry.resize("airlock", Dimension::Width, 1.0)
        && !registry.reposition("airlock", 0.0, 0.0)
        && registry == before;
    results.push(TestResult {
        name: "areas_unknown_id_noop".into(),
        passed: unknown_noop,
        detail: "unknown ids leave the registry untouched".into(),
    });

    let mut regressed = false;
    let mut last = AreaStatus::Small;
    for i in 0..=600 {
        let status = classify(i as f32 * 0.01, 2.0, 3.0);
        regressed |= status < last;
        last = status;
    }
    results.push(TestResult {
        name: "areas_status_monotone".into(),
        passed: !regressed && last == AreaStatus::Large,
        detail: "SMALL → RECOMMENDED → LARGE as area per person grows".into(),
    });

    let mut session =
        DesignSession::new(MissionConfiguration::default(), &DesignerConfig::default());
    let on = session.toggle_membership("rest");
    let off = !session.toggle_membership("rest");
    results.push(TestResult {
        name: "checklist_toggle".into(),
        passed: on
            && off
            && session.selection().is_empty()
            && session.registry().len() == 6
            && CHECKLIST.iter().all(|item| is_catalog_item(item.id)),
        detail: format!("{} checklist items, toggling twice restores", CHECKLIST.len()),
    });

    results
}

// ── 3. Placement ────────────────────────────────────────────────────────

fn to_ndc(camera: &PerspectiveCamera, world: Vec3) -> Vec2 {
    camera.view_projection_matrix().project_point3(world).truncate()
}

fn validate_placement(designer: &DesignerConfig) -> Vec<TestResult> {
    println!("--- Placement ---");
    let mut results = Vec::new();

    // Look almost straight down so no area hides another.
    let mut camera = designer.camera(1.0);
    camera.look_at(Vec3::new(0.0, 40.0, 0.01), Vec3::ZERO);

    let mut session = DesignSession::new(MissionConfiguration::default(), designer);
    let targets: Vec<(String, Vec3)> = session
        .registry()
        .iter()
        .map(|a| (a.id.clone(), a.position))
        .collect();

    let mut mispicks = Vec::new();
    for (id, center) in &targets {
        let picked = session.pointer_down(to_ndc(&camera, *center), &camera);
        if picked.as_deref() != Some(id.as_str()) {
            mispicks.push(format!("{} → {:?}", id, picked));
        }
        session.pointer_up();
    }
    results.push(TestResult {
        name: "placement_pick_each_area".into(),
        passed: mispicks.is_empty(),
        detail: if mispicks.is_empty() {
            format!("{} areas picked from above", targets.len())
        } else {
            mispicks.join(", ")
        },
    });

    let missed = session.pointer_down(to_ndc(&camera, Vec3::new(9.0, 0.0, 9.0)), &camera);
    results.push(TestResult {
        name: "placement_miss_is_idle".into(),
        passed: missed.is_none() && !session.is_dragging(),
        detail: "press on empty ground starts no drag".into(),
    });

    session.pointer_down(to_ndc(&camera, Vec3::new(0.0, -3.0, 0.0)), &camera);
    let moved = session.pointer_move(to_ndc(&camera, Vec3::new(3.0, 0.0, 2.0)), &camera);
    let position = session
        .registry()
        .get("exercise")
        .map(|a| a.position)
        .unwrap_or(Vec3::NAN);
    results.push(TestResult {
        name: "placement_drag_follows_ground".into(),
        passed: moved.moved() && (position - Vec3::new(3.0, -3.0, 2.0)).length() < 1e-2,
        detail: format!("exercise now at {:.2}", position),
    });

    let rejected = session.pointer_move(to_ndc(&camera, Vec3::new(15.0, 0.0, 0.0)), &camera);
    let unchanged = session
        .registry()
        .get("exercise")
        .is_some_and(|a| a.position == position);
    results.push(TestResult {
        name: "placement_containment".into(),
        passed: matches!(rejected, DragOutcome::OutsideRadius { .. }) && unchanged,
        detail: format!("{:?}", rejected),
    });

    let released = session.pointer_up();
    let after = session.pointer_move(to_ndc(&camera, Vec3::new(1.0, 0.0, 1.0)), &camera);
    results.push(TestResult {
        name: "placement_release".into(),
        passed: released.as_deref() == Some("exercise") && after == DragOutcome::NotDragging,
        detail: "moves after release are ignored".into(),
    });

    results
}

// ── 4. Scene ────────────────────────────────────────────────────────────

fn validate_scene(designer: &DesignerConfig, rng: &mut StdRng) -> Vec<TestResult> {
    println!("--- Scene Assembly ---");
    let mut results = Vec::new();

    let mut session = DesignSession::new(MissionConfiguration::default(), designer);
    let scene = session.scene();
    let order: Vec<&str> = scene.nodes().iter().map(|n| n.name.as_str()).collect();
    results.push(TestResult {
        name: "scene_node_order".into(),
        passed: order.len() == 8 && order[0] == GRID_TAG && order[1] == HABITAT_TAG,
        detail: order.join(", "),
    });

    for _ in 0..200 {
        match rng.gen_range(0..4) {
            0 => session.set_shape(HabitatShape::from_u8(rng.gen_range(0..5))),
            1 => session.set_dimensions(rng.gen_range(1.0..100.0), rng.gen_range(1.0..100.0)),
            2 => {
                let id = default_catalog()[rng.gen_range(0..6)].id.clone();
                session.resize_area(&id, Dimension::all()[rng.gen_range(0..3)], 0.5);
            }
            _ => {
                let id = default_catalog()[rng.gen_range(0..6)].id.clone();
                session.reposition_area(&id, rng.gen_range(-8.0..8.0), rng.gen_range(-8.0..8.0));
            }
        }
    }
    let expected = assemble(
        session.habitat(),
        session.registry().areas(),
        &designer.palette(),
        &designer.scene_settings(SceneMode::FunctionalAreas),
    );
    results.push(TestResult {
        name: "scene_patch_equals_rebuild".into(),
        passed: session.scene() == &expected,
        detail: format!("after 200 random edits, revision {}", session.scene_revision()),
    });

    session.set_scene_mode(SceneMode::HabitatPreview);
    results.push(TestResult {
        name: "scene_preview_mode".into(),
        passed: session.scene().len() == 2 && session.scene().area_volumes().count() == 0,
        detail: "preview shows grid and habitat only".into(),
    });

    results
}

// ── 5. Scoring ──────────────────────────────────────────────────────────

fn validate_scoring(verbose: bool) -> Vec<TestResult> {
    println!("--- Mission Scoring ---");
    let mut results = Vec::new();

    let cube = MissionConfiguration::new(
        HabitatDescriptor::new(HabitatShape::Cube, 10.0, 5.0),
        Destination::Mars,
        50,
        16,
    )
    .with_areas(Vec::new());
    let report = score(&cube);
    results.push(TestResult {
        name: "score_cube_cramped".into(),
        passed: report.score == 80 && report.issues.len() == 2,
        detail: format!("{} ({} issues)", report.score, report.issues.len()),
    });
    if verbose {
        print_report(&report);
    }

    let incomplete = score(&MissionConfiguration::default());
    results.push(TestResult {
        name: "score_without_areas".into(),
        passed: incomplete.score == 100 && incomplete.issues.is_empty(),
        detail: "missing area snapshots score the baseline".into(),
    });

    let default_session =
        DesignSession::new(MissionConfiguration::default(), &DesignerConfig::default());
    let finalized = default_session.finalize();
    results.push(TestResult {
        name: "score_default_catalog_crowded".into(),
        passed: finalized.report.score == 0
            && finalized.report.rating() == ReportRating::Critical
            && finalized.validation.is_empty(),
        detail: format!(
            "16 crew in six 2x2 areas: {} with {} issues",
            finalized.report.score,
            finalized.report.issues.len()
        ),
    });

    let tiers = [
        (100, ReportRating::Excellent),
        (85, ReportRating::Excellent),
        (84, ReportRating::Acceptable),
        (70, ReportRating::Acceptable),
        (69, ReportRating::NeedsImprovement),
        (50, ReportRating::NeedsImprovement),
        (49, ReportRating::Critical),
    ];
    let tiers_ok = tiers
        .iter()
        .all(|&(s, rating)| ReportRating::from_score(s) == rating);
    results.push(TestResult {
        name: "score_rating_tiers".into(),
        passed: tiers_ok,
        detail: "85 / 70 / 50 thresholds".into(),
    });

    let out_of_range = MissionConfiguration::new(
        HabitatDescriptor::new(HabitatShape::Sphere, 150.0, 5.0),
        Destination::Moon,
        0,
        25,
    );
    let issues = validate_configuration(&out_of_range);
    results.push(TestResult {
        name: "validation_reports_ranges".into(),
        passed: issues.len() == 3,
        detail: issues
            .iter()
            .map(|i| i.to_string())
            .collect::<Vec<_>>()
            .join("; "),
    });

    results
}

fn print_report(report: &MissionReport) {
    println!("  Score {} ({})", report.score, report.rating());
    for issue in &report.issues {
        println!("    issue: {}", issue);
    }
    for suggestion in &report.suggestions {
        println!("    suggestion: {}", suggestion);
    }
}

// ── 6. View lifecycle ───────────────────────────────────────────────────

#[derive(Default)]
struct CountingTarget {
    frames: u64,
    last_revision: u64,
    resizes: usize,
}

impl RenderTarget for CountingTarget {
    fn resize(&mut self, _viewport: Viewport) {
        self.resizes += 1;
    }

    fn draw(&mut self, frame: &Frame<'_>) {
        self.frames += 1;
        self.last_revision = frame.scene_revision;
    }

    fn release(&mut self) {
        log::debug!("harness target released after {} frames", self.frames);
    }
}

fn validate_view(designer: &DesignerConfig) -> Vec<TestResult> {
    println!("--- View Lifecycle ---");
    let mut results = Vec::new();

    let session = DesignSession::new(MissionConfiguration::default(), designer);
    let mut view = DesignView::new(session, CountingTarget::default(), designer);

    let before_mount = view.frame(0.016);
    let zero = view.mount(Viewport::new(0, 480));
    results.push(TestResult {
        name: "view_guards".into(),
        passed: before_mount == Err(ViewError::NotMounted)
            && zero == Err(ViewError::ZeroViewport)
            && !view.is_mounted(),
        detail: "no frames before mount, zero-width container skipped".into(),
    });

    let mounted = view.resize(Viewport::new(800, 600)).is_ok() && view.is_mounted();
    let mut frames_ok = true;
    for _ in 0..60 {
        frames_ok &= view.frame(1.0 / 60.0).is_ok();
    }
    let camera_moved = view.camera().position != designer.camera(1.0).position;
    results.push(TestResult {
        name: "view_frames".into(),
        passed: mounted
            && frames_ok
            && view.target().frames == 60
            && view.target().resizes == 1,
        detail: format!(
            "{} frames, {} resize, camera orbiting: {}",
            view.target().frames,
            view.target().resizes,
            camera_moved
        ),
    });

    view.session_mut().resize_area("galley", Dimension::Width, 1.0);
    let _ = view.frame(0.016);
    results.push(TestResult {
        name: "view_sees_patches".into(),
        passed: view.target().last_revision == view.session().scene_revision(),
        detail: format!("revision {}", view.target().last_revision),
    });

    let session = view.teardown();
    results.push(TestResult {
        name: "view_teardown".into(),
        passed: session.listener_count() == 0 && !session.is_dragging(),
        detail: "session handed back with listeners detached".into(),
    });

    results
}

// ── 7. Report preview ───────────────────────────────────────────────────

fn validate_report_preview(designer: &DesignerConfig) -> Vec<TestResult> {
    println!("--- Report Preview ---");
    let mut results = Vec::new();

    let config = MissionConfiguration::new(
        HabitatDescriptor::new(HabitatShape::Torus, 12.0, 9.0),
        Destination::Mars,
        30,
        4,
    )
    .with_areas(default_catalog());
    let first = assemble_report_preview(&config, &designer.palette());
    let second = assemble_report_preview(&config, &designer.palette());
    let stars = first.find(STARS_TAG).map(|n| n.points.len()).unwrap_or(0);

    results.push(TestResult {
        name: "preview_deterministic".into(),
        passed: first == second && stars == STAR_COUNT,
        detail: format!("{} stars, {} top-level nodes", stars, first.len()),
    });
    results.push(TestResult {
        name: "preview_background".into(),
        passed: first.background == Destination::Mars.background(),
        detail: format!("background {}", first.background),
    });

    results
}

// ── 8. Design file ──────────────────────────────────────────────────────

fn score_design_file(path: &str, designer: &DesignerConfig) -> Vec<TestResult> {
    println!("--- Design File ---");
    let config = match MissionConfiguration::load(path) {
        Ok(config) => config,
        Err(e) => {
            return vec![TestResult {
                name: "design_load".into(),
                passed: false,
                detail: format!("{}: {}", path, e),
            }];
        }
    };

    let session = DesignSession::new(config, designer);
    let finalized = session.finalize();
    print_report(&finalized.report);
    for issue in &finalized.validation {
        println!("    out of range: {}", issue);
    }
    match serde_json::to_string_pretty(&finalized.summaries) {
        Ok(json) => println!("{}", json),
        Err(e) => log::warn!("could not export summaries: {}", e),
    }

    vec![TestResult {
        name: "design_scored".into(),
        passed: true,
        detail: format!(
            "{} scored {} ({})",
            path,
            finalized.report.score,
            finalized.report.rating()
        ),
    }]
}
