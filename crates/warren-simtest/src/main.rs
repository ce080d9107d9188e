//! Warren Headless Generation Harness
//!
//! Generates layouts for many seeds and checks the structural invariants of
//! every result. Runs entirely in-process, no rendering.
//!
//! Usage:
//!   cargo run -p warren-simtest
//!   cargo run -p warren-simtest -- --verbose --seeds 200
//!   cargo run -p warren-simtest -- --seed castle            (prints the map)
//!   cargo run -p warren-simtest -- --config my_layout.json --export out.json
//!
//! Set `RUST_LOG=info` to see per-phase generation logs.

use warren_logic::config::{validate_config, LayoutConfig, SizeRange};
use warren_logic::export::{export_json, render_ascii};
use warren_logic::furnish::PlacementLog;
use warren_logic::generator::{Layout, LayoutGenerator};
use warren_logic::geometry::{Direction, Rect};
use warren_logic::placement::{PlacementSearch, PlacementSettings, SizeRequest};
use warren_logic::raster::TileClass;
use warren_logic::region::{Region, RegionKind, WallThickness};
use warren_logic::registry::{RegionRegistry, RegionRole};
use warren_logic::rng::LayoutRng;
use warren_logic::snapshot::{load_layout, save_layout};

// ── Sample config (same JSON the tests use) ─────────────────────────────
const SAMPLE_CONFIG_JSON: &str = include_str!("../../../data/layout.json");

const DEFAULT_SEED_COUNT: usize = 32;

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

struct Options {
    verbose: bool,
    seeds: usize,
    seed: Option<String>,
    config: Option<String>,
    export: Option<String>,
}

impl Options {
    fn parse() -> Self {
        let args: Vec<String> = std::env::args().skip(1).collect();
        let value = |flag: &str| {
            args.iter()
                .position(|a| a == flag)
                .and_then(|i| args.get(i + 1))
                .cloned()
        };
        Self {
            verbose: args.iter().any(|a| a == "--verbose"),
            seeds: value("--seeds")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_SEED_COUNT),
            seed: value("--seed"),
            config: value("--config"),
            export: value("--export"),
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let options = Options::parse();
    println!("=== Warren Generation Harness ===\n");

    let mut results = Vec::new();

    // 1. Configuration
    let config = match load_config(&options, &mut results) {
        Some(c) => c,
        None => {
            finish(&results, options.verbose);
            return;
        }
    };

    if let Some(seed) = &options.seed {
        // Single seed: print the map and check just that layout
        let layout = match generate(&config, seed) {
            Ok(l) => l,
            Err(e) => {
                results.push(fail("generate", format!("seed {seed}: {e}")));
                finish(&results, options.verbose);
                return;
            }
        };
        println!("{}", render_ascii(&layout));
        results.extend(check_layout(&config, &layout));
        write_export(&options, &layout, &mut results);
        finish(&results, options.verbose);
        return;
    }

    // 2. Seed sweep
    results.extend(sweep_seeds(&config, &options));

    // 3. Placement scenarios
    results.extend(validate_placement_scenarios(options.verbose));

    // 4. Snapshot round trip
    results.extend(validate_snapshot(&config));

    finish(&results, options.verbose);
}

fn finish(results: &[TestResult], verbose: bool) {
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
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

fn pass(name: &str, detail: String) -> TestResult {
    TestResult {
        name: name.into(),
        passed: true,
        detail,
    }
}

fn fail(name: &str, detail: String) -> TestResult {
    TestResult {
        name: name.into(),
        passed: false,
        detail,
    }
}

fn check(name: &str, problems: Vec<String>, ok: String) -> TestResult {
    if problems.is_empty() {
        pass(name, ok)
    } else {
        let shown = problems.iter().take(3).cloned().collect::<Vec<_>>().join("; ");
        fail(name, format!("{} problems: {}", problems.len(), shown))
    }
}

fn generate(config: &LayoutConfig, seed: &str) -> Result<Layout, String> {
    let config = LayoutConfig {
        seed: seed.to_string(),
        use_random_seed: false,
        ..config.clone()
    };
    let mut generator = LayoutGenerator::new(config).map_err(|e| e.to_string())?;
    generator
        .run(&mut PlacementLog::default())
        .map_err(|e| e.to_string())
}

// ── 1. Configuration ────────────────────────────────────────────────────

fn load_config(options: &Options, results: &mut Vec<TestResult>) -> Option<LayoutConfig> {
    println!("--- Configuration ---");

    let issues = validate_config(&LayoutConfig::default());
    results.push(check(
        "default_config_valid",
        issues.iter().map(|i| i.to_string()).collect(),
        "built-in defaults pass validation".into(),
    ));

    match LayoutConfig::from_json(SAMPLE_CONFIG_JSON) {
        Ok(c) => results.push(pass(
            "sample_config_parse",
            format!(
                "{} corridors + {} rooms requested",
                c.additional_corridors, c.additional_rooms
            ),
        )),
        Err(e) => results.push(fail("sample_config_parse", e.to_string())),
    }

    match &options.config {
        Some(path) => match LayoutConfig::from_file(path) {
            Ok(c) => {
                results.push(pass("config_load", format!("loaded {path}")));
                Some(c)
            }
            Err(e) => {
                results.push(fail("config_load", format!("{path}: {e}")));
                None
            }
        },
        None => LayoutConfig::from_json(SAMPLE_CONFIG_JSON).ok(),
    }
}

fn write_export(options: &Options, layout: &Layout, results: &mut Vec<TestResult>) {
    let Some(path) = &options.export else {
        return;
    };
    let written = export_json(layout)
        .map_err(|e| e.to_string())
        .and_then(|json| std::fs::write(path, json).map_err(|e| e.to_string()));
    results.push(match written {
        Ok(()) => pass("export_written", format!("diagnostic export in {path}")),
        Err(e) => fail("export_written", format!("{path}: {e}")),
    });
}

// ── 2. Seed sweep ───────────────────────────────────────────────────────

fn sweep_seeds(config: &LayoutConfig, options: &Options) -> Vec<TestResult> {
    println!("--- Seed sweep ({} seeds) ---", options.seeds);
    let mut results = Vec::new();
    let mut layouts = Vec::new();
    let mut errors = Vec::new();

    for i in 0..options.seeds {
        let seed = format!("sweep-{i}");
        match generate(config, &seed) {
            Ok(layout) => layouts.push(layout),
            Err(e) => errors.push(format!("{seed}: {e}")),
        }
    }
    results.push(check(
        "sweep_generates",
        errors,
        format!("{} layouts generated", layouts.len()),
    ));

    let mut per_check: Vec<TestResult> = Vec::new();
    for layout in &layouts {
        for r in check_layout(config, layout) {
            match per_check.iter_mut().find(|p| p.name == r.name) {
                Some(existing) if existing.passed && !r.passed => *existing = r,
                Some(_) => {}
                None => per_check.push(r),
            }
        }
    }
    results.extend(per_check);

    // Determinism: replay the first few seeds
    let mismatched: Vec<String> = layouts
        .iter()
        .take(4)
        .filter(|l| generate(config, &l.seed).map(|r| &r != *l).unwrap_or(true))
        .map(|l| l.seed.clone())
        .collect();
    results.push(check(
        "sweep_deterministic",
        mismatched,
        "replayed seeds reproduce identical layouts".into(),
    ));

    if options.verbose && !layouts.is_empty() {
        let regions: usize = layouts.iter().map(|l| l.registry.len()).sum();
        let exhausted = layouts.iter().filter(|l| l.room_growth.exhausted).count();
        println!(
            "  avg {:.1} regions per layout, room budget exhausted in {} of {}",
            regions as f32 / layouts.len() as f32,
            exhausted,
            layouts.len()
        );
    }
    results
}

/// Structural invariants of one finished layout.
fn check_layout(config: &LayoutConfig, layout: &Layout) -> Vec<TestResult> {
    let regions = layout.registry.regions();
    let seed = &layout.seed;

    let margin = config.overlap_margin;
    let mut overlaps = Vec::new();
    for (i, a) in regions.iter().enumerate() {
        for b in &regions[i + 1..] {
            if let Some(shared) = a.outer.intersection(&b.outer) {
                if shared.width > margin && shared.height > margin {
                    overlaps.push(format!("{seed}: {} and {} share {}", a.id, b.id, shared));
                }
            }
        }
    }

    let mut bad_connections = Vec::new();
    for a in regions {
        for opening in &a.connections {
            let partner = regions
                .iter()
                .find(|b| b.id != a.id && b.connections.contains(opening));
            let valid = partner
                .and_then(|b| a.outer.intersection(&b.outer))
                .is_some_and(|shared| shared.contains_rect(opening));
            if !valid {
                bad_connections.push(format!("{seed}: {} opening {}", a.id, opening));
            }
        }
    }

    let corridor = SizeRequest::corridor(config.corridor_width, config.corridor_length);
    let mut bad_sizes = Vec::new();
    for r in regions {
        let (w, h) = (r.outer.width, r.outer.height);
        let ok = match (r.kind, r.entry) {
            (RegionKind::Corridor, Some(entry)) => {
                let (xr, yr) = corridor.world_ranges(entry.opposite());
                xr.contains(w) && yr.contains(h)
            }
            (RegionKind::ClassRoom, _) => config.room_size.contains(w) && config.room_size.contains(h),
            _ => true,
        };
        if !ok {
            bad_sizes.push(format!("{seed}: {r}"));
        }
    }

    let mut closed_doors = Vec::new();
    for r in regions {
        for opening in &r.connections {
            let open = r.doorway(opening).cells().all(|c| {
                layout.tiles.get(c).map(|t| t.class) == Some(TileClass::Connection)
            });
            if !open {
                closed_doors.push(format!("{seed}: {} doorway {}", r.id, opening));
            }
        }
    }

    let budget = config.max_generation_attempts;
    let streaks_ok = layout.corridor_growth.longest_failure_streak <= budget
        && layout.room_growth.longest_failure_streak <= budget;

    vec![
        check("no_overlap", overlaps, "regions share at most one edge line".into()),
        check(
            "connections_on_shared_edge",
            bad_connections,
            "every opening lies on its two regions' shared edge".into(),
        ),
        check("sizes_in_range", bad_sizes, "grown regions within configured ranges".into()),
        check("doorways_open", closed_doors, "every doorway rasterized as connection".into()),
        if streaks_ok {
            pass("growth_terminates", format!("failure streaks within budget {budget}"))
        } else {
            fail("growth_terminates", format!("{seed}: failure streak exceeded {budget}"))
        },
    ]
}

// ── 3. Placement scenarios ──────────────────────────────────────────────

fn validate_placement_scenarios(verbose: bool) -> Vec<TestResult> {
    println!("--- Placement scenarios ---");
    let mut results = Vec::new();
    let width = SizeRange::new(2, 4);
    let length = SizeRange::new(10, 20);
    let request = SizeRequest::corridor(width, length);

    let mut registry = RegionRegistry::new(Rect::new(-200, -200, 400, 400));
    let long = registry.add(
        Region::new(
            Rect::new(0, 0, 30, 8),
            RegionKind::Corridor,
            None,
            &WallThickness::default(),
        ),
        RegionRole::Corridor,
    );
    let short = registry.add(
        Region::new(
            Rect::new(100, 100, 3, 3),
            RegionKind::Corridor,
            None,
            &WallThickness::default(),
        ),
        RegionRole::Corridor,
    );
    let search = PlacementSearch::new(&registry, PlacementSettings::default());

    let mut misses = Vec::new();
    if let Some(anchor) = registry.get(long) {
        let wall = anchor.wall(Direction::North);
        for seed in 0..100 {
            let mut rng = LayoutRng::from_u64(seed);
            match search.find(wall, &request, &mut rng) {
                Some(r) if width.contains(r.outer.width) && length.contains(r.outer.height) => {}
                Some(r) => misses.push(format!("seed {seed}: {} out of range", r.outer)),
                None => misses.push(format!("seed {seed}: no fit")),
            }
        }
    }
    results.push(check(
        "long_wall_fits",
        misses,
        "extent-30 wall always fits a [2|4]x[10|20] corridor".into(),
    ));

    let mut accepted = Vec::new();
    if let Some(anchor) = registry.get(short) {
        for d in Direction::ALL {
            let mut rng = LayoutRng::from_u64(7);
            if search.find(anchor.wall(d), &request, &mut rng).is_some() || rng.draws() > 0 {
                accepted.push(format!("{d} wall was searched"));
            }
        }
    }
    results.push(check(
        "short_wall_rejected",
        accepted,
        "extent-3 walls rejected before sampling".into(),
    ));

    if verbose {
        println!("  {} anchors registered for scenarios", registry.len());
    }
    results
}

// ── 4. Snapshots ────────────────────────────────────────────────────────

fn validate_snapshot(config: &LayoutConfig) -> Vec<TestResult> {
    println!("--- Snapshots ---");
    let layout = match generate(config, "snapshot") {
        Ok(l) => l,
        Err(e) => return vec![fail("snapshot_roundtrip", e)],
    };
    let mut buffer = Vec::new();
    let restored = save_layout(&mut buffer, &layout)
        .and_then(|()| load_layout(buffer.as_slice()))
        .map_err(|e| e.to_string());
    vec![match restored {
        Ok(r) if r == layout => pass(
            "snapshot_roundtrip",
            format!("{} bytes, {} regions", buffer.len(), r.registry.len()),
        ),
        Ok(_) => fail("snapshot_roundtrip", "restored layout differs".into()),
        Err(e) => fail("snapshot_roundtrip", e),
    }]
}
