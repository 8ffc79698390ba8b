//! Roomforge Headless Generation Harness
//!
//! Validates the bundled template library and runs layout generation over a
//! sweep of seeds, checking every layout. Runs entirely in-process with no
//! engine, no networking, no rendering.
//!
//! Usage:
//!   cargo run -p roomforge-simtest
//!   cargo run -p roomforge-simtest -- --verbose --seeds 200 --rooms 40
//!   cargo run -p roomforge-simtest -- --seed 7 --json
//!
//! Set `RUST_LOG=debug` to see per-branch generation logs.

use roomforge_logic::config::{validate_params, GenerationParams};
use roomforge_logic::error::GenerationError;
use roomforge_logic::templates::{validate_library, Category, TemplateLibrary};
use roomforge_logic::validate::{self, Severity};
use roomforge_logic::{generate, GenerationOutput};
use serde::Serialize;

// ── Bundled data (same JSON the tests use) ──────────────────────────────
const LIBRARY_JSON: &str = include_str!("../../../data/module_library.json");
const PARAMS_JSON: &str = include_str!("../../../data/generation.json");

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

struct Options {
    verbose: bool,
    json: bool,
    seed: u64,
    seeds: u64,
    rooms: Option<u32>,
}

fn arg_value<T: std::str::FromStr>(args: &[String], flag: &str) -> Option<T> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|v| v.parse().ok())
}

fn parse_options() -> Options {
    let args: Vec<String> = std::env::args().collect();
    Options {
        verbose: args.iter().any(|a| a == "--verbose"),
        json: args.iter().any(|a| a == "--json"),
        seed: arg_value(&args, "--seed").unwrap_or(0),
        seeds: arg_value(&args, "--seeds").unwrap_or(50),
        rooms: arg_value(&args, "--rooms"),
    }
}

#[derive(Serialize)]
struct Dump<'a> {
    seed: u64,
    stats: &'a roomforge_logic::GenerationStats,
    records: &'a [roomforge_logic::broadcast::PlacementRecord],
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let opts = parse_options();

    let (library, mut params) = match load_bundled() {
        Ok(data) => data,
        Err(e) => {
            eprintln!("bundled data error: {}", e);
            std::process::exit(1);
        }
    };
    if let Some(rooms) = opts.rooms {
        params.room_count = rooms;
    }

    if opts.json {
        dump_json(&library, &params, opts.seed);
        return;
    }

    println!("=== Roomforge Generation Harness ===\n");

    let mut results = Vec::new();

    // 1. Template library
    results.extend(validate_template_library(&library, opts.verbose));

    // 2. Generation parameters
    results.extend(validate_generation_params(&params));

    // 3. Seed sweep
    results.extend(validate_seed_sweep(&library, &params, &opts));

    // 4. Determinism
    results.extend(validate_determinism(&library, &params, opts.seed));

    // 5. Boundary cases
    results.extend(validate_boundaries(&library, &params));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || opts.verbose {
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

fn load_bundled() -> Result<(TemplateLibrary, GenerationParams), GenerationError> {
    let library = TemplateLibrary::from_json(LIBRARY_JSON)?;
    let params = GenerationParams::from_json(PARAMS_JSON)?;
    Ok((library, params))
}

fn dump_json(library: &TemplateLibrary, params: &GenerationParams, seed: u64) {
    match generate(library, params, seed) {
        Ok(out) => {
            let dump = Dump {
                seed,
                stats: &out.stats,
                records: &out.records,
            };
            match serde_json::to_string_pretty(&dump) {
                Ok(s) => println!("{}", s),
                Err(e) => {
                    eprintln!("serialize error: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Err(e) => {
            eprintln!("generation failed: {}", e);
            std::process::exit(1);
        }
    }
}

// ── 1. Template Library ─────────────────────────────────────────────────

fn validate_template_library(library: &TemplateLibrary, verbose: bool) -> Vec<TestResult> {
    println!("--- Template Library ---");
    let mut results = Vec::new();

    let errors = validate_library(library);
    results.push(TestResult {
        name: "library_valid".into(),
        passed: errors.is_empty(),
        detail: if errors.is_empty() {
            format!("{} templates loaded", library.len())
        } else {
            errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; ")
        },
    });

    let spawn = library.by_category(Category::Spawn).len();
    let normal = library.by_category(Category::Normal).len();
    let ending = library.by_category(Category::Ending).len();
    results.push(TestResult {
        name: "library_has_growth_templates".into(),
        passed: normal > 0,
        detail: format!("spawn={} normal={} ending={}", spawn, normal, ending),
    });

    if verbose {
        println!("  Templates:");
        for (_, t) in library.iter() {
            println!(
                "    {:14} {:?} {}×{} w={} sockets={} slots={}",
                t.id,
                t.category,
                t.footprint.width,
                t.footprint.depth,
                t.weight,
                t.sockets.len(),
                t.galleries.iter().map(|g| g.slots.len()).sum::<usize>()
            );
        }
    }

    results
}

// ── 2. Generation Parameters ────────────────────────────────────────────

fn validate_generation_params(params: &GenerationParams) -> Vec<TestResult> {
    println!("--- Generation Parameters ---");
    let errors = validate_params(params);
    vec![TestResult {
        name: "params_valid".into(),
        passed: errors.is_empty(),
        detail: if errors.is_empty() {
            format!(
                "rooms={} budget={} cell={} force_endings={}",
                params.room_count, params.attempt_budget, params.cell_size, params.force_endings
            )
        } else {
            errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; ")
        },
    }]
}

// ── 3. Seed Sweep ───────────────────────────────────────────────────────

fn validate_seed_sweep(
    library: &TemplateLibrary,
    params: &GenerationParams,
    opts: &Options,
) -> Vec<TestResult> {
    println!("--- Seed Sweep ({} seeds from {}) ---", opts.seeds, opts.seed);
    let mut results = Vec::new();

    let mut failures = Vec::new();
    let mut invalid = Vec::new();
    let mut warnings = 0usize;
    let mut rooms_total = 0u64;
    let mut full_layouts = 0u64;
    let mut open_total = 0u64;
    let mut content_total = 0u64;

    for seed in opts.seed..opts.seed.saturating_add(opts.seeds) {
        let out = match generate(library, params, seed) {
            Ok(o) => o,
            Err(e) => {
                failures.push(format!("seed {}: {}", seed, e));
                continue;
            }
        };
        let issues = validate_layout(&out, params);
        warnings += issues.iter().filter(|e| e.severity == Severity::Warning).count();
        if let Some(err) = issues.iter().find(|e| e.severity == Severity::Error) {
            invalid.push(format!("seed {}: [{}] {}", seed, err.category, err.message));
        }
        rooms_total += out.stats.rooms_placed as u64;
        if out.stats.rooms_placed == params.room_count {
            full_layouts += 1;
        }
        open_total += out.stats.connectors_open as u64;
        content_total += out.stats.content_placed as u64;

        if opts.verbose {
            println!(
                "  seed {:4}: rooms={:3} caps={:3} content={:3} open={:3} failed_attempts={}",
                seed,
                out.stats.rooms_placed,
                out.stats.caps_placed,
                out.stats.content_placed,
                out.stats.connectors_open,
                out.stats.failed_attempts
            );
        }
    }

    results.push(TestResult {
        name: "sweep_no_fatal_errors".into(),
        passed: failures.is_empty(),
        detail: if failures.is_empty() {
            "every seed generated".into()
        } else {
            format!("{} failed, e.g. {}", failures.len(), failures[0])
        },
    });

    results.push(TestResult {
        name: "sweep_layouts_valid".into(),
        passed: invalid.is_empty(),
        detail: if invalid.is_empty() {
            format!("all layouts valid ({} warnings)", warnings)
        } else {
            format!("{} invalid, e.g. {}", invalid.len(), invalid[0])
        },
    });

    let n = opts.seeds.max(1);
    results.push(TestResult {
        name: "sweep_room_fill".into(),
        passed: full_layouts > 0 || opts.seeds == 0,
        detail: format!(
            "{}/{} layouts hit {} rooms, avg {:.1} rooms, {:.1} open connectors, {:.1} content",
            full_layouts,
            opts.seeds,
            params.room_count,
            rooms_total as f64 / n as f64,
            open_total as f64 / n as f64,
            content_total as f64 / n as f64
        ),
    });

    results
}

fn validate_layout(out: &GenerationOutput, params: &GenerationParams) -> Vec<validate::ValidationError> {
    let grown = out.stats.rooms_placed.saturating_sub(1);
    validate::validate_all(&out.layout, params.origin, grown, params.room_count)
}

// ── 4. Determinism ──────────────────────────────────────────────────────

fn validate_determinism(library: &TemplateLibrary, params: &GenerationParams, seed: u64) -> Vec<TestResult> {
    println!("--- Determinism ---");
    let a = generate(library, params, seed);
    let b = generate(library, params, seed);
    let same = match (&a, &b) {
        (Ok(a), Ok(b)) => a.records == b.records,
        _ => false,
    };
    vec![TestResult {
        name: "determinism_same_seed".into(),
        passed: same,
        detail: match &a {
            Ok(out) => format!("seed {} → {} records, identical across runs", seed, out.records.len()),
            Err(e) => format!("seed {} failed: {}", seed, e),
        },
    }]
}

// ── 5. Boundaries ───────────────────────────────────────────────────────

fn validate_boundaries(library: &TemplateLibrary, params: &GenerationParams) -> Vec<TestResult> {
    println!("--- Boundaries ---");
    let mut results = Vec::new();

    let single = GenerationParams {
        room_count: 1,
        ..params.clone()
    };
    let (passed, detail) = match generate(library, &single, 0) {
        Ok(out) => (
            out.layout.modules.len() == 1 && out.stats.caps_placed == 0,
            format!("{} modules placed for room_count=1", out.layout.modules.len()),
        ),
        Err(e) => (false, e.to_string()),
    };
    results.push(TestResult {
        name: "boundary_single_room".into(),
        passed,
        detail,
    });

    let no_endings = TemplateLibrary::new(
        library
            .iter()
            .filter(|(_, t)| t.category != Category::Ending)
            .map(|(_, t)| t.clone())
            .collect(),
    );
    let forced = GenerationParams {
        force_endings: true,
        ..params.clone()
    };
    let (passed, detail) = match generate(&no_endings, &forced, 0) {
        Ok(out) => (
            out.stats.caps_placed == 0 && out.stats.rooms_placed > 1,
            format!(
                "{} rooms without ending templates",
                out.stats.rooms_placed
            ),
        ),
        Err(e) => (false, e.to_string()),
    };
    results.push(TestResult {
        name: "boundary_force_endings_without_endings".into(),
        passed,
        detail,
    });

    results
}
