//! Delivery scenario runner CLI
//!
//! Usage:
//!   cargo run --bin test-scenarios              # Run all scenarios
//!   cargo run --bin test-scenarios -- input/    # Run category
//!   cargo run --bin test-scenarios -- delivery/swing_full_strength  # Run single scenario
//!   cargo run --bin test-scenarios -- --verbose # Show expected/actual on failure
//!   cargo run --bin test-scenarios -- --list    # Print scenarios without running

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use bowling::testing::{SCENARIOS_DIR, TestResult, parse_test_file, run_test};

fn main() {
    let args: Vec<String> = env::args().collect();

    let mut verbose = false;
    let mut list_only = false;
    let mut filter: Option<String> = None;

    for arg in args.iter().skip(1) {
        match arg.as_str() {
            "--verbose" | "-v" => verbose = true,
            "--list" | "-l" => list_only = true,
            other if !other.starts_with('-') => filter = Some(other.to_string()),
            _ => {}
        }
    }

    let scenarios_path = Path::new(SCENARIOS_DIR);
    if !scenarios_path.exists() {
        eprintln!("No scenarios directory found at {}", SCENARIOS_DIR);
        std::process::exit(1);
    }

    let scenarios = discover_scenarios(scenarios_path, filter.as_deref());
    if scenarios.is_empty() {
        eprintln!(
            "No scenario files found{}",
            filter.map(|f| format!(" matching '{}'", f)).unwrap_or_default()
        );
        std::process::exit(1);
    }

    println!("Delivery Scenarios");
    println!("==================\n");

    let mut passed = 0;
    let mut failures: Vec<String> = Vec::new();
    let mut current_category = String::new();

    for path in &scenarios {
        let rel_path = path.strip_prefix(scenarios_path).unwrap_or(path);
        let category = rel_path
            .parent()
            .map(|p| p.to_string_lossy().to_string())
            .unwrap_or_default();
        if category != current_category && !category.is_empty() {
            if !current_category.is_empty() {
                println!();
            }
            println!("{}/", category);
            current_category = category;
        }

        let name = rel_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let definition = match parse_test_file(path) {
            Ok(def) => def,
            Err(message) => {
                print_result(&name, &TestResult::Error { message }, verbose);
                failures.push(rel_path.display().to_string());
                continue;
            }
        };

        if list_only {
            println!(
                "  {:<32} {}",
                name,
                definition.description.as_deref().unwrap_or(&definition.name)
            );
            continue;
        }

        let result = run_test(&definition);
        if matches!(result, TestResult::Pass { .. }) {
            passed += 1;
        } else {
            failures.push(rel_path.display().to_string());
        }
        print_result(&name, &result, verbose);
    }

    if list_only {
        return;
    }

    println!("\n==================");
    println!("Results: {} passed, {} failed", passed, failures.len());
    for failure in &failures {
        println!("  - {}", failure);
    }

    if !failures.is_empty() {
        std::process::exit(1);
    }
}

/// All `.toml` files below `base` whose relative path contains `filter`
fn discover_scenarios(base: &Path, filter: Option<&str>) -> Vec<PathBuf> {
    let mut found = Vec::new();
    let mut pending = vec![base.to_path_buf()];
    while let Some(dir) = pending.pop() {
        let Ok(entries) = fs::read_dir(&dir) else {
            continue;
        };
        for path in entries.flatten().map(|e| e.path()) {
            if path.is_dir() {
                pending.push(path);
            } else if path.extension().is_some_and(|e| e == "toml") {
                let rel = path.strip_prefix(base).unwrap_or(&path).to_string_lossy().to_string();
                if filter.is_none_or(|f| rel.contains(f)) {
                    found.push(path);
                }
            }
        }
    }
    found.sort();
    found
}

fn print_result(name: &str, result: &TestResult, verbose: bool) {
    let dots = ".".repeat(40 - name.len().min(39));

    match result {
        TestResult::Pass { frames } => {
            println!("  {} {} PASS ({} ticks)", name, dots, frames);
        }
        TestResult::Fail { error } => {
            println!("  {} {} FAIL", name, dots);
            if verbose {
                println!("    {}", error);
            } else {
                println!("    {}", error.message);
            }
        }
        TestResult::Error { message } => {
            println!("  {} {} ERROR", name, dots);
            println!("    {}", message);
        }
    }
}
