//! PNGA CLI — evolve DAG models of replicate time-series data
//!
//! Commands:
//!   pnga run   — full search from a config file and a replicate file
//!   pnga demo  — small search over synthetic data
//!   pnga help  — usage

use pnga_core::engine::configure_threads;
use pnga_core::{Engine, GaConfig, GaReport, Model, Paradigm, ReplicateSet};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_OUT_DIR: &str = "pnga-out";

fn print_usage() {
    println!(
        r#"
PNGA v0.1 — Patton–Norris Genetic Algorithm

Usage: pnga <command> [options]

Commands:
  run   <config.json> <data.json> [out_dir]   Run the full search
  demo  [out_dir]                             Search synthetic data with quick settings
  help                                        Show this message

Data file:
  {{ "name": "...", "entity_names": [...], "replicates": [[[t0...], [t1...]], ...],
    "log_transform": false, "zscore_transform": false }}

Examples:
  pnga run config.json yeast.json results
  pnga demo
"#
    );
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        print_usage();
        return;
    }

    let result = match args[1].as_str() {
        "run" => cmd_run(&args[2..]),
        "demo" => cmd_demo(&args[2..]),
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {}", other);
            print_usage();
            return;
        }
    };

    if let Err(e) = result {
        eprintln!("  Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_run(args: &[String]) -> pnga_core::Result<()> {
    if args.len() < 2 {
        eprintln!("Usage: pnga run <config.json> <data.json> [out_dir]");
        return Ok(());
    }
    let config = GaConfig::load(&args[0])?;
    let data = ReplicateSet::load(&args[1])?;
    let out_dir = PathBuf::from(args.get(2).map(String::as_str).unwrap_or(DEFAULT_OUT_DIR));
    search(config, &data, &out_dir)
}

fn cmd_demo(args: &[String]) -> pnga_core::Result<()> {
    let config = GaConfig {
        seed: Some(2016),
        ..GaConfig::quick()
    };
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let data = ReplicateSet::synthetic(&mut rng, 3, 10, config.gene_count, 2, 0.85)?;
    let out_dir = PathBuf::from(args.first().map(String::as_str).unwrap_or(DEFAULT_OUT_DIR));
    println!(
        "\n  Demo: {} entities, {} replicates x {} time points -> {}",
        data.entity_count(),
        data.replicate_count(),
        data.time_points(),
        out_dir.display()
    );
    search(config, &data, &out_dir)
}

fn search(config: GaConfig, data: &ReplicateSet, out_dir: &Path) -> pnga_core::Result<()> {
    configure_threads(config.threads)?;
    let mut rng = match config.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };

    let engine = Engine::new(config, data)?;
    let report = engine.run(&mut rng)?;
    write_outputs(&report, out_dir)?;

    println!("\n  AMALGAMATED MODEL (ROUNDED TO 3 DECIMALS)");
    print!("{}", report.amalgamated);
    println!("\n  Results written to {}", out_dir.display());
    Ok(())
}

fn write_outputs(report: &GaReport, out_dir: &Path) -> pnga_core::Result<()> {
    fs::create_dir_all(out_dir)?;
    let name = &report.data_name;
    let names = &report.entity_names;
    let threshold = report.config.edge_threshold;
    let paradigm = report.config.paradigm;

    for run in &report.composites {
        let stem = format!("{} - {}", name, run.run);
        fs::write(
            out_dir.join(format!("{stem} (Representative).txt")),
            run.representative.genes.to_text(),
        )?;
        write_model(out_dir, &format!("{stem} (Composite Model)"), &run.model, names, threshold, paradigm)?;
    }
    write_model(
        out_dir,
        &format!("{name} (Amalgamated Model)"),
        &report.amalgamated,
        names,
        threshold,
        paradigm,
    )?;
    report.save(out_dir.join(format!("{name} (Report).json")))
}

fn write_model(
    out_dir: &Path,
    stem: &str,
    model: &Model,
    names: &[String],
    threshold: f64,
    paradigm: Paradigm,
) -> pnga_core::Result<()> {
    fs::write(out_dir.join(format!("{stem}.txt")), model.to_text())?;
    fs::write(
        out_dir.join(format!("{stem}.dot")),
        model.to_dot(names, threshold, paradigm)?,
    )?;
    Ok(())
}
