use std::env;
use std::fmt::Write as _;

use serde::Serialize;

use crate::config::{OptimizerConfig, DEFAULT_CONFIG_PATH};
use crate::data::meet::{load_meet, write_meet, MeetFile};
use crate::data::synthetic::synthetic_meet;
use crate::data::validate::validate_meet;
use crate::model::OptimizationResult;
use crate::optimizer::baseline::BaselineEntry;
use crate::optimizer::{baselines_for, optimize};

const CONFIG_ENV: &str = "ANCHORLEG_CONFIG";
const SEED_ENV: &str = "ANCHORLEG_SEED";
const USAGE: &str = "usage: anchorleg <optimize|baseline|validate|generate>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Optimize,
    Baseline,
    Validate,
    Generate,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("optimize") => Some(Command::Optimize),
        Some("baseline") => Some(Command::Baseline),
        Some("validate") => Some(Command::Validate),
        Some("generate") => Some(Command::Generate),
        _ => None,
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    match parse_command(args) {
        Some(Command::Optimize) => handle_optimize(args),
        Some(Command::Baseline) => handle_baseline(args),
        Some(Command::Validate) => handle_validate(args),
        Some(Command::Generate) => handle_generate(args),
        None => {
            eprintln!("{USAGE}");
            2
        }
    }
}

fn handle_optimize(args: &[String]) -> i32 {
    let Some(path) = args.get(2) else {
        eprintln!("usage: anchorleg optimize <meet.json> [seed] [--table]");
        return 2;
    };
    let as_table = args.iter().any(|arg| arg == "--table");
    let seed_arg = args.get(3).filter(|arg| arg.as_str() != "--table");

    let Some(meet) = read_meet(path) else {
        return 1;
    };
    let Some(config) = load_config(seed_arg) else {
        return 1;
    };

    let result = match optimize(&meet.participants, &meet.slots, &config) {
        Ok(result) => result,
        Err(err) => {
            eprintln!("optimization failed: {err}");
            return 1;
        }
    };

    if as_table {
        print!("{}", render_table(&result));
        0
    } else {
        print_json(&result, "optimization result")
    }
}

#[derive(Debug, Serialize)]
struct BaselineReport {
    seed: u64,
    baselines: Vec<BaselineEntry>,
}

fn handle_baseline(args: &[String]) -> i32 {
    let Some(path) = args.get(2) else {
        eprintln!("usage: anchorleg baseline <meet.json> [seed]");
        return 2;
    };
    let Some(meet) = read_meet(path) else {
        return 1;
    };
    let Some(config) = load_config(args.get(3)) else {
        return 1;
    };

    match baselines_for(&meet.participants, &meet.slots, &config) {
        Ok((seed, table)) => print_json(
            &BaselineReport {
                seed,
                baselines: table.entries(),
            },
            "baselines",
        ),
        Err(err) => {
            eprintln!("baseline generation failed: {err}");
            1
        }
    }
}

fn handle_validate(args: &[String]) -> i32 {
    let Some(path) = args.get(2) else {
        eprintln!("usage: anchorleg validate <meet.json>");
        return 2;
    };
    let Some(meet) = read_meet(path) else {
        return 1;
    };

    let report = validate_meet(&meet.participants, &meet.slots);
    for diag in &report.diagnostics {
        eprintln!("- {diag}");
    }
    if report.has_errors() {
        eprintln!("validation failed: {} error(s)", report.errors().count());
        1
    } else {
        println!(
            "validation passed: {path} ({} participants, {} slots)",
            meet.participants.len(),
            meet.slots.len()
        );
        0
    }
}

fn handle_generate(args: &[String]) -> i32 {
    let out_flag = args.iter().position(|arg| arg == "--out");
    let out_path = out_flag.and_then(|index| args.get(index + 1));
    if out_flag.is_some() && out_path.is_none() {
        eprintln!("usage: anchorleg generate [size] [seed] [--out <meet.json>]");
        return 2;
    }
    let positional: Vec<&String> = args
        .iter()
        .enumerate()
        .skip(2)
        .filter(|(index, _)| out_flag.map_or(true, |flag| *index != flag && *index != flag + 1))
        .map(|(_, arg)| arg)
        .collect();
    let size = parse_usize_arg(positional.first().copied(), "size", 40);
    let seed = parse_u64_arg(positional.get(1).copied(), "seed", 7);
    let meet = synthetic_meet(seed, size);

    match out_path {
        Some(path) => match write_meet(path, &meet) {
            Ok(()) => {
                println!(
                    "wrote {path} ({} participants, {} slots)",
                    meet.participants.len(),
                    meet.slots.len()
                );
                0
            }
            Err(err) => {
                eprintln!("{err}");
                1
            }
        },
        None => print_json(&meet, "meet"),
    }
}

fn read_meet(path: &str) -> Option<MeetFile> {
    match load_meet(path) {
        Ok(meet) => Some(meet),
        Err(err) => {
            eprintln!("{err}");
            None
        }
    }
}

/// Config from `ANCHORLEG_CONFIG` (or the default path when present), with
/// the seed taken from the argument, then `ANCHORLEG_SEED`, then the file.
fn load_config(seed_arg: Option<&String>) -> Option<OptimizerConfig> {
    let path = env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let mut config = match OptimizerConfig::load_or_default(&path) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("failed to load config '{path}': {err}");
            return None;
        }
    };

    let env_seed = env::var(SEED_ENV).ok();
    if let Some(raw) = seed_arg.or(env_seed.as_ref()) {
        match raw.parse::<u64>() {
            Ok(seed) => config.seed = Some(seed),
            Err(_) => eprintln!("invalid seed '{raw}', ignoring"),
        }
    }
    Some(config)
}

fn print_json<T: Serialize>(value: &T, label: &str) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize {label}: {err}");
            1
        }
    }
}

pub fn render_table(result: &OptimizationResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "slot\tname\tband\trelay\ttime\tz_score\tpoints\tlegs");
    for assignment in &result.assignments {
        let legs: Vec<String> = assignment
            .legs
            .iter()
            .map(|leg| format!("{} ({} {:.2})", leg.name, leg.stroke, leg.seconds))
            .collect();
        let _ = writeln!(
            out,
            "{}\t{}\t{}\t{} ({}m)\t{:.2}\t{:.3}\t{}\t{}",
            assignment.slot_id,
            assignment.slot_name,
            assignment.band,
            assignment.relay,
            assignment.total_distance,
            assignment.time,
            assignment.z_score,
            assignment.placement_value,
            legs.join(" | ")
        );
    }
    for skip in &result.skipped {
        let _ = writeln!(out, "{}\t{}\tskipped\t{}", skip.slot_id, skip.slot_name, skip.reason);
    }
    for warning in &result.warnings {
        let _ = writeln!(out, "warning\t{}", warning.message);
    }
    let _ = writeln!(
        out,
        "total\t\t\t\t\t{:.3}\t{}",
        result.total_z_score, result.total_placement_points
    );
    out
}

fn parse_usize_arg(raw: Option<&String>, name: &str, default: usize) -> usize {
    raw.and_then(|value| value.parse::<usize>().ok())
        .unwrap_or_else(|| {
            if let Some(value) = raw {
                eprintln!("invalid {name} '{value}', defaulting to {default}");
            }
            default
        })
}

fn parse_u64_arg(raw: Option<&String>, name: &str, default: u64) -> u64 {
    raw.and_then(|value| value.parse::<u64>().ok())
        .unwrap_or_else(|| {
            if let Some(value) = raw {
                eprintln!("invalid {name} '{value}', defaulting to {default}");
            }
            default
        })
}
