//! Generate baselines once serially and once in parallel, then print timings
//! and speedup.
//!
//! Usage: cargo run --release --bin benchmark_baseline_speedup [roster_size]

use std::env;
use std::time::Instant;

use chrono::NaiveDate;

use anchorleg::data::synthetic::synthetic_meet;
use anchorleg::optimizer::baseline::{generate_baselines, BaselineSettings};
use anchorleg::optimizer::meet::Meet;

fn main() {
    let size = env::args()
        .nth(1)
        .and_then(|raw| raw.parse::<usize>().ok())
        .unwrap_or(80);
    let seed = 12345u64;
    let meet_file = synthetic_meet(seed, size);
    let reference = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap_or_default();
    let meet = Meet::new(&meet_file.participants, &meet_file.slots, reference);

    let serial = BaselineSettings {
        samples: 200,
        parallel: false,
        seed,
        ..BaselineSettings::default()
    };
    let parallel = BaselineSettings {
        parallel: true,
        ..serial
    };

    println!(
        "Baselines: {} participants, {} slots, {} samples per band",
        size,
        meet_file.slots.len(),
        serial.samples
    );
    println!();

    let t0 = Instant::now();
    let table_seq = generate_baselines(&meet, &serial);
    let seq_ms = t0.elapsed().as_secs_f64() * 1000.0;
    println!("Sequential:  {:.2} ms  ({} baselines)", seq_ms, table_seq.len());

    let t0 = Instant::now();
    let table_par = generate_baselines(&meet, &parallel);
    let par_ms = t0.elapsed().as_secs_f64() * 1000.0;
    println!("Parallel:    {:.2} ms  ({} baselines)", par_ms, table_par.len());

    println!();
    println!("Speedup:     {:.2}x faster (parallel vs sequential)", seq_ms / par_ms);

    if table_seq.entries() == table_par.entries() {
        println!("(Results match sequential vs parallel)");
    } else {
        eprintln!("sequential and parallel baselines differ");
        std::process::exit(1);
    }
}
