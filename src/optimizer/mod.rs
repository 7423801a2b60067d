pub mod baseline;
pub mod combinations;
pub mod eligibility;
pub mod engine;
pub mod meet;
pub mod rng;
pub mod scoring;
pub mod team_builder;

use tracing::info;

use crate::config::OptimizerConfig;
use crate::data::validate::validate_meet;
use crate::error::OptimizeError;
use crate::model::{OptimizationResult, Participant, RunSummary, Slot};
use crate::optimizer::baseline::{generate_baselines_with_progress, BaselineTable};
use crate::optimizer::engine::{CancellationToken, Engine};
use crate::optimizer::meet::Meet;
use crate::parallel::{Progress, ProgressUpdate, Stage, WorkerPool};

/// Runs the whole pipeline with no progress reporting and no cancellation.
pub fn optimize(
    participants: &[Participant],
    slots: &[Slot],
    config: &OptimizerConfig,
) -> Result<OptimizationResult, OptimizeError> {
    optimize_with_progress(participants, slots, config, &CancellationToken::new(), |_| {})
}

/// Validates the meet, builds baselines, then runs fill, gap fill and local
/// search. Cancellation stops local search early; the partial solution is
/// still finalized and returned with `summary.cancelled` set.
pub fn optimize_with_progress<F>(
    participants: &[Participant],
    slots: &[Slot],
    config: &OptimizerConfig,
    cancel: &CancellationToken,
    on_progress: F,
) -> Result<OptimizationResult, OptimizeError>
where
    F: FnMut(&ProgressUpdate),
{
    config.validate()?;
    let report = validate_meet(participants, slots);
    if report.has_errors() {
        return Err(OptimizeError::Precondition(report));
    }

    let seed = config.resolve_seed();
    let meet = Meet::new(participants, slots, config.reference_date());
    let mut progress = Progress::new(on_progress, config.progress_interval());
    info!(seed, participants = participants.len(), slots = slots.len(), "optimization started");

    let baselines = build_baselines(&meet, config, seed, &mut progress);

    let mut engine = Engine::new(&meet, &baselines, config, seed);
    engine.initial_fill(&mut progress);
    engine.gap_fill(&mut progress);
    let stats = engine.local_search(&mut progress, cancel);
    let mut result = engine.finalize(&mut progress);
    result.summary = RunSummary {
        seed,
        baselines: baselines.len(),
        iterations: stats.iterations,
        swaps: stats.swaps,
        cancelled: stats.cancelled,
    };

    progress.milestone(
        Stage::Complete,
        format!(
            "Optimization complete: {} assigned, {} skipped",
            result.assignments.len(),
            result.skipped.len()
        ),
    );
    info!(
        assigned = result.assignments.len(),
        skipped = result.skipped.len(),
        total_z = result.total_z_score,
        "optimization finished"
    );
    Ok(result)
}

/// Baselines alone, for inspection. Applies the same validation as
/// [optimize]. Returns the seed used alongside the table.
pub fn baselines_for(
    participants: &[Participant],
    slots: &[Slot],
    config: &OptimizerConfig,
) -> Result<(u64, BaselineTable), OptimizeError> {
    config.validate()?;
    let report = validate_meet(participants, slots);
    if report.has_errors() {
        return Err(OptimizeError::Precondition(report));
    }
    let seed = config.resolve_seed();
    let meet = Meet::new(participants, slots, config.reference_date());
    let mut progress = Progress::new(|_: &ProgressUpdate| {}, config.progress_interval());
    Ok((seed, build_baselines(&meet, config, seed, &mut progress)))
}

fn build_baselines<F>(
    meet: &Meet<'_>,
    config: &OptimizerConfig,
    seed: u64,
    progress: &mut Progress<F>,
) -> BaselineTable
where
    F: FnMut(&ProgressUpdate),
{
    progress.milestone(Stage::Baselines, "Generating baselines...");
    let pool = WorkerPool::with_workers(config.worker_threads);
    generate_baselines_with_progress(meet, &config.baseline_settings(seed), &pool, |done, total| {
        progress.update(Stage::Baselines, || format!("Baselines {done}/{total}"));
    })
}
