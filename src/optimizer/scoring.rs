//! Normalized team scores. The z-score is the objective the engine maximizes;
//! placement value is a bounded display figure derived from it.

use crate::model::{Participant, ResultBand, Slot, Team};
use crate::optimizer::baseline::{Baseline, BaselineTable};
use crate::optimizer::eligibility::best_leg_time;
use crate::optimizer::meet::Meet;

/// Points for the highest threshold a z-score exceeds, best first.
pub const PLACEMENT_POINTS: [u32; 6] = [20, 18, 16, 14, 12, 10];
/// Awarded when no threshold is exceeded.
pub const PARTICIPATION_POINTS: u32 = 2;
/// Thresholds at competition level 3; each level above adds 0.5.
const LEVEL_THREE_THRESHOLDS: [f64; 6] = [2.0, 1.5, 1.0, 0.5, 0.0, -0.5];
/// Estimated contribution for a participant with no usable leg.
pub const NO_TIME_CONTRIBUTION: f64 = -10.0;

/// Standard deviations faster than the band mean; 0 without a baseline or
/// when the baseline has zero spread.
pub fn z_score(team: &Team, baselines: &BaselineTable) -> f64 {
    z_against(baselines.get(team.slot_id, team.band), team.time())
}

fn z_against(baseline: Option<&Baseline>, time: f64) -> f64 {
    match baseline {
        Some(baseline) if baseline.std_dev > 0.0 && time.is_finite() => {
            (baseline.mean - time) / baseline.std_dev
        }
        _ => 0.0,
    }
}

/// Descending thresholds for a level; out-of-range levels use level 3.
pub fn placement_thresholds(competition_level: u8) -> [f64; 6] {
    let level = if (1..=5).contains(&competition_level) {
        competition_level
    } else {
        3
    };
    let shift = 0.5 * (f64::from(level) - 3.0);
    LEVEL_THREE_THRESHOLDS.map(|threshold| threshold + shift)
}

pub fn placement_value(z_score: f64, competition_level: u8) -> u32 {
    placement_thresholds(competition_level)
        .iter()
        .zip(PLACEMENT_POINTS)
        .find(|(threshold, _)| z_score > **threshold)
        .map(|(_, points)| points)
        .unwrap_or(PARTICIPATION_POINTS)
}

/// Approximate share of a held team's score owed to one member: the team's
/// z-score scaled by the member's share of the team time.
pub fn marginal_contribution(team: &Team, participant: usize, baselines: &BaselineTable) -> f64 {
    let Some(leg) = team.leg_of(participant) else {
        return 0.0;
    };
    let total = team.time();
    if total <= 0.0 {
        return 0.0;
    }
    z_score(team, baselines) * (leg.seconds / total)
}

/// Individual z-score of a participant's best leg against a quarter of the
/// baseline for the band a typical team containing them would land in.
pub fn estimated_contribution(
    meet: &Meet<'_>,
    baselines: &BaselineTable,
    participant: usize,
    slot: &Slot,
) -> f64 {
    let record: &Participant = meet.participant(participant);
    let Some(time) = best_leg_time(record, slot) else {
        return NO_TIME_CONTRIBUTION;
    };
    let approx_total = f64::from(meet.age(participant)) + meet.mean_age() * 3.0;
    let band = ResultBand::from_total_age(approx_total.round().max(0.0) as u32);
    match baselines.get(slot.id, band) {
        Some(baseline) if baseline.std_dev > 0.0 => {
            (baseline.mean / 4.0 - time) / (baseline.std_dev / 4.0)
        }
        _ => 0.0,
    }
}
