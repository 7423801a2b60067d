//! Slot assignment: greedy initial fill, gap fill, bounded local search and
//! finalization.
//!
//! The engine owns the solution (slot position -> team) and the usage table.
//! Each public phase leaves every participant at or under quota and every
//! slot holding either a team-builder-validated team or nothing.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info, trace};

use crate::config::OptimizerConfig;
use crate::model::{
    Assignment, AssignmentLeg, Composition, Gender, OptimizationResult, ParticipantUsage, ResultBand,
    SkipReason, SkipRecord, Team, WarningKind,
};
use crate::optimizer::baseline::BaselineTable;
use crate::optimizer::combinations::Quartets;
use crate::optimizer::eligibility::{
    eligible_for_slot, eligible_under_quota, is_eligible, partition_by_gender, sort_by_speed,
};
use crate::optimizer::meet::Meet;
use crate::optimizer::rng::Rng;
use crate::optimizer::scoring::{
    estimated_contribution, marginal_contribution, placement_value, z_score,
};
use crate::optimizer::team_builder::{build_team, validate_team};
use crate::parallel::{Progress, ProgressUpdate, Stage};

/// Stream id for the local-search random source, disjoint from baseline streams.
const LOCAL_SEARCH_STREAM: u64 = u64::MAX;

/// Cooperative cancellation flag, checked between local-search iterations.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Per-participant slot counts and held slot positions.
#[derive(Debug, Clone)]
struct UsageTable {
    held: Vec<BTreeSet<usize>>,
    max: Vec<u32>,
}

impl UsageTable {
    fn new(meet: &Meet<'_>) -> Self {
        Self {
            held: vec![BTreeSet::new(); meet.participant_count()],
            max: meet
                .participants
                .iter()
                .map(|p| u32::from(p.max_slots))
                .collect(),
        }
    }

    fn count(&self, participant: usize) -> u32 {
        self.held[participant].len() as u32
    }

    fn has_capacity(&self, participant: usize) -> bool {
        self.count(participant) < self.max[participant]
    }

    fn assign(&mut self, participant: usize, slot_pos: usize) {
        self.held[participant].insert(slot_pos);
    }

    fn release(&mut self, participant: usize, slot_pos: usize) {
        self.held[participant].remove(&slot_pos);
    }
}

/// Outcome of a local-search run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub iterations: usize,
    pub swaps: usize,
    pub cancelled: bool,
}

pub struct Engine<'m, 'a> {
    meet: &'m Meet<'a>,
    baselines: &'m BaselineTable,
    config: &'m OptimizerConfig,
    solution: Vec<Option<Team>>,
    usage: UsageTable,
    rng: Rng,
}

impl<'m, 'a> Engine<'m, 'a> {
    /// Fresh engine with every slot unfilled and every usage counter at zero.
    pub fn new(
        meet: &'m Meet<'a>,
        baselines: &'m BaselineTable,
        config: &'m OptimizerConfig,
        seed: u64,
    ) -> Self {
        Self {
            meet,
            baselines,
            config,
            solution: vec![None; meet.slots.len()],
            usage: UsageTable::new(meet),
            rng: Rng::derive(seed, LOCAL_SEARCH_STREAM),
        }
    }

    /// Current team per slot position.
    pub fn solution(&self) -> &[Option<Team>] {
        &self.solution
    }

    pub fn usage_count(&self, participant: usize) -> u32 {
        self.usage.count(participant)
    }

    /// Slot positions the participant currently holds, ascending.
    pub fn held_slots(&self, participant: usize) -> Vec<usize> {
        self.usage.held[participant].iter().copied().collect()
    }

    /// Phase 1: one pass in slot order, installing the best-scoring quartet
    /// drawn from the fastest under-quota candidates.
    pub fn initial_fill<F>(&mut self, progress: &mut Progress<F>)
    where
        F: FnMut(&ProgressUpdate),
    {
        progress.milestone(Stage::InitialFill, "Initial team assignment...");
        let total = self.meet.slots.len();
        for slot_pos in 0..total {
            progress.update(Stage::InitialFill, || {
                format!("Assigning slot {}/{}", slot_pos + 1, total)
            });
            if let Some(team) = self.best_team_for_slot(slot_pos) {
                debug!(slot = team.slot_id, time = team.time(), band = %team.band, "initial team installed");
                self.install(slot_pos, team);
            } else {
                debug!(slot = self.meet.slots[slot_pos].id, "initial fill found no team");
            }
        }
        info!(filled = self.filled_count(), slots = total, "initial fill complete");
    }

    /// Phase 2: first legal quartet for every slot still empty.
    pub fn gap_fill<F>(&mut self, progress: &mut Progress<F>)
    where
        F: FnMut(&ProgressUpdate),
    {
        progress.milestone(Stage::GapFill, "Filling gaps...");
        for slot_pos in 0..self.solution.len() {
            if self.solution[slot_pos].is_some() {
                continue;
            }
            if let Some(team) = self.first_legal_team(slot_pos, None) {
                debug!(slot = team.slot_id, "gap filled");
                self.install(slot_pos, team);
            }
        }
        info!(filled = self.filled_count(), slots = self.solution.len(), "gap fill complete");
    }

    /// Phase 3: random single-participant moves until the iteration cap, the
    /// stall limit, or cancellation.
    pub fn local_search<F>(&mut self, progress: &mut Progress<F>, cancel: &CancellationToken) -> SearchStats
    where
        F: FnMut(&ProgressUpdate),
    {
        progress.milestone(Stage::LocalSearch, "Optimizing assignments...");
        let max_iterations = self.config.max_iterations;
        let block = self.config.progress_block.max(1);
        let mut stats = SearchStats::default();
        let mut stalled = 0usize;

        for iteration in 0..max_iterations {
            if cancel.is_cancelled() {
                info!(iteration, "local search cancelled");
                stats.cancelled = true;
                break;
            }
            if iteration % block == 0 {
                progress.update(Stage::LocalSearch, || {
                    format!("Optimization iteration {iteration}/{max_iterations}")
                });
            }

            stats.iterations += 1;
            if self.try_improve() {
                stats.swaps += 1;
                stalled = 0;
            } else {
                stalled += 1;
                if stalled >= self.config.stall_limit {
                    debug!(iteration, "local search stalled");
                    break;
                }
            }
        }

        info!(iterations = stats.iterations, swaps = stats.swaps, "local search complete");
        stats
    }

    /// One local-search step. True when a swap was committed.
    pub fn try_improve(&mut self) -> bool {
        let active: Vec<usize> = (0..self.meet.participant_count())
            .filter(|p| self.usage.count(*p) > 0)
            .collect();
        let Some(&participant) = self.rng.choose(&active) else {
            return false;
        };
        let Some((worst_pos, worst_contribution)) = self.worst_held_slot(participant) else {
            return false;
        };

        let mut best: Option<(usize, f64)> = None;
        let mut best_improvement = 0.0;
        for (slot_pos, slot) in self.meet.slots.iter().enumerate() {
            if self.usage.held[participant].contains(&slot_pos) {
                continue;
            }
            if !is_eligible(self.meet.participant(participant), slot) {
                continue;
            }
            let estimate = estimated_contribution(self.meet, self.baselines, participant, slot);
            let improvement = estimate - worst_contribution;
            if improvement > best_improvement {
                best_improvement = improvement;
                best = Some((slot_pos, estimate));
            }
        }

        match best {
            Some((target_pos, estimate)) if best_improvement > self.config.improvement_threshold => {
                trace!(
                    participant = %self.meet.participant(participant).id,
                    from = self.meet.slots[worst_pos].id,
                    to = self.meet.slots[target_pos].id,
                    worst_contribution,
                    estimate,
                    "attempting swap"
                );
                self.swap(participant, worst_pos, target_pos)
            }
            _ => false,
        }
    }

    /// Held slot where the participant's approximate contribution is lowest.
    fn worst_held_slot(&self, participant: usize) -> Option<(usize, f64)> {
        let mut worst: Option<(usize, f64)> = None;
        for &slot_pos in &self.usage.held[participant] {
            let Some(team) = &self.solution[slot_pos] else {
                continue;
            };
            let contribution = marginal_contribution(team, participant, self.baselines);
            if worst.map_or(true, |(_, lowest)| contribution < lowest) {
                worst = Some((slot_pos, contribution));
            }
        }
        worst
    }

    /// Moves `participant` from `from_pos` into `to_pos`. The target team is
    /// planned first; if none can be formed nothing changes.
    fn swap(&mut self, participant: usize, from_pos: usize, to_pos: usize) -> bool {
        let Some(target_team) = self.plan_entry(participant, to_pos) else {
            trace!("swap abandoned, target slot cannot take participant");
            return false;
        };
        let Some(left_behind) = self.solution[from_pos].as_ref().map(|team| {
            team.members()
                .into_iter()
                .filter(|member| *member != participant)
                .collect::<Vec<_>>()
        }) else {
            return false;
        };

        self.vacate(from_pos);
        self.vacate(to_pos);
        self.install(to_pos, target_team);

        match self.replacement_team(from_pos, &left_behind, participant) {
            Some(team) => self.install(from_pos, team),
            None => debug!(slot = self.meet.slots[from_pos].id, "no replacement found, slot left unfilled"),
        }
        true
    }

    /// Team for `slot_pos` that includes `participant`: the slot's current
    /// team with its slowest compatible member displaced, or a fresh quartet.
    fn plan_entry(&self, participant: usize, slot_pos: usize) -> Option<Team> {
        let slot = &self.meet.slots[slot_pos];
        let Some(current) = &self.solution[slot_pos] else {
            return self.first_legal_team(slot_pos, Some(participant));
        };

        let gender = self.meet.gender(participant);
        let mut displaceable: Vec<(usize, f64)> = current
            .legs
            .iter()
            .filter(|leg| {
                slot.composition != Composition::Mixed || self.meet.gender(leg.participant) == gender
            })
            .map(|leg| (leg.participant, leg.seconds))
            .collect();
        displaceable.sort_by(|a, b| b.1.total_cmp(&a.1));

        displaceable.into_iter().find_map(|(displaced, _)| {
            let members = current
                .members()
                .map(|member| if member == displaced { participant } else { member });
            build_team(self.meet, slot, members).ok()
        })
    }

    /// Completes `remaining` (three members) with the fastest under-quota
    /// eligible participant that yields a legal team.
    fn replacement_team(&self, slot_pos: usize, remaining: &[usize], excluded: usize) -> Option<Team> {
        let slot = &self.meet.slots[slot_pos];
        let [a, b, c] = <[usize; 3]>::try_from(remaining).ok()?;

        let needed_gender = match slot.composition {
            Composition::Mixed => {
                let (male, _) = partition_by_gender(self.meet, remaining);
                Some(if male.len() < 2 {
                    Gender::Male
                } else {
                    Gender::Female
                })
            }
            Composition::Male | Composition::Female => None,
        };

        let mut pool: Vec<usize> = eligible_under_quota(self.meet, slot, |p| self.usage.has_capacity(p))
            .into_iter()
            .filter(|p| *p != excluded && !remaining.contains(p))
            .filter(|p| needed_gender.map_or(true, |g| self.meet.gender(*p) == g))
            .collect();
        sort_by_speed(self.meet, slot, &mut pool);

        pool.into_iter()
            .find_map(|candidate| build_team(self.meet, slot, [a, b, c, candidate]).ok())
    }

    fn best_team_for_slot(&self, slot_pos: usize) -> Option<Team> {
        let slot = &self.meet.slots[slot_pos];
        let mut pool = eligible_under_quota(self.meet, slot, |p| self.usage.has_capacity(p));
        sort_by_speed(self.meet, slot, &mut pool);

        let quartets = match slot.composition {
            Composition::Mixed => {
                let (mut male, mut female) = partition_by_gender(self.meet, &pool);
                male.truncate(self.config.top_k_mixed);
                female.truncate(self.config.top_k_mixed);
                Quartets::paired(male, female)
            }
            Composition::Male | Composition::Female => {
                pool.truncate(self.config.top_k_single);
                Quartets::flat(pool)
            }
        };

        let mut best: Option<(Team, f64)> = None;
        for members in quartets {
            let Ok(team) = build_team(self.meet, slot, members) else {
                continue;
            };
            let score = z_score(&team, self.baselines);
            if best.as_ref().map_or(true, |(_, best_score)| score > *best_score) {
                best = Some((team, score));
            }
        }
        best.map(|(team, _)| team)
    }

    /// First legal quartet from the under-quota pool, optionally forced to
    /// include `anchor` regardless of the anchor's own quota.
    fn first_legal_team(&self, slot_pos: usize, anchor: Option<usize>) -> Option<Team> {
        let slot = &self.meet.slots[slot_pos];
        let mut pool: Vec<usize> = eligible_under_quota(self.meet, slot, |p| self.usage.has_capacity(p))
            .into_iter()
            .filter(|p| Some(*p) != anchor)
            .collect();
        if let Some(anchor) = anchor {
            if !is_eligible(self.meet.participant(anchor), slot) {
                return None;
            }
            pool.insert(0, anchor);
        }

        Quartets::for_slot(self.meet, slot, &pool)
            .take(self.config.gap_fill_attempt_cap)
            .filter(|members| anchor.map_or(true, |a| members.contains(&a)))
            .find_map(|members| build_team(self.meet, slot, members).ok())
    }

    fn install(&mut self, slot_pos: usize, team: Team) {
        for member in team.members() {
            self.usage.assign(member, slot_pos);
        }
        self.solution[slot_pos] = Some(team);
    }

    fn vacate(&mut self, slot_pos: usize) {
        if let Some(team) = self.solution[slot_pos].take() {
            for member in team.members() {
                self.usage.release(member, slot_pos);
            }
        }
    }

    fn filled_count(&self) -> usize {
        self.solution.iter().filter(|team| team.is_some()).count()
    }

    /// Phase 4: assignments for filled slots, skip records for the rest, then
    /// the post-hoc constraint check.
    pub fn finalize<F>(&self, progress: &mut Progress<F>) -> OptimizationResult
    where
        F: FnMut(&ProgressUpdate),
    {
        progress.milestone(Stage::Finalize, "Finalizing results...");
        let mut result = OptimizationResult::default();

        for (slot_pos, slot) in self.meet.slots.iter().enumerate() {
            let Some(team) = &self.solution[slot_pos] else {
                result.add_skip(SkipRecord::new(slot.id, slot.name.clone(), self.diagnose(slot_pos)));
                continue;
            };
            if let Err(rejection) = validate_team(self.meet, slot, team) {
                result.add_warning(
                    WarningKind::InvalidTeam,
                    format!("slot {} holds an invalid team: {rejection}", slot.id),
                );
                result.add_skip(SkipRecord::new(slot.id, slot.name.clone(), self.diagnose(slot_pos)));
                continue;
            }
            let z = z_score(team, self.baselines);
            result.add_assignment(Assignment {
                slot_id: slot.id,
                slot_name: slot.name.clone(),
                relay: slot.relay_name(),
                total_distance: slot.total_distance(),
                legs: team
                    .legs
                    .iter()
                    .map(|leg| {
                        let participant = self.meet.participant(leg.participant);
                        AssignmentLeg {
                            participant_id: participant.id.clone(),
                            name: participant.name(),
                            stroke: leg.stroke,
                            seconds: leg.seconds,
                        }
                    })
                    .collect(),
                band: team.band,
                total_age: team.total_age,
                time: team.time(),
                z_score: z,
                placement_value: placement_value(z, slot.effective_level()),
            });
        }

        result.usage = self
            .meet
            .participants
            .iter()
            .enumerate()
            .map(|(index, participant)| ParticipantUsage {
                participant_id: participant.id.clone(),
                name: participant.name(),
                gender: participant.gender,
                assigned: self.usage.count(index),
                max_slots: participant.max_slots,
                slots: self.usage.held[index]
                    .iter()
                    .map(|slot_pos| self.meet.slots[*slot_pos].id)
                    .collect(),
            })
            .collect();

        check_constraints(&mut result);
        result
    }

    fn diagnose(&self, slot_pos: usize) -> SkipReason {
        let slot = &self.meet.slots[slot_pos];
        let eligible = eligible_for_slot(self.meet, slot);
        let (male, female) = partition_by_gender(self.meet, &eligible);
        let composed = |male: usize, female: usize| match slot.composition {
            Composition::Mixed => male >= 2 && female >= 2,
            Composition::Male => male >= 4,
            Composition::Female => female >= 4,
        };

        if !composed(male.len(), female.len()) {
            let required = match slot.composition {
                Composition::Mixed => "2 male + 2 female",
                Composition::Male => "4 male",
                Composition::Female => "4 female",
            };
            return SkipReason::Composition {
                required: required.to_string(),
                male: male.len(),
                female: female.len(),
            };
        }

        let open: Vec<usize> = eligible
            .iter()
            .copied()
            .filter(|p| self.usage.has_capacity(*p))
            .collect();
        let (open_male, open_female) = partition_by_gender(self.meet, &open);
        if !composed(open_male.len(), open_female.len()) {
            return SkipReason::QuotaExhausted {
                open: open.len(),
                eligible: eligible.len(),
            };
        }
        SkipReason::NoLegalOrdering {
            eligible: open.len(),
        }
    }
}

/// Flags quota overruns and slots claiming one band twice.
fn check_constraints(result: &mut OptimizationResult) {
    let overruns: Vec<String> = result
        .usage
        .iter()
        .filter(|usage| usage.assigned > u32::from(usage.max_slots))
        .map(|usage| {
            format!(
                "{} assigned to {} slots (max {})",
                usage.name, usage.assigned, usage.max_slots
            )
        })
        .collect();
    for message in overruns {
        result.add_warning(WarningKind::QuotaExceeded, message);
    }

    let mut seen: HashMap<u32, Vec<ResultBand>> = HashMap::new();
    let mut duplicates = Vec::new();
    for assignment in &result.assignments {
        let bands = seen.entry(assignment.slot_id).or_default();
        if bands.contains(&assignment.band) {
            duplicates.push(format!(
                "slot {} has multiple teams in band {}",
                assignment.slot_id, assignment.band
            ));
        }
        bands.push(assignment.band);
    }
    for message in duplicates {
        result.add_warning(WarningKind::DuplicateBand, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usage(name: &str, assigned: u32, max_slots: u8) -> ParticipantUsage {
        ParticipantUsage {
            participant_id: name.to_string(),
            name: name.to_string(),
            gender: Gender::Female,
            assigned,
            max_slots,
            slots: vec![],
        }
    }

    #[test]
    fn constraint_check_flags_quota_overrun() {
        let mut result = OptimizationResult::default();
        result.usage = vec![usage("a", 3, 2), usage("b", 2, 2)];
        check_constraints(&mut result);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].kind, WarningKind::QuotaExceeded);
        assert!(result.warnings[0].message.contains("max 2"));
    }

    #[test]
    fn constraint_check_flags_duplicate_band() {
        let assignment = Assignment {
            slot_id: 4,
            slot_name: "relay".to_string(),
            relay: "4x50".to_string(),
            total_distance: 200,
            legs: vec![],
            band: ResultBand::Age120To159,
            total_age: 130,
            time: 100.0,
            z_score: 0.0,
            placement_value: 2,
        };
        let mut result = OptimizationResult::default();
        result.assignments = vec![assignment.clone(), assignment];
        check_constraints(&mut result);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].kind, WarningKind::DuplicateBand);
    }

    #[test]
    fn cancellation_token_is_shared_between_clones() {
        let token = CancellationToken::new();
        let handle = token.clone();
        assert!(!token.is_cancelled());
        handle.cancel();
        assert!(token.is_cancelled());
    }
}
