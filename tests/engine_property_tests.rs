use std::collections::{HashMap, HashSet};

use anchorleg::config::OptimizerConfig;
use anchorleg::data::synthetic::synthetic_meet;
use anchorleg::model::{Composition, Gender, OptimizationResult, Participant, Session, Slot};
use anchorleg::optimizer::optimize;

fn config(seed: u64) -> OptimizerConfig {
    OptimizerConfig {
        seed: Some(seed),
        reference_year: Some(2025),
        progress_interval_ms: 0,
        ..OptimizerConfig::default()
    }
}

fn run(seed: u64, size: usize) -> (Vec<Participant>, Vec<Slot>, OptimizationResult) {
    let meet = synthetic_meet(seed, size);
    let result = optimize(&meet.participants, &meet.slots, &config(seed)).unwrap();
    (meet.participants, meet.slots, result)
}

#[test]
fn every_assignment_is_a_legal_team() {
    for seed in [1u64, 2, 3] {
        let (participants, slots, result) = run(seed, 40);
        let by_id: HashMap<&str, &Participant> =
            participants.iter().map(|p| (p.id.as_str(), p)).collect();

        for assignment in &result.assignments {
            let slot = slots.iter().find(|s| s.id == assignment.slot_id).unwrap();
            assert_eq!(assignment.legs.len(), 4);

            let strokes: Vec<_> = assignment.legs.iter().map(|leg| leg.stroke).collect();
            assert_eq!(strokes, slot.legs().to_vec(), "slot {} leg order", slot.id);

            let members: HashSet<&str> =
                assignment.legs.iter().map(|leg| leg.participant_id.as_str()).collect();
            assert_eq!(members.len(), 4, "slot {} repeats a member", slot.id);

            let mut genders = Vec::new();
            let mut time = 0.0;
            for leg in &assignment.legs {
                let participant = by_id[leg.participant_id.as_str()];
                assert!(participant.available_for(slot.session));
                assert_eq!(participant.leg_time(leg.stroke, slot.distance), Some(leg.seconds));
                genders.push(participant.gender);
                time += leg.seconds;
            }
            assert!(slot.composition.accepts(&genders));
            assert!((assignment.time - time).abs() < 1e-9);
        }
    }
}

#[test]
fn quotas_hold_and_usage_matches_assignments() {
    for seed in [4u64, 5] {
        let (participants, _, result) = run(seed, 36);
        let mut counted: HashMap<&str, u32> = HashMap::new();
        for assignment in &result.assignments {
            for leg in &assignment.legs {
                *counted.entry(leg.participant_id.as_str()).or_default() += 1;
            }
        }

        for participant in &participants {
            let usage = result.usage_for(&participant.id).unwrap();
            let assigned = counted.get(participant.id.as_str()).copied().unwrap_or(0);
            assert_eq!(usage.assigned, assigned);
            assert_eq!(usage.slots.len() as u32, assigned);
            assert!(usage.assigned <= u32::from(participant.max_slots));
        }
        assert!(result.warnings.is_empty(), "unexpected warnings {:?}", result.warnings);
    }
}

#[test]
fn every_slot_is_assigned_or_skipped_exactly_once() {
    let (_, slots, result) = run(8, 24);
    let mut seen: Vec<u32> = result
        .assignments
        .iter()
        .map(|a| a.slot_id)
        .chain(result.skipped.iter().map(|s| s.slot_id))
        .collect();
    seen.sort_unstable();
    let mut expected: Vec<u32> = slots.iter().map(|s| s.id).collect();
    expected.sort_unstable();
    assert_eq!(seen, expected);
}

#[test]
fn totals_are_sums_over_assignments() {
    let (_, _, result) = run(9, 40);
    let z: f64 = result.assignments.iter().map(|a| a.z_score).sum();
    let points: u32 = result.assignments.iter().map(|a| a.placement_value).sum();
    assert!((result.total_z_score - z).abs() < 1e-9);
    assert_eq!(result.total_placement_points, points);
}

#[test]
fn same_seed_gives_identical_results() {
    let (_, _, first) = run(21, 40);
    let (_, _, second) = run(21, 40);
    assert_eq!(first, second);
    assert_eq!(first.summary.seed, 21);
}

#[test]
fn serial_and_parallel_baselines_give_identical_results() {
    let meet = synthetic_meet(13, 40);
    let parallel = optimize(&meet.participants, &meet.slots, &config(13)).unwrap();
    let serial_config = OptimizerConfig {
        parallel_baseline: false,
        ..config(13)
    };
    let serial = optimize(&meet.participants, &meet.slots, &serial_config).unwrap();
    assert_eq!(parallel, serial);
}

#[test]
fn unavailable_participants_are_never_assigned() {
    let mut meet = synthetic_meet(17, 40);
    for participant in meet.participants.iter_mut().step_by(3) {
        participant.afternoon_available = false;
    }
    let result = optimize(&meet.participants, &meet.slots, &config(17)).unwrap();
    let morning_only: HashSet<&str> = meet
        .participants
        .iter()
        .filter(|p| !p.afternoon_available)
        .map(|p| p.id.as_str())
        .collect();

    for assignment in &result.assignments {
        let slot = meet.slots.iter().find(|s| s.id == assignment.slot_id).unwrap();
        if slot.session == Session::Afternoon {
            assert!(assignment
                .legs
                .iter()
                .all(|leg| !morning_only.contains(leg.participant_id.as_str())));
        }
    }
}

#[test]
fn mixed_slots_hold_two_of_each_gender() {
    let (participants, slots, result) = run(31, 40);
    for assignment in &result.assignments {
        let slot = slots.iter().find(|s| s.id == assignment.slot_id).unwrap();
        if slot.composition != Composition::Mixed {
            continue;
        }
        let male = assignment
            .legs
            .iter()
            .filter(|leg| {
                participants
                    .iter()
                    .any(|p| p.id == leg.participant_id && p.gender == Gender::Male)
            })
            .count();
        assert_eq!(male, 2);
    }
}
