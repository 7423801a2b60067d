use std::time::Duration;

use anchorleg::config::OptimizerConfig;
use anchorleg::error::OptimizeError;
use anchorleg::model::{
    Composition, Discipline, Distance, Gender, Participant, ResultBand, Session, SkipReason, Slot,
    Stroke, TimeTable,
};
use anchorleg::optimizer::baseline::{Baseline, BaselineTable};
use anchorleg::optimizer::engine::{CancellationToken, Engine};
use anchorleg::optimizer::meet::Meet;
use anchorleg::optimizer::optimize;
use anchorleg::optimizer::team_builder::validate_team;
use anchorleg::parallel::{Progress, ProgressUpdate};
use chrono::NaiveDate;

fn swimmer(id: &str, gender: Gender, times: &[(Stroke, f64)], max_slots: u8) -> Participant {
    let mut table = TimeTable::new();
    for (stroke, seconds) in times {
        table.set(*stroke, Distance::M50, *seconds);
    }
    Participant {
        id: id.to_string(),
        first_name: id.to_string(),
        last_name: "Test".to_string(),
        birth_date: NaiveDate::from_ymd_opt(1990, 6, 1).unwrap(),
        gender,
        times: table,
        excluded_strokes: vec![],
        morning_available: true,
        afternoon_available: true,
        max_slots,
    }
}

fn slot(id: u32, composition: Composition, discipline: Discipline) -> Slot {
    Slot {
        id,
        name: format!("slot {id}"),
        session: Session::Morning,
        composition,
        discipline,
        distance: Distance::M50,
        competition_level: 3,
    }
}

fn config() -> OptimizerConfig {
    OptimizerConfig {
        seed: Some(11),
        reference_year: Some(2025),
        progress_interval_ms: 0,
        ..OptimizerConfig::default()
    }
}

fn approx_eq(a: f64, b: f64, tol: f64) {
    assert!((a - b).abs() <= tol, "expected {b}, got {a}");
}

fn reference_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 12, 31).unwrap()
}

fn freestylers(male: usize, female: usize) -> Vec<Participant> {
    let free = [(Stroke::Free, 30.0)];
    (0..male)
        .map(|i| swimmer(&format!("m{i}"), Gender::Male, &free, 6))
        .chain((0..female).map(|i| swimmer(&format!("f{i}"), Gender::Female, &free, 6)))
        .collect()
}

/// Backstroke relay in slot 1 (mean 100) and free relay in slot 2 (mean 140).
fn back_and_free() -> (Vec<Slot>, BaselineTable) {
    let slots = vec![
        slot(1, Composition::Female, Discipline::Uniform(Stroke::Back)),
        slot(2, Composition::Female, Discipline::Uniform(Stroke::Free)),
    ];
    let mut baselines = BaselineTable::default();
    for band in ResultBand::ALL {
        baselines.insert(1, band, Baseline { mean: 100.0, std_dev: 1.0, samples: 20 });
        baselines.insert(2, band, Baseline { mean: 140.0, std_dev: 4.0, samples: 20 });
    }
    (slots, baselines)
}

/// Quotas hold everywhere and every filled slot holds a legal team.
fn assert_consistent(engine: &Engine<'_, '_>, meet: &Meet<'_>) {
    for (index, participant) in meet.participants.iter().enumerate() {
        assert!(
            engine.usage_count(index) <= u32::from(participant.max_slots),
            "{} over quota",
            participant.id
        );
    }
    for (slot_pos, team) in engine.solution().iter().enumerate() {
        if let Some(team) = team {
            assert!(validate_team(meet, &meet.slots[slot_pos], team).is_ok());
        }
    }
}

#[test]
fn uniform_relay_time_is_sum_of_legs_and_scores_zero_without_baseline() {
    let roster: Vec<Participant> = [30.0, 31.0, 32.0, 33.0]
        .iter()
        .enumerate()
        .map(|(i, t)| swimmer(&format!("w{i}"), Gender::Female, &[(Stroke::Free, *t)], 6))
        .collect();
    let slots = vec![slot(1, Composition::Female, Discipline::Uniform(Stroke::Free))];

    let result = optimize(&roster, &slots, &config()).unwrap();

    assert_eq!(result.assignments.len(), 1);
    let assignment = &result.assignments[0];
    approx_eq(assignment.time, 126.0, 1e-9);
    assert!(assignment.legs.iter().all(|leg| leg.stroke == Stroke::Free));
    assert_eq!(assignment.total_age, 4 * 35);
    assert_eq!(assignment.band, ResultBand::Age120To159);
    // One legal quartet cannot reach the minimum sample count.
    assert_eq!(result.summary.baselines, 0);
    assert_eq!(assignment.z_score, 0.0);
    assert_eq!(assignment.placement_value, 10);
}

#[test]
fn medley_legs_follow_back_breast_fly_free() {
    let roster = vec![
        swimmer("a", Gender::Male, &[(Stroke::Back, 30.0), (Stroke::Free, 27.0)], 6),
        swimmer("b", Gender::Male, &[(Stroke::Breast, 33.0), (Stroke::Back, 40.0)], 6),
        swimmer("c", Gender::Female, &[(Stroke::Fly, 31.0), (Stroke::Free, 29.0)], 6),
        swimmer("d", Gender::Female, &[(Stroke::Free, 28.0), (Stroke::Fly, 35.0)], 6),
    ];
    let slots = vec![slot(1, Composition::Mixed, Discipline::Medley)];

    let result = optimize(&roster, &slots, &config()).unwrap();

    let assignment = result.assignment_for(1).unwrap();
    let strokes: Vec<Stroke> = assignment.legs.iter().map(|leg| leg.stroke).collect();
    assert_eq!(strokes, vec![Stroke::Back, Stroke::Breast, Stroke::Fly, Stroke::Free]);
    let ids: Vec<&str> = assignment.legs.iter().map(|leg| leg.participant_id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b", "c", "d"]);
    approx_eq(assignment.time, 30.0 + 33.0 + 31.0 + 28.0, 1e-9);
}

#[test]
fn mixed_slot_with_one_available_woman_is_skipped_for_composition() {
    let mut away = swimmer("f2", Gender::Female, &[(Stroke::Free, 31.0)], 6);
    away.morning_available = false;
    let roster = vec![
        swimmer("m1", Gender::Male, &[(Stroke::Free, 27.0)], 6),
        swimmer("m2", Gender::Male, &[(Stroke::Free, 28.0)], 6),
        swimmer("m3", Gender::Male, &[(Stroke::Free, 29.0)], 6),
        swimmer("f1", Gender::Female, &[(Stroke::Free, 30.0)], 6),
        away,
    ];
    let slots = vec![slot(7, Composition::Mixed, Discipline::Uniform(Stroke::Free))];

    let result = optimize(&roster, &slots, &config()).unwrap();

    assert!(result.assignments.is_empty());
    assert_eq!(result.skipped.len(), 1);
    let skip = &result.skipped[0];
    assert_eq!(skip.slot_id, 7);
    assert_eq!(
        skip.detail,
        SkipReason::Composition {
            required: "2 male + 2 female".to_string(),
            male: 3,
            female: 1,
        }
    );
    assert!(skip.reason.starts_with("no legal team could be formed"));
}

#[test]
fn slot_needing_a_gender_missing_from_roster_fails_before_search() {
    let roster: Vec<Participant> = (0..4)
        .map(|i| swimmer(&format!("m{i}"), Gender::Male, &[(Stroke::Free, 30.0)], 6))
        .collect();
    let slots = vec![slot(3, Composition::Female, Discipline::Uniform(Stroke::Free))];

    let err = optimize(&roster, &slots, &config()).unwrap_err();
    match err {
        OptimizeError::Precondition(report) => {
            assert!(report.has_errors());
            assert!(report.summary().contains("female"));
        }
        other => panic!("expected precondition failure, got {other:?}"),
    }
}

#[test]
fn roster_too_small_for_a_composition_fails_before_search() {
    let three_women = freestylers(4, 3);
    let female_free = vec![slot(1, Composition::Female, Discipline::Uniform(Stroke::Free))];
    match optimize(&three_women, &female_free, &config()) {
        Err(OptimizeError::Precondition(report)) => {
            assert!(report.summary().contains("needs 4 female participants but the roster has 3"));
        }
        other => panic!("expected precondition failure, got {other:?}"),
    }

    let one_man = freestylers(1, 5);
    let mixed_free = vec![slot(2, Composition::Mixed, Discipline::Uniform(Stroke::Free))];
    match optimize(&one_man, &mixed_free, &config()) {
        Err(OptimizeError::Precondition(report)) => {
            assert!(report.summary().contains("needs 2 male participants but the roster has 1"));
        }
        other => panic!("expected precondition failure, got {other:?}"),
    }
}

#[test]
fn exhausted_quota_skips_second_slot() {
    let roster: Vec<Participant> = [30.0, 31.0, 32.0, 33.0]
        .iter()
        .enumerate()
        .map(|(i, t)| swimmer(&format!("w{i}"), Gender::Female, &[(Stroke::Free, *t)], 1))
        .collect();
    let slots = vec![
        slot(1, Composition::Female, Discipline::Uniform(Stroke::Free)),
        slot(2, Composition::Female, Discipline::Uniform(Stroke::Free)),
    ];

    let result = optimize(&roster, &slots, &config()).unwrap();

    assert_eq!(result.assignments.len(), 1);
    assert_eq!(result.assignments[0].slot_id, 1);
    assert_eq!(result.skipped[0].slot_id, 2);
    assert_eq!(result.skipped[0].detail, SkipReason::QuotaExhausted { open: 0, eligible: 4 });
    assert!(result.usage.iter().all(|u| u.assigned == 1));
    assert!(result.warnings.is_empty());
}

#[test]
fn gap_fill_covers_medley_the_fastest_pool_cannot() {
    // The four fastest only swim freestyle, so a top-4 pool has no legal
    // medley. The slower specialists complete one.
    let roster = vec![
        swimmer("a1", Gender::Female, &[(Stroke::Free, 25.0)], 6),
        swimmer("a2", Gender::Female, &[(Stroke::Free, 26.0)], 6),
        swimmer("a3", Gender::Female, &[(Stroke::Free, 27.0)], 6),
        swimmer("a4", Gender::Female, &[(Stroke::Free, 28.0)], 6),
        swimmer("e", Gender::Female, &[(Stroke::Back, 34.0)], 6),
        swimmer("g", Gender::Female, &[(Stroke::Breast, 38.0)], 6),
        swimmer("h", Gender::Female, &[(Stroke::Fly, 33.0)], 6),
    ];
    let slots = vec![slot(1, Composition::Female, Discipline::Medley)];
    let config = OptimizerConfig {
        top_k_single: 4,
        top_k_mixed: 4,
        ..config()
    };
    let baselines = BaselineTable::default();

    let meet = Meet::new(&roster, &slots, reference_date());
    let mut engine = Engine::new(&meet, &baselines, &config, 5);
    let mut progress = Progress::new(|_: &ProgressUpdate| {}, Duration::ZERO);

    engine.initial_fill(&mut progress);
    assert!(engine.solution()[0].is_none());

    engine.gap_fill(&mut progress);
    let team = engine.solution()[0].as_ref().unwrap();
    for specialist in [4, 5, 6] {
        assert!(team.contains(specialist));
    }
    let strokes: Vec<Stroke> = team.legs.iter().map(|leg| leg.stroke).collect();
    assert_eq!(strokes, vec![Stroke::Back, Stroke::Breast, Stroke::Fly, Stroke::Free]);
    assert_consistent(&engine, &meet);

    let result = engine.finalize(&mut progress);
    assert_eq!(result.assignments.len(), 1);
    assert!(result.warnings.is_empty());
}

#[test]
fn participant_moves_to_slot_where_they_contribute_more() {
    // "x" is the fastest backstroker and an even faster freestyler but may
    // swim only once. The initial fill puts them in the backstroke relay.
    let roster = vec![
        swimmer("x", Gender::Female, &[(Stroke::Back, 30.0), (Stroke::Free, 28.0)], 1),
        swimmer("b1", Gender::Female, &[(Stroke::Back, 31.0)], 6),
        swimmer("b2", Gender::Female, &[(Stroke::Back, 32.0)], 6),
        swimmer("b3", Gender::Female, &[(Stroke::Back, 33.0)], 6),
        swimmer("b4", Gender::Female, &[(Stroke::Back, 36.0)], 6),
        swimmer("f1", Gender::Female, &[(Stroke::Free, 29.0)], 6),
        swimmer("f2", Gender::Female, &[(Stroke::Free, 30.0)], 6),
        swimmer("f3", Gender::Female, &[(Stroke::Free, 31.0)], 6),
        swimmer("f4", Gender::Female, &[(Stroke::Free, 32.0)], 6),
    ];
    let (slots, baselines) = back_and_free();
    let config = OptimizerConfig {
        stall_limit: 1000,
        ..config()
    };

    let meet = Meet::new(&roster, &slots, reference_date());
    let mut engine = Engine::new(&meet, &baselines, &config, 5);
    let mut progress = Progress::new(|_: &ProgressUpdate| {}, Duration::ZERO);

    engine.initial_fill(&mut progress);
    assert!(engine.solution()[0].as_ref().unwrap().contains(0));
    assert!(!engine.solution()[1].as_ref().unwrap().contains(0));

    engine.gap_fill(&mut progress);
    let stats = engine.local_search(&mut progress, &CancellationToken::new());
    assert_eq!(stats.swaps, 1);

    let back = engine.solution()[0].as_ref().unwrap();
    let free = engine.solution()[1].as_ref().unwrap();
    let mut back_members = back.members();
    back_members.sort_unstable();
    assert_eq!(back_members, [1, 2, 3, 4]);
    assert!(free.contains(0));
    // The slowest freestyler gave up their place.
    assert!(!free.contains(8));
    assert_eq!(engine.held_slots(0), vec![1]);
    assert_eq!(engine.usage_count(8), 0);
    assert_consistent(&engine, &meet);

    let result = engine.finalize(&mut progress);
    assert!(result.warnings.is_empty());
    assert!(result.skipped.is_empty());
}

#[test]
fn vacated_slot_stays_unfilled_without_a_replacement() {
    // Same move as above, but no fourth backstroker can take x's place.
    let roster = vec![
        swimmer("x", Gender::Female, &[(Stroke::Back, 30.0), (Stroke::Free, 28.0)], 1),
        swimmer("b1", Gender::Female, &[(Stroke::Back, 31.0)], 6),
        swimmer("b2", Gender::Female, &[(Stroke::Back, 32.0)], 6),
        swimmer("b3", Gender::Female, &[(Stroke::Back, 33.0)], 6),
        swimmer("f1", Gender::Female, &[(Stroke::Free, 29.0)], 6),
        swimmer("f2", Gender::Female, &[(Stroke::Free, 30.0)], 6),
        swimmer("f3", Gender::Female, &[(Stroke::Free, 31.0)], 6),
        swimmer("f4", Gender::Female, &[(Stroke::Free, 32.0)], 6),
    ];
    let (slots, baselines) = back_and_free();
    let config = OptimizerConfig {
        stall_limit: 1000,
        ..config()
    };

    let meet = Meet::new(&roster, &slots, reference_date());
    let mut engine = Engine::new(&meet, &baselines, &config, 5);
    let mut progress = Progress::new(|_: &ProgressUpdate| {}, Duration::ZERO);

    engine.initial_fill(&mut progress);
    engine.gap_fill(&mut progress);
    assert!(engine.solution()[0].as_ref().unwrap().contains(0));

    let stats = engine.local_search(&mut progress, &CancellationToken::new());
    assert_eq!(stats.swaps, 1);
    assert!(engine.solution()[0].is_none());
    assert!(engine.solution()[1].as_ref().unwrap().contains(0));
    assert_eq!(engine.held_slots(0), vec![1]);
    for backstroker in 1..=3 {
        assert_eq!(engine.usage_count(backstroker), 0);
    }
    assert_consistent(&engine, &meet);

    let result = engine.finalize(&mut progress);
    assert!(result.warnings.is_empty());
    assert_eq!(result.assignments.len(), 1);
    assert_eq!(result.skipped.len(), 1);
    assert_eq!(result.skipped[0].slot_id, 1);
    assert_eq!(
        result.skipped[0].detail,
        SkipReason::QuotaExhausted { open: 3, eligible: 4 }
    );
}

#[test]
fn participant_moves_into_an_unfilled_slot() {
    // Only three pure freestylers exist, so the free relay stays empty until
    // x leaves the backstroke relay to anchor it.
    let roster = vec![
        swimmer("x", Gender::Female, &[(Stroke::Back, 30.0), (Stroke::Free, 28.0)], 1),
        swimmer("b1", Gender::Female, &[(Stroke::Back, 31.0)], 6),
        swimmer("b2", Gender::Female, &[(Stroke::Back, 32.0)], 6),
        swimmer("b3", Gender::Female, &[(Stroke::Back, 33.0)], 6),
        swimmer("b4", Gender::Female, &[(Stroke::Back, 36.0)], 6),
        swimmer("f1", Gender::Female, &[(Stroke::Free, 29.0)], 6),
        swimmer("f2", Gender::Female, &[(Stroke::Free, 30.0)], 6),
        swimmer("f3", Gender::Female, &[(Stroke::Free, 31.0)], 6),
    ];
    let (slots, baselines) = back_and_free();
    let config = OptimizerConfig {
        stall_limit: 1000,
        ..config()
    };

    let meet = Meet::new(&roster, &slots, reference_date());
    let mut engine = Engine::new(&meet, &baselines, &config, 5);
    let mut progress = Progress::new(|_: &ProgressUpdate| {}, Duration::ZERO);

    engine.initial_fill(&mut progress);
    engine.gap_fill(&mut progress);
    assert!(engine.solution()[0].as_ref().unwrap().contains(0));
    assert!(engine.solution()[1].is_none());

    let stats = engine.local_search(&mut progress, &CancellationToken::new());
    assert_eq!(stats.swaps, 1);

    let free = engine.solution()[1].as_ref().unwrap();
    let mut free_members = free.members();
    free_members.sort_unstable();
    assert_eq!(free_members, [0, 5, 6, 7]);
    let mut back_members = engine.solution()[0].as_ref().unwrap().members();
    back_members.sort_unstable();
    assert_eq!(back_members, [1, 2, 3, 4]);
    assert_eq!(engine.held_slots(0), vec![1]);
    assert_consistent(&engine, &meet);

    let result = engine.finalize(&mut progress);
    assert!(result.warnings.is_empty());
    assert!(result.skipped.is_empty());
    assert_eq!(result.assignments.len(), 2);
}
