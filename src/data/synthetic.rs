//! Reproducible demo meets for the CLI `generate` command, benches and the
//! speedup report. The same `(seed, size)` always yields the same meet.

use chrono::NaiveDate;

use crate::data::meet::MeetFile;
use crate::model::{
    Composition, Discipline, Distance, Gender, Participant, Session, Slot, Stroke, TimeTable,
};
use crate::optimizer::rng::Rng;

const FIRST_NAMES: &[&str] = &[
    "Alex", "Sam", "Robin", "Jo", "Kim", "Chris", "Pat", "Toni", "Lee", "Max", "Nico", "Jules",
];
const LAST_NAMES: &[&str] = &[
    "Berg", "Costa", "Dahl", "Engel", "Fox", "Graf", "Hale", "Ito", "Jansen", "Klein", "Lind",
    "Moreau", "Novak", "Olsen", "Petit", "Quinn", "Roth", "Sato",
];

/// Earliest and latest synthetic birth year.
const BIRTH_YEARS: (i32, i32) = (1950, 2004);

/// Roster of `size` participants plus a fixed ten-slot slate over both
/// sessions.
pub fn synthetic_meet(seed: u64, size: usize) -> MeetFile {
    let mut rng = Rng::new(seed);
    let participants = (0..size).map(|index| participant(&mut rng, index)).collect();
    MeetFile {
        participants,
        slots: standard_slate(),
    }
}

fn participant(rng: &mut Rng, index: usize) -> Participant {
    let coin = rng.below(2);
    // The first eight alternate so every slate composition is staffable.
    let male = if index < 8 { index % 2 == 0 } else { coin == 0 };
    let gender = if male {
        Gender::Male
    } else {
        Gender::Female
    };
    let span = (BIRTH_YEARS.1 - BIRTH_YEARS.0 + 1) as usize;
    let year = BIRTH_YEARS.0 + rng.below(span) as i32;
    let birth_date = NaiveDate::from_ymd_opt(year, 1 + rng.below(12) as u32, 1 + rng.below(28) as u32)
        .unwrap_or_default();
    let age = (BIRTH_YEARS.1 + 20 - year).max(18) as f64;

    // Free 50 pace; other strokes and distances scale from it.
    let base = 27.0 + (age - 25.0).max(0.0) * 0.22 + rng.next_f64() * 9.0
        + if gender == Gender::Female { 3.0 } else { 0.0 };

    let mut times = TimeTable::new();
    for stroke in Stroke::ALL {
        let stroke_factor = match stroke {
            Stroke::Free => 1.0,
            Stroke::Fly => 1.08,
            Stroke::Back => 1.12,
            Stroke::Breast => 1.25,
        };
        for distance in Distance::ALL {
            if distance == Distance::M200 && rng.below(3) != 0 {
                continue;
            }
            let distance_factor = match distance {
                Distance::M25 => 0.47,
                Distance::M50 => 1.0,
                Distance::M100 => 2.2,
                Distance::M200 => 4.7,
            };
            let jitter = 0.97 + rng.next_f64() * 0.06;
            let seconds = base * stroke_factor * distance_factor * jitter;
            times.set(stroke, distance, (seconds * 100.0).round() / 100.0);
        }
    }

    let excluded_strokes = if rng.below(10) == 0 {
        vec![Stroke::Fly]
    } else {
        Vec::new()
    };

    Participant {
        id: format!("P{:03}", index + 1),
        first_name: FIRST_NAMES[rng.below(FIRST_NAMES.len())].to_string(),
        last_name: LAST_NAMES[rng.below(LAST_NAMES.len())].to_string(),
        birth_date,
        gender,
        times,
        excluded_strokes,
        morning_available: rng.below(10) != 0,
        afternoon_available: rng.below(10) != 0,
        max_slots: 2 + rng.below(5) as u8,
    }
}

pub fn standard_slate() -> Vec<Slot> {
    let plan = [
        (Session::Morning, Composition::Male, Discipline::Uniform(Stroke::Free), Distance::M50),
        (Session::Morning, Composition::Female, Discipline::Uniform(Stroke::Free), Distance::M50),
        (Session::Morning, Composition::Mixed, Discipline::Medley, Distance::M50),
        (Session::Morning, Composition::Male, Discipline::Medley, Distance::M50),
        (Session::Morning, Composition::Female, Discipline::Medley, Distance::M50),
        (Session::Afternoon, Composition::Mixed, Discipline::Uniform(Stroke::Free), Distance::M50),
        (Session::Afternoon, Composition::Male, Discipline::Uniform(Stroke::Free), Distance::M100),
        (Session::Afternoon, Composition::Female, Discipline::Uniform(Stroke::Free), Distance::M100),
        (Session::Afternoon, Composition::Mixed, Discipline::Medley, Distance::M100),
        (Session::Afternoon, Composition::Mixed, Discipline::Uniform(Stroke::Breast), Distance::M25),
    ];
    plan.into_iter()
        .enumerate()
        .map(|(index, (session, composition, discipline, distance))| {
            let label = match discipline {
                Discipline::Uniform(stroke) => capitalize(stroke.as_str()),
                Discipline::Medley => "Medley".to_string(),
            };
            let mut slot = Slot {
                id: index as u32 + 1,
                name: String::new(),
                session,
                composition,
                discipline,
                distance,
                competition_level: 3,
            };
            slot.name = format!(
                "{} {} {label}",
                capitalize(&composition.to_string()),
                slot.relay_name()
            );
            slot
        })
        .collect()
}

fn capitalize(raw: &str) -> String {
    let mut chars = raw.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
