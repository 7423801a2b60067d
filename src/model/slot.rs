use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::participant::{Distance, Gender, Session, Stroke};

/// Medley leg order: back, breast, fly, free.
pub const MEDLEY_ORDER: [Stroke; 4] = [Stroke::Back, Stroke::Breast, Stroke::Fly, Stroke::Free];

/// Competition level used when a slot carries an out-of-range value.
pub const DEFAULT_COMPETITION_LEVEL: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Composition {
    Male,
    Female,
    /// Exactly two of each gender.
    Mixed,
}

impl Composition {
    /// Single gender every member must have, or `None` for mixed teams.
    pub fn required_gender(&self) -> Option<Gender> {
        match self {
            Self::Male => Some(Gender::Male),
            Self::Female => Some(Gender::Female),
            Self::Mixed => None,
        }
    }

    pub fn accepts(&self, genders: &[Gender]) -> bool {
        match self.required_gender() {
            Some(required) => genders.iter().all(|gender| *gender == required),
            None => {
                let male = genders.iter().filter(|g| **g == Gender::Male).count();
                let female = genders.len() - male;
                male == 2 && female == 2
            }
        }
    }
}

impl fmt::Display for Composition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Male => f.write_str("male"),
            Self::Female => f.write_str("female"),
            Self::Mixed => f.write_str("mixed"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "stroke", rename_all = "snake_case")]
pub enum Discipline {
    /// The same stroke on all four legs.
    Uniform(Stroke),
    Medley,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    pub id: u32,
    pub name: String,
    pub session: Session,
    pub composition: Composition,
    pub discipline: Discipline,
    pub distance: Distance,
    #[serde(default = "default_level")]
    pub competition_level: u8,
}

fn default_level() -> u8 {
    DEFAULT_COMPETITION_LEVEL
}

impl Slot {
    /// Strokes for legs one through four.
    pub fn legs(&self) -> [Stroke; 4] {
        match self.discipline {
            Discipline::Uniform(stroke) => [stroke; 4],
            Discipline::Medley => MEDLEY_ORDER,
        }
    }

    /// Distinct strokes a participant could contribute.
    pub fn strokes(&self) -> &'static [Stroke] {
        match self.discipline {
            Discipline::Uniform(Stroke::Back) => &[Stroke::Back],
            Discipline::Uniform(Stroke::Breast) => &[Stroke::Breast],
            Discipline::Uniform(Stroke::Fly) => &[Stroke::Fly],
            Discipline::Uniform(Stroke::Free) => &[Stroke::Free],
            Discipline::Medley => &MEDLEY_ORDER,
        }
    }

    /// Level clamped to the scoring table, out-of-range values count as 3.
    pub fn effective_level(&self) -> u8 {
        if (1..=5).contains(&self.competition_level) {
            self.competition_level
        } else {
            DEFAULT_COMPETITION_LEVEL
        }
    }

    pub fn relay_name(&self) -> String {
        format!("4x{}", self.distance.metres())
    }

    pub fn total_distance(&self) -> u32 {
        u32::from(self.distance.metres()) * 4
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Slot {}: {}", self.id, self.name)
    }
}
