use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::participant::Stroke;

pub const BAND_COUNT: usize = 7;

/// Summed-age result band. Totals below 72 fall into the youngest band,
/// totals of 320 and above into the oldest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ResultBand {
    Age72To99,
    Age100To119,
    Age120To159,
    Age160To199,
    Age200To239,
    Age240To279,
    Age280To319,
}

impl ResultBand {
    pub const ALL: [ResultBand; BAND_COUNT] = [
        ResultBand::Age72To99,
        ResultBand::Age100To119,
        ResultBand::Age120To159,
        ResultBand::Age160To199,
        ResultBand::Age200To239,
        ResultBand::Age240To279,
        ResultBand::Age280To319,
    ];

    pub fn from_total_age(total: u32) -> Self {
        match total {
            0..=99 => Self::Age72To99,
            100..=119 => Self::Age100To119,
            120..=159 => Self::Age120To159,
            160..=199 => Self::Age160To199,
            200..=239 => Self::Age200To239,
            240..=279 => Self::Age240To279,
            _ => Self::Age280To319,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn bounds(self) -> (u32, u32) {
        match self {
            Self::Age72To99 => (72, 99),
            Self::Age100To119 => (100, 119),
            Self::Age120To159 => (120, 159),
            Self::Age160To199 => (160, 199),
            Self::Age200To239 => (200, 239),
            Self::Age240To279 => (240, 279),
            Self::Age280To319 => (280, 319),
        }
    }

    pub fn label(self) -> String {
        let (low, high) = self.bounds();
        format!("{low}-{high}")
    }
}

impl fmt::Display for ResultBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl From<ResultBand> for String {
    fn from(value: ResultBand) -> Self {
        value.label()
    }
}

impl TryFrom<String> for ResultBand {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        ResultBand::ALL
            .into_iter()
            .find(|band| band.label() == value)
            .ok_or_else(|| format!("unknown result band '{value}'"))
    }
}

/// One leg of a team: a roster handle plus the stroke and time swum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TeamLeg {
    pub participant: usize,
    pub stroke: Stroke,
    pub seconds: f64,
}

/// Four legs bound to one slot. Only `team_builder` constructs these, so every
/// `Team` in circulation has a finite time and a legal composition.
#[derive(Debug, Clone, PartialEq)]
pub struct Team {
    pub slot_id: u32,
    pub legs: [TeamLeg; 4],
    pub total_age: u32,
    pub band: ResultBand,
}

impl Team {
    pub fn time(&self) -> f64 {
        self.legs.iter().map(|leg| leg.seconds).sum()
    }

    pub fn members(&self) -> [usize; 4] {
        self.legs.map(|leg| leg.participant)
    }

    pub fn contains(&self, participant: usize) -> bool {
        self.legs.iter().any(|leg| leg.participant == participant)
    }

    pub fn leg_of(&self, participant: usize) -> Option<&TeamLeg> {
        self.legs.iter().find(|leg| leg.participant == participant)
    }
}
