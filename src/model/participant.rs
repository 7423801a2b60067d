use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Highest per-participant slot quota a meet accepts.
pub const MAX_SLOTS_LIMIT: u8 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Session {
    Morning,
    Afternoon,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stroke {
    Back,
    Breast,
    Fly,
    Free,
}

impl Stroke {
    pub const ALL: [Stroke; 4] = [Stroke::Back, Stroke::Breast, Stroke::Fly, Stroke::Free];

    fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Back => "back",
            Self::Breast => "breast",
            Self::Fly => "fly",
            Self::Free => "free",
        }
    }
}

impl fmt::Display for Stroke {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-leg distance in metres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum Distance {
    M25,
    M50,
    M100,
    M200,
}

impl Distance {
    pub const ALL: [Distance; 4] = [Distance::M25, Distance::M50, Distance::M100, Distance::M200];

    fn index(self) -> usize {
        self as usize
    }

    pub fn metres(self) -> u16 {
        match self {
            Self::M25 => 25,
            Self::M50 => 50,
            Self::M100 => 100,
            Self::M200 => 200,
        }
    }
}

impl TryFrom<u16> for Distance {
    type Error = String;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            25 => Ok(Self::M25),
            50 => Ok(Self::M50),
            100 => Ok(Self::M100),
            200 => Ok(Self::M200),
            other => Err(format!("unsupported distance {other}, expected 25, 50, 100 or 200")),
        }
    }
}

impl From<Distance> for u16 {
    fn from(value: Distance) -> Self {
        value.metres()
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.metres())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeEntry {
    pub stroke: Stroke,
    pub distance: Distance,
    pub seconds: f64,
}

/// Best recorded times keyed by (stroke, distance). A missing cell means the
/// participant cannot swim that combination.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<TimeEntry>", into = "Vec<TimeEntry>")]
pub struct TimeTable {
    cells: [[Option<f64>; 4]; 4],
}

impl TimeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a time; non-finite or non-positive values clear the cell.
    pub fn set(&mut self, stroke: Stroke, distance: Distance, seconds: f64) {
        let value = (seconds.is_finite() && seconds > 0.0).then_some(seconds);
        self.cells[stroke.index()][distance.index()] = value;
    }

    pub fn with(mut self, stroke: Stroke, distance: Distance, seconds: f64) -> Self {
        self.set(stroke, distance, seconds);
        self
    }

    pub fn get(&self, stroke: Stroke, distance: Distance) -> Option<f64> {
        self.cells[stroke.index()][distance.index()]
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().flatten().all(Option::is_none)
    }

    pub fn entries(&self) -> Vec<TimeEntry> {
        let mut entries = Vec::new();
        for stroke in Stroke::ALL {
            for distance in Distance::ALL {
                if let Some(seconds) = self.get(stroke, distance) {
                    entries.push(TimeEntry {
                        stroke,
                        distance,
                        seconds,
                    });
                }
            }
        }
        entries
    }
}

impl From<Vec<TimeEntry>> for TimeTable {
    fn from(entries: Vec<TimeEntry>) -> Self {
        let mut table = TimeTable::new();
        for entry in entries {
            table.set(entry.stroke, entry.distance, entry.seconds);
        }
        table
    }
}

impl From<TimeTable> for Vec<TimeEntry> {
    fn from(table: TimeTable) -> Self {
        table.entries()
    }
}

fn default_max_slots() -> u8 {
    MAX_SLOTS_LIMIT
}

fn default_available() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    pub gender: Gender,
    #[serde(default)]
    pub times: TimeTable,
    #[serde(default)]
    pub excluded_strokes: Vec<Stroke>,
    #[serde(default = "default_available")]
    pub morning_available: bool,
    #[serde(default = "default_available")]
    pub afternoon_available: bool,
    #[serde(default = "default_max_slots")]
    pub max_slots: u8,
}

impl Participant {
    pub fn name(&self) -> String {
        format!("{}, {}", self.last_name, self.first_name)
    }

    /// Whole years of age on `reference`.
    pub fn age_on(&self, reference: NaiveDate) -> u32 {
        let mut years = reference.year() - self.birth_date.year();
        if (reference.month(), reference.day()) < (self.birth_date.month(), self.birth_date.day()) {
            years -= 1;
        }
        years.max(0) as u32
    }

    pub fn available_for(&self, session: Session) -> bool {
        match session {
            Session::Morning => self.morning_available,
            Session::Afternoon => self.afternoon_available,
        }
    }

    pub fn is_excluded(&self, stroke: Stroke) -> bool {
        self.excluded_strokes.contains(&stroke)
    }

    pub fn can_swim(&self, stroke: Stroke, distance: Distance) -> bool {
        self.leg_time(stroke, distance).is_some()
    }

    /// Time for a leg, or `None` when the stroke is excluded or unrecorded.
    pub fn leg_time(&self, stroke: Stroke, distance: Distance) -> Option<f64> {
        if self.is_excluded(stroke) {
            return None;
        }
        self.times.get(stroke, distance)
    }
}
