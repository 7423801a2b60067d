use chrono::NaiveDate;

use crate::model::{Gender, Participant, Slot};

/// Read-only view of one optimization run's inputs. Participants are
/// addressed by their index in the roster.
#[derive(Debug, Clone)]
pub struct Meet<'a> {
    pub participants: &'a [Participant],
    pub slots: &'a [Slot],
    ages: Vec<u32>,
    mean_age: f64,
}

impl<'a> Meet<'a> {
    pub fn new(participants: &'a [Participant], slots: &'a [Slot], reference: NaiveDate) -> Self {
        let ages: Vec<u32> = participants.iter().map(|p| p.age_on(reference)).collect();
        let mean_age = if ages.is_empty() {
            0.0
        } else {
            ages.iter().map(|age| f64::from(*age)).sum::<f64>() / ages.len() as f64
        };
        Self {
            participants,
            slots,
            ages,
            mean_age,
        }
    }

    pub fn participant(&self, index: usize) -> &'a Participant {
        &self.participants[index]
    }

    pub fn age(&self, index: usize) -> u32 {
        self.ages[index]
    }

    pub fn gender(&self, index: usize) -> Gender {
        self.participants[index].gender
    }

    pub fn mean_age(&self) -> f64 {
        self.mean_age
    }

    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }
}
