use std::fmt;

use serde::Serialize;

use crate::model::participant::{Gender, Stroke};
use crate::model::team::ResultBand;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssignmentLeg {
    pub participant_id: String,
    pub name: String,
    pub stroke: Stroke,
    pub seconds: f64,
}

/// A filled slot in the final solution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assignment {
    pub slot_id: u32,
    pub slot_name: String,
    /// Relay label such as "4x50".
    pub relay: String,
    pub total_distance: u32,
    pub legs: Vec<AssignmentLeg>,
    pub band: ResultBand,
    pub total_age: u32,
    pub time: f64,
    pub z_score: f64,
    pub placement_value: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    /// The eligible pool cannot supply the gender mix the slot needs.
    Composition {
        required: String,
        male: usize,
        female: usize,
    },
    /// Enough eligible participants exist but too few are still under quota.
    QuotaExhausted { open: usize, eligible: usize },
    /// No quartet from the under-quota pool covers the legs.
    NoLegalOrdering { eligible: usize },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("no legal team could be formed: ")?;
        match self {
            Self::Composition {
                required,
                male,
                female,
            } => write!(
                f,
                "composition requires {required}, eligible pool has {male} male and {female} female"
            ),
            Self::QuotaExhausted { open, eligible } => write!(
                f,
                "only {open} of {eligible} eligible participants are under quota"
            ),
            Self::NoLegalOrdering { eligible } => write!(
                f,
                "no quartet of the {eligible} under-quota eligible participants covers every leg"
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkipRecord {
    pub slot_id: u32,
    pub slot_name: String,
    pub reason: String,
    pub detail: SkipReason,
}

impl SkipRecord {
    pub fn new(slot_id: u32, slot_name: impl Into<String>, detail: SkipReason) -> Self {
        Self {
            slot_id,
            slot_name: slot_name.into(),
            reason: detail.to_string(),
            detail,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    QuotaExceeded,
    DuplicateBand,
    InvalidTeam,
}

/// Post-hoc constraint check finding. Attached to the result, never raised.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstraintWarning {
    pub kind: WarningKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParticipantUsage {
    pub participant_id: String,
    pub name: String,
    pub gender: Gender,
    pub assigned: u32,
    pub max_slots: u8,
    pub slots: Vec<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    pub seed: u64,
    pub baselines: usize,
    pub iterations: usize,
    pub swaps: usize,
    pub cancelled: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OptimizationResult {
    pub assignments: Vec<Assignment>,
    pub skipped: Vec<SkipRecord>,
    pub warnings: Vec<ConstraintWarning>,
    pub usage: Vec<ParticipantUsage>,
    pub total_z_score: f64,
    pub total_placement_points: u32,
    pub summary: RunSummary,
}

impl OptimizationResult {
    pub fn add_assignment(&mut self, assignment: Assignment) {
        self.total_z_score += assignment.z_score;
        self.total_placement_points += assignment.placement_value;
        self.assignments.push(assignment);
    }

    pub fn add_skip(&mut self, record: SkipRecord) {
        self.skipped.push(record);
    }

    /// Adds a warning unless an identical one is already recorded.
    pub fn add_warning(&mut self, kind: WarningKind, message: impl Into<String>) {
        let warning = ConstraintWarning {
            kind,
            message: message.into(),
        };
        if !self.warnings.contains(&warning) {
            self.warnings.push(warning);
        }
    }

    pub fn assignment_for(&self, slot_id: u32) -> Option<&Assignment> {
        self.assignments.iter().find(|a| a.slot_id == slot_id)
    }

    pub fn usage_for(&self, participant_id: &str) -> Option<&ParticipantUsage> {
        self.usage.iter().find(|u| u.participant_id == participant_id)
    }
}
