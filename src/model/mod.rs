pub mod participant;
pub mod result;
pub mod slot;
pub mod team;

pub use participant::{
    Distance, Gender, Participant, Session, Stroke, TimeEntry, TimeTable, MAX_SLOTS_LIMIT,
};
pub use result::{
    Assignment, AssignmentLeg, ConstraintWarning, OptimizationResult, ParticipantUsage,
    RunSummary, SkipReason, SkipRecord, WarningKind,
};
pub use slot::{Composition, Discipline, Slot, DEFAULT_COMPETITION_LEVEL, MEDLEY_ORDER};
pub use team::{ResultBand, Team, TeamLeg, BAND_COUNT};
