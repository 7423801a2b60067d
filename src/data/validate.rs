use std::collections::HashSet;
use std::fmt;

use crate::model::{Composition, Gender, Participant, Session, Slot, MAX_SLOTS_LIMIT};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ValidationSeverity {
    Error,
    Warning,
    Info,
}

impl ValidationSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for ValidationSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationDiagnostic {
    pub severity: ValidationSeverity,
    pub context: String,
    pub message: String,
}

impl fmt::Display for ValidationDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.context, self.message)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub diagnostics: Vec<ValidationDiagnostic>,
}

impl ValidationReport {
    pub fn push(
        &mut self,
        severity: ValidationSeverity,
        context: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.diagnostics.push(ValidationDiagnostic {
            severity,
            context: context.into(),
            message: message.into(),
        });
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diag| diag.severity == ValidationSeverity::Error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationDiagnostic> {
        self.diagnostics
            .iter()
            .filter(|diag| diag.severity == ValidationSeverity::Error)
    }

    /// Error diagnostics joined into one line.
    pub fn summary(&self) -> String {
        let errors: Vec<String> = self
            .errors()
            .map(|diag| format!("{}: {}", diag.context, diag.message))
            .collect();
        if errors.is_empty() {
            "no errors".to_string()
        } else {
            errors.join("; ")
        }
    }
}

/// Static checks run before any search. Errors make the meet unusable;
/// warnings describe inputs that will quietly shrink the candidate pools.
pub fn validate_meet(participants: &[Participant], slots: &[Slot]) -> ValidationReport {
    let mut report = ValidationReport::default();

    let mut seen_ids = HashSet::new();
    for (index, participant) in participants.iter().enumerate() {
        let context = format!("participants[{index}] id='{}'", participant.id);
        if participant.id.trim().is_empty() {
            report.push(ValidationSeverity::Error, context.clone(), "missing non-empty 'id'");
        } else if !seen_ids.insert(participant.id.as_str()) {
            report.push(
                ValidationSeverity::Error,
                context.clone(),
                format!("duplicate id '{}'", participant.id),
            );
        }

        if !(1..=MAX_SLOTS_LIMIT).contains(&participant.max_slots) {
            report.push(
                ValidationSeverity::Error,
                context.clone(),
                format!(
                    "max_slots {} outside 1..={MAX_SLOTS_LIMIT}",
                    participant.max_slots
                ),
            );
        }

        if participant.times.is_empty() {
            report.push(ValidationSeverity::Warning, context.clone(), "no recorded times");
        }

        if !participant.available_for(Session::Morning) && !participant.available_for(Session::Afternoon) {
            report.push(
                ValidationSeverity::Warning,
                context,
                "unavailable for both sessions",
            );
        }
    }

    let count = |gender: Gender| participants.iter().filter(|p| p.gender == gender).count();
    let (male, female) = (count(Gender::Male), count(Gender::Female));
    let mut seen_slots = HashSet::new();
    for (index, slot) in slots.iter().enumerate() {
        let context = format!("slots[{index}] id={}", slot.id);
        if !seen_slots.insert(slot.id) {
            report.push(
                ValidationSeverity::Error,
                context.clone(),
                format!("duplicate slot id {}", slot.id),
            );
        }

        let needs = match slot.composition {
            Composition::Male => vec![(Gender::Male, 4, male)],
            Composition::Female => vec![(Gender::Female, 4, female)],
            Composition::Mixed => vec![(Gender::Male, 2, male), (Gender::Female, 2, female)],
        };
        for (gender, need, have) in needs.into_iter().filter(|(_, need, have)| have < need) {
            report.push(
                ValidationSeverity::Error,
                context.clone(),
                format!(
                    "{} slot needs {need} {gender} participants but the roster has {have}",
                    slot.composition
                ),
            );
        }

        if slot.effective_level() != slot.competition_level {
            report.push(
                ValidationSeverity::Warning,
                context,
                format!(
                    "competition level {} outside 1..=5, scored as {}",
                    slot.competition_level,
                    slot.effective_level()
                ),
            );
        }
    }

    report
}
