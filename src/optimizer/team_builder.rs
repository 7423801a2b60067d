//! Turns four participants into a legal team for a slot, or proves none
//! exists. Every team the engine installs passes through here.

use std::fmt;

use crate::model::{Discipline, Slot, Stroke, Team, TeamLeg, ResultBand, MEDLEY_ORDER};
use crate::optimizer::meet::Meet;

/// The 24 orderings of four legs, lexicographic.
const PERMUTATIONS: [[usize; 4]; 24] = [
    [0, 1, 2, 3], [0, 1, 3, 2], [0, 2, 1, 3], [0, 2, 3, 1], [0, 3, 1, 2], [0, 3, 2, 1],
    [1, 0, 2, 3], [1, 0, 3, 2], [1, 2, 0, 3], [1, 2, 3, 0], [1, 3, 0, 2], [1, 3, 2, 0],
    [2, 0, 1, 3], [2, 0, 3, 1], [2, 1, 0, 3], [2, 1, 3, 0], [2, 3, 0, 1], [2, 3, 1, 0],
    [3, 0, 1, 2], [3, 0, 2, 1], [3, 1, 0, 2], [3, 1, 2, 0], [3, 2, 0, 1], [3, 2, 1, 0],
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TeamRejection {
    DuplicateMember { participant: usize },
    Unavailable { participant: usize },
    Composition,
    MissingLeg { participant: usize, stroke: Stroke },
    NoLegalOrdering,
}

impl fmt::Display for TeamRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateMember { participant } => {
                write!(f, "participant #{participant} appears twice")
            }
            Self::Unavailable { participant } => {
                write!(f, "participant #{participant} is not available for the session")
            }
            Self::Composition => f.write_str("gender composition does not match the slot"),
            Self::MissingLeg {
                participant,
                stroke,
            } => write!(f, "participant #{participant} has no usable {stroke} time"),
            Self::NoLegalOrdering => f.write_str("no leg ordering covers every stroke"),
        }
    }
}

/// Builds the fastest legal team from `members`. Uniform slots keep the given
/// order; medley slots try all 24 orderings and keep the first fastest.
pub fn build_team(meet: &Meet<'_>, slot: &Slot, members: [usize; 4]) -> Result<Team, TeamRejection> {
    check_roster(meet, slot, members)?;

    let legs = match slot.discipline {
        Discipline::Uniform(stroke) => uniform_legs(meet, slot, members, stroke)?,
        Discipline::Medley => medley_legs(meet, slot, members).ok_or(TeamRejection::NoLegalOrdering)?,
    };

    let total_age = members.iter().map(|index| meet.age(*index)).sum();
    Ok(Team {
        slot_id: slot.id,
        legs,
        total_age,
        band: ResultBand::from_total_age(total_age),
    })
}

/// Re-checks an existing team exactly as ordered.
pub fn validate_team(meet: &Meet<'_>, slot: &Slot, team: &Team) -> Result<(), TeamRejection> {
    if team.slot_id != slot.id {
        return Err(TeamRejection::NoLegalOrdering);
    }
    check_roster(meet, slot, team.members())?;
    for (leg, stroke) in team.legs.iter().zip(slot.legs()) {
        let recorded = meet
            .participant(leg.participant)
            .leg_time(stroke, slot.distance);
        match recorded {
            Some(seconds) if leg.stroke == stroke && seconds == leg.seconds => {}
            _ => {
                return Err(TeamRejection::MissingLeg {
                    participant: leg.participant,
                    stroke,
                })
            }
        }
    }
    Ok(())
}

fn check_roster(meet: &Meet<'_>, slot: &Slot, members: [usize; 4]) -> Result<(), TeamRejection> {
    for (position, index) in members.iter().enumerate() {
        if members[..position].contains(index) {
            return Err(TeamRejection::DuplicateMember { participant: *index });
        }
        if !meet.participant(*index).available_for(slot.session) {
            return Err(TeamRejection::Unavailable { participant: *index });
        }
    }
    let genders = members.map(|index| meet.gender(index));
    if !slot.composition.accepts(&genders) {
        return Err(TeamRejection::Composition);
    }
    Ok(())
}

fn uniform_legs(
    meet: &Meet<'_>,
    slot: &Slot,
    members: [usize; 4],
    stroke: Stroke,
) -> Result<[TeamLeg; 4], TeamRejection> {
    let mut legs = [TeamLeg {
        participant: 0,
        stroke,
        seconds: 0.0,
    }; 4];
    for (leg, participant) in legs.iter_mut().zip(members) {
        let seconds = meet
            .participant(participant)
            .leg_time(stroke, slot.distance)
            .ok_or(TeamRejection::MissingLeg {
                participant,
                stroke,
            })?;
        *leg = TeamLeg {
            participant,
            stroke,
            seconds,
        };
    }
    Ok(legs)
}

fn medley_legs(meet: &Meet<'_>, slot: &Slot, members: [usize; 4]) -> Option<[TeamLeg; 4]> {
    // times[m][l]: member m swimming leg l
    let times: [[Option<f64>; 4]; 4] = members.map(|index| {
        let participant = meet.participant(index);
        MEDLEY_ORDER.map(|stroke| participant.leg_time(stroke, slot.distance))
    });

    let mut best: Option<([usize; 4], f64)> = None;
    for order in PERMUTATIONS {
        let mut total = 0.0;
        let mut legal = true;
        for (leg, member) in order.iter().enumerate() {
            match times[*member][leg] {
                Some(seconds) => total += seconds,
                None => {
                    legal = false;
                    break;
                }
            }
        }
        if legal && best.map_or(true, |(_, best_total)| total < best_total) {
            best = Some((order, total));
        }
    }

    let (order, _) = best?;
    let mut legs = [TeamLeg {
        participant: 0,
        stroke: Stroke::Back,
        seconds: 0.0,
    }; 4];
    for (leg, member) in order.iter().enumerate() {
        legs[leg] = TeamLeg {
            participant: members[*member],
            stroke: MEDLEY_ORDER[leg],
            seconds: times[*member][leg]?,
        };
    }
    Some(legs)
}
