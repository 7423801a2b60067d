//! Narrows the roster to participants legally usable in a slot.
//!
//! Mixed slots are not gender-filtered here; balancing two and two is the
//! team builder's job.

use std::cmp::Ordering;

use crate::model::{Gender, Participant, Slot};
use crate::optimizer::meet::Meet;

/// True when the participant could swim at least one of the slot's legs.
pub fn can_contribute(participant: &Participant, slot: &Slot) -> bool {
    slot.strokes()
        .iter()
        .any(|stroke| participant.can_swim(*stroke, slot.distance))
}

pub fn is_eligible(participant: &Participant, slot: &Slot) -> bool {
    if !participant.available_for(slot.session) {
        return false;
    }
    if let Some(required) = slot.composition.required_gender() {
        if participant.gender != required {
            return false;
        }
    }
    can_contribute(participant, slot)
}

/// Every eligible participant, in roster order, regardless of quota.
pub fn eligible_for_slot(meet: &Meet<'_>, slot: &Slot) -> Vec<usize> {
    meet.participants
        .iter()
        .enumerate()
        .filter(|(_, participant)| is_eligible(participant, slot))
        .map(|(index, _)| index)
        .collect()
}

/// Eligible participants that still have room under their quota.
pub fn eligible_under_quota<F>(meet: &Meet<'_>, slot: &Slot, has_capacity: F) -> Vec<usize>
where
    F: Fn(usize) -> bool,
{
    eligible_for_slot(meet, slot)
        .into_iter()
        .filter(|index| has_capacity(*index))
        .collect()
}

/// Fastest time the participant could post on any leg of the slot.
pub fn best_leg_time(participant: &Participant, slot: &Slot) -> Option<f64> {
    slot.strokes()
        .iter()
        .filter_map(|stroke| participant.leg_time(*stroke, slot.distance))
        .min_by(f64::total_cmp)
}

/// Splits a pool into (male, female), preserving order.
pub fn partition_by_gender(meet: &Meet<'_>, pool: &[usize]) -> (Vec<usize>, Vec<usize>) {
    pool.iter()
        .copied()
        .partition(|index| meet.gender(*index) == Gender::Male)
}

/// Sorts fastest first by best leg time; ties keep roster order.
pub fn sort_by_speed(meet: &Meet<'_>, slot: &Slot, pool: &mut [usize]) {
    pool.sort_by(|left, right| {
        let left_time = best_leg_time(meet.participant(*left), slot);
        let right_time = best_leg_time(meet.participant(*right), slot);
        match (left_time, right_time) {
            (Some(a), Some(b)) => a.total_cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    });
}
