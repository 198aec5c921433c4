use super::state::NurseState;
use super::types::DayState;
use crate::model::{Nurse, Role, ShiftKind};
use crate::rules::RuleSet;
use crate::table::{Cell, OffReason};

/// Vue en lecture seule d'une journée en cours de remplissage.
#[derive(Debug, Clone, Copy)]
pub struct DayContext<'a> {
    pub nurses: &'a [Nurse],
    pub states: &'a [NurseState],
    /// Cases déjà décidées aujourd'hui (`None` = encore libre).
    pub today: &'a [Option<Cell>],
    pub day: &'a DayState,
    pub rules: &'a RuleSet,
}

/// Indices des infirmières pouvant tenir (`shift`, `role`) aujourd'hui.
/// Fonction pure : aucun état n'est modifié.
pub fn eligible(ctx: &DayContext<'_>, shift: ShiftKind, role: Role) -> Vec<usize> {
    ctx.nurses
        .iter()
        .enumerate()
        .filter(|(idx, nurse)| {
            let state = &ctx.states[*idx];
            ctx.today[*idx].is_none()
                && unavailability(nurse, ctx.day.day).is_none()
                && nurse.work_type.allows(shift)
                && !at_cap(state, ctx.rules)
                && rest_respected(state, shift, ctx.day.day, ctx.rules)
                && (role == Role::Acting || may_take_charge(nurse, shift, ctx.rules))
        })
        .map(|(idx, _)| idx)
        .collect()
}

/// Motif d'absence déclarée pour `day`, le cas échéant.
pub fn unavailability(nurse: &Nurse, day: u32) -> Option<OffReason> {
    if nurse.requested_off.contains(&day) {
        Some(OffReason::Requested)
    } else if nurse.leave.contains(&day) {
        Some(OffReason::Leave)
    } else if nurse.public_leave.contains(&day) {
        Some(OffReason::PublicLeave)
    } else {
        None
    }
}

pub fn at_cap(state: &NurseState, rules: &RuleSet) -> bool {
    state.consecutive >= rules.max_consecutive_days
}

/// Vrai si tous les jours restants doivent être des repos pour atteindre
/// `min_off_days`.
pub fn needs_minimum_off(state: &NurseState, rules: &RuleSet, day: u32, horizon: u32) -> bool {
    let Some(min_off) = rules.min_off_days else {
        return false;
    };
    let needed = min_off.saturating_sub(state.off_granted);
    let remaining = horizon.saturating_sub(day) + 1;
    needed > 0 && needed >= remaining
}

fn may_take_charge(nurse: &Nurse, shift: ShiftKind, rules: &RuleSet) -> bool {
    nurse.charge_eligible
        || (rules.night_charge_refinement && shift == ShiftKind::Night && nurse.night_charge_only)
}

fn rest_respected(state: &NurseState, shift: ShiftKind, day: u32, rules: &RuleSet) -> bool {
    if rules.min_rest_hours == 0 {
        return true;
    }
    let (Some(last_day), Some(last_shift)) = (state.last_worked_day, state.last_shift) else {
        return true;
    };
    let (Some((_, prev_end)), Some((next_start, _))) = (last_shift.hours(), shift.hours()) else {
        return true;
    };
    let prev_end = i64::from(last_day) * 24 + prev_end;
    let next_start = i64::from(day) * 24 + next_start;
    next_start - prev_end >= i64::from(rules.min_rest_hours)
}
