use super::assignment::assign_role;
use super::eligibility::{self, DayContext};
use super::state::RunState;
use super::types::{DayPhase, DayState};
use crate::model::{Nurse, Role, ShiftKind};
use crate::rules::{ForcedOffMode, RuleSet};
use crate::table::{Cell, FillRecord, OffReason, Overrun, ScheduleTable, Shortfall};
use rand::seq::SliceRandom;
use tracing::{trace, warn};

#[derive(Debug, Clone, Copy, Default)]
struct Tally {
    charge: usize,
    acting: usize,
}

impl Tally {
    fn total(&self) -> usize {
        self.charge + self.acting
    }
    fn add(&mut self, role: Role, n: usize) {
        match role {
            Role::Charge => self.charge += n,
            Role::Acting => self.acting += n,
        }
    }
}

/// Ce que produit une journée finalisée.
pub(super) struct DayResult {
    pub cells: Vec<Cell>,
    pub shortfalls: Vec<Shortfall>,
    pub audit: Vec<FillRecord>,
}

/// Automate d'une journée : Pending → RolesFilling → ShortfallCheck →
/// OffBackfill → Finalized.
pub(super) struct DayRun<'a> {
    day: DayState,
    horizon: u32,
    nurses: &'a [Nurse],
    rules: &'a RuleSet,
    run: &'a mut RunState,
    today: Vec<Option<Cell>>,
    tallies: [Tally; 3],
    phase: DayPhase,
    shortfalls: Vec<Shortfall>,
    audit: Vec<FillRecord>,
}

impl<'a> DayRun<'a> {
    pub(super) fn new(
        day: DayState,
        horizon: u32,
        nurses: &'a [Nurse],
        rules: &'a RuleSet,
        run: &'a mut RunState,
    ) -> Self {
        Self {
            day,
            horizon,
            nurses,
            rules,
            run,
            today: vec![None; nurses.len()],
            tallies: [Tally::default(); 3],
            phase: DayPhase::Pending,
            shortfalls: Vec::new(),
            audit: Vec::new(),
        }
    }

    pub(super) fn run(mut self) -> DayResult {
        loop {
            trace!(day = self.day.day, phase = ?self.phase, "day phase");
            self.phase = match self.phase {
                DayPhase::Pending => self.pending(),
                DayPhase::RolesFilling => self.fill_roles(),
                DayPhase::ShortfallCheck => self.check_shortfalls(),
                DayPhase::OffBackfill => self.backfill_off(),
                DayPhase::Finalized => break,
            };
        }

        DayResult {
            cells: self
                .today
                .into_iter()
                .map(|c| c.unwrap_or(Cell::Unassigned))
                .collect(),
            shortfalls: self.shortfalls,
            audit: self.audit,
        }
    }

    /// Absences déclarées, plafond de série, minimum de repos, puis jours fériés.
    fn pending(&mut self) -> DayPhase {
        let day = self.day.day;
        for (idx, nurse) in self.nurses.iter().enumerate() {
            let state = &self.run.nurses[idx];
            let reason = eligibility::unavailability(nurse, day)
                .or_else(|| eligibility::at_cap(state, self.rules).then_some(OffReason::Rest))
                .or_else(|| {
                    eligibility::needs_minimum_off(state, self.rules, day, self.horizon)
                        .then_some(OffReason::MinimumOff)
                });
            if let Some(reason) = reason {
                self.today[idx] = Some(Cell::Off(reason));
            }
        }

        if !self.day.forced_off {
            return DayPhase::RolesFilling;
        }

        let free = self.free_indices();
        match self.rules.forced_off_mode {
            ForcedOffMode::Additive => {
                let picked: Vec<usize> = free
                    .choose_multiple(&mut self.run.rng, self.rules.forced_off_quota)
                    .copied()
                    .collect();
                for idx in picked {
                    self.today[idx] = Some(Cell::Off(OffReason::Holiday));
                }
                DayPhase::RolesFilling
            }
            ForcedOffMode::Exclusive => {
                for idx in free {
                    self.today[idx] = Some(Cell::Off(OffReason::Holiday));
                }
                DayPhase::OffBackfill
            }
        }
    }

    fn fill_roles(&mut self) -> DayPhase {
        for shift in ShiftKind::FILL_ORDER {
            let headcount = self.rules.requirements.for_shift(shift);
            for role in [Role::Charge, Role::Acting] {
                let needed = headcount.for_role(role);
                if needed > 0 {
                    self.fill(shift, role, needed, false);
                }
            }
        }
        DayPhase::ShortfallCheck
    }

    fn check_shortfalls(&mut self) -> DayPhase {
        let day = self.day.day;
        for shift in ShiftKind::FILL_ORDER {
            let headcount = self.rules.requirements.for_shift(shift);
            let filled = self.tally(shift).total();
            if filled < headcount.total() {
                let deficit = headcount.total() - filled;
                self.fill(shift, Role::Acting, deficit, true);
            }

            // l'Acting ne reprend que la part de l'écart non imputée à la Charge
            let tally = self.tally(shift);
            let gap = headcount.total().saturating_sub(tally.total());
            let charge_gap = headcount.charge.saturating_sub(tally.charge);
            let gaps = [(Role::Charge, charge_gap), (Role::Acting, gap.saturating_sub(charge_gap))];
            for (role, deficit) in gaps {
                if deficit > 0 {
                    warn!(day, %shift, %role, deficit, "coverage shortfall");
                    self.shortfalls.push(Shortfall {
                        day,
                        shift,
                        role,
                        deficit,
                    });
                }
            }
        }
        DayPhase::OffBackfill
    }

    fn backfill_off(&mut self) -> DayPhase {
        let leave_empty = self.day.is_holiday && !self.rules.fill_off_on_holidays;
        for (idx, slot) in self.today.iter_mut().enumerate() {
            let cell = slot.get_or_insert(if leave_empty {
                Cell::Unassigned
            } else {
                Cell::Off(OffReason::Scheduled)
            });
            match cell {
                Cell::Off(_) => self.run.nurses[idx].record_off(),
                Cell::Unassigned => self.run.nurses[idx].record_idle(),
                Cell::Work { .. } => {}
            }
        }
        DayPhase::Finalized
    }

    fn fill(&mut self, shift: ShiftKind, role: Role, needed: usize, backfill: bool) {
        let pool = eligibility::eligible(&self.context(), shift, role);
        let chosen = assign_role(
            self.run,
            &mut self.today,
            self.nurses,
            self.rules.tie_break,
            shift,
            role,
            needed,
            &pool,
            self.day.day,
        );
        self.tally_mut(shift).add(role, chosen.len());
        self.audit.push(FillRecord {
            day: self.day.day,
            shift,
            role,
            required: needed,
            eligible: pool.len(),
            assigned: chosen.len(),
            backfill,
        });
    }

    fn context(&self) -> DayContext<'_> {
        DayContext {
            nurses: self.nurses,
            states: &self.run.nurses,
            today: &self.today,
            day: &self.day,
            rules: self.rules,
        }
    }

    fn free_indices(&self) -> Vec<usize> {
        self.today
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_none())
            .map(|(i, _)| i)
            .collect()
    }

    fn tally(&self, shift: ShiftKind) -> Tally {
        self.tallies[tally_index(shift)]
    }

    fn tally_mut(&mut self, shift: ShiftKind) -> &mut Tally {
        &mut self.tallies[tally_index(shift)]
    }
}

fn tally_index(shift: ShiftKind) -> usize {
    match shift {
        ShiftKind::Night => 0,
        ShiftKind::Day => 1,
        ShiftKind::Evening | ShiftKind::Off => 2,
    }
}

/// Marque les séries longues sur les vacations du jour `day`.
pub(super) fn mark_overruns(table: &mut ScheduleTable, day: u32, rules: &RuleSet) {
    for row in 0..table.rows().len() {
        let run = table.trailing_run(row, day);
        let marker = if run >= rules.overrun_alert_days {
            Some(Overrun::Alert)
        } else if run >= rules.overrun_warning_days {
            Some(Overrun::Warning)
        } else {
            None
        };
        if let Some(Cell::Work { overrun, .. }) = table.cell_mut(row, day) {
            *overrun = marker;
        }
    }
}
