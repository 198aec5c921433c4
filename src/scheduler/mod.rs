mod assignment;
mod day;
pub mod eligibility;
mod state;
mod types;

pub use assignment::assign_role;
pub use eligibility::{eligible, DayContext};
pub use state::{NurseState, RunState};
pub use types::{DayPhase, DayState, SchedError};

use crate::calendar::{CalendarProvider, HolidayCalendar, HolidayOverrides};
use crate::model::Nurse;
use crate::registry::NurseRegistry;
use crate::rules::RuleSet;
use crate::table::{RunId, ScheduleOutcome, ScheduleTable};
use tracing::info;

/// Scheduler : règles + calendrier ; chaque appel à `generate` repart d'un
/// état neuf.
#[derive(Debug, Clone)]
pub struct Scheduler<C = HolidayCalendar> {
    rules: RuleSet,
    calendar: C,
}

impl Default for Scheduler<HolidayCalendar> {
    fn default() -> Self {
        Self::new(RuleSet::default(), HolidayCalendar::korea_2025())
    }
}

impl<C: CalendarProvider> Scheduler<C> {
    pub fn new(rules: RuleSet, calendar: C) -> Self {
        Self { rules, calendar }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }
    pub fn calendar(&self) -> &C {
        &self.calendar
    }

    /// Drapeaux de la journée, ajustements de la génération compris.
    pub fn day_state(&self, year: i32, month: u32, day: u32, overrides: &HolidayOverrides) -> DayState {
        let is_weekend = self.calendar.is_weekend(year, month, day);
        let working = overrides.removed.contains(&day);
        let is_holiday = !working
            && (overrides.added.contains(&day) || self.calendar.is_holiday(year, month, day));
        DayState {
            day,
            is_weekend,
            is_holiday,
            forced_off: !working && !self.rules.forced_off_exempt && (is_weekend || is_holiday),
        }
    }

    /// Génère le planning du mois. Refuse de tourner (sans rien produire) si
    /// le registre ou les règles ne permettent pas une génération.
    pub fn generate(
        &self,
        registry: &NurseRegistry,
        year: i32,
        month: u32,
        overrides: &HolidayOverrides,
    ) -> Result<ScheduleOutcome, SchedError> {
        self.rules.validate()?;
        check_roster(registry, &self.rules)?;
        let horizon = self.calendar.days_in_month(year, month)?;

        let seed = self.rules.seed.unwrap_or_else(rand::random);
        let nurses: Vec<Nurse> = registry.by_priority().into_iter().cloned().collect();
        let mut run = RunState::new(nurses.len(), seed);
        let mut table = ScheduleTable::new(year, month, horizon, &nurses);
        let mut shortfalls = Vec::new();
        let mut audit = Vec::new();

        let run_id = RunId::random();
        info!(
            %run_id,
            year,
            month,
            nurses = nurses.len(),
            seed,
            tie_break = %self.rules.tie_break,
            "generating schedule"
        );

        for d in 1..=horizon {
            let state = self.day_state(year, month, d, overrides);
            let result = day::DayRun::new(state, horizon, &nurses, &self.rules, &mut run).run();
            table.set_column(d, result.cells);
            day::mark_overruns(&mut table, d, &self.rules);
            shortfalls.extend(result.shortfalls);
            audit.extend(result.audit);
        }

        info!(%run_id, shortfalls = shortfalls.len(), "schedule generated");
        Ok(ScheduleOutcome {
            run_id,
            seed,
            table,
            shortfalls,
            audit,
        })
    }
}

fn check_roster(registry: &NurseRegistry, rules: &RuleSet) -> Result<(), SchedError> {
    if registry.is_empty() {
        return Err(SchedError::EmptyRoster);
    }
    let found = registry.charge_eligible_count();
    if found < rules.min_charge_nurses {
        return Err(SchedError::InsufficientChargeNurses {
            found,
            required: rules.min_charge_nurses,
        });
    }
    Ok(())
}

/// Génération avec les règles par défaut et le calendrier intégré.
pub fn generate_schedule(
    registry: &NurseRegistry,
    year: i32,
    month: u32,
    overrides: &HolidayOverrides,
) -> Result<ScheduleOutcome, SchedError> {
    Scheduler::default().generate(registry, year, month, overrides)
}
