#![forbid(unsafe_code)]
//! Planning de garde — génération locale de plannings infirmiers (sans BD).
//!
//! - Registre d'infirmières validé (priorité = matricule croissant).
//! - Remplissage glouton jour par jour : Nuit, puis Jour, puis Soir.
//! - Départage configurable (aléatoire reproductible, priorité, rotation).
//! - Déficits signalés, jamais réparés par retour arrière.
//! - Import/export CSV, stockage JSON ; rendu en dehors de la lib.

pub mod calendar;
pub mod io;
pub mod model;
pub mod registry;
pub mod report;
pub mod rules;
pub mod scheduler;
pub mod storage;
pub mod table;

pub use calendar::{CalendarError, CalendarProvider, HolidayCalendar, HolidayOverrides};
pub use model::{EmployeeId, MalformedRecord, Nurse, NurseRecord, Role, ShiftKind, Team, WorkType};
pub use registry::{NurseRegistry, RegistryError};
pub use report::{prepare_summary, summarize, NurseSummary, SummaryRenderer, TextSummary};
pub use rules::{load_rules_from_file, ForcedOffMode, Headcount, Requirements, RuleSet, TieBreak};
pub use scheduler::{generate_schedule, SchedError, Scheduler};
pub use storage::{JsonStorage, Storage};
pub use table::{
    Cell, FillRecord, OffReason, Overrun, RunId, ScheduleOutcome, ScheduleRow, ScheduleTable,
    Shortfall,
};
