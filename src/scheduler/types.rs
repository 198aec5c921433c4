use crate::calendar::CalendarError;
use crate::rules::RuleError;
use thiserror::Error;

/// Erreurs fatales : la génération est refusée avant toute mutation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchedError {
    #[error("roster is empty")]
    EmptyRoster,
    #[error("roster has only {found} charge-eligible nurse(s), at least {required} required")]
    InsufficientChargeNurses { found: usize, required: usize },
    #[error("invalid rules: {0}")]
    InvalidRules(#[from] RuleError),
    #[error(transparent)]
    Calendar(#[from] CalendarError),
}

/// Étapes du traitement d'une journée.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayPhase {
    Pending,
    RolesFilling,
    ShortfallCheck,
    OffBackfill,
    Finalized,
}

/// Drapeaux calendaires d'une journée.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayState {
    pub day: u32,
    pub is_weekend: bool,
    pub is_holiday: bool,
    /// Week-end ou férié, sauf exemption.
    pub forced_off: bool,
}
