use crate::model::{Role, ShiftKind};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Effectif requis pour une vacation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Headcount {
    #[serde(default)]
    pub charge: usize,
    #[serde(default)]
    pub acting: usize,
}

impl Headcount {
    pub const fn new(charge: usize, acting: usize) -> Self {
        Self { charge, acting }
    }
    pub fn total(&self) -> usize {
        self.charge + self.acting
    }
    pub fn for_role(&self, role: Role) -> usize {
        match role {
            Role::Charge => self.charge,
            Role::Acting => self.acting,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Requirements {
    pub day: Headcount,
    pub evening: Headcount,
    pub night: Headcount,
}

impl Default for Requirements {
    fn default() -> Self {
        Self {
            day: Headcount::new(2, 2),
            evening: Headcount::new(2, 2),
            night: Headcount::new(2, 0),
        }
    }
}

impl Requirements {
    pub fn for_shift(&self, shift: ShiftKind) -> Headcount {
        match shift {
            ShiftKind::Day => self.day,
            ShiftKind::Evening => self.evening,
            ShiftKind::Night => self.night,
            ShiftKind::Off => Headcount::default(),
        }
    }
}

/// Traitement des jours fériés / week-ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForcedOffMode {
    /// Quelques infirmières tirées au sort passent en repos, les autres travaillent.
    #[default]
    Additive,
    /// Tout le monde est en repos, aucune vacation n'est pourvue.
    Exclusive,
}

impl FromStr for ForcedOffMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "additive" => Ok(Self::Additive),
            "exclusive" => Ok(Self::Exclusive),
            _ => Err(format!("unknown forced-off mode: {s}")),
        }
    }
}

/// Départage entre candidates également éligibles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    #[default]
    RandomUniform,
    PriorityOrder,
    LeastRecentlyAssigned,
}

impl FromStr for TieBreak {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "random" | "random_uniform" => Ok(Self::RandomUniform),
            "priority" | "priority_order" => Ok(Self::PriorityOrder),
            "least_recent" | "least_recently_assigned" => Ok(Self::LeastRecentlyAssigned),
            _ => Err(format!("unknown tie-break policy: {s}")),
        }
    }
}

impl fmt::Display for TieBreak {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TieBreak::RandomUniform => "random_uniform",
            TieBreak::PriorityOrder => "priority_order",
            TieBreak::LeastRecentlyAssigned => "least_recently_assigned",
        })
    }
}

/// Règles d'une génération. Tous les champs ont une valeur par défaut, un
/// fichier JSON partiel suffit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleSet {
    pub requirements: Requirements,
    /// Nombre maximal de jours travaillés d'affilée.
    pub max_consecutive_days: u32,
    pub overrun_warning_days: u32,
    pub overrun_alert_days: u32,
    pub forced_off_mode: ForcedOffMode,
    /// Mode additif : nombre maximal de repos tirés au sort un jour férié.
    pub forced_off_quota: usize,
    /// Ignore entièrement le traitement des jours fériés / week-ends.
    pub forced_off_exempt: bool,
    /// Si faux, les jours fériés ne reçoivent pas de repos automatique.
    pub fill_off_on_holidays: bool,
    /// Autorise `night_charge_only` à tenir la Charge de nuit.
    pub night_charge_refinement: bool,
    pub min_charge_nurses: usize,
    /// Minimum de repos sur le mois.
    pub min_off_days: Option<u32>,
    /// Repos minimal entre deux vacations (0 = désactivé).
    pub min_rest_hours: u32,
    pub tie_break: TieBreak,
    pub seed: Option<u64>,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            requirements: Requirements::default(),
            max_consecutive_days: 3,
            overrun_warning_days: 3,
            overrun_alert_days: 5,
            forced_off_mode: ForcedOffMode::Additive,
            forced_off_quota: 3,
            forced_off_exempt: false,
            fill_off_on_holidays: true,
            night_charge_refinement: true,
            min_charge_nurses: 2,
            min_off_days: Some(8),
            min_rest_hours: 0,
            tie_break: TieBreak::RandomUniform,
            seed: None,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    #[error("max_consecutive_days must be > 0")]
    ZeroConsecutiveCap,
    #[error("overrun thresholds must satisfy 0 < warning ({warning}) <= alert ({alert})")]
    OverrunThresholds { warning: u32, alert: u32 },
    #[error("no shift requires any staff")]
    NoRequirement,
    #[error("min_rest_hours must be <= 24 (got {0})")]
    RestTooLong(u32),
}

impl RuleSet {
    pub fn validate(&self) -> Result<(), RuleError> {
        if self.max_consecutive_days == 0 {
            return Err(RuleError::ZeroConsecutiveCap);
        }
        if self.overrun_warning_days == 0 || self.overrun_warning_days > self.overrun_alert_days {
            return Err(RuleError::OverrunThresholds {
                warning: self.overrun_warning_days,
                alert: self.overrun_alert_days,
            });
        }
        let staffed = ShiftKind::FILL_ORDER
            .iter()
            .any(|s| self.requirements.for_shift(*s).total() > 0);
        if !staffed {
            return Err(RuleError::NoRequirement);
        }
        if self.min_rest_hours > 24 {
            return Err(RuleError::RestTooLong(self.min_rest_hours));
        }
        Ok(())
    }
}

pub fn load_rules_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<RuleSet> {
    let path = path.as_ref();
    let data = fs::read(path).with_context(|| format!("reading rules {}", path.display()))?;
    let rules: RuleSet = serde_json::from_slice(&data)
        .with_context(|| format!("parsing rules {}", path.display()))?;
    rules.validate()?;
    Ok(rules)
}

pub fn export_rules_json<P: AsRef<Path>>(path: P, rules: &RuleSet) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(rules)?;
    fs::write(path, json)?;
    Ok(())
}
