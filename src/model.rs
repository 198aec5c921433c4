use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Matricule d'une infirmière. Plus petit = plus prioritaire ; un matricule
/// absent passe après tous les matricules réels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmployeeId(Option<u32>);

impl EmployeeId {
    /// Matricule absent ou illisible (trié en dernier).
    pub const SENTINEL: EmployeeId = EmployeeId(None);
    /// Valeur affichée pour un matricule absent.
    pub const SENTINEL_DISPLAY: u32 = 9999;

    pub fn new(raw: u32) -> Self {
        Self(Some(raw))
    }
    pub fn get(self) -> Option<u32> {
        self.0
    }
    pub fn is_sentinel(self) -> bool {
        self.0.is_none()
    }

    /// Normalise une valeur brute : absente ou non numérique => `SENTINEL`.
    /// Accepte les flottants entiers (`"12.0"`) produits par les tableurs.
    pub fn parse_lenient(raw: Option<&str>) -> Self {
        let parsed = raw
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .and_then(|s| {
                s.parse::<u32>().ok().or_else(|| {
                    s.parse::<f64>()
                        .ok()
                        .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f <= f64::from(u32::MAX))
                        .map(|f| f as u32)
                })
            });
        Self(parsed)
    }
}

impl From<Option<u32>> for EmployeeId {
    fn from(raw: Option<u32>) -> Self {
        Self(raw)
    }
}

impl Ord for EmployeeId {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        match (self.0, other.0) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        }
    }
}

impl PartialOrd for EmployeeId {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.unwrap_or(Self::SENTINEL_DISPLAY), f)
    }
}

/// Type de poste : quelles vacations l'infirmière peut tenir.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum WorkType {
    #[default]
    FullRotation,
    DayOnly,
    EveningOnly,
    NightOnly,
    NightExcluded,
}

impl WorkType {
    pub fn allows(self, shift: ShiftKind) -> bool {
        use ShiftKind::{Day, Evening, Night, Off};
        matches!(
            (self, shift),
            (_, Off)
                | (WorkType::FullRotation, _)
                | (WorkType::DayOnly, Day)
                | (WorkType::EveningOnly, Evening)
                | (WorkType::NightOnly, Night)
                | (WorkType::NightExcluded, Day | Evening)
        )
    }
}

impl FromStr for WorkType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "fullrotation" | "full" | "rotation" | "3교대" | "3교대가능" => Ok(Self::FullRotation),
            "dayonly" | "day" | "dkeep" => Ok(Self::DayOnly),
            "eveningonly" | "evening" | "ekeep" => Ok(Self::EveningOnly),
            "nightonly" | "night" | "nkeep" => Ok(Self::NightOnly),
            "nightexcluded" | "nonight" | "n제외" | "나이트제외" => Ok(Self::NightExcluded),
            _ => Err(format!("unknown work type: {s}")),
        }
    }
}

impl fmt::Display for WorkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WorkType::FullRotation => "FullRotation",
            WorkType::DayOnly => "DayOnly",
            WorkType::EveningOnly => "EveningOnly",
            WorkType::NightOnly => "NightOnly",
            WorkType::NightExcluded => "NightExcluded",
        };
        f.write_str(s)
    }
}

/// Vacation (ou repos).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ShiftKind {
    Day,
    Evening,
    Night,
    Off,
}

impl ShiftKind {
    /// Ordre de remplissage : la nuit d'abord (effectif le plus contraint).
    pub const FILL_ORDER: [ShiftKind; 3] = [ShiftKind::Night, ShiftKind::Day, ShiftKind::Evening];

    pub fn code(self) -> char {
        match self {
            ShiftKind::Day => 'D',
            ShiftKind::Evening => 'E',
            ShiftKind::Night => 'N',
            ShiftKind::Off => 'O',
        }
    }

    /// Bornes horaires (début, fin) en heures depuis minuit du jour travaillé.
    pub fn hours(self) -> Option<(i64, i64)> {
        match self {
            ShiftKind::Day => Some((7, 15)),
            ShiftKind::Evening => Some((15, 23)),
            ShiftKind::Night => Some((23, 31)),
            ShiftKind::Off => None,
        }
    }
}

impl fmt::Display for ShiftKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ShiftKind::Day => "Day",
            ShiftKind::Evening => "Evening",
            ShiftKind::Night => "Night",
            ShiftKind::Off => "Off",
        };
        f.write_str(s)
    }
}

/// Rôle tenu sur une vacation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Role {
    Charge,
    Acting,
}

impl Role {
    pub fn code(self) -> char {
        match self {
            Role::Charge => 'C',
            Role::Acting => 'A',
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Role::Charge => "Charge",
            Role::Acting => "Acting",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    A,
    B,
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Team::A => "A",
            Team::B => "B",
        })
    }
}

/// Infirmière validée.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nurse {
    pub employee_id: EmployeeId,
    pub name: String,
    #[serde(default)]
    pub work_type: WorkType,
    #[serde(default)]
    pub charge_eligible: bool,
    #[serde(default)]
    pub night_charge_only: bool,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub requested_off: BTreeSet<u32>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub leave: BTreeSet<u32>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub public_leave: BTreeSet<u32>,
    /// Rang dérivé (0 = le plus prioritaire), recalculé par le registre.
    #[serde(skip)]
    pub priority: usize,
}

impl Nurse {
    pub fn new<N: Into<String>>(employee_id: u32, name: N, work_type: WorkType) -> Self {
        Self {
            employee_id: EmployeeId::new(employee_id),
            name: name.into(),
            work_type,
            charge_eligible: false,
            night_charge_only: false,
            requested_off: BTreeSet::new(),
            leave: BTreeSet::new(),
            public_leave: BTreeSet::new(),
            priority: 0,
        }
    }

    pub fn with_charge(mut self) -> Self {
        self.charge_eligible = true;
        self
    }

    pub fn with_night_charge(mut self) -> Self {
        self.night_charge_only = true;
        self
    }

    pub fn with_requested_off<I: IntoIterator<Item = u32>>(mut self, days: I) -> Self {
        self.requested_off.extend(days);
        self
    }

    pub fn with_leave<I: IntoIterator<Item = u32>>(mut self, days: I) -> Self {
        self.leave.extend(days);
        self
    }

    pub fn with_public_leave<I: IntoIterator<Item = u32>>(mut self, days: I) -> Self {
        self.public_leave.extend(days);
        self
    }

    /// Normalise un enregistrement brut (import tableur) en infirmière validée.
    pub fn try_from_record(record: &NurseRecord) -> Result<Self, MalformedRecord> {
        let malformed = |reason: String| MalformedRecord {
            line: record.line,
            reason,
        };

        let name = record
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| malformed("missing name".to_string()))?;

        let work_type = match non_empty(&record.work_type) {
            Some(raw) => raw.parse::<WorkType>().map_err(&malformed)?,
            None => WorkType::default(),
        };

        let flag = |raw: &Option<String>, field: &str| -> Result<bool, MalformedRecord> {
            match non_empty(raw) {
                Some(v) => parse_flag(v)
                    .ok_or_else(|| malformed(format!("invalid {field} value for {name}: {v}"))),
                None => Ok(false),
            }
        };
        let days = |raw: &Option<String>, field: &str| -> Result<BTreeSet<u32>, MalformedRecord> {
            match non_empty(raw) {
                Some(v) => parse_day_list(v)
                    .map_err(|e| malformed(format!("invalid {field} for {name}: {e}"))),
                None => Ok(BTreeSet::new()),
            }
        };

        Ok(Self {
            employee_id: EmployeeId::parse_lenient(record.employee_id.as_deref()),
            name: name.to_string(),
            work_type,
            charge_eligible: flag(&record.charge_eligible, "charge_eligible")?,
            night_charge_only: flag(&record.night_charge_only, "night_charge_only")?,
            requested_off: days(&record.requested_off, "requested_off")?,
            leave: days(&record.leave, "leave")?,
            public_leave: days(&record.public_leave, "public_leave")?,
            priority: 0,
        })
    }
}

/// Enregistrement brut, faiblement typé, tel qu'il sort d'un tableur.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NurseRecord {
    /// Ligne source (pour les avertissements).
    #[serde(skip)]
    pub line: usize,
    #[serde(default)]
    pub employee_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub work_type: Option<String>,
    #[serde(default)]
    pub charge_eligible: Option<String>,
    #[serde(default)]
    pub night_charge_only: Option<String>,
    #[serde(default)]
    pub requested_off: Option<String>,
    #[serde(default)]
    pub leave: Option<String>,
    #[serde(default)]
    pub public_leave: Option<String>,
}

/// Enregistrement rejeté à l'import (non fatal pour le lot).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed nurse record (line {line}): {reason}")]
pub struct MalformedRecord {
    pub line: usize,
    pub reason: String,
}

fn non_empty(raw: &Option<String>) -> Option<&str> {
    raw.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Booléen tolérant (`O`/`X` des feuilles de service inclus).
pub fn parse_flag(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "y" | "oui" | "o" => Some(true),
        "false" | "0" | "no" | "n" | "non" | "x" => Some(false),
        _ => None,
    }
}

/// Liste de jours `"3,5,10"` ou `"3;5;10"`.
pub fn parse_day_list(raw: &str) -> Result<BTreeSet<u32>, String> {
    raw.split([',', ';'])
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .map(|chunk| {
            let day = chunk
                .parse::<u32>()
                .map_err(|_| format!("not a day number: {chunk}"))?;
            if (1..=31).contains(&day) {
                Ok(day)
            } else {
                Err(format!("day out of range: {day}"))
            }
        })
        .collect()
}
