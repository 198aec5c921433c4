use crate::model::{EmployeeId, Nurse, Role, ShiftKind, Team};
use std::fmt;
use uuid::Uuid;

/// Marqueur de dépassement de jours consécutifs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Overrun {
    Warning,
    Alert,
}

/// Motif d'un repos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OffReason {
    Scheduled,
    Requested,
    Leave,
    PublicLeave,
    Holiday,
    Rest,
    MinimumOff,
}

/// Case (infirmière, jour) du planning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Unassigned,
    Work {
        shift: ShiftKind,
        role: Role,
        team: Team,
        overrun: Option<Overrun>,
    },
    Off(OffReason),
}

impl Cell {
    pub fn work(shift: ShiftKind, role: Role, team: Team) -> Self {
        Cell::Work {
            shift,
            role,
            team,
            overrun: None,
        }
    }

    pub fn is_working(&self) -> bool {
        matches!(self, Cell::Work { .. })
    }

    pub fn shift(&self) -> Option<ShiftKind> {
        match self {
            Cell::Work { shift, .. } => Some(*shift),
            Cell::Off(_) => Some(ShiftKind::Off),
            Cell::Unassigned => None,
        }
    }

    pub fn role(&self) -> Option<Role> {
        match self {
            Cell::Work { role, .. } => Some(*role),
            _ => None,
        }
    }

    pub fn off_reason(&self) -> Option<OffReason> {
        match self {
            Cell::Off(reason) => Some(*reason),
            _ => None,
        }
    }

    /// Libellé exporté (`N-C(A)`, `D-A(B)!`, `Off`, `PL`, `-`…).
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Unassigned => f.write_str("-"),
            Cell::Work {
                shift,
                role,
                team,
                overrun,
            } => {
                write!(f, "{}-{}({})", shift.code(), role.code(), team)?;
                match overrun {
                    Some(Overrun::Warning) => f.write_str("!"),
                    Some(Overrun::Alert) => f.write_str("!!"),
                    None => Ok(()),
                }
            }
            Cell::Off(reason) => f.write_str(match reason {
                OffReason::Leave => "Leave",
                OffReason::PublicLeave => "PL",
                OffReason::Holiday => "Off(H)",
                OffReason::Scheduled
                | OffReason::Requested
                | OffReason::Rest
                | OffReason::MinimumOff => "Off",
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScheduleRow {
    pub employee_id: EmployeeId,
    pub name: String,
    pub priority: usize,
    cells: Vec<Cell>,
}

impl ScheduleRow {
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Case du jour `day` (1-indexé).
    pub fn cell(&self, day: u32) -> Option<&Cell> {
        day.checked_sub(1).and_then(|i| self.cells.get(i as usize))
    }

    pub fn labels(&self) -> Vec<String> {
        self.cells.iter().map(Cell::label).collect()
    }
}

/// Planning infirmières × jours, toujours rectangulaire.
#[derive(Debug, Clone)]
pub struct ScheduleTable {
    year: i32,
    month: u32,
    days: u32,
    rows: Vec<ScheduleRow>,
}

impl ScheduleTable {
    /// Les lignes suivent l'ordre de `nurses` (ordre de priorité attendu).
    pub fn new(year: i32, month: u32, days: u32, nurses: &[Nurse]) -> Self {
        let rows = nurses
            .iter()
            .map(|n| ScheduleRow {
                employee_id: n.employee_id,
                name: n.name.clone(),
                priority: n.priority,
                cells: vec![Cell::Unassigned; days as usize],
            })
            .collect();
        Self {
            year,
            month,
            days,
            rows,
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }
    pub fn month(&self) -> u32 {
        self.month
    }
    pub fn days(&self) -> u32 {
        self.days
    }
    pub fn rows(&self) -> &[ScheduleRow] {
        &self.rows
    }

    pub fn row(&self, name: &str) -> Option<&ScheduleRow> {
        self.rows.iter().find(|r| r.name == name)
    }

    pub fn cell(&self, name: &str, day: u32) -> Option<&Cell> {
        self.row(name).and_then(|r| r.cell(day))
    }

    /// Cases du jour `day`, dans l'ordre des lignes.
    pub fn column(&self, day: u32) -> impl Iterator<Item = &Cell> + '_ {
        self.rows.iter().filter_map(move |r| r.cell(day))
    }

    /// Nombre d'affectations (vacation, rôle) un jour donné.
    pub fn count(&self, day: u32, shift: ShiftKind, role: Role) -> usize {
        self.column(day)
            .filter(|c| c.shift() == Some(shift) && c.role() == Some(role))
            .count()
    }

    /// En-tête d'export : `employee_id,name,1,2,…,N`.
    pub fn header(&self) -> Vec<String> {
        let mut buf = itoa::Buffer::new();
        let mut out = vec!["employee_id".to_string(), "name".to_string()];
        out.extend((1..=self.days).map(|d| buf.format(d).to_string()));
        out
    }

    pub(crate) fn set_column(&mut self, day: u32, cells: Vec<Cell>) {
        debug_assert_eq!(cells.len(), self.rows.len());
        let idx = (day - 1) as usize;
        for (row, cell) in self.rows.iter_mut().zip(cells) {
            row.cells[idx] = cell;
        }
    }

    pub(crate) fn cell_mut(&mut self, row: usize, day: u32) -> Option<&mut Cell> {
        let idx = day.checked_sub(1)? as usize;
        self.rows.get_mut(row).and_then(|r| r.cells.get_mut(idx))
    }

    /// Longueur de la série de jours travaillés se terminant au jour `day`.
    pub fn trailing_run(&self, row: usize, day: u32) -> u32 {
        let Some(r) = self.rows.get(row) else {
            return 0;
        };
        let end = (day as usize).min(r.cells.len());
        r.cells[..end]
            .iter()
            .rev()
            .take_while(|c| c.is_working())
            .count() as u32
    }
}

/// Déficit non comblé pour (jour, vacation, rôle).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shortfall {
    pub day: u32,
    pub shift: ShiftKind,
    pub role: Role,
    pub deficit: usize,
}

/// Trace d'un remplissage de rôle (audit).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillRecord {
    pub day: u32,
    pub shift: ShiftKind,
    pub role: Role,
    pub required: usize,
    /// Taille du vivier éligible au moment du tirage.
    pub eligible: usize,
    pub assigned: usize,
    pub backfill: bool,
}

/// Identifiant d'une génération.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunId(Uuid);

impl RunId {
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Résultat d'une génération réussie.
#[derive(Debug, Clone)]
pub struct ScheduleOutcome {
    pub run_id: RunId,
    /// Graine effectivement utilisée (permet de rejouer la génération).
    pub seed: u64,
    pub table: ScheduleTable,
    pub shortfalls: Vec<Shortfall>,
    pub audit: Vec<FillRecord>,
}

impl ScheduleOutcome {
    pub fn has_shortfalls(&self) -> bool {
        !self.shortfalls.is_empty()
    }

    pub fn shortfalls_on(&self, day: u32) -> impl Iterator<Item = &Shortfall> + '_ {
        self.shortfalls.iter().filter(move |s| s.day == day)
    }
}
