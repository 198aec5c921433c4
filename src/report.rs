use crate::model::{EmployeeId, Role, ShiftKind};
use crate::table::{Cell, OffReason, Overrun, ScheduleOutcome, ScheduleRow, ScheduleTable};
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// Bilan mensuel d'une infirmière.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NurseSummary {
    pub name: String,
    pub employee_id: Option<EmployeeId>,
    pub day: u32,
    pub evening: u32,
    pub night: u32,
    pub charge: u32,
    pub off: BTreeMap<OffReason, u32>,
    pub unassigned: u32,
    pub warnings: u32,
    pub alerts: u32,
}

impl NurseSummary {
    pub fn worked(&self) -> u32 {
        self.day + self.evening + self.night
    }

    pub fn off_total(&self) -> u32 {
        self.off.values().sum()
    }

    pub fn off_for(&self, reason: OffReason) -> u32 {
        self.off.get(&reason).copied().unwrap_or(0)
    }

    fn from_row(row: &ScheduleRow) -> Self {
        let mut s = Self {
            name: row.name.clone(),
            employee_id: Some(row.employee_id),
            ..Self::default()
        };
        for cell in row.cells() {
            match *cell {
                Cell::Work {
                    shift,
                    role,
                    overrun,
                    ..
                } => {
                    match shift {
                        ShiftKind::Day => s.day += 1,
                        ShiftKind::Evening => s.evening += 1,
                        ShiftKind::Night => s.night += 1,
                        ShiftKind::Off => {}
                    }
                    if role == Role::Charge {
                        s.charge += 1;
                    }
                    match overrun {
                        Some(Overrun::Warning) => s.warnings += 1,
                        Some(Overrun::Alert) => s.alerts += 1,
                        None => {}
                    }
                }
                Cell::Off(reason) => *s.off.entry(reason).or_default() += 1,
                Cell::Unassigned => s.unassigned += 1,
            }
        }
        s
    }
}

/// Bilans de toutes les infirmières, dans l'ordre du planning.
pub fn summarize(table: &ScheduleTable) -> Vec<NurseSummary> {
    table.rows().iter().map(NurseSummary::from_row).collect()
}

/// Rendu d'un bilan (texte, mail…).
pub trait SummaryRenderer {
    fn render(&self, summary: &NurseSummary, row: &ScheduleRow, table: &ScheduleTable) -> String;
}

/// Gabarit texte simple destiné à être envoyé à l'infirmière.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextSummary;

impl SummaryRenderer for TextSummary {
    fn render(&self, summary: &NurseSummary, row: &ScheduleRow, table: &ScheduleTable) -> String {
        let mut out = format!(
            "Bonjour {name},\n\nVoici ton planning pour {year}-{month:02} :\n",
            name = summary.name,
            year = table.year(),
            month = table.month(),
        );
        for (idx, cell) in row.cells().iter().enumerate() {
            let _ = writeln!(out, "  {:>2} : {}", idx + 1, cell);
        }
        let _ = write!(
            out,
            "\nJour {d}, Soir {e}, Nuit {n} (dont {c} en Charge), repos {off} \
             (congés {leave}, congés officiels {pl}).\n",
            d = summary.day,
            e = summary.evening,
            n = summary.night,
            c = summary.charge,
            off = summary.off_total(),
            leave = summary.off_for(OffReason::Leave),
            pl = summary.off_for(OffReason::PublicLeave),
        );
        if summary.warnings + summary.alerts > 0 {
            let _ = writeln!(
                out,
                "Attention : {} série(s) longue(s) signalée(s).",
                summary.warnings + summary.alerts
            );
        }
        out
    }
}

/// Prépare le bilan d'une infirmière à partir d'une génération.
pub fn prepare_summary(
    outcome: &ScheduleOutcome,
    name: &str,
    renderer: &dyn SummaryRenderer,
) -> Result<String> {
    let row = outcome
        .table
        .row(name)
        .with_context(|| format!("unknown nurse: {name}"))?;
    let summary = NurseSummary::from_row(row);
    Ok(renderer.render(&summary, row, &outcome.table))
}
