use crate::model::NurseRecord;
use crate::table::{ScheduleTable, Shortfall};
use anyhow::{bail, Context};
use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use std::io::{Read, Write};
use std::path::Path;

/// Import d'infirmières depuis un CSV.
///
/// Colonnes reconnues (casse et espaces ignorés) : `employee_id`, `name`,
/// `work_type`, `charge_eligible`, `night_charge_only`, `requested_off`,
/// `leave`, `public_leave`. Seule `name` est obligatoire ; la validation
/// ligne à ligne se fait ensuite dans le registre.
pub fn read_nurses_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<NurseRecord>> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).with_context(|| format!("opening {}", path.display()))?;
    read_nurses(file)
}

pub fn read_nurses<R: Read>(reader: R) -> anyhow::Result<Vec<NurseRecord>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let columns = Columns::from_headers(rdr.headers()?)?;
    let mut out = Vec::new();
    for (idx, rec) in rdr.records().enumerate() {
        let rec = rec?;
        let line = rec.position().map_or(idx + 2, |p| p.line() as usize);
        out.push(columns.record(&rec, line));
    }
    Ok(out)
}

#[derive(Debug, Default)]
struct Columns {
    employee_id: Option<usize>,
    name: usize,
    work_type: Option<usize>,
    charge_eligible: Option<usize>,
    night_charge_only: Option<usize>,
    requested_off: Option<usize>,
    leave: Option<usize>,
    public_leave: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> anyhow::Result<Self> {
        let Some(name) = find_column(headers, &["name", "이름"]) else {
            bail!("missing name column");
        };
        Ok(Self {
            employee_id: find_column(headers, &["employee_id", "id"]),
            name,
            work_type: find_column(headers, &["work_type", "근무유형"]),
            charge_eligible: find_column(headers, &["charge_eligible", "charge", "charge_가능"]),
            night_charge_only: find_column(headers, &["night_charge_only", "night_charge"]),
            requested_off: find_column(headers, &["requested_off", "wanted_off"]),
            leave: find_column(headers, &["leave"]),
            public_leave: find_column(headers, &["public_leave"]),
        })
    }

    fn record(&self, rec: &StringRecord, line: usize) -> NurseRecord {
        let get = |col: Option<usize>| col.and_then(|c| rec.get(c)).map(str::to_string);
        NurseRecord {
            line,
            employee_id: get(self.employee_id),
            name: get(Some(self.name)),
            work_type: get(self.work_type),
            charge_eligible: get(self.charge_eligible),
            night_charge_only: get(self.night_charge_only),
            requested_off: get(self.requested_off),
            leave: get(self.leave),
            public_leave: get(self.public_leave),
        }
    }
}

fn find_column(headers: &StringRecord, aliases: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| aliases.contains(&normalize_header(h).as_str()))
}

fn normalize_header(raw: &str) -> String {
    raw.trim().to_lowercase().replace([' ', '-'], "_")
}

/// Export CSV du planning : `employee_id,name,1,…,N`, une ligne par
/// infirmière dans l'ordre de priorité.
pub fn write_schedule_csv<W: Write>(writer: W, table: &ScheduleTable) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(false).from_writer(writer);
    w.write_record(table.header())?;
    for row in table.rows() {
        let mut record = vec![row.employee_id.to_string(), row.name.clone()];
        record.extend(row.labels());
        w.write_record(&record)?;
    }
    w.flush()?;
    Ok(())
}

pub fn export_schedule_csv<P: AsRef<Path>>(path: P, table: &ScheduleTable) -> anyhow::Result<()> {
    let path = path.as_ref();
    let file = std::fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    write_schedule_csv(file, table)
}

/// Export CSV des déficits : `day,shift,role,deficit`.
pub fn export_shortfalls_csv<P: AsRef<Path>>(path: P, shortfalls: &[Shortfall]) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(false).from_path(path)?;
    w.write_record(["day", "shift", "role", "deficit"])?;
    for s in shortfalls {
        w.write_record([
            s.day.to_string(),
            s.shift.to_string(),
            s.role.to_string(),
            s.deficit.to_string(),
        ])?;
    }
    w.flush()?;
    Ok(())
}
