#![forbid(unsafe_code)]
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use planning_garde::{
    calendar::{HolidayCalendar, HolidayOverrides},
    io,
    model::{parse_day_list, EmployeeId, Nurse, WorkType},
    report::{prepare_summary, TextSummary},
    rules::{export_rules_json, load_rules_from_file, ForcedOffMode, RuleSet, TieBreak},
    scheduler::Scheduler,
    storage::{JsonStorage, Storage},
    NurseRegistry, ScheduleOutcome,
};
use std::collections::BTreeSet;
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// CLI de génération de plannings infirmiers (sans base de données)
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    /// Fichier JSON du registre
    #[arg(long, global = true, default_value = "registry.json")]
    registry: String,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Importer des infirmières depuis un CSV
    Import {
        #[arg(long)]
        csv: String,
    },

    /// Ajouter une infirmière
    AddNurse {
        #[arg(long)]
        name: String,
        /// Matricule (absent = priorité la plus basse)
        #[arg(long)]
        id: Option<u32>,
        #[arg(long, default_value = "FullRotation")]
        work_type: WorkType,
        #[arg(long)]
        charge: bool,
        #[arg(long)]
        night_charge: bool,
        /// Jours de repos demandés "3,5,10"
        #[arg(long)]
        off: Option<String>,
        #[arg(long)]
        leave: Option<String>,
        #[arg(long)]
        public_leave: Option<String>,
    },

    /// Retirer une infirmière
    RemoveNurse {
        #[arg(long)]
        name: String,
    },

    /// Lister le registre par priorité
    List,

    /// Écrire un fichier de règles par défaut
    InitRules {
        #[arg(long, default_value = "rules.json")]
        out: String,
    },

    /// Générer le planning d'un mois
    Generate {
        #[command(flatten)]
        run: RunArgs,
        #[arg(long)]
        out_csv: Option<String>,
        #[arg(long)]
        shortfalls_csv: Option<String>,
    },

    /// Bilan texte d'une infirmière pour un mois
    Summary {
        #[command(flatten)]
        run: RunArgs,
        #[arg(long)]
        name: String,
        /// Fichier de sortie (texte brut) ; stdout sinon
        #[arg(long)]
        out: Option<String>,
    },
}

#[derive(clap::Args, Debug)]
struct RunArgs {
    #[arg(long)]
    year: i32,
    #[arg(long)]
    month: u32,
    /// Fichier JSON de règles
    #[arg(long)]
    rules: Option<String>,
    #[arg(long)]
    seed: Option<u64>,
    /// random | priority | least-recent
    #[arg(long)]
    tie_break: Option<TieBreak>,
    /// additive | exclusive
    #[arg(long)]
    forced_off: Option<ForcedOffMode>,
    /// Jours fériés supplémentaires "5,6"
    #[arg(long)]
    holiday: Option<String>,
    /// Jours à traiter comme ouvrés "3"
    #[arg(long)]
    no_holiday: Option<String>,
}

impl RunArgs {
    fn rules(&self) -> Result<RuleSet> {
        let mut rules = match &self.rules {
            Some(path) => load_rules_from_file(path)?,
            None => RuleSet::default(),
        };
        if let Some(seed) = self.seed {
            rules.seed = Some(seed);
        }
        if let Some(tie_break) = self.tie_break {
            rules.tie_break = tie_break;
        }
        if let Some(mode) = self.forced_off {
            rules.forced_off_mode = mode;
        }
        Ok(rules)
    }

    fn overrides(&self) -> Result<HolidayOverrides> {
        Ok(HolidayOverrides {
            added: days_arg(self.holiday.as_deref())?,
            removed: days_arg(self.no_holiday.as_deref())?,
        })
    }

    fn generate(&self, registry: &NurseRegistry) -> Result<ScheduleOutcome> {
        let scheduler = Scheduler::new(self.rules()?, HolidayCalendar::korea_2025());
        let outcome = scheduler.generate(registry, self.year, self.month, &self.overrides()?)?;
        Ok(outcome)
    }
}

fn days_arg(raw: Option<&str>) -> Result<BTreeSet<u32>> {
    match raw {
        Some(list) => parse_day_list(list).map_err(anyhow::Error::msg),
        None => Ok(BTreeSet::new()),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    let storage = JsonStorage::open(&cli.registry)?;
    let mut registry = storage.load_or_default()?;

    let code = match cli.cmd {
        Commands::Import { csv } => {
            let records = io::read_nurses_csv(&csv)?;
            let total = records.len();
            let rejected = registry.import_records(records);
            for bad in &rejected {
                eprintln!("Warning: {bad}");
            }
            storage.save(&registry)?;
            println!("Imported {} nurse(s), {} rejected", total - rejected.len(), rejected.len());
            0
        }
        Commands::AddNurse {
            name,
            id,
            work_type,
            charge,
            night_charge,
            off,
            leave,
            public_leave,
        } => {
            let mut nurse = Nurse::new(0, name, work_type);
            nurse.employee_id = EmployeeId::from(id);
            nurse.charge_eligible = charge;
            nurse.night_charge_only = night_charge;
            nurse.requested_off = days_arg(off.as_deref())?;
            nurse.leave = days_arg(leave.as_deref())?;
            nurse.public_leave = days_arg(public_leave.as_deref())?;
            registry.add(nurse)?;
            storage.save(&registry)?;
            0
        }
        Commands::RemoveNurse { name } => {
            registry.remove(&name)?;
            storage.save(&registry)?;
            0
        }
        Commands::List => {
            for n in registry.by_priority() {
                println!(
                    "{:>3} | {:>5} | {} | {} | charge={}",
                    n.priority, n.employee_id, n.name, n.work_type, n.charge_eligible
                );
            }
            0
        }
        Commands::InitRules { out } => {
            export_rules_json(&out, &RuleSet::default())?;
            0
        }
        Commands::Generate {
            run,
            out_csv,
            shortfalls_csv,
        } => {
            let outcome = run.generate(&registry)?;
            if let Some(path) = out_csv {
                io::export_schedule_csv(path, &outcome.table)?;
            }
            if let Some(path) = shortfalls_csv {
                io::export_shortfalls_csv(path, &outcome.shortfalls)?;
            }
            print_table(&outcome);
            if outcome.has_shortfalls() {
                eprintln!(
                    "Found {} shortfall(s) (seed {})",
                    outcome.shortfalls.len(),
                    outcome.seed
                );
                // Code 2 = WARNING/INCOMPLETE
                2
            } else {
                0
            }
        }
        Commands::Summary { run, name, out } => {
            let outcome = run.generate(&registry)?;
            let text = prepare_summary(&outcome, &name, &TextSummary)?;
            match out {
                Some(path) => std::fs::write(&path, text).with_context(|| format!("writing {path}"))?,
                None => print!("{text}"),
            }
            0
        }
    };

    std::process::exit(code);
}

fn print_table(outcome: &ScheduleOutcome) {
    let table = &outcome.table;
    let width = table.rows().iter().map(|r| r.name.chars().count()).max().unwrap_or(4);
    let days: Vec<String> = (1..=table.days()).map(|d| format!("{d:>7}")).collect();
    println!("{:width$} |{}", "", days.join(""));
    for row in table.rows() {
        let cells: Vec<String> = row.cells().iter().map(|c| format!("{:>7}", c.label())).collect();
        println!("{:width$} |{}", row.name, cells.join(""));
    }
    println!("run {} (seed {})", outcome.run_id, outcome.seed);
}
