use crate::model::{ShiftKind, Team};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// État courant d'une infirmière, propre à une génération.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NurseState {
    pub consecutive: u32,
    /// Dernière vacation travaillée.
    pub last_shift: Option<ShiftKind>,
    pub last_worked_day: Option<u32>,
    pub off_granted: u32,
    pub team: Option<Team>,
}

impl NurseState {
    pub fn record_work(&mut self, shift: ShiftKind, day: u32) {
        let continues = day > 1 && self.last_worked_day == Some(day - 1);
        self.consecutive = if continues { self.consecutive + 1 } else { 1 };
        self.last_shift = Some(shift);
        self.last_worked_day = Some(day);
    }

    pub fn record_off(&mut self) {
        self.consecutive = 0;
        self.off_granted += 1;
    }

    /// Case laissée vide : la série est rompue sans compter de repos.
    pub fn record_idle(&mut self) {
        self.consecutive = 0;
    }
}

/// État partagé d'une génération : une entrée par infirmière (ordre de
/// priorité), allocation des équipes et générateur aléatoire.
#[derive(Debug)]
pub struct RunState {
    pub nurses: Vec<NurseState>,
    teams_allocated: usize,
    pub(crate) rng: StdRng,
}

impl RunState {
    pub fn new(nurse_count: usize, seed: u64) -> Self {
        Self {
            nurses: vec![NurseState::default(); nurse_count],
            teams_allocated: 0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Équipe de l'infirmière `idx`, attribuée (A, B, A, …) à sa première vacation.
    pub fn team_for(&mut self, idx: usize) -> Team {
        if let Some(team) = self.nurses[idx].team {
            return team;
        }
        let team = if self.teams_allocated % 2 == 0 { Team::A } else { Team::B };
        self.teams_allocated += 1;
        self.nurses[idx].team = Some(team);
        team
    }
}
