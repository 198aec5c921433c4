use super::state::{NurseState, RunState};
use crate::model::{Nurse, Role, ShiftKind};
use crate::rules::TieBreak;
use crate::table::Cell;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

impl TieBreak {
    /// Choisit `needed` indices dans `pool` (supposé plus grand que `needed`).
    pub(crate) fn pick<R: Rng + ?Sized>(
        self,
        pool: &[usize],
        needed: usize,
        nurses: &[Nurse],
        states: &[NurseState],
        rng: &mut R,
    ) -> Vec<usize> {
        match self {
            TieBreak::RandomUniform => pool.choose_multiple(rng, needed).copied().collect(),
            TieBreak::PriorityOrder => {
                let mut ranked = pool.to_vec();
                ranked.sort_by_key(|&i| nurses[i].priority);
                ranked.truncate(needed);
                ranked
            }
            TieBreak::LeastRecentlyAssigned => {
                let mut ranked = pool.to_vec();
                // `None` (jamais affectée) passe avant tout jour travaillé.
                ranked.sort_by_key(|&i| (states[i].last_worked_day, nurses[i].priority));
                ranked.truncate(needed);
                ranked
            }
        }
    }
}

/// Pourvoit (`shift`, `role`) avec au plus `needed` infirmières du vivier.
///
/// Écrit les cases du jour, met à jour l'état courant (série, dernière
/// vacation, équipe) et renvoie les indices retenus. Un vivier trop petit
/// donne un remplissage partiel, jamais une erreur.
#[allow(clippy::too_many_arguments)]
pub fn assign_role(
    run: &mut RunState,
    today: &mut [Option<Cell>],
    nurses: &[Nurse],
    tie_break: TieBreak,
    shift: ShiftKind,
    role: Role,
    needed: usize,
    pool: &[usize],
    day: u32,
) -> Vec<usize> {
    debug_assert!(shift != ShiftKind::Off, "Off is not a fillable shift");

    let chosen = if pool.len() <= needed {
        pool.to_vec()
    } else {
        let RunState { nurses: states, rng, .. } = &mut *run;
        tie_break.pick(pool, needed, nurses, states, rng)
    };

    for &idx in &chosen {
        let team = run.team_for(idx);
        today[idx] = Some(Cell::work(shift, role, team));
        run.nurses[idx].record_work(shift, day);
    }

    debug!(
        day,
        %shift,
        %role,
        needed,
        eligible = pool.len(),
        assigned = chosen.len(),
        "role filled"
    );
    chosen
}
