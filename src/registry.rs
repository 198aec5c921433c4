use crate::model::{MalformedRecord, Nurse, NurseRecord};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("duplicate nurse name: {0}")]
    DuplicateName(String),
    #[error("unknown nurse: {0}")]
    UnknownNurse(String),
    #[error("nurse name cannot be empty")]
    EmptyName,
}

/// Registre des infirmières.
///
/// Toute mutation passe par les méthodes ci-dessous, qui recalculent les
/// priorités (matricule croissant, puis ordre d'insertion).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<Nurse>", into = "Vec<Nurse>")]
pub struct NurseRegistry {
    nurses: Vec<Nurse>,
}

impl NurseRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nurses.len()
    }
    pub fn is_empty(&self) -> bool {
        self.nurses.is_empty()
    }

    /// Infirmières dans l'ordre d'insertion.
    pub fn nurses(&self) -> &[Nurse] {
        &self.nurses
    }

    /// Infirmières triées par priorité (rang 0 en tête).
    pub fn by_priority(&self) -> Vec<&Nurse> {
        let mut out: Vec<&Nurse> = self.nurses.iter().collect();
        out.sort_by_key(|n| n.priority);
        out
    }

    pub fn find(&self, name: &str) -> Option<&Nurse> {
        self.nurses.iter().find(|n| n.name == name)
    }

    pub fn charge_eligible_count(&self) -> usize {
        self.nurses.iter().filter(|n| n.charge_eligible).count()
    }

    pub fn add(&mut self, mut nurse: Nurse) -> Result<(), RegistryError> {
        nurse.name = nurse.name.trim().to_string();
        if nurse.name.is_empty() {
            return Err(RegistryError::EmptyName);
        }
        if self.find(&nurse.name).is_some() {
            return Err(RegistryError::DuplicateName(nurse.name));
        }
        self.nurses.push(nurse);
        self.reprioritize();
        Ok(())
    }

    /// Modifie une infirmière ; la modification est annulée si elle rend le
    /// registre invalide (nom vide ou dupliqué).
    pub fn update<F>(&mut self, name: &str, edit: F) -> Result<(), RegistryError>
    where
        F: FnOnce(&mut Nurse),
    {
        let pos = self
            .nurses
            .iter()
            .position(|n| n.name == name)
            .ok_or_else(|| RegistryError::UnknownNurse(name.to_string()))?;

        let mut edited = self.nurses[pos].clone();
        edit(&mut edited);
        edited.name = edited.name.trim().to_string();
        if edited.name.is_empty() {
            return Err(RegistryError::EmptyName);
        }
        let clash = self
            .nurses
            .iter()
            .enumerate()
            .any(|(i, n)| i != pos && n.name == edited.name);
        if clash {
            return Err(RegistryError::DuplicateName(edited.name));
        }

        self.nurses[pos] = edited;
        self.reprioritize();
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Result<Nurse, RegistryError> {
        let pos = self
            .nurses
            .iter()
            .position(|n| n.name == name)
            .ok_or_else(|| RegistryError::UnknownNurse(name.to_string()))?;
        let removed = self.nurses.remove(pos);
        self.reprioritize();
        Ok(removed)
    }

    /// Importe des enregistrements bruts. Les lignes invalides sont écartées
    /// (avec un avertissement) sans interrompre le lot.
    pub fn import_records<I>(&mut self, records: I) -> Vec<MalformedRecord>
    where
        I: IntoIterator<Item = NurseRecord>,
    {
        let mut rejected = Vec::new();
        for record in records {
            let outcome = Nurse::try_from_record(&record).and_then(|nurse| {
                self.add(nurse).map_err(|err| MalformedRecord {
                    line: record.line,
                    reason: err.to_string(),
                })
            });
            if let Err(bad) = outcome {
                warn!(line = bad.line, reason = %bad.reason, "nurse record quarantined");
                rejected.push(bad);
            }
        }
        rejected
    }

    fn reprioritize(&mut self) {
        let mut order: Vec<usize> = (0..self.nurses.len()).collect();
        order.sort_by_key(|&i| (self.nurses[i].employee_id, i));
        for (rank, idx) in order.into_iter().enumerate() {
            self.nurses[idx].priority = rank;
        }
    }
}

impl TryFrom<Vec<Nurse>> for NurseRegistry {
    type Error = RegistryError;

    fn try_from(nurses: Vec<Nurse>) -> Result<Self, Self::Error> {
        let mut registry = Self::new();
        for nurse in nurses {
            registry.add(nurse)?;
        }
        Ok(registry)
    }
}

impl From<NurseRegistry> for Vec<Nurse> {
    fn from(registry: NurseRegistry) -> Self {
        registry.nurses
    }
}
