//! Symptom intake and the symptom → care-tier classifier.
//!
//! Classification is fail-safe: an unrecognized term, or any term mapped to
//! [`CareTier::EmergencyRoom`], routes the whole list to the emergency room.
//! Only a list made entirely of known urgent-care terms yields
//! [`CareTier::UrgentCare`].

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::Deserialize;

use crate::{CareTier, ConfigError, InputError};

const BUILTIN_SYMPTOMS: &[(&str, CareTier)] = &[
    ("allergies", CareTier::UrgentCare),
    ("animal bites", CareTier::UrgentCare),
    ("body ache", CareTier::UrgentCare),
    ("bone fractures", CareTier::UrgentCare),
    ("bronchitis", CareTier::UrgentCare),
    ("chest congestion", CareTier::UrgentCare),
    ("colds", CareTier::UrgentCare),
    ("cough", CareTier::UrgentCare),
    ("covid", CareTier::UrgentCare),
    ("diarrhea", CareTier::UrgentCare),
    ("ear infection", CareTier::UrgentCare),
    ("fatigue", CareTier::UrgentCare),
    ("fever", CareTier::UrgentCare),
    ("flu", CareTier::UrgentCare),
    ("insect bites", CareTier::UrgentCare),
    ("minor asthma", CareTier::UrgentCare),
    ("minor burns", CareTier::UrgentCare),
    ("minor cuts", CareTier::UrgentCare),
    ("nasal congestion", CareTier::UrgentCare),
    ("pertussis", CareTier::UrgentCare),
    ("pink eye", CareTier::UrgentCare),
    ("pneumonia", CareTier::UrgentCare),
    ("rashes", CareTier::UrgentCare),
    ("shingles", CareTier::UrgentCare),
    ("sinus infection", CareTier::UrgentCare),
    ("sore throat", CareTier::UrgentCare),
    ("sports injuries", CareTier::UrgentCare),
    ("sprain", CareTier::UrgentCare),
    ("stings", CareTier::UrgentCare),
    ("strain", CareTier::UrgentCare),
    ("sun poisoning", CareTier::UrgentCare),
    ("sunburn", CareTier::UrgentCare),
    ("tetanus", CareTier::UrgentCare),
    ("tick removal", CareTier::UrgentCare),
    ("un-wellness", CareTier::UrgentCare),
    ("upper respiratory infection", CareTier::UrgentCare),
    ("urinary tract infections", CareTier::UrgentCare),
    ("vomiting", CareTier::UrgentCare),
    ("broken bones", CareTier::EmergencyRoom),
    ("chest pain", CareTier::EmergencyRoom),
    ("fainting", CareTier::EmergencyRoom),
    ("loss of vision", CareTier::EmergencyRoom),
    ("seizures", CareTier::EmergencyRoom),
];

/// A normalized symptom: trimmed, lower-case, no commas.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SymptomTerm(String);

impl SymptomTerm {
    /// # Errors
    ///
    /// Returns [`InputError::InvalidSymptom`] if the term is blank after
    /// trimming or contains a comma.
    pub fn new(raw: &str) -> Result<Self, InputError> {
        let term = raw.trim().to_lowercase();
        if term.is_empty() || term.contains(',') {
            return Err(InputError::InvalidSymptom(raw.to_owned()));
        }
        Ok(Self(term))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for SymptomTerm {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SymptomTerm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Splits a comma-separated symptom line into normalized terms.
///
/// Empty fragments (`"fever,,cough"`, trailing commas) are skipped.
///
/// # Errors
///
/// Returns [`InputError::NoSymptoms`] when no term survives.
pub fn parse_symptoms(raw: &str) -> Result<Vec<SymptomTerm>, InputError> {
    let terms: Vec<SymptomTerm> = raw
        .split(',')
        .filter_map(|fragment| SymptomTerm::new(fragment).ok())
        .collect();

    if terms.is_empty() {
        return Err(InputError::NoSymptoms);
    }
    Ok(terms)
}

/// Fixed mapping from known symptom terms to the tier they call for.
#[derive(Debug, Clone)]
pub struct SymptomTable {
    entries: HashMap<String, CareTier>,
}

impl SymptomTable {
    /// The built-in table.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            entries: BUILTIN_SYMPTOMS
                .iter()
                .map(|(term, tier)| ((*term).to_owned(), *tier))
                .collect(),
        }
    }

    #[must_use]
    pub fn tier_of(&self, term: &SymptomTerm) -> Option<CareTier> {
        self.entries.get(term.as_str()).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Classifies a symptom list.
    ///
    /// Returns on the first unknown or emergency term. An empty slice is
    /// treated as unknown and yields [`CareTier::EmergencyRoom`].
    #[must_use]
    pub fn classify(&self, terms: &[SymptomTerm]) -> CareTier {
        if terms.is_empty() {
            return CareTier::EmergencyRoom;
        }
        for term in terms {
            match self.tier_of(term) {
                Some(CareTier::UrgentCare) => {}
                Some(CareTier::EmergencyRoom) | None => return CareTier::EmergencyRoom,
            }
        }
        CareTier::UrgentCare
    }

    /// Adds or replaces entries from a YAML symptoms file.
    fn merge(&mut self, file: SymptomsFile) -> Result<(), ConfigError> {
        for (raw, tier) in file.symptoms {
            let term = SymptomTerm::new(&raw).map_err(|_| {
                ConfigError::Validation(format!(
                    "symptom \"{raw}\" must be non-empty and contain no commas"
                ))
            })?;
            self.entries.insert(term.0, tier);
        }
        Ok(())
    }
}

impl Default for SymptomTable {
    fn default() -> Self {
        Self::builtin()
    }
}

/// On-disk format:
///
/// ```yaml
/// symptoms:
///   migraine: urgent_care
///   stroke: emergency_room
/// ```
#[derive(Debug, Deserialize)]
struct SymptomsFile {
    symptoms: BTreeMap<String, CareTier>,
}

/// Builds the symptom table, layering the optional YAML file over the built-ins.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or contains an
/// invalid term.
pub fn load_symptom_table(path: Option<&Path>) -> Result<SymptomTable, ConfigError> {
    let mut table = SymptomTable::builtin();
    let Some(path) = path else {
        return Ok(table);
    };

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SymptomsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    let file: SymptomsFile = serde_yaml::from_str(&content)?;
    table.merge(file)?;
    Ok(table)
}
