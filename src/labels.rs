// 🏷️ Label Normalizer - Labels as Data
// Fixed table: raw row label → canonical field + how to coerce its value.
// Pure and total: unknown labels come back as `None`, never an error.

use serde::{Deserialize, Serialize};

// ============================================================================
// FIELD KEYS
// ============================================================================

/// Canonical field a labeled row feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKey {
    RegisteredName,
    Sex,
    Sire,
    Dam,
    DnaParentageConfirmed,
    PedigreeNumber,
    Titles,
    ExtraTitles,
    DateOfBirth,
    Color,
    HipScore,
    ElbowScore,
    HeartResult,
    DateOfDeath,
    OtherHealthNotes,
    DnaProfile,
    DsraResult,
    DsraCertified,
    Dvl2Result,
    Dvl2Certified,
    DnaTestInbreeding,
    InbreedingCoefficient,
    AddedBy,
}

/// How a value cell is turned into a record field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Coercion {
    /// Registered name: strip the "(click to view pedigree)" annotation, keep link id
    Name,
    /// `male` / `female` / other
    Sex,
    /// Father/mother reference: name + id from the hyperlink
    Relative,
    /// "yes" (any case) → true, anything else → false
    Flag,
    /// "YYYY/MM/DD" placeholder → null
    SentinelDate,
    /// First decimal number before a '%'
    Percent,
    /// Trimmed text, empty → null
    Text,
}

impl FieldKey {
    pub fn coercion(self) -> Coercion {
        match self {
            FieldKey::RegisteredName => Coercion::Name,
            FieldKey::Sex => Coercion::Sex,
            FieldKey::Sire | FieldKey::Dam => Coercion::Relative,
            FieldKey::DnaParentageConfirmed | FieldKey::DsraCertified | FieldKey::Dvl2Certified => {
                Coercion::Flag
            }
            FieldKey::DateOfBirth | FieldKey::DateOfDeath => Coercion::SentinelDate,
            FieldKey::InbreedingCoefficient => Coercion::Percent,
            _ => Coercion::Text,
        }
    }
}

// ============================================================================
// LABEL TABLE
// ============================================================================

/// Lowercased registry labels, exactly as they appear on a profile page
pub const LABELS: &[(&str, FieldKey)] = &[
    ("name", FieldKey::RegisteredName),
    ("gender", FieldKey::Sex),
    ("father", FieldKey::Sire),
    ("mother", FieldKey::Dam),
    ("dog parental dna confirmed", FieldKey::DnaParentageConfirmed),
    ("ped#", FieldKey::PedigreeNumber),
    ("titles", FieldKey::Titles),
    ("extra titles", FieldKey::ExtraTitles),
    ("dob", FieldKey::DateOfBirth),
    ("colour", FieldKey::Color),
    ("hd", FieldKey::HipScore),
    ("ed", FieldKey::ElbowScore),
    ("heart", FieldKey::HeartResult),
    ("date of death", FieldKey::DateOfDeath),
    ("other healthscores", FieldKey::OtherHealthNotes),
    ("dna profile", FieldKey::DnaProfile),
    ("dsra result", FieldKey::DsraResult),
    ("dsra result certified", FieldKey::DsraCertified),
    ("dvl2 result", FieldKey::Dvl2Result),
    ("dvl2 result certified", FieldKey::Dvl2Certified),
    ("dna test inbred percentage", FieldKey::DnaTestInbreeding),
    ("inbred percentage", FieldKey::InbreedingCoefficient),
    ("added by", FieldKey::AddedBy),
];

/// Map a raw label to its canonical key (case-insensitive, trimmed, exact)
pub fn normalize_label(raw: &str) -> Option<FieldKey> {
    let label = raw.trim().to_lowercase();
    LABELS
        .iter()
        .find(|(known, _)| *known == label)
        .map(|(_, key)| *key)
}
