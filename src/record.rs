// 🐕 Canonical Record - source-agnostic output of extraction

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub const SOURCE_NAME: &str = "canecorsopedigree.com";

/// Literal the registry prints for an untested panel / unknown score
pub const UNKNOWN_RESULT: &str = "UNKNOWN";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
    Unknown,
}

impl Sex {
    /// Empty text is "not given" (None); unrecognized text is `Unknown`
    pub fn parse(value: &str) -> Option<Sex> {
        match value.trim().to_lowercase().as_str() {
            "" => None,
            "male" => Some(Sex::Male),
            "female" => Some(Sex::Female),
            _ => Some(Sex::Unknown),
        }
    }
}

/// Sire/dam pointer. A missing ref means "unknown", not "none".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelativeRef {
    pub name: Option<String>,
    pub external_id: Option<String>,
    pub url: Option<String>,
}

impl RelativeRef {
    pub fn has_name(&self) -> bool {
        self.name.as_deref().is_some_and(|n| !n.trim().is_empty())
    }
}

/// Read-only projection of a child/sibling row; never expanded further
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelativeSummary {
    pub name: String,
    pub external_id: Option<String>,
    pub pedigree_number: String,
    pub titles: String,
    pub date_of_birth: String,
    pub color: String,
    pub hip_score: String,
    pub elbow_score: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanineIdentityRecord {
    // ========================================================================
    // PROVENANCE
    // ========================================================================
    pub source_id: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub source_url: String,

    // ========================================================================
    // IDENTITY & LINEAGE
    // ========================================================================
    pub registered_name: Option<String>,
    pub pedigree_view_id: Option<String>,
    pub sex: Option<Sex>,
    pub sire: Option<RelativeRef>,
    pub dam: Option<RelativeRef>,
    pub pedigree_number: Option<String>,
    pub titles: Option<String>,
    pub extra_titles: Option<String>,
    pub date_of_birth: Option<String>,
    pub date_of_death: Option<String>,
    pub color: Option<String>,

    // ========================================================================
    // HEALTH
    // ========================================================================
    pub hip_score: Option<String>,
    pub elbow_score: Option<String>,
    pub heart_result: Option<String>,
    pub other_health_notes: Option<String>,
    /// Kept verbatim, including a literal "UNKNOWN"
    pub dsra_result: Option<String>,
    #[serde(default)]
    pub dsra_certified: bool,
    pub dvl2_result: Option<String>,
    #[serde(default)]
    pub dvl2_certified: bool,

    // ========================================================================
    // DNA
    // ========================================================================
    #[serde(default)]
    pub dna_parentage_confirmed: bool,
    pub dna_profile: Option<String>,
    pub dna_test_inbreeding: Option<String>,
    pub inbreeding_coefficient_percent: Option<f64>,

    pub added_by_attribution: Option<String>,

    #[serde(default)]
    pub children: Vec<RelativeSummary>,
    #[serde(default)]
    pub siblings: Vec<RelativeSummary>,

    pub retrieved_at: DateTime<Utc>,
}

impl CanineIdentityRecord {
    /// Sparse record: every optional field null/false/empty
    pub fn new(
        source_id: impl Into<String>,
        source_url: impl Into<String>,
        retrieved_at: DateTime<Utc>,
    ) -> Self {
        CanineIdentityRecord {
            source_id: source_id.into(),
            source: SOURCE_NAME.to_string(),
            source_url: source_url.into(),
            registered_name: None,
            pedigree_view_id: None,
            sex: None,
            sire: None,
            dam: None,
            pedigree_number: None,
            titles: None,
            extra_titles: None,
            date_of_birth: None,
            date_of_death: None,
            color: None,
            hip_score: None,
            elbow_score: None,
            heart_result: None,
            other_health_notes: None,
            dsra_result: None,
            dsra_certified: false,
            dvl2_result: None,
            dvl2_certified: false,
            dna_parentage_confirmed: false,
            dna_profile: None,
            dna_test_inbreeding: None,
            inbreeding_coefficient_percent: None,
            added_by_attribution: None,
            children: Vec::new(),
            siblings: Vec::new(),
            retrieved_at,
        }
    }

    pub fn sire_name(&self) -> Option<&str> {
        self.sire.as_ref().and_then(|r| r.name.as_deref())
    }

    pub fn dam_name(&self) -> Option<&str> {
        self.dam.as_ref().and_then(|r| r.name.as_deref())
    }

    /// SHA-256 of the canonical JSON with `retrieved_at` left out.
    /// Two extractions of the same page hash identically.
    pub fn content_hash(&self) -> String {
        let mut value = serde_json::to_value(self).unwrap_or(serde_json::Value::Null);
        if let Some(obj) = value.as_object_mut() {
            obj.remove("retrieved_at");
        }
        let mut hasher = Sha256::new();
        hasher.update(value.to_string());
        format!("{:x}", hasher.finalize())
    }
}

/// A result is "reported" when present and not the unknown marker (any case)
pub fn is_reported(value: Option<&str>) -> bool {
    match value.map(str::trim) {
        Some(v) => !v.is_empty() && !v.eq_ignore_ascii_case(UNKNOWN_RESULT),
        None => false,
    }
}
