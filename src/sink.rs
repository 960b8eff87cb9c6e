// 💾 Persistence payloads + sink seam
// Turns a canonical record into health-test rows and one pedigree row,
// then hands them to whichever store is configured.

use crate::config::SinkConfig;
use crate::error::VerifyError;
use crate::record::{is_reported, CanineIdentityRecord, RelativeRef, SOURCE_NAME};
use crate::score::VerificationScore;
use anyhow::{Context, Result};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub const VERIFIED_STATUS: &str = "verified";

// ============================================================================
// PAYLOAD TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestType {
    Hips,
    Elbows,
    Dsra,
    Dvl2,
    Cardiac,
}

impl TestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TestType::Hips => "hips",
            TestType::Elbows => "elbows",
            TestType::Dsra => "dsra",
            TestType::Dvl2 => "dvl2",
            TestType::Cardiac => "cardiac",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthTestRecord {
    pub dog_id: String,
    pub test_type: TestType,
    pub result: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_date: Option<String>,
    pub verification_source: String,
    pub verification_status: String,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PedigreeRecord {
    pub dog_id: String,
    pub sire_name: Option<String>,
    pub dam_name: Option<String>,
    /// JSON text: sire/dam refs, pedigree number, COI, titles, source id
    pub lineage: String,
    pub verification_source: String,
    pub verification_status: String,
}

#[derive(Debug, Serialize)]
struct Lineage<'a> {
    sire: Option<&'a RelativeRef>,
    dam: Option<&'a RelativeRef>,
    pedigree_number: Option<&'a str>,
    inbreeding_coefficient: Option<f64>,
    titles: Option<&'a str>,
    source_id: &'a str,
}

// ============================================================================
// BUILDERS
// ============================================================================

/// Health rows for every reported test on the record (hips, elbows, dsra, dvl2, cardiac)
pub fn build_health_records(subject_id: &str, record: &CanineIdentityRecord) -> Vec<HealthTestRecord> {
    let source_url = record.source_url.as_str();
    let mut tests = Vec::new();

    let mut push = |test_type: TestType, result: String, test_date: Option<String>, notes: String| {
        tests.push(HealthTestRecord {
            dog_id: subject_id.to_string(),
            test_type,
            result,
            test_date,
            verification_source: SOURCE_NAME.to_string(),
            verification_status: VERIFIED_STATUS.to_string(),
            notes,
        });
    };

    // DOB is the best available proxy for the screening date
    if let Some(hd) = record.hip_score.as_deref().filter(|v| is_reported(Some(*v))) {
        push(
            TestType::Hips,
            hd.to_string(),
            record.date_of_birth.clone(),
            format!("HD score: {}. Source: {}", hd, source_url),
        );
    }

    if let Some(ed) = record.elbow_score.as_deref().filter(|v| is_reported(Some(*v))) {
        push(
            TestType::Elbows,
            ed.to_string(),
            record.date_of_birth.clone(),
            format!("ED score: {}. Source: {}", ed, source_url),
        );
    }

    if let Some(dsra) = record.dsra_result.as_deref().filter(|v| is_reported(Some(*v))) {
        push(
            TestType::Dsra,
            certified_result(dsra, record.dsra_certified),
            None,
            format!(
                "DSRA: {}, Certified: {}. Source: {}",
                dsra, record.dsra_certified, source_url
            ),
        );
    }

    if let Some(dvl2) = record.dvl2_result.as_deref().filter(|v| is_reported(Some(*v))) {
        push(
            TestType::Dvl2,
            certified_result(dvl2, record.dvl2_certified),
            None,
            format!(
                "DVL2: {}, Certified: {}. Source: {}",
                dvl2, record.dvl2_certified, source_url
            ),
        );
    }

    if let Some(heart) = record.heart_result.as_deref().filter(|v| is_reported(Some(*v))) {
        push(
            TestType::Cardiac,
            heart.to_string(),
            None,
            format!("Heart: {}. Source: {}", heart, source_url),
        );
    }

    tests
}

fn certified_result(result: &str, certified: bool) -> String {
    if certified {
        format!("{} (Certified)", result)
    } else {
        result.to_string()
    }
}

/// The single pedigree row; extra titles are preferred over plain titles
pub fn build_pedigree_record(subject_id: &str, record: &CanineIdentityRecord) -> Result<PedigreeRecord> {
    let lineage = Lineage {
        sire: record.sire.as_ref(),
        dam: record.dam.as_ref(),
        pedigree_number: record.pedigree_number.as_deref(),
        inbreeding_coefficient: record.inbreeding_coefficient_percent,
        titles: record.extra_titles.as_deref().or(record.titles.as_deref()),
        source_id: &record.source_id,
    };

    Ok(PedigreeRecord {
        dog_id: subject_id.to_string(),
        sire_name: record.sire_name().map(str::to_string),
        dam_name: record.dam_name().map(str::to_string),
        lineage: serde_json::to_string(&lineage).context("Failed to serialize lineage")?,
        verification_source: SOURCE_NAME.to_string(),
        verification_status: VERIFIED_STATUS.to_string(),
    })
}

// ============================================================================
// SINK TRAIT
// ============================================================================

/// Remote or local document store receiving derived records.
/// Each call returns the stored representations.
pub trait PersistenceSink: Send + Sync {
    fn insert_health_records(&self, records: &[HealthTestRecord]) -> Result<Vec<serde_json::Value>>;

    fn insert_pedigree(&self, record: &PedigreeRecord, content_hash: &str) -> Result<serde_json::Value>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveOutcome {
    pub health_records_created: Vec<serde_json::Value>,
    pub pedigree_created: serde_json::Value,
    pub trust_score: Option<VerificationScore>,
    pub message: String,
}

/// Write health rows (if any) then the pedigree row; the score is carried through
pub fn save_verification(
    sink: &dyn PersistenceSink,
    subject_id: &str,
    record: &CanineIdentityRecord,
    score: Option<VerificationScore>,
) -> Result<SaveOutcome> {
    if subject_id.trim().is_empty() {
        return Err(VerifyError::invalid(
            "Required: dog_id (UUID from dogs table) and verification_data (from verify-pedigree)",
        )
        .into());
    }

    let health = build_health_records(subject_id, record);
    let health_records_created = if health.is_empty() {
        Vec::new()
    } else {
        sink.insert_health_records(&health)?
    };

    let pedigree = build_pedigree_record(subject_id, record)?;
    let pedigree_created = sink.insert_pedigree(&pedigree, &record.content_hash())?;

    let message = format!(
        "Verified {}. Created {} health records and 1 pedigree record.",
        record.registered_name.as_deref().unwrap_or(&record.source_id),
        health.len()
    );
    info!(subject_id, health = health.len(), "verification saved");

    Ok(SaveOutcome {
        health_records_created,
        pedigree_created,
        trust_score: score,
        message,
    })
}

// ============================================================================
// REST SINK
// ============================================================================

/// REST document store (`{base}/rest/v1/{table}`), service-key authenticated
pub struct RestSink {
    client: Client,
    base_url: String,
    api_key: String,
}

impl RestSink {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("Failed to build HTTP client")?;
        Ok(RestSink {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    /// None when the config has no REST endpoint or key
    pub fn from_config(config: &SinkConfig) -> Result<Option<Self>> {
        match (&config.rest_url, &config.api_key) {
            (Some(url), Some(key)) => Ok(Some(Self::new(url, key)?)),
            _ => Ok(None),
        }
    }

    pub fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn post<T: Serialize + ?Sized>(&self, table: &str, body: &T) -> Result<serde_json::Value> {
        let operation = format!("POST {}", table);
        let response = self
            .client
            .post(self.table_url(table))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .map_err(|e| VerifyError::sink(&operation, e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .map_err(|e| VerifyError::sink(&operation, e.to_string()))?;

        if !status.is_success() {
            warn!(table, status = status.as_u16(), "store rejected write");
            return Err(VerifyError::sink(operation, format!("{}: {}", status, text)).into());
        }

        Ok(serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text)))
    }
}

impl PersistenceSink for RestSink {
    fn insert_health_records(&self, records: &[HealthTestRecord]) -> Result<Vec<serde_json::Value>> {
        match self.post("health_records", records)? {
            serde_json::Value::Array(rows) => Ok(rows),
            other => Ok(vec![other]),
        }
    }

    fn insert_pedigree(&self, record: &PedigreeRecord, _content_hash: &str) -> Result<serde_json::Value> {
        self.post("pedigrees", record)
    }
}

// ============================================================================
// TESTS
// ============================================================================
