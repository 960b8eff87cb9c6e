// 🏗️ Record Extractor
// Walks every label/value row, normalizes the label and coerces the value.
// Never fails: missing or odd rows degrade to null fields.

use crate::config::RegistryConfig;
use crate::document::{Cell, Document};
use crate::labels::{normalize_label, Coercion, FieldKey};
use crate::record::{CanineIdentityRecord, RelativeRef, Sex};
use chrono::{DateTime, Utc};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::debug;

/// Placeholder the registry prints for an unknown date
pub const DATE_SENTINEL: &str = "YYYY/MM/DD";

/// Decorative suffix on the registered-name cell
pub const PEDIGREE_ANNOTATION: &str = "(click to view pedigree)";

static LINK_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"id=(\d+)").expect("link id pattern"));

static PERCENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([\d.]+)%").expect("percent pattern"));

// ============================================================================
// VALUE COERCIONS
// ============================================================================

/// Numeric id embedded in a hyperlink target (`...?id=123`)
pub fn extract_link_id(href: &str) -> Option<String> {
    LINK_ID
        .captures(href)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// First decimal number in front of a '%'; anything unparsable is None
pub fn parse_percent(value: &str) -> Option<f64> {
    PERCENT
        .captures(value)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// "yes" in any case is true, everything else (empty included) false
pub fn parse_flag(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("yes")
}

/// Sentinel placeholder → None, otherwise the text unchanged
pub fn parse_sentinel_date(value: &str) -> Option<String> {
    if value == DATE_SENTINEL {
        None
    } else {
        text_or_null(value)
    }
}

/// Trimmed text, empty → None
pub fn text_or_null(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

// ============================================================================
// EXTRACTOR
// ============================================================================

pub struct RecordExtractor {
    registry: RegistryConfig,
}

impl RecordExtractor {
    pub fn new(registry: RegistryConfig) -> Self {
        RecordExtractor { registry }
    }

    /// Build the canonical record from the label/value rows of `doc`.
    ///
    /// Rows with fewer than two cells or an unknown label are skipped.
    /// When a label repeats (e.g. a relatives header row using `<td>`),
    /// the first occurrence wins; the profile table precedes those.
    pub fn extract(
        &self,
        doc: &Document,
        source_id: &str,
        retrieved_at: DateTime<Utc>,
    ) -> CanineIdentityRecord {
        let mut record =
            CanineIdentityRecord::new(source_id, self.registry.profile_url(source_id), retrieved_at);
        let mut seen = HashSet::new();

        for row in doc.rows() {
            if row.cells.len() < 2 {
                continue;
            }
            let Some(key) = normalize_label(&row.cells[0].text) else {
                continue;
            };
            if !seen.insert(key) {
                debug!(?key, "repeated label ignored");
                continue;
            }
            self.apply(&mut record, key, &row.cells[1]);
        }

        debug!(source_id, fields = seen.len(), "record extracted");
        record
    }

    fn apply(&self, record: &mut CanineIdentityRecord, key: FieldKey, cell: &Cell) {
        let value = cell.text.as_str();

        match key.coercion() {
            Coercion::Name => {
                record.registered_name = text_or_null(&value.replace(PEDIGREE_ANNOTATION, ""));
                record.pedigree_view_id = cell.href.as_deref().and_then(extract_link_id);
            }
            Coercion::Sex => record.sex = Sex::parse(value),
            Coercion::Relative => {
                let relative = self.relative_ref(cell);
                if key == FieldKey::Sire {
                    record.sire = relative;
                } else {
                    record.dam = relative;
                }
            }
            Coercion::Flag => {
                if let Some(slot) = flag_slot(record, key) {
                    *slot = parse_flag(value);
                }
            }
            Coercion::SentinelDate => {
                if let Some(slot) = text_slot(record, key) {
                    *slot = parse_sentinel_date(value);
                }
            }
            Coercion::Percent => record.inbreeding_coefficient_percent = parse_percent(value),
            Coercion::Text => {
                if let Some(slot) = text_slot(record, key) {
                    *slot = text_or_null(value);
                }
            }
        }
    }

    /// Sire/dam from a value cell; None when the cell carries nothing at all
    fn relative_ref(&self, cell: &Cell) -> Option<RelativeRef> {
        let name = text_or_null(&cell.text);
        let href = cell.href.as_deref().filter(|h| !h.trim().is_empty());
        if name.is_none() && href.is_none() {
            return None;
        }
        Some(RelativeRef {
            name,
            external_id: href.and_then(extract_link_id),
            url: href.map(|h| self.registry.absolute(h)),
        })
    }
}

impl Default for RecordExtractor {
    fn default() -> Self {
        Self::new(RegistryConfig::default())
    }
}

fn text_slot(record: &mut CanineIdentityRecord, key: FieldKey) -> Option<&mut Option<String>> {
    match key {
        FieldKey::PedigreeNumber => Some(&mut record.pedigree_number),
        FieldKey::Titles => Some(&mut record.titles),
        FieldKey::ExtraTitles => Some(&mut record.extra_titles),
        FieldKey::DateOfBirth => Some(&mut record.date_of_birth),
        FieldKey::DateOfDeath => Some(&mut record.date_of_death),
        FieldKey::Color => Some(&mut record.color),
        FieldKey::HipScore => Some(&mut record.hip_score),
        FieldKey::ElbowScore => Some(&mut record.elbow_score),
        FieldKey::HeartResult => Some(&mut record.heart_result),
        FieldKey::OtherHealthNotes => Some(&mut record.other_health_notes),
        FieldKey::DnaProfile => Some(&mut record.dna_profile),
        FieldKey::DsraResult => Some(&mut record.dsra_result),
        FieldKey::Dvl2Result => Some(&mut record.dvl2_result),
        FieldKey::DnaTestInbreeding => Some(&mut record.dna_test_inbreeding),
        FieldKey::AddedBy => Some(&mut record.added_by_attribution),
        _ => None,
    }
}

fn flag_slot(record: &mut CanineIdentityRecord, key: FieldKey) -> Option<&mut bool> {
    match key {
        FieldKey::DnaParentageConfirmed => Some(&mut record.dna_parentage_confirmed),
        FieldKey::DsraCertified => Some(&mut record.dsra_certified),
        FieldKey::Dvl2Certified => Some(&mut record.dvl2_certified),
        _ => None,
    }
}

// ============================================================================
// TESTS
// ============================================================================
