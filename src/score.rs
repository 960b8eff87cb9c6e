// ✅ Verification Scorer - weighted completeness/quality score (0-100)
// Pure function of the canonical record; recomputed on demand, never stored
// as mutable state.

use crate::record::{is_reported, CanineIdentityRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const MAX_POINTS: u8 = 100;

// ============================================================================
// BREAKDOWN
// ============================================================================

/// Value of one awarded criterion: a flag, or a rating label for bonuses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Award {
    Flag(bool),
    Rating(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationScore {
    pub points: u8,
    /// Only awarded criteria appear; a missing key means "not awarded"
    pub breakdown: BTreeMap<String, Award>,
    pub max_possible: u8,
}

impl VerificationScore {
    pub fn awarded(&self, key: &str) -> bool {
        self.breakdown.contains_key(key)
    }

    pub fn summary(&self) -> String {
        format!(
            "Score: {}/{} ({} criteria awarded)",
            self.points,
            self.max_possible,
            self.breakdown.len()
        )
    }
}

// ============================================================================
// WEIGHTS
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub sire: f64,
    pub dam: f64,
    pub hips: f64,
    pub hips_bonus: f64,
    pub elbows: f64,
    pub elbows_bonus: f64,
    pub dsra: f64,
    pub dsra_certified: f64,
    pub dvl2: f64,
    pub dvl2_certified: f64,
    pub dna_confirmed: f64,
    pub pedigree_number: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        ScoreWeights {
            sire: 12.5,
            dam: 12.5,
            hips: 20.0,
            hips_bonus: 5.0,
            elbows: 20.0,
            elbows_bonus: 5.0,
            dsra: 10.0,
            dsra_certified: 2.5,
            dvl2: 10.0,
            dvl2_certified: 2.5,
            dna_confirmed: 5.0,
            pedigree_number: 5.0,
        }
    }
}

impl ScoreWeights {
    /// Every base criterion and bonus awarded at once (110 by default)
    pub fn ideal_total(&self) -> f64 {
        self.sire
            + self.dam
            + self.hips
            + self.hips_bonus
            + self.elbows
            + self.elbows_bonus
            + self.dsra
            + self.dsra_certified
            + self.dvl2
            + self.dvl2_certified
            + self.dna_confirmed
            + self.pedigree_number
    }
}

// ============================================================================
// SCORER
// ============================================================================

pub struct VerificationScorer {
    weights: ScoreWeights,

    /// Hip results earning the quality bonus (exact, case-sensitive)
    good_hips: Vec<String>,

    /// Elbow results earning the quality bonus (exact, case-sensitive)
    clear_elbows: Vec<String>,
}

impl VerificationScorer {
    pub fn new() -> Self {
        VerificationScorer {
            weights: ScoreWeights::default(),
            good_hips: vec![
                "HD-".to_string(),
                "HD A".to_string(),
                "OFA Excellent".to_string(),
                "OFA Good".to_string(),
            ],
            clear_elbows: vec!["0/Free/Vrij".to_string(), "OFA Normal".to_string()],
        }
    }

    pub fn with_weights(mut self, weights: ScoreWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn weights(&self) -> &ScoreWeights {
        &self.weights
    }

    /// Score a record. Criteria are independent and additive; the sum is
    /// clamped to [0, 100] and rounded to the nearest integer.
    pub fn score(&self, record: &CanineIdentityRecord) -> VerificationScore {
        let w = &self.weights;
        let mut total = 0.0;
        let mut breakdown = BTreeMap::new();
        let mut award = |key: &str, value: Award, points: f64, total: &mut f64| {
            *total += points;
            breakdown.insert(key.to_string(), value);
        };

        // Pedigree (sire + dam known)
        if record.sire.as_ref().is_some_and(|r| r.has_name()) {
            award("sire_verified", Award::Flag(true), w.sire, &mut total);
        }
        if record.dam.as_ref().is_some_and(|r| r.has_name()) {
            award("dam_verified", Award::Flag(true), w.dam, &mut total);
        }

        // Hips
        if is_reported(record.hip_score.as_deref()) {
            award("hd_verified", Award::Flag(true), w.hips, &mut total);
            if in_set(&self.good_hips, record.hip_score.as_deref()) {
                award("hd_rating", Award::Rating("excellent/good".to_string()), w.hips_bonus, &mut total);
            }
        }

        // Elbows
        if is_reported(record.elbow_score.as_deref()) {
            award("ed_verified", Award::Flag(true), w.elbows, &mut total);
            if in_set(&self.clear_elbows, record.elbow_score.as_deref()) {
                award("ed_rating", Award::Rating("clear".to_string()), w.elbows_bonus, &mut total);
            }
        }

        // Genetic panels; certification only counts on a reported result
        if is_reported(record.dsra_result.as_deref()) {
            award("dsra_tested", Award::Flag(true), w.dsra, &mut total);
            if record.dsra_certified {
                award("dsra_certified", Award::Flag(true), w.dsra_certified, &mut total);
            }
        }
        if is_reported(record.dvl2_result.as_deref()) {
            award("dvl2_tested", Award::Flag(true), w.dvl2, &mut total);
            if record.dvl2_certified {
                award("dvl2_certified", Award::Flag(true), w.dvl2_certified, &mut total);
            }
        }

        if record.dna_parentage_confirmed {
            award("dna_confirmed", Award::Flag(true), w.dna_confirmed, &mut total);
        }

        if record
            .pedigree_number
            .as_deref()
            .is_some_and(|p| !p.trim().is_empty())
        {
            award("pedigree_registered", Award::Flag(true), w.pedigree_number, &mut total);
        }

        VerificationScore {
            points: clamp_points(total),
            breakdown,
            max_possible: MAX_POINTS,
        }
    }
}

impl Default for VerificationScorer {
    fn default() -> Self {
        Self::new()
    }
}

/// Score with the default weights and quality sets
pub fn score(record: &CanineIdentityRecord) -> VerificationScore {
    VerificationScorer::new().score(record)
}

fn in_set(set: &[String], value: Option<&str>) -> bool {
    value.is_some_and(|v| set.iter().any(|s| s == v))
}

fn clamp_points(total: f64) -> u8 {
    if !total.is_finite() {
        return 0;
    }
    total.clamp(0.0, MAX_POINTS as f64).round() as u8
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::extract::RecordExtractor;
    use crate::fixtures::{SAMPLE_PROFILE, SAMPLE_PROFILE_ID};
    use crate::record::RelativeRef;
    use chrono::Utc;

    fn empty_record() -> CanineIdentityRecord {
        CanineIdentityRecord::new("1", "u", Utc::now())
    }

    fn named(name: &str) -> Option<RelativeRef> {
        Some(RelativeRef {
            name: Some(name.to_string()),
            ..RelativeRef::default()
        })
    }

    fn perfect_record() -> CanineIdentityRecord {
        let mut r = empty_record();
        r.sire = named("S");
        r.dam = named("D");
        r.hip_score = Some("HD A".to_string());
        r.elbow_score = Some("OFA Normal".to_string());
        r.dsra_result = Some("CLEAR".to_string());
        r.dsra_certified = true;
        r.dvl2_result = Some("CLEAR".to_string());
        r.dvl2_certified = true;
        r.dna_parentage_confirmed = true;
        r.pedigree_number = Some("LV-1".to_string());
        r
    }

    #[test]
    fn test_sample_profile_scores_93() {
        let doc = Document::parse(SAMPLE_PROFILE);
        let record = RecordExtractor::default().extract(&doc, SAMPLE_PROFILE_ID, Utc::now());
        let result = score(&record);

        println!("{}", result.summary());

        assert_eq!(result.points, 93);
        assert_eq!(result.max_possible, 100);
        for key in [
            "sire_verified",
            "dam_verified",
            "hd_verified",
            "hd_rating",
            "ed_verified",
            "ed_rating",
            "dsra_tested",
            "dsra_certified",
            "pedigree_registered",
        ] {
            assert!(result.awarded(key), "missing {}", key);
        }
        assert!(!result.awarded("dvl2_tested"));
        assert!(!result.awarded("dvl2_certified"));
        assert!(!result.awarded("dna_confirmed"));
        assert_eq!(result.breakdown.len(), 9);
        assert_eq!(
            result.breakdown.get("hd_rating"),
            Some(&Award::Rating("excellent/good".to_string()))
        );

        println!("✅ Sample score test PASSED");
    }

    #[test]
    fn test_empty_record_scores_zero() {
        let result = score(&empty_record());
        assert_eq!(result.points, 0);
        assert!(result.breakdown.is_empty());
    }

    #[test]
    fn test_cap_at_100() {
        let scorer = VerificationScorer::new();
        assert_eq!(scorer.weights().ideal_total(), 110.0);

        let result = scorer.score(&perfect_record());
        assert_eq!(result.points, 100);
        assert_eq!(result.breakdown.len(), 12);
    }

    #[test]
    fn test_unknown_panels_in_any_case_earn_nothing() {
        for unknown in ["UNKNOWN", "unknown", "Unknown"] {
            let mut r = empty_record();
            r.dsra_result = Some(unknown.to_string());
            r.dsra_certified = true;
            r.dvl2_result = Some(unknown.to_string());
            r.dvl2_certified = true;

            let result = score(&r);
            assert_eq!(result.points, 0, "{}", unknown);
            assert!(result.breakdown.is_empty());
            // raw value still on the record
            assert_eq!(r.dsra_result.as_deref(), Some(unknown));
        }
    }

    #[test]
    fn test_quality_bonus_is_case_sensitive() {
        let mut r = empty_record();
        r.hip_score = Some("hd a".to_string());
        r.elbow_score = Some("ofa normal".to_string());

        let result = score(&r);
        assert_eq!(result.points, 40);
        assert!(result.awarded("hd_verified"));
        assert!(!result.awarded("hd_rating"));
        assert!(!result.awarded("ed_rating"));
    }

    #[test]
    fn test_unknown_hip_and_elbow_not_counted() {
        let mut r = empty_record();
        r.hip_score = Some("unknown".to_string());
        r.elbow_score = Some("Unknown".to_string());
        assert_eq!(score(&r).points, 0);
    }

    #[test]
    fn test_certified_without_result_earns_nothing() {
        let mut r = empty_record();
        r.dvl2_certified = true;
        assert_eq!(score(&r).points, 0);
    }

    #[test]
    fn test_dvl2_bonus_matches_dsra() {
        let mut r = empty_record();
        r.dvl2_result = Some("CARRIER".to_string());
        r.dvl2_certified = true;

        let result = score(&r);
        assert_eq!(result.points, 13); // 12.5 rounds up
        assert!(result.awarded("dvl2_certified"));
    }

    #[test]
    fn test_parent_ref_without_name_not_counted() {
        let mut r = empty_record();
        r.sire = Some(RelativeRef {
            name: None,
            external_id: Some("5".to_string()),
            url: None,
        });
        assert_eq!(score(&r).points, 0);
    }

    #[test]
    fn test_points_always_in_range() {
        let scorer = VerificationScorer::new().with_weights(ScoreWeights {
            sire: -50.0,
            ..ScoreWeights::default()
        });
        let mut r = empty_record();
        r.sire = named("S");
        assert_eq!(scorer.score(&r).points, 0);

        let heavy = VerificationScorer::new().with_weights(ScoreWeights {
            sire: 500.0,
            ..ScoreWeights::default()
        });
        assert_eq!(heavy.score(&r).points, 100);
    }

    #[test]
    fn test_breakdown_serializes_flags_and_ratings() {
        let json = serde_json::to_value(score(&perfect_record())).unwrap();
        assert_eq!(json["breakdown"]["sire_verified"], serde_json::json!(true));
        assert_eq!(json["breakdown"]["ed_rating"], serde_json::json!("clear"));
        assert_eq!(json["max_possible"], serde_json::json!(100));
    }
}
