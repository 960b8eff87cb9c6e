// 🔗 Verification pipeline
// fetch → parse → extract (record, children, siblings) → score

use crate::config::RegistryConfig;
use crate::document::Document;
use crate::error::VerifyError;
use crate::extract::RecordExtractor;
use crate::fetch::DocumentFetcher;
use crate::record::CanineIdentityRecord;
use crate::relatives::{extract_relatives, CHILDREN_SECTION, SIBLINGS_SECTION};
use crate::score::{VerificationScore, VerificationScorer};
use crate::search::{extract_candidates, SearchCandidate};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

pub const MISSING_QUERY: &str = "Provide ?name=DOGNAME or ?id=12345";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupQuery {
    ById(String),
    ByName(String),
}

impl LookupQuery {
    /// Id wins over name; blank values count as absent
    pub fn from_parts(id: Option<&str>, name: Option<&str>) -> Result<Self> {
        let id = id.map(str::trim).filter(|v| !v.is_empty());
        let name = name.map(str::trim).filter(|v| !v.is_empty());

        match (id, name) {
            (Some(id), _) => Ok(LookupQuery::ById(id.to_string())),
            (None, Some(name)) => Ok(LookupQuery::ByName(name.to_string())),
            (None, None) => Err(VerifyError::invalid(MISSING_QUERY).into()),
        }
    }
}

/// Record fields at the top level, score under `verification_score`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifiedProfile {
    #[serde(flatten)]
    pub record: CanineIdentityRecord,
    #[serde(rename = "verification_score")]
    pub score: VerificationScore,
}

/// What a save accepts: a verified profile, score optional
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationPayload {
    #[serde(flatten)]
    pub record: CanineIdentityRecord,
    #[serde(default, rename = "verification_score")]
    pub score: Option<VerificationScore>,
}

impl From<VerifiedProfile> for VerificationPayload {
    fn from(profile: VerifiedProfile) -> Self {
        VerificationPayload {
            record: profile.record,
            score: Some(profile.score),
        }
    }
}

#[derive(Debug, Clone)]
pub enum LookupOutcome {
    Profile(Box<VerifiedProfile>),
    /// More than one dog matched the name
    Candidates(Vec<SearchCandidate>),
    NoMatch,
}

/// Record plus relatives from an already-parsed profile page
pub fn extract_profile(
    extractor: &RecordExtractor,
    doc: &Document,
    source_id: &str,
    retrieved_at: DateTime<Utc>,
) -> CanineIdentityRecord {
    let mut record = extractor.extract(doc, source_id, retrieved_at);
    record.children = extract_relatives(doc, CHILDREN_SECTION, source_id);
    record.siblings = extract_relatives(doc, SIBLINGS_SECTION, source_id);
    record
}

pub struct VerificationService<F: DocumentFetcher> {
    registry: RegistryConfig,
    fetcher: F,
    extractor: RecordExtractor,
    scorer: VerificationScorer,
}

impl<F: DocumentFetcher> VerificationService<F> {
    pub fn new(registry: RegistryConfig, fetcher: F) -> Self {
        VerificationService {
            extractor: RecordExtractor::new(registry.clone()),
            scorer: VerificationScorer::new(),
            registry,
            fetcher,
        }
    }

    pub fn registry(&self) -> &RegistryConfig {
        &self.registry
    }

    pub fn profile(&self, id: &str) -> Result<VerifiedProfile> {
        let markup = self.fetcher.fetch(&self.registry.profile_url(id))?;
        let doc = Document::parse(&markup);
        let record = extract_profile(&self.extractor, &doc, id, Utc::now());
        let score = self.scorer.score(&record);

        info!(
            id,
            name = record.registered_name.as_deref().unwrap_or("-"),
            points = score.points,
            children = record.children.len(),
            siblings = record.siblings.len(),
            "profile verified"
        );
        Ok(VerifiedProfile { record, score })
    }

    pub fn search(&self, term: &str) -> Result<Vec<SearchCandidate>> {
        let markup = self.fetcher.fetch(&self.registry.search_url(term))?;
        let candidates = extract_candidates(&Document::parse(&markup), &self.registry);
        info!(term, matches = candidates.len(), "search complete");
        Ok(candidates)
    }

    pub fn lookup(&self, query: &LookupQuery) -> Result<LookupOutcome> {
        match query {
            LookupQuery::ById(id) => Ok(LookupOutcome::Profile(Box::new(self.profile(id)?))),
            LookupQuery::ByName(name) => {
                let mut candidates = self.search(name)?;
                match candidates.len() {
                    0 => Ok(LookupOutcome::NoMatch),
                    1 => {
                        let only = candidates.remove(0);
                        match only.external_id {
                            Some(id) => Ok(LookupOutcome::Profile(Box::new(self.profile(&id)?))),
                            None => Ok(LookupOutcome::Candidates(vec![only])),
                        }
                    }
                    _ => Ok(LookupOutcome::Candidates(candidates)),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::is_client_error;
    use crate::fetch::StaticFetcher;
    use crate::fixtures::{EMPTY_SEARCH, SAMPLE_PROFILE, SAMPLE_PROFILE_ID, SAMPLE_SEARCH, SINGLE_SEARCH};

    fn service_with(search_page: &str) -> VerificationService<StaticFetcher> {
        let registry = RegistryConfig::default();
        let fetcher = StaticFetcher::new()
            .with_page(registry.profile_url(SAMPLE_PROFILE_ID), SAMPLE_PROFILE)
            .with_page(registry.search_url("PHOENIX"), search_page);
        VerificationService::new(registry, fetcher)
    }

    #[test]
    fn test_profile_pipeline() {
        let service = service_with(EMPTY_SEARCH);
        let profile = service.profile(SAMPLE_PROFILE_ID).unwrap();

        assert_eq!(
            profile.record.registered_name.as_deref(),
            Some("HEART SKIPS PHOENIX BEAUTY")
        );
        assert_eq!(profile.record.children.len(), 2);
        assert_eq!(profile.record.siblings.len(), 1);
        assert_eq!(profile.record.siblings[0].external_id.as_deref(), Some("110392"));
        assert_eq!(profile.score.points, 93);
    }

    #[test]
    fn test_lookup_by_name_multiple_matches() {
        let service = service_with(SAMPLE_SEARCH);
        let outcome = service.lookup(&LookupQuery::ByName("PHOENIX".to_string())).unwrap();

        match outcome {
            LookupOutcome::Candidates(c) => assert_eq!(c.len(), 2),
            other => panic!("expected candidates, got {:?}", other),
        }
    }

    #[test]
    fn test_lookup_by_name_single_match_resolves() {
        let service = service_with(SINGLE_SEARCH);
        let outcome = service.lookup(&LookupQuery::ByName("PHOENIX".to_string())).unwrap();

        match outcome {
            LookupOutcome::Profile(p) => assert_eq!(p.record.source_id, SAMPLE_PROFILE_ID),
            other => panic!("expected profile, got {:?}", other),
        }
    }

    #[test]
    fn test_lookup_by_name_no_match() {
        let service = service_with(EMPTY_SEARCH);
        let outcome = service.lookup(&LookupQuery::ByName("PHOENIX".to_string())).unwrap();
        assert!(matches!(outcome, LookupOutcome::NoMatch));
    }

    #[test]
    fn test_fetch_failure_propagates() {
        let service = service_with(EMPTY_SEARCH);
        let err = service.profile("999").unwrap_err();
        assert!(!is_client_error(&err));
        assert!(err.to_string().contains("404"));
    }

    #[test]
    fn test_profile_json_reads_back_as_payload() {
        let service = service_with(EMPTY_SEARCH);
        let profile = service.profile(SAMPLE_PROFILE_ID).unwrap();

        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["source_id"], SAMPLE_PROFILE_ID);
        assert_eq!(json["verification_score"]["points"], 93);

        let payload: VerificationPayload = serde_json::from_value(json).unwrap();
        assert_eq!(payload.record.registered_name, profile.record.registered_name);
        assert_eq!(payload.record.children, profile.record.children);
        assert_eq!(payload.record.retrieved_at, profile.record.retrieved_at);
        assert_eq!(payload.score.map(|s| s.points), Some(93));
    }

    #[test]
    fn test_query_from_parts() {
        assert_eq!(
            LookupQuery::from_parts(Some("42"), Some("REX")).unwrap(),
            LookupQuery::ById("42".to_string())
        );
        assert_eq!(
            LookupQuery::from_parts(Some("  "), Some("REX")).unwrap(),
            LookupQuery::ByName("REX".to_string())
        );

        let err = LookupQuery::from_parts(None, Some("")).unwrap_err();
        assert!(is_client_error(&err));
        assert_eq!(err.to_string(), MISSING_QUERY);
    }
}
