// Pedigree Trust - Core Library
// Registry page extraction, verification scoring and persistence payloads,
// shared by the CLI, the API server and the tests.

pub mod config;
pub mod db;
pub mod document;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod labels;
pub mod record;
pub mod relatives;
pub mod score;
pub mod search;
pub mod sink;
pub mod verify;

#[cfg(test)]
mod fixtures;

// Re-export commonly used types
pub use config::{Config, RegistryConfig, SinkConfig};
pub use db::{
    DogHistory, Event, SqliteSink,
    setup_database, insert_event, get_events_for_entity, get_events_for_dog, verify_count,
    get_health_records_for_dog, get_pedigrees_for_dog,
};
pub use document::{Cell, Document, Row, Table};
pub use error::{is_client_error, VerifyError};
pub use extract::RecordExtractor;
pub use fetch::{DocumentFetcher, HttpFetcher, StaticFetcher};
pub use labels::{normalize_label, FieldKey};
pub use record::{CanineIdentityRecord, RelativeRef, RelativeSummary, Sex};
pub use relatives::extract_relatives;
pub use score::{score, Award, ScoreWeights, VerificationScore, VerificationScorer};
pub use search::{extract_candidates, SearchCandidate};
pub use sink::{
    HealthTestRecord, PedigreeRecord, PersistenceSink, RestSink, SaveOutcome, TestType,
    build_health_records, build_pedigree_record, save_verification,
};
pub use verify::{
    extract_profile, LookupOutcome, LookupQuery, VerificationPayload, VerificationService,
    VerifiedProfile,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
