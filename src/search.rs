// 🔍 Search Result Extractor - one candidate per qualifying results row

use crate::config::RegistryConfig;
use crate::document::Document;
use crate::extract::extract_link_id;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Path segment that marks a link to a dog's profile page
pub const PROFILE_PATH_MARKER: &str = "view_dog";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchCandidate {
    pub external_id: Option<String>,
    pub name: String,
    pub pedigree_number: String,
    pub titles: String,
    pub date_of_birth: String,
    pub color: String,
    pub hip_score: String,
    pub elbow_score: String,
    pub profile_url: String,
}

/// Candidates in source order. The first row is the header; rows without a
/// profile link in their first cell are separators and are skipped.
pub fn extract_candidates(doc: &Document, registry: &RegistryConfig) -> Vec<SearchCandidate> {
    let candidates: Vec<SearchCandidate> = doc
        .rows()
        .iter()
        .skip(1)
        .filter_map(|row| {
            let first = row.cell(0)?;
            let href = first.href.as_deref()?;
            if !href.contains(PROFILE_PATH_MARKER) {
                return None;
            }
            Some(SearchCandidate {
                external_id: extract_link_id(href),
                name: first.link_text.clone().unwrap_or_default(),
                pedigree_number: row.cell_text(1).to_string(),
                titles: row.cell_text(2).to_string(),
                date_of_birth: row.cell_text(3).to_string(),
                color: row.cell_text(4).to_string(),
                hip_score: row.cell_text(5).to_string(),
                elbow_score: row.cell_text(6).to_string(),
                profile_url: registry.absolute(href),
            })
        })
        .collect();

    debug!(count = candidates.len(), "search candidates extracted");
    candidates
}
