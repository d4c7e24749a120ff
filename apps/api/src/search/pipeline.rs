//! The end-to-end search pipeline: analyze the request, source candidates,
//! persist them to the Profile Store, and attach AI insights.
//!
//! Candidate sourcing is a demo-mode mock; a real deployment would plug a
//! scraping/search provider in at `source_candidates`.

use chrono::Utc;
use serde::Serialize;
use tracing::warn;

use crate::llm::Llm;
use crate::models::{prefixed_id, ProfileFilters, ProfileRecord, UserProfile};
use crate::search::{analyzer, insight};
use crate::stores::ProfileStore;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOutcome {
    pub search_id: String,
    pub query: String,
    pub criteria: ProfileFilters,
    pub results: Vec<ProfileRecord>,
}

/// Demo candidate pool standing in for a LinkedIn search provider.
pub fn mock_candidates() -> Vec<ProfileRecord> {
    let now = Utc::now();
    vec![
        ProfileRecord {
            id: "conn_1".into(),
            name: "Sarah Chen".into(),
            title: "Senior Investment Analyst".into(),
            company: "Andreessen Horowitz".into(),
            location: Some("Bay Area, CA".into()),
            education: Some(vec!["Stanford University".into(), "MBA".into()]),
            tags: Vec::new(),
            mutual_connections: Some(5),
            source_url: Some("https://linkedin.com/in/sarahchen".into()),
            industry: None,
            insight: None,
            created_at: now,
        },
        ProfileRecord {
            id: "conn_2".into(),
            name: "Michael Rodriguez".into(),
            title: "Partner".into(),
            company: "Galaxy Interactive".into(),
            location: Some("San Francisco, CA".into()),
            education: Some(vec!["UC Berkeley".into(), "Computer Science".into()]),
            tags: Vec::new(),
            mutual_connections: Some(3),
            source_url: Some("https://linkedin.com/in/mrodriguez".into()),
            industry: None,
            insight: None,
            created_at: now,
        },
        ProfileRecord {
            id: "conn_3".into(),
            name: "Emily Watson".into(),
            title: "Investment Manager".into(),
            company: "Bitkraft Ventures".into(),
            location: Some("Los Angeles, CA".into()),
            education: Some(vec!["MIT".into(), "Business".into()]),
            tags: Vec::new(),
            mutual_connections: Some(2),
            source_url: Some("https://linkedin.com/in/emilywatson".into()),
            industry: None,
            insight: None,
            created_at: now,
        },
    ]
}

/// Applies location and education criteria to the candidate pool. Industry,
/// seniority and keywords are left to the analyzer's criteria display; the
/// demo pool is too small to narrow further.
pub fn filter_candidates(
    candidates: Vec<ProfileRecord>,
    criteria: &ProfileFilters,
) -> Vec<ProfileRecord> {
    candidates
        .into_iter()
        .filter(|candidate| {
            if !criteria.locations.is_empty() {
                let location = candidate
                    .location
                    .as_deref()
                    .unwrap_or_default()
                    .to_lowercase();
                if !criteria
                    .locations
                    .iter()
                    .any(|l| location.contains(&l.to_lowercase()))
                {
                    return false;
                }
            }
            if !criteria.education.is_empty() {
                let education = candidate.education.clone().unwrap_or_default();
                if !criteria.education.iter().any(|wanted| {
                    education
                        .iter()
                        .any(|e| e.to_lowercase().contains(&wanted.to_lowercase()))
                }) {
                    return false;
                }
            }
            true
        })
        .collect()
}

/// Runs the full pipeline for one request. The search id is minted per call
/// and not persisted anywhere; results travel back to the client directly.
pub async fn run_search(
    llm: &dyn Llm,
    profiles: &dyn ProfileStore,
    user: &UserProfile,
    query: &str,
) -> SearchOutcome {
    let criteria = analyzer::analyze_request(llm, query, user).await;
    let mut results = filter_candidates(mock_candidates(), &criteria);

    for record in &mut results {
        match profiles.store(record).await {
            Ok(id) => record.id = id,
            Err(e) => {
                warn!("failed to persist candidate {}: {e}", record.name);
                if record.id.is_empty() {
                    record.id = prefixed_id("profile");
                }
            }
        }
    }

    insight::batch_insights(llm, user, &mut results).await;

    SearchOutcome {
        search_id: prefixed_id("search"),
        query: query.to_string(),
        criteria,
        results,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::MemoryProfileStore;
    use crate::testing::StubLlm;

    #[test]
    fn location_criteria_narrow_the_pool() {
        let criteria = ProfileFilters {
            locations: vec!["san francisco".into()],
            ..Default::default()
        };
        let filtered = filter_candidates(mock_candidates(), &criteria);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].name, "Michael Rodriguez");
    }

    #[test]
    fn education_criteria_match_any_entry_substring() {
        let criteria = ProfileFilters {
            education: vec!["stanford".into(), "mit".into()],
            ..Default::default()
        };
        let filtered = filter_candidates(mock_candidates(), &criteria);
        let names: Vec<_> = filtered.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Sarah Chen", "Emily Watson"]);
    }

    #[test]
    fn empty_criteria_keep_everything() {
        assert_eq!(
            filter_candidates(mock_candidates(), &ProfileFilters::default()).len(),
            3
        );
    }

    #[tokio::test]
    async fn run_search_persists_and_annotates_results() {
        let llm = StubLlm::with_responses([
            r#"{"industries": [], "locations": [], "education": [], "seniority": [], "keywords": ["vc"]}"#,
            "insight one",
            "insight two",
            "insight three",
        ]);
        let store = MemoryProfileStore::new();
        let user = UserProfile::new("ada@example.com", "Ada");

        let outcome = run_search(&llm, &store, &user, "find VCs").await;

        assert!(outcome.search_id.starts_with("search_"));
        assert_eq!(outcome.results.len(), 3);
        for record in &outcome.results {
            assert!(record.insight.is_some());
            assert!(store.get(&record.id).await.unwrap().is_some());
        }
    }
}
