//! Per-candidate AI insights ("why this person is worth contacting").

use tracing::warn;

use crate::llm::{prompts, Llm};
use crate::models::{ProfileRecord, UserProfile};

/// Upper bound on concurrent insight calls per batch.
const INSIGHT_BATCH_SIZE: usize = 5;

/// Generates a 1-2 sentence insight for one candidate. Never fails: LLM
/// errors degrade to a canned line so a search still returns results.
pub async fn profile_insight(
    llm: &dyn Llm,
    user: &UserProfile,
    record: &ProfileRecord,
) -> String {
    let interview = user.interview.as_ref();
    let prompt = prompts::INSIGHT_PROMPT_TEMPLATE
        .replace(
            "{goals}",
            interview.map(|i| i.career_goals.as_str()).unwrap_or(""),
        )
        .replace(
            "{current_role}",
            interview.map(|i| i.current_role.as_str()).unwrap_or(""),
        )
        .replace(
            "{industries}",
            &interview
                .map(|i| i.target_industries.join(", "))
                .unwrap_or_default(),
        )
        .replace("{name}", &record.name)
        .replace("{title}", &record.title)
        .replace("{company}", &record.company)
        .replace(
            "{education}",
            &record
                .education
                .as_ref()
                .map(|e| e.join(", "))
                .unwrap_or_default(),
        )
        .replace("{location}", record.location.as_deref().unwrap_or(""));

    match llm.complete(prompts::INSIGHT_SYSTEM, &prompt).await {
        Ok(text) => text.trim().to_string(),
        Err(e) => {
            warn!("insight generation failed for {}: {e}", record.name);
            canned_insight(record)
        }
    }
}

fn canned_insight(record: &ProfileRecord) -> String {
    format!(
        "{} at {} - Could be a valuable connection in your network.",
        record.title, record.company
    )
}

/// Fills `insight` on every record, fanning out in batches of
/// `INSIGHT_BATCH_SIZE` concurrent LLM calls.
pub async fn batch_insights(llm: &dyn Llm, user: &UserProfile, records: &mut [ProfileRecord]) {
    for chunk in records.chunks_mut(INSIGHT_BATCH_SIZE) {
        let insights =
            futures::future::join_all(chunk.iter().map(|r| profile_insight(llm, user, r))).await;
        for (record, insight) in chunk.iter_mut().zip(insights) {
            record.insight = Some(insight);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FailingLlm, StubLlm};
    use chrono::Utc;

    fn record(name: &str) -> ProfileRecord {
        ProfileRecord {
            id: String::new(),
            name: name.into(),
            title: "Partner".into(),
            company: "Galaxy Interactive".into(),
            location: Some("San Francisco, CA".into()),
            education: Some(vec!["UC Berkeley".into()]),
            tags: Vec::new(),
            mutual_connections: Some(3),
            source_url: None,
            industry: None,
            insight: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn insight_uses_llm_reply() {
        let llm = StubLlm::with_responses(["Strong gaming-sector investor match."]);
        let user = UserProfile::new("ada@example.com", "Ada");
        let insight = profile_insight(&llm, &user, &record("Michael Rodriguez")).await;
        assert_eq!(insight, "Strong gaming-sector investor match.");
    }

    #[tokio::test]
    async fn insight_degrades_to_canned_line() {
        let user = UserProfile::new("ada@example.com", "Ada");
        let insight = profile_insight(&FailingLlm, &user, &record("Michael Rodriguez")).await;
        assert_eq!(
            insight,
            "Partner at Galaxy Interactive - Could be a valuable connection in your network."
        );
    }

    #[tokio::test]
    async fn batch_fills_every_record() {
        let llm = StubLlm::with_responses(["one", "two", "three"]);
        let user = UserProfile::new("ada@example.com", "Ada");
        let mut records = vec![record("A"), record("B"), record("C")];
        batch_insights(&llm, &user, &mut records).await;
        let insights: Vec<_> = records.iter().map(|r| r.insight.clone().unwrap()).collect();
        assert_eq!(insights, vec!["one", "two", "three"]);
    }
}
